//! Sidebar button component

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

/// Render a boxed sidebar entry: shortcut key, then the section name
pub fn render_sidebar_button(frame: &mut Frame, area: Rect, key: char, label: &str, is_selected: bool) {
    let accent = if is_selected { Color::Cyan } else { Color::DarkGray };

    let label_style = if is_selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let line = Line::from(vec![
        Span::styled(format!(" {key} "), Style::default().fg(accent)),
        Span::styled(label, label_style),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));

    frame.render_widget(Paragraph::new(line).block(block), area);
}
