//! Base dialog component

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// What a modal shows and how it is tinted
pub struct DialogConfig<'a> {
    pub title: &'a str,
    /// Border and title color
    pub accent: Color,
    /// Body text; `\n` starts a new paragraph
    pub message: &'a str,
    /// Key hint under the body
    pub hint: Vec<Span<'a>>,
    pub max_width: u16,
}

/// Render a modal centered over whatever is already drawn
pub fn render_dialog(frame: &mut Frame, config: DialogConfig) {
    let screen = frame.area();
    let width = config.max_width.min(screen.width);
    let text_width = width.saturating_sub(4).max(1) as usize;

    let body_rows: usize = config
        .message
        .split('\n')
        .map(|p| p.chars().count().div_ceil(text_width).max(1))
        .sum();
    let hint_rows = if config.hint.is_empty() { 0 } else { 2 };
    let height = (body_rows as u16 + hint_rows + 2).min(screen.height);

    let area = Rect {
        x: screen.x + screen.width.saturating_sub(width) / 2,
        y: screen.y + screen.height.saturating_sub(height) / 2,
        width,
        height,
    };

    let mut lines: Vec<Line> = config.message.split('\n').map(Line::from).collect();
    if !config.hint.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(config.hint));
    }

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", config.title),
            Style::default().fg(config.accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(config.accent))
        .style(Style::default().bg(Color::Black));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}
