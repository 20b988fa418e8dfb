//! Error dialog component

use super::base::{render_dialog, DialogConfig};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    Frame,
};

/// Render the oldest queued error; `pending` counts the ones behind it
pub fn render_error_dialog(frame: &mut Frame, message: &str, pending: usize) {
    let key = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut hint = vec![
        Span::styled("Enter", key),
        Span::raw("/"),
        Span::styled("Esc", key),
        Span::raw(" para fechar"),
    ];
    if pending > 0 {
        hint.push(Span::styled(
            format!("  (+{pending})"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    render_dialog(
        frame,
        DialogConfig {
            title: "Erro",
            accent: Color::Red,
            message,
            hint,
            max_width: 60,
        },
    );
}
