//! Body-area picker: region checklist, coverage and selection summary

use crate::state::body_area::BODY_REGIONS;
use crate::state::forms::{FieldSpec, FormEditor};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

/// Regions, view line, summary line, borders
pub const PICKER_HEIGHT: u16 = BODY_REGIONS.len() as u16 + 4;

/// Draw the picker inside an already-rendered field block
pub fn draw_region_picker(
    frame: &mut Frame,
    area: Rect,
    editor: &FormEditor,
    field: &FieldSpec,
    is_active: bool,
) {
    let view = editor.body_view;
    let selection = match editor.session.selection(field.key) {
        Ok(selection) => selection,
        Err(e) => {
            let message = Paragraph::new(e.to_string()).style(Style::default().fg(Color::Red));
            frame.render_widget(message, area);
            return;
        }
    };

    let mut lines = vec![Line::from(vec![
        Span::styled("Diagrama: ", Style::default().fg(Color::DarkGray)),
        Span::styled(view.label(), Style::default().fg(Color::Yellow)),
        Span::styled(
            format!("  ({}% da superfície)", selection.coverage(view)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            if is_active { "  v:trocar" } else { "" },
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    for region in &BODY_REGIONS {
        let checked = selection.contains(region.id);
        let focused = is_active && editor.highlighted_option().is_some_and(|o| o.value == region.id);
        let style = match (focused, checked) {
            (true, _) => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            (false, true) => Style::default().fg(Color::Green),
            (false, false) => Style::default(),
        };
        lines.push(Line::from(vec![
            Span::styled(if checked { "[x] " } else { "[ ] " }, style),
            Span::styled(format!("{:<18}", region.name), style),
            Span::styled(
                format!("{:>3}%", region.surface_percent(view)),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    lines.push(Line::from(vec![
        Span::styled("Áreas selecionadas: ", Style::default().fg(Color::DarkGray)),
        Span::raw(selection.summary()),
    ]));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}
