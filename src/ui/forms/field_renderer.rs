//! Field rendering for forms

use super::body_area::draw_region_picker;
use crate::state::forms::{is_region_picker, FieldKind, FieldSpec, FieldValue, FormEditor};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const CURSOR: &str = "▌";

/// Draw one field of `editor`'s form in its slot
pub fn draw_field(frame: &mut Frame, area: Rect, editor: &FormEditor, field: &FieldSpec) {
    let session = &editor.session;
    let is_active = editor.is_active(field.key);
    let error = session.errors().error(field.key);

    let border_color = match (error, is_active) {
        (Some(_), _) => Color::Red,
        (None, true) => Color::Cyan,
        (None, false) => Color::DarkGray,
    };

    let mut title = vec![Span::raw(format!(" {}", field.label))];
    if session.is_required(field.key) {
        title.push(Span::styled(" *", Style::default().fg(Color::Red)));
    }
    title.push(Span::raw(" "));

    let mut block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    if let Some(error) = error {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {} ", error.message),
            Style::default().fg(Color::Red),
        )));
    }

    let value = session.values().get(field.key);
    let lines = match field.kind {
        FieldKind::Text | FieldKind::Date | FieldKind::TextArea => {
            text_lines(value.and_then(FieldValue::as_text).unwrap_or_default(), field, is_active)
        }
        FieldKind::Boolean => {
            let checked = value.and_then(FieldValue::as_bool).unwrap_or(false);
            let caption = if field.placeholder.is_empty() {
                field.label
            } else {
                field.placeholder
            };
            vec![Line::from(vec![
                Span::styled(
                    if checked { "[x] " } else { "[ ] " },
                    Style::default().fg(if is_active { Color::Cyan } else { Color::Gray }),
                ),
                Span::raw(caption),
            ])]
        }
        FieldKind::SingleSelect(options) => {
            let current = value.and_then(FieldValue::as_text).unwrap_or_default();
            let label = options
                .iter()
                .find(|o| o.value == current)
                .map(|o| Span::raw(o.label))
                .unwrap_or_else(|| placeholder_span(field, "Selecione"));
            if is_active {
                vec![Line::from(vec![
                    Span::styled("◀ ", Style::default().fg(Color::Cyan)),
                    label,
                    Span::styled(" ▶", Style::default().fg(Color::Cyan)),
                ])]
            } else {
                vec![Line::from(label)]
            }
        }
        FieldKind::MultiSelect(options) if is_region_picker(options) => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            draw_region_picker(frame, inner, editor, field, is_active);
            return;
        }
        FieldKind::MultiSelect(options) => {
            let selected = value.and_then(FieldValue::as_list).unwrap_or_default();
            options
                .iter()
                .enumerate()
                .map(|(i, option)| {
                    let mark = if selected.iter().any(|s| s == option.value) {
                        "[x] "
                    } else {
                        "[ ] "
                    };
                    let style = if is_active && i == editor.item_cursor {
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    Line::from(Span::styled(format!("{mark}{}", option.label), style))
                })
                .collect()
        }
        FieldKind::Group(entries) => {
            let group = match value {
                Some(FieldValue::Group(group)) => Some(group),
                _ => None,
            };
            entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let text = group
                        .and_then(|g| g.get(entry.key))
                        .map(String::as_str)
                        .unwrap_or_default();
                    let focused = is_active && i == editor.item_cursor;
                    let mut spans = vec![
                        Span::styled(
                            format!("{:<18}", entry.label),
                            Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }),
                        ),
                        Span::raw(text.to_string()),
                    ];
                    if focused {
                        spans.push(Span::styled(CURSOR, Style::default().fg(Color::Cyan)));
                    }
                    Line::from(spans)
                })
                .collect()
        }
    };

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

/// Text value with a trailing cursor when active; placeholder when empty and idle
fn text_lines<'a>(text: &'a str, field: &FieldSpec, is_active: bool) -> Vec<Line<'a>> {
    if text.is_empty() && !is_active {
        return vec![Line::from(placeholder_span(field, "(vazio)"))];
    }

    let mut lines: Vec<Line> = text.split('\n').map(Line::from).collect();
    if is_active {
        let cursor = Span::styled(CURSOR, Style::default().fg(Color::Cyan));
        match lines.last_mut() {
            Some(last) => last.spans.push(cursor),
            None => lines.push(Line::from(cursor)),
        }
    }
    lines
}

fn placeholder_span(field: &FieldSpec, fallback: &'static str) -> Span<'static> {
    let text = if field.placeholder.is_empty() {
        fallback
    } else {
        field.placeholder
    };
    Span::styled(text, Style::default().fg(Color::DarkGray))
}
