//! Form rendering: one scrolling column of fields per record form

mod body_area;
mod field_renderer;

use crate::app::App;
use crate::state::forms::{is_region_picker, FieldKind, FieldSpec, FormEditor};
use field_renderer::draw_field;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
    Frame,
};

/// Draw the new-patient page
pub fn draw_patient_create(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(editor) = &app.state.form {
        draw_form(frame, area, editor);
    }
}

/// Draw a form, scrolled so the active field is on screen
pub fn draw_form(frame: &mut Frame, area: Rect, editor: &FormEditor) {
    let session = &editor.session;
    let mut title = vec![Span::styled(
        format!(" {} ", session.definition().title),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    if session.is_dirty() && !session.is_submitting() {
        title.push(Span::styled("● ", Style::default().fg(Color::Yellow)));
    }
    if session.is_submitting() {
        title.push(Span::styled("Salvando... ", Style::default().fg(Color::Yellow)));
    } else if !session.errors().is_empty() {
        title.push(Span::styled(
            format!("{} erro(s) ", session.errors().len()),
            Style::default().fg(Color::Red),
        ));
    }

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let fields = session.visible_fields();
    let heights: Vec<u16> = fields.iter().map(|f| field_height(f)).collect();
    let start = first_visible(&heights, editor.active_index(), inner.height);

    let mut y = inner.y;
    let bottom = inner.y + inner.height;
    for (field, height) in fields.iter().zip(&heights).skip(start) {
        if y + height > bottom {
            break;
        }
        let slot = Rect {
            x: inner.x,
            y,
            width: inner.width,
            height: *height,
        };
        draw_field(frame, slot, editor, field);
        y += height;
    }
}

/// Rows a field occupies, borders included
fn field_height(field: &FieldSpec) -> u16 {
    match field.kind {
        FieldKind::TextArea => 5,
        FieldKind::MultiSelect(options) if is_region_picker(options) => body_area::PICKER_HEIGHT,
        FieldKind::MultiSelect(options) => options.len() as u16 + 2,
        FieldKind::Group(entries) => entries.len() as u16 + 2,
        _ => 3,
    }
}

/// Index of the first field to draw so that the field at `active` ends within `available` rows
fn first_visible(heights: &[u16], active: usize, available: u16) -> usize {
    let Some(active_end) = heights.get(..=active) else {
        return 0;
    };
    let mut start = 0;
    let mut used: u16 = active_end.iter().sum();
    while used > available && start < active {
        used -= heights[start];
        start += 1;
    }
    start
}
