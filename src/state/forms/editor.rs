//! Keyboard editing state layered over a [`FormSession`]
//!
//! The cursor is tracked by field key so it survives fields appearing and
//! disappearing as disclosure rules fire.

use super::error::FormError;
use super::field::{FieldKind, FieldSpec, FieldValue, SelectOption};
use super::session::FormSession;
use crate::state::body_area::{find_region, BodyView};

/// Form being edited in a view
#[derive(Debug, Clone)]
pub struct FormEditor {
    pub session: FormSession,
    active_key: &'static str,
    /// Highlighted option, region, or group entry within the active field
    pub item_cursor: usize,
    pub body_view: BodyView,
}

impl FormEditor {
    pub fn new(session: FormSession, body_view: BodyView) -> Self {
        let active_key = session
            .definition()
            .fields
            .first()
            .map(|f| f.key)
            .unwrap_or_default();
        Self {
            session,
            active_key,
            item_cursor: 0,
            body_view,
        }
    }

    pub fn field_count(&self) -> usize {
        self.session.visible_fields().len()
    }

    /// Index of the active field among the visible ones
    pub fn active_index(&self) -> usize {
        self.session
            .visible_fields()
            .iter()
            .position(|f| f.key == self.active_key)
            .unwrap_or(0)
    }

    pub fn active_field(&self) -> Option<&'static FieldSpec> {
        let visible = self.session.visible_fields();
        visible
            .iter()
            .find(|f| f.key == self.active_key)
            .or_else(|| visible.first())
            .copied()
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active_field().is_some_and(|f| f.key == key)
    }

    fn set_active_index(&mut self, index: usize) {
        if let Some(field) = self.session.visible_fields().get(index) {
            self.active_key = field.key;
            self.item_cursor = 0;
        }
    }

    pub fn next_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        self.set_active_index((self.active_index() + 1) % count);
    }

    pub fn prev_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_index();
        self.set_active_index(if current == 0 { count - 1 } else { current - 1 });
    }

    /// Type a character into the active text, date, or group entry field
    pub fn insert_char(&mut self, c: char) -> Result<(), FormError> {
        let Some(field) = self.active_field() else {
            return Ok(());
        };
        match field.kind {
            FieldKind::Text | FieldKind::TextArea | FieldKind::Date => {
                let mut text = self.session.values().text(field.key).to_string();
                text.push(c);
                self.session.set_value(field.key, FieldValue::Text(text))
            }
            FieldKind::Group(entries) => {
                let Some(entry) = entries.get(self.item_cursor) else {
                    return Ok(());
                };
                let mut group = self.group_value(field);
                group.entry(entry.key.to_string()).or_default().push(c);
                self.session.set_value(field.key, FieldValue::Group(group))
            }
            _ => Ok(()),
        }
    }

    pub fn backspace(&mut self) -> Result<(), FormError> {
        let Some(field) = self.active_field() else {
            return Ok(());
        };
        match field.kind {
            FieldKind::Text | FieldKind::TextArea | FieldKind::Date => {
                let mut text = self.session.values().text(field.key).to_string();
                if text.pop().is_none() {
                    return Ok(());
                }
                self.session.set_value(field.key, FieldValue::Text(text))
            }
            FieldKind::Group(entries) => {
                let Some(entry) = entries.get(self.item_cursor) else {
                    return Ok(());
                };
                let mut group = self.group_value(field);
                if let Some(text) = group.get_mut(entry.key) {
                    text.pop();
                }
                self.session.set_value(field.key, FieldValue::Group(group))
            }
            _ => Ok(()),
        }
    }

    /// Space: flip a boolean, or toggle the highlighted option/region
    pub fn toggle(&mut self) -> Result<(), FormError> {
        let Some(field) = self.active_field() else {
            return Ok(());
        };
        match field.kind {
            FieldKind::Boolean => {
                let flag = self.session.values().flag(field.key);
                self.session.set_value(field.key, FieldValue::Bool(!flag))
            }
            FieldKind::MultiSelect(options) => {
                let Some(option) = options.get(self.item_cursor) else {
                    return Ok(());
                };
                if is_region_picker(options) {
                    self.session.toggle_region(field.key, option.value)
                } else {
                    self.session.toggle_option(field.key, option.value)
                }
            }
            FieldKind::SingleSelect(_) => self.cycle(1),
            _ => Ok(()),
        }
    }

    /// Left/right: step a single select's value, or move the highlight
    /// inside a multi-select or group field
    pub fn cycle(&mut self, step: isize) -> Result<(), FormError> {
        let Some(field) = self.active_field() else {
            return Ok(());
        };
        match field.kind {
            FieldKind::SingleSelect(options) => {
                let current = self.session.values().text(field.key);
                let next = match options.iter().position(|o| o.value == current) {
                    Some(pos) => wrap(pos, step, options.len()),
                    None if step < 0 => options.len().saturating_sub(1),
                    None => 0,
                };
                match options.get(next) {
                    Some(option) => self
                        .session
                        .set_value(field.key, FieldValue::Text(option.value.to_string())),
                    None => Ok(()),
                }
            }
            FieldKind::MultiSelect(options) => {
                self.item_cursor = wrap(self.item_cursor, step, options.len());
                Ok(())
            }
            FieldKind::Group(entries) => {
                self.item_cursor = wrap(self.item_cursor, step, entries.len());
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn swap_body_view(&mut self) {
        self.body_view = self.body_view.toggle();
    }

    /// Label of the highlighted option of a select field
    pub fn highlighted_option(&self) -> Option<&'static SelectOption> {
        self.active_field()
            .and_then(|f| f.kind.options())
            .and_then(|options| options.get(self.item_cursor))
    }

    fn group_value(&self, field: &FieldSpec) -> std::collections::BTreeMap<String, String> {
        match self.session.values().get(field.key) {
            Some(FieldValue::Group(group)) => group.clone(),
            _ => Default::default(),
        }
    }
}

/// Whether every option of a multi-select names a body region
pub fn is_region_picker(options: &[SelectOption]) -> bool {
    !options.is_empty() && options.iter().all(|o| find_region(o.value).is_some())
}

fn wrap(current: usize, step: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    (current as isize + step).rem_euclid(len) as usize
}
