//! Form field value objects and declarative field specs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One choice of a select field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

impl SelectOption {
    pub const fn new(value: &'static str, label: &'static str) -> Self {
        Self { value, label }
    }
}

/// One text entry inside a grouped field (e.g. a lab exam)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupEntry {
    pub key: &'static str,
    pub label: &'static str,
}

impl GroupEntry {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Input kind of a field. Rendering and value handling dispatch on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Date,
    Boolean,
    SingleSelect(&'static [SelectOption]),
    MultiSelect(&'static [SelectOption]),
    Group(&'static [GroupEntry]),
}

impl FieldKind {
    /// Options for select kinds, `None` otherwise
    pub fn options(&self) -> Option<&'static [SelectOption]> {
        match self {
            FieldKind::SingleSelect(options) | FieldKind::MultiSelect(options) => Some(options),
            _ => None,
        }
    }

    /// Whether text is typed into this field
    pub fn accepts_text(&self) -> bool {
        matches!(
            self,
            FieldKind::Text | FieldKind::TextArea | FieldKind::Date | FieldKind::Group(_)
        )
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self, FieldKind::TextArea)
    }

    /// Whether `value` has the shape this kind stores
    pub fn fits(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (
                FieldKind::Text | FieldKind::TextArea | FieldKind::Date | FieldKind::SingleSelect(_),
                FieldValue::Text(_)
            ) | (FieldKind::Boolean, FieldValue::Bool(_))
                | (FieldKind::MultiSelect(_), FieldValue::List(_))
                | (FieldKind::Group(_), FieldValue::Group(_))
        )
    }

    /// Whether `value` is one of this select kind's options
    pub fn has_option(&self, value: &str) -> bool {
        self.options()
            .is_some_and(|options| options.iter().any(|o| o.value == value))
    }
}

/// Extra format check applied to non-empty text values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Email,
    /// `YYYY-MM-DD`
    Date,
}

/// Initial value of a field when a form opens or resets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Empty,
    Text(&'static str),
    Bool(bool),
    /// Today's date, formatted as `YYYY-MM-DD`
    Today,
}

/// Declarative description of one form input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: DefaultValue,
    pub min_len: Option<usize>,
    pub format: Option<TextFormat>,
    /// Message shown when the field is required and empty
    pub required_message: &'static str,
    /// Message shown for `TooShort` / `InvalidFormat`
    pub invalid_message: &'static str,
    pub placeholder: &'static str,
}

impl FieldSpec {
    /// Optional field with no constraints. Chain the `const fn` builders to refine.
    pub const fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        let format = match kind {
            FieldKind::Date => Some(TextFormat::Date),
            _ => None,
        };
        let default = match kind {
            FieldKind::Boolean => DefaultValue::Bool(false),
            _ => DefaultValue::Empty,
        };
        Self {
            key,
            label,
            kind,
            required: false,
            default,
            min_len: None,
            format,
            required_message: "Campo obrigatório.",
            invalid_message: "Valor inválido.",
            placeholder: "",
        }
    }

    pub const fn required(mut self, message: &'static str) -> Self {
        self.required = true;
        self.required_message = message;
        self
    }

    /// Message used when a disclosure rule makes this field required
    pub const fn missing_message(mut self, message: &'static str) -> Self {
        self.required_message = message;
        self
    }

    pub const fn min_len(mut self, min: usize, message: &'static str) -> Self {
        self.min_len = Some(min);
        self.invalid_message = message;
        self
    }

    pub const fn email(mut self, message: &'static str) -> Self {
        self.format = Some(TextFormat::Email);
        self.invalid_message = message;
        self
    }

    pub const fn default_value(mut self, default: DefaultValue) -> Self {
        self.default = default;
        self
    }

    pub const fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Value this field starts with
    pub fn initial_value(&self, today: NaiveDate) -> FieldValue {
        match (self.default, self.kind) {
            (DefaultValue::Text(text), _) => FieldValue::Text(text.to_string()),
            (DefaultValue::Bool(flag), _) => FieldValue::Bool(flag),
            (DefaultValue::Today, _) => FieldValue::Text(today.format("%Y-%m-%d").to_string()),
            (DefaultValue::Empty, FieldKind::Boolean) => FieldValue::Bool(false),
            (DefaultValue::Empty, FieldKind::MultiSelect(_)) => FieldValue::List(Vec::new()),
            (DefaultValue::Empty, FieldKind::Group(entries)) => FieldValue::Group(
                entries
                    .iter()
                    .map(|e| (e.key.to_string(), String::new()))
                    .collect(),
            ),
            (DefaultValue::Empty, _) => FieldValue::Text(String::new()),
        }
    }
}

/// Value held by a field, shaped by its kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
    Group(BTreeMap<String, String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    /// Empty string, empty list, or a group with no filled entry.
    /// Booleans are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Bool(_) => false,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Group(entries) => entries.values().all(|v| v.is_empty()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Current values of one form, keyed by field key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, FieldValue>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for every field of a catalog
    pub fn defaults(fields: &[FieldSpec], today: NaiveDate) -> Self {
        Self(
            fields
                .iter()
                .map(|f| (f.key.to_string(), f.initial_value(today)))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FieldValue> {
        self.0.get_mut(key)
    }

    pub fn set(&mut self, key: &str, value: FieldValue) {
        self.0.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.0.remove(key)
    }

    /// Text value, or "" when absent or not text
    pub fn text(&self, key: &str) -> &str {
        self.get(key).and_then(FieldValue::as_text).unwrap_or("")
    }

    /// Boolean value, or false when absent or not a boolean
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(FieldValue::as_bool).unwrap_or(false)
    }

    /// List value, or empty when absent or not a list
    pub fn list(&self, key: &str) -> &[String] {
        self.get(key).and_then(FieldValue::as_list).unwrap_or(&[])
    }

    /// Whether the key is absent or holds an empty value
    pub fn is_blank(&self, key: &str) -> bool {
        self.get(key).map_or(true, FieldValue::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for FormValues {
    fn from_iter<T: IntoIterator<Item = (K, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
