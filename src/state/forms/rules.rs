//! Conditional disclosure: which fields are visible and required for the
//! current values.
//!
//! Everything here is a pure function of the values passed in. Hidden fields
//! keep whatever they hold; only their visibility changes.

use super::field::{FieldKind, FieldSpec, FieldValue, FormValues};
use std::collections::BTreeSet;

/// Value a trigger field must hold for a rule to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerValue {
    /// Boolean field equals this flag
    Bool(bool),
    /// Single select equals this option, or multi select contains it
    Option(&'static str),
}

impl TriggerValue {
    fn matches(&self, value: Option<&FieldValue>) -> bool {
        match (self, value) {
            (TriggerValue::Bool(expected), Some(FieldValue::Bool(actual))) => expected == actual,
            // An unset boolean reads as false
            (TriggerValue::Bool(expected), None) => !*expected,
            (TriggerValue::Option(expected), Some(FieldValue::Text(actual))) => actual == expected,
            (TriggerValue::Option(expected), Some(FieldValue::List(items))) => {
                items.iter().any(|item| item == expected)
            }
            _ => false,
        }
    }
}

/// Makes `revealed_keys` visible (and optionally required) while
/// `trigger_key` holds `trigger_value`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisclosureRule {
    pub trigger_key: &'static str,
    pub trigger_value: TriggerValue,
    pub revealed_keys: &'static [&'static str],
    pub revealed_required: bool,
}

impl DisclosureRule {
    pub const fn new(
        trigger_key: &'static str,
        trigger_value: TriggerValue,
        revealed_keys: &'static [&'static str],
        revealed_required: bool,
    ) -> Self {
        Self {
            trigger_key,
            trigger_value,
            revealed_keys,
            revealed_required,
        }
    }

    /// Whether the trigger condition holds for these values
    pub fn holds(&self, values: &FormValues) -> bool {
        self.trigger_value.matches(values.get(self.trigger_key))
    }

    pub fn reveals(&self, key: &str) -> bool {
        self.revealed_keys.contains(&key)
    }

    /// Whether the trigger field's kind can carry this rule's trigger value
    pub(crate) fn trigger_fits(&self, kind: &FieldKind) -> bool {
        match (self.trigger_value, kind) {
            (TriggerValue::Bool(_), FieldKind::Boolean) => true,
            (TriggerValue::Option(v), FieldKind::SingleSelect(options))
            | (TriggerValue::Option(v), FieldKind::MultiSelect(options)) => {
                options.iter().any(|o| o.value == v)
            }
            _ => false,
        }
    }
}

/// Whether a single field is visible for the current values
pub fn is_visible(key: &str, rules: &[DisclosureRule], values: &FormValues) -> bool {
    let mut governing = rules.iter().filter(|rule| rule.reveals(key)).peekable();
    if governing.peek().is_none() {
        return true;
    }
    governing.any(|rule| rule.holds(values))
}

/// Keys of every field visible for the current values
pub fn visible_fields(
    catalog: &[FieldSpec],
    rules: &[DisclosureRule],
    values: &FormValues,
) -> BTreeSet<&'static str> {
    catalog
        .iter()
        .filter(|field| is_visible(field.key, rules, values))
        .map(|field| field.key)
        .collect()
}

/// Keys that must be filled for the current values: visible fields that are
/// statically required or revealed by a firing rule with `revealed_required`
pub fn required_fields(
    catalog: &[FieldSpec],
    rules: &[DisclosureRule],
    values: &FormValues,
) -> BTreeSet<&'static str> {
    let visible = visible_fields(catalog, rules, values);
    let conditionally_required: BTreeSet<&str> = rules
        .iter()
        .filter(|rule| rule.revealed_required && rule.holds(values))
        .flat_map(|rule| rule.revealed_keys.iter().copied())
        .collect();

    catalog
        .iter()
        .filter(|field| visible.contains(field.key))
        .filter(|field| field.required || conditionally_required.contains(field.key))
        .map(|field| field.key)
        .collect()
}
