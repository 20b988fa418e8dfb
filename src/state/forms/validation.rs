//! Validation engine
//!
//! Checks a value map against a catalog and its disclosure rules. Every
//! violating field gets exactly one error: missing, then too short, then
//! malformed. Fields hidden by a rule are skipped.

use super::field::{FieldKind, FieldSpec, FieldValue, FormValues, TextFormat};
use super::rules::{required_fields, visible_fields, DisclosureRule};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Kind of a single field violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingField,
    TooShort,
    InvalidFormat,
}

/// One field's violation, with the message shown next to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    fn new(kind: ErrorKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

/// Outcome of one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: BTreeMap<String, FieldError>,
}

impl ValidationResult {
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, key: &str) -> Option<&FieldError> {
        self.errors.get(key)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate `values` against a catalog and its rules
pub fn validate(
    catalog: &[FieldSpec],
    rules: &[DisclosureRule],
    values: &FormValues,
) -> ValidationResult {
    let visible = visible_fields(catalog, rules, values);
    let required = required_fields(catalog, rules, values);

    let errors = catalog
        .iter()
        .filter(|field| visible.contains(field.key))
        .filter_map(|field| {
            check_field(field, values.get(field.key), required.contains(field.key))
                .map(|err| (field.key.to_string(), err))
        })
        .collect();

    ValidationResult { errors }
}

fn check_field(field: &FieldSpec, value: Option<&FieldValue>, required: bool) -> Option<FieldError> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return required.then(|| FieldError::new(ErrorKind::MissingField, field.required_message));
    };

    if !field.kind.fits(value) || !within_options(&field.kind, value) {
        return Some(FieldError::new(ErrorKind::InvalidFormat, field.invalid_message));
    }

    let text = value.as_text()?;

    if let Some(min) = field.min_len {
        if text.chars().count() < min {
            return Some(FieldError::new(ErrorKind::TooShort, field.invalid_message));
        }
    }

    match field.format {
        Some(TextFormat::Email) if !is_valid_email(text) => {
            Some(FieldError::new(ErrorKind::InvalidFormat, field.invalid_message))
        }
        Some(TextFormat::Date) if !is_valid_date(text) => Some(FieldError::new(
            ErrorKind::InvalidFormat,
            "Data inválida (use AAAA-MM-DD).",
        )),
        _ => None,
    }
}

/// Whether every selected option, or group entry, belongs to the field
fn within_options(kind: &FieldKind, value: &FieldValue) -> bool {
    match (kind, value) {
        (FieldKind::SingleSelect(_), FieldValue::Text(text)) => kind.has_option(text),
        (FieldKind::MultiSelect(_), FieldValue::List(items)) => {
            items.iter().all(|item| kind.has_option(item))
        }
        (FieldKind::Group(entries), FieldValue::Group(group)) => group
            .keys()
            .all(|key| entries.iter().any(|entry| entry.key == key.as_str())),
        _ => true,
    }
}

/// Minimal address check: one `@`, non-empty local part, dotted domain
/// with no empty labels and no whitespace anywhere.
pub fn is_valid_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

/// Exactly `YYYY-MM-DD`, zero-padded, naming a real calendar day
pub fn is_valid_date(text: &str) -> bool {
    text.len() == 10
        && NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .is_ok_and(|date| date.format("%Y-%m-%d").to_string() == text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::catalog::{MEDICAL_RECORD_FORM, PATIENT_FORM};
    use crate::state::forms::rules::TriggerValue;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn filled_patient() -> FormValues {
        [
            ("name", text("Ana Silva")),
            ("birthDate", text("1982-05-15")),
            ("gender", text("feminino")),
            ("cpf", text("123.456.789-00")),
            ("phone", text("(11) 98765-4321")),
            ("email", text("ana.silva@email.com")),
            ("address", text("Rua das Flores, 123 - São Paulo, SP")),
            ("notes", text("")),
        ]
        .into_iter()
        .collect()
    }

    mod required_only_catalogs {
        use super::*;
        use pretty_assertions::assert_eq;

        const CATALOG: &[FieldSpec] = &[
            FieldSpec::new("a", "A", FieldKind::Text).required("a"),
            FieldSpec::new("b", "B", FieldKind::TextArea),
            FieldSpec::new("c", "C", FieldKind::Text).required("c"),
        ];

        #[test]
        fn test_valid_iff_required_fields_filled() {
            let cases: Vec<(FormValues, bool)> = vec![
                (FormValues::new(), false),
                ([("a", text("x"))].into_iter().collect(), false),
                ([("a", text("x")), ("c", text("y"))].into_iter().collect(), true),
                ([("a", text("")), ("c", text("y"))].into_iter().collect(), false),
                (
                    [("a", text("x")), ("b", text("")), ("c", text("y"))]
                        .into_iter()
                        .collect(),
                    true,
                ),
            ];
            for (values, expected) in cases {
                assert_eq!(validate(CATALOG, &[], &values).valid(), expected);
            }
        }

        #[test]
        fn test_all_violations_are_reported() {
            let result = validate(CATALOG, &[], &FormValues::new());
            assert_eq!(result.len(), 2);
            assert_eq!(result.error("a").unwrap().kind, ErrorKind::MissingField);
            assert_eq!(result.error("c").unwrap().kind, ErrorKind::MissingField);
        }

        #[test]
        fn test_empty_list_counts_as_missing() {
            const OPTIONS: &[crate::state::forms::field::SelectOption] =
                &[crate::state::forms::field::SelectOption::new("head", "Cabeça")];
            const AREAS: &[FieldSpec] = &[FieldSpec::new(
                "areas",
                "Áreas",
                FieldKind::MultiSelect(OPTIONS),
            )
            .required("areas")];
            let values: FormValues = [("areas", FieldValue::List(vec![]))].into_iter().collect();
            let result = validate(AREAS, &[], &values);
            assert_eq!(result.error("areas").unwrap().kind, ErrorKind::MissingField);
        }
    }

    mod patient_form {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_empty_name_is_reported() {
            let mut values = filled_patient();
            values.set("name", text(""));
            let result = validate(PATIENT_FORM.fields, PATIENT_FORM.rules, &values);
            assert!(!result.valid());
            assert!(result.error("name").is_some());
        }

        #[test]
        fn test_filled_patient_is_valid() {
            let result = validate(PATIENT_FORM.fields, PATIENT_FORM.rules, &filled_patient());
            assert_eq!(result, ValidationResult::default());
            assert!(result.valid());
        }

        #[test]
        fn test_short_values_are_too_short() {
            let mut values = filled_patient();
            values.set("name", text("A"));
            values.set("phone", text("1199"));
            let result = validate(PATIENT_FORM.fields, PATIENT_FORM.rules, &values);
            assert_eq!(result.error("name").unwrap().kind, ErrorKind::TooShort);
            assert_eq!(
                result.error("name").unwrap().message,
                "O nome deve ter pelo menos 2 caracteres."
            );
            assert_eq!(result.error("phone").unwrap().kind, ErrorKind::TooShort);
        }

        #[test]
        fn test_malformed_email_is_invalid_format() {
            let mut values = filled_patient();
            values.set("email", text("ana.silva@"));
            let result = validate(PATIENT_FORM.fields, PATIENT_FORM.rules, &values);
            assert_eq!(result.error("email").unwrap().kind, ErrorKind::InvalidFormat);
            assert_eq!(result.error("email").unwrap().message, "Email inválido.");
        }

        #[test]
        fn test_impossible_date_is_invalid_format() {
            let mut values = filled_patient();
            values.set("birthDate", text("1982-02-30"));
            let result = validate(PATIENT_FORM.fields, PATIENT_FORM.rules, &values);
            assert_eq!(
                result.error("birthDate").unwrap().kind,
                ErrorKind::InvalidFormat
            );
        }

        #[test]
        fn test_value_of_wrong_kind_is_invalid_format() {
            let mut values = filled_patient();
            values.set("name", FieldValue::Bool(true));
            values.set("email", FieldValue::List(vec!["x".to_string()]));
            let result = validate(PATIENT_FORM.fields, PATIENT_FORM.rules, &values);
            assert_eq!(result.error("name").unwrap().kind, ErrorKind::InvalidFormat);
            assert_eq!(result.error("email").unwrap().kind, ErrorKind::InvalidFormat);
            assert_eq!(result.len(), 2);
        }

        #[test]
        fn test_unknown_select_option_is_invalid_format() {
            let mut values = filled_patient();
            values.set("gender", text("x"));
            let result = validate(PATIENT_FORM.fields, PATIENT_FORM.rules, &values);
            assert_eq!(result.error("gender").unwrap().kind, ErrorKind::InvalidFormat);
        }

        #[test]
        fn test_validation_is_idempotent() {
            let values = FormValues::new();
            let first = validate(PATIENT_FORM.fields, PATIENT_FORM.rules, &values);
            let second = validate(PATIENT_FORM.fields, PATIENT_FORM.rules, &values);
            assert_eq!(first, second);
        }
    }

    mod conditional_requiredness {
        use super::*;
        use pretty_assertions::assert_eq;

        const CATALOG: &[FieldSpec] = &[
            FieldSpec::new("followUp", "Retorno", FieldKind::Boolean),
            FieldSpec::new("followUpDate", "Data do Retorno", FieldKind::Date),
        ];
        const RULES: &[DisclosureRule] = &[DisclosureRule::new(
            "followUp",
            TriggerValue::Bool(true),
            &["followUpDate"],
            true,
        )];

        #[test]
        fn test_follow_up_date_required_when_follow_up_set() {
            let values: FormValues = [("followUp", FieldValue::Bool(true))].into_iter().collect();
            let result = validate(CATALOG, RULES, &values);
            assert_eq!(
                result.error("followUpDate").unwrap().kind,
                ErrorKind::MissingField
            );
        }

        #[test]
        fn test_follow_up_date_not_required_without_follow_up() {
            let values: FormValues = [("followUp", FieldValue::Bool(false))].into_iter().collect();
            assert!(validate(CATALOG, RULES, &values).valid());
        }

        #[test]
        fn test_hidden_malformed_value_is_ignored() {
            let values: FormValues = [
                ("followUp", FieldValue::Bool(false)),
                ("followUpDate", text("not a date")),
            ]
            .into_iter()
            .collect();
            assert!(validate(CATALOG, RULES, &values).valid());
        }

        #[test]
        fn test_medical_record_defaults_only_miss_clinical_fields() {
            let today = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
            let values = FormValues::defaults(MEDICAL_RECORD_FORM.fields, today);
            let result = validate(MEDICAL_RECORD_FORM.fields, MEDICAL_RECORD_FORM.rules, &values);
            let missing: Vec<&str> = result.errors.keys().map(String::as_str).collect();
            assert_eq!(
                missing,
                vec![
                    "bloodPressure",
                    "diagnosis",
                    "height",
                    "symptoms",
                    "treatment",
                    "weight"
                ]
            );
        }
    }

    mod formats {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_email_shapes() {
            assert!(is_valid_email("ana@email.com"));
            assert!(is_valid_email("a.b+c@mail.example.org"));
            assert!(!is_valid_email("ana"));
            assert!(!is_valid_email("@email.com"));
            assert!(!is_valid_email("ana@email"));
            assert!(!is_valid_email("ana@email..com"));
            assert!(!is_valid_email("ana @email.com"));
            assert!(!is_valid_email("a@b@c.com"));
        }

        #[test]
        fn test_date_shapes() {
            assert!(is_valid_date("2024-05-01"));
            assert!(is_valid_date("2024-02-29"));
            assert!(!is_valid_date("2023-02-29"));
            assert!(!is_valid_date("01/05/2024"));
            assert!(!is_valid_date("2024-5-1"));
            assert!(!is_valid_date(" 2024-05-01"));
            assert!(!is_valid_date("2024-05-01 "));
            assert!(!is_valid_date("+2024-05-01"));
        }

        #[test]
        fn test_unpadded_birth_date_is_invalid_format() {
            let mut values = filled_patient();
            values.set("birthDate", text("1982-5-15"));
            let result = validate(PATIENT_FORM.fields, PATIENT_FORM.rules, &values);
            assert_eq!(
                result.error("birthDate").unwrap().message,
                "Data inválida (use AAAA-MM-DD)."
            );
        }
    }
}
