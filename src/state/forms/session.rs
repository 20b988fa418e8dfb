//! Form session: live values of one open form plus the submit lifecycle
//!
//! A submit is split in two so the event loop can run the store call on a
//! spawned task: [`FormSession::begin_submit`] validates and hands out the
//! request, [`FormSession::finish_submit`] applies the single completion.

use super::catalog::FormDefinition;
use super::editor::is_region_picker;
use super::error::FormError;
use super::field::{FieldKind, FieldSpec, FieldValue, FormValues};
use super::rules::{is_visible, required_fields, visible_fields};
use super::validation::{validate, ValidationResult};
use crate::state::body_area::SelectionSet;
use crate::store::{PersistRequest, RecordStoreTrait};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Submitting,
}

/// Why a submit did not reach the store, or failed there
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("{} field(s) need attention", .0.len())]
    Invalid(ValidationResult),
    #[error("a submission is already in progress")]
    SessionBusy,
    #[error("could not save record: {0}")]
    Store(String),
}

/// Result of applying a store completion to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Values were reset to defaults
    Saved { id: String },
    /// Values were kept so the user can retry
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct FormSession {
    definition: &'static FormDefinition,
    today: NaiveDate,
    patient_id: Option<String>,
    values: FormValues,
    errors: ValidationResult,
    status: SessionStatus,
    dirty: bool,
}

impl FormSession {
    pub fn new(definition: &'static FormDefinition, today: NaiveDate) -> Self {
        Self {
            definition,
            today,
            patient_id: None,
            values: FormValues::defaults(definition.fields, today),
            errors: ValidationResult::default(),
            status: SessionStatus::Idle,
            dirty: false,
        }
    }

    /// Session for a record attached to an existing patient
    pub fn for_patient(
        definition: &'static FormDefinition,
        today: NaiveDate,
        patient_id: impl Into<String>,
    ) -> Self {
        Self {
            patient_id: Some(patient_id.into()),
            ..Self::new(definition, today)
        }
    }

    pub fn definition(&self) -> &'static FormDefinition {
        self.definition
    }

    pub fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Errors from the last validation, minus fields edited since
    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == SessionStatus::Submitting
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Visible fields in catalog order
    pub fn visible_fields(&self) -> Vec<&'static FieldSpec> {
        let rules = self.definition.rules;
        self.definition
            .fields
            .iter()
            .filter(|field| is_visible(field.key, rules, &self.values))
            .collect()
    }

    pub fn is_required(&self, key: &str) -> bool {
        required_fields(self.definition.fields, self.definition.rules, &self.values).contains(key)
    }

    /// Store a value. Hidden fields keep theirs.
    pub fn set_value(&mut self, key: &str, value: FieldValue) -> Result<(), FormError> {
        if self.is_submitting() {
            warn!(field = key, "edit rejected while submitting");
            return Err(FormError::SessionBusy);
        }
        let Some(field) = self.definition.field(key) else {
            return Err(FormError::UnknownField(key.to_string()));
        };
        let value = checked_value(field, value).inspect_err(|e| {
            warn!(field = key, error = %e, "edit rejected");
        })?;

        let is_trigger = self.definition.rules.iter().any(|r| r.trigger_key == key);
        let before = is_trigger.then(|| self.visible_keys());

        self.values.set(key, value);
        self.errors.errors.remove(key);
        self.dirty = true;

        if let Some(before) = before {
            let after = self.visible_keys();
            if before != after {
                debug!(
                    trigger = key,
                    shown = ?after.difference(&before).collect::<Vec<_>>(),
                    hidden = ?before.difference(&after).collect::<Vec<_>>(),
                    "disclosure changed"
                );
            }
        }
        Ok(())
    }

    /// Current selection of a multi-select field over body regions
    pub fn selection(&self, key: &str) -> Result<SelectionSet, FormError> {
        SelectionSet::from_ids(self.values.list(key))
    }

    /// Add or remove one option of a multi-select field
    pub fn toggle_option(&mut self, key: &str, option: &str) -> Result<(), FormError> {
        let Some(field) = self.definition.field(key) else {
            return Err(FormError::UnknownField(key.to_string()));
        };
        if !matches!(field.kind, FieldKind::MultiSelect(_)) {
            return Err(FormError::KindMismatch(key.to_string()));
        }
        if !field.kind.has_option(option) {
            return Err(FormError::UnknownOption {
                field: key.to_string(),
                option: option.to_string(),
            });
        }
        let mut items = self.values.list(key).to_vec();
        if let Some(pos) = items.iter().position(|item| item == option) {
            items.remove(pos);
        } else {
            items.push(option.to_string());
        }
        self.set_value(key, FieldValue::List(items))
    }

    /// Toggle one region of a multi-select field
    pub fn toggle_region(&mut self, key: &str, region_id: &str) -> Result<(), FormError> {
        let Some(field) = self.definition.field(key) else {
            return Err(FormError::UnknownField(key.to_string()));
        };
        if !matches!(field.kind, FieldKind::MultiSelect(options) if is_region_picker(options)) {
            return Err(FormError::KindMismatch(key.to_string()));
        }
        let next = self.selection(key)?.toggle(region_id)?;
        self.set_value(key, FieldValue::from(&next))
    }

    /// Run validation and keep the result for inline display
    pub fn validate(&mut self) -> &ValidationResult {
        self.errors = validate(self.definition.fields, self.definition.rules, &self.values);
        &self.errors
    }

    /// Validate and, if valid, enter `Submitting` and produce the store request
    pub fn begin_submit(&mut self) -> Result<PersistRequest, SubmitError> {
        if self.is_submitting() {
            warn!(form = self.definition.title, "submit rejected: already submitting");
            return Err(SubmitError::SessionBusy);
        }

        let result = self.validate().clone();
        if !result.valid() {
            info!(
                form = self.definition.title,
                errors = result.len(),
                "submit blocked by validation"
            );
            return Err(SubmitError::Invalid(result));
        }

        self.status = SessionStatus::Submitting;
        info!(form = self.definition.title, "submitting");
        Ok(PersistRequest {
            kind: self.definition.kind,
            patient_id: self.patient_id.clone(),
            values: self.values.clone(),
        })
    }

    /// Apply the store's completion. Success resets to defaults; failure keeps values.
    pub fn finish_submit(
        &mut self,
        outcome: anyhow::Result<String>,
    ) -> Result<SubmitOutcome, FormError> {
        if !self.is_submitting() {
            return Err(FormError::NotSubmitting);
        }
        self.status = SessionStatus::Idle;

        match outcome {
            Ok(id) => {
                info!(form = self.definition.title, %id, "submit succeeded");
                self.clear();
                Ok(SubmitOutcome::Saved { id })
            }
            Err(e) => {
                warn!(form = self.definition.title, error = %e, "submit failed");
                Ok(SubmitOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Validate, save through `store` and apply the outcome in one go
    pub async fn submit(&mut self, store: &dyn RecordStoreTrait) -> Result<String, SubmitError> {
        let request = self.begin_submit()?;
        let outcome = store.save(request).await;
        match self.finish_submit(outcome) {
            Ok(SubmitOutcome::Saved { id }) => Ok(id),
            Ok(SubmitOutcome::Failed { reason }) => Err(SubmitError::Store(reason)),
            Err(e) => Err(SubmitError::Store(e.to_string())),
        }
    }

    /// Restore defaults and drop errors
    pub fn reset(&mut self) -> Result<(), FormError> {
        if self.is_submitting() {
            return Err(FormError::SessionBusy);
        }
        self.clear();
        Ok(())
    }

    fn clear(&mut self) {
        self.values = FormValues::defaults(self.definition.fields, self.today);
        self.errors = ValidationResult::default();
        self.dirty = false;
    }

    fn visible_keys(&self) -> BTreeSet<&'static str> {
        visible_fields(self.definition.fields, self.definition.rules, &self.values)
    }
}

/// Check `value` against the field's kind and options. Region lists come
/// back deduplicated.
fn checked_value(field: &FieldSpec, value: FieldValue) -> Result<FieldValue, FormError> {
    if !field.kind.fits(&value) {
        return Err(FormError::KindMismatch(field.key.to_string()));
    }
    let unknown = |option: &str| FormError::UnknownOption {
        field: field.key.to_string(),
        option: option.to_string(),
    };

    match (field.kind, &value) {
        (FieldKind::SingleSelect(_), FieldValue::Text(text))
            if !text.is_empty() && !field.kind.has_option(text) =>
        {
            return Err(unknown(text.as_str()));
        }
        (FieldKind::MultiSelect(options), FieldValue::List(items)) if is_region_picker(options) => {
            let set = SelectionSet::from_ids(items)?;
            return Ok(FieldValue::from(&set));
        }
        (FieldKind::MultiSelect(_), FieldValue::List(items)) => {
            if let Some(item) = items.iter().find(|item| !field.kind.has_option(item)) {
                return Err(unknown(item.as_str()));
            }
        }
        (FieldKind::Group(entries), FieldValue::Group(group)) => {
            if let Some(key) = group.keys().find(|k| !entries.iter().any(|e| e.key == k.as_str())) {
                return Err(unknown(key.as_str()));
            }
        }
        _ => {}
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::catalog::{MEDICAL_RECORD_FORM, PATIENT_FORM, PHOTOTHERAPY_FORM};
    use crate::state::forms::validation::ErrorKind;
    use crate::store::MockRecordStoreTrait;
    use anyhow::anyhow;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn filled_medical_record() -> FormSession {
        let mut session = FormSession::for_patient(&MEDICAL_RECORD_FORM, today(), "1");
        for (key, value) in [
            ("weight", "70.5"),
            ("height", "175"),
            ("bloodPressure", "120/80"),
            ("symptoms", "Cefaleia"),
            ("diagnosis", "Hipertensão Arterial"),
            ("treatment", "Losartana 50mg"),
        ] {
            session.set_value(key, text(value)).unwrap();
        }
        session
    }

    mod editing {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_new_session_holds_defaults() {
            let session = FormSession::new(&MEDICAL_RECORD_FORM, today());
            assert_eq!(session.values().text("date"), "2024-04-15");
            assert!(!session.values().flag("followUp"));
            assert!(!session.is_dirty());
            assert_eq!(session.status(), SessionStatus::Idle);
        }

        #[test]
        fn test_set_value_marks_dirty_and_clears_field_error() {
            let mut session = FormSession::new(&PATIENT_FORM, today());
            session.validate();
            assert!(session.errors().error("name").is_some());

            session.set_value("name", text("Ana Silva")).unwrap();
            assert!(session.is_dirty());
            assert!(session.errors().error("name").is_none());
            assert!(session.errors().error("cpf").is_some());
        }

        #[test]
        fn test_unknown_field_rejected() {
            let mut session = FormSession::new(&PATIENT_FORM, today());
            assert_eq!(
                session.set_value("shoeSize", text("42")),
                Err(FormError::UnknownField("shoeSize".to_string()))
            );
        }

        #[test]
        fn test_follow_up_value_retained_across_toggle() {
            let mut session = FormSession::new(&MEDICAL_RECORD_FORM, today());
            session.set_value("followUp", FieldValue::Bool(true)).unwrap();
            session.set_value("followUpDate", text("2024-05-01")).unwrap();

            session.set_value("followUp", FieldValue::Bool(false)).unwrap();
            assert!(!session
                .visible_fields()
                .iter()
                .any(|f| f.key == "followUpDate"));
            assert_eq!(session.values().text("followUpDate"), "2024-05-01");

            session.set_value("followUp", FieldValue::Bool(true)).unwrap();
            assert!(session
                .visible_fields()
                .iter()
                .any(|f| f.key == "followUpDate"));
            assert_eq!(session.values().text("followUpDate"), "2024-05-01");
        }

        #[test]
        fn test_visible_fields_keep_catalog_order() {
            let session = FormSession::new(&PATIENT_FORM, today());
            let keys: Vec<&str> = session.visible_fields().iter().map(|f| f.key).collect();
            assert_eq!(
                keys,
                vec!["name", "birthDate", "gender", "cpf", "phone", "email", "address", "notes"]
            );
        }

        #[test]
        fn test_required_tracks_disclosure() {
            let mut session = FormSession::new(&MEDICAL_RECORD_FORM, today());
            assert!(!session.is_required("followUpDate"));
            session.set_value("followUp", FieldValue::Bool(true)).unwrap();
            assert!(session.is_required("followUpDate"));
        }

        #[test]
        fn test_toggle_region_updates_list() {
            let mut session = FormSession::new(&PHOTOTHERAPY_FORM, today());
            session.toggle_region("affectedAreas", "leftArm").unwrap();
            session.toggle_region("affectedAreas", "head").unwrap();
            assert_eq!(
                session.selection("affectedAreas").unwrap().names(),
                vec!["Braço esquerdo", "Cabeça"]
            );

            session.toggle_region("affectedAreas", "leftArm").unwrap();
            assert_eq!(session.values().list("affectedAreas"), ["head".to_string()]);
        }

        #[test]
        fn test_toggle_unknown_region_leaves_values() {
            let mut session = FormSession::new(&PHOTOTHERAPY_FORM, today());
            let before = session.values().clone();
            assert_eq!(
                session.toggle_region("affectedAreas", "tail"),
                Err(FormError::UnknownRegion("tail".to_string()))
            );
            assert_eq!(session.values(), &before);
        }

        #[test]
        fn test_toggle_option_is_self_inverse() {
            let mut session = FormSession::new(&PHOTOTHERAPY_FORM, today());
            session.toggle_option("affectedAreas", "back").unwrap();
            session.toggle_option("affectedAreas", "back").unwrap();
            assert!(session.values().list("affectedAreas").is_empty());
        }

        #[test]
        fn test_toggle_region_on_non_list_field_rejected() {
            let mut session = FormSession::new(&PHOTOTHERAPY_FORM, today());
            assert!(session.toggle_region("notes", "head").is_err());
        }

        #[test]
        fn test_region_list_with_unknown_id_rejected() {
            let mut session = FormSession::new(&PHOTOTHERAPY_FORM, today());
            session.toggle_region("affectedAreas", "leftArm").unwrap();

            let stray = FieldValue::List(vec!["tail".to_string(), "leftArm".to_string()]);
            assert_eq!(
                session.set_value("affectedAreas", stray),
                Err(FormError::UnknownRegion("tail".to_string()))
            );
            assert_eq!(session.values().list("affectedAreas"), ["leftArm".to_string()]);

            session.toggle_region("affectedAreas", "head").unwrap();
            assert_eq!(
                session.selection("affectedAreas").unwrap().names(),
                vec!["Braço esquerdo", "Cabeça"]
            );
        }

        #[test]
        fn test_region_list_is_deduplicated() {
            let mut session = FormSession::new(&PHOTOTHERAPY_FORM, today());
            let list = FieldValue::List(vec!["head".to_string(), "head".to_string()]);
            session.set_value("affectedAreas", list).unwrap();
            assert_eq!(session.values().list("affectedAreas"), ["head".to_string()]);
        }

        #[test]
        fn test_toggle_option_outside_catalog_rejected() {
            let mut session = FormSession::new(&PHOTOTHERAPY_FORM, today());
            assert_eq!(
                session.toggle_option("affectedAreas", "tail"),
                Err(FormError::UnknownOption {
                    field: "affectedAreas".to_string(),
                    option: "tail".to_string(),
                })
            );
            assert!(session.values().list("affectedAreas").is_empty());
        }

        #[test]
        fn test_unknown_select_option_rejected() {
            let mut session = FormSession::new(&PATIENT_FORM, today());
            assert_eq!(
                session.set_value("gender", text("x")),
                Err(FormError::UnknownOption {
                    field: "gender".to_string(),
                    option: "x".to_string(),
                })
            );
            assert_eq!(session.values().text("gender"), "");

            session.set_value("gender", text("outro")).unwrap();
            session.set_value("gender", text("")).unwrap();
        }

        #[test]
        fn test_unknown_group_entry_rejected() {
            let mut session = FormSession::new(&PHOTOTHERAPY_FORM, today());
            let group = [("glucose".to_string(), "ok".to_string())].into_iter().collect();
            assert!(matches!(
                session.set_value("labExams", FieldValue::Group(group)),
                Err(FormError::UnknownOption { .. })
            ));
        }

        #[test]
        fn test_value_of_wrong_kind_rejected() {
            let mut session = FormSession::new(&PATIENT_FORM, today());
            assert_eq!(
                session.set_value("name", FieldValue::Bool(true)),
                Err(FormError::KindMismatch("name".to_string()))
            );
            assert_eq!(
                session.set_value("email", FieldValue::List(vec!["x".to_string()])),
                Err(FormError::KindMismatch("email".to_string()))
            );
            assert!(!session.is_dirty());
        }
    }

    mod submit_lifecycle {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_invalid_submit_keeps_values_and_status() {
            let mut session = FormSession::new(&PATIENT_FORM, today());
            session.set_value("name", text("Ana Silva")).unwrap();

            let err = session.begin_submit().unwrap_err();
            let SubmitError::Invalid(result) = err else {
                panic!("expected validation failure");
            };
            assert!(result.error("name").is_none());
            assert_eq!(
                result.error("cpf").unwrap().kind,
                ErrorKind::MissingField
            );
            assert_eq!(session.values().text("name"), "Ana Silva");
            assert_eq!(session.status(), SessionStatus::Idle);
        }

        #[test]
        fn test_follow_up_date_blocks_submit_when_revealed() {
            let mut session = filled_medical_record();
            session.set_value("followUp", FieldValue::Bool(true)).unwrap();
            let Err(SubmitError::Invalid(result)) = session.begin_submit() else {
                panic!("expected validation failure");
            };
            assert_eq!(result.len(), 1);
            assert!(result.error("followUpDate").is_some());
        }

        #[test]
        fn test_valid_submit_produces_request() {
            let mut session = filled_medical_record();
            let request = session.begin_submit().unwrap();
            assert_eq!(request.kind, crate::state::forms::RecordKind::MedicalRecord);
            assert_eq!(request.patient_id.as_deref(), Some("1"));
            assert_eq!(request.values.text("weight"), "70.5");
            assert!(session.is_submitting());
        }

        #[test]
        fn test_double_submit_is_busy_without_changing_first_outcome() {
            let mut session = filled_medical_record();
            session.begin_submit().unwrap();

            assert_eq!(session.begin_submit(), Err(SubmitError::SessionBusy));
            assert!(session.is_submitting());

            let outcome = session.finish_submit(Ok("rec-1".to_string())).unwrap();
            assert_eq!(
                outcome,
                SubmitOutcome::Saved {
                    id: "rec-1".to_string()
                }
            );
            assert_eq!(session.status(), SessionStatus::Idle);
        }

        #[test]
        fn test_edits_rejected_while_submitting() {
            let mut session = filled_medical_record();
            session.begin_submit().unwrap();
            assert_eq!(
                session.set_value("weight", text("80")),
                Err(FormError::SessionBusy)
            );
            assert_eq!(session.reset(), Err(FormError::SessionBusy));
            assert_eq!(session.values().text("weight"), "70.5");
        }

        #[test]
        fn test_success_resets_to_defaults() {
            let mut session = filled_medical_record();
            session.begin_submit().unwrap();
            session.finish_submit(Ok("rec-1".to_string())).unwrap();

            assert_eq!(
                session.values(),
                &FormValues::defaults(MEDICAL_RECORD_FORM.fields, today())
            );
            assert!(!session.is_dirty());
            assert_eq!(session.patient_id(), Some("1"));
        }

        #[test]
        fn test_failure_keeps_values() {
            let mut session = filled_medical_record();
            session.begin_submit().unwrap();
            let outcome = session.finish_submit(Err(anyhow!("disk full"))).unwrap();

            assert_eq!(
                outcome,
                SubmitOutcome::Failed {
                    reason: "disk full".to_string()
                }
            );
            assert_eq!(session.values().text("weight"), "70.5");
            assert_eq!(session.status(), SessionStatus::Idle);
        }

        #[test]
        fn test_finish_without_begin_is_rejected() {
            let mut session = FormSession::new(&PATIENT_FORM, today());
            assert_eq!(
                session.finish_submit(Ok("x".to_string())),
                Err(FormError::NotSubmitting)
            );
        }

        #[test]
        fn test_reset_restores_defaults() {
            let mut session = filled_medical_record();
            session.validate();
            session.reset().unwrap();
            assert_eq!(session.values().text("weight"), "");
            assert!(session.errors().is_empty());
            assert!(!session.is_dirty());
        }
    }

    mod with_store {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_submit_saves_through_store() {
            let mut store = MockRecordStoreTrait::new();
            store
                .expect_save()
                .withf(|req| req.patient_id.as_deref() == Some("1"))
                .times(1)
                .returning(|_| Ok("rec-42".to_string()));

            let mut session = filled_medical_record();
            let id = session.submit(&store).await.unwrap();
            assert_eq!(id, "rec-42");
            assert_eq!(session.values().text("weight"), "");
        }

        #[tokio::test]
        async fn test_invalid_form_never_reaches_store() {
            let mut store = MockRecordStoreTrait::new();
            store.expect_save().times(0);

            let mut session = FormSession::new(&PATIENT_FORM, today());
            let err = session.submit(&store).await.unwrap_err();
            assert!(matches!(err, SubmitError::Invalid(_)));
        }

        #[tokio::test]
        async fn test_store_failure_surfaces_and_keeps_values() {
            let mut store = MockRecordStoreTrait::new();
            store
                .expect_save()
                .returning(|_| Err(anyhow!("timeout")));

            let mut session = filled_medical_record();
            let err = session.submit(&store).await.unwrap_err();
            assert_eq!(err, SubmitError::Store("timeout".to_string()));
            assert_eq!(session.values().text("diagnosis"), "Hipertensão Arterial");
        }

        #[test]
        fn test_submit_with_simulated_store() {
            let store = crate::store::SimulatedStore::new(std::time::Duration::ZERO);
            let mut session = filled_medical_record();
            let id = tokio_test::block_on(session.submit(&store)).unwrap();
            assert!(!id.is_empty());
        }
    }
}
