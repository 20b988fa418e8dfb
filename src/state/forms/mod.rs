//! Form domain layer
//!
//! Declarative field catalogs, conditional disclosure, validation and the
//! per-form editing session.

mod catalog;
mod editor;
mod error;
mod field;
mod rules;
mod session;
mod validation;

pub use catalog::{
    FormDefinition, RecordKind, ALL_FORMS, MEDICAL_RECORD_FORM, PATIENT_FORM, PHOTOTHERAPY_FORM,
};
pub use editor::{is_region_picker, FormEditor};
pub use error::FormError;
pub use field::{FieldKind, FieldSpec, FieldValue, FormValues, SelectOption};
pub use session::{FormSession, SubmitError, SubmitOutcome};
