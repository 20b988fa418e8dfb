//! Form domain errors

use thiserror::Error;

/// Misuse of a form session or selection set.
///
/// A correct UI never triggers these; callers log and ignore them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown body region `{0}`")]
    UnknownRegion(String),
    #[error("a submission is already in progress")]
    SessionBusy,
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("no submission is in progress")]
    NotSubmitting,
    #[error("value does not match the kind of field `{0}`")]
    KindMismatch(String),
    #[error("`{option}` is not an option of field `{field}`")]
    UnknownOption { field: String, option: String },
}

/// A static catalog breaks one of its own invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("duplicate field key `{0}`")]
    DuplicateKey(&'static str),
    #[error("select field `{0}` has no options")]
    EmptyOptions(&'static str),
    #[error("rule trigger `{0}` is not a field of this form")]
    UnknownTrigger(&'static str),
    #[error("rule trigger `{0}` must be a boolean or select field")]
    InvalidTriggerKind(&'static str),
    #[error("rule trigger value does not match the kind of `{0}`")]
    TriggerValueMismatch(&'static str),
    #[error("revealed key `{0}` is not a field of this form")]
    UnknownRevealedKey(&'static str),
}
