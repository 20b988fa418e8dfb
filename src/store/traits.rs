//! Trait abstraction for the record store to enable mocking in tests

use crate::state::forms::{FormValues, RecordKind};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Payload handed to the store when a valid form is submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistRequest {
    pub kind: RecordKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    pub values: FormValues,
}

/// Trait for record store operations, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStoreTrait: Send + Sync {
    /// Persist a record, returning its new id
    async fn save(&self, request: PersistRequest) -> Result<String>;
}
