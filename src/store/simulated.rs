//! Stand-in backend that waits a fixed delay and hands back a fresh id

use super::traits::{PersistRequest, RecordStoreTrait};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Default artificial latency of a save
pub const DEFAULT_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct SimulatedStore {
    delay: Duration,
}

impl Default for SimulatedStore {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DELAY_MS))
    }
}

impl SimulatedStore {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl RecordStoreTrait for SimulatedStore {
    async fn save(&self, request: PersistRequest) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        let id = Uuid::new_v4().to_string();
        info!(
            kind = request.kind.label(),
            patient = request.patient_id.as_deref().unwrap_or("-"),
            payload = %serde_json::to_string(&request.values)?,
            %id,
            "record saved"
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::{FieldValue, FormValues, RecordKind};
    use pretty_assertions::assert_eq;

    fn request() -> PersistRequest {
        PersistRequest {
            kind: RecordKind::MedicalRecord,
            patient_id: Some("1".to_string()),
            values: [("weight", FieldValue::Text("70".to_string()))]
                .into_iter()
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_save_waits_for_delay_and_returns_uuid() {
        let store = SimulatedStore::new(Duration::from_millis(20));
        let started = tokio::time::Instant::now();
        let id = store.save(request()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = SimulatedStore::new(Duration::ZERO);
        let a = store.save(request()).await.unwrap();
        let b = store.save(request()).await.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_delay() {
        assert_eq!(SimulatedStore::default().delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_request_json_shape() {
        let json = serde_json::to_value(PersistRequest {
            kind: RecordKind::Patient,
            patient_id: None,
            values: FormValues::new(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "patient", "values": {} }));
    }
}
