//! Medication lookup tool.
//!
//! Fetches the full factual record for a medication so the model can
//! answer dosage/usage/safety questions from the internal database only.

use async_trait::async_trait;
use pharmhand_core::error::ToolError;
use pharmhand_core::tool::{FaultCode, Tool, ToolEnvelope};
use pharmhand_store::LookupStore;
use serde_json::json;
use std::sync::Arc;

pub struct MedicationLookupTool {
    store: Arc<LookupStore>,
}

impl MedicationLookupTool {
    pub fn new(store: Arc<LookupStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for MedicationLookupTool {
    fn name(&self) -> &str {
        "get_medication_by_name"
    }

    fn description(&self) -> &str {
        "Fetch full factual medication record by exact name (case-insensitive)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" }
            },
            "required": ["name"]
        })
    }

    async fn execute(
        &self,
        arguments: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<ToolEnvelope, ToolError> {
        let name = arguments
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'name' argument".into()))?;

        let Some(medication) = self.store.find_medication(name) else {
            return Ok(ToolEnvelope::failure(
                FaultCode::NotFound,
                format!("Medication '{name}' not found"),
            ));
        };

        Ok(ToolEnvelope::success(json!({ "medication": medication })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> MedicationLookupTool {
        MedicationLookupTool::new(Arc::new(LookupStore::seeded()))
    }

    fn args(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn returns_full_record() {
        let envelope = tool()
            .execute(&args(json!({"name": "Paracetamol"})))
            .await
            .unwrap();

        assert!(envelope.is_success());
        let wire = envelope.to_json();
        assert_eq!(wire["medication"]["name"], "Paracetamol");
        assert_eq!(wire["medication"]["active_ingredient"], "Acetaminophen");
        assert_eq!(wire["medication"]["requires_prescription"], false);
        assert_eq!(wire["medication"]["stock"], 42);
    }

    #[tokio::test]
    async fn matching_ignores_case_and_whitespace() {
        let envelope = tool()
            .execute(&args(json!({"name": "  cEtIrIzInE  "})))
            .await
            .unwrap();

        assert_eq!(envelope.to_json()["medication"]["name"], "Cetirizine");
    }

    #[tokio::test]
    async fn unknown_medication_is_not_found() {
        let envelope = tool()
            .execute(&args(json!({"name": "DoesNotExist"})))
            .await
            .unwrap();

        assert_eq!(envelope.fault_code(), Some(FaultCode::NotFound));
    }

    #[tokio::test]
    async fn missing_name_is_invalid_arguments() {
        let result = tool().execute(&args(json!({}))).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn tool_definition() {
        let def = tool().to_definition();
        assert_eq!(def.name, "get_medication_by_name");
        assert_eq!(def.parameters["required"][0], "name");
    }
}
