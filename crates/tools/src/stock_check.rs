//! Stock check tool.

use async_trait::async_trait;
use pharmhand_core::error::ToolError;
use pharmhand_core::tool::{FaultCode, Tool, ToolEnvelope};
use pharmhand_store::LookupStore;
use serde_json::json;
use std::sync::Arc;

pub struct StockCheckTool {
    store: Arc<LookupStore>,
}

impl StockCheckTool {
    pub fn new(store: Arc<LookupStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for StockCheckTool {
    fn name(&self) -> &str {
        "check_stock"
    }

    fn description(&self) -> &str {
        "Check current stock quantity for a medication by name (case-insensitive)."
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

        // Canonical name, not the caller's spelling.
        Ok(ToolEnvelope::success(json!({
            "name": medication.name,
            "stock": medication.stock,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> StockCheckTool {
        StockCheckTool::new(Arc::new(LookupStore::seeded()))
    }

    fn args(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn in_stock_medication() {
        let envelope = tool()
            .execute(&args(json!({"name": "Paracetamol"})))
            .await
            .unwrap();

        let wire = envelope.to_json();
        assert_eq!(wire["name"], "Paracetamol");
        assert_eq!(wire["stock"], 42);
    }

    #[tokio::test]
    async fn out_of_stock_medication() {
        let envelope = tool()
            .execute(&args(json!({"name": "Cetirizine"})))
            .await
            .unwrap();

        assert_eq!(envelope.to_json()["stock"], 0);
    }

    #[tokio::test]
    async fn canonical_name_in_result() {
        let envelope = tool()
            .execute(&args(json!({"name": "  iBuPrOfEn  "})))
            .await
            .unwrap();

        let wire = envelope.to_json();
        assert_eq!(wire["name"], "Ibuprofen");
        assert_eq!(wire["stock"], 18);
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
}
