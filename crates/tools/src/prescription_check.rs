//! Combined prescription check tool.
//!
//! Answers two questions at once: does the medication require a
//! prescription, and does this user have one on file. The user is
//! checked before the medication, so an unknown user wins over an
//! unknown medication.

use async_trait::async_trait;
use pharmhand_core::error::ToolError;
use pharmhand_core::tool::{FaultCode, Tool, ToolEnvelope};
use pharmhand_store::LookupStore;
use serde_json::json;
use std::sync::Arc;

pub struct PrescriptionCheckTool {
    store: Arc<LookupStore>,
}

impl PrescriptionCheckTool {
    pub fn new(store: Arc<LookupStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for PrescriptionCheckTool {
    fn name(&self) -> &str {
        "check_prescription"
    }

    fn description(&self) -> &str {
        "Combined check: whether medication requires a prescription and whether user has it on file."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": { "type": "string" },
                "name": { "type": "string" }
            },
            "required": ["user_id", "name"]
        })
    }

    async fn execute(
        &self,
        arguments: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<ToolEnvelope, ToolError> {
        let user_id = arguments
            .get("user_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'user_id' argument".into()))?;
        let name = arguments
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'name' argument".into()))?;

        let Some(user) = self.store.find_user(user_id) else {
            return Ok(ToolEnvelope::failure(
                FaultCode::UnknownUser,
                format!("User '{user_id}' not found"),
            ));
        };

        let Some(medication) = self.store.find_medication(name) else {
            return Ok(ToolEnvelope::failure(
                FaultCode::NotFound,
                format!("Medication '{name}' not found"),
            ));
        };

        Ok(ToolEnvelope::success(json!({
            "name": medication.name,
            "requires_prescription": medication.requires_prescription,
            "user_has_prescription": user.holds_prescription_for(&medication.name),
        })))
    }
}
