//! Lookup tool implementations for pharmhand.
//!
//! Three read-only tools over the in-memory store: a full medication
//! record fetch, a stock check, and a combined prescription check.
//! All of them return discriminated success/error envelopes; none of
//! them mutate anything.

pub mod medication_lookup;
pub mod prescription_check;
pub mod stock_check;

use pharmhand_core::tool::ToolRegistry;
use pharmhand_store::LookupStore;
use std::sync::Arc;

pub use medication_lookup::MedicationLookupTool;
pub use prescription_check::PrescriptionCheckTool;
pub use stock_check::StockCheckTool;

/// Create the registry of pharmacy lookup tools, all sharing one store.
pub fn pharmacy_registry(store: Arc<LookupStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(MedicationLookupTool::new(store.clone())));
    registry.register(Box::new(StockCheckTool::new(store.clone())));
    registry.register(Box::new(PrescriptionCheckTool::new(store)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_all_three_tools() {
        let registry = pharmacy_registry(Arc::new(LookupStore::seeded()));
        let mut names = registry.names();
        names.sort();
        assert_eq!(
            names,
            vec!["check_prescription", "check_stock", "get_medication_by_name"]
        );
    }

    #[test]
    fn definitions_declare_required_parameters() {
        let registry = pharmacy_registry(Arc::new(LookupStore::seeded()));
        for def in registry.definitions() {
            let required = def.parameters["required"].as_array().unwrap();
            assert!(!required.is_empty(), "{} has no required params", def.name);
        }
    }
}
