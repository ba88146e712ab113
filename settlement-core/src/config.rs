use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::types::ResourceAmount;

/// Tunables for one game session. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(default)]
pub struct SimConfig {
    pub starting_workers: u32,
    /// Cap for the admin resize lever; completed buildings still add slots past it
    pub max_worker_count: u32,
    pub passive_income_interval_seconds: f64,
    pub passive_income_start_delay_seconds: f64,
    /// Extra worker slots per completed building, on top of the building's own unlocks
    pub workers_per_completed_building: u32,
    /// When set, sites finish this many seconds after starting even with no workers
    pub fallback_finish_seconds: Option<f64>,
    pub starting_resources: Vec<ResourceAmount>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            starting_workers: 1,
            max_worker_count: 16,
            passive_income_interval_seconds: 10.0,
            passive_income_start_delay_seconds: 1.0,
            workers_per_completed_building: 0,
            fallback_finish_seconds: None,
            starting_resources: Vec::new(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResourceType;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(
            r#"{ "starting_workers": 3, "starting_resources": [{ "resource": "Wood", "amount": 50 }] }"#,
        )
        .unwrap();

        assert_eq!(config.starting_workers, 3);
        assert_eq!(config.max_worker_count, 16);
        assert_eq!(config.fallback_finish_seconds, None);
        assert_eq!(
            config.starting_resources,
            vec![ResourceAmount::new(ResourceType::Wood, 50)]
        );
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(SimConfig::from_json("{ \"starting_workers\": -1 }").is_err());
    }
}
