//! Integrator and API-key directory.

use rfq_core::Integrator;
use std::collections::{HashMap, HashSet};

/// Lookup tables for integrator records and their API keys, built once
/// at startup from configuration.
#[derive(Debug, Clone, Default)]
pub struct IntegratorDirectory {
    by_id: HashMap<String, Integrator>,
    key_to_id: HashMap<String, String>,
    whitelist: HashSet<String>,
}

impl IntegratorDirectory {
    pub fn from_integrators(integrators: impl IntoIterator<Item = Integrator>) -> Self {
        let mut directory = Self::default();
        for integrator in integrators {
            for key in &integrator.api_keys {
                directory
                    .key_to_id
                    .insert(key.clone(), integrator.integrator_id.clone());
                directory.whitelist.insert(key.clone());
            }
            directory
                .by_id
                .insert(integrator.integrator_id.clone(), integrator);
        }
        directory
    }

    pub fn get_integrator_by_id(&self, integrator_id: &str) -> Option<&Integrator> {
        self.by_id.get(integrator_id)
    }

    pub fn integrator_id_for_api_key(&self, api_key: &str) -> Option<&str> {
        self.key_to_id.get(api_key).map(String::as_str)
    }

    pub fn api_key_whitelist(&self) -> &HashSet<String> {
        &self.whitelist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfq_core::ChainId;

    fn sample() -> IntegratorDirectory {
        IntegratorDirectory::from_integrators([Integrator {
            integrator_id: "uuid-integrator-id".to_string(),
            label: "Polygon Swap Machine".to_string(),
            api_keys: HashSet::from(["test-api-key".to_string()]),
            allowed_chain_ids: vec![ChainId::new(1337)],
            rfqm: true,
            plp: false,
        }])
    }

    #[test]
    fn test_lookup_by_id_and_key() {
        let directory = sample();
        assert!(directory.get_integrator_by_id("uuid-integrator-id").is_some());
        assert!(directory.get_integrator_by_id("uuid-ghost").is_none());
        assert_eq!(
            directory.integrator_id_for_api_key("test-api-key"),
            Some("uuid-integrator-id")
        );
        assert!(directory.api_key_whitelist().contains("test-api-key"));
        assert!(!directory.api_key_whitelist().contains("other-key"));
    }
}
