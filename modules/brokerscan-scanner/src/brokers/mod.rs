// Broker strategies. Each strategy knows how to search one kind of source and
// hand back normalized findings. The registry maps broker names to strategies;
// unregistered names fall through to the fallback strategy.

pub mod people_search;
pub mod simulated;
pub mod skip_trace;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use brokerscan_common::roster::{PEOPLE_SEARCH, SKIP_TRACE};
use brokerscan_common::{BrokerDescriptor, BrokerFindings, Config, ScanError, SearchQuery};

use crate::likelihood::MatchLikelihoodProvider;

pub use people_search::PeopleSearchBroker;
pub use simulated::SimulatedBroker;
pub use skip_trace::SkipTraceBroker;

#[async_trait]
pub trait BrokerStrategy: Send + Sync {
    /// "No data" is `Ok` with empty findings. `Err` is reserved for transport
    /// and configuration failures.
    async fn search(
        &self,
        broker: &BrokerDescriptor,
        query: &SearchQuery,
    ) -> Result<BrokerFindings, ScanError>;
}

#[derive(Clone)]
pub struct BrokerRegistry {
    strategies: HashMap<String, Arc<dyn BrokerStrategy>>,
    fallback: Arc<dyn BrokerStrategy>,
}

impl BrokerRegistry {
    pub fn new(fallback: Arc<dyn BrokerStrategy>) -> Self {
        Self {
            strategies: HashMap::new(),
            fallback,
        }
    }

    /// Registering a name twice replaces the earlier strategy.
    pub fn register(mut self, broker_name: &str, strategy: Arc<dyn BrokerStrategy>) -> Self {
        self.strategies.insert(broker_name.to_lowercase(), strategy);
        self
    }

    pub fn resolve(&self, broker_name: &str) -> Arc<dyn BrokerStrategy> {
        self.strategies
            .get(&broker_name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn is_registered(&self, broker_name: &str) -> bool {
        self.strategies.contains_key(&broker_name.to_lowercase())
    }
}

/// API-backed brokers registered by name, everything else simulated.
/// Missing credentials do not fail here; the affected broker fails at scan time.
pub fn registry_from_config(
    config: &Config,
    likelihood: Arc<dyn MatchLikelihoodProvider>,
) -> Result<BrokerRegistry, ScanError> {
    let skip_trace = SkipTraceBroker::from_config(
        config.skiptrace_api_key.as_deref(),
        &config.skiptrace_api_host,
    )?;
    let people_search = PeopleSearchBroker::from_config(
        config.apify_api_key.as_deref(),
        config.people_search_actor_id.as_deref(),
        config.broker_timeout,
    );

    Ok(BrokerRegistry::new(Arc::new(SimulatedBroker::new(likelihood)))
        .register(SKIP_TRACE, Arc::new(skip_trace))
        .register(PEOPLE_SEARCH, Arc::new(people_search)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokerscan_common::{Confidence, Details, RiskLevel};

    struct Fixed(&'static str);

    #[async_trait]
    impl BrokerStrategy for Fixed {
        async fn search(
            &self,
            _: &BrokerDescriptor,
            _: &SearchQuery,
        ) -> Result<BrokerFindings, ScanError> {
            Ok(BrokerFindings {
                success: true,
                data_found: vec![],
                description: self.0.to_string(),
                details: Details::new(),
                confidence: Confidence::Low,
            })
        }
    }

    #[tokio::test]
    async fn resolves_registered_then_fallback() {
        let registry = BrokerRegistry::new(Arc::new(Fixed("fallback")))
            .register("Skip Trace", Arc::new(Fixed("skip")));
        let broker = BrokerDescriptor::new("x", "https://x.test", RiskLevel::Low, 1);
        let query = SearchQuery::new("Jane Doe");

        let hit = registry.resolve("skip trace").search(&broker, &query).await.unwrap();
        let miss = registry.resolve("Spokeo").search(&broker, &query).await.unwrap();

        assert_eq!(hit.description, "skip");
        assert_eq!(miss.description, "fallback");
        assert!(registry.is_registered("SKIP TRACE"));
        assert!(!registry.is_registered("Spokeo"));
    }

    #[test]
    fn config_registry_wires_api_brokers() {
        let config = Config::from_lookup(|_| None).unwrap();
        let registry =
            registry_from_config(&config, Arc::new(crate::likelihood::HashedLikelihood)).unwrap();
        assert!(registry.is_registered(SKIP_TRACE));
        assert!(registry.is_registered(PEOPLE_SEARCH));
        assert!(!registry.is_registered("Spokeo"));
    }
}
