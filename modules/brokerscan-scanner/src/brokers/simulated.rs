// Placeholder broker for sites without an API integration.
//
// The likelihood provider decides whether the subject is listed. A listed
// subject gets one synthesized raw item covering only the data types the
// broker is known to expose, and that item runs through the same
// normalization pipeline as real API data.

use std::sync::Arc;

use async_trait::async_trait;
use brokerscan_common::{
    BrokerDescriptor, BrokerFindings, Confidence, RawBrokerItem, RiskLevel, ScanError, SearchQuery,
};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::BrokerStrategy;
use crate::likelihood::MatchLikelihoodProvider;
use crate::normalize::{findings_from_items, GENERIC_FIELDS};

pub struct SimulatedBroker {
    likelihood: Arc<dyn MatchLikelihoodProvider>,
}

impl SimulatedBroker {
    pub fn new(likelihood: Arc<dyn MatchLikelihoodProvider>) -> Self {
        Self { likelihood }
    }
}

#[async_trait]
impl BrokerStrategy for SimulatedBroker {
    async fn search(
        &self,
        broker: &BrokerDescriptor,
        query: &SearchQuery,
    ) -> Result<BrokerFindings, ScanError> {
        let probability = self.likelihood.base_probability(broker);
        let listed = self.likelihood.should_show_results(query.name(), probability);
        tracing::debug!(broker = %broker.name, probability, listed, "Simulated lookup");

        let items = if listed {
            vec![synthesize(broker, query)]
        } else {
            Vec::new()
        };

        Ok(findings_from_items(
            &broker.name,
            query.name(),
            &items,
            &GENERIC_FIELDS,
            confidence_for(broker.risk_level),
        ))
    }
}

pub fn confidence_for(risk: RiskLevel) -> Confidence {
    match risk {
        RiskLevel::High | RiskLevel::Medium => Confidence::Medium,
        RiskLevel::Low => Confidence::Low,
    }
}

/// Deterministic placeholder record. Values the caller supplied are echoed;
/// anything else is masked.
fn synthesize(broker: &BrokerDescriptor, query: &SearchQuery) -> RawBrokerItem {
    let key = format!("{}|{}", broker.name, query.name().to_lowercase());
    let seed = Sha256::digest(key.as_bytes());
    let mut item = RawBrokerItem::new();

    if broker.exposes("Name") {
        item.insert("Name".into(), Value::from(query.name()));
    }
    if broker.exposes("Age") {
        item.insert("Age".into(), Value::from(25 + u64::from(seed[0]) % 50));
    }
    if broker.exposes("Address") {
        match query.address.as_deref() {
            Some(address) => item.insert("Address".into(), Value::from(address)),
            None => item.insert("Lives in".into(), Value::from("Address on file")),
        };
    }
    if broker.exposes("Phone") {
        let phone = query.phone.clone().unwrap_or_else(|| {
            let last4 = u16::from_be_bytes([seed[1], seed[2]]) % 10_000;
            format!("(***) ***-{last4:04}")
        });
        item.insert("Phone".into(), Value::from(phone));
    }
    if broker.exposes("Email") {
        let email = query.email.clone().unwrap_or_else(|| {
            let initial = query.name().chars().next().unwrap_or('*').to_ascii_lowercase();
            format!("{initial}***@***.com")
        });
        item.insert("Email".into(), Value::from(email));
    }
    if broker.exposes("Relatives") {
        let count = 1 + seed[3] % 4;
        item.insert("Related to".into(), Value::from(format!("{count} possible relatives")));
    }
    if broker.exposes("Associates") {
        let count = 1 + seed[4] % 6;
        item.insert(
            "Associated persons".into(),
            Value::from(format!("{count} possible associates")),
        );
    }

    item
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Always(bool);

    impl MatchLikelihoodProvider for Always {
        fn base_probability(&self, _: &BrokerDescriptor) -> f64 {
            0.5
        }
        fn should_show_results(&self, _: &str, _: f64) -> bool {
            self.0
        }
    }

    fn spokeo() -> BrokerDescriptor {
        BrokerDescriptor::new("Spokeo", "https://www.spokeo.com", RiskLevel::High, 1)
            .with_data_types(&["Name", "Age", "Phone"])
    }

    #[tokio::test]
    async fn listed_subject_gets_only_exposed_types() {
        let broker = SimulatedBroker::new(Arc::new(Always(true)));
        let query = SearchQuery::new("Jane Doe").with_phone("555-0100");
        let findings = broker.search(&spokeo(), &query).await.unwrap();

        assert_eq!(findings.data_found, vec!["Name", "Age", "Phone"]);
        assert_eq!(findings.details["name"], "Jane Doe");
        assert_eq!(findings.details["phone"], "555-0100");
        assert_eq!(findings.confidence, Confidence::Medium);
    }

    #[tokio::test]
    async fn unlisted_subject_gets_no_match_description() {
        let broker = SimulatedBroker::new(Arc::new(Always(false)));
        let findings = broker.search(&spokeo(), &SearchQuery::new("Jane Doe")).await.unwrap();

        assert!(findings.success);
        assert!(findings.data_found.is_empty());
        assert!(findings.description.ends_with("found no matching records for Jane Doe"));
    }

    #[tokio::test]
    async fn synthesized_values_are_stable() {
        let broker = SimulatedBroker::new(Arc::new(Always(true)));
        let query = SearchQuery::new("Jane Doe");
        let a = broker.search(&spokeo(), &query).await.unwrap();
        let b = broker.search(&spokeo(), &query).await.unwrap();
        assert_eq!(a.details["age"], b.details["age"]);
        assert_eq!(a.details["phone"], b.details["phone"]);
    }

    #[test]
    fn low_risk_brokers_report_low_confidence() {
        assert_eq!(confidence_for(RiskLevel::Low), Confidence::Low);
        assert_eq!(confidence_for(RiskLevel::High), Confidence::Medium);
    }
}
