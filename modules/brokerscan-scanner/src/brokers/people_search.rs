// People-search broker backed by an Apify actor run.

use std::time::Duration;

use apify_client::{ApifyClient, ApifyError, PeopleSearchInput};
use async_trait::async_trait;
use brokerscan_common::{BrokerDescriptor, BrokerFindings, Confidence, ScanError, SearchQuery};

use super::BrokerStrategy;
use crate::normalize::{findings_from_items, PEOPLE_SEARCH_FIELDS};

const MAX_RESULTS: u32 = 10;

/// How long an actor run may take inside one broker call. The rest of the
/// call timeout is left for the abort and the dataset fetch.
pub fn run_budget(call_timeout: Duration) -> Duration {
    call_timeout * 4 / 5
}

pub struct PeopleSearchBroker {
    client: Option<(ApifyClient, String)>,
    run_budget: Duration,
}

impl PeopleSearchBroker {
    pub fn new(client: ApifyClient, actor_id: &str, run_budget: Duration) -> Self {
        Self {
            client: Some((client, actor_id.to_string())),
            run_budget,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            client: None,
            run_budget: Duration::ZERO,
        }
    }

    /// Both the API token and the actor id are needed to run a search.
    pub fn from_config(
        api_key: Option<&str>,
        actor_id: Option<&str>,
        call_timeout: Duration,
    ) -> Self {
        match (api_key, actor_id) {
            (Some(key), Some(actor)) => Self::new(
                ApifyClient::new(key.to_string()),
                actor,
                run_budget(call_timeout),
            ),
            _ => Self::unconfigured(),
        }
    }
}

#[async_trait]
impl BrokerStrategy for PeopleSearchBroker {
    async fn search(
        &self,
        broker: &BrokerDescriptor,
        query: &SearchQuery,
    ) -> Result<BrokerFindings, ScanError> {
        let (client, actor_id) = self.client.as_ref().ok_or_else(|| {
            ScanError::Config(
                "APIFY_API_KEY and PEOPLE_SEARCH_ACTOR_ID must both be set".to_string(),
            )
        })?;

        let input = PeopleSearchInput {
            name: query.name().to_string(),
            phone: query.phone.clone(),
            email: query.email.clone(),
            location: query.address.clone(),
            max_results: MAX_RESULTS,
        };

        let people = client
            .search_people(actor_id, &input, self.run_budget)
            .await
            .map_err(transport)?;

        Ok(findings_from_items(
            &broker.name,
            query.name(),
            &people,
            &PEOPLE_SEARCH_FIELDS,
            Confidence::High,
        ))
    }
}

fn transport(err: ApifyError) -> ScanError {
    ScanError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokerscan_common::RiskLevel;

    #[tokio::test]
    async fn actor_id_is_required() {
        let broker =
            PeopleSearchBroker::from_config(Some("apify_api_xyz"), None, Duration::from_secs(30));
        let descriptor =
            BrokerDescriptor::new("People Search", "https://x.test", RiskLevel::High, 1);
        let err = broker
            .search(&descriptor, &SearchQuery::new("Jane Doe"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }

    #[test]
    fn run_finishes_inside_the_call_timeout() {
        let call_timeout = Duration::from_secs(30);
        assert_eq!(run_budget(call_timeout), Duration::from_secs(24));
        assert!(run_budget(call_timeout) < call_timeout);
    }
}
