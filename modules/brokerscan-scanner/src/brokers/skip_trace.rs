// Skip-trace API broker: name search, then a details lookup for the first
// match so the primary record carries phones and emails.

use async_trait::async_trait;
use brokerscan_common::{BrokerDescriptor, BrokerFindings, Confidence, ScanError, SearchQuery};
use skiptrace_client::{SkipTraceClient, SkipTraceError};
use tracing::{debug, warn};

use super::BrokerStrategy;
use crate::normalize::{findings_from_items, SKIP_TRACE_FIELDS};

/// Keys a search result may carry its person id under.
const PERSON_ID_KEYS: &[&str] = &["Person_ID", "person_id", "tahoe_id"];

pub struct SkipTraceBroker {
    client: Option<SkipTraceClient>,
}

impl SkipTraceBroker {
    pub fn new(client: SkipTraceClient) -> Self {
        Self { client: Some(client) }
    }

    /// No credentials: every search fails with a configuration error.
    pub fn unconfigured() -> Self {
        Self { client: None }
    }

    pub fn from_config(api_key: Option<&str>, host: &str) -> Result<Self, ScanError> {
        match api_key {
            Some(key) => Ok(Self::new(SkipTraceClient::new(key, host).map_err(transport)?)),
            None => Ok(Self::unconfigured()),
        }
    }
}

#[async_trait]
impl BrokerStrategy for SkipTraceBroker {
    async fn search(
        &self,
        broker: &BrokerDescriptor,
        query: &SearchQuery,
    ) -> Result<BrokerFindings, ScanError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ScanError::Config("SKIPTRACE_API_KEY is not set".to_string()))?;

        let mut people = client
            .search_by_name(query.name(), query.address.as_deref())
            .await
            .map_err(transport)?;

        if people.is_empty() {
            if let Some(phone) = query.phone.as_deref() {
                debug!(broker = %broker.name, "No name match, retrying by phone");
                people = client.search_by_phone(phone).await.map_err(transport)?;
            }
        }
        if people.is_empty() {
            if let Some(email) = query.email.as_deref() {
                debug!(broker = %broker.name, "No name match, retrying by email");
                people = client.search_by_email(email).await.map_err(transport)?;
            }
        }

        let person_id = people.first().and_then(|first| {
            PERSON_ID_KEYS
                .iter()
                .find_map(|key| first.get(*key).and_then(|v| v.as_str()))
                .map(String::from)
        });
        if let Some(id) = person_id {
            match client.person_details(&id).await {
                Ok(Some(profile)) => {
                    // Same-key detail values replace the summary's. Keys the summary
                    // lacks are added; extraction order still decides which one maps.
                    people[0].extend(profile);
                }
                Ok(None) => debug!(broker = %broker.name, person_id = %id, "No detail profile"),
                Err(e) => warn!(
                    broker = %broker.name,
                    error = %e,
                    "Detail lookup failed, keeping summary"
                ),
            }
        }

        Ok(findings_from_items(
            &broker.name,
            query.name(),
            &people,
            &SKIP_TRACE_FIELDS,
            Confidence::High,
        ))
    }
}

fn transport(err: SkipTraceError) -> ScanError {
    ScanError::Transport(err.to_string())
}
