pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{PeopleSearchInput, PersonRecord, RunData, RunState};

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Longest long-poll the platform accepts for `waitForFinish`.
const MAX_WAIT_SECS: u64 = 60;

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at another API root (self-hosted proxy, test server).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize>(&self, actor_id: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes or `budget` runs out. Each poll long-waits
    /// on the server for the whole seconds left in the budget (between 1 and
    /// 60), so the last poll can overrun by under a second.
    pub async fn wait_for_run(&self, run_id: &str, budget: Duration) -> Result<RunData> {
        let started = Instant::now();
        let mut polls = 0;

        loop {
            let remaining = budget.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                return Err(ApifyError::RunStalled {
                    run_id: run_id.to_string(),
                    polls,
                });
            }
            let wait_secs = remaining.as_secs().clamp(1, MAX_WAIT_SECS);
            polls += 1;

            let url = format!(
                "{}/actor-runs/{}?waitForFinish={}",
                self.base_url, run_id, wait_secs
            );
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ApifyError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let api_resp: ApiResponse<RunData> = resp.json().await?;
            match api_resp.data.state() {
                RunState::Succeeded => return Ok(api_resp.data),
                RunState::Failed => {
                    return Err(ApifyError::RunFailed {
                        run_id: run_id.to_string(),
                        status: api_resp.data.status,
                    });
                }
                RunState::Running => {
                    tracing::debug!(
                        run_id,
                        polls,
                        status = %api_resp.data.status,
                        "Run still in progress"
                    );
                }
            }
        }
    }

    /// Stop a run that is still going. The platform keeps billing until it ends.
    pub async fn abort_run(&self, run_id: &str) -> Result<()> {
        let url = format!("{}/actor-runs/{}/abort", self.base_url, run_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json", self.base_url, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    /// Run a people-search actor end-to-end: start run, poll, fetch results.
    /// A run that fails to finish within `budget` is aborted before the error
    /// is returned.
    pub async fn search_people(
        &self,
        actor_id: &str,
        input: &PeopleSearchInput,
        budget: Duration,
    ) -> Result<Vec<PersonRecord>> {
        tracing::info!(
            actor_id,
            max_results = input.max_results,
            budget_secs = budget.as_secs(),
            "Starting people-search run"
        );

        let run = self.start_run(actor_id, input).await?;
        tracing::info!(run_id = %run.id, "Apify run started, polling for completion");

        let completed = match self.wait_for_run(&run.id, budget).await {
            Ok(completed) => completed,
            Err(e) => {
                if !matches!(e, ApifyError::RunFailed { .. }) {
                    match self.abort_run(&run.id).await {
                        Ok(()) => tracing::info!(run_id = %run.id, "Aborted unfinished run"),
                        Err(abort_err) => tracing::warn!(
                            run_id = %run.id,
                            error = %abort_err,
                            "Failed to abort unfinished run"
                        ),
                    }
                }
                return Err(e);
            }
        };
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        let people: Vec<PersonRecord> = self
            .get_dataset_items(&completed.default_dataset_id)
            .await?;
        tracing::info!(count = people.len(), "Fetched people-search records");

        Ok(people)
    }
}
