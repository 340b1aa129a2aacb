// Batched scan across a broker roster.
//
// Brokers at or under the priority ceiling are split into batches of
// `batch_size`. Batches run one after another with a cooldown between them;
// brokers inside a batch run concurrently and every call settles before the
// next batch starts. A failing, timing-out, or panicking broker becomes a
// failed BrokerResult and never aborts the scan.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use brokerscan_common::{
    BrokerDescriptor, BrokerResult, RiskTierCounts, ScanError, ScanOptions, ScanSummary,
    SearchQuery,
};
use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::brokers::BrokerRegistry;

/// Pause between batches. A seam so tests can observe pauses without sleeping.
#[async_trait]
pub trait Cooldown: Send + Sync {
    async fn wait(&self, duration: Duration);
}

pub struct TokioCooldown;

#[async_trait]
impl Cooldown for TokioCooldown {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPacing {
    pub batch_cooldown: Duration,
    pub call_timeout: Duration,
}

impl Default for ScanPacing {
    fn default() -> Self {
        Self {
            batch_cooldown: Duration::from_millis(2000),
            call_timeout: Duration::from_secs(30),
        }
    }
}

pub struct BatchScanOrchestrator {
    roster: Arc<Vec<BrokerDescriptor>>,
    registry: BrokerRegistry,
    pacing: ScanPacing,
    cooldown: Arc<dyn Cooldown>,
}

impl BatchScanOrchestrator {
    pub fn new(roster: Vec<BrokerDescriptor>, registry: BrokerRegistry) -> Self {
        Self {
            roster: Arc::new(roster),
            registry,
            pacing: ScanPacing::default(),
            cooldown: Arc::new(TokioCooldown),
        }
    }

    pub fn with_pacing(mut self, pacing: ScanPacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Arc<dyn Cooldown>) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Brokers a scan with these options would contact, in roster order.
    pub fn select(&self, options: &ScanOptions) -> Vec<&BrokerDescriptor> {
        self.roster
            .iter()
            .filter(|b| b.priority <= options.priority)
            .collect()
    }

    /// Fails only on an invalid query; every broker failure is folded into the summary.
    pub async fn scan(
        &self,
        query: &SearchQuery,
        options: ScanOptions,
    ) -> Result<ScanSummary, ScanError> {
        query.validate()?;

        let scan_id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = Instant::now();

        let selected = self.select(&options);
        let batch_size = options.batch_size.max(1);
        let batch_count = selected.len().div_ceil(batch_size);
        info!(
            %scan_id,
            brokers = selected.len(),
            batches = batch_count,
            priority = options.priority,
            "Starting broker scan"
        );

        let mut results: Vec<(&BrokerDescriptor, BrokerResult)> =
            Vec::with_capacity(selected.len());
        for (i, batch) in selected.chunks(batch_size).enumerate() {
            info!(%scan_id, batch = i + 1, of = batch_count, size = batch.len(), "Scanning batch");

            // join_all keeps positional order regardless of completion order.
            let settled =
                join_all(batch.iter().map(|broker| self.scan_broker(broker, query))).await;
            results.extend(batch.iter().copied().zip(settled));

            if i + 1 < batch_count {
                debug!(
                    %scan_id,
                    cooldown_ms = self.pacing.batch_cooldown.as_millis() as u64,
                    "Cooling down"
                );
                self.cooldown.wait(self.pacing.batch_cooldown).await;
            }
        }

        let summary = summarize(scan_id, started_at, clock.elapsed(), results);
        info!(
            %scan_id,
            scanned = summary.total_scanned,
            successful = summary.successful_scans,
            with_data = summary.brokers_with_data,
            data_points = summary.total_data_points,
            duration_ms = summary.duration_ms,
            "Broker scan complete"
        );
        Ok(summary)
    }

    async fn scan_broker(&self, broker: &BrokerDescriptor, query: &SearchQuery) -> BrokerResult {
        let strategy = self.registry.resolve(&broker.name);
        let call = AssertUnwindSafe(strategy.search(broker, query)).catch_unwind();

        let outcome = match tokio::time::timeout(self.pacing.call_timeout, call).await {
            Err(_) => Err(ScanError::Timeout(self.pacing.call_timeout.as_millis() as u64)),
            Ok(Err(panic)) => Err(ScanError::Transport(format!(
                "broker call panicked: {}",
                panic_message(panic.as_ref())
            ))),
            Ok(Ok(result)) => result,
        };

        match outcome {
            Ok(findings) => {
                debug!(
                    broker = %broker.name,
                    categories = findings.data_found.len(),
                    "Broker scanned"
                );
                BrokerResult::from_findings(&broker.name, findings)
            }
            Err(e) => {
                warn!(broker = %broker.name, error = %e, "Broker scan failed");
                BrokerResult::failed(&broker.name, &e)
            }
        }
    }
}

fn summarize(
    scan_id: Uuid,
    started_at: chrono::DateTime<Utc>,
    elapsed: Duration,
    results: Vec<(&BrokerDescriptor, BrokerResult)>,
) -> ScanSummary {
    let mut risk_tier_counts = RiskTierCounts::default();
    let mut successful_scans = 0;
    let mut brokers_with_data = 0;
    let mut total_data_points = 0;

    for (broker, result) in &results {
        if result.success {
            successful_scans += 1;
        }
        if result.has_data() {
            brokers_with_data += 1;
            risk_tier_counts.record(broker.risk_level);
        }
        total_data_points += result.data_found.len() as u32;
    }

    ScanSummary {
        scan_id,
        started_at,
        duration_ms: elapsed.as_millis() as u64,
        total_scanned: results.len() as u32,
        successful_scans,
        brokers_with_data,
        total_data_points,
        risk_tier_counts,
        results: results.into_iter().map(|(_, r)| r).collect(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
