// Test mocks for the scanner.
//
// - MockBroker (BrokerStrategy): per-broker scripted behavior, call log,
//   in-flight tracking
// - CountingCooldown (Cooldown): counts pauses, never sleeps
//
// Plus roster builders.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use brokerscan_common::{
    BrokerDescriptor, BrokerFindings, Confidence, RawBrokerItem, RiskLevel, ScanError, SearchQuery,
};

use crate::brokers::{BrokerRegistry, BrokerStrategy};
use crate::normalize::{findings_from_items, GENERIC_FIELDS};
use crate::orchestrator::{BatchScanOrchestrator, Cooldown, ScanPacing};

// ---------------------------------------------------------------------------
// MockBroker
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum Script {
    Items(Vec<RawBrokerItem>),
    Fail(String),
    Panic,
}

/// Scripted strategy. Unscripted brokers succeed with no data.
/// Builder pattern: `.on_items()`, `.on_failure()`, `.on_panic()`, `.with_delay()`.
#[derive(Default)]
pub struct MockBroker {
    scripts: HashMap<String, Script>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_items(mut self, broker: &str, items: Vec<serde_json::Value>) -> Self {
        let items = items
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        self.scripts.insert(broker.to_string(), Script::Items(items));
        self
    }

    pub fn on_failure(mut self, broker: &str, message: &str) -> Self {
        self.scripts
            .insert(broker.to_string(), Script::Fail(message.to_string()));
        self
    }

    pub fn on_panic(mut self, broker: &str) -> Self {
        self.scripts.insert(broker.to_string(), Script::Panic);
        self
    }

    pub fn with_delay(mut self, broker: &str, delay: Duration) -> Self {
        self.delays.insert(broker.to_string(), delay);
        self
    }

    /// Broker names in the order their calls started.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrokerStrategy for MockBroker {
    async fn search(
        &self,
        broker: &BrokerDescriptor,
        query: &SearchQuery,
    ) -> Result<BrokerFindings, ScanError> {
        self.calls.lock().unwrap().push(broker.name.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Yield so siblings in the same batch get to start.
        tokio::task::yield_now().await;
        if let Some(delay) = self.delays.get(&broker.name) {
            tokio::time::sleep(*delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.scripts.get(&broker.name).cloned() {
            Some(Script::Fail(message)) => Err(ScanError::Transport(message)),
            Some(Script::Panic) => panic!("scripted panic for {}", broker.name),
            Some(Script::Items(items)) => Ok(findings_from_items(
                &broker.name,
                query.name(),
                &items,
                &GENERIC_FIELDS,
                Confidence::Medium,
            )),
            None => Ok(findings_from_items(
                &broker.name,
                query.name(),
                &[],
                &GENERIC_FIELDS,
                Confidence::Medium,
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// CountingCooldown
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct CountingCooldown {
    waits: Mutex<Vec<Duration>>,
}

impl CountingCooldown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.waits.lock().unwrap().len()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Cooldown for CountingCooldown {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn broker(name: &str, risk_level: RiskLevel, priority: u8) -> BrokerDescriptor {
    let url = format!("https://{}.test", name.to_lowercase());
    BrokerDescriptor::new(name, &url, risk_level, priority)
}

/// `n` high-risk, priority-1 brokers named "Broker 1".."Broker n".
pub fn roster_of(n: usize) -> Vec<BrokerDescriptor> {
    (1..=n)
        .map(|i| broker(&format!("Broker {i}"), RiskLevel::High, 1))
        .collect()
}

/// Orchestrator routing every broker to `mock`, with `cooldown` observing pauses.
pub fn orchestrator_with(
    roster: Vec<BrokerDescriptor>,
    mock: Arc<MockBroker>,
    cooldown: Arc<CountingCooldown>,
) -> BatchScanOrchestrator {
    BatchScanOrchestrator::new(roster, BrokerRegistry::new(mock))
        .with_pacing(ScanPacing {
            batch_cooldown: Duration::from_millis(2000),
            call_timeout: Duration::from_secs(5),
        })
        .with_cooldown(cooldown)
}
