//! Batch scan behavior with scripted brokers.
//!
//! Every broker routes to a `MockBroker`; `CountingCooldown` records the
//! inter-batch pauses instead of sleeping, so these run in milliseconds.

use std::sync::Arc;
use std::time::Duration;

use brokerscan_common::{RiskLevel, ScanError, ScanOptions, SearchQuery};
use brokerscan_scanner::testing::{
    broker, orchestrator_with, roster_of, CountingCooldown, MockBroker,
};
use brokerscan_scanner::{BatchScanOrchestrator, BrokerRegistry, ScanPacing};
use serde_json::json;

fn jane() -> SearchQuery {
    SearchQuery::new("Jane Doe")
}

fn options(priority: u8, batch_size: usize) -> ScanOptions {
    ScanOptions { priority, batch_size }
}

// =========================================================================
// Validation
// =========================================================================

#[tokio::test]
async fn blank_name_fails_before_any_broker_is_called() {
    let mock = Arc::new(MockBroker::new());
    let orchestrator =
        orchestrator_with(roster_of(3), mock.clone(), Arc::new(CountingCooldown::new()));

    let err = orchestrator
        .scan(&SearchQuery::new("  "), ScanOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::Validation(_)));
    assert!(mock.calls().is_empty());
}

// =========================================================================
// Failure isolation
// =========================================================================

#[tokio::test]
async fn one_failing_broker_does_not_sink_the_batch() {
    let mock = Arc::new(MockBroker::new().on_failure("Broker 4", "503 Service Unavailable"));
    let orchestrator =
        orchestrator_with(roster_of(7), mock.clone(), Arc::new(CountingCooldown::new()));

    let summary = orchestrator.scan(&jane(), options(3, 5)).await.unwrap();

    assert_eq!(summary.total_scanned, 7);
    assert_eq!(summary.successful_scans, 6);
    assert_eq!(summary.failed_scans(), 1);

    let failed: Vec<_> = summary.results.iter().filter(|r| !r.success).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].broker, "Broker 4");
    assert!(failed[0].data_found.is_empty());
    assert!(failed[0].error.as_deref().unwrap().contains("503"));
}

#[tokio::test]
async fn panicking_broker_becomes_failed_result() {
    let mock = Arc::new(MockBroker::new().on_panic("Broker 2"));
    let orchestrator = orchestrator_with(roster_of(3), mock, Arc::new(CountingCooldown::new()));

    let summary = orchestrator.scan(&jane(), options(3, 5)).await.unwrap();

    assert_eq!(summary.total_scanned, 3);
    assert_eq!(summary.successful_scans, 2);
    let failed = summary.result_for("Broker 2").unwrap();
    assert!(!failed.success);
    assert!(failed.error.as_deref().unwrap().contains("panicked"));
}

#[tokio::test]
async fn slow_broker_times_out_as_ordinary_failure() {
    let mock = Arc::new(MockBroker::new().with_delay("Broker 1", Duration::from_secs(10)));
    let orchestrator = BatchScanOrchestrator::new(roster_of(2), BrokerRegistry::new(mock))
        .with_pacing(ScanPacing {
            batch_cooldown: Duration::ZERO,
            call_timeout: Duration::from_millis(50),
        });

    let summary = orchestrator.scan(&jane(), options(3, 5)).await.unwrap();

    assert_eq!(summary.successful_scans, 1);
    let slow = summary.result_for("Broker 1").unwrap();
    assert!(!slow.success);
    assert!(slow.error.as_deref().unwrap().contains("timed out"));
    assert!(summary.result_for("Broker 2").unwrap().success);
}

// =========================================================================
// Roster selection and batching
// =========================================================================

#[tokio::test]
async fn priority_ceiling_filters_roster() {
    let roster = vec![
        broker("A", RiskLevel::High, 1),
        broker("B", RiskLevel::High, 1),
        broker("C", RiskLevel::Medium, 2),
        broker("D", RiskLevel::Medium, 2),
        broker("E", RiskLevel::Medium, 2),
        broker("F", RiskLevel::Low, 3),
        broker("G", RiskLevel::Low, 3),
    ];
    let mock = Arc::new(MockBroker::new());
    let orchestrator = orchestrator_with(roster, mock.clone(), Arc::new(CountingCooldown::new()));

    let summary = orchestrator.scan(&jane(), options(2, 5)).await.unwrap();

    assert_eq!(summary.total_scanned, 5);
    assert_eq!(mock.calls(), vec!["A", "B", "C", "D", "E"]);
}

#[tokio::test]
async fn cooldown_runs_between_batches_only() {
    let cooldown = Arc::new(CountingCooldown::new());
    let orchestrator =
        orchestrator_with(roster_of(3), Arc::new(MockBroker::new()), cooldown.clone());

    orchestrator.scan(&jane(), options(3, 1)).await.unwrap();

    assert_eq!(cooldown.count(), 2);
    assert!(cooldown.waits().iter().all(|d| *d == Duration::from_millis(2000)));
}

#[tokio::test]
async fn single_batch_never_cools_down() {
    let cooldown = Arc::new(CountingCooldown::new());
    let orchestrator =
        orchestrator_with(roster_of(5), Arc::new(MockBroker::new()), cooldown.clone());

    orchestrator.scan(&jane(), options(3, 5)).await.unwrap();

    assert_eq!(cooldown.count(), 0);
}

#[tokio::test]
async fn brokers_in_a_batch_run_together_but_batches_do_not_overlap() {
    let mock = Arc::new(MockBroker::new());
    let orchestrator =
        orchestrator_with(roster_of(7), mock.clone(), Arc::new(CountingCooldown::new()));

    orchestrator.scan(&jane(), options(3, 3)).await.unwrap();

    assert_eq!(mock.calls().len(), 7);
    assert_eq!(mock.max_in_flight(), 3);
}

#[tokio::test]
async fn results_keep_roster_order_not_completion_order() {
    let mock = Arc::new(
        MockBroker::new()
            .with_delay("Broker 1", Duration::from_millis(40))
            .with_delay("Broker 2", Duration::from_millis(20)),
    );
    let orchestrator = orchestrator_with(roster_of(4), mock, Arc::new(CountingCooldown::new()));

    let summary = orchestrator.scan(&jane(), options(3, 3)).await.unwrap();

    let order: Vec<_> = summary.results.iter().map(|r| r.broker.as_str()).collect();
    assert_eq!(order, vec!["Broker 1", "Broker 2", "Broker 3", "Broker 4"]);
}

#[tokio::test]
async fn zero_batch_size_is_treated_as_one() {
    let cooldown = Arc::new(CountingCooldown::new());
    let orchestrator =
        orchestrator_with(roster_of(2), Arc::new(MockBroker::new()), cooldown.clone());

    let summary = orchestrator.scan(&jane(), options(3, 0)).await.unwrap();

    assert_eq!(summary.total_scanned, 2);
    assert_eq!(cooldown.count(), 1);
}

#[tokio::test]
async fn empty_selection_returns_empty_summary() {
    let orchestrator = orchestrator_with(
        vec![broker("Deep", RiskLevel::Low, 3)],
        Arc::new(MockBroker::new()),
        Arc::new(CountingCooldown::new()),
    );

    let summary = orchestrator.scan(&jane(), options(1, 5)).await.unwrap();

    assert_eq!(summary.total_scanned, 0);
    assert!(summary.results.is_empty());
}

// =========================================================================
// Aggregation
// =========================================================================

#[tokio::test]
async fn summary_counts_data_points_and_risk_tiers() {
    let roster = vec![
        broker("Spokeo", RiskLevel::High, 1),
        broker("MyLife", RiskLevel::Medium, 1),
        broker("Nuwber", RiskLevel::Low, 1),
        broker("Radaris", RiskLevel::High, 1),
    ];
    let mock = Arc::new(
        MockBroker::new()
            .on_items("Spokeo", vec![json!({ "Name": "Jane Doe", "Age": 34, "phone": "555-0100" })])
            .on_items("MyLife", vec![json!({ "Name": "Jane Doe" })])
            .on_items("Nuwber", vec![])
            .on_failure("Radaris", "connection reset"),
    );
    let orchestrator = orchestrator_with(roster, mock, Arc::new(CountingCooldown::new()));

    let summary = orchestrator.scan(&jane(), options(3, 2)).await.unwrap();

    assert_eq!(summary.total_scanned, 4);
    assert_eq!(summary.successful_scans, 3);
    assert_eq!(summary.brokers_with_data, 2);
    assert_eq!(summary.total_data_points, 4);
    assert_eq!(summary.risk_tier_counts.high, 1);
    assert_eq!(summary.risk_tier_counts.medium, 1);
    assert_eq!(summary.risk_tier_counts.low, 0);

    let nuwber = summary.result_for("Nuwber").unwrap();
    assert!(nuwber.success);
    assert!(nuwber.data_found.is_empty());
}

// =========================================================================
// End to end
// =========================================================================

#[tokio::test]
async fn example_broker_record_is_normalized_end_to_end() {
    let mock = Arc::new(MockBroker::new().on_items(
        "ExampleBroker",
        vec![json!({ "First Name": "Jane", "Last Name": "Doe", "Age": 34 })],
    ));
    let orchestrator = orchestrator_with(
        vec![broker("ExampleBroker", RiskLevel::Medium, 1)],
        mock,
        Arc::new(CountingCooldown::new()),
    );

    let summary = orchestrator.scan(&jane(), ScanOptions::default()).await.unwrap();
    let result = summary.result_for("ExampleBroker").unwrap();

    assert!(result.data_found.contains(&"Name".to_string()));
    assert!(result.data_found.contains(&"Age".to_string()));
    assert_eq!(result.details["name"], "Jane Doe");
    assert_eq!(result.details["age"], 34);
    assert!(result.description.contains("2 data categories"));
}

#[tokio::test]
async fn empty_broker_response_is_success_without_data() {
    let mock = Arc::new(MockBroker::new().on_items("ExampleBroker", vec![]));
    let orchestrator = orchestrator_with(
        vec![broker("ExampleBroker", RiskLevel::Medium, 1)],
        mock,
        Arc::new(CountingCooldown::new()),
    );

    let summary = orchestrator.scan(&jane(), ScanOptions::default()).await.unwrap();
    let result = summary.result_for("ExampleBroker").unwrap();

    assert!(result.success);
    assert!(result.data_found.is_empty());
    assert!(result
        .description
        .ends_with("found no matching records for Jane Doe"));
}

// =========================================================================
// Default wiring
// =========================================================================

#[tokio::test]
async fn unconfigured_api_brokers_fail_alone() {
    use brokerscan_common::roster::{PEOPLE_SEARCH, SKIP_TRACE};
    use brokerscan_common::{default_roster, Config};
    use brokerscan_scanner::{registry_from_config, HashedLikelihood};

    let config = Config::from_lookup(|_| None).unwrap();
    let registry = registry_from_config(&config, Arc::new(HashedLikelihood)).unwrap();
    let cooldown = Arc::new(CountingCooldown::new());
    let orchestrator =
        BatchScanOrchestrator::new(default_roster(), registry).with_cooldown(cooldown.clone());

    let first = orchestrator.scan(&jane(), options(1, 5)).await.unwrap();
    let second = orchestrator.scan(&jane(), options(1, 5)).await.unwrap();

    assert_eq!(first.total_scanned, 5);
    assert_eq!(first.successful_scans, 3);
    let skip_trace = first.result_for(SKIP_TRACE).unwrap();
    assert!(skip_trace.error.as_deref().unwrap().contains("SKIPTRACE_API_KEY"));
    assert!(!first.result_for(PEOPLE_SEARCH).unwrap().success);

    // Simulated brokers answer the same way for the same name.
    let found = |s: &brokerscan_common::ScanSummary| -> Vec<Vec<String>> {
        s.results.iter().map(|r| r.data_found.clone()).collect()
    };
    assert_eq!(found(&first), found(&second));
    assert_eq!(cooldown.count(), 0);
}
