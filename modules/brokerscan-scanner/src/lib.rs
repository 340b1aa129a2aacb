pub mod brokers;
pub mod likelihood;
pub mod normalize;
pub mod orchestrator;
pub mod quick;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use brokers::{registry_from_config, BrokerRegistry, BrokerStrategy};
pub use likelihood::{HashedLikelihood, MatchLikelihoodProvider};
pub use orchestrator::{BatchScanOrchestrator, Cooldown, ScanPacing, TokioCooldown};
pub use quick::normalize_one;
