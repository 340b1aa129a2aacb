// Match likelihood for brokers we cannot query directly.
//
// `HashedLikelihood` is a stand-in for a real lookup: it hashes the subject's
// name into [0, 1) and shows a match when that falls under the broker's base
// probability. Same name, same answer, every scan.

use brokerscan_common::{BrokerDescriptor, RiskLevel};
use sha2::{Digest, Sha256};

pub trait MatchLikelihoodProvider: Send + Sync {
    /// Probability in [0, 1] that `broker` lists someone.
    fn base_probability(&self, broker: &BrokerDescriptor) -> f64;

    /// Whether `full_name` should be treated as listed at that probability.
    fn should_show_results(&self, full_name: &str, base_probability: f64) -> bool;
}

/// Per-broker overrides for well-known large brokers.
const BROKER_OVERRIDES: &[(&str, f64)] = &[
    ("Spokeo", 0.85),
    ("Whitepages", 0.80),
    ("BeenVerified", 0.80),
    ("Intelius", 0.75),
    ("Radaris", 0.70),
    ("MyLife", 0.65),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct HashedLikelihood;

impl HashedLikelihood {
    /// Case- and whitespace-insensitive hash of a name into [0, 1).
    pub fn name_hash(full_name: &str) -> f64 {
        let canonical = full_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let digest = Sha256::digest(canonical.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        // Top 53 bits give an exact f64 in [0, 1).
        (u64::from_be_bytes(head) >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl MatchLikelihoodProvider for HashedLikelihood {
    fn base_probability(&self, broker: &BrokerDescriptor) -> f64 {
        if let Some((_, p)) = BROKER_OVERRIDES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&broker.name))
        {
            return *p;
        }
        match broker.risk_level {
            RiskLevel::High => 0.75,
            RiskLevel::Medium => 0.60,
            RiskLevel::Low => 0.40,
        }
    }

    fn should_show_results(&self, full_name: &str, base_probability: f64) -> bool {
        Self::name_hash(full_name) < base_probability
    }
}
