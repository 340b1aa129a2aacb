// Removal-request tracking. Storage lives outside this crate; these are the
// values handed to whatever persists them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{BrokerResult, ScanSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalStatus {
    Pending,
    Submitted,
    Completed,
    Failed,
}

impl RemovalStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RemovalStatus::Completed | RemovalStatus::Failed)
    }

    pub fn can_transition_to(self, next: RemovalStatus) -> bool {
        use RemovalStatus::*;
        matches!(
            (self, next),
            (Pending, Submitted) | (Pending, Failed) | (Submitted, Completed) | (Submitted, Failed)
        )
    }
}

impl std::fmt::Display for RemovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemovalStatus::Pending => write!(f, "pending"),
            RemovalStatus::Submitted => write!(f, "submitted"),
            RemovalStatus::Completed => write!(f, "completed"),
            RemovalStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalRequest {
    pub id: Uuid,
    pub broker: String,
    pub data_found: Vec<String>,
    pub status: RemovalStatus,
    pub requested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RemovalRequest {
    /// `None` when the broker holds nothing to remove.
    pub fn for_result(result: &BrokerResult) -> Option<Self> {
        if !result.success || !result.has_data() {
            return None;
        }
        let now = Utc::now();
        Some(Self {
            id: Uuid::new_v4(),
            broker: result.broker.clone(),
            data_found: result.data_found.clone(),
            status: RemovalStatus::Pending,
            requested_at: now,
            updated_at: now,
        })
    }

    /// Returns the rejected status unchanged when the move is not allowed.
    pub fn advance(&mut self, next: RemovalStatus) -> Result<(), RemovalStatus> {
        if !self.status.can_transition_to(next) {
            return Err(next);
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Brokers from a finished scan that hold data, in result order.
pub fn removal_candidates(summary: &ScanSummary) -> Vec<RemovalRequest> {
    summary
        .results
        .iter()
        .filter_map(RemovalRequest::for_result)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::types::{BrokerFindings, Confidence, Details, RiskTierCounts};

    fn result_with(broker: &str, data: &[&str]) -> BrokerResult {
        BrokerResult::from_findings(
            broker,
            BrokerFindings {
                success: true,
                data_found: data.iter().map(|s| s.to_string()).collect(),
                description: String::new(),
                details: Details::new(),
                confidence: Confidence::Medium,
            },
        )
    }

    #[test]
    fn only_brokers_with_data_become_candidates() {
        let summary = ScanSummary {
            scan_id: Uuid::new_v4(),
            started_at: Utc::now(),
            duration_ms: 0,
            total_scanned: 3,
            successful_scans: 2,
            brokers_with_data: 1,
            total_data_points: 2,
            risk_tier_counts: RiskTierCounts::default(),
            results: vec![
                result_with("Spokeo", &["Name", "Age"]),
                result_with("Radaris", &[]),
                BrokerResult::failed("Intelius", &ScanError::Transport("down".into())),
            ],
        };
        let candidates = removal_candidates(&summary);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].broker, "Spokeo");
        assert_eq!(candidates[0].status, RemovalStatus::Pending);
    }

    #[test]
    fn status_moves_forward_only() {
        let mut request = RemovalRequest::for_result(&result_with("Spokeo", &["Name"])).unwrap();
        assert_eq!(request.advance(RemovalStatus::Completed), Err(RemovalStatus::Completed));
        request.advance(RemovalStatus::Submitted).unwrap();
        request.advance(RemovalStatus::Completed).unwrap();
        assert!(request.status.is_terminal());
        assert!(request.advance(RemovalStatus::Pending).is_err());
    }
}
