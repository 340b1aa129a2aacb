use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ScanError;

/// One broker-specific record exactly as the external source returned it.
pub type RawBrokerItem = serde_json::Map<String, serde_json::Value>;

/// Flattened primary-record view handed to consumers.
pub type Details = serde_json::Map<String, serde_json::Value>;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// The fixed attribute set every broker-specific shape is normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    Name,
    Age,
    BirthDate,
    Address,
    Location,
    PreviousAddresses,
    County,
    Phones,
    Emails,
    Relatives,
    Associates,
    ProfileLink,
}

impl CanonicalField {
    /// Fields that always hold a list, even when the source sent one string.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            CanonicalField::PreviousAddresses
                | CanonicalField::Phones
                | CanonicalField::Emails
                | CanonicalField::Relatives
                | CanonicalField::Associates
        )
    }
}

// --- Broker roster ---

/// One external site or service that may expose the subject's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerDescriptor {
    pub name: String,
    pub url: String,
    pub risk_level: RiskLevel,
    pub priority: u8,
    pub data_types: Vec<String>,
}

impl BrokerDescriptor {
    pub fn new(name: &str, url: &str, risk_level: RiskLevel, priority: u8) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            risk_level,
            priority,
            data_types: Vec::new(),
        }
    }

    pub fn with_data_types(mut self, data_types: &[&str]) -> Self {
        for dt in data_types {
            if !self.data_types.iter().any(|existing| existing == dt) {
                self.data_types.push(dt.to_string());
            }
        }
        self
    }

    pub fn exposes(&self, data_type: &str) -> bool {
        self.data_types.iter().any(|dt| dt.eq_ignore_ascii_case(data_type))
    }
}

// --- Query ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl SearchQuery {
    pub fn new(full_name: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    /// Trimmed subject name. Only meaningful after `validate` succeeds.
    pub fn name(&self) -> &str {
        self.full_name.trim()
    }

    /// Rejects a blank `fullName`. Must run before any broker is contacted.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.full_name.trim().is_empty() {
            return Err(ScanError::Validation("fullName is required".to_string()));
        }
        Ok(())
    }
}

// --- Normalized output ---

/// One raw item mapped onto canonical fields. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub record_id: u32,
    pub source: String,
    pub fields: BTreeMap<CanonicalField, serde_json::Value>,
}

impl NormalizedRecord {
    pub fn get(&self, field: CanonicalField) -> Option<&serde_json::Value> {
        self.fields.get(&field)
    }

    /// First element of a list field, or the scalar itself.
    pub fn primary(&self, field: CanonicalField) -> Option<&serde_json::Value> {
        match self.fields.get(&field)? {
            serde_json::Value::Array(items) => items.first(),
            other => Some(other),
        }
    }
}

/// What a broker strategy hands back before the scan envelope is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerFindings {
    pub success: bool,
    pub data_found: Vec<String>,
    pub description: String,
    pub details: Details,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerResult {
    pub broker: String,
    pub success: bool,
    pub data_found: Vec<String>,
    pub description: String,
    pub details: Details,
    pub confidence: Confidence,
    pub scanned_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BrokerResult {
    pub fn from_findings(broker: &str, findings: BrokerFindings) -> Self {
        Self {
            broker: broker.to_string(),
            success: findings.success,
            data_found: findings.data_found,
            description: findings.description,
            details: findings.details,
            confidence: findings.confidence,
            scanned_at: Utc::now(),
            error: None,
        }
    }

    /// A broker that could not be reached. Distinct from "searched, nothing found".
    pub fn failed(broker: &str, error: &ScanError) -> Self {
        Self {
            broker: broker.to_string(),
            success: false,
            data_found: Vec::new(),
            description: format!("{broker} could not be scanned: {error}"),
            details: Details::new(),
            confidence: Confidence::Low,
            scanned_at: Utc::now(),
            error: Some(error.to_string()),
        }
    }

    pub fn has_data(&self) -> bool {
        !self.data_found.is_empty()
    }
}

// --- Scan ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOptions {
    /// Highest broker priority included (1 = most important).
    pub priority: u8,
    pub batch_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            priority: 3,
            batch_size: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskTierCounts {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl RiskTierCounts {
    pub fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub scan_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub total_scanned: u32,
    pub successful_scans: u32,
    pub brokers_with_data: u32,
    pub total_data_points: u32,
    pub risk_tier_counts: RiskTierCounts,
    pub results: Vec<BrokerResult>,
}

impl ScanSummary {
    pub fn failed_scans(&self) -> u32 {
        self.total_scanned - self.successful_scans
    }

    pub fn result_for(&self, broker: &str) -> Option<&BrokerResult> {
        self.results.iter().find(|r| r.broker == broker)
    }
}
