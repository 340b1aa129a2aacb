use brokerscan_common::{CanonicalField, NormalizedRecord, RawBrokerItem};
use serde_json::Value;

use super::address::{format_address, format_addresses};
use super::fields::{extract_fields, Extracted, FieldMapping};

/// All records from one source plus the union of their data categories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSet {
    pub records: Vec<NormalizedRecord>,
    /// First-seen order, no duplicates.
    pub data_found: Vec<String>,
}

impl NormalizedSet {
    pub fn primary(&self) -> Option<&NormalizedRecord> {
        self.records.first()
    }
}

pub fn normalize_records(
    source: &str,
    items: &[RawBrokerItem],
    mapping: &FieldMapping,
) -> NormalizedSet {
    let mut set = NormalizedSet::default();

    for (i, item) in items.iter().enumerate() {
        let mut extracted = extract_fields(item, mapping);
        shape_fields(&mut extracted);

        for category in extracted.categories() {
            if !set.data_found.iter().any(|c| c == category) {
                set.data_found.push(category.to_string());
            }
        }

        set.records.push(NormalizedRecord {
            record_id: i as u32 + 1,
            source: source.to_string(),
            fields: extracted.fields,
        });
    }

    set
}

/// Format address-shaped fields and coerce list fields into lists. A field
/// that formats to nothing is dropped along with its category.
fn shape_fields(extracted: &mut Extracted) {
    let fields: Vec<CanonicalField> = extracted.fields.keys().copied().collect();

    for field in fields {
        let Some(value) = extracted.fields.get(&field) else {
            continue;
        };
        let shaped = shape(field, value);
        match shaped {
            Some(v) => {
                extracted.fields.insert(field, v);
            }
            None => extracted.remove(field),
        }
    }
}

fn shape(field: CanonicalField, value: &Value) -> Option<Value> {
    match field {
        CanonicalField::Address | CanonicalField::Location => {
            let formatted = format_address(value);
            (!formatted.trim().is_empty()).then(|| Value::String(formatted))
        }
        CanonicalField::PreviousAddresses => {
            let formatted = format_addresses(value);
            (!formatted.is_empty()).then(|| Value::from(formatted))
        }
        CanonicalField::Relatives | CanonicalField::Associates => match value {
            Value::String(s) => {
                let names: Vec<String> = s
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect();
                (!names.is_empty()).then(|| Value::from(names))
            }
            other => Some(as_list(other)),
        },
        f if f.is_list() => Some(as_list(value)),
        _ => Some(value.clone()),
    }
}

fn as_list(value: &Value) -> Value {
    match value {
        Value::Array(_) => value.clone(),
        other => Value::Array(vec![other.clone()]),
    }
}
