// Address display formatting. Total: unexpected shapes degrade to their
// string form instead of failing.

use serde_json::Value;

const PARTS: [&str; 4] = ["streetAddress", "addressLocality", "addressRegion", "postalCode"];

/// One display string for an address given as text, a structured object, or nothing.
pub fn format_address(address: &Value) -> String {
    match address {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(obj) => PARTS
            .iter()
            .filter_map(|key| obj.get(*key).and_then(part))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(items) => items.iter().map(format_address).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Element-wise formatting for address lists. A single address becomes a one-item list.
pub fn format_addresses(addresses: &Value) -> Vec<String> {
    match addresses {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .map(format_address)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        single => {
            let formatted = format_address(single);
            if formatted.trim().is_empty() {
                Vec::new()
            } else {
                vec![formatted]
            }
        }
    }
}

fn part(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
