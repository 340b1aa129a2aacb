// Collapse a normalized set into the flat `details` shape consumers read.
//
// The first record is the primary one and its fields are hoisted to the top
// level. No ranking by completeness or recency; the full list stays under
// `details.records`.

use brokerscan_common::{BrokerFindings, CanonicalField, Confidence, Details, NormalizedRecord};
use serde_json::Value;

use super::records::NormalizedSet;

pub fn aggregate(
    source: &str,
    subject: &str,
    set: NormalizedSet,
    confidence: Confidence,
) -> BrokerFindings {
    let description = describe(source, subject, &set);

    let mut details = Details::new();
    if let Some(primary) = set.primary() {
        hoist_primary(primary, &mut details);
    }
    details.insert("total_records".to_string(), Value::from(set.records.len()));
    details.insert(
        "records".to_string(),
        serde_json::to_value(&set.records).unwrap_or(Value::Array(Vec::new())),
    );

    BrokerFindings {
        success: true,
        data_found: set.data_found,
        description,
        details,
        confidence,
    }
}

pub fn describe(source: &str, subject: &str, set: &NormalizedSet) -> String {
    if set.data_found.is_empty() {
        return format!("{source} searched but found no matching records for {subject}");
    }
    format!(
        "{source} found {} record(s) with {} data categories: {}",
        set.records.len(),
        set.data_found.len(),
        set.data_found.join(", ")
    )
}

fn hoist_primary(primary: &NormalizedRecord, details: &mut Details) {
    use CanonicalField::*;

    let mut put = |key: &str, value: Option<&Value>| {
        if let Some(v) = value {
            details.insert(key.to_string(), v.clone());
        }
    };

    put("name", primary.get(Name));
    put("age", primary.get(Age));
    put("birth_date", primary.get(BirthDate));
    put("current_address", primary.get(Address).or_else(|| primary.get(Location)));
    put("lives_in", primary.get(Location));
    put("previous_addresses", primary.get(PreviousAddresses));
    put("county", primary.get(County));
    put("phone", primary.primary(Phones).map(phone_number));
    put("phones", primary.get(Phones));
    put("email", primary.primary(Emails));
    put("emails", primary.get(Emails));
    put("relatives", primary.get(Relatives));
    put("associates", primary.get(Associates));
    put("profile_link", primary.get(ProfileLink));
}

/// Numbered phone slots are objects; the bare number is what gets displayed.
fn phone_number(entry: &Value) -> &Value {
    entry.get("number").unwrap_or(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::fields::{GENERIC_FIELDS, SKIP_TRACE_FIELDS};
    use crate::normalize::records::normalize_records;
    use brokerscan_common::RawBrokerItem;
    use serde_json::json;

    fn items(values: Vec<Value>) -> Vec<RawBrokerItem> {
        values.into_iter().filter_map(|v| v.as_object().cloned()).collect()
    }

    #[test]
    fn primary_record_is_hoisted() {
        let raw = items(vec![json!({ "First Name": "Jane", "Last Name": "Doe", "Age": 34 })]);
        let set = normalize_records("ExampleBroker", &raw, &GENERIC_FIELDS);
        let findings = aggregate("ExampleBroker", "Jane Doe", set, Confidence::Medium);

        assert_eq!(findings.details["name"], "Jane Doe");
        assert_eq!(findings.details["age"], 34);
        assert_eq!(findings.details["total_records"], 1);
        assert_eq!(findings.data_found, vec!["Name", "Age"]);
        assert_eq!(
            findings.description,
            "ExampleBroker found 1 record(s) with 2 data categories: Name, Age"
        );
    }

    #[test]
    fn only_first_record_is_flattened() {
        let raw = items(vec![
            json!({ "Name": "Jane Doe" }),
            json!({ "Name": "Jane Q Doe", "Age": "61", "Email-1": "jq@example.com" }),
        ]);
        let set = normalize_records("Skip Trace", &raw, &SKIP_TRACE_FIELDS);
        let findings = aggregate("Skip Trace", "Jane Doe", set, Confidence::High);

        assert_eq!(findings.details["name"], "Jane Doe");
        assert!(findings.details.get("age").is_none());
        assert!(findings.details.get("email").is_none());
        assert_eq!(findings.details["records"].as_array().unwrap().len(), 2);
        assert_eq!(findings.data_found, vec!["Name", "Age", "Email"]);
    }

    #[test]
    fn phone_and_email_take_first_entry() {
        let raw = items(vec![json!({
            "Phone-1": "(555) 010-0001",
            "Phone-1 Type": "Wireless",
            "Phone-2": "(555) 010-0002",
            "Email-1": "jane@example.com",
            "Email-2": "jd@example.com",
        })]);
        let set = normalize_records("Skip Trace", &raw, &SKIP_TRACE_FIELDS);
        let findings = aggregate("Skip Trace", "Jane Doe", set, Confidence::High);

        assert_eq!(findings.details["phone"], "(555) 010-0001");
        assert_eq!(findings.details["phones"].as_array().unwrap().len(), 2);
        assert_eq!(findings.details["email"], "jane@example.com");
    }

    #[test]
    fn lives_in_backs_up_missing_address() {
        let raw = items(vec![json!({ "Lives in": "Springfield, IL" })]);
        let set = normalize_records("Skip Trace", &raw, &SKIP_TRACE_FIELDS);
        let findings = aggregate("Skip Trace", "Jane Doe", set, Confidence::High);
        assert_eq!(findings.details["current_address"], "Springfield, IL");
    }

    #[test]
    fn empty_set_describes_no_match() {
        let findings =
            aggregate("Spokeo", "Jane Doe", NormalizedSet::default(), Confidence::Medium);
        assert!(findings.success);
        assert!(findings.data_found.is_empty());
        assert_eq!(
            findings.description,
            "Spokeo searched but found no matching records for Jane Doe"
        );
        assert_eq!(findings.details["records"], json!([]));
    }
}
