// Broker-result normalization: raw items → canonical records → one flat result.
//
//   fields    : per-item key mapping (FieldExtractor)
//   address   : address display strings (AddressFormatter)
//   records   : per-source record list + category union (RecordNormalizer)
//   aggregate : primary-record flattening + description (ResultAggregator)

pub mod address;
pub mod aggregate;
pub mod fields;
pub mod records;

pub use address::{format_address, format_addresses};
pub use aggregate::aggregate;
pub use fields::{
    extract_fields, FieldMapping, GENERIC_FIELDS, PEOPLE_SEARCH_FIELDS, SKIP_TRACE_FIELDS,
};
pub use records::{normalize_records, NormalizedSet};

use brokerscan_common::roster::{PEOPLE_SEARCH, SKIP_TRACE};
use brokerscan_common::{BrokerFindings, Confidence, RawBrokerItem};

/// Mapping table for a source label. Unknown sources get the generic table.
pub fn mapping_for(source: &str) -> &'static FieldMapping {
    if source.eq_ignore_ascii_case(SKIP_TRACE) {
        &SKIP_TRACE_FIELDS
    } else if source.eq_ignore_ascii_case(PEOPLE_SEARCH) {
        &PEOPLE_SEARCH_FIELDS
    } else {
        &GENERIC_FIELDS
    }
}

/// Full pipeline for one source: normalize every item, then aggregate.
pub fn findings_from_items(
    source: &str,
    subject: &str,
    items: &[RawBrokerItem],
    mapping: &FieldMapping,
    confidence: Confidence,
) -> BrokerFindings {
    let set = normalize_records(source, items, mapping);
    tracing::debug!(
        source,
        mapping = mapping.name,
        records = set.records.len(),
        categories = set.data_found.len(),
        "Normalized broker items"
    );
    aggregate(source, subject, set, confidence)
}
