// Quick search: normalize raw items already fetched from one source, without
// going through the roster or the batch scheduler.

use brokerscan_common::roster::{PEOPLE_SEARCH, SKIP_TRACE};
use brokerscan_common::{BrokerResult, Confidence, RawBrokerItem, ScanError, SearchQuery};

use crate::normalize::{findings_from_items, mapping_for};

pub fn normalize_one(
    source: &str,
    query: &SearchQuery,
    raw_items: &[RawBrokerItem],
) -> Result<BrokerResult, ScanError> {
    query.validate()?;

    let findings = findings_from_items(
        source,
        query.name(),
        raw_items,
        mapping_for(source),
        confidence_for_source(source),
    );
    Ok(BrokerResult::from_findings(source, findings))
}

/// API sources answer for the queried person directly; anything else is a weaker signal.
fn confidence_for_source(source: &str) -> Confidence {
    if source.eq_ignore_ascii_case(SKIP_TRACE) || source.eq_ignore_ascii_case(PEOPLE_SEARCH) {
        Confidence::High
    } else {
        Confidence::Medium
    }
}
