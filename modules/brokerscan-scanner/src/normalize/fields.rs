// Declarative field mapping: broker-specific keys → canonical fields.
//
// Each rule lists candidate raw keys in priority order; the first candidate
// holding a usable value wins and later candidates are never read. Several
// rules may target the same field (indexed "Phone-1".."Phone-5" first, a plain
// "Phone" key as fallback); the first rule that populates a field owns it.

use std::collections::BTreeMap;

use brokerscan_common::{CanonicalField, RawBrokerItem};
use serde_json::{Map, Value};

use CanonicalField::*;

/// Literal some sources return in place of a value.
pub const NOT_FOUND_SENTINEL: &str = "Person Not Found";

#[derive(Debug, Clone, Copy)]
pub enum Candidate {
    Key(&'static str),
    /// Present parts joined with a space ("First Name" + "Last Name").
    Joined(&'static [&'static str]),
}

/// Numbered keys collected into an ordered list: `{prefix}-1` .. `{prefix}-{max}`.
#[derive(Debug, Clone, Copy)]
pub struct IndexedKeys {
    pub prefix: &'static str,
    pub max: usize,
    /// When set, each entry becomes an object with the value under this key
    /// plus any `{prefix}-{n} {attribute}` sub-keys.
    pub value_key: Option<&'static str>,
    pub attributes: &'static [(&'static str, &'static str)],
}

#[derive(Debug, Clone, Copy)]
pub enum Source {
    Keys(&'static [Candidate]),
    Indexed(IndexedKeys),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: CanonicalField,
    pub source: Source,
    pub category: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub name: &'static str,
    pub rules: &'static [FieldRule],
}

/// Output of one extraction. `populated` keeps the order fields were found in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub fields: BTreeMap<CanonicalField, Value>,
    pub populated: Vec<(CanonicalField, &'static str)>,
}

impl Extracted {
    /// Category labels in first-populated order, without duplicates.
    pub fn categories(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        for &(_, category) in &self.populated {
            if !out.contains(&category) {
                out.push(category);
            }
        }
        out
    }

    /// Drop a field and its category entry.
    pub fn remove(&mut self, field: CanonicalField) {
        self.fields.remove(&field);
        self.populated.retain(|(f, _)| *f != field);
    }
}

/// A value counts only if it carries something: not null, not blank, not an
/// empty collection, and not the not-found sentinel.
pub fn is_usable(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && !s.eq_ignore_ascii_case(NOT_FOUND_SENTINEL)
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

pub fn extract_fields(item: &RawBrokerItem, mapping: &FieldMapping) -> Extracted {
    let mut out = Extracted::default();

    for rule in mapping.rules {
        if out.fields.contains_key(&rule.field) {
            continue;
        }
        let value = match rule.source {
            Source::Keys(candidates) => first_match(item, candidates),
            Source::Indexed(indexed) => collect_indexed(item, &indexed),
        };
        if let Some(value) = value {
            out.fields.insert(rule.field, value);
            out.populated.push((rule.field, rule.category));
        }
    }

    out
}

fn first_match(item: &RawBrokerItem, candidates: &[Candidate]) -> Option<Value> {
    candidates.iter().find_map(|candidate| match candidate {
        Candidate::Key(key) => item.get(*key).filter(|v| is_usable(v)).cloned(),
        Candidate::Joined(keys) => {
            let parts: Vec<String> = keys
                .iter()
                .filter_map(|key| item.get(*key).filter(|v| is_usable(v)))
                .map(display)
                .collect();
            (!parts.is_empty()).then(|| Value::String(parts.join(" ")))
        }
    })
}

fn collect_indexed(item: &RawBrokerItem, indexed: &IndexedKeys) -> Option<Value> {
    let mut entries = Vec::new();

    for n in 1..=indexed.max {
        let key = format!("{}-{}", indexed.prefix, n);
        let Some(value) = item.get(&key).filter(|v| is_usable(v)) else {
            continue;
        };

        let entry = match indexed.value_key {
            None => value.clone(),
            Some(value_key) => {
                let mut obj = Map::new();
                obj.insert(value_key.to_string(), value.clone());
                for (suffix, attr) in indexed.attributes {
                    if let Some(v) = item.get(&format!("{key} {suffix}")).filter(|v| is_usable(v)) {
                        obj.insert(attr.to_string(), v.clone());
                    }
                }
                Value::Object(obj)
            }
        };
        entries.push(entry);
    }

    (!entries.is_empty()).then_some(Value::Array(entries))
}

/// Display form of a scalar: strings unquoted, everything else as JSON text.
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Mapping tables
// ---------------------------------------------------------------------------

const PHONE_ATTRIBUTES: &[(&str, &str)] = &[
    ("Type", "type"),
    ("Provider", "provider"),
    ("First Reported", "firstReported"),
    ("Last Reported", "lastReported"),
];

const fn keys(
    field: CanonicalField,
    candidates: &'static [Candidate],
    category: &'static str,
) -> FieldRule {
    FieldRule {
        field,
        source: Source::Keys(candidates),
        category,
    }
}

/// Skip-trace API: Title Case keys, numbered phone/email slots.
pub const SKIP_TRACE_FIELDS: FieldMapping = FieldMapping {
    name: "skip_trace",
    rules: &[
        keys(
            Name,
            &[
                Candidate::Key("Name"),
                Candidate::Key("Person_name"),
                Candidate::Joined(&["First Name", "Middle Name", "Last Name"]),
            ],
            "Name",
        ),
        keys(Age, &[Candidate::Key("Age")], "Age"),
        keys(BirthDate, &[Candidate::Key("Born"), Candidate::Key("DOB")], "Birth Date"),
        keys(
            Address,
            &[Candidate::Key("Permanent Address"), Candidate::Key("Current Address")],
            "Address",
        ),
        keys(Location, &[Candidate::Key("Lives in")], "Address"),
        keys(PreviousAddresses, &[Candidate::Key("Used to live in")], "Previous Addresses"),
        keys(County, &[Candidate::Key("County")], "County"),
        FieldRule {
            field: Phones,
            source: Source::Indexed(IndexedKeys {
                prefix: "Phone",
                max: 5,
                value_key: Some("number"),
                attributes: PHONE_ATTRIBUTES,
            }),
            category: "Phone",
        },
        keys(Phones, &[Candidate::Key("Telephone"), Candidate::Key("Phone")], "Phone"),
        FieldRule {
            field: Emails,
            source: Source::Indexed(IndexedKeys {
                prefix: "Email",
                max: 5,
                value_key: None,
                attributes: &[],
            }),
            category: "Email",
        },
        keys(Emails, &[Candidate::Key("Email")], "Email"),
        keys(Relatives, &[Candidate::Key("Related to")], "Relatives"),
        keys(Associates, &[Candidate::Key("Associated persons")], "Associates"),
        keys(ProfileLink, &[Candidate::Key("Link")], "Public Profile"),
    ],
};

/// People-search actor datasets: camelCase keys, lists already split.
pub const PEOPLE_SEARCH_FIELDS: FieldMapping = FieldMapping {
    name: "people_search",
    rules: &[
        keys(
            Name,
            &[
                Candidate::Key("fullName"),
                Candidate::Key("name"),
                Candidate::Joined(&["firstName", "middleName", "lastName"]),
            ],
            "Name",
        ),
        keys(Age, &[Candidate::Key("age")], "Age"),
        keys(
            BirthDate,
            &[Candidate::Key("dateOfBirth"), Candidate::Key("birthDate")],
            "Birth Date",
        ),
        keys(Address, &[Candidate::Key("currentAddress"), Candidate::Key("address")], "Address"),
        keys(Location, &[Candidate::Key("location"), Candidate::Key("livesIn")], "Address"),
        keys(
            PreviousAddresses,
            &[Candidate::Key("previousAddresses"), Candidate::Key("pastAddresses")],
            "Previous Addresses",
        ),
        keys(County, &[Candidate::Key("county")], "County"),
        keys(
            Phones,
            &[Candidate::Key("phones"), Candidate::Key("phoneNumbers"), Candidate::Key("phone")],
            "Phone",
        ),
        keys(Emails, &[Candidate::Key("emails"), Candidate::Key("email")], "Email"),
        keys(Relatives, &[Candidate::Key("relatives")], "Relatives"),
        keys(Associates, &[Candidate::Key("associates")], "Associates"),
        keys(ProfileLink, &[Candidate::Key("profileUrl"), Candidate::Key("url")], "Public Profile"),
    ],
};

/// Anything else: accepts both the Title Case and camelCase spellings.
pub const GENERIC_FIELDS: FieldMapping = FieldMapping {
    name: "generic",
    rules: &[
        keys(
            Name,
            &[
                Candidate::Key("Name"),
                Candidate::Key("name"),
                Candidate::Key("fullName"),
                Candidate::Key("Full Name"),
                Candidate::Joined(&["First Name", "Middle Name", "Last Name"]),
                Candidate::Joined(&["firstName", "middleName", "lastName"]),
            ],
            "Name",
        ),
        keys(Age, &[Candidate::Key("Age"), Candidate::Key("age")], "Age"),
        keys(
            BirthDate,
            &[Candidate::Key("Born"), Candidate::Key("birthDate"), Candidate::Key("dateOfBirth")],
            "Birth Date",
        ),
        keys(
            Address,
            &[
                Candidate::Key("Address"),
                Candidate::Key("address"),
                Candidate::Key("currentAddress"),
            ],
            "Address",
        ),
        keys(
            Location,
            &[Candidate::Key("Lives in"), Candidate::Key("location"), Candidate::Key("city")],
            "Address",
        ),
        keys(
            PreviousAddresses,
            &[Candidate::Key("Used to live in"), Candidate::Key("previousAddresses")],
            "Previous Addresses",
        ),
        keys(County, &[Candidate::Key("County"), Candidate::Key("county")], "County"),
        FieldRule {
            field: Phones,
            source: Source::Indexed(IndexedKeys {
                prefix: "Phone",
                max: 5,
                value_key: Some("number"),
                attributes: PHONE_ATTRIBUTES,
            }),
            category: "Phone",
        },
        keys(
            Phones,
            &[Candidate::Key("Phone"), Candidate::Key("phone"), Candidate::Key("phones")],
            "Phone",
        ),
        FieldRule {
            field: Emails,
            source: Source::Indexed(IndexedKeys {
                prefix: "Email",
                max: 5,
                value_key: None,
                attributes: &[],
            }),
            category: "Email",
        },
        keys(
            Emails,
            &[Candidate::Key("Email"), Candidate::Key("email"), Candidate::Key("emails")],
            "Email",
        ),
        keys(
            Relatives,
            &[
                Candidate::Key("Related to"),
                Candidate::Key("Relatives"),
                Candidate::Key("relatives"),
            ],
            "Relatives",
        ),
        keys(
            Associates,
            &[Candidate::Key("Associated persons"), Candidate::Key("associates")],
            "Associates",
        ),
        keys(
            ProfileLink,
            &[Candidate::Key("Link"), Candidate::Key("profileUrl")],
            "Public Profile",
        ),
    ],
};
