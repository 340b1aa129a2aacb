pub mod error;

pub use error::{Result, SkipTraceError};

use std::time::Duration;

use serde_json::Value;

/// One person entry as the API returned it. Keys are API-defined ("Lives in", "Phone-1", ...).
pub type PersonRecord = serde_json::Map<String, Value>;

/// Sentinel the API puts in place of a result list when nothing matched.
pub const PERSON_NOT_FOUND: &str = "Person Not Found";

pub struct SkipTraceClient {
    client: reqwest::Client,
    base_url: String,
    host: String,
    api_key: String,
}

impl SkipTraceClient {
    pub fn new(api_key: &str, host: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("https://{host}"),
            host: host.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Point the client at another API root (test server, proxy).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Search people by full name, optionally narrowed by a "City, ST" or ZIP filter.
    pub async fn search_by_name(
        &self,
        name: &str,
        citystatezip: Option<&str>,
    ) -> Result<Vec<PersonRecord>> {
        let mut params = vec![("name", name), ("page", "1")];
        if let Some(filter) = citystatezip.filter(|f| !f.trim().is_empty()) {
            params.push(("citystatezip", filter));
        }
        let body = self.get("/search/byname", &params).await?;
        Ok(people_details(&body))
    }

    pub async fn search_by_phone(&self, phone: &str) -> Result<Vec<PersonRecord>> {
        let body = self.get("/search/byphone", &[("phoneno", phone), ("page", "1")]).await?;
        Ok(people_details(&body))
    }

    pub async fn search_by_email(&self, email: &str) -> Result<Vec<PersonRecord>> {
        let body = self.get("/search/byemail", &[("email", email), ("page", "1")]).await?;
        Ok(people_details(&body))
    }

    /// Full profile for one person id returned by a search. `None` when the id is unknown.
    pub async fn person_details(&self, person_id: &str) -> Result<Option<PersonRecord>> {
        let body = self.get("/search/detailsbyID", &[("peo_id", person_id)]).await?;
        Ok(first_person_details(&body))
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(path, "skip-trace request");

        let resp = self
            .client
            .get(&url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .query(params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SkipTraceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Search responses carry matches under `PeopleDetails`. Anything other than a
/// list there (the not-found sentinel, null) means no matches.
fn people_details(body: &Value) -> Vec<PersonRecord> {
    match body.get("PeopleDetails") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_object().cloned())
            .collect(),
        _ => Vec::new(),
    }
}

/// Detail responses carry the profile as the first entry of `Person Details`.
fn first_person_details(body: &Value) -> Option<PersonRecord> {
    let entry = match body.get("Person Details") {
        Some(Value::Array(items)) => items.first()?.as_object()?.clone(),
        Some(Value::Object(obj)) => obj.clone(),
        _ => return None,
    };
    let not_found = entry
        .values()
        .any(|v| v.as_str() == Some(PERSON_NOT_FOUND));
    if not_found {
        None
    } else {
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sentinel_search_response_yields_no_people() {
        let body = json!({ "Status": 200, "PeopleDetails": PERSON_NOT_FOUND });
        assert!(people_details(&body).is_empty());
    }

    #[test]
    fn search_response_keeps_object_entries_in_order() {
        let body = json!({
            "PeopleDetails": [
                { "Name": "Jane Doe", "Age": "34" },
                "garbage",
                { "Name": "Jane A Doe", "Age": "61" }
            ]
        });
        let people = people_details(&body);
        assert_eq!(people.len(), 2);
        assert_eq!(people[1]["Age"], "61");
    }

    #[test]
    fn details_take_first_profile() {
        let body = json!({
            "Person Details": [{ "Person_name": "Jane Doe", "Email-1": "jane@example.com" }]
        });
        let person = first_person_details(&body).unwrap();
        assert_eq!(person["Email-1"], "jane@example.com");
    }

    #[test]
    fn details_with_sentinel_are_none() {
        let body = json!({ "Person Details": [{ "Person_name": PERSON_NOT_FOUND }] });
        assert!(first_person_details(&body).is_none());
    }
}
