//! Common types and helpers shared by the per-service API modules

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

/// Tag as the APIs exchange it (`{"key": ..., "value": ...}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTag {
    pub key: String,
    pub value: String,
}

/// Asynchronous job record shared by the ECS and SDRS job endpoints.
///
/// The shape of `entities` varies per job type, so it stays a raw JSON
/// document and callers pull ids out of it by path.
#[derive(Debug, Deserialize)]
pub struct JobDetail {
    pub status: String,
    #[serde(default)]
    pub entities: serde_json::Value,
    #[serde(default)]
    pub fail_reason: Option<String>,
}

pub const JOB_STATUS_SUCCESS: &str = "SUCCESS";
pub const JOB_STATUS_RUNNING: &str = "RUNNING";
pub const JOB_STATUS_INIT: &str = "INIT";
pub const JOB_STATUS_FAIL: &str = "FAIL";

/// Dotted-path lookup into a JSON document.
///
/// Only plain `a.b.c` key paths are supported, with numeric segments
/// indexing into arrays.
pub fn path_search<'v>(value: &'v serde_json::Value, path: &str) -> Option<&'v serde_json::Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            serde_json::Value::Object(map) => map.get(segment)?,
            serde_json::Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Extract a string at `path`, cloning it out of the document.
pub fn path_search_string(value: &serde_json::Value, path: &str) -> Option<String> {
    path_search(value, path)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_string_is_empty_without_params() {
        assert_eq!(ApiQueryParams::new().to_query_string(), "");
    }

    #[test]
    fn query_string_encodes_and_joins() {
        let query = ApiQueryParams::new()
            .add("name", "bastion one")
            .add_optional("state", Some("ACTIVE"))
            .add_optional::<_, &str>("ip", None)
            .to_query_string();
        assert_eq!(query, "?name=bastion%20one&state=ACTIVE");
    }

    #[test]
    fn path_search_walks_objects_and_arrays() {
        let doc = json!({
            "entities": {
                "sub_jobs": [
                    {"entities": {"server_id": "abc-123"}}
                ]
            }
        });
        assert_eq!(
            path_search_string(&doc, "entities.sub_jobs.0.entities.server_id").as_deref(),
            Some("abc-123")
        );
        assert!(path_search(&doc, "entities.missing").is_none());
        assert!(path_search(&doc, "entities.sub_jobs.5").is_none());
    }
}
