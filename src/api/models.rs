//! Request and response bodies for the HTTP API

use crate::error::{Result, SummarizeError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Message returned for malformed `urls`
pub const INVALID_URLS: &str = "Invalid URLs";

/// Successful summarization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Error body for 4xx and 5xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Service health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Pull the URL list out of a `{"urls": [...]}` body.
///
/// The body is inspected as raw JSON so that a missing key, a non-array value
/// and non-string entries all surface as the same validation error.
pub fn parse_urls(body: &Value) -> Result<Vec<String>> {
    let urls = body
        .get("urls")
        .and_then(Value::as_array)
        .ok_or_else(|| SummarizeError::Validation(INVALID_URLS.to_string()))?;

    urls.iter()
        .enumerate()
        .map(|(i, url)| {
            url.as_str().map(str::to_string).ok_or_else(|| {
                SummarizeError::Validation(format!("{}: entry {} is not a string", INVALID_URLS, i))
            })
        })
        .collect()
}

/// Rebuild the JSON shape of a form body.
///
/// `urls[]=a&urls[]=b` and `urls[0]=a` become a `urls` array. A bare
/// `urls=a` stays a string so it is rejected like its JSON counterpart.
pub fn form_to_json(pairs: &[(String, String)]) -> Value {
    let mut listed = Vec::new();
    let mut single = None;

    for (key, value) in pairs {
        if key == "urls" {
            single = Some(value.clone());
        } else if key
            .strip_prefix("urls[")
            .and_then(|rest| rest.strip_suffix(']'))
            .is_some_and(|index| index.chars().all(|c| c.is_ascii_digit()))
        {
            listed.push(Value::String(value.clone()));
        }
    }

    match (listed.is_empty(), single) {
        (false, _) => json!({ "urls": listed }),
        (true, Some(url)) => json!({ "urls": url }),
        (true, None) => json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_parse_urls() {
        let urls = parse_urls(&json!({"urls": ["https://a.test", "https://b.test"]})).unwrap();
        assert_eq!(urls, vec!["https://a.test", "https://b.test"]);
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_urls(&json!({"urls": []})).unwrap().is_empty());
    }

    #[test]
    fn test_missing_urls() {
        let err = parse_urls(&json!({"links": []})).unwrap_err();
        assert_eq!(err.to_string(), INVALID_URLS);
    }

    #[test]
    fn test_urls_not_a_list() {
        assert!(parse_urls(&json!({"urls": "https://a.test"})).is_err());
        assert!(parse_urls(&json!({"urls": null})).is_err());
        assert!(parse_urls(&json!(["https://a.test"])).is_err());
    }

    #[test]
    fn test_non_string_entry() {
        let err = parse_urls(&json!({"urls": ["https://a.test", 7]})).unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("entry 1"));
    }

    #[test]
    fn test_form_list_keys() {
        let body = form_to_json(&pairs(&[("urls[]", "https://a.test"), ("urls[]", "https://b.test")]));
        assert_eq!(parse_urls(&body).unwrap(), vec!["https://a.test", "https://b.test"]);

        let body = form_to_json(&pairs(&[("urls[0]", "https://a.test"), ("urls[1]", "https://b.test")]));
        assert_eq!(parse_urls(&body).unwrap(), vec!["https://a.test", "https://b.test"]);
    }

    #[test]
    fn test_form_without_list_is_invalid() {
        assert!(parse_urls(&form_to_json(&pairs(&[("urls", "https://a.test")]))).is_err());
        assert!(parse_urls(&form_to_json(&pairs(&[("links[]", "https://a.test")]))).is_err());
        assert!(parse_urls(&form_to_json(&[])).is_err());
    }
}
