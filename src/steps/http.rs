//! HTTP step: generic HTTP request with authentication support

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use super::{get_str, get_u64, missing_param};
use crate::engine::{StepFunction, StepOutcome};

/// `http/http_request.py::make_http_request`
///
/// Parameters: `url` (required), `method` (default GET), `headers`
/// (optional object), `body` (optional string or JSON value), `timeout`
/// (seconds, default 30), `expected_status` (int or list, default 200).
/// Merged credential keys are honored: `auth_username`/`auth_password`
/// select basic auth, `auth_token` selects bearer auth.
pub struct HttpRequest;

#[async_trait]
impl StepFunction for HttpRequest {
    async fn call(&self, params: &Map<String, Value>) -> StepOutcome {
        let url = match get_str(params, "url") {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => return missing_param("url"),
        };
        let method = get_str(params, "method").unwrap_or("GET").to_uppercase();
        let timeout_secs = get_u64(params, "timeout", 30);
        let expected = expected_statuses(params);

        let method = match reqwest::Method::from_bytes(method.as_bytes()) {
            Ok(m) => m,
            Err(_) => {
                return StepOutcome::failure(4, format!("Unsupported HTTP method: {}", method), "")
            }
        };

        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
        {
            Ok(c) => c,
            Err(e) => return StepOutcome::failure(1, "Failed to build HTTP client", e.to_string()),
        };

        info!(%url, method = %method, "executing HTTP request");

        let method_name = method.to_string();
        let mut request = client.request(method, &url);

        if let Some(Value::Object(headers)) = params.get("headers") {
            for (name, value) in headers {
                if let Some(v) = value.as_str() {
                    request = request.header(name, v);
                }
            }
        }

        // Credential keys merged by the engine take precedence over none
        if let Some(token) = get_str(params, "auth_token") {
            request = request.bearer_auth(token);
        } else if let Some(username) = get_str(params, "auth_username") {
            request = request.basic_auth(username, get_str(params, "auth_password"));
        }

        match params.get("body") {
            Some(Value::String(body)) => request = request.body(body.clone()),
            Some(body @ Value::Object(_)) | Some(body @ Value::Array(_)) => {
                request = request.json(body)
            }
            _ => {}
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                return StepOutcome::failure(
                    1,
                    format!("HTTP request failed: {}", e),
                    e.to_string(),
                );
            }
        };

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        if expected.contains(&status) {
            StepOutcome::success(format!("{} {} -> {}\n{}", method_name, url, status, body))
        } else {
            StepOutcome::failure(
                1,
                format!(
                    "Unexpected status for {}: expected {:?}, got {}",
                    url, expected, status
                ),
                "",
            )
        }
    }
}

fn expected_statuses(params: &Map<String, Value>) -> Vec<u16> {
    let statuses: Vec<u16> = match params.get("expected_status") {
        Some(Value::Number(n)) => n.as_u64().map(|v| vec![v as u16]).unwrap_or_default(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_u64().map(|n| n as u16))
            .collect(),
        _ => vec![200],
    };

    // Unparseable values (negative, float, empty list) fall back to the
    // default instead of failing every response against an empty set.
    if statuses.is_empty() {
        vec![200]
    } else {
        statuses
    }
}
