//! Synchronous client for the n8n REST API.
//!
//! Every operation is one blocking HTTP request. No retries, no caching;
//! non-2xx responses surface the raw body on the error. Requests under
//! `/api/v1` carry the `X-N8N-API-KEY` header, webhook triggers do not.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::types::{Credential, Execution, Paged, Tag, WebhookReply, Workflow};

const API_KEY_HEADER: &str = "X-N8N-API-KEY";

pub struct Client {
    agent: ureq::Agent,
    base_url: String,
    api_key: Option<String>,
}

/// Filters for `GET /workflows`.
#[derive(Debug, Clone, Default)]
pub struct WorkflowFilter {
    pub active: Option<bool>,
    /// Comma-separated tag names, matched server-side
    pub tags: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Filters for `GET /executions`.
#[derive(Debug, Clone, Default)]
pub struct ExecutionFilter {
    pub workflow_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<u32>,
    pub include_data: bool,
    pub cursor: Option<String>,
}

impl Client {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            agent,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(ApiError::MissingApiKey)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// Issue one request against `/api/v1` and decode the JSON response.
    fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T> {
        let url = self.url(path);
        let mut request = self
            .agent
            .request(method, &url)
            .set(API_KEY_HEADER, self.api_key()?);
        for (name, value) in query {
            request = request.query(name, value);
        }

        debug!(method, url = %url, "api request");
        let response = match body {
            Some(document) => request.send_json(document),
            None => request.call(),
        }
        .map_err(map_ureq_error)?;
        debug!(status = response.status(), url = %url, "api response");

        Ok(response.into_json()?)
    }

    // Workflows

    pub fn list_workflows(&self, filter: &WorkflowFilter) -> Result<Paged<Workflow>> {
        let mut query: Vec<(&str, String)> = vec![("limit", filter.limit.unwrap_or(100).to_string())];
        if let Some(active) = filter.active {
            query.push(("active", active.to_string()));
        }
        if let Some(tags) = &filter.tags {
            query.push(("tags", tags.clone()));
        }
        if let Some(cursor) = &filter.cursor {
            query.push(("cursor", cursor.clone()));
        }
        self.call("GET", "/workflows", &query, None)
    }

    pub fn get_workflow(&self, id: &str) -> Result<Workflow> {
        self.call("GET", &format!("/workflows/{}", id), &[], None)
    }

    /// Create a workflow from a caller-supplied document. The document is
    /// forwarded as-is; the server owns validation.
    pub fn create_workflow(&self, document: &Value) -> Result<Workflow> {
        self.call("POST", "/workflows", &[], Some(document))
    }

    pub fn update_workflow(&self, id: &str, document: &Value) -> Result<Workflow> {
        self.call("PUT", &format!("/workflows/{}", id), &[], Some(document))
    }

    pub fn delete_workflow(&self, id: &str) -> Result<Workflow> {
        self.call("DELETE", &format!("/workflows/{}", id), &[], None)
    }

    pub fn set_active(&self, id: &str, active: bool) -> Result<Workflow> {
        let action = if active { "activate" } else { "deactivate" };
        self.call("POST", &format!("/workflows/{}/{}", id, action), &[], None)
    }

    pub fn workflow_tags(&self, id: &str) -> Result<Vec<Tag>> {
        self.call("GET", &format!("/workflows/{}/tags", id), &[], None)
    }

    /// Replace the tag set of a workflow with the given tag ids.
    pub fn set_workflow_tags(&self, id: &str, tag_ids: &[String]) -> Result<Vec<Tag>> {
        let body = Value::Array(
            tag_ids
                .iter()
                .map(|tag_id| serde_json::json!({ "id": tag_id }))
                .collect(),
        );
        self.call("PUT", &format!("/workflows/{}/tags", id), &[], Some(&body))
    }

    // Executions

    pub fn list_executions(&self, filter: &ExecutionFilter) -> Result<Paged<Execution>> {
        let mut query: Vec<(&str, String)> = vec![("limit", filter.limit.unwrap_or(20).to_string())];
        if let Some(workflow_id) = &filter.workflow_id {
            query.push(("workflowId", workflow_id.clone()));
        }
        if let Some(status) = &filter.status {
            query.push(("status", status.clone()));
        }
        if filter.include_data {
            query.push(("includeData", "true".to_string()));
        }
        if let Some(cursor) = &filter.cursor {
            query.push(("cursor", cursor.clone()));
        }
        self.call("GET", "/executions", &query, None)
    }

    pub fn get_execution(&self, id: &str, include_data: bool) -> Result<Execution> {
        self.call(
            "GET",
            &format!("/executions/{}", id),
            &[("includeData", include_data.to_string())],
            None,
        )
    }

    pub fn delete_execution(&self, id: &str) -> Result<Execution> {
        self.call("DELETE", &format!("/executions/{}", id), &[], None)
    }

    // Credentials

    pub fn create_credential(&self, document: &Value) -> Result<Credential> {
        self.call("POST", "/credentials", &[], Some(document))
    }

    pub fn delete_credential(&self, id: &str) -> Result<Credential> {
        self.call("DELETE", &format!("/credentials/{}", id), &[], None)
    }

    /// Fetch the field schema for a credential type (e.g. `githubApi`).
    pub fn credential_schema(&self, type_name: &str) -> Result<Value> {
        self.call("GET", &format!("/credentials/schema/{}", type_name), &[], None)
    }

    // Tags

    pub fn list_tags(&self, limit: Option<u32>) -> Result<Paged<Tag>> {
        let query = [("limit", limit.unwrap_or(100).to_string())];
        self.call("GET", "/tags", &query, None)
    }

    pub fn get_tag(&self, id: &str) -> Result<Tag> {
        self.call("GET", &format!("/tags/{}", id), &[], None)
    }

    pub fn create_tag(&self, name: &str) -> Result<Tag> {
        self.call("POST", "/tags", &[], Some(&serde_json::json!({ "name": name })))
    }

    pub fn rename_tag(&self, id: &str, name: &str) -> Result<Tag> {
        self.call(
            "PUT",
            &format!("/tags/{}", id),
            &[],
            Some(&serde_json::json!({ "name": name })),
        )
    }

    pub fn delete_tag(&self, id: &str) -> Result<Tag> {
        self.call("DELETE", &format!("/tags/{}", id), &[], None)
    }

    // Webhooks

    /// Trigger a webhook. Carries no API key; whether the call needs
    /// authentication is up to the workflow's webhook node. The reply is
    /// surfaced whatever its status, so callers can show the body of a
    /// failed trigger too.
    pub fn trigger_webhook(&self, path: &str, payload: &Value, test: bool) -> Result<WebhookReply> {
        let prefix = if test { "webhook-test" } else { "webhook" };
        let url = format!("{}/{}/{}", self.base_url, prefix, path.trim_start_matches('/'));

        debug!(url = %url, test, "webhook trigger");
        let (status, raw) = match self.agent.post(&url).send_json(payload) {
            Ok(response) => {
                let status = response.status();
                (status, response.into_string()?)
            }
            Err(ureq::Error::Status(status, response)) => {
                (status, response.into_string().unwrap_or_default())
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(ApiError::Transport(transport.to_string()))
            }
        };

        let body = serde_json::from_str(&raw)
            .unwrap_or_else(|_| serde_json::json!({ "response": raw }));
        Ok(WebhookReply { status, body })
    }
}

fn map_ureq_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            ApiError::Api {
                status,
                message: extract_message(&body),
                body,
            }
        }
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}

// n8n error bodies are usually {"message": "..."}; fall back to the raw text.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> Client {
        Client::new(&Config {
            base_url: base_url.to_string(),
            api_key: Some("k".to_string()),
            timeout_secs: 5,
        })
    }

    #[test]
    fn test_url_building() {
        let client = client("http://localhost:5678");
        assert_eq!(
            client.url("/workflows/42"),
            "http://localhost:5678/api/v1/workflows/42"
        );
    }

    #[test]
    fn test_extract_message() {
        assert_eq!(
            extract_message("{\"message\":\"workflow not found\"}"),
            "workflow not found"
        );
        assert_eq!(extract_message("plain text\n"), "plain text");
        assert_eq!(extract_message("{\"code\":404}"), "{\"code\":404}");
    }

    #[test]
    fn test_missing_api_key() {
        let client = Client::new(&Config {
            base_url: "http://localhost:5678".to_string(),
            api_key: None,
            timeout_secs: 5,
        });
        // Fails before any request is made
        let err = client.get_workflow("1").unwrap_err();
        assert!(matches!(err, ApiError::MissingApiKey));
    }
}
