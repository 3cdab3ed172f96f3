//! Relays accepted candidates to the external recruitment workflow webhook.

use std::time::Duration;

use reqwest::{redirect, Client, StatusCode, Url};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::screening::profile::CandidateProfile;

/// Substituted for the webhook reply when its body is not JSON.
pub const NO_JSON_STATUS: &str = "No valid JSON response";

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Body POSTed to the webhook.
#[derive(Debug, Serialize)]
pub struct WorkflowPayload<'a> {
    pub candidate_data: &'a CandidateProfile,
    pub meets_criteria: bool,
    pub question: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForwardOutcome {
    /// Criteria not met; no request was sent.
    Skipped,
    /// HTTP 200 from the webhook.
    Delivered { status: Option<String>, body: Value },
    /// Any other status, redirects included.
    Rejected { http_status: u16, body: Value },
}

#[derive(Clone)]
pub struct WorkflowForwarder {
    client: Client,
    webhook_url: Url,
}

impl WorkflowForwarder {
    pub fn new(webhook_url: Url, timeout: Duration) -> Result<Self, ForwardError> {
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .redirect(redirect::Policy::none())
                .build()?,
            webhook_url,
        })
    }

    /// Posts the payload when the candidate meets criteria. A non-JSON reply
    /// is replaced with `{"status": NO_JSON_STATUS}`.
    pub async fn forward(
        &self,
        payload: &WorkflowPayload<'_>,
    ) -> Result<ForwardOutcome, ForwardError> {
        if !payload.meets_criteria {
            info!("Candidate does not meet criteria; webhook not called");
            return Ok(ForwardOutcome::Skipped);
        }

        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| ForwardError::Http(e.without_url()))?;

        let status = response.status();
        let body = match response.json::<Value>().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Webhook returned a non-JSON body: {}", e.without_url());
                json!({ "status": NO_JSON_STATUS })
            }
        };

        if status == StatusCode::OK {
            info!("Workflow accepted candidate");
            Ok(ForwardOutcome::Delivered {
                status: status_field(&body),
                body,
            })
        } else {
            warn!("Workflow webhook returned HTTP {status}");
            Ok(ForwardOutcome::Rejected {
                http_status: status.as_u16(),
                body,
            })
        }
    }
}

/// Scheme, host and port only. The path of an n8n webhook URL acts as a
/// credential and must stay out of logs.
pub fn redacted_target(url: &Url) -> String {
    match url.port() {
        Some(port) => format!("{}://{}:{port}", url.scheme(), url.host_str().unwrap_or_default()),
        None => format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default()),
    }
}

fn status_field(body: &Value) -> Option<String> {
    match body.get("status")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
