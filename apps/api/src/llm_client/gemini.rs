//! HTTP transport for the Gemini `generateContent` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{GenerateContentResponse, GenerativeModel, LlmError};

/// The model used for all profile extraction calls.
/// Hardcoded so every deployment parses résumés with the same model.
pub const MODEL: &str = "models/gemini-2.0-flash";

const RATE_LIMIT_STATUS: &str = "RESOURCE_EXHAUSTED";

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: String, api_base: &str, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            endpoint: format!("{}/{MODEL}:generateContent", api_base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_content(&self, prompt: &str) -> Result<GenerateContentResponse, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Maps a non-2xx provider reply onto the retryable / fatal split.
fn classify_failure(status: StatusCode, body: String) -> LlmError {
    let parsed = serde_json::from_str::<GeminiError>(&body).ok();
    let is_exhausted = status == StatusCode::TOO_MANY_REQUESTS
        || parsed
            .as_ref()
            .is_some_and(|e| e.error.status == RATE_LIMIT_STATUS)
        || body.contains(RATE_LIMIT_STATUS);
    let message = parsed
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or(body);

    warn!("Gemini API returned {status}: {message}");

    if is_exhausted {
        LlmError::ResourceExhausted { message }
    } else {
        LlmError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode as HttpStatus, Uri};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    /// Serves a canned reply for any generateContent call on a random local port.
    async fn start_mock_gemini(status: u16, body: Value) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = Router::new().fallback(
            move |uri: Uri, headers: HeaderMap, Json(request): Json<Value>| {
                let body = body.clone();
                async move {
                    assert_eq!(
                        uri.path(),
                        format!("/v1beta/{MODEL}:generateContent").as_str()
                    );
                    assert_eq!(headers.get("x-goog-api-key").unwrap(), "test-key");
                    assert!(request["contents"][0]["parts"][0]["text"].is_string());
                    (HttpStatus::from_u16(status).unwrap(), Json(body))
                }
            },
        );

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}/v1beta")
    }

    fn client(base: &str) -> GeminiClient {
        GeminiClient::new("test-key".to_string(), base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_success_response_is_deserialized() {
        let base = start_mock_gemini(
            200,
            json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "{\"candidate_name\":\"Ada\"}"}]},
                    "finishReason": "STOP"
                }]
            }),
        )
        .await;

        let response = client(&base).generate_content("prompt").await.unwrap();
        assert_eq!(
            response.direct_text().as_deref(),
            Some("{\"candidate_name\":\"Ada\"}")
        );
    }

    #[tokio::test]
    async fn test_429_is_classified_as_rate_limit() {
        let base = start_mock_gemini(
            429,
            json!({"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}),
        )
        .await;

        let err = client(&base).generate_content("prompt").await.unwrap_err();
        assert!(err.is_rate_limit());
        assert!(err.to_string().contains("Quota exceeded"));
    }

    #[tokio::test]
    async fn test_other_failure_is_fatal_api_error() {
        let base = start_mock_gemini(
            400,
            json!({"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}),
        )
        .await;

        let err = client(&base).generate_content("prompt").await.unwrap_err();
        assert!(!err.is_rate_limit());
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resource_exhausted_status_without_429() {
        let err = classify_failure(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error":{"message":"busy","status":"RESOURCE_EXHAUSTED"}}"#.to_string(),
        );
        assert!(err.is_rate_limit());
    }

    #[test]
    fn test_unparsable_error_body_kept_verbatim() {
        let err = classify_failure(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert!(matches!(
            err,
            LlmError::Api { status: 502, ref message } if message == "upstream down"
        ));
    }
}
