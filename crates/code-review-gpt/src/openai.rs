use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::{ReviewError, ReviewPrompts, Reviewer};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Settings for an OpenAI-compatible chat endpoint.
///
/// Fixed once the reviewer is built; use the `with_*` methods to derive a
/// different configuration.
#[derive(Clone)]
pub struct ReviewerConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
    /// Deadline for the whole request (None = no limit)
    pub timeout: Option<Duration>,
}

impl ReviewerConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for ReviewerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewerConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Reviewer backed by the OpenAI chat completions API
pub struct OpenAiReviewer {
    config: ReviewerConfig,
    http: reqwest::Client,
}

impl OpenAiReviewer {
    pub fn new(config: ReviewerConfig) -> Result<Self, ReviewError> {
        if config.api_key.trim().is_empty() {
            return Err(ReviewError::MissingApiKey);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            config,
            http: builder.build()?,
        })
    }

    /// A reviewer identical to this one but using `model`
    pub fn with_model(self, model: impl Into<String>) -> Self {
        Self {
            config: self.config.with_model(model),
            http: self.http,
        }
    }

    pub fn config(&self) -> &ReviewerConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_request<'a>(&'a self, document: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: ReviewPrompts::system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: document,
                },
            ],
            max_tokens: self.config.max_tokens,
        }
    }
}

fn parse_response(body: &str) -> Result<String, ReviewError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(ReviewError::EmptyResponse)
}

#[async_trait]
impl Reviewer for OpenAiReviewer {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn review(&self, document: &str) -> Result<String, ReviewError> {
        let start = Instant::now();
        let request = self.build_request(document);

        info!(
            model = %self.config.model,
            chars = document.len(),
            "Sending document for review"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ReviewError::Api {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let review = parse_response(&body)?;

        debug!(
            duration_ms = start.elapsed().as_millis(),
            review_len = review.len(),
            "Review received"
        );

        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}/v1", addr), handle)
    }

    #[test]
    fn test_missing_api_key() {
        let result = OpenAiReviewer::new(ReviewerConfig::new("  "));
        assert!(matches!(result, Err(ReviewError::MissingApiKey)));
    }

    #[test]
    fn test_config_defaults_and_redaction() {
        let config = ReviewerConfig::new("sk-secret");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn test_with_model_builds_new_reviewer() {
        let config = ReviewerConfig::new("sk-test");
        let original = OpenAiReviewer::new(config.clone()).unwrap();
        assert_eq!(original.model(), DEFAULT_MODEL);

        let switched = OpenAiReviewer::new(config).unwrap().with_model("gpt-4o");
        assert_eq!(switched.model(), "gpt-4o");
        assert_eq!(original.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_request_shape() {
        let reviewer = OpenAiReviewer::new(
            ReviewerConfig::new("sk-test")
                .with_max_tokens(512)
                .with_base_url("https://example.test/v1/"),
        )
        .unwrap();

        assert_eq!(reviewer.endpoint(), "https://example.test/v1/chat/completions");

        let value = serde_json::to_value(reviewer.build_request("<git-diff>\n</git-diff>")).unwrap();
        assert_eq!(value["model"], DEFAULT_MODEL);
        assert_eq!(value["max_tokens"], 512);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "<git-diff>\n</git-diff>");
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"<review>ok</review>"}}]}"#;
        assert_eq!(parse_response(body).unwrap(), "<review>ok</review>");

        assert!(matches!(
            parse_response(r#"{"choices":[]}"#),
            Err(ReviewError::EmptyResponse)
        ));
        assert!(matches!(
            parse_response(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(ReviewError::EmptyResponse)
        ));
        assert!(matches!(
            parse_response("not json"),
            Err(ReviewError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_review_round_trip() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"choices":[{"message":{"content":"<review><summary>Looks good</summary></review>"}}]}"#,
        )
        .await;

        let reviewer =
            OpenAiReviewer::new(ReviewerConfig::new("sk-test").with_base_url(base_url)).unwrap();
        let review = reviewer.review("<git-diff>\n</git-diff>").await.unwrap();
        assert!(review.contains("Looks good"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.to_lowercase().contains("authorization: bearer sk-test"));
        assert!(request.contains(DEFAULT_MODEL));
    }

    #[tokio::test]
    async fn test_review_api_error_carries_body() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 401 Unauthorized",
            r#"{"error":{"message":"Incorrect API key provided"}}"#,
        )
        .await;

        let reviewer =
            OpenAiReviewer::new(ReviewerConfig::new("sk-bad").with_base_url(base_url)).unwrap();
        let err = reviewer.review("<git-diff>\n</git-diff>").await.unwrap_err();
        match err {
            ReviewError::Api { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Incorrect API key"));
            }
            other => panic!("unexpected error: {other}"),
        }
        server.await.unwrap();
    }
}
