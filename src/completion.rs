//! Text completion seam.
//!
//! Candidate answers can come from a language model instead of a human. The
//! checker only needs "prompt in, text out"; the model itself is external.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// A completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Text the model continues.
    pub prompt: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Generation stops at the first of these sequences.
    pub stop: Vec<String>,
}

impl CompletionRequest {
    /// A short-answer request: 32 tokens, stopping at a new question or line.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: 32,
            stop: vec!["Q:".to_string(), "\n".to_string()],
        }
    }

    /// Overrides the token limit.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Overrides the stop sequences.
    #[must_use]
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }
}

/// External text-completion provider.
pub trait TextCompletion: Send + Sync {
    /// Produces a completion for `request`.
    fn complete(&self, request: &CompletionRequest) -> Result<String, TransportError>;
}

/// Cuts `text` at the first stop sequence. Providers that ignore stop
/// sequences can run their output through this.
#[must_use]
pub fn truncate_at_stop<'a>(text: &'a str, stop: &[String]) -> &'a str {
    stop.iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s.as_str()))
        .min()
        .map_or(text, |end| &text[..end])
}

/// Completion provider that replays queued answers, for tests and demos.
///
/// Requests are recorded so tests can inspect the prompts that were sent.
#[derive(Debug, Default)]
pub struct ScriptedCompletion {
    answers: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    /// Creates a provider that returns `answers` in order.
    #[must_use]
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl TextCompletion for ScriptedCompletion {
    fn complete(&self, request: &CompletionRequest) -> Result<String, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self
            .answers
            .lock()
            .map_err(|_| TransportError::ConnectionFailed {
                message: "poisoned lock: scripted completion".to_string(),
            })?
            .pop_front();

        next.map(|text| truncate_at_stop(&text, &request.stop).to_string())
            .ok_or_else(|| TransportError::ConnectionFailed {
                message: "no scripted completion left".to_string(),
            })
    }
}

#[cfg(feature = "http")]
pub use http::HttpCompletionClient;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use reqwest::blocking::Client;
    use serde::{Deserialize, Serialize};
    use tracing::debug;

    use super::{truncate_at_stop, CompletionRequest, TextCompletion};
    use crate::config::CompletionConfig;
    use crate::error::{FactCheckError, TransportError};

    #[derive(Debug, Serialize)]
    struct CompletionBody<'a> {
        prompt: &'a str,
        n_predict: u32,
        stop: &'a [String],
    }

    #[derive(Debug, Deserialize)]
    struct CompletionReply {
        content: String,
    }

    /// Blocking client for a llama.cpp-style `/completion` endpoint.
    #[derive(Debug, Clone)]
    pub struct HttpCompletionClient {
        client: Client,
        config: CompletionConfig,
    }

    impl HttpCompletionClient {
        /// Builds a client; fails if the HTTP client cannot be created.
        pub fn new(config: CompletionConfig) -> Result<Self, FactCheckError> {
            let mut builder = Client::builder();
            if let Some(ms) = config.timeout_ms {
                builder = builder.timeout(Duration::from_millis(ms));
            }
            let client = builder
                .build()
                .map_err(|e| FactCheckError::config(format!("failed to build HTTP client: {e}")))?;
            Ok(Self { client, config })
        }
    }

    impl TextCompletion for HttpCompletionClient {
        fn complete(&self, request: &CompletionRequest) -> Result<String, TransportError> {
            let body = CompletionBody {
                prompt: &request.prompt,
                n_predict: request.max_tokens,
                stop: &request.stop,
            };

            let response = self
                .client
                .post(&self.config.endpoint)
                .json(&body)
                .send()
                .map_err(|e| {
                    if e.is_timeout() {
                        TransportError::Timeout {
                            duration_ms: self.config.timeout_ms.unwrap_or_default(),
                        }
                    } else {
                        TransportError::ConnectionFailed {
                            message: e.to_string(),
                        }
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::ServerError {
                    code: status.as_u16(),
                    message: status.canonical_reason().unwrap_or("unknown").to_string(),
                });
            }

            let reply: CompletionReply = response
                .json()
                .map_err(|e| TransportError::malformed(e.to_string()))?;
            debug!(chars = reply.content.len(), "completion received");
            Ok(truncate_at_stop(&reply.content, &request.stop).to_string())
        }
    }
}
