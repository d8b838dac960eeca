use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

/// Total budget for one completion call.
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);
/// Budget for a health probe; kept short so /health never hangs.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Sequences that terminate generation, matching the Mistral instruct
/// delimiters the prompt builder emits.
const STOP_SEQUENCES: [&str; 3] = ["[INST]", "</s>", "\n\n\n"];

/// Failures talking to the llama.cpp server.
#[derive(Debug, Error)]
pub enum LlamaError {
    #[error("llama.cpp request timed out")]
    Timeout,

    #[error("llama.cpp server unreachable")]
    Unavailable(#[source] reqwest::Error),

    #[error("llama.cpp server returned status {status}")]
    Upstream { status: u16 },

    #[error("llama.cpp server not ready after {attempts} attempts")]
    NotReady { attempts: u32 },
}

/// Sampling parameters forwarded with one completion request.
#[derive(Debug, Clone, Copy)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    temperature: f32,
    n_predict: u32,
    top_p: f32,
    top_k: u32,
    stop: [&'static str; 3],
    stream: bool,
}

/// Raw completion payload returned by llama.cpp.
#[derive(Debug, Deserialize)]
pub struct RawCompletion {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tokens_predicted: u32,
}

/// Reachability of the llama.cpp server as seen by the last probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlamaStatus {
    Healthy,
    Unhealthy,
    Unavailable,
}

impl fmt::Display for LlamaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LlamaStatus::Healthy => "healthy",
            LlamaStatus::Unhealthy => "unhealthy",
            LlamaStatus::Unavailable => "unavailable",
        };
        f.write_str(s)
    }
}

/// Client for the llama.cpp completion server. One instance is built at
/// startup and shared across all request handlers; the inner reqwest
/// client pools its connections.
pub struct LlamaClient {
    server_url: String,
    client: Client,
}

impl LlamaClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let server_url = config.llama_url();
        info!("Using llama.cpp server at: {}", server_url);

        let client = Client::builder().timeout(COMPLETION_TIMEOUT).build()?;
        Ok(Self { server_url, client })
    }

    /// Single completion attempt. No retries here; callers decide what a
    /// failure means for them.
    pub async fn complete(
        &self,
        prompt: &str,
        sampling: SamplingParams,
    ) -> Result<RawCompletion, LlamaError> {
        debug!("Prompt: {}", prompt);

        let request = CompletionRequest {
            prompt,
            temperature: sampling.temperature,
            n_predict: sampling.max_tokens,
            top_p: sampling.top_p,
            top_k: sampling.top_k,
            stop: STOP_SEQUENCES,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/completion", self.server_url))
            .json(&request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!("llama.cpp error status: {}", status);
            return Err(LlamaError::Upstream {
                status: status.as_u16(),
            });
        }

        response
            .json::<RawCompletion>()
            .await
            .map_err(classify_transport_error)
    }

    /// Probe the server's /health endpoint. Infallible by design: any
    /// transport problem maps to `Unavailable`.
    pub async fn probe(&self) -> LlamaStatus {
        let result = self
            .client
            .get(format!("{}/health", self.server_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => LlamaStatus::Healthy,
            Ok(_) => LlamaStatus::Unhealthy,
            Err(e) => {
                // Expected while the server is still starting; callers
                // decide whether an unreachable server is noteworthy.
                debug!("llama.cpp health probe failed: {}", e);
                LlamaStatus::Unavailable
            }
        }
    }

    /// Poll the server until it reports healthy, up to `max_attempts`
    /// probes spaced `delay` apart.
    pub async fn wait_until_ready(
        &self,
        max_attempts: u32,
        delay: Duration,
    ) -> Result<(), LlamaError> {
        for attempt in 1..=max_attempts {
            if self.probe().await == LlamaStatus::Healthy {
                info!("llama.cpp server is ready");
                return Ok(());
            }
            debug!("Attempt {}/{}: server not ready", attempt, max_attempts);
            tokio::time::sleep(delay).await;
        }
        Err(LlamaError::NotReady {
            attempts: max_attempts,
        })
    }
}

fn classify_transport_error(e: reqwest::Error) -> LlamaError {
    if e.is_timeout() {
        LlamaError::Timeout
    } else {
        LlamaError::Unavailable(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_on_closed_port() -> LlamaClient {
        let config = Config {
            llama_host: "127.0.0.1".to_string(),
            // Reserved port, nothing listens there.
            llama_port: 1,
            api_port: 8000,
            model_path: "model.gguf".to_string(),
        };
        LlamaClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn complete_against_closed_port_is_unavailable() {
        let client = client_on_closed_port();
        let sampling = SamplingParams {
            temperature: 0.7,
            max_tokens: 8,
            top_p: 0.9,
            top_k: 40,
        };
        match client.complete("[INST] test [/INST]", sampling).await {
            Err(LlamaError::Unavailable(_)) => {}
            other => panic!("expected Unavailable, got {:?}", other.map(|c| c.content)),
        }
    }

    #[tokio::test]
    async fn probe_against_closed_port_is_unavailable() {
        let client = client_on_closed_port();
        assert_eq!(client.probe().await, LlamaStatus::Unavailable);
    }

    #[tokio::test]
    async fn readiness_budget_exhaustion_is_typed() {
        let client = client_on_closed_port();
        let result = client.wait_until_ready(2, Duration::from_millis(1)).await;
        match result {
            Err(LlamaError::NotReady { attempts }) => assert_eq!(attempts, 2),
            other => panic!("expected NotReady, got {:?}", other),
        }
    }

    #[test]
    fn status_renders_lowercase() {
        assert_eq!(LlamaStatus::Healthy.to_string(), "healthy");
        assert_eq!(LlamaStatus::Unhealthy.to_string(), "unhealthy");
        assert_eq!(LlamaStatus::Unavailable.to_string(), "unavailable");
    }
}
