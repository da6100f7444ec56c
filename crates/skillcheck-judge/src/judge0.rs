//! Judge0 remote execution client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use skillcheck_core::error::JudgeError;
use skillcheck_core::model::ExecutionRecord;
use skillcheck_core::traits::{ExecutionRequest, JudgeClient};

use crate::config::JudgeConfig;

/// Client for a Judge0 CE compatible endpoint.
///
/// Submissions are sent synchronously (`wait=true`) with plain-text fields
/// (`base64_encoded=false`). Calls are never retried.
pub struct Judge0Client {
    api_key: Option<String>,
    base_url: String,
    auth_header: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl Judge0Client {
    pub fn new(config: &JudgeConfig) -> Result<Self, JudgeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| JudgeError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: config.credential().map(String::from),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_header: config.auth_header.clone(),
            timeout_secs: config.request_timeout_secs,
            client,
        })
    }
}

#[derive(Serialize)]
struct Judge0Submission<'a> {
    source_code: &'a str,
    language_id: u32,
    stdin: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_output: Option<&'a str>,
}

#[derive(Deserialize)]
struct Judge0Response {
    #[serde(default)]
    stdout: Option<String>,
    #[serde(default)]
    stderr: Option<String>,
    #[serde(default)]
    compile_output: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<Judge0Status>,
    /// Seconds, usually as a decimal string ("0.023").
    #[serde(default)]
    time: Option<serde_json::Value>,
    /// Kilobytes.
    #[serde(default)]
    memory: Option<u64>,
}

#[derive(Deserialize)]
struct Judge0Status {
    #[allow(dead_code)]
    id: u32,
    description: String,
}

fn seconds_to_ms(time: Option<&serde_json::Value>) -> u64 {
    let seconds = match time {
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        _ => None,
    };
    seconds
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map(|s| (s * 1000.0).round() as u64)
        .unwrap_or(0)
}

impl From<Judge0Response> for ExecutionRecord {
    fn from(r: Judge0Response) -> Self {
        let status = r
            .status
            .map(|s| s.description)
            .or(r.message)
            .unwrap_or_else(|| "Unknown".to_string());

        ExecutionRecord {
            stdout: r.stdout,
            stderr: r.stderr,
            compile_output: r.compile_output,
            status,
            elapsed_ms: seconds_to_ms(r.time.as_ref()),
            memory_bytes: r.memory.unwrap_or(0).saturating_mul(1024),
        }
    }
}

#[async_trait]
impl JudgeClient for Judge0Client {
    fn name(&self) -> &str {
        "judge0"
    }

    #[instrument(skip(self, request), fields(language_id = %request.language_id))]
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionRecord, JudgeError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(JudgeError::Config(
                "no API key configured for the remote judge".into(),
            ));
        };

        let body = Judge0Submission {
            source_code: &request.source_code,
            language_id: request.language_id.0,
            stdin: &request.stdin,
            expected_output: request.expected_output.as_deref(),
        };

        let response = self
            .client
            .post(format!(
                "{}/submissions?base64_encoded=false&wait=true",
                self.base_url
            ))
            .header(self.auth_header.as_str(), api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JudgeError::Transport(format!("request timed out after {}s", self.timeout_secs))
                } else {
                    JudgeError::Transport(format!("network error: {e}"))
                }
            })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::Config(format!(
                "credential rejected (HTTP {status}): {body}"
            )));
        }
        if status == 429 {
            return Err(JudgeError::Transport("rate limited (HTTP 429)".into()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::Transport(format!("HTTP {status}: {body}")));
        }

        let parsed: Judge0Response = response
            .json()
            .await
            .map_err(|e| JudgeError::Transport(format!("failed to parse response: {e}")))?;

        let record = ExecutionRecord::from(parsed);
        tracing::debug!(status = %record.status, elapsed_ms = record.elapsed_ms, "judge0 execution");
        Ok(record)
    }
}
