//! Simulated judge for demo and offline use.
//!
//! Nothing is executed. A submission is graded by a weak textual heuristic
//! ("does this look like real code?"), so results are NOT authoritative and
//! must never be used to grade a real candidate.

use std::time::Duration;

use async_trait::async_trait;

use skillcheck_core::error::JudgeError;
use skillcheck_core::model::ExecutionRecord;
use skillcheck_core::traits::{ExecutionRequest, JudgeClient};

/// Submissions must be strictly longer than this (in characters) to look like code.
pub const MIN_CODE_LENGTH: usize = 50;

/// At least one of these must appear for a submission to look like code.
pub const CONTROL_FLOW_KEYWORDS: &[&str] = &["for", "if", "function", "return"];

/// The heuristic: longer than [`MIN_CODE_LENGTH`] and mentions a control-flow keyword.
pub fn looks_like_code(source: &str) -> bool {
    source.chars().count() > MIN_CODE_LENGTH
        && CONTROL_FLOW_KEYWORDS.iter().any(|k| source.contains(k))
}

/// Judge that fabricates execution records from [`looks_like_code`].
///
/// Code that passes the heuristic "prints" the expected output (or `Success`
/// when none was sent); anything else prints `Incorrect output`.
pub struct SimulatedJudge {
    latency: Duration,
}

impl SimulatedJudge {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedJudge {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl JudgeClient for SimulatedJudge {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionRecord, JudgeError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let record = if looks_like_code(&request.source_code) {
            ExecutionRecord {
                stdout: Some(
                    request
                        .expected_output
                        .clone()
                        .unwrap_or_else(|| "Success".to_string()),
                ),
                stderr: None,
                compile_output: None,
                status: "Accepted".into(),
                elapsed_ms: 23,
                memory_bytes: 12_400 * 1024,
            }
        } else {
            ExecutionRecord {
                stdout: Some("Incorrect output".into()),
                stderr: None,
                compile_output: None,
                status: "Wrong Answer".into(),
                elapsed_ms: 15,
                memory_bytes: 10_200 * 1024,
            }
        };
        tracing::debug!(status = %record.status, "simulated execution");
        Ok(record)
    }
}
