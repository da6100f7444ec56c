//! The judge client trait.
//!
//! Implemented by the remote Judge0 client, the simulated judge, and the
//! mock judge in `skillcheck-judge`. The evaluator only ever sees this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::JudgeError;
use crate::languages::LanguageId;
use crate::model::ExecutionRecord;

/// Trait for backends that execute one submission against one input.
///
/// Implementations must not retry: a call is at-most-once.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// Human-readable backend name (e.g. "judge0").
    fn name(&self) -> &str;

    /// Run `request.source_code` with `request.stdin` and return the normalized record.
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionRecord, JudgeError>;
}

/// One code+input pair sent to a judge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub source_code: String,
    pub language_id: LanguageId,
    #[serde(default)]
    pub stdin: String,
    /// Expected stdout, forwarded so the backend can report a status
    /// ("Accepted"/"Wrong Answer"). The evaluator grades independently.
    #[serde(default)]
    pub expected_output: Option<String>,
}
