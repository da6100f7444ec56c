//! Mock judge for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use skillcheck_core::error::JudgeError;
use skillcheck_core::model::ExecutionRecord;
use skillcheck_core::traits::{ExecutionRequest, JudgeClient};

/// Scripted outcome of one call.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Successful run printing this stdout.
    Stdout(String),
    /// Successful run with no stdout (e.g. a compile error).
    NoOutput { status: String, stderr: String },
    /// `JudgeError::Transport` with this message.
    Transport(String),
    /// `JudgeError::Config` with this message.
    Config(String),
}

/// A mock judge for exercising the evaluator and session without a backend.
///
/// Outcomes and delays are keyed by the request's stdin. Unscripted inputs
/// echo their stdin back as stdout.
pub struct MockJudge {
    outcomes: HashMap<String, MockOutcome>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    call_count: AtomicU32,
    completed: AtomicU32,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
    last_request: Mutex<Option<ExecutionRequest>>,
}

impl Default for MockJudge {
    fn default() -> Self {
        Self::new()
    }
}

impl MockJudge {
    /// Create an echoing mock judge.
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            delays: HashMap::new(),
            default_delay: Duration::ZERO,
            call_count: AtomicU32::new(0),
            completed: AtomicU32::new(0),
            in_flight: AtomicU32::new(0),
            max_in_flight: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Script the outcome for requests with this stdin.
    pub fn with_outcome(mut self, stdin: &str, outcome: MockOutcome) -> Self {
        self.outcomes.insert(stdin.to_string(), outcome);
        self
    }

    /// Shorthand for `MockOutcome::Stdout`.
    pub fn with_stdout(self, stdin: &str, stdout: &str) -> Self {
        self.with_outcome(stdin, MockOutcome::Stdout(stdout.to_string()))
    }

    /// Delay calls with this stdin.
    pub fn with_delay(mut self, stdin: &str, delay: Duration) -> Self {
        self.delays.insert(stdin.to_string(), delay);
        self
    }

    /// Delay every call without its own delay.
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// Number of calls started.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Number of calls that ran to completion (were not dropped mid-flight).
    pub fn completed_count(&self) -> u32 {
        self.completed.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous calls observed.
    pub fn max_in_flight(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Get the last request made to this judge.
    pub fn last_request(&self) -> Option<ExecutionRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

struct InFlight<'a>(&'a AtomicU32);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn record(stdout: Option<String>, status: &str, stderr: Option<String>) -> ExecutionRecord {
    ExecutionRecord {
        stdout,
        stderr,
        compile_output: None,
        status: status.to_string(),
        elapsed_ms: 1,
        memory_bytes: 0,
    }
}

#[async_trait]
impl JudgeClient for MockJudge {
    fn name(&self) -> &str {
        "mock"
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionRecord, JudgeError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self
            .last_request
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let delay = self
            .delays
            .get(&request.stdin)
            .copied()
            .unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        match self.outcomes.get(&request.stdin) {
            None => Ok(record(Some(request.stdin.clone()), "Accepted", None)),
            Some(MockOutcome::Stdout(out)) => Ok(record(Some(out.clone()), "Accepted", None)),
            Some(MockOutcome::NoOutput { status, stderr }) => {
                Ok(record(None, status, Some(stderr.clone())))
            }
            Some(MockOutcome::Transport(msg)) => Err(JudgeError::Transport(msg.clone())),
            Some(MockOutcome::Config(msg)) => Err(JudgeError::Config(msg.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillcheck_core::languages::LanguageId;

    fn request(stdin: &str) -> ExecutionRequest {
        ExecutionRequest {
            source_code: "print(input())".into(),
            language_id: LanguageId(71),
            stdin: stdin.into(),
            expected_output: None,
        }
    }

    #[tokio::test]
    async fn echoes_unscripted_input() {
        let judge = MockJudge::new();
        let record = judge.execute(&request("hello")).await.unwrap();
        assert_eq!(record.stdout.as_deref(), Some("hello"));
        assert_eq!(judge.call_count(), 1);
        assert_eq!(judge.last_request().unwrap().stdin, "hello");
    }

    #[tokio::test]
    async fn scripted_outcomes() {
        let judge = MockJudge::new()
            .with_stdout("2", "4")
            .with_outcome("boom", MockOutcome::Transport("connection reset".into()))
            .with_outcome(
                "cc",
                MockOutcome::NoOutput {
                    status: "Compilation Error".into(),
                    stderr: "syntax error".into(),
                },
            );

        assert_eq!(
            judge.execute(&request("2")).await.unwrap().stdout.as_deref(),
            Some("4")
        );
        assert!(matches!(
            judge.execute(&request("boom")).await,
            Err(JudgeError::Transport(_))
        ));
        let cc = judge.execute(&request("cc")).await.unwrap();
        assert!(cc.stdout.is_none());
        assert_eq!(cc.status, "Compilation Error");
        assert_eq!(judge.completed_count(), 3);
    }
}
