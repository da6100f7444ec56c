//! Core data model types for skillcheck.
//!
//! These types describe an assessment catalog (questions, test cases, the
//! answer key) and the artifacts produced while grading it (execution
//! records, verdicts, answers).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a question within an assessment.
pub type QuestionId = u32;

/// One hidden input/expected-output pair for a coding question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Text fed to the program on stdin.
    #[serde(default)]
    pub input: String,
    /// Expected stdout, compared after trimming.
    pub expected_output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

/// Normalized result of running one submission against one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Program stdout, if the judge produced any.
    #[serde(default)]
    pub stdout: Option<String>,
    /// Program stderr.
    #[serde(default)]
    pub stderr: Option<String>,
    /// Compiler diagnostics.
    #[serde(default)]
    pub compile_output: Option<String>,
    /// Judge status description (e.g. "Accepted", "Wrong Answer").
    pub status: String,
    /// Wall time reported by the judge, in milliseconds.
    #[serde(default)]
    pub elapsed_ms: u64,
    /// Peak memory reported by the judge, in bytes.
    #[serde(default)]
    pub memory_bytes: u64,
}

/// How a verdict was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictOutcome {
    /// Every test case matched.
    Accepted,
    /// The code ran but at least one case did not match.
    WrongAnswer,
    /// The submission could not be evaluated at all (judge unreachable,
    /// misconfigured, or the question is malformed).
    NotEvaluated,
}

/// Per-test-case outcome inside a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    pub record: ExecutionRecord,
    pub passed: bool,
}

/// Reduced outcome of evaluating one submission against all its test cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    pub outcome: VerdictOutcome,
    pub message: String,
    /// In test-case order.
    #[serde(default)]
    pub per_case: Vec<CaseResult>,
}

/// Message for a fully accepted submission.
pub const MSG_ACCEPTED: &str = "All test cases passed successfully.";
/// Message for a submission that ran but failed at least one case.
pub const MSG_WRONG_ANSWER: &str = "Output did not match expected result";
/// Prefix of the message for a submission that could not be evaluated.
pub const MSG_NOT_EVALUATED: &str = "Could not evaluate submission";

impl Verdict {
    /// Reduce per-case results into a verdict.
    pub fn from_cases(per_case: Vec<CaseResult>) -> Self {
        let passed = !per_case.is_empty() && per_case.iter().all(|c| c.passed);
        let (outcome, message) = if passed {
            (VerdictOutcome::Accepted, MSG_ACCEPTED)
        } else {
            (VerdictOutcome::WrongAnswer, MSG_WRONG_ANSWER)
        };
        Self {
            passed,
            outcome,
            message: message.to_string(),
            per_case,
        }
    }

    /// A global failure: nothing was graded.
    pub fn not_evaluated(reason: impl fmt::Display) -> Self {
        Self {
            passed: false,
            outcome: VerdictOutcome::NotEvaluated,
            message: format!("{MSG_NOT_EVALUATED}: {reason}"),
            per_case: Vec::new(),
        }
    }

    /// Number of cases that passed.
    pub fn passed_count(&self) -> usize {
        self.per_case.iter().filter(|c| c.passed).count()
    }
}

/// The two closed question variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
    },
    Coding {
        language: String,
        #[serde(default)]
        starter_code: String,
        test_cases: Vec<TestCase>,
    },
}

/// A single assessment question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    /// Section label (e.g. "Cloud Engineer").
    pub section: String,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    pub fn is_coding(&self) -> bool {
        matches!(self.kind, QuestionKind::Coding { .. })
    }
}

/// A user's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// A selected multiple-choice option.
    Choice(String),
    /// Accepted source code.
    Code(String),
}

/// Question id → answer. Unanswered questions have no entry.
pub type AnswerRecord = BTreeMap<QuestionId, Answer>;

/// Question id → correct option, for multiple-choice questions.
pub type AnswerKey = BTreeMap<QuestionId, String>;

/// A complete, immutable assessment catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Global time budget in seconds.
    pub time_limit_secs: u64,
    /// Questions in presentation order.
    pub questions: Vec<Question>,
    /// Correct options for the multiple-choice questions.
    #[serde(default)]
    pub answer_key: AnswerKey,
}

impl Assessment {
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Section labels in order of first appearance.
    pub fn sections(&self) -> Vec<&str> {
        let mut sections: Vec<&str> = Vec::new();
        for q in &self.questions {
            if !sections.contains(&q.section.as_str()) {
                sections.push(&q.section);
            }
        }
        sections
    }
}
