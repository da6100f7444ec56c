//! Error taxonomy for judging, evaluation, and session control.
//!
//! `JudgeError` is defined here rather than in `skillcheck-judge` so the
//! evaluator can classify judge failures without depending on any concrete
//! client. A wrong answer is never an error: it is a failing `Verdict`.

use thiserror::Error;

use crate::model::QuestionId;

/// Failures of a single judge call.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// No usable credential for the remote backend, or it was rejected.
    /// Fixed by reconfiguration, never by retrying.
    #[error("judge not configured: {0}")]
    Config(String),

    /// The remote call could not complete (network, HTTP status, malformed body).
    #[error("judge transport failure: {0}")]
    Transport(String),
}

/// Failures of the submission evaluator.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The question has no test cases; a catalog defect.
    #[error("question has no test cases")]
    NoTestCases,

    /// The submission is blank.
    #[error("submission is empty")]
    EmptySubmission,

    /// The evaluation was cancelled before it completed.
    #[error("evaluation cancelled")]
    Cancelled,

    #[error(transparent)]
    Judge(#[from] JudgeError),
}

/// Rejected session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session is already finished")]
    Finished,

    #[error("an evaluation is already in progress")]
    EvaluationInProgress,

    #[error("unknown question: {0}")]
    UnknownQuestion(QuestionId),

    #[error("question {requested} is not the current question ({current})")]
    NotCurrentQuestion {
        requested: QuestionId,
        current: QuestionId,
    },

    #[error("question {0} does not accept this kind of answer")]
    WrongQuestionKind(QuestionId),

    #[error("'{option}' is not an option of question {question}")]
    InvalidOption { question: QuestionId, option: String },

    #[error("question {0} has not been answered")]
    Unanswered(QuestionId),
}
