//! skillcheck-core: assessment evaluation engine.
//!
//! This crate defines the assessment data model, the judge client trait, the
//! submission evaluator, the timed session controller, and scoring.

pub mod catalog;
pub mod error;
pub mod evaluator;
pub mod languages;
pub mod model;
pub mod report;
pub mod scoring;
pub mod session;
pub mod traits;

pub use error::{EvaluationError, JudgeError, SessionError};
pub use evaluator::{EvaluatorConfig, SubmissionEvaluator};
pub use session::{SessionConfig, SessionController, SessionState, SessionStatus, SubmitOutcome};
pub use traits::{ExecutionRequest, JudgeClient};
