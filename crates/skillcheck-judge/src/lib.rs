//! skillcheck-judge: code execution backends.
//!
//! Implements the `JudgeClient` trait for a remote Judge0 endpoint and for
//! an offline simulator, plus the configuration that picks between them.

pub mod config;
pub mod judge0;
pub mod mock;
pub mod simulated;

pub use config::{create_judge, load_config, load_config_from, JudgeConfig, JudgeMode, SkillcheckConfig};
pub use judge0::Judge0Client;
pub use simulated::SimulatedJudge;
