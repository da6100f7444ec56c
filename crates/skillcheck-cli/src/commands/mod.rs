pub mod grade;
pub mod init;
pub mod languages;
pub mod run;
pub mod take;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use skillcheck_core::SubmissionEvaluator;
use skillcheck_judge::{create_judge, SkillcheckConfig};

/// Load config and build the evaluator it describes.
pub(crate) fn build_evaluator(
    config_path: Option<&Path>,
) -> Result<(SkillcheckConfig, Arc<SubmissionEvaluator>)> {
    let config = skillcheck_judge::load_config_from(config_path)?;
    tracing::debug!(judge = ?config.judge, "loaded configuration");
    let judge = create_judge(&config.judge)?;
    let evaluator = SubmissionEvaluator::new(judge, config.evaluator_config());
    Ok((config, Arc::new(evaluator)))
}
