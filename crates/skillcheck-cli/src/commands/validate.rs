//! The `skillcheck validate` command.

use std::path::PathBuf;

use anyhow::Result;

use skillcheck_core::catalog;
use skillcheck_core::languages::LanguageRegistry;

pub fn execute(catalog_path: PathBuf) -> Result<()> {
    let assessments = catalog::load_catalogs(&catalog_path)?;
    let languages = LanguageRegistry::builtin();

    let mut total_warnings = 0;

    for assessment in &assessments {
        println!(
            "Assessment: {} ({} questions, {} sections, {}s)",
            assessment.name,
            assessment.questions.len(),
            assessment.sections().len(),
            assessment.time_limit_secs,
        );

        let warnings = catalog::validate_assessment(assessment, &languages);
        for w in &warnings {
            let prefix = w
                .question_id
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All catalogs valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
