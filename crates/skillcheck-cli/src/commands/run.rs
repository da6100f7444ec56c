//! The `skillcheck run` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub async fn execute(
    language: String,
    source_path: PathBuf,
    stdin: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let source = std::fs::read_to_string(&source_path)
        .with_context(|| format!("failed to read source: {}", source_path.display()))?;
    let (_, evaluator) = super::build_evaluator(config_path.as_deref())?;

    let record = evaluator.run_custom(&source, &language, &stdin).await?;

    eprintln!(
        "Status: {} ({}ms, {} KB)",
        record.status,
        record.elapsed_ms,
        record.memory_bytes / 1024
    );

    let shown = non_empty(&record.stdout)
        .or_else(|| non_empty(&record.stderr))
        .or_else(|| non_empty(&record.compile_output))
        .unwrap_or("No output");
    println!("{shown}");

    Ok(())
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim_end).filter(|s| !s.is_empty())
}
