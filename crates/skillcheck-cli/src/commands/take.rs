//! The `skillcheck take` command.
//!
//! Replays an answer sheet through a timed session. A question the sheet
//! cannot get past (missing answer, rejected option, failing code) leaves the
//! session on that question until the timer expires.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use serde::Deserialize;

use skillcheck_core::catalog;
use skillcheck_core::model::QuestionId;
use skillcheck_core::report::{AssessmentResult, Termination};
use skillcheck_core::{SessionController, SubmitOutcome};

#[derive(Debug, Deserialize)]
struct AnswerSheet {
    #[serde(default)]
    answers: BTreeMap<String, String>,
}

fn load_answer_sheet(path: &Path) -> Result<BTreeMap<QuestionId, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer sheet: {}", path.display()))?;
    let sheet: AnswerSheet = toml::from_str(&content)
        .with_context(|| format!("failed to parse answer sheet: {}", path.display()))?;

    sheet
        .answers
        .into_iter()
        .map(|(key, answer)| {
            let id = key
                .trim()
                .parse::<QuestionId>()
                .with_context(|| format!("invalid question id in answer sheet: '{key}'"))?;
            Ok((id, answer))
        })
        .collect()
}

pub async fn execute(
    catalog_path: PathBuf,
    answers_path: PathBuf,
    time_limit: Option<u64>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut assessment = catalog::parse_assessment(&catalog_path)?;
    if let Some(limit) = time_limit {
        assessment.time_limit_secs = limit;
    }
    let sheet = load_answer_sheet(&answers_path)?;
    let (config, evaluator) = super::build_evaluator(config_path.as_deref())?;

    eprintln!(
        "skillcheck: {} ({} questions, {}s)",
        assessment.name,
        assessment.questions.len(),
        assessment.time_limit_secs
    );

    let session = Arc::new(SessionController::new(
        Arc::new(assessment),
        evaluator,
        config.session_config(),
    ));
    let countdown = session.spawn_countdown();

    replay(&session, &sheet).await;
    if !session.is_finished() {
        eprintln!("Waiting for the timer to expire...");
        session.wait_finished().await;
    }
    countdown.await.context("countdown task failed")?;

    let result = session
        .result()
        .context("session finished without a result")?;
    print_result(&result);

    if let Some(path) = output {
        result.save_json(&path)?;
        eprintln!("Result saved to: {}", path.display());
    }
    Ok(())
}

/// Answer questions in order until the session finishes or gets stuck.
async fn replay(session: &SessionController, sheet: &BTreeMap<QuestionId, String>) {
    while let Some(question) = session.current_question() {
        let id = question.id;
        let state = session.snapshot();
        eprintln!(
            "  [{id}] {} ({:.0}% done, {}s left)",
            question.section, state.progress_percent, state.remaining_secs
        );

        let Some(answer) = sheet.get(&id) else {
            eprintln!("  [{id}] no answer on the sheet");
            return;
        };

        match session.submit(id, answer).await {
            Ok(SubmitOutcome::Recorded) => {
                if let Err(e) = session.advance() {
                    eprintln!("  [{id}] could not advance: {e}");
                    return;
                }
            }
            Ok(SubmitOutcome::Evaluated(verdict)) => {
                eprintln!("  [{id}] {}", verdict.message);
                if !verdict.passed {
                    return;
                }
            }
            Ok(SubmitOutcome::Discarded) => {
                eprintln!("  [{id}] time expired during evaluation");
                return;
            }
            Err(e) => {
                eprintln!("  [{id}] rejected: {e}");
                return;
            }
        }
    }
}

fn print_result(result: &AssessmentResult) {
    let mut table = Table::new();
    table.set_header(vec!["Section", "Correct", "Total", "Score"]);

    for score in &result.section_scores {
        table.add_row(vec![
            Cell::new(&score.section),
            Cell::new(score.correct),
            Cell::new(score.total),
            Cell::new(format!("{:.1}%", score.percentage)),
        ]);
    }

    println!("{table}");
    let termination = match result.termination {
        Termination::Completed => "completed",
        Termination::TimeExpired => "time expired",
    };
    println!("Session {termination}");
    println!("Overall score: {}%", result.overall_score);
}
