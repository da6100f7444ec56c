//! The `skillcheck grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use tokio_util::sync::CancellationToken;

use skillcheck_core::catalog;
use skillcheck_core::model::{QuestionKind, TestCase, Verdict};

pub async fn execute(
    catalog_path: PathBuf,
    question_id: u32,
    source_path: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let assessment = catalog::parse_assessment(&catalog_path)?;
    let question = assessment
        .question(question_id)
        .with_context(|| format!("question {question_id} not found in {}", assessment.id))?;
    let QuestionKind::Coding {
        language,
        test_cases,
        ..
    } = &question.kind
    else {
        anyhow::bail!("question {question_id} is not a coding question");
    };

    let source = std::fs::read_to_string(&source_path)
        .with_context(|| format!("failed to read source: {}", source_path.display()))?;
    let (_, evaluator) = super::build_evaluator(config_path.as_deref())?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    eprintln!(
        "Grading question {question_id} ({language}, {} test cases)",
        test_cases.len()
    );
    let verdict = evaluator
        .evaluate(&source, language, test_cases, &cancel)
        .await?;

    print_verdict(&verdict, test_cases);
    Ok(())
}

fn print_verdict(verdict: &Verdict, test_cases: &[TestCase]) {
    if !verdict.per_case.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Case", "Input", "Expected", "Actual", "Status", "Result", "Time"]);

        for (i, (case, result)) in test_cases.iter().zip(&verdict.per_case).enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&case.input),
                Cell::new(&case.expected_output),
                Cell::new(result.record.stdout.as_deref().unwrap_or("-").trim()),
                Cell::new(&result.record.status),
                Cell::new(if result.passed { "PASS" } else { "FAIL" }),
                Cell::new(format!("{}ms", result.record.elapsed_ms)),
            ]);
        }
        println!("{table}");
        println!(
            "{}/{} test cases passed",
            verdict.passed_count(),
            verdict.per_case.len()
        );
    }

    println!("{}", verdict.message);
}
