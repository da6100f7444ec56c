//! Submission evaluator.
//!
//! Runs one submission against every test case of a coding question through a
//! [`JudgeClient`], with bounded parallelism, and reduces the execution
//! records into a single [`Verdict`].

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::error::{EvaluationError, JudgeError};
use crate::languages::LanguageRegistry;
use crate::model::{CaseResult, ExecutionRecord, TestCase, Verdict};
use crate::traits::{ExecutionRequest, JudgeClient};

/// Configuration for the evaluator.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Maximum judge calls in flight for one submission.
    pub max_concurrency: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self { max_concurrency: 4 }
    }
}

/// Grades submissions against test cases.
pub struct SubmissionEvaluator {
    judge: Arc<dyn JudgeClient>,
    languages: LanguageRegistry,
    config: EvaluatorConfig,
}

impl SubmissionEvaluator {
    pub fn new(judge: Arc<dyn JudgeClient>, config: EvaluatorConfig) -> Self {
        Self {
            judge,
            languages: LanguageRegistry::builtin(),
            config,
        }
    }

    pub fn with_languages(mut self, languages: LanguageRegistry) -> Self {
        self.languages = languages;
        self
    }

    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    /// Evaluate `source_code` against `test_cases`.
    ///
    /// A judge failure on any case aborts the remaining calls and yields a
    /// `NotEvaluated` verdict, never a partial one. Cancelling `cancel` drops
    /// every outstanding judge call and returns [`EvaluationError::Cancelled`].
    pub async fn evaluate(
        &self,
        source_code: &str,
        language: &str,
        test_cases: &[TestCase],
        cancel: &CancellationToken,
    ) -> Result<Verdict, EvaluationError> {
        if test_cases.is_empty() {
            return Err(EvaluationError::NoTestCases);
        }
        let source = normalize_submission(source_code)?;
        let language_id = self.languages.resolve(language);

        tracing::info!(
            judge = self.judge.name(),
            %language_id,
            cases = test_cases.len(),
            "evaluating submission"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut futures = FuturesUnordered::new();

        for (index, case) in test_cases.iter().enumerate() {
            let judge = Arc::clone(&self.judge);
            let semaphore = Arc::clone(&semaphore);
            let request = ExecutionRequest {
                source_code: source.clone(),
                language_id,
                stdin: case.input.clone(),
                expected_output: Some(case.expected_output.clone()),
            };

            futures.push(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => judge.execute(&request).await,
                    Err(_) => Err(JudgeError::Transport("dispatch queue closed".into())),
                };
                (index, result)
            });
        }

        let mut records: Vec<(usize, ExecutionRecord)> = Vec::with_capacity(test_cases.len());
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("evaluation cancelled, dropping outstanding judge calls");
                    return Err(EvaluationError::Cancelled);
                }
                next = futures.next() => match next {
                    Some((index, Ok(record))) => {
                        tracing::debug!(case = index, status = %record.status, "test case executed");
                        records.push((index, record));
                    }
                    Some((index, Err(e))) => {
                        tracing::warn!(case = index, "judge call failed, aborting evaluation: {e}");
                        return Ok(Verdict::not_evaluated(e));
                    }
                    None => break,
                },
            }
        }

        records.sort_by_key(|(index, _)| *index);
        let per_case = records
            .into_iter()
            .zip(test_cases)
            .map(|((_, record), case)| {
                let passed = output_matches(record.stdout.as_deref(), &case.expected_output);
                CaseResult { record, passed }
            })
            .collect();

        Ok(Verdict::from_cases(per_case))
    }

    /// Run the submission once against arbitrary input, without grading.
    pub async fn run_custom(
        &self,
        source_code: &str,
        language: &str,
        stdin: &str,
    ) -> Result<ExecutionRecord, EvaluationError> {
        let source = normalize_submission(source_code)?;
        let request = ExecutionRequest {
            source_code: source,
            language_id: self.languages.resolve(language),
            stdin: stdin.to_string(),
            expected_output: None,
        };
        Ok(self.judge.execute(&request).await?)
    }
}

/// Normalize line endings and reject blank submissions.
pub fn normalize_submission(source_code: &str) -> Result<String, EvaluationError> {
    if source_code.trim().is_empty() {
        return Err(EvaluationError::EmptySubmission);
    }
    Ok(source_code.replace("\r\n", "\n"))
}

/// Trim-only, case-sensitive comparison. Missing stdout never matches.
pub fn output_matches(stdout: Option<&str>, expected_output: &str) -> bool {
    match stdout {
        Some(actual) => actual.trim() == expected_output.trim(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::model::{VerdictOutcome, MSG_ACCEPTED, MSG_WRONG_ANSWER};

    /// Doubles the number on stdin; fails on the input "boom".
    struct DoublingJudge {
        calls: AtomicU32,
    }

    impl DoublingJudge {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl JudgeClient for DoublingJudge {
        fn name(&self) -> &str {
            "doubling"
        }

        async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionRecord, JudgeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.stdin == "boom" {
                return Err(JudgeError::Transport("connection reset".into()));
            }
            let stdout = request
                .stdin
                .trim()
                .parse::<i64>()
                .map(|n| format!("{}\n", n * 2))
                .ok();
            Ok(ExecutionRecord {
                stdout,
                stderr: None,
                compile_output: None,
                status: "Accepted".into(),
                elapsed_ms: 1,
                memory_bytes: 1024,
            })
        }
    }

    fn evaluator(judge: Arc<DoublingJudge>) -> SubmissionEvaluator {
        SubmissionEvaluator::new(judge, EvaluatorConfig::default())
    }

    #[test]
    fn comparison_trims_whitespace_only() {
        assert!(output_matches(Some("true\n"), "true"));
        assert!(output_matches(Some("  42  "), "42\n"));
        assert!(!output_matches(Some("True"), "true"));
        assert!(!output_matches(Some("4 2"), "42"));
        assert!(!output_matches(None, ""));
    }

    #[test]
    fn normalize_rejects_blank_and_unifies_line_endings() {
        assert!(matches!(
            normalize_submission("  \n\t"),
            Err(EvaluationError::EmptySubmission)
        ));
        assert_eq!(normalize_submission("a\r\nb").unwrap(), "a\nb");
    }

    #[tokio::test]
    async fn empty_test_cases_never_reach_the_judge() {
        let judge = Arc::new(DoublingJudge::new());
        let err = evaluator(judge.clone())
            .evaluate("print(1)", "python", &[], &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::NoTestCases));
        assert_eq!(judge.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn all_cases_passing_is_accepted() {
        let judge = Arc::new(DoublingJudge::new());
        let cases = vec![TestCase::new("1", "2"), TestCase::new("21", "42")];
        let verdict = evaluator(judge.clone())
            .evaluate("code", "python", &cases, &CancellationToken::new())
            .await
            .unwrap();
        assert!(verdict.passed);
        assert_eq!(verdict.message, MSG_ACCEPTED);
        assert_eq!(verdict.per_case.len(), 2);
        assert_eq!(judge.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn one_mismatch_fails_the_verdict() {
        let judge = Arc::new(DoublingJudge::new());
        let cases = vec![TestCase::new("1", "2"), TestCase::new("2", "5")];
        let verdict = evaluator(judge)
            .evaluate("code", "python", &cases, &CancellationToken::new())
            .await
            .unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.outcome, VerdictOutcome::WrongAnswer);
        assert_eq!(verdict.message, MSG_WRONG_ANSWER);
        assert!(verdict.per_case[0].passed);
        assert!(!verdict.per_case[1].passed);
    }

    #[tokio::test]
    async fn missing_stdout_fails_the_case() {
        let judge = Arc::new(DoublingJudge::new());
        let cases = vec![TestCase::new("not a number", "")];
        let verdict = evaluator(judge)
            .evaluate("code", "python", &cases, &CancellationToken::new())
            .await
            .unwrap();
        assert!(!verdict.passed);
        assert!(verdict.per_case[0].record.stdout.is_none());
    }

    #[tokio::test]
    async fn judge_failure_is_a_global_not_evaluated_verdict() {
        let judge = Arc::new(DoublingJudge::new());
        let cases = vec![
            TestCase::new("1", "2"),
            TestCase::new("boom", "?"),
            TestCase::new("3", "6"),
        ];
        let verdict = evaluator(judge)
            .evaluate("code", "python", &cases, &CancellationToken::new())
            .await
            .unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.outcome, VerdictOutcome::NotEvaluated);
        assert!(verdict.per_case.is_empty());
        assert!(verdict.message.contains("connection reset"));
    }

    #[tokio::test]
    async fn pre_cancelled_evaluation_returns_cancelled() {
        let judge = Arc::new(DoublingJudge::new());
        let token = CancellationToken::new();
        token.cancel();
        let err = evaluator(judge)
            .evaluate("code", "python", &[TestCase::new("1", "2")], &token)
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Cancelled));
    }

    #[tokio::test]
    async fn run_custom_returns_raw_record_and_propagates_errors() {
        let judge = Arc::new(DoublingJudge::new());
        let eval = evaluator(judge);
        let record = eval.run_custom("code", "python", "5").await.unwrap();
        assert_eq!(record.stdout.as_deref(), Some("10\n"));

        let err = eval.run_custom("code", "python", "boom").await.unwrap_err();
        assert!(matches!(err, EvaluationError::Judge(JudgeError::Transport(_))));
    }
}
