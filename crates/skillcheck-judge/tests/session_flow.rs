//! Full session runs with real judge clients behind the evaluator.

use std::sync::Arc;
use std::time::Duration;

use skillcheck_core::evaluator::{EvaluatorConfig, SubmissionEvaluator};
use skillcheck_core::model::{AnswerKey, Assessment, Question, QuestionKind, TestCase, VerdictOutcome};
use skillcheck_core::report::Termination;
use skillcheck_core::{SessionConfig, SessionController, SessionError, SessionStatus, SubmitOutcome};
use skillcheck_judge::mock::{MockJudge, MockOutcome};
use skillcheck_judge::SimulatedJudge;

const PRIME_CHECK: &str = r#"
const n = parseInt(require('fs').readFileSync(0, 'utf8'));
function isPrime(n) {
  if (n < 2) return false;
  for (let i = 2; i * i <= n; i++) if (n % i === 0) return false;
  return true;
}
console.log(isPrime(n));
"#;

fn coding_question(id: u32, section: &str) -> Question {
    Question {
        id,
        section: section.into(),
        prompt: "Read an integer and print whether it is prime.".into(),
        kind: QuestionKind::Coding {
            language: "javascript".into(),
            starter_code: String::new(),
            test_cases: vec![TestCase::new("7", "true"), TestCase::new("10", "false")],
        },
    }
}

fn mixed_assessment(time_limit_secs: u64) -> Assessment {
    let mut answer_key = AnswerKey::new();
    answer_key.insert(1, "Infrastructure as Code".into());
    Assessment {
        id: "mixed".into(),
        name: "Mixed".into(),
        description: String::new(),
        time_limit_secs,
        questions: vec![
            Question {
                id: 1,
                section: "Cloud Engineer".into(),
                prompt: "What does IaC stand for?".into(),
                kind: QuestionKind::MultipleChoice {
                    options: vec![
                        "Infrastructure as Code".into(),
                        "Internet as a Cloud".into(),
                    ],
                },
            },
            coding_question(2, "Full-Stack Developer"),
        ],
        answer_key,
    }
}

fn coding_only(time_limit_secs: u64) -> Assessment {
    Assessment {
        id: "coding".into(),
        name: "Coding".into(),
        description: String::new(),
        time_limit_secs,
        questions: vec![coding_question(1, "Full-Stack Developer")],
        answer_key: AnswerKey::new(),
    }
}

fn session_with(judge: Arc<dyn skillcheck_core::JudgeClient>, assessment: Assessment) -> Arc<SessionController> {
    let evaluator = Arc::new(SubmissionEvaluator::new(judge, EvaluatorConfig::default()));
    Arc::new(SessionController::new(
        Arc::new(assessment),
        evaluator,
        SessionConfig::default(),
    ))
}

#[tokio::test]
async fn completes_with_simulated_judge() {
    let session = session_with(Arc::new(SimulatedJudge::default()), mixed_assessment(600));

    session.select_option(1, "Infrastructure as Code").unwrap();
    assert_eq!(session.advance().unwrap(), SessionStatus::Active);

    let outcome = session.submit(2, "return 10;").await.unwrap();
    let SubmitOutcome::Evaluated(verdict) = outcome else {
        panic!("expected an evaluated submission");
    };
    assert!(!verdict.passed);
    assert_eq!(session.snapshot().current_question, Some(2));
    assert_eq!(session.advance(), Err(SessionError::Unanswered(2)));

    let outcome = session.submit(2, PRIME_CHECK).await.unwrap();
    let SubmitOutcome::Evaluated(verdict) = outcome else {
        panic!("expected an evaluated submission");
    };
    assert!(verdict.passed);
    assert!(session.is_finished());

    let result = session.result().unwrap();
    assert_eq!(result.termination, Termination::Completed);
    assert_eq!(result.overall_score, 100);
    assert_eq!(result.section_percentage("Cloud Engineer"), Some(100.0));
    assert_eq!(result.section_percentage("Full-Stack Developer"), Some(100.0));
}

#[tokio::test(start_paused = true)]
async fn timer_expiry_discards_inflight_evaluation() {
    let judge = Arc::new(MockJudge::new().with_default_delay(Duration::from_secs(10)));
    let session = session_with(judge.clone(), coding_only(3));
    let countdown = session.spawn_countdown();

    let outcome = session.submit_code(1, PRIME_CHECK).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Discarded);
    countdown.await.unwrap();

    assert!(session.is_finished());
    assert_eq!(judge.completed_count(), 0);

    let state = session.snapshot();
    assert!(!state.evaluating);
    assert!(state.answers.is_empty());

    let result = session.result().unwrap();
    assert_eq!(result.termination, Termination::TimeExpired);
    assert_eq!(result.overall_score, 0);
}

#[tokio::test]
async fn judge_outage_leaves_question_open() {
    let judge = Arc::new(
        MockJudge::new().with_outcome("7", MockOutcome::Transport("503 from upstream".into())),
    );
    let session = session_with(judge, coding_only(600));

    let outcome = session.submit_code(1, PRIME_CHECK).await.unwrap();
    let SubmitOutcome::Evaluated(verdict) = outcome else {
        panic!("expected an evaluated submission");
    };
    assert_eq!(verdict.outcome, VerdictOutcome::NotEvaluated);

    let state = session.snapshot();
    assert_eq!(state.status, SessionStatus::Active);
    assert_eq!(state.current_question, Some(1));
    assert!(!state.evaluating);
    assert!(state.answers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn wait_finished_resolves_on_expiry() {
    let session = session_with(Arc::new(SimulatedJudge::default()), mixed_assessment(5));
    let countdown = session.spawn_countdown();

    session.select_option(1, "Internet as a Cloud").unwrap();
    session.wait_finished().await;
    countdown.await.unwrap();

    let result = session.result().unwrap();
    assert_eq!(result.termination, Termination::TimeExpired);
    assert_eq!(result.section_percentage("Cloud Engineer"), Some(0.0));
    assert_eq!(result.answers.len(), 1);
}
