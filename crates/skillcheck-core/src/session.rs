//! Timed session controller.
//!
//! A two-state machine (`Active` → `Finished`) that owns the candidate's
//! progress through an [`Assessment`]: the current question, the recorded
//! answers and the remaining time budget. Coding answers go through the
//! [`SubmissionEvaluator`]; the controller never talks to a judge directly.
//!
//! State lives behind a mutex that is never held across an `.await`. At most
//! one evaluation is in flight per session. Finishing the session (by the
//! candidate or by the countdown) cancels the session token, which cancels
//! the in-flight evaluation; a verdict that arrives after that is discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{EvaluationError, SessionError};
use crate::evaluator::SubmissionEvaluator;
use crate::model::{Answer, AnswerRecord, Assessment, Question, QuestionId, QuestionKind, Verdict};
use crate::report::{AssessmentResult, Termination};
use crate::scoring::{compute_section_scores, overall_score};

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Wall-clock interval of one countdown unit (one second of budget).
    pub tick_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Finished,
}

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub current_index: usize,
    /// `None` once finished.
    pub current_question: Option<QuestionId>,
    pub current_section: Option<String>,
    pub answers: AnswerRecord,
    pub remaining_secs: u64,
    /// Whether a code evaluation is outstanding.
    pub evaluating: bool,
    /// `current_index / question count` as a percentage.
    pub progress_percent: f64,
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A multiple-choice selection was recorded.
    Recorded,
    /// A code submission was evaluated. On a passing verdict the answer was
    /// recorded and the session advanced.
    Evaluated(Verdict),
    /// The session finished while the evaluation was running; nothing changed.
    Discarded,
}

struct Inner {
    status: SessionStatus,
    current_index: usize,
    answers: AnswerRecord,
    remaining_secs: u64,
    in_flight: bool,
    result: Option<AssessmentResult>,
}

/// One candidate's attempt at an assessment.
pub struct SessionController {
    id: Uuid,
    assessment: Arc<Assessment>,
    evaluator: Arc<SubmissionEvaluator>,
    config: SessionConfig,
    started_at: DateTime<Utc>,
    inner: Mutex<Inner>,
    finished: CancellationToken,
}

impl SessionController {
    /// Start a session. An assessment without questions finishes immediately,
    /// as does one with a zero time budget.
    pub fn new(
        assessment: Arc<Assessment>,
        evaluator: Arc<SubmissionEvaluator>,
        config: SessionConfig,
    ) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            inner: Mutex::new(Inner {
                status: SessionStatus::Active,
                current_index: 0,
                answers: AnswerRecord::new(),
                remaining_secs: assessment.time_limit_secs,
                in_flight: false,
                result: None,
            }),
            assessment,
            evaluator,
            config,
            finished: CancellationToken::new(),
        };

        tracing::info!(
            session = %session.id,
            assessment = %session.assessment.id,
            questions = session.assessment.questions.len(),
            time_limit_secs = session.assessment.time_limit_secs,
            "session started"
        );

        {
            let mut inner = session.lock();
            if session.assessment.questions.is_empty() {
                session.finish_locked(&mut inner, Termination::Completed);
            } else if inner.remaining_secs == 0 {
                session.finish_locked(&mut inner, Termination::TimeExpired);
            }
        }
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn assessment(&self) -> &Assessment {
        &self.assessment
    }

    /// Snapshot of the current state.
    pub fn snapshot(&self) -> SessionState {
        let inner = self.lock();
        let current = match inner.status {
            SessionStatus::Active => self.assessment.questions.get(inner.current_index),
            SessionStatus::Finished => None,
        };
        let total = self.assessment.questions.len();
        let progress_percent = match inner.status {
            SessionStatus::Finished => 100.0,
            SessionStatus::Active => inner.current_index as f64 / total as f64 * 100.0,
        };
        SessionState {
            session_id: self.id,
            status: inner.status,
            current_index: inner.current_index,
            current_question: current.map(|q| q.id),
            current_section: current.map(|q| q.section.clone()),
            answers: inner.answers.clone(),
            remaining_secs: inner.remaining_secs,
            evaluating: inner.in_flight,
            progress_percent,
        }
    }

    /// The question the candidate is on, `None` once finished.
    pub fn current_question(&self) -> Option<&Question> {
        let inner = self.lock();
        match inner.status {
            SessionStatus::Active => self.assessment.questions.get(inner.current_index),
            SessionStatus::Finished => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_cancelled()
    }

    /// Resolves once the session has finished.
    pub async fn wait_finished(&self) {
        self.finished.cancelled().await
    }

    /// The result summary, available once finished.
    pub fn result(&self) -> Option<AssessmentResult> {
        self.lock().result.clone()
    }

    /// Submit a raw answer for `question_id`, dispatching on its kind.
    pub async fn submit(
        &self,
        question_id: QuestionId,
        raw_answer: &str,
    ) -> Result<SubmitOutcome, SessionError> {
        let question = self
            .assessment
            .question(question_id)
            .ok_or(SessionError::UnknownQuestion(question_id))?;
        match question.kind {
            QuestionKind::MultipleChoice { .. } => {
                self.select_option(question_id, raw_answer)?;
                Ok(SubmitOutcome::Recorded)
            }
            QuestionKind::Coding { .. } => self.submit_code(question_id, raw_answer).await,
        }
    }

    /// Record a multiple-choice selection for the current question. Does not advance.
    pub fn select_option(&self, question_id: QuestionId, option: &str) -> Result<(), SessionError> {
        let mut inner = self.lock();
        let question = self.check_current(&inner, question_id)?;
        let QuestionKind::MultipleChoice { options } = &question.kind else {
            return Err(SessionError::WrongQuestionKind(question_id));
        };
        if !options.iter().any(|o| o == option) {
            return Err(SessionError::InvalidOption {
                question: question_id,
                option: option.to_string(),
            });
        }
        inner
            .answers
            .insert(question_id, Answer::Choice(option.to_string()));
        tracing::debug!(session = %self.id, question = question_id, "option selected");
        Ok(())
    }

    /// Evaluate code for the current coding question.
    ///
    /// On a passing verdict the answer is recorded and the session advances
    /// (finishing it if this was the last question). A failing verdict changes
    /// nothing. Dropping the returned future cancels the evaluation.
    pub async fn submit_code(
        &self,
        question_id: QuestionId,
        source_code: &str,
    ) -> Result<SubmitOutcome, SessionError> {
        let (language, test_cases, token) = {
            let mut inner = self.lock();
            let question = self.check_current(&inner, question_id)?;
            let QuestionKind::Coding {
                language,
                test_cases,
                ..
            } = &question.kind
            else {
                return Err(SessionError::WrongQuestionKind(question_id));
            };
            if inner.in_flight {
                return Err(SessionError::EvaluationInProgress);
            }
            inner.in_flight = true;
            (language.clone(), test_cases.clone(), self.finished.child_token())
        };
        let mut guard = InFlightGuard {
            session: self,
            armed: true,
        };

        let evaluation = self
            .evaluator
            .evaluate(source_code, &language, &test_cases, &token)
            .await;

        let mut inner = self.lock();
        inner.in_flight = false;
        guard.armed = false;

        if inner.status == SessionStatus::Finished || token.is_cancelled() {
            tracing::warn!(
                session = %self.id,
                question = question_id,
                "session finished during evaluation, discarding verdict"
            );
            return Ok(SubmitOutcome::Discarded);
        }

        let verdict = match evaluation {
            Ok(verdict) => verdict,
            Err(EvaluationError::Cancelled) => return Ok(SubmitOutcome::Discarded),
            Err(e) => {
                tracing::warn!(session = %self.id, question = question_id, "submission not evaluated: {e}");
                Verdict::not_evaluated(e)
            }
        };

        if verdict.passed {
            inner
                .answers
                .insert(question_id, Answer::Code(source_code.to_string()));
            self.advance_locked(&mut inner);
        }
        tracing::info!(
            session = %self.id,
            question = question_id,
            passed = verdict.passed,
            "code submission evaluated"
        );
        Ok(SubmitOutcome::Evaluated(verdict))
    }

    /// Move past the current, answered question. From the last question this
    /// finishes the session.
    pub fn advance(&self) -> Result<SessionStatus, SessionError> {
        let mut inner = self.lock();
        if inner.status == SessionStatus::Finished {
            return Err(SessionError::Finished);
        }
        if inner.in_flight {
            return Err(SessionError::EvaluationInProgress);
        }
        let current = &self.assessment.questions[inner.current_index];
        if !inner.answers.contains_key(&current.id) {
            return Err(SessionError::Unanswered(current.id));
        }
        self.advance_locked(&mut inner);
        Ok(inner.status)
    }

    /// One countdown unit. Reaching zero forces `Finished`; ticks after that
    /// are no-ops.
    pub fn tick(&self) -> SessionStatus {
        let mut inner = self.lock();
        if inner.status == SessionStatus::Finished {
            return SessionStatus::Finished;
        }
        inner.remaining_secs = inner.remaining_secs.saturating_sub(1);
        if inner.remaining_secs == 0 {
            self.finish_locked(&mut inner, Termination::TimeExpired);
        }
        inner.status
    }

    /// Drive [`tick`](Self::tick) every `tick_interval` until the session finishes.
    pub fn spawn_countdown(self: &Arc<Self>) -> JoinHandle<()> {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(session.config.tick_interval);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = session.finished.cancelled() => break,
                    _ = interval.tick() => {
                        if session.tick() == SessionStatus::Finished {
                            break;
                        }
                    }
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_current(&self, inner: &Inner, question_id: QuestionId) -> Result<&Question, SessionError> {
        if inner.status == SessionStatus::Finished {
            return Err(SessionError::Finished);
        }
        if self.assessment.question(question_id).is_none() {
            return Err(SessionError::UnknownQuestion(question_id));
        }
        let current = &self.assessment.questions[inner.current_index];
        if current.id != question_id {
            return Err(SessionError::NotCurrentQuestion {
                requested: question_id,
                current: current.id,
            });
        }
        Ok(current)
    }

    fn advance_locked(&self, inner: &mut Inner) {
        if inner.current_index + 1 < self.assessment.questions.len() {
            inner.current_index += 1;
        } else {
            self.finish_locked(inner, Termination::Completed);
        }
    }

    fn finish_locked(&self, inner: &mut Inner, termination: Termination) {
        if inner.status == SessionStatus::Finished {
            return;
        }
        inner.status = SessionStatus::Finished;
        inner.remaining_secs = 0;

        let section_scores = compute_section_scores(&self.assessment, &inner.answers);
        let overall = overall_score(&section_scores);
        tracing::info!(
            session = %self.id,
            ?termination,
            answered = inner.answers.len(),
            overall_score = overall,
            "session finished"
        );
        inner.result = Some(AssessmentResult {
            session_id: self.id,
            assessment_id: self.assessment.id.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            termination,
            answers: inner.answers.clone(),
            section_scores,
            overall_score: overall,
        });
        self.finished.cancel();
    }
}

/// Clears the in-flight flag if a `submit_code` future is dropped mid-evaluation.
struct InFlightGuard<'a> {
    session: &'a SessionController,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.session.lock().in_flight = false;
        }
    }
}
