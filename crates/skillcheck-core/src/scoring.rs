//! Section and overall scoring.
//!
//! Scores are computed once, when a session finishes, from the recorded
//! answers and the static answer key.

use serde::{Deserialize, Serialize};

use crate::model::{Answer, AnswerKey, AnswerRecord, Assessment, Question, QuestionKind};

/// Score of one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub section: String,
    /// Questions answered correctly.
    pub correct: u32,
    /// Questions in the section, answered or not.
    pub total: u32,
    /// `correct / total` as a percentage in [0, 100].
    pub percentage: f64,
}

/// Whether `question` counts as correctly answered.
///
/// Multiple-choice: exact match against the answer key. Coding: an answer
/// exists, since coding answers are only ever recorded after a passing
/// verdict. Nothing is re-graded here.
pub fn is_correct(question: &Question, answers: &AnswerRecord, key: &AnswerKey) -> bool {
    match (&question.kind, answers.get(&question.id)) {
        (QuestionKind::MultipleChoice { .. }, Some(Answer::Choice(selected))) => {
            key.get(&question.id).is_some_and(|correct| correct == selected)
        }
        (QuestionKind::Coding { .. }, Some(Answer::Code(_))) => true,
        _ => false,
    }
}

/// Per-section scores in section order. Unanswered questions count toward
/// the total as incorrect.
pub fn compute_section_scores(assessment: &Assessment, answers: &AnswerRecord) -> Vec<SectionScore> {
    assessment
        .sections()
        .into_iter()
        .map(|section| {
            let (correct, total) = assessment
                .questions
                .iter()
                .filter(|q| q.section == section)
                .fold((0u32, 0u32), |(correct, total), q| {
                    let hit = is_correct(q, answers, &assessment.answer_key);
                    (correct + u32::from(hit), total + 1)
                });
            SectionScore {
                section: section.to_string(),
                correct,
                total,
                percentage: percentage(correct, total),
            }
        })
        .collect()
}

/// Unweighted mean of the section percentages, rounded to the nearest integer.
pub fn overall_score(sections: &[SectionScore]) -> u32 {
    if sections.is_empty() {
        return 0;
    }
    let sum: f64 = sections.iter().map(|s| s.percentage).sum();
    (sum / sections.len() as f64).round() as u32
}

fn percentage(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}
