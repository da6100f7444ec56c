use criterion::{black_box, criterion_group, criterion_main, Criterion};

use skillcheck_core::evaluator::output_matches;
use skillcheck_core::model::{
    Answer, AnswerKey, AnswerRecord, Assessment, Question, QuestionKind, TestCase,
};
use skillcheck_core::scoring::{compute_section_scores, overall_score};

fn make_assessment(sections: u32, per_section: u32) -> (Assessment, AnswerRecord) {
    let mut questions = Vec::new();
    let mut answer_key = AnswerKey::new();
    let mut answers = AnswerRecord::new();

    for s in 0..sections {
        for i in 0..per_section {
            let id = s * per_section + i;
            let kind = if i % 3 == 0 {
                QuestionKind::Coding {
                    language: "python".into(),
                    starter_code: String::new(),
                    test_cases: vec![TestCase::new("1", "1")],
                }
            } else {
                answer_key.insert(id, "a".into());
                QuestionKind::MultipleChoice {
                    options: vec!["a".into(), "b".into()],
                }
            };
            if i % 2 == 0 {
                let answer = match &kind {
                    QuestionKind::Coding { .. } => Answer::Code("print(1)".into()),
                    QuestionKind::MultipleChoice { .. } => Answer::Choice("a".into()),
                };
                answers.insert(id, answer);
            }
            questions.push(Question {
                id,
                section: format!("section-{s}"),
                prompt: String::new(),
                kind,
            });
        }
    }

    let assessment = Assessment {
        id: "bench".into(),
        name: "Bench".into(),
        description: String::new(),
        time_limit_secs: 3600,
        questions,
        answer_key,
    };
    (assessment, answers)
}

fn bench_section_scores(c: &mut Criterion) {
    let mut group = c.benchmark_group("section_scores");

    for (sections, per_section) in [(5, 5), (10, 50)] {
        let (assessment, answers) = make_assessment(sections, per_section);
        group.bench_function(format!("{sections}x{per_section}"), |b| {
            b.iter(|| {
                let scores = compute_section_scores(black_box(&assessment), black_box(&answers));
                overall_score(&scores)
            })
        });
    }

    group.finish();
}

fn bench_output_matches(c: &mut Criterion) {
    let mut group = c.benchmark_group("output_matches");
    let expected = "line\n".repeat(1000);
    let actual = format!("  {expected}\n\n");

    group.bench_function("short", |b| {
        b.iter(|| output_matches(black_box(Some("true\n")), black_box("true")))
    });

    group.bench_function("1000_lines", |b| {
        b.iter(|| output_matches(black_box(Some(actual.as_str())), black_box(&expected)))
    });

    group.finish();
}

criterion_group!(benches, bench_section_scores, bench_output_matches);
criterion_main!(benches);
