//! TOML assessment catalog parser.
//!
//! Loads assessments from TOML files and directories, splits the inline
//! `answer` fields into a separate answer key, and validates the result.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::languages::LanguageRegistry;
use crate::model::{AnswerKey, Assessment, Question, QuestionKind, TestCase};

/// Intermediate TOML structure for parsing catalog files.
#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    assessment: TomlAssessmentHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlAssessmentHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_time_limit")]
    time_limit_secs: u64,
}

fn default_time_limit() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum TomlQuestion {
    MultipleChoice {
        id: u32,
        section: String,
        prompt: String,
        #[serde(default)]
        options: Vec<String>,
        #[serde(default)]
        answer: Option<String>,
    },
    Coding {
        id: u32,
        section: String,
        prompt: String,
        #[serde(default = "default_language")]
        language: String,
        #[serde(default)]
        starter_code: String,
        #[serde(default)]
        test_cases: Vec<TestCase>,
    },
}

fn default_language() -> String {
    "javascript".to_string()
}

/// Parse a single TOML file into an `Assessment`.
pub fn parse_assessment(path: &Path) -> Result<Assessment> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    parse_assessment_str(&content, path)
}

/// Parse a TOML string into an `Assessment` (useful for testing).
pub fn parse_assessment_str(content: &str, source_path: &Path) -> Result<Assessment> {
    let parsed: TomlCatalogFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut answer_key = AnswerKey::new();
    let questions = parsed
        .questions
        .into_iter()
        .map(|q| match q {
            TomlQuestion::MultipleChoice {
                id,
                section,
                prompt,
                options,
                answer,
            } => {
                if let Some(answer) = answer {
                    answer_key.insert(id, answer);
                }
                Question {
                    id,
                    section,
                    prompt,
                    kind: QuestionKind::MultipleChoice { options },
                }
            }
            TomlQuestion::Coding {
                id,
                section,
                prompt,
                language,
                starter_code,
                test_cases,
            } => Question {
                id,
                section,
                prompt,
                kind: QuestionKind::Coding {
                    language,
                    starter_code,
                    test_cases,
                },
            },
        })
        .collect::<Vec<_>>();

    let mut seen_ids = HashSet::new();
    for q in &questions {
        if !seen_ids.insert(q.id) {
            anyhow::bail!(
                "duplicate question ID {} in {}",
                q.id,
                source_path.display()
            );
        }
    }

    Ok(Assessment {
        id: parsed.assessment.id,
        name: parsed.assessment.name,
        description: parsed.assessment.description,
        time_limit_secs: parsed.assessment.time_limit_secs,
        questions,
        answer_key,
    })
}

/// Recursively load all `.toml` catalog files from a directory.
pub fn load_catalog_directory(dir: &Path) -> Result<Vec<Assessment>> {
    let mut assessments = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();

        if path.is_dir() {
            assessments.extend(load_catalog_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_assessment(&path) {
                Ok(assessment) => assessments.push(assessment),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(assessments)
}

/// Load a file, or every catalog under a directory.
pub fn load_catalogs(path: &Path) -> Result<Vec<Assessment>> {
    if path.is_dir() {
        load_catalog_directory(path)
    } else {
        Ok(vec![parse_assessment(path)?])
    }
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(id: u32, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id),
            message: message.into(),
        }
    }
}

/// Validate an assessment for common catalog defects.
pub fn validate_assessment(
    assessment: &Assessment,
    languages: &LanguageRegistry,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if assessment.time_limit_secs == 0 {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "time_limit_secs is 0; sessions will finish immediately".into(),
        });
    }
    if assessment.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "assessment has no questions".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for q in &assessment.questions {
        if !seen_ids.insert(q.id) {
            warnings.push(ValidationWarning::question(
                q.id,
                format!("duplicate question ID: {}", q.id),
            ));
        }
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning::question(q.id, "prompt is empty"));
        }

        match &q.kind {
            QuestionKind::MultipleChoice { options } => {
                if options.is_empty() {
                    warnings.push(ValidationWarning::question(q.id, "no options provided"));
                }
                match assessment.answer_key.get(&q.id) {
                    None => warnings.push(ValidationWarning::question(
                        q.id,
                        "no answer in the answer key; question can never score",
                    )),
                    Some(answer) if !options.contains(answer) => {
                        warnings.push(ValidationWarning::question(
                            q.id,
                            format!("answer '{answer}' is not one of the options"),
                        ))
                    }
                    Some(_) => {}
                }
            }
            QuestionKind::Coding {
                language,
                test_cases,
                ..
            } => {
                if test_cases.is_empty() {
                    warnings.push(ValidationWarning::question(
                        q.id,
                        "coding question has no test cases; submissions cannot be evaluated",
                    ));
                }
                if languages.lookup(language).is_none() {
                    warnings.push(ValidationWarning::question(
                        q.id,
                        format!("unknown language '{language}' will fall back to the default backend"),
                    ));
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[assessment]
id = "fullstack"
name = "Full-Stack Skills"
description = "Sample catalog"
time_limit_secs = 1800

[[questions]]
id = 1
section = "Full-Stack Developer"
type = "multiple-choice"
prompt = "What is the correct syntax to link an external JavaScript file?"
options = ['<script src="app.js">', '<script href="app.js">', '<js src="app.js">']
answer = '<script src="app.js">'

[[questions]]
id = 4
section = "Full-Stack Developer"
type = "coding"
prompt = "Read an integer and print whether it is prime."
language = "javascript"
starter_code = "function isPrime(n) {\n  // Your code here\n}"
test_cases = [
    { input = "7", expected_output = "true" },
    { input = "10", expected_output = "false" },
]
"#;

    #[test]
    fn parse_valid_toml() {
        let a = parse_assessment_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(a.id, "fullstack");
        assert_eq!(a.time_limit_secs, 1800);
        assert_eq!(a.questions.len(), 2);
        assert_eq!(a.answer_key.get(&1).map(String::as_str), Some(r#"<script src="app.js">"#));
        assert!(!a.answer_key.contains_key(&4));

        let QuestionKind::Coding { test_cases, .. } = &a.questions[1].kind else {
            panic!("question 4 should be a coding question");
        };
        assert_eq!(test_cases[0], TestCase::new("7", "true"));
        assert!(validate_assessment(&a, &LanguageRegistry::builtin()).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[assessment]
id = "minimal"
name = "Minimal"

[[questions]]
id = 1
section = "S"
type = "coding"
prompt = "Print hello"
test_cases = [{ expected_output = "hello" }]
"#;
        let a = parse_assessment_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(a.time_limit_secs, 3600);
        let QuestionKind::Coding {
            language,
            test_cases,
            ..
        } = &a.questions[0].kind
        else {
            panic!("expected coding question");
        };
        assert_eq!(language, "javascript");
        assert_eq!(test_cases[0].input, "");
    }

    #[test]
    fn parse_unknown_question_type_fails() {
        let toml = r#"
[assessment]
id = "bad"
name = "Bad"

[[questions]]
id = 1
section = "S"
type = "essay"
prompt = "Discuss"
"#;
        assert!(parse_assessment_str(toml, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn parse_duplicate_question_ids_fails() {
        let toml = r#"
[assessment]
id = "dupes"
name = "Dupes"

[[questions]]
id = 1
section = "S"
type = "multiple-choice"
prompt = "First"
options = ["a", "b"]
answer = "a"

[[questions]]
id = 1
section = "S"
type = "multiple-choice"
prompt = "Second"
options = ["a", "b"]
answer = "a"
"#;
        let err = parse_assessment_str(toml, &PathBuf::from("dupes.toml")).unwrap_err();
        assert!(err.to_string().contains("duplicate question ID 1"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_assessment_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_reports_catalog_defects() {
        let toml = r#"
[assessment]
id = "defects"
name = "Defects"
time_limit_secs = 0

[[questions]]
id = 1
section = "S"
type = "multiple-choice"
prompt = "Pick"
options = ["a", "b"]
answer = "c"

[[questions]]
id = 3
section = "S"
type = "multiple-choice"
prompt = ""
options = []

[[questions]]
id = 2
section = "S"
type = "coding"
prompt = "Write"
language = "cobol"
"#;
        let mut a = parse_assessment_str(toml, &PathBuf::from("test.toml")).unwrap();
        // Assessments built in code bypass the parser's id check.
        let copy = a.questions[0].clone();
        a.questions.push(copy);
        let warnings = validate_assessment(&a, &LanguageRegistry::builtin());
        let has = |needle: &str| warnings.iter().any(|w| w.message.contains(needle));
        assert!(has("time_limit_secs is 0"));
        assert!(has("duplicate question ID"));
        assert!(has("not one of the options"));
        assert!(has("prompt is empty"));
        assert!(has("no options"));
        assert!(has("no test cases"));
        assert!(has("unknown language 'cobol'"));
    }

    #[test]
    fn load_directory_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not [toml").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let all = load_catalog_directory(dir.path()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "fullstack");

        let single = load_catalogs(&dir.path().join("good.toml")).unwrap();
        assert_eq!(single.len(), 1);
    }
}
