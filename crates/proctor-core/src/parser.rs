//! TOML authoring files.
//!
//! Question banks and exam drafts are written as TOML, parsed into the
//! backend's upload payloads, and validated before anything is sent.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{ChoiceDraft, ExamDraft, ExamQuestionRef, QuestionDraft, QuestionId};

/// Intermediate TOML structure for question bank files.
#[derive(Debug, Deserialize)]
struct TomlQuestionFile {
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    content: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_points")]
    score: f64,
    #[serde(default = "default_kind", rename = "type")]
    kind: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    choices: Vec<TomlChoice>,
}

#[derive(Debug, Deserialize)]
struct TomlChoice {
    #[serde(default)]
    id: Option<i64>,
    content: String,
    #[serde(default)]
    correct: bool,
    #[serde(default)]
    explanation: String,
}

fn default_points() -> f64 {
    1.0
}

fn default_kind() -> String {
    "single_choice".to_string()
}

/// Intermediate TOML structure for exam files.
#[derive(Debug, Deserialize)]
struct TomlExamFile {
    exam: TomlExam,
}

#[derive(Debug, Deserialize)]
struct TomlExam {
    title: String,
    #[serde(default)]
    note: String,
    duration_minutes: u32,
    opens_at: String,
    #[serde(default)]
    closes_at: Option<String>,
    #[serde(default)]
    max_attempts: Option<u32>,
    #[serde(default)]
    questions: Vec<TomlExamQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlExamQuestion {
    id: QuestionId,
    #[serde(default = "default_points")]
    score: f64,
}

/// Parse a question bank file.
pub fn parse_questions(path: &Path) -> Result<Vec<QuestionDraft>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question file: {}", path.display()))?;
    parse_questions_str(&content, path)
}

/// Parse question bank TOML from a string (useful for testing).
pub fn parse_questions_str(content: &str, source_path: &Path) -> Result<Vec<QuestionDraft>> {
    let parsed: TomlQuestionFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(parsed
        .questions
        .into_iter()
        .map(|q| QuestionDraft {
            content: q.content.trim().to_string(),
            description: q.description.trim().to_string(),
            score: q.score,
            kind: q.kind,
            tags: q.tags.join(","),
            by_ai: false,
            choices: q
                .choices
                .into_iter()
                .map(|c| ChoiceDraft {
                    id: c.id,
                    content: c.content.trim().to_string(),
                    is_correct: c.correct,
                    explanation: c.explanation.trim().to_string(),
                })
                .collect(),
        })
        .collect())
}

/// Parse an exam draft file.
pub fn parse_exam(path: &Path) -> Result<ExamDraft> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam file: {}", path.display()))?;
    parse_exam_str(&content, path)
}

/// Parse exam draft TOML from a string (useful for testing).
pub fn parse_exam_str(content: &str, source_path: &Path) -> Result<ExamDraft> {
    let parsed: TomlExamFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;
    let exam = parsed.exam;

    let earliest_start_time = parse_timestamp(&exam.opens_at).context("invalid opens_at")?;
    let latest_start_time = exam
        .closes_at
        .as_deref()
        .map(parse_timestamp)
        .transpose()
        .context("invalid closes_at")?;

    Ok(ExamDraft {
        title: exam.title.trim().to_string(),
        note: exam.note.trim().to_string(),
        duration: exam.duration_minutes,
        earliest_start_time,
        latest_start_time,
        max_attempt: exam.max_attempts,
        list_question: exam
            .questions
            .into_iter()
            .map(|q| ExamQuestionRef {
                question_id: q.id,
                score: q.score.round() as i64,
            })
            .collect(),
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("expected an RFC 3339 timestamp, got '{s}'"))
}

/// A warning from authoring validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Zero-based index of the offending question, if applicable.
    pub item: Option<usize>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn at(item: usize, message: impl Into<String>) -> Self {
        Self {
            item: Some(item),
            message: message.into(),
        }
    }

    fn general(message: impl Into<String>) -> Self {
        Self {
            item: None,
            message: message.into(),
        }
    }
}

/// Validate question drafts before upload.
pub fn validate_questions(questions: &[QuestionDraft]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if questions.is_empty() {
        warnings.push(ValidationWarning::general("no questions defined"));
    }

    for (i, q) in questions.iter().enumerate() {
        if q.content.is_empty() {
            warnings.push(ValidationWarning::at(i, "question content is empty"));
        }
        if q.choices.len() < 2 {
            warnings.push(ValidationWarning::at(i, "a question needs at least two choices"));
        }
        if q.choices.iter().any(|c| c.content.is_empty()) {
            warnings.push(ValidationWarning::at(i, "every choice needs content"));
        }
        if !q.choices.iter().any(|c| c.is_correct) {
            warnings.push(ValidationWarning::at(i, "no correct choice marked"));
        }
        if q.score <= 0.0 {
            warnings.push(ValidationWarning::at(i, "score must be positive"));
        }
    }

    warnings
}

/// Validate an exam draft before upload.
pub fn validate_exam(exam: &ExamDraft) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if exam.title.is_empty() {
        warnings.push(ValidationWarning::general("exam title is empty"));
    }
    if exam.duration == 0 {
        warnings.push(ValidationWarning::general("duration must be at least one minute"));
    }
    match exam.latest_start_time {
        Some(closes) if closes <= exam.earliest_start_time => {
            warnings.push(ValidationWarning::general("closes_at must be after opens_at"));
        }
        None => warnings.push(ValidationWarning::general("closes_at is not set")),
        _ => {}
    }
    if exam.max_attempt == Some(0) {
        warnings.push(ValidationWarning::general("max_attempts must be at least 1"));
    }
    if exam.list_question.is_empty() {
        warnings.push(ValidationWarning::general("exam has no questions"));
    }

    let mut seen = HashSet::new();
    for (i, q) in exam.list_question.iter().enumerate() {
        if !seen.insert(q.question_id) {
            warnings.push(ValidationWarning::at(
                i,
                format!("duplicate question id: {}", q.question_id),
            ));
        }
        if q.score <= 0 {
            warnings.push(ValidationWarning::at(i, "score must be positive"));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const QUESTIONS_TOML: &str = r#"
[[questions]]
content = "What does `Option::take` return?"
description = "Standard library"
score = 2
tags = ["rust", "std"]

[[questions.choices]]
content = "The previous value, leaving None"
correct = true

[[questions.choices]]
content = "A clone of the value"
"#;

    const EXAM_TOML: &str = r#"
[exam]
title = "Midterm"
note = "Closed book"
duration_minutes = 45
opens_at = "2025-06-01T09:00:00Z"
closes_at = "2025-06-01T17:00:00+02:00"
max_attempts = 2

[[exam.questions]]
id = 12
score = 2.6

[[exam.questions]]
id = 13
"#;

    #[test]
    fn parse_question_bank() {
        let qs = parse_questions_str(QUESTIONS_TOML, &PathBuf::from("q.toml")).unwrap();
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].tags, "rust,std");
        assert_eq!(qs[0].kind, "single_choice");
        assert_eq!(qs[0].choices.len(), 2);
        assert!(qs[0].choices[0].is_correct);
        assert!(validate_questions(&qs).is_empty());
    }

    #[test]
    fn parse_exam_rounds_scores_and_normalizes_time() {
        let exam = parse_exam_str(EXAM_TOML, &PathBuf::from("e.toml")).unwrap();
        assert_eq!(exam.title, "Midterm");
        assert_eq!(exam.list_question[0].score, 3);
        assert_eq!(exam.list_question[1].score, 1);
        assert_eq!(
            exam.latest_start_time.unwrap().to_rfc3339(),
            "2025-06-01T15:00:00+00:00"
        );
        assert!(validate_exam(&exam).is_empty());
    }

    #[test]
    fn invalid_timestamp_is_an_error() {
        let bad = EXAM_TOML.replace("2025-06-01T09:00:00Z", "tomorrow");
        let err = parse_exam_str(&bad, &PathBuf::from("e.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("opens_at"));
    }

    #[test]
    fn validate_question_problems() {
        let toml = r#"
[[questions]]
content = "  "

[[questions.choices]]
content = ""
"#;
        let qs = parse_questions_str(toml, &PathBuf::from("q.toml")).unwrap();
        let warnings = validate_questions(&qs);
        let messages: Vec<_> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.contains(&"question content is empty"));
        assert!(messages.contains(&"no correct choice marked"));
        assert!(messages.contains(&"every choice needs content"));
        assert!(warnings.iter().all(|w| w.item == Some(0)));
    }

    #[test]
    fn validate_exam_window_and_duplicates() {
        let toml = EXAM_TOML
            .replace("2025-06-01T17:00:00+02:00", "2025-06-01T08:00:00Z")
            .replace("id = 13", "id = 12");
        let exam = parse_exam_str(&toml, &PathBuf::from("e.toml")).unwrap();
        let warnings = validate_exam(&exam);
        assert!(warnings.iter().any(|w| w.message.contains("after opens_at")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("duplicate question id: 12") && w.item == Some(1)));
    }

    #[test]
    fn parse_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let questions = dir.path().join("bank.toml");
        let exam = dir.path().join("exam.toml");
        std::fs::write(&questions, QUESTIONS_TOML).unwrap();
        std::fs::write(&exam, EXAM_TOML).unwrap();

        assert_eq!(parse_questions(&questions).unwrap().len(), 1);
        assert_eq!(parse_exam(&exam).unwrap().max_attempt, Some(2));

        let err = parse_exam(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read exam file"));
    }

    #[test]
    fn parse_malformed_toml() {
        assert!(parse_questions_str("not [valid toml }{", &PathBuf::from("bad.toml")).is_err());
    }
}
