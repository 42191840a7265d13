//! The `proctor validate` command.

use std::path::PathBuf;

use anyhow::Result;

use proctor_core::parser::{self, ValidationWarning};

pub fn execute(questions: Vec<PathBuf>, exam: Option<PathBuf>) -> Result<()> {
    if questions.is_empty() && exam.is_none() {
        anyhow::bail!("nothing to validate; pass --questions and/or --exam");
    }

    let mut total_warnings = 0;

    for path in &questions {
        let drafts = parser::parse_questions(path)?;
        println!("Question file: {} ({} questions)", path.display(), drafts.len());
        total_warnings += report(&parser::validate_questions(&drafts), "question");
    }

    if let Some(path) = &exam {
        let draft = parser::parse_exam(path)?;
        println!(
            "Exam file: {} ({}, {} questions)",
            path.display(),
            draft.title,
            draft.list_question.len()
        );
        total_warnings += report(&parser::validate_exam(&draft), "entry");
    }

    if total_warnings == 0 {
        println!("All files valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

/// Print warnings and return how many there were.
pub fn report(warnings: &[ValidationWarning], item_label: &str) -> usize {
    for w in warnings {
        let prefix = w
            .item
            .map(|i| format!("  [{item_label} {}]", i + 1))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }
    warnings.len()
}
