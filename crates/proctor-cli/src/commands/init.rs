//! The `proctor init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("proctor.toml").exists() {
        println!("proctor.toml already exists, skipping.");
    } else {
        std::fs::write("proctor.toml", SAMPLE_CONFIG)?;
        println!("Created proctor.toml");
    }

    std::fs::create_dir_all("authoring")?;
    for (path, content) in [
        ("authoring/questions.toml", SAMPLE_QUESTIONS),
        ("authoring/exam.toml", SAMPLE_EXAM),
    ] {
        if std::path::Path::new(path).exists() {
            println!("{path} already exists, skipping.");
        } else {
            std::fs::write(path, content)?;
            println!("Created {path}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Edit proctor.toml with your backend URL");
    println!("  2. Run: proctor login <username>");
    println!("  3. Run: proctor validate --questions authoring/questions.toml");
    println!("  4. Run: proctor questions create authoring/questions.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# proctor configuration

base_url = "http://localhost:3000"
timeout_secs = 30
page_size = 10

# Overrides the token stored by `proctor login`.
# token = "${PROCTOR_TOKEN}"
"#;

const SAMPLE_QUESTIONS: &str = r#"[[questions]]
content = "Which keyword declares an immutable binding in Rust?"
description = "Basics"
score = 1
tags = ["rust", "basics"]

[[questions.choices]]
content = "let"
correct = true
explanation = "Bindings are immutable unless declared with `let mut`."

[[questions.choices]]
content = "var"

[[questions.choices]]
content = "const fn"

[[questions]]
content = "What does `Vec::pop` return on an empty vector?"
score = 2
tags = ["rust", "std"]

[[questions.choices]]
content = "None"
correct = true

[[questions.choices]]
content = "It panics"
"#;

const SAMPLE_EXAM: &str = r#"[exam]
title = "Rust basics quiz"
note = "Single choice, no penalty for wrong answers."
duration_minutes = 20
opens_at = "2030-01-01T09:00:00Z"
closes_at = "2030-01-08T09:00:00Z"
max_attempts = 2

# Ids of questions already in your bank.
[[exam.questions]]
id = 1
score = 1

[[exam.questions]]
id = 2
score = 2
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn samples_parse_and_validate() {
        let questions =
            proctor_core::parser::parse_questions_str(SAMPLE_QUESTIONS, Path::new("q.toml")).unwrap();
        assert_eq!(questions.len(), 2);
        assert!(proctor_core::parser::validate_questions(&questions).is_empty());

        let exam = proctor_core::parser::parse_exam_str(SAMPLE_EXAM, Path::new("e.toml")).unwrap();
        assert!(proctor_core::parser::validate_exam(&exam).is_empty());

        let config: proctor_client::ProctorConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.page_size, 10);
    }
}
