//! The `proctor questions` commands.

use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::Cell;

use proctor_core::model::{ListQuery, QuestionId};
use proctor_core::parser;

use super::{connect_authenticated, print_page_footer, table, truncate};

pub async fn list(config: Option<&Path>, page: u32, search: Option<String>) -> Result<()> {
    let conn = connect_authenticated(config)?;
    let mut query = ListQuery::page(page, conn.config.page_size);
    if let Some(term) = &search {
        query = query.with_search(term);
    }

    let questions = conn.client.list_questions(&query).await?;

    let mut t = table();
    t.set_header(vec!["ID", "Content", "Tags", "Score", "Choices"]);
    for q in &questions.rows {
        t.add_row(vec![
            Cell::new(q.id),
            Cell::new(truncate(&q.content, 60)),
            Cell::new(q.tags.as_deref().unwrap_or("")),
            Cell::new(q.score.map(|s| s.to_string()).unwrap_or_default()),
            Cell::new(q.choices.len()),
        ]);
    }
    if !questions.rows.is_empty() {
        println!("{t}");
    }
    print_page_footer(&questions.meta, questions.rows.len());
    Ok(())
}

pub async fn show(config: Option<&Path>, question_id: QuestionId) -> Result<()> {
    let conn = connect_authenticated(config)?;
    let q = conn.client.get_question(question_id).await?;

    println!("Question {}: {}", q.id, q.content);
    if let Some(desc) = q.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {desc}");
    }
    for (i, c) in q.choices.iter().enumerate() {
        let mark = if c.is_correct == Some(true) { "✓" } else { " " };
        println!("  {mark} {}. {}", i + 1, c.content);
        if let Some(exp) = c.explanation.as_deref().filter(|e| !e.is_empty()) {
            println!("       {exp}");
        }
    }
    if let Some(tags) = q.tags.as_deref().filter(|t| !t.is_empty()) {
        println!("Tags: {tags}");
    }
    Ok(())
}

pub async fn create(config: Option<&Path>, file: PathBuf) -> Result<()> {
    let drafts = parser::parse_questions(&file)?;
    let warnings = parser::validate_questions(&drafts);
    if !warnings.is_empty() {
        super::validate::report(&warnings, "question");
        anyhow::bail!("{} has {} problem(s); fix them first", file.display(), warnings.len());
    }

    let conn = connect_authenticated(config)?;
    conn.client.create_questions(&drafts).await?;
    println!("Uploaded {} question(s) from {}.", drafts.len(), file.display());
    Ok(())
}

pub async fn update(config: Option<&Path>, question_id: QuestionId, file: PathBuf) -> Result<()> {
    let mut drafts = parser::parse_questions(&file)?;
    if drafts.len() != 1 {
        anyhow::bail!(
            "{} must contain exactly one question to update, found {}",
            file.display(),
            drafts.len()
        );
    }
    let warnings = parser::validate_questions(&drafts);
    if !warnings.is_empty() {
        super::validate::report(&warnings, "question");
        anyhow::bail!("{} has {} problem(s); fix them first", file.display(), warnings.len());
    }

    let conn = connect_authenticated(config)?;
    let draft = drafts.remove(0);
    let q = conn.client.update_question(question_id, &draft).await?;
    println!("Updated question {}.", q.id);
    Ok(())
}

pub async fn delete(config: Option<&Path>, question_id: QuestionId) -> Result<()> {
    let conn = connect_authenticated(config)?;
    conn.client.delete_question(question_id).await?;
    println!("Deleted question {question_id}.");
    Ok(())
}
