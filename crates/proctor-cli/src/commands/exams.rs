//! The `proctor exams` commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::Cell;

use proctor_core::model::{ExamId, ListQuery};
use proctor_core::parser;

use super::{connect_authenticated, fmt_time, print_page_footer, table, truncate};

pub async fn list(config: Option<&Path>, page: u32, search: Option<String>, mine: bool) -> Result<()> {
    let conn = connect_authenticated(config)?;
    let mut query = ListQuery::page(page, conn.config.page_size);
    query.title = search.filter(|s| !s.trim().is_empty());
    if mine {
        query = query.mine();
    }

    let exams = conn.client.list_exams(&query).await?;

    let mut t = table();
    t.set_header(vec!["ID", "Title", "Minutes", "Opens", "Closes", "Attempts"]);
    for exam in &exams.rows {
        t.add_row(vec![
            Cell::new(exam.id),
            Cell::new(truncate(&exam.title, 40)),
            Cell::new(exam.duration),
            Cell::new(fmt_time(exam.earliest_start_time)),
            Cell::new(fmt_time(exam.latest_start_time)),
            Cell::new(
                exam.max_attempt
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "∞".into()),
            ),
        ]);
    }
    if !exams.rows.is_empty() {
        println!("{t}");
    }
    print_page_footer(&exams.meta, exams.rows.len());
    Ok(())
}

pub async fn show(config: Option<&Path>, exam_id: ExamId) -> Result<()> {
    let conn = connect_authenticated(config)?;
    let exam = conn.client.get_exam(exam_id).await?;

    println!("{} (id {})", exam.title, exam.id);
    if let Some(note) = exam.note.as_deref().filter(|n| !n.is_empty()) {
        println!("{note}");
    }
    println!("Duration: {} min", exam.duration);
    println!(
        "Window:   {} to {}",
        fmt_time(exam.earliest_start_time),
        fmt_time(exam.latest_start_time)
    );
    if let Some(max) = exam.max_attempt {
        println!("Attempts: {max}");
    }

    if !exam.list_question.is_empty() {
        let mut t = table();
        t.set_header(vec!["#", "Question ID", "Content", "Score"]);
        for (i, q) in exam.list_question.iter().enumerate() {
            t.add_row(vec![
                Cell::new(i + 1),
                Cell::new(q.id),
                Cell::new(truncate(&q.content, 60)),
                Cell::new(
                    q.effective_score()
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                ),
            ]);
        }
        println!("{t}");
    }
    println!("\nStart it with: proctor take {}", exam.id);
    Ok(())
}

/// Parse and validate an exam file, refusing to continue on warnings.
fn load_draft(file: &Path) -> Result<proctor_core::model::ExamDraft> {
    let draft = parser::parse_exam(file)?;
    let warnings = parser::validate_exam(&draft);
    if !warnings.is_empty() {
        super::validate::report(&warnings, "entry");
        anyhow::bail!("{} has {} problem(s); fix them first", file.display(), warnings.len());
    }
    Ok(draft)
}

pub async fn create(config: Option<&Path>, file: PathBuf) -> Result<()> {
    let draft = load_draft(&file)?;
    let conn = connect_authenticated(config)?;
    let exam = conn
        .client
        .create_exam(&draft)
        .await
        .with_context(|| format!("failed to create exam from {}", file.display()))?;
    println!("Created exam {} (id {}).", exam.title, exam.id);
    Ok(())
}

pub async fn update(config: Option<&Path>, exam_id: ExamId, file: PathBuf) -> Result<()> {
    let draft = load_draft(&file)?;
    let conn = connect_authenticated(config)?;
    let exam = conn.client.update_exam(exam_id, &draft).await?;
    println!("Updated exam {} (id {}).", exam.title, exam.id);
    Ok(())
}

pub async fn delete(config: Option<&Path>, exam_id: ExamId) -> Result<()> {
    let conn = connect_authenticated(config)?;
    conn.client.delete_exam(exam_id).await?;
    println!("Deleted exam {exam_id}.");
    Ok(())
}
