//! Results, review and history of exam attempts.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::Cell;

use proctor_client::ApiClient;
use proctor_core::model::{Attempt, AttemptId, ListQuery};
use proctor_core::review::{self, Verdict};
use proctor_core::traits::AttemptBackend;

use super::{connect_authenticated, fmt_time, print_page_footer, table, truncate};

fn score_line(attempt: &Attempt) -> String {
    let score = attempt.score.map(|s| format!("{s:.2}")).unwrap_or_else(|| "—".into());
    let total = attempt
        .total_score
        .map(|s| format!("{s:.2}"))
        .unwrap_or_else(|| "—".into());
    match review::score_percent(attempt) {
        Some(pct) => format!("{score}/{total} ({pct:.1}%)"),
        None => format!("{score}/{total}"),
    }
}

/// Print the summary shown after submission and by `proctor result`.
pub fn print_summary(attempt: &Attempt) {
    println!("{} (attempt {})", attempt.title(), attempt.id);
    println!("Score:    {}", score_line(attempt));

    let tally = review::tally(attempt);
    let total = attempt
        .total_question
        .unwrap_or(attempt.list_question.len() as u32);
    let correct = attempt.correct_question.unwrap_or(tally.correct);
    let wrong = attempt.wrong_question.unwrap_or(tally.wrong);
    println!("Correct:  {correct}/{total}");
    println!("Wrong:    {wrong}");
    if tally.unanswered > 0 {
        println!("Skipped:  {}", tally.unanswered);
    }
    println!("Started:  {}", fmt_time(Some(attempt.started_at)));
    println!("Finished: {}", fmt_time(attempt.finished_at));
}

/// Fetch and print a graded attempt.
pub async fn show_result(client: &ApiClient, attempt_id: AttemptId) -> Result<()> {
    let attempt = client
        .attempt_result(attempt_id)
        .await
        .with_context(|| format!("failed to load result of attempt {attempt_id}"))?;
    print_summary(&attempt);
    Ok(())
}

pub async fn result(config: Option<&Path>, attempt_id: AttemptId) -> Result<()> {
    let conn = connect_authenticated(config)?;
    show_result(&conn.client, attempt_id).await?;
    println!("\nSee every answer with: proctor review {attempt_id}");
    Ok(())
}

pub async fn review(config: Option<&Path>, attempt_id: AttemptId) -> Result<()> {
    let mut conn = connect_authenticated(config)?;
    let viewer = conn.client.me().await?.id;
    let attempt = conn.client.attempt_result(attempt_id).await?;

    if !review::can_review(&attempt, Some(viewer), Utc::now()) {
        anyhow::bail!(
            "review of attempt {attempt_id} is not available yet; it opens once the exam window closes"
        );
    }

    println!("{} (attempt {}): {}\n", attempt.title(), attempt.id, score_line(&attempt));
    for (i, q) in review::ordered_questions(&attempt).into_iter().enumerate() {
        let verdict = match review::verdict(q) {
            Verdict::Correct => "correct",
            Verdict::Wrong => "wrong",
            Verdict::Unanswered => "not answered",
        };
        println!("{}. {} [{verdict}]", i + 1, q.content);
        for c in &q.choices {
            let picked = if c.is_selected == Some(true) { ">" } else { " " };
            let right = if c.is_correct == Some(true) { "✓" } else { " " };
            println!("   {picked}{right} {}", c.content);
            if c.is_correct == Some(true) {
                if let Some(exp) = c.explanation.as_deref().filter(|e| !e.is_empty()) {
                    println!("        {exp}");
                }
            }
        }
        println!();
    }
    Ok(())
}

pub async fn history(config: Option<&Path>, page: u32) -> Result<()> {
    let conn = connect_authenticated(config)?;
    let query = ListQuery::page(page, conn.config.page_size)
        .mine()
        .newest_first();
    let attempts = conn.client.list_attempts(&query).await?;

    let mut t = table();
    t.set_header(vec!["Attempt", "Exam", "Started", "Finished", "Score"]);
    for a in &attempts.rows {
        t.add_row(vec![
            Cell::new(a.id),
            Cell::new(truncate(a.title(), 40)),
            Cell::new(fmt_time(Some(a.started_at))),
            Cell::new(if a.is_finished() {
                fmt_time(a.finished_at)
            } else {
                "in progress".to_string()
            }),
            Cell::new(score_line(a)),
        ]);
    }
    if !attempts.rows.is_empty() {
        println!("{t}");
    }
    print_page_footer(&attempts.meta, attempts.rows.len());
    Ok(())
}

pub async fn delete(config: Option<&Path>, attempt_id: AttemptId) -> Result<()> {
    let conn = connect_authenticated(config)?;
    conn.client.delete_attempt(attempt_id).await?;
    println!("Deleted attempt {attempt_id}.");
    Ok(())
}
