//! The `proctor take` command: an interactive, timed exam in the terminal.
//!
//! Input is read line by line while the countdown runs in the background.
//! When time runs out the session submits on its own and the loop ends.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use proctor_core::model::ExamId;
use proctor_core::session::{format_clock, InitError, Navigate, SelectError, TimerHandle};
use proctor_core::{ExamSession, SubmitOutcome, SubmitTrigger};

use super::attempts::show_result;
use super::connect_authenticated;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    /// 1-based choice number on the current question.
    Choose(usize),
    Next,
    Previous,
    /// 1-based question number.
    Goto(usize),
    Status,
    Submit,
    Quit,
    Help,
    Empty,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Input::Empty;
    };
    match head.to_ascii_lowercase().as_str() {
        "n" | "next" => Input::Next,
        "p" | "prev" | "previous" => Input::Previous,
        "g" | "goto" => match parts.next().and_then(|n| n.parse().ok()) {
            Some(n) => Input::Goto(n),
            None => Input::Unknown(line.to_string()),
        },
        "s" | "status" => Input::Status,
        "submit" => Input::Submit,
        "q" | "quit" | "exit" => Input::Quit,
        "h" | "help" | "?" => Input::Help,
        other => match other.parse::<usize>() {
            Ok(n) if n > 0 => Input::Choose(n),
            _ => Input::Unknown(line.to_string()),
        },
    }
}

const HELP: &str = "\
  <number>   choose that option for the current question
  n, next    next question
  p, prev    previous question
  g <n>      go to question n
  s, status  answered count and remaining time
  submit     submit the exam
  q, quit    leave without submitting (the timer keeps running)";

pub async fn execute(config: Option<&Path>, exam_id: ExamId) -> Result<()> {
    let conn = connect_authenticated(config)?;
    let client = Arc::new(conn.client);

    let session = match ExamSession::start(client.clone(), exam_id).await {
        Ok(session) => session,
        Err(InitError::AlreadyFinished(attempt_id)) => {
            println!("This attempt is already finished.\n");
            return show_result(&client, attempt_id).await;
        }
        Err(e) => return Err(e).context("cannot start the exam"),
    };

    let mut timer = session.spawn_timer();
    let stdin = BufReader::new(tokio::io::stdin());
    let submitted = drive(&session, &mut timer, stdin).await?;
    drop(timer);

    if submitted {
        println!();
        show_result(&client, session.attempt_id()).await?;
    }
    Ok(())
}

/// Run the question loop until the exam is submitted (returns `true`) or the
/// user leaves (returns `false`).
async fn drive<R>(session: &ExamSession, timer: &mut TimerHandle, input: R) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let attempt = session.attempt();
    println!(
        "{}: {} questions, {} remaining. Type `help` for commands.",
        attempt.title(),
        session.questions().len(),
        format_clock(session.remaining_secs().await)
    );
    render_question(session).await;

    let mut lines = input.lines();
    let mut confirm_submit = false;

    loop {
        tokio::select! {
            outcome = timer.expired() => match outcome {
                Some(Ok(o)) if o.shows_results() => {
                    println!("\nTime is up. Your answers were submitted.");
                    return Ok(true);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    eprintln!("\nTime is up but the submission failed: {e}");
                    eprintln!("Type `submit` to try again.");
                }
                None => {}
            },
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    println!("\nInput closed. Your saved answers stay on the server; the timer keeps running.");
                    return Ok(false);
                };
                let input = parse_input(&line);
                if input != Input::Submit {
                    confirm_submit = false;
                }
                match input {
                    Input::Choose(n) => choose(session, n).await,
                    Input::Next => {
                        session.navigate(Navigate::Next).await;
                        render_question(session).await;
                    }
                    Input::Previous => {
                        session.navigate(Navigate::Previous).await;
                        render_question(session).await;
                    }
                    Input::Goto(n) => {
                        session.navigate(Navigate::To(n.saturating_sub(1))).await;
                        render_question(session).await;
                    }
                    Input::Status => print_status(session).await,
                    Input::Help => println!("{HELP}"),
                    Input::Quit => {
                        println!("Leaving. Your saved answers stay on the server; the timer keeps running.");
                        return Ok(false);
                    }
                    Input::Submit => {
                        let snap = session.snapshot().await;
                        let unanswered = snap.total - snap.answered;
                        if unanswered > 0 && !confirm_submit {
                            confirm_submit = true;
                            println!("{unanswered} question(s) unanswered. Type `submit` again to confirm.");
                            continue;
                        }
                        match session.submit(SubmitTrigger::Manual).await {
                            Ok(SubmitOutcome::Submitted(_)) => {
                                println!("Submitted.");
                                return Ok(true);
                            }
                            Ok(SubmitOutcome::AlreadyClosed(_)) => {
                                println!("This attempt was already closed; showing the recorded result.");
                                return Ok(true);
                            }
                            Ok(SubmitOutcome::Ignored(state)) => {
                                println!("Submission already {state}.");
                            }
                            Err(e) => eprintln!("{e}. You can try again."),
                        }
                    }
                    Input::Empty => {}
                    Input::Unknown(s) => println!("Unknown command `{s}`. Type `help`."),
                }
            }
        }
    }
}

async fn choose(session: &ExamSession, n: usize) {
    let Some(question) = session.current_question().await else {
        return;
    };
    let Some(choice) = question.choices.get(n - 1) else {
        println!("Question has {} options.", question.choices.len());
        return;
    };
    match session.select(question.id, choice.id).await {
        // The save runs in the background; failures are logged there.
        Ok(_ticket) => render_question(session).await,
        Err(SelectError::Locked(state)) => println!("Answers are locked: submission {state}."),
        Err(e) => println!("{e}"),
    }
}

async fn render_question(session: &ExamSession) {
    let snap = session.snapshot().await;
    let Some(question) = session.current_question().await else {
        return;
    };
    let selected = session.selected(question.id).await;

    println!(
        "\n[{}] Question {}/{}",
        format_clock(snap.remaining_secs),
        snap.current_index + 1,
        snap.total
    );
    println!("{}", question.content);
    if let Some(desc) = question.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {desc}");
    }
    for (i, c) in question.choices.iter().enumerate() {
        let mark = if selected == Some(c.id) { "(x)" } else { "( )" };
        println!("  {mark} {}. {}", i + 1, c.content);
    }
}

async fn print_status(session: &ExamSession) {
    let snap = session.snapshot().await;
    println!(
        "{}/{} answered, {} remaining.",
        snap.answered,
        snap.total,
        format_clock(snap.remaining_secs)
    );
    let mut missing = Vec::new();
    for (i, q) in session.questions().iter().enumerate() {
        if session.selected(q.id).await.is_none() {
            missing.push((i + 1).to_string());
        }
    }
    if !missing.is_empty() {
        println!("Unanswered: {}", missing.join(", "));
    }
}
