//! The `assessly take` command.
//!
//! Reads commands from stdin line by line while the runner counts down in
//! the background. Whichever comes first, the user finishing or the clock
//! running out, ends the attempt.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, watch};

use assessly_core::model::{option_label, parse_option_label, QuestionBank};
use assessly_core::report::AssessmentReport;
use assessly_core::session::{AssessmentSession, CompletionReason, Phase, SessionSnapshot};
use assessly_core::time::format_clock;
use assessly_core::AssessmentError;
use assessly_providers::load_config_from;
use assessly_runner::{Command, RunnerError, SessionHandle, SessionObserver, SessionRunner};

use super::{build_engine, print_results, resolve_selection, save_report, SaveOptions};

pub struct TakeArgs {
    pub subject: Option<String>,
    pub difficulty: Option<String>,
    pub duration: Option<u32>,
    pub save: SaveOptions,
    pub config: Option<PathBuf>,
}

const HELP: &str = "Commands:
  A, B, ... or 1, 2, ...  select an answer
  n                       next question (finishes on the last one)
  p / r                   pause / resume the clock
  t                       show the time left
  s                       submit now
  h                       show this help";

/// Prints clock warnings and the time-up notice.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_change(&self, session: &AssessmentSession) {
        tracing::debug!(phase = %session.phase(), "session changed");
    }

    fn on_tick(&self, session: &AssessmentSession) {
        let remaining = session.remaining_secs();
        if remaining > 0 && (remaining % 60 == 0 || remaining == 30 || remaining <= 10) {
            println!("  [{} left]", format_clock(remaining));
        }
    }

    fn on_complete(&self, session: &AssessmentSession) {
        if session.completion() == Some(CompletionReason::TimeExpired) {
            println!("\nTime's up!");
        }
    }
}

pub async fn execute(args: TakeArgs) -> Result<()> {
    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(duration) = args.duration {
        config.duration_secs = duration;
    }
    let (subject, difficulty) = resolve_selection(args.subject, args.difficulty, &config);

    let engine = build_engine(&config)?;
    let session = engine.create_session(&subject, &difficulty).await?;
    let bank = Arc::clone(session.bank());

    println!("{}", bank.title());
    if let Some(description) = bank.description() {
        println!("{description}");
    }
    println!(
        "{} questions, {} on the clock. Type h for help.",
        bank.len(),
        format_clock(config.duration_secs)
    );

    let handle = SessionRunner::new(session)
        .with_observer(Arc::new(ConsoleObserver))
        .spawn();
    let started = handle.send(Command::Start).await?;
    if started.completion == Some(CompletionReason::EmptyBank) {
        println!("This bank has no questions.");
    } else if started.phase == Phase::Active {
        print_question(&bank, &started);
    }

    prompt_loop(&handle, &bank).await?;

    let session = handle.finish().await?;
    let report = AssessmentReport::from_session(&session)?;
    print_results(&report);
    save_report(&report, &args.save, &config)?;
    Ok(())
}

async fn prompt_loop(handle: &SessionHandle, bank: &QuestionBank) -> Result<()> {
    let mut lines = spawn_stdin_reader();
    let mut watcher = handle.subscribe();

    loop {
        tokio::select! {
            biased;

            _ = wait_for_completion(&mut watcher) => break,
            line = lines.recv() => {
                let Some(line) = line.transpose()? else {
                    // end of input submits whatever has been answered
                    submit_if_open(handle).await?;
                    break;
                };
                handle_line(handle, bank, line.trim()).await?;
            }
        }
    }
    Ok(())
}

/// Read stdin on a plain thread. A read still pending when the clock ends
/// the attempt must not keep the runtime from shutting down.
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn wait_for_completion(watcher: &mut watch::Receiver<SessionSnapshot>) {
    let _ = watcher
        .wait_for(|s| s.phase == Phase::Completed)
        .await
        .map(|s| s.phase);
}

async fn submit_if_open(handle: &SessionHandle) -> Result<()> {
    match handle.snapshot().phase {
        Phase::Active | Phase::Paused => {
            handle.send(Command::Complete).await?;
        }
        Phase::Idle | Phase::Completed => {}
    }
    Ok(())
}

async fn handle_line(handle: &SessionHandle, bank: &QuestionBank, input: &str) -> Result<()> {
    let command = match input.to_ascii_lowercase().as_str() {
        "" => return Ok(()),
        "h" | "help" | "?" => {
            println!("{HELP}");
            return Ok(());
        }
        "t" | "time" => {
            println!("  {} left", format_clock(handle.snapshot().remaining_secs));
            return Ok(());
        }
        "n" | "next" => Command::Advance,
        "p" | "pause" => Command::Pause,
        "r" | "resume" => Command::Resume,
        "s" | "submit" => Command::Complete,
        _ => {
            let current = handle.snapshot();
            let option_count = bank
                .get(current.current_index)
                .map(|q| q.option_count())
                .unwrap_or_default();
            match parse_option_label(input, option_count) {
                Ok(option) => Command::Select(option),
                Err(e) => {
                    println!("  {e}");
                    return Ok(());
                }
            }
        }
    };

    match handle.send(command).await {
        Ok(snapshot) => {
            render(bank, command, &snapshot);
            Ok(())
        }
        Err(RunnerError::Rejected(e)) if e.leaves_state_unchanged() => {
            println!("  {}", rejection_hint(&e));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn render(bank: &QuestionBank, command: Command, snapshot: &SessionSnapshot) {
    match command {
        Command::Select(option) => println!("  Selected {}", option_label(option)),
        Command::Pause => println!(
            "  Paused with {} left. Type r to resume.",
            format_clock(snapshot.remaining_secs)
        ),
        Command::Advance | Command::Resume if snapshot.phase == Phase::Active => {
            print_question(bank, snapshot)
        }
        _ => {}
    }
}

fn rejection_hint(error: &AssessmentError) -> String {
    match error {
        AssessmentError::AnswerRequired { .. } => {
            "Select an answer before moving on (or s to submit).".to_string()
        }
        AssessmentError::InvalidTransition {
            phase: Phase::Paused,
            ..
        } => "The assessment is paused. Type r to resume.".to_string(),
        other => other.to_string(),
    }
}

fn print_question(bank: &QuestionBank, snapshot: &SessionSnapshot) {
    let Some(question) = bank.get(snapshot.current_index) else {
        return;
    };
    println!();
    println!(
        "Question {} of {} ({}%)  [{} left]",
        snapshot.current_index + 1,
        snapshot.question_count,
        snapshot.progress_percent,
        format_clock(snapshot.remaining_secs)
    );
    println!("{}", question.prompt());
    for (i, option) in question.options().iter().enumerate() {
        let marker = if snapshot.selected == Some(i) { "*" } else { " " };
        println!(" {marker}{}) {option}", option_label(i));
    }
}
