//! The `omrtrack take` command: sit a test from the terminal.
//!
//! While answering, each line is `<question> <option>` (e.g. `12 C`),
//! `status`, `reset` or `submit`. After submission the same line format
//! fills in the answer key; `missing` lists the gaps and `done` grades.
//! When the countdown reaches zero the sheet is submitted automatically.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;

use omrtrack_core::config::OmrtrackConfig;
use omrtrack_core::model::{OptionToken, QuestionId};
use omrtrack_core::parser::parse_test_config;
use omrtrack_core::report::GradeReport;
use omrtrack_core::session::{Phase, Session};
use omrtrack_core::statistics::answered_progress;
use omrtrack_core::timer::format_test_clock;
use omrtrack_core::CoreError;

use super::grade::{print_result, record};

enum Input<'a> {
    Mark(QuestionId, &'a str),
    Command(&'a str),
}

fn parse_line(line: &str) -> Result<Input<'_>, String> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(cmd), None, None) => Ok(Input::Command(cmd)),
        (Some(q), Some(mark), None) => Ok(Input::Mark(q.parse()?, mark)),
        _ => Err(format!("expected '<question> <option>', got '{line}'")),
    }
}

fn start_clock(session: &mut Session) -> Option<oneshot::Receiver<()>> {
    session.start_timer(|secs| {
        if secs > 0 && secs % 60 == 0 {
            eprintln!("  [{} left]", format_test_clock(secs));
        }
    })
}

pub async fn execute(config: &OmrtrackConfig, test_path: PathBuf) -> Result<()> {
    let test = parse_test_config(&test_path)?;
    let mut session = Session::start(test, config.capture_policy())?;

    eprintln!(
        "{}: {} questions, {}",
        session.config().name,
        session.questions().len(),
        format_test_clock(session.time_remaining())
    );
    eprintln!("Enter '<question> <option>', 'status', 'reset' or 'submit'.");

    let mut expired = start_clock(&mut session);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if expired.is_some() && session.is_time_up() {
            expired = None;
            announce_time_up(&mut session);
        }

        let phase = session.phase();
        let line = if phase == Phase::Answering {
            tokio::select! {
                fired = time_up(&mut expired) => {
                    expired = None;
                    if fired {
                        announce_time_up(&mut session);
                    }
                    continue;
                }
                line = lines.next_line() => line?,
            }
        } else {
            lines.next_line().await?
        };

        let Some(line) = line else {
            if session.submit_answers() {
                prompt_key(&session);
                continue;
            }
            anyhow::bail!("input ended before the test was graded");
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let input = match parse_line(line) {
            Ok(input) => input,
            Err(e) => {
                eprintln!("  {e}");
                continue;
            }
        };

        match (phase, input) {
            (Phase::Answering, Input::Mark(id, mark)) => {
                let result = session.record_answer(id, mark);
                if session.phase() == Phase::Answering {
                    report_capture(result, id);
                } else {
                    // The clock ran out before this mark arrived.
                    expired = None;
                    eprintln!("Time is up. Answers submitted; Q{id} was not recorded.");
                    prompt_key(&session);
                }
            }
            (Phase::Answering, Input::Command("status")) => {
                let total = session.questions().len();
                eprintln!(
                    "  {}/{} answered ({:.0}%), {} left",
                    session.answered_count(),
                    total,
                    answered_progress(session.answered_count(), total),
                    format_test_clock(session.time_remaining())
                );
            }
            (Phase::Answering, Input::Command("reset")) => {
                session.reset();
                expired = start_clock(&mut session);
                eprintln!("  Sheet cleared, clock restarted.");
            }
            (Phase::Answering, Input::Command("submit")) => {
                expired = None;
                if session.submit_answers() {
                    eprintln!("Answers submitted.");
                    prompt_key(&session);
                }
            }
            (_, Input::Mark(id, mark)) => {
                report_capture(session.record_answer_key_entry(id, mark), id);
            }
            (_, Input::Command("missing")) => {
                let missing = session.missing_key_entries();
                if missing.is_empty() {
                    eprintln!("  Answer key complete.");
                } else {
                    eprintln!("  {}", CoreError::IncompleteAnswerKey { missing });
                }
            }
            (_, Input::Command("done")) => match session.grade(Utc::now()) {
                Ok(graded) => {
                    let report = GradeReport::new(
                        &graded,
                        session.questions(),
                        session.answers(),
                        session.answer_key(),
                    );
                    print_result(&report);
                    record(config, &graded)?;
                    return Ok(());
                }
                Err(e) => eprintln!("  {e}"),
            },
            (_, Input::Command(other)) => eprintln!("  unknown command '{other}'"),
        }
    }
}

/// Resolves when the countdown expires (`true`) or is torn down (`false`).
async fn time_up(expired: &mut Option<oneshot::Receiver<()>>) -> bool {
    match expired {
        Some(rx) => rx.await.is_ok(),
        None => std::future::pending().await,
    }
}

fn announce_time_up(session: &mut Session) {
    session.submit_answers();
    eprintln!("Time is up. Answers submitted.");
    prompt_key(session);
}

fn prompt_key(session: &Session) {
    eprintln!(
        "{}/{} answered. Enter the answer key as '<question> <option>', then 'done'.",
        session.answered_count(),
        session.questions().len()
    );
}

fn report_capture(result: Result<Option<OptionToken>, CoreError>, id: QuestionId) {
    match result {
        Ok(Some(previous)) => eprintln!("  Q{id} changed (was {previous})"),
        Ok(None) => {}
        Err(e) => eprintln!("  {e}"),
    }
}
