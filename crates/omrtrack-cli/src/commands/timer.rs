//! The `omrtrack timer` command: a foreground study countdown.

use std::io::Write;

use anyhow::Result;
use tokio::sync::oneshot;

use omrtrack_core::config::OmrtrackConfig;
use omrtrack_core::timer::{format_study_clock, StudyTimer};

pub async fn execute(config: &OmrtrackConfig, minutes: Option<u32>) -> Result<()> {
    let mut timer = StudyTimer::new(minutes.unwrap_or(config.study_minutes));
    eprintln!(
        "Study session: {} minute(s). Ctrl-C to stop.",
        timer.duration_minutes()
    );

    let (done_tx, done_rx) = oneshot::channel();
    timer.start(
        |secs| {
            eprint!("\r{}  ", format_study_clock(secs));
            let _ = std::io::stderr().flush();
        },
        move || {
            let _ = done_tx.send(());
        },
    );

    tokio::select! {
        _ = done_rx => {
            eprintln!();
            println!("Study session complete!");
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            timer.pause();
            eprintln!();
            println!("Paused with {} left.", timer.display());
        }
    }

    Ok(())
}
