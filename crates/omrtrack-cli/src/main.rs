//! omrtrack CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use omrtrack_core::config::load_config_from;
use omrtrack_core::model::Subject;
use omrtrack_core::results::MistakeId;

mod commands;

use commands::OutputFormat;

#[derive(Parser)]
#[command(name = "omrtrack", version, about = "Bubble-sheet practice test tracker")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and a sample test
    Init,

    /// Validate a test definition
    Validate {
        /// Path to the test .toml file
        #[arg(long)]
        test: PathBuf,
    },

    /// Grade a filled-in sheet against an answer key and record it
    Grade {
        /// Path to the test .toml file
        #[arg(long)]
        test: PathBuf,

        /// Mark sheet with the learner's answers
        #[arg(long)]
        answers: PathBuf,

        /// Mark sheet with the answer key
        #[arg(long)]
        key: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also save the full report as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Do not append the result to history
        #[arg(long)]
        no_save: bool,
    },

    /// Re-render a report saved with `grade --output`
    Report {
        /// Path to the saved report JSON
        path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Sit a test interactively with a countdown
    Take {
        /// Path to the test .toml file
        #[arg(long)]
        test: PathBuf,
    },

    /// Show recorded tests and dashboard stats
    History,

    /// List recorded mistakes
    Mistakes {
        /// Only show one subject (physics, chemistry, biology)
        #[arg(long)]
        subject: Option<Subject>,

        /// Hide mistakes already reviewed
        #[arg(long)]
        unreviewed: bool,
    },

    /// Mark a mistake as reviewed
    Review {
        /// Mistake id as printed by `omrtrack mistakes`
        id: MistakeId,

        /// Mark as not reviewed instead
        #[arg(long)]
        undo: bool,
    },

    /// Run a study countdown
    Timer {
        /// Session length in minutes (defaults to the configured value)
        #[arg(long)]
        minutes: Option<u32>,
    },

    /// Show or edit the learner profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Track the per-subject syllabus checklist
    Checklist {
        #[command(subcommand)]
        action: ChecklistAction,
    },

    /// Track daily study and weekly mock tests
    Habits {
        #[command(subcommand)]
        action: HabitsAction,
    },
}

#[derive(Subcommand)]
enum ChecklistAction {
    /// Print ticked items per subject
    Show,

    /// Tick a syllabus item
    Set {
        subject: Subject,

        /// Item number, starting at 1
        #[arg(value_parser = clap::value_parser!(u32).range(1..=100))]
        item: u32,

        /// Untick instead
        #[arg(long)]
        undo: bool,
    },
}

#[derive(Subcommand)]
enum HabitsAction {
    /// Print this week's habits
    Show,

    /// Mark a day of the week (1-7) as studied
    Study {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=7))]
        day: u32,

        #[arg(long)]
        undo: bool,
    },

    /// Mark a week (1-4) as having had a mock test
    Mock {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=4))]
        week: u32,

        #[arg(long)]
        undo: bool,
    },

    /// Clear all habit flags
    Reset,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the stored profile
    Show,

    /// Create or replace the profile
    Set {
        #[arg(long)]
        name: String,

        #[arg(long)]
        age: u32,

        /// Exam date as YYYY-MM-DD
        #[arg(long)]
        exam_date: NaiveDate,

        #[arg(long, default_value_t = omrtrack_core::profile::DEFAULT_TARGET_SCORE)]
        target: u32,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("omrtrack=warn,omrtrack_core=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli { config, command } = cli;
    let load = || load_config_from(config.as_deref());

    match command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { test } => commands::validate::execute(test),
        Commands::Grade {
            test,
            answers,
            key,
            format,
            output,
            no_save,
        } => commands::grade::execute(&load()?, test, answers, key, format, output, no_save),
        Commands::Report { path, format } => commands::report::execute(&load()?, path, format),
        Commands::Take { test } => commands::take::execute(&load()?, test).await,
        Commands::History => commands::history::execute(&load()?),
        Commands::Mistakes {
            subject,
            unreviewed,
        } => commands::mistakes::execute(&load()?, subject, unreviewed),
        Commands::Review { id, undo } => commands::review::execute(&load()?, id, undo),
        Commands::Timer { minutes } => commands::timer::execute(&load()?, minutes).await,
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(&load()?),
            ProfileAction::Set {
                name,
                age,
                exam_date,
                target,
            } => commands::profile::set(&load()?, &name, age, exam_date, target),
        },
        Commands::Checklist { action } => match action {
            ChecklistAction::Show => commands::checklist::show(&load()?),
            ChecklistAction::Set {
                subject,
                item,
                undo,
            } => commands::checklist::set(&load()?, subject, item, undo),
        },
        Commands::Habits { action } => match action {
            HabitsAction::Show => commands::habits::show(&load()?),
            HabitsAction::Study { day, undo } => commands::habits::study(&load()?, day, undo),
            HabitsAction::Mock { week, undo } => commands::habits::mock(&load()?, week, undo),
            HabitsAction::Reset => commands::habits::reset(&load()?),
        },
    }
}
