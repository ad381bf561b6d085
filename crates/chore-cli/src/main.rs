//! `chores` CLI: track recurring chores and habits from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Add a chore that repeats every week from its start date
//! chores add --title "Take out bins" --date 2024-04-01 --recurrence weekly
//!
//! # Upcoming occurrences (60 days from today by default)
//! chores list
//! chores list --from 2024-04-01 --days 7 --json
//!
//! # One calendar month
//! chores calendar --month 2024-04
//!
//! # Tick an occurrence off, or undo it
//! chores done 1711958400000 2024-04-08
//! chores undo 1711958400000 2024-04-08
//!
//! # Sync with a remote spreadsheet endpoint
//! chores --sync-url https://script.google.com/macros/s/.../exec push
//! chores pull
//! ```

mod config;
mod http;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chore_engine::date::{format_date, parse_date, parse_month};
use chore_engine::store::{FileStore, Storage};
use chore_engine::sync;
use chore_engine::{AgendaEntry, Chore, NewChore, Recurrence, Tracker};
use chrono::{Datelike, Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::http::HttpTransport;

#[derive(Parser)]
#[command(name = "chores", version, about = "Recurring chore and habit tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to $CONFIG_DIR/chores/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the chore data, overriding the config file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Remote sync endpoint, overriding the config file
    #[arg(long, global = true, env = "CHORES_SYNC_URL")]
    sync_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a chore and print its id
    Add(ChoreFields),
    /// Replace a chore's fields, keeping its id and completions
    Edit {
        id: String,
        #[command(flatten)]
        fields: ChoreFields,
    },
    /// Upcoming occurrences with their done state
    List {
        /// First day of the window (defaults to today)
        #[arg(long, value_parser = date_arg)]
        from: Option<NaiveDate>,
        /// Number of days to show (defaults to horizon_days from the config)
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Occurrences within one calendar month
    Calendar {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long, value_parser = month_arg)]
        month: Option<(i32, u32)>,
        #[arg(long)]
        json: bool,
    },
    /// All chore definitions
    Chores {
        #[arg(long)]
        json: bool,
    },
    /// Mark an occurrence as done
    Done {
        id: String,
        #[arg(value_parser = date_arg)]
        date: NaiveDate,
    },
    /// Unmark an occurrence
    Undo {
        id: String,
        #[arg(value_parser = date_arg)]
        date: NaiveDate,
    },
    /// Delete a chore and its completion records
    Delete { id: String },
    /// Forget every completion record
    ClearCompleted,
    /// Upload local chores and completions, overwriting the remote copy
    Push,
    /// Replace local chores and completions with the remote copy
    Pull,
}

#[derive(Args)]
struct ChoreFields {
    #[arg(long)]
    title: String,
    /// Start date, YYYY-MM-DD
    #[arg(long)]
    date: String,
    #[arg(long)]
    notes: Option<String>,
    /// none, daily, weekly or monthly
    #[arg(long, default_value = "none", value_parser = recurrence_arg)]
    recurrence: Recurrence,
}

impl ChoreFields {
    fn into_new_chore(self) -> NewChore {
        let mut input = NewChore::new(self.title, self.date).with_recurrence(self.recurrence);
        if let Some(notes) = self.notes {
            input = input.with_notes(notes);
        }
        input
    }
}

fn date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("invalid date '{}': expected YYYY-MM-DD", s))
}

fn month_arg(s: &str) -> Result<(i32, u32), String> {
    parse_month(s).ok_or_else(|| format!("invalid month '{}': expected YYYY-MM", s))
}

fn recurrence_arg(s: &str) -> Result<Recurrence, String> {
    Recurrence::parse_input(s).map_err(|e| e.to_string())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file merged with command-line overrides.
struct Settings {
    data_dir: PathBuf,
    sync_url: Option<String>,
    horizon_days: u32,
    sync_timeout_secs: u64,
}

impl Settings {
    fn resolve(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => config.data_dir()?,
        };
        Ok(Self {
            data_dir,
            sync_url: cli.sync_url.clone().or_else(|| config.sync_url.clone()),
            horizon_days: config.horizon_days(),
            sync_timeout_secs: config.sync_timeout_secs(),
        })
    }

    fn transport(&self) -> Result<HttpTransport> {
        match self.sync_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => HttpTransport::new(url, self.sync_timeout_secs),
            _ => bail!(
                "No sync endpoint configured: set sync_url in the config file, \
                 pass --sync-url, or set CHORES_SYNC_URL"
            ),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::resolve(&cli)?;
    let storage = Storage::new(FileStore::new(&settings.data_dir));
    let snapshot = storage.load().with_context(|| {
        format!(
            "Failed to load chores from {}",
            settings.data_dir.display()
        )
    })?;
    let mut tracker = Tracker::from_snapshot(snapshot);

    let changed = run(cli.command, &settings, &mut tracker)?;
    if changed {
        storage.save(&tracker.snapshot()).with_context(|| {
            format!("Failed to save chores to {}", settings.data_dir.display())
        })?;
    }
    Ok(())
}

/// Execute one command. Returns whether local state changed and must be
/// saved.
fn run(command: Commands, settings: &Settings, tracker: &mut Tracker) -> Result<bool> {
    let today = Local::now().date_naive();

    match command {
        Commands::Add(fields) => {
            let chore = tracker
                .add_chore(fields.into_new_chore(), Utc::now())
                .context("Could not add chore")?;
            println!("{}", chore.id);
            Ok(true)
        }
        Commands::Edit { id, fields } => {
            tracker
                .replace_chore(&id, fields.into_new_chore())
                .with_context(|| format!("Could not edit chore {}", id))?;
            println!("Updated {}", id);
            Ok(true)
        }
        Commands::List { from, days, json } => {
            let start = from.unwrap_or(today);
            let entries = tracker.upcoming(start, days.unwrap_or(settings.horizon_days));
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No upcoming chores.");
            } else {
                for entry in &entries {
                    println!("{}", agenda_line(entry));
                }
            }
            Ok(false)
        }
        Commands::Calendar { month, json } => {
            let (year, month) = month.unwrap_or((today.year(), today.month()));
            let Some(entries) = tracker.month(year, month) else {
                bail!("Invalid month {}-{:02}", year, month);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(false);
            }
            if let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) {
                println!("{}", first.format("%B %Y"));
            }
            if entries.is_empty() {
                println!("No chores this month.");
            }
            for entry in &entries {
                println!("{}", agenda_line(entry));
            }
            Ok(false)
        }
        Commands::Chores { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(tracker.chores())?);
            } else if tracker.chores().is_empty() {
                println!("No chores yet.");
            } else {
                let mut chores: Vec<&Chore> = tracker.chores().iter().collect();
                chores.sort_by(|a, b| a.start_date.cmp(&b.start_date));
                for chore in chores {
                    println!("{}", chore_line(chore));
                }
            }
            Ok(false)
        }
        Commands::Done { id, date } => {
            tracker
                .set_completed(&id, date, true)
                .with_context(|| format!("Could not mark {} done on {}", id, date))?;
            Ok(true)
        }
        Commands::Undo { id, date } => {
            tracker
                .set_completed(&id, date, false)
                .with_context(|| format!("Could not unmark {} on {}", id, date))?;
            Ok(true)
        }
        Commands::Delete { id } => {
            let removed = tracker
                .delete_chore(&id)
                .with_context(|| format!("Could not delete chore {}", id))?;
            println!("Deleted \"{}\"", removed.title);
            Ok(true)
        }
        Commands::ClearCompleted => {
            let cleared = tracker.clear_completed();
            println!("Cleared {} completion(s)", cleared);
            Ok(cleared > 0)
        }
        Commands::Push => {
            let transport = settings.transport()?;
            let report = sync::push(&transport, &tracker.snapshot(), Utc::now())
                .context("Push did not complete; local data is unchanged, try again later")?;
            println!(
                "Pushed {} chore(s) and {} completion(s)",
                report.chores_written, report.completions_written
            );
            Ok(false)
        }
        Commands::Pull => {
            let transport = settings.transport()?;
            let pulled = sync::pull(&transport)
                .context("Pull did not complete; local data is unchanged, try again later")?;
            *tracker = Tracker::from_snapshot(pulled.snapshot);
            println!(
                "Pulled {} chore(s) and {} completion(s){}",
                tracker.chores().len(),
                tracker.completions().len(),
                pulled
                    .synced_at
                    .map(|at| format!(" (synced at {})", at))
                    .unwrap_or_default()
            );
            Ok(true)
        }
    }
}

fn agenda_line(entry: &AgendaEntry<'_>) -> String {
    let mark = if entry.done { "x" } else { " " };
    let mut line = format!(
        "{} {}  [{}] {}",
        format_date(entry.date),
        entry.date.format("%a"),
        mark,
        entry.chore.title
    );
    if entry.chore.recurrence != Recurrence::None {
        line.push_str(&format!(" ({})", entry.chore.recurrence));
    }
    line.push_str(&format!("  #{}", entry.chore.id));
    line
}

fn chore_line(chore: &Chore) -> String {
    let mut line = format!(
        "{}  {}  {:<7}  {}",
        chore.id, chore.start_date, chore.recurrence, chore.title
    );
    if !chore.notes.is_empty() {
        line.push_str(&format!("\n    {}", chore.notes));
    }
    line
}
