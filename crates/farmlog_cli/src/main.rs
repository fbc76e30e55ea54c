//! `farmlog` command-line front end.
//!
//! # Responsibility
//! - Map subcommands onto `JournalService` use cases.
//! - Render snapshots as plain text; all invariants stay in `farmlog_core`.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use farmlog_core::aggregate::totals_by_month;
use farmlog_core::{
    core_version, export, init_logging, EditOutcome, EntryQuery, EntryUpdate, JournalConfig,
    JournalKind, JournalService, JsonFileStore, NewRecord, Record, RecordId,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "farmlog", about = "Keep farm activity, growth and waste journals")]
struct Cli {
    /// Directory holding the journal files (overrides FARMLOG_DATA_DIR).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Journal to operate on: activity, growth or waste.
    #[arg(long, short, global = true, default_value = "activity")]
    journal: JournalKind,
    /// Enable rolling file logs in this directory (overrides FARMLOG_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append a new entry.
    Add {
        description: String,
        #[arg(long)]
        category: String,
        /// Activity date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value_t = 0.0)]
        cost: f64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List entries, newest first.
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Change fields of an existing entry; omitted fields keep their value.
    Edit {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        cost: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Permanently delete an entry.
    Delete { id: String },
    /// Month and all-time totals.
    Summary {
        /// Reference date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Write the journal as CSV to stdout or a file.
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the core version.
    Version,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = JournalConfig::from_env().context("invalid environment configuration")?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if cli.log_dir.is_some() {
        config.log_dir = cli.log_dir;
    }
    if let Some(log_dir) = &config.log_dir {
        let log_dir = if log_dir.is_absolute() {
            log_dir.clone()
        } else {
            std::env::current_dir()?.join(log_dir)
        };
        init_logging(&config.log_level, &log_dir)
            .map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))?;
    }

    let store = config.open_store(cli.journal);
    info!(
        "event=cli_start module=cli status=ok journal={} path={}",
        cli.journal.as_str(),
        store.path().display()
    );
    let service = JournalService::new(store);
    let today = Local::now().date_naive();

    match cli.command {
        Command::Add {
            description,
            category,
            date,
            cost,
            notes,
        } => {
            let malformed = warn_if_malformed(&service)?;
            let mut entry = NewRecord::new(date.unwrap_or(today), category, description, cost);
            if let Some(notes) = notes {
                entry = entry.with_notes(notes);
            }
            let record = service.add_entry(entry)?;
            println!("added {}", record.id);
            if malformed {
                if let Some(moved_to) = service.store().quarantine_files().last() {
                    eprintln!("warning: unreadable journal moved to {}", moved_to.display());
                }
            }
        }
        Command::List {
            category,
            from,
            to,
            limit,
        } => {
            warn_if_malformed(&service)?;
            let query = EntryQuery {
                category,
                from,
                to,
                limit,
            };
            for record in service.list_entries(&query)? {
                print_record(&record);
            }
        }
        Command::Edit {
            id,
            description,
            category,
            date,
            cost,
            notes,
        } => {
            let id = RecordId::parse(&id)?;
            let current = service
                .snapshot()?
                .into_iter()
                .find(|record| record.id == id)
                .with_context(|| format!("journal entry not found: {id}"))?;
            let mut update = EntryUpdate::from_record(&current);
            if let Some(description) = description {
                update.description = description;
            }
            if let Some(category) = category {
                update.category = category;
            }
            if let Some(date) = date {
                update.date = date;
            }
            if let Some(cost) = cost {
                update.cost = cost;
            }
            if let Some(notes) = notes {
                update.notes = Some(notes);
            }
            match service.edit_entry(&id, update)? {
                EditOutcome::Updated(_) => println!("updated {id}"),
                EditOutcome::Unchanged(_) => println!("no changes for {id}"),
            }
        }
        Command::Delete { id } => {
            let id = RecordId::parse(&id)?;
            if service.remove_entry(&id)? {
                println!("deleted {id}");
            } else {
                println!("no entry with id {id}");
            }
        }
        Command::Summary { date } => {
            warn_if_malformed(&service)?;
            let reference = date.unwrap_or(today);
            let summary = service.summary(reference)?;
            println!(
                "{} journal, month of {}",
                cli.journal.as_str(),
                reference.format("%Y-%m")
            );
            println!(
                "  this month: {:.2} ({} entries)",
                summary.month_total, summary.month_entries
            );
            println!(
                "  all time:   {:.2} ({} entries)",
                summary.all_time_total, summary.total_entries
            );
            for (category, total) in &summary.month_by_category {
                println!("    {category}: {total:.2}");
            }
            println!("  by month:");
            for month in totals_by_month(&service.snapshot()?) {
                println!(
                    "    {}-{:02}: {:.2} ({} entries)",
                    month.year, month.month, month.total_cost, month.entries
                );
            }
        }
        Command::Export { output } => {
            warn_if_malformed(&service)?;
            let csv = export::to_csv(&service.snapshot()?);
            match output {
                Some(path) => std::fs::write(&path, csv)
                    .with_context(|| format!("failed to write `{}`", path.display()))?,
                None => print!("{csv}"),
            }
        }
        Command::Version => println!("farmlog_core {}", core_version()),
    }

    Ok(())
}

/// Prints the load warning, if any. Returns whether the journal is malformed.
fn warn_if_malformed(service: &JournalService<JsonFileStore>) -> Result<bool> {
    match service.load()?.warning {
        Some(warning) => {
            eprintln!("warning: {warning}");
            Ok(true)
        }
        None => Ok(false),
    }
}

fn print_record(record: &Record) {
    println!(
        "{}  {}  {:<16}  {:>12.2}  {}",
        record.id,
        record.date,
        record.category,
        record.cost,
        record.description
    );
    if let Some(notes) = &record.notes {
        println!("    {notes}");
    }
}
