mod block;
mod cache;
mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use calindex_core::{Store, StoreConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "calindex")]
#[command(about = "Search and edit the events of your local iCalendar files")]
struct Cli {
    /// Calendar file to use instead of the configured ones (repeatable)
    #[arg(short, long = "file", global = true)]
    files: Vec<PathBuf>,

    /// Print events as JSON records
    #[arg(long, global = true)]
    json: bool,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List loaded calendars
    Calendars,
    /// Show the events of one day
    Day {
        /// Date (YYYY-MM-DD), defaults to today
        date: Option<String>,
    },
    /// Show upcoming events (at most 30 days ahead)
    Upcoming {
        /// First day to look at (YYYY-MM-DD), defaults to today
        #[arg(long)]
        from: Option<String>,

        /// Maximum number of events
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// Search events by name and/or date
    Search {
        /// Case-insensitive part of the event title
        name: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Add an event
    Add {
        /// Event title
        title: String,

        /// Start date/time (e.g., "2025-03-20" or "2025-03-20T15:00")
        #[arg(short, long)]
        start: String,

        /// End date/time
        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        /// Duration (e.g., "30m", "1h", "2h30m")
        #[arg(short, long, conflicts_with = "end")]
        duration: Option<String>,

        /// Calendar to add the event to (defaults to the first one)
        #[arg(short, long)]
        calendar: Option<String>,

        /// Event location
        #[arg(short, long)]
        location: Option<String>,

        /// Event description
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove the event with this title on a date
    Remove {
        title: String,
        /// Date (YYYY-MM-DD)
        date: String,
    },
    /// Change the title and times of an event
    Edit {
        title: String,
        /// Current date (YYYY-MM-DD)
        date: String,
        new_title: String,
        /// New start (date, or date and time)
        start: String,
        /// New end (date, or date and time)
        end: String,
    },
    /// Run a command block read from stdin
    Block {
        /// addevent, removeevent, editevent, searchevent or events
        lang: String,

        /// Cache the response under this id
        #[arg(long)]
        message_id: Option<String>,
    },
    /// Show a cached response again
    Replay {
        message_id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = StoreConfig::load()?;
    let paths = if cli.files.is_empty() {
        config.calendar_paths()
    } else {
        cli.files.clone()
    };
    let json = cli.json;

    match cli.command {
        Commands::Calendars => commands::calendars::run(&load_store(&paths)?, json),
        Commands::Day { date } => commands::day::run(&load_store(&paths)?, date.as_deref(), json),
        Commands::Upcoming { from, limit } => {
            commands::upcoming::run(&load_store(&paths)?, from.as_deref(), limit, json)
        }
        Commands::Search { name, from, to } => commands::search::run(
            &load_store(&paths)?,
            name,
            from.as_deref(),
            to.as_deref(),
            json,
        ),
        Commands::Add {
            title,
            start,
            end,
            duration,
            calendar,
            location,
            description,
        } => commands::add::run(
            &mut load_store(&paths)?,
            commands::add::NewEvent {
                title,
                start,
                end,
                duration,
                calendar,
                location,
                description,
            },
            json,
        ),
        Commands::Remove { title, date } => {
            commands::remove::run(&mut load_store(&paths)?, &title, &date)
        }
        Commands::Edit {
            title,
            date,
            new_title,
            start,
            end,
        } => commands::edit::run(
            &mut load_store(&paths)?,
            &title,
            &date,
            &new_title,
            &start,
            &end,
            json,
        ),
        Commands::Block { lang, message_id } => commands::block::run(
            &mut load_store(&paths)?,
            &lang,
            message_id.as_deref(),
            &config.cache_path()?,
        ),
        Commands::Replay { message_id } => {
            commands::replay::run(&message_id, &config.cache_path()?)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "calindex=debug,calindex_core=debug"
    } else {
        "calindex=warn,calindex_core=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_store(paths: &[PathBuf]) -> Result<Store> {
    let store = Store::load(paths);

    if store.sources().is_empty() {
        let tried: Vec<_> = paths.iter().map(|p| p.display().to_string()).collect();
        anyhow::bail!(
            "No calendars found.\n\n\
            Looked for: {}\n\n\
            Point calindex at a file with:\n  \
            calindex --file <path.ics> calendars",
            if tried.is_empty() { "(nothing configured)".to_string() } else { tried.join(", ") }
        );
    }

    Ok(store)
}
