//! plancal CLI - Planning calendar
//!
//! Command-line front end for creating, editing and viewing plan records as
//! a timeline, a month calendar or an agenda.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plancal_core::{dates, Facet, Granularity, Selection, ValidationError};
use plancal_engine::{GroupBy, MonthCursor};

#[derive(Parser)]
#[command(name = "plancal")]
#[command(author, version, about = "Planning calendar and timeline", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (defaults to ./plancal.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Data file holding the records
    #[arg(short, long, global = true, env = "PLANCAL_DATA", value_name = "FILE")]
    data: Option<PathBuf>,

    /// Override today's date (YYYY-MM-DD)
    #[arg(long, global = true, env = "PLANCAL_TODAY", value_parser = parse_date)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Record fields shared by `add` and `edit`
#[derive(clap::Args, Debug, Default)]
struct RecordArgs {
    /// Title shown on the calendar
    #[arg(long)]
    title: Option<String>,

    /// Grouping key (theme or category)
    #[arg(long)]
    group: Option<String>,

    /// First day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// Last day, defaults to the start day
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,

    #[arg(long)]
    channel: Option<String>,

    #[arg(long)]
    sub_channel: Option<String>,

    /// Category tag, repeatable
    #[arg(long = "category")]
    categories: Vec<String>,

    #[arg(long)]
    owner: Option<String>,

    #[arg(long)]
    notes: Option<String>,

    /// Flag as a promotion, with an optional message
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    promo: Option<String>,
}

/// Filter and grouping flags shared by the view commands
#[derive(clap::Args, Debug, Default)]
struct ViewArgs {
    /// Facet filter such as `channel=CRM` or `group=launch,pr`, repeatable
    #[arg(short, long = "filter", value_name = "FACET=VALUES", value_parser = parse_filter)]
    filters: Vec<(Facet, Selection)>,

    /// Row grouping (group, group_channel, group_channel_sub_channel)
    #[arg(short, long, value_parser = parse_group_by)]
    group_by: Option<GroupBy>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List every record
    List {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Create a record
    Add {
        #[command(flatten)]
        fields: RecordArgs,
    },

    /// Change fields of an existing record
    Edit {
        /// Record id
        id: String,

        #[command(flatten)]
        fields: RecordArgs,
    },

    /// Delete a record
    Delete {
        /// Record id
        id: String,
    },

    /// Show the timeline for a date range
    Layout {
        /// First day, defaults to the first of the current month
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// Last day, defaults to the end of the start month
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// Column width (day, week, month)
        #[arg(short, long, value_parser = parse_unit)]
        unit: Option<Granularity>,

        #[command(flatten)]
        view: ViewArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Paint row markers with ANSI colors
        #[arg(long)]
        color: bool,
    },

    /// Show a month calendar page
    Month {
        /// Month as YYYY-MM, defaults to the current month
        #[arg(value_parser = parse_month)]
        month: Option<MonthCursor>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// List the next records starting from today
    Upcoming {
        /// Maximum number of records
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show everything scheduled on one day
    Day {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },

    /// Replace all records with the sample plan
    Reset,
}

fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    dates::parse_calendar_date(value)
}

fn parse_unit(value: &str) -> Result<Granularity, ValidationError> {
    value.parse()
}

fn parse_group_by(value: &str) -> Result<GroupBy, ValidationError> {
    value.parse()
}

fn parse_filter(value: &str) -> Result<(Facet, Selection), String> {
    let (facet, values) = value
        .split_once('=')
        .ok_or_else(|| format!("expected FACET=VALUES, got '{}'", value))?;
    let facet: Facet = facet.parse().map_err(|e: ValidationError| e.to_string())?;
    Ok((facet, Selection::parse(values)))
}

fn parse_month(value: &str) -> Result<MonthCursor, ValidationError> {
    let invalid = || ValidationError::InvalidDate(value.to_string());
    let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    MonthCursor::new(year, month)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("plancal - Planning calendar");
        println!("Run with --help for usage information");
        return Ok(());
    };

    let cwd = std::env::current_dir()?;
    let config = config::Config::load(cli.config.as_deref(), &cwd)?;
    let today = cli.today.unwrap_or_else(|| chrono::Local::now().date_naive());
    let data_file = config.data_file(cli.data.as_deref(), &cwd);

    let mut session = commands::Session::open(config, data_file, today)?;
    let output = session.run(command)?;
    print!("{}", output);
    Ok(())
}
