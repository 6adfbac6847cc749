//! `momentcmp`: compare moments at a chosen granularity from the command line.
//!
//! Prints `true` or `false` for the predicate commands and a JSON object for
//! `relate`. Unparsable datetimes compare `false`; only configuration errors
//! (unknown timezone or week start) exit non-zero.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use moment_compare::{
    Comparator, IntoUnit, LocalFactory, LocalOptions, Moment, MomentFactory, WeekStartDay,
};
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "momentcmp", version)]
#[command(about = "Compare moments at year, month, day, ... or millisecond precision", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// IANA timezone used to read local datetimes
    #[arg(long, global = true, default_value = "UTC")]
    tz: String,

    /// First day of a `week` bucket (monday or sunday)
    #[arg(long, global = true, default_value = "sunday")]
    week_start: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct PairArgs {
    /// The moment being compared
    this: String,

    /// The moment it is compared against
    input: String,

    /// Comparison unit (year, quarter, month, week, isoWeek, day, hour, minute, second, ms)
    #[arg(short, long)]
    unit: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Is THIS before INPUT?
    Before(PairArgs),

    /// Is THIS after INPUT?
    After(PairArgs),

    /// Is THIS in the same unit bucket as INPUT?
    Same(PairArgs),

    /// Is THIS the same as or before INPUT?
    SameOrBefore(PairArgs),

    /// Is THIS the same as or after INPUT?
    SameOrAfter(PairArgs),

    /// Is THIS between FROM and TO?
    Between {
        /// The moment being compared
        this: String,

        /// Lower bound of the range
        from: String,

        /// Upper bound of the range
        to: String,

        /// Comparison unit
        #[arg(short, long)]
        unit: Option<String>,

        /// Range ends: "()" exclusive, "[]" inclusive, "[)" or "(]" mixed
        #[arg(short, long, default_value = "()")]
        inclusivity: String,
    },

    /// Print every predicate of THIS against INPUT as JSON
    Relate(PairArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let week_start: WeekStartDay = cli
        .week_start
        .parse()
        .with_context(|| format!("unsupported week start '{}'", cli.week_start))?;
    let options = LocalOptions::default()
        .with_timezone(&cli.tz)
        .with_context(|| format!("unknown timezone '{}'", cli.tz))?
        .with_week_start(week_start);

    let comparator = Comparator::new(LocalFactory::new(options));
    let output = run(&comparator, cli.command)?;
    println!("{output}");
    Ok(())
}

/// Execute one command and render its result.
fn run(comparator: &Comparator<LocalFactory>, command: Commands) -> Result<String> {
    let rendered = match command {
        Commands::Before(args) => {
            let this = read_moment(comparator, &args.this);
            comparator
                .is_before(&this, args.input.as_str(), checked_unit(args.unit.as_deref()))
                .to_string()
        }
        Commands::After(args) => {
            let this = read_moment(comparator, &args.this);
            comparator
                .is_after(&this, args.input.as_str(), checked_unit(args.unit.as_deref()))
                .to_string()
        }
        Commands::Same(args) => {
            let this = read_moment(comparator, &args.this);
            comparator
                .is_same(&this, args.input.as_str(), checked_unit(args.unit.as_deref()))
                .to_string()
        }
        Commands::SameOrBefore(args) => {
            let this = read_moment(comparator, &args.this);
            comparator
                .is_same_or_before(
                    &this,
                    args.input.as_str(),
                    checked_unit(args.unit.as_deref()),
                )
                .to_string()
        }
        Commands::SameOrAfter(args) => {
            let this = read_moment(comparator, &args.this);
            comparator
                .is_same_or_after(
                    &this,
                    args.input.as_str(),
                    checked_unit(args.unit.as_deref()),
                )
                .to_string()
        }
        Commands::Between {
            this,
            from,
            to,
            unit,
            inclusivity,
        } => {
            let this = read_moment(comparator, &this);
            comparator
                .is_between(
                    &this,
                    from.as_str(),
                    to.as_str(),
                    checked_unit(unit.as_deref()),
                    inclusivity.as_str(),
                )
                .to_string()
        }
        Commands::Relate(args) => {
            let this = read_moment(comparator, &args.this);
            let relation = comparator.relate(
                &this,
                args.input.as_str(),
                checked_unit(args.unit.as_deref()),
            );
            serde_json::to_string_pretty(&relation).context("failed to serialize relation")?
        }
    };
    Ok(rendered)
}

fn read_moment(comparator: &Comparator<LocalFactory>, text: &str) -> Moment {
    let moment = comparator.factory().create(text.into());
    debug!(input = text, moment = %moment, "read moment");
    moment
}

/// Pass the unit through unchanged, warning when it will fall back to milliseconds.
fn checked_unit(unit: Option<&str>) -> Option<&str> {
    if let Some(name) = unit {
        if name.into_unit().is_none() {
            warn!(unit = name, "unknown unit, comparing at millisecond precision");
        }
    }
    unit
}
