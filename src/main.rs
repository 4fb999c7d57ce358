use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use witness_rollup::{
    insert_hearings, load_exclusion_list, load_hearings, load_hearings_csv_path, open_database,
    verify_count, Chamber, HearingRecord, NormalizedIdentity, RollupConfig, RollupEngine,
    RollupStats, WitnessQuery,
};

#[derive(Parser)]
#[command(name = "witness-rollup", version, about = "Roll up congressional hearing witnesses into distinct people")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a hearing CSV into the SQLite store (re-imports are skipped)
    Import {
        #[arg(long)]
        csv: PathBuf,

        #[arg(long)]
        db: PathBuf,

        /// Chamber for rows without a chamber column
        #[arg(long, default_value = "house")]
        chamber: Chamber,
    },

    /// Build the witness rollup and write it as JSON
    Rollup(RollupArgs),

    /// Print the normalized key for each name
    Normalize {
        /// JSON rollup config (extra titles, suffixes, places)
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Args)]
struct RollupArgs {
    /// Read hearings from a store built by `import`
    #[arg(long, conflicts_with = "csv", required_unless_present = "csv")]
    db: Option<PathBuf>,

    /// Read hearings straight from a CSV export
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Chamber for CSV rows without a chamber column
    #[arg(long, default_value = "house")]
    chamber: Chamber,

    /// JSON list of names to leave out (e.g. sitting legislators)
    #[arg(long)]
    exclude: Option<PathBuf>,

    /// JSON rollup config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Only witnesses who appeared in this chamber
    #[arg(long = "only-chamber")]
    only_chamber: Option<Chamber>,

    #[arg(long)]
    search: Option<String>,

    #[arg(long)]
    committee: Option<String>,

    #[arg(long, default_value_t = 0)]
    min_hearings: usize,

    #[arg(long)]
    limit: Option<usize>,
}

/// JSON report: stats first, then the listed witnesses
#[derive(Serialize)]
struct RollupReport<'a> {
    generated_at: String,
    version: &'static str,
    stats: &'a RollupStats,
    witnesses: Vec<&'a NormalizedIdentity>,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Import { csv, db, chamber } => run_import(&csv, &db, chamber),
        Command::Rollup(args) => run_rollup(args),
        Command::Normalize { config, names } => run_normalize(config.as_deref(), &names),
    }
}

fn init_tracing() {
    // Logs go to stderr so the JSON report can be piped
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn run_import(csv_path: &Path, db_path: &Path, chamber: Chamber) -> Result<()> {
    let hearings = load_hearings_csv_path(csv_path, chamber)?;

    let conn = open_database(db_path)?;
    let summary = insert_hearings(&conn, &hearings)?;
    let counts = verify_count(&conn)?;

    info!(
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        hearings = counts.hearings,
        witnesses = counts.witnesses,
        "store updated"
    );

    Ok(())
}

fn load_source(args: &RollupArgs) -> Result<Vec<HearingRecord>> {
    match (&args.db, &args.csv) {
        (Some(db), _) => {
            let conn = open_database(db)?;
            load_hearings(&conn)
        }
        (None, Some(csv)) => load_hearings_csv_path(csv, args.chamber),
        (None, None) => anyhow::bail!("either --db or --csv is required"),
    }
}

/// Engine from an optional config file, defaults otherwise
fn build_engine(config_path: Option<&Path>) -> Result<RollupEngine> {
    let config = match config_path {
        Some(path) => RollupConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => RollupConfig::default(),
    };
    Ok(RollupEngine::new(config)?)
}

fn run_rollup(args: RollupArgs) -> Result<()> {
    let engine = build_engine(args.config.as_deref())?;

    let hearings = load_source(&args)?;

    let excluded_names = match &args.exclude {
        Some(path) => load_exclusion_list(path)?,
        None => Vec::new(),
    };
    let excluded = engine.exclusion_set(&excluded_names);

    let rollup = engine.run(&hearings, &excluded);
    info!("{}", rollup.stats.summary());

    let query = WitnessQuery {
        chamber: args.only_chamber,
        search: args.search.clone(),
        committee: args.committee.clone(),
        min_hearings: args.min_hearings,
        offset: 0,
        limit: args.limit,
    };

    let report = RollupReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        version: witness_rollup::VERSION,
        stats: &rollup.stats,
        witnesses: query.apply(&rollup.witnesses, engine.normalizer()),
    };
    let json = serde_json::to_string_pretty(&report)?;

    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write report: {:?}", path))?;
            info!(path = ?path, witnesses = report.witnesses.len(), "report written");
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn run_normalize(config_path: Option<&Path>, names: &[String]) -> Result<()> {
    let engine = build_engine(config_path)?;
    for name in names {
        println!("{}\t{}", name, normalize_line(&engine, name));
    }
    Ok(())
}

fn normalize_line(engine: &RollupEngine, name: &str) -> String {
    engine.normalizer().normalize(name)
}
