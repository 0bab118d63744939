use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stride",
    about = "Stride — one exercise timeline from your own log and your tracker",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Local exercise log (JSON)
    #[arg(long, global = true, default_value = "stride-log.json")]
    pub store: PathBuf,

    /// Tracker export to import sessions from (JSON)
    #[arg(long, global = true, default_value = "stride-import.json")]
    pub import: PathBuf,

    /// Where resolved conflicts are remembered between runs (JSON)
    #[arg(long, global = true, default_value = "stride-memory.json")]
    pub memory: PathBuf,

    /// Treat this instant (ms since epoch) as "now"
    #[arg(long, global = true)]
    pub now: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log a session by hand
    Add(AddArgs),
    /// Show the merged timeline
    List,
    /// Show open conflicts
    Conflicts,
    /// Keep one session and remove everything overlapping it
    Resolve(ResolveArgs),
    /// Keep a session and remove the other side of its first conflict
    Keep(KeepArgs),
    /// List the activity names trackers report
    Activities,
}

#[derive(Args)]
pub struct AddArgs {
    /// Activity, e.g. "Running"
    pub activity: String,
    /// Start, as ms since epoch or RFC 3339
    #[arg(long)]
    pub start: String,
    /// End, as ms since epoch or RFC 3339
    #[arg(long)]
    pub end: String,
    #[arg(long)]
    pub calories: Option<u32>,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Id of the session to keep
    pub keep: String,
    /// Id of the session to drop
    pub drop: String,
}

#[derive(Args)]
pub struct KeepArgs {
    pub id: String,
}
