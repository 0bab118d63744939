use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use stride_merge::{ConflictPair, MemorySnapshot, MergeEngine, MergedView, ResolutionReport};
use stride_provider::{Availability, JsonFileProvider};
use stride_store::JsonFileRecordStore;
use stride_types::{activity_code, supported_activities, ExerciseRecord, FixedClock, NewRecord, Origin, RecordId};
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let engine = open_engine(&cli)?;
    match cli.command {
        Command::Add(ref args) => cmd_add(&cli, &engine, args).await,
        Command::List => cmd_list(&cli, &engine).await,
        Command::Conflicts => cmd_conflicts(&cli, &engine).await,
        Command::Resolve(ref args) => cmd_resolve(&cli, &engine, args).await,
        Command::Keep(ref args) => cmd_keep(&cli, &engine, args).await,
        Command::Activities => cmd_activities(&cli),
    }
}

fn open_engine(cli: &Cli) -> anyhow::Result<MergeEngine> {
    let store = Arc::new(JsonFileRecordStore::open(&cli.store));
    let provider = Arc::new(JsonFileProvider::open(&cli.import));
    let mut engine = MergeEngine::new(store, provider);
    if let Some(now) = cli.now {
        engine = engine.with_clock(Arc::new(FixedClock(now)));
    }
    if let Some(snapshot) = load_memory(&cli.memory)? {
        engine.restore_memory(&snapshot)?;
    }
    debug!(store = %cli.store.display(), import = %cli.import.display(), "engine opened");
    Ok(engine)
}

fn load_memory(path: &Path) -> anyhow::Result<Option<MemorySnapshot>> {
    match fs::read(path) {
        Ok(bytes) => {
            let snapshot = serde_json::from_slice(&bytes)
                .with_context(|| format!("reading conflict memory from {}", path.display()))?;
            Ok(Some(snapshot))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

fn save_memory(path: &Path, engine: &MergeEngine) -> anyhow::Result<()> {
    let snapshot = engine.memory_snapshot()?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut tmp, &snapshot)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "conflict memory saved");
    Ok(())
}

/// Accepts milliseconds since epoch or an RFC 3339 timestamp.
pub fn parse_instant(s: &str) -> anyhow::Result<i64> {
    if let Ok(ms) = s.parse::<i64>() {
        return Ok(ms);
    }
    let dt = chrono::DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("not a timestamp: {s}"))?;
    Ok(dt.timestamp_millis())
}

fn fmt_instant(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| format!("{ms}ms"))
}

fn fmt_origin(origin: Origin) -> colored::ColoredString {
    match origin {
        Origin::Local => "local".cyan(),
        Origin::External => "tracker".magenta(),
    }
}

fn fmt_record(r: &ExerciseRecord) -> String {
    let calories = r
        .calories
        .map(|c| format!(" {c} kcal"))
        .unwrap_or_default();
    format!(
        "{} {} {} → {} [{}]{}",
        r.id.to_string().dimmed(),
        r.activity_type.bold(),
        fmt_instant(r.start_ms),
        fmt_instant(r.end_ms),
        fmt_origin(r.origin),
        calories
    )
}

fn print_pair(p: &ConflictPair) {
    println!("  {} {}", "⚠".yellow(), fmt_record(&p.first));
    println!("    {}", fmt_record(&p.second));
}

fn print_availability(view: &MergedView) {
    if let Availability::Unavailable { reason } = &view.external {
        println!("{} tracker data unavailable ({reason}); showing your log only", "!".yellow());
    }
}

async fn cmd_add(cli: &Cli, engine: &MergeEngine, args: &AddArgs) -> anyhow::Result<()> {
    let mut new = NewRecord::new(&args.activity, parse_instant(&args.start)?, parse_instant(&args.end)?);
    if let Some(c) = args.calories {
        new = new.with_calories(c);
    }
    let record = engine.add_local(new).await?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => {
            println!("{} Logged {}", "✓".green().bold(), fmt_record(&record));
            if activity_code(record.activity_type.trim()).is_none() {
                println!("  {} '{}' is not a tracker activity; it will only match sessions with the same name", "note:".yellow(), record.activity_type);
            }
        }
    }
    Ok(())
}

async fn cmd_list(cli: &Cli, engine: &MergeEngine) -> anyhow::Result<()> {
    let view = engine.merged_view().await?;
    let timeline = view.timeline();

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&timeline)?),
        OutputFormat::Text => {
            print_availability(&view);
            if timeline.is_empty() {
                println!("No sessions.");
            }
            for entry in &timeline {
                let marker = if entry.in_conflict { "⚠".yellow() } else { "•".normal() };
                println!("{marker} {}", fmt_record(&entry.record));
            }
            if !view.open_conflicts.is_empty() {
                println!("\n{} open conflict(s). Run {} to review.", view.open_conflicts.len().to_string().bold(), "stride conflicts".bold());
            }
        }
    }
    Ok(())
}

async fn cmd_conflicts(cli: &Cli, engine: &MergeEngine) -> anyhow::Result<()> {
    let view = engine.merged_view().await?;
    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view.open_conflicts)?),
        OutputFormat::Text => {
            print_availability(&view);
            if view.open_conflicts.is_empty() {
                println!("{} No conflicts.", "✓".green());
            }
            for pair in &view.open_conflicts {
                print_pair(pair);
            }
        }
    }
    Ok(())
}

async fn cmd_resolve(cli: &Cli, engine: &MergeEngine, args: &ResolveArgs) -> anyhow::Result<()> {
    let view = engine.merged_view().await?;
    let keep = find_record(&view, &args.keep)?;
    let drop = find_record(&view, &args.drop)?;

    let result = engine.resolve(&keep, &drop).await;
    save_memory(&cli.memory, engine)?;
    print_report(cli, &result?)
}

async fn cmd_keep(cli: &Cli, engine: &MergeEngine, args: &KeepArgs) -> anyhow::Result<()> {
    let view = engine.merged_view().await?;
    let keep = find_record(&view, &args.id)?;

    let result = engine.keep_and_remove_other(&keep).await;
    save_memory(&cli.memory, engine)?;
    match result? {
        Some(report) => print_report(cli, &report),
        None => {
            println!("{} {} has no open conflict.", "✓".green(), keep.id);
            Ok(())
        }
    }
}

fn find_record(view: &MergedView, id: &str) -> anyhow::Result<ExerciseRecord> {
    match view.find(&RecordId::from(id)) {
        Some(r) => Ok(r.clone()),
        None => bail!("no session with id {id}"),
    }
}

fn print_report(cli: &Cli, report: &ResolutionReport) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            println!("{} Kept {}", "✓".green().bold(), report.keep.to_string().bold());
            for removal in &report.removed {
                println!("  {} {} ({:?})", "removed".red(), removal.id, removal.action);
            }
        }
    }
    Ok(())
}

fn cmd_activities(cli: &Cli) -> anyhow::Result<()> {
    let names = supported_activities();
    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Text => {
            for name in names {
                println!("{name}");
            }
        }
    }
    Ok(())
}
