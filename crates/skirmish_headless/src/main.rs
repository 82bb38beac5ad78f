//! Headless battle runner.
//!
//! Results go to stdout (text or JSON) or to files; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! skirmish validate --scenario assets/scenarios/skirmish_3v3.ron
//! skirmish simulate --scenario assets/scenarios/skirmish_3v3.ron --json
//! skirmish simulate --scenario assets/scenarios/standard_5v5.ron --seed 7 --record out/run.bin
//! skirmish verify --record out/run.bin
//! skirmish batch --scenario assets/scenarios/standard_5v5.ron --count 500 --output out/batch.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skirmish_core::config::EngineConfig;
use skirmish_core::engine::BattleEngine;
use skirmish_core::replay::BattleRecord;
use skirmish_core::team::{validate_team, Team};
use skirmish_headless::loader::{
    load_config, load_record, load_roster_path, save_json, save_record, DEFAULT_ROSTER_PATH,
};
use skirmish_headless::{
    render_text, run_batch, BatchConfig, BatchProgress, BattleReport, HeadlessError, Result,
    Scenario,
};

#[derive(Parser)]
#[command(name = "skirmish")]
#[command(about = "Headless auto-battler runner for CI, replays and balance testing")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hero roster file or directory of roster files
    #[arg(long, global = true, default_value = DEFAULT_ROSTER_PATH)]
    roster: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the roster and, optionally, a scenario's teams
    Validate {
        /// Scenario file to check
        #[arg(short, long)]
        scenario: Option<PathBuf>,
    },

    /// Simulate one battle
    Simulate {
        /// Scenario file to run
        #[arg(short, long)]
        scenario: PathBuf,

        /// Seed override (defaults to the scenario's seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Engine config file (overrides the scenario's config)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a replay record to a file
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Re-simulate a replay record and compare digests
    Verify {
        /// Replay record file
        #[arg(long)]
        record: PathBuf,
    },

    /// Run many seeds of one scenario for balance testing
    Batch {
        /// Scenario file to run
        #[arg(short, long)]
        scenario: PathBuf,

        /// Number of battles to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Seed of the first battle
        #[arg(long, default_value = "0")]
        seed_start: u64,

        /// Worker threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: usize,

        /// Write batch results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match &cli.command {
        Commands::Validate { scenario } => cmd_validate(&cli.roster, scenario.as_deref()),
        Commands::Simulate {
            scenario,
            seed,
            config,
            json,
            output,
            record,
        } => cmd_simulate(
            &cli.roster,
            scenario,
            *seed,
            config.as_deref(),
            *json,
            output.as_deref(),
            record.as_deref(),
        ),
        Commands::Verify { record } => cmd_verify(&cli.roster, record),
        Commands::Batch {
            scenario,
            count,
            seed_start,
            parallel,
            output,
        } => cmd_batch(
            &cli.roster,
            scenario,
            *count,
            *seed_start,
            *parallel,
            output.as_deref(),
        ),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();
}

fn cmd_validate(roster_path: &Path, scenario: Option<&Path>) -> Result<()> {
    let roster = load_roster_path(roster_path)?;
    println!("roster ok: {} heroes", roster.len());

    let Some(path) = scenario else {
        return Ok(());
    };
    let scenario = Scenario::load(path)?;

    let mut problems = 0;
    for (team, slots) in [(Team::Blue, &scenario.blue), (Team::Red, &scenario.red)] {
        let validation = validate_team(slots);
        for error in &validation.errors {
            println!("{team}: {error}");
        }
        problems += validation.errors.len();
        for slot in slots.iter().filter(|s| !roster.contains(&s.hero_id)) {
            println!("{team}: unknown hero '{}'", slot.hero_id);
            problems += 1;
        }
    }

    if problems > 0 {
        return Err(HeadlessError::InvalidScenario {
            name: scenario.name,
            problems,
        });
    }
    println!("scenario ok: {}", scenario.name);
    Ok(())
}

fn engine_for(scenario: &Scenario, config: Option<&Path>) -> Result<BattleEngine> {
    let config = match config {
        Some(path) => load_config(path)?,
        None => scenario.config_or(&EngineConfig::default()),
    };
    Ok(BattleEngine::new(config)?)
}

fn cmd_simulate(
    roster_path: &Path,
    scenario_path: &Path,
    seed: Option<u64>,
    config: Option<&Path>,
    json: bool,
    output: Option<&Path>,
    record: Option<&Path>,
) -> Result<()> {
    let roster = load_roster_path(roster_path)?;
    let scenario = Scenario::load(scenario_path)?;
    let engine = engine_for(&scenario, config)?;
    let seed = seed.unwrap_or(scenario.seed);

    tracing::info!(scenario = %scenario.name, seed, "Simulating battle");
    let result = engine.simulate_battle_seeded(&scenario.blue, &scenario.red, &roster, seed)?;
    let report = BattleReport::from_result(&scenario.name, &result);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&scenario.name, &result));
    }
    if let Some(path) = output {
        save_json(&report, path)?;
        tracing::info!(path = %path.display(), "Wrote report");
    }
    if let Some(path) = record {
        let record = BattleRecord::new(
            &scenario.name,
            &scenario.blue,
            &scenario.red,
            engine.config(),
            &result,
        );
        save_record(&record, path)?;
        tracing::info!(path = %path.display(), "Wrote replay record");
    }
    Ok(())
}

fn cmd_verify(roster_path: &Path, record_path: &Path) -> Result<()> {
    let roster = load_roster_path(roster_path)?;
    let record = load_record(record_path)?;
    let result = record.verify(&roster)?;
    println!(
        "replay ok: {} seed {} -> {} ({:016x})",
        record.scenario_id, record.seed, result.winner, result.digest
    );
    Ok(())
}

fn cmd_batch(
    roster_path: &Path,
    scenario_path: &Path,
    count: u32,
    seed_start: u64,
    parallel: usize,
    output: Option<&Path>,
) -> Result<()> {
    let roster = load_roster_path(roster_path)?;
    let scenario = Scenario::load(scenario_path)?;
    let engine = engine_for(&scenario, None)?;

    let config = BatchConfig::new(&scenario.name, count)
        .with_seed(seed_start)
        .with_parallel(parallel);
    let results = run_batch(&engine, &scenario, &roster, &config, &BatchProgress::new())?;
    let summary = &results.summary;

    println!("{}", "=".repeat(50));
    println!("BATCH COMPLETE: {}", scenario.name);
    println!("{}", "=".repeat(50));
    println!("Battles:   {}", summary.total);
    println!(
        "Blue wins: {} ({:.1}%)",
        summary.blue_wins,
        summary.blue_win_rate * 100.0
    );
    println!(
        "Red wins:  {} ({:.1}%)",
        summary.red_wins,
        summary.red_win_rate * 100.0
    );
    println!("Draws:     {}", summary.draws);
    println!("Avg time:  {:.0} ms", summary.avg_duration_ms);
    if let Some((hero, count)) = summary.mvp_counts.iter().max_by_key(|(_, count)| **count) {
        println!("Top MVP:   {hero} ({count})");
    }

    if let Some(path) = output {
        results.save(path)?;
        tracing::info!(path = %path.display(), "Wrote batch results");
    }
    Ok(())
}
