mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use scaplat_config::{parse_size, BoardDescriptor, ExperimentScript};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

const EXIT_ASSERT_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "scaplat SCA platform simulator", long_about = None)]
struct Args {
    /// Path to the board descriptor (YAML)
    #[arg(short, long)]
    board: Option<PathBuf>,

    /// Path to an experiment script (YAML); its `board` entry is used when
    /// --board is not given
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Write a JSON run report to this path
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Enable register-level tracing
    #[arg(short, long)]
    trace: bool,

    /// Override the board's generator seed (must be non-zero)
    #[arg(long)]
    seed: Option<u32>,

    /// Print this many random bytes (e.g. "16 B") as hex on stdout
    #[arg(long)]
    random: Option<String>,

    /// Poll budget for hardware waits when no script is given
    #[arg(long, default_value = "10000")]
    max_polls: u32,
}

struct Setup {
    board: BoardDescriptor,
    script: Option<ExperimentScript>,
    seed: NonZeroU32,
    max_polls: u32,
}

fn load(args: &Args) -> Result<Setup> {
    let script = match &args.script {
        Some(path) => {
            info!("Loading experiment script: {:?}", path);
            Some((ExperimentScript::from_file(path)?, path.clone()))
        }
        None => None,
    };

    let board_path = match (&args.board, &script) {
        (Some(path), _) => path.clone(),
        (None, Some((script, path))) => script.board_path(path),
        (None, None) => anyhow::bail!("Either --board or --script is required"),
    };
    info!("Loading board descriptor: {:?}", board_path);
    let board = BoardDescriptor::from_file(&board_path)?;

    let seed = match args.seed {
        Some(seed) => NonZeroU32::new(seed).context("--seed must be non-zero")?,
        None => board.seed()?,
    };

    let max_polls = script
        .as_ref()
        .map(|(s, _)| s.limits.max_polls)
        .unwrap_or(args.max_polls);
    if max_polls == 0 {
        anyhow::bail!("--max-polls must be greater than zero");
    }

    Ok(Setup {
        board,
        script: script.map(|(s, _)| s),
        seed,
        max_polls,
    })
}

fn run(args: &Args, setup: Setup) -> Result<bool> {
    info!("Starting scaplat on board '{}'", setup.board.name);
    let mut platform = runner::build_platform(&setup.board, setup.seed, setup.max_polls);

    let mut passed = true;
    if let Some(script) = &setup.script {
        let report = runner::run_script(&mut platform, &setup.board, setup.seed, script)?;
        passed = report.passed();
        info!(
            "Script finished: {} ({} steps, {} assertions)",
            report.status,
            report.steps.len(),
            report.assertions.len()
        );
        if let Some(path) = &args.report {
            runner::write_report(&report, path)?;
            info!("Report written to {:?}", path);
        }
    } else if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&platform.snapshot())?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    }

    if let Some(size) = &args.random {
        let len = parse_size(size)?;
        if len > runner::MAX_FILL_BYTES {
            anyhow::bail!("--random {} exceeds the {} byte limit", size, runner::MAX_FILL_BYTES);
        }
        let mut buf = vec![0u8; len as usize];
        platform.fill_random(&mut buf);
        println!("{}", runner::hex(&buf));
    }

    info!("Final cycle count: {}", platform.cycle_count());
    Ok(passed)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.trace {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let setup = match load(&args) {
        Ok(setup) => setup,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    match run(&args, setup) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_ASSERT_FAIL),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}
