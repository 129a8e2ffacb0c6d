//! tutorial-snapshot: run a tutorial, capture every step, snapshot every part.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tutorial_snapshot::domain::Workspace;
use tutorial_snapshot::Pipeline;

/// Conventional shell status for termination by SIGINT
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn cli() -> Command {
    Command::new("tutorial-snapshot")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run the tutorial, capture each cell's output and snapshot each part")
        .arg(
            Arg::new("root")
                .long("root")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Workspace root (defaults to the nearest directory with .tutorial-snapshot.toml, else the current directory)"),
        )
        .arg(
            Arg::new("plan")
                .long("plan")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Tutorial plan TOML file (defaults to the built-in tutorial)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file used instead of the layered lookup"),
        )
        .subcommand(
            Command::new("run")
                .about("Reset, record the environment, run every part (default)")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the summary as JSON"),
                ),
        )
        .subcommand(Command::new("list").about("Print the parts and cells of the plan"))
        .subcommand(
            Command::new("reset")
                .about("Restore the clean starting state")
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Also remove captured outputs and snapshots"),
                ),
        )
        .subcommand(Command::new("env").about("Record the environment only"))
}

/// Initialize logging with RUST_LOG environment variable support
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn build_pipeline(matches: &ArgMatches) -> Result<Pipeline> {
    let root = match matches.get_one::<PathBuf>("root") {
        Some(root) => root.clone(),
        None => Workspace::discover(None)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))),
    };

    let pipeline = Pipeline::load(
        root,
        matches.get_one::<PathBuf>("config").map(PathBuf::as_path),
        matches.get_one::<PathBuf>("plan").map(PathBuf::as_path),
    )
    .context("loading configuration and tutorial plan")?;

    tracing::info!("Workspace {:?}", pipeline.workspace().root_path);
    Ok(pipeline)
}

/// Returns false when the run was interrupted
async fn run(pipeline: &Pipeline, json: bool) -> Result<bool> {
    let report = tokio::select! {
        res = pipeline.run() => res?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted; partial outputs are left in place");
            return Ok(false);
        }
    };

    let summary = report.summary();
    if json {
        println!("{}", summary.to_json()?);
    } else {
        println!("{}", summary.render());
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let matches = cli().get_matches();
    let pipeline = build_pipeline(&matches)?;

    match matches.subcommand() {
        Some(("list", _)) => print!("{}", pipeline.plan().outline()),
        Some(("reset", args)) => {
            let report = pipeline.reset(args.get_flag("all"))?;
            println!(
                "Removed {} paths, wrote {}",
                report.removed.len(),
                report.manifest.display()
            );
        }
        Some(("env", _)) => {
            let record = pipeline.record_environment().await?;
            print!("{}", record.render());
        }
        Some(("run", args)) => {
            if !run(&pipeline, args.get_flag("json")).await? {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        }
        _ => {
            if !run(&pipeline, false).await? {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        }
    }

    Ok(())
}
