//! LightPanel — full-screen light panel, strobe and visual metronome, driven
//! from the terminal.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

mod cli;
mod sound;

/// Cleared by the Ctrl+C handler to stop the run loop.
pub static RUNNING: AtomicBool = AtomicBool::new(true);

#[derive(Parser)]
#[command(
    name = "lightpanel",
    version,
    about = "Full-screen light panel, strobe and visual metronome"
)]
struct Args {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Settings file (default: next to the config file)
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Keep settings changes in memory for this invocation only
    #[arg(long, global = true)]
    no_persist: bool,

    #[command(subcommand)]
    command: cli::Command,
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    ctrlc::set_handler(move || {
        RUNNING.store(false, Ordering::SeqCst);
    })
    .ok();

    let opts = cli::Options {
        json: args.json,
        config_path: args.config,
        settings_path: args.settings,
        persist: !args.no_persist,
    };
    if let Err(e) = cli::run(args.command, &opts) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
