mod menu;
mod prompter;
mod session;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use handicap_core::{Config, PlayerName, ScoreParsing, ScoreStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::prompter::LinePrompter;

/// Log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "handicap=warn,handicap_core=warn";

#[derive(Parser)]
#[command(name = "handicap")]
#[command(about = "Golf score tracker with a top-three handicap")]
struct Args {
    #[arg(short, long, default_value = "handicap.toml")]
    config: PathBuf,

    /// Directory for score files (overrides the config file)
    #[arg(short, long, env = "HANDICAP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Player name; prompted for when omitted
    #[arg(short, long)]
    player: Option<String>,

    /// Record non-numeric scores as 0 instead of asking again
    #[arg(long)]
    lenient_scores: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so they never mix with the dialogue on stdout
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if args.lenient_scores {
        config.score_parsing = ScoreParsing::Lenient;
    }
    config.validate()?;

    let store = ScoreStore::from_config(&config);
    info!(
        "Using data directory {} ({} score parsing)",
        store.data_dir().display(),
        config.score_parsing
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut prompter = LinePrompter::new(stdin.lock(), stdout.lock());

    let player = match args.player {
        Some(raw) => PlayerName::new(&raw)?,
        None => match session::ask_player(&mut prompter)? {
            Some(name) => name,
            None => return Ok(()),
        },
    };

    session::run(&mut prompter, &store, &player, config.score_parsing)
}
