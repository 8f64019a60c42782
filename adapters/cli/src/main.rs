#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a dot merge round with a built-in bot.

mod autoplay;
mod config;
mod report;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use dot_merge_core::{Event, SessionState};
use dot_merge_session::{GameSession, ReleaseOutcome};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::report::Reporter;

/// Plays one timed dot merge round and prints what happened.
#[derive(Debug, Parser)]
#[command(name = "dot-merge", version, about)]
struct CliArgs {
    /// TOML file holding session parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: config::Overrides,

    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,

    /// Frames to simulate before giving up.
    #[arg(long, default_value_t = 10_000)]
    max_frames: u64,

    /// Print events and the summary as JSON lines.
    #[arg(long)]
    json: bool,

    /// Log engine diagnostics to stderr.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the dot merge command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let config = config::load(args.config.as_deref(), &args.overrides)?;
    let mut session =
        GameSession::configure(config).context("failed to configure session")?;
    let reporter = Reporter::new(args.json);
    let frame = Duration::from_millis(args.frame_ms);

    let mut events = Vec::new();
    session.start_round(&mut events);
    reporter.events(0, &events)?;

    let mut frames = 0;
    while frames < args.max_frames && !is_settled(&session) {
        frames += 1;
        events.clear();
        play_turn(&mut session, &mut events);
        session.tick(frame, &mut events);
        reporter.events(frames, &events)?;
    }

    info!(frames, score = session.score(), "simulation finished");
    reporter.summary(&session, frames)
}

fn is_settled(session: &GameSession) -> bool {
    session.state() == SessionState::Ended && !session.resolution_pending()
}

/// Lets the bot trace its best chain, or reshuffles a grid without one.
fn play_turn(session: &mut GameSession, events: &mut Vec<Event>) {
    if !session.state().is_active() || session.resolution_pending() {
        return;
    }

    match autoplay::longest_path(session.grid().view(), autoplay::MAX_PATH_LENGTH) {
        Some(path) => match autoplay::play_path(session, &path, events) {
            ReleaseOutcome::Resolved(resolution) => debug!(
                length = resolution.path_length,
                points = resolution.points,
                "bot scored"
            ),
            outcome => debug!(?outcome, "bot move had no effect"),
        },
        None => {
            info!("no chain left, rebuilding grid");
            session.rebuild_grid(events);
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
