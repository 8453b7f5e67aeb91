//! turnwin - Main Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use turnwin_cli::{Session, SessionConfig};
use turnwin_engine::SettingsPatch;

/// Idle wait between snapshot checks in watch mode
const WATCH_POLL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(
    name = "turnwin",
    version,
    about = "Hide the oldest turns of a saved AI chat page",
    long_about = "Loads an HTML snapshot of a ChatGPT, Claude, Grok or AI Studio \
                  conversation, marks every turn past the cap as hidden and prints \
                  statistics as JSON."
)]
struct Cli {
    /// Saved HTML page
    snapshot: PathBuf,

    /// URL the page was saved from; selects the platform
    #[arg(short, long)]
    url: String,

    /// Number of most recent turns to keep visible
    #[arg(short, long)]
    max: Option<i64>,

    /// Turns revealed per "show more"
    #[arg(long)]
    show_more: Option<i64>,

    /// Use the regular hidden marker for empty turns too
    #[arg(long)]
    no_hide_empty: bool,

    /// JSON settings file to read; flag overrides are never written to it
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Include per-message statistics
    #[arg(short, long)]
    detailed: bool,

    /// Press "show more" this many times before reporting
    #[arg(long, value_name = "TIMES")]
    reveal_more: Option<usize>,

    /// Keep running, reloading the snapshot when it changes
    #[arg(short, long, value_name = "SECS")]
    watch: Option<u64>,

    /// Write the annotated page here
    #[arg(short, long)]
    out: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> SettingsPatch {
        SettingsPatch {
            max_messages: self.max,
            show_more_count: self.show_more,
            hide_empty: self.no_hide_empty.then_some(false),
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting turnwin on {}", cli.snapshot.display());

    let mut session = Session::open(SessionConfig {
        snapshot: cli.snapshot.clone(),
        url: cli.url.clone(),
        settings_file: cli.settings.clone(),
        overrides: cli.overrides(),
    })?;

    if let Some(secs) = cli.watch {
        smol::block_on(watch(&mut session, Duration::from_secs(secs)))?;
    }
    if let Some(times) = cli.reveal_more {
        let hidden = session.reveal_more(times);
        tracing::info!("{} still hidden after {} reveals", hidden, times);
    }

    let report = session.report(cli.detailed);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(out) = &cli.out {
        let html = session.render()?;
        std::fs::write(out, html).with_context(|| format!("failed to write {}", out.display()))?;
        tracing::info!("annotated page written to {}", out.display());
    }
    Ok(())
}

/// Drive the optimizer's timers and pick up snapshot edits until `limit`
async fn watch(session: &mut Session, limit: Duration) -> Result<()> {
    let started = Instant::now();
    let mut last_hidden = None;

    while started.elapsed() < limit {
        if session.refresh()? {
            last_hidden = None;
        }
        session.tick();

        let summary = session.report(false).summary;
        if last_hidden != Some(summary.hidden) {
            tracing::info!("{} of {} turns hidden", summary.hidden, summary.total);
            last_hidden = Some(summary.hidden);
        }

        let wake = session
            .next_wake()
            .map(Duration::from_millis)
            .map_or(WATCH_POLL, |d| d.min(WATCH_POLL));
        let remaining = limit.saturating_sub(started.elapsed());
        smol::Timer::after(wake.min(remaining)).await;
    }
    Ok(())
}
