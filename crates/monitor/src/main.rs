//! Focus Monitor - Main Entry Point

use alerting::{AudioSink, NullAudio, TerminalBell};
use anyhow::Context;
use classification_feed::ScriptedFeed;
use monitor::{
    init_logging, run_session, spawn_host_events, AudioMode, FocusMonitor, LogDisplay,
    MonitorConfig, SessionClock, SessionScript, SessionSummary,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

async fn run<A: AudioSink>(
    config: &MonitorConfig,
    script: SessionScript,
    sink: A,
) -> anyhow::Result<SessionSummary> {
    let clock = SessionClock::start();
    let mut feed = ScriptedFeed::new(script.frames)?;
    let host_events = spawn_host_events(clock, script.events);
    let mut monitor = FocusMonitor::new(config, LogDisplay::new(), sink, clock.now_ms())?;

    let summary = run_session(
        &mut monitor,
        &mut feed,
        host_events,
        clock,
        Duration::from_millis(config.feed.sample_interval_ms.max(1)),
    )
    .await?;
    Ok(summary)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os("FOCUS_CONFIG").map(PathBuf::from);
    let config = MonitorConfig::load(config_path.as_deref()).context("loading configuration")?;
    init_logging(&config.log)?;

    info!("=== Focus Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let script_path = std::env::var_os("FOCUS_SCRIPT")
        .map(PathBuf::from)
        .or_else(|| config.feed.script_path.clone());
    let script = match script_path {
        Some(path) => {
            info!("Replaying session script {}", path.display());
            SessionScript::from_path(&path)?
        }
        None => {
            info!("No session script given, replaying the bundled demo");
            SessionScript::demo()?
        }
    };

    let summary = match config.feed.audio {
        AudioMode::Bell => run(&config, script, TerminalBell).await?,
        AudioMode::Silent => run(&config, script, NullAudio).await?,
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
