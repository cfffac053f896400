//! Sampling loop
//!
//! Runs a session on the current task: one classification per sampling tick,
//! host events (visibility, interaction) interleaved between ticks, timers
//! polled on every tick. Nothing runs concurrently with the monitor.

use crate::display::FocusDisplay;
use crate::monitor::{FocusMonitor, SessionSummary, INIT_FAILURE};
use crate::MonitorError;
use alerting::AudioSink;
use classification_feed::{ClassificationFeed, FeedError, ScriptedFrame};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Demo session bundled with the binary
const DEMO_SCRIPT: &str = include_str!("../demo/session.json");

/// Event delivered by the hosting environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEvent {
    /// Session view hidden (tab switched away)
    Hidden,
    /// Session view visible again
    Visible,
    /// User clicked, touched or pressed a key
    Interaction,
}

/// Session clock in milliseconds, driven by tokio time
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    origin: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Host event scheduled at a session time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedEvent {
    pub at_ms: u64,
    pub event: HostEvent,
}

/// Scripted session: classifier frames plus host events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionScript {
    pub frames: Vec<ScriptedFrame>,
    #[serde(default)]
    pub events: Vec<ScriptedEvent>,
}

impl SessionScript {
    pub fn from_json(json: &str) -> Result<Self, MonitorError> {
        serde_json::from_str(json).map_err(|e| MonitorError::Script(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self, MonitorError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| MonitorError::Script(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Bundled demo session
    pub fn demo() -> Result<Self, MonitorError> {
        Self::from_json(DEMO_SCRIPT)
    }
}

/// Deliver scripted host events on a channel at their scheduled times
pub fn spawn_host_events(clock: SessionClock, mut events: Vec<ScriptedEvent>) -> mpsc::Receiver<HostEvent> {
    let (tx, rx) = mpsc::channel(16);
    events.sort_by_key(|e| e.at_ms);

    tokio::spawn(async move {
        for scripted in events {
            tokio::time::sleep_until(clock.origin + Duration::from_millis(scripted.at_ms)).await;
            debug!("Host event {:?} at {}ms", scripted.event, scripted.at_ms);
            if tx.send(scripted.event).await.is_err() {
                break;
            }
        }
    });

    rx
}

/// Run a monitoring session until the feed is exhausted
pub async fn run_session<F, D, A>(
    monitor: &mut FocusMonitor<D, A>,
    feed: &mut F,
    mut host_events: mpsc::Receiver<HostEvent>,
    clock: SessionClock,
    sample_interval: Duration,
) -> Result<SessionSummary, MonitorError>
where
    F: ClassificationFeed,
    D: FocusDisplay,
    A: AudioSink,
{
    monitor.initialize();

    if let Err(e) = feed.load().await {
        monitor.notify(INIT_FAILURE);
        return Err(MonitorError::Initialization(e.to_string()));
    }
    info!("Feed ready with {} classes", feed.class_count());

    monitor.start(clock.now_ms());

    let mut ticker = tokio::time::interval(sample_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut host_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                monitor.poll_timers(clock.now_ms());
                match feed.classify().await {
                    Ok(classification) => monitor.on_classification(&classification, clock.now_ms()),
                    Err(FeedError::Exhausted) => {
                        info!("Feed exhausted, ending session");
                        break;
                    }
                    Err(e) => debug!("No classification this tick: {}", e),
                }
            }
            event = host_events.recv(), if host_open => match event {
                Some(event) => {
                    // Timers due before the event fire first
                    let now_ms = clock.now_ms();
                    monitor.poll_timers(now_ms);
                    monitor.on_host_event(event, now_ms);
                }
                None => host_open = false,
            },
        }
    }

    monitor.poll_timers(clock.now_ms());
    let summary = monitor.summary();
    info!(
        "Session {} ended: score {}, looking away {}, {} alerts",
        summary.session_id, summary.focus_score, summary.looking_away_count, summary.alerts_fired
    );
    Ok(summary)
}
