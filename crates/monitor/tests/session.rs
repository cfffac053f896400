use alerting::{AlertSeverity, AudioError, AudioSink, NullAudio, ShownAlert};
use classification_feed::{Classification, ScriptedFeed, ScriptedFrame};
use monitor::{
    run_session, spawn_host_events, DisplayError, FocusDisplay, FocusMonitor, HostEvent,
    MonitorConfig, MonitorError, ScriptedEvent, SessionClock,
};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
enum Update {
    Score(u8),
    LookingAway(u32),
    Leaning(String),
    Streak(u64),
    Alert(String, AlertSeverity),
    HideAlert,
    Gesture(bool),
    Calibration(bool),
    Classes(String),
    Notice(String),
}

/// Display recording every update; `broken_score` simulates a missing element
#[derive(Debug, Default)]
struct RecordingDisplay {
    updates: Vec<Update>,
    broken_score: bool,
}

impl RecordingDisplay {
    fn alerts(&self) -> Vec<&str> {
        self.updates
            .iter()
            .filter_map(|u| match u {
                Update::Alert(message, _) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, f: impl Fn(&Update) -> bool) -> usize {
        self.updates.iter().filter(|u| f(u)).count()
    }
}

impl FocusDisplay for RecordingDisplay {
    fn show_score(&mut self, score: u8) -> Result<(), DisplayError> {
        if self.broken_score {
            return Err(DisplayError::MissingTarget("focusScore"));
        }
        self.updates.push(Update::Score(score));
        Ok(())
    }

    fn show_looking_away(&mut self, count: u32) -> Result<(), DisplayError> {
        self.updates.push(Update::LookingAway(count));
        Ok(())
    }

    fn show_leaning(&mut self, duration: &str) -> Result<(), DisplayError> {
        self.updates.push(Update::Leaning(duration.to_string()));
        Ok(())
    }

    fn show_streak(&mut self, minutes: u64) -> Result<(), DisplayError> {
        self.updates.push(Update::Streak(minutes));
        Ok(())
    }

    fn show_alert(&mut self, alert: &ShownAlert) -> Result<(), DisplayError> {
        self.updates
            .push(Update::Alert(alert.message.clone(), alert.severity));
        Ok(())
    }

    fn hide_alert(&mut self) -> Result<(), DisplayError> {
        self.updates.push(Update::HideAlert);
        Ok(())
    }

    fn show_gesture(&mut self, visible: bool) -> Result<(), DisplayError> {
        self.updates.push(Update::Gesture(visible));
        Ok(())
    }

    fn show_calibration(&mut self, visible: bool) -> Result<(), DisplayError> {
        self.updates.push(Update::Calibration(visible));
        Ok(())
    }

    fn show_classes(
        &mut self,
        classification: &Classification,
        top_index: usize,
    ) -> Result<(), DisplayError> {
        self.updates
            .push(Update::Classes(classification.classes()[top_index].label.clone()));
        Ok(())
    }

    fn notice(&mut self, message: &str) -> Result<(), DisplayError> {
        self.updates.push(Update::Notice(message.to_string()));
        Ok(())
    }
}

/// Sink whose unlock always fails
struct BlockedAudio;

impl AudioSink for BlockedAudio {
    fn prime(&mut self) -> Result<(), AudioError> {
        Err(AudioError::Blocked("autoplay".to_string()))
    }

    fn reload(&mut self) -> Result<(), AudioError> {
        Err(AudioError::Unavailable)
    }

    fn play(&mut self) -> Result<(), AudioError> {
        Err(AudioError::Blocked("autoplay".to_string()))
    }

    fn pause(&mut self) {}
}

const LABELS: [&str; 7] = [
    "Focused",
    "Leaning",
    "Leaning on Hand",
    "Looking Down",
    "Looking Away",
    "Raise Hand",
    "Default",
];

fn pairs(top: &str, p: f32) -> Vec<(String, f32)> {
    let rest = (1.0 - p) / (LABELS.len() - 1) as f32;
    LABELS
        .iter()
        .map(|l| (l.to_string(), if *l == top { p } else { rest }))
        .collect()
}

fn frame(top: &str, p: f32) -> Classification {
    Classification::new(pairs(top, p)).unwrap()
}

fn started(display: RecordingDisplay) -> FocusMonitor<RecordingDisplay, NullAudio> {
    let mut monitor = FocusMonitor::new(&MonitorConfig::default(), display, NullAudio, 0).unwrap();
    assert!(monitor.initialize());
    assert!(monitor.start(0));
    monitor
}

/// Tick every 16 ms from `from` to `to` (exclusive), polling timers like the runner
fn run(
    monitor: &mut FocusMonitor<RecordingDisplay, NullAudio>,
    c: &Classification,
    from: u64,
    to: u64,
) {
    let mut t = from;
    while t < to {
        monitor.poll_timers(t);
        monitor.on_classification(c, t);
        t += 16;
    }
}

#[test]
fn calibration_suppresses_alerts_and_scoring() {
    let mut monitor = started(RecordingDisplay::default());
    let down = frame("Looking Down", 0.95);

    run(&mut monitor, &down, 0, 10_000);
    assert!(monitor.display().alerts().is_empty());
    assert_eq!(monitor.display().count(|u| matches!(u, Update::Score(_))), 0);
    // Probabilities are still shown
    assert!(monitor.display().count(|u| matches!(u, Update::Classes(_))) > 600);
    assert_eq!(monitor.state().session_start_ms, None);

    run(&mut monitor, &down, 10_000, 10_016);
    assert_eq!(monitor.state().session_start_ms, Some(10_000));
    assert_eq!(monitor.display().alerts(), vec!["Keep your head up and stay focused!"]);
    assert!(monitor
        .display()
        .updates
        .contains(&Update::Calibration(false)));
}

#[test]
fn classification_before_start_is_ignored() {
    let mut monitor =
        FocusMonitor::new(&MonitorConfig::default(), RecordingDisplay::default(), NullAudio, 0).unwrap();
    monitor.on_classification(&frame("Looking Down", 0.95), 100);
    assert!(monitor.display().updates.is_empty());
}

#[test]
fn alert_hides_after_three_seconds() {
    let mut monitor = started(RecordingDisplay::default());
    monitor.poll_timers(10_000);
    monitor.on_classification(&frame("Looking Down", 0.95), 10_000);
    assert!(monitor.is_alert_showing());

    monitor.poll_timers(12_999);
    assert!(monitor.is_alert_showing());
    monitor.poll_timers(13_000);
    assert!(!monitor.is_alert_showing());
    assert_eq!(monitor.display().updates.last(), Some(&Update::HideAlert));
}

#[test]
fn newer_alert_is_not_hidden_by_older_timer() {
    let mut monitor = started(RecordingDisplay::default());
    monitor.poll_timers(10_000);
    monitor.on_classification(&frame("Looking Down", 0.95), 10_000);

    monitor.poll_timers(12_000);
    monitor.on_classification(&frame("Leaning on Hand", 0.9), 12_000);
    assert_eq!(monitor.display().alerts().len(), 2);

    // First alert's timer was cancelled
    monitor.poll_timers(13_000);
    assert!(monitor.is_alert_showing());

    monitor.poll_timers(15_000);
    assert!(!monitor.is_alert_showing());
    assert_eq!(monitor.display().count(|u| *u == Update::HideAlert), 1);
}

#[test]
fn away_penalty_is_rendered() {
    let mut monitor = started(RecordingDisplay::default());
    monitor.poll_timers(10_000);

    monitor.on_visibility_change(false, 20_000);
    monitor.on_visibility_change(true, 65_000);

    let state = monitor.state();
    assert_eq!(state.focus_score.get(), 92);
    assert_eq!(state.looking_away_count, 1);

    let updates = &monitor.display().updates;
    assert!(updates.contains(&Update::Score(92)));
    assert!(updates.contains(&Update::LookingAway(1)));
    assert!(updates.contains(&Update::Alert(
        "You were away for 45 seconds. Stay focused!".to_string(),
        AlertSeverity::Warning
    )));
}

#[test]
fn look_aways_escalate_alert_severity() {
    let mut monitor = started(RecordingDisplay::default());
    let away = frame("Looking Away", 0.9);
    monitor.poll_timers(10_000);

    let mut t = 10_000;
    for _ in 0..9 {
        monitor.poll_timers(t);
        monitor.on_classification(&away, t);
        t += 5_001;
    }

    let severities: Vec<AlertSeverity> = monitor
        .display()
        .updates
        .iter()
        .filter_map(|u| match u {
            Update::Alert(_, severity) => Some(*severity),
            _ => None,
        })
        .collect();
    assert_eq!(
        severities,
        vec![AlertSeverity::Warning, AlertSeverity::Critical, AlertSeverity::Critical]
    );
    assert_eq!(monitor.state().alert_level.get(), 3);
    assert_eq!(monitor.summary().alerts_fired, 3);
}

#[test]
fn huge_hide_delay_keeps_alert_shown() {
    let mut config = MonitorConfig::default();
    config.alerts.simple_hide_ms = u64::MAX;
    let mut monitor = FocusMonitor::new(&config, RecordingDisplay::default(), NullAudio, 0).unwrap();
    monitor.start(0);
    monitor.poll_timers(10_000);

    monitor.on_classification(&frame("Looking Down", 0.95), 10_000);
    monitor.poll_timers(1_000_000_000);
    assert!(monitor.is_alert_showing());
}

#[test]
fn streak_refreshes_every_two_seconds() {
    let mut monitor = started(RecordingDisplay::default());
    monitor.poll_timers(10_000);
    monitor.poll_timers(70_000);
    assert_eq!(monitor.state().focus_streak_min, 1);
    assert!(monitor.display().updates.contains(&Update::Streak(1)));
    assert_eq!(monitor.next_deadline(), Some(72_000));
}

#[test]
fn missing_render_target_does_not_stop_tracking() {
    let display = RecordingDisplay {
        broken_score: true,
        ..Default::default()
    };
    let mut monitor = started(display);
    monitor.poll_timers(10_000);
    monitor.on_visibility_change(false, 20_000);
    monitor.on_visibility_change(true, 65_000);

    assert_eq!(monitor.state().focus_score.get(), 92);
    assert_eq!(monitor.display().count(|u| matches!(u, Update::Score(_))), 0);
    assert_eq!(monitor.display().alerts().len(), 1);
}

fn last_gesture(display: &RecordingDisplay) -> Option<bool> {
    display.updates.iter().rev().find_map(|u| match u {
        Update::Gesture(visible) => Some(*visible),
        _ => None,
    })
}

#[test]
fn gesture_indicator_follows_raised_hand() {
    let mut monitor = started(RecordingDisplay::default());
    run(&mut monitor, &frame("Raise Hand", 0.95), 0, 11_100);
    assert_eq!(last_gesture(monitor.display()), Some(true));

    run(&mut monitor, &frame("Focused", 0.95), 11_100, 11_200);
    assert_eq!(last_gesture(monitor.display()), Some(false));
}

#[test]
fn blocked_audio_warns_once_and_alerts_stay_visual() {
    let mut monitor =
        FocusMonitor::new(&MonitorConfig::default(), RecordingDisplay::default(), BlockedAudio, 0).unwrap();
    assert!(!monitor.initialize());
    assert!(matches!(monitor.display().updates[0], Update::Notice(_)));

    assert_eq!(monitor.on_user_interaction(), Some(false));
    assert_eq!(monitor.on_user_interaction(), None);

    monitor.start(0);
    monitor.poll_timers(10_000);
    monitor.on_classification(&frame("Looking Down", 0.95), 10_000);
    assert!(monitor.is_alert_showing());
}

#[tokio::test(start_paused = true)]
async fn scripted_session_runs_to_completion() {
    let clock = SessionClock::start();
    let mut feed = ScriptedFeed::new(vec![
        ScriptedFrame::new(pairs("Focused", 0.9), 700),
        ScriptedFrame::new(pairs("Looking Down", 0.9), 400),
    ])
    .unwrap();
    let (_tx, rx) = mpsc::channel(4);
    let mut monitor =
        FocusMonitor::new(&MonitorConfig::default(), RecordingDisplay::default(), NullAudio, clock.now_ms()).unwrap();

    let summary = run_session(&mut monitor, &mut feed, rx, clock, Duration::from_millis(16))
        .await
        .unwrap();

    assert!(!summary.calibrating);
    assert_eq!(summary.alerts_fired, 1);
    assert!(summary.focus_score < 100);
    assert_eq!(monitor.display().alerts(), vec!["Keep your head up and stay focused!"]);
}

#[tokio::test(start_paused = true)]
async fn host_events_reach_the_monitor() {
    let clock = SessionClock::start();
    let mut feed = ScriptedFeed::new(vec![ScriptedFrame::new(pairs("Focused", 0.9), 4000)]).unwrap();
    let events = spawn_host_events(
        clock,
        vec![
            ScriptedEvent { at_ms: 15_000, event: HostEvent::Hidden },
            ScriptedEvent { at_ms: 50_000, event: HostEvent::Visible },
        ],
    );
    let mut monitor =
        FocusMonitor::new(&MonitorConfig::default(), RecordingDisplay::default(), NullAudio, clock.now_ms()).unwrap();

    let summary = run_session(&mut monitor, &mut feed, events, clock, Duration::from_millis(16))
        .await
        .unwrap();

    // 35 s away: penalty 6, one missed look-away; focused frames may earn some back
    assert_eq!(summary.looking_away_count, 1);
    assert!(monitor
        .display()
        .alerts()
        .contains(&"You were away for 35 seconds. Stay focused!"));
    assert!(summary.focus_score >= 94);
}

#[tokio::test(start_paused = true)]
async fn ticks_without_classification_are_skipped() {
    let clock = SessionClock::start();
    let mut feed = ScriptedFeed::new(vec![
        ScriptedFrame::new(pairs("Focused", 0.9), 700),
        ScriptedFrame::unavailable(200),
        ScriptedFrame::new(pairs("Looking Down", 0.9), 400),
    ])
    .unwrap();
    let (_tx, rx) = mpsc::channel(4);
    let mut monitor =
        FocusMonitor::new(&MonitorConfig::default(), RecordingDisplay::default(), NullAudio, clock.now_ms()).unwrap();

    let summary = run_session(&mut monitor, &mut feed, rx, clock, Duration::from_millis(16))
        .await
        .unwrap();

    // Nothing is rendered or tracked on the 200 empty ticks
    assert_eq!(monitor.display().count(|u| matches!(u, Update::Classes(_))), 1100);
    // Frames after the gap still drive alerts and scoring
    assert_eq!(monitor.display().alerts(), vec!["Keep your head up and stay focused!"]);
    assert_eq!(summary.focus_score, 94);
    assert_eq!(monitor.state().last_label, "looking down");
}

#[tokio::test(start_paused = true)]
async fn calibration_ends_before_host_event_is_handled() {
    let mut config = MonitorConfig::default();
    config.tracker.calibration_ms = 40_000;

    let clock = SessionClock::start();
    let mut feed = ScriptedFeed::new(vec![ScriptedFrame::new(pairs("Focused", 0.9), 200)]).unwrap();
    // Back 100 ms after calibration ends, before the next 300 ms tick
    let events = spawn_host_events(
        clock,
        vec![
            ScriptedEvent { at_ms: 1_000, event: HostEvent::Hidden },
            ScriptedEvent { at_ms: 40_100, event: HostEvent::Visible },
        ],
    );
    let mut monitor =
        FocusMonitor::new(&config, RecordingDisplay::default(), NullAudio, clock.now_ms()).unwrap();

    let summary = run_session(&mut monitor, &mut feed, events, clock, Duration::from_millis(300))
        .await
        .unwrap();

    assert_eq!(summary.looking_away_count, 1);
    assert!(monitor
        .display()
        .alerts()
        .contains(&"You were away for 39 seconds. Stay focused!"));
}

#[tokio::test(start_paused = true)]
async fn feed_failure_is_fatal() {
    let clock = SessionClock::start();
    let mut feed = ScriptedFeed::new(vec![ScriptedFrame::new(pairs("Focused", 0.9), 1)])
        .unwrap()
        .with_load_failure("camera permission denied");
    let (_tx, rx) = mpsc::channel(4);
    let mut monitor =
        FocusMonitor::new(&MonitorConfig::default(), RecordingDisplay::default(), NullAudio, 0).unwrap();

    let result = run_session(&mut monitor, &mut feed, rx, clock, Duration::from_millis(16)).await;
    assert!(matches!(result, Err(MonitorError::Initialization(_))));
    assert!(monitor
        .display()
        .updates
        .iter()
        .any(|u| matches!(u, Update::Notice(m) if m.contains("camera"))));
    assert!(monitor.state().session_start_ms.is_none());
}
