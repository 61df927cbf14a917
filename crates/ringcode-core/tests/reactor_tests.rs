//! End-to-end tests of the call state reactor
//!
//! All tests run on paused tokio time, so notification timing is exact.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ringcode_core::{
    AssignmentRecord, AssignmentRegistry, CallEvent, CallStateReactor, Error, IgnoreReason,
    MemoryRegistry, NotifierConfig, PlayOutcome, ReactorOutcome, RecordingToneDevice, Result,
    RingerMode, SessionState, SharedConfig, SharedRingerMode,
};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};

const CALLER: &str = "+15551234567";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Harness {
    reactor: CallStateReactor,
    device: RecordingToneDevice,
    config: SharedConfig,
    ringer: SharedRingerMode,
}

fn harness(records: Vec<AssignmentRecord>) -> Harness {
    init_tracing();
    let device = RecordingToneDevice::new();
    let config = SharedConfig::new(NotifierConfig {
        enabled: true,
        ..NotifierConfig::default()
    });
    let ringer = SharedRingerMode::new(RingerMode::Silent);

    let reactor = CallStateReactor::builder()
        .with_registry(Arc::new(MemoryRegistry::from_records(records)))
        .with_config(Arc::new(config.clone()))
        .with_ringer(Arc::new(ringer.clone()))
        .with_device(Arc::new(device.clone()))
        .build()
        .expect("reactor");

    Harness {
        reactor,
        device,
        config,
        ringer,
    }
}

fn sos_harness() -> Harness {
    harness(vec![AssignmentRecord::new("5551234567", "SOS")])
}

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[tokio::test(start_paused = true)]
async fn ringing_plays_sos_and_idle_stops_it() {
    let h = sos_harness();

    let outcome = h.reactor.handle_event(CallEvent::ringing(CALLER)).await;
    assert!(matches!(outcome, ReactorOutcome::Started { ref code, .. } if code == "SOS"));

    // settle (2000) + one full SOS (5100), before the repeat pause ends
    sleep(millis(8000)).await;
    let durations: Vec<Duration> = h.device.emissions().iter().map(|e| e.duration).collect();
    let dot = millis(100);
    let dash = millis(300);
    assert_eq!(durations, vec![dot, dot, dot, dash, dash, dash, dot, dot, dot]);

    let before_stop = Instant::now();
    let outcome = h
        .reactor
        .handle_event(CallEvent::new("IDLE", Some(CALLER)))
        .await;
    assert_eq!(outcome, ReactorOutcome::Stopped);
    assert!(before_stop.elapsed() <= millis(100));
    assert_eq!(h.reactor.session_state().await, SessionState::Idle);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(h.device.emission_count(), 9);
}

#[tokio::test(start_paused = true)]
async fn stop_mid_pattern_quiesces_emission() {
    let h = sos_harness();
    h.reactor.handle_event(CallEvent::ringing(CALLER)).await;

    // second dot of the first S is playing at 2350
    sleep(millis(2350)).await;
    assert_eq!(
        h.reactor.handle_event(CallEvent::off_hook()).await,
        ReactorOutcome::Stopped
    );
    assert_eq!(h.device.emission_count(), 2);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(h.device.emission_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn audible_ringer_starts_nothing() {
    let h = sos_harness();
    h.ringer.set(RingerMode::Normal);

    assert_eq!(
        h.reactor.handle_event(CallEvent::ringing(CALLER)).await,
        ReactorOutcome::Ignored(IgnoreReason::RingerAudible)
    );
    sleep(Duration::from_secs(30)).await;
    assert_eq!(h.device.emission_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn vibrate_mode_counts_as_silenced() {
    let h = sos_harness();
    h.ringer.set(RingerMode::Vibrate);

    let outcome = h.reactor.handle_event(CallEvent::ringing(CALLER)).await;
    assert!(matches!(outcome, ReactorOutcome::Started { .. }));
    h.reactor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn unknown_caller_starts_nothing() {
    let h = sos_harness();

    assert_eq!(
        h.reactor.handle_event(CallEvent::ringing("+41791234567")).await,
        ReactorOutcome::Ignored(IgnoreReason::NoAssignment)
    );
    assert_eq!(
        h.reactor.handle_event(CallEvent::ringing("anonymous")).await,
        ReactorOutcome::Ignored(IgnoreReason::NoAssignment)
    );
    assert_eq!(
        h.reactor.handle_event(CallEvent::new("RINGING", None)).await,
        ReactorOutcome::Ignored(IgnoreReason::NoCaller)
    );
    sleep(Duration::from_secs(30)).await;
    assert_eq!(h.device.emission_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn disabled_feature_starts_nothing() {
    let h = sos_harness();
    h.config.update(|c| c.enabled = false);

    assert_eq!(
        h.reactor.handle_event(CallEvent::ringing(CALLER)).await,
        ReactorOutcome::Ignored(IgnoreReason::Disabled)
    );
}

#[tokio::test(start_paused = true)]
async fn inactive_and_unplayable_assignments() {
    let h = harness(vec![
        AssignmentRecord::new("5551234567", "SOS").with_active(false),
        AssignmentRecord::new("5551234567", "@@"),
    ]);

    assert_eq!(
        h.reactor.handle_event(CallEvent::ringing(CALLER)).await,
        ReactorOutcome::Ignored(IgnoreReason::NothingToPlay)
    );
    assert_eq!(h.reactor.session_state().await, SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn non_ringing_events_always_leave_the_session_idle() {
    let h = sos_harness();

    for event in [
        CallEvent::idle(),
        CallEvent::off_hook(),
        CallEvent::new("DISCONNECTING", None),
    ] {
        assert_eq!(
            h.reactor.handle_event(event).await,
            ReactorOutcome::Ignored(IgnoreReason::NotPlaying)
        );
        assert_eq!(h.reactor.session_state().await, SessionState::Idle);
    }

    h.reactor.handle_event(CallEvent::ringing(CALLER)).await;
    assert_ne!(h.reactor.session_state().await, SessionState::Idle);
    assert_eq!(
        h.reactor.handle_event(CallEvent::new("SOMETHING_ELSE", None)).await,
        ReactorOutcome::Stopped
    );
    assert_eq!(h.reactor.session_state().await, SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn second_ringing_replaces_the_stream() {
    let h = harness(vec![
        AssignmentRecord::new("5551234567", "E"),
        AssignmentRecord::new("0791234567", "T"),
    ]);

    let first = h.reactor.handle_event(CallEvent::ringing(CALLER)).await;
    let second = h.reactor.handle_event(CallEvent::ringing("+41791234567")).await;
    match (first, second) {
        (
            ReactorOutcome::Started { session_id: a, .. },
            ReactorOutcome::Started { session_id: b, code },
        ) => {
            assert_ne!(a, b);
            assert_eq!(code, "T");
        }
        other => panic!("unexpected outcomes {other:?}"),
    }

    sleep(millis(2100)).await;
    let emissions = h.device.emissions();
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].duration, millis(300));

    h.reactor.handle_event(CallEvent::idle()).await;
    sleep(Duration::from_secs(30)).await;
    assert_eq!(h.device.emission_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn configuration_is_read_on_every_ringing_event() {
    let h = harness(vec![AssignmentRecord::new("5551234567", "E")]);
    h.config.update(|c| {
        c.volume = 25;
        c.unit_ms = 50;
    });

    h.reactor.handle_event(CallEvent::ringing(CALLER)).await;
    sleep(millis(2010)).await;
    h.reactor.handle_event(CallEvent::idle()).await;

    h.config.update(|c| c.volume = 90);
    h.reactor.handle_event(CallEvent::ringing(CALLER)).await;
    sleep(millis(2010)).await;
    h.reactor.handle_event(CallEvent::idle()).await;

    let emissions = h.device.emissions();
    assert_eq!(emissions.len(), 2);
    assert_eq!(emissions[0].level, 25);
    assert_eq!(emissions[0].duration, millis(50));
    assert_eq!(emissions[1].level, 90);
}

#[tokio::test(start_paused = true)]
async fn failing_device_keeps_the_session_alive() {
    let h = sos_harness();
    h.device.set_failing(true);

    let outcome = h.reactor.handle_event(CallEvent::ringing(CALLER)).await;
    assert!(matches!(outcome, ReactorOutcome::Started { .. }));

    // two full repetitions: 2000 + 5100 + 5000 + 5100
    sleep(millis(17_300)).await;
    assert_eq!(h.device.failed_attempts(), 18);
    assert_eq!(h.device.emission_count(), 0);
    assert_ne!(h.reactor.session_state().await, SessionState::Idle);

    // third repetition starts at 22200
    h.device.set_failing(false);
    sleep(millis(6000)).await;
    assert!(h.device.emission_count() > 0);

    assert_eq!(
        h.reactor.handle_event(CallEvent::idle()).await,
        ReactorOutcome::Stopped
    );
}

struct UnreachableRegistry;

#[async_trait]
impl AssignmentRegistry for UnreachableRegistry {
    async fn active_assignments(&self) -> Result<Vec<AssignmentRecord>> {
        Err(Error::registry("content provider gone"))
    }
}

#[tokio::test(start_paused = true)]
async fn unreachable_registry_is_silent() {
    init_tracing();
    let device = RecordingToneDevice::new();
    let reactor = CallStateReactor::builder()
        .with_registry(Arc::new(UnreachableRegistry))
        .with_config(Arc::new(NotifierConfig {
            enabled: true,
            ..NotifierConfig::default()
        }))
        .with_ringer(Arc::new(RingerMode::Silent))
        .with_device(Arc::new(device.clone()))
        .build()
        .unwrap();

    assert_eq!(
        reactor.handle_event(CallEvent::ringing(CALLER)).await,
        ReactorOutcome::Ignored(IgnoreReason::NoAssignment)
    );
    sleep(Duration::from_secs(30)).await;
    assert_eq!(device.emission_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn run_consumes_events_and_shuts_down() {
    let h = sos_harness();
    let reactor = Arc::new(h.reactor);
    let (tx, rx) = mpsc::channel(16);

    let runner = {
        let reactor = reactor.clone();
        tokio::spawn(async move { reactor.run(rx).await })
    };

    tx.send(CallEvent::ringing(CALLER)).await.unwrap();
    sleep(millis(2500)).await;
    assert!(h.device.emission_count() > 0);

    // closing the event source stops the running notification
    drop(tx);
    runner.await.unwrap();
    assert_eq!(reactor.session_state().await, SessionState::Idle);

    let count = h.device.emission_count();
    sleep(Duration::from_secs(30)).await;
    assert_eq!(h.device.emission_count(), count);
}

#[tokio::test(start_paused = true)]
async fn preview_plays_the_alert_symbol_once() {
    let h = sos_harness();
    h.config.update(|c| c.volume = 10);

    assert_eq!(h.reactor.preview_alert().await, PlayOutcome::Completed);

    let emissions = h.device.emissions();
    assert_eq!(emissions.len(), 5);
    assert!(emissions.iter().all(|e| e.level == 10));
    assert_eq!(emissions[3].duration, millis(300));
    assert_eq!(h.reactor.session_state().await, SessionState::Idle);

    // the finished preview is not reported as a stopped notification
    assert_eq!(
        h.reactor.handle_event(CallEvent::idle()).await,
        ReactorOutcome::Ignored(IgnoreReason::NotPlaying)
    );
}
