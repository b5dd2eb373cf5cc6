//! Integration tests for the sensing loop driving the dispense service.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use super::mock_hw::{MockChannel, MockFrames, RecordingSink, ScriptedClassifier, timeline};

use pilldispenser::adapters::time::SimClock;
use pilldispenser::app::events::AppEvent;
use pilldispenser::app::ports::Clock;
use pilldispenser::app::service::Decision;
use pilldispenser::classify::Classification;
use pilldispenser::config::{DispenserConfig, Strategy};
use pilldispenser::error::{ClassifyError, SensorError};
use pilldispenser::scheduler::ResamplePolicy;
use pilldispenser::sensing::{Cycle, SensingLoop};

const FRAME: Duration = Duration::from_millis(100);

#[test]
fn frame_failure_pauses_and_skips_classification() {
    let config = DispenserConfig::preset(Strategy::Text);
    let mut sensing = SensingLoop::from_config(&config);
    let mut frames = MockFrames::failing(SensorError::NoFrame);
    let mut classifier = ScriptedClassifier::labels(&[Some("rosulip")]);
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = SimClock::new();
    let mut sink = RecordingSink::new();

    let cycle = sensing.step(&mut frames, &mut classifier, &mut channel, &mut clock, &mut sink);

    assert_eq!(cycle, Cycle::SensorUnavailable(SensorError::NoFrame));
    assert_eq!(clock.sleeps(), &[Duration::from_secs(1)]);
    assert_eq!(classifier.calls, 0);
    assert_eq!(sensing.sample_attempts(), 0);
}

#[test]
fn samples_only_when_interval_elapsed() {
    let config = DispenserConfig::preset(Strategy::Text);
    let mut sensing = SensingLoop::from_config(&config);
    let mut frames = MockFrames::new();
    let mut classifier = ScriptedClassifier::new(Vec::new());
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = SimClock::new();
    let mut sink = RecordingSink::new();

    let mut sampled_at = Vec::new();
    for _ in 0..120 {
        let t = clock.now();
        if let Cycle::Sampled(_) =
            sensing.step(&mut frames, &mut classifier, &mut channel, &mut clock, &mut sink)
        {
            sampled_at.push(t);
        }
        clock.sleep(FRAME);
    }

    // 120 frames at 100 ms span 0.0..=11.9 s.
    assert_eq!(
        sampled_at,
        vec![Duration::ZERO, Duration::from_secs(5), Duration::from_secs(10)]
    );
    assert_eq!(classifier.calls, 3);
    assert_eq!(frames.acquired(), 120);
}

#[test]
fn classifier_error_counts_as_no_signal() {
    let config = DispenserConfig::preset(Strategy::Text);
    let mut sensing = SensingLoop::from_config(&config);
    let mut frames = MockFrames::new();
    let mut classifier = ScriptedClassifier::new(vec![Err(ClassifyError::Spawn(
        std::io::ErrorKind::NotFound,
    ))]);
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = SimClock::new();
    let mut sink = RecordingSink::new();

    let cycle = sensing.step(&mut frames, &mut classifier, &mut channel, &mut clock, &mut sink);

    assert_eq!(cycle, Cycle::Sampled(Decision::NoSignal));
    assert_eq!(
        sink.events,
        vec![AppEvent::Classified(Classification::None)]
    );
}

#[test]
fn frames_are_not_acquired_during_a_routine() {
    let config = DispenserConfig::preset(Strategy::Text);
    let mut sensing = SensingLoop::from_config(&config);
    let mut frames = MockFrames::new();
    let mut classifier = ScriptedClassifier::labels(&[Some("rosulip")]);
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = SimClock::new();
    let mut sink = RecordingSink::new();

    let cycle = sensing.step(&mut frames, &mut classifier, &mut channel, &mut clock, &mut sink);

    assert!(matches!(cycle, Cycle::Sampled(Decision::Dispatched(_))));
    assert_eq!(frames.acquired(), 1);
    assert_eq!(clock.now(), Duration::from_secs(22));
}

#[test]
fn immediate_resample_after_dispatch() {
    let config = DispenserConfig::preset(Strategy::Text);
    let first_resample = resample_time(config);
    // Anchor stays at t=0, so the first frame after the 22 s routine samples.
    assert_eq!(first_resample, Duration::from_millis(22_100));
}

#[test]
fn deferred_resample_waits_a_full_interval() {
    let mut config = DispenserConfig::preset(Strategy::Text);
    config.resample_after_dispatch = ResamplePolicy::AfterInterval;
    let first_resample = resample_time(config);
    assert_eq!(first_resample, Duration::from_millis(27_000));
}

/// Dispatch rosulip on the first sample, then report when the next
/// sample is taken.
fn resample_time(config: DispenserConfig) -> Duration {
    let mut sensing = SensingLoop::from_config(&config);
    let mut frames = MockFrames::new();
    let mut classifier = ScriptedClassifier::labels(&[Some("rosulip")]);
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = SimClock::new();
    let mut sink = RecordingSink::new();

    let first = sensing.step(&mut frames, &mut classifier, &mut channel, &mut clock, &mut sink);
    assert!(matches!(first, Cycle::Sampled(Decision::Dispatched(_))));

    for _ in 0..200 {
        clock.sleep(FRAME);
        let t = clock.now();
        if let Cycle::Sampled(_) =
            sensing.step(&mut frames, &mut classifier, &mut channel, &mut clock, &mut sink)
        {
            return t;
        }
    }
    panic!("no second sample within 200 frames");
}

#[test]
fn run_stops_on_flag_and_releases_frames() {
    let config = DispenserConfig::preset(Strategy::Text);
    let stop = Arc::new(AtomicBool::new(false));
    let mut sensing = SensingLoop::from_config(&config);
    let mut frames = MockFrames::new().stop_after(3, &stop);
    let mut classifier = ScriptedClassifier::labels(&[Some("rosulip")]);
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = SimClock::new();
    let mut sink = RecordingSink::new();

    sensing.start(&mut sink);
    sensing.run(
        &mut frames,
        &mut classifier,
        &mut channel,
        &mut clock,
        &mut sink,
        &stop,
    );

    assert!(frames.released);
    assert_eq!(sensing.iterations(), 3);
    assert_eq!(sensing.service().dispatch_count(), 1);
    assert_eq!(channel.delivered.len(), 2);
    assert!(matches!(sink.events.first(), Some(AppEvent::Started { .. })));
}

#[test]
fn run_with_stop_already_set_does_nothing() {
    let config = DispenserConfig::preset(Strategy::Detection);
    let stop = AtomicBool::new(true);
    let mut sensing = SensingLoop::from_config(&config);
    let mut frames = MockFrames::new();
    let mut classifier = ScriptedClassifier::new(vec![Ok(Classification::Fault)]);
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = SimClock::new();
    let mut sink = RecordingSink::new();

    sensing.run(
        &mut frames,
        &mut classifier,
        &mut channel,
        &mut clock,
        &mut sink,
        &stop,
    );

    assert!(frames.released);
    assert_eq!(frames.acquired(), 0);
    assert!(tl.borrow().is_empty());
}
