//! Integration tests for the classification → routine → channel pipeline.

use std::time::Duration;

use super::mock_hw::{MockChannel, MockClock, Op, RecordingSink, timeline};

use pilldispenser::actuation::Outcome;
use pilldispenser::app::events::AppEvent;
use pilldispenser::app::service::{Decision, DispenseService, DispenseState};
use pilldispenser::classify::Classification;
use pilldispenser::classify::detection::{Detection, DetectionPolicy};
use pilldispenser::config::{DispenserConfig, Strategy};
use pilldispenser::error::ChannelError;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn text_service() -> DispenseService {
    DispenseService::from_config(&DispenserConfig::preset(Strategy::Text))
}

fn identified(label: &str) -> Classification {
    Classification::Identified(label.to_string())
}

#[test]
fn each_wait_follows_its_own_send() {
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = MockClock::new(&tl);
    let mut sink = RecordingSink::new();
    let mut svc = text_service();

    let decision = svc.handle(&identified("ultrafen"), secs(0), &mut channel, &mut clock, &mut sink);

    assert!(matches!(decision, Decision::Dispatched(_)));
    assert_eq!(
        *tl.borrow(),
        vec![
            Op::Send("MOTOR2:90:1500:CW".into()),
            Op::Sleep(secs(2)),
            Op::Send("MOTOR1:5:1500".into()),
            Op::Sleep(secs(30)),
            Op::Send("MOTOR2:270:1500:CW".into()),
            Op::Sleep(secs(2)),
        ]
    );
}

#[test]
fn label_lookup_ignores_case() {
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = MockClock::new(&tl);
    let mut sink = RecordingSink::new();
    let mut svc = text_service();

    let decision = svc.handle(&identified("Clovix"), secs(0), &mut channel, &mut clock, &mut sink);

    let Decision::Dispatched(report) = decision else {
        panic!("expected dispatch, got {:?}", decision);
    };
    assert_eq!(report.outcome, Outcome::Label("Clovix".into()));
    assert_eq!(channel.delivered.len(), 3);
}

#[test]
fn failed_step_does_not_abort_routine() {
    let tl = timeline();
    let mut channel = MockChannel::new(&tl).failing_on("MOTOR2:90:1500:CW");
    let mut clock = MockClock::new(&tl);
    let mut sink = RecordingSink::new();
    let mut svc = text_service();

    let decision = svc.handle(&identified("naproxan"), secs(0), &mut channel, &mut clock, &mut sink);

    let Decision::Dispatched(report) = decision else {
        panic!("expected dispatch, got {:?}", decision);
    };
    // Third step (selector return to 90) fails, all waits still elapse.
    assert_eq!(report.steps_sent, 2);
    assert_eq!(report.steps_failed, 1);
    assert!(!report.all_delivered());
    assert_eq!(report.finished_at, secs(34));
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::StepFailed { index: 2, error: ChannelError::Refused, .. }
        )),
        1
    );
    assert_eq!(svc.state(), DispenseState::Idle);
}

#[test]
fn failed_routine_still_starts_cooldown() {
    let tl = timeline();
    let mut channel = MockChannel::new(&tl)
        .failing_on("MOTOR2:0:1500:CW")
        .failing_on("MOTOR1:5:1500");
    let mut clock = MockClock::new(&tl);
    let mut sink = RecordingSink::new();
    let mut svc = text_service();

    svc.handle(&identified("rosulip"), secs(0), &mut channel, &mut clock, &mut sink);
    let again = svc.handle(&identified("rosulip"), secs(25), &mut channel, &mut clock, &mut sink);

    assert!(matches!(again, Decision::CoolingDown { .. }));
    assert!(channel.delivered.is_empty());
    assert_eq!(svc.dispatch_count(), 1);
}

#[test]
fn cooldown_applies_across_outcomes() {
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = MockClock::new(&tl);
    let mut sink = RecordingSink::new();
    let mut svc = text_service();

    svc.handle(&identified("rosulip"), secs(0), &mut channel, &mut clock, &mut sink);
    let other = svc.handle(&identified("clovix"), secs(10), &mut channel, &mut clock, &mut sink);

    let Decision::CoolingDown { outcome, remaining } = other else {
        panic!("expected cooldown, got {:?}", other);
    };
    assert_eq!(outcome, Outcome::Label("clovix".into()));
    assert_eq!(remaining, secs(20));
}

#[test]
fn cooldown_boundary_is_exclusive() {
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = MockClock::new(&tl);
    let mut sink = RecordingSink::new();
    let mut svc = text_service();

    svc.handle(&identified("rosulip"), secs(0), &mut channel, &mut clock, &mut sink);
    let at_boundary = svc.handle(&identified("rosulip"), secs(30), &mut channel, &mut clock, &mut sink);
    assert!(matches!(at_boundary, Decision::CoolingDown { .. }));

    let past = secs(30) + Duration::from_millis(1);
    let after = svc.handle(&identified("rosulip"), past, &mut channel, &mut clock, &mut sink);
    assert!(matches!(after, Decision::Dispatched(_)));
    assert_eq!(svc.dispatch_count(), 2);
}

#[test]
fn unknown_label_sends_nothing() {
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = MockClock::new(&tl);
    let mut sink = RecordingSink::new();
    let mut svc = text_service();

    let decision = svc.handle(&identified("aspirin"), secs(0), &mut channel, &mut clock, &mut sink);

    assert_eq!(decision, Decision::Unmapped(Outcome::Label("aspirin".into())));
    assert!(tl.borrow().is_empty());
    // An unmapped outcome does not consume the cooldown.
    assert!(svc.cooldown().is_ready(secs(1)));
}

#[test]
fn fault_detection_outranks_confident_ok() {
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = MockClock::new(&tl);
    let mut sink = RecordingSink::new();
    let mut svc = DispenseService::from_config(&DispenserConfig::preset(Strategy::Detection));

    let classification = DetectionPolicy::default().evaluate(&[
        Detection::new("full_pills_front", 0.97),
        Detection::new("lost_pills_back", 0.56),
    ]);
    assert_eq!(classification, Classification::Fault);

    let decision = svc.handle(&classification, secs(0), &mut channel, &mut clock, &mut sink);
    let Decision::Dispatched(report) = decision else {
        panic!("expected dispatch, got {:?}", decision);
    };
    assert_eq!(report.outcome, Outcome::Fault);
    assert_eq!(report.finished_at, secs(30));
    assert_eq!(
        channel.delivered.first().map(|c| c.as_str()),
        Some("MOTOR2:90:1500:CW")
    );
}

#[test]
fn low_confidence_ok_is_ignored() {
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = MockClock::new(&tl);
    let mut sink = RecordingSink::new();
    let mut svc = DispenseService::from_config(&DispenserConfig::preset(Strategy::Detection));

    let decision = svc.handle(&Classification::Ok(0.42), secs(0), &mut channel, &mut clock, &mut sink);
    assert_eq!(decision, Decision::BelowConfidenceFloor(0.42));

    let decision = svc.handle(&Classification::Ok(0.5), secs(2), &mut channel, &mut clock, &mut sink);
    assert!(matches!(decision, Decision::Dispatched(_)));
    assert_eq!(*tl.borrow(), vec![Op::Send("MOTOR1:5:1500".into()), Op::Sleep(secs(26))]);
}

#[test]
fn dispatch_brackets_steps_with_state_changes() {
    let tl = timeline();
    let mut channel = MockChannel::new(&tl);
    let mut clock = MockClock::new(&tl);
    let mut sink = RecordingSink::new();
    let mut svc = text_service();

    svc.handle(&identified("rosulip"), secs(0), &mut channel, &mut clock, &mut sink);

    let states: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            (DispenseState::Idle, DispenseState::Dispatching),
            (DispenseState::Dispatching, DispenseState::Idle),
        ]
    );
    assert!(matches!(sink.events.last(), Some(AppEvent::StateChanged { .. })));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::StepSent { .. })), 2);
}
