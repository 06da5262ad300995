#![forbid(unsafe_code)]

//! End-to-end session scenarios: frames in, requests out, replies back.
//!
//! Run:
//!   cargo test -p touchlang-runtime --test session_scenarios

use touchlang_core::{Contact, Context, TouchFrame, TouchPhase};
use touchlang_runtime::error::ServiceError;
use touchlang_runtime::response::{ResponseReply, ResponseRequest};
use touchlang_runtime::{
    FileStore, InteractionState, LocalResponder, MemoryStore, Message, RecordingHaptics,
    ResponseCompletion, ResponseService, ResponseWorker, Session, SessionConfig,
};
use web_time::{Duration, Instant};

// ============================================================================
// Helpers
// ============================================================================

fn at(t0: Instant, ms: u64) -> Instant {
    t0 + Duration::from_millis(ms)
}

fn one(phase: TouchPhase, x: f64, y: f64, t: Instant) -> TouchFrame {
    TouchFrame::new(phase, vec![Contact::new(0, x, y)], t)
}

fn two(phase: TouchPhase, x: f64, y: f64, t: Instant) -> TouchFrame {
    TouchFrame::new(
        phase,
        vec![Contact::new(0, x, y), Contact::new(1, x + 40.0, y)],
        t,
    )
}

fn recording_session() -> (Session, RecordingHaptics) {
    let haptics = RecordingHaptics::new();
    let session = Session::new(
        SessionConfig::default(),
        Box::new(haptics.clone()),
        Box::new(MemoryStore::new()),
    );
    (session, haptics)
}

/// Feed `frames`, resolving every request inline against `service`.
fn drive(session: &mut Session, service: &dyn ResponseService, frames: &[TouchFrame]) {
    for frame in frames {
        if let Some(req) = session.tick(frame.at) {
            session.complete_response(ResponseCompletion::resolve(service, &req), frame.at);
        }
        if let Some(req) = session.handle_frame(frame) {
            session.complete_response(ResponseCompletion::resolve(service, &req), frame.at);
        }
    }
}

struct Rejecting;

impl ResponseService for Rejecting {
    fn resolve(&self, _request: &ResponseRequest) -> Result<ResponseReply, ServiceError> {
        Err(ServiceError::rejected("quota exceeded"))
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn stationary_tap_means_acknowledge() {
    let (mut s, _) = recording_session();
    let t0 = Instant::now();
    s.handle_frame(&one(TouchPhase::Start, 100.0, 100.0, t0));
    let req = s
        .handle_frame(&one(TouchPhase::End, 100.0, 100.0, at(t0, 150)))
        .expect("tap recognized");
    assert_eq!(req.classification.kind.to_string(), "tap-medium");
    assert_eq!(req.intent, "Yes / Acknowledge");
}

#[test]
fn swipe_right_intent_depends_on_context() {
    let (mut s, _) = recording_session();
    let t0 = Instant::now();

    s.handle_frame(&one(TouchPhase::Start, 100.0, 100.0, t0));
    let req = s
        .handle_frame(&one(TouchPhase::End, 200.0, 100.0, at(t0, 70)))
        .unwrap();
    assert_eq!(req.classification.kind.to_string(), "swipe-right-medium");
    assert_eq!(req.intent, "Next / Continue");

    s.switch_context(Context::Writing);
    s.handle_frame(&one(TouchPhase::Start, 100.0, 100.0, at(t0, 1000)));
    let req = s
        .handle_frame(&one(TouchPhase::End, 200.0, 100.0, at(t0, 1070)))
        .unwrap();
    assert_eq!(req.intent, "Suggest next sentence");
}

#[test]
fn boundary_velocity_swipe_is_slow() {
    let (mut s, _) = recording_session();
    let t0 = Instant::now();
    s.handle_frame(&one(TouchPhase::Start, 100.0, 100.0, t0));
    let req = s
        .handle_frame(&one(TouchPhase::End, 200.0, 100.0, at(t0, 100)))
        .unwrap();
    assert_eq!(req.classification.kind.to_string(), "swipe-right-slow");
    assert_eq!(req.intent, "Gesture recognized");
}

#[test]
fn rejected_service_leaves_history_untouched() {
    let (mut s, haptics) = recording_session();
    let t0 = Instant::now();
    drive(
        &mut s,
        &Rejecting,
        &[
            one(TouchPhase::Start, 100.0, 100.0, t0),
            one(TouchPhase::End, 100.0, 100.0, at(t0, 80)),
        ],
    );
    let ai: Vec<&Message> = s
        .messages()
        .iter()
        .filter(|m| matches!(m, Message::Ai { .. }))
        .collect();
    assert_eq!(ai.len(), 1);
    assert_eq!(ai[0].text(), "I couldn't process that right now. Try again!");
    assert!(s.conversation().is_empty());
    assert_eq!(haptics.last(), Some(vec![50, 30, 50, 30, 50]));
    assert_eq!(s.state(), InteractionState::Ready);
}

#[test]
fn conversation_grows_on_success() {
    let (mut s, _) = recording_session();
    let t0 = Instant::now();
    let responder = LocalResponder::new();
    drive(
        &mut s,
        &responder,
        &[
            one(TouchPhase::Start, 100.0, 100.0, t0),
            one(TouchPhase::End, 100.0, 100.0, at(t0, 80)),
            one(TouchPhase::Start, 100.0, 300.0, at(t0, 1000)),
            one(TouchPhase::Move, 100.0, 250.0, at(t0, 1010)),
            one(TouchPhase::End, 100.0, 200.0, at(t0, 1020)),
        ],
    );
    assert_eq!(s.conversation().len(), 4);
    let last = s.messages().last().unwrap();
    assert!(matches!(last, Message::Ai { .. }));
    // swipe-up-fast has no canned reply anywhere.
    assert_eq!(
        last.text(),
        "Gesture \"swipe-up-fast\" detected in general mode"
    );
}

#[test]
fn second_request_carries_prior_conversation() {
    let (mut s, _) = recording_session();
    let t0 = Instant::now();
    let responder = LocalResponder::new();
    drive(
        &mut s,
        &responder,
        &[
            one(TouchPhase::Start, 100.0, 100.0, t0),
            one(TouchPhase::End, 100.0, 100.0, at(t0, 80)),
        ],
    );
    s.handle_frame(&one(TouchPhase::Start, 100.0, 100.0, at(t0, 2000)));
    let req = s
        .handle_frame(&one(TouchPhase::End, 100.0, 100.0, at(t0, 2080)))
        .unwrap();
    assert_eq!(req.history.len(), 2);
    assert!(req.history[0].content.contains("tapped once"));
}

#[test]
fn double_tap_then_fresh_tap() {
    let (mut s, _) = recording_session();
    let t0 = Instant::now();
    let kinds: Vec<String> = [0u64, 150, 300]
        .iter()
        .filter_map(|&start| {
            s.handle_frame(&one(TouchPhase::Start, 50.0, 50.0, at(t0, start)));
            s.handle_frame(&one(TouchPhase::End, 50.0, 50.0, at(t0, start + 40)))
        })
        .map(|req| req.classification.kind.to_string())
        .collect();
    assert_eq!(kinds, vec!["tap-medium", "double-tap-medium", "tap-medium"]);
}

#[test]
fn two_finger_swipe_up_is_help() {
    let (mut s, _) = recording_session();
    let t0 = Instant::now();
    s.handle_frame(&two(TouchPhase::Start, 100.0, 300.0, t0));
    s.handle_frame(&two(TouchPhase::Move, 100.0, 250.0, at(t0, 100)));
    let req = s
        .handle_frame(&two(TouchPhase::End, 100.0, 200.0, at(t0, 200)))
        .unwrap();
    assert_eq!(req.classification.kind.to_string(), "2f-swipe-up");
    assert_eq!(req.intent, "Help");
}

#[test]
fn circle_gesture_in_brainstorming() {
    let (mut s, haptics) = recording_session();
    s.switch_context(Context::Brainstorming);
    let t0 = Instant::now();
    let mut frames = vec![one(TouchPhase::Start, 160.0, 100.0, t0)];
    for i in 1..=16u32 {
        let theta = std::f64::consts::TAU * f64::from(i) / 16.0;
        let phase = if i == 16 { TouchPhase::End } else { TouchPhase::Move };
        frames.push(one(
            phase,
            100.0 + 60.0 * theta.cos(),
            100.0 + 60.0 * theta.sin(),
            at(t0, u64::from(i) * 30),
        ));
    }
    drive(&mut s, &LocalResponder::new(), &frames);
    let record = s.last_gesture().expect("circle recognized");
    assert_eq!(record.classification.kind.to_string(), "circle-clockwise");
    assert_eq!(record.label, "Generate variations");
    // Excited reply haptic.
    assert_eq!(haptics.last(), Some(vec![30, 20, 30, 20, 30, 20, 60]));
}

#[test]
fn worker_round_trip_and_clear_race() {
    let (mut s, _) = recording_session();
    let worker = ResponseWorker::spawn(LocalResponder::new());
    let t0 = Instant::now();

    s.handle_frame(&one(TouchPhase::Start, 100.0, 100.0, t0));
    let req = s
        .handle_frame(&one(TouchPhase::End, 100.0, 100.0, at(t0, 50)))
        .unwrap();
    worker.submit(req).unwrap();
    let done = worker.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(s.complete_response(done, at(t0, 100)));
    assert_eq!(s.state(), InteractionState::Confirming);

    // A request in flight when the conversation is cleared is discarded.
    s.handle_frame(&one(TouchPhase::Start, 100.0, 100.0, at(t0, 1000)));
    let req = s
        .handle_frame(&one(TouchPhase::End, 100.0, 100.0, at(t0, 1050)))
        .unwrap();
    worker.submit(req).unwrap();
    s.clear_conversation();
    let done = worker.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(!s.complete_response(done, at(t0, 1100)));
    assert!(s.messages().is_empty());
    assert!(s.conversation().is_empty());
    assert_eq!(s.pending_tickets().count(), 0);
    assert!(worker.shutdown().is_empty());
}

#[test]
fn history_persists_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    let t0 = Instant::now();
    {
        let mut s = Session::new(
            SessionConfig::default(),
            Box::new(RecordingHaptics::new()),
            Box::new(FileStore::new(&path)),
        );
        for i in 0..3u64 {
            let start = at(t0, i * 1000);
            s.handle_frame(&one(TouchPhase::Start, 0.0, 0.0, start));
            s.handle_frame(&one(TouchPhase::End, 0.0, 0.0, start + Duration::from_millis(40)));
        }
    }
    let s = Session::new(
        SessionConfig::default(),
        Box::new(RecordingHaptics::new()),
        Box::new(FileStore::new(&path)),
    );
    assert_eq!(s.preferences().gesture_history.len(), 3);
    assert_eq!(s.preferences().gesture_style.as_str(), "tap-heavy");
}

fn fingers(phase: TouchPhase, n: u32, t: Instant) -> TouchFrame {
    let contacts = (0..n)
        .map(|id| Contact::new(id, 100.0 + 30.0 * f64::from(id), 100.0))
        .collect();
    TouchFrame::new(phase, contacts, t)
}

#[test]
fn multi_finger_hold_fires_long_press_from_timer() {
    let mut s = Session::with_defaults();
    let t0 = Instant::now();
    assert!(s.handle_frame(&fingers(TouchPhase::Start, 3, t0)).is_none());
    assert!(s.tick(at(t0, 500)).is_none());

    let req = s.tick(at(t0, 800)).expect("long press fires at threshold");
    assert_eq!(req.classification.kind.to_string(), "long-press-medium");
    assert_eq!(req.classification.fingers, 3);

    // The lift after a fired long press classifies nothing.
    assert!(s.handle_frame(&fingers(TouchPhase::End, 3, at(t0, 1200))).is_none());
    assert_eq!(s.intents().len(), 1);
}

#[test]
fn multi_finger_hold_classifies_long_press_at_lift() {
    let mut s = Session::with_defaults();
    let t0 = Instant::now();
    assert!(s.handle_frame(&fingers(TouchPhase::Start, 2, t0)).is_none());
    let req = s
        .handle_frame(&fingers(TouchPhase::End, 2, at(t0, 900)))
        .expect("held touch is classified at lift");
    assert_eq!(req.classification.kind.to_string(), "long-press-medium");
    assert_eq!(req.classification.fingers, 2);
}
