//! Property-based tests for the recording-session state machine.
//!
//! Arbitrary interleavings of button presses, event deliveries, and
//! injected platform faults must never break the session's invariants.

use std::collections::VecDeque;

use proptest::prelude::*;
use tokio::sync::mpsc;

use clipcap::session::{PressIntent, RecordingSession, SessionState};
use clipcap::testing::{drain_events, fake_target, FakeVideoRecorder};
use clipcap::types::{ControlLabel, ControlSurface};

#[derive(Debug, Clone, Copy)]
enum Op {
    /// The single capture affordance was pressed.
    Press,
    /// Deliver the next queued platform event, if any.
    DeliverEvent,
    /// The platform finalizes the in-flight recording with an error.
    InjectFault,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Press),
        3 => Just(Op::DeliverEvent),
        1 => Just(Op::InjectFault),
    ]
}

proptest! {
    /// INVARIANT: the session never holds more than one recording handle,
    /// and its derived state stays coherent, for every press/event/fault
    /// interleaving.
    #[test]
    fn session_invariants_hold_for_all_interleavings(
        ops in proptest::collection::vec(op_strategy(), 1..80),
    ) {
        let recorder = FakeVideoRecorder::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = RecordingSession::new();
        let mut queued: VecDeque<_> = VecDeque::new();
        let mut begins = 0usize;
        let mut finalizes = 0usize;

        for op in ops {
            match op {
                Op::Press => match session.press_intent() {
                    PressIntent::StartNew => {
                        // A new handle may only ever be created with no
                        // handle in flight.
                        prop_assert!(!session.has_active_handle());
                        prop_assert!(!session.in_flight());
                        prop_assert_eq!(session.state(), SessionState::Idle);
                        session
                            .start(&recorder, &fake_target(), true, tx.clone())
                            .expect("start from idle should succeed");
                        begins += 1;
                    }
                    PressIntent::StopActive => {
                        session.stop();
                        // The handle is cleared immediately on stop.
                        prop_assert!(!session.has_active_handle());
                        prop_assert_eq!(session.state(), SessionState::Finalizing);
                    }
                    PressIntent::Ignore => {
                        // Only reachable while finalizing with the handle
                        // already cleared; the press changes nothing.
                        let state = session.state();
                        prop_assert_eq!(state, SessionState::Finalizing);
                    }
                },
                Op::DeliverEvent => {
                    queued.extend(drain_events(&mut rx));
                    if let Some(event) = queued.pop_front() {
                        if let Some(_outcome) = session.handle_event(event) {
                            finalizes += 1;
                            // Every finalize, success or failure, resets
                            // the surface to an enabled start affordance.
                            prop_assert_eq!(session.control_surface(), ControlSurface::ready());
                            prop_assert_eq!(session.state(), SessionState::Idle);
                            prop_assert!(!session.in_flight());
                        }
                    }
                }
                Op::InjectFault => {
                    recorder.abort_current("fault injection");
                }
            }

            // Global coherence after every step.
            if session.has_active_handle() {
                prop_assert!(matches!(
                    session.state(),
                    SessionState::Starting | SessionState::Recording
                ));
                prop_assert!(session.in_flight());
            }
            if session.state() == SessionState::Idle {
                prop_assert!(!session.has_active_handle());
                prop_assert!(!session.in_flight());
            }
            let surface = session.control_surface();
            match session.state() {
                SessionState::Idle => {
                    prop_assert_eq!(surface, ControlSurface::ready());
                }
                SessionState::Starting => {
                    prop_assert_eq!(surface.label, ControlLabel::Start);
                    prop_assert!(!surface.enabled);
                }
                SessionState::Recording => {
                    prop_assert_eq!(surface.label, ControlLabel::Stop);
                    prop_assert!(surface.enabled);
                }
                SessionState::Finalizing => {
                    prop_assert!(!surface.enabled);
                }
            }
        }

        // At most one finalize per begin, never more.
        prop_assert!(finalizes <= begins);
        prop_assert_eq!(recorder.begin_log().len(), begins);
    }

    /// INVARIANT: replaying stale events for finished handles never
    /// disturbs a later recording.
    #[test]
    fn stale_replays_do_not_disturb_later_recordings(extra_replays in 1usize..5) {
        let recorder = FakeVideoRecorder::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = RecordingSession::new();

        // First recording runs to completion, remembering its events.
        session
            .start(&recorder, &fake_target(), false, tx.clone())
            .expect("start");
        let mut first_events = drain_events(&mut rx);
        for event in first_events.clone() {
            session.handle_event(event);
        }
        session.stop();
        first_events.extend(drain_events(&mut rx));
        for event in first_events.clone() {
            session.handle_event(event);
        }
        prop_assert_eq!(session.state(), SessionState::Idle);

        // Second recording begins; replay the first one's events at it.
        session
            .start(&recorder, &fake_target(), false, tx.clone())
            .expect("restart");
        for _ in 0..extra_replays {
            for event in first_events.clone() {
                prop_assert!(session.handle_event(event).is_none());
            }
        }

        prop_assert_eq!(session.state(), SessionState::Starting);
        prop_assert!(session.has_active_handle());
    }
}
