//! Manual valve control policy.
//!
//! Level-triggered, not edge-triggered: while an operator holds the open
//! button the valve is commanded open on every poll, and likewise for
//! close.  Holding both buttons closes the valve — close is evaluated
//! after open within the same poll and overwrites it.  There is no
//! debounce beyond the pull-up wiring; contact bounce re-commands the
//! same state, which is harmless.

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, ValvePort};
use crate::line::LineId;

/// Debounce-free request levels read from one line's buttons,
/// already normalized (asserted = operator pressing).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValveRequest {
    pub open: bool,
    pub close: bool,
}

/// Authoritative state of one line's valve output.
pub struct ValveController {
    line: LineId,
    is_open: bool,
}

impl ValveController {
    /// Valves start closed; `hw_init` drives the output LOW at boot.
    pub fn new(line: LineId) -> Self {
        Self {
            line,
            is_open: false,
        }
    }

    pub fn line(&self) -> LineId {
        self.line
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Evaluate the request levels for one loop iteration.
    ///
    /// Commands the actuator on every iteration a request is asserted;
    /// emits [`AppEvent::ValveChanged`] only when the state actually flips.
    pub fn poll(
        &mut self,
        request: ValveRequest,
        hw: &mut impl ValvePort,
        sink: &mut impl EventSink,
    ) {
        let prev = self.is_open;

        if request.open {
            self.is_open = true;
            hw.set_valve(self.line, true);
        }
        // Close second: wins when both buttons are held.
        if request.close {
            self.is_open = false;
            hw.set_valve(self.line, false);
        }

        if self.is_open != prev {
            sink.emit(&AppEvent::ValveChanged {
                line: self.line,
                open: self.is_open,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingValve {
        commands: Vec<(LineId, bool)>,
    }

    impl RecordingValve {
        fn new() -> Self {
            Self {
                commands: Vec::new(),
            }
        }
    }

    impl ValvePort for RecordingValve {
        fn set_valve(&mut self, line: LineId, open: bool) {
            self.commands.push((line, open));
        }
    }

    struct RecordingSink {
        events: Vec<AppEvent>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self { events: Vec::new() }
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&mut self, event: &AppEvent) {
            self.events.push(event.clone());
        }
    }

    fn rig() -> (ValveController, RecordingValve, RecordingSink) {
        (
            ValveController::new(LineId::Line1),
            RecordingValve::new(),
            RecordingSink::new(),
        )
    }

    #[test]
    fn open_request_opens() {
        let (mut vc, mut hw, mut sink) = rig();
        vc.poll(
            ValveRequest {
                open: true,
                close: false,
            },
            &mut hw,
            &mut sink,
        );
        assert!(vc.is_open());
        assert_eq!(hw.commands, vec![(LineId::Line1, true)]);
    }

    #[test]
    fn close_request_closes() {
        let (mut vc, mut hw, mut sink) = rig();
        vc.poll(
            ValveRequest {
                open: true,
                close: false,
            },
            &mut hw,
            &mut sink,
        );
        vc.poll(
            ValveRequest {
                open: false,
                close: true,
            },
            &mut hw,
            &mut sink,
        );
        assert!(!vc.is_open());
        assert_eq!(hw.commands.last(), Some(&(LineId::Line1, false)));
    }

    #[test]
    fn both_held_close_wins() {
        let (mut vc, mut hw, mut sink) = rig();
        vc.poll(
            ValveRequest {
                open: true,
                close: true,
            },
            &mut hw,
            &mut sink,
        );
        assert!(!vc.is_open());
        // Both commands issued, close last.
        assert_eq!(
            hw.commands,
            vec![(LineId::Line1, true), (LineId::Line1, false)]
        );
    }

    #[test]
    fn neither_held_state_is_held() {
        let (mut vc, mut hw, mut sink) = rig();
        vc.poll(
            ValveRequest {
                open: true,
                close: false,
            },
            &mut hw,
            &mut sink,
        );
        let commands_after_open = hw.commands.len();
        vc.poll(ValveRequest::default(), &mut hw, &mut sink);
        vc.poll(ValveRequest::default(), &mut hw, &mut sink);
        assert!(vc.is_open());
        assert_eq!(hw.commands.len(), commands_after_open); // no re-command
    }

    #[test]
    fn held_open_recommands_every_poll() {
        let (mut vc, mut hw, mut sink) = rig();
        let held = ValveRequest {
            open: true,
            close: false,
        };
        vc.poll(held, &mut hw, &mut sink);
        vc.poll(held, &mut hw, &mut sink);
        vc.poll(held, &mut hw, &mut sink);
        assert_eq!(hw.commands.len(), 3);
        // ...but the state change event fires once.
        assert_eq!(sink.events.len(), 1);
    }

    #[test]
    fn change_events_carry_line_and_state() {
        let (mut vc, mut hw, mut sink) = rig();
        vc.poll(
            ValveRequest {
                open: true,
                close: false,
            },
            &mut hw,
            &mut sink,
        );
        vc.poll(
            ValveRequest {
                open: false,
                close: true,
            },
            &mut hw,
            &mut sink,
        );
        assert!(matches!(
            sink.events[0],
            AppEvent::ValveChanged {
                line: LineId::Line1,
                open: true
            }
        ));
        assert!(matches!(
            sink.events[1],
            AppEvent::ValveChanged {
                line: LineId::Line1,
                open: false
            }
        ));
    }
}
