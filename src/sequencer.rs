use std::collections::VecDeque;

use tracing::debug;

use crate::command::{Command, FlightState, LAND, TAKE_OFF};

/// What an acknowledgement datagram said about the command it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Success,
    Failure,
}

/// Classifies a control channel datagram. The drone answers every command
/// with `ok` or an error report; anything else is not an outcome at all.
pub(crate) fn classify(payload: &str) -> Option<Outcome> {
    if payload == "ok" {
        Some(Outcome::Success)
    } else if payload.contains("error") {
        Some(Outcome::Failure)
    } else {
        None
    }
}

/// Sends commands strictly one at a time.
///
/// Commands wait in a FIFO queue; the head is transmitted only once the
/// previous command's outcome has arrived, and stays at the head until its
/// own outcome does. Acknowledged `takeoff` and `land` flip the flight
/// state, which gates whether queued commands may be sent at all.
///
/// The sequencer never touches a socket itself - each mutating call returns
/// the command to transmit now, if any.
#[derive(Debug, Default)]
pub(crate) struct Sequencer {
    queue: VecDeque<Command>,
    /// The transmitted, not yet acknowledged command. While this is `Some`
    /// it is always a copy of the queue head.
    in_flight: Option<Command>,
    flight_state: FlightState,
    /// Outcomes still owed by the drone for commands abandoned by a reset or
    /// a timeout. Each owed outcome swallows one recognized outcome datagram
    /// before it can be misread as answering a fresh command.
    stale_outcomes: u32,
}

impl Sequencer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn flight_state(&self) -> FlightState {
        self.flight_state
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Appends a command to the queue. Returns the command to transmit now,
    /// if any.
    pub(crate) fn enqueue(&mut self, command: Command) -> Option<Command> {
        self.queue.push_back(command);
        self.dispatch()
    }

    /// Applies an acknowledgement datagram from the control channel. Returns
    /// the next command to transmit, if any.
    ///
    /// An unrecognized payload leaves the in-flight command pending - the
    /// drone guarantees an eventual outcome for every command it was sent.
    pub(crate) fn acknowledged(&mut self, payload: &str) -> Option<Command> {
        let outcome = classify(payload)?;

        if self.stale_outcomes > 0 {
            self.stale_outcomes -= 1;
            debug!("discarding outcome for an abandoned command: {payload:?}");
            return None;
        }

        let Some(command) = self.in_flight.take() else {
            debug!("ignoring unexpected acknowledgement: {payload:?}");
            return None;
        };

        match outcome {
            Outcome::Success => {
                if command.is(TAKE_OFF) {
                    self.flight_state = FlightState::Airborne;
                } else if command.is(LAND) {
                    self.flight_state = FlightState::Grounded;
                }
            }
            // A drone that reports an error is not trusted to be airborne.
            Outcome::Failure => self.flight_state = FlightState::Grounded,
        }

        self.queue.pop_front();
        self.dispatch()
    }

    /// Gives up on the in-flight command, exactly as if the drone had
    /// reported an error for it. Its outcome, should it still arrive, will
    /// be discarded.
    pub(crate) fn abandon_in_flight(&mut self) -> Option<Command> {
        self.in_flight.take()?;
        self.stale_outcomes += 1;
        self.flight_state = FlightState::Grounded;
        self.queue.pop_front();
        self.dispatch()
    }

    /// Drops every queued command and returns to the grounded state. The
    /// in-flight command, if any, cannot be recalled from the drone - only
    /// its outcome is discarded when it arrives.
    pub(crate) fn reset(&mut self) {
        if self.in_flight.take().is_some() {
            self.stale_outcomes += 1;
        }
        self.queue.clear();
        self.flight_state = FlightState::Grounded;
    }

    /// Transmits nothing while a command is in flight. Otherwise commands
    /// the flight state does not permit are dropped from the head of the
    /// queue, unsent, until one is permitted; that one becomes the new
    /// in-flight command.
    fn dispatch(&mut self) -> Option<Command> {
        if self.in_flight.is_some() {
            return None;
        }

        while let Some(head) = self.queue.front() {
            if self.flight_state.permits(head) {
                self.in_flight = Some(head.clone());
                return self.in_flight.clone();
            }

            debug!(
                "dropping {:?}, not permitted while {:?}",
                head.text(),
                self.flight_state
            );
            self.queue.pop_front();
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let sequencer = Sequencer::new();
        assert_eq!(sequencer.flight_state(), FlightState::Grounded);
        assert!(!sequencer.is_busy());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("ok"), Some(Outcome::Success));
        assert_eq!(classify("error Motor stop"), Some(Outcome::Failure));
        assert_eq!(classify("error"), Some(Outcome::Failure));
        assert_eq!(classify("82"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_single_command_in_flight() {
        let mut sequencer = Sequencer::new();

        let sent = sequencer.enqueue(Command::take_off());
        assert_eq!(sent, Some(Command::take_off()));
        assert!(sequencer.is_busy());

        // nothing more goes out until the outcome arrives
        assert_eq!(sequencer.enqueue(Command::up(50)), None);
        assert_eq!(sequencer.enqueue(Command::land()), None);
        assert!(sequencer.is_busy());
    }

    #[test]
    fn test_takeoff_success_flips_flight_state() {
        let mut sequencer = Sequencer::new();
        sequencer.enqueue(Command::take_off());

        assert_eq!(sequencer.acknowledged("ok"), None);
        assert_eq!(sequencer.flight_state(), FlightState::Airborne);
        assert!(!sequencer.is_busy());
    }

    #[test]
    fn test_land_success_flips_flight_state_back() {
        let mut sequencer = Sequencer::new();
        sequencer.enqueue(Command::take_off());
        sequencer.acknowledged("ok");
        sequencer.enqueue(Command::land());

        assert_eq!(sequencer.acknowledged("ok"), None);
        assert_eq!(sequencer.flight_state(), FlightState::Grounded);
    }

    #[test]
    fn test_fifo_order() {
        let mut sequencer = Sequencer::new();
        sequencer.enqueue(Command::take_off());
        sequencer.enqueue(Command::up(50));
        sequencer.enqueue(Command::turn_clockwise(90));
        sequencer.enqueue(Command::land());

        assert_eq!(sequencer.acknowledged("ok"), Some(Command::up(50)));
        assert_eq!(sequencer.acknowledged("ok"), Some(Command::turn_clockwise(90)));
        assert_eq!(sequencer.acknowledged("ok"), Some(Command::land()));
        assert_eq!(sequencer.acknowledged("ok"), None);
        assert_eq!(sequencer.flight_state(), FlightState::Grounded);
    }

    #[test]
    fn test_grounded_commands_dropped_unsent() {
        let mut sequencer = Sequencer::new();

        assert_eq!(sequencer.enqueue(Command::up(50)), None);
        assert_eq!(sequencer.enqueue(Command::land()), None);

        assert!(!sequencer.is_busy());
        assert_eq!(sequencer.flight_state(), FlightState::Grounded);
    }

    #[test]
    fn test_gated_heads_skipped_until_permitted_command() {
        let mut sequencer = Sequencer::new();
        sequencer.enqueue(Command::take_off());

        // queued while grounded, inspected once idle again
        assert_eq!(sequencer.enqueue(Command::up(50)), None);

        // takeoff succeeds, so "up 50" is now permitted and goes out
        assert_eq!(sequencer.acknowledged("ok"), Some(Command::up(50)));
    }

    #[test]
    fn test_error_grounds_and_advances() {
        let mut sequencer = Sequencer::new();
        sequencer.enqueue(Command::take_off());
        sequencer.acknowledged("ok");

        sequencer.enqueue(Command::up(50));
        sequencer.enqueue(Command::down(30));

        // "up 50" fails; "down 30" is no longer permitted and is dropped
        assert_eq!(sequencer.acknowledged("error Motor stop"), None);
        assert_eq!(sequencer.flight_state(), FlightState::Grounded);
        assert!(!sequencer.is_busy());
    }

    #[test]
    fn test_unrecognized_payload_keeps_command_pending() {
        let mut sequencer = Sequencer::new();
        sequencer.enqueue(Command::take_off());

        assert_eq!(sequencer.acknowledged("82"), None);
        assert!(sequencer.is_busy());

        // the real outcome still lands
        assert_eq!(sequencer.acknowledged("ok"), None);
        assert_eq!(sequencer.flight_state(), FlightState::Airborne);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut sequencer = Sequencer::new();
        sequencer.enqueue(Command::take_off());
        sequencer.acknowledged("ok");
        sequencer.enqueue(Command::up(50));
        sequencer.enqueue(Command::down(30));

        sequencer.reset();
        assert!(!sequencer.is_busy());
        assert_eq!(sequencer.flight_state(), FlightState::Grounded);

        // nothing left to send
        assert_eq!(sequencer.acknowledged("ok"), None);
    }

    #[test]
    fn test_outcome_after_reset_is_discarded() {
        let mut sequencer = Sequencer::new();
        sequencer.enqueue(Command::take_off());

        // reset while "takeoff" is in flight; its ok arrives afterwards and
        // must not touch the freshly dispatched command
        sequencer.reset();
        assert_eq!(sequencer.enqueue(Command::take_off()), Some(Command::take_off()));

        assert_eq!(sequencer.acknowledged("ok"), None);
        assert!(sequencer.is_busy());
        assert_eq!(sequencer.flight_state(), FlightState::Grounded);

        // the second ok is the real one
        assert_eq!(sequencer.acknowledged("ok"), None);
        assert!(!sequencer.is_busy());
        assert_eq!(sequencer.flight_state(), FlightState::Airborne);
    }

    #[test]
    fn test_reset_while_idle_owes_nothing() {
        let mut sequencer = Sequencer::new();
        sequencer.reset();

        sequencer.enqueue(Command::take_off());
        assert_eq!(sequencer.acknowledged("ok"), None);
        assert_eq!(sequencer.flight_state(), FlightState::Airborne);
    }

    #[test]
    fn test_abandon_acts_like_an_error() {
        let mut sequencer = Sequencer::new();
        sequencer.enqueue(Command::take_off());
        sequencer.acknowledged("ok");
        sequencer.enqueue(Command::up(50));
        sequencer.enqueue(Command::take_off());

        // "up 50" never gets an outcome and is abandoned; the queued takeoff
        // is permitted while grounded and goes out next
        assert_eq!(sequencer.abandon_in_flight(), Some(Command::take_off()));
        assert_eq!(sequencer.flight_state(), FlightState::Grounded);

        // the abandoned command's late outcome is swallowed, the next one
        // answers the takeoff
        assert_eq!(sequencer.acknowledged("ok"), None);
        assert!(sequencer.is_busy());
        assert_eq!(sequencer.acknowledged("ok"), None);
        assert_eq!(sequencer.flight_state(), FlightState::Airborne);
    }

    #[test]
    fn test_abandon_when_idle_is_a_no_op() {
        let mut sequencer = Sequencer::new();
        assert_eq!(sequencer.abandon_in_flight(), None);
        assert_eq!(sequencer.flight_state(), FlightState::Grounded);
    }
}
