//! Alert state machine
//!
//! Edge-triggered hysteresis over the per-frame deviation signal. The
//! actuator's start/stop are not idempotent, so commands are emitted only
//! on state change, never re-issued while a state holds. Frames without a
//! signal (fewer than two eyes) are "no evidence" and hold the last state.

use tracing::debug;

/// Binary alert state; the one piece of state surviving across frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertState {
    #[default]
    Centered,
    Deviated,
}

/// Command for the actuator, emitted on state entry only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCommand {
    Start,
    Stop,
}

/// Edge-triggered state machine over the deviation signal.
///
/// One instance per session; no process-wide state. A new session starts
/// a fresh machine in `Centered`.
#[derive(Debug, Default)]
pub struct AlertStateMachine {
    state: AlertState,
}

impl AlertStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Feed one frame's signal. `None` (no signal) holds the current
    /// state; repeated signals in the current state are no-ops.
    pub fn observe(&mut self, signal: Option<bool>) -> Option<AlertCommand> {
        let deviated = signal?;
        match (self.state, deviated) {
            (AlertState::Centered, true) => {
                self.state = AlertState::Deviated;
                debug!("Centered -> Deviated");
                Some(AlertCommand::Start)
            }
            (AlertState::Deviated, false) => {
                self.state = AlertState::Centered;
                debug!("Deviated -> Centered");
                Some(AlertCommand::Stop)
            }
            _ => None,
        }
    }

    /// Session teardown. Returns the final `Stop` iff the machine is left
    /// `Deviated`, so an alert is never left running after the session.
    pub fn finish(&mut self) -> Option<AlertCommand> {
        if self.state == AlertState::Deviated {
            self.state = AlertState::Centered;
            debug!("Teardown while deviated, stopping alert");
            Some(AlertCommand::Stop)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(machine: &mut AlertStateMachine, signals: &[Option<bool>]) -> Vec<AlertCommand> {
        signals.iter().filter_map(|s| machine.observe(*s)).collect()
    }

    #[test]
    fn starts_centered() {
        assert_eq!(AlertStateMachine::new().state(), AlertState::Centered);
    }

    #[test]
    fn start_fires_once_per_deviated_run() {
        let mut machine = AlertStateMachine::new();
        let commands = run(&mut machine, &[Some(true), Some(true), Some(true)]);
        assert_eq!(commands, vec![AlertCommand::Start]);
        assert_eq!(machine.state(), AlertState::Deviated);
    }

    #[test]
    fn stop_fires_once_on_return_to_center() {
        let mut machine = AlertStateMachine::new();
        let commands = run(
            &mut machine,
            &[Some(true), Some(false), Some(false), Some(true), Some(false)],
        );
        assert_eq!(
            commands,
            vec![
                AlertCommand::Start,
                AlertCommand::Stop,
                AlertCommand::Start,
                AlertCommand::Stop,
            ]
        );
    }

    #[test]
    fn centered_signal_while_centered_is_noop() {
        let mut machine = AlertStateMachine::new();
        assert_eq!(run(&mut machine, &[Some(false), Some(false)]), vec![]);
    }

    #[test]
    fn no_signal_holds_state() {
        let mut machine = AlertStateMachine::new();
        let commands = run(&mut machine, &[Some(true), None, None, Some(true)]);
        assert_eq!(commands, vec![AlertCommand::Start]);
        assert_eq!(machine.state(), AlertState::Deviated);
    }

    #[test]
    fn finish_stops_active_alert_exactly_once() {
        let mut machine = AlertStateMachine::new();
        machine.observe(Some(true));
        assert_eq!(machine.finish(), Some(AlertCommand::Stop));
        assert_eq!(machine.finish(), None);
        assert_eq!(machine.state(), AlertState::Centered);
    }

    #[test]
    fn finish_is_noop_when_centered() {
        let mut machine = AlertStateMachine::new();
        assert_eq!(machine.finish(), None);
    }

    proptest! {
        /// Final state tracks only the last signal-bearing frame.
        #[test]
        fn final_state_matches_last_signal(
            signals in prop::collection::vec(prop::option::of(any::<bool>()), 0..64)
        ) {
            let mut machine = AlertStateMachine::new();
            for signal in &signals {
                machine.observe(*signal);
            }
            let expected = match signals.iter().rev().find_map(|s| *s) {
                Some(true) => AlertState::Deviated,
                _ => AlertState::Centered,
            };
            prop_assert_eq!(machine.state(), expected);
        }

        /// Commands alternate Start, Stop, Start, ... and teardown closes
        /// any open Start, so starts and stops always pair up.
        #[test]
        fn commands_alternate_and_pair(
            signals in prop::collection::vec(prop::option::of(any::<bool>()), 0..64)
        ) {
            let mut machine = AlertStateMachine::new();
            let mut commands: Vec<AlertCommand> =
                signals.iter().filter_map(|s| machine.observe(*s)).collect();
            if let Some(command) = machine.finish() {
                commands.push(command);
            }
            for (i, command) in commands.iter().enumerate() {
                let expected = if i % 2 == 0 { AlertCommand::Start } else { AlertCommand::Stop };
                prop_assert_eq!(*command, expected);
            }
            prop_assert_eq!(commands.len() % 2, 0);
        }
    }
}
