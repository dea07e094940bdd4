//! # Simulated vehicle hardware

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::hardware::HardwareActuator;
use comms_if::CollaboratorError;
use log::info;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// GPIO-free hardware: tracks actuator state and simulates the recipient's
/// confirm press a configurable number of polls after the compartment opens.
pub struct SimHardware {
    motors_running: bool,
    compartment_open: bool,

    /// Polls after which the simulated recipient presses the button; zero
    /// means they never show up
    confirm_after_polls: u32,

    polls_since_open: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimHardware {
    pub fn new(confirm_after_polls: u32) -> Self {
        Self {
            motors_running: false,
            compartment_open: false,
            confirm_after_polls,
            polls_since_open: 0,
        }
    }

    pub fn motors_running(&self) -> bool {
        self.motors_running
    }

    pub fn compartment_open(&self) -> bool {
        self.compartment_open
    }
}

impl HardwareActuator for SimHardware {
    fn start_motors(&mut self) -> Result<(), CollaboratorError> {
        if !self.motors_running {
            info!("[hardware] motors started");
            self.motors_running = true;
        }
        Ok(())
    }

    fn stop_motors(&mut self) -> Result<(), CollaboratorError> {
        if self.motors_running {
            info!("[hardware] motors stopped");
            self.motors_running = false;
        }
        Ok(())
    }

    fn open_compartment(&mut self) -> Result<(), CollaboratorError> {
        if !self.compartment_open {
            info!("[hardware] compartment opened");
            self.compartment_open = true;
            self.polls_since_open = 0;
        }
        Ok(())
    }

    fn close_compartment(&mut self) -> Result<(), CollaboratorError> {
        if self.compartment_open {
            info!("[hardware] compartment closed");
            self.compartment_open = false;
        }
        Ok(())
    }

    fn is_confirm_button_pressed(&mut self) -> bool {
        if !self.compartment_open || self.confirm_after_polls == 0 {
            return false;
        }

        self.polls_since_open += 1;

        if self.polls_since_open >= self.confirm_after_polls {
            info!("[hardware] confirm button pressed");
            return true;
        }

        false
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_confirm_press_after_polls() {
        let mut hw = SimHardware::new(3);

        // Button is dead while the compartment is shut
        assert!(!hw.is_confirm_button_pressed());

        hw.open_compartment().unwrap();
        assert!(!hw.is_confirm_button_pressed());
        assert!(!hw.is_confirm_button_pressed());
        assert!(hw.is_confirm_button_pressed());
    }

    #[test]
    fn test_confirm_disabled() {
        let mut hw = SimHardware::new(0);
        hw.open_compartment().unwrap();

        for _ in 0..100 {
            assert!(!hw.is_confirm_button_pressed());
        }
    }

    #[test]
    fn test_actuators_idempotent() {
        let mut hw = SimHardware::new(1);

        hw.start_motors().unwrap();
        hw.start_motors().unwrap();
        assert!(hw.motors_running());

        hw.stop_motors().unwrap();
        hw.stop_motors().unwrap();
        assert!(!hw.motors_running());
    }
}
