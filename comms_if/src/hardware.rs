//! # Hardware actuation interface
//!
//! Contract with the vehicle's physical equipment: drive/lift motors, the
//! cargo compartment servo and the recipient confirm button. Real
//! implementations drive GPIO; the simulation implementation just tracks
//! state.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::CollaboratorError;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Contract with the vehicle hardware.
pub trait HardwareActuator {
    /// Spin up the motors ready for movement.
    fn start_motors(&mut self) -> Result<(), CollaboratorError>;

    /// Stop the motors. Must be safe to call when already stopped.
    fn stop_motors(&mut self) -> Result<(), CollaboratorError>;

    /// Open the cargo compartment.
    fn open_compartment(&mut self) -> Result<(), CollaboratorError>;

    /// Close the cargo compartment. Must be safe to call when already closed.
    fn close_compartment(&mut self) -> Result<(), CollaboratorError>;

    /// Poll the recipient confirm button.
    ///
    /// Polled once per orchestration cycle while waiting for the recipient to
    /// collect their package, so implementations should debounce internally.
    fn is_confirm_button_pressed(&mut self) -> bool;
}
