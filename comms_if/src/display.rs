//! # Display interface
//!
//! Fire-and-forget status notifications for an attached display (LCD, LED
//! panel). The control core never depends on these succeeding, and must
//! behave identically with [`NullDisplay`] plugged in.

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Contract with an optional status display.
pub trait DisplayNotifier {
    /// Show the mission phase the robot has just entered.
    fn notify_phase(&mut self, phase_name: &str);

    /// Show the current battery state of charge.
    fn notify_battery(&mut self, percent: f64);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A display that does nothing, for vehicles without one fitted.
pub struct NullDisplay;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DisplayNotifier for NullDisplay {
    fn notify_phase(&mut self, _phase_name: &str) {}

    fn notify_battery(&mut self, _percent: f64) {}
}
