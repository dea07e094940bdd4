//! # Communications interface
//!
//! This library defines the contracts between the courier executable and its
//! external collaborators: the delivery backend (orders and telemetry), the
//! vehicle hardware (motors, compartment, confirm button) and the optional
//! status display. The executable only ever talks to these traits; the
//! transport behind them (HTTP client, GPIO driver, simulation) is supplied
//! by the implementor.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod display;
pub mod hardware;
pub mod orders;
pub mod telemetry;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error raised by a collaborator call.
///
/// Collaborators sit behind unreliable links (radio, WiFi, serial), so every
/// fallible contract returns this type and the caller decides whether the
/// failure aborts the mission or is retried on a later cycle.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Not connected to the backend")]
    NotConnected,

    #[error("The backend rejected the request: {0}")]
    Rejected(String),

    #[error("Could not parse the response: {0}")]
    ResponseParseError(serde_json::Error),

    #[error("Hardware fault: {0}")]
    HardwareFault(String),
}
