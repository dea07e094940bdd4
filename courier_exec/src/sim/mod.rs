//! # Simulated collaborators
//!
//! In-process stand-ins for the delivery backend and the vehicle GPIO,
//! letting the full mission loop run on a desk with no network and no
//! hardware attached. The scripted orders and the node table come from
//! `sim.toml`; once every scripted order has been handed out and closed the
//! executable can stop.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod hardware;
mod orders;
mod telemetry;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use hardware::SimHardware;
pub use orders::SimOrderSource;
pub use telemetry::{LogDisplay, SimTelemetry};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the simulated collaborators.
#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    /// Number of confirm-button polls after which the simulated recipient
    /// presses the button. Zero disables the press, forcing the wait
    /// timeout path.
    pub confirm_after_polls: u32,

    /// Named waypoints the simulated backend knows about
    pub nodes: Vec<SimNode>,

    /// Orders the simulated backend hands out, in sequence
    pub orders: Vec<SimOrder>,
}

/// A named waypoint in the simulated world.
#[derive(Debug, Clone, Deserialize)]
pub struct SimNode {
    pub id: u32,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

/// A scripted order.
#[derive(Debug, Clone, Deserialize)]
pub struct SimOrder {
    pub order_id: u64,
    pub name: String,

    /// Payload mass.
    ///
    /// Units: kilograms
    pub weight_kg: f64,

    /// Pickup node, must appear in `nodes`
    pub pickup_node: u32,

    /// Dropoff node, must appear in `nodes`
    pub dropoff_node: u32,
}
