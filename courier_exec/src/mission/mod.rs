//! # Mission module
//!
//! This module implements the delivery mission core: the phase state machine
//! ([`fsm::MissionFsm`]), the static transition graph ([`phase::MissionPhase`])
//! and the orchestrator ([`orchestrator::MissionMgr`]) that drives one
//! delivery from order acceptance through pickup, dropoff and the return to
//! the charging station.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod fsm;
pub mod orchestrator;
pub mod params;
pub mod phase;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::orders::OrderAssignment;
use comms_if::CollaboratorError;

use crate::geo::LatLon;
use crate::robot::Destination;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use fsm::{MissionFsm, PhaseData};
pub use orchestrator::{Collaborators, MissionMgr};
pub use params::MissionParams;
pub use phase::MissionPhase;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the mission core.
#[derive(Debug, thiserror::Error)]
pub enum MissionError {
    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidTransition {
        from: MissionPhase,
        to: MissionPhase,
    },

    #[error("Failed to load MissionParams: {0:?}")]
    ParamLoadError(util::params::LoadError),

    #[error("No {0} coordinates available")]
    NavigationFault(&'static str),

    #[error("Collaborator call failed: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Phase data is missing the expected {0}")]
    MissingPhaseData(&'static str),
}

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A mission waypoint: coordinates plus the backend node they belong to.
#[derive(Debug, Clone, Copy)]
pub struct Waypoint {
    pub pos: LatLon,
    pub node_id: Option<u32>,
}

/// One delivery, owned by the orchestrator from acceptance to completion or
/// cancellation.
#[derive(Debug, Clone)]
pub struct Mission {
    pub order_id: u64,
    pub name: String,

    /// Payload mass.
    ///
    /// Units: kilograms
    pub weight_kg: f64,

    pub pickup: Waypoint,
    pub dropoff: Waypoint,

    /// Backend estimate of the total route length.
    ///
    /// Units: meters
    pub total_distance_m: f64,

    /// Backend estimate of the battery fraction the delivery will use.
    ///
    /// Units: percent
    pub est_battery_usage_percent: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Waypoint {
    /// The waypoint as a navigation destination.
    pub fn destination(&self) -> Destination {
        Destination {
            pos: self.pos,
            node_id: self.node_id,
        }
    }
}

impl Mission {
    /// Build a mission from a backend order assignment.
    pub fn from_assignment(order: &OrderAssignment) -> Self {
        Self {
            order_id: order.order_id,
            name: order.order_name.clone(),
            weight_kg: order.weight,
            pickup: Waypoint {
                pos: LatLon {
                    lat_deg: order.pickup_latitude,
                    lon_deg: order.pickup_longitude,
                },
                node_id: order.pickup_node_id,
            },
            dropoff: Waypoint {
                pos: LatLon {
                    lat_deg: order.dropoff_latitude,
                    lon_deg: order.dropoff_longitude,
                },
                node_id: order.dropoff_node_id,
            },
            total_distance_m: order.total_distance_meters,
            est_battery_usage_percent: order.estimated_battery_usage_percent,
        }
    }
}
