//! # Telemetry interface
//!
//! Defines the status payload the robot periodically pushes to the backend
//! and the [`TelemetryReporter`] contract used to send it and to resolve
//! named waypoint (node) coordinates.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::CollaboratorError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Robot status as understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotStatus {
    Idle,
    Delivering,
    Returning,
    Charging,
    Maintenance,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Robot status payload pushed to the backend.
///
/// Field names mirror the backend's status endpoint, hence the camelCase
/// serialisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryPacket {
    pub status: RobotStatus,

    /// Battery state of charge in percent, [0, 100]
    pub battery_level: f64,

    /// Node the robot is currently at, if it is at one
    pub current_node_id: Option<u32>,

    pub current_latitude: f64,
    pub current_longitude: f64,

    /// Node the robot is currently navigating towards, if any
    pub target_node_id: Option<u32>,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Contract with the backend's telemetry endpoints.
pub trait TelemetryReporter {
    /// Send a status update.
    ///
    /// Implementations may rate-limit on their side; `force` requests the
    /// update be sent regardless of any such limiting (used at significant
    /// events such as charging start/end).
    fn send_status(
        &mut self,
        packet: &TelemetryPacket,
        force: bool,
    ) -> Result<(), CollaboratorError>;

    /// Resolve the coordinates of a named waypoint known to the backend.
    ///
    /// Returns `Ok(None)` if the backend does not know the node.
    fn fetch_node_coordinates(
        &mut self,
        node_id: u32,
    ) -> Result<Option<(f64, f64)>, CollaboratorError>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_packet_wire_names() {
        let packet = TelemetryPacket {
            status: RobotStatus::Delivering,
            battery_level: 87.5,
            current_node_id: None,
            current_latitude: 50.0,
            current_longitude: 36.0,
            target_node_id: Some(7),
        };

        let value = serde_json::to_value(&packet).unwrap();
        assert_eq!(value["status"], "Delivering");
        assert_eq!(value["batteryLevel"], 87.5);
        assert_eq!(value["currentNodeId"], serde_json::Value::Null);
        assert_eq!(value["currentLatitude"], 50.0);
        assert_eq!(value["targetNodeId"], 7);
    }
}
