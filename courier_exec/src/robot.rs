//! # Robot state
//!
//! The single mutable record describing the vehicle: identity and
//! characteristics loaded from parameters at startup, plus the live battery,
//! position, navigation target and mission bookkeeping. Created once per run
//! and owned by the mission orchestrator for the life of the process.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::telemetry::{RobotStatus, TelemetryPacket};
use serde::Deserialize;

// Internal
use crate::geo::LatLon;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Kind of delivery vehicle this software is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RobotType {
    Drone,
    GroundCourier,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters describing the vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct RobotParams {
    /// Serial number identifying this robot to the backend
    pub serial_number: String,

    pub robot_type: RobotType,

    /// Full battery capacity.
    ///
    /// Units: Joules
    pub battery_capacity_j: f64,

    /// Energy used per meter travelled.
    ///
    /// Units: Joules/meter
    pub energy_per_meter_j: f64,

    /// Speed cap used by the motion engine.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Position the robot starts at if the backend has no better idea.
    ///
    /// Units: degrees
    pub start_latitude_deg: f64,
    pub start_longitude_deg: f64,

    /// Node the start position corresponds to, if any
    pub start_node_id: Option<u32>,
}

/// A navigation target: free coordinates, optionally tied to a backend node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destination {
    pub pos: LatLon,
    pub node_id: Option<u32>,
}

/// Live state of the vehicle.
pub struct RobotState {
    /// Serial number identifying this robot to the backend
    pub serial_number: String,

    pub robot_type: RobotType,

    /// Battery state of charge in percent, kept in [0, 100]
    battery_percent: f64,

    /// Full battery capacity.
    ///
    /// Units: Joules
    pub battery_capacity_j: f64,

    /// Energy used per meter travelled.
    ///
    /// Units: Joules/meter
    pub energy_per_meter_j: f64,

    /// Speed cap used by the motion engine.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Status reported to the backend
    pub status: RobotStatus,

    /// Current position
    pub pos: LatLon,

    /// Node the robot is at, if it is at one
    pub current_node_id: Option<u32>,

    /// Navigation target, if one is armed
    pub target: Option<Destination>,

    /// Order the robot is currently delivering, if any
    pub mission_id: Option<u64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotState {
    /// Build the initial robot state from the vehicle parameters.
    ///
    /// The robot starts fully charged, idle and stationary at the configured
    /// start position.
    pub fn from_params(params: &RobotParams) -> Self {
        Self {
            serial_number: params.serial_number.clone(),
            robot_type: params.robot_type,
            battery_percent: 100.0,
            battery_capacity_j: params.battery_capacity_j,
            energy_per_meter_j: params.energy_per_meter_j,
            max_speed_ms: params.max_speed_ms,
            status: RobotStatus::Idle,
            pos: LatLon {
                lat_deg: params.start_latitude_deg,
                lon_deg: params.start_longitude_deg,
            },
            current_node_id: params.start_node_id,
            target: None,
            mission_id: None,
        }
    }

    /// Battery state of charge in percent, always in [0, 100].
    pub fn battery_percent(&self) -> f64 {
        self.battery_percent
    }

    /// Set the battery state of charge, clamping into [0, 100].
    pub fn set_battery_percent(&mut self, percent: f64) {
        self.battery_percent = clamp(&percent, &0.0, &100.0);
    }

    /// Energy currently stored in the battery.
    ///
    /// Units: Joules
    pub fn stored_energy_j(&self) -> f64 {
        (self.battery_percent / 100.0) * self.battery_capacity_j
    }

    /// Move the robot to a position, recording the node if it is a known one.
    pub fn set_location(&mut self, pos: LatLon, node_id: Option<u32>) {
        self.pos = pos;
        self.current_node_id = node_id;
    }

    /// Arm a navigation target. Leaving a node clears the current node id.
    pub fn set_target(&mut self, dest: Destination) {
        self.target = Some(dest);
    }

    /// Begin delivering an order.
    pub fn start_delivery(&mut self, order_id: u64) {
        self.mission_id = Some(order_id);
        self.status = RobotStatus::Delivering;
    }

    /// Finish (or abandon) the current delivery, returning to idle.
    pub fn complete_delivery(&mut self) {
        self.mission_id = None;
        self.target = None;
        self.status = RobotStatus::Idle;
    }

    /// Build the status payload the backend expects.
    pub fn telemetry_packet(&self) -> TelemetryPacket {
        TelemetryPacket {
            status: self.status,
            battery_level: self.battery_percent,
            current_node_id: self.current_node_id,
            current_latitude: self.pos.lat_deg,
            current_longitude: self.pos.lon_deg,
            target_node_id: self.target.and_then(|t| t.node_id),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> RobotParams {
        RobotParams {
            serial_number: String::from("CR-001"),
            robot_type: RobotType::Drone,
            battery_capacity_j: 360_000.0,
            energy_per_meter_j: 36.0,
            max_speed_ms: 10.0,
            start_latitude_deg: 50.0,
            start_longitude_deg: 36.0,
            start_node_id: Some(25),
        }
    }

    #[test]
    fn test_battery_clamped() {
        let mut robot = RobotState::from_params(&params());

        robot.set_battery_percent(120.0);
        assert_eq!(robot.battery_percent(), 100.0);

        robot.set_battery_percent(-5.0);
        assert_eq!(robot.battery_percent(), 0.0);
    }

    #[test]
    fn test_delivery_bookkeeping() {
        let mut robot = RobotState::from_params(&params());

        robot.start_delivery(42);
        assert_eq!(robot.mission_id, Some(42));
        assert_eq!(robot.status, RobotStatus::Delivering);

        robot.complete_delivery();
        assert_eq!(robot.mission_id, None);
        assert_eq!(robot.status, RobotStatus::Idle);
        assert!(robot.target.is_none());
    }

    #[test]
    fn test_telemetry_packet_fields() {
        let mut robot = RobotState::from_params(&params());
        robot.set_target(Destination {
            pos: LatLon { lat_deg: 50.1, lon_deg: 36.1 },
            node_id: Some(7),
        });

        let packet = robot.telemetry_packet();
        assert_eq!(packet.current_node_id, Some(25));
        assert_eq!(packet.target_node_id, Some(7));
        assert_eq!(packet.battery_level, 100.0);
    }
}
