//! # Order interface
//!
//! Defines the order assignment payload handed out by the delivery backend
//! and the [`OrderProvider`] contract through which the courier fetches,
//! accepts and progresses orders.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Internal
use crate::CollaboratorError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An order assigned to this robot by the backend.
///
/// Field names mirror the backend's assignment DTO, hence the camelCase
/// serialisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAssignment {
    /// Backend identifier of the order
    pub order_id: u64,

    /// Human readable order name
    #[serde(default)]
    pub order_name: String,

    /// Payload mass in kilograms
    #[serde(default)]
    pub weight: f64,

    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub pickup_node_id: Option<u32>,

    pub dropoff_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_node_id: Option<u32>,

    /// Backend estimate of the total route length.
    ///
    /// Units: meters
    #[serde(default)]
    pub total_distance_meters: f64,

    /// Backend estimate of the battery fraction this delivery will use.
    ///
    /// Units: percent of full charge
    #[serde(default)]
    pub estimated_battery_usage_percent: f64,
}

/// Body of a phase report sent to the backend as the delivery progresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseReport {
    /// Externally visible phase name, e.g. `"FLIGHT_TO_PICKUP"`
    pub phase: String,

    pub latitude: f64,
    pub longitude: f64,

    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Contract with the backend's order endpoints.
pub trait OrderProvider {
    /// Fetch the orders currently assigned to this robot.
    fn fetch_assigned(&mut self) -> Result<Vec<OrderAssignment>, CollaboratorError>;

    /// Accept an assigned order, taking responsibility for its delivery.
    fn accept(&mut self, order_id: u64) -> Result<(), CollaboratorError>;

    /// Report the current delivery phase and position for an order.
    fn report_phase(
        &mut self,
        order_id: u64,
        phase_name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), CollaboratorError>;

    /// Mark an order as delivered.
    fn complete(&mut self, order_id: u64) -> Result<(), CollaboratorError>;

    /// Cancel an order, giving the reason for the cancellation.
    fn cancel(&mut self, order_id: u64, reason: &str) -> Result<(), CollaboratorError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PhaseReport {
    pub fn new(phase_name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            phase: String::from(phase_name),
            latitude,
            longitude,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_assignment_wire_names() {
        let json = r#"{
            "orderId": 17,
            "orderName": "Spare parts",
            "weight": 1.2,
            "pickupLatitude": 50.0,
            "pickupLongitude": 36.0,
            "pickupNodeId": 3,
            "dropoffLatitude": 50.01,
            "dropoffLongitude": 36.02,
            "dropoffNodeId": 7,
            "totalDistanceMeters": 2500.0,
            "estimatedBatteryUsagePercent": 25.0
        }"#;

        let order: OrderAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(order.order_id, 17);
        assert_eq!(order.pickup_node_id, Some(3));
        assert_eq!(order.dropoff_node_id, Some(7));
        assert_eq!(order.total_distance_meters, 2500.0);
    }

    #[test]
    fn test_assignment_optional_fields() {
        // The backend may omit estimates and node ids for ad-hoc coordinates
        let json = r#"{
            "orderId": 1,
            "pickupLatitude": 50.0,
            "pickupLongitude": 36.0,
            "pickupNodeId": null,
            "dropoffLatitude": 50.0,
            "dropoffLongitude": 36.001,
            "dropoffNodeId": null
        }"#;

        let order: OrderAssignment = serde_json::from_str(json).unwrap();
        assert!(order.pickup_node_id.is_none());
        assert_eq!(order.total_distance_meters, 0.0);
    }
}
