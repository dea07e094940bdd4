//! # Simulated order source

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use comms_if::orders::{OrderAssignment, OrderProvider, PhaseReport};
use comms_if::CollaboratorError;
use log::{info, warn};
use std::collections::HashMap;

// Internal
use super::{SimNode, SimOrder};
use crate::geo::{self, LatLon};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A scripted order backend.
///
/// Hands out the configured orders one at a time and logs the phase traffic
/// a real backend would receive.
pub struct SimOrderSource {
    /// Orders not yet accepted, in hand-out sequence
    pending: Vec<OrderAssignment>,

    /// Order ids closed by `complete` or `cancel`
    closed: Vec<u64>,

    total: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised while building the simulated backend.
#[derive(Debug, thiserror::Error)]
pub enum SimOrderSourceError {
    #[error("Order {0} references unknown node {1}")]
    UnknownNode(u64, u32),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimOrderSource {
    /// Build the scripted backend, resolving order waypoints against the
    /// node table and precomputing the route length estimates the real
    /// backend would provide.
    pub fn new(nodes: &[SimNode], orders: &[SimOrder]) -> Result<Self, SimOrderSourceError> {
        let node_map: HashMap<u32, LatLon> = nodes
            .iter()
            .map(|n| {
                (
                    n.id,
                    LatLon {
                        lat_deg: n.latitude_deg,
                        lon_deg: n.longitude_deg,
                    },
                )
            })
            .collect();

        let mut pending = Vec::with_capacity(orders.len());

        for order in orders {
            let pickup = node_map
                .get(&order.pickup_node)
                .ok_or(SimOrderSourceError::UnknownNode(
                    order.order_id,
                    order.pickup_node,
                ))?;
            let dropoff = node_map
                .get(&order.dropoff_node)
                .ok_or(SimOrderSourceError::UnknownNode(
                    order.order_id,
                    order.dropoff_node,
                ))?;

            pending.push(OrderAssignment {
                order_id: order.order_id,
                order_name: order.name.clone(),
                weight: order.weight_kg,
                pickup_latitude: pickup.lat_deg,
                pickup_longitude: pickup.lon_deg,
                pickup_node_id: Some(order.pickup_node),
                dropoff_latitude: dropoff.lat_deg,
                dropoff_longitude: dropoff.lon_deg,
                dropoff_node_id: Some(order.dropoff_node),
                total_distance_meters: geo::distance_m(*pickup, *dropoff),
                estimated_battery_usage_percent: 0.0,
            });
        }

        Ok(Self {
            total: pending.len(),
            pending,
            closed: Vec::new(),
        })
    }

    /// True once every scripted order has been handed out and closed.
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty() && self.closed.len() == self.total
    }
}

impl OrderProvider for SimOrderSource {
    fn fetch_assigned(&mut self) -> Result<Vec<OrderAssignment>, CollaboratorError> {
        // One order at a time, like the backend assigning work to a single
        // robot
        Ok(self.pending.first().cloned().into_iter().collect())
    }

    fn accept(&mut self, order_id: u64) -> Result<(), CollaboratorError> {
        let before = self.pending.len();
        self.pending.retain(|o| o.order_id != order_id);

        if self.pending.len() == before {
            return Err(CollaboratorError::Rejected(format!(
                "order {} is not assigned to this robot",
                order_id
            )));
        }

        info!("[sim backend] order {} accepted", order_id);
        Ok(())
    }

    fn report_phase(
        &mut self,
        order_id: u64,
        phase_name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), CollaboratorError> {
        let report = PhaseReport::new(phase_name, latitude, longitude);
        let body =
            serde_json::to_string(&report).map_err(CollaboratorError::ResponseParseError)?;

        info!("[sim backend] order {} phase update: {}", order_id, body);
        Ok(())
    }

    fn complete(&mut self, order_id: u64) -> Result<(), CollaboratorError> {
        info!("[sim backend] order {} completed", order_id);
        self.closed.push(order_id);
        Ok(())
    }

    fn cancel(&mut self, order_id: u64, reason: &str) -> Result<(), CollaboratorError> {
        warn!("[sim backend] order {} cancelled: {}", order_id, reason);
        self.closed.push(order_id);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn nodes() -> Vec<SimNode> {
        vec![
            SimNode { id: 3, latitude_deg: 50.0003, longitude_deg: 36.0 },
            SimNode { id: 7, latitude_deg: 50.0006, longitude_deg: 36.0 },
        ]
    }

    fn orders() -> Vec<SimOrder> {
        vec![SimOrder {
            order_id: 1,
            name: String::from("Groceries"),
            weight_kg: 2.0,
            pickup_node: 3,
            dropoff_node: 7,
        }]
    }

    #[test]
    fn test_hand_out_and_close() {
        let mut source = SimOrderSource::new(&nodes(), &orders()).unwrap();
        assert!(!source.is_exhausted());

        let assigned = source.fetch_assigned().unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].pickup_node_id, Some(3));
        assert!(assigned[0].total_distance_meters > 30.0);

        source.accept(1).unwrap();
        assert!(source.fetch_assigned().unwrap().is_empty());
        assert!(!source.is_exhausted());

        source.complete(1).unwrap();
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_accept_unknown_order_rejected() {
        let mut source = SimOrderSource::new(&nodes(), &orders()).unwrap();
        assert!(source.accept(99).is_err());
    }

    #[test]
    fn test_unknown_node_fails_construction() {
        let mut bad = orders();
        bad[0].dropoff_node = 1000;

        assert!(SimOrderSource::new(&nodes(), &bad).is_err());
    }
}
