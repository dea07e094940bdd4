//! # Simulated telemetry backend and log display

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use comms_if::display::DisplayNotifier;
use comms_if::telemetry::{TelemetryPacket, TelemetryReporter};
use comms_if::CollaboratorError;
use log::{debug, info};
use std::collections::HashMap;

// Internal
use super::SimNode;
use util::maths::lin_map;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of segments in the battery bar drawn by [`LogDisplay`].
const BATTERY_BAR_SEGMENTS: usize = 10;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A telemetry backend that logs status packets and answers node lookups
/// from an in-memory table.
pub struct SimTelemetry {
    nodes: HashMap<u32, (f64, f64)>,

    /// Number of packets received so far
    pub num_packets: u64,
}

/// A display that writes to the log instead of an LCD.
pub struct LogDisplay;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimTelemetry {
    pub fn new(nodes: &[SimNode]) -> Self {
        Self {
            nodes: nodes
                .iter()
                .map(|n| (n.id, (n.latitude_deg, n.longitude_deg)))
                .collect(),
            num_packets: 0,
        }
    }
}

impl TelemetryReporter for SimTelemetry {
    fn send_status(
        &mut self,
        packet: &TelemetryPacket,
        force: bool,
    ) -> Result<(), CollaboratorError> {
        let body =
            serde_json::to_string(packet).map_err(CollaboratorError::ResponseParseError)?;

        self.num_packets += 1;

        if force {
            info!("[sim backend] status update (forced): {}", body);
        } else {
            debug!("[sim backend] status update: {}", body);
        }

        Ok(())
    }

    fn fetch_node_coordinates(
        &mut self,
        node_id: u32,
    ) -> Result<Option<(f64, f64)>, CollaboratorError> {
        Ok(self.nodes.get(&node_id).copied())
    }
}

impl DisplayNotifier for LogDisplay {
    fn notify_phase(&mut self, phase_name: &str) {
        info!("[display] {}", phase_name);
    }

    fn notify_battery(&mut self, percent: f64) {
        let filled = lin_map(
            (0.0, 100.0),
            (0.0, BATTERY_BAR_SEGMENTS as f64),
            percent,
        )
        .round() as usize;
        let filled = filled.min(BATTERY_BAR_SEGMENTS);

        debug!(
            "[display] battery [{}{}] {:.0}%",
            "#".repeat(filled),
            "-".repeat(BATTERY_BAR_SEGMENTS - filled),
            percent
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_node_lookup() {
        let mut telemetry = SimTelemetry::new(&[SimNode {
            id: 25,
            latitude_deg: 50.0,
            longitude_deg: 36.0,
        }]);

        assert_eq!(
            telemetry.fetch_node_coordinates(25).unwrap(),
            Some((50.0, 36.0))
        );
        assert_eq!(telemetry.fetch_node_coordinates(26).unwrap(), None);
    }
}
