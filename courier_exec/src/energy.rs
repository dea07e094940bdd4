//! # Energy model
//!
//! Converts distance travelled into battery drain, integrates charging, and
//! answers the range questions the orchestrator asks before and during a
//! mission. Stateless apart from its parameters; all energy lives in
//! [`RobotState`].
//!
//! Stored energy is `percent/100 * capacity`; drain subtracts
//! `meters * energy_per_meter` Joules and the percentage is recomputed and
//! clamped. The motion engine steps at a fixed cadence, so the accounting is
//! exact per step.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::robot::RobotState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the energy model.
#[derive(Debug, Clone, Deserialize)]
pub struct EnergyParams {
    /// Minimum state of charge for normal operations; below this the
    /// orchestrator forces an emergency charge.
    ///
    /// Units: percent
    pub min_battery_percent: f64,

    /// Charge rate while connected to (or simulating) a charger.
    ///
    /// Units: percent/second
    pub charge_rate_percent_s: f64,

    /// State of charge at which charging is considered finished.
    ///
    /// Units: percent
    pub charge_complete_percent: f64,

    /// Safety margin applied when judging whether a mission is in range:
    /// available energy must exceed required energy times this factor.
    pub mission_margin_factor: f64,
}

/// The energy model itself.
pub struct EnergyModel {
    params: EnergyParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EnergyModel {
    pub fn new(params: EnergyParams) -> Self {
        Self { params }
    }

    /// Drain the battery for a distance travelled.
    ///
    /// Negative distances are treated as zero, so drain can never charge the
    /// battery. Monotonic: the state of charge never increases.
    pub fn drain(&self, robot: &mut RobotState, distance_m: f64) {
        let distance_m = distance_m.max(0.0);

        let consumed_j = distance_m * robot.energy_per_meter_j;
        let remaining_j = robot.stored_energy_j() - consumed_j;

        robot.set_battery_percent((remaining_j / robot.battery_capacity_j) * 100.0);
    }

    /// Integrate charging over an elapsed interval.
    pub fn recharge(&self, robot: &mut RobotState, dt_s: f64) {
        let dt_s = dt_s.max(0.0);

        let percent = robot.battery_percent() + self.params.charge_rate_percent_s * dt_s;
        robot.set_battery_percent(percent);
    }

    /// True when the state of charge is below the operational minimum.
    pub fn is_low(&self, robot: &RobotState) -> bool {
        robot.battery_percent() < self.params.min_battery_percent
    }

    /// True when charging can stop.
    pub fn is_charge_complete(&self, robot: &RobotState) -> bool {
        robot.battery_percent() >= self.params.charge_complete_percent
    }

    /// Maximum distance the robot can still cover.
    ///
    /// Units: meters
    pub fn max_range_m(&self, robot: &RobotState) -> f64 {
        robot.stored_energy_j() / robot.energy_per_meter_j
    }

    /// Judge whether a mission of the given length is within range, with the
    /// configured safety margin.
    pub fn can_complete(&self, robot: &RobotState, distance_m: f64) -> bool {
        let required_j = distance_m * robot.energy_per_meter_j;
        robot.stored_energy_j() >= required_j * self.params.mission_margin_factor
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::robot::{RobotParams, RobotType};

    fn robot() -> RobotState {
        RobotState::from_params(&RobotParams {
            serial_number: String::from("CR-001"),
            robot_type: RobotType::Drone,
            battery_capacity_j: 360_000.0,
            energy_per_meter_j: 36.0,
            max_speed_ms: 10.0,
            start_latitude_deg: 50.0,
            start_longitude_deg: 36.0,
            start_node_id: None,
        })
    }

    fn model() -> EnergyModel {
        EnergyModel::new(EnergyParams {
            min_battery_percent: 20.0,
            charge_rate_percent_s: 2.0,
            charge_complete_percent: 95.0,
            mission_margin_factor: 1.2,
        })
    }

    #[test]
    fn test_drain_1000_m() {
        // 1000 m at 36 J/m out of 360 kJ is exactly 10% of the battery
        let mut robot = robot();
        model().drain(&mut robot, 1000.0);

        assert!((robot.battery_percent() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_drain_monotonic_and_clamped() {
        let mut robot = robot();
        let model = model();

        let mut last = robot.battery_percent();
        for &d in &[0.0, 1.0, 500.0, -20.0, 100_000.0] {
            model.drain(&mut robot, d);
            assert!(robot.battery_percent() <= last);
            last = robot.battery_percent();
        }

        // Fully drained, never negative
        assert_eq!(robot.battery_percent(), 0.0);
    }

    #[test]
    fn test_negative_distance_is_not_charge() {
        let mut robot = robot();
        robot.set_battery_percent(50.0);

        model().drain(&mut robot, -1000.0);
        assert_eq!(robot.battery_percent(), 50.0);
    }

    #[test]
    fn test_recharge_and_completion() {
        let mut robot = robot();
        let model = model();
        robot.set_battery_percent(90.0);

        model.recharge(&mut robot, 1.0);
        assert!((robot.battery_percent() - 92.0).abs() < 1e-9);
        assert!(!model.is_charge_complete(&robot));

        model.recharge(&mut robot, 10.0);
        assert_eq!(robot.battery_percent(), 100.0);
        assert!(model.is_charge_complete(&robot));
    }

    #[test]
    fn test_is_low_threshold() {
        let mut robot = robot();
        let model = model();

        robot.set_battery_percent(20.0);
        assert!(!model.is_low(&robot));

        robot.set_battery_percent(19.9);
        assert!(model.is_low(&robot));
    }

    #[test]
    fn test_max_range() {
        let mut robot = robot();
        let model = model();

        assert!((model.max_range_m(&robot) - 10_000.0).abs() < 1e-9);

        robot.set_battery_percent(50.0);
        assert!((model.max_range_m(&robot) - 5_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_can_complete_margin() {
        let robot = robot();
        let model = model();

        // 10 km of range, 1.2 margin: 8333 m is the limit
        assert!(model.can_complete(&robot, 8_000.0));
        assert!(!model.can_complete(&robot, 9_000.0));
    }
}
