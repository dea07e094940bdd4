//! # Motion engine
//!
//! Advances the robot's simulated position towards its armed target at a
//! fixed cadence, draining the battery for every meter stepped. Stepping at
//! a fixed interval (rather than integrating continuously) keeps the energy
//! accounting exact per tick and avoids float drift from sub-interval
//! updates; capping the step at the remaining distance prevents overshooting
//! the target.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::Deserialize;

// Internal
use crate::energy::EnergyModel;
use crate::geo;
use crate::robot::{Destination, RobotState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the motion engine.
#[derive(Debug, Clone, Deserialize)]
pub struct MotionParams {
    /// Minimum time between position updates.
    ///
    /// Units: seconds
    pub update_interval_s: f64,

    /// Distance below which the robot is considered to have arrived.
    ///
    /// Units: meters
    pub arrival_tolerance_m: f64,
}

/// The motion engine.
///
/// Position and target live on [`RobotState`]; the engine owns only the
/// movement flag and its own update cadence.
pub struct MotionEngine {
    params: MotionParams,

    moving: bool,

    /// Session time of the last position update.
    ///
    /// Units: seconds
    last_update_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Result of one motion engine tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionUpdate {
    /// No target is armed
    Idle,

    /// A target is armed and the robot has not yet reached it
    StillMoving,

    /// The robot reached its target on this tick
    Arrived,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionEngine {
    pub fn new(params: MotionParams) -> Self {
        Self {
            params,
            moving: false,
            last_update_s: 0.0,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Arm a destination and start moving towards it.
    ///
    /// No side effects beyond the robot's target and the movement flag.
    pub fn set_destination(&mut self, robot: &mut RobotState, dest: Destination) {
        let distance = geo::distance_m(robot.pos, dest.pos);

        robot.set_target(dest);
        self.moving = true;

        info!(
            "Destination set: ({:.6}, {:.6}), distance: {:.2} m",
            dest.pos.lat_deg, dest.pos.lon_deg, distance
        );
        if let Some(eta) = self.eta_s(robot) {
            debug!("Estimated time to arrival: {:.0} s", eta);
        }
    }

    /// Advance the simulated position.
    ///
    /// No-op (returning the current movement state) unless a target is armed
    /// and at least the update interval has elapsed since the last step.
    pub fn tick(
        &mut self,
        robot: &mut RobotState,
        energy: &EnergyModel,
        now_s: f64,
    ) -> MotionUpdate {
        if !self.moving {
            return MotionUpdate::Idle;
        }

        // Rate limit to the update interval
        if now_s - self.last_update_s < self.params.update_interval_s {
            return MotionUpdate::StillMoving;
        }
        self.last_update_s = now_s;

        let target = match robot.target {
            Some(t) => t,
            None => {
                // A target was cleared without stopping the engine
                self.moving = false;
                return MotionUpdate::Idle;
            }
        };

        let distance_to_target = geo::distance_m(robot.pos, target.pos);

        // Arrival: snap to the target and account the residual distance
        if distance_to_target < self.params.arrival_tolerance_m {
            robot.set_location(target.pos, target.node_id);
            robot.target = None;
            self.moving = false;

            energy.drain(robot, distance_to_target);

            info!(
                "Arrived at destination: ({:.6}, {:.6})",
                target.pos.lat_deg, target.pos.lon_deg
            );

            return MotionUpdate::Arrived;
        }

        // Step along the bearing to the target, never overshooting
        let step_m = (robot.max_speed_ms * self.params.update_interval_s)
            .min(distance_to_target);

        let bearing = geo::bearing_deg(robot.pos, target.pos);
        let new_pos = geo::project(robot.pos, bearing, step_m);

        robot.set_location(new_pos, None);
        energy.drain(robot, step_m);

        debug!(
            "Moving to ({:.6}, {:.6}), remaining: {:.0} m, battery: {:.1}%",
            target.pos.lat_deg,
            target.pos.lon_deg,
            distance_to_target - step_m,
            robot.battery_percent()
        );

        MotionUpdate::StillMoving
    }

    /// Remaining straight-line distance to the target.
    ///
    /// Units: meters
    pub fn distance_remaining(&self, robot: &RobotState) -> Option<f64> {
        robot.target.map(|t| geo::distance_m(robot.pos, t.pos))
    }

    /// Estimated time to reach the target at the speed cap.
    ///
    /// Units: seconds
    pub fn eta_s(&self, robot: &RobotState) -> Option<f64> {
        if robot.max_speed_ms <= 0.0 {
            return None;
        }

        self.distance_remaining(robot)
            .map(|d| d / robot.max_speed_ms)
    }

    /// Stop immediately, clearing the target without draining energy.
    ///
    /// Used for emergency aborts.
    pub fn stop(&mut self, robot: &mut RobotState) {
        self.moving = false;
        robot.target = None;

        info!("Movement stopped");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::energy::EnergyParams;
    use crate::geo::LatLon;
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

    fn energy() -> EnergyModel {
        EnergyModel::new(EnergyParams {
            min_battery_percent: 20.0,
            charge_rate_percent_s: 2.0,
            charge_complete_percent: 95.0,
            mission_margin_factor: 1.2,
        })
    }

    fn engine() -> MotionEngine {
        MotionEngine::new(MotionParams {
            update_interval_s: 2.0,
            arrival_tolerance_m: 1.0,
        })
    }

    fn dest(lat: f64, lon: f64) -> Destination {
        Destination {
            pos: LatLon { lat_deg: lat, lon_deg: lon },
            node_id: Some(7),
        }
    }

    #[test]
    fn test_idle_without_target() {
        let mut robot = robot();
        let mut engine = engine();

        assert_eq!(engine.tick(&mut robot, &energy(), 10.0), MotionUpdate::Idle);
        assert!(engine.distance_remaining(&robot).is_none());
    }

    #[test]
    fn test_rate_limited() {
        let mut robot = robot();
        let mut engine = engine();
        let energy = energy();

        engine.set_destination(&mut robot, dest(50.0, 36.001));

        // First step at t=2
        assert_eq!(
            engine.tick(&mut robot, &energy, 2.0),
            MotionUpdate::StillMoving
        );
        let pos_after_step = robot.pos;

        // t=3 is within the 2 s interval: no movement
        assert_eq!(
            engine.tick(&mut robot, &energy, 3.0),
            MotionUpdate::StillMoving
        );
        assert_eq!(robot.pos, pos_after_step);
    }

    #[test]
    fn test_convergence_without_overshoot() {
        // Target ~71.5 m east; at 10 m/s and 2 s steps the robot must arrive
        // within ceil(d / 20) + 1 ticks, never overshooting
        let mut robot = robot();
        let mut engine = engine();
        let energy = energy();

        let target = dest(50.0, 36.001);
        let total = geo::distance_m(robot.pos, target.pos);
        engine.set_destination(&mut robot, target);

        let max_ticks = (total / 20.0).ceil() as usize + 1;

        let mut arrivals = 0;
        let mut now = 0.0;
        for _ in 0..max_ticks {
            now += 2.0;

            let before = geo::distance_m(robot.pos, target.pos);
            let update = engine.tick(&mut robot, &energy, now);
            let after = geo::distance_m(robot.pos, target.pos);

            // Each step covers at most 20 m and never moves away
            assert!(before - after <= 20.0 + 1e-6);
            assert!(after <= before);

            if update == MotionUpdate::Arrived {
                arrivals += 1;
            }
        }

        // Arrived exactly once, within tolerance, with target cleared
        assert_eq!(arrivals, 1);
        assert!(!engine.is_moving());
        assert!(robot.target.is_none());
        assert!(geo::distance_m(robot.pos, target.pos) < 1e-6);
        assert_eq!(robot.current_node_id, Some(7));

        // Further ticks stay idle
        assert_eq!(engine.tick(&mut robot, &energy, now + 2.0), MotionUpdate::Idle);
    }

    #[test]
    fn test_first_step_bounded_by_speed_cap() {
        let mut robot = robot();
        let mut engine = engine();
        let energy = energy();

        let start = robot.pos;
        engine.set_destination(&mut robot, dest(50.0, 36.001));
        engine.tick(&mut robot, &energy, 2.0);

        let moved = geo::distance_m(start, robot.pos);
        assert!(moved <= 20.0 + 1e-6, "moved {} m in one step", moved);
        assert!(moved > 19.0);
    }

    #[test]
    fn test_energy_drained_per_step() {
        let mut robot = robot();
        let mut engine = engine();
        let energy = energy();

        engine.set_destination(&mut robot, dest(50.0, 36.001));
        engine.tick(&mut robot, &energy, 2.0);

        // 20 m at 36 J/m out of 360 kJ is 0.2%
        assert!((robot.battery_percent() - 99.8).abs() < 1e-3);
    }

    #[test]
    fn test_eta_at_speed_cap() {
        let mut robot = robot();
        let mut engine = engine();

        assert!(engine.eta_s(&robot).is_none());

        engine.set_destination(&mut robot, dest(50.0, 36.001));

        let eta = engine.eta_s(&robot).unwrap();
        let remaining = engine.distance_remaining(&robot).unwrap();
        assert!((eta - remaining / 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_stop_clears_target_without_drain() {
        let mut robot = robot();
        let mut engine = engine();

        engine.set_destination(&mut robot, dest(50.0, 36.001));
        engine.stop(&mut robot);

        assert!(!engine.is_moving());
        assert!(robot.target.is_none());
        assert_eq!(robot.battery_percent(), 100.0);
    }
}
