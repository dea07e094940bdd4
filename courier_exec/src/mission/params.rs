//! # Mission orchestrator parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MissionParams {
    /// Interval between order checks while idle.
    ///
    /// Units: seconds
    pub order_check_interval_s: f64,

    /// Dwell in LOADING before the package is assumed loaded.
    ///
    /// Units: seconds
    pub loading_dwell_s: f64,

    /// Maximum wait for the recipient before the package counts as
    /// delivered anyway.
    ///
    /// Units: seconds
    pub wait_for_pickup_timeout_s: f64,

    /// Cool-down in ERROR before attempting recovery to IDLE.
    ///
    /// Units: seconds
    pub error_cooldown_s: f64,

    /// Below this state of charge the robot returns to the charging station
    /// after a delivery instead of idling in place.
    ///
    /// Units: percent
    pub return_battery_percent: f64,

    /// Interval between routine telemetry pushes.
    ///
    /// Units: seconds
    pub telemetry_interval_s: f64,

    /// Backend node of the charging station this robot returns to.
    pub charging_node_id: u32,
}
