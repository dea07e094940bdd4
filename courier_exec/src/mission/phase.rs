//! # Mission phases and the transition graph
//!
//! Every legal step of a delivery mission is a [`MissionPhase`], and the
//! edges between them are declared in one exhaustive match so the compiler
//! guarantees every phase has a defined successor set. ERROR is reachable
//! from every phase and is the only phase that can return to IDLE, which
//! keeps the mission resettable no matter where it fails.
//!
//! CHARGING appears as an explicit escape edge on every busy phase so that
//! the emergency low-battery transition is still validated against the graph
//! rather than bypassing it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// A phase of the delivery mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionPhase {
    // Idle and order fetching
    Idle,
    CheckOrders,
    OrderAssigned,

    // Flight preparation
    MotorsOn,

    // Pickup leg
    FlightToPickup,
    AtPickup,
    OpenCompartmentPickup,
    Loading,
    CloseCompartmentPickup,

    // Delivery leg
    FlightToDropoff,
    AtDropoff,
    OpenCompartmentDropoff,
    WaitForPickup,
    PackageDelivered,
    CloseCompartmentDropoff,

    // Return to charging
    FlightToCharging,
    AtChargingStation,
    Charging,

    // Error handling
    Error,
}

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// All declared phases, for iteration in checks and tests.
pub const ALL_PHASES: [MissionPhase; 19] = [
    MissionPhase::Idle,
    MissionPhase::CheckOrders,
    MissionPhase::OrderAssigned,
    MissionPhase::MotorsOn,
    MissionPhase::FlightToPickup,
    MissionPhase::AtPickup,
    MissionPhase::OpenCompartmentPickup,
    MissionPhase::Loading,
    MissionPhase::CloseCompartmentPickup,
    MissionPhase::FlightToDropoff,
    MissionPhase::AtDropoff,
    MissionPhase::OpenCompartmentDropoff,
    MissionPhase::WaitForPickup,
    MissionPhase::PackageDelivered,
    MissionPhase::CloseCompartmentDropoff,
    MissionPhase::FlightToCharging,
    MissionPhase::AtChargingStation,
    MissionPhase::Charging,
    MissionPhase::Error,
];

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl MissionPhase {
    /// The set of phases this phase may legally transition to.
    pub fn successors(self) -> &'static [MissionPhase] {
        use MissionPhase::*;

        match self {
            Idle => &[CheckOrders, Charging, Error],

            CheckOrders => &[Idle, OrderAssigned, Charging, Error],

            // Idle is reachable again here so an unservable order can be
            // rejected rather than jamming the machine
            OrderAssigned => &[MotorsOn, Idle, Charging, Error],

            MotorsOn => &[FlightToPickup, Charging, Error],

            FlightToPickup => &[AtPickup, Charging, Error],

            AtPickup => &[OpenCompartmentPickup, Charging, Error],

            OpenCompartmentPickup => &[Loading, Charging, Error],

            Loading => &[CloseCompartmentPickup, Charging, Error],

            CloseCompartmentPickup => &[FlightToDropoff, Charging, Error],

            FlightToDropoff => &[AtDropoff, Charging, Error],

            AtDropoff => &[OpenCompartmentDropoff, Charging, Error],

            OpenCompartmentDropoff => &[WaitForPickup, Charging, Error],

            WaitForPickup => &[PackageDelivered, Charging, Error],

            PackageDelivered => &[CloseCompartmentDropoff, Charging, Error],

            CloseCompartmentDropoff => &[FlightToCharging, Idle, Charging, Error],

            FlightToCharging => &[AtChargingStation, Error],

            AtChargingStation => &[Charging, Error],

            Charging => &[CheckOrders, Idle, Error],

            // The sole recovery path
            Error => &[Idle],
        }
    }

    /// True for every phase between order acceptance and compartment close
    /// at the dropoff, i.e. while the robot is responsible for a package.
    pub fn is_busy(self) -> bool {
        use MissionPhase::*;

        matches!(
            self,
            OrderAssigned
                | MotorsOn
                | FlightToPickup
                | AtPickup
                | OpenCompartmentPickup
                | Loading
                | CloseCompartmentPickup
                | FlightToDropoff
                | AtDropoff
                | OpenCompartmentDropoff
                | WaitForPickup
                | PackageDelivered
                | CloseCompartmentDropoff
        )
    }

    /// True for the charging phases, including the flight back to the
    /// charging station.
    pub fn is_charging(self) -> bool {
        use MissionPhase::*;

        matches!(self, Charging | AtChargingStation | FlightToCharging)
    }

    /// True while the vehicle is travelling between waypoints.
    pub fn is_flying(self) -> bool {
        use MissionPhase::*;

        matches!(self, FlightToPickup | FlightToDropoff | FlightToCharging)
    }

    /// Phase name reported to the backend, for the subset of phases the
    /// backend tracks. All other phases report `"UNKNOWN"`.
    pub fn server_phase_name(self) -> &'static str {
        use MissionPhase::*;

        match self {
            FlightToPickup => "FLIGHT_TO_PICKUP",
            AtPickup => "AT_PICKUP",
            Loading => "LOADING",
            FlightToDropoff => "FLIGHT_TO_DROPOFF",
            AtDropoff => "AT_DROPOFF",
            WaitForPickup => "UNLOADING",
            PackageDelivered => "PACKAGE_DELIVERED",
            FlightToCharging => "FLIGHT_TO_CHARGING",
            _ => "UNKNOWN",
        }
    }

    /// True for phases the backend wants to hear about on entry.
    pub fn should_notify_server(self) -> bool {
        use MissionPhase::*;

        matches!(
            self,
            AtPickup | AtDropoff | PackageDelivered | AtChargingStation
        )
    }
}

impl Display for MissionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use MissionPhase::*;

        let name = match self {
            Idle => "IDLE",
            CheckOrders => "CHECK_ORDERS",
            OrderAssigned => "ORDER_ASSIGNED",
            MotorsOn => "MOTORS_ON",
            FlightToPickup => "FLIGHT_TO_PICKUP",
            AtPickup => "AT_PICKUP",
            OpenCompartmentPickup => "OPEN_COMPARTMENT_PICKUP",
            Loading => "LOADING",
            CloseCompartmentPickup => "CLOSE_COMPARTMENT_PICKUP",
            FlightToDropoff => "FLIGHT_TO_DROPOFF",
            AtDropoff => "AT_DROPOFF",
            OpenCompartmentDropoff => "OPEN_COMPARTMENT_DROPOFF",
            WaitForPickup => "WAIT_FOR_PICKUP",
            PackageDelivered => "PACKAGE_DELIVERED",
            CloseCompartmentDropoff => "CLOSE_COMPARTMENT_DROPOFF",
            FlightToCharging => "FLIGHT_TO_CHARGING",
            AtChargingStation => "AT_CHARGING_STATION",
            Charging => "CHARGING",
            Error => "ERROR",
        };

        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_reachable_from_everywhere() {
        for phase in ALL_PHASES.iter() {
            if *phase == MissionPhase::Error {
                // ERROR only recovers to IDLE
                assert_eq!(phase.successors(), &[MissionPhase::Idle]);
            } else {
                assert!(
                    phase.successors().contains(&MissionPhase::Error),
                    "{} has no edge to ERROR",
                    phase
                );
            }
        }
    }

    #[test]
    fn test_only_error_reaches_idle_directly_after_failure() {
        // IDLE is only reachable from the phases that legitimately end a
        // mission or reject an order
        for phase in ALL_PHASES.iter() {
            let reaches_idle = phase.successors().contains(&MissionPhase::Idle);
            let expected = matches!(
                phase,
                MissionPhase::CheckOrders
                    | MissionPhase::OrderAssigned
                    | MissionPhase::CloseCompartmentDropoff
                    | MissionPhase::Charging
                    | MissionPhase::Error
            );
            assert_eq!(reaches_idle, expected, "bad IDLE edge on {}", phase);
        }
    }

    #[test]
    fn test_busy_phases_have_charging_escape() {
        for phase in ALL_PHASES.iter().filter(|p| p.is_busy()) {
            assert!(
                phase.successors().contains(&MissionPhase::Charging),
                "{} has no emergency edge to CHARGING",
                phase
            );
        }
    }

    #[test]
    fn test_predicates() {
        assert!(MissionPhase::Idle.successors().contains(&MissionPhase::CheckOrders));
        assert!(!MissionPhase::Idle.is_busy());
        assert!(MissionPhase::Loading.is_busy());
        assert!(MissionPhase::FlightToCharging.is_charging());
        assert!(MissionPhase::FlightToCharging.is_flying());
        assert!(!MissionPhase::Charging.is_flying());
    }

    #[test]
    fn test_server_phase_names() {
        assert_eq!(MissionPhase::WaitForPickup.server_phase_name(), "UNLOADING");
        assert_eq!(
            MissionPhase::FlightToPickup.server_phase_name(),
            "FLIGHT_TO_PICKUP"
        );
        assert_eq!(MissionPhase::Idle.server_phase_name(), "UNKNOWN");
        assert_eq!(MissionPhase::Error.server_phase_name(), "UNKNOWN");
    }
}
