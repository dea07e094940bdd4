//! # Mission state machine
//!
//! Holds the current [`MissionPhase`], validates every requested transition
//! against the static graph and carries the per-phase transient data. The
//! machine is deterministic and total: any request outside the graph fails
//! cleanly without mutating state. The single exception is
//! [`MissionFsm::handle_error`], which moves to ERROR unconditionally -
//! ERROR is an edge of every other phase by construction, so this cannot
//! create an edge the graph does not declare.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::orders::OrderAssignment;
use log::{error, info};

use super::{MissionError, MissionPhase};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Transient data owned by the current phase.
///
/// Replaced wholesale on every transition; nothing carries forward unless
/// the caller explicitly copies it into the new data.
#[derive(Debug, Clone, Default)]
pub struct PhaseData {
    /// Session time at which the phase was entered.
    ///
    /// Units: seconds
    pub entered_at_s: f64,

    /// Order pending acceptance (ORDER_ASSIGNED only)
    pub order: Option<OrderAssignment>,

    /// Description of the fault that caused entry (ERROR only)
    pub error: Option<String>,
}

/// The mission state machine.
pub struct MissionFsm {
    current: MissionPhase,
    previous: Option<MissionPhase>,
    data: PhaseData,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl PhaseData {
    /// Data for a phase entered at the given time, carrying nothing else.
    pub fn at(now_s: f64) -> Self {
        Self {
            entered_at_s: now_s,
            ..Default::default()
        }
    }

    /// Data carrying an order pending acceptance.
    pub fn with_order(now_s: f64, order: OrderAssignment) -> Self {
        Self {
            entered_at_s: now_s,
            order: Some(order),
            error: None,
        }
    }

    /// Data carrying a fault description.
    pub fn with_error(now_s: f64, message: &str) -> Self {
        Self {
            entered_at_s: now_s,
            order: None,
            error: Some(String::from(message)),
        }
    }
}

impl MissionFsm {
    /// Create the machine in IDLE.
    pub fn new() -> Self {
        info!("Mission FSM initialised in {} state", MissionPhase::Idle);

        Self {
            current: MissionPhase::Idle,
            previous: None,
            data: PhaseData::default(),
        }
    }

    pub fn current(&self) -> MissionPhase {
        self.current
    }

    pub fn previous(&self) -> Option<MissionPhase> {
        self.previous
    }

    pub fn data(&self) -> &PhaseData {
        &self.data
    }

    /// True if the graph declares an edge from the current phase to `to`.
    pub fn can_transition(&self, to: MissionPhase) -> bool {
        self.current.successors().contains(&to)
    }

    /// Transition to a new phase, replacing the transient data.
    ///
    /// Fails without mutating any state when the edge is not in the graph.
    pub fn transition_to(
        &mut self,
        to: MissionPhase,
        data: PhaseData,
    ) -> Result<(), MissionError> {
        if !self.can_transition(to) {
            return Err(MissionError::InvalidTransition {
                from: self.current,
                to,
            });
        }

        self.previous = Some(self.current);
        self.current = to;
        self.data = data;

        info!(
            "Phase transition: {} -> {}",
            self.previous.unwrap_or(MissionPhase::Idle),
            self.current
        );

        Ok(())
    }

    /// Move to ERROR unconditionally, carrying the fault description.
    pub fn handle_error(&mut self, message: &str, now_s: f64) {
        error!("Mission fault: {}", message);

        self.previous = Some(self.current);
        self.current = MissionPhase::Error;
        self.data = PhaseData::with_error(now_s, message);
    }

    pub fn is_idle(&self) -> bool {
        self.current == MissionPhase::Idle
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_busy()
    }

    pub fn is_charging(&self) -> bool {
        self.current.is_charging()
    }

    pub fn is_flying(&self) -> bool {
        self.current.is_flying()
    }

    /// Phase name the backend knows the current phase by.
    pub fn server_phase_name(&self) -> &'static str {
        self.current.server_phase_name()
    }

    /// True if the backend wants a phase report for the current phase.
    pub fn should_notify_server(&self) -> bool {
        self.current.should_notify_server()
    }
}

impl Default for MissionFsm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mission::phase::ALL_PHASES;

    #[test]
    fn test_nominal_transition() {
        let mut fsm = MissionFsm::new();

        fsm.transition_to(MissionPhase::CheckOrders, PhaseData::at(1.0))
            .unwrap();

        assert_eq!(fsm.current(), MissionPhase::CheckOrders);
        assert_eq!(fsm.previous(), Some(MissionPhase::Idle));
        assert_eq!(fsm.data().entered_at_s, 1.0);
    }

    #[test]
    fn test_rejected_transition_leaves_state_untouched() {
        let mut fsm = MissionFsm::new();
        fsm.transition_to(MissionPhase::CheckOrders, PhaseData::at(1.0))
            .unwrap();

        // CHECK_ORDERS has no edge to LOADING
        let result = fsm.transition_to(MissionPhase::Loading, PhaseData::at(2.0));

        assert!(matches!(
            result,
            Err(MissionError::InvalidTransition {
                from: MissionPhase::CheckOrders,
                to: MissionPhase::Loading,
            })
        ));
        assert_eq!(fsm.current(), MissionPhase::CheckOrders);
        assert_eq!(fsm.previous(), Some(MissionPhase::Idle));
        assert_eq!(fsm.data().entered_at_s, 1.0);
    }

    #[test]
    fn test_transient_data_replaced_on_transition() {
        let mut fsm = MissionFsm::new();

        fsm.transition_to(MissionPhase::CheckOrders, PhaseData::at(1.0))
            .unwrap();
        fsm.transition_to(MissionPhase::Idle, PhaseData::at(2.0))
            .unwrap();

        assert_eq!(fsm.data().entered_at_s, 2.0);
        assert!(fsm.data().order.is_none());
        assert!(fsm.data().error.is_none());
    }

    #[test]
    fn test_handle_error_from_every_phase() {
        for phase in ALL_PHASES.iter() {
            let mut fsm = MissionFsm {
                current: *phase,
                previous: None,
                data: PhaseData::default(),
            };

            fsm.handle_error("something broke", 5.0);

            assert_eq!(fsm.current(), MissionPhase::Error);
            assert_eq!(fsm.previous(), Some(*phase));
            assert_eq!(fsm.data().error.as_deref(), Some("something broke"));
        }
    }

    #[test]
    fn test_error_recovers_only_to_idle() {
        let mut fsm = MissionFsm::new();
        fsm.handle_error("fault", 1.0);

        assert!(!fsm.can_transition(MissionPhase::CheckOrders));
        assert!(!fsm.can_transition(MissionPhase::Charging));
        assert!(fsm.can_transition(MissionPhase::Idle));

        fsm.transition_to(MissionPhase::Idle, PhaseData::at(6.0))
            .unwrap();
        assert!(fsm.is_idle());
    }

    #[test]
    fn test_predicates_delegate_to_phase() {
        let mut fsm = MissionFsm::new();
        assert!(fsm.is_idle());
        assert!(!fsm.is_busy());

        fsm.transition_to(MissionPhase::Charging, PhaseData::at(0.0))
            .unwrap();
        assert!(fsm.is_charging());
        assert_eq!(fsm.server_phase_name(), "UNKNOWN");
    }
}
