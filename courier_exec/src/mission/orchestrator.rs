//! # Mission orchestrator
//!
//! [`MissionMgr`] drives one delivery at a time: each cycle it polls the
//! motion engine for arrivals, watches the battery, pushes telemetry and
//! dispatches the handler for the current phase. Handlers talk to the
//! collaborators (orders, telemetry, hardware, display), arm new motion
//! destinations and request phase transitions; a handler failure is caught
//! and routed into the ERROR phase rather than killing the control loop.
//!
//! The orchestrator exclusively owns the robot state and the active mission
//! for the lifetime of the loop, so no locking is needed anywhere in the
//! core.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use comms_if::display::DisplayNotifier;
use comms_if::hardware::HardwareActuator;
use comms_if::orders::OrderProvider;
use comms_if::telemetry::{RobotStatus, TelemetryReporter};
use log::{error, info, warn};

// Internal
use super::{Mission, MissionError, MissionFsm, MissionParams, MissionPhase, PhaseData};
use crate::energy::EnergyModel;
use crate::geo::{self, LatLon};
use crate::motion::{MotionEngine, MotionUpdate};
use crate::robot::{Destination, RobotState};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The external collaborators the orchestrator talks to.
pub struct Collaborators<O, T, H, D> {
    pub orders: O,
    pub telemetry: T,
    pub hardware: H,
    pub display: D,
}

/// Mission orchestrator.
///
/// Owns the robot state, the phase state machine, the motion engine and the
/// active mission, and is stepped once per control cycle.
pub struct MissionMgr<O, T, H, D> {
    pub params: MissionParams,

    pub fsm: MissionFsm,
    pub motion: MotionEngine,
    pub energy: EnergyModel,
    pub robot: RobotState,

    /// The delivery in progress, if any
    mission: Option<Mission>,

    // Collaborators
    pub orders: O,
    pub telemetry: T,
    pub hardware: H,
    pub display: D,

    /// True while the battery is connected to a (possibly simulated) charger
    charging: bool,

    /// Session time of the last order check.
    ///
    /// Units: seconds
    last_order_check_s: f64,

    /// Session time of the last routine telemetry push.
    ///
    /// Units: seconds
    last_telemetry_s: f64,

    /// Session time of the previous step, for charge integration.
    ///
    /// Units: seconds
    last_step_s: f64,

    /// Number of deliveries completed this run
    completed_missions: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<O, T, H, D> MissionMgr<O, T, H, D>
where
    O: OrderProvider,
    T: TelemetryReporter,
    H: HardwareActuator,
    D: DisplayNotifier,
{
    /// Initialise the orchestrator, loading its parameters from the given
    /// file.
    pub fn init(
        params_path: &str,
        robot: RobotState,
        motion: MotionEngine,
        energy: EnergyModel,
        collab: Collaborators<O, T, H, D>,
    ) -> Result<Self, MissionError> {
        let params: MissionParams = match util::params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(MissionError::ParamLoadError(e)),
        };

        Ok(Self::new(params, robot, motion, energy, collab))
    }

    pub fn new(
        params: MissionParams,
        robot: RobotState,
        motion: MotionEngine,
        energy: EnergyModel,
        collab: Collaborators<O, T, H, D>,
    ) -> Self {
        Self {
            params,
            fsm: MissionFsm::new(),
            motion,
            energy,
            robot,
            mission: None,
            orders: collab.orders,
            telemetry: collab.telemetry,
            hardware: collab.hardware,
            display: collab.display,
            charging: false,
            last_order_check_s: 0.0,
            last_telemetry_s: 0.0,
            last_step_s: 0.0,
            completed_missions: 0,
        }
    }

    /// The delivery in progress, if any.
    pub fn mission(&self) -> Option<&Mission> {
        self.mission.as_ref()
    }

    pub fn completed_missions(&self) -> u64 {
        self.completed_missions
    }

    /// True when there is nothing left to do: idle phase, no target armed
    /// and no mission owned.
    pub fn is_quiescent(&self) -> bool {
        self.fsm.is_idle() && !self.motion.is_moving() && self.mission.is_none()
    }

    /// Run one orchestration cycle.
    ///
    /// Never panics and never propagates a handler failure: faults land the
    /// machine in the ERROR phase, from which it recovers by itself.
    pub fn step(&mut self, now_s: f64) {
        // Poll the motion engine and map arrivals onto phase transitions
        if self.motion.tick(&mut self.robot, &self.energy, now_s) == MotionUpdate::Arrived {
            self.handle_arrival(now_s);
        }

        // Integrate charging over the elapsed cycle
        if self.charging {
            self.energy.recharge(&mut self.robot, now_s - self.last_step_s);
        }

        // Emergency battery check. The escape edge to CHARGING is declared
        // on every busy phase, so the forced transition is still validated
        // against the graph.
        if self.energy.is_low(&self.robot)
            && !self.charging
            && !self.fsm.is_charging()
            && self.fsm.can_transition(MissionPhase::Charging)
        {
            self.handle_emergency_battery(now_s);
        }

        // Routine telemetry
        if now_s - self.last_telemetry_s >= self.params.telemetry_interval_s {
            self.send_telemetry(false, now_s);
        }

        // Dispatch the current phase's handler, catching failures
        if let Err(e) = self.dispatch(now_s) {
            error!("Handler for phase {} failed: {}", self.fsm.current(), e);
            self.fsm.handle_error(&e.to_string(), now_s);
        }

        self.last_step_s = now_s;
    }

    // --------------------------------------------------------------------------------------------
    // CYCLE-LEVEL ACTIONS
    // --------------------------------------------------------------------------------------------

    /// Map an arrival signal onto the matching at-destination phase.
    fn handle_arrival(&mut self, now_s: f64) {
        let next = match self.fsm.current() {
            MissionPhase::FlightToPickup => MissionPhase::AtPickup,
            MissionPhase::FlightToDropoff => MissionPhase::AtDropoff,
            MissionPhase::FlightToCharging => MissionPhase::AtChargingStation,
            phase => {
                warn!("Arrival signalled in phase {}, ignoring", phase);
                return;
            }
        };

        if let Err(e) = self.advance(next, PhaseData::at(now_s)) {
            warn!("Could not apply arrival transition: {}", e);
        }
    }

    /// Abort whatever is happening and charge in place. The robot cannot be
    /// trusted to reach the charging station on a critical battery, so this
    /// mirrors a landed emergency charge.
    fn handle_emergency_battery(&mut self, now_s: f64) {
        warn!(
            "Battery critical at {:.1}%, emergency charge",
            self.robot.battery_percent()
        );

        if let Some(mission) = self.mission.take() {
            if let Err(e) = self
                .orders
                .cancel(mission.order_id, "Emergency: battery low")
            {
                warn!("Could not cancel order {}: {}", mission.order_id, e);
            }
        }

        self.motion.stop(&mut self.robot);
        if let Err(e) = self.hardware.stop_motors() {
            warn!("Could not stop motors: {}", e);
        }

        self.robot.complete_delivery();
        self.robot.status = RobotStatus::Charging;
        self.charging = true;

        self.send_telemetry(true, now_s);

        if let Err(e) = self.advance(MissionPhase::Charging, PhaseData::at(now_s)) {
            warn!("Could not apply emergency transition: {}", e);
        }
    }

    /// Push a status update, always notifying the display.
    fn send_telemetry(&mut self, force: bool, now_s: f64) {
        self.display.notify_battery(self.robot.battery_percent());

        let packet = self.robot.telemetry_packet();
        match self.telemetry.send_status(&packet, force) {
            Ok(()) => self.last_telemetry_s = now_s,
            Err(e) => warn!("Telemetry update failed: {}", e),
        }
    }

    /// Transition the FSM, notify the display of the new phase and report it
    /// to the backend when it is one the backend tracks on entry.
    fn advance(&mut self, to: MissionPhase, data: PhaseData) -> Result<(), MissionError> {
        self.fsm.transition_to(to, data)?;
        self.display.notify_phase(&to.to_string());

        if self.fsm.should_notify_server() {
            self.report_phase();
        }

        Ok(())
    }

    /// Report the current phase for the active order.
    ///
    /// A failed report is only warned about: the backend learns the phase at
    /// the next report anyway.
    fn report_phase(&mut self) {
        let order_id = match self.mission.as_ref() {
            Some(m) => m.order_id,
            None => return,
        };

        let name = self.fsm.server_phase_name();
        if let Err(e) =
            self.orders
                .report_phase(order_id, name, self.robot.pos.lat_deg, self.robot.pos.lon_deg)
        {
            warn!("Could not report phase {}: {}", name, e);
        }
    }

    // --------------------------------------------------------------------------------------------
    // PHASE HANDLERS
    // --------------------------------------------------------------------------------------------

    fn dispatch(&mut self, now_s: f64) -> Result<(), MissionError> {
        match self.fsm.current() {
            MissionPhase::Idle => self.phase_idle(now_s),
            MissionPhase::CheckOrders => self.phase_check_orders(now_s),
            MissionPhase::OrderAssigned => self.phase_order_assigned(now_s),
            MissionPhase::MotorsOn => self.phase_motors_on(now_s),
            MissionPhase::FlightToPickup => self.phase_flight_to_pickup(),
            MissionPhase::AtPickup => self.phase_at_pickup(now_s),
            MissionPhase::OpenCompartmentPickup => self.phase_open_compartment_pickup(now_s),
            MissionPhase::Loading => self.phase_loading(now_s),
            MissionPhase::CloseCompartmentPickup => self.phase_close_compartment_pickup(now_s),
            MissionPhase::FlightToDropoff => self.phase_flight_to_dropoff(),
            MissionPhase::AtDropoff => self.phase_at_dropoff(now_s),
            MissionPhase::OpenCompartmentDropoff => self.phase_open_compartment_dropoff(now_s),
            MissionPhase::WaitForPickup => self.phase_wait_for_pickup(now_s),
            MissionPhase::PackageDelivered => self.phase_package_delivered(now_s),
            MissionPhase::CloseCompartmentDropoff => self.phase_close_compartment_dropoff(now_s),
            MissionPhase::FlightToCharging => self.phase_flight_to_charging(),
            MissionPhase::AtChargingStation => self.phase_at_charging_station(now_s),
            MissionPhase::Charging => self.phase_charging(now_s),
            MissionPhase::Error => self.phase_error(now_s),
        }
    }

    /// IDLE: wait, checking for new orders at a fixed interval.
    fn phase_idle(&mut self, now_s: f64) -> Result<(), MissionError> {
        if self.robot.status != RobotStatus::Idle {
            self.robot.status = RobotStatus::Idle;
        }

        if now_s - self.last_order_check_s >= self.params.order_check_interval_s {
            self.last_order_check_s = now_s;
            self.advance(MissionPhase::CheckOrders, PhaseData::at(now_s))?;
        }

        Ok(())
    }

    /// CHECK_ORDERS: ask the backend for assigned orders.
    fn phase_check_orders(&mut self, now_s: f64) -> Result<(), MissionError> {
        // A fetch failure is not worth an ERROR entry, the check simply
        // repeats at the next interval
        let assigned = match self.orders.fetch_assigned() {
            Ok(a) => a,
            Err(e) => {
                warn!("Could not fetch orders: {}", e);
                Vec::new()
            }
        };

        match assigned.into_iter().next() {
            Some(order) => {
                info!("Order {} assigned: {}", order.order_id, order.order_name);
                self.advance(
                    MissionPhase::OrderAssigned,
                    PhaseData::with_order(now_s, order),
                )?;
            }
            None => {
                self.advance(MissionPhase::Idle, PhaseData::at(now_s))?;
            }
        }

        Ok(())
    }

    /// ORDER_ASSIGNED: accept the order on the backend and start the mission.
    fn phase_order_assigned(&mut self, now_s: f64) -> Result<(), MissionError> {
        let order = match self.fsm.data().order.clone() {
            Some(o) => o,
            None => return Err(MissionError::MissingPhaseData("order assignment")),
        };

        let mission = Mission::from_assignment(&order);

        // The backend estimate may be absent for ad-hoc orders, fall back to
        // the straight-line legs
        let route_m = if mission.total_distance_m > 0.0 {
            mission.total_distance_m
        } else {
            geo::distance_m(self.robot.pos, mission.pickup.pos)
                + geo::distance_m(mission.pickup.pos, mission.dropoff.pos)
        };

        if !self.energy.can_complete(&self.robot, route_m) {
            warn!(
                "Order {} rejected: {:.0} m route exceeds battery range",
                order.order_id, route_m
            );
            if let Err(e) = self.orders.cancel(order.order_id, "Insufficient battery range") {
                warn!("Could not cancel order {}: {}", order.order_id, e);
            }
            self.advance(MissionPhase::Idle, PhaseData::at(now_s))?;
            return Ok(());
        }

        // An accept failure aborts the mission before it starts
        self.orders.accept(order.order_id)?;

        info!(
            "Order {} started: {} ({:.1} kg), {:.0} m route",
            mission.order_id, mission.name, mission.weight_kg, route_m
        );

        self.robot.start_delivery(mission.order_id);
        self.mission = Some(mission);

        self.advance(MissionPhase::MotorsOn, PhaseData::at(now_s))?;
        Ok(())
    }

    /// MOTORS_ON: spin up and begin the pickup leg.
    fn phase_motors_on(&mut self, now_s: f64) -> Result<(), MissionError> {
        self.hardware.start_motors()?;
        self.advance(MissionPhase::FlightToPickup, PhaseData::at(now_s))?;
        Ok(())
    }

    /// FLIGHT_TO_PICKUP: arm the pickup destination once, then ride the
    /// motion engine until arrival.
    fn phase_flight_to_pickup(&mut self) -> Result<(), MissionError> {
        if self.motion.is_moving() {
            return Ok(());
        }

        let dest = self
            .mission
            .as_ref()
            .map(|m| m.pickup.destination())
            .ok_or(MissionError::NavigationFault("pickup"))?;

        self.motion.set_destination(&mut self.robot, dest);
        self.report_phase();

        Ok(())
    }

    /// AT_PICKUP: land on the pickup node and get ready to load.
    fn phase_at_pickup(&mut self, now_s: f64) -> Result<(), MissionError> {
        if let Some(node) = self.mission.as_ref().and_then(|m| m.pickup.node_id) {
            self.robot.current_node_id = Some(node);
            info!("Arrived at pickup node {}", node);
        }

        self.hardware.stop_motors()?;

        self.advance(MissionPhase::OpenCompartmentPickup, PhaseData::at(now_s))?;
        Ok(())
    }

    fn phase_open_compartment_pickup(&mut self, now_s: f64) -> Result<(), MissionError> {
        self.hardware.open_compartment()?;
        self.advance(MissionPhase::Loading, PhaseData::at(now_s))?;
        Ok(())
    }

    /// LOADING: dwell until the package is assumed loaded.
    fn phase_loading(&mut self, now_s: f64) -> Result<(), MissionError> {
        if now_s - self.fsm.data().entered_at_s >= self.params.loading_dwell_s {
            info!("Package loaded");
            self.advance(MissionPhase::CloseCompartmentPickup, PhaseData::at(now_s))?;
        }

        Ok(())
    }

    fn phase_close_compartment_pickup(&mut self, now_s: f64) -> Result<(), MissionError> {
        self.hardware.close_compartment()?;
        self.advance(MissionPhase::FlightToDropoff, PhaseData::at(now_s))?;
        Ok(())
    }

    /// FLIGHT_TO_DROPOFF: arm the dropoff destination once.
    fn phase_flight_to_dropoff(&mut self) -> Result<(), MissionError> {
        if self.motion.is_moving() {
            return Ok(());
        }

        self.hardware.start_motors()?;

        let dest = self
            .mission
            .as_ref()
            .map(|m| m.dropoff.destination())
            .ok_or(MissionError::NavigationFault("dropoff"))?;

        self.motion.set_destination(&mut self.robot, dest);
        self.report_phase();

        Ok(())
    }

    /// AT_DROPOFF: land on the dropoff node and get ready to unload.
    fn phase_at_dropoff(&mut self, now_s: f64) -> Result<(), MissionError> {
        if let Some(node) = self.mission.as_ref().and_then(|m| m.dropoff.node_id) {
            self.robot.current_node_id = Some(node);
            info!("Arrived at dropoff node {}", node);
        }

        self.hardware.stop_motors()?;

        self.advance(MissionPhase::OpenCompartmentDropoff, PhaseData::at(now_s))?;
        Ok(())
    }

    fn phase_open_compartment_dropoff(&mut self, now_s: f64) -> Result<(), MissionError> {
        self.hardware.open_compartment()?;
        self.advance(MissionPhase::WaitForPickup, PhaseData::at(now_s))?;
        Ok(())
    }

    /// WAIT_FOR_PICKUP: wait for the recipient's confirm press, with a
    /// timeout so an absent recipient cannot strand the robot.
    fn phase_wait_for_pickup(&mut self, now_s: f64) -> Result<(), MissionError> {
        if self.hardware.is_confirm_button_pressed() {
            info!("Package picked up by recipient");
            self.advance(MissionPhase::PackageDelivered, PhaseData::at(now_s))?;
        } else if now_s - self.fsm.data().entered_at_s >= self.params.wait_for_pickup_timeout_s {
            warn!("Recipient confirmation timed out, assuming package taken");
            self.advance(MissionPhase::PackageDelivered, PhaseData::at(now_s))?;
        }

        Ok(())
    }

    /// PACKAGE_DELIVERED: close out the order with the backend.
    fn phase_package_delivered(&mut self, now_s: f64) -> Result<(), MissionError> {
        if let Some(order_id) = self.mission.as_ref().map(|m| m.order_id) {
            // Completion must reach the backend, otherwise the order would
            // dangle as in-progress forever
            self.orders.complete(order_id)?;
            info!("Order {} completed", order_id);
        }

        self.mission = None;
        self.completed_missions += 1;
        self.robot.complete_delivery();

        self.advance(MissionPhase::CloseCompartmentDropoff, PhaseData::at(now_s))?;
        Ok(())
    }

    /// CLOSE_COMPARTMENT_DROPOFF: secure the compartment, then either head
    /// home to charge or idle in place.
    fn phase_close_compartment_dropoff(&mut self, now_s: f64) -> Result<(), MissionError> {
        self.hardware.close_compartment()?;

        if self.robot.battery_percent() < self.params.return_battery_percent {
            self.advance(MissionPhase::FlightToCharging, PhaseData::at(now_s))?;
        } else {
            self.advance(MissionPhase::Idle, PhaseData::at(now_s))?;
        }

        Ok(())
    }

    /// FLIGHT_TO_CHARGING: resolve the charging station node and fly to it.
    fn phase_flight_to_charging(&mut self) -> Result<(), MissionError> {
        if self.motion.is_moving() {
            return Ok(());
        }

        self.hardware.start_motors()?;
        self.robot.status = RobotStatus::Returning;

        let node = self.params.charging_node_id;
        let (lat, lon) = self
            .telemetry
            .fetch_node_coordinates(node)?
            .ok_or(MissionError::NavigationFault("charging station"))?;

        self.motion.set_destination(
            &mut self.robot,
            Destination {
                pos: LatLon { lat_deg: lat, lon_deg: lon },
                node_id: Some(node),
            },
        );

        Ok(())
    }

    /// AT_CHARGING_STATION: dock and start charging.
    fn phase_at_charging_station(&mut self, now_s: f64) -> Result<(), MissionError> {
        self.hardware.stop_motors()?;

        self.charging = true;
        self.robot.status = RobotStatus::Charging;
        info!("Charging started at {:.1}%", self.robot.battery_percent());

        self.send_telemetry(true, now_s);

        self.advance(MissionPhase::Charging, PhaseData::at(now_s))?;
        Ok(())
    }

    /// CHARGING: wait for the battery to fill back up.
    fn phase_charging(&mut self, now_s: f64) -> Result<(), MissionError> {
        if self.energy.is_charge_complete(&self.robot) {
            info!(
                "Charging complete at {:.1}%",
                self.robot.battery_percent()
            );

            self.charging = false;
            self.robot.status = RobotStatus::Idle;
            self.send_telemetry(true, now_s);

            self.advance(MissionPhase::Idle, PhaseData::at(now_s))?;
        }

        Ok(())
    }

    /// ERROR: safe the vehicle, cancel any order, cool down, recover.
    ///
    /// Nothing in here may propagate an error, that would re-enter ERROR
    /// and reset the cool-down forever.
    fn phase_error(&mut self, now_s: f64) -> Result<(), MissionError> {
        if self.motion.is_moving() {
            self.motion.stop(&mut self.robot);
        }

        if let Err(e) = self.hardware.stop_motors() {
            warn!("Could not stop motors: {}", e);
        }
        if let Err(e) = self.hardware.close_compartment() {
            warn!("Could not close compartment: {}", e);
        }

        if let Some(mission) = self.mission.take() {
            let reason = match self.fsm.data().error.as_deref() {
                Some(msg) => format!("Fault: {}", msg),
                None => String::from("Fault: unknown"),
            };

            if let Err(e) = self.orders.cancel(mission.order_id, &reason) {
                warn!("Could not cancel order {}: {}", mission.order_id, e);
            }
        }

        self.charging = false;
        self.robot.complete_delivery();

        if now_s - self.fsm.data().entered_at_s >= self.params.error_cooldown_s {
            info!("Error cool-down elapsed, recovering to IDLE");
            self.advance(MissionPhase::Idle, PhaseData::at(now_s))?;
        }

        Ok(())
    }
}
