//! Main courier-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Motion and energy simulation update
//!         - Battery supervision
//!         - Telemetry to the backend
//!         - Mission phase processing
//!
//! One [`MissionMgr`] owns the robot state, the phase state machine and the
//! motion engine, and is stepped once per cycle with the session-elapsed
//! time. The backend and the vehicle hardware are reached through the
//! `comms_if` collaborator traits; this executable wires in the simulated
//! implementations so the full delivery loop runs with no network or GPIO
//! attached.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::telemetry::TelemetryReporter;
use courier_lib::{
    energy::{EnergyModel, EnergyParams},
    geo::LatLon,
    mission::{Collaborators, MissionMgr},
    motion::{MotionEngine, MotionParams},
    robot::{RobotParams, RobotState},
    sim::{LogDisplay, SimHardware, SimOrderSource, SimParams, SimTelemetry},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.5;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("courier_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Courier Delivery Robot Executable\n");
    info!("Started at: {}", chrono::Utc::now());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let robot_params: RobotParams =
        util::params::load("robot.toml").wrap_err("Could not load robot params")?;
    let motion_params: MotionParams =
        util::params::load("motion.toml").wrap_err("Could not load motion params")?;
    let energy_params: EnergyParams =
        util::params::load("energy.toml").wrap_err("Could not load energy params")?;
    let sim_params: SimParams =
        util::params::load("sim.toml").wrap_err("Could not load sim params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut robot = RobotState::from_params(&robot_params);
    let motion = MotionEngine::new(motion_params);
    let energy = EnergyModel::new(energy_params);

    let orders = SimOrderSource::new(&sim_params.nodes, &sim_params.orders)
        .wrap_err("Failed to initialise the simulated order source")?;
    let mut telemetry = SimTelemetry::new(&sim_params.nodes);
    let hardware = SimHardware::new(sim_params.confirm_after_polls);

    info!(
        "Simulated backend initialised with {} node(s) and {} scripted order(s)",
        sim_params.nodes.len(),
        sim_params.orders.len()
    );

    // Take the start position from the backend's start node when it is known
    if let Some(node) = robot_params.start_node_id {
        match telemetry.fetch_node_coordinates(node) {
            Ok(Some((lat, lon))) => {
                info!(
                    "Start position from node {}: ({:.6}, {:.6})",
                    node, lat, lon
                );
                robot.set_location(LatLon { lat_deg: lat, lon_deg: lon }, Some(node));
            }
            Ok(None) => warn!("Start node {} unknown, using configured position", node),
            Err(e) => warn!("Could not fetch start node {}: {}", node, e),
        }
    }

    let mut mgr = MissionMgr::init(
        "mission.toml",
        robot,
        motion,
        energy,
        Collaborators {
            orders,
            telemetry,
            hardware,
            display: LogDisplay,
        },
    )
    .wrap_err("Failed to initialise MissionMgr")?;

    // Initial forced telemetry so the backend sees the robot come up
    let packet = mgr.robot.telemetry_packet();
    if let Err(e) = mgr.telemetry.send_status(&packet, true) {
        warn!("Initial telemetry failed: {}", e);
    }

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut num_cycles: u64 = 0;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        let now_s = util::session::get_elapsed_seconds();

        mgr.step(now_s);

        // Stop once the script is done and the robot is back to rest
        if mgr.orders.is_exhausted() && mgr.is_quiescent() {
            info!("All scripted orders closed, stopping");
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
            }
        }

        num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!(
        "End of execution: {} delivery(ies) over {} cycles",
        mgr.completed_missions(),
        num_cycles
    );

    Ok(())
}
