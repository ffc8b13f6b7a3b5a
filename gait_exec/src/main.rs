//! Main gait executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Operator input acquisition (from an input script)
//!         - Gait control processing
//!         - Request handling
//!         - Demands output
//!
//! The actuation side is not connected here, demands are logged in the controller's text
//! protocol instead.
//!
//! # Modules
//!
//! All modules (e.g. `gait_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::CtrlCmd;
use gait_lib::{
    data_store::DataStore,
    gait_ctrl::{InitData, Request},
    params::GaitExecParams,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
    time::cycle_period_s,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options
#[derive(Debug, StructOpt)]
#[structopt(name = "gait_exec", about = "Quadruped gait control executable")]
struct Opt {
    /// Input script to replay
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Log debug messages, including every demand sent
    #[structopt(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("gait_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = match opt.verbose {
        true => LevelFilter::Debug,
        false => LevelFilter::Info,
    };
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Quadruped Gait Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: GaitExecParams =
        util::params::load("gait_exec.toml").wrap_err("Could not load exec params")?;
    exec_params.validate().wrap_err("Invalid exec params")?;

    info!(
        "Exec parameters loaded, running at {:.1} Hz",
        exec_params.cycle_frequency_hz
    );

    let cycle_period = Duration::from_secs_f64(cycle_period_s(exec_params.cycle_frequency_hz));

    // ---- INITIALISE INPUT SOURCE ----

    info!("Loading script from {:?}", opt.script);

    let mut si = ScriptInterpreter::new(&opt.script).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        si.get_duration(),
        si.get_num_tcs()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.gait_ctrl
        .init(
            InitData {
                params_path: "gait_ctrl.toml".to_string(),
                archive: exec_params.archive_frames,
            },
            &session,
        )
        .wrap_err("Failed to initialise GaitCtrl")?;
    info!("GaitCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- ENABLE ACTUATION ----

    info!("Actuation: {}", CtrlCmd::EnableTorque.to_ctrl_string());
    ds.torque_on = true;

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(exec_params.cycle_frequency_hz);

        // ---- INPUT ACQUISITION ----

        match si.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tcs) => {
                if tcs.len() > 1 {
                    debug!("{} TCs due this cycle, only the last is used", tcs.len());
                }

                // The latest input is held until the next one arrives
                if let Some(tc) = tcs.into_iter().last() {
                    debug!("New input: {:?}", tc);
                    ds.gait_ctrl_input.tc = tc;
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of input script reached, stopping");
                break;
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // GaitCtrl processing
        match ds.gait_ctrl.proc(&ds.gait_ctrl_input) {
            Ok((o, r)) => {
                ds.gait_ctrl_output = o;
                ds.gait_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during GaitCtrl processing: {}", e),
        };

        if ds.is_1_hz_cycle {
            info!(
                "Gait {} {}, phase {}",
                ds.gait_ctrl_status_rpt.gait.as_deref().unwrap_or("-"),
                match ds.gait_ctrl_status_rpt.requested {
                    Some(d) => format!("moving {}", d),
                    None => "idle".to_string(),
                },
                ds.gait_ctrl_status_rpt.phase
            );
        }

        // ---- REQUEST HANDLING ----

        for request in ds.gait_ctrl_output.requests.clone() {
            match (request, request.ctrl_cmd()) {
                (_, Some(cmd)) => info!("Actuation: {}", cmd.to_ctrl_string()),
                (Request::Exit, _) => ds.request_exit("operator exit"),
                (Request::FinishRecording, _) => info!("Recording finished"),
                (r, None) => info!("{:?} routine requested", r),
            }
        }

        // ---- DEMANDS OUTPUT ----

        if let Some(dems) = ds.gait_ctrl_output.dems {
            debug!("Actuation: {}", dems.to_ctrl_string(ds.torque_on));
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.gait_ctrl.write() {
            warn!("Could not archive GaitCtrl frame: {}", e);
        }

        ds.cycle_end();

        if ds.exit {
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;

                if ds.num_consec_cycle_overruns > exec_params.max_consec_cycle_overruns {
                    return Err(eyre!(
                        "More than {} consecutive cycle overruns",
                        exec_params.max_consec_cycle_overruns
                    ));
                }
            }
        }
    }

    // ---- SHUTDOWN ----

    info!("Actuation: {}", CtrlCmd::DisableTorque.to_ctrl_string());
    ds.torque_on = false;

    info!("End of execution after {} cycles", ds.num_cycles);
    session.exit();

    Ok(())
}
