//! Main drive executable entry point.
//!
//! # Architecture
//!
//! Runs an autonomous leg script against the simulated drivetrain:
//!
//!     - Initialise the session, logger and parameters
//!     - Load the leg script, either from the command line or chosen by the
//!       autonomous configuration
//!     - Main loop:
//!         - Leg sequencer processing
//!         - Status report archiving
//!         - Simulation step
//!
//! The loop ends when the script is finished or the autonomous period runs
//! out.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use color_eyre::{Report, eyre::{WrapErr, eyre}};
use structopt::StructOpt;

// Internal
use drive_lib::{
    auto_config::AutoConfig,
    drive_ctrl::{LogSink, MecanumDrive, Params},
    sequencer::{LegSequencer, SeqStatus},
    sim::{SimParams, SimWorld},
};
use util::{
    archive::Archiver,
    host,
    logger::{logger_init, LevelFilter, LogLevels},
    session::Session,
    script_interpreter::ScriptInterpreter,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Length of the autonomous period, after which motion is cancelled.
const AUTO_PERIOD_S: f64 = 30.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "drive_exec", about = "Run an autonomous leg script on the simulated drivetrain")]
struct Opt {
    /// Leg script to run. If not given the script is chosen from the alliance,
    /// start position and park location in `auto_config.toml`.
    #[structopt(parse(from_os_str))]
    script: Option<PathBuf>,

    /// Minimum log level, at least `info`.
    #[structopt(short, long, default_value = "info")]
    log_level: LevelFilter,

    /// Level for the drive status lines, written to the log file only. Use
    /// `debug` to record them.
    #[structopt(short, long, default_value = "off")]
    status_level: LevelFilter,

    /// Run cycles back to back instead of in real time.
    #[structopt(short, long)]
    fast: bool,
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
    let session = Session::new(
        "drive_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(
        LogLevels {
            min: opt.log_level,
            status: opt.status_level,
        },
        &session
    )
        .wrap_err("Failed to initialise logging")?;

    info!("Mecanum Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let drive_params = Params::load("drive_ctrl.toml")
        .wrap_err("Could not load drive control params")?;
    let auto_config = AutoConfig::load("auto_config.toml")
        .wrap_err("Could not load the autonomous configuration")?;
    let sim_params: SimParams = util::params::load("sim.toml")
        .wrap_err("Could not load simulation params")?;

    info!("Autonomous configuration: {:?}", auto_config);
    info!("Autonomous objectives: {}", auto_config.objectives());

    // ---- LOAD SCRIPT ----

    let script_path = match opt.script {
        Some(ref p) => p.clone(),
        None => {
            let names = auto_config.script_names();
            if names.is_empty() {
                return Err(eyre!(
                    "No script given and no start position selected in the autonomous configuration"
                ));
            }

            let scripts_dir = host::get_sw_root()
                .wrap_err("Could not find the software root")?
                .join("scripts");

            let path = names
                .iter()
                .map(|n| scripts_dir.join(n))
                .find(|p| p.exists())
                .ok_or_else(|| eyre!("None of the scripts {:?} exist in {:?}", names, scripts_dir))?;

            if !path.ends_with(&names[0]) {
                info!("No {} script, falling back to the start position script", names[0]);
            }

            path
        }
    };

    info!("Loading script from {:?}", script_path);

    let si = ScriptInterpreter::new(&script_path)
        .wrap_err("Failed to load script")?;

    let num_legs = si.get_num_legs();

    info!(
        "Loaded script contains {} legs and {:.02} s of pauses\n",
        num_legs,
        si.get_total_pause()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let world = SimWorld::new(sim_params);

    let mut drive = MecanumDrive::new(
        drive_params,
        world.wheels(),
        world.imu(),
        world.clock()
    ).with_status_sink(Box::new(LogSink));
    info!("DriveCtrl init complete");

    let mut sequencer = LegSequencer::new(si)
        .with_start_delay(auto_config.delay_start_s());

    let mut archiver = Archiver::from_path(&session, "drive_ctrl/status.csv")
        .map_err(|e| eyre!("Failed to create the status archive: {}", e))?;

    info!("Module initialisation complete\n");

    // Motion is allowed for the length of the autonomous period
    let active = || world.time_s() < AUTO_PERIOD_S;

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(CYCLE_PERIOD_S);
    let mut num_cycles: u64 = 0;

    let status = loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- CONTROL ALGORITHM PROCESSING ----

        let status = sequencer.step(&mut drive, &active);

        // ---- WRITE ARCHIVES ----

        if let Err(e) = archiver.serialise(drive.report()) {
            warn!("Could not archive the DriveCtrl status report: {}", e);
        }

        match status {
            SeqStatus::Finished | SeqStatus::Cancelled => break status,
            _ => ()
        }

        // ---- SIMULATION ----

        world.advance(CYCLE_PERIOD_S);

        // ---- CYCLE MANAGEMENT ----

        num_cycles += 1;

        if opt.fast {
            continue;
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
            )
        }
    };

    // ---- SHUTDOWN ----

    info!(
        "Sequence {:?} after {} of {} legs, {} cycles, {:.2} s",
        status,
        sequencer.legs_done(),
        num_legs,
        num_cycles,
        world.time_s()
    );
    info!(
        "Final heading {:.2} deg, mean wheel travel {:.2} in",
        world.heading_deg(),
        world.mean_travel_in()
    );

    info!("End of execution");

    Ok(())
}
