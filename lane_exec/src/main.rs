//! Main lane following executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop, once per frame:
//!         - Telecommand processing and handling
//!         - Frame acquisition from the frame source
//!         - Lane detection processing
//!         - Steering control processing
//!         - Drive output
//!         - Archiving
//!
//! The loop ends when the frame source runs out of frames.
//!
//! # Telecommands
//!
//! Telecommands are read as JSON, one per line, from stdin. For example
//! `{"type": "SteerCtrl", "payload": {"cmd": "SetGains", "k_p": 0.01, "k_i": 0.0, "k_d": 0.002}}`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::{WrapErr, eyre}};
use log::{debug, info, warn};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::tc::Tc;
use lane_lib::{
    data_store::{DataStore, SafeModeCause},
    drive::{DriveCtrl, LogSink},
    frame_src::{FrameSource, ImageDirSource},
    lane_det,
    params::LaneExecParams,
    steer_ctrl,
};
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive frame overruns after which a warning is raised.
const MAX_CONSEC_OVERRUNS: u64 = 10;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Lane following executable
#[derive(Debug, StructOpt)]
#[structopt(name = "lane_exec")]
struct Opts {
    /// Executable parameter file, relative to the params directory
    #[structopt(short, long, default_value = "lane_exec.toml")]
    params: String,

    /// Directory of frames to process, overrides the one in the parameters
    #[structopt(short, long, parse(from_os_str))]
    frames_dir: Option<PathBuf>,

    /// Stop after this many frames
    #[structopt(short = "n", long)]
    max_frames: Option<u64>,

    /// Minimum level of log records (info, debug or trace)
    #[structopt(short, long, default_value = "trace")]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "lane_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opts.log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Lane Following Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let params: LaneExecParams = util::params::load(&opts.params)
        .wrap_err("Could not load exec params")?;

    if !(params.frame_period_s > 0.0 && params.frame_period_s.is_finite()) {
        return Err(eyre!(
            "Expected a positive frame period, found {}", params.frame_period_s
        ));
    }

    info!("Exec parameters loaded");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.lane_det.init(params.lane_det_params.clone(), &session)
        .wrap_err("Failed to initialise LaneDet")?;
    info!("{} init complete", lane_det::LaneDet::NAME);

    ds.steer_ctrl.init(params.steer_ctrl_params.clone(), &session)
        .wrap_err("Failed to initialise SteerCtrl")?;
    info!("{} init complete", steer_ctrl::SteerCtrl::NAME);

    let drive = DriveCtrl::new(&params.drive)
        .wrap_err("Failed to initialise the drive output")?;
    let mut pwm_sink = LogSink::new();
    info!("Drive output init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE FRAME SOURCE ----

    let frames_dir = match opts.frames_dir {
        Some(d) => d,
        None => {
            let dir = PathBuf::from(&params.frames_dir);
            if dir.is_absolute() {
                dir
            }
            else {
                host::get_lane_sw_root()
                    .wrap_err("The software root environment variable is not set")?
                    .join(dir)
            }
        }
    };

    let mut frame_src = ImageDirSource::new(&frames_dir)
        .wrap_err("Failed to initialise the frame source")?;

    // ---- INITIALISE TC SOURCE ----

    let tc_rx = spawn_tc_reader();

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut last_steer_instant: Option<Instant> = None;

    loop {

        if let Some(max) = opts.max_frames {
            if ds.num_frames >= max {
                info!("Frame limit ({}) reached, stopping", max);
                break;
            }
        }

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start();

        // ---- TELECOMMAND PROCESSING ----

        while let Ok(tc) = tc_rx.try_recv() {
            let response = tc_processor::exec(&mut ds, &tc);

            // Responses are reported as JSON so they can be read back by the operator
            match serde_json::to_string(&response) {
                Ok(r) => info!("TC response: {}", r),
                Err(e) => warn!("Could not serialise the response to {:?}: {}", tc, e)
            }
        }

        // ---- FRAME ACQUISITION ----

        let frame = match frame_src.next_frame()
            .wrap_err("Failed to get the next frame")?
        {
            Some(f) => f,
            None => {
                info!("End of frames reached, stopping");
                break;
            }
        };

        // ---- LANE DETECTION ----

        let (lane, lane_rpt) = ds.lane_det
            .proc(&lane_det::InputData { frame })
            .wrap_err_with(|| format!("LaneDet failed on frame {}", ds.num_frames))?;
        ds.lane_det_status_rpt = lane_rpt;

        // ---- STEERING CONTROL ----

        let now = Instant::now();
        let dt_s = match last_steer_instant {
            Some(t) => (now - t).as_secs_f64(),
            None => params.frame_period_s
        };
        last_steer_instant = Some(now);

        match ds.steer_ctrl.proc(&steer_ctrl::InputData { lane: lane.clone(), dt_s }) {
            Ok((o, r)) => {
                ds.steer_ctrl_output = o;
                ds.steer_ctrl_status_rpt = r;
            },
            Err(e) => warn!("Error during SteerCtrl processing: {}", e)
        }
        ds.lane_det_output = Some(lane);

        // ---- DRIVE OUTPUT ----

        let drive_result = if ds.safe {
            drive.stop(&mut pwm_sink)
        }
        else {
            ds.drive_dems = drive.demands(ds.steer_ctrl_output.steer_dem, ds.safe);
            drive.actuate(&mut pwm_sink, &ds.drive_dems)
        };

        if let Err(e) = drive_result {
            warn!("Drive output error: {}", e);
            ds.make_safe(SafeModeCause::DriveError);
        }

        // ---- WRITE ARCHIVES ----

        if params.archive {
            if let Err(e) = ds.lane_det.write() {
                warn!("Could not write the LaneDet archive: {}", e);
            }
            if let Err(e) = ds.steer_ctrl.write() {
                warn!("Could not write the SteerCtrl archive: {}", e);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(params.frame_period_s)
            .checked_sub(cycle_dur)
        {
            Some(d) => {
                ds.num_consec_frame_overruns = 0;
                thread::sleep(d);
            },
            None => {
                debug!(
                    "Frame overran by {:.06} s",
                    cycle_dur.as_secs_f64() - params.frame_period_s
                );
                ds.num_consec_frame_overruns += 1;

                if ds.num_consec_frame_overruns == MAX_CONSEC_OVERRUNS {
                    warn!(
                        "{} consecutive frames have overrun the {} s frame period",
                        MAX_CONSEC_OVERRUNS,
                        params.frame_period_s
                    );
                }
            }
        }

        ds.num_frames += 1;
    }

    // ---- SHUTDOWN ----

    drive.stop(&mut pwm_sink)
        .wrap_err("Failed to stop the drive output")?;

    info!("Processed {} frames", ds.num_frames);
    info!("End of execution");

    Ok(())
}

/// Start a thread which reads telecommands from stdin.
///
/// Lines which do not parse are reported and dropped. The thread ends when
/// stdin is closed.
fn spawn_tc_reader() -> Receiver<Tc> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!("Could not read from stdin: {}", e);
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match Tc::from_json(&line) {
                Ok(tc) => {
                    if tx.send(tc).is_err() {
                        break;
                    }
                },
                Err(e) => warn!("Could not parse TC: {}", e)
            }
        }
    });

    rx
}
