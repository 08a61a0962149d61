//! # Teleoperation Executable
//!
//! Reads the operator's gamepad, maps it into wheel speed commands through
//! the drive control module, and streams the commands to the vehicle over a
//! serial link at a fixed cycle rate.
//!
//! Run with `--test-mode` to log the commands instead of sending them, which
//! allows the control chain to be exercised without the vehicle attached.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use color_eyre::{eyre::eyre, eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal imports
use comms_if::eqpt::WheelCmd;
use comms_if::input::{InputFrame, InputMap};
use teleop_lib::data_store::DataStore;
use teleop_lib::gamepad_client::GamepadClient;
use teleop_lib::serial_client::SerialClient;
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Period of the teleoperation cycle.
///
/// Units: seconds
const CYCLE_PERIOD_S: f64 = 0.05;

/// Maximum number of consecutive command send failures before the executable
/// aborts.
const MAX_CONSEC_SEND_ERRORS: u64 = 5;

/// Maximum number of consecutive cycle overruns before the executable
/// aborts. 100 overruns is 5 s of a wedged loop at the nominal period.
const MAX_CONSEC_CYCLE_OVERRUNS: u64 = 100;

// ---------------------------------------------------------------------------
// ARGUMENTS
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "teleop_exec", about = "Vehicle teleoperation executable")]
struct Opt {
    /// Serial device connected to the vehicle's motor controller
    #[structopt(short, long, default_value = "/dev/ttyUSB0", parse(from_os_str))]
    device: PathBuf,

    /// Log commands instead of sending them over the serial link
    #[structopt(short, long)]
    test_mode: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // Initialise the session and logger
    let session =
        Session::new("teleop_exec", "sessions").wrap_err("Failed to initialise the session")?;
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise the logger")?;

    info!("Teleoperation Executable");
    info!("Session directory: {:?}\n", session.session_root);

    // Initialise the drive control module
    let mut ds = DataStore::default();
    ds.drive_ctrl
        .init("drive_ctrl.toml", &session)
        .wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl initialisation complete");

    // Acquire the input device
    let mut gamepad = GamepadClient::new().wrap_err("Failed to acquire the gamepad")?;

    // Open the command link, unless running in test mode
    let mut serial = if opt.test_mode {
        info!("Test mode active, commands will be logged, not sent");
        None
    } else {
        let client = SerialClient::new(&opt.device)
            .wrap_err("Failed to open the serial device")?;
        info!("Serial link open on {:?}", opt.device);
        Some(client)
    };

    // Interrupt handler, the main loop exits cleanly on ctrl-c
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let flag = interrupted.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .wrap_err("Failed to set the interrupt handler")?;
    }

    info!("Beginning main loop\n");

    let loop_result = run_loop(&mut ds, &mut gamepad, &mut serial, &interrupted);

    // Bring the vehicle to rest whichever way the loop ended
    if let Some(ref mut client) = serial {
        match client.send_cmd(&WheelCmd::stop()) {
            Ok(()) => info!("Stop command sent"),
            Err(e) => warn!("Could not send the final stop command: {}", e),
        }
    }

    loop_result?;

    info!("End of execution");

    Ok(())
}

/// Main teleoperation loop.
///
/// Runs until interrupted, or until the serial link fails repeatedly.
fn run_loop(
    ds: &mut DataStore,
    gamepad: &mut GamepadClient,
    serial: &mut Option<SerialClient>,
    interrupted: &AtomicBool,
) -> Result<(), Report> {
    let cycle_period = Duration::from_secs_f64(CYCLE_PERIOD_S);

    while !interrupted.load(Ordering::SeqCst) {
        let cycle_start_instant = Instant::now();

        // Data input
        ds.drive_ctrl_input = gamepad.poll();

        // Control processing
        match ds.drive_ctrl.proc(&ds.drive_ctrl_input) {
            Ok((output, report)) => {
                ds.drive_ctrl_output = output;
                ds.drive_ctrl_status_rpt = report;
            }
            Err(e) => warn!("Error during DriveCtrl processing: {}", e),
        }

        // Command output. The send flushes, so the command is on the wire
        // before this cycle's sleep.
        match serial {
            Some(client) => match client.send_cmd(&ds.drive_ctrl_output) {
                Ok(()) => ds.num_consec_send_errors = 0,
                Err(e) => {
                    warn!("Could not send the wheel command: {}", e);
                    ds.num_consec_send_errors += 1;

                    if ds.num_consec_send_errors > MAX_CONSEC_SEND_ERRORS {
                        return Err(eyre!(
                            "Serial link lost ({} consecutive send failures)",
                            ds.num_consec_send_errors
                        ));
                    }
                }
            },
            None => debug!(
                "{}",
                test_mode_line(
                    &ds.drive_ctrl_output,
                    &ds.drive_ctrl_input,
                    &ds.drive_ctrl.params.input_map
                )
            ),
        }

        // Write archives
        if let Err(e) = ds.drive_ctrl.write() {
            warn!("Could not write the DriveCtrl archive: {}", e);
        }

        // Cycle management
        let cycle_dur = Instant::now() - cycle_start_instant;
        manage_cycle(ds, cycle_dur, cycle_period)?;
    }

    info!("Interrupt received, stopping");

    Ok(())
}

/// End-of-cycle management: sleep out the remaining cycle slot, or account
/// the overrun. A loop which cannot hold its period for
/// `MAX_CONSEC_CYCLE_OVERRUNS` cycles in a row aborts, like a failing serial
/// link does.
fn manage_cycle(
    ds: &mut DataStore,
    cycle_dur: Duration,
    cycle_period: Duration,
) -> Result<(), Report> {
    match cycle_period.checked_sub(cycle_dur) {
        Some(remaining) => {
            ds.num_consec_cycle_overruns = 0;
            thread::sleep(remaining);
        }
        None => {
            warn!(
                "Cycle overran by {:.6} s",
                (cycle_dur - cycle_period).as_secs_f64()
            );
            ds.num_consec_cycle_overruns += 1;

            if ds.num_consec_cycle_overruns > MAX_CONSEC_CYCLE_OVERRUNS {
                return Err(eyre!(
                    "Cannot hold the cycle period ({} consecutive overruns)",
                    ds.num_consec_cycle_overruns
                ));
            }
        }
    }

    ds.num_cycles += 1;

    Ok(())
}

/// Line logged in place of a serial send in test mode, showing the command
/// alongside the raw drive inputs which produced it.
fn test_mode_line(cmd: &WheelCmd, frame: &InputFrame, input_map: &InputMap) -> String {
    format!(
        "{} (fwd: {:.2}, rev: {:.2}, steer: {:.2})",
        cmd.to_step_line().trim_end(),
        frame.axis(input_map.forward_axis),
        frame.axis(input_map.reverse_axis),
        frame.axis(input_map.steering_axis)
    )
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_overrun_limit_aborts() {
        let mut ds = DataStore::default();
        let period = Duration::from_micros(10);
        let long_cycle = Duration::from_micros(20);

        // Repeated overruns are tolerated up to the limit
        for _ in 0..MAX_CONSEC_CYCLE_OVERRUNS {
            manage_cycle(&mut ds, long_cycle, period).unwrap();
        }

        assert!(manage_cycle(&mut ds, long_cycle, period).is_err());
    }

    #[test]
    fn test_on_time_cycle_resets_overrun_count() {
        let mut ds = DataStore::default();
        let period = Duration::from_micros(10);

        manage_cycle(&mut ds, Duration::from_micros(20), period).unwrap();
        assert_eq!(ds.num_consec_cycle_overruns, 1);

        manage_cycle(&mut ds, Duration::from_micros(5), period).unwrap();
        assert_eq!(ds.num_consec_cycle_overruns, 0);
        assert_eq!(ds.num_cycles, 2);
    }

    #[test]
    fn test_test_mode_line_shows_inputs() {
        let mut frame = InputFrame {
            axes: vec![0.0; 6],
            buttons: vec![false; 11],
            hats: vec![(0, 0)],
        };
        frame.axes[5] = 1.0;
        frame.axes[2] = -1.0;
        frame.axes[0] = 0.25;

        let line = test_mode_line(
            &WheelCmd::new(60.0, -60.0),
            &frame,
            &InputMap::default(),
        );

        assert_eq!(
            line,
            "STEP R-60.00 L60.00 (fwd: 1.00, rev: -1.00, steer: 0.25)"
        );
    }
}
