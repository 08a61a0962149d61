//! # Simulation Executable
//!
//! Simulates the vehicle's motion under wheel speed commands using the exact
//! unicycle model. Commands come either from the operator's gamepad through
//! the same drive control chain as the teleoperation executable, or from a
//! wheel speed script for repeatable runs.
//!
//! The simulation runs at a fixed timestep, paced to real time, and writes
//! the decimated trajectory into the session archive.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod kinematics;
mod pacer;
mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use structopt::StructOpt;

// Internal imports
use comms_if::eqpt::WheelCmd;
use kinematics::Pose;
use pacer::RealTimePacer;
use teleop_lib::drive_ctrl::DriveCtrl;
use teleop_lib::gamepad_client::GamepadClient;
use util::{
    archive::{Archived, Archiver},
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingCmds, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// ARGUMENTS
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "sim_exec", about = "Vehicle motion simulation executable")]
struct Opt {
    /// Wheel speed script to run. Without a script the simulation is driven
    /// by the gamepad through drive control.
    #[structopt(short, long, parse(from_os_str))]
    script: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Where the simulation's wheel commands come from.
enum CmdSource {
    Gamepad {
        client: GamepadClient,
        drive_ctrl: Box<DriveCtrl>,
    },
    Script {
        interpreter: ScriptInterpreter,
        ended: bool,
    },
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Flat record of one trajectory sample, written to the session archive.
#[derive(Serialize)]
struct TrajRecord {
    sim_time_s: f64,
    x_m: f64,
    y_m: f64,
    heading_rad: f64,
    axle_left_x_m: f64,
    axle_left_y_m: f64,
    axle_right_x_m: f64,
    axle_right_y_m: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // Initialise the session and logger
    let session =
        Session::new("sim_exec", "sessions").wrap_err("Failed to initialise the session")?;
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise the logger")?;

    info!("Simulation Executable");
    info!("Session directory: {:?}\n", session.session_root);

    // Load the simulation parameters
    let sim_params = params::load().wrap_err("Failed to load the simulation parameters")?;

    // Build the command source
    let mut cmd_source = match opt.script {
        Some(ref script_path) => {
            let interpreter = ScriptInterpreter::new(script_path)
                .wrap_err("Failed to load the wheel speed script")?;

            info!(
                "Running script {:?} ({} commands over {} s)",
                script_path,
                interpreter.get_num_cmds(),
                interpreter.get_duration()
            );

            CmdSource::Script {
                interpreter,
                ended: false,
            }
        }
        None => {
            // The simulation uses its own drive parameters, with the wider
            // simulated speed range
            let mut drive_ctrl = Box::new(DriveCtrl::default());
            drive_ctrl
                .init("drive_ctrl_sim.toml", &session)
                .wrap_err("Failed to initialise DriveCtrl")?;
            info!("DriveCtrl initialisation complete");

            let client = GamepadClient::new().wrap_err("Failed to acquire the gamepad")?;

            CmdSource::Gamepad { client, drive_ctrl }
        }
    };

    // Trajectory archive
    let mut arch_traj = Archiver::from_path(&session, "trajectory.csv")
        .wrap_err("Failed to initialise the trajectory archiver")?;

    // Interrupt handler, the simulation exits cleanly on ctrl-c
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let flag = interrupted.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .wrap_err("Failed to set the interrupt handler")?;
    }

    info!(
        "Simulating {} steps of {} s\n",
        sim_params.num_steps, sim_params.dt_s
    );

    // ---- SIMULATION LOOP ----

    let mut pose = Pose::default();
    let mut cmd = WheelCmd::stop();
    let mut pacer = RealTimePacer::new(sim_params.dt_s, sim_params.overhead_budget_s);

    pacer.start();

    for step_count in 0..sim_params.num_steps {
        if interrupted.load(Ordering::SeqCst) {
            info!("Interrupt received, stopping");
            break;
        }

        let sim_time_s = step_count as f64 * sim_params.dt_s;

        // Archives and logs are decimated so that per-cycle I/O stays
        // bounded, integration itself runs every cycle
        let output_due = output_due(step_count, sim_params.output_decimation);

        // Update the held command. The last command issued stays in effect
        // until the source produces a new one.
        match cmd_source {
            CmdSource::Gamepad {
                ref mut client,
                ref mut drive_ctrl,
            } => {
                let frame = client.poll();

                match drive_ctrl.proc(&frame) {
                    Ok((output, _)) => cmd = output,
                    Err(e) => warn!("Error during DriveCtrl processing: {}", e),
                }

                if output_due {
                    if let Err(e) = drive_ctrl.write() {
                        warn!("Could not write the DriveCtrl archive: {}", e);
                    }
                }
            }
            CmdSource::Script {
                ref mut interpreter,
                ref mut ended,
            } => match interpreter.get_pending_cmds(sim_time_s) {
                PendingCmds::Some(cmds) => {
                    // Several commands due in one step, the last one wins
                    if let Some(last) = cmds.last() {
                        cmd = *last;
                    }
                }
                PendingCmds::None => (),
                PendingCmds::EndOfScript => {
                    if !*ended {
                        info!("End of script, holding the last command");
                        *ended = true;
                    }
                }
            },
        }

        // Commands are in the wire convention, so the right channel's sign
        // is undone here to recover the physical wheel velocity.
        let vel_left_mps = kinematics::rpm_to_mps(cmd.left_rpm, sim_params.wheel_radius_m);
        let vel_right_mps = -kinematics::rpm_to_mps(cmd.right_rpm, sim_params.wheel_radius_m);

        pose = kinematics::step(
            &pose,
            vel_left_mps,
            vel_right_mps,
            sim_params.track_width_m,
            sim_params.dt_s,
        );

        // Decimated trajectory output
        if output_due {
            let (axle_left, axle_right) = pose.axle_endpoints(sim_params.track_width_m);

            if let Err(e) = arch_traj.serialise(TrajRecord {
                sim_time_s,
                x_m: pose.position_m.x,
                y_m: pose.position_m.y,
                heading_rad: pose.heading_rad,
                axle_left_x_m: axle_left.x,
                axle_left_y_m: axle_left.y,
                axle_right_x_m: axle_right.x,
                axle_right_y_m: axle_right.y,
            }) {
                warn!("Could not write the trajectory archive: {}", e);
            }

            info!(
                "act_t: {:8.3} s, sim_t: {:8.3} s, x: {:7.3} m, y: {:7.3} m, heading: {:7.3} rad",
                pacer.elapsed_s(),
                sim_time_s,
                pose.position_m.x,
                pose.position_m.y,
                pose.heading_rad
            );
        }

        pacer.wait();
    }

    info!(
        "\nSimulation complete: sim_t {:.3} s in act_t {:.3} s",
        pacer.sim_time_s(),
        pacer.elapsed_s()
    );
    info!("End of execution");

    Ok(())
}

/// True on the cycles which write trajectory and drive archives.
fn output_due(step_count: u64, output_decimation: u64) -> bool {
    step_count % output_decimation == 0
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_output_due_follows_decimation() {
        // One output every 10 cycles, starting with the first
        assert!(output_due(0, 10));
        assert!(!output_due(1, 10));
        assert!(!output_due(9, 10));
        assert!(output_due(10, 10));

        // A decimation of 1 outputs every cycle
        assert!(output_due(3, 1));
    }
}
