//! # Unicycle Model Kinematics
//!
//! Exact integration of the unicycle (differential drive) model. Each step
//! treats the wheel velocities as constant over the timestep and moves the
//! vehicle along the resulting arc in closed form, so shrinking the timestep
//! does not change the trajectory, only how often it is sampled.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use nalgebra::{Rotation2, Vector2};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Wheel velocity difference below which the motion is treated as a straight
/// line rather than an arc.
///
/// Units: meters/second
const VEL_EQ_EPSILON_MPS: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Planar pose of the vehicle.
///
/// The heading is measured anticlockwise from the world y axis and is never
/// wrapped, so the accumulated rotation of the vehicle can be read off
/// directly.
#[derive(Debug, Clone, Copy)]
pub struct Pose {
    /// Position of the axle midpoint in the world frame.
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// Heading angle.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// World positions of the two wheel contact points, `(left, right)`.
    ///
    /// The axle lies along the body x axis, which points along
    /// `(cos(heading), sin(heading))` in the world frame. Used to show the
    /// vehicle's orientation in trajectory outputs.
    pub fn axle_endpoints(&self, track_width_m: f64) -> (Vector2<f64>, Vector2<f64>) {
        let half =
            0.5 * track_width_m * Vector2::new(self.heading_rad.cos(), self.heading_rad.sin());

        (self.position_m - half, self.position_m + half)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position_m: Vector2::zeros(),
            heading_rad: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a wheel speed in RPM to the linear velocity of the wheel's
/// contact point.
pub fn rpm_to_mps(speed_rpm: f64, wheel_radius_m: f64) -> f64 {
    speed_rpm * 2.0 * std::f64::consts::PI / 60.0 * wheel_radius_m
}

/// Advance the pose by one timestep of constant wheel velocities.
///
/// `track_width_m` is the distance between the two wheel contact points.
/// The displacement is computed in the body frame (x right, y forward) and
/// rotated into the world frame by the heading at the start of the step.
pub fn step(
    pose: &Pose,
    vel_left_mps: f64,
    vel_right_mps: f64,
    track_width_m: f64,
    dt_s: f64,
) -> Pose {
    let (disp_body_m, delta_heading_rad) =
        if (vel_left_mps - vel_right_mps).abs() < VEL_EQ_EPSILON_MPS {
            // Equal wheel velocities, straight line ahead
            (Vector2::new(0.0, vel_left_mps * dt_s), 0.0)
        } else {
            let vel_avg_mps = 0.5 * (vel_left_mps + vel_right_mps);

            // Signed radius of the arc traced by the axle midpoint. Positive
            // radius puts the turn centre on the body x axis.
            let curve_radius_m = 0.5 * track_width_m * (vel_left_mps + vel_right_mps)
                / (vel_left_mps - vel_right_mps);

            let turn_rate_rads =
                (-curve_radius_m.signum() * vel_avg_mps).atan2(curve_radius_m.abs());
            let delta_heading_rad = turn_rate_rads * dt_s;

            (
                Vector2::new(
                    -curve_radius_m * (delta_heading_rad.cos() - 1.0),
                    -curve_radius_m * delta_heading_rad.sin(),
                ),
                delta_heading_rad,
            )
        };

    let disp_world_m = Rotation2::new(pose.heading_rad) * disp_body_m;

    Pose {
        position_m: pose.position_m + disp_world_m,
        heading_rad: pose.heading_rad + delta_heading_rad,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_straight_line() {
        let pose = step(&Pose::default(), 1.0, 1.0, 0.5, 0.1);

        assert!((pose.position_m.x).abs() < 1e-12);
        assert!((pose.position_m.y - 0.1).abs() < 1e-12);
        assert_eq!(pose.heading_rad, 0.0);
    }

    #[test]
    fn test_straight_line_follows_heading() {
        let start = Pose {
            position_m: Vector2::new(1.0, 2.0),
            heading_rad: std::f64::consts::FRAC_PI_2,
        };

        let pose = step(&start, 1.0, 1.0, 0.5, 0.1);

        // Forward motion rotated a quarter turn anticlockwise moves along
        // negative world x
        assert!((pose.position_m.x - 0.9).abs() < 1e-12);
        assert!((pose.position_m.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_near_equal_velocities_are_straight() {
        let pose = step(&Pose::default(), 1.0, 1.0 + 1e-9, 0.5, 0.1);

        assert!(pose.position_m.x.abs() < 1e-12);
        assert_eq!(pose.heading_rad, 0.0);
    }

    #[test]
    fn test_step_composition_is_exact() {
        // Integrating an arc in many small steps must land exactly where a
        // single large step does, up to float rounding
        let track_width_m = 0.5;
        let (vel_left_mps, vel_right_mps) = (0.0, 1.0);

        let one = step(&Pose::default(), vel_left_mps, vel_right_mps, track_width_m, 1.0);

        let mut many = Pose::default();
        for _ in 0..100 {
            many = step(&many, vel_left_mps, vel_right_mps, track_width_m, 0.01);
        }

        assert!((one.position_m - many.position_m).norm() < 1e-9);
        assert!((one.heading_rad - many.heading_rad).abs() < 1e-9);
    }

    #[test]
    fn test_heading_is_not_wrapped() {
        // Circling for long enough accumulates more than a full revolution
        // of heading
        let mut pose = Pose::default();
        for _ in 0..1000 {
            pose = step(&pose, 0.0, 1.0, 0.5, 0.1);
        }

        assert!(pose.heading_rad.abs() > 2.0 * std::f64::consts::PI);
    }

    #[test]
    fn test_rpm_to_mps() {
        // 60 rpm is one revolution per second, one circumference of travel
        let expected = 2.0 * std::f64::consts::PI * 0.1;
        assert!((rpm_to_mps(60.0, 0.1) - expected).abs() < 1e-12);

        assert_eq!(rpm_to_mps(0.0, 0.1), 0.0);
        assert!(rpm_to_mps(-60.0, 0.1) < 0.0);
    }

    #[test]
    fn test_axle_endpoints() {
        // At zero heading the axle lies along world x, left wheel at -x
        let pose = Pose {
            position_m: Vector2::new(1.0, 1.0),
            heading_rad: 0.0,
        };

        let (left, right) = pose.axle_endpoints(0.5);

        assert!((left - Vector2::new(0.75, 1.0)).norm() < 1e-12);
        assert!((right - Vector2::new(1.25, 1.0)).norm() < 1e-12);
    }
}
