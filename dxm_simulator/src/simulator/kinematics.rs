// dxm_simulator::simulator::kinematics.rs
// Travel-leg timing for the simulated robot

use dxm_shared::config::RobotConfig;

/// Timing model of the simulated robot.
///
/// Joint moves follow a trapezoidal velocity profile. The joint speed setting scales the cruise
/// speed only; acceleration is fixed, so short moves that never reach cruise speed barely respond
/// to a lower setting while long sweeps take nearly twice as long at half speed.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotModel {
    pub joint_max_speed: f64,
    pub joint_acceleration: f64,
    pub settle_time: f64,
    pub default_linear_speed: f64,
}

impl Default for RobotModel {
    fn default() -> Self {
        Self::from(&RobotConfig::default())
    }
}

impl From<&RobotConfig> for RobotModel {
    fn from(config: &RobotConfig) -> Self {
        Self {
            joint_max_speed: config.joint_max_speed,
            joint_acceleration: config.joint_acceleration,
            settle_time: config.settle_time,
            default_linear_speed: config.default_linear_speed,
        }
    }
}

impl RobotModel {
    /// Duration of a joint move over `distance` mm at `speed_percent` joint speed.
    pub fn joint_leg_time(&self, distance: f64, speed_percent: f64) -> f64 {
        let cruise = self.joint_max_speed * speed_percent / 100.0;
        self.settle_time + trapezoidal_time(distance, cruise, self.joint_acceleration)
    }

    /// Duration of a linear move; joint speed has no effect here.
    pub fn linear_leg_time(&self, distance: f64, linear_speed: Option<f64>) -> f64 {
        let speed = linear_speed.unwrap_or(self.default_linear_speed);
        self.settle_time + distance / speed
    }
}

/// Rest-to-rest move time with symmetric acceleration and deceleration.
fn trapezoidal_time(distance: f64, velocity: f64, acceleration: f64) -> f64 {
    if distance <= 0.0 {
        return 0.0;
    }
    if acceleration <= 0.0 {
        return distance / velocity;
    }
    let accel_distance = velocity * velocity / (2.0 * acceleration);
    if 2.0 * accel_distance >= distance {
        // Triangular profile: cruise speed is never reached.
        2.0 * (distance / acceleration).sqrt()
    } else {
        let accel_time = velocity / acceleration;
        let cruise_time = (distance - 2.0 * accel_distance) / velocity;
        2.0 * accel_time + cruise_time
    }
}
