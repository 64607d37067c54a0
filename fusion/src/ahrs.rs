//! Gyroscope integration with gravity-vector drift correction.
//!
//! The estimate lives in an [`OrientationState`] owned by the caller and
//! threaded through [`AttitudeEstimator::update`]. Each update integrates the
//! angular rate over `dt`, adds a proportional correction that rotates the
//! estimated gravity direction toward the measured one, and renormalizes.
//!
//! The earth frame is North-West-Up. Without a magnetometer, yaw is not
//! observable and drifts with gyroscope bias.

use imu_traits::{EulerAngles, PhysicalSample, Quaternion, Vector3};
use log::{debug, warn};

/// Correction gain at power-on, ramped down to the configured gain.
pub const INITIAL_GAIN: f32 = 10.0;
/// Duration of the power-on gain ramp (s).
pub const INITIALISATION_PERIOD: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AhrsSettings {
    /// Weight of the gravity correction. `0.0` integrates the gyroscope only.
    pub gain: f32,
    /// Skip the gravity correction when measured and estimated gravity
    /// disagree by more than this many degrees. `0.0` always corrects.
    pub acceleration_rejection: f32,
}

impl Default for AhrsSettings {
    fn default() -> Self {
        Self {
            gain: 0.5,
            acceleration_rejection: 0.0,
        }
    }
}

/// Persistent orientation estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrientationState {
    pub quaternion: Quaternion,
}

impl OrientationState {
    pub fn identity() -> Self {
        Self::default()
    }

    /// Euler angles in degrees, ZYX order.
    pub fn euler(&self) -> EulerAngles {
        let q = self.quaternion;
        let half_minus_qy_squared = 0.5 - q.y * q.y;
        EulerAngles {
            roll: (q.w * q.x + q.y * q.z)
                .atan2(half_minus_qy_squared - q.x * q.x)
                .to_degrees(),
            pitch: asin_clamped(2.0 * (q.w * q.y - q.z * q.x)).to_degrees(),
            yaw: (q.w * q.z + q.x * q.y)
                .atan2(half_minus_qy_squared - q.z * q.z)
                .to_degrees(),
        }
    }

    /// Unit gravity direction in the sensor frame, as the estimate sees it.
    pub fn gravity(&self) -> Vector3<f32> {
        half_gravity(&self.quaternion) * 2.0
    }
}

fn asin_clamped(value: f32) -> f32 {
    if value <= -1.0 {
        -std::f32::consts::FRAC_PI_2
    } else if value >= 1.0 {
        std::f32::consts::FRAC_PI_2
    } else {
        value.asin()
    }
}

/// Third column of the rotation matrix, scaled by 0.5.
fn half_gravity(q: &Quaternion) -> Vector3<f32> {
    Vector3::new(
        q.x * q.z - q.w * q.y,
        q.y * q.z + q.w * q.x,
        q.w * q.w - 0.5 + q.z * q.z,
    )
}

/// `q` rotated about the earth Z axis so that its yaw is zero.
fn without_heading(q: Quaternion) -> Quaternion {
    let yaw = (q.w * q.z + q.x * q.y).atan2(0.5 - q.y * q.y - q.z * q.z);
    let (sin, cos) = (0.5 * yaw).sin_cos();
    Quaternion {
        w: cos,
        x: 0.0,
        y: 0.0,
        z: -sin,
    } * q
}

/// Rotation error between `sensor` and `reference`, saturated beyond 90°.
fn feedback(sensor: Vector3<f32>, reference: Vector3<f32>) -> Vector3<f32> {
    let error = sensor.cross(reference);
    if sensor.dot(reference) < 0.0 {
        error.try_normalize().unwrap_or(Vector3::ZERO)
    } else {
        error
    }
}

pub struct AttitudeEstimator {
    settings: AhrsSettings,
    initialising: bool,
    ramped_gain: f32,
    ramped_gain_step: f32,
    rejection_threshold: f32,
    accelerometer_ignored: bool,
    last_accel: Vector3<f32>,
}

impl AttitudeEstimator {
    pub fn new(settings: AhrsSettings) -> Self {
        let rejection_threshold = if settings.acceleration_rejection > 0.0 {
            (0.5 * settings.acceleration_rejection.to_radians().sin()).powi(2)
        } else {
            f32::MAX
        };
        Self {
            settings,
            initialising: true,
            ramped_gain: INITIAL_GAIN,
            ramped_gain_step: (INITIAL_GAIN - settings.gain) / INITIALISATION_PERIOD,
            rejection_threshold,
            accelerometer_ignored: false,
            last_accel: Vector3::ZERO,
        }
    }

    pub fn settings(&self) -> AhrsSettings {
        self.settings
    }

    /// Restarts the power-on gain ramp and returns `state` to identity.
    pub fn reset(&mut self, state: &mut OrientationState) {
        *self = Self::new(self.settings);
        *state = OrientationState::identity();
    }

    /// True while the power-on gain ramp is still running.
    pub fn is_initialising(&self) -> bool {
        self.initialising
    }

    /// Whether the last update ran without gravity correction.
    pub fn accelerometer_ignored(&self) -> bool {
        self.accelerometer_ignored
    }

    /// Last measured acceleration minus the estimated gravity (g).
    pub fn linear_acceleration(&self, state: &OrientationState) -> Vector3<f32> {
        self.last_accel - state.gravity()
    }

    /// Advances `state` by one period of `dt` seconds and returns the new
    /// Euler angles.
    pub fn update(
        &mut self,
        state: &mut OrientationState,
        sample: &PhysicalSample,
        dt: f32,
    ) -> EulerAngles {
        if !(dt.is_finite() && dt > 0.0) {
            warn!("Ignoring attitude update with dt={}", dt);
            return state.euler();
        }

        self.last_accel = sample.accel_g;
        self.ramp_gain(dt);

        let q = state.quaternion;
        let mut half_accel_feedback = Vector3::ZERO;
        self.accelerometer_ignored = true;

        // A zero accelerometer reading carries no gravity direction.
        if let Some(measured) = sample.accel_g.try_normalize() {
            let candidate = feedback(measured, half_gravity(&q));
            if self.initialising || candidate.magnitude_squared() <= self.rejection_threshold {
                half_accel_feedback = candidate;
                self.accelerometer_ignored = false;
            } else {
                debug!(
                    "Acceleration rejected: |a|={:.3} g",
                    sample.accel_g.magnitude()
                );
            }
        }

        let half_gyro = sample.gyro_dps * 0.5_f32.to_radians();
        let adjusted = half_gyro + half_accel_feedback * self.ramped_gain;
        let integrated = q + q.multiply_vector(adjusted * dt);

        match integrated.try_normalize() {
            Some(normalized) => state.quaternion = normalized,
            None => warn!("Degenerate quaternion {}, keeping previous orientation", integrated),
        }

        // No heading reference: yaw is held at zero until the ramp completes.
        if self.initialising {
            state.quaternion = without_heading(state.quaternion);
        }

        state.euler()
    }

    fn ramp_gain(&mut self, dt: f32) {
        if !self.initialising {
            return;
        }
        self.ramped_gain -= self.ramped_gain_step * dt;
        if self.ramped_gain < self.settings.gain || self.settings.gain == 0.0 {
            self.ramped_gain = self.settings.gain;
            self.initialising = false;
            debug!("Attitude estimator initialised, gain={}", self.ramped_gain);
        }
    }
}

impl Default for AttitudeEstimator {
    fn default() -> Self {
        Self::new(AhrsSettings::default())
    }
}
