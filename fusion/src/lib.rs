pub mod ahrs;
pub mod convert;
pub mod gesture;

pub use ahrs::{AhrsSettings, AttitudeEstimator, OrientationState};
pub use convert::convert;
pub use gesture::{Axis, ClickDebouncer, DebounceState, GestureDetector, GestureEvent};
pub use imu_traits::{EulerAngles, MotionSample, PhysicalSample, Quaternion, Vector3};
