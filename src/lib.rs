pub mod config;
pub mod driver;
pub mod pipeline;

pub use config::{Args, PipelineConfig, DEFAULT_PERIOD};
pub use driver::{Clock, PeriodicDriver, StopHandle, SystemClock, TimingMode};
pub use pipeline::{wire_angle, PipelineStats, SamplingLoop, StepOutcome};

pub use imu_traits::*;
pub use linux_mpu6050::Mpu6050;
pub use motion_fusion::{
    AhrsSettings, AttitudeEstimator, ClickDebouncer, GestureDetector, GestureEvent,
    OrientationState,
};
pub use serial_link::{OutputFrame, SerialSink};
