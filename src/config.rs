use crate::driver::TimingMode;
use clap::Parser;
use linux_mpu6050::{parse_address, DEFAULT_I2C_BUS, MPU_ADDR};
use motion_fusion::gesture::CLICK_THRESHOLD;
use motion_fusion::AhrsSettings;
use serial_link::DEFAULT_BAUD_RATE;
use std::time::Duration;

pub const DEFAULT_PERIOD: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub period: Duration,
    pub ahrs: AhrsSettings,
    /// Raw Y-axis acceleration (LSB) that counts as a click.
    pub click_threshold: i32,
    /// Quiet periods required between clicks. `0` reports every period above
    /// the threshold.
    pub click_cooldown: u32,
    pub timing: TimingMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            ahrs: AhrsSettings::default(),
            click_threshold: CLICK_THRESHOLD,
            click_cooldown: 0,
            timing: TimingMode::Nominal,
        }
    }
}

/// Streams MPU-6050 tilt and shake over a serial link.
#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Args {
    /// I2C bus the sensor is on
    #[clap(long, default_value = DEFAULT_I2C_BUS)]
    pub i2c_bus: String,

    /// Sensor I2C address (hex with 0x prefix, or decimal)
    #[clap(short, long, default_value_t = MPU_ADDR, value_parser = parse_address)]
    pub address: u16,

    /// Serial device frames are written to
    #[clap(short, long, default_value = "/dev/ttyS0")]
    pub device: String,

    #[clap(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud_rate: u32,

    /// Sampling period in milliseconds
    #[clap(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub period_ms: u64,

    /// Gravity correction gain (0 integrates the gyroscope only)
    #[clap(long, default_value_t = 0.5)]
    pub gain: f32,

    /// Skip gravity correction beyond this error in degrees (0 disables)
    #[clap(long, default_value_t = 0.0)]
    pub acceleration_rejection: f32,

    #[clap(long, default_value_t = CLICK_THRESHOLD)]
    pub click_threshold: i32,

    /// Quiet periods required between clicks (0 disables debouncing)
    #[clap(long, default_value_t = 0)]
    pub click_cooldown: u32,

    #[clap(long, value_enum, default_value_t = TimingMode::Nominal)]
    pub timing: TimingMode,

    /// Stop after this many periods (0 runs until killed)
    #[clap(long, default_value_t = 0)]
    pub periods: u64,
}

impl Args {
    pub fn period_limit(&self) -> Option<u64> {
        (self.periods > 0).then_some(self.periods)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            period: Duration::from_millis(self.period_ms),
            ahrs: AhrsSettings {
                gain: self.gain,
                acceleration_rejection: self.acceleration_rejection,
            },
            click_threshold: self.click_threshold,
            click_cooldown: self.click_cooldown,
            timing: self.timing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_defaults() {
        let args = Args::try_parse_from(["tilt_mouse"]).unwrap();
        assert_eq!(args.pipeline_config(), PipelineConfig::default());
        assert_eq!(args.address, 0x68);
        assert_eq!(args.baud_rate, 115_200);
        assert_eq!(args.i2c_bus, "/dev/i2c-1");
        assert_eq!(args.period_limit(), None);
    }

    #[test]
    fn overrides() {
        let args = Args::try_parse_from([
            "tilt_mouse",
            "--address",
            "0x69",
            "--device",
            "/dev/ttyUSB0",
            "--period-ms",
            "5",
            "--gain",
            "1.5",
            "--click-cooldown",
            "20",
            "--timing",
            "measured",
            "--periods",
            "500",
        ])
        .unwrap();
        let config = args.pipeline_config();

        assert_eq!(args.address, 0x69);
        assert_eq!(args.device, "/dev/ttyUSB0");
        assert_eq!(config.period, Duration::from_millis(5));
        assert_eq!(config.ahrs.gain, 1.5);
        assert_eq!(config.click_cooldown, 20);
        assert_eq!(config.timing, TimingMode::Measured);
        assert_eq!(args.period_limit(), Some(500));
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(Args::try_parse_from(["tilt_mouse", "--period-ms", "0"]).is_err());
        assert!(Args::try_parse_from(["tilt_mouse", "--address", "0xZZ"]).is_err());
    }
}
