use imu_traits::{MotionSample, PhysicalSample};

/// Accelerometer sensitivity at ±2 g full scale.
pub const ACCEL_LSB_PER_G: f32 = 16384.0;
/// Gyroscope sensitivity at ±250 °/s full scale.
pub const GYRO_LSB_PER_DPS: f32 = 131.0;

pub const TEMP_LSB_PER_C: f32 = 340.0;
pub const TEMP_OFFSET_C: f32 = 36.53;

/// Maps a raw sample to g, °/s and °C.
pub fn convert(raw: MotionSample) -> PhysicalSample {
    PhysicalSample {
        accel_g: raw.accel.to_units(ACCEL_LSB_PER_G),
        gyro_dps: raw.gyro.to_units(GYRO_LSB_PER_DPS),
        temperature_c: raw.temp as f32 / TEMP_LSB_PER_C + TEMP_OFFSET_C,
    }
}
