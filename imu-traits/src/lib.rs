use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::ops::{Add, Mul, Neg, Sub};

// --- Basic Types ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vector3<T = f32> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vector3<T> {
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl Vector3<i16> {
    /// Widens each component and divides by the sensor sensitivity.
    pub fn to_units(&self, lsb_per_unit: f32) -> Vector3<f32> {
        Vector3 {
            x: self.x as f32 / lsb_per_unit,
            y: self.y as f32 / lsb_per_unit,
            z: self.z as f32 / lsb_per_unit,
        }
    }
}

impl Vector3<f32> {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn magnitude_squared(&self) -> f32 {
        self.dot(*self)
    }

    pub fn magnitude(&self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector.
    pub fn try_normalize(&self) -> Option<Self> {
        let magnitude = self.magnitude();
        if magnitude > f32::EPSILON {
            Some(*self * (1.0 / magnitude))
        } else {
            None
        }
    }
}

impl Add for Vector3<f32> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3<f32> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vector3<f32> {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vector3<f32> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl<T: fmt::Display> fmt::Display for Vector3<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector3(x={}, y={}, z={})", self.x, self.y, self.z)
    }
}

/// Rotation quaternion, WXYZ order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn norm(&self) -> f32 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit quaternion in the same direction, or `None` when the norm has collapsed.
    pub fn try_normalize(&self) -> Option<Self> {
        let norm = self.norm();
        if !norm.is_finite() || norm <= f32::EPSILON {
            return None;
        }
        let inv = 1.0 / norm;
        Some(Self {
            w: self.w * inv,
            x: self.x * inv,
            y: self.y * inv,
            z: self.z * inv,
        })
    }

    /// Hamilton product `self ⊗ (0, v)`.
    pub fn multiply_vector(&self, v: Vector3<f32>) -> Self {
        Self {
            w: -self.x * v.x - self.y * v.y - self.z * v.z,
            x: self.w * v.x + self.y * v.z - self.z * v.y,
            y: self.w * v.y - self.x * v.z + self.z * v.x,
            z: self.w * v.z + self.x * v.y - self.y * v.x,
        }
    }
}

impl Add for Quaternion {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            w: self.w + rhs.w,
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

/// Hamilton product.
impl Mul for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quaternion(w={}, x={}, y={}, z={})",
            self.w, self.x, self.y, self.z
        )
    }
}

/// Orientation in degrees, ZYX (yaw, pitch, roll) order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EulerAngles {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

// --- Sample Types ---

/// One burst read from a 6-axis sensor, in raw LSB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionSample {
    pub accel: Vector3<i16>,
    pub gyro: Vector3<i16>,
    pub temp: i16,
}

/// A `MotionSample` in physical units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhysicalSample {
    /// Acceleration including gravity (g)
    pub accel_g: Vector3<f32>,
    /// Angular velocity (deg/s)
    pub gyro_dps: Vector3<f32>,
    /// Die temperature (°C)
    pub temperature_c: f32,
}

// --- Standard Error Type ---
#[derive(Debug)]
pub enum ImuError {
    /// Error originating from the sensor bus (no ACK, timeout, open failure)
    DeviceError(String),
    /// Error reading data from the device
    ReadError(String),
    /// Device answered but is not configured the way the pipeline expects
    ConfigurationError(String),
    /// Bytes that do not form a valid wire frame
    InvalidPacket(String),
}

impl fmt::Display for ImuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImuError::DeviceError(s) => write!(f, "Device error: {}", s),
            ImuError::ReadError(s) => write!(f, "Read error: {}", s),
            ImuError::ConfigurationError(s) => write!(f, "Configuration error: {}", s),
            ImuError::InvalidPacket(s) => write!(f, "Invalid packet: {}", s),
        }
    }
}

impl StdError for ImuError {}

impl From<io::Error> for ImuError {
    fn from(err: io::Error) -> Self {
        ImuError::DeviceError(err.to_string())
    }
}

#[cfg(feature = "serial")]
impl From<serialport::Error> for ImuError {
    fn from(err: serialport::Error) -> Self {
        ImuError::DeviceError(err.to_string())
    }
}

// --- Seams ---

/// A 6-axis sensor that can be sampled once per period.
pub trait MotionSensor {
    /// Wakes and verifies the device. Failure here is fatal to startup.
    fn init(&mut self) -> Result<(), ImuError>;

    /// Reads accelerometer, gyroscope and temperature in one go.
    fn read_motion_sample(&mut self) -> Result<MotionSample, ImuError>;
}

/// Fire-and-forget byte transport towards the host.
pub trait FrameSink {
    /// Queues `bytes` for transmission. Never blocks; bytes that cannot be
    /// accepted are dropped.
    fn write(&mut self, bytes: &[u8]);
}

impl<S: MotionSensor + ?Sized> MotionSensor for Box<S> {
    fn init(&mut self) -> Result<(), ImuError> {
        (**self).init()
    }

    fn read_motion_sample(&mut self) -> Result<MotionSample, ImuError> {
        (**self).read_motion_sample()
    }
}

impl<K: FrameSink + ?Sized> FrameSink for Box<K> {
    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes)
    }
}

impl FrameSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_product_follows_right_hand_rule() {
        let x = Vector3::new(1.0_f32, 0.0, 0.0);
        let y = Vector3::new(0.0_f32, 1.0, 0.0);
        assert_eq!(x.cross(y), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(x), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn zero_vector_does_not_normalize() {
        assert!(Vector3::ZERO.try_normalize().is_none());
        let unit = Vector3::new(0.0_f32, 3.0, 4.0).try_normalize().unwrap();
        assert!((unit.magnitude() - 1.0).abs() < 1e-6);
        assert!((unit.z - 0.8).abs() < 1e-6);
    }

    #[test]
    fn collapsed_quaternion_does_not_normalize() {
        let q = Quaternion {
            w: 0.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        };
        assert!(q.try_normalize().is_none());
        let nan = Quaternion {
            w: f32::NAN,
            ..Quaternion::IDENTITY
        };
        assert!(nan.try_normalize().is_none());
    }

    #[test]
    fn quaternion_product_matches_vector_product() {
        let q = Quaternion {
            w: 0.9,
            x: 0.1,
            y: -0.3,
            z: 0.2,
        };
        let v = Vector3::new(0.5_f32, -1.0, 2.0);
        let pure = Quaternion {
            w: 0.0,
            x: v.x,
            y: v.y,
            z: v.z,
        };
        assert_eq!(q * pure, q.multiply_vector(v));
        assert_eq!(Quaternion::IDENTITY * q, q);
    }

    #[test]
    fn error_messages_name_the_failure() {
        let err = ImuError::from(io::Error::new(io::ErrorKind::TimedOut, "no ACK"));
        assert!(matches!(err, ImuError::DeviceError(_)));
        assert_eq!(err.to_string(), "Device error: no ACK");
        assert_eq!(
            ImuError::InvalidPacket("Bad terminator: 0x00".to_string()).to_string(),
            "Invalid packet: Bad terminator: 0x00"
        );
    }

    #[test]
    fn raw_vector_scaling() {
        let raw = Vector3::<i16>::new(16384, -16384, 0);
        assert_eq!(raw.to_units(16384.0), Vector3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn vec_sink_collects_bytes() {
        let mut sink: Vec<u8> = Vec::new();
        sink.write(&[1, 2]);
        sink.write(&[3]);
        assert_eq!(sink, vec![1, 2, 3]);
    }
}
