use byteorder::{BigEndian, ByteOrder};
#[cfg(target_os = "linux")]
use i2cdev::core::I2CDevice;
#[cfg(target_os = "linux")]
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
pub use imu_traits::{ImuError, MotionSample, MotionSensor, Vector3};
use log::{debug, error};

pub mod registers;
pub use registers::{AccelRange, GyroRange};
use registers::{Registers, DEFAULT_I2C_ADDR, WAKE_CMD, WHO_AM_I_VALUE};

pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";
pub const MPU_ADDR: u16 = DEFAULT_I2C_ADDR;

/// Parses an I2C address given as `0x68` or `104`.
pub fn parse_address(arg: &str) -> Result<u16, std::num::ParseIntError> {
    match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => arg.parse(),
    }
}

/// Register-level access to the sensor: single-register writes and
/// auto-incrementing burst reads.
pub trait RegisterBus {
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), ImuError>;

    /// Writes the start address, then reads `buf.len()` consecutive registers.
    fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> Result<(), ImuError>;
}

#[cfg(target_os = "linux")]
pub struct MpuI2CError(LinuxI2CError);

#[cfg(target_os = "linux")]
impl From<LinuxI2CError> for MpuI2CError {
    fn from(err: LinuxI2CError) -> Self {
        MpuI2CError(err)
    }
}

#[cfg(target_os = "linux")]
impl From<MpuI2CError> for ImuError {
    fn from(err: MpuI2CError) -> Self {
        ImuError::DeviceError(err.0.to_string())
    }
}

#[cfg(target_os = "linux")]
impl RegisterBus for LinuxI2CDevice {
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), ImuError> {
        self.write(&[register, value]).map_err(MpuI2CError)?;
        Ok(())
    }

    fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> Result<(), ImuError> {
        self.write(&[start]).map_err(MpuI2CError)?;
        self.read(buf).map_err(MpuI2CError)?;
        Ok(())
    }
}

/// Low-level MPU-6050 driver.
pub struct Mpu6050<B> {
    bus: B,
}

#[cfg(target_os = "linux")]
impl Mpu6050<LinuxI2CDevice> {
    /// Opens the sensor on the given I2C bus (e.g. "/dev/i2c-1").
    pub fn open(i2c_path: &str, address: u16) -> Result<Self, ImuError> {
        debug!("Opening MPU-6050 at {}:0x{:02X}", i2c_path, address);
        let bus = LinuxI2CDevice::new(i2c_path, address).map_err(MpuI2CError)?;
        Ok(Mpu6050::new(bus))
    }
}

impl<B: RegisterBus> Mpu6050<B> {
    pub fn new(bus: B) -> Self {
        Mpu6050 { bus }
    }

    pub fn into_inner(self) -> B {
        self.bus
    }

    fn read_vector(&mut self, register: Registers) -> Result<Vector3<i16>, ImuError> {
        let mut buf = [0u8; 6];
        self.bus.read_registers(register as u8, &mut buf)?;
        Ok(Vector3 {
            x: BigEndian::read_i16(&buf[0..2]),
            y: BigEndian::read_i16(&buf[2..4]),
            z: BigEndian::read_i16(&buf[4..6]),
        })
    }

    pub fn read_raw_accelerometer(&mut self) -> Result<Vector3<i16>, ImuError> {
        self.read_vector(Registers::AccelXoutH)
    }

    pub fn read_raw_gyroscope(&mut self) -> Result<Vector3<i16>, ImuError> {
        self.read_vector(Registers::GyroXoutH)
    }

    pub fn read_raw_temperature(&mut self) -> Result<i16, ImuError> {
        let mut buf = [0u8; 2];
        self.bus.read_registers(Registers::TempOutH as u8, &mut buf)?;
        Ok(BigEndian::read_i16(&buf))
    }
}

impl<B: RegisterBus> MotionSensor for Mpu6050<B> {
    fn init(&mut self) -> Result<(), ImuError> {
        debug!("Initializing Mpu6050...");
        self.bus.write_register(Registers::PwrMgmt1 as u8, WAKE_CMD)?;

        let mut who_am_i = [0u8; 1];
        self.bus.read_registers(Registers::WhoAmI as u8, &mut who_am_i)?;
        if who_am_i[0] != WHO_AM_I_VALUE {
            error!(
                "Invalid WHO_AM_I. Expected {:#04x}, got {:#04x}",
                WHO_AM_I_VALUE, who_am_i[0]
            );
            return Err(ImuError::ConfigurationError(format!(
                "unexpected WHO_AM_I 0x{:02X}",
                who_am_i[0]
            )));
        }
        debug!("Mpu6050 WHO_AM_I verified: 0x{:02X}", who_am_i[0]);

        // Pin the full-scale ranges the unit conversion assumes.
        self.bus.write_register(Registers::AccelConfig as u8, AccelRange::G2 as u8)?;
        self.bus.write_register(Registers::GyroConfig as u8, GyroRange::Dps250 as u8)?;
        Ok(())
    }

    fn read_motion_sample(&mut self) -> Result<MotionSample, ImuError> {
        Ok(MotionSample {
            accel: self.read_raw_accelerometer()?,
            gyro: self.read_raw_gyroscope()?,
            temp: self.read_raw_temperature()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Register file with an auto-incrementing read pointer.
    struct FakeBus {
        regs: [u8; 256],
        writes: Vec<(u8, u8)>,
        offline: bool,
    }

    impl FakeBus {
        fn new() -> Self {
            let mut regs = [0u8; 256];
            regs[Registers::WhoAmI as usize] = WHO_AM_I_VALUE;
            FakeBus {
                regs,
                writes: Vec::new(),
                offline: false,
            }
        }

        fn load(&mut self, start: Registers, bytes: &[u8]) {
            let start = start as usize;
            self.regs[start..start + bytes.len()].copy_from_slice(bytes);
        }
    }

    impl RegisterBus for FakeBus {
        fn write_register(&mut self, register: u8, value: u8) -> Result<(), ImuError> {
            if self.offline {
                return Err(ImuError::DeviceError("no ACK".to_string()));
            }
            self.writes.push((register, value));
            self.regs[register as usize] = value;
            Ok(())
        }

        fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> Result<(), ImuError> {
            if self.offline {
                return Err(ImuError::DeviceError("no ACK".to_string()));
            }
            let start = start as usize;
            buf.copy_from_slice(&self.regs[start..start + buf.len()]);
            Ok(())
        }
    }

    #[test]
    fn init_wakes_device_and_pins_ranges() {
        let mut imu = Mpu6050::new(FakeBus::new());
        imu.init().unwrap();
        let bus = imu.into_inner();
        assert_eq!(
            bus.writes,
            vec![
                (Registers::PwrMgmt1 as u8, WAKE_CMD),
                (Registers::AccelConfig as u8, AccelRange::G2 as u8),
                (Registers::GyroConfig as u8, GyroRange::Dps250 as u8),
            ]
        );
    }

    #[test]
    fn init_rejects_unknown_chip() {
        let mut bus = FakeBus::new();
        bus.regs[Registers::WhoAmI as usize] = 0x70;
        let mut imu = Mpu6050::new(bus);
        assert!(matches!(imu.init(), Err(ImuError::ConfigurationError(_))));
    }

    #[test]
    fn init_fails_when_bus_is_down() {
        let mut bus = FakeBus::new();
        bus.offline = true;
        let mut imu = Mpu6050::new(bus);
        assert!(matches!(imu.init(), Err(ImuError::DeviceError(_))));
    }

    #[test]
    fn sample_is_decoded_big_endian() {
        let mut bus = FakeBus::new();
        // 16384, -300, 17000
        bus.load(Registers::AccelXoutH, &[0x40, 0x00, 0xFE, 0xD4, 0x42, 0x68]);
        bus.load(Registers::TempOutH, &[0xFE, 0xAC]);
        // 131, 0, -131
        bus.load(Registers::GyroXoutH, &[0x00, 0x83, 0x00, 0x00, 0xFF, 0x7D]);

        let mut imu = Mpu6050::new(bus);
        let sample = imu.read_motion_sample().unwrap();
        assert_eq!(sample.accel, Vector3::new(16384, -300, 17000));
        assert_eq!(sample.gyro, Vector3::new(131, 0, -131));
        assert_eq!(sample.temp, -340);
    }

    #[test]
    fn address_parsing() {
        assert_eq!(parse_address("0x68"), Ok(0x68));
        assert_eq!(parse_address("0X69"), Ok(0x69));
        assert_eq!(parse_address("104"), Ok(104));
        assert!(parse_address("0xZZ").is_err());
    }

    #[test]
    fn read_error_is_reported() {
        let mut bus = FakeBus::new();
        bus.offline = true;
        let mut imu = Mpu6050::new(bus);
        assert!(imu.read_motion_sample().is_err());
    }
}
