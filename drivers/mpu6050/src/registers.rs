/// Register addresses used by the driver.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registers {
    GyroConfig = 0x1B,
    AccelConfig = 0x1C,
    AccelXoutH = 0x3B, // 6 bytes: X, Y, Z (big-endian)
    TempOutH = 0x41,   // 2 bytes
    GyroXoutH = 0x43,  // 6 bytes: X, Y, Z (big-endian)
    PwrMgmt1 = 0x6B,
    WhoAmI = 0x75,
}

pub const DEFAULT_I2C_ADDR: u16 = 0x68;
pub const WHO_AM_I_VALUE: u8 = 0x68;
/// Clears SLEEP and selects the internal 8 MHz oscillator.
pub const WAKE_CMD: u8 = 0x00;

/// ACCEL_CONFIG AFS_SEL field.
#[derive(Debug, Clone, Copy)]
pub enum AccelRange {
    G2 = 0x00, // 16384 LSB/g
    G4 = 0x08,
    G8 = 0x10,
    G16 = 0x18,
}

/// GYRO_CONFIG FS_SEL field.
#[derive(Debug, Clone, Copy)]
pub enum GyroRange {
    Dps250 = 0x00, // 131 LSB/(°/s)
    Dps500 = 0x08,
    Dps1000 = 0x10,
    Dps2000 = 0x18,
}
