#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use clap::Parser;
    use linux_mpu6050::{parse_address, MotionSensor, Mpu6050, DEFAULT_I2C_BUS, MPU_ADDR};
    use std::thread;
    use std::time::Duration;
    use tracing_subscriber::EnvFilter;

    #[derive(Parser)]
    struct Args {
        #[clap(short, long, default_value = DEFAULT_I2C_BUS)]
        bus: String,
        #[clap(short, long, default_value_t = MPU_ADDR, value_parser = parse_address)]
        address: u16,
        #[clap(short, long, default_value_t = 100)]
        interval_ms: u64,
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut imu = Mpu6050::open(&args.bus, args.address)?;
    imu.init()?;
    println!("Reading MPU-6050 sensor data...");

    loop {
        match imu.read_motion_sample() {
            Ok(raw) => {
                let sample = motion_fusion::convert(raw);
                let (accel, gyro) = (sample.accel_g, sample.gyro_dps);
                println!(
                    "Accel: x={:.2} g, y={:.2} g, z={:.2} g  (raw y={})",
                    accel.x, accel.y, accel.z, raw.accel.y
                );
                println!(
                    "Gyro:  x={:.2} °/s, y={:.2} °/s, z={:.2} °/s",
                    gyro.x, gyro.y, gyro.z
                );
                println!("Temp:  {:.1} °C", sample.temperature_c);
                println!("----------------------------------------");
            }
            Err(e) => eprintln!("Error reading from IMU: {}", e),
        }
        thread::sleep(Duration::from_millis(args.interval_ms));
    }
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("read_mpu6050 needs Linux i2c-dev");
}
