use clap::Parser;
use std::io;
use tracing_subscriber::EnvFilter;

#[cfg(target_os = "linux")]
fn run(args: tilt_mouse::Args) -> Result<(), tilt_mouse::ImuError> {
    use tilt_mouse::{Mpu6050, PeriodicDriver, SamplingLoop, SerialSink, SystemClock};
    use tracing::{error, info};

    let config = args.pipeline_config();
    let sensor = Mpu6050::open(&args.i2c_bus, args.address)?;
    let sink = SerialSink::open(&args.device, args.baud_rate)?;
    let mut sampler = SamplingLoop::start(sensor, sink, &config).map_err(|e| {
        error!("MPU-6050 did not initialize: {}", e);
        e
    })?;

    info!(
        "Streaming {}:0x{:02X} to {} every {:?}",
        args.i2c_bus, args.address, args.device, config.period
    );
    let driver = PeriodicDriver::new(SystemClock, config.period, config.timing);
    let stats = sampler.run(&driver, args.period_limit());

    info!(
        "Stopped: {} periods, {} skipped, {} frames, {} dropped by the link",
        stats.periods,
        stats.skipped,
        stats.frames,
        sampler.sink().dropped()
    );
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run(_args: tilt_mouse::Args) -> Result<(), tilt_mouse::ImuError> {
    Err(tilt_mouse::ImuError::DeviceError(
        "tilt_mouse needs Linux i2c-dev".to_string(),
    ))
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = tilt_mouse::Args::parse();
    run(args).map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
