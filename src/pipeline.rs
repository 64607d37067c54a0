use crate::config::PipelineConfig;
use crate::driver::{Clock, PeriodicDriver};
use imu_traits::{EulerAngles, FrameSink, ImuError, MotionSensor};
use log::{debug, warn};
use motion_fusion::{
    convert, AttitudeEstimator, ClickDebouncer, GestureDetector, GestureEvent, OrientationState,
};
use serial_link::OutputFrame;

/// Periods between statistics log lines (10 s at 100 Hz).
const STATS_LOG_INTERVAL: u64 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub periods: u64,
    /// Periods lost to a failed sensor read.
    pub skipped: u64,
    pub frames: u64,
    pub clicks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Emitted {
        euler: EulerAngles,
        click: Option<GestureEvent>,
    },
    /// The sensor read failed; nothing was emitted and the orientation is unchanged.
    Skipped,
}

/// Host-facing angle: whole degrees, truncated toward zero, sign flipped.
pub fn wire_angle(degrees: f32) -> i32 {
    (degrees as i32).wrapping_neg()
}

/// One read → convert → fuse → emit pass per call.
pub struct SamplingLoop<S, K> {
    sensor: S,
    sink: K,
    estimator: AttitudeEstimator,
    state: OrientationState,
    detector: GestureDetector,
    debouncer: ClickDebouncer,
    stats: PipelineStats,
}

impl<S: MotionSensor, K: FrameSink> SamplingLoop<S, K> {
    pub fn new(sensor: S, sink: K, config: &PipelineConfig) -> Self {
        Self {
            sensor,
            sink,
            estimator: AttitudeEstimator::new(config.ahrs),
            state: OrientationState::identity(),
            detector: GestureDetector::new(config.click_threshold),
            debouncer: ClickDebouncer::new(config.click_cooldown),
            stats: PipelineStats::default(),
        }
    }

    /// Initializes the sensor, then builds the loop. A sensor that does not
    /// come up is fatal.
    pub fn start(mut sensor: S, sink: K, config: &PipelineConfig) -> Result<Self, ImuError> {
        sensor.init()?;
        debug!("Sensor initialized");
        Ok(Self::new(sensor, sink, config))
    }

    pub fn step(&mut self, dt: f32) -> StepOutcome {
        self.stats.periods += 1;
        let outcome = self.sample(dt);
        if self.stats.periods % STATS_LOG_INTERVAL == 0 {
            debug!("{:?}", self.stats);
        }
        outcome
    }

    fn sample(&mut self, dt: f32) -> StepOutcome {
        let raw = match self.sensor.read_motion_sample() {
            Ok(raw) => raw,
            Err(e) => {
                self.stats.skipped += 1;
                warn!("Skipping period {}: {}", self.stats.periods, e);
                return StepOutcome::Skipped;
            }
        };

        let sample = convert(raw);
        let euler = self.estimator.update(&mut self.state, &sample, dt);
        self.emit(OutputFrame::Pitch(wire_angle(euler.pitch)));
        self.emit(OutputFrame::Roll(wire_angle(euler.roll)));

        let click = self
            .debouncer
            .filter(self.detector.detect(sample.accel_g, raw.accel.y));
        if let Some(GestureEvent::Click { magnitude, .. }) = click {
            self.stats.clicks += 1;
            self.emit(OutputFrame::Click { magnitude });
        }

        StepOutcome::Emitted { euler, click }
    }

    /// Steps once per driver tick. With a `limit`, stops the driver after
    /// that many periods; otherwise runs until the driver's stop handle is
    /// triggered elsewhere.
    pub fn run<C: Clock>(&mut self, driver: &PeriodicDriver<C>, limit: Option<u64>) -> PipelineStats {
        let stop = driver.stop_handle();
        let first = self.stats.periods;
        driver.run(|dt| {
            self.step(dt);
            if matches!(limit, Some(n) if self.stats.periods - first >= n) {
                stop.stop();
            }
        });
        self.stats
    }

    fn emit(&mut self, frame: OutputFrame) {
        self.sink.write(&frame.to_bytes());
        self.stats.frames += 1;
    }

    pub fn orientation(&self) -> &OrientationState {
        &self.state
    }

    pub fn estimator(&self) -> &AttitudeEstimator {
        &self.estimator
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_parts(self) -> (S, K) {
        (self.sensor, self.sink)
    }
}
