use imu_traits::Vector3;
use log::trace;

/// Raw Y-axis acceleration (LSB) at which a shake counts as a click.
pub const CLICK_THRESHOLD: i32 = 17_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// Shake along `axis`; `magnitude` is the absolute raw reading in LSB.
    Click { axis: Axis, magnitude: u16 },
}

/// Memoryless threshold detector on the raw Y-axis acceleration.
///
/// Fires on every sample at or above the threshold, so a sustained shake
/// yields one event per period.
#[derive(Debug, Clone, Copy)]
pub struct GestureDetector {
    threshold: i32,
}

impl Default for GestureDetector {
    fn default() -> Self {
        Self::new(CLICK_THRESHOLD)
    }
}

impl GestureDetector {
    pub fn new(threshold: i32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn detect(&self, accel_g: Vector3<f32>, raw_accel_y: i16) -> Option<GestureEvent> {
        // Widened so that i16::MIN has an absolute value.
        let magnitude = i32::from(raw_accel_y).abs();
        if magnitude < self.threshold {
            return None;
        }
        trace!("Click: raw_y={} ({:.2} g)", raw_accel_y, accel_g.y);
        Some(GestureEvent::Click {
            axis: Axis::Y,
            magnitude: u16::try_from(magnitude).unwrap_or(u16::MAX),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Triggered,
    Cooldown { remaining: u32 },
}

/// Edge-triggered filter over [`GestureDetector`] output.
///
/// `Idle → Triggered` emits the first event of a shake. Further events are
/// swallowed until the detector has been quiet for `cooldown` consecutive
/// periods. A cooldown of zero passes every event through unchanged.
#[derive(Debug, Clone)]
pub struct ClickDebouncer {
    cooldown: u32,
    state: DebounceState,
}

impl ClickDebouncer {
    pub fn new(cooldown: u32) -> Self {
        Self {
            cooldown,
            state: DebounceState::Idle,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn filter(&mut self, event: Option<GestureEvent>) -> Option<GestureEvent> {
        if self.cooldown == 0 {
            return event;
        }

        match (self.state, event) {
            (DebounceState::Idle, Some(event)) => {
                self.state = DebounceState::Triggered;
                Some(event)
            }
            (DebounceState::Idle, None) => None,
            (DebounceState::Triggered, Some(_)) | (DebounceState::Cooldown { .. }, Some(_)) => {
                self.state = DebounceState::Triggered;
                None
            }
            (DebounceState::Triggered, None) => {
                self.state = self.cool_down(self.cooldown);
                None
            }
            (DebounceState::Cooldown { remaining }, None) => {
                self.state = self.cool_down(remaining);
                None
            }
        }
    }

    fn cool_down(&self, remaining: u32) -> DebounceState {
        match remaining.saturating_sub(1) {
            0 => DebounceState::Idle,
            remaining => DebounceState::Cooldown { remaining },
        }
    }
}
