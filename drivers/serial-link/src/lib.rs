pub mod frame;
pub mod serial;

pub use frame::{decode, encode, ChannelId, OutputFrame, FRAME_SIZE, TERMINATOR};
pub use imu_traits::{FrameSink, ImuError};
pub use serial::{SerialSink, DEFAULT_BAUD_RATE, DEFAULT_QUEUE_FRAMES};
