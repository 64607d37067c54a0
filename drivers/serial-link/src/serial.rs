use imu_traits::{FrameSink, ImuError};
use log::{debug, error, warn};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// Frames buffered between the sampling loop and the writer thread.
pub const DEFAULT_QUEUE_FRAMES: usize = 64;

/// Fire-and-forget frame sink backed by a dedicated writer thread.
///
/// `write` never blocks. When the queue is full, or the writer thread has
/// gone away, the frame is dropped and counted.
pub struct SerialSink {
    tx: Option<mpsc::SyncSender<Vec<u8>>>,
    writer: Option<thread::JoinHandle<()>>,
    dropped: Arc<AtomicU64>,
}

impl SerialSink {
    /// Opens the serial device (8N1, no flow control) and starts the writer.
    pub fn open(device: &str, baud_rate: u32) -> Result<Self, ImuError> {
        let port = serialport::new(device, baud_rate)
            .timeout(Duration::from_millis(500))
            .open()?;
        debug!("Opened {} at {} baud", device, baud_rate);
        Self::spawn(port, DEFAULT_QUEUE_FRAMES)
    }

    /// Starts a writer thread draining up to `capacity` queued frames into `port`.
    pub fn spawn<W>(mut port: W, capacity: usize) -> Result<Self, ImuError>
    where
        W: Write + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel::<Vec<u8>>(capacity);
        let dropped = Arc::new(AtomicU64::new(0));
        let writer_dropped = Arc::clone(&dropped);

        let writer = thread::Builder::new()
            .name("serial-writer".to_string())
            .spawn(move || {
                for frame in rx {
                    if let Err(e) = port.write_all(&frame) {
                        writer_dropped.fetch_add(1, Ordering::Relaxed);
                        warn!("Serial write failed, frame dropped: {}", e);
                    }
                }
                if let Err(e) = port.flush() {
                    warn!("Serial flush failed: {}", e);
                }
            })?;

        Ok(SerialSink {
            tx: Some(tx),
            writer: Some(writer),
            dropped,
        })
    }

    /// Frames lost to a full queue or a failed write.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl FrameSink for SerialSink {
    fn write(&mut self, bytes: &[u8]) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(bytes.to_vec()) {
            Ok(()) => {}
            Err(mpsc::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Serial queue full, frame dropped");
            }
            Err(mpsc::TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                error!("Serial writer has stopped, frame dropped");
            }
        }
    }
}

impl Drop for SerialSink {
    fn drop(&mut self) {
        // Closing the channel lets the writer drain and exit.
        self.tx.take();
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                error!("Serial writer thread panicked");
            }
        }
    }
}
