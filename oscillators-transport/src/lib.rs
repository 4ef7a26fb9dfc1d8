//! Headless presentation layer: turns controller pushes into a stream of
//! serialized frames for an external scene/chart viewer.

mod frame;
mod sender;
mod serializer;

use log::debug;
use oscillators_config::{SenderConfig, SerializerType, TransportConfig};
use oscillators_simulation::{Display, PositionSnapshot, SeriesSnapshot};

// Re-export types
pub use self::frame::{ChartData, ChartFrame, Curve, Frame, SceneFrame};
pub use self::sender::{FileSender, NullSender, Sender, StdioSender, TransportError};
pub use self::serializer::{BinarySerializer, JsonSerializer, SerializationError, Serializer};

/// [`Display`] that serializes every push into a frame and hands it to a sender.
pub struct TransportDisplay {
    serializer: Box<dyn Serializer>,
    sender: Box<dyn Sender>,
    chart_every: u32,
    series_pushes: u64,
    frames_sent: u64,
}

impl TransportDisplay {
    pub fn new(serializer: Box<dyn Serializer>, sender: Box<dyn Sender>) -> Self {
        Self {
            serializer,
            sender,
            chart_every: 1,
            series_pushes: 0,
            frames_sent: 0,
        }
    }

    /// Create a transport display from configuration
    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        let serializer: Box<dyn Serializer> = match config.serializer {
            SerializerType::Json => Box::new(JsonSerializer),
            SerializerType::Binary => Box::new(BinarySerializer),
        };

        let sender: Box<dyn Sender> = match &config.sender {
            SenderConfig::Stdio => Box::new(StdioSender::new()),
            SenderConfig::File { path } => {
                if path.trim().is_empty() {
                    return Err(TransportError::ConfigurationError(
                        "File sender requires an output path".to_string(),
                    ));
                }
                Box::new(FileSender::new(path)?)
            }
            SenderConfig::Null => Box::new(NullSender),
        };

        Ok(Self::new(serializer, sender).with_chart_every(config.chart_every))
    }

    /// Send chart frames only on every `n`th series push.
    pub fn with_chart_every(mut self, n: u32) -> Self {
        self.chart_every = n.max(1);
        self
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    pub fn send_frame(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let data = self.serializer.serialize_frame(frame)?;
        self.sender.send(&data)?;
        self.frames_sent += 1;
        Ok(())
    }
}

impl Display for TransportDisplay {
    type Error = TransportError;

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.series_pushes = 0;
        self.send_frame(&Frame::Clear)?;
        self.sender.flush()?;
        debug!("Display cleared after {} frames", self.frames_sent);
        Ok(())
    }

    fn show_positions(&mut self, snapshot: &PositionSnapshot) -> Result<(), Self::Error> {
        let frame = Frame::Scene(SceneFrame {
            tick: snapshot.tick,
            time: snapshot.time,
            masses: snapshot.positions,
            springs: snapshot.springs,
        });
        self.send_frame(&frame)
    }

    fn show_series(&mut self, snapshot: &SeriesSnapshot<'_>) -> Result<(), Self::Error> {
        let due = self.series_pushes % u64::from(self.chart_every) == 0;
        self.series_pushes += 1;
        if !due {
            return Ok(());
        }
        self.send_frame(&Frame::Charts(ChartFrame::from_snapshot(snapshot)))
    }
}

impl Drop for TransportDisplay {
    fn drop(&mut self) {
        if let Err(e) = self.sender.flush() {
            log::error!("Failed to flush transport on shutdown: {}", e);
        }
    }
}
