//! Defines traits and implementations for sending serialized frames.
//!
//! This module provides:
//! - The `Sender` trait defining the interface for writing one frame per line.
//! - Concrete implementations: `StdioSender`, `FileSender`, `NullSender`.
//! - The `TransportError` type shared by the transport layer.

use std::fs::File;
use std::io::{self, BufWriter, Error as IoError, Write};

use log::info;
use thiserror::Error;

use crate::serializer::SerializationError;

/// Error types that can occur while presenting frames.
#[derive(Error, Debug)]
pub enum TransportError {
    /// An I/O error occurred (e.g., writing to a file).
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
    /// An error occurred during serialization before sending.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerializationError),
    /// An error occurred due to invalid transport configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Writes serialized frames to a destination, one frame per line.
pub trait Sender: Send {
    /// Writes `data` followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the write fails.
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Flushes any internal buffers. May be a no-op.
    fn flush(&mut self) -> Result<(), TransportError>;
}

/// Sends frames to standard output, flushing after every line so a piped
/// viewer sees each tick as it happens.
pub struct StdioSender {
    stdout: io::Stdout,
}

impl StdioSender {
    pub fn new() -> Self {
        StdioSender { stdout: io::stdout() }
    }
}

impl Default for StdioSender {
    fn default() -> Self {
        Self::new()
    }
}

impl Sender for StdioSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut out = self.stdout.lock();
        out.write_all(data)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.stdout.flush()?;
        Ok(())
    }
}

/// Sender implementation that writes frames to a file.
///
/// Creates the file if it doesn't exist, truncates it if it does.
/// Output is buffered; call `flush` to force it to disk.
pub struct FileSender {
    writer: BufWriter<File>,
}

impl FileSender {
    /// # Errors
    ///
    /// Returns `TransportError::IoError` if the file cannot be created or opened.
    pub fn new(file_path: &str) -> Result<Self, TransportError> {
        let file = File::create(file_path)?;
        info!("Initialized FileSender for path: {}", file_path);
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Sender for FileSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.writer.write_all(data)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// A sender implementation that does nothing.
/// Useful for disabling output via configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSender;

impl Sender for NullSender {
    fn send(&mut self, _data: &[u8]) -> Result<(), TransportError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}
