//! Fragment sink trait
//!
//! Contract for the linearized-MFT output stream. The extractor pushes
//! one fragment per `$MFT` data run: a self-describing marker followed
//! by the run's bytes. Implementations decide where the stream lives
//! (a file on disk for the CLI, a buffer for tests).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing the linearized MFT
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to create sink at {path}: {source}")]
    Create { path: PathBuf, source: io::Error },

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Origin of one contiguous fragment written into the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOrigin {
    /// Backed by clusters at this absolute device byte offset
    Device(u64),
    /// Sparse run with no backing storage; the fragment is zero filled
    Sparse,
}

impl FragmentOrigin {
    /// The offset recorded in the on-stream marker (0 for sparse runs)
    pub fn marker_offset(&self) -> u64 {
        match self {
            FragmentOrigin::Device(offset) => *offset,
            FragmentOrigin::Sparse => 0,
        }
    }
}

/// Trait for receiving the linearized MFT stream
///
/// Calls arrive in strict order: `begin_fragment`, then one or more
/// `write` calls carrying that fragment's bytes, repeated per fragment,
/// then a single `finish`. `discard` may replace `finish` when
/// extraction fails partway.
pub trait FragmentSink {
    /// Starts a new fragment; the implementation records a marker
    fn begin_fragment(&mut self, origin: FragmentOrigin) -> Result<(), SinkError>;

    /// Appends run bytes to the current fragment
    fn write(&mut self, data: &[u8]) -> Result<(), SinkError>;

    /// Flushes and completes the stream, returning total bytes written
    /// (markers included)
    fn finish(&mut self) -> Result<u64, SinkError>;

    /// Tears the sink down after a failed extraction
    fn discard(&mut self) -> Result<(), SinkError>;
}
