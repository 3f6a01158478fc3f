//! Block device reader trait
//!
//! Defines the interface for reading raw data from block devices.
//! This abstraction allows the domain to work with any storage medium.

use std::io;
use thiserror::Error;

/// Errors that can occur when reading from a block device
#[derive(Error, Debug)]
pub enum BlockDeviceError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid offset: {offset} exceeds device size {device_size}")]
    InvalidOffset { offset: u64, device_size: u64 },

    #[error("Seek to offset {offset} failed: {source}")]
    Seek { offset: u64, source: io::Error },

    #[error("Short read at offset {offset}: wanted {wanted} bytes, got {got}")]
    ShortRead { offset: u64, wanted: usize, got: usize },

    #[error("Device error: {0}")]
    Other(String),
}

/// Information about a block device
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Path to the device (e.g., /dev/sda)
    pub path: String,
    /// Total size in bytes
    pub size: u64,
    /// Whether the device is read-only
    pub read_only: bool,
}

/// Trait for reading raw data from block devices
///
/// The reader maintains a single byte cursor; every successful call
/// leaves `position()` at the new cursor. The pipeline is sequential,
/// so methods take `&mut self` and no locking is involved.
///
/// # Example
///
/// ```ignore
/// let mut device = FileBlockDevice::open("/dev/sda")?;
/// device.seek_abs(0x1BE)?;
/// let mut table = [0u8; 64];
/// device.read_exact(&mut table)?;
/// ```
pub trait BlockDeviceReader {
    /// Opens the device for reading
    fn open(path: &str) -> Result<Self, BlockDeviceError>
    where
        Self: Sized;

    /// Returns information about the device
    fn device_info(&self) -> DeviceInfo;

    /// Positions the cursor at an absolute byte offset
    fn seek_abs(&mut self, offset: u64) -> Result<(), BlockDeviceError>;

    /// Moves the cursor by a signed delta from its current position
    fn seek_rel(&mut self, delta: i64) -> Result<(), BlockDeviceError>;

    /// Reads exactly `buf.len()` bytes at the cursor
    ///
    /// A short read fails with [`BlockDeviceError::ShortRead`]; the cursor
    /// position is unspecified after a failure.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), BlockDeviceError>;

    /// Returns the current absolute byte offset of the cursor
    fn position(&self) -> u64;

    /// Returns the device path
    fn path(&self) -> &str;

    /// Returns the total size in bytes
    fn size(&self) -> u64;

    /// Reads `length` bytes at `offset` into a fresh buffer
    ///
    /// Convenience wrapper over `seek_abs` + `read_exact`.
    fn read_at(&mut self, offset: u64, length: usize) -> Result<Vec<u8>, BlockDeviceError> {
        self.seek_abs(offset)?;
        let mut buf = vec![0u8; length];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}
