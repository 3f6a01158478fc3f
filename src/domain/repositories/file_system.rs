//! NTFS decoding errors
//!
//! Error taxonomy for the two-stage NTFS decoder. I/O failures against
//! the block device are fatal and surface to the caller; structural
//! errors are recovered locally (the faulty unit is skipped and counted)
//! so that extraction always completes with a best-effort catalog.

use super::block_device::BlockDeviceError;
use super::fragment_sink::SinkError;
use thiserror::Error;

/// Errors produced while decoding NTFS on-disk structures
#[derive(Error, Debug)]
pub enum NtfsError {
    /// Boot sector failed validation; the partition is skipped
    #[error("Invalid NTFS boot sector: {0}")]
    BadBootSector(String),

    /// The first MFT record does not name itself `$MFT`; fatal for the partition
    #[error("MFT not found: first record names itself {0:?}")]
    MftNotFound(Option<String>),

    /// I/O failure while linearizing the MFT; fatal for the partition
    #[error("MFT read failed: {0}")]
    MftRead(#[source] BlockDeviceError),

    /// Malformed run-list bytes; the attribute is dropped, the record kept
    #[error("Bad run list: {0}")]
    BadRunList(String),

    /// An attribute header overruns the record's used size; the walk stops
    #[error("Malformed attribute chain at offset {offset}: length {length} exceeds bound {bound}")]
    MalformedAttributeChain { offset: usize, length: u64, bound: usize },

    /// Record signature is neither `FILE` nor a fragment marker; counted and skipped
    #[error("Corrupt MFT record: {0}")]
    CorruptRecord(String),

    /// A fixed-layout structure was handed a buffer that is too small
    #[error("Truncated {what}: wanted {wanted} bytes, got {got}")]
    TruncatedStructure { what: &'static str, wanted: usize, got: usize },

    #[error(transparent)]
    Device(#[from] BlockDeviceError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
