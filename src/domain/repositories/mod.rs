//! Repository traits (interfaces)
//!
//! These traits define the contracts for external dependencies.
//! They follow the Dependency Inversion Principle (DIP) from SOLID.

mod block_device;
mod file_system;
mod fragment_sink;

pub use block_device::{BlockDeviceError, BlockDeviceReader, DeviceInfo};
pub use file_system::NtfsError;
pub use fragment_sink::{FragmentOrigin, FragmentSink, SinkError};
