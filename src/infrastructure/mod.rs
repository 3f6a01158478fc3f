//! Infrastructure layer
//!
//! Concrete implementations of the domain repositories and the NTFS
//! decoder core. This layer contains all platform-facing code.

pub mod block_device;
pub mod file_systems;
pub mod partitions;
pub mod persistence;
