//! Block device implementations

mod file_block_device;

pub use file_block_device::FileBlockDevice;
