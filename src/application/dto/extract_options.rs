//! Extraction options DTO

use std::path::PathBuf;

/// Options for extracting a device's NTFS volumes
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Path to the device or image file
    pub device_path: String,
    /// Directory receiving the `<partition_index>.mft` sink files
    pub output_dir: PathBuf,
    /// Restrict extraction to one partition table slot
    pub partition: Option<usize>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            device_path: String::new(),
            output_dir: PathBuf::from("./extracted"),
            partition: None,
        }
    }
}

impl ExtractOptions {
    /// Creates options for the given device
    pub fn new(device_path: &str) -> Self {
        Self {
            device_path: device_path.to_string(),
            ..Default::default()
        }
    }

    /// Sets the output directory
    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Restricts the run to a single partition slot
    pub fn with_partition(mut self, index: usize) -> Self {
        self.partition = Some(index);
        self
    }
}
