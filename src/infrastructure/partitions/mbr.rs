//! MBR partition table scanner
//!
//! Reads the four primary partition entries from the DOS partition
//! table and filters out the NTFS ones.

use crate::domain::entities::{PartitionEntry, PARTITION_ENTRY_SIZE};
use crate::domain::repositories::{BlockDeviceError, BlockDeviceReader};

/// Byte offset of the partition table within the MBR
pub const PARTITION_TABLE_OFFSET: u64 = 0x1BE;

/// Number of primary partition entries
pub const PRIMARY_PARTITIONS: usize = 4;

/// Scanner over the MBR's primary partition table
pub struct MbrScanner;

impl MbrScanner {
    /// Reads all four primary entries, including empty slots
    pub fn scan<R: BlockDeviceReader>(
        device: &mut R,
    ) -> Result<Vec<PartitionEntry>, BlockDeviceError> {
        let table = device.read_at(
            PARTITION_TABLE_OFFSET,
            PRIMARY_PARTITIONS * PARTITION_ENTRY_SIZE,
        )?;

        let mut entries = Vec::with_capacity(PRIMARY_PARTITIONS);
        for (index, raw) in table.chunks_exact(PARTITION_ENTRY_SIZE).enumerate() {
            if let Some(entry) = PartitionEntry::parse(index, raw) {
                entries.push(entry);
            }
        }

        log::debug!(
            "MBR scan of {}: {} table entries read",
            device.path(),
            entries.len()
        );
        Ok(entries)
    }

    /// Reads the table and keeps only populated NTFS entries
    pub fn ntfs_partitions<R: BlockDeviceReader>(
        device: &mut R,
    ) -> Result<Vec<PartitionEntry>, BlockDeviceError> {
        let partitions: Vec<PartitionEntry> = Self::scan(device)?
            .into_iter()
            .filter(|entry| entry.is_ntfs())
            .collect();

        log::info!(
            "Found {} NTFS partition(s) on {}",
            partitions.len(),
            device.path()
        );
        Ok(partitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NTFS_TYPE;
    use crate::infrastructure::block_device::FileBlockDevice;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn device_with_table(entries: &[(usize, u8, u8, u32, u32)]) -> NamedTempFile {
        let mut image = vec![0u8; 1024 * 1024];
        for &(slot, boot, ptype, rel, total) in entries {
            let base = PARTITION_TABLE_OFFSET as usize + slot * PARTITION_ENTRY_SIZE;
            image[base] = boot;
            image[base + 4] = ptype;
            image[base + 8..base + 12].copy_from_slice(&rel.to_le_bytes());
            image[base + 12..base + 16].copy_from_slice(&total.to_le_bytes());
        }
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&image).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_empty_table_yields_no_ntfs() {
        let file = device_with_table(&[]);
        let mut device = FileBlockDevice::open(file.path().to_str().unwrap()).unwrap();
        let partitions = MbrScanner::ntfs_partitions(&mut device).unwrap();
        assert!(partitions.is_empty());
    }

    #[test]
    fn test_filters_to_populated_ntfs_entries() {
        let file = device_with_table(&[
            (0, 0x80, NTFS_TYPE, 2048, 1024),
            (1, 0x00, 0x83, 4096, 512), // Linux partition, ignored
            (2, 0x00, NTFS_TYPE, 8192, 0), // empty NTFS slot, ignored
        ]);
        let mut device = FileBlockDevice::open(file.path().to_str().unwrap()).unwrap();
        let partitions = MbrScanner::ntfs_partitions(&mut device).unwrap();
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].index, 0);
        assert_eq!(partitions[0].relative_sector, 2048);
    }
}
