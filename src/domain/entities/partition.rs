//! MBR partition entry entity
//!
//! One 16-byte slot of the DOS partition table. The table holds four
//! primary entries starting at device offset 0x1BE.

use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;
use std::io::Cursor;

/// Partition type code for NTFS
pub const NTFS_TYPE: u8 = 0x07;

/// Boot indicator value marking the active partition
pub const BOOT_INDICATOR_ACTIVE: u8 = 0x80;

/// Sector size assumed when converting an LBA to a byte offset
pub const SECTOR_SIZE: u64 = 512;

/// Size of one partition table entry in bytes
pub const PARTITION_ENTRY_SIZE: usize = 16;

/// A primary partition entry from the MBR
#[derive(Debug, Clone, Serialize)]
pub struct PartitionEntry {
    /// Slot in the partition table (0..=3)
    pub index: usize,
    /// 0x80 marks the active (bootable) partition
    pub boot_indicator: u8,
    /// Starting CHS address (legacy, unused by the extractor)
    pub start_chs: [u8; 3],
    /// Partition type code (0x07 = NTFS)
    pub partition_type: u8,
    /// Ending CHS address (legacy, unused by the extractor)
    pub end_chs: [u8; 3],
    /// LBA of the partition's first sector
    pub relative_sector: u32,
    /// Total sectors in the partition; 0 marks an empty slot
    pub total_sectors: u32,
}

impl PartitionEntry {
    /// Parses one 16-byte table entry
    pub fn parse(index: usize, data: &[u8]) -> Option<Self> {
        if data.len() < PARTITION_ENTRY_SIZE {
            return None;
        }

        let mut cursor = Cursor::new(data);
        let boot_indicator = cursor.read_u8().ok()?;
        let mut start_chs = [0u8; 3];
        for byte in &mut start_chs {
            *byte = cursor.read_u8().ok()?;
        }
        let partition_type = cursor.read_u8().ok()?;
        let mut end_chs = [0u8; 3];
        for byte in &mut end_chs {
            *byte = cursor.read_u8().ok()?;
        }
        let relative_sector = cursor.read_u32::<LittleEndian>().ok()?;
        let total_sectors = cursor.read_u32::<LittleEndian>().ok()?;

        Some(Self {
            index,
            boot_indicator,
            start_chs,
            partition_type,
            end_chs,
            relative_sector,
            total_sectors,
        })
    }

    /// Returns whether this slot holds no partition
    pub fn is_empty(&self) -> bool {
        self.total_sectors == 0
    }

    /// Returns whether the entry describes an NTFS partition
    pub fn is_ntfs(&self) -> bool {
        self.partition_type == NTFS_TYPE && !self.is_empty()
    }

    /// Returns whether the boot indicator marks this partition active
    pub fn is_bootable(&self) -> bool {
        self.boot_indicator == BOOT_INDICATOR_ACTIVE
    }

    /// Absolute byte offset of the partition's first sector
    pub fn absolute_byte_offset(&self) -> u64 {
        self.relative_sector as u64 * SECTOR_SIZE
    }

    /// Partition size in bytes
    pub fn size_bytes(&self) -> u64 {
        self.total_sectors as u64 * SECTOR_SIZE
    }
}
