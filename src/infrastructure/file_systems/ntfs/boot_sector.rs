//! NTFS boot sector parsing
//!
//! The boot sector's BIOS Parameter Block carries the geometry needed to
//! locate the MFT: sector and cluster sizes, the MFT's logical cluster
//! number, and the (signed) record size field.

use crate::domain::repositories::NtfsError;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// NTFS boot sector signature "NTFS    "
const NTFS_OEM_ID: [u8; 8] = [0x4E, 0x54, 0x46, 0x53, 0x20, 0x20, 0x20, 0x20];

/// Boot sector size
pub const BOOT_SECTOR_SIZE: usize = 512;

/// Mandatory end-of-sector marker
const END_OF_SECTOR_MARKER: u16 = 0xAA55;

/// NTFS boot sector structure (BIOS Parameter Block)
///
/// Only byte-order extraction happens here; interpretation lives in the
/// derived accessors below.
#[derive(Debug)]
#[allow(dead_code)]
pub struct NtfsBootSector {
    /// Jump instruction (3 bytes)
    jump: [u8; 3],
    /// OEM ID "NTFS    "
    oem_id: [u8; 8],
    /// Bytes per sector
    pub bytes_per_sector: u16,
    /// Sectors per cluster
    pub sectors_per_cluster: u8,
    /// Reserved sectors (always 0 for NTFS)
    reserved_sectors: u16,
    /// Media descriptor
    media_descriptor: u8,
    /// Sectors per track
    sectors_per_track: u16,
    /// Number of heads
    number_of_heads: u16,
    /// Hidden sectors
    hidden_sectors: u32,
    /// Total sectors in volume
    pub total_sectors: i64,
    /// LCN of MFT
    pub mft_lcn: i64,
    /// LCN of MFT mirror
    pub mft_mirror_lcn: i64,
    /// Clusters per MFT record (negative means 2^|value| bytes)
    pub clusters_per_mft_record: i8,
    /// Clusters per index record
    clusters_per_index_record: i8,
    /// Volume serial number
    volume_serial: u64,
    /// 0xAA55 end-of-sector marker
    end_of_sector_marker: u16,
}

impl NtfsBootSector {
    /// Parses a boot sector from raw bytes
    pub fn parse(data: &[u8]) -> Result<Self, NtfsError> {
        if data.len() < BOOT_SECTOR_SIZE {
            return Err(NtfsError::TruncatedStructure {
                what: "NTFS boot sector",
                wanted: BOOT_SECTOR_SIZE,
                got: data.len(),
            });
        }

        let mut cursor = Cursor::new(data);
        let bad = |e: std::io::Error| NtfsError::BadBootSector(e.to_string());

        // Jump instruction (3 bytes)
        let mut jump = [0u8; 3];
        for byte in &mut jump {
            *byte = cursor.read_u8().map_err(bad)?;
        }

        // OEM ID (8 bytes)
        let mut oem_id = [0u8; 8];
        for byte in &mut oem_id {
            *byte = cursor.read_u8().map_err(bad)?;
        }

        // Bytes per sector at offset 11
        let bytes_per_sector = cursor.read_u16::<LittleEndian>().map_err(bad)?;

        // Sectors per cluster at offset 13
        let sectors_per_cluster = cursor.read_u8().map_err(bad)?;

        // Reserved sectors at offset 14
        let reserved_sectors = cursor.read_u16::<LittleEndian>().map_err(bad)?;

        // Media descriptor at offset 21
        cursor.set_position(21);
        let media_descriptor = cursor.read_u8().map_err(bad)?;

        // Sectors per track at offset 24
        cursor.set_position(24);
        let sectors_per_track = cursor.read_u16::<LittleEndian>().map_err(bad)?;

        // Number of heads at offset 26
        let number_of_heads = cursor.read_u16::<LittleEndian>().map_err(bad)?;

        // Hidden sectors at offset 28
        let hidden_sectors = cursor.read_u32::<LittleEndian>().map_err(bad)?;

        // Total sectors at offset 40
        cursor.set_position(40);
        let total_sectors = cursor.read_i64::<LittleEndian>().map_err(bad)?;

        // MFT LCN at offset 48
        let mft_lcn = cursor.read_i64::<LittleEndian>().map_err(bad)?;

        // MFT mirror LCN at offset 56
        let mft_mirror_lcn = cursor.read_i64::<LittleEndian>().map_err(bad)?;

        // Clusters per MFT record at offset 64 (signed)
        let clusters_per_mft_record = cursor.read_i8().map_err(bad)?;

        // Clusters per index record at offset 68
        cursor.set_position(68);
        let clusters_per_index_record = cursor.read_i8().map_err(bad)?;

        // Volume serial at offset 72
        cursor.set_position(72);
        let volume_serial = cursor.read_u64::<LittleEndian>().map_err(bad)?;

        // End-of-sector marker at offset 510
        cursor.set_position(510);
        let end_of_sector_marker = cursor.read_u16::<LittleEndian>().map_err(bad)?;

        let boot_sector = Self {
            jump,
            oem_id,
            bytes_per_sector,
            sectors_per_cluster,
            reserved_sectors,
            media_descriptor,
            sectors_per_track,
            number_of_heads,
            hidden_sectors,
            total_sectors,
            mft_lcn,
            mft_mirror_lcn,
            clusters_per_mft_record,
            clusters_per_index_record,
            volume_serial,
            end_of_sector_marker,
        };
        boot_sector.validate()?;
        Ok(boot_sector)
    }

    /// Validates the boot sector
    fn validate(&self) -> Result<(), NtfsError> {
        if self.end_of_sector_marker != END_OF_SECTOR_MARKER {
            return Err(NtfsError::BadBootSector(format!(
                "end-of-sector marker is {:#06X}, expected 0xAA55",
                self.end_of_sector_marker
            )));
        }
        if self.bytes_per_sector < 512 {
            return Err(NtfsError::BadBootSector(format!(
                "implausible bytes per sector: {}",
                self.bytes_per_sector
            )));
        }
        if self.sectors_per_cluster == 0 {
            return Err(NtfsError::BadBootSector(
                "zero sectors per cluster".to_string(),
            ));
        }
        if self.oem_id != NTFS_OEM_ID {
            // Partition-type byte said NTFS; keep going but note the oddity
            log::warn!(
                "Boot sector OEM ID is {:?}, not \"NTFS    \"",
                String::from_utf8_lossy(&self.oem_id)
            );
        }
        Ok(())
    }

    /// Returns the cluster size in bytes
    pub fn cluster_size(&self) -> u64 {
        self.bytes_per_sector as u64 * self.sectors_per_cluster as u64
    }

    /// Returns the MFT record size in bytes
    ///
    /// The BPB field is signed: non-negative means clusters per record,
    /// negative means the record size is 2^|value| bytes.
    pub fn mft_record_size(&self) -> u64 {
        if self.clusters_per_mft_record >= 0 {
            self.cluster_size() * self.clusters_per_mft_record as u64
        } else {
            1u64 << (-(self.clusters_per_mft_record as i64))
        }
    }

    /// Absolute byte offset of the MFT, given the partition's base offset
    pub fn mft_absolute_offset(&self, partition_base: u64) -> u64 {
        partition_base + self.mft_lcn as u64 * self.cluster_size()
    }

    /// Returns total volume size in bytes
    pub fn volume_size(&self) -> u64 {
        self.total_sectors as u64 * self.bytes_per_sector as u64
    }
}
