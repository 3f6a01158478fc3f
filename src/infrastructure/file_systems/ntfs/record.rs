//! MFT record header parsing and fixup application
//!
//! Every file-system object owns one fixed-size MFT record starting with
//! the "FILE" signature. The last two bytes of each 512-byte sector of a
//! record are protected by an update sequence array (fixup array) and
//! must be restored before the attribute chain is parsed.

use crate::domain::entities::RecordClass;
use crate::domain::repositories::NtfsError;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// MFT record signature
pub const RECORD_SIGNATURE: &[u8; 4] = b"FILE";

/// Size of the fixed record header in bytes
pub const RECORD_HEADER_SIZE: usize = 48;

/// Sector stride protected by the fixup array
const FIXUP_STRIDE: usize = 512;

/// Fixed header of one MFT record
#[derive(Debug, Clone)]
pub struct MftRecordHeader {
    /// "FILE" for valid records
    pub signature: [u8; 4],
    /// Offset of the update sequence array within the record
    pub fixup_offset: u16,
    /// Number of u16 words in the array, including the sequence number
    pub fixup_size: u16,
    /// $LogFile sequence number
    pub lsn: u64,
    /// Reuse counter for this record slot
    pub sequence: u16,
    /// Number of directory entries referencing this record
    pub hard_link_count: u16,
    /// Offset of the first attribute
    pub first_attribute_offset: u16,
    /// bit0 = IN_USE, bit1 = IS_DIRECTORY
    pub flags: u16,
    /// Bytes in use inside this record
    pub used_size: u32,
    /// Allocated record size
    pub allocated_size: u32,
    /// Reference to the base record; 0 for base records
    pub base_record_reference: u64,
    /// Next attribute id to be assigned
    pub next_attribute_id: u16,
    /// This record's number within the MFT
    pub record_number: u32,
}

impl MftRecordHeader {
    /// Parses the record header from the start of a record buffer
    pub fn parse(data: &[u8]) -> Result<Self, NtfsError> {
        if data.len() < RECORD_HEADER_SIZE {
            return Err(NtfsError::TruncatedStructure {
                what: "MFT record header",
                wanted: RECORD_HEADER_SIZE,
                got: data.len(),
            });
        }

        let mut signature = [0u8; 4];
        signature.copy_from_slice(&data[0..4]);
        if &signature != RECORD_SIGNATURE {
            return Err(NtfsError::CorruptRecord(format!(
                "signature {:?} is not FILE",
                String::from_utf8_lossy(&signature)
            )));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let corrupt = |e: std::io::Error| NtfsError::CorruptRecord(e.to_string());

        let fixup_offset = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let fixup_size = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let lsn = cursor.read_u64::<LittleEndian>().map_err(corrupt)?;
        let sequence = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let hard_link_count = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let first_attribute_offset = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let flags = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let used_size = cursor.read_u32::<LittleEndian>().map_err(corrupt)?;
        let allocated_size = cursor.read_u32::<LittleEndian>().map_err(corrupt)?;
        let base_record_reference = cursor.read_u64::<LittleEndian>().map_err(corrupt)?;
        let next_attribute_id = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        // 2 bytes of alignment padding before the record number at 0x2C
        cursor.set_position(0x2C - 4);
        let record_number = cursor.read_u32::<LittleEndian>().map_err(corrupt)?;

        Ok(Self {
            signature,
            fixup_offset,
            fixup_size,
            lsn,
            sequence,
            hard_link_count,
            first_attribute_offset,
            flags,
            used_size,
            allocated_size,
            base_record_reference,
            next_attribute_id,
            record_number,
        })
    }

    /// Classifies the record by its flags
    pub fn classify(&self) -> RecordClass {
        RecordClass::from_flags(self.flags)
    }

    /// Returns whether this is a base record (not an extension)
    pub fn is_base_record(&self) -> bool {
        self.base_record_reference == 0
    }

    /// Bytes of the record that hold attribute data, clamped to the buffer
    pub fn attribute_bound(&self, record_len: usize) -> usize {
        (self.used_size as usize).min(record_len)
    }
}

/// Restores the sector tail bytes protected by the update sequence array
///
/// Each 512-byte sector of the record ends with a copy of the update
/// sequence number; the displaced original bytes live in the fixup
/// array. Records advertising fewer than two array words carry no
/// protection and are left untouched. A tail that does not match the
/// sequence number means a torn write; the record is reported corrupt.
pub fn apply_fixups(data: &mut [u8], header: &MftRecordHeader) -> Result<(), NtfsError> {
    let words = header.fixup_size as usize;
    if words < 2 {
        return Ok(());
    }

    let offset = header.fixup_offset as usize;
    let array_len = words * 2;
    if offset == 0 || offset + array_len > data.len() {
        return Err(NtfsError::CorruptRecord(format!(
            "fixup array out of bounds: offset {offset}, length {array_len}"
        )));
    }

    let array = data[offset..offset + array_len].to_vec();
    let usn = &array[0..2];
    let originals = &array[2..];

    for (i, original) in originals.chunks_exact(2).enumerate() {
        let end = (i + 1) * FIXUP_STRIDE;
        if end > data.len() {
            break;
        }
        let tail = &mut data[end - 2..end];
        if tail != usn {
            return Err(NtfsError::CorruptRecord(format!(
                "fixup mismatch in sector {i}: tail {tail:02X?}, expected {usn:02X?}"
            )));
        }
        tail.copy_from_slice(original);
    }

    Ok(())
}
