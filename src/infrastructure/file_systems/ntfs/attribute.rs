//! MFT attribute chain walking
//!
//! Attributes are typed, length-prefixed structures chained inside an
//! MFT record from `first_attribute_offset` to the 0xFFFFFFFF sentinel.
//! The walker lends views over the record buffer; nothing is copied
//! until a typed content parser asks for it.

use crate::domain::entities::{FileNamespace, StandardInfo};
use crate::domain::repositories::NtfsError;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use super::record::MftRecordHeader;

/// Attribute type codes
pub mod attr_type {
    pub const STANDARD_INFORMATION: u32 = 0x10;
    pub const ATTRIBUTE_LIST: u32 = 0x20;
    pub const FILE_NAME: u32 = 0x30;
    pub const OBJECT_ID: u32 = 0x40;
    pub const SECURITY_DESCRIPTOR: u32 = 0x50;
    pub const VOLUME_NAME: u32 = 0x60;
    pub const VOLUME_INFORMATION: u32 = 0x70;
    pub const DATA: u32 = 0x80;
    pub const INDEX_ROOT: u32 = 0x90;
    pub const INDEX_ALLOCATION: u32 = 0xA0;
    pub const BITMAP: u32 = 0xB0;
    pub const REPARSE_POINT: u32 = 0xC0;
    pub const EA_INFORMATION: u32 = 0xD0;
    pub const EA: u32 = 0xE0;
    pub const LOGGED_UTILITY_STREAM: u32 = 0x100;

    /// Chain terminator
    pub const END: u32 = 0xFFFF_FFFF;
}

/// Size of the common attribute header prefix
pub const ATTRIBUTE_HEADER_SIZE: usize = 16;

/// Common 16-byte prefix shared by all attributes
#[derive(Debug, Clone, Copy)]
pub struct AttributeHeader {
    pub type_code: u32,
    /// Full attribute length, header and content included
    pub length: u32,
    pub non_resident: bool,
    pub name_length: u8,
    pub name_offset: u16,
    pub flags: u16,
    pub attribute_id: u16,
}

impl AttributeHeader {
    fn parse(data: &[u8]) -> Result<Self, NtfsError> {
        if data.len() < ATTRIBUTE_HEADER_SIZE {
            return Err(NtfsError::TruncatedStructure {
                what: "attribute header",
                wanted: ATTRIBUTE_HEADER_SIZE,
                got: data.len(),
            });
        }
        let mut cursor = Cursor::new(data);
        let corrupt = |e: std::io::Error| NtfsError::CorruptRecord(e.to_string());

        let type_code = cursor.read_u32::<LittleEndian>().map_err(corrupt)?;
        let length = cursor.read_u32::<LittleEndian>().map_err(corrupt)?;
        let non_resident = cursor.read_u8().map_err(corrupt)? != 0;
        let name_length = cursor.read_u8().map_err(corrupt)?;
        let name_offset = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let flags = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let attribute_id = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;

        Ok(Self {
            type_code,
            length,
            non_resident,
            name_length,
            name_offset,
            flags,
            attribute_id,
        })
    }
}

/// Tail of a non-resident attribute
#[derive(Debug, Clone, Copy)]
pub struct NonResidentHeader {
    pub starting_vcn: u64,
    pub ending_vcn: u64,
    pub runlist_offset: u16,
    pub compression_unit: u16,
    pub allocated_size: u64,
    pub real_size: u64,
    pub initialized_size: u64,
}

/// Size of the non-resident tail, counted from the attribute start
const NON_RESIDENT_HEADER_SIZE: usize = 64;

/// Size of the resident tail, counted from the attribute start
const RESIDENT_HEADER_SIZE: usize = 24;

/// A borrowed view over one attribute inside a record buffer
#[derive(Debug, Clone, Copy)]
pub struct AttributeView<'a> {
    pub header: AttributeHeader,
    /// The full attribute slice, common header included
    raw: &'a [u8],
}

impl<'a> AttributeView<'a> {
    /// The attribute's type code
    pub fn type_code(&self) -> u32 {
        self.header.type_code
    }

    /// Whether the content lives outside the record
    pub fn is_non_resident(&self) -> bool {
        self.header.non_resident
    }

    /// Decodes the attribute name (UTF-16LE), if any
    pub fn name(&self) -> Option<String> {
        if self.header.name_length == 0 {
            return None;
        }
        let start = self.header.name_offset as usize;
        let end = start + self.header.name_length as usize * 2;
        if end > self.raw.len() {
            return None;
        }
        let units: Vec<u16> = self.raw[start..end]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Some(String::from_utf16_lossy(&units))
    }

    /// Content bytes of a resident attribute
    pub fn resident_content(&self) -> Result<&'a [u8], NtfsError> {
        if self.header.non_resident {
            return Err(NtfsError::CorruptRecord(
                "resident content requested from non-resident attribute".to_string(),
            ));
        }
        if self.raw.len() < RESIDENT_HEADER_SIZE {
            return Err(NtfsError::TruncatedStructure {
                what: "resident attribute",
                wanted: RESIDENT_HEADER_SIZE,
                got: self.raw.len(),
            });
        }
        let mut cursor = Cursor::new(&self.raw[ATTRIBUTE_HEADER_SIZE..]);
        let corrupt = |e: std::io::Error| NtfsError::CorruptRecord(e.to_string());
        let content_length = cursor.read_u32::<LittleEndian>().map_err(corrupt)? as usize;
        let content_offset = cursor.read_u16::<LittleEndian>().map_err(corrupt)? as usize;

        let end = content_offset + content_length;
        if content_offset < ATTRIBUTE_HEADER_SIZE || end > self.raw.len() {
            return Err(NtfsError::CorruptRecord(format!(
                "resident content range {content_offset}..{end} outside attribute of {} bytes",
                self.raw.len()
            )));
        }
        Ok(&self.raw[content_offset..end])
    }

    /// Run-list bytes and the non-resident tail of a non-resident attribute
    pub fn non_resident(&self) -> Result<(&'a [u8], NonResidentHeader), NtfsError> {
        if !self.header.non_resident {
            return Err(NtfsError::CorruptRecord(
                "run list requested from resident attribute".to_string(),
            ));
        }
        if self.raw.len() < NON_RESIDENT_HEADER_SIZE {
            return Err(NtfsError::TruncatedStructure {
                what: "non-resident attribute header",
                wanted: NON_RESIDENT_HEADER_SIZE,
                got: self.raw.len(),
            });
        }
        let mut cursor = Cursor::new(&self.raw[ATTRIBUTE_HEADER_SIZE..]);
        let corrupt = |e: std::io::Error| NtfsError::CorruptRecord(e.to_string());

        let starting_vcn = cursor.read_u64::<LittleEndian>().map_err(corrupt)?;
        let ending_vcn = cursor.read_u64::<LittleEndian>().map_err(corrupt)?;
        let runlist_offset = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let compression_unit = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        cursor.set_position(24); // 4 bytes of padding
        let allocated_size = cursor.read_u64::<LittleEndian>().map_err(corrupt)?;
        let real_size = cursor.read_u64::<LittleEndian>().map_err(corrupt)?;
        let initialized_size = cursor.read_u64::<LittleEndian>().map_err(corrupt)?;

        let tail = NonResidentHeader {
            starting_vcn,
            ending_vcn,
            runlist_offset,
            compression_unit,
            allocated_size,
            real_size,
            initialized_size,
        };

        let offset = runlist_offset as usize;
        if offset < NON_RESIDENT_HEADER_SIZE || offset >= self.raw.len() {
            return Err(NtfsError::BadRunList(format!(
                "run list offset {offset} outside attribute of {} bytes",
                self.raw.len()
            )));
        }
        Ok((&self.raw[offset..], tail))
    }
}

/// Lazy iterator over the attribute chain of one MFT record
///
/// Yields `Ok(view)` per attribute. A header whose length is zero,
/// unreadable, or overruns the record's used size yields a single
/// `Err(MalformedAttributeChain)` and the iterator fuses.
pub struct AttributeWalker<'a> {
    data: &'a [u8],
    pos: usize,
    bound: usize,
    failed: bool,
}

impl<'a> AttributeWalker<'a> {
    /// Starts a walk at the record's first attribute
    pub fn new(data: &'a [u8], header: &MftRecordHeader) -> Self {
        Self {
            data,
            pos: header.first_attribute_offset as usize,
            bound: header.attribute_bound(data.len()),
            failed: false,
        }
    }

    fn malformed(&mut self, length: u64) -> NtfsError {
        self.failed = true;
        NtfsError::MalformedAttributeChain {
            offset: self.pos,
            length,
            bound: self.bound,
        }
    }
}

impl<'a> Iterator for AttributeWalker<'a> {
    type Item = Result<AttributeView<'a>, NtfsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.pos + 4 > self.bound {
            return Some(Err(self.malformed(0)));
        }

        let type_code = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().unwrap());
        if type_code == attr_type::END {
            return None;
        }

        if self.pos + ATTRIBUTE_HEADER_SIZE > self.bound {
            return Some(Err(self.malformed(0)));
        }
        let header = match AttributeHeader::parse(&self.data[self.pos..]) {
            Ok(header) => header,
            Err(_) => return Some(Err(self.malformed(0))),
        };

        let length = header.length as usize;
        if length < ATTRIBUTE_HEADER_SIZE || self.pos + length > self.bound {
            return Some(Err(self.malformed(header.length as u64)));
        }

        let view = AttributeView {
            header,
            raw: &self.data[self.pos..self.pos + length],
        };
        self.pos += length;
        Some(Ok(view))
    }
}

/// Decoded `$FILE_NAME` attribute content
#[derive(Debug, Clone)]
pub struct FileNameAttr {
    pub parent_reference: u64,
    pub namespace: FileNamespace,
    pub name: String,
}

impl FileNameAttr {
    /// Offset of the name length byte within the content
    const NAME_LENGTH_OFFSET: usize = 56;

    /// Parses `$FILE_NAME` content bytes
    pub fn parse(content: &[u8]) -> Result<Self, NtfsError> {
        if content.len() < Self::NAME_LENGTH_OFFSET + 2 {
            return Err(NtfsError::TruncatedStructure {
                what: "$FILE_NAME content",
                wanted: Self::NAME_LENGTH_OFFSET + 2,
                got: content.len(),
            });
        }
        let parent_reference = u64::from_le_bytes(content[0..8].try_into().unwrap());
        let name_length_chars = content[Self::NAME_LENGTH_OFFSET] as usize;
        let namespace = FileNamespace::from_raw(content[Self::NAME_LENGTH_OFFSET + 1]);

        let name_start = Self::NAME_LENGTH_OFFSET + 2;
        let name_end = name_start + name_length_chars * 2;
        if name_end > content.len() {
            return Err(NtfsError::TruncatedStructure {
                what: "$FILE_NAME name",
                wanted: name_end,
                got: content.len(),
            });
        }
        let units: Vec<u16> = content[name_start..name_end]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Ok(Self {
            parent_reference,
            namespace,
            name: String::from_utf16_lossy(&units),
        })
    }
}

/// Parses `$STANDARD_INFORMATION` content bytes
pub fn parse_standard_info(content: &[u8]) -> Result<StandardInfo, NtfsError> {
    const WANTED: usize = 36;
    if content.len() < WANTED {
        return Err(NtfsError::TruncatedStructure {
            what: "$STANDARD_INFORMATION content",
            wanted: WANTED,
            got: content.len(),
        });
    }
    let mut cursor = Cursor::new(content);
    let corrupt = |e: std::io::Error| NtfsError::CorruptRecord(e.to_string());

    Ok(StandardInfo {
        created: cursor.read_u64::<LittleEndian>().map_err(corrupt)?,
        modified: cursor.read_u64::<LittleEndian>().map_err(corrupt)?,
        mft_modified: cursor.read_u64::<LittleEndian>().map_err(corrupt)?,
        accessed: cursor.read_u64::<LittleEndian>().map_err(corrupt)?,
        dos_permissions: cursor.read_u32::<LittleEndian>().map_err(corrupt)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::file_systems::ntfs::record::RECORD_SIGNATURE;

    fn resident_attribute(type_code: u32, content: &[u8]) -> Vec<u8> {
        let mut raw = vec![0u8; RESIDENT_HEADER_SIZE + content.len()];
        let raw_len = raw.len();
        raw[0..4].copy_from_slice(&type_code.to_le_bytes());
        raw[4..8].copy_from_slice(&(raw_len as u32).to_le_bytes());
        raw[16..20].copy_from_slice(&(content.len() as u32).to_le_bytes());
        raw[20..22].copy_from_slice(&(RESIDENT_HEADER_SIZE as u16).to_le_bytes());
        raw[RESIDENT_HEADER_SIZE..].copy_from_slice(content);
        raw
    }

    fn record_with_attributes(attributes: &[Vec<u8>]) -> Vec<u8> {
        let mut data = vec![0u8; 1024];
        data[0..4].copy_from_slice(RECORD_SIGNATURE);
        data[20..22].copy_from_slice(&56u16.to_le_bytes());
        let mut pos = 56;
        for attribute in attributes {
            data[pos..pos + attribute.len()].copy_from_slice(attribute);
            pos += attribute.len();
        }
        data[pos..pos + 4].copy_from_slice(&attr_type::END.to_le_bytes());
        data[24..28].copy_from_slice(&((pos + 8) as u32).to_le_bytes());
        data[28..32].copy_from_slice(&1024u32.to_le_bytes());
        data
    }

    fn file_name_content(parent: u64, name: &str, namespace: u8) -> Vec<u8> {
        let units: Vec<u16> = name.encode_utf16().collect();
        let mut content = vec![0u8; 58 + units.len() * 2];
        content[0..8].copy_from_slice(&parent.to_le_bytes());
        content[56] = units.len() as u8;
        content[57] = namespace;
        for (i, unit) in units.iter().enumerate() {
            content[58 + i * 2..60 + i * 2].copy_from_slice(&unit.to_le_bytes());
        }
        content
    }

    #[test]
    fn test_walk_and_decode_file_name() {
        let content = file_name_content(5, "report.txt", 1);
        let record = record_with_attributes(&[resident_attribute(attr_type::FILE_NAME, &content)]);
        let header = MftRecordHeader::parse(&record).unwrap();

        let mut walker = AttributeWalker::new(&record, &header);
        let view = walker.next().unwrap().unwrap();
        assert_eq!(view.type_code(), attr_type::FILE_NAME);
        assert!(!view.is_non_resident());

        let parsed = FileNameAttr::parse(view.resident_content().unwrap()).unwrap();
        assert_eq!(parsed.name, "report.txt");
        assert_eq!(parsed.parent_reference, 5);
        assert_eq!(parsed.namespace, FileNamespace::Win32);

        assert!(walker.next().is_none());
    }

    #[test]
    fn test_oversized_attribute_is_malformed() {
        let mut record = record_with_attributes(&[]);
        // One attribute claiming to be longer than the record
        record[56..60].copy_from_slice(&attr_type::DATA.to_le_bytes());
        record[60..64].copy_from_slice(&0xFFFFu32.to_le_bytes());
        record[24..28].copy_from_slice(&1024u32.to_le_bytes());
        let header = MftRecordHeader::parse(&record).unwrap();

        let mut walker = AttributeWalker::new(&record, &header);
        assert!(matches!(
            walker.next(),
            Some(Err(NtfsError::MalformedAttributeChain { .. }))
        ));
        // Iterator fuses after the failure
        assert!(walker.next().is_none());
    }

    #[test]
    fn test_standard_info_permissions() {
        let mut content = vec![0u8; 48];
        content[0..8].copy_from_slice(&100u64.to_le_bytes());
        content[32..36].copy_from_slice(&0x20u32.to_le_bytes());
        let info = parse_standard_info(&content).unwrap();
        assert_eq!(info.created, 100);
        assert_eq!(info.dos_permissions, 0x20);
    }
}
