//! File entry entity
//!
//! One cataloged MFT record: its identity, classification, primary name
//! and the locations that tie it back to the device. Entries outlive the
//! raw record buffers they were decoded from.

use serde::Serialize;

/// MFT record flag: the record is in use
pub const RECORD_FLAG_IN_USE: u16 = 0x01;

/// MFT record flag: the record describes a directory
pub const RECORD_FLAG_IS_DIRECTORY: u16 = 0x02;

/// Classification of an MFT record by its header flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordClass {
    /// Flags 0x01: an in-use file
    File,
    /// Flags 0x03: an in-use directory
    Directory,
    /// Flags 0x00: a deleted file
    DeletedFile,
    /// Flags 0x02: a deleted directory
    DeletedDirectory,
    /// Any other flag combination
    Other,
    /// The attribute chain was malformed; the entry carries whatever
    /// decoded before the walk stopped
    BadAttributes,
}

impl RecordClass {
    /// Classifies raw header flags per the IN_USE / IS_DIRECTORY bits
    pub fn from_flags(flags: u16) -> Self {
        match flags {
            0x00 => RecordClass::DeletedFile,
            0x01 => RecordClass::File,
            0x02 => RecordClass::DeletedDirectory,
            0x03 => RecordClass::Directory,
            _ => RecordClass::Other,
        }
    }

    /// Human-readable label
    pub fn name(&self) -> &'static str {
        match self {
            RecordClass::File => "file",
            RecordClass::Directory => "directory",
            RecordClass::DeletedFile => "deleted file",
            RecordClass::DeletedDirectory => "deleted directory",
            RecordClass::Other => "other",
            RecordClass::BadAttributes => "bad attributes",
        }
    }
}

/// Namespace of a `$FILE_NAME` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileNamespace {
    Posix,
    Win32,
    Dos,
    Win32AndDos,
}

impl FileNamespace {
    /// Maps the on-disk namespace byte; unknown values fall back to POSIX
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => FileNamespace::Win32,
            2 => FileNamespace::Dos,
            3 => FileNamespace::Win32AndDos,
            _ => FileNamespace::Posix,
        }
    }

    /// Preference rank when a record carries several names:
    /// WIN32_AND_DOS > WIN32 > DOS > POSIX
    pub fn rank(&self) -> u8 {
        match self {
            FileNamespace::Win32AndDos => 3,
            FileNamespace::Win32 => 2,
            FileNamespace::Dos => 1,
            FileNamespace::Posix => 0,
        }
    }
}

/// Decoded `$STANDARD_INFORMATION` content
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StandardInfo {
    /// Creation time (FILETIME)
    pub created: u64,
    /// Last data modification time (FILETIME)
    pub modified: u64,
    /// Last MFT record modification time (FILETIME)
    pub mft_modified: u64,
    /// Last access time (FILETIME)
    pub accessed: u64,
    /// DOS file permission bits
    pub dos_permissions: u32,
}

/// One cataloged MFT record
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    /// MFT record number from the record header
    pub record_number: u32,
    /// Sequence number (reuse counter) of the record
    pub sequence: u16,
    /// Raw header flags
    pub flags: u16,
    /// Classification derived from `flags` (or BadAttributes)
    pub class: RecordClass,
    /// Primary file name, selected by namespace preference
    pub primary_name: Option<String>,
    /// Namespace of the primary name
    pub namespace: Option<FileNamespace>,
    /// Parent directory file reference (low 48 bits: record number)
    pub parent_reference: u64,
    /// Hard link count from the record header
    pub hard_link_count: u16,
    /// `$STANDARD_INFORMATION` content, when present and resident
    pub standard_info: Option<StandardInfo>,
    /// Real size of the unnamed `$DATA` stream
    pub data_size: Option<u64>,
    /// Whether the unnamed `$DATA` stream is resident in the record
    pub data_resident: Option<bool>,
    /// Number of runs backing a non-resident `$DATA` stream
    pub data_fragments: Option<u32>,
    /// Absolute device offset of the MFT fragment this record came from
    pub fragment_origin_offset: u64,
}

impl FileEntry {
    /// Record number of the parent directory (the reference sans sequence)
    pub fn parent_record_number(&self) -> u64 {
        self.parent_reference & 0x0000_FFFF_FFFF_FFFF
    }

    /// Display name, falling back to a placeholder for nameless records
    pub fn display_name(&self) -> &str {
        self.primary_name.as_deref().unwrap_or("<no name>")
    }
}
