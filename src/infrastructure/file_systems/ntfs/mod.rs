//! NTFS decoder core
//!
//! Two stages: `extractor` linearizes the MFT from disk (boot sector →
//! first record → `$DATA` runs), `cataloger` decodes the linearized
//! stream into a file catalog. The remaining modules are the shared
//! on-disk structure parsers both stages lean on.

pub mod attribute;
pub mod boot_sector;
pub mod cataloger;
pub mod extractor;
pub mod record;
pub mod run_list;

pub use boot_sector::{NtfsBootSector, BOOT_SECTOR_SIZE};
pub use cataloger::{RecordCataloger, FRAGMENT_MARKER_SIGNATURE, FRAGMENT_MARKER_SIZE};
pub use extractor::MftExtractor;
pub use run_list::{decode_run_list, DataRun};
