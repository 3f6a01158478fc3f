//! Ariadne - NTFS MFT Extractor
//!
//! A forensic, read-only extractor that reconstructs the Master File
//! Table of every NTFS partition on a raw block device — following its
//! cluster runs even when the table is fragmented — and catalogs the
//! files, directories, and deleted entities it describes.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::*;
pub use domain::entities::*;
pub use domain::repositories::*;
