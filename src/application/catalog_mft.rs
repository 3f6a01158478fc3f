//! Catalog MFT use case
//!
//! Runs the record cataloger over an already-linearized MFT file,
//! without touching any device. Useful for re-examining sink files
//! produced by an earlier extraction.

use crate::domain::entities::RecordCatalog;
use crate::infrastructure::file_systems::ntfs::RecordCataloger;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Catalog MFT use case
pub struct CatalogMftUseCase {
    record_size: usize,
}

impl CatalogMftUseCase {
    /// Creates the use case for a given MFT record size
    pub fn new(record_size: usize) -> Self {
        Self { record_size }
    }

    /// Catalogs a linearized MFT file
    pub fn execute(&self, mft_path: &Path) -> Result<RecordCatalog> {
        let file = File::open(mft_path)
            .with_context(|| format!("Failed to open MFT file {}", mft_path.display()))?;

        let catalog = RecordCataloger::new(self.record_size)
            .catalog(BufReader::new(file))
            .with_context(|| format!("Failed to catalog {}", mft_path.display()))?;

        log::info!(
            "Cataloged {} record(s) from {}",
            catalog.len(),
            mft_path.display()
        );
        Ok(catalog)
    }
}
