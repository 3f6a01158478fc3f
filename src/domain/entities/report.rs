//! Extraction report entities
//!
//! Results of running the pipeline against one device: what the MFT
//! extractor produced per partition and how each partition fared.

use super::catalog::RecordCatalog;
use super::partition::PartitionEntry;
use serde::Serialize;
use std::path::PathBuf;

/// Summary of one linearized MFT produced by the extractor
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MftSummary {
    /// Number of fragments (data runs) written to the sink
    pub fragments: usize,
    /// Sparse fragments among them
    pub sparse_fragments: usize,
    /// MFT payload bytes written (markers excluded)
    pub mft_bytes: u64,
    /// MFT record size derived from the BPB
    pub record_size: u32,
    /// Real size the `$DATA` attribute claims for the MFT
    pub data_real_size: u64,
}

/// Outcome of processing one NTFS partition
#[derive(Debug)]
pub enum PartitionOutcome {
    /// MFT linearized and cataloged
    Extracted {
        partition: PartitionEntry,
        mft_path: PathBuf,
        summary: MftSummary,
        catalog: RecordCatalog,
    },
    /// Boot sector failed validation; the partition was skipped
    SkippedBadBootSector { partition: PartitionEntry, reason: String },
    /// Extraction failed (MFT not found or a device read error)
    Failed { partition: PartitionEntry, reason: String },
}

impl PartitionOutcome {
    /// The partition this outcome belongs to
    pub fn partition(&self) -> &PartitionEntry {
        match self {
            PartitionOutcome::Extracted { partition, .. }
            | PartitionOutcome::SkippedBadBootSector { partition, .. }
            | PartitionOutcome::Failed { partition, .. } => partition,
        }
    }

    /// Returns whether this outcome is a fatal extraction failure
    pub fn is_failure(&self) -> bool {
        matches!(self, PartitionOutcome::Failed { .. })
    }
}

/// Report for one full device run
#[derive(Debug, Default)]
pub struct VolumeReport {
    /// Path of the device that was processed
    pub device_path: String,
    /// Per-NTFS-partition outcomes, in table order
    pub outcomes: Vec<PartitionOutcome>,
}

impl VolumeReport {
    /// Creates an empty report for a device
    pub fn new(device_path: String) -> Self {
        Self { device_path, outcomes: Vec::new() }
    }

    /// Returns whether any partition failed fatally
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| o.is_failure())
    }

    /// Successfully extracted outcomes
    pub fn extracted(&self) -> impl Iterator<Item = &PartitionOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PartitionOutcome::Extracted { .. }))
    }
}
