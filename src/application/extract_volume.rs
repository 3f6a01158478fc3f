//! Extract volume use case
//!
//! Orchestrates the full pipeline against one device: scan the MBR for
//! NTFS partitions, then per partition parse the boot sector, linearize
//! the MFT into `<output_dir>/<index>.mft` and catalog the result.
//! Partition-level problems never stop the remaining partitions; the
//! report records how each one fared.

use crate::application::dto::ExtractOptions;
use crate::domain::entities::{PartitionEntry, PartitionOutcome, VolumeReport};
use crate::domain::repositories::{BlockDeviceReader, NtfsError};
use crate::infrastructure::file_systems::ntfs::{
    MftExtractor, NtfsBootSector, RecordCataloger, BOOT_SECTOR_SIZE,
};
use crate::infrastructure::partitions::MbrScanner;
use crate::infrastructure::persistence::LocalMftSink;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

/// Progress callback type: (bytes copied, bytes total)
pub type ProgressCallback = Box<dyn Fn(u64, u64)>;

/// Extract volume use case
pub struct ExtractVolumeUseCase;

impl ExtractVolumeUseCase {
    /// Creates the use case
    pub fn new() -> Self {
        Self
    }

    /// Executes the pipeline and returns the per-partition report
    pub fn execute<R: BlockDeviceReader>(
        &self,
        device: &mut R,
        options: &ExtractOptions,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<VolumeReport> {
        let start_time = Instant::now();
        let mut report = VolumeReport::new(device.path().to_string());

        let partitions = MbrScanner::ntfs_partitions(device)
            .context("Failed to read the MBR partition table")?;

        for partition in partitions {
            if let Some(only) = options.partition {
                if partition.index != only {
                    continue;
                }
            }

            let sink_path = options.output_dir.join(format!("{}.mft", partition.index));
            let outcome =
                self.process_partition(device, &partition, &sink_path, progress_callback.as_deref());
            report.outcomes.push(outcome);
        }

        log::info!(
            "Processed {} NTFS partition(s) on {} in {:.2}s",
            report.outcomes.len(),
            device.path(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    /// Runs extraction and cataloging for one partition
    fn process_partition<R: BlockDeviceReader>(
        &self,
        device: &mut R,
        partition: &PartitionEntry,
        sink_path: &PathBuf,
        progress: Option<&dyn Fn(u64, u64)>,
    ) -> PartitionOutcome {
        let partition_base = partition.absolute_byte_offset();

        let boot = match device
            .read_at(partition_base, BOOT_SECTOR_SIZE)
            .map_err(NtfsError::from)
            .and_then(|data| NtfsBootSector::parse(&data))
        {
            Ok(boot) => boot,
            Err(e) => {
                log::warn!("Partition {}: {e}; skipping", partition.index);
                return PartitionOutcome::SkippedBadBootSector {
                    partition: partition.clone(),
                    reason: e.to_string(),
                };
            }
        };

        let mut sink = match LocalMftSink::create(sink_path) {
            Ok(sink) => sink,
            Err(e) => {
                return PartitionOutcome::Failed {
                    partition: partition.clone(),
                    reason: e.to_string(),
                };
            }
        };

        let summary = match MftExtractor::new(device, &boot, partition_base)
            .extract(&mut sink, progress)
        {
            Ok(summary) => summary,
            Err(e) => {
                log::error!("Partition {}: {e}", partition.index);
                return PartitionOutcome::Failed {
                    partition: partition.clone(),
                    reason: e.to_string(),
                };
            }
        };

        let catalog = match File::open(sink_path)
            .map_err(|e| NtfsError::Sink(e.into()))
            .and_then(|file| {
                RecordCataloger::new(summary.record_size as usize).catalog(BufReader::new(file))
            }) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("Partition {}: cataloging failed: {e}", partition.index);
                return PartitionOutcome::Failed {
                    partition: partition.clone(),
                    reason: e.to_string(),
                };
            }
        };

        log::info!(
            "Partition {}: {} records cataloged from {}",
            partition.index,
            catalog.len(),
            sink_path.display()
        );

        PartitionOutcome::Extracted {
            partition: partition.clone(),
            mft_path: sink_path.clone(),
            summary,
            catalog,
        }
    }
}

impl Default for ExtractVolumeUseCase {
    fn default() -> Self {
        Self::new()
    }
}
