//! MFT extraction
//!
//! Stage A of the decoder: locate the volume's first MFT record, prove
//! it is `$MFT`, follow the non-resident `$DATA` run list, and stream
//! every fragment into a sink as a linearized MFT. Each fragment is
//! preceded by a marker naming its absolute device offset so Stage B
//! can attribute records to their true location.

use crate::domain::entities::MftSummary;
use crate::domain::repositories::{
    BlockDeviceError, BlockDeviceReader, FragmentOrigin, FragmentSink, NtfsError,
};

use super::attribute::{attr_type, AttributeWalker, FileNameAttr};
use super::boot_sector::NtfsBootSector;
use super::record::{apply_fixups, MftRecordHeader};
use super::run_list::{decode_run_list, DataRun};

/// Name the MFT's own record must carry
const MFT_NAME: &str = "$MFT";

/// Largest record size accepted from a BPB before the partition is
/// considered bogus
const MAX_RECORD_SIZE: u64 = 1 << 20;

/// Progress callback: (bytes copied, bytes total)
pub type ProgressFn<'a> = dyn Fn(u64, u64) + 'a;

/// Extracts the linearized MFT of one NTFS partition
pub struct MftExtractor<'a, R: BlockDeviceReader> {
    device: &'a mut R,
    boot: &'a NtfsBootSector,
    partition_base: u64,
}

impl<'a, R: BlockDeviceReader> MftExtractor<'a, R> {
    /// Creates an extractor for a partition starting at `partition_base`
    pub fn new(device: &'a mut R, boot: &'a NtfsBootSector, partition_base: u64) -> Self {
        Self { device, boot, partition_base }
    }

    /// Runs the extraction, writing fragments into `sink`
    ///
    /// On any failure the sink is discarded before the error is
    /// returned; on success the sink is finished.
    pub fn extract<S: FragmentSink>(
        &mut self,
        sink: &mut S,
        progress: Option<&ProgressFn<'_>>,
    ) -> Result<MftSummary, NtfsError> {
        match self.extract_inner(sink, progress) {
            Ok(summary) => {
                sink.finish()?;
                Ok(summary)
            }
            Err(e) => {
                if let Err(discard_err) = sink.discard() {
                    log::warn!("Failed to discard MFT sink: {discard_err}");
                }
                Err(e)
            }
        }
    }

    fn extract_inner<S: FragmentSink>(
        &mut self,
        sink: &mut S,
        progress: Option<&ProgressFn<'_>>,
    ) -> Result<MftSummary, NtfsError> {
        let record_size = self.boot.mft_record_size();
        if record_size < 512 || record_size > MAX_RECORD_SIZE {
            return Err(NtfsError::BadBootSector(format!(
                "implausible MFT record size {record_size}"
            )));
        }

        let mft_offset = self.boot.mft_absolute_offset(self.partition_base);
        log::info!(
            "Reading first MFT record at device offset {mft_offset} (record size {record_size})"
        );

        let mut record = self
            .device
            .read_at(mft_offset, record_size as usize)
            .map_err(NtfsError::MftRead)?;

        // The record must prove it is $MFT before its runs are trusted
        let header = MftRecordHeader::parse(&record).map_err(|_| NtfsError::MftNotFound(None))?;
        apply_fixups(&mut record, &header).map_err(|_| NtfsError::MftNotFound(None))?;

        let (name, runs, real_size) = self.parse_mft_record(&record, &header)?;
        if name.as_deref() != Some(MFT_NAME) {
            return Err(NtfsError::MftNotFound(name));
        }

        let cluster_size = self.boot.cluster_size();
        let total_bytes: u64 = runs.iter().map(|run| run.length * cluster_size).sum();
        let mut copied: u64 = 0;
        let mut sparse_fragments = 0usize;

        for run in &runs {
            match run.lcn {
                Some(lcn) => {
                    let offset = (self.partition_base as i64)
                        .checked_add(lcn.checked_mul(cluster_size as i64).unwrap_or(i64::MIN))
                        .filter(|&o| o >= 0)
                        .ok_or_else(|| {
                            NtfsError::MftRead(BlockDeviceError::Other(format!(
                                "MFT run at LCN {lcn} lies before the device start"
                            )))
                        })? as u64;

                    self.device.seek_abs(offset).map_err(NtfsError::MftRead)?;
                    sink.begin_fragment(FragmentOrigin::Device(self.device.position()))?;
                    self.copy_run(sink, run.length, cluster_size, &mut copied, total_bytes, progress)?;
                }
                None => {
                    // Sparse run: zero fill behind a storage-less marker
                    sparse_fragments += 1;
                    sink.begin_fragment(FragmentOrigin::Sparse)?;
                    let zeros = vec![0u8; cluster_size as usize];
                    for _ in 0..run.length {
                        sink.write(&zeros)?;
                        copied += cluster_size;
                        if let Some(callback) = progress {
                            callback(copied, total_bytes);
                        }
                    }
                }
            }
        }

        log::info!(
            "Linearized MFT: {} fragment(s), {copied} bytes",
            runs.len()
        );

        Ok(MftSummary {
            fragments: runs.len(),
            sparse_fragments,
            mft_bytes: copied,
            record_size: record_size as u32,
            data_real_size: real_size,
        })
    }

    /// Walks the `$MFT` record for its primary name and `$DATA` runs
    fn parse_mft_record(
        &self,
        record: &[u8],
        header: &MftRecordHeader,
    ) -> Result<(Option<String>, Vec<DataRun>, u64), NtfsError> {
        let mut best_name: Option<FileNameAttr> = None;
        let mut runs: Option<(Vec<DataRun>, u64)> = None;

        for attribute in AttributeWalker::new(record, header) {
            let view = attribute.map_err(|_| NtfsError::MftNotFound(None))?;
            match view.type_code() {
                attr_type::FILE_NAME if !view.is_non_resident() => {
                    let parsed = FileNameAttr::parse(view.resident_content()?)?;
                    let better = best_name
                        .as_ref()
                        .is_none_or(|current| parsed.namespace.rank() > current.namespace.rank());
                    if better {
                        best_name = Some(parsed);
                    }
                }
                attr_type::DATA if view.is_non_resident() && view.name().is_none() => {
                    let (runlist, tail) = view.non_resident()?;
                    runs = Some((decode_run_list(runlist)?, tail.real_size));
                }
                _ => {}
            }
        }

        let name = best_name.map(|attr| attr.name);
        // $MFT's $DATA is always non-resident; a record without one is not $MFT
        let (runs, real_size) = runs.ok_or_else(|| NtfsError::MftNotFound(name.clone()))?;
        Ok((name, runs, real_size))
    }

    /// Streams one backed run into the sink, cluster by cluster
    fn copy_run<S: FragmentSink>(
        &mut self,
        sink: &mut S,
        length_clusters: u64,
        cluster_size: u64,
        copied: &mut u64,
        total_bytes: u64,
        progress: Option<&ProgressFn<'_>>,
    ) -> Result<(), NtfsError> {
        let mut buf = vec![0u8; cluster_size as usize];
        for _ in 0..length_clusters {
            self.device.read_exact(&mut buf).map_err(NtfsError::MftRead)?;
            sink.write(&buf)?;
            *copied += cluster_size;
            if let Some(callback) = progress {
                callback(*copied, total_bytes);
            }
        }
        Ok(())
    }
}
