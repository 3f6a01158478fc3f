//! On-disk linearized MFT sink
//!
//! Writes the extractor's fragment stream to a file: a 16-byte marker
//! ("FRAG" + four zero bytes + u64 LE device offset) ahead of each
//! fragment's bytes. The resulting file is the input to the cataloger
//! and is deleted wholesale if extraction fails partway.

use crate::domain::repositories::{FragmentOrigin, FragmentSink, SinkError};
use crate::infrastructure::file_systems::ntfs::FRAGMENT_MARKER_SIGNATURE;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File-backed fragment sink
pub struct LocalMftSink {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
    bytes_written: u64,
    fragments_written: usize,
}

impl LocalMftSink {
    /// Creates the sink file, along with any missing parent directories
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| SinkError::Create {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }
        let file = File::create(path).map_err(|source| SinkError::Create {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            path: path.to_path_buf(),
            bytes_written: 0,
            fragments_written: 0,
        })
    }

    /// Path of the sink file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fragments started so far
    pub fn fragments_written(&self) -> usize {
        self.fragments_written
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>, SinkError> {
        self.writer.as_mut().ok_or_else(|| {
            SinkError::IoError(std::io::Error::other("sink already closed"))
        })
    }
}

impl FragmentSink for LocalMftSink {
    fn begin_fragment(&mut self, origin: FragmentOrigin) -> Result<(), SinkError> {
        let offset = origin.marker_offset();
        let writer = self.writer()?;
        writer.write_all(FRAGMENT_MARKER_SIGNATURE)?;
        writer.write_all(&offset.to_le_bytes())?;
        self.bytes_written += 16;
        self.fragments_written += 1;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), SinkError> {
        self.writer()?.write_all(data)?;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    fn finish(&mut self) -> Result<u64, SinkError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        log::debug!(
            "MFT sink {} complete: {} fragment(s), {} bytes",
            self.path.display(),
            self.fragments_written,
            self.bytes_written
        );
        Ok(self.bytes_written)
    }

    fn discard(&mut self) -> Result<(), SinkError> {
        self.writer = None;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
