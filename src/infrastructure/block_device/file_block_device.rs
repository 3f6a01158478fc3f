//! File-backed block device implementation
//!
//! Provides raw read access to block devices and disk images through
//! standard file I/O. Works for /dev nodes and image files alike.

use crate::domain::repositories::{BlockDeviceError, BlockDeviceReader, DeviceInfo};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Block device reader over `std::fs::File`
///
/// Maintains a single byte cursor, mirroring the file's own cursor.
///
/// # Example
///
/// ```ignore
/// let mut device = FileBlockDevice::open("/dev/sda")?;
/// let mbr = device.read_at(0, 512)?;
/// ```
pub struct FileBlockDevice {
    file: File,
    path: String,
    size: u64,
    position: u64,
}

impl FileBlockDevice {
    /// Gets the device/file size
    fn probe_size(file: &mut File, path: &Path) -> Result<u64, BlockDeviceError> {
        let metadata = file.metadata().map_err(BlockDeviceError::IoError)?;

        if metadata.is_file() {
            return Ok(metadata.len());
        }

        // Block devices report len() == 0; seek to the end instead
        let size = file
            .seek(SeekFrom::End(0))
            .map_err(BlockDeviceError::IoError)?;
        file.seek(SeekFrom::Start(0))
            .map_err(BlockDeviceError::IoError)?;

        if size == 0 {
            Err(BlockDeviceError::Other(format!(
                "Could not determine size of {}",
                path.display()
            )))
        } else {
            Ok(size)
        }
    }
}

impl BlockDeviceReader for FileBlockDevice {
    fn open(path: &str) -> Result<Self, BlockDeviceError> {
        let path_obj = Path::new(path);

        if !path_obj.exists() {
            return Err(BlockDeviceError::DeviceNotFound(path.to_string()));
        }

        let mut file = OpenOptions::new().read(true).open(path_obj).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                BlockDeviceError::PermissionDenied(format!("{path} - try running with sudo"))
            } else {
                BlockDeviceError::IoError(e)
            }
        })?;

        let size = Self::probe_size(&mut file, path_obj)?;

        Ok(Self {
            file,
            path: path.to_string(),
            size,
            position: 0,
        })
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            path: self.path.clone(),
            size: self.size,
            read_only: true,
        }
    }

    fn seek_abs(&mut self, offset: u64) -> Result<(), BlockDeviceError> {
        if offset > self.size {
            return Err(BlockDeviceError::InvalidOffset {
                offset,
                device_size: self.size,
            });
        }
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|source| BlockDeviceError::Seek { offset, source })?;
        self.position = offset;
        Ok(())
    }

    fn seek_rel(&mut self, delta: i64) -> Result<(), BlockDeviceError> {
        let target = self.position.checked_add_signed(delta).ok_or(
            BlockDeviceError::InvalidOffset {
                offset: u64::MAX,
                device_size: self.size,
            },
        )?;
        self.seek_abs(target)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), BlockDeviceError> {
        let offset = self.position;
        let wanted = buf.len();

        if offset + wanted as u64 > self.size {
            let got = self.size.saturating_sub(offset) as usize;
            return Err(BlockDeviceError::ShortRead { offset, wanted, got });
        }

        self.file.read_exact(buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                BlockDeviceError::ShortRead { offset, wanted, got: 0 }
            } else {
                BlockDeviceError::IoError(e)
            }
        })?;

        self.position += wanted as u64;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_nonexistent() {
        let result = FileBlockDevice::open("/nonexistent/device");
        assert!(matches!(result, Err(BlockDeviceError::DeviceNotFound(_))));
    }

    #[test]
    fn test_cursor_tracks_reads() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"0123456789abcdef").unwrap();
        file.flush().unwrap();

        let mut device = FileBlockDevice::open(file.path().to_str().unwrap()).unwrap();
        assert_eq!(device.position(), 0);

        device.seek_abs(4).unwrap();
        let mut buf = [0u8; 4];
        device.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"4567");
        assert_eq!(device.position(), 8);

        device.seek_rel(-8).unwrap();
        assert_eq!(device.position(), 0);
    }

    #[test]
    fn test_read_at_convenience() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Hello, raw device!").unwrap();
        file.flush().unwrap();

        let mut device = FileBlockDevice::open(file.path().to_str().unwrap()).unwrap();
        let data = device.read_at(7, 3).unwrap();
        assert_eq!(&data, b"raw");
    }

    #[test]
    fn test_short_read_reported() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"tiny").unwrap();
        file.flush().unwrap();

        let mut device = FileBlockDevice::open(file.path().to_str().unwrap()).unwrap();
        let mut buf = [0u8; 16];
        let err = device.read_exact(&mut buf).unwrap_err();
        assert!(matches!(err, BlockDeviceError::ShortRead { wanted: 16, .. }));
    }

    #[test]
    fn test_seek_past_end_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"data").unwrap();
        file.flush().unwrap();

        let mut device = FileBlockDevice::open(file.path().to_str().unwrap()).unwrap();
        assert!(matches!(
            device.seek_abs(100),
            Err(BlockDeviceError::InvalidOffset { .. })
        ));
    }
}
