//! MFT record cataloging
//!
//! Stage B of the decoder: walk the linearized MFT stream in fixed-size
//! strides, switch fragments on the inline markers, classify each
//! record and harvest its `$FILE_NAME`, `$STANDARD_INFORMATION` and
//! `$DATA` attributes into the catalog. Structural damage never aborts
//! the walk; broken units are counted and skipped.

use crate::domain::entities::{FileEntry, RecordCatalog, RecordClass};
use crate::domain::repositories::{BlockDeviceError, NtfsError};
use std::io::Read;

use super::attribute::{attr_type, parse_standard_info, AttributeWalker, FileNameAttr};
use super::record::{apply_fixups, MftRecordHeader, RECORD_SIGNATURE};
use super::run_list::decode_run_list;

/// On-stream fragment marker signature
pub const FRAGMENT_MARKER_SIGNATURE: &[u8; 8] = b"FRAG\0\0\0\0";

/// Total marker size: signature plus a u64 device offset
pub const FRAGMENT_MARKER_SIZE: usize = 16;

/// Catalogs the records of a linearized MFT stream
pub struct RecordCataloger {
    record_size: usize,
}

impl RecordCataloger {
    /// Creates a cataloger for the given MFT record size
    pub fn new(record_size: usize) -> Self {
        debug_assert!(record_size >= FRAGMENT_MARKER_SIZE);
        Self { record_size }
    }

    /// Consumes a linearized MFT stream and builds the catalog
    pub fn catalog<T: Read>(&self, mut source: T) -> Result<RecordCatalog, NtfsError> {
        let mut catalog = RecordCatalog::new();
        let mut fragment_origin: u64 = 0;
        let mut head = [0u8; FRAGMENT_MARKER_SIZE];
        let mut record = vec![0u8; self.record_size];

        loop {
            let got = read_full(&mut source, &mut head)?;
            if got == 0 {
                break;
            }
            if got < head.len() {
                // Trailing bytes too short for a marker or a record
                catalog.note_corrupt_record();
                break;
            }

            if &head[0..8] == FRAGMENT_MARKER_SIGNATURE {
                fragment_origin = u64::from_le_bytes(head[8..16].try_into().unwrap());
                log::debug!("Entering MFT fragment at device offset {fragment_origin}");
                continue;
            }

            record[..FRAGMENT_MARKER_SIZE].copy_from_slice(&head);
            let got = read_full(&mut source, &mut record[FRAGMENT_MARKER_SIZE..])?;
            if got < self.record_size - FRAGMENT_MARKER_SIZE {
                catalog.note_corrupt_record();
                break;
            }

            if &record[0..4] == RECORD_SIGNATURE {
                self.process_record(&mut record, fragment_origin, &mut catalog);
            } else {
                catalog.note_corrupt_record();
            }
        }

        Ok(catalog)
    }

    /// Decodes one `FILE`-signatured record into a catalog entry
    fn process_record(&self, record: &mut [u8], fragment_origin: u64, catalog: &mut RecordCatalog) {
        let header = match MftRecordHeader::parse(record) {
            Ok(header) => header,
            Err(e) => {
                log::debug!("Unparseable record header: {e}");
                catalog.note_corrupt_record();
                return;
            }
        };
        if let Err(e) = apply_fixups(record, &header) {
            log::debug!("Record {}: {e}", header.record_number);
            catalog.note_corrupt_record();
            return;
        }

        let mut class = header.classify();
        let mut best_name: Option<FileNameAttr> = None;
        let mut standard_info = None;
        let mut data_size = None;
        let mut data_resident = None;
        let mut data_fragments = None;

        for attribute in AttributeWalker::new(record, &header) {
            let view = match attribute {
                Ok(view) => view,
                Err(e) => {
                    // The chain is unreliable past this point; keep what decoded
                    log::debug!("Record {}: {e}", header.record_number);
                    class = RecordClass::BadAttributes;
                    break;
                }
            };

            match view.type_code() {
                attr_type::FILE_NAME if !view.is_non_resident() => {
                    let content = match view.resident_content() {
                        Ok(content) => content,
                        Err(e) => {
                            log::debug!("Record {}: $FILE_NAME unreadable: {e}", header.record_number);
                            continue;
                        }
                    };
                    match FileNameAttr::parse(content) {
                        Ok(parsed) => {
                            let better = best_name.as_ref().is_none_or(|current| {
                                parsed.namespace.rank() > current.namespace.rank()
                            });
                            if better {
                                best_name = Some(parsed);
                            }
                        }
                        Err(e) => {
                            log::debug!("Record {}: $FILE_NAME undecodable: {e}", header.record_number);
                        }
                    }
                }
                attr_type::STANDARD_INFORMATION if !view.is_non_resident() => {
                    if let Ok(content) = view.resident_content() {
                        standard_info = parse_standard_info(content).ok();
                    }
                }
                attr_type::DATA if view.name().is_none() => {
                    if view.is_non_resident() {
                        match view.non_resident().and_then(|(runlist, tail)| {
                            decode_run_list(runlist).map(|runs| (runs, tail))
                        }) {
                            Ok((runs, tail)) => {
                                data_size = Some(tail.real_size);
                                data_resident = Some(false);
                                data_fragments = Some(runs.len() as u32);
                            }
                            Err(e) => {
                                // Drop only this attribute; the record survives
                                log::debug!("Record {}: {e}", header.record_number);
                                catalog.note_bad_run_list();
                            }
                        }
                    } else if let Ok(content) = view.resident_content() {
                        data_size = Some(content.len() as u64);
                        data_resident = Some(true);
                    }
                }
                _ => {}
            }
        }

        let (primary_name, namespace, parent_reference) = match best_name {
            Some(attr) => (Some(attr.name), Some(attr.namespace), attr.parent_reference),
            None => (None, None, 0),
        };

        catalog.insert(FileEntry {
            record_number: header.record_number,
            sequence: header.sequence,
            flags: header.flags,
            class,
            primary_name,
            namespace,
            parent_reference,
            hard_link_count: header.hard_link_count,
            standard_info,
            data_size,
            data_resident,
            data_fragments,
            fragment_origin_offset: fragment_origin,
        });
    }
}

/// Reads until the buffer is full or the stream ends; returns bytes read
fn read_full<T: Read>(source: &mut T, buf: &mut [u8]) -> Result<usize, NtfsError> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(NtfsError::MftRead(BlockDeviceError::IoError(e))),
        }
    }
    Ok(filled)
}
