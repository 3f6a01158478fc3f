//! Shared builders for synthetic NTFS volumes, MFT records, and
//! linearized MFT streams used across the integration tests.
#![allow(dead_code)]

/// Record size used by every synthetic volume (BPB value -10)
pub const RECORD_SIZE: usize = 1024;

/// Attribute type codes used by the builders
pub const ATTR_STANDARD_INFORMATION: u32 = 0x10;
pub const ATTR_FILE_NAME: u32 = 0x30;
pub const ATTR_DATA: u32 = 0x80;
pub const ATTR_END: u32 = 0xFFFF_FFFF;

fn unsigned_width(value: u64) -> usize {
    let mut width = 1;
    while width < 8 && value >> (8 * width) != 0 {
        width += 1;
    }
    width
}

fn signed_width(value: i64) -> usize {
    for width in 1..8 {
        let bound = 1i64 << (8 * width - 1);
        if value >= -bound && value < bound {
            return width;
        }
    }
    8
}

/// Encodes one data run (length in clusters, optional LCN delta)
pub fn encode_run(length: u64, delta: Option<i64>) -> Vec<u8> {
    let length_width = unsigned_width(length);
    let mut run = Vec::new();
    match delta {
        None => {
            run.push(length_width as u8);
            run.extend_from_slice(&length.to_le_bytes()[..length_width]);
        }
        Some(delta) => {
            let offset_width = signed_width(delta);
            run.push(((offset_width as u8) << 4) | length_width as u8);
            run.extend_from_slice(&length.to_le_bytes()[..length_width]);
            run.extend_from_slice(&delta.to_le_bytes()[..offset_width]);
        }
    }
    run
}

/// Encodes a full run list from (length, absolute LCN) pairs
///
/// Deltas are computed against the previous non-sparse run's LCN, the
/// way NTFS stores them; a trailing zero byte terminates the list.
pub fn encode_run_list(runs: &[(u64, Option<i64>)]) -> Vec<u8> {
    let mut encoded = Vec::new();
    let mut previous_lcn = 0i64;
    for &(length, lcn) in runs {
        match lcn {
            None => encoded.extend_from_slice(&encode_run(length, None)),
            Some(lcn) => {
                encoded.extend_from_slice(&encode_run(length, Some(lcn - previous_lcn)));
                previous_lcn = lcn;
            }
        }
    }
    encoded.push(0);
    encoded
}

/// Builds `$FILE_NAME` content bytes
pub fn file_name_content(parent_reference: u64, name: &str, namespace: u8) -> Vec<u8> {
    let units: Vec<u16> = name.encode_utf16().collect();
    let mut content = vec![0u8; 58 + units.len() * 2];
    content[0..8].copy_from_slice(&parent_reference.to_le_bytes());
    content[56] = units.len() as u8;
    content[57] = namespace;
    for (i, unit) in units.iter().enumerate() {
        content[58 + i * 2..60 + i * 2].copy_from_slice(&unit.to_le_bytes());
    }
    content
}

/// Builds `$STANDARD_INFORMATION` content bytes
pub fn standard_info_content(dos_permissions: u32) -> Vec<u8> {
    let mut content = vec![0u8; 48];
    content[0..8].copy_from_slice(&116_444_736_0000_0000u64.to_le_bytes());
    content[32..36].copy_from_slice(&dos_permissions.to_le_bytes());
    content
}

fn align8(len: usize) -> usize {
    len.div_ceil(8) * 8
}

/// Builds one resident attribute (common header + resident tail + content)
pub fn resident_attribute(type_code: u32, content: &[u8]) -> Vec<u8> {
    let length = align8(24 + content.len());
    let mut raw = vec![0u8; length];
    raw[0..4].copy_from_slice(&type_code.to_le_bytes());
    raw[4..8].copy_from_slice(&(length as u32).to_le_bytes());
    // resident tail: content length u32, content offset u16
    raw[16..20].copy_from_slice(&(content.len() as u32).to_le_bytes());
    raw[20..22].copy_from_slice(&24u16.to_le_bytes());
    raw[24..24 + content.len()].copy_from_slice(content);
    raw
}

/// Builds one non-resident attribute carrying a run list
pub fn non_resident_attribute(type_code: u32, run_list: &[u8], real_size: u64) -> Vec<u8> {
    let length = align8(64 + run_list.len());
    let mut raw = vec![0u8; length];
    raw[0..4].copy_from_slice(&type_code.to_le_bytes());
    raw[4..8].copy_from_slice(&(length as u32).to_le_bytes());
    raw[8] = 1; // non-resident
    raw[32..34].copy_from_slice(&64u16.to_le_bytes()); // run list offset
    raw[40..48].copy_from_slice(&real_size.to_le_bytes()); // allocated
    raw[48..56].copy_from_slice(&real_size.to_le_bytes()); // real
    raw[56..64].copy_from_slice(&real_size.to_le_bytes()); // initialized
    raw[64..64 + run_list.len()].copy_from_slice(run_list);
    raw
}

/// Builder for one synthetic MFT record
pub struct RecordBuilder {
    record_number: u32,
    flags: u16,
    attributes: Vec<Vec<u8>>,
    with_fixup: bool,
}

impl RecordBuilder {
    pub fn new(record_number: u32, flags: u16) -> Self {
        Self {
            record_number,
            flags,
            attributes: Vec::new(),
            with_fixup: false,
        }
    }

    pub fn file_name(mut self, parent: u64, name: &str, namespace: u8) -> Self {
        self.attributes.push(resident_attribute(
            ATTR_FILE_NAME,
            &file_name_content(parent, name, namespace),
        ));
        self
    }

    pub fn standard_info(mut self, dos_permissions: u32) -> Self {
        self.attributes.push(resident_attribute(
            ATTR_STANDARD_INFORMATION,
            &standard_info_content(dos_permissions),
        ));
        self
    }

    pub fn resident_data(mut self, content: &[u8]) -> Self {
        self.attributes
            .push(resident_attribute(ATTR_DATA, content));
        self
    }

    pub fn non_resident_data(mut self, run_list: &[u8], real_size: u64) -> Self {
        self.attributes
            .push(non_resident_attribute(ATTR_DATA, run_list, real_size));
        self
    }

    pub fn raw_attribute(mut self, raw: Vec<u8>) -> Self {
        self.attributes.push(raw);
        self
    }

    /// Protects the record with an update sequence array, the way real
    /// volumes store records on disk
    pub fn with_fixup(mut self) -> Self {
        self.with_fixup = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut record = vec![0u8; RECORD_SIZE];
        record[0..4].copy_from_slice(b"FILE");
        record[0x10..0x12].copy_from_slice(&1u16.to_le_bytes()); // sequence
        record[0x12..0x14].copy_from_slice(&1u16.to_le_bytes()); // hard links
        record[0x14..0x16].copy_from_slice(&56u16.to_le_bytes()); // first attribute
        record[0x16..0x18].copy_from_slice(&self.flags.to_le_bytes());
        record[0x2C..0x30].copy_from_slice(&self.record_number.to_le_bytes());

        let mut pos = 56;
        for attribute in &self.attributes {
            record[pos..pos + attribute.len()].copy_from_slice(attribute);
            pos += attribute.len();
        }
        record[pos..pos + 4].copy_from_slice(&ATTR_END.to_le_bytes());
        pos += 8;
        record[0x18..0x1C].copy_from_slice(&(pos as u32).to_le_bytes()); // used
        record[0x1C..0x20].copy_from_slice(&(RECORD_SIZE as u32).to_le_bytes()); // allocated

        if self.with_fixup {
            // USA at offset 48: USN plus one original tail per 512-byte sector
            record[0x04..0x06].copy_from_slice(&48u16.to_le_bytes());
            record[0x06..0x08].copy_from_slice(&3u16.to_le_bytes());
            let usn = 0x5AA5u16.to_le_bytes();
            record[48..50].copy_from_slice(&usn);
            let tail_one: [u8; 2] = record[510..512].try_into().unwrap();
            let tail_two: [u8; 2] = record[1022..1024].try_into().unwrap();
            record[50..52].copy_from_slice(&tail_one);
            record[52..54].copy_from_slice(&tail_two);
            record[510..512].copy_from_slice(&usn);
            record[1022..1024].copy_from_slice(&usn);
        }

        record
    }
}

/// Builds a linearized-MFT fragment: marker plus record strides
pub fn stream_fragment(device_offset: u64, records: &[Vec<u8>]) -> Vec<u8> {
    let mut stream = Vec::new();
    stream.extend_from_slice(b"FRAG\0\0\0\0");
    stream.extend_from_slice(&device_offset.to_le_bytes());
    for record in records {
        assert_eq!(record.len(), RECORD_SIZE);
        stream.extend_from_slice(record);
    }
    stream
}

/// Geometry of a synthetic NTFS volume
#[derive(Debug, Clone, Copy)]
pub struct VolumeSpec {
    pub relative_sector: u32,
    pub total_sectors: u32,
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub mft_lcn: i64,
    pub clusters_per_mft_record: i8,
}

impl Default for VolumeSpec {
    fn default() -> Self {
        Self {
            relative_sector: 2048,
            total_sectors: 8192,
            bytes_per_sector: 512,
            sectors_per_cluster: 8,
            mft_lcn: 4,
            clusters_per_mft_record: -10,
        }
    }
}

impl VolumeSpec {
    pub fn partition_base(&self) -> u64 {
        self.relative_sector as u64 * 512
    }

    pub fn cluster_size(&self) -> u64 {
        self.bytes_per_sector as u64 * self.sectors_per_cluster as u64
    }
}

/// A complete synthetic device image with one NTFS partition
pub struct SyntheticVolume {
    pub image: Vec<u8>,
    pub spec: VolumeSpec,
}

/// Builds a device image whose MFT spans `mft_runs` and holds `records`
///
/// Record 0 ($MFT, describing the runs) is synthesized; `records` fill
/// the following record slots across the backed runs in VCN order.
/// Slots with no record stay zeroed.
pub fn build_volume(spec: VolumeSpec, mft_runs: &[(u64, Option<i64>)], records: &[Vec<u8>]) -> SyntheticVolume {
    build_volume_named(spec, mft_runs, records, "$MFT")
}

/// Like [`build_volume`] but with a chosen name on record 0, for
/// exercising the `$MFT` recognition check
pub fn build_volume_named(
    spec: VolumeSpec,
    mft_runs: &[(u64, Option<i64>)],
    records: &[Vec<u8>],
    mft_name: &str,
) -> SyntheticVolume {
    let cluster_size = spec.cluster_size();
    let partition_base = spec.partition_base();

    // Image must reach past the farthest MFT run
    let mut image_end = partition_base + spec.total_sectors as u64 * 512;
    for &(length, lcn) in mft_runs {
        if let Some(lcn) = lcn {
            let end = partition_base + (lcn as u64 + length) * cluster_size;
            image_end = image_end.max(end);
        }
    }
    let mut image = vec![0u8; image_end as usize];

    // MBR: one bootable NTFS entry in slot 0
    let table = 0x1BE;
    image[table] = 0x80;
    image[table + 4] = 0x07;
    image[table + 8..table + 12].copy_from_slice(&spec.relative_sector.to_le_bytes());
    image[table + 12..table + 16].copy_from_slice(&spec.total_sectors.to_le_bytes());

    // NTFS boot sector
    let boot = partition_base as usize;
    image[boot + 3..boot + 11].copy_from_slice(b"NTFS    ");
    image[boot + 11..boot + 13].copy_from_slice(&spec.bytes_per_sector.to_le_bytes());
    image[boot + 13] = spec.sectors_per_cluster;
    image[boot + 40..boot + 48].copy_from_slice(&(spec.total_sectors as i64).to_le_bytes());
    image[boot + 48..boot + 56].copy_from_slice(&spec.mft_lcn.to_le_bytes());
    image[boot + 64] = spec.clusters_per_mft_record as u8;
    image[boot + 510..boot + 512].copy_from_slice(&0xAA55u16.to_le_bytes());

    // $MFT record describing its own runs
    let total_clusters: u64 = mft_runs.iter().map(|&(length, _)| length).sum();
    let mft_record = RecordBuilder::new(0, 0x01)
        .standard_info(0x06)
        .file_name(5, mft_name, 3)
        .non_resident_data(&encode_run_list(mft_runs), total_clusters * cluster_size)
        .build();

    // Lay records across the backed runs in VCN order
    let records_per_cluster = (cluster_size as usize) / RECORD_SIZE;
    let mut slots: Vec<u64> = Vec::new(); // absolute byte offset per record slot
    for &(length, lcn) in mft_runs {
        let Some(lcn) = lcn else { continue };
        let run_base = partition_base + lcn as u64 * cluster_size;
        for cluster in 0..length {
            for slot in 0..records_per_cluster {
                slots.push(run_base + cluster * cluster_size + (slot * RECORD_SIZE) as u64);
            }
        }
    }
    assert!(
        records.len() + 1 <= slots.len(),
        "volume has {} record slots but {} records were supplied",
        slots.len(),
        records.len() + 1
    );
    // The boot sector's mft_lcn must point at the first backed slot
    assert_eq!(
        slots[0],
        partition_base + spec.mft_lcn as u64 * cluster_size,
        "first MFT run must start at mft_lcn"
    );

    let mut all_records = vec![mft_record];
    all_records.extend(records.iter().cloned());
    for (record, &offset) in all_records.iter().zip(slots.iter()) {
        image[offset as usize..offset as usize + RECORD_SIZE].copy_from_slice(record);
    }

    SyntheticVolume { image, spec }
}
