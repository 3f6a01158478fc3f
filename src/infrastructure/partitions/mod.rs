//! Partition table scanners

mod mbr;

pub use mbr::{MbrScanner, PARTITION_TABLE_OFFSET, PRIMARY_PARTITIONS};
