//! CLI commands using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ariadne - NTFS MFT Extractor
///
/// A forensic, read-only extractor that reconstructs the Master File
/// Table of every NTFS partition on a raw block device and catalogs
/// the files, directories, and deleted entities it describes.
#[derive(Parser)]
#[command(name = "ariadne")]
#[command(version = "0.1.0")]
#[command(about = "Extract NTFS file tables from raw block devices", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Linearize and catalog the MFT of every NTFS partition
    Extract {
        /// Path to device or image file (e.g., /dev/sda, disk.img)
        #[arg(short = 'D', long)]
        device: String,

        /// Output directory for the <index>.mft files
        #[arg(short, long, default_value = "./extracted")]
        output: PathBuf,

        /// Only process this partition table slot (0..=3)
        #[arg(short, long)]
        partition: Option<usize>,

        /// Also write each catalog as JSON next to its .mft file
        #[arg(long)]
        json: bool,
    },

    /// Print the MBR partition table
    Partitions {
        /// Path to device or image file
        #[arg(short = 'D', long)]
        device: String,
    },

    /// Catalog an already-linearized .mft file
    Catalog {
        /// Path to a linearized MFT file
        #[arg(short, long)]
        mft: PathBuf,

        /// MFT record size in bytes
        #[arg(short, long, default_value = "1024")]
        record_size: usize,

        /// Print the catalog as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show device information
    Info {
        /// Path to device or image file
        #[arg(short = 'D', long)]
        device: String,
    },
}
