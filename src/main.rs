//! Ariadne - NTFS MFT Extractor
//!
//! A forensic, read-only extractor that reconstructs the Master File
//! Table of every NTFS partition on a raw block device and catalogs
//! the files, directories, and deleted entities it describes.

use anyhow::{bail, Context, Result};
use ariadne::application::dto::ExtractOptions;
use ariadne::application::{CatalogMftUseCase, ExtractVolumeUseCase};
use ariadne::domain::entities::{PartitionOutcome, RecordCatalog};
use ariadne::domain::repositories::BlockDeviceReader;
use ariadne::infrastructure::block_device::FileBlockDevice;
use ariadne::infrastructure::partitions::MbrScanner;
use ariadne::presentation::cli::{Cli, Commands, ProgressReporter};
use clap::Parser;
use humansize::{format_size, BINARY};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Extract {
            device,
            output,
            partition,
            json,
        } => {
            run_extract(&device, output, partition, json)?;
        }

        Commands::Partitions { device } => {
            show_partitions(&device)?;
        }

        Commands::Catalog {
            mft,
            record_size,
            json,
        } => {
            run_catalog(&mft, record_size, json)?;
        }

        Commands::Info { device } => {
            show_device_info(&device)?;
        }
    }

    Ok(())
}

/// Runs the extract command
fn run_extract(
    device_path: &str,
    output_dir: PathBuf,
    partition: Option<usize>,
    json: bool,
) -> Result<()> {
    println!("\n🧵 Ariadne NTFS MFT Extractor\n");
    println!("Device: {}", device_path);
    println!("Output: {}\n", output_dir.display());

    let mut device = FileBlockDevice::open(device_path)
        .context("Failed to open device. Make sure you have read permissions (try sudo).")?;

    let info = device.device_info();
    println!("Device size: {} ({} bytes)\n", format_size(info.size, BINARY), info.size);

    let mut options = ExtractOptions::new(device_path).with_output_dir(output_dir.clone());
    if let Some(index) = partition {
        options = options.with_partition(index);
    }

    let progress = ProgressReporter::for_extraction();
    let use_case = ExtractVolumeUseCase::new();
    let report = use_case.execute(&mut device, &options, Some(progress.extraction_callback()))?;
    progress.finish("Extraction complete");

    if report.outcomes.is_empty() {
        println!("\nNo NTFS partitions found on {}.", device_path);
        return Ok(());
    }

    for outcome in &report.outcomes {
        let index = outcome.partition().index;
        match outcome {
            PartitionOutcome::Extracted {
                mft_path,
                summary,
                catalog,
                ..
            } => {
                println!("\nPartition {index}:");
                println!(
                    "  MFT: {} ({} in {} fragment(s), record size {})",
                    mft_path.display(),
                    format_size(summary.mft_bytes, BINARY),
                    summary.fragments,
                    summary.record_size
                );
                print!("{}", indent(&catalog.summary()));

                if json {
                    let json_path = output_dir.join(format!("{index}.catalog.json"));
                    write_catalog_json(catalog, &json_path)?;
                    println!("  Catalog saved to: {}", json_path.display());
                }
            }
            PartitionOutcome::SkippedBadBootSector { reason, .. } => {
                println!("\nPartition {index}: skipped ({reason})");
            }
            PartitionOutcome::Failed { reason, .. } => {
                println!("\nPartition {index}: FAILED ({reason})");
            }
        }
    }

    if report.has_failures() {
        bail!("One or more partitions failed to extract");
    }
    Ok(())
}

/// Shows the MBR partition table
fn show_partitions(device_path: &str) -> Result<()> {
    println!("\n💽 MBR Partition Table\n");

    let mut device = FileBlockDevice::open(device_path)
        .context("Failed to open device. Make sure you have read permissions (try sudo).")?;

    let entries = MbrScanner::scan(&mut device)?;
    for entry in &entries {
        if entry.is_empty() {
            println!("  Partition {}: empty", entry.index);
            continue;
        }
        println!(
            "  Partition {}: type {:#04X}{} {} at sector {} ({})",
            entry.index,
            entry.partition_type,
            if entry.is_ntfs() { " (NTFS)" } else { "" },
            if entry.is_bootable() { "bootable," } else { "" },
            entry.relative_sector,
            format_size(entry.size_bytes(), BINARY),
        );
    }

    println!();
    Ok(())
}

/// Runs the catalog command against an existing .mft file
fn run_catalog(mft_path: &Path, record_size: usize, json: bool) -> Result<()> {
    let use_case = CatalogMftUseCase::new(record_size);
    let catalog = use_case.execute(mft_path)?;

    if json {
        serde_json::to_writer_pretty(std::io::stdout().lock(), &catalog)?;
        println!();
        return Ok(());
    }

    println!("\n📒 MFT Catalog: {}\n", mft_path.display());
    for entry in catalog.iter() {
        println!(
            "  {:>8}  {:<18} {}",
            entry.record_number,
            entry.class.name(),
            entry.display_name()
        );
    }
    println!();
    print!("{}", catalog.summary());
    Ok(())
}

/// Shows device information
fn show_device_info(device_path: &str) -> Result<()> {
    println!("\n📊 Device Information\n");

    let device = FileBlockDevice::open(device_path)
        .context("Failed to open device. Make sure you have read permissions (try sudo).")?;

    let info = device.device_info();
    println!("  Path:      {}", info.path);
    println!("  Size:      {} ({} bytes)", format_size(info.size, BINARY), info.size);
    println!("  Read-Only: {}", if info.read_only { "Yes" } else { "No" });
    println!();

    Ok(())
}

/// Writes a catalog as pretty JSON
fn write_catalog_json(catalog: &RecordCatalog, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, catalog)?;
    Ok(())
}

/// Indents a multi-line summary for nested display
fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}\n"))
        .collect()
}
