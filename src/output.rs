//! Output formatting and persistence for the merged table and its report.
//!
//! Supports JSON logging, CSV write/read and a gzip copy.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tracing::{debug, info};

use crate::records::MergedRecord;

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes the merged table as CSV with a header row, replacing any existing file.
#[tracing::instrument(skip(rows), fields(rows = rows.len()))]
pub fn write_master_csv(path: &str, rows: &[MergedRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {path}"))?;

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_writer(BufWriter::new(file));

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path, "Master table written");
    Ok(())
}

pub fn read_master_csv(path: &str) -> Result<Vec<MergedRecord>> {
    let file = File::open(path).with_context(|| format!("cannot open {path}"))?;
    let mut rdr = csv::Reader::from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: MergedRecord = result?;
        rows.push(record);
    }

    debug!(path, rows = rows.len(), "Master table read");
    Ok(rows)
}

/// Writes a gzip-compressed copy of `path` to `<path>.gz` and returns its path.
pub fn gzip_copy(path: &str) -> Result<PathBuf> {
    let mut gz_path = Path::new(path).as_os_str().to_owned();
    gz_path.push(".gz");
    let gz_path = PathBuf::from(gz_path);

    let mut input = BufReader::new(File::open(path)?);
    let mut encoder = GzEncoder::new(File::create(&gz_path)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?.flush()?;

    info!(path = %gz_path.display(), "Compressed copy written");
    Ok(gz_path)
}
