//! Catalog ingestion from the JSON-lines asteroid dump.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use color_eyre::eyre::{self, WrapErr};
use roidnav::bodies::{BodyRecord, Catalog};
use tracing::info;

pub fn read_records(reader: impl BufRead) -> eyre::Result<Vec<BodyRecord>> {
    let mut records = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .wrap_err_with(|| format!("malformed catalog entry on line {}", lineno + 1))?;
        records.push(record);
    }
    Ok(records)
}

pub fn load_catalog(path: &Path) -> eyre::Result<Catalog> {
    let file = File::open(path).wrap_err_with(|| format!("opening catalog {}", path.display()))?;
    let records = read_records(BufReader::new(file))?;
    let catalog = Catalog::from_records(&records)?;
    info!(bodies = catalog.len(), path = %path.display(), "loaded catalog");
    Ok(catalog)
}
