//! One-time reads of the boundary document and the record file.
//!
//! The async entry points stay runtime-agnostic: they do blocking file reads and can be driven
//! by any executor (or `futures::executor::block_on`).

use std::io::Read;
use std::path::Path;

use crate::boundary::BoundaryCollection;
use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::record::{EventRecord, RawRecord, RecordId, Records};

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses CSV records from any reader. Each row is normalized once; its row index becomes its id.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<EventRecord>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::None)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (idx, row) in csv.deserialize::<RawRecord>().enumerate() {
        records.push(EventRecord::from_raw(RecordId(idx), row?));
    }

    let unknown_duration = records.iter().filter(|r| !r.duration.is_known()).count();
    let without_region = records.iter().filter(|r| !r.has_region()).count();
    tracing::debug!(
        records = records.len(),
        unknown_duration,
        without_region,
        "parsed records"
    );
    Ok(records)
}

/// Synchronous variant of [`load_records`].
pub fn load_records_sync(path: impl AsRef<Path>) -> Result<Records> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(std::io::BufReader::new(file))?;
    tracing::debug!(path = %path.display(), records = records.len(), "loaded records");
    Ok(Records::from(records))
}

pub async fn load_records(path: impl AsRef<Path>) -> Result<Records> {
    load_records_sync(path)
}

/// Synchronous variant of [`load_boundaries`].
pub fn load_boundaries_sync(path: impl AsRef<Path>) -> Result<BoundaryCollection> {
    let path = path.as_ref();
    let text = read_to_string(path)?;
    let collection = BoundaryCollection::parse(&text)?;
    tracing::debug!(
        path = %path.display(),
        features = collection.features.len(),
        "loaded boundaries"
    );
    Ok(collection)
}

pub async fn load_boundaries(path: impl AsRef<Path>) -> Result<BoundaryCollection> {
    load_boundaries_sync(path)
}

/// Reads a JSON configuration object from disk.
pub fn load_config_sync(path: impl AsRef<Path>) -> Result<DashboardConfig> {
    let path = path.as_ref();
    let text = read_to_string(path)?;
    let config = DashboardConfig::from_json_str(&text)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub async fn load_config(path: impl AsRef<Path>) -> Result<DashboardConfig> {
    load_config_sync(path)
}
