//! CSV file helpers shared by the file-backed stores
//!
//! All stored values are strings; parsing happens on read and rows that do
//! not parse are skipped rather than failing the whole file.

use super::{StoreError, StoreResult};
use chrono::NaiveDate;
use csv::StringRecord;
use std::path::Path;
use tracing::debug;
use weight_plan_shared::Measurement;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Read a whole file, treating a missing file as absent
pub(crate) async fn read_optional(path: &Path) -> StoreResult<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Replace `path` with `bytes` through a sibling temp file and a rename
pub(crate) async fn write_atomic(path: &Path, bytes: Vec<u8>) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }
    let tmp = path.with_extension("csv.tmp");
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

pub(crate) async fn remove_if_exists(path: &Path) -> StoreResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Parsed table: header plus raw records, in file order
pub(crate) struct Table {
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

impl Table {
    pub fn empty(columns: &[&str]) -> Self {
        Self {
            headers: StringRecord::from(columns.to_vec()),
            records: Vec::new(),
        }
    }

    /// Parse CSV bytes. An empty file yields an empty table with `columns`
    /// as header. Rows that are not valid UTF-8 are dropped.
    pub fn parse(bytes: &[u8], columns: &[&str]) -> StoreResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(Self::empty(columns));
        }

        let mut records = Vec::new();
        for raw in reader.byte_records() {
            match StringRecord::from_byte_record(raw?) {
                Ok(record) => records.push(record),
                Err(e) => {
                    let line = e.into_byte_record().position().map(|p| p.line());
                    debug!(?line, "Dropping row that is not valid UTF-8");
                }
            }
        }
        Ok(Self { headers, records })
    }

    /// Load `path`, or an empty table when the file does not exist yet
    pub async fn load(path: &Path, columns: &[&str]) -> StoreResult<Self> {
        match read_optional(path).await? {
            Some(bytes) => Self::parse(&bytes, columns),
            None => Ok(Self::empty(columns)),
        }
    }

    /// Position of each named column in the header
    pub fn column_indices(&self, path: &Path, columns: &[&str]) -> StoreResult<Vec<usize>> {
        columns
            .iter()
            .map(|name| {
                self.headers
                    .iter()
                    .position(|h| h == *name)
                    .ok_or_else(|| StoreError::MissingColumn {
                        path: path.to_path_buf(),
                        column: name.to_string(),
                    })
            })
            .collect()
    }

    pub fn to_bytes(&self) -> StoreResult<Vec<u8>> {
        // Ragged rows read from disk are written back as they are
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(vec![]);
        wtr.write_record(&self.headers)?;
        for record in &self.records {
            wtr.write_record(record)?;
        }
        wtr.into_inner()
            .map_err(|e| StoreError::Csv(e.into_error().into()))
    }

    pub async fn save(&self, path: &Path) -> StoreResult<()> {
        write_atomic(path, self.to_bytes()?).await
    }
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse one stored (date, weight) pair.
///
/// Returns `None` for malformed dates, non-numeric weights and non-positive
/// weights; callers drop such rows.
pub(crate) fn parse_measurement(date: &str, weight: &str) -> Option<Measurement> {
    let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()?;
    let weight_kg = weight.trim().parse::<f64>().ok()?;
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return None;
    }
    Some(Measurement::new(date, weight_kg))
}

/// Like [`parse_measurement`] but logs the dropped row
pub(crate) fn parse_measurement_logged(date: &str, weight: &str, path: &Path) -> Option<Measurement> {
    let parsed = parse_measurement(date, weight);
    if parsed.is_none() {
        debug!(path = %path.display(), date, weight, "Dropping malformed measurement row");
    }
    parsed
}
