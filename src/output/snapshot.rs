//! CSV snapshot persistence
//!
//! The snapshot has a fixed header:
//! `id,titulo,preco,rating,disponibilidade,categoria,imagem_url`.
//! Absent values are written as empty cells. When reading, empty cells and
//! the literal `None` both mean "absent" for the numeric columns.

use crate::record::NormalizedRecord;
use crate::PersistenceError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column layout of one snapshot row
#[derive(Debug, Serialize)]
struct SnapshotRow<'a> {
    id: u32,
    #[serde(rename = "titulo")]
    title: &'a str,
    #[serde(rename = "preco")]
    price: Option<f64>,
    rating: Option<u8>,
    #[serde(rename = "disponibilidade")]
    availability: Option<&'a str>,
    #[serde(rename = "categoria")]
    category: Option<&'a str>,
    #[serde(rename = "imagem_url")]
    image_url: Option<&'a str>,
}

impl<'a> From<&'a NormalizedRecord> for SnapshotRow<'a> {
    fn from(record: &'a NormalizedRecord) -> Self {
        Self {
            id: record.id,
            title: &record.title,
            price: record.price,
            rating: record.rating,
            availability: record.availability.as_deref(),
            category: record.category.as_deref(),
            image_url: record.image_url.as_deref(),
        }
    }
}

/// Raw cells of a row as read back, before typing
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SnapshotCells {
    id: Option<String>,
    titulo: Option<String>,
    preco: Option<String>,
    rating: Option<String>,
    disponibilidade: Option<String>,
    categoria: Option<String>,
    imagem_url: Option<String>,
}

impl SnapshotCells {
    fn into_record(self) -> NormalizedRecord {
        NormalizedRecord {
            id: self
                .id
                .and_then(|id| id.trim().parse().ok())
                .unwrap_or(0),
            title: self.titulo.map(|t| t.trim().to_string()).unwrap_or_default(),
            price: numeric_cell(self.preco),
            rating: numeric_cell(self.rating),
            availability: text_cell(self.disponibilidade),
            category: text_cell(self.categoria),
            image_url: text_cell(self.imagem_url),
        }
    }
}

/// Parses a numeric cell; empty, `None`, and non-numeric text are absent
fn numeric_cell<T: std::str::FromStr>(cell: Option<String>) -> Option<T> {
    let cell = cell?;
    let cell = cell.trim();
    if cell.is_empty() || cell == "None" {
        return None;
    }
    cell.parse().ok()
}

fn text_cell(cell: Option<String>) -> Option<String> {
    cell.filter(|c| !c.is_empty())
}

/// Writes records to a CSV snapshot, replacing any existing file
///
/// Parent directories are created as needed. An empty record set writes
/// nothing and logs a warning.
///
/// # Returns
///
/// * `Ok(usize)` - Number of rows written (0 when `records` is empty)
/// * `Err(PersistenceError)` - The file could not be created or written
pub fn write_snapshot(
    records: &[NormalizedRecord],
    path: &Path,
) -> Result<usize, PersistenceError> {
    if records.is_empty() {
        tracing::warn!("No records to write, leaving {} untouched", path.display());
        return Ok(0);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(SnapshotRow::from(record))?;
    }
    writer.flush().map_err(|source| PersistenceError::Io {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(records.len())
}

/// Reads a CSV snapshot back into records
///
/// A missing file is not an error and yields an empty vector.
pub fn read_snapshot(path: &Path) -> Result<Vec<NormalizedRecord>, PersistenceError> {
    if !path.exists() {
        tracing::debug!("No snapshot at {}", path.display());
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize::<SnapshotCells>() {
        records.push(row?.into_record());
    }

    Ok(records)
}
