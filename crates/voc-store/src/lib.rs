//! Voc Storage Layer
//!
//! Persists enriched review records to a single append-only CSV file,
//! deduplicated by `review_id`.
//!
//! # Examples
//!
//! ```no_run
//! use voc_store::CsvStore;
//!
//! let store = CsvStore::new("data");
//! let records = store.load_all().unwrap();
//! println!("{} stored reviews", records.len());
//! ```

#![warn(missing_docs)]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use voc_domain::traits::RecordSink;
use voc_domain::{AnalysisResult, EnrichedRecord, Record};

/// Column order of `reviews.csv`
pub const COLUMNS: [&str; 11] = [
    "date",
    "game",
    "genre",
    "review_id",
    "rating",
    "review_text",
    "category",
    "sentiment",
    "summary",
    "keywords",
    "priority",
];

/// File name of the review table inside the data directory
pub const REVIEWS_FILE: &str = "reviews.csv";

/// UTF-8 byte order mark, so spreadsheet tools detect the encoding
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Outcome of a save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Rows appended
    pub written: usize,

    /// Records dropped because their `review_id` was already stored
    pub skipped: usize,
}

/// One line of `reviews.csv`.
///
/// Numeric columns are kept as text so hand-edited or partially written rows
/// can still be read and filtered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CsvRow {
    #[serde(default)]
    date: String,
    #[serde(default)]
    game: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    review_id: String,
    #[serde(default)]
    rating: String,
    #[serde(default)]
    review_text: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    sentiment: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    keywords: String,
    #[serde(default)]
    priority: String,
}

impl From<&EnrichedRecord> for CsvRow {
    fn from(enriched: &EnrichedRecord) -> Self {
        let r = &enriched.record;
        let a = &enriched.analysis;
        Self {
            date: r.date.clone(),
            game: r.game.clone(),
            genre: r.genre.clone(),
            review_id: r.review_id.clone(),
            rating: r.rating.to_string(),
            review_text: r.review_text.clone(),
            category: a.category.clone(),
            sentiment: a.sentiment.clone(),
            summary: a.summary.clone(),
            keywords: a.keywords.clone(),
            priority: a.priority.to_string(),
        }
    }
}

impl CsvRow {
    /// Priority as a number, `None` unless the column is all digits
    fn priority(&self) -> Option<u8> {
        let p = self.priority.trim();
        if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        p.parse().ok()
    }

    fn into_enriched(self) -> Result<EnrichedRecord, StoreError> {
        let priority = self.priority().ok_or_else(|| {
            StoreError::InvalidData(format!(
                "review {} has non-numeric priority '{}'",
                self.review_id, self.priority
            ))
        })?;
        let rating = self.rating.trim().parse::<u8>().map_err(|_| {
            StoreError::InvalidData(format!(
                "review {} has non-numeric rating '{}'",
                self.review_id, self.rating
            ))
        })?;

        Ok(EnrichedRecord::new(
            Record {
                date: self.date,
                game: self.game,
                genre: self.genre,
                review_id: self.review_id,
                rating,
                review_text: self.review_text,
            },
            AnalysisResult {
                category: self.category,
                sentiment: self.sentiment,
                summary: self.summary,
                keywords: self.keywords,
                priority,
            },
        ))
    }
}

/// CSV-backed review table
///
/// The file only grows: `save` appends rows whose `review_id` is not stored
/// yet and never rewrites existing rows.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Store at `<data_dir>/reviews.csv`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::at(data_dir.as_ref().join(REVIEWS_FILE))
    }

    /// Store at an explicit file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the CSV file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `review_id`s already stored
    pub fn existing_ids(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .read_rows()?
            .into_iter()
            .map(|row| row.review_id)
            .filter(|id| !id.is_empty())
            .collect())
    }

    /// Append records not stored yet.
    ///
    /// Creates the directory and header when the file does not exist.
    /// Duplicates within `records` are dropped as well.
    pub fn save(&self, records: &[EnrichedRecord]) -> Result<SaveReport, StoreError> {
        if records.is_empty() {
            debug!("Nothing to save");
            return Ok(SaveReport::default());
        }

        let mut seen = self.existing_ids()?;
        let new_rows: Vec<CsvRow> = records
            .iter()
            .filter(|r| seen.insert(r.review_id().to_string()))
            .map(CsvRow::from)
            .collect();

        let report = SaveReport {
            written: new_rows.len(),
            skipped: records.len() - new_rows.len(),
        };

        if new_rows.is_empty() {
            info!("No new reviews ({} duplicates skipped)", report.skipped);
            return Ok(report);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let write_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if write_header {
            writer.write_record(COLUMNS)?;
        }
        for row in &new_rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        info!(
            "Saved {} reviews to {} ({} duplicates skipped)",
            report.written,
            self.path.display(),
            report.skipped
        );
        Ok(report)
    }

    /// Scored rows dated on or after `cutoff`.
    ///
    /// Rows whose priority is not a plain number are left out.
    pub fn load_since(&self, cutoff: NaiveDate) -> Result<Vec<EnrichedRecord>, StoreError> {
        let cutoff = cutoff.format("%Y-%m-%d").to_string();
        self.load_where(|row| row.date >= cutoff)
    }

    /// Every readable row
    pub fn load_all(&self) -> Result<Vec<EnrichedRecord>, StoreError> {
        self.load_where(|_| true)
    }

    fn load_where<F>(&self, keep: F) -> Result<Vec<EnrichedRecord>, StoreError>
    where
        F: Fn(&CsvRow) -> bool,
    {
        let mut records = Vec::new();
        for row in self.read_rows()? {
            if !keep(&row) {
                continue;
            }
            match row.into_enriched() {
                Ok(record) => records.push(record),
                Err(e) => debug!("Skipping row: {}", e),
            }
        }
        Ok(records)
    }

    fn read_rows(&self) -> Result<Vec<CsvRow>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let rows = reader
            .deserialize::<CsvRow>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl RecordSink for CsvStore {
    type Error = StoreError;

    fn persist(&mut self, records: &[EnrichedRecord]) -> Result<usize, Self::Error> {
        Ok(self.save(records)?.written)
    }
}

/// Write `rows` to a fresh CSV file with a header and a UTF-8 BOM.
///
/// Used for derived reports such as the top-issue table.
pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<(), StoreError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
