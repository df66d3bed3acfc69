use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::labels::LabelDecoder;
use crate::core::record::ReferenceRecord;
use crate::core::types::{ClassIndex, NameKey};
use crate::parsing::csv::parse_database_file;
use crate::parsing::ParseError;
use crate::utils::validation::MAX_RECORDS;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to read database: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse database: {0}")]
    Parse(ParseError),

    #[error("Failed to parse database snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

impl From<ParseError> for DatabaseError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MalformedRecord { line, reason } => {
                Self::MalformedRecord(format!("line {line}: {reason}"))
            }
            other => Self::Parse(other),
        }
    }
}

/// Snapshot format version for compatibility checking
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Serializable database snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub version: String,
    pub created_at: String,
    pub records: Vec<ReferenceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
}

/// Per-class overview of a database
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseSummary {
    pub record_count: usize,
    pub empty_imprints: usize,
    pub distinct_name_keys: usize,
    pub color_classes: BTreeMap<ClassIndex, usize>,
    pub shape_classes: BTreeMap<ClassIndex, usize>,
}

/// The reference database of known drugs
///
/// Loaded once and never mutated afterwards; record order is the order the
/// scorer scans in and therefore decides ties.
#[derive(Debug, Clone, Default)]
pub struct ReferenceDatabase {
    records: Vec<ReferenceRecord>,

    /// Decoded names aligned with `records`, when the source carried them
    names: Option<Vec<String>>,
}

impl ReferenceDatabase {
    /// Create an empty database
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_records(records: Vec<ReferenceRecord>) -> Self {
        Self {
            records,
            names: None,
        }
    }

    /// Build a database from parallel columns.
    ///
    /// Index `i` of every column describes the same drug.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::MalformedRecord` if the columns differ in length.
    pub fn from_columns(
        imprints: Vec<String>,
        color_classes: Vec<ClassIndex>,
        shape_classes: Vec<ClassIndex>,
        name_keys: Vec<NameKey>,
    ) -> Result<Self, DatabaseError> {
        let len = imprints.len();
        if color_classes.len() != len || shape_classes.len() != len || name_keys.len() != len {
            return Err(DatabaseError::MalformedRecord(format!(
                "column length mismatch: imprint={len}, color={}, shape={}, name_key={}",
                color_classes.len(),
                shape_classes.len(),
                name_keys.len()
            )));
        }

        let records = imprints
            .into_iter()
            .zip(color_classes)
            .zip(shape_classes)
            .zip(name_keys)
            .map(|(((imprint, color_class), shape_class), name_key)| ReferenceRecord {
                imprint,
                color_class,
                shape_class,
                name_key,
            })
            .collect();

        Ok(Self::from_records(records))
    }

    /// Attach decoded names aligned with the records.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::MalformedRecord` if the name column length
    /// differs from the record count.
    pub fn with_names(mut self, names: Vec<String>) -> Result<Self, DatabaseError> {
        if names.len() != self.records.len() {
            return Err(DatabaseError::MalformedRecord(format!(
                "column length mismatch: {} records, {} names",
                self.records.len(),
                names.len()
            )));
        }
        self.names = Some(names);
        Ok(self)
    }

    /// Load a database from a CSV/TSV file (optionally gzipped) or a JSON
    /// snapshot written by [`to_json`](Self::to_json)
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file cannot be read or is malformed.
    pub fn load_from_file(path: &Path) -> Result<Self, DatabaseError> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let database = if is_json {
            let content = std::fs::read_to_string(path)?;
            Self::from_json(&content)?
        } else {
            let rows = parse_database_file(path)?;
            let database = Self::from_records(rows.records);
            match rows.names {
                Some(names) => database.with_names(names)?,
                None => database,
            }
        };

        info!(
            path = %path.display(),
            records = database.len(),
            "Loaded reference database"
        );
        Ok(database)
    }

    /// Parse a database from a JSON snapshot
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Snapshot` for invalid JSON,
    /// `DatabaseError::MalformedRecord` if the name column is misaligned, or
    /// `ParseError::TooManyRecords` past the record limit.
    pub fn from_json(json: &str) -> Result<Self, DatabaseError> {
        let data: DatabaseSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(data)
    }

    fn from_snapshot(data: DatabaseSnapshot) -> Result<Self, DatabaseError> {
        if data.records.len() > MAX_RECORDS {
            return Err(ParseError::TooManyRecords(data.records.len()).into());
        }

        // Version check (warn but don't fail)
        if data.version != SNAPSHOT_VERSION {
            warn!(
                expected = SNAPSHOT_VERSION,
                found = %data.version,
                "Database snapshot version mismatch"
            );
        }

        let database = Self::from_records(data.records);
        match data.names {
            Some(names) => database.with_names(names),
            None => Ok(database),
        }
    }

    /// Export the database to a JSON snapshot
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Snapshot` if serialization fails.
    pub fn to_json(&self) -> Result<String, DatabaseError> {
        let data = DatabaseSnapshot {
            version: SNAPSHOT_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            records: self.records.clone(),
            names: self.names.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Build a label decoder from the database's own name column.
    ///
    /// Returns `Ok(None)` when the database carries no names.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::MalformedRecord` if one name key is paired
    /// with two different names.
    pub fn derive_decoder(&self) -> Result<Option<LabelDecoder>, DatabaseError> {
        let Some(names) = &self.names else {
            return Ok(None);
        };

        let mut decoder = LabelDecoder::new();
        for (index, (record, name)) in self.records.iter().zip(names).enumerate() {
            if let Some(existing) = decoder.insert(record.name_key, name.as_str()) {
                return Err(DatabaseError::MalformedRecord(format!(
                    "record {index}: name key {} maps to both '{existing}' and '{name}'",
                    record.name_key
                )));
            }
        }

        debug!(labels = decoder.len(), "Derived label decoder from database");
        Ok(Some(decoder))
    }

    /// Records in scan order
    #[must_use]
    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ReferenceRecord> {
        self.records.get(index)
    }

    /// Decoded name stored alongside a record, if the source carried one
    #[must_use]
    pub fn stored_name(&self, index: usize) -> Option<&str> {
        self.names
            .as_ref()
            .and_then(|names| names.get(index))
            .map(String::as_str)
    }

    #[must_use]
    pub fn has_names(&self) -> bool {
        self.names.is_some()
    }

    /// Number of records in the database
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the database is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count records per color and shape class
    #[must_use]
    pub fn summary(&self) -> DatabaseSummary {
        let mut color_classes = BTreeMap::new();
        let mut shape_classes = BTreeMap::new();
        let mut name_keys = BTreeSet::new();
        let mut empty_imprints = 0;

        for record in &self.records {
            *color_classes.entry(record.color_class).or_insert(0) += 1;
            *shape_classes.entry(record.shape_class).or_insert(0) += 1;
            name_keys.insert(record.name_key);
            if !record.has_imprint() {
                empty_imprints += 1;
            }
        }

        DatabaseSummary {
            record_count: self.records.len(),
            empty_imprints,
            distinct_name_keys: name_keys.len(),
            color_classes,
            shape_classes,
        }
    }
}
