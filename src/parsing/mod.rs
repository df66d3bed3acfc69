//! Loaders for the inputs the scorer consumes.
//!
//! This module provides parsers for:
//!
//! - **Drug database CSV/TSV files**: The reference table of known pills
//! - **Label files**: Ordered class lists that decode drug name keys
//! - **OCR detections**: Raw text boxes joined into an imprint string
//!
//! ## Example
//!
//! ```rust,no_run
//! use pill_matcher::parsing::csv::parse_database_file;
//! use pill_matcher::parsing::ocr::{join_detections, parse_detections};
//! use std::path::Path;
//!
//! let rows = parse_database_file(Path::new("drug_database.csv")).unwrap();
//! println!("{} records", rows.records.len());
//!
//! let detections = parse_detections(r#"[{"bbox": [[0,0],[9,0],[9,9],[0,9]], "text": "M"}]"#).unwrap();
//! assert_eq!(join_detections(&detections, ";"), "M");
//! ```
//!
//! ## Database Columns
//!
//! | Column                   | Aliases                | Required |
//! |--------------------------|------------------------|----------|
//! | `splimprint`             | `imprint`              | Yes      |
//! | `splcolor_text_encoded`  | `color`, `color_class` | Yes      |
//! | `splshape_text_encoded`  | `shape`, `shape_class` | Yes      |
//! | `medicine_name_encoded`  | `name_key`             | Yes      |
//! | `medicine_name`          | `name`                 | No       |

use thiserror::Error;

pub mod csv;
pub mod labels;
pub mod ocr;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Too many records: {0} exceeds maximum allowed (1000000)")]
    TooManyRecords(usize),
}
