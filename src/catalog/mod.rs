//! Reference database storage and label decoding.
//!
//! The reference database holds one [`ReferenceRecord`](crate::core::record::ReferenceRecord)
//! per known drug. It is loaded once at startup, from the drug database CSV or
//! from a JSON snapshot, and shared read-only by every request afterwards.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pill_matcher::catalog::store::ReferenceDatabase;
//! use std::path::Path;
//!
//! let database = ReferenceDatabase::load_from_file(Path::new("drug_database.csv")).unwrap();
//! let decoder = database.derive_decoder().unwrap();
//!
//! println!("{} records", database.len());
//! ```
//!
//! ## Label Decoding
//!
//! Drug names are stored as encoded keys. A [`LabelDecoder`](labels::LabelDecoder)
//! resolves them, either loaded from a label file or derived from a
//! `medicine_name` column in the database itself.

pub mod labels;
pub mod store;
