//! Command-line interface for pill-matcher.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **identify**: Match classifier outputs and an imprint against the database
//! - **database**: List, show, summarize, or export the reference database
//! - **serve**: Start the HTTP identification service
//!
//! ## Usage
//!
//! ```text
//! # Identify from classifier outputs and an imprint
//! pill-matcher identify --color 3 --shape 1 --imprint "M;30" --database drug_database.csv
//!
//! # Use raw OCR detections instead of a joined imprint
//! pill-matcher identify --color 3 --shape 1 --ocr detections.json
//!
//! # JSON output with the top 5 candidates
//! pill-matcher identify --color 3 --shape 1 --imprint M -n 5 --format json
//!
//! # Start the service
//! pill-matcher serve --port 9000
//! ```
//!
//! Database and label paths fall back to the `DATABASE_CSV` and
//! `LABEL_ENCODER_PATH` environment variables.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::catalog::labels::LabelDecoder;
use crate::catalog::store::ReferenceDatabase;

pub mod database;
pub mod identify;

#[derive(Parser)]
#[command(name = "pill-matcher")]
#[command(version)]
#[command(about = "Identify drugs from pill color, shape, and imprint")]
#[command(
    long_about = "pill-matcher identifies a drug from the signals extracted from a pill image.\n\nIt scores the predicted color class, predicted shape class, and OCR imprint against every record of a reference database and reports:\n- The best matching drug\n- The per-component score breakdown\n- Optionally, the next best candidates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Identify the drug matching a prediction
    Identify(identify::IdentifyArgs),

    /// Inspect the reference database
    Database(database::DatabaseArgs),

    /// Start the web server
    Serve(ServeArgs),
}

/// Where to load the reference database and label decoder from
#[derive(clap::Args, Clone, Debug)]
pub struct SourceArgs {
    /// Drug database (CSV, TSV, optionally .gz, or a JSON snapshot)
    #[arg(long, env = "DATABASE_CSV", default_value = "drug_database.csv")]
    pub database: PathBuf,

    /// Label file decoding name keys (JSON array or one name per line).
    /// Defaults to the database's own medicine_name column.
    #[arg(long, env = "LABEL_ENCODER_PATH")]
    pub labels: Option<PathBuf>,
}

impl SourceArgs {
    /// Load the reference database
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read or is malformed.
    pub fn load_database(&self) -> anyhow::Result<ReferenceDatabase> {
        ReferenceDatabase::load_from_file(&self.database)
            .with_context(|| format!("loading database {}", self.database.display()))
    }

    /// Load the label decoder, falling back to names stored in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the label file cannot be read or the database's
    /// name column is inconsistent.
    pub fn load_decoder(
        &self,
        database: &ReferenceDatabase,
    ) -> anyhow::Result<Option<LabelDecoder>> {
        if let Some(path) = &self.labels {
            let decoder = LabelDecoder::load_from_file(path)
                .with_context(|| format!("loading labels {}", path.display()))?;
            return Ok(Some(decoder));
        }
        Ok(database.derive_decoder()?)
    }

    /// Load both the database and a decoder, requiring the decoder
    ///
    /// # Errors
    ///
    /// Returns an error if either cannot be loaded, or if no label source
    /// is available.
    pub fn load(&self) -> anyhow::Result<(ReferenceDatabase, LabelDecoder)> {
        let database = self.load_database()?;
        let decoder = self.load_decoder(&database)?.ok_or_else(|| {
            anyhow::anyhow!(
                "no label decoder: pass --labels or use a database with a medicine_name column"
            )
        })?;

        let undecodable = database
            .records()
            .iter()
            .filter(|r| !decoder.contains(r.name_key))
            .count();
        if undecodable > 0 {
            tracing::warn!(
                records = undecodable,
                "Some records have name keys missing from the label decoder"
            );
        }

        Ok((database, decoder))
    }
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "9000")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
