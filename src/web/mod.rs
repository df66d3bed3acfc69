//! HTTP service for pill identification.
//!
//! This module exposes the scorer over HTTP using Axum. Clients post the
//! classifier outputs and either the imprint text or raw OCR detections.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 9000
//! pill-matcher serve --database drug_database.csv
//!
//! # Custom port and auto-open browser
//! pill-matcher serve --port 3000 --open
//!
//! # Bind to all interfaces
//! pill-matcher serve --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /` - Welcome message
//! - `POST /api/identify` - Identify a pill (multipart form)
//! - `GET /api/database` - Record count and per-class summary

pub mod server;
