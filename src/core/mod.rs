//! Core data types for pill identification.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`ReferenceRecord`]: One row of the drug reference database
//! - [`Prediction`]: The per-query signals (color class, shape class, imprint text)
//! - [`ClassIndex`], [`NameKey`]: Integer labels produced by classifiers and encoders
//!
//! ## Class Indices
//!
//! Color and shape are never compared as human-readable attributes. Both the
//! reference database and the classifiers use the same label encoding, so the
//! scorer only needs integer equality:
//!
//! | Column                    | Meaning              |
//! |---------------------------|----------------------|
//! | `splcolor_text_encoded`   | Color class index    |
//! | `splshape_text_encoded`   | Shape class index    |
//! | `medicine_name_encoded`   | Drug name key        |

pub mod prediction;
pub mod record;
pub mod types;
