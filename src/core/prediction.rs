use serde::{Deserialize, Serialize};

use crate::core::types::ClassIndex;

/// Signals extracted from a single pill image
///
/// The classifiers and the OCR extractor run outside this crate; a
/// `Prediction` only carries their outputs. `imprint_text` is compared as
/// opaque text, separators included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub color_class: ClassIndex,
    pub shape_class: ClassIndex,
    #[serde(default)]
    pub imprint_text: String,
}

impl Prediction {
    pub fn new(color_class: u32, shape_class: u32, imprint_text: impl Into<String>) -> Self {
        Self {
            color_class: ClassIndex::new(color_class),
            shape_class: ClassIndex::new(shape_class),
            imprint_text: imprint_text.into(),
        }
    }
}
