use serde::{Deserialize, Serialize};

use crate::parsing::ParseError;

/// Separator placed between detected text lines when none is given
pub const DEFAULT_SEPARATOR: &str = ";";

/// One text box reported by an OCR engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrDetection {
    /// Corner points of the box, starting at the top-left corner
    pub bbox: Vec<[f64; 2]>,

    /// Recognised text
    pub text: String,

    /// Recognition confidence, if the engine reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl OcrDetection {
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            bbox: vec![[x, y]],
            text: text.into(),
            confidence: None,
        }
    }

    /// First corner of the box; boxes without corners sort first
    fn anchor(&self) -> (f64, f64) {
        self.bbox.first().map_or((0.0, 0.0), |p| (p[0], p[1]))
    }
}

/// Parse a JSON array of OCR detections.
///
/// # Errors
///
/// Returns `ParseError::Json` if the text is not an array of detections.
pub fn parse_detections(text: &str) -> Result<Vec<OcrDetection>, ParseError> {
    Ok(serde_json::from_str(text)?)
}

/// Join detected text into one imprint string in reading order.
///
/// Boxes are ordered by the x then y coordinate of their first corner
/// (left-to-right, top-to-bottom) and their texts joined with `separator`.
/// No detections yields an empty imprint.
#[must_use]
pub fn join_detections(detections: &[OcrDetection], separator: &str) -> String {
    let mut ordered: Vec<&OcrDetection> = detections.iter().collect();
    ordered.sort_by(|a, b| {
        let (ax, ay) = a.anchor();
        let (bx, by) = b.anchor();
        ax.total_cmp(&bx).then(ay.total_cmp(&by))
    });

    ordered
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}
