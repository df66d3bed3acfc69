use serde::Deserialize;

use crate::parsing::ParseError;

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelDocument {
    List(Vec<String>),
    Object { classes: Vec<String> },
}

/// Parse an ordered class list from label file text.
///
/// Accepted layouts:
/// - a JSON array of strings: `["Aspirin", "Ibuprofen"]`
/// - a JSON object with a `classes` array
/// - plain text with one class per line (blank lines ignored)
///
/// # Errors
///
/// Returns `ParseError::Json` for JSON input of the wrong shape, or
/// `ParseError::InvalidFormat` if no classes are found.
pub fn parse_label_text(text: &str) -> Result<Vec<String>, ParseError> {
    let trimmed = text.trim_start();

    let classes = if trimmed.starts_with('[') || trimmed.starts_with('{') {
        match serde_json::from_str::<LabelDocument>(trimmed)? {
            LabelDocument::List(classes) | LabelDocument::Object { classes } => classes,
        }
    } else {
        text.lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()
    };

    if classes.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No classes found in label file".to_string(),
        ));
    }

    Ok(classes)
}
