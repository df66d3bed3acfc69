//! Centralized validation and helper functions.

use crate::core::types::ClassIndex;

/// Maximum number of records allowed in a reference database (DOS protection)
pub const MAX_RECORDS: usize = 1_000_000;

/// Maximum imprint length accepted for a query.
///
/// Scoring runs one edit-distance computation per record, each
/// O(len(record imprint) * len(query imprint)).
pub const MAX_IMPRINT_CHARS: usize = 256;

/// Security-related constants for input validation
pub const MAX_FILENAME_LENGTH: usize = 255;
pub const MIN_FILE_CONTENT_SIZE: usize = 1;

/// Check if adding another record would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new record.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_record_limit(count: usize) -> Option<String> {
    if count >= MAX_RECORDS {
        Some(format!(
            "Too many records: adding another would exceed maximum of {MAX_RECORDS}"
        ))
    } else {
        None
    }
}

/// Validation error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Filename too long: exceeds {MAX_FILENAME_LENGTH} characters")]
    FilenameTooLong,
    #[error("Invalid filename: contains path traversal or invalid characters")]
    InvalidFilename,
    #[error("Empty filename provided")]
    EmptyFilename,
    #[error("File content appears malformed or invalid")]
    InvalidFileContent,
    #[error("Imprint too long: {0} characters exceeds maximum of {MAX_IMPRINT_CHARS}")]
    ImprintTooLong(usize),
    #[error("Invalid class index: '{0}'")]
    InvalidClassIndex(String),
}

/// Reject query imprints that would make scoring unreasonably expensive
///
/// # Errors
///
/// Returns `ValidationError::ImprintTooLong` if the imprint has more than
/// [`MAX_IMPRINT_CHARS`] characters.
pub fn validate_imprint(imprint: &str) -> Result<(), ValidationError> {
    let len = imprint.chars().count();
    if len > MAX_IMPRINT_CHARS {
        return Err(ValidationError::ImprintTooLong(len));
    }
    Ok(())
}

/// Parse a class index from user input
///
/// # Errors
///
/// Returns `ValidationError::InvalidClassIndex` unless the trimmed text is a
/// non-negative integer that fits in 32 bits.
pub fn parse_class_index(text: &str) -> Result<ClassIndex, ValidationError> {
    text.trim()
        .parse::<u32>()
        .map(ClassIndex::new)
        .map_err(|_| ValidationError::InvalidClassIndex(text.to_string()))
}

/// Secure filename validation to prevent directory traversal and other attacks
///
/// Validates and sanitizes filenames by:
/// - Checking length limits
/// - Preventing directory traversal (../, ..\\)
/// - Removing potentially dangerous characters
/// - Ensuring filename is not empty after sanitization
///
/// # Errors
///
/// Returns `ValidationError::EmptyFilename` if the filename is empty,
/// `ValidationError::FilenameTooLong` if it exceeds the limit, or
/// `ValidationError::InvalidFilename` if it contains invalid characters.
pub fn validate_filename(filename: &str) -> Result<String, ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::FilenameTooLong);
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ValidationError::InvalidFilename);
    }

    if filename.contains('\0') || filename.chars().any(|c| ('\x01'..='\x1F').contains(&c)) {
        return Err(ValidationError::InvalidFilename);
    }

    let sanitized = filename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-' || *c == '_' || *c == ' ')
        .collect::<String>();

    if sanitized.trim().is_empty() {
        return Err(ValidationError::InvalidFilename);
    }

    // Hidden files are only accepted with a known extension
    if sanitized.starts_with('.') && !has_known_extension(&sanitized) {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(sanitized)
}

fn has_known_extension(filename: &str) -> bool {
    let safe_extensions = [".json", ".txt"];

    safe_extensions
        .iter()
        .any(|ext| filename.to_lowercase().ends_with(ext))
}

/// Validate an uploaded text document (e.g. OCR detections)
///
/// # Errors
///
/// Returns `ValidationError::InvalidFileContent` if the content is empty,
/// contains control bytes, or is not UTF-8.
pub fn validate_text_content(content: &[u8]) -> Result<(), ValidationError> {
    if content.len() < MIN_FILE_CONTENT_SIZE {
        return Err(ValidationError::InvalidFileContent);
    }

    if content
        .iter()
        .any(|&b| b < 9 || (b > 13 && b < 32) || b == 127)
    {
        return Err(ValidationError::InvalidFileContent);
    }

    if std::str::from_utf8(content).is_err() {
        return Err(ValidationError::InvalidFileContent);
    }

    Ok(())
}

/// Validate an upload's filename and content together.
///
/// # Errors
///
/// Returns the first filename or content validation failure.
pub fn validate_upload(
    filename: Option<&str>,
    content: &[u8],
) -> Result<Option<String>, ValidationError> {
    let validated_filename = filename.map(validate_filename).transpose()?;
    validate_text_content(content)?;
    Ok(validated_filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_record_limit() {
        assert!(check_record_limit(0).is_none());
        assert!(check_record_limit(MAX_RECORDS - 1).is_none());
        assert!(check_record_limit(MAX_RECORDS).is_some());
    }

    #[test]
    fn test_validate_imprint() {
        assert!(validate_imprint("").is_ok());
        assert!(validate_imprint(&"A".repeat(MAX_IMPRINT_CHARS)).is_ok());
        assert_eq!(
            validate_imprint(&"A".repeat(MAX_IMPRINT_CHARS + 1)),
            Err(ValidationError::ImprintTooLong(MAX_IMPRINT_CHARS + 1))
        );
        // Multi-byte characters count once
        assert!(validate_imprint(&"½".repeat(MAX_IMPRINT_CHARS)).is_ok());
    }

    #[test]
    fn test_parse_class_index() {
        assert_eq!(parse_class_index(" 7 "), Ok(ClassIndex::new(7)));
        assert!(parse_class_index("-1").is_err());
        assert!(parse_class_index("blue").is_err());
        assert!(parse_class_index("").is_err());
    }

    #[test]
    fn test_validate_filename() {
        assert_eq!(validate_filename("ocr.json").unwrap(), "ocr.json");
        assert_eq!(
            validate_filename("../etc/passwd"),
            Err(ValidationError::InvalidFilename)
        );
        assert_eq!(
            validate_filename("file\0.json"),
            Err(ValidationError::InvalidFilename)
        );
        assert_eq!(validate_filename("  "), Err(ValidationError::EmptyFilename));
        assert_eq!(
            validate_filename(&"a".repeat(300)),
            Err(ValidationError::FilenameTooLong)
        );
        assert_eq!(validate_filename(".hidden"), Err(ValidationError::InvalidFilename));
        assert_eq!(validate_filename(".ocr.json").unwrap(), ".ocr.json");
    }

    #[test]
    fn test_validate_text_content() {
        assert!(validate_text_content(b"[]").is_ok());
        assert!(validate_text_content(b"line\r\nline\t").is_ok());
        assert!(validate_text_content(b"").is_err());
        assert!(validate_text_content(b"\x00\x01binary").is_err());
        assert!(validate_text_content(&[0xff, 0xfe, 0x41]).is_err());
    }

    #[test]
    fn test_validate_upload() {
        assert_eq!(
            validate_upload(Some("ocr.json"), b"[]").unwrap(),
            Some("ocr.json".to_string())
        );
        assert_eq!(validate_upload(None, b"[]").unwrap(), None);
        assert!(validate_upload(Some("../x.json"), b"[]").is_err());
    }
}
