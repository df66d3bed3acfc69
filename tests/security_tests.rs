//! Input validation and hardening tests
//!
//! Covers the checks applied to user input before it reaches the scorer:
//! upload filenames, upload content, imprint length, and error sanitization.

/// Test filename validation and sanitization
#[test]
fn test_filename_validation_security() {
    use pill_matcher::utils::validation::{validate_filename, ValidationError};

    // Test directory traversal prevention
    let traversal_attempts = vec![
        "../etc/passwd",
        "..\\windows\\system32",
        "test/../../secret",
        "ocr/../../../etc/passwd",
    ];

    for attempt in traversal_attempts {
        match validate_filename(attempt) {
            Err(ValidationError::InvalidFilename) => {}
            Ok(_) => panic!("Directory traversal attempt '{attempt}' should have been blocked"),
            Err(e) => panic!("Unexpected error for '{attempt}': {e:?}"),
        }
    }

    // Null bytes and control characters
    for attempt in ["ocr\0.json", "detections.json\0", "file\x01.json", "name\x0b.txt"] {
        assert!(
            validate_filename(attempt).is_err(),
            "Injection '{attempt:?}' should be blocked"
        );
    }

    let valid_tests = vec![
        ("detections.json", "detections.json"),
        ("pill-0042_ocr.json", "pill-0042_ocr.json"),
        ("ocr@#$%out.json", "ocrout.json"), // Special characters are dropped
        ("front side.txt", "front side.txt"),
    ];

    for (input, expected) in valid_tests {
        match validate_filename(input) {
            Ok(sanitized) => assert_eq!(sanitized, expected, "Sanitization failed for '{input}'"),
            Err(e) => panic!("Valid filename '{input}' should be accepted: {e:?}"),
        }
    }
}

/// Test upload content validation
#[test]
fn test_upload_content_validation() {
    use pill_matcher::utils::validation::{validate_upload, ValidationError};

    let detections = br#"[{"bbox": [[0, 0]], "text": "M"}]"#;
    assert_eq!(
        validate_upload(Some("ocr.json"), detections)
            .expect("Valid upload")
            .as_deref(),
        Some("ocr.json")
    );
    assert_eq!(validate_upload(None, detections).expect("Valid upload"), None);

    assert_eq!(
        validate_upload(Some("ocr.json"), b""),
        Err(ValidationError::InvalidFileContent)
    );
    assert_eq!(
        validate_upload(Some("ocr.json"), b"\x89PNG\r\n\x1a\n\x00\x00"),
        Err(ValidationError::InvalidFileContent)
    );
    assert_eq!(
        validate_upload(Some("../ocr.json"), detections),
        Err(ValidationError::InvalidFilename)
    );
}

/// Imprints are bounded before the quadratic edit distance runs
#[test]
fn test_imprint_length_limit() {
    use pill_matcher::utils::validation::{validate_imprint, MAX_IMPRINT_CHARS};

    assert!(validate_imprint(&"M;30".repeat(MAX_IMPRINT_CHARS / 4)).is_ok());
    assert!(validate_imprint(&"M".repeat(MAX_IMPRINT_CHARS + 1)).is_err());
}

/// Test that multipart limits are sized for legitimate uploads
#[test]
fn test_multipart_limits() {
    use pill_matcher::utils::validation::MAX_IMPRINT_CHARS;
    use pill_matcher::web::server::{
        MAX_FILE_FIELD_SIZE, MAX_MULTIPART_FIELDS, MAX_RESULT_LIMIT, MAX_TEXT_FIELD_SIZE,
    };

    // color, shape, imprint/ocr, separator, result_limit
    assert!(MAX_MULTIPART_FIELDS >= 5);
    assert!(MAX_TEXT_FIELD_SIZE >= MAX_IMPRINT_CHARS * 4);
    assert!(MAX_FILE_FIELD_SIZE >= MAX_TEXT_FIELD_SIZE);
    assert_eq!(MAX_RESULT_LIMIT, 50);
}

/// Test error message sanitization
#[test]
fn test_error_sanitization() {
    use pill_matcher::web::server::create_safe_error_response;

    let error_response = create_safe_error_response(
        "unknown_label",
        "Matched record has no known drug name",
        Some("Unknown label for record 12: name key 7 is not in the label decoder"),
    );

    assert_eq!(error_response.error, "Matched record has no known drug name");
    assert_eq!(error_response.error_type, "unknown_label");
    assert!(
        error_response.details.is_none(),
        "Internal details should never be exposed"
    );

    let error_response = create_safe_error_response("missing_input", "User message", None);
    assert!(error_response.details.is_none());
}

/// Test validation error handling
#[test]
fn test_validation_error_handling() {
    use pill_matcher::utils::validation::{parse_class_index, validate_filename, ValidationError};

    let long_filename = "a".repeat(300);
    let test_cases = vec![
        ("", ValidationError::EmptyFilename),
        (long_filename.as_str(), ValidationError::FilenameTooLong),
        ("../etc/passwd", ValidationError::InvalidFilename),
        ("test\0.txt", ValidationError::InvalidFilename),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            validate_filename(input),
            Err(expected),
            "Unexpected result for '{input}'"
        );
    }

    for input in ["-3", "2.5", "red", "99999999999"] {
        assert!(
            matches!(parse_class_index(input), Err(ValidationError::InvalidClassIndex(_))),
            "Class index '{input}' should be rejected"
        );
    }
}
