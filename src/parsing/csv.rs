use std::io::Read;
use std::path::Path;

use ::csv::{ErrorKind, Position, StringRecord};
use flate2::read::GzDecoder;
use tracing::warn;

use crate::core::record::ReferenceRecord;
use crate::core::types::{ClassIndex, NameKey};
use crate::parsing::ParseError;
use crate::utils::validation::check_record_limit;

const IMPRINT_COLUMNS: &[&str] = &["splimprint", "imprint"];
const COLOR_COLUMNS: &[&str] = &["splcolor_text_encoded", "color", "color_class"];
const SHAPE_COLUMNS: &[&str] = &["splshape_text_encoded", "shape", "shape_class"];
const NAME_KEY_COLUMNS: &[&str] = &["medicine_name_encoded", "name_key"];
const NAME_COLUMNS: &[&str] = &["medicine_name", "name"];

/// Rows read from a drug database file
#[derive(Debug, Clone, Default)]
pub struct DatabaseRows {
    /// One record per data row, in file order
    pub records: Vec<ReferenceRecord>,

    /// Decoded drug names aligned with `records`, when the file has a name column
    pub names: Option<Vec<String>>,
}

/// Positions of the columns the scorer needs
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    imprint: usize,
    color: usize,
    shape: usize,
    name_key: usize,
    name: Option<usize>,
}

impl ColumnLayout {
    fn from_header(header: &StringRecord, line: usize) -> Result<Self, ParseError> {
        let normalized: Vec<String> = header.iter().map(|f| f.trim().to_lowercase()).collect();

        for (i, name) in normalized.iter().enumerate() {
            if !name.is_empty() && normalized[..i].contains(name) {
                warn!(column = %name, "Duplicate database column; using the first occurrence");
            }
        }

        let find = |aliases: &[&str]| -> Option<usize> {
            aliases
                .iter()
                .find_map(|alias| normalized.iter().position(|f| f == alias))
        };
        let require = |aliases: &[&str]| -> Result<usize, ParseError> {
            find(aliases).ok_or_else(|| ParseError::MalformedRecord {
                line,
                reason: format!("missing required column '{}'", aliases[0]),
            })
        };

        Ok(Self {
            imprint: require(IMPRINT_COLUMNS)?,
            color: require(COLOR_COLUMNS)?,
            shape: require(SHAPE_COLUMNS)?,
            name_key: require(NAME_KEY_COLUMNS)?,
            name: find(NAME_COLUMNS),
        })
    }
}

/// Parse a drug database file.
///
/// The delimiter is a tab for `.tsv` files and a comma otherwise. Files ending
/// in `.gz` are decompressed first.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the errors of
/// [`parse_database_text`].
pub fn parse_database_file(path: &Path) -> Result<DatabaseRows, ParseError> {
    let path_str = path.to_string_lossy().to_lowercase();
    let (content, stem) = if let Some(stem) = path_str.strip_suffix(".gz") {
        let file = std::fs::File::open(path)?;
        let mut content = String::new();
        GzDecoder::new(file).read_to_string(&mut content)?;
        (content, stem.to_string())
    } else {
        (std::fs::read_to_string(path)?, path_str)
    };

    let delimiter = if stem.ends_with(".tsv") { '\t' } else { ',' };
    parse_database_text(&content, delimiter)
}

/// Parse drug database text with a header row.
///
/// Quoted fields may contain the delimiter, escaped quotes (`""`) and line
/// breaks. Unquoted fields are kept verbatim, surrounding whitespace
/// included, so that imprints are compared exactly as stored.
///
/// # Errors
///
/// Returns `ParseError::MalformedRecord` when a required column is missing, a
/// row has the wrong number of fields, or a class/key field is not a
/// non-negative integer; `ParseError::InvalidFormat` when there is no header
/// or the delimiter is not ASCII; or `ParseError::TooManyRecords` if the
/// limit is exceeded.
pub fn parse_database_text(text: &str, delimiter: char) -> Result<DatabaseRows, ParseError> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            ParseError::InvalidFormat(format!("unsupported delimiter {delimiter:?}"))
        })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let header = reader.headers().map_err(csv_error)?.clone();
    if header.iter().all(|field| field.trim().is_empty()) {
        return Err(ParseError::InvalidFormat(
            "Database file is empty".to_string(),
        ));
    }
    let layout = ColumnLayout::from_header(&header, record_line(header.position()).max(1))?;

    let mut records = Vec::new();
    let mut names = layout.name.map(|_| Vec::new());

    for result in reader.records() {
        let row = result.map_err(csv_error)?;
        let line = record_line(row.position());
        let malformed = |reason: String| ParseError::MalformedRecord { line, reason };
        let field = |idx: usize| row.get(idx).unwrap_or_default();

        let color = parse_index_field(field(layout.color))
            .map(ClassIndex::new)
            .ok_or_else(|| malformed(format!("invalid color class '{}'", field(layout.color))))?;
        let shape = parse_index_field(field(layout.shape))
            .map(ClassIndex::new)
            .ok_or_else(|| malformed(format!("invalid shape class '{}'", field(layout.shape))))?;
        let name_key = parse_index_field(field(layout.name_key))
            .map(NameKey::new)
            .ok_or_else(|| {
                malformed(format!("invalid name key '{}'", field(layout.name_key)))
            })?;

        if check_record_limit(records.len()).is_some() {
            return Err(ParseError::TooManyRecords(records.len()));
        }

        if let (Some(names), Some(idx)) = (names.as_mut(), layout.name) {
            names.push(field(idx).trim().to_string());
        }
        records.push(ReferenceRecord {
            imprint: field(layout.imprint).to_string(),
            color_class: color,
            shape_class: shape,
            name_key,
        });
    }

    if records.is_empty() {
        warn!("Database contains a header but no records");
    }

    Ok(DatabaseRows { records, names })
}

fn record_line(position: Option<&Position>) -> usize {
    position
        .and_then(|p| usize::try_from(p.line()).ok())
        .unwrap_or(0)
}

fn csv_error(err: ::csv::Error) -> ParseError {
    let line = record_line(err.position());
    match err.into_kind() {
        ErrorKind::Io(err) => ParseError::Io(err),
        ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => ParseError::MalformedRecord {
            line,
            reason: format!("expected {expected_len} fields, found {len}"),
        },
        ErrorKind::Utf8 { err, .. } => ParseError::MalformedRecord {
            line,
            reason: format!("invalid UTF-8: {err}"),
        },
        other => ParseError::MalformedRecord {
            line,
            reason: format!("{other:?}"),
        },
    }
}

/// Parse a class index or name key.
///
/// Accepts plain non-negative integers and float renderings with no
/// fractional part (`"3.0"`), which is how pandas writes integer columns that
/// once held missing values.
fn parse_index_field(field: &str) -> Option<u32> {
    let field = field.trim();
    if let Ok(value) = field.parse::<u32>() {
        return Some(value);
    }

    let value = field.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked above
        let index = value as u32;
        Some(index)
    } else {
        None
    }
}
