use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::core::types::NameKey;
use crate::parsing::labels::parse_label_text;
use crate::parsing::ParseError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("Unknown label key: {0}")]
    Unknown(NameKey),
}

/// Maps encoded drug name keys back to human-readable names
///
/// Follows the fitted-encoder convention: key `i` names the `i`-th class of
/// the encoder's sorted class list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDecoder {
    names: BTreeMap<NameKey, String>,
}

impl LabelDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a decoder from an ordered class list
    #[must_use]
    pub fn from_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = classes
            .into_iter()
            .enumerate()
            .filter_map(|(i, name)| {
                let key = u32::try_from(i).ok()?;
                Some((NameKey::new(key), name.into()))
            })
            .collect();
        Self { names }
    }

    /// Load a decoder from a label file (JSON array, `{"classes": [...]}`, or
    /// one class per line)
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read, or a format error
    /// if the content is not a recognised label list.
    pub fn load_from_file(path: &Path) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(path)?;
        let classes = parse_label_text(&content)?;
        tracing::debug!(path = %path.display(), classes = classes.len(), "Loaded label file");
        Ok(Self::from_classes(classes))
    }

    /// Register a name for a key.
    ///
    /// Returns the previously registered name when it differs from `name`,
    /// leaving the existing entry untouched.
    pub fn insert(&mut self, key: NameKey, name: impl Into<String>) -> Option<String> {
        let name = name.into();
        match self.names.get(&key) {
            Some(existing) if *existing != name => Some(existing.clone()),
            Some(_) => None,
            None => {
                self.names.insert(key, name);
                None
            }
        }
    }

    /// Resolve a key to its drug name
    ///
    /// # Errors
    ///
    /// Returns `LabelError::Unknown` if the key was never registered.
    pub fn decode(&self, key: NameKey) -> Result<&str, LabelError> {
        self.names
            .get(&key)
            .map(String::as_str)
            .ok_or(LabelError::Unknown(key))
    }

    #[must_use]
    pub fn contains(&self, key: NameKey) -> bool {
        self.names.contains_key(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_classes_indexes_in_order() {
        let decoder = LabelDecoder::from_classes(["Aspirin", "Ibuprofen", "Metformin"]);
        assert_eq!(decoder.len(), 3);
        assert_eq!(decoder.decode(NameKey::new(0)).unwrap(), "Aspirin");
        assert_eq!(decoder.decode(NameKey::new(2)).unwrap(), "Metformin");
        assert!(decoder.contains(NameKey::new(1)));
        assert!(!decoder.contains(NameKey::new(3)));
    }

    #[test]
    fn test_unknown_key() {
        let decoder = LabelDecoder::from_classes(["Aspirin"]);
        assert_eq!(
            decoder.decode(NameKey::new(5)),
            Err(LabelError::Unknown(NameKey::new(5)))
        );
    }

    #[test]
    fn test_insert_conflict() {
        let mut decoder = LabelDecoder::new();
        assert_eq!(decoder.insert(NameKey::new(1), "Aspirin"), None);
        assert_eq!(decoder.insert(NameKey::new(1), "Aspirin"), None);
        assert_eq!(
            decoder.insert(NameKey::new(1), "Tylenol"),
            Some("Aspirin".to_string())
        );
        assert_eq!(decoder.decode(NameKey::new(1)).unwrap(), "Aspirin");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"["Aspirin", "Ibuprofen"]"#).unwrap();

        let decoder = LabelDecoder::load_from_file(file.path()).unwrap();
        assert_eq!(decoder.decode(NameKey::new(1)).unwrap(), "Ibuprofen");
    }
}
