use serde::{Deserialize, Serialize};

use crate::core::types::{ClassIndex, NameKey};

/// A single drug in the reference database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Text stamped on the pill; empty when the source had no imprint
    #[serde(default)]
    pub imprint: String,

    /// Encoded color class
    pub color_class: ClassIndex,

    /// Encoded shape class
    pub shape_class: ClassIndex,

    /// Encoded drug name
    pub name_key: NameKey,
}

impl ReferenceRecord {
    pub fn new(
        imprint: impl Into<String>,
        color_class: u32,
        shape_class: u32,
        name_key: u32,
    ) -> Self {
        Self {
            imprint: imprint.into(),
            color_class: ClassIndex::new(color_class),
            shape_class: ClassIndex::new(shape_class),
            name_key: NameKey::new(name_key),
        }
    }

    #[must_use]
    pub fn has_imprint(&self) -> bool {
        !self.imprint.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_new() {
        let record = ReferenceRecord::new("M;30", 1, 2, 10);
        assert_eq!(record.imprint, "M;30");
        assert_eq!(record.color_class, ClassIndex::new(1));
        assert_eq!(record.shape_class, ClassIndex::new(2));
        assert_eq!(record.name_key, NameKey::new(10));
        assert!(record.has_imprint());
    }

    #[test]
    fn test_missing_imprint_deserializes_empty() {
        let record: ReferenceRecord =
            serde_json::from_str(r#"{"color_class":1,"shape_class":2,"name_key":3}"#).unwrap();
        assert_eq!(record.imprint, "");
        assert!(!record.has_imprint());
    }
}
