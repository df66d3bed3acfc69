use serde::{Deserialize, Serialize};

/// Integer label emitted by a color or shape classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassIndex(pub u32);

impl ClassIndex {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }
}

impl From<u32> for ClassIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for ClassIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Encoded drug identifier, resolvable to a name through a
/// [`LabelDecoder`](crate::catalog::labels::LabelDecoder)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameKey(pub u32);

impl NameKey {
    #[must_use]
    pub const fn new(key: u32) -> Self {
        Self(key)
    }

    /// Position of this key in a decoder's class list
    #[must_use]
    pub fn as_index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for NameKey {
    fn from(key: u32) -> Self {
        Self(key)
    }
}

impl std::fmt::Display for NameKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&ClassIndex::new(7)).unwrap();
        assert_eq!(json, "7");

        let key: NameKey = serde_json::from_str("42").unwrap();
        assert_eq!(key, NameKey::new(42));
        assert_eq!(key.as_index(), 42);
    }

    #[test]
    fn test_display() {
        assert_eq!(ClassIndex::new(3).to_string(), "3");
        assert_eq!(NameKey::from(11).to_string(), "11");
    }
}
