//! Shared string table

use ahash::AHashMap;
use std::sync::Arc;

/// The workbook's shared string table (`xl/sharedStrings.xml`)
///
/// Strings are interned once and referenced from cells by index.
#[derive(Debug, Default, Clone)]
pub struct SharedStrings {
    strings: Vec<Arc<str>>,
    index: AHashMap<Arc<str>, u32>,
}

impl SharedStrings {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string, returning its index; existing strings are reused
    pub fn intern<S: AsRef<str>>(&mut self, s: S) -> u32 {
        let s = s.as_ref();
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.strings.len() as u32;
        let shared: Arc<str> = Arc::from(s);
        self.strings.push(shared.clone());
        self.index.insert(shared, idx);
        idx
    }

    /// Look up a string by index
    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(|s| s.as_ref())
    }

    /// Number of unique strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterate over the strings in index order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(|s| s.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_reuses_index() {
        let mut table = SharedStrings::new();
        assert_eq!(table.intern("alpha"), 0);
        assert_eq!(table.intern("beta"), 1);
        assert_eq!(table.intern("alpha"), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some("beta"));
        assert_eq!(table.get(2), None);
    }
}
