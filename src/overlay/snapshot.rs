use std::collections::HashMap;

use crate::documents::DocumentKey;

/// Hand-edited page markup, keyed by (document type, page).
///
/// An entry wins over regeneration until it is cleared explicitly.
#[derive(Debug, Default, Clone)]
pub struct EditedContentSnapshot {
    pages: HashMap<DocumentKey, String>,
}

impl EditedContentSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &DocumentKey) -> Option<&str> {
        self.pages.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &DocumentKey) -> bool {
        self.pages.contains_key(key)
    }

    pub fn save(&mut self, key: DocumentKey, markup: String) {
        log::debug!("snapshot saved for {} page {}", key.document_type, key.page);
        self.pages.insert(key, markup);
    }

    /// Returns true when a snapshot was removed.
    pub fn clear(&mut self, key: &DocumentKey) -> bool {
        self.pages.remove(key).is_some()
    }

    pub fn clear_all(&mut self) {
        self.pages.clear();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
