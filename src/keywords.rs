//! Keyword list maintenance and storage
//!
//! `KeywordList` holds the user's keywords: trimmed, non-blank, no exact
//! duplicates, in insertion order. Stores only load and save whole lists;
//! the storage format belongs to the host.

use crate::error::StoreError;
use std::sync::Mutex;

/// Ordered, duplicate-free keyword list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordList {
    keywords: Vec<String>,
}

impl KeywordList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list, normalizing entries the way `add` does
    pub fn from_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for keyword in keywords {
            list.add(keyword.as_ref());
        }
        list
    }

    /// Add a keyword. Returns false for blank input or an exact duplicate.
    pub fn add(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() || self.keywords.iter().any(|k| k == keyword) {
            return false;
        }
        self.keywords.push(keyword.to_string());
        true
    }

    /// Remove the keyword at `index`, if any
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.keywords.len()).then(|| self.keywords.remove(index))
    }

    pub fn clear(&mut self) {
        self.keywords.clear();
    }

    /// Merge keywords from text split on newlines (`\n` or `\r\n`) and commas.
    /// Returns how many new keywords were added.
    pub fn import(&mut self, text: &str) -> usize {
        text.split(['\n', ','])
            .map(|item| item.strip_suffix('\r').unwrap_or(item))
            .filter(|item| self.add(item))
            .count()
    }

    /// One keyword per line
    pub fn export(&self) -> String {
        self.keywords.join("\n")
    }

    pub fn into_vec(self) -> Vec<String> {
        self.keywords
    }
}

/// Where the keyword list lives between passes
pub trait KeywordStore {
    /// Load the stored list; an absent list is empty
    fn load(&self) -> Result<Vec<String>, StoreError>;

    fn save(&self, keywords: &[String]) -> Result<(), StoreError>;
}

/// In-process keyword store
#[derive(Debug, Default)]
pub struct MemoryStore {
    keywords: Mutex<Option<Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keywords(keywords: Vec<String>) -> Self {
        MemoryStore {
            keywords: Mutex::new(Some(keywords)),
        }
    }
}

impl KeywordStore for MemoryStore {
    fn load(&self) -> Result<Vec<String>, StoreError> {
        let guard = self
            .keywords
            .lock()
            .map_err(|_| StoreError::Unavailable("keyword store lock poisoned".to_string()))?;
        Ok(guard.clone().unwrap_or_default())
    }

    fn save(&self, keywords: &[String]) -> Result<(), StoreError> {
        let mut guard = self
            .keywords
            .lock()
            .map_err(|_| StoreError::Unavailable("keyword store lock poisoned".to_string()))?;
        *guard = Some(keywords.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_add_trims_and_dedups() {
        let mut list = KeywordList::new();
        assert!(list.add("  lottery "));
        assert!(!list.add("lottery"));
        assert!(!list.add("   "));
        // Exact duplicates only
        assert!(list.add("Lottery"));
        assert_eq!(list.clone().into_vec(), ["lottery", "Lottery"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut list = KeywordList::from_keywords(["a", "b", "c"]);
        assert_eq!(list.remove(1), Some("b".to_string()));
        assert_eq!(list.remove(5), None);
        assert_eq!(list.clone().into_vec(), ["a", "c"]);
        list.clear();
        assert_eq!(list, KeywordList::new());
    }

    #[test]
    fn test_import_merges_in_order() {
        let mut list = KeywordList::from_keywords(["winner"]);
        let added = list.import("prize\r\nwinner, free money ,\n\n,urgent");
        assert_eq!(added, 3);
        assert_eq!(list.clone().into_vec(), ["winner", "prize", "free money", "urgent"]);
    }

    #[test]
    fn test_export_one_per_line() {
        let list = KeywordList::from_keywords(["a", "b c"]);
        assert_eq!(list.export(), "a\nb c");
        assert_eq!(KeywordList::new().export(), "");
    }

    #[test]
    fn test_export_import_preserves_list() {
        let list = KeywordList::from_keywords(["one", "two words", "three"]);
        let mut copy = KeywordList::new();
        copy.import(&list.export());
        assert_eq!(copy, list);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), Vec::<String>::new());
        store.save(&["spam".to_string()]).unwrap();
        assert_eq!(store.load().unwrap(), vec!["spam".to_string()]);
    }

    #[test]
    fn test_poisoned_store_unavailable() {
        let store = Arc::new(MemoryStore::with_keywords(vec!["x".into()]));
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.keywords.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(matches!(store.load(), Err(StoreError::Unavailable(_))));
    }
}
