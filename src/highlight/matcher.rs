//! Keyword matching
//!
//! Case-insensitive literal search over flattened text. Both text and
//! keywords are folded per character with `char::to_lowercase`; matches are
//! found in the folded text with memchr's `memmem` and mapped back to byte
//! offsets in the original text.

use lru::LruCache;
use memchr::memmem::Finder;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock};

/// A keyword occurrence in flattened text, `[start, end)` in bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    /// The original (unfolded) text covered by the span
    pub matched_text: String,
    /// Position of the producing keyword in its `KeywordSet`
    pub keyword: usize,
}

struct Keyword {
    text: String,
    finder: Finder<'static>,
}

/// Compiled keywords: trimmed, non-blank, deduplicated, longest first
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

impl KeywordSet {
    /// Compile a keyword list.
    ///
    /// Blank entries and case-insensitive duplicates are dropped. The rest
    /// are ordered by character length, longest first, keeping input order
    /// among equals.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let mut entries: Vec<(String, String)> = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let text = keyword.as_ref().trim();
            if text.is_empty() {
                continue;
            }
            let folded = fold(text).text;
            if entries.iter().any(|(_, f)| *f == folded) {
                continue;
            }
            entries.push((text.to_string(), folded));
        }
        // Stable sort keeps input order for equal lengths
        entries.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

        KeywordSet {
            keywords: entries
                .into_iter()
                .map(|(text, folded)| Keyword {
                    finder: Finder::new(folded.as_bytes()).into_owned(),
                    text,
                })
                .collect(),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Keywords in match order
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| k.text.as_str())
    }

    /// Every non-self-overlapping occurrence of every keyword
    pub fn find_matches(&self, text: &str) -> Vec<MatchSpan> {
        if self.keywords.is_empty() || text.is_empty() {
            return Vec::new();
        }
        let folded = fold(text);
        let mut spans = Vec::new();

        for (index, keyword) in self.keywords.iter().enumerate() {
            let needle_len = keyword.finder.needle().len();
            let before = spans.len();
            for at in keyword.finder.find_iter(folded.text.as_bytes()) {
                let start = folded.starts[at];
                let end = folded.ends[at + needle_len - 1];
                spans.push(MatchSpan {
                    start,
                    end,
                    matched_text: text[start..end].to_string(),
                    keyword: index,
                });
            }
            if spans.len() > before {
                tracing::trace!(keyword = %keyword.text, hits = spans.len() - before, "keyword matched");
            }
        }

        spans
    }
}

/// Lower-cased text with a byte map back to the source
struct Folded {
    text: String,
    /// For each folded byte, the start of the source char it came from
    starts: Vec<usize>,
    /// For each folded byte, the end of the source char it came from
    ends: Vec<usize>,
}

fn fold(source: &str) -> Folded {
    let mut folded = Folded {
        text: String::with_capacity(source.len()),
        starts: Vec::with_capacity(source.len()),
        ends: Vec::with_capacity(source.len()),
    };
    for (offset, ch) in source.char_indices() {
        let end = offset + ch.len_utf8();
        for lower in ch.to_lowercase() {
            folded.text.push(lower);
            for _ in 0..lower.len_utf8() {
                folded.starts.push(offset);
                folded.ends.push(end);
            }
        }
    }
    folded
}

const CACHE_CAPACITY: usize = 32;

static KEYWORD_CACHE: OnceLock<Mutex<LruCache<Vec<String>, Arc<KeywordSet>>>> = OnceLock::new();

/// Compiled keyword set for a list, shared through a small LRU cache.
///
/// The same list is matched on every debounced pass, so compiling once
/// per list saves rebuilding the finders.
pub fn compiled(keywords: &[String]) -> Arc<KeywordSet> {
    let cache = KEYWORD_CACHE.get_or_init(|| {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Mutex::new(LruCache::new(capacity))
    });

    // A poisoned cache is only a lost optimization
    let Ok(mut cache) = cache.lock() else {
        return Arc::new(KeywordSet::new(keywords));
    };
    if let Some(set) = cache.get(keywords) {
        return Arc::clone(set);
    }
    let set = Arc::new(KeywordSet::new(keywords));
    cache.put(keywords.to_vec(), Arc::clone(&set));
    set
}
