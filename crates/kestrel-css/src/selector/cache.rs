use std::collections::HashMap;

use super::{ParsedSelector, parse_selector};

/// Parse results keyed by selector text.
///
/// One cache lives for one stylesheet parse or one cascade pass; the same
/// selector string is parsed and weighed once no matter how many rules or
/// nodes repeat it.
#[derive(Debug, Default)]
pub struct SelectorCache {
    entries: HashMap<String, Option<ParsedSelector>>,
}

impl SelectorCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The parsed form of `raw`, parsing it on first use. `None` if the
    /// selector is invalid.
    pub fn get(&mut self, raw: &str) -> Option<&ParsedSelector> {
        let key = raw.trim();
        if !self.entries.contains_key(key) {
            let _ = self.entries.insert(key.to_string(), parse_selector(key));
        }
        self.entries.get(key).and_then(Option::as_ref)
    }

    /// Specificity of `raw`; 0 for an invalid selector.
    pub fn specificity(&mut self, raw: &str) -> u32 {
        self.get(raw).map_or(0, ParsedSelector::specificity)
    }

    /// Number of distinct selector strings seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been parsed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Specificity of a selector string; 0 if it does not parse.
#[must_use]
pub fn specificity(raw: &str) -> u32 {
    parse_selector(raw).map_or(0, |s| s.specificity())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_lookups_share_one_entry() {
        let mut cache = SelectorCache::new();
        assert_eq!(cache.specificity(".a"), 10);
        assert_eq!(cache.specificity(" .a "), 10);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalid_selector_is_cached_as_none() {
        let mut cache = SelectorCache::new();
        assert!(cache.get("> p").is_none());
        assert_eq!(cache.specificity("> p"), 0);
        assert_eq!(cache.len(), 1);
    }
}
