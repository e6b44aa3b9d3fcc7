//! Country resolver - free-text location mentions to canonical entities
//!
//! An ordered table of (matcher, entity) pairs evaluated top to bottom;
//! the first match wins. Results are memoized per exact input text for
//! the lifetime of the resolver.

use dashmap::DashMap;
use regex::{Captures, Regex, RegexBuilder};
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::debug;

use crate::{CanonicalEntity, CONFLICT_ZONES};

static CONFLICT_ZONE_MATCHERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CONFLICT_ZONES
        .iter()
        .map(|entity| compile(entity.pattern).unwrap())
        .collect()
});

/// Names of other places that contain a catalogued name.
///
/// "Republic of the Congo" (Brazzaville) must not resolve to DR Congo; the
/// optional first group keeps the full DR Congo name intact.
static SHADOWED_NAMES: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(\bdemocratic\s+)?\brepublic\s+of\s+(?:the\s+)?congo\b|\bcongo[\s-]+brazzaville\b").unwrap()
});

fn unshadow(text: &str) -> Cow<'_, str> {
    SHADOWED_NAMES.replace_all(text, |caps: &Captures| {
        if caps.get(1).is_some() {
            caps[0].to_string()
        } else {
            " ".to_string()
        }
    })
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Ordered, memoizing location resolver
#[derive(Debug)]
pub struct CountryResolver {
    table: &'static [CanonicalEntity],
    matchers: Vec<Regex>,
    /// input text -> index into `table` (None = known miss)
    memo: DashMap<String, Option<usize>>,
}

impl CountryResolver {
    /// Resolver over a custom entity table
    pub fn new(table: &'static [CanonicalEntity]) -> Result<Self, regex::Error> {
        let matchers = table
            .iter()
            .map(|entity| compile(entity.pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            table,
            matchers,
            memo: DashMap::new(),
        })
    }

    /// Resolver over the built-in conflict zone catalogue
    pub fn conflict_zones() -> Self {
        Self {
            table: CONFLICT_ZONES,
            matchers: CONFLICT_ZONE_MATCHERS.clone(),
            memo: DashMap::new(),
        }
    }

    /// Resolve a location mention; `None` when nothing matches
    pub fn resolve(&self, text: &str) -> Option<&'static CanonicalEntity> {
        if let Some(hit) = self.memo.get(text) {
            let cached = *hit.value();
            return cached.map(|idx| &self.table[idx]);
        }

        let text_to_match = unshadow(text);
        let found = self.matchers.iter().position(|m| m.is_match(&text_to_match));
        if found.is_none() {
            debug!("No entity matches {:?}", truncate(text, 60));
        }
        self.memo.insert(text.to_string(), found);

        found.map(|idx| &self.table[idx])
    }

    /// Number of memoized inputs
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }
}

impl Default for CountryResolver {
    fn default() -> Self {
        Self::conflict_zones()
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
