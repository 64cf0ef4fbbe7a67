//! # Pattern Admission Control & Compiled-Pattern Cache
//!
//! Catalogue authors supply regular expressions as plain text. Before a
//! pattern may become part of a schema it must pass admission:
//!
//! 1. At most [`MAX_PATTERN_LENGTH`] characters.
//! 2. No match against the danger heuristics: three or more `*`/`+`
//!    quantifiers, three or more consecutive `.*`, stacked quantifiers such
//!    as `++` or `*+`, and five or more `?`.
//! 3. Compiles as a regular expression, both as written and in the
//!    anchored full-match form the cache uses.
//!
//! An admitted pattern is a [`GuardedPattern`]. The type is the proof of
//! admission: it can only be built through [`GuardedPattern::new`], and
//! deserialization routes through the same check.
//!
//! ## Full-String Matching
//!
//! A value matches a pattern only if the whole value matches. The cache
//! compiles `^(?:<pattern>)$`. Admission compiles that same form, so an
//! admitted pattern always compiles in the cache. A verbose-mode comment
//! such as `(?x)\d{4} # digits` swallows the closing anchor and is rejected.
//!
//! Classes such as `\d`, `\w` and `\s` are Unicode-aware: `\d` matches
//! Arabic-Indic digits as well as ASCII ones. Write `[0-9]` for ASCII only.
//!
//! ## Concurrency
//!
//! [`PatternCache`] is a `DashMap` keyed by pattern text. Population goes
//! through the map's entry API, so the compile for a given key runs under
//! that key's shard lock: one compile per distinct pattern, and concurrent
//! readers always observe the same compiled value.

use std::fmt;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CatalogueError;

/// Maximum admitted pattern length, in characters.
pub const MAX_PATTERN_LENGTH: usize = 500;

static DANGEROUS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(.*[*+].*){3,}|(\.\*){3,}|([*+]{2,})|(.*(\?.*){5,})")
        .expect("danger heuristic is a valid regex")
});

static SHARED_CACHE: LazyLock<Arc<PatternCache>> = LazyLock::new(|| Arc::new(PatternCache::new()));

// ---------------------------------------------------------------------------
// GuardedPattern
// ---------------------------------------------------------------------------

/// A regular expression that has passed admission control.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GuardedPattern(String);

impl GuardedPattern {
    /// Admit `pattern`, or explain why it is rejected.
    pub fn new(pattern: impl Into<String>) -> Result<Self, CatalogueError> {
        let pattern = pattern.into();

        let length = pattern.chars().count();
        if length > MAX_PATTERN_LENGTH {
            tracing::warn!(length, max = MAX_PATTERN_LENGTH, "pattern rejected: too long");
            return Err(CatalogueError::PatternTooLong {
                length,
                max: MAX_PATTERN_LENGTH,
            });
        }

        if DANGEROUS_PATTERN.is_match(&pattern) {
            tracing::warn!(%pattern, "pattern rejected: dangerous quantifiers");
            return Err(CatalogueError::DangerousPattern { pattern });
        }

        if let Err(e) = Regex::new(&pattern).and_then(|_| Regex::new(&anchored(&pattern))) {
            tracing::warn!(%pattern, "pattern rejected: does not compile");
            return Err(CatalogueError::InvalidRegex {
                pattern,
                reason: e.to_string(),
            });
        }

        Ok(Self(pattern))
    }

    /// The pattern text as authored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GuardedPattern {
    type Error = CatalogueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GuardedPattern> for String {
    fn from(value: GuardedPattern) -> Self {
        value.0
    }
}

impl fmt::Display for GuardedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// PatternCache
// ---------------------------------------------------------------------------

/// Concurrent memo of compiled full-match regular expressions.
#[derive(Default)]
pub struct PatternCache {
    compiled: DashMap<String, Arc<Regex>>,
}

impl PatternCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache shared by every validator that does not
    /// supply its own.
    pub fn shared() -> Arc<PatternCache> {
        Arc::clone(&SHARED_CACHE)
    }

    /// The compiled full-match form of `pattern`, compiling it on first use.
    pub fn get_or_compile(&self, pattern: &GuardedPattern) -> Result<Arc<Regex>, CatalogueError> {
        if let Some(hit) = self.compiled.get(pattern.as_str()) {
            tracing::trace!(pattern = %pattern, "pattern cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        let entry = self
            .compiled
            .entry(pattern.as_str().to_string())
            .or_try_insert_with(|| {
                tracing::trace!(pattern = %pattern, "pattern cache miss, compiling");
                compile_full_match(pattern).map(Arc::new)
            })?;
        Ok(Arc::clone(entry.value()))
    }

    /// Whether `pattern` has been compiled into this cache.
    pub fn contains(&self, pattern: &str) -> bool {
        self.compiled.contains_key(pattern)
    }

    /// Number of distinct compiled patterns.
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    /// Whether nothing has been compiled yet.
    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

impl fmt::Debug for PatternCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternCache")
            .field("compiled_count", &self.compiled.len())
            .finish()
    }
}

fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}

fn compile_full_match(pattern: &GuardedPattern) -> Result<Regex, CatalogueError> {
    Regex::new(&anchored(pattern.as_str())).map_err(|e| CatalogueError::InvalidRegex {
        pattern: pattern.as_str().to_string(),
        reason: e.to_string(),
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Plain alphanumeric literals are admitted and match only themselves.
        #[test]
        fn literal_patterns_match_exactly(literal in "[a-zA-Z0-9]{1,64}") {
            let p = GuardedPattern::new(literal.clone()).unwrap();
            let re = PatternCache::new().get_or_compile(&p).unwrap();
            prop_assert!(re.is_match(&literal));
            let extended = format!("{literal}x");
            prop_assert!(!re.is_match(&extended));
        }

        /// The length cap counts characters, not bytes.
        #[test]
        fn length_cap_counts_chars(n in 1usize..=MAX_PATTERN_LENGTH) {
            let pattern = "é".repeat(n);
            prop_assert!(GuardedPattern::new(pattern).is_ok());
        }
    }
}
