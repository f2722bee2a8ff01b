//! Pattern lists and match rules.

use std::collections::TryReserveError;

/// Separator between patterns in `HIDDEN` / `BLOCKED`.
pub const DELIMITER: u8 = b':';

/// How a pattern is compared against a subject.
///
/// Hidden names and blocked paths use different rules on purpose: a hidden pattern
/// hides any entry whose name contains it, a blocked pattern only denies paths that
/// end with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Substring,
    Suffix,
}

impl MatchRule {
    /// Case-sensitive byte comparison. `pattern` must be non-empty.
    pub fn matches(self, pattern: &[u8], subject: &[u8]) -> bool {
        debug_assert!(!pattern.is_empty());
        match self {
            MatchRule::Substring => {
                pattern.len() <= subject.len()
                    && subject.windows(pattern.len()).any(|w| w == pattern)
            }
            MatchRule::Suffix => subject.ends_with(pattern),
        }
    }
}

/// Ordered, immutable list of non-empty patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternList {
    patterns: Vec<Box<[u8]>>,
}

impl PatternList {
    pub const fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Splits `raw` on `delimiter`, dropping zero-length tokens and keeping order.
    ///
    /// Nothing is trimmed. Every allocation is fallible so an exhausted allocator
    /// surfaces as an error rather than a partially built list.
    pub fn parse(raw: &[u8], delimiter: u8) -> Result<Self, TryReserveError> {
        let tokens = || raw.split(move |b| *b == delimiter).filter(|t| !t.is_empty());

        let mut patterns: Vec<Box<[u8]>> = Vec::new();
        patterns.try_reserve_exact(tokens().count())?;
        for token in tokens() {
            let mut owned = Vec::new();
            owned.try_reserve_exact(token.len())?;
            owned.extend_from_slice(token);
            patterns.push(owned.into_boxed_slice());
        }

        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.patterns.iter().map(|p| &**p)
    }

    /// First pattern (in configured order) that matches `subject` under `rule`.
    pub fn first_match(&self, rule: MatchRule, subject: &[u8]) -> Option<&[u8]> {
        self.iter().find(|p| rule.matches(p, subject))
    }

    pub fn matches(&self, rule: MatchRule, subject: &[u8]) -> bool {
        self.first_match(rule, subject).is_some()
    }
}
