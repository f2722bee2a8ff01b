//! `readdir` filter: hides entries whose name contains a `HIDDEN` pattern.

use std::ffi::CStr;

use libc::{dirent, DIR};

use crate::bind::{LazySymbol, SymbolResolver};
use crate::errno;
use crate::error::FilterError;
use crate::loader::PolicyLoader;
use crate::pattern::{MatchRule, PatternList, DELIMITER};
use crate::source::ConfigSource;

pub const HIDDEN_VAR: &str = "HIDDEN";
pub const HIDDEN_KEY: &CStr = c"HIDDEN";

pub type ReaddirFn = unsafe extern "C" fn(*mut DIR) -> *mut dirent;

/// Something callable with `readdir`'s contract.
pub trait ReaddirTarget: Copy {
    /// # Safety
    ///
    /// `dirp` must be a stream this target can read.
    unsafe fn call(self, dirp: *mut DIR) -> *mut dirent;
}

impl ReaddirTarget for ReaddirFn {
    #[inline(always)]
    unsafe fn call(self, dirp: *mut DIR) -> *mut dirent {
        self(dirp)
    }
}

/// Any pattern contained anywhere in `name` hides it.
pub fn is_hidden(patterns: &PatternList, name: &[u8]) -> bool {
    patterns.matches(MatchRule::Substring, name)
}

pub struct VisibilityFilter<F = ReaddirFn> {
    target: LazySymbol<F>,
    policy: PolicyLoader,
}

impl<F: ReaddirTarget> VisibilityFilter<F> {
    pub const fn new() -> Self {
        Self::with_key(HIDDEN_KEY)
    }

    pub const fn with_key(key: &'static CStr) -> Self {
        Self {
            target: LazySymbol::new(c"readdir"),
            policy: PolicyLoader::new(key, DELIMITER),
        }
    }

    pub fn policy(&self) -> &PolicyLoader {
        &self.policy
    }

    pub fn target(&self) -> &LazySymbol<F> {
        &self.target
    }

    /// Binds `readdir` and loads the hidden patterns, leaving errno as it was.
    ///
    /// # Safety
    ///
    /// `F` must match the signature of the symbol `resolver` returns for `readdir`.
    pub unsafe fn prepare<R, S>(
        &self,
        resolver: &R,
        source: &S,
    ) -> Result<(F, &PatternList), FilterError>
    where
        R: SymbolResolver + ?Sized,
        S: ConfigSource + ?Sized,
    {
        let saved = errno::get();
        let real = self.target.get(resolver)?;
        let patterns = self.policy.load(source)?;
        errno::set(saved);
        Ok((real, patterns))
    }

    /// Next entry of `dirp` that is not hidden, or null at end of stream.
    ///
    /// # Safety
    ///
    /// Same as [`Self::prepare`], and `dirp` must be valid for the real `readdir`.
    pub unsafe fn next<R, S>(
        &self,
        resolver: &R,
        source: &S,
        dirp: *mut DIR,
    ) -> Result<*mut dirent, FilterError>
    where
        R: SymbolResolver + ?Sized,
        S: ConfigSource + ?Sized,
    {
        self.next_with(resolver, source, dirp, |_| {})
    }

    /// Like [`Self::next`], calling `on_hidden` with each skipped name. errno changes
    /// made by `on_hidden` are undone.
    ///
    /// # Safety
    ///
    /// Same as [`Self::next`].
    pub unsafe fn next_with<R, S, H>(
        &self,
        resolver: &R,
        source: &S,
        dirp: *mut DIR,
        mut on_hidden: H,
    ) -> Result<*mut dirent, FilterError>
    where
        R: SymbolResolver + ?Sized,
        S: ConfigSource + ?Sized,
        H: FnMut(&CStr),
    {
        let (real, patterns) = self.prepare(resolver, source)?;

        loop {
            // Null is end of stream or an error; errno is the real readdir's either way.
            let entry = real.call(dirp);
            if entry.is_null() {
                return Ok(entry);
            }

            let name = CStr::from_ptr((*entry).d_name.as_ptr());
            if !is_hidden(patterns, name.to_bytes()) {
                return Ok(entry);
            }
            let saved = errno::get();
            on_hidden(name);
            errno::set(saved);
        }
    }
}

impl<F: ReaddirTarget> Default for VisibilityFilter<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(raw: &str) -> PatternList {
        PatternList::parse(raw.as_bytes(), DELIMITER).unwrap()
    }

    #[test]
    fn test_is_hidden_any_pattern() {
        let patterns = list(".git:node_modules");
        assert!(is_hidden(&patterns, b".git"));
        assert!(is_hidden(&patterns, b".gitignore"));
        assert!(is_hidden(&patterns, b"node_modules"));
        assert!(!is_hidden(&patterns, b"a.txt"));
        assert!(!is_hidden(&patterns, b"git"));
    }

    #[test]
    fn test_is_hidden_is_case_sensitive() {
        assert!(!is_hidden(&list("secret"), b"SECRET.txt"));
    }

    #[test]
    fn test_nothing_hidden_without_patterns() {
        assert!(!is_hidden(&PatternList::empty(), b".git"));
    }
}
