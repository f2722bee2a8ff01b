//! `open` filter: denies paths ending with a `BLOCKED` suffix.

use std::ffi::CStr;

use libc::{c_char, c_int, mode_t};

use crate::bind::{LazySymbol, SymbolResolver};
use crate::errno;
use crate::error::FilterError;
use crate::loader::PolicyLoader;
use crate::pattern::{MatchRule, PatternList, DELIMITER};
use crate::source::ConfigSource;

pub const BLOCKED_VAR: &str = "BLOCKED";
pub const BLOCKED_KEY: &CStr = c"BLOCKED";

/// The real `open(2)` wrapper, called through its variadic C signature.
pub type OpenFn = unsafe extern "C" fn(*const c_char, c_int, ...) -> c_int;

/// Flags plus a creation mode that is present exactly when the flags require one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenRequest {
    flags: c_int,
    mode: Option<mode_t>,
}

impl OpenRequest {
    /// Whether `open` reads its third argument for these flags: `O_CREAT`, or the
    /// full `O_TMPFILE` bit pattern on Linux.
    pub fn needs_mode(flags: c_int) -> bool {
        if flags & libc::O_CREAT != 0 {
            return true;
        }
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            if flags & libc::O_TMPFILE == libc::O_TMPFILE {
                return true;
            }
        }
        false
    }

    /// Builds a request from the raw third argument slot; `raw_mode` is discarded
    /// unless the flags call for a mode.
    pub fn from_raw(flags: c_int, raw_mode: mode_t) -> Self {
        Self {
            flags,
            mode: Self::needs_mode(flags).then_some(raw_mode),
        }
    }

    pub fn flags(&self) -> c_int {
        self.flags
    }

    pub fn mode(&self) -> Option<mode_t> {
        self.mode
    }
}

/// Something callable with `open`'s contract.
pub trait OpenTarget: Copy {
    /// # Safety
    ///
    /// `path` must be null or a valid C string.
    unsafe fn call(self, path: *const c_char, request: OpenRequest) -> c_int;
}

impl OpenTarget for OpenFn {
    #[inline(always)]
    #[allow(clippy::unnecessary_cast)]
    unsafe fn call(self, path: *const c_char, request: OpenRequest) -> c_int {
        match request.mode() {
            Some(mode) => self(path, request.flags(), mode as libc::c_uint),
            None => self(path, request.flags()),
        }
    }
}

/// First blocked suffix (in configured order) that `path` ends with.
pub fn blocking_suffix<'a>(patterns: &'a PatternList, path: &[u8]) -> Option<&'a [u8]> {
    patterns.first_match(MatchRule::Suffix, path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome<'a> {
    /// The path ended with `suffix`; the real `open` was not called.
    Denied { suffix: &'a [u8] },
    /// The real `open` ran and returned this value.
    Delegated(c_int),
}

impl OpenOutcome<'_> {
    /// C return convention: `-1` with `errno = EACCES` for a denial, otherwise the
    /// delegate's value with its errno untouched.
    pub fn into_raw(self) -> c_int {
        match self {
            OpenOutcome::Denied { .. } => {
                errno::set(libc::EACCES);
                -1
            }
            OpenOutcome::Delegated(ret) => ret,
        }
    }
}

pub struct AccessFilter<F = OpenFn> {
    target: LazySymbol<F>,
    policy: PolicyLoader,
}

impl<F: OpenTarget> AccessFilter<F> {
    pub const fn new() -> Self {
        Self::with_key(BLOCKED_KEY)
    }

    pub const fn with_key(key: &'static CStr) -> Self {
        Self {
            target: LazySymbol::new(c"open"),
            policy: PolicyLoader::new(key, DELIMITER),
        }
    }

    pub fn policy(&self) -> &PolicyLoader {
        &self.policy
    }

    pub fn target(&self) -> &LazySymbol<F> {
        &self.target
    }

    /// Binds `open` and loads the blocked suffixes, leaving errno as it was.
    ///
    /// # Safety
    ///
    /// `F` must match the signature of the symbol `resolver` returns for `open`.
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

    /// Denies `path` if it ends with a blocked suffix, otherwise delegates exactly
    /// once. A null `path` is never matched; the real `open` reports it.
    ///
    /// # Safety
    ///
    /// Same as [`Self::prepare`], and `path` must be null or a valid C string.
    pub unsafe fn guard<R, S>(
        &self,
        resolver: &R,
        source: &S,
        path: *const c_char,
        request: OpenRequest,
    ) -> Result<OpenOutcome<'_>, FilterError>
    where
        R: SymbolResolver + ?Sized,
        S: ConfigSource + ?Sized,
    {
        let (real, patterns) = self.prepare(resolver, source)?;

        if !path.is_null() {
            let bytes = CStr::from_ptr(path).to_bytes();
            if let Some(suffix) = blocking_suffix(patterns, bytes) {
                return Ok(OpenOutcome::Denied { suffix });
            }
        }

        Ok(OpenOutcome::Delegated(real.call(path, request)))
    }
}

impl<F: OpenTarget> Default for AccessFilter<F> {
    fn default() -> Self {
        Self::new()
    }
}
