//! In-memory stand-ins for the environment and the dynamic linker.
//!
//! # Usage
//!
//! ```ignore
//! use hidefile_policy::testing::{MapSource, StaticResolver};
//!
//! let source = MapSource::new().with(c"HIDDEN", ".git:node_modules");
//! let resolver = StaticResolver::new().with(c"readdir", fake_readdir as ReaddirFn as *mut c_void);
//! let entry = unsafe { filter.next(&resolver, &source, dirp) }?;
//! assert_eq!(source.lookups(), 1);
//! ```

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use libc::c_void;

use crate::bind::SymbolResolver;
use crate::source::ConfigSource;

/// Key/value configuration source that counts lookups.
#[derive(Debug, Default)]
pub struct MapSource {
    values: HashMap<CString, Vec<u8>>,
    lookups: AtomicUsize,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &CStr, value: impl AsRef<[u8]>) -> Self {
        self.values.insert(key.to_owned(), value.as_ref().to_vec());
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ConfigSource for MapSource {
    fn lookup(&self, key: &CStr) -> Option<&[u8]> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.values.get(key).map(Vec::as_slice)
    }
}

/// Symbol table that counts resolutions.
#[derive(Debug, Default)]
pub struct StaticResolver {
    symbols: HashMap<CString, usize>,
    resolutions: AtomicUsize,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &CStr, addr: *mut c_void) -> Self {
        self.symbols.insert(name.to_owned(), addr as usize);
        self
    }

    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }
}

impl SymbolResolver for StaticResolver {
    fn resolve(&self, name: &CStr) -> Option<NonNull<c_void>> {
        self.resolutions.fetch_add(1, Ordering::SeqCst);
        self.symbols
            .get(name)
            .and_then(|addr| NonNull::new(*addr as *mut c_void))
    }
}
