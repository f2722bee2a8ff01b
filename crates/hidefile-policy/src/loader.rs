use std::ffi::CStr;

use tracing::debug;

use crate::error::PolicyError;
use crate::pattern::PatternList;
use crate::source::ConfigSource;
use crate::sync::{InitCell, InitError, InitState};

/// Reads one configuration key and caches the parsed [`PatternList`] for the
/// lifetime of the loader (the process, for the layer's statics).
///
/// An absent key yields an empty list. Only the first successful `load` reads the
/// source; later calls return the cached list.
pub struct PolicyLoader {
    key: &'static CStr,
    delimiter: u8,
    list: InitCell<PatternList>,
}

impl PolicyLoader {
    pub const fn new(key: &'static CStr, delimiter: u8) -> Self {
        Self {
            key,
            delimiter,
            list: InitCell::new(),
        }
    }

    pub fn key(&self) -> &'static CStr {
        self.key
    }

    pub fn state(&self) -> InitState {
        self.list.state()
    }

    /// The cached list, if a `load` has completed.
    pub fn get(&self) -> Option<&PatternList> {
        self.list.get()
    }

    pub fn load<S: ConfigSource + ?Sized>(&self, source: &S) -> Result<&PatternList, PolicyError> {
        if let Some(list) = self.list.get() {
            return Ok(list);
        }

        self.list
            .get_or_try_init(|| {
                let list = match source.lookup(self.key) {
                    None => PatternList::empty(),
                    Some(raw) => PatternList::parse(raw, self.delimiter)
                        .map_err(|_| PolicyError::Alloc { key: self.key })?,
                };
                debug!(
                    component = "POLICY",
                    key = ?self.key,
                    patterns = list.len(),
                    "pattern list loaded"
                );
                Ok(list)
            })
            .map_err(|e| match e {
                InitError::Reentrant => PolicyError::Reentrant { key: self.key },
                InitError::Failed(e) => e,
            })
    }
}
