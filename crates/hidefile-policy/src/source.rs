//! Where filters read their configuration from.

use std::ffi::CStr;

/// Read-only lookup of a configuration string by key.
pub trait ConfigSource {
    fn lookup(&self, key: &CStr) -> Option<&[u8]>;
}

/// The process environment, read with `getenv(3)`.
///
/// Goes straight to libc: no environment lock and no `OsString` allocation inside an
/// interposed call.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn lookup(&self, key: &CStr) -> Option<&[u8]> {
        let ptr = unsafe { libc::getenv(key.as_ptr()) };
        if ptr.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(ptr) }.to_bytes())
        }
    }
}
