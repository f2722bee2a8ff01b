use hidefile_policy::{NextInChain, OpenOutcome, OpenRequest, ProcessEnv};
use libc::{c_char, c_int, mode_t};
use std::ffi::CStr;

use crate::macros::RawBytes;
use crate::state::{fatal, ACCESS};

/// Real `open`, unless `path` ends with a `BLOCKED` suffix: then -1 with `EACCES`
/// and the file is never touched.
pub unsafe fn open_inception(path: *const c_char, flags: c_int, mode: mode_t) -> c_int {
    let request = OpenRequest::from_raw(flags, mode);
    let outcome = match ACCESS.guard(&NextInChain, &ProcessEnv, path, request) {
        Ok(outcome) => outcome,
        Err(err) => fatal("open", &err),
    };
    if let OpenOutcome::Denied { suffix } = outcome {
        layer_debug!(
            "open denied: {} (blocked suffix {})",
            RawBytes(CStr::from_ptr(path).to_bytes()),
            RawBytes(suffix)
        );
    }
    outcome.into_raw()
}

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
))]
#[no_mangle]
pub unsafe extern "C" fn open(path: *const c_char, flags: c_int, mode: mode_t) -> c_int {
    open_inception(path, flags, mode)
}
