use hidefile_policy::{NextInChain, ProcessEnv};
use libc::{dirent, DIR};

use crate::macros::RawBytes;
use crate::state::{fatal, VISIBILITY};

/// Real `readdir`, minus entries whose name contains a `HIDDEN` pattern.
///
/// Returns null at end of stream even when the remaining entries were all hidden.
pub unsafe fn readdir_inception(dirp: *mut DIR) -> *mut dirent {
    let next = VISIBILITY.next_with(&NextInChain, &ProcessEnv, dirp, |name| {
        layer_trace!("readdir hid {}", RawBytes(name.to_bytes()));
    });
    match next {
        Ok(entry) => entry,
        Err(err) => fatal("readdir", &err),
    }
}

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
))]
#[no_mangle]
pub unsafe extern "C" fn readdir(dirp: *mut DIR) -> *mut dirent {
    readdir_inception(dirp)
}
