//! # hidefile-inception-layer
//!
//! LD_PRELOAD inception layer that filters two libc calls for every program it is
//! injected into:
//!
//! - `readdir` skips entries whose name contains any pattern from `HIDDEN`.
//! - `open` fails with `EACCES` for paths ending with any suffix from `BLOCKED`.
//!
//! Both variables are `:`-separated and read once, on the first call of each
//! wrapper. The real functions are bound with `dlsym(RTLD_NEXT, ..)` on first use.
//!
//! ## Rules inside an interposed call
//! - No `println!`/`eprintln!`: log through [`macros::StackWriter`] and `write(2)`.
//! - No `panic!`: unrecoverable setup failures go through [`state::fatal`].
//! - errno seen by the caller is the real call's, or `EACCES` for a denial.
//!
//! ```bash
//! HIDDEN=.git:node_modules BLOCKED=.key \
//!     LD_PRELOAD=target/debug/libhidefile_inception_layer.so ./program
//! ```

// Allow unsafe FFI functions without safety docs - these are inherently unsafe C ABI
#![allow(clippy::missing_safety_doc)]

// Macros must be defined before modules that use them
#[macro_use]
pub mod macros;

pub mod state;
pub mod syscalls;
