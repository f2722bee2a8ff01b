//! Exported libc wrappers.
//!
//! `open` is declared with a fixed third `mode_t` parameter. On the ABIs below a
//! variadic argument is passed in the same register as a named one, so the value is
//! read without undefined behaviour and only trusted when the flags call for it.

pub mod dir;
pub mod open;
