//! # hidefile-policy
//!
//! Shared engine behind the hidefile inception layer and CLI.
//!
//! - [`PatternList`] / [`MatchRule`]: `:`-separated patterns and the two match rules
//!   (substring for hidden names, suffix for blocked paths).
//! - [`PolicyLoader`]: reads one environment key exactly once per process.
//! - [`LazySymbol`]: binds the next-in-chain definition of a libc symbol exactly once.
//! - [`VisibilityFilter`] / [`AccessFilter`]: the `readdir` and `open` filters, each
//!   owning one loader and one binder.
//!
//! Filters are plain values with `const` constructors so the layer can keep them in
//! statics while tests build independent instances against fake delegates.

pub mod bind;
pub mod errno;
pub mod error;
pub mod filter;
pub mod loader;
pub mod pattern;
pub mod source;
pub mod sync;
pub mod testing;

pub use bind::{LazySymbol, NextInChain, SymbolResolver};
pub use error::{BindError, FilterError, PolicyError};
pub use filter::access::{
    blocking_suffix, AccessFilter, OpenFn, OpenOutcome, OpenRequest, OpenTarget, BLOCKED_KEY,
    BLOCKED_VAR,
};
pub use filter::visibility::{is_hidden, ReaddirFn, ReaddirTarget, VisibilityFilter, HIDDEN_KEY, HIDDEN_VAR};
pub use loader::PolicyLoader;
pub use pattern::{MatchRule, PatternList, DELIMITER};
pub use source::{ConfigSource, ProcessEnv};
pub use sync::{InitCell, InitError, InitState};
