use std::ffi::CStr;

/// Failures while building a pattern list. Both are fatal for the owning filter.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("allocation failed while building the {key:?} pattern list")]
    Alloc { key: &'static CStr },
    #[error("re-entrant initialization of the {key:?} pattern list")]
    Reentrant { key: &'static CStr },
}

/// Failures while binding the next-in-chain definition of a symbol.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BindError {
    #[error("symbol {0:?} has no next definition")]
    NotFound(&'static CStr),
    #[error("re-entrant resolution of symbol {0:?}")]
    Reentrant(&'static CStr),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
}
