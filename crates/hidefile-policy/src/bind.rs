//! Lazy binding of real libc symbols.
//!
//! A wrapper exported under a libc name cannot call that name again without
//! recursing into itself, so each wrapper delegates through a [`LazySymbol`] that
//! resolves the *next* definition in load order on first use and caches it.

use std::ffi::CStr;
use std::ptr::NonNull;

use libc::c_void;
use tracing::debug;

use crate::error::BindError;
use crate::sync::{InitCell, InitError, InitState};

/// Looks up a symbol by name.
pub trait SymbolResolver {
    fn resolve(&self, name: &CStr) -> Option<NonNull<c_void>>;
}

/// `dlsym(RTLD_NEXT, name)`: the first definition after the calling object.
#[derive(Debug, Default, Clone, Copy)]
pub struct NextInChain;

impl SymbolResolver for NextInChain {
    fn resolve(&self, name: &CStr) -> Option<NonNull<c_void>> {
        NonNull::new(unsafe { libc::dlsym(libc::RTLD_NEXT, name.as_ptr()) })
    }
}

/// Storage for one real function, resolved at most once.
pub struct LazySymbol<F> {
    name: &'static CStr,
    target: InitCell<F>,
}

impl<F: Copy> LazySymbol<F> {
    const POINTER_SIZED: () = assert!(
        std::mem::size_of::<F>() == std::mem::size_of::<*mut c_void>(),
        "LazySymbol target must be a function pointer"
    );

    pub const fn new(name: &'static CStr) -> Self {
        Self {
            name,
            target: InitCell::new(),
        }
    }

    pub fn name(&self) -> &'static CStr {
        self.name
    }

    pub fn state(&self) -> InitState {
        self.target.state()
    }

    /// Returns the cached target, resolving it through `resolver` on first use.
    ///
    /// # Safety
    ///
    /// `F` must be a function pointer type whose signature matches the C definition
    /// of `name`.
    pub unsafe fn get<R: SymbolResolver + ?Sized>(&self, resolver: &R) -> Result<F, BindError> {
        #[allow(clippy::let_unit_value)]
        let () = Self::POINTER_SIZED;

        if let Some(f) = self.target.get() {
            return Ok(*f);
        }

        self.target
            .get_or_try_init(|| {
                let ptr = resolver
                    .resolve(self.name)
                    .ok_or(BindError::NotFound(self.name))?;
                debug!(
                    component = "POLICY",
                    symbol = ?self.name,
                    addr = ?ptr,
                    "bound next-in-chain symbol"
                );
                Ok(unsafe { std::mem::transmute_copy::<NonNull<c_void>, F>(&ptr) })
            })
            .map(|f| *f)
            .map_err(|e| match e {
                InitError::Reentrant => BindError::Reentrant(self.name),
                InitError::Failed(e) => e,
            })
    }
}
