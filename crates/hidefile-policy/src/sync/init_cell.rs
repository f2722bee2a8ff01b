use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

const UNINIT: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;

/// Lifecycle of an [`InitCell`]: `Uninitialized -> Initializing -> Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initializing,
    Ready,
}

#[derive(Debug, PartialEq, Eq)]
pub enum InitError<E> {
    /// The initializing thread re-entered the cell from inside its own initializer.
    Reentrant,
    Failed(E),
}

/// A write-once cell usable from interposed C entry points.
///
/// Exactly one thread runs the initializer; other threads spin until the value is
/// published. Unlike `std::sync::OnceLock`, re-entering the cell from inside the
/// initializer on the same thread is reported as [`InitError::Reentrant`] instead
/// of deadlocking, so a wrapper called back from its own initialization can bail out.
///
/// A failed (or unwinding) initializer returns the cell to `Uninitialized`.
pub struct InitCell<T> {
    state: AtomicU8,
    owner: AtomicUsize,
    value: UnsafeCell<MaybeUninit<T>>,
}

unsafe impl<T: Send + Sync> Sync for InitCell<T> {}
unsafe impl<T: Send> Send for InitCell<T> {}

impl<T> InitCell<T> {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(UNINIT),
            owner: AtomicUsize::new(0),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    #[inline(always)]
    pub fn get(&self) -> Option<&T> {
        if self.state.load(Ordering::Acquire) == READY {
            Some(unsafe { self.get_unchecked() })
        } else {
            None
        }
    }

    pub fn state(&self) -> InitState {
        match self.state.load(Ordering::Acquire) {
            UNINIT => InitState::Uninitialized,
            INITIALIZING => InitState::Initializing,
            _ => InitState::Ready,
        }
    }

    pub fn get_or_try_init<E, F>(&self, init: F) -> Result<&T, InitError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get() {
            return Ok(value);
        }

        let me = current_thread();
        loop {
            match self.state.compare_exchange(
                UNINIT,
                INITIALIZING,
                Ordering::Acquire,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.owner.store(me, Ordering::Relaxed);
                    let reset = ResetOnUnwind(self);
                    let result = init();
                    std::mem::forget(reset);

                    return match result {
                        Ok(value) => {
                            unsafe { (*self.value.get()).write(value) };
                            self.owner.store(0, Ordering::Relaxed);
                            self.state.store(READY, Ordering::Release);
                            Ok(unsafe { self.get_unchecked() })
                        }
                        Err(e) => {
                            self.owner.store(0, Ordering::Relaxed);
                            self.state.store(UNINIT, Ordering::Release);
                            Err(InitError::Failed(e))
                        }
                    };
                }
                Err(READY) => return Ok(unsafe { self.get_unchecked() }),
                Err(_) => {
                    if self.owner.load(Ordering::Relaxed) == me {
                        return Err(InitError::Reentrant);
                    }
                    std::thread::yield_now();
                }
            }
        }
    }

    /// Caller must have observed `READY` with `Acquire` ordering.
    #[inline(always)]
    unsafe fn get_unchecked(&self) -> &T {
        (*self.value.get()).assume_init_ref()
    }
}

impl<T> Default for InitCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for InitCell<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == READY {
            unsafe { self.value.get_mut().assume_init_drop() };
        }
    }
}

struct ResetOnUnwind<'a, T>(&'a InitCell<T>);

impl<T> Drop for ResetOnUnwind<'_, T> {
    fn drop(&mut self) {
        self.0.owner.store(0, Ordering::Relaxed);
        self.0.state.store(UNINIT, Ordering::Release);
    }
}

#[inline(always)]
fn current_thread() -> usize {
    unsafe { libc::pthread_self() as usize }
}
