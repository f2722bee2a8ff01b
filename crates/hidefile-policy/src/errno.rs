//! Platform-agnostic errno access.

use libc::c_int;

#[cfg(target_os = "linux")]
#[inline(always)]
fn location() -> *mut c_int {
    unsafe { libc::__errno_location() }
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
#[inline(always)]
fn location() -> *mut c_int {
    unsafe { libc::__error() }
}

#[inline(always)]
pub fn get() -> c_int {
    unsafe { *location() }
}

#[inline(always)]
pub fn set(e: c_int) {
    unsafe { *location() = e }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        set(libc::EACCES);
        assert_eq!(get(), libc::EACCES);
        set(0);
        assert_eq!(get(), 0);
    }
}
