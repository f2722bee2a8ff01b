//! Process-wide state of the layer: the two filters and the log level.

use std::convert::Infallible;
use std::ffi::CStr;

use hidefile_policy::{
    AccessFilter, ConfigSource, FilterError, InitCell, ProcessEnv, VisibilityFilter,
};

/// Filter behind the exported `readdir`.
pub static VISIBILITY: VisibilityFilter = VisibilityFilter::new();

/// Filter behind the exported `open`.
pub static ACCESS: AccessFilter = AccessFilter::new();

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Off = 5,
}

impl LogLevel {
    /// Parses `HIDEFILE_LOG_LEVEL`. Unknown values fall back to the default.
    pub fn parse(bytes: &[u8]) -> Self {
        if bytes.eq_ignore_ascii_case(b"trace") {
            LogLevel::Trace
        } else if bytes.eq_ignore_ascii_case(b"debug") {
            LogLevel::Debug
        } else if bytes.eq_ignore_ascii_case(b"info") {
            LogLevel::Info
        } else if bytes.eq_ignore_ascii_case(b"warn") {
            LogLevel::Warn
        } else if bytes.eq_ignore_ascii_case(b"error") {
            LogLevel::Error
        } else if bytes.eq_ignore_ascii_case(b"off") {
            LogLevel::Off
        } else {
            DEFAULT_LOG_LEVEL
        }
    }
}

pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Warn;

const LOG_LEVEL_KEY: &CStr = c"HIDEFILE_LOG_LEVEL";
const DEBUG_KEY: &CStr = c"HIDEFILE_DEBUG";

static LOG_LEVEL: InitCell<LogLevel> = InitCell::new();

/// Effective level from `HIDEFILE_DEBUG` (forces debug) or `HIDEFILE_LOG_LEVEL`,
/// read on first use.
pub fn log_level() -> LogLevel {
    let level = LOG_LEVEL.get_or_try_init(|| {
        let env = ProcessEnv;
        let level = match env.lookup(LOG_LEVEL_KEY) {
            Some(raw) => LogLevel::parse(raw),
            None => DEFAULT_LOG_LEVEL,
        };
        let level = match env.lookup(DEBUG_KEY) {
            Some(_) => level.min(LogLevel::Debug),
            None => level,
        };
        Ok::<_, Infallible>(level)
    });
    match level {
        Ok(level) => *level,
        Err(_) => DEFAULT_LOG_LEVEL,
    }
}

pub fn log_enabled(level: LogLevel) -> bool {
    level != LogLevel::Off && log_level() <= level
}

/// Reports a failed binding or policy load on stderr and aborts the process.
pub fn fatal(call: &str, err: &FilterError) -> ! {
    use std::fmt::Write;

    let mut buf = [0u8; 512];
    let mut wrapper = crate::macros::StackWriter::new(&mut buf);
    let pid = unsafe { libc::getpid() };
    let _ = writeln!(wrapper, "[hidefile][{}][FATAL] {}: {}", pid, call, err);
    let msg = wrapper.as_bytes();
    unsafe {
        libc::write(2, msg.as_ptr() as *const libc::c_void, msg.len());
        libc::abort()
    }
}
