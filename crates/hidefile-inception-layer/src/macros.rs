/// Formats one line into a stack buffer and writes it to stderr when `$level` is
/// enabled. Never allocates and never calls back into an interposed function.
#[macro_export]
macro_rules! layer_log_at_level {
    ($level:expr, $tag:expr, $($arg:tt)*) => {
        {
            if $crate::state::log_enabled($level) {
                use std::fmt::Write;
                let mut buf = [0u8; 512];
                let mut wrapper = $crate::macros::StackWriter::new(&mut buf);
                let pid = unsafe { libc::getpid() };
                let _ = write!(wrapper, "[hidefile][{}][{}] ", pid, $tag);
                let _ = write!(wrapper, $($arg)*);
                let _ = writeln!(wrapper);

                let msg = wrapper.as_bytes();
                unsafe {
                    libc::write(2, msg.as_ptr() as *const libc::c_void, msg.len());
                }
            }
        }
    };
}

#[macro_export]
macro_rules! layer_trace { ($($arg:tt)*) => { $crate::layer_log_at_level!($crate::state::LogLevel::Trace, "TRACE", $($arg)*) }; }
#[macro_export]
macro_rules! layer_debug { ($($arg:tt)*) => { $crate::layer_log_at_level!($crate::state::LogLevel::Debug, "DEBUG", $($arg)*) }; }

/// `fmt::Write` over a fixed buffer. Output past the end is dropped, but the last
/// bytes are kept for a trailing newline.
pub struct StackWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> StackWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.pos]
    }
}

impl std::fmt::Write for StackWriter<'_> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        let bytes = s.as_bytes();
        // The last byte is reserved for the newline.
        let limit = if bytes == b"\n" {
            self.buf.len()
        } else {
            self.buf.len().saturating_sub(1)
        };
        let to_copy = std::cmp::min(bytes.len(), limit.saturating_sub(self.pos));
        self.buf[self.pos..self.pos + to_copy].copy_from_slice(&bytes[..to_copy]);
        self.pos += to_copy;
        Ok(())
    }
}

/// Displays raw path bytes without allocating.
pub struct RawBytes<'a>(pub &'a [u8]);

impl std::fmt::Display for RawBytes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for chunk in self.0.utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_str("\u{FFFD}")?;
            }
        }
        Ok(())
    }
}
