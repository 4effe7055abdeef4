//! The debug-trace sink (spec.md §6): an optional, out-of-contract stream
//! of human-readable lines, each prefixed `[VM DEBUG] `.
//!
//! Grounded on `examples/original_source/src/VM.c`'s `vm_debug_printf`,
//! which writes exactly that prefix to fd 2 when built with `VM_DEBUG`
//! defined. Here the toggle is a `std::io::Write` the caller supplies (or
//! doesn't) rather than a compile-time flag, so a library embedder can
//! route it anywhere — the CLI (`src/bin/vm.rs`) wires it to stderr when
//! the `VM_DEBUG` environment variable is set.

use std::io::Write;

use crate::consts::DEBUG_TRACE_PREFIX;

/// An optional sink for `[VM DEBUG]`-prefixed trace lines. Its format is
/// explicitly not part of the VM's contract (spec.md §6).
pub struct DebugTrace {
    sink: Option<Box<dyn Write + Send>>,
}

impl DebugTrace {
    /// A disabled trace: every [`DebugTrace::line`] call is a no-op.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// A trace writing to `sink`, one `[VM DEBUG] `-prefixed line per call.
    pub fn enabled(sink: Box<dyn Write + Send>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Emit one line, formatted lazily so disabled traces pay nothing.
    pub fn line(&mut self, f: impl FnOnce() -> String) {
        if let Some(sink) = self.sink.as_mut() {
            let _ = writeln!(sink, "{DEBUG_TRACE_PREFIX}{}", f());
        }
    }
}

impl Default for DebugTrace {
    fn default() -> Self {
        Self::disabled()
    }
}
