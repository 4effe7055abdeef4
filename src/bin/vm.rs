//! `vm <binary-file>` — load and run a compiled executable (spec.md §6 CLI).
//!
//! Argument parsing is intentionally bare: there is exactly one positional
//! argument and no flags beyond the `VM_DEBUG` environment toggle, so this
//! reads `std::env::args()` directly rather than pulling in a CLI-parsing
//! crate (see `SPEC_FULL.md` §2). Grounded on
//! `examples/original_source/src/main.c`'s `main`: read argv[1], read the
//! file, construct and run the VM, map the outcome to a process exit code.

use std::io::Write;
use std::process::ExitCode;

use stackvm::debug::DebugTrace;
use stackvm::host::NativeHost;
use stackvm::interpreter::{Interpreter, Outcome};
use stackvm::loader;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "vm".to_string());
    let Some(path) = args.next() else {
        eprintln!("Usage: {program} <binary-file>");
        return ExitCode::FAILURE;
    };

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("error: cannot read '{path}': {err}");
            return ExitCode::FAILURE;
        }
    };

    let image = match loader::load(&bytes) {
        Ok(image) => image,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let debug = if std::env::var_os("VM_DEBUG").is_some() {
        DebugTrace::enabled(Box::new(std::io::stderr()))
    } else {
        DebugTrace::disabled()
    };

    let mut interpreter = Interpreter::new(image, NativeHost::new()).with_debug_trace(debug);

    match interpreter.run() {
        Ok(Outcome::Halted(value)) => {
            if value != 0 {
                let _ = writeln!(std::io::stderr(), "halted with top-of-stack {value:#010x}");
            }
            ExitCode::SUCCESS
        }
        Ok(Outcome::Exited(code)) => ExitCode::from(code as u8),
        Err(reported) => {
            eprintln!("fault: {reported}");
            ExitCode::FAILURE
        }
    }
}
