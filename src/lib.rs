//! A stack-based bytecode virtual machine.
//!
//! Loads a compact binary executable — header, constant pool, globals,
//! code, class metadata — and interprets its instruction stream: 32-bit
//! signed integer and IEEE-754 binary32 arithmetic, direct/conditional
//! control flow, framed function calls, a minimal single-inheritance
//! object model with virtual dispatch, typed arrays, and a small syscall
//! bridge for host I/O.
//!
//! See `SPEC_FULL.md` for the full component breakdown; `DESIGN.md` for
//! where each module is grounded.

#![warn(missing_docs)]
#![deny(unused_must_use)]

pub mod class;
pub mod consts;
pub mod debug;
pub mod error;
pub mod frame;
pub mod heap;
pub mod host;
pub mod interpreter;
pub mod loader;
pub mod opcode;
pub mod value;
