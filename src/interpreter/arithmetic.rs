//! Arithmetic and comparison opcodes (spec.md §4.6 "Arithmetic"/"Comparisons").
//!
//! Grounded on the teacher's `alu.rs`: one small helper pattern (pop two,
//! compute, push one) applied per opcode, rather than one giant match arm
//! per instruction doing its own stack plumbing.

use crate::error::Fault;
use crate::host::Host;
use crate::value::{f32_to_word, i32_to_word, word_to_f32, word_to_i32, Word};

use super::Interpreter;

impl<H: Host> Interpreter<H> {
    fn pop_ints(&mut self) -> Result<(i32, i32), Fault> {
        let b = word_to_i32(self.frame.pop()?);
        let a = word_to_i32(self.frame.pop()?);
        Ok((a, b))
    }

    fn pop_floats(&mut self) -> Result<(f32, f32), Fault> {
        let b = word_to_f32(self.frame.pop()?);
        let a = word_to_f32(self.frame.pop()?);
        Ok((a, b))
    }

    fn push_int(&mut self, v: i32) -> Result<(), Fault> {
        self.frame.push(i32_to_word(v))
    }

    fn push_float(&mut self, v: f32) -> Result<(), Fault> {
        self.frame.push(f32_to_word(v))
    }

    fn push_bool(&mut self, v: bool) -> Result<(), Fault> {
        self.frame.push(v as Word)
    }

    pub(super) fn op_iadd(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_ints()?;
        self.push_int(a.wrapping_add(b))
    }

    pub(super) fn op_isub(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_ints()?;
        self.push_int(a.wrapping_sub(b))
    }

    pub(super) fn op_imul(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_ints()?;
        self.push_int(a.wrapping_mul(b))
    }

    pub(super) fn op_idiv(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_ints()?;
        if b == 0 {
            return Err(Fault::ArithmeticFault);
        }
        self.push_int(a.wrapping_div(b))
    }

    pub(super) fn op_imod(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_ints()?;
        if b == 0 {
            return Err(Fault::ArithmeticFault);
        }
        self.push_int(a.wrapping_rem(b))
    }

    pub(super) fn op_ineg(&mut self) -> Result<(), Fault> {
        let a = word_to_i32(self.frame.pop()?);
        self.push_int(a.wrapping_neg())
    }

    pub(super) fn op_fadd(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_floats()?;
        self.push_float(a + b)
    }

    pub(super) fn op_fsub(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_floats()?;
        self.push_float(a - b)
    }

    pub(super) fn op_fmul(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_floats()?;
        self.push_float(a * b)
    }

    pub(super) fn op_fdiv(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_floats()?;
        if b == 0.0 {
            return Err(Fault::ArithmeticFault);
        }
        self.push_float(a / b)
    }

    pub(super) fn op_fneg(&mut self) -> Result<(), Fault> {
        let a = word_to_f32(self.frame.pop()?);
        self.push_float(-a)
    }

    pub(super) fn op_icmp_eq(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_ints()?;
        self.push_bool(a == b)
    }

    pub(super) fn op_icmp_lt(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_ints()?;
        self.push_bool(a < b)
    }

    pub(super) fn op_icmp_gt(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_ints()?;
        self.push_bool(a > b)
    }

    pub(super) fn op_icmp_geq(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_ints()?;
        self.push_bool(a >= b)
    }

    pub(super) fn op_icmp_neq(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_ints()?;
        self.push_bool(a != b)
    }

    pub(super) fn op_icmp_leq(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_ints()?;
        self.push_bool(a <= b)
    }

    // Float comparisons rely on Rust's native IEEE-754 semantics: every
    // comparison except `!=` is already false whenever either operand is
    // NaN, and `!=` is already true — exactly spec.md's "unordered
    // comparisons return 0 except FCMP_NEQ which returns 1" rule.

    pub(super) fn op_fcmp_eq(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_floats()?;
        self.push_bool(a == b)
    }

    pub(super) fn op_fcmp_lt(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_floats()?;
        self.push_bool(a < b)
    }

    pub(super) fn op_fcmp_gt(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_floats()?;
        self.push_bool(a > b)
    }

    pub(super) fn op_fcmp_geq(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_floats()?;
        self.push_bool(a >= b)
    }

    pub(super) fn op_fcmp_neq(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_floats()?;
        self.push_bool(a != b)
    }

    pub(super) fn op_fcmp_leq(&mut self) -> Result<(), Fault> {
        let (a, b) = self.pop_floats()?;
        self.push_bool(a <= b)
    }
}

#[cfg(test)]
mod tests {
    use crate::host::NativeHost;
    use crate::interpreter::{Interpreter, Outcome};
    use crate::loader;

    fn run_code(code: &[u8]) -> Outcome {
        let mut buf = vec![0u8; 44];
        buf[0..4].copy_from_slice(&crate::consts::MAGIC);
        buf[4..8].copy_from_slice(&1u32.to_le_bytes());
        buf[20..24].copy_from_slice(&44u32.to_le_bytes());
        buf[24..28].copy_from_slice(&(code.len() as u32).to_le_bytes());
        buf.extend_from_slice(code);
        let image = loader::load(&buf).unwrap();
        Interpreter::new(image, NativeHost::new()).run().unwrap()
    }

    fn push(code: &mut Vec<u8>, v: i32) {
        code.push(0x10);
        code.extend_from_slice(&v.to_le_bytes());
    }

    #[test]
    fn integer_division_by_zero_faults() {
        let mut code = Vec::new();
        push(&mut code, 1);
        push(&mut code, 0);
        code.push(0x04); // IDIV
        code.push(0x34);
        let mut buf = vec![0u8; 44];
        buf[0..4].copy_from_slice(&crate::consts::MAGIC);
        buf[4..8].copy_from_slice(&1u32.to_le_bytes());
        buf[20..24].copy_from_slice(&44u32.to_le_bytes());
        buf[24..28].copy_from_slice(&(code.len() as u32).to_le_bytes());
        buf.extend_from_slice(&code);
        let image = loader::load(&buf).unwrap();
        let mut interp = Interpreter::new(image, NativeHost::new());
        assert!(interp.run().is_err());
    }

    #[test]
    fn iadd_wraps_on_overflow() {
        let mut code = Vec::new();
        push(&mut code, i32::MAX);
        push(&mut code, 1);
        code.push(0x01); // IADD
        code.push(0x34);
        assert_eq!(run_code(&code), Outcome::Halted(i32::MIN as u32));
    }
}
