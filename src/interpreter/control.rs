//! Stack, locals and control-flow opcodes (spec.md §4.6 "Stack"/"Locals"/
//! "Control"), grounded on the teacher's `flow.rs` (`call`/`ret`) and
//! `memory.rs` (bounds-checked reads/writes), generalized from fixed
//! registers to the indexed locals region and two-cell frame convention
//! spec.md §4.5 defines.

use crate::error::Fault;
use crate::host::Host;

use super::{Interpreter, Outcome};

impl<H: Host> Interpreter<H> {
    pub(super) fn op_push(&mut self) -> Result<(), Fault> {
        let value = self.fetch_u32()?;
        self.frame.push(value)
    }

    pub(super) fn op_pop(&mut self) -> Result<(), Fault> {
        self.frame.pop()?;
        Ok(())
    }

    pub(super) fn op_dup(&mut self) -> Result<(), Fault> {
        self.frame.dup()
    }

    pub(super) fn op_load(&mut self) -> Result<(), Fault> {
        let idx = self.fetch_u32()? as usize;
        let value = self.frame.load_local(idx)?;
        self.frame.push(value)
    }

    pub(super) fn op_store(&mut self) -> Result<(), Fault> {
        let idx = self.fetch_u32()? as usize;
        let value = self.frame.pop()?;
        self.frame.store_local(idx, value)
    }

    pub(super) fn op_load_arg(&mut self) -> Result<(), Fault> {
        let k = self.fetch_u8()? as usize;
        let value = self.frame.load_arg(k)?;
        self.frame.push(value)
    }

    pub(super) fn op_jmp(&mut self) -> Result<(), Fault> {
        let target = self.fetch_u16()?;
        self.ip = target as u32;
        Ok(())
    }

    pub(super) fn op_jz(&mut self) -> Result<(), Fault> {
        let target = self.fetch_u16()?;
        if self.frame.pop()? == 0 {
            self.ip = target as u32;
        }
        Ok(())
    }

    pub(super) fn op_jnz(&mut self) -> Result<(), Fault> {
        let target = self.fetch_u16()?;
        if self.frame.pop()? != 0 {
            self.ip = target as u32;
        }
        Ok(())
    }

    pub(super) fn op_call(&mut self) -> Result<(), Fault> {
        let offset = self.fetch_u32()?;
        let arg_count = self.fetch_u8()?;
        let return_ip = self.ip;
        self.frame.enter_call(return_ip, arg_count)?;
        self.ip = offset;
        Ok(())
    }

    pub(super) fn op_ret(&mut self) -> Result<Option<Outcome>, Fault> {
        match self.frame.leave_call()? {
            Some((return_ip, _return_value)) => {
                self.ip = return_ip;
                Ok(None)
            }
            None => {
                let top = self.frame.peek()?;
                Ok(Some(Outcome::Halted(top)))
            }
        }
    }
}
