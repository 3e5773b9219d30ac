use super::opcode::{self, Family, Instruction};
use super::Cpu;
use crate::{Addr, Bus, Error, Result};

/// Base of the `LDH` I/O page.
const HIGH_PAGE: Addr = 0xFF00;

#[inline]
fn high_addr(offset: u8) -> Addr {
    HIGH_PAGE + offset as Addr
}

impl Cpu {
    /// HL, then advance it by +1 or -1 as encoded in bit 4 of `op`.
    fn hl_post_step(&mut self, op: u8) -> Addr {
        let hl = self.regs.hl();
        self.regs
            .set_hl(hl.wrapping_add(opcode::extract_hl_increment(op)));
        hl
    }

    pub(super) fn dispatch_storage(&mut self, bus: &mut Bus, instr: &Instruction) -> Result<()> {
        use Family::*;

        let op = instr.op();
        match instr.family {
            LdAMemBc => self.regs.a = self.read_at(bus, self.regs.bc()),
            LdAMemDe => self.regs.a = self.read_at(bus, self.regs.de()),
            LdAMemHlStep => {
                let addr = self.hl_post_step(op);
                self.regs.a = self.read_at(bus, addr);
            }
            LdAMem16 => {
                let addr = self.read_addr_after_opcode(bus);
                self.regs.a = self.read_at(bus, addr);
            }
            LdAHighC => self.regs.a = self.read_at(bus, high_addr(self.regs.c)),
            LdAHighImm8 => {
                let addr = high_addr(self.read_data_after_opcode(bus));
                self.regs.a = self.read_at(bus, addr);
            }

            LdMemBcA => self.write_at(bus, self.regs.bc(), self.regs.a)?,
            LdMemDeA => self.write_at(bus, self.regs.de(), self.regs.a)?,
            LdMemHlStepA => {
                let addr = self.hl_post_step(op);
                self.write_at(bus, addr, self.regs.a)?;
            }
            LdMem16A => {
                let addr = self.read_addr_after_opcode(bus);
                self.write_at(bus, addr, self.regs.a)?;
            }
            LdHighCA => self.write_at(bus, high_addr(self.regs.c), self.regs.a)?,
            LdHighImm8A => {
                let addr = high_addr(self.read_data_after_opcode(bus));
                self.write_at(bus, addr, self.regs.a)?;
            }

            LdMemHlImm8 => {
                let value = self.read_data_after_opcode(bus);
                self.write_at_hl(bus, value)?;
            }
            LdMemHlR8 => {
                let value = self.regs.reg8(opcode::extract_reg(op, 0));
                self.write_at_hl(bus, value)?;
            }
            LdMem16Sp => {
                let addr = self.read_addr_after_opcode(bus);
                self.write16_at(bus, addr, self.regs.sp)?;
            }

            LdR16Imm16 => {
                let value = self.read_addr_after_opcode(bus);
                self.regs.set_pair_sp(opcode::extract_reg_pair(op), value);
            }
            LdR8MemHl => {
                let value = self.read_at_hl(bus);
                self.regs.set_reg8(opcode::extract_reg(op, 3), value);
            }
            LdR8Imm8 => {
                let value = self.read_data_after_opcode(bus);
                self.regs.set_reg8(opcode::extract_reg(op, 3), value);
            }
            LdR8R8 => {
                let value = self.regs.reg8(opcode::extract_reg(op, 0));
                self.regs.set_reg8(opcode::extract_reg(op, 3), value);
            }
            LdSpHl => self.regs.sp = self.regs.hl(),

            Push => {
                let value = self.regs.pair(opcode::extract_reg_pair(op));
                self.sp_push(bus, value)?;
            }
            Pop => {
                let value = self.sp_pop(bus);
                self.regs.set_pair(opcode::extract_reg_pair(op), value);
            }

            other => {
                return Err(Error::BadParameter(format!(
                    "{other:?} is not a storage instruction"
                )));
            }
        }
        Ok(())
    }
}
