use super::opcode::{self, Family, Group, Instruction};
use super::Cpu;
use crate::alu::{AluOutput, Flags};
use crate::{Addr, Bus, Error, Result};

impl Cpu {
    /// Whether the condition encoded in bits 3-4 of `op` holds.
    #[inline]
    fn is_condition(&self, op: u8) -> bool {
        let flags = self.regs.flags();
        match opcode::extract_cc(op) {
            0 => !flags.contains(Flags::Z), // NZ
            1 => flags.contains(Flags::Z),  // Z
            2 => !flags.contains(Flags::C), // NC
            _ => flags.contains(Flags::C),  // C
        }
    }

    /// Set PC so that the post-dispatch `PC += bytes` lands on `target`.
    #[inline]
    fn jump_to(&mut self, target: Addr, instr: &Instruction) {
        self.regs.pc = target.wrapping_sub(instr.bytes as Addr);
    }

    fn take_branch(&mut self, instr: &Instruction) {
        self.idle_time += instr.xtra_cycles as u32;
    }

    fn call(&mut self, bus: &mut Bus, target: Addr, instr: &Instruction) -> Result<()> {
        let ret = self.regs.pc.wrapping_add(instr.bytes as Addr);
        self.sp_push(bus, ret)?;
        self.jump_to(target, instr);
        Ok(())
    }

    fn ret(&mut self, bus: &Bus, instr: &Instruction) {
        let target = self.sp_pop(bus);
        self.jump_to(target, instr);
    }

    /// Execute `instr`, located at PC, then advance PC and charge its cycles.
    pub(super) fn dispatch(&mut self, bus: &mut Bus, instr: &Instruction) -> Result<()> {
        self.alu = AluOutput::default();
        let pc = self.regs.pc;
        log::trace!(
            "cpu: pc=0x{pc:04X} op=0x{:0width$X} {:?} af=0x{:04X} bc=0x{:04X} de=0x{:04X} hl=0x{:04X} sp=0x{:04X}",
            instr.opcode,
            instr.family,
            self.regs.af(),
            self.regs.bc(),
            self.regs.de(),
            self.regs.hl(),
            self.regs.sp,
            width = if instr.is_prefixed() { 4 } else { 2 },
        );

        match instr.family.group() {
            Group::Alu => self.dispatch_alu(bus, instr)?,
            Group::Storage => self.dispatch_storage(bus, instr)?,
            Group::Control => self.dispatch_control(bus, instr)?,
            Group::Invalid => {
                log::error!(
                    "cpu: unknown instruction 0x{:02X} at pc=0x{pc:04X}",
                    instr.opcode
                );
                return Err(Error::UnknownInstruction {
                    opcode: instr.opcode,
                    pc,
                });
            }
        }

        self.regs.pc = self.regs.pc.wrapping_add(instr.bytes as Addr);
        self.idle_time += (instr.cycles as u32).saturating_sub(1);
        Ok(())
    }

    fn dispatch_control(&mut self, bus: &mut Bus, instr: &Instruction) -> Result<()> {
        use Family::*;

        let op = instr.op();
        match instr.family {
            Jp => {
                let target = self.read_addr_after_opcode(bus);
                self.jump_to(target, instr);
            }
            JpCc => {
                if self.is_condition(op) {
                    let target = self.read_addr_after_opcode(bus);
                    self.jump_to(target, instr);
                    self.take_branch(instr);
                }
            }
            JpHl => {
                let target = self.regs.hl();
                self.jump_to(target, instr);
            }
            Jr => {
                let offset = self.read_data_after_opcode(bus) as i8;
                let target = self
                    .regs
                    .pc
                    .wrapping_add(instr.bytes as Addr)
                    .wrapping_add(offset as Addr);
                self.jump_to(target, instr);
            }
            JrCc => {
                if self.is_condition(op) {
                    let offset = self.read_data_after_opcode(bus) as i8;
                    let target = self
                        .regs
                        .pc
                        .wrapping_add(instr.bytes as Addr)
                        .wrapping_add(offset as Addr);
                    self.jump_to(target, instr);
                    self.take_branch(instr);
                }
            }
            Call => {
                let target = self.read_addr_after_opcode(bus);
                self.call(bus, target, instr)?;
            }
            CallCc => {
                if self.is_condition(op) {
                    let target = self.read_addr_after_opcode(bus);
                    self.call(bus, target, instr)?;
                    self.take_branch(instr);
                }
            }
            Ret => self.ret(bus, instr),
            RetCc => {
                if self.is_condition(op) {
                    self.ret(bus, instr);
                    self.take_branch(instr);
                }
            }
            Reti => {
                self.ime = true;
                self.ret(bus, instr);
            }
            Rst => {
                let target = (opcode::extract_n3(op) as Addr) << 3;
                self.call(bus, target, instr)?;
            }
            DiEi => self.ime = opcode::extract_ime(op),
            Halt => self.halted = true,
            // No LCD to stop; STOP only skips its padding byte.
            Stop | Nop => {}
            other => {
                return Err(Error::BadParameter(format!(
                    "{other:?} is not a control instruction"
                )));
            }
        }
        Ok(())
    }
}
