use super::opcode::{self, Family, Instruction};
use super::Cpu;
use crate::alu::{self, AluOutput, FlagHalf, Flags};
use crate::bit::{self, RotDir};
use crate::{Bus, Result};

/// Where one flag's new value comes from after an ALU instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum FlagSrc {
    Clear,
    Set,
    /// The scratch [`AluOutput`].
    Alu,
    /// Unchanged from F.
    Cpu,
}

/// Per-flag sources, in Z N H C order.
#[derive(Clone, Copy, Debug)]
pub(super) struct FlagSources {
    pub z: FlagSrc,
    pub n: FlagSrc,
    pub h: FlagSrc,
    pub c: FlagSrc,
}

impl FlagSources {
    const fn new(z: FlagSrc, n: FlagSrc, h: FlagSrc, c: FlagSrc) -> Self {
        Self { z, n, h, c }
    }
}

use FlagSrc::{Alu, Clear, Cpu as Keep, Set};

const ADD_FLAGS: FlagSources = FlagSources::new(Alu, Clear, Alu, Alu);
const SUB_FLAGS: FlagSources = FlagSources::new(Alu, Set, Alu, Alu);
const INC_FLAGS: FlagSources = FlagSources::new(Alu, Clear, Alu, Keep);
const DEC_FLAGS: FlagSources = FlagSources::new(Alu, Set, Alu, Keep);
const AND_FLAGS: FlagSources = FlagSources::new(Alu, Clear, Set, Clear);
const OR_FLAGS: FlagSources = FlagSources::new(Alu, Clear, Clear, Clear);
const CPL_FLAGS: FlagSources = FlagSources::new(Keep, Set, Set, Keep);
const ADD_HL_FLAGS: FlagSources = FlagSources::new(Keep, Clear, Alu, Alu);
const SP_OFFSET_FLAGS: FlagSources = FlagSources::new(Clear, Clear, Alu, Alu);
const ROTATE_A_FLAGS: FlagSources = FlagSources::new(Clear, Clear, Clear, Alu);
const SHIFT_FLAGS: FlagSources = FlagSources::new(Alu, Clear, Clear, Alu);
const BIT_FLAGS: FlagSources = FlagSources::new(Alu, Clear, Set, Keep);
const DAA_FLAGS: FlagSources = FlagSources::new(Alu, Keep, Clear, Alu);
const SCF_FLAGS: FlagSources = FlagSources::new(Keep, Clear, Clear, Set);
const CCF_FLAGS: FlagSources = FlagSources::new(Keep, Clear, Clear, Alu);

impl Cpu {
    /// Rebuild F from `sources`, reading `Alu` flags from the scratch output.
    pub(super) fn combine_alu_flags(&mut self, sources: FlagSources) {
        let from_alu = self.alu.flags;
        let current = self.regs.flags();
        let pick = |src: FlagSrc, flag: Flags| match src {
            FlagSrc::Clear => false,
            FlagSrc::Set => true,
            FlagSrc::Alu => from_alu.contains(flag),
            FlagSrc::Cpu => current.contains(flag),
        };

        let mut flags = Flags::empty();
        flags.set(Flags::Z, pick(sources.z, Flags::Z));
        flags.set(Flags::N, pick(sources.n, Flags::N));
        flags.set(Flags::H, pick(sources.h, Flags::H));
        flags.set(Flags::C, pick(sources.c, Flags::C));
        self.regs.set_flags(flags);
    }

    /// Store the scratch result in A and update F.
    fn commit_a(&mut self, sources: FlagSources) {
        self.regs.a = self.alu.value8();
        self.combine_alu_flags(sources);
    }

    /// Store the scratch result in the r8/(HL) operand and update F.
    fn commit_r8(&mut self, bus: &mut Bus, code: u8, sources: FlagSources) -> Result<()> {
        let value = self.alu.value8();
        self.write_reg8(bus, code, value)?;
        self.combine_alu_flags(sources);
        Ok(())
    }

    /// 8-bit source operand: r8, `(HL)` (code 6) or the immediate byte.
    fn alu_operand(&self, bus: &Bus, instr: &Instruction) -> u8 {
        use Family::*;
        match instr.family {
            AddAImm8 | SubAImm8 | AndAImm8 | OrAImm8 | XorAImm8 | CpAImm8 => {
                self.read_data_after_opcode(bus)
            }
            _ => self.read_reg8(bus, opcode::extract_reg(instr.op(), 0)),
        }
    }

    #[inline]
    fn carry(&self) -> bool {
        self.regs.flags().contains(Flags::C)
    }

    pub(super) fn dispatch_alu(&mut self, bus: &mut Bus, instr: &Instruction) -> Result<()> {
        use Family::*;

        let op = instr.op();
        match instr.family {
            AddAR8 | AddAMemHl | AddAImm8 => {
                let value = self.alu_operand(bus, instr);
                let carry_in = opcode::extract_carry(op) && self.carry();
                self.alu = alu::add8(self.regs.a, value, carry_in);
                self.commit_a(ADD_FLAGS);
            }
            SubAR8 | SubAMemHl | SubAImm8 => {
                let value = self.alu_operand(bus, instr);
                let borrow_in = opcode::extract_carry(op) && self.carry();
                self.alu = alu::sub8(self.regs.a, value, borrow_in);
                self.commit_a(SUB_FLAGS);
            }
            AndAR8 | AndAMemHl | AndAImm8 => {
                let value = self.alu_operand(bus, instr);
                self.alu = AluOutput::from_value((self.regs.a & value) as u16);
                self.commit_a(AND_FLAGS);
            }
            OrAR8 | OrAMemHl | OrAImm8 => {
                let value = self.alu_operand(bus, instr);
                self.alu = AluOutput::from_value((self.regs.a | value) as u16);
                self.commit_a(OR_FLAGS);
            }
            XorAR8 | XorAMemHl | XorAImm8 => {
                let value = self.alu_operand(bus, instr);
                self.alu = AluOutput::from_value((self.regs.a ^ value) as u16);
                self.commit_a(OR_FLAGS);
            }
            CpAR8 | CpAMemHl | CpAImm8 => {
                let value = self.alu_operand(bus, instr);
                self.alu = alu::sub8(self.regs.a, value, false);
                self.combine_alu_flags(SUB_FLAGS);
            }

            IncR8 | IncMemHl | DecR8 | DecMemHl => {
                let code = opcode::extract_reg(op, 3);
                let value = self.read_reg8(bus, code);
                if matches!(instr.family, IncR8 | IncMemHl) {
                    self.alu = alu::add8(value, 1, false);
                    self.commit_r8(bus, code, INC_FLAGS)?;
                } else {
                    self.alu = alu::sub8(value, 1, false);
                    self.commit_r8(bus, code, DEC_FLAGS)?;
                }
            }

            IncR16 | DecR16 => {
                let code = opcode::extract_reg_pair(op);
                let value = self.regs.pair_sp(code);
                let value = if instr.family == IncR16 {
                    value.wrapping_add(1)
                } else {
                    value.wrapping_sub(1)
                };
                self.regs.set_pair_sp(code, value);
            }
            AddHlR16 => {
                let rhs = self.regs.pair_sp(opcode::extract_reg_pair(op));
                self.alu = alu::add16(self.regs.hl(), rhs, FlagHalf::High);
                self.regs.set_hl(self.alu.value);
                self.combine_alu_flags(ADD_HL_FLAGS);
            }
            SpPlusOffset => {
                let offset = self.read_data_after_opcode(bus) as i8 as i16 as u16;
                self.alu = alu::add16(self.regs.sp, offset, FlagHalf::Low);
                // 0xE8 writes SP, 0xF8 writes HL.
                if op & 0x10 == 0 {
                    self.regs.sp = self.alu.value;
                } else {
                    self.regs.set_hl(self.alu.value);
                }
                self.combine_alu_flags(SP_OFFSET_FLAGS);
            }

            Cpl => {
                self.regs.a = !self.regs.a;
                self.combine_alu_flags(CPL_FLAGS);
            }
            Daa => {
                self.alu = self.decimal_adjust();
                self.commit_a(DAA_FLAGS);
            }
            ScfCcf => {
                if opcode::extract_carry(op) {
                    self.alu.flags.set(Flags::C, !self.carry());
                    self.combine_alu_flags(CCF_FLAGS);
                } else {
                    self.combine_alu_flags(SCF_FLAGS);
                }
            }
            RotateA => {
                self.alu = alu::rotate(self.regs.a, RotDir::from_opcode(op));
                self.commit_a(ROTATE_A_FLAGS);
            }
            RotateCarryA => {
                let flags = self.regs.flags();
                self.alu = alu::rotate_with_carry(self.regs.a, RotDir::from_opcode(op), flags);
                self.commit_a(ROTATE_A_FLAGS);
            }

            RotateR8 | RotateMemHl | RotateCarryR8 | RotateCarryMemHl | SlaR8 | SlaMemHl
            | SraR8 | SraMemHl | SrlR8 | SrlMemHl | SwapR8 | SwapMemHl => {
                let code = opcode::extract_reg(op, 0);
                let value = self.read_reg8(bus, code);
                self.alu = match instr.family {
                    RotateR8 | RotateMemHl => alu::rotate(value, RotDir::from_opcode(op)),
                    RotateCarryR8 | RotateCarryMemHl => {
                        alu::rotate_with_carry(value, RotDir::from_opcode(op), self.regs.flags())
                    }
                    SlaR8 | SlaMemHl => alu::shift(value, RotDir::Left),
                    SraR8 | SraMemHl => alu::shift_right_arithmetic(value),
                    SrlR8 | SrlMemHl => alu::shift(value, RotDir::Right),
                    _ => AluOutput::from_value(
                        bit::merge4(bit::msb4(value), bit::lsb4(value)) as u16,
                    ),
                };
                // SWAP never carries, so C from the scratch output is clear.
                self.commit_r8(bus, code, SHIFT_FLAGS)?;
            }
            BitR8 | BitMemHl => {
                let value = self.read_reg8(bus, opcode::extract_reg(op, 0));
                let set = bit::bit_get(value, opcode::extract_n3(op) as u32);
                self.alu.flags.set(Flags::Z, !set);
                self.combine_alu_flags(BIT_FLAGS);
            }
            SetResR8 | SetResMemHl => {
                let code = opcode::extract_reg(op, 0);
                let mut value = self.read_reg8(bus, code);
                let index = opcode::extract_n3(op) as u32;
                if opcode::extract_sr_bit(op) {
                    bit::bit_set(&mut value, index);
                } else {
                    bit::bit_unset(&mut value, index);
                }
                self.write_reg8(bus, code, value)?;
            }

            other => {
                return Err(crate::Error::BadParameter(format!(
                    "{other:?} is not an ALU instruction"
                )));
            }
        }
        Ok(())
    }

    /// BCD correction of A after an addition or subtraction.
    fn decimal_adjust(&self) -> AluOutput {
        let flags = self.regs.flags();
        let mut a = self.regs.a;
        let mut adjust: u8 = if flags.contains(Flags::C) { 0x60 } else { 0x00 };
        if flags.contains(Flags::H) {
            adjust |= 0x06;
        }

        if !flags.contains(Flags::N) {
            if a & 0x0F > 0x09 {
                adjust |= 0x06;
            }
            if a > 0x99 {
                adjust |= 0x60;
            }
            a = a.wrapping_add(adjust);
        } else {
            a = a.wrapping_sub(adjust);
        }

        let mut out = AluOutput::from_value(a as u16);
        out.flags.set(Flags::C, adjust >= 0x60);
        out
    }
}
