//! Static instruction metadata for the direct and `0xCB`-prefixed tables.
//!
//! Cycle counts are in machine cycles (NOP = 1). `xtra_cycles` is charged on
//! top of `cycles` only when a conditional branch is taken.

use lazy_static::lazy_static;

/// First byte of every two-byte bit/rotate/shift instruction.
pub const PREFIX_CB: u8 = 0xCB;

/// How the dispatcher routes an instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Group {
    Alu,
    Storage,
    Control,
    Invalid,
}

/// Instruction family.
///
/// Operand registers, directions and condition codes are not part of the
/// family; they are decoded from the opcode bits at execution time.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Family {
    // 8-bit arithmetic/logic on A. ADD/SUB also cover ADC/SBC (opcode bit 3).
    AddAR8,
    AddAMemHl,
    AddAImm8,
    SubAR8,
    SubAMemHl,
    SubAImm8,
    AndAR8,
    AndAMemHl,
    AndAImm8,
    OrAR8,
    OrAMemHl,
    OrAImm8,
    XorAR8,
    XorAMemHl,
    XorAImm8,
    CpAR8,
    CpAMemHl,
    CpAImm8,
    IncR8,
    IncMemHl,
    DecR8,
    DecMemHl,
    // 16-bit arithmetic.
    IncR16,
    DecR16,
    AddHlR16,
    /// `ADD SP,e8` and `LD HL,SP+e8` (opcode bit 4 selects the target).
    SpPlusOffset,
    // Accumulator and flag misc.
    Cpl,
    Daa,
    /// `SCF` and `CCF` (opcode bit 3 selects complement).
    ScfCcf,
    /// `RLCA` / `RRCA`.
    RotateA,
    /// `RLA` / `RRA`.
    RotateCarryA,
    // 0xCB-prefixed.
    RotateR8,
    RotateMemHl,
    RotateCarryR8,
    RotateCarryMemHl,
    SlaR8,
    SlaMemHl,
    SraR8,
    SraMemHl,
    SrlR8,
    SrlMemHl,
    SwapR8,
    SwapMemHl,
    BitR8,
    BitMemHl,
    /// `SET n` / `RES n` (opcode bit 6 selects SET).
    SetResR8,
    SetResMemHl,

    // Loads and stack.
    LdAMemBc,
    LdAMemDe,
    /// `LD A,(HL+)` / `LD A,(HL-)`.
    LdAMemHlStep,
    LdAMem16,
    /// `LD A,(0xFF00+C)`.
    LdAHighC,
    /// `LD A,(0xFF00+n8)`.
    LdAHighImm8,
    LdMemBcA,
    LdMemDeA,
    LdMemHlStepA,
    LdMem16A,
    LdHighCA,
    LdHighImm8A,
    LdMemHlImm8,
    LdMemHlR8,
    LdMem16Sp,
    LdR16Imm16,
    LdR8MemHl,
    LdR8Imm8,
    LdR8R8,
    LdSpHl,
    Pop,
    Push,

    // Control flow and misc.
    Jp,
    JpCc,
    JpHl,
    Jr,
    JrCc,
    Call,
    CallCc,
    Ret,
    RetCc,
    Reti,
    Rst,
    /// `DI` / `EI` (opcode bit 3 is the new IME).
    DiEi,
    Halt,
    Stop,
    Nop,

    /// Opcode hole; executing it is an error.
    Invalid,
}

impl Family {
    pub fn group(self) -> Group {
        use Family::*;
        match self {
            AddAR8 | AddAMemHl | AddAImm8 | SubAR8 | SubAMemHl | SubAImm8 | AndAR8
            | AndAMemHl | AndAImm8 | OrAR8 | OrAMemHl | OrAImm8 | XorAR8 | XorAMemHl
            | XorAImm8 | CpAR8 | CpAMemHl | CpAImm8 | IncR8 | IncMemHl | DecR8 | DecMemHl
            | IncR16 | DecR16 | AddHlR16 | SpPlusOffset | Cpl | Daa | ScfCcf | RotateA
            | RotateCarryA | RotateR8 | RotateMemHl | RotateCarryR8 | RotateCarryMemHl
            | SlaR8 | SlaMemHl | SraR8 | SraMemHl | SrlR8 | SrlMemHl | SwapR8 | SwapMemHl
            | BitR8 | BitMemHl | SetResR8 | SetResMemHl => Group::Alu,

            LdAMemBc | LdAMemDe | LdAMemHlStep | LdAMem16 | LdAHighC | LdAHighImm8
            | LdMemBcA | LdMemDeA | LdMemHlStepA | LdMem16A | LdHighCA | LdHighImm8A
            | LdMemHlImm8 | LdMemHlR8 | LdMem16Sp | LdR16Imm16 | LdR8MemHl | LdR8Imm8
            | LdR8R8 | LdSpHl | Pop | Push => Group::Storage,

            Jp | JpCc | JpHl | Jr | JrCc | Call | CallCc | Ret | RetCc | Reti | Rst | DiEi
            | Halt | Stop | Nop => Group::Control,

            Invalid => Group::Invalid,
        }
    }
}

/// Immutable metadata for one opcode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Instruction {
    /// Opcode byte, or `0xCB00 | byte` for prefixed instructions.
    pub opcode: u16,
    pub family: Family,
    /// Total length including opcode and operands.
    pub bytes: u8,
    pub cycles: u8,
    pub xtra_cycles: u8,
}

impl Instruction {
    const fn new(opcode: u16, family: Family, bytes: u8, cycles: u8, xtra_cycles: u8) -> Self {
        Self {
            opcode,
            family,
            bytes,
            cycles,
            xtra_cycles,
        }
    }

    /// The byte that carries the operand fields (the second byte when prefixed).
    #[inline]
    pub fn op(&self) -> u8 {
        self.opcode as u8
    }

    #[inline]
    pub fn is_prefixed(&self) -> bool {
        self.opcode > 0xFF
    }
}

lazy_static! {
    /// Unprefixed opcodes.
    pub static ref INSTRUCTION_DIRECT: [Instruction; 256] =
        std::array::from_fn(|op| decode_direct(op as u8));
    /// Opcodes following [`PREFIX_CB`].
    pub static ref INSTRUCTION_PREFIXED: [Instruction; 256] =
        std::array::from_fn(|op| decode_prefixed(op as u8));
}

fn decode_direct(op: u8) -> Instruction {
    use Family::*;

    let (family, bytes, cycles, xtra) = match op {
        0x00 => (Nop, 1, 1, 0),
        0x10 => (Stop, 2, 1, 0),
        0x76 => (Halt, 1, 1, 0),

        0x01 | 0x11 | 0x21 | 0x31 => (LdR16Imm16, 3, 3, 0),
        0x02 => (LdMemBcA, 1, 2, 0),
        0x12 => (LdMemDeA, 1, 2, 0),
        0x22 | 0x32 => (LdMemHlStepA, 1, 2, 0),
        0x0A => (LdAMemBc, 1, 2, 0),
        0x1A => (LdAMemDe, 1, 2, 0),
        0x2A | 0x3A => (LdAMemHlStep, 1, 2, 0),
        0x08 => (LdMem16Sp, 3, 5, 0),
        0x36 => (LdMemHlImm8, 2, 3, 0),
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x3E => (LdR8Imm8, 2, 2, 0),

        0x03 | 0x13 | 0x23 | 0x33 => (IncR16, 1, 2, 0),
        0x0B | 0x1B | 0x2B | 0x3B => (DecR16, 1, 2, 0),
        0x09 | 0x19 | 0x29 | 0x39 => (AddHlR16, 1, 2, 0),
        0x34 => (IncMemHl, 1, 3, 0),
        0x35 => (DecMemHl, 1, 3, 0),
        0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x3C => (IncR8, 1, 1, 0),
        0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x3D => (DecR8, 1, 1, 0),

        0x07 | 0x0F => (RotateA, 1, 1, 0),
        0x17 | 0x1F => (RotateCarryA, 1, 1, 0),
        0x27 => (Daa, 1, 1, 0),
        0x2F => (Cpl, 1, 1, 0),
        0x37 | 0x3F => (ScfCcf, 1, 1, 0),

        0x18 => (Jr, 2, 3, 0),
        0x20 | 0x28 | 0x30 | 0x38 => (JrCc, 2, 2, 1),

        // LD (HL),r. 0x76 (HALT) is matched above.
        0x70..=0x77 => (LdMemHlR8, 1, 2, 0),
        0x40..=0x7F if op & 0x07 == 6 => (LdR8MemHl, 1, 2, 0),
        0x40..=0x7F => (LdR8R8, 1, 1, 0),

        0x80..=0xBF => {
            let mem = op & 0x07 == 6;
            let family = match (op >> 3) & 0x07 {
                0 | 1 => if mem { AddAMemHl } else { AddAR8 },
                2 | 3 => if mem { SubAMemHl } else { SubAR8 },
                4 => if mem { AndAMemHl } else { AndAR8 },
                5 => if mem { XorAMemHl } else { XorAR8 },
                6 => if mem { OrAMemHl } else { OrAR8 },
                _ => if mem { CpAMemHl } else { CpAR8 },
            };
            (family, 1, if mem { 2 } else { 1 }, 0)
        }
        0xC6 | 0xCE => (AddAImm8, 2, 2, 0),
        0xD6 | 0xDE => (SubAImm8, 2, 2, 0),
        0xE6 => (AndAImm8, 2, 2, 0),
        0xEE => (XorAImm8, 2, 2, 0),
        0xF6 => (OrAImm8, 2, 2, 0),
        0xFE => (CpAImm8, 2, 2, 0),

        0xC0 | 0xC8 | 0xD0 | 0xD8 => (RetCc, 1, 2, 3),
        0xC1 | 0xD1 | 0xE1 | 0xF1 => (Pop, 1, 3, 0),
        0xC2 | 0xCA | 0xD2 | 0xDA => (JpCc, 3, 3, 1),
        0xC3 => (Jp, 3, 4, 0),
        0xC4 | 0xCC | 0xD4 | 0xDC => (CallCc, 3, 3, 3),
        0xC5 | 0xD5 | 0xE5 | 0xF5 => (Push, 1, 4, 0),
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => (Rst, 1, 4, 0),
        0xC9 => (Ret, 1, 4, 0),
        0xCD => (Call, 3, 6, 0),
        0xD9 => (Reti, 1, 4, 0),
        0xE9 => (JpHl, 1, 1, 0),
        0xF3 | 0xFB => (DiEi, 1, 1, 0),

        0xE0 => (LdHighImm8A, 2, 3, 0),
        0xF0 => (LdAHighImm8, 2, 3, 0),
        0xE2 => (LdHighCA, 1, 2, 0),
        0xF2 => (LdAHighC, 1, 2, 0),
        0xEA => (LdMem16A, 3, 4, 0),
        0xFA => (LdAMem16, 3, 4, 0),
        0xE8 => (SpPlusOffset, 2, 4, 0),
        0xF8 => (SpPlusOffset, 2, 3, 0),
        0xF9 => (LdSpHl, 1, 2, 0),

        // 0xCB is consumed by the fetch stage; the rest are opcode holes.
        _ => (Invalid, 1, 1, 0),
    };

    Instruction::new(op as u16, family, bytes, cycles, xtra)
}

fn decode_prefixed(op: u8) -> Instruction {
    use Family::*;

    let mem = op & 0x07 == 6;
    let pick = |r8: Family, hl: Family| if mem { hl } else { r8 };
    let family = match op >> 3 {
        0 | 1 => pick(RotateR8, RotateMemHl),
        2 | 3 => pick(RotateCarryR8, RotateCarryMemHl),
        4 => pick(SlaR8, SlaMemHl),
        5 => pick(SraR8, SraMemHl),
        6 => pick(SwapR8, SwapMemHl),
        7 => pick(SrlR8, SrlMemHl),
        8..=15 => pick(BitR8, BitMemHl),
        _ => pick(SetResR8, SetResMemHl),
    };
    let cycles = match (mem, family) {
        (false, _) => 2,
        (true, BitMemHl) => 3,
        (true, _) => 4,
    };

    Instruction::new(0xCB00 | op as u16, family, 2, cycles, 0)
}

/// 3-bit register code at bit `shift` of `op`.
#[inline]
pub fn extract_reg(op: u8, shift: u8) -> u8 {
    (op >> shift) & 0x07
}

/// 2-bit register pair code (bits 4-5).
#[inline]
pub fn extract_reg_pair(op: u8) -> u8 {
    (op >> 4) & 0x03
}

/// 2-bit condition code (bits 3-4): NZ, Z, NC, C.
#[inline]
pub fn extract_cc(op: u8) -> u8 {
    (op >> 3) & 0x03
}

/// 3-bit bit index / RST target (bits 3-5).
#[inline]
pub fn extract_n3(op: u8) -> u8 {
    (op >> 3) & 0x07
}

/// ADC/SBC carry selector (bit 3).
#[inline]
pub fn extract_carry(op: u8) -> bool {
    op & 0x08 != 0
}

/// New IME value of DI/EI (bit 3).
#[inline]
pub fn extract_ime(op: u8) -> bool {
    op & 0x08 != 0
}

/// SET (true) or RES (false) (bit 6).
#[inline]
pub fn extract_sr_bit(op: u8) -> bool {
    op & 0x40 != 0
}

/// HL post-increment (+1) or post-decrement (-1) for `LD (HL±)` forms (bit 4).
#[inline]
pub fn extract_hl_increment(op: u8) -> u16 {
    if op & 0x10 == 0 {
        1
    } else {
        0xFFFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_indexed_by_opcode() {
        for op in 0..=u8::MAX {
            assert_eq!(INSTRUCTION_DIRECT[op as usize].opcode, op as u16);
            assert_eq!(INSTRUCTION_PREFIXED[op as usize].opcode, 0xCB00 | op as u16);
            assert_eq!(INSTRUCTION_PREFIXED[op as usize].bytes, 2);
            assert!(!INSTRUCTION_DIRECT[op as usize].is_prefixed());
            assert!(INSTRUCTION_PREFIXED[op as usize].is_prefixed());
        }
    }

    #[test]
    fn opcode_holes_are_invalid() {
        let holes = [
            0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD,
        ];
        for op in 0..=u8::MAX {
            let invalid = INSTRUCTION_DIRECT[op as usize].family == Family::Invalid;
            assert_eq!(invalid, holes.contains(&op) || op == PREFIX_CB, "opcode {op:#04x}");
        }
    }

    #[test]
    fn representative_entries() {
        let nop = INSTRUCTION_DIRECT[0x00];
        assert_eq!((nop.family, nop.bytes, nop.cycles), (Family::Nop, 1, 1));

        let halt = INSTRUCTION_DIRECT[0x76];
        assert_eq!(halt.family, Family::Halt);

        let ld_hl_a = INSTRUCTION_DIRECT[0x77];
        assert_eq!(ld_hl_a.family, Family::LdMemHlR8);

        let ld_a_hl = INSTRUCTION_DIRECT[0x7E];
        assert_eq!(ld_a_hl.family, Family::LdR8MemHl);

        let call_cc = INSTRUCTION_DIRECT[0xC4];
        assert_eq!(
            (call_cc.family, call_cc.bytes, call_cc.cycles, call_cc.xtra_cycles),
            (Family::CallCc, 3, 3, 3)
        );

        let adc_hl = INSTRUCTION_DIRECT[0x8E];
        assert_eq!((adc_hl.family, adc_hl.cycles), (Family::AddAMemHl, 2));

        let bit_hl = INSTRUCTION_PREFIXED[0x46];
        assert_eq!((bit_hl.family, bit_hl.cycles), (Family::BitMemHl, 3));

        let set_hl = INSTRUCTION_PREFIXED[0xFE];
        assert_eq!((set_hl.family, set_hl.cycles), (Family::SetResMemHl, 4));

        let swap_a = INSTRUCTION_PREFIXED[0x37];
        assert_eq!((swap_a.family, swap_a.cycles), (Family::SwapR8, 2));
    }

    #[test]
    fn field_extraction() {
        assert_eq!(extract_reg(0x78, 3), 7);
        assert_eq!(extract_reg(0x78, 0), 0);
        assert_eq!(extract_reg_pair(0xE5), 2);
        assert_eq!(extract_cc(0xD8), 3);
        assert_eq!(extract_n3(0xEF), 5);
        assert!(extract_carry(0x8E));
        assert!(extract_ime(0xFB));
        assert!(!extract_ime(0xF3));
        assert!(extract_sr_bit(0xC7));
        assert!(!extract_sr_bit(0x87));
        assert_eq!(extract_hl_increment(0x22), 1);
        assert_eq!(extract_hl_increment(0x3A), 0xFFFF);
    }
}
