use crate::alu::Flags;

/// Register file of the Game Boy CPU (LR35902).
///
/// A/F, B/C, D/E and H/L pair into 16-bit registers; SP and PC stand alone.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Registers {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    #[inline]
    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f & 0xF0])
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        // Lower 4 bits of F are always zero.
        self.f = f & 0xF0;
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        let [b, c] = value.to_be_bytes();
        self.b = b;
        self.c = c;
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        let [d, e] = value.to_be_bytes();
        self.d = d;
        self.e = e;
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.h = h;
        self.l = l;
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        Flags::from_bits_truncate(self.f)
    }

    #[inline]
    pub fn set_flags(&mut self, flags: Flags) {
        self.f = flags.bits();
    }

    /// 8-bit register by its 3-bit opcode encoding:
    /// 0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 7=A.
    ///
    /// Code 6 stands for `(HL)` and is resolved through the bus by the CPU;
    /// here it reads as 0.
    #[inline]
    pub fn reg8(&self, code: u8) -> u8 {
        match code & 0x07 {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            7 => self.a,
            _ => 0,
        }
    }

    /// Counterpart of [`Registers::reg8`]; code 6 is ignored.
    #[inline]
    pub fn set_reg8(&mut self, code: u8, value: u8) {
        match code & 0x07 {
            0 => self.b = value,
            1 => self.c = value,
            2 => self.d = value,
            3 => self.e = value,
            4 => self.h = value,
            5 => self.l = value,
            7 => self.a = value,
            _ => {}
        }
    }

    /// Register pair by its 2-bit encoding in PUSH/POP: BC, DE, HL, AF.
    #[inline]
    pub fn pair(&self, code: u8) -> u16 {
        match code & 0x03 {
            0 => self.bc(),
            1 => self.de(),
            2 => self.hl(),
            _ => self.af(),
        }
    }

    #[inline]
    pub fn set_pair(&mut self, code: u8, value: u16) {
        match code & 0x03 {
            0 => self.set_bc(value),
            1 => self.set_de(value),
            2 => self.set_hl(value),
            _ => self.set_af(value),
        }
    }

    /// Register pair by its 2-bit encoding in 16-bit loads and arithmetic:
    /// BC, DE, HL, SP.
    #[inline]
    pub fn pair_sp(&self, code: u8) -> u16 {
        match code & 0x03 {
            3 => self.sp,
            code => self.pair(code),
        }
    }

    #[inline]
    pub fn set_pair_sp(&mut self, code: u8, value: u16) {
        match code & 0x03 {
            3 => self.sp = value,
            code => self.set_pair(code, value),
        }
    }
}
