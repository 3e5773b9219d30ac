//! Stateless arithmetic/logic primitives.
//!
//! Every operation returns an [`AluOutput`]: the computed value together
//! with the Z/N/H/C flags it produced. Nothing here touches CPU state; the
//! dispatcher decides which of these flags actually land in F.

use bitflags::bitflags;

use crate::bit::{self, bit_get, lsb4, lsb8, merge4, merge8, msb4, msb8, RotDir};

bitflags! {
    /// Flag bits in the F register.
    ///
    /// Layout (bit index in the byte, from MSB to LSB):
    /// - bit 7: Z (zero)
    /// - bit 6: N (subtract)
    /// - bit 5: H (half carry)
    /// - bit 4: C (carry)
    /// - bits 0–3 are always zero.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct Flags: u8 {
        const Z = 0x80;
        const N = 0x40;
        const H = 0x20;
        const C = 0x10;
    }
}

/// Which byte of a 16-bit addition reports H and C.
///
/// `ADD HL,rr` exposes the carries of the high byte while `ADD SP,e8` and
/// `LD HL,SP+e8` expose those of the low byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlagHalf {
    Low,
    High,
}

/// Result of one ALU operation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AluOutput {
    pub value: u16,
    pub flags: Flags,
}

impl AluOutput {
    /// Build an output, deriving Z from `value`.
    fn new(value: u16, half_carry: bool, carry: bool, subtraction: bool) -> Self {
        let mut flags = Flags::empty();
        flags.set(Flags::Z, value == 0);
        flags.set(Flags::N, subtraction);
        flags.set(Flags::H, half_carry);
        flags.set(Flags::C, carry);
        Self { value, flags }
    }

    /// Output of an operation that only reports Z (logic ops, SWAP, DAA).
    pub fn from_value(value: u16) -> Self {
        Self::new(value, false, false, false)
    }

    /// Low byte of the result.
    #[inline]
    pub fn value8(&self) -> u8 {
        lsb8(self.value)
    }
}

/// 8-bit addition with carry-in, computed nibble by nibble.
pub fn add8(x: u8, y: u8, carry_in: bool) -> AluOutput {
    let sum_lo = lsb4(x) + lsb4(y) + carry_in as u8;
    let c4 = msb4(sum_lo);
    let sum_hi = msb4(x) + msb4(y) + c4;
    let c8 = msb4(sum_hi);
    AluOutput::new(merge4(sum_lo, sum_hi) as u16, c4 != 0, c8 != 0, false)
}

/// 8-bit subtraction with borrow-in, computed nibble by nibble.
///
/// H reports a borrow out of bit 4 and C a borrow out of bit 8.
pub fn sub8(x: u8, y: u8, borrow_in: bool) -> AluOutput {
    let diff_lo = lsb4(x)
        .wrapping_sub(lsb4(y))
        .wrapping_sub(borrow_in as u8);
    let b4 = (diff_lo & 0x10) >> 4;
    let diff_hi = msb4(x).wrapping_sub(msb4(y)).wrapping_sub(b4);
    let b8 = diff_hi & 0x10 != 0;
    AluOutput::new(merge4(diff_lo, diff_hi) as u16, b4 != 0, b8, true)
}

/// 16-bit addition as two chained 8-bit additions.
///
/// H and C come from the byte selected by `half`.
pub fn add16(x: u16, y: u16, half: FlagHalf) -> AluOutput {
    let low = add8(lsb8(x), lsb8(y), false);
    let high = add8(msb8(x), msb8(y), low.flags.contains(Flags::C));
    let value = merge8(low.value8(), high.value8());
    let chosen = match half {
        FlagHalf::Low => low.flags,
        FlagHalf::High => high.flags,
    };
    AluOutput::new(
        value,
        chosen.contains(Flags::H),
        chosen.contains(Flags::C),
        false,
    )
}

/// Logical shift by one; the ejected bit becomes C.
pub fn shift(x: u8, dir: RotDir) -> AluOutput {
    let (value, carry) = match dir {
        RotDir::Left => (x << 1, bit_get(x, 7)),
        RotDir::Right => (x >> 1, bit_get(x, 0)),
    };
    AluOutput::new(value as u16, false, carry, false)
}

/// Arithmetic shift right: bit 7 is preserved, bit 0 becomes C.
pub fn shift_right_arithmetic(x: u8) -> AluOutput {
    let value = (x >> 1) | (x & 0x80);
    AluOutput::new(value as u16, false, bit_get(x, 0), false)
}

/// Circular rotation by one; the bit that wraps around becomes C.
pub fn rotate(x: u8, dir: RotDir) -> AluOutput {
    let carry = match dir {
        RotDir::Left => bit_get(x, 7),
        RotDir::Right => bit_get(x, 0),
    };
    AluOutput::new(bit::bit_rotate(x, dir, 1) as u16, false, carry, false)
}

/// 9-bit rotation through the carry flag of `flags`.
pub fn rotate_with_carry(x: u8, dir: RotDir, flags: Flags) -> AluOutput {
    let carry_in = flags.contains(Flags::C);
    let (value, carry_out) = match dir {
        RotDir::Left => ((x << 1) | carry_in as u8, bit_get(x, 7)),
        RotDir::Right => ((x >> 1) | ((carry_in as u8) << 7), bit_get(x, 0)),
    };
    AluOutput::new(value as u16, false, carry_out, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add8_matches_wide_arithmetic() {
        for x in 0..=u8::MAX {
            for y in 0..=u8::MAX {
                for c in [false, true] {
                    let out = add8(x, y, c);
                    let full = x as u16 + y as u16 + c as u16;
                    assert_eq!(out.value, full & 0xFF);
                    assert_eq!(out.flags.contains(Flags::Z), full & 0xFF == 0);
                    assert_eq!(out.flags.contains(Flags::C), full > 0xFF);
                    assert_eq!(
                        out.flags.contains(Flags::H),
                        (x & 0x0F) + (y & 0x0F) + c as u8 > 0x0F
                    );
                    assert!(!out.flags.contains(Flags::N));
                }
            }
        }
    }

    #[test]
    fn sub8_matches_wide_arithmetic() {
        for x in 0..=u8::MAX {
            for y in 0..=u8::MAX {
                for b in [false, true] {
                    let out = sub8(x, y, b);
                    let full = x as i16 - y as i16 - b as i16;
                    assert_eq!(out.value, (full as u8) as u16);
                    assert!(out.flags.contains(Flags::N));
                    assert_eq!(out.flags.contains(Flags::C), full < 0);
                    assert_eq!(
                        out.flags.contains(Flags::H),
                        ((x & 0x0F) as i16 - (y & 0x0F) as i16 - b as i16) < 0
                    );
                    assert_eq!(out.flags.contains(Flags::Z), full as u8 == 0);
                }
            }
        }
    }

    #[test]
    fn add16_selects_flag_half() {
        // Low byte carries (0xFF + 0x01), high byte does not overflow.
        let low = add16(0x00FF, 0x0001, FlagHalf::Low);
        assert_eq!(low.value, 0x0100);
        assert!(low.flags.contains(Flags::C));
        assert!(low.flags.contains(Flags::H));

        let high = add16(0x00FF, 0x0001, FlagHalf::High);
        assert_eq!(high.value, 0x0100);
        assert!(!high.flags.contains(Flags::C));
        assert!(!high.flags.contains(Flags::H));

        // Half-carry out of bit 11.
        let h11 = add16(0x0FFF, 0x0001, FlagHalf::High);
        assert_eq!(h11.value, 0x1000);
        assert!(h11.flags.contains(Flags::H));
        assert!(!h11.flags.contains(Flags::C));

        let wrap = add16(0xFFFF, 0x0001, FlagHalf::High);
        assert_eq!(wrap.value, 0x0000);
        assert!(wrap.flags.contains(Flags::C));
        assert!(wrap.flags.contains(Flags::Z));
    }

    #[test]
    fn shifts_eject_into_carry() {
        let l = shift(0x81, RotDir::Left);
        assert_eq!(l.value, 0x02);
        assert_eq!(l.flags, Flags::C);

        let r = shift(0x01, RotDir::Right);
        assert_eq!(r.value, 0x00);
        assert_eq!(r.flags, Flags::Z | Flags::C);

        let sra = shift_right_arithmetic(0x81);
        assert_eq!(sra.value, 0xC0);
        assert_eq!(sra.flags, Flags::C);
    }

    #[test]
    fn rotate_wraps_bit_into_carry() {
        let l = rotate(0x80, RotDir::Left);
        assert_eq!(l.value, 0x01);
        assert_eq!(l.flags, Flags::C);

        let r = rotate(0x02, RotDir::Right);
        assert_eq!(r.value, 0x01);
        assert_eq!(r.flags, Flags::empty());
    }

    #[test]
    fn rotate_through_carry_is_nine_bits_wide() {
        let l = rotate_with_carry(0x80, RotDir::Left, Flags::empty());
        assert_eq!(l.value, 0x00);
        assert_eq!(l.flags, Flags::Z | Flags::C);

        let l = rotate_with_carry(0x00, RotDir::Left, Flags::C);
        assert_eq!(l.value, 0x01);
        assert_eq!(l.flags, Flags::empty());

        let r = rotate_with_carry(0x01, RotDir::Right, Flags::C);
        assert_eq!(r.value, 0x80);
        assert_eq!(r.flags, Flags::C);
    }
}
