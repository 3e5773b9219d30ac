//! Bit-level helpers on 8- and 16-bit words.
//!
//! Bit indices and rotation distances are clamped into `0..=7`: an index
//! past the top of the byte addresses bit 7 instead of failing.

/// Rotation / shift direction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RotDir {
    Left,
    Right,
}

impl RotDir {
    /// Direction encoded in bit 3 of rotate/shift opcodes (0 = left).
    #[inline]
    pub fn from_opcode(opcode: u8) -> Self {
        if opcode & 0x08 == 0 {
            RotDir::Left
        } else {
            RotDir::Right
        }
    }
}

#[inline]
fn clamp07(index: u32) -> u32 {
    index.min(7)
}

/// Low nibble.
#[inline]
pub fn lsb4(value: u8) -> u8 {
    value & 0x0F
}

/// High nibble, shifted down to bits 0..=3.
#[inline]
pub fn msb4(value: u8) -> u8 {
    value >> 4
}

/// Low byte of a 16-bit word.
#[inline]
pub fn lsb8(value: u16) -> u8 {
    value as u8
}

/// High byte of a 16-bit word.
#[inline]
pub fn msb8(value: u16) -> u8 {
    (value >> 8) as u8
}

/// Build a byte from two nibbles; only the low nibble of each is used.
#[inline]
pub fn merge4(lo: u8, hi: u8) -> u8 {
    lsb4(lo) | (lsb4(hi) << 4)
}

/// Build a 16-bit word from its low and high bytes.
#[inline]
pub fn merge8(lo: u8, hi: u8) -> u16 {
    u16::from_le_bytes([lo, hi])
}

#[inline]
pub fn bit_get(value: u8, index: u32) -> bool {
    value & (1 << clamp07(index)) != 0
}

#[inline]
pub fn bit_set(value: &mut u8, index: u32) {
    *value |= 1 << clamp07(index);
}

#[inline]
pub fn bit_unset(value: &mut u8, index: u32) {
    *value &= !(1 << clamp07(index));
}

/// Bit `index` of a 16-bit word (no clamping; `index` must be below 16).
#[inline]
pub fn bit_get16(value: u16, index: u32) -> bool {
    value & (1 << index) != 0
}

#[inline]
pub fn rotate_left(value: u8, n: u32) -> u8 {
    value.rotate_left(clamp07(n))
}

#[inline]
pub fn rotate_right(value: u8, n: u32) -> u8 {
    value.rotate_right(clamp07(n))
}

/// Circular rotation of `value` by `n` positions in `dir`.
#[inline]
pub fn bit_rotate(value: u8, dir: RotDir, n: u32) -> u8 {
    match dir {
        RotDir::Left => rotate_left(value, n),
        RotDir::Right => rotate_right(value, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nibbles_split_and_merge() {
        for v in 0..=u8::MAX {
            assert_eq!(merge4(lsb4(v), msb4(v)), v);
        }
        assert_eq!(lsb4(0xA5), 0x05);
        assert_eq!(msb4(0xA5), 0x0A);
        // Only the low nibble of each argument participates.
        assert_eq!(merge4(0xF3, 0xE7), 0x73);
    }

    #[test]
    fn bytes_split_and_merge() {
        for v in (0..=u16::MAX).step_by(7) {
            assert_eq!(merge8(lsb8(v), msb8(v)), v);
        }
        assert_eq!(merge8(0x34, 0x12), 0x1234);
    }

    #[test]
    fn single_bit_access() {
        let mut v = 0u8;
        bit_set(&mut v, 3);
        assert_eq!(v, 0x08);
        assert!(bit_get(v, 3));
        assert!(!bit_get(v, 2));
        bit_unset(&mut v, 3);
        assert_eq!(v, 0);
    }

    #[test]
    fn out_of_range_index_clamps_to_bit_seven() {
        let mut v = 0u8;
        bit_set(&mut v, 12);
        assert_eq!(v, 0x80);
        assert!(bit_get(v, 100));
        bit_unset(&mut v, 8);
        assert_eq!(v, 0);
    }

    #[test]
    fn rotate_is_invertible() {
        for x in 0..=u8::MAX {
            for n in 0..8 {
                assert_eq!(rotate_left(rotate_right(x, n), n), x);
            }
        }
        assert_eq!(bit_rotate(0x81, RotDir::Left, 1), 0x03);
        assert_eq!(bit_rotate(0x81, RotDir::Right, 1), 0xC0);
    }
}
