use super::Cpu;
use crate::{Addr, Bus, Data, Result};

impl Cpu {
    #[inline]
    pub(super) fn read_at(&self, bus: &Bus, addr: Addr) -> Data {
        bus.read(addr)
    }

    #[inline]
    pub(super) fn read16_at(&self, bus: &Bus, addr: Addr) -> u16 {
        bus.read16(addr)
    }

    /// Bus write that records `addr` for the peripheral listeners.
    #[inline]
    pub(super) fn write_at(&mut self, bus: &mut Bus, addr: Addr, data: Data) -> Result<()> {
        bus.write(addr, data)?;
        self.write_listener = Some(addr);
        Ok(())
    }

    #[inline]
    pub(super) fn write16_at(&mut self, bus: &mut Bus, addr: Addr, data: u16) -> Result<()> {
        bus.write16(addr, data)?;
        self.write_listener = Some(addr);
        Ok(())
    }

    /// Operand byte following the opcode at PC.
    #[inline]
    pub(super) fn read_data_after_opcode(&self, bus: &Bus) -> Data {
        bus.read(self.regs.pc.wrapping_add(1))
    }

    /// Little-endian operand word following the opcode at PC.
    #[inline]
    pub(super) fn read_addr_after_opcode(&self, bus: &Bus) -> Addr {
        bus.read16(self.regs.pc.wrapping_add(1))
    }

    #[inline]
    pub(super) fn read_at_hl(&self, bus: &Bus) -> Data {
        bus.read(self.regs.hl())
    }

    #[inline]
    pub(super) fn write_at_hl(&mut self, bus: &mut Bus, data: Data) -> Result<()> {
        let hl = self.regs.hl();
        self.write_at(bus, hl, data)
    }

    /// 8-bit register or `(HL)` by its 3-bit opcode encoding
    /// (0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 6=(HL), 7=A).
    #[inline]
    pub(super) fn read_reg8(&self, bus: &Bus, code: u8) -> Data {
        match code & 0x07 {
            6 => self.read_at_hl(bus),
            code => self.regs.reg8(code),
        }
    }

    #[inline]
    pub(super) fn write_reg8(&mut self, bus: &mut Bus, code: u8, data: Data) -> Result<()> {
        match code & 0x07 {
            6 => self.write_at_hl(bus, data),
            code => {
                self.regs.set_reg8(code, data);
                Ok(())
            }
        }
    }

    /// Store `value` at SP - 2, then SP -= 2. SP is untouched if the write
    /// fails.
    pub(super) fn sp_push(&mut self, bus: &mut Bus, value: u16) -> Result<()> {
        let sp = self.regs.sp.wrapping_sub(2);
        self.write16_at(bus, sp, value)?;
        self.regs.sp = sp;
        Ok(())
    }

    /// Load the word at SP, then SP += 2.
    pub(super) fn sp_pop(&mut self, bus: &Bus) -> u16 {
        let value = self.read16_at(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }
}
