use bitflags::bitflags;

use super::Cpu;
use crate::{Bus, Result};

/// Interrupt sources. The discriminant is both the priority (lower first)
/// and the vector index.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Interrupt {
    VBlank = 0,
    LcdStat = 1,
    Timer = 2,
    Serial = 3,
    Joypad = 4,
}

impl Interrupt {
    pub const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Service routine address: `0x40 + 8 * index`.
    #[inline]
    pub fn vector(self) -> u16 {
        0x0040 + 8 * self.index() as u16
    }

    #[inline]
    pub fn mask(self) -> InterruptFlags {
        InterruptFlags::from_bits_truncate(1 << self.index())
    }
}

bitflags! {
    /// Bit layout shared by the IE (0xFFFF) and IF (0xFF0F) registers.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct InterruptFlags: u8 {
        const VBLANK = 0x01;
        const LCD_STAT = 0x02;
        const TIMER = 0x04;
        const SERIAL = 0x08;
        const JOYPAD = 0x10;
    }
}

impl InterruptFlags {
    /// Highest-priority (lowest-index) source in the set.
    pub fn highest_priority(self) -> Option<Interrupt> {
        Interrupt::ALL
            .into_iter()
            .find(|&irq| self.contains(irq.mask()))
    }
}

impl Cpu {
    /// Enter the service routine of the highest-priority pending interrupt.
    ///
    /// Returns whether an interrupt was taken. The caller still fetches and
    /// dispatches in the same cycle; the 5 cycles of entry cost go to
    /// idle time.
    pub(super) fn service_interrupt(&mut self, bus: &mut Bus) -> Result<bool> {
        let Some(irq) = self.pending_interrupts().highest_priority() else {
            return Ok(false);
        };

        let pc = self.regs.pc;
        self.sp_push(bus, pc)?;

        self.ime = false;
        let remaining = self.if_flags() - irq.mask();
        self.set_if(remaining);
        self.regs.pc = irq.vector();
        self.idle_time += 5;

        log::debug!(
            "cpu: interrupt {:?} pc=0x{pc:04X} -> 0x{:04X} sp=0x{:04X} IF={:02X}",
            irq,
            self.regs.pc,
            self.regs.sp,
            remaining.bits(),
        );
        Ok(true)
    }
}
