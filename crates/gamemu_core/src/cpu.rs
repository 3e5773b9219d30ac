//! LR35902 CPU core.
//!
//! One call to [`Cpu::cycle`] is one machine cycle. An instruction is fetched
//! and executed in full on its first cycle; the remaining cycles of its
//! duration are spent counting down `idle_time`.

use crate::alu::{AluOutput, Flags};
use crate::component::Component;
use crate::{map, Addr, Bus, Result};

mod alu;
mod exec;
mod helpers;
mod interrupts;
pub mod opcode;
mod regs;
mod storage;

pub use interrupts::{Interrupt, InterruptFlags};
pub use opcode::{Family, Instruction, INSTRUCTION_DIRECT, INSTRUCTION_PREFIXED};
pub use regs::Registers;

#[derive(Debug)]
pub struct Cpu {
    pub regs: Registers,
    /// Scratch result of the last ALU operation, reset before each dispatch.
    pub(crate) alu: AluOutput,
    /// Interrupt master enable.
    pub ime: bool,
    pub halted: bool,
    /// Cycles left before the next fetch.
    pub(crate) idle_time: u32,
    high_ram: Component,
    ie_reg: Component,
    if_reg: Component,
    /// Address of the last bus write made by this cycle, if any.
    write_listener: Option<Addr>,
}

impl Cpu {
    /// A CPU with every register cleared and its internal RAM allocated.
    pub fn new() -> Result<Self> {
        Ok(Self {
            regs: Registers::default(),
            alu: AluOutput::default(),
            ime: false,
            halted: false,
            idle_time: 0,
            high_ram: Component::new(map::size(map::HIGH_RAM_START, map::HIGH_RAM_END))?,
            ie_reg: Component::new(1)?,
            if_reg: Component::new(1)?,
            write_listener: None,
        })
    }

    /// Map high RAM and the IE/IF registers onto `bus`.
    pub fn plug(&mut self, bus: &mut Bus) -> Result<()> {
        bus.plug(&mut self.high_ram, map::HIGH_RAM_START, map::HIGH_RAM_END)?;
        bus.forced_plug(&mut self.ie_reg, map::REG_IE, map::REG_IE, 0)?;
        bus.forced_plug(&mut self.if_reg, map::REG_IF, map::REG_IF, 0)?;
        Ok(())
    }

    /// Remove high RAM, IE and IF from `bus`.
    ///
    /// IF was forced over whatever owned 0xFF0F before [`Cpu::plug`]; that
    /// cell is left unmapped, not handed back. Re-plug the CPU (or the I/O
    /// region) before running the bus again.
    pub fn unplug(&mut self, bus: &mut Bus) -> Result<()> {
        bus.unplug(&mut self.high_ram)?;
        bus.unplug(&mut self.ie_reg)?;
        bus.unplug(&mut self.if_reg)?;
        Ok(())
    }

    /// Register values the DMG boot ROM leaves behind when it hands over to
    /// the cartridge at 0x0100.
    pub fn apply_post_boot_state(&mut self) {
        self.regs.a = 0x01;
        self.regs.f = 0xB0;
        self.regs.b = 0x00;
        self.regs.c = 0x13;
        self.regs.d = 0x00;
        self.regs.e = 0xD8;
        self.regs.h = 0x01;
        self.regs.l = 0x4D;
        self.regs.sp = 0xFFFE;
        self.regs.pc = 0x0100;
    }

    /// Flag `irq` as pending in IF. Whether and when it is serviced depends
    /// on IE and IME.
    pub fn request_interrupt(&mut self, irq: Interrupt) {
        let flags = self.if_flags() | irq.mask();
        self.set_if(flags);
    }

    /// Run one machine cycle.
    pub fn cycle(&mut self, bus: &mut Bus) -> Result<()> {
        self.write_listener = None;

        if self.idle_time > 0 {
            self.idle_time -= 1;
            return Ok(());
        }

        if self.halted {
            if self.pending_interrupts().is_empty() {
                return Ok(());
            }
            self.halted = false;
        }

        self.do_cycle(bus)
    }

    fn do_cycle(&mut self, bus: &mut Bus) -> Result<()> {
        if self.ime {
            self.service_interrupt(bus)?;
        }

        let pc = self.regs.pc;
        let byte = bus.read(pc);
        let instruction = if byte == opcode::PREFIX_CB {
            INSTRUCTION_PREFIXED[bus.read(pc.wrapping_add(1)) as usize]
        } else {
            INSTRUCTION_DIRECT[byte as usize]
        };

        self.dispatch(bus, &instruction)
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        self.regs.flags()
    }

    pub fn ie(&self) -> InterruptFlags {
        InterruptFlags::from_bits_truncate(byte_of(&self.ie_reg))
    }

    pub fn set_ie(&mut self, flags: InterruptFlags) {
        set_byte_of(&self.ie_reg, flags.bits());
    }

    pub fn if_flags(&self) -> InterruptFlags {
        InterruptFlags::from_bits_truncate(byte_of(&self.if_reg))
    }

    pub fn set_if(&mut self, flags: InterruptFlags) {
        set_byte_of(&self.if_reg, flags.bits());
    }

    /// `IE & IF`.
    #[inline]
    pub fn pending_interrupts(&self) -> InterruptFlags {
        self.ie() & self.if_flags()
    }

    #[inline]
    pub fn idle_time(&self) -> u32 {
        self.idle_time
    }

    /// Address written during the last cycle, for peripheral bus listeners.
    #[inline]
    pub fn write_listener(&self) -> Option<Addr> {
        self.write_listener
    }

    pub fn high_ram(&self) -> &Component {
        &self.high_ram
    }
}

fn byte_of(c: &Component) -> u8 {
    c.peek(0).unwrap_or(0)
}

fn set_byte_of(c: &Component, value: u8) {
    if let Some(memory) = &c.memory {
        memory.borrow_mut().set(0, value);
    }
}
