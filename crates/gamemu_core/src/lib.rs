pub mod alu;
pub mod bit;
pub mod bus;
pub mod component;
pub mod cpu;
mod error;
pub mod machine;
pub mod memory;

pub use bus::Bus;
pub use component::Component;
pub use cpu::{Cpu, Interrupt};
pub use error::{Error, Result};
pub use machine::{BootRom, Cartridge, GameBoy, Timer};
pub use memory::Memory;

/// 8-bit data word.
pub type Data = u8;
/// 16-bit bus address.
pub type Addr = u16;

/// Number of addressable cells on the bus (64 KiB).
pub const BUS_SIZE: usize = 0x10000;

/// Game Boy memory map.
///
/// Every region is an inclusive `[START, END]` window.
pub mod map {
    use crate::Addr;

    pub const BOOT_ROM_START: Addr = 0x0000;
    pub const BOOT_ROM_END: Addr = 0x00FF;

    pub const BANK_ROM0_START: Addr = 0x0000;
    pub const BANK_ROM0_END: Addr = 0x3FFF;
    pub const BANK_ROM1_START: Addr = 0x4000;
    pub const BANK_ROM1_END: Addr = 0x7FFF;

    pub const VIDEO_RAM_START: Addr = 0x8000;
    pub const VIDEO_RAM_END: Addr = 0x9FFF;

    pub const EXTERN_RAM_START: Addr = 0xA000;
    pub const EXTERN_RAM_END: Addr = 0xBFFF;

    pub const WORK_RAM_START: Addr = 0xC000;
    pub const WORK_RAM_END: Addr = 0xDFFF;

    /// Echo RAM mirrors the first 7.5 KiB of work RAM.
    pub const ECHO_RAM_START: Addr = 0xE000;
    pub const ECHO_RAM_END: Addr = 0xFDFF;

    pub const GRAPH_RAM_START: Addr = 0xFE00;
    pub const GRAPH_RAM_END: Addr = 0xFE9F;

    pub const USELESS_START: Addr = 0xFEA0;
    pub const USELESS_END: Addr = 0xFEFF;

    pub const REGISTERS_START: Addr = 0xFF00;
    pub const REGISTERS_END: Addr = 0xFF7F;

    pub const HIGH_RAM_START: Addr = 0xFF80;
    pub const HIGH_RAM_END: Addr = 0xFFFE;

    pub const REG_DIV: Addr = 0xFF04;
    pub const REG_TIMA: Addr = 0xFF05;
    pub const REG_TMA: Addr = 0xFF06;
    pub const REG_TAC: Addr = 0xFF07;
    pub const REG_IF: Addr = 0xFF0F;
    pub const REG_BOOT_ROM_DISABLE: Addr = 0xFF50;
    pub const REG_IE: Addr = 0xFFFF;

    /// Size in bytes of the inclusive window `[start, end]`.
    pub const fn size(start: Addr, end: Addr) -> usize {
        (end - start) as usize + 1
    }
}
