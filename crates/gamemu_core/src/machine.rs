//! Peripherals and the machine that wires them to the CPU.
//!
//! Each peripheral is a bus [`Component`](crate::Component) and/or a
//! write listener called with the CPU's `write_listener` after every cycle.

mod bootrom;
mod cartridge;
mod gameboy;
mod timer;

pub use bootrom::BootRom;
pub use cartridge::Cartridge;
pub use gameboy::GameBoy;
pub use timer::Timer;
