use thiserror::Error;

use crate::Addr;

/// Errors raised by the emulator core.
///
/// `UnknownInstruction` is fatal to the instruction stream; everything else
/// is local to the operation that failed and leaves the machine usable.
#[derive(Error, Debug)]
pub enum Error {
    #[error("bad parameter: {0}")]
    BadParameter(String),

    #[error("window 0x{start:04X}..=0x{end:04X} at offset 0x{offset:04X} exceeds backing memory of {size} bytes")]
    AddressRange {
        start: Addr,
        end: Addr,
        offset: Addr,
        size: usize,
    },

    #[error("address 0x{addr:04X} is already mapped")]
    AddressConflict { addr: Addr },

    /// A component or bus cell has no backing memory.
    #[error("invalid handle: {0}")]
    InvalidHandle(&'static str),

    #[error("address 0x{addr:04X} is not mapped")]
    Unmapped { addr: Addr },

    #[error("failed to allocate {size} bytes")]
    OutOfMemory { size: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unknown instruction 0x{opcode:02X} at PC=0x{pc:04X}")]
    UnknownInstruction { opcode: u16, pc: Addr },

    #[error("not implemented: {0}")]
    NotImplemented(String),
}

pub type Result<T> = std::result::Result<T, Error>;
