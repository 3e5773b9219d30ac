use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::component::Component;
use crate::{map, Bus, Error, Result};

/// Size of a bank 0 + bank 1 ROM image.
pub const BANK_ROM_SIZE: usize = map::size(map::BANK_ROM0_START, map::BANK_ROM1_END);
/// Header byte holding the mapper type; only 0 (ROM only) is supported.
pub const CARTRIDGE_TYPE_ADDR: usize = 0x0147;

/// A ROM-only cartridge: 32 KiB mapped at 0x0000-0x7FFF.
#[derive(Debug)]
pub struct Cartridge {
    rom: Component,
}

impl Cartridge {
    /// Build a cartridge from a raw dump. Bytes past 32 KiB are ignored.
    pub fn from_bytes(dump: &[u8]) -> Result<Self> {
        if dump.len() < BANK_ROM_SIZE {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "cartridge dump is {} bytes, expected {BANK_ROM_SIZE}",
                    dump.len()
                ),
            )));
        }
        let image = &dump[..BANK_ROM_SIZE];
        let kind = image[CARTRIDGE_TYPE_ADDR];
        if kind != 0 {
            return Err(Error::NotImplemented(format!(
                "cartridge type 0x{kind:02X}"
            )));
        }

        let rom = Component::new(BANK_ROM_SIZE)?;
        rom.load(image)?;
        Ok(Self { rom })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut dump = Vec::with_capacity(BANK_ROM_SIZE);
        File::open(path.as_ref())?
            .take(BANK_ROM_SIZE as u64)
            .read_to_end(&mut dump)?;
        Self::from_bytes(&dump)
    }

    /// Map the ROM over 0x0000-0x7FFF, replacing whatever is there.
    pub fn plug(&mut self, bus: &mut Bus) -> Result<()> {
        bus.forced_plug(&mut self.rom, map::BANK_ROM0_START, map::BANK_ROM1_END, 0)
    }

    pub fn unplug(&mut self, bus: &mut Bus) -> Result<()> {
        bus.unplug(&mut self.rom)
    }

    pub fn component(&self) -> &Component {
        &self.rom
    }

    /// Title from the header (0x0134-0x0143), trailing NULs stripped.
    pub fn title(&self) -> String {
        (0x0134..=0x0143)
            .map_while(|offset| self.rom.peek(offset))
            .take_while(|&b| b != 0)
            .map(char::from)
            .collect()
    }
}
