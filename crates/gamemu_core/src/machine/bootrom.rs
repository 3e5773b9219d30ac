use crate::component::Component;
use crate::{map, Addr, Bus, Error, Result};

use super::Cartridge;

pub const BOOT_ROM_SIZE: usize = map::size(map::BOOT_ROM_START, map::BOOT_ROM_END);

/// The 256-byte boot program, overlaid on the cartridge until it writes
/// to 0xFF50.
#[derive(Debug)]
pub struct BootRom {
    rom: Component,
    /// Still mapped and waiting for the disable write.
    active: bool,
}

impl BootRom {
    pub fn new(content: &[u8]) -> Result<Self> {
        if content.len() != BOOT_ROM_SIZE {
            return Err(Error::BadParameter(format!(
                "boot ROM is {} bytes, expected {BOOT_ROM_SIZE}",
                content.len()
            )));
        }
        let rom = Component::new(BOOT_ROM_SIZE)?;
        rom.load(content)?;
        Ok(Self { rom, active: false })
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read(path)?;
        Self::new(&content)
    }

    /// Map over 0x0000-0x00FF, on top of the cartridge.
    pub fn plug(&mut self, bus: &mut Bus) -> Result<()> {
        bus.forced_plug(&mut self.rom, map::BOOT_ROM_START, map::BOOT_ROM_END, 0)?;
        self.active = true;
        Ok(())
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Hand the low ROM area back to the cartridge on a write to 0xFF50.
    pub fn bus_listener(
        &mut self,
        bus: &mut Bus,
        cartridge: &mut Cartridge,
        addr: Option<Addr>,
    ) -> Result<()> {
        if addr == Some(map::REG_BOOT_ROM_DISABLE) && self.active {
            bus.unplug(&mut self.rom)?;
            cartridge.plug(bus)?;
            self.active = false;
            log::info!("boot ROM disabled, cartridge mapped at 0x0000");
        }
        Ok(())
    }
}
