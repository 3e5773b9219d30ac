use crate::component::Component;
use crate::cpu::{Cpu, Interrupt};
use crate::{map, Addr, Bus, Result};

use super::{BootRom, Cartridge, Timer};

/// Plain RAM regions owned by the machine, in plug order.
const RAM_REGIONS: [(Addr, Addr); 6] = [
    (map::VIDEO_RAM_START, map::VIDEO_RAM_END),
    (map::EXTERN_RAM_START, map::EXTERN_RAM_END),
    (map::WORK_RAM_START, map::WORK_RAM_END),
    (map::GRAPH_RAM_START, map::GRAPH_RAM_END),
    (map::USELESS_START, map::USELESS_END),
    (map::REGISTERS_START, map::REGISTERS_END),
];
const WORK_RAM_INDEX: usize = 2;

/// A DMG with its bus, CPU and peripherals.
///
/// The machine is an owned value; there is no global emulator state.
pub struct GameBoy {
    bus: Bus,
    cpu: Cpu,
    timer: Timer,
    cartridge: Cartridge,
    boot_rom: Option<BootRom>,
    ram: Vec<Component>,
    echo_ram: Component,
    cycles: u64,
}

impl GameBoy {
    /// Build and wire the machine.
    ///
    /// With a boot ROM execution starts at 0x0000 inside it; without one the
    /// CPU starts at 0x0100 in the state the boot ROM would have left.
    pub fn new(mut cartridge: Cartridge, boot_rom: Option<BootRom>) -> Result<Self> {
        let mut bus = Bus::new();

        let mut ram = Vec::with_capacity(RAM_REGIONS.len());
        for (start, end) in RAM_REGIONS {
            let mut c = Component::new(map::size(start, end))?;
            bus.plug(&mut c, start, end)?;
            ram.push(c);
        }
        let mut echo_ram = Component::share(&ram[WORK_RAM_INDEX])?;
        bus.plug(&mut echo_ram, map::ECHO_RAM_START, map::ECHO_RAM_END)?;

        let mut cpu = Cpu::new()?;
        cpu.plug(&mut bus)?;

        cartridge.plug(&mut bus)?;
        let boot_rom = match boot_rom {
            Some(mut boot) => {
                boot.plug(&mut bus)?;
                Some(boot)
            }
            None => {
                cpu.apply_post_boot_state();
                None
            }
        };

        log::debug!(
            "machine: cartridge {:?}, boot ROM {}",
            cartridge.title(),
            if boot_rom.is_some() { "present" } else { "skipped" }
        );

        Ok(Self {
            bus,
            cpu,
            timer: Timer::new(),
            cartridge,
            boot_rom,
            ram,
            echo_ram,
            cycles: 0,
        })
    }

    /// Run one machine cycle: timer, CPU, then the write listeners.
    pub fn cycle(&mut self) -> Result<()> {
        self.timer.cycle(&mut self.cpu, &mut self.bus)?;
        self.cpu.cycle(&mut self.bus)?;

        let written = self.cpu.write_listener();
        self.timer
            .bus_listener(&mut self.cpu, &mut self.bus, written)?;
        if let Some(boot) = self.boot_rom.as_mut() {
            boot.bus_listener(&mut self.bus, &mut self.cartridge, written)?;
        }

        self.cycles += 1;
        Ok(())
    }

    /// Run cycles until the cycle counter reaches `cycle`.
    ///
    /// Stops at the first error; the counter then points at the failing
    /// cycle.
    pub fn run_until(&mut self, cycle: u64) -> Result<()> {
        while self.cycles < cycle {
            self.cycle()?;
        }
        Ok(())
    }

    pub fn request_interrupt(&mut self, irq: Interrupt) {
        self.cpu.request_interrupt(irq);
    }

    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    /// Whether the boot ROM still overlays the cartridge.
    pub fn boot_rom_active(&self) -> bool {
        self.boot_rom.as_ref().is_some_and(BootRom::is_active)
    }

    /// Work RAM and echo RAM share one buffer.
    pub fn echo_ram(&self) -> &Component {
        &self.echo_ram
    }

    pub fn work_ram(&self) -> &Component {
        &self.ram[WORK_RAM_INDEX]
    }
}
