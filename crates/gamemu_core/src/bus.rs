use std::fmt;
use std::rc::Rc;

use crate::bit::{lsb8, merge8, msb8};
use crate::component::Component;
use crate::memory::SharedMemory;
use crate::{Addr, Data, Error, Result, BUS_SIZE};

/// Value seen when reading an address nothing is plugged into.
pub const OPEN_BUS: Data = 0xFF;

/// One routed bus address: a byte inside some component's memory.
#[derive(Clone)]
struct Cell {
    memory: SharedMemory,
    offset: usize,
}

/// The 16-bit address space.
///
/// Each of the 65536 addresses either routes to a byte of a component's
/// memory or is unmapped. Several addresses may route into the same buffer
/// (echo RAM), but plugging refuses to overlap a range that is already
/// routed somewhere; only [`Bus::forced_plug`] may supersede a mapping.
pub struct Bus {
    cells: Vec<Option<Cell>>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mapped = self.cells.iter().filter(|c| c.is_some()).count();
        f.debug_struct("Bus").field("mapped", &mapped).finish()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            cells: vec![None; BUS_SIZE],
        }
    }

    #[inline]
    pub fn is_mapped(&self, addr: Addr) -> bool {
        self.cells[addr as usize].is_some()
    }

    /// Route every address of `c`'s window to its memory, starting at `offset`.
    pub fn remap(&mut self, c: &Component, offset: Addr) -> Result<()> {
        let (start, end) = (c.start, c.end);
        if end < start {
            return Err(Error::BadParameter(format!(
                "window end 0x{end:04X} is below start 0x{start:04X}"
            )));
        }

        let span = (end - start) as usize;
        let size = c.mem_size();
        let memory = match &c.memory {
            Some(memory) if offset as usize + span < size => memory,
            _ => {
                return Err(Error::AddressRange {
                    start,
                    end,
                    offset,
                    size,
                })
            }
        };

        for i in 0..=span {
            self.cells[start as usize + i] = Some(Cell {
                memory: Rc::clone(memory),
                offset: offset as usize + i,
            });
        }
        Ok(())
    }

    /// Map `c` at `[start, end]` regardless of what is already there.
    ///
    /// On failure the component is left unmapped and the bus untouched.
    pub fn forced_plug(
        &mut self,
        c: &mut Component,
        start: Addr,
        end: Addr,
        offset: Addr,
    ) -> Result<()> {
        c.set_window(start, end);
        if let Err(err) = self.remap(c, offset) {
            c.clear_window();
            return Err(err);
        }
        log::debug!(
            "bus: plugged 0x{start:04X}..=0x{end:04X} (offset 0x{offset:04X}, {} bytes)",
            c.mem_size()
        );
        Ok(())
    }

    /// Map `c` at `[start, end]`, failing if any address there is taken.
    pub fn plug(&mut self, c: &mut Component, start: Addr, end: Addr) -> Result<()> {
        if end < start {
            return Err(Error::BadParameter(format!(
                "window end 0x{end:04X} is below start 0x{start:04X}"
            )));
        }
        if let Some(addr) = (start..=end).find(|&addr| self.is_mapped(addr)) {
            return Err(Error::AddressConflict { addr });
        }
        self.forced_plug(c, start, end, 0)
    }

    /// Clear `c`'s window from the bus. The component keeps its memory.
    pub fn unplug(&mut self, c: &mut Component) -> Result<()> {
        if c.is_mapped() {
            if c.end < c.start {
                return Err(Error::BadParameter(format!(
                    "window end 0x{:04X} is below start 0x{:04X}",
                    c.end, c.start
                )));
            }
            for addr in c.start..=c.end {
                self.cells[addr as usize] = None;
            }
            log::debug!("bus: unplugged 0x{:04X}..=0x{:04X}", c.start, c.end);
        }
        c.clear_window();
        Ok(())
    }

    /// Read one byte; unmapped addresses read as [`OPEN_BUS`].
    pub fn read(&self, addr: Addr) -> Data {
        match &self.cells[addr as usize] {
            Some(cell) => cell.memory.borrow().get(cell.offset).unwrap_or(OPEN_BUS),
            None => OPEN_BUS,
        }
    }

    pub fn write(&mut self, addr: Addr, data: Data) -> Result<()> {
        let cell = self.cells[addr as usize]
            .as_ref()
            .ok_or(Error::Unmapped { addr })?;
        if cell.memory.borrow_mut().set(cell.offset, data) {
            Ok(())
        } else {
            Err(Error::InvalidHandle("bus cell points past its memory"))
        }
    }

    /// Little-endian 16-bit read; the high byte of `0xFFFF` comes from `0x0000`.
    pub fn read16(&self, addr: Addr) -> u16 {
        merge8(self.read(addr), self.read(addr.wrapping_add(1)))
    }

    /// Little-endian 16-bit write; the high byte of `0xFFFF` goes to `0x0000`.
    ///
    /// Both addresses must be mapped; nothing is written otherwise.
    pub fn write16(&mut self, addr: Addr, data: u16) -> Result<()> {
        let next = addr.wrapping_add(1);
        for a in [addr, next] {
            if !self.is_mapped(a) {
                return Err(Error::Unmapped { addr: a });
            }
        }
        self.write(addr, lsb8(data))?;
        self.write(next, msb8(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{self, *};

    fn plugged(bus: &mut Bus, size: usize, start: Addr, end: Addr) -> Component {
        let mut c = Component::new(size).unwrap();
        bus.plug(&mut c, start, end).unwrap();
        c
    }

    #[test]
    fn unmapped_reads_open_bus_and_rejects_writes() {
        let mut bus = Bus::new();
        assert_eq!(bus.read(0x1234), 0xFF);
        assert!(matches!(
            bus.write(0x1234, 0),
            Err(Error::Unmapped { addr: 0x1234 })
        ));
    }

    #[test]
    fn plug_then_read_back() {
        let mut bus = Bus::new();
        let c = plugged(&mut bus, 0x10, 0x2000, 0x200F);
        assert_eq!((c.start(), c.end()), (0x2000, 0x200F));

        bus.write(0x2003, 0x99).unwrap();
        assert_eq!(bus.read(0x2003), 0x99);
        assert_eq!(c.peek(3), Some(0x99));
        assert_eq!(bus.read(0x2010), 0xFF);
    }

    #[test]
    fn plug_over_existing_mapping_conflicts() {
        let mut bus = Bus::new();
        let first = plugged(&mut bus, 0x100, 0x0000, 0x00FF);

        let mut second = Component::new(0x100).unwrap();
        assert!(matches!(
            bus.plug(&mut second, 0x0080, 0x017F),
            Err(Error::AddressConflict { addr: 0x0080 })
        ));
        assert!(!second.is_mapped());

        bus.forced_plug(&mut second, 0x0080, 0x017F, 0).unwrap();
        bus.write(0x0080, 0x5A).unwrap();
        assert_eq!(second.peek(0), Some(0x5A));
        assert_eq!(first.peek(0x80), Some(0));
    }

    #[test]
    fn echo_ram_mirrors_work_ram() {
        let mut bus = Bus::new();
        let work = plugged(
            &mut bus,
            map::size(WORK_RAM_START, WORK_RAM_END),
            WORK_RAM_START,
            WORK_RAM_END,
        );
        let mut echo = Component::share(&work).unwrap();
        bus.plug(&mut echo, ECHO_RAM_START, ECHO_RAM_END).unwrap();

        let delta = ECHO_RAM_START - WORK_RAM_START;
        bus.write(0xE123, 0x11).unwrap();
        assert_eq!(bus.read(0xE123 - delta), 0x11);
        bus.write(0xC456, 0x22).unwrap();
        assert_eq!(bus.read(0xC456 + delta), 0x22);
    }

    #[test]
    fn zero_size_component_cannot_be_plugged() {
        let mut bus = Bus::new();
        let mut empty = Component::new(0).unwrap();
        assert!(matches!(
            bus.plug(&mut empty, 0x1000, 0x1001),
            Err(Error::AddressRange { size: 0, .. })
        ));
        assert!(!empty.is_mapped());
        assert!(!bus.is_mapped(0x1000));
    }

    #[test]
    fn forced_plug_checks_capacity_against_offset() {
        let mut bus = Bus::new();
        let mut c = Component::new(0x10).unwrap();
        assert!(bus.forced_plug(&mut c, 0x100, 0x10F, 1).is_err());
        assert!(!c.is_mapped());
        assert!(!bus.is_mapped(0x100));

        bus.forced_plug(&mut c, 0x100, 0x107, 8).unwrap();
        bus.write(0x100, 0xAB).unwrap();
        assert_eq!(c.peek(8), Some(0xAB));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut bus = Bus::new();
        let mut c = Component::new(0x10).unwrap();
        assert!(matches!(
            bus.plug(&mut c, 0x20, 0x10),
            Err(Error::BadParameter(_))
        ));
    }

    #[test]
    fn unplug_clears_cells_but_keeps_memory() {
        let mut bus = Bus::new();
        let mut c = plugged(&mut bus, 4, 0x8000, 0x8003);
        bus.write(0x8001, 0x77).unwrap();

        bus.unplug(&mut c).unwrap();
        assert!(!c.is_mapped());
        assert_eq!(bus.read(0x8001), 0xFF);
        assert_eq!(c.peek(1), Some(0x77));

        // The range is free again.
        let _other = plugged(&mut bus, 4, 0x8000, 0x8003);
    }

    #[test]
    fn word_access_is_little_endian() {
        let mut bus = Bus::new();
        let _c = plugged(&mut bus, 4, 0x4000, 0x4003);
        bus.write16(0x4001, 0xBEEF).unwrap();
        assert_eq!(bus.read(0x4001), 0xEF);
        assert_eq!(bus.read(0x4002), 0xBE);
        assert_eq!(bus.read16(0x4001), 0xBEEF);
    }

    #[test]
    fn word_access_wraps_at_top_of_address_space() {
        let mut bus = Bus::new();
        let _top = plugged(&mut bus, 1, 0xFFFF, 0xFFFF);

        // Address 0 unmapped: nothing is written.
        assert!(matches!(
            bus.write16(0xFFFF, 0x1234),
            Err(Error::Unmapped { addr: 0x0000 })
        ));
        assert_eq!(bus.read(0xFFFF), 0);
        assert_eq!(bus.read16(0xFFFF), 0xFF00);

        let _bottom = plugged(&mut bus, 1, 0x0000, 0x0000);
        bus.write16(0xFFFF, 0x1234).unwrap();
        assert_eq!(bus.read(0xFFFF), 0x34);
        assert_eq!(bus.read(0x0000), 0x12);
        assert_eq!(bus.read16(0xFFFF), 0x1234);
    }
}
