/// Divider and programmable timer (DIV, TIMA, TMA, TAC).
///
/// A 16-bit internal counter advances by 4 every machine cycle and DIV
/// exposes its upper byte. TIMA counts falling edges of
/// `TAC.enable && counter[bit selected by TAC[1:0]]`; when it overflows it
/// reloads from TMA and requests the TIMER interrupt.
///
/// The registers live in the machine's I/O component; the timer only keeps
/// the internal counter.
use crate::bit::{bit_get, bit_get16, msb8};
use crate::cpu::{Cpu, Interrupt};
use crate::{map, Addr, Bus, Result};

/// Internal counter increment per machine cycle.
const COUNTER_STEP: u16 = 4;

#[derive(Clone, Debug, Default)]
pub struct Timer {
    counter: u16,
    /// Edge-detector input as of the last evaluation.
    last_state: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn counter(&self) -> u16 {
        self.counter
    }

    /// Counter bit watched for the TAC frequency select:
    /// 00 -> bit 9, 01 -> bit 3, 10 -> bit 5, 11 -> bit 7.
    fn selected_bit(tac: u8) -> u32 {
        match tac & 0x03 {
            0b00 => 9,
            0b01 => 3,
            0b10 => 5,
            _ => 7,
        }
    }

    /// Current edge-detector input.
    fn state(&self, bus: &Bus) -> bool {
        let tac = bus.read(map::REG_TAC);
        bit_get(tac, 2) && bit_get16(self.counter, Self::selected_bit(tac))
    }

    /// Increment TIMA if the input fell from 1 to 0 since `old_state`.
    fn incr_if_state_change(
        &mut self,
        old_state: bool,
        cpu: &mut Cpu,
        bus: &mut Bus,
    ) -> Result<()> {
        let new_state = self.state(bus);
        if old_state && !new_state {
            let tima = match bus.read(map::REG_TIMA).checked_add(1) {
                Some(next) => next,
                None => {
                    cpu.request_interrupt(Interrupt::Timer);
                    bus.read(map::REG_TMA)
                }
            };
            bus.write(map::REG_TIMA, tima)?;
        }
        self.last_state = new_state;
        Ok(())
    }

    /// Advance by one machine cycle.
    pub fn cycle(&mut self, cpu: &mut Cpu, bus: &mut Bus) -> Result<()> {
        let old_state = self.state(bus);
        self.counter = self.counter.wrapping_add(COUNTER_STEP);
        bus.write(map::REG_DIV, msb8(self.counter))?;
        self.incr_if_state_change(old_state, cpu, bus)
    }

    /// React to a CPU write: any DIV write resets the counter, a TAC write
    /// may switch the edge-detector input off.
    pub fn bus_listener(
        &mut self,
        cpu: &mut Cpu,
        bus: &mut Bus,
        addr: Option<Addr>,
    ) -> Result<()> {
        match addr {
            Some(map::REG_DIV) => {
                let old_state = self.state(bus);
                self.counter = 0;
                bus.write(map::REG_DIV, 0)?;
                self.incr_if_state_change(old_state, cpu, bus)
            }
            Some(map::REG_TAC) => {
                let old_state = self.last_state;
                self.incr_if_state_change(old_state, cpu, bus)
            }
            _ => Ok(()),
        }
    }
}
