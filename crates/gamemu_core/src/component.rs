use std::rc::Rc;

use crate::memory::{Memory, SharedMemory};
use crate::{Addr, Error, Result};

/// A memory region that can be plugged into the bus.
///
/// `start == end == 0` means the component is not mapped. Components created
/// with a zero size own no memory; they can still share another component's
/// buffer through [`Component::share`].
#[derive(Clone, Debug, Default)]
pub struct Component {
    pub(crate) start: Addr,
    pub(crate) end: Addr,
    pub(crate) memory: Option<SharedMemory>,
}

impl Component {
    pub fn new(mem_size: usize) -> Result<Self> {
        let memory = if mem_size == 0 {
            None
        } else {
            Some(Memory::new(mem_size)?.into_shared())
        };
        Ok(Self {
            start: 0,
            end: 0,
            memory,
        })
    }

    /// New, unmapped component aliasing `other`'s memory.
    pub fn share(other: &Component) -> Result<Self> {
        let memory = other
            .memory
            .as_ref()
            .ok_or(Error::InvalidHandle("cannot share a component without memory"))?;
        Ok(Self {
            start: 0,
            end: 0,
            memory: Some(Rc::clone(memory)),
        })
    }

    /// Release this component's hold on its memory and unmap its window.
    ///
    /// A buffer shared with other components stays alive for them. Calling
    /// this twice is harmless.
    pub fn free(&mut self) {
        self.memory = None;
        self.clear_window();
    }

    #[inline]
    pub fn start(&self) -> Addr {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Addr {
        self.end
    }

    #[inline]
    pub fn is_mapped(&self) -> bool {
        !(self.start == 0 && self.end == 0)
    }

    /// Size of the backing memory, 0 when there is none.
    pub fn mem_size(&self) -> usize {
        self.memory.as_ref().map_or(0, |m| m.borrow().len())
    }

    pub fn has_memory(&self) -> bool {
        self.memory.is_some()
    }

    /// Whether both components are backed by the same buffer.
    pub fn shares_memory_with(&self, other: &Component) -> bool {
        match (&self.memory, &other.memory) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Direct (off-bus) read of the backing memory.
    pub fn peek(&self, offset: usize) -> Option<u8> {
        self.memory.as_ref().and_then(|m| m.borrow().get(offset))
    }

    /// Direct (off-bus) write into the backing memory.
    pub fn poke(&self, offset: usize, value: u8) -> Result<()> {
        let memory = self
            .memory
            .as_ref()
            .ok_or(Error::InvalidHandle("component has no memory"))?;
        if memory.borrow_mut().set(offset, value) {
            Ok(())
        } else {
            Err(Error::BadParameter(format!(
                "offset {offset} is past the end of component memory"
            )))
        }
    }

    /// Copy `data` into the start of the backing memory.
    pub fn load(&self, data: &[u8]) -> Result<()> {
        let memory = self
            .memory
            .as_ref()
            .ok_or(Error::InvalidHandle("component has no memory"))?;
        let mut memory = memory.borrow_mut();
        if data.len() > memory.len() {
            return Err(Error::BadParameter(format!(
                "{} bytes do not fit in {} bytes of component memory",
                data.len(),
                memory.len()
            )));
        }
        memory.as_mut_slice()[..data.len()].copy_from_slice(data);
        Ok(())
    }

    pub(crate) fn set_window(&mut self, start: Addr, end: Addr) {
        self.start = start;
        self.end = end;
    }

    pub(crate) fn clear_window(&mut self) {
        self.start = 0;
        self.end = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_component_has_no_memory() {
        let c = Component::new(0).unwrap();
        assert!(!c.has_memory());
        assert_eq!(c.mem_size(), 0);
        assert!(!c.is_mapped());
    }

    #[test]
    fn share_requires_memory() {
        let empty = Component::new(0).unwrap();
        assert!(matches!(
            Component::share(&empty),
            Err(Error::InvalidHandle(_))
        ));
    }

    #[test]
    fn shared_memory_outlives_the_original() {
        let mut a = Component::new(16).unwrap();
        let b = Component::share(&a).unwrap();
        assert!(a.shares_memory_with(&b));
        assert!(!b.is_mapped());

        a.poke(5, 0x42).unwrap();
        assert_eq!(b.peek(5), Some(0x42));

        a.free();
        a.free();
        assert!(!a.has_memory());
        assert_eq!(b.peek(5), Some(0x42));
        assert_eq!(b.mem_size(), 16);
    }

    #[test]
    fn load_rejects_oversized_data() {
        let c = Component::new(2).unwrap();
        assert!(c.load(&[1, 2, 3]).is_err());
        c.load(&[7, 8]).unwrap();
        assert_eq!(c.peek(1), Some(8));
    }
}
