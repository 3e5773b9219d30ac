use std::cell::RefCell;
use std::rc::Rc;

use crate::{Data, Error, Result};

/// Handle to a memory buffer that may back several components at once.
///
/// The buffer lives as long as the longest holder; dropping one handle never
/// invalidates the others.
pub type SharedMemory = Rc<RefCell<Memory>>;

/// Fixed-size, zero-initialised byte buffer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Memory {
    bytes: Vec<Data>,
}

impl Memory {
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::BadParameter("memory size must be non-zero".into()));
        }

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| Error::OutOfMemory { size })?;
        bytes.resize(size, 0);
        Ok(Self { bytes })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn get(&self, offset: usize) -> Option<Data> {
        self.bytes.get(offset).copied()
    }

    /// Store `value` at `offset`; returns `false` if the offset is out of bounds.
    #[inline]
    pub fn set(&mut self, offset: usize, value: Data) -> bool {
        match self.bytes.get_mut(offset) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn as_slice(&self) -> &[Data] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [Data] {
        &mut self.bytes
    }

    pub(crate) fn into_shared(self) -> SharedMemory {
        Rc::new(RefCell::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(Memory::new(0), Err(Error::BadParameter(_))));
    }

    #[test]
    fn starts_zeroed_and_is_bounds_checked() {
        let mut mem = Memory::new(4).unwrap();
        assert_eq!(mem.len(), 4);
        assert_eq!(mem.as_slice(), &[0, 0, 0, 0]);

        assert!(mem.set(3, 0xAA));
        assert_eq!(mem.get(3), Some(0xAA));
        assert!(!mem.set(4, 0x55));
        assert_eq!(mem.get(4), None);
    }
}
