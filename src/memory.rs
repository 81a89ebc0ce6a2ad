use crate::error::{Fault, LoadError};

/// Default amount of addressable memory, in bytes.
pub const MEMORY_SIZE: usize = 0x100;

/// Flat, byte-addressable memory. Every access is bounds-checked.
#[derive(Clone, Debug)]
pub struct Memory {
    cells: Box<[u8]>,
}

impl Memory {
    /// Zeroed memory of `size` bytes.
    pub fn new(size: usize) -> Self {
        Memory {
            cells: vec![0; size].into_boxed_slice(),
        }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn read(&self, address: usize) -> Result<u8, Fault> {
        self.cells
            .get(address)
            .copied()
            .ok_or(Fault::OutOfBounds { address })
    }

    pub fn write(&mut self, address: usize, value: u8) -> Result<(), Fault> {
        let cell = self
            .cells
            .get_mut(address)
            .ok_or(Fault::OutOfBounds { address })?;
        *cell = value;
        Ok(())
    }

    /// Read without faulting, for diagnostics.
    pub fn peek(&self, address: usize) -> Option<u8> {
        self.cells.get(address).copied()
    }

    /// Copy `bytes` to the start of memory. Nothing is written if they do not fit.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        if bytes.len() > self.size() {
            return Err(LoadError::TooLong {
                len: bytes.len(),
                capacity: self.size(),
            });
        }
        self.cells[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new(MEMORY_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let mut mem = Memory::default();
        for address in [0, 1, 0x7f, 0xff] {
            mem.write(address, address as u8 ^ 0xa5).unwrap();
            assert_eq!(mem.read(address).unwrap(), address as u8 ^ 0xa5);
        }
    }

    #[test]
    fn starts_zeroed() {
        let mem = Memory::default();
        assert_eq!(mem.size(), 256);
        assert!(mem.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn out_of_bounds() {
        let mut mem = Memory::new(16);
        assert!(matches!(
            mem.read(16),
            Err(Fault::OutOfBounds { address: 16 })
        ));
        assert!(matches!(
            mem.write(300, 1),
            Err(Fault::OutOfBounds { address: 300 })
        ));
        assert_eq!(mem.peek(16), None);
        assert_eq!(mem.peek(15), Some(0));
    }

    #[test]
    fn load_is_all_or_nothing() {
        let mut mem = Memory::new(4);
        assert!(matches!(
            mem.load(&[1, 2, 3, 4, 5]),
            Err(LoadError::TooLong { len: 5, capacity: 4 })
        ));
        assert_eq!(mem.as_slice(), &[0, 0, 0, 0]);

        mem.load(&[1, 2]).unwrap();
        assert_eq!(mem.as_slice(), &[1, 2, 0, 0]);
    }
}
