use crate::MEMORY_SIZE;
use crate::error::VmError;

/// Flat byte-addressed RAM. Every access is bounds checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: [u8; MEMORY_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        Self {
            cells: [0; MEMORY_SIZE],
        }
    }

    #[inline]
    pub fn read(&self, address: usize) -> Result<u8, VmError> {
        self.cells
            .get(address)
            .copied()
            .ok_or(VmError::MemoryOutOfBounds { address })
    }

    #[inline]
    pub fn write(&mut self, address: usize, value: u8) -> Result<(), VmError> {
        let cell = self
            .cells
            .get_mut(address)
            .ok_or(VmError::MemoryOutOfBounds { address })?;
        *cell = value;
        Ok(())
    }

    /// Copies `bytes` to `base..`. Nothing is written if the image does not fit.
    pub fn load(&mut self, base: usize, bytes: &[u8]) -> Result<(), VmError> {
        let end = base
            .checked_add(bytes.len())
            .filter(|end| *end <= MEMORY_SIZE)
            .ok_or(VmError::ProgramTooLarge {
                len: base.saturating_add(bytes.len()),
            })?;
        self.cells[base..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let mem = Memory::new();
        assert!(mem.as_slice().iter().all(|b| *b == 0));
        assert_eq!(mem.as_slice().len(), 256);
    }

    #[test]
    fn read_write_boundaries() {
        let mut mem = Memory::new();
        mem.write(0, 1).unwrap();
        mem.write(255, 2).unwrap();
        assert_eq!(mem.read(0).unwrap(), 1);
        assert_eq!(mem.read(255).unwrap(), 2);
    }

    #[test]
    fn out_of_range_access_faults() {
        let mut mem = Memory::new();
        assert!(matches!(
            mem.read(256),
            Err(VmError::MemoryOutOfBounds { address: 256 })
        ));
        assert!(matches!(
            mem.write(300, 1),
            Err(VmError::MemoryOutOfBounds { address: 300 })
        ));
    }

    #[test]
    fn load_places_image_at_base() {
        let mut mem = Memory::new();
        mem.load(0, &[1, 2, 3]).unwrap();
        assert_eq!(&mem.as_slice()[..4], &[1, 2, 3, 0]);
        mem.load(254, &[9, 9]).unwrap();
        assert_eq!(mem.read(255).unwrap(), 9);
    }

    #[test]
    fn oversized_image_is_rejected_untouched() {
        let mut mem = Memory::new();
        let image = vec![0xAA; 257];
        assert!(matches!(
            mem.load(0, &image),
            Err(VmError::ProgramTooLarge { len: 257 })
        ));
        assert!(matches!(
            mem.load(255, &[1, 2]),
            Err(VmError::ProgramTooLarge { len: 257 })
        ));
        assert_eq!(mem, Memory::new());
    }
}
