//! LC-3 memory subsystem.
//!
//! A flat space of 65536 sixteen-bit words. Addresses are `u16`, so every
//! address is valid and offset arithmetic wraps at the top of memory.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of addressable words.
pub const MEMORY_SIZE: usize = 1 << 16;

/// LC-3 memory: 65536 sixteen-bit cells, zero-initialized.
///
/// Serializes as a flat array of cells. Deserializing rejects any array
/// that is not exactly [`MEMORY_SIZE`] long, so every `u16` address stays
/// in bounds.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<u16>", try_from = "Vec<u16>")]
pub struct Memory {
    cells: Vec<u16>,
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read a cell.
    #[inline]
    pub fn read(&self, addr: u16) -> u16 {
        self.cells[addr as usize]
    }

    /// Write a cell.
    #[inline]
    pub fn write(&mut self, addr: u16, value: u16) {
        self.cells[addr as usize] = value;
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Copy `words` into memory starting at `origin`, wrapping past 0xFFFF.
    pub fn load(&mut self, origin: u16, words: &[u16]) {
        let mut addr = origin;
        for &word in words {
            self.write(addr, word);
            addr = addr.wrapping_add(1);
        }
    }

    /// Dump `count` cells starting at `start` (for debugging).
    pub fn dump(&self, start: u16, count: usize) -> Vec<(u16, u16)> {
        (0..count)
            .map(|i| {
                let addr = start.wrapping_add(i as u16);
                (addr, self.read(addr))
            })
            .collect()
    }
}

/// A cell array of the wrong size.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("memory has {0} cells, expected {}", MEMORY_SIZE)]
pub struct MemorySizeError(pub usize);

impl TryFrom<Vec<u16>> for Memory {
    type Error = MemorySizeError;

    fn try_from(cells: Vec<u16>) -> Result<Self, Self::Error> {
        if cells.len() != MEMORY_SIZE {
            return Err(MemorySizeError(cells.len()));
        }
        Ok(Self { cells })
    }
}

impl From<Memory> for Vec<u16> {
    fn from(mem: Memory) -> Self {
        mem.cells
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only show non-zero cells
        let non_zero = self.cells.iter().filter(|&&cell| cell != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::new();
        mem.write(0x3000, 0x1234);
        assert_eq!(mem.read(0x3000), 0x1234);
        assert_eq!(mem.read(0x3001), 0);
    }

    #[test]
    fn test_memory_extremes() {
        let mut mem = Memory::new();
        mem.write(0x0000, 1);
        mem.write(0xFFFF, 2);
        assert_eq!(mem.read(0x0000), 1);
        assert_eq!(mem.read(0xFFFF), 2);
    }

    #[test]
    fn test_load_wraps_at_top() {
        let mut mem = Memory::new();
        mem.load(0xFFFE, &[0xA, 0xB, 0xC, 0xD]);

        assert_eq!(mem.read(0xFFFE), 0xA);
        assert_eq!(mem.read(0xFFFF), 0xB);
        assert_eq!(mem.read(0x0000), 0xC);
        assert_eq!(mem.read(0x0001), 0xD);
    }

    #[test]
    fn test_dump_and_clear() {
        let mut mem = Memory::new();
        mem.load(0x3000, &[1, 2, 3]);
        assert_eq!(mem.dump(0x3000, 3), vec![(0x3000, 1), (0x3001, 2), (0x3002, 3)]);

        mem.clear();
        assert_eq!(mem, Memory::new());
    }

    #[test]
    fn test_snapshot_keeps_contents() {
        let mut mem = Memory::new();
        mem.write(0xFFFF, 0xBEEF);

        let json = serde_json::to_value(&mem).unwrap();
        let restored: Memory = serde_json::from_value(json).unwrap();

        assert_eq!(restored, mem);
    }

    #[test]
    fn test_snapshot_rejects_wrong_size() {
        let empty = serde_json::from_value::<Memory>(serde_json::json!([]));
        assert!(empty.is_err());

        let short = serde_json::to_value(vec![0u16; MEMORY_SIZE - 1]).unwrap();
        assert!(serde_json::from_value::<Memory>(short).is_err());

        assert_eq!(
            Memory::try_from(vec![0; 3]),
            Err(MemorySizeError(3)),
        );
    }
}
