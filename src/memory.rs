//! Flat byte memory block used for CPU work RAM and PPU nametable VRAM.

/// Fixed-size block of bytes addressed from 0. Callers fold mirrors before indexing.
#[derive(Clone)]
pub struct Ram {
    cells: Vec<u8>,
}

impl Ram {
    /// Create a zero-filled block of `len` bytes.
    pub fn new(len: usize) -> Self {
        Self {
            cells: vec![0; len],
        }
    }

    /// Panics if `addr` is outside the block; the bus folds mirrors before calling.
    pub fn read(&self, addr: u16) -> u8 {
        self.cells[addr as usize]
    }

    pub fn write(&mut self, addr: u16, data: u8) {
        self.cells[addr as usize] = data;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::Ram;

    #[test]
    fn read_back_written_bytes() {
        let mut ram = Ram::new(0x800);
        ram.write(0x0000, 0x12);
        ram.write(0x07FF, 0x34);
        assert_eq!(ram.read(0x0000), 0x12);
        assert_eq!(ram.read(0x07FF), 0x34);
        assert_eq!(ram.read(0x0400), 0x00);
        assert_eq!(ram.as_slice().len(), 0x800);
    }

    #[test]
    #[should_panic]
    fn out_of_block_access_panics() {
        let ram = Ram::new(0x800);
        ram.read(0x0800);
    }
}
