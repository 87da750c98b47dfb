use crate::error::{Chip8Error, Result};
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// the last usable address is 0xfff, so this is as big as a program gets
pub const CHIP8_MAX_PROGRAM_BYTES: usize = 0x0fff - CHIP8_PROGRAM_ADDR as usize;

/// where the hex digit glyphs live, and how big each one is
pub const CHIP8_FONT_ADDR: u16 = 0x050;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Represents the memory map. Addresses outside of RAM wrap around, so reads
/// and writes driven by opcodes can never fall off the end.
pub trait MemoryMap {
    /// get a r/o slice of the underlying memory
    fn bytes(&self) -> &[u8];

    /// get a r/w slice of the underlying memory
    fn bytes_mut(&mut self) -> &mut [u8];

    fn get_byte(&self, addr: u16) -> u8 {
        let bytes = self.bytes();
        bytes[addr as usize % bytes.len()]
    }

    fn set_byte(&mut self, addr: u16, value: u8) {
        let bytes = self.bytes_mut();
        let len = bytes.len();
        bytes[addr as usize % len] = value;
    }

    /// get a two-byte big-endian word (instructions)
    fn get_word(&self, addr: u16) -> u16 {
        ((self.get_byte(addr) as u16) << 8) | self.get_byte(addr.wrapping_add(1)) as u16
    }

    /// get a r/o slice of `len` bytes at `addr`, if it fits without wrapping
    fn get_ro_slice(&self, addr: u16, len: usize) -> Option<&[u8]> {
        let a = addr as usize;
        self.bytes().get(a..a.checked_add(len)?)
    }
}

/// Defines the CHIP-8 memory map
///   0x0000-0x004f  unused (zero)
///   0x0050-0x009f  hex digit font
///   0x00a0-0x01ff  unused (zero)
///   0x0200-0x0ffe  program
///
/// unlike the COSMAC VIP, the stack and display live outside of RAM
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8MemoryMap {
    /// initialises zeroed RAM with the font baked in
    pub fn new() -> Self {
        let mut bytes = vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice();
        let font = CHIP8_FONT_ADDR as usize;
        bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8MemoryMap { bytes }
    }

    /// load a CHIP-8 program at 0x200. An oversized program is rejected
    /// before anything is written.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > CHIP8_MAX_PROGRAM_BYTES {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        let start = CHIP8_PROGRAM_ADDR as usize;
        self.bytes[start..].fill(0);
        self.bytes[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }

    /// read unknown len of data and load it as a program
    pub fn load_from_reader(&mut self, reader: &mut impl io::Read) -> Result<usize> {
        let mut buf = Vec::new();
        let len = reader.read_to_end(&mut buf)?;
        self.load_program(&buf)?;
        Ok(len)
    }

    /// address of the glyph for hex digit `digit`. Nothing stops a program
    /// asking for digit 0x10 or above; it just gets whatever follows the font.
    pub fn font_addr(digit: u8) -> u16 {
        CHIP8_FONT_ADDR + (digit as u16) * CHIP8_FONT_GLYPH_BYTES
    }
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed apart from the font
        assert_eq!(m.bytes[..0x50], [0; 0x50]);
        assert_eq!(m.bytes[0xa0..], [0; 0xf60]);
    }

    #[test]
    fn test_font_baked_in() {
        let m = Chip8MemoryMap::new();
        assert_eq!(
            m.get_ro_slice(0x50, 5),
            Some(&[0xF0, 0x90, 0x90, 0x90, 0xF0][..])
        );
        assert_eq!(Chip8MemoryMap::font_addr(0xf), 0x9b);
        assert_eq!(m.get_ro_slice(0x9b, 5), Some(&CHIP8_FONT[75..]));
    }

    #[test]
    fn test_read_word() -> Result<()> {
        let mut m = Chip8MemoryMap::new();
        m.load_program(&[0, 1, 2, 3, 4, 5, 6, 7])?;
        assert_eq!(m.get_word(0x204), 0x0405);
        Ok(())
    }

    #[test]
    fn test_addresses_wrap() {
        let mut m = Chip8MemoryMap::new();
        m.set_byte(0x1000, 0xab);
        assert_eq!(m.get_byte(0), 0xab);
        m.set_byte(0x0fff, 0xcd);
        assert_eq!(m.get_word(0x0fff), 0xcdab);
    }

    #[test]
    fn test_ro_slice_past_end() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(4089, 8), None);
        assert_eq!(m.get_ro_slice(4088, 8).map(|s| s.len()), Some(8));
    }

    #[test]
    fn test_program_load_ok() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(dst.load_from_reader(&mut prog)?, 2);
        assert_eq!(dst.get_ro_slice(0x200, 2), Some(&[0x00, 0xe0][..]));
        Ok(())
    }

    #[test]
    fn test_program_load_largest() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_program(&[0xaa; CHIP8_MAX_PROGRAM_BYTES])?;
        assert_eq!(dst.get_byte(0x0ffe), 0xaa);
        assert_eq!(dst.get_byte(0x0fff), 0);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut dst = Chip8MemoryMap::new();
        let err = dst.load_program(&[0xaa; CHIP8_MAX_PROGRAM_BYTES + 1]);
        assert!(matches!(
            err,
            Err(Chip8Error::ProgramTooLarge { size: 3584, max: 3583 })
        ));
        // nothing was written
        assert_eq!(dst.get_byte(0x200), 0);
    }

    #[test]
    fn test_reload_clears_old_program() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_program(&[1, 2, 3, 4])?;
        dst.load_program(&[9])?;
        assert_eq!(dst.get_ro_slice(0x200, 4), Some(&[9, 0, 0, 0][..]));
        Ok(())
    }
}
