//! # instruction
//!
//! Every CHIP-8 instruction is a big-endian 16-bit word. The top nibble picks
//! the family; the remaining 12 bits are read in whichever shape that family
//! wants:
//!
//! ```text
//!   F X Y N
//!   | | | `-- n   (low nibble)
//!   | | `---- y   (third nibble)
//!   | `------ x   (second nibble)
//!   `-------- family
//!       `NN`  = low byte
//!      `NNN`  = low 12 bits (an address)
//! ```
//!
//! Decoding never fails: any word splits cleanly. Whether the split means
//! anything is the interpreter's problem.

/// a decoded view over one instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    word: u16,
}

impl Instruction {
    pub fn decode(word: u16) -> Self {
        Instruction { word }
    }

    /// decode from two bytes as they sit in memory
    pub fn from_bytes(hi: u8, lo: u8) -> Self {
        Self::decode(((hi as u16) << 8) | lo as u16)
    }

    pub fn word(&self) -> u16 {
        self.word
    }

    pub fn family(&self) -> u8 {
        (self.word >> 12) as u8
    }

    pub fn x(&self) -> usize {
        ((self.word >> 8) & 0xf) as usize
    }

    pub fn y(&self) -> usize {
        ((self.word >> 4) & 0xf) as usize
    }

    pub fn n(&self) -> u8 {
        (self.word & 0xf) as u8
    }

    pub fn nn(&self) -> u8 {
        (self.word & 0xff) as u8
    }

    pub fn nnn(&self) -> u16 {
        self.word & 0x0fff
    }

    /// rebuild the word from the family and address fields
    pub fn encode(&self) -> u16 {
        ((self.family() as u16) << 12) | self.nnn()
    }
}

impl From<u16> for Instruction {
    fn from(word: u16) -> Self {
        Instruction::decode(word)
    }
}
