//! # analyser
//!
//! A single linear pass over a program that notes every jump, call and skip,
//! so the disassembler can put labels in. Every 2-byte aligned word is
//! decoded, reachable or not, so data that happens to look like a JP ends up
//! in the jump list. That is the price of not tracing control flow.
use crate::error::{Chip8Error, Result};
use crate::instruction::Instruction;
use crate::memory::CHIP8_MAX_PROGRAM_BYTES;

/// how many records each list holds unless told otherwise
pub const DEFAULT_ANALYSER_CAPACITY: usize = 64;

/// set on a jump target when it is BNNN, i.e. really NNN + V0
pub const INDEXED_JUMP_MARKER: u16 = 0x8000;

/// a control transfer from `origin` to `target`; both are offsets into the
/// analysed buffer, not memory addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub origin: u16,
    pub target: u16,
}

impl Transfer {
    /// a BNNN jump, whose real destination depends on V0 at run time
    pub fn is_indexed(&self) -> bool {
        self.target & INDEXED_JUMP_MARKER != 0
    }

    /// the address embedded in the instruction, without the marker
    pub fn address(&self) -> u16 {
        self.target & !INDEXED_JUMP_MARKER
    }
}

/// an append-only list that refuses to grow past its capacity
#[derive(Debug, Clone)]
pub struct BoundedList<T> {
    name: &'static str,
    items: Vec<T>,
    capacity: usize,
}

impl<T> BoundedList<T> {
    fn new(name: &'static str, capacity: usize) -> Self {
        BoundedList {
            name,
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, item: T) -> Result<()> {
        if self.items.len() == self.capacity {
            return Err(Chip8Error::AnalyserFull {
                list: self.name,
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(())
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Analysis {
    /// 1NNN and BNNN, the latter flagged with `INDEXED_JUMP_MARKER`
    pub jumps: BoundedList<Transfer>,
    /// 2NNN
    pub calls: BoundedList<Transfer>,
    /// origins of 3XNN, 4XNN, 5XY0, 9XY0 and EX9E/EXA1; the target is two
    /// or four bytes on
    pub skips: BoundedList<u16>,
}

impl Analysis {
    pub fn analyse(buffer: &[u8]) -> Result<Self> {
        Self::analyse_with_capacity(buffer, DEFAULT_ANALYSER_CAPACITY)
    }

    /// Anything longer than a loadable program is refused with
    /// `ProgramTooLarge`, which also keeps every offset inside a u16.
    pub fn analyse_with_capacity(buffer: &[u8], capacity: usize) -> Result<Self> {
        if buffer.len() > CHIP8_MAX_PROGRAM_BYTES {
            return Err(Chip8Error::ProgramTooLarge {
                size: buffer.len(),
                max: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        let mut analysis = Analysis {
            jumps: BoundedList::new("jump", capacity),
            calls: BoundedList::new("call", capacity),
            skips: BoundedList::new("skip", capacity),
        };
        for (offset, instr) in words(buffer) {
            // in range: the buffer is no longer than a program
            analysis.classify(offset as u16, instr)?;
        }
        Ok(analysis)
    }

    fn classify(&mut self, origin: u16, instr: Instruction) -> Result<()> {
        match instr.family() {
            0x1 => self.jumps.push(Transfer {
                origin,
                target: instr.nnn(),
            }),
            0xb => self.jumps.push(Transfer {
                origin,
                target: instr.nnn() | INDEXED_JUMP_MARKER,
            }),
            0x2 => self.calls.push(Transfer {
                origin,
                target: instr.nnn(),
            }),
            0x3 | 0x4 | 0x5 | 0x9 | 0xe => self.skips.push(origin),
            _ => Ok(()),
        }
    }

    /// is `addr` the destination of a statically known jump
    pub fn is_jump_target(&self, addr: u16) -> bool {
        self.jumps
            .iter()
            .any(|t| !t.is_indexed() && t.target == addr)
    }

    /// is `addr` the entry point of a subroutine
    pub fn is_call_target(&self, addr: u16) -> bool {
        self.calls.iter().any(|t| t.target == addr)
    }
}

/// every 2-byte aligned word in `buffer` with its offset. An odd trailing
/// byte is padded with zero.
pub fn words(buffer: &[u8]) -> impl Iterator<Item = (usize, Instruction)> + '_ {
    buffer.chunks(2).enumerate().map(|(i, pair)| {
        let lo = pair.get(1).copied().unwrap_or(0);
        (i * 2, Instruction::from_bytes(pair[0], lo))
    })
}
