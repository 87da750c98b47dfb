//! # machine
//!
//! The whole state of one CHIP-8: 4K of RAM, sixteen 8-bit registers (VF
//! doubling as the flag register), the I pointer, program counter, a 16-deep
//! call stack, two countdown timers, the screen and the hex keypad.
//!
//! Nothing in here runs by itself. The owner calls `step` to execute one
//! instruction and `tick` at whatever cadence it wants the timers to run at
//! (conventionally 60Hz); the two must never run concurrently.
use crate::error::Result;
use crate::frame::FrameBuffer;
use crate::memory::{Chip8MemoryMap, CHIP8_PROGRAM_ADDR};
use crate::stack::CallStack;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;

pub const CHIP8_REGISTER_COUNT: usize = 16;
pub const CHIP8_KEY_COUNT: usize = 16;

/// VF is overwritten by every opcode that produces a carry, borrow, shifted
/// out bit or sprite collision
pub const FLAG_REGISTER: usize = 0xf;

pub struct Machine {
    pub memory: Chip8MemoryMap,
    pub registers: [u8; CHIP8_REGISTER_COUNT],
    pub index: u16,
    pub program_counter: u16,
    pub call_stack: CallStack,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub frame_buffer: FrameBuffer,
    /// written by the input side, read by the keypad opcodes
    pub keys: [bool; CHIP8_KEY_COUNT],
    pub(crate) rng: StdRng,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// a machine whose CXNN results are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Machine {
            memory: Chip8MemoryMap::new(),
            registers: [0; CHIP8_REGISTER_COUNT],
            index: 0,
            program_counter: CHIP8_PROGRAM_ADDR,
            call_stack: CallStack::new(),
            delay_timer: 0,
            sound_timer: 0,
            frame_buffer: FrameBuffer::new(),
            keys: [false; CHIP8_KEY_COUNT],
            rng,
        }
    }

    /// load a chip8 program at 0x200
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        self.memory.load_program(program)
    }

    /// load a chip8 program from a file or similar, returning its length
    pub fn load_from_reader(&mut self, reader: &mut impl io::Read) -> Result<usize> {
        self.memory.load_from_reader(reader)
    }

    /// count both timers down by one, stopping at zero
    pub fn tick(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn is_sounding(&self) -> bool {
        self.sound_timer > 0
    }

    /// the lowest numbered key currently held down
    pub fn first_pressed_key(&self) -> Option<u8> {
        self.keys.iter().position(|&k| k).map(|k| k as u8)
    }

    pub fn set_flag(&mut self, value: bool) {
        self.registers[FLAG_REGISTER] = value as u8;
    }
}
