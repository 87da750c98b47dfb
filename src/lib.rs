//! # chip8vm
//!
//! A CHIP-8 interpreter plus the bits needed to pull a program apart.
//!
//! ## Design
//!
//! * the machine is plain data; nothing runs unless the owner calls `step`
//!   (one instruction) or `tick` (one timer period)
//! * opcodes are total: arithmetic wraps, memory addresses wrap at 4K, and
//!   nonsense sub-opcodes do nothing. The only runtime failures are the call
//!   stack over/underflowing
//! * display, input and audio sit behind traits so the machine doesn't need
//!   to know how any of them work; the terminal versions use tui, crossterm
//!   and beep
//! * pacing (instructions per second, 60Hz timers) belongs to the front end
//!
//! Model
//!
//! ```text
//! Emulator
//!  |-- display, input, sound, config
//!  |-- machine
//!  |    |-- memory (font at 0x50, program at 0x200)
//!  |    |-- registers, I, PC, call stack, timers
//!  |    |-- frame buffer (+ dirty flag), keypad
//!  |    `-- step(): fetch -> instruction::decode -> execute
//!  `-- run(): input -> step -> present -> sound -> tick -> sleep
//!
//! decompile
//!  |-- analyser: one pass, every aligned word -> jumps/calls/skips
//!  `-- disassembler: listing with labels from the analyser
//! ```
pub mod analyser;
pub mod config;
pub mod disassembler;
pub mod display;
pub mod emulator;
pub mod error;
pub mod frame;
pub mod input;
pub mod instruction;
mod interpreter;
pub mod machine;
pub mod memory;
pub mod sound;
pub mod stack;

pub use analyser::Analysis;
pub use error::{Chip8Error, Result};
pub use instruction::Instruction;
pub use machine::Machine;
