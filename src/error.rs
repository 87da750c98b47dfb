use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Chip8Error>;

/// Everything that can go wrong outside of plain opcode execution. Opcodes
/// themselves are total over their 8/16-bit domains; only program loading,
/// the call stack and the analyser's bounded lists can fail.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("program is {size} bytes long, more than the maximum of {max}")]
    ProgramTooLarge { size: usize, max: usize },
    #[error("call stack overflow: {depth} return addresses already stored")]
    StackOverflow { depth: usize },
    #[error("return with an empty call stack")]
    StackUnderflow,
    #[error("analyser {list} list is full (capacity {capacity})")]
    AnalyserFull {
        list: &'static str,
        capacity: usize,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
