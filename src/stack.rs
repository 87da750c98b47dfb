use crate::error::{Chip8Error, Result};

/// how many return addresses fit on the stack
pub const CHIP8_STACK_DEPTH: usize = 16;

/// Fixed-capacity return address stack. Pushing onto a full stack or popping
/// an empty one is an error rather than a silent overwrite.
#[derive(Debug, Clone, Default)]
pub struct CallStack {
    slots: [u16; CHIP8_STACK_DEPTH],
    depth: usize,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, addr: u16) -> Result<()> {
        let slot = self
            .slots
            .get_mut(self.depth)
            .ok_or(Chip8Error::StackOverflow { depth: self.depth })?;
        *slot = addr;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        self.depth = self.depth.checked_sub(1).ok_or(Chip8Error::StackUnderflow)?;
        Ok(self.slots[self.depth])
    }

    pub fn len(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    /// the stored return addresses, oldest first
    pub fn as_slice(&self) -> &[u16] {
        &self.slots[..self.depth]
    }
}
