pub const CHIP8_SCREEN_WIDTH: usize = 64;
pub const CHIP8_SCREEN_HEIGHT: usize = 32;

pub const PIXEL_SET: u8 = 0xff;
pub const PIXEL_CLEAR: u8 = 0x00;

/// The 64x32 monochrome screen. Each pixel is stored as a whole byte, either
/// `PIXEL_SET` or `PIXEL_CLEAR`, indexed `[row][column]`.
///
/// `dirty` is raised by the drawing opcodes and lowered by whoever presents
/// the frame.
#[derive(Clone)]
pub struct FrameBuffer {
    pixels: [[u8; CHIP8_SCREEN_WIDTH]; CHIP8_SCREEN_HEIGHT],
    dirty: bool,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        FrameBuffer {
            pixels: [[PIXEL_CLEAR; CHIP8_SCREEN_WIDTH]; CHIP8_SCREEN_HEIGHT],
            dirty: false,
        }
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        for row in self.pixels.iter_mut() {
            row.fill(PIXEL_CLEAR);
        }
        self.dirty = true;
    }

    /// flip the pixel at (x, y), wrapping both axes. Returns true if a set
    /// pixel was turned off.
    pub fn flip(&mut self, x: usize, y: usize) -> bool {
        let px = &mut self.pixels[y % CHIP8_SCREEN_HEIGHT][x % CHIP8_SCREEN_WIDTH];
        let was_set = *px == PIXEL_SET;
        *px ^= PIXEL_SET;
        was_set
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.pixels[y % CHIP8_SCREEN_HEIGHT][x % CHIP8_SCREEN_WIDTH] == PIXEL_SET
    }

    pub fn rows(&self) -> &[[u8; CHIP8_SCREEN_WIDTH]; CHIP8_SCREEN_HEIGHT] {
        &self.pixels
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// called by the presentation side once it has consumed a frame
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// (x, y) of every set pixel, row by row
    pub fn lit_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pixels.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, px)| **px == PIXEL_SET)
                .map(move |(x, _)| (x, y))
        })
    }
}
