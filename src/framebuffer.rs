/// display width in pixels
pub const WIDTH: usize = 64;
/// display height in pixels
pub const HEIGHT: usize = 32;
/// size of a packed frame, one bit per pixel
pub const FRAME_BYTES: usize = WIDTH * HEIGHT / 8;

/// 64x32 monochrome display buffer. Each row is a u64 with column 0 in the
/// most significant bit, so a packed frame is just the rows in big-endian
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    rows: [u64; HEIGHT],
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer { rows: [0; HEIGHT] }
    }

    pub fn clear(&mut self) {
        self.rows = [0; HEIGHT];
    }

    /// both axes wrap
    pub fn pixel(&self, row: usize, col: usize) -> bool {
        let bit = 63 - (col % WIDTH);
        (self.rows[row % HEIGHT] >> bit) & 1 == 1
    }

    /// XOR an 8-pixel-wide sprite onto the buffer with its top-left corner at
    /// (row, col), wrapping at the edges. Returns true if any lit pixel was
    /// turned off.
    pub fn draw_sprite(&mut self, row: usize, col: usize, sprite: &[u8]) -> bool {
        let mut collided = false;
        for (r, &line) in sprite.iter().enumerate() {
            // rotating (rather than shifting) carries overhanging pixels round
            // to column 0
            let bits = ((line as u64) << 56).rotate_right((col % WIDTH) as u32);
            let target = &mut self.rows[(row + r) % HEIGHT];
            collided |= *target & bits != 0;
            *target ^= bits;
        }
        collided
    }

    /// row-major, 8 pixels per byte, leftmost pixel in the MSB
    pub fn as_bytes(&self) -> [u8; FRAME_BYTES] {
        let mut out = [0u8; FRAME_BYTES];
        for (chunk, row) in out.chunks_exact_mut(WIDTH / 8).zip(self.rows.iter()) {
            chunk.copy_from_slice(&row.to_be_bytes());
        }
        out
    }

    pub fn lit_count(&self) -> u32 {
        self.rows.iter().map(|r| r.count_ones()).sum()
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}
