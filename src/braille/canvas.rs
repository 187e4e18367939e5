/// Dot bit for each (x, y) inside a 2x4 braille cell, indexed `[y][x]`
const DOT_BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

/// First codepoint of the Unicode braille block (no dots raised)
const BRAILLE_BASE: u32 = 0x2800;

/// Braille canvas: every character cell holds a 2x4 dot grid, so a canvas of
/// `width` x `height` cells draws at `width*2` x `height*4` pixels.
pub struct BrailleCanvas {
    width: usize,
    height: usize,
    /// Dot pattern per cell, row-major
    cells: Vec<u8>,
}

impl BrailleCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    /// Raise the dot at pixel (x, y); pixels outside the canvas are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return;
        }
        self.cells[cy * self.width + cx] |= DOT_BITS[y % 4][x % 2];
    }

    /// Signed variant for projected coordinates; negatives are off-canvas
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// True when no dot is raised
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&cell| cell == 0)
    }

    /// One string of braille characters per cell row
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .chunks(self.width.max(1))
            .take(self.height)
            .map(|row| row.iter().map(|&bits| cell_char(bits)).collect())
    }

    #[cfg(test)]
    pub fn to_string(&self) -> String {
        self.rows().collect::<Vec<_>>().join("\n")
    }
}

fn cell_char(bits: u8) -> char {
    char::from_u32(BRAILLE_BASE + bits as u32).unwrap_or(' ')
}
