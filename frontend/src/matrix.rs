//! Model of the multiplexed 16x32 LED matrix.
//!
//! The real display is driven over a shift-register chain: the driver
//! clocks out a row's *inverted* pixel pattern followed by a one-hot
//! row-select word, then toggles the latch line to light that row.
//! This model honors the same wire contract so the refresh sweep in
//! the display loop reads exactly like the device code, and renders
//! the persistent image as RGB24 for the window.

use ledtoy_core::frame::{DISPLAY_ROWS, FrameBuffer};

/// Pixels per display row.
pub const MATRIX_COLS: usize = 16;

/// Lit LED color (amber), and the unlit dot so the grid stays visible.
const LED_ON: (u8, u8, u8) = (255, 176, 32);
const LED_OFF: (u8, u8, u8) = (28, 20, 8);

pub struct LedMatrix {
    shift_pattern: u16,
    shift_select: u32,
    rows: [u16; DISPLAY_ROWS],
}

impl LedMatrix {
    pub fn new() -> Self {
        Self {
            shift_pattern: 0,
            shift_select: 0,
            rows: [0; DISPLAY_ROWS],
        }
    }

    /// Clock in one row's inverted pixel pattern and the one-hot
    /// row-select word (`0x8000_0000 >> row`).
    pub fn shift(&mut self, inverted_pattern: u16, row_select: u32) {
        self.shift_pattern = inverted_pattern;
        self.shift_select = row_select;
    }

    /// Latch the shift registers onto the LEDs. A select word that is
    /// not one-hot lights nothing, as on the device.
    pub fn latch(&mut self) {
        if self.shift_select.count_ones() != 1 {
            return;
        }
        let row = self.shift_select.leading_zeros() as usize;
        self.rows[row] = !self.shift_pattern;
    }

    /// One full display refresh: sweep every row of the frame through
    /// the shift/latch interface.
    pub fn refresh(&mut self, frame: &FrameBuffer) {
        for (row, &pattern) in frame.iter().enumerate() {
            self.shift(!pattern, 0x8000_0000 >> row);
            self.latch();
        }
    }

    /// Render the matrix into an RGB24 buffer of
    /// `MATRIX_COLS * DISPLAY_ROWS * 3` bytes, bit 15 leftmost.
    pub fn render_rgb(&self, buffer: &mut [u8]) {
        for (row, &pattern) in self.rows.iter().enumerate() {
            for col in 0..MATRIX_COLS {
                let lit = pattern & (0x8000 >> col) != 0;
                let (r, g, b) = if lit { LED_ON } else { LED_OFF };
                let offset = (row * MATRIX_COLS + col) * 3;
                buffer[offset] = r;
                buffer[offset + 1] = g;
                buffer[offset + 2] = b;
            }
        }
    }
}

impl Default for LedMatrix {
    fn default() -> Self {
        Self::new()
    }
}
