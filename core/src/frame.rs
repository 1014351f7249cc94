//! The shared display framebuffer and score-digit composition.
//!
//! The display is a 16x32 LED matrix driven row by row: 32 rows of 16
//! pixels, one `u16` per row, bit 15 leftmost. The control task
//! rewrites the whole buffer after every game-state change; the
//! display task re-reads it continuously to multiplex the physical
//! matrix. The mutex scope in [`SharedFrame::with`] is the system's
//! only locking discipline; it stands in for the original firmware's
//! non-preemptible section, so the reader never observes a partially
//! written frame.

use std::sync::{Arc, Mutex};

/// Number of display rows (and words in the framebuffer).
pub const DISPLAY_ROWS: usize = 32;

/// One full display frame, one packed row word per display row.
pub type FrameBuffer = [u16; DISPLAY_ROWS];

/// Handle to the framebuffer shared between the control task (writer)
/// and the display task (reader). Cloning shares the same buffer.
#[derive(Clone, Default)]
pub struct SharedFrame(Arc<Mutex<FrameBuffer>>);

impl SharedFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the framebuffer. Compute and
    /// publish must both happen inside this scope.
    pub fn with<R>(&self, f: impl FnOnce(&mut FrameBuffer) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// Copy out the current frame for the display task.
    pub fn snapshot(&self) -> FrameBuffer {
        self.with(|f| *f)
    }
}

/// Number of rows in the score band.
pub const POINTS_ROWS: usize = 5;

/// 5-row glyphs for the digits 0-9, left-aligned in the byte.
const DIGITS_BITMAP: [[u8; POINTS_ROWS]; 10] = [
    [0b11100000, 0b10100000, 0b10100000, 0b10100000, 0b11100000],
    [0b01000000, 0b11000000, 0b01000000, 0b01000000, 0b11100000],
    [0b11100000, 0b00100000, 0b11100000, 0b10000000, 0b11100000],
    [0b11100000, 0b00100000, 0b11100000, 0b00100000, 0b11100000],
    [0b10100000, 0b10100000, 0b11100000, 0b00100000, 0b00100000],
    [0b11100000, 0b10000000, 0b11100000, 0b00100000, 0b11100000],
    [0b11100000, 0b10000000, 0b11100000, 0b10100000, 0b11100000],
    [0b11100000, 0b10100000, 0b00100000, 0b00100000, 0b00100000],
    [0b11100000, 0b10100000, 0b11100000, 0b10100000, 0b11100000],
    [0b11100000, 0b10100000, 0b11100000, 0b00100000, 0b11100000],
];

/// OR the decimal digits of `points` into a 5-row band: hundreds in
/// the high byte, tens shifted by 4, units in the low nibble area.
/// `band` must be at least [`POINTS_ROWS`] rows; extra rows are left
/// untouched.
pub fn draw_points(band: &mut [u16], points: u16) {
    let units = (points % 10) as usize;
    let tens = ((points % 100) / 10) as usize;
    let hundreds = ((points / 100) % 10) as usize;

    for i in 0..POINTS_ROWS {
        band[i] |= (DIGITS_BITMAP[hundreds][i] as u16) << 8;
        band[i] |= (DIGITS_BITMAP[tens][i] as u16) << 4;
        band[i] |= DIGITS_BITMAP[units][i] as u16;
    }
}
