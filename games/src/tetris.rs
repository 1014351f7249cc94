//! Falling blocks on a 24-row well with two-bit-wide side walls.
//!
//! Both the settled and the falling piece live in packed row-word
//! boards, so every movement test is a handful of whole-row AND/OR
//! operations: dropping shifts the falling board down one word,
//! lateral movement shifts every word by one bit, and a lock is a
//! plain OR into the settled board. Rotation is the only bit-level
//! work: a neighborhood around the anchor is remapped into a scratch
//! buffer, validated against walls, settled cells and the board edge,
//! and only then committed.

use ledtoy_core::bits::{bit_is_set, bit_set_to};
use ledtoy_core::frame::{DISPLAY_ROWS, FrameBuffer, POINTS_ROWS, draw_points};
use ledtoy_core::game::{Game, GameContext, GameId};

use crate::registry::{GameEntry, ICON_ROWS};

const BOARD_ROWS: usize = 24;

/// Two permanently-occupied columns on each side, shared between
/// rendering and every movement/rotation validity check.
const WALLS: u16 = 0xc003;

/// First display row of the well.
const BOARD_TOP: usize = 8;

/// Spawn anchor column for every piece.
const SPAWN_X: u8 = 7;

/// Score display ceiling; the counter wraps back to zero there.
const POINTS_WRAP: u16 = 1000;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

const PIECE_KINDS: [PieceKind; 7] = [
    PieceKind::I,
    PieceKind::J,
    PieceKind::L,
    PieceKind::O,
    PieceKind::S,
    PieceKind::T,
    PieceKind::Z,
];

/// Two-row spawn bitmaps, 4 columns wide, left-aligned in the byte.
const PIECE_BITMAP: [[u8; 2]; 7] = [
    [0b11110000, 0b00000000], // I
    [0b11100000, 0b00100000], // J
    [0b11100000, 0b10000000], // L
    [0b01100000, 0b01100000], // O
    [0b01100000, 0b11000000], // S
    [0b11100000, 0b01000000], // T
    [0b11000000, 0b01100000], // Z
];

impl PieceKind {
    fn index(self) -> usize {
        self as usize
    }
}

pub struct TetrisGame {
    /// The falling piece's cells, full board height.
    falling: [u16; BOARD_ROWS],
    /// Everything locked in place so far.
    settled: [u16; BOARD_ROWS],
    /// Next-piece preview rows (bitmap shifted into the side column).
    preview: [u16; 2],
    points_band: [u16; POINTS_ROWS],
    piece: PieceKind,
    /// Anchor column of the falling piece.
    x: u8,
    /// Anchor row of the falling piece.
    y: u8,
    next: PieceKind,
    points: u16,
    elapsed_ms: u32,
}

impl TetrisGame {
    pub fn new() -> Self {
        Self {
            falling: [0; BOARD_ROWS],
            settled: [0; BOARD_ROWS],
            preview: [0; 2],
            points_band: [0; POINTS_ROWS],
            piece: PieceKind::I,
            x: SPAWN_X,
            y: 0,
            // First spawned piece before any random draw.
            next: PieceKind::I,
            points: 0,
            elapsed_ms: 0,
        }
    }

    fn update_points(&mut self) {
        if self.points >= POINTS_WRAP {
            self.points = 0;
        }
        self.points_band = [0; POINTS_ROWS];
        draw_points(&mut self.points_band, self.points);
    }

    /// Remove full rows, bottom to top. A full row is shifted away and
    /// the same index re-examined, so cascading collapses are handled
    /// in one sweep. One point per line plus (n-1) bonus when n > 1
    /// lines clear in the same lock.
    fn clear_full_rows(&mut self) {
        let mut i = BOARD_ROWS - 1;
        let mut cleared: u16 = 0;
        while i != 0 {
            if self.settled[i] | WALLS == 0xffff {
                for j in (1..=i).rev() {
                    self.settled[j] = self.settled[j - 1];
                }
                self.settled[0] = 0;
                self.points += 1;
                cleared += 1;
                continue;
            }
            i -= 1;
        }

        if cleared > 1 {
            self.points += cleared - 1;
        }

        self.update_points();
    }

    /// Promote the next piece to the top-center spawn position. If its
    /// footprint already overlaps settled cells the game is over
    /// (classic top-out); the settled board is left untouched.
    fn spawn(&mut self, ctx: &mut GameContext) {
        self.piece = self.next;
        self.x = SPAWN_X;
        self.y = 0;

        self.falling = [0; BOARD_ROWS];
        for (row, &bits) in PIECE_BITMAP[self.piece.index()].iter().enumerate() {
            self.falling[row] = (bits as u16) << 2;
        }

        for row in 0..PIECE_BITMAP[self.piece.index()].len() {
            if self.falling[row] & self.settled[row] != 0 {
                ctx.end_game(self.points);
                return;
            }
        }
    }

    /// Draw a fresh next piece and rebuild its preview rows.
    fn pick_next(&mut self, ctx: &mut GameContext) {
        self.next = PIECE_KINDS[(ctx.random() % PIECE_KINDS.len() as u16) as usize];
        for (row, &bits) in PIECE_BITMAP[self.next.index()].iter().enumerate() {
            self.preview[row] = (bits as u16) >> 4;
        }
    }

    fn can_drop(&self) -> bool {
        if self.falling[BOARD_ROWS - 1] != 0 {
            return false;
        }
        for i in 1..BOARD_ROWS {
            if self.settled[i] & self.falling[i - 1] != 0 {
                return false;
            }
        }
        true
    }

    /// Move the falling piece down one row, or lock it: merge into the
    /// settled board, clear lines and spawn the successor. Returns
    /// true if the piece moved (display changed but no lock happened).
    fn drop_step(&mut self, ctx: &mut GameContext) -> bool {
        if self.can_drop() {
            for i in (1..BOARD_ROWS).rev() {
                self.falling[i] = self.falling[i - 1];
            }
            self.falling[0] = 0;
            self.y += 1;
            return true;
        }

        for i in 0..BOARD_ROWS {
            self.settled[i] |= self.falling[i];
        }

        self.clear_full_rows();

        self.spawn(ctx);
        if ctx.is_over() {
            return false;
        }
        self.pick_next(ctx);

        false
    }

    fn can_move(&self, shifted: impl Fn(u16) -> u16) -> bool {
        for i in 0..BOARD_ROWS {
            let row = shifted(self.falling[i]);
            if row & self.settled[i] != 0 || row & WALLS != 0 {
                return false;
            }
        }
        true
    }

    /// Rotate J/L/S/T/Z 90 degrees about the 3x3 neighborhood centered
    /// one row above the anchor: new offset (dx,dy) takes the bit from
    /// old offset (dy,-dx). Compute into a scratch buffer, validate,
    /// then commit, so a rejected rotation never writes anything.
    fn rotate_jlstz(&mut self) {
        if self.y == 0 {
            return;
        }
        let y = self.y as i16;
        let x = self.x as i16;

        let mut scratch = [0u16; 3];
        for dx in -1i16..=1 {
            for dy in -1i16..=1 {
                let src_row = y - dx;
                let src_off = 15 - x - dy;
                let bit = (0..BOARD_ROWS as i16).contains(&src_row)
                    && (0..16).contains(&src_off)
                    && bit_is_set(self.falling[src_row as usize], src_off as u8);

                let dst_off = 15 - x - dx;
                if (0..16).contains(&dst_off) {
                    bit_set_to(&mut scratch[(dy + 1) as usize], dst_off as u8, bit);
                }
            }
        }

        // The rotated footprint may not stick out past the bottom edge.
        if self.y as usize == BOARD_ROWS - 1 && scratch[2] != 0 {
            return;
        }
        let top = self.y as usize - 1;
        for (k, &row) in scratch.iter().enumerate() {
            if row & WALLS != 0 {
                return;
            }
            if top + k < BOARD_ROWS && row & self.settled[top + k] != 0 {
                return;
            }
        }

        for (k, &row) in scratch.iter().enumerate() {
            if top + k < BOARD_ROWS {
                self.falling[top + k] = row;
            }
        }
    }

    /// Rotate the I piece through its four orientation states. The
    /// current state is inferred from which cell around the anchor is
    /// occupied; the 4x4 neighborhood is remapped into a scratch
    /// buffer, validated, committed, and the anchor nudged by one
    /// along the axis the transition requires.
    fn rotate_i(&mut self) {
        #[derive(PartialEq)]
        enum State {
            Up,
            Down,
            Left,
            Right,
        }

        if self.y == 0 {
            return;
        }
        let y = self.y as usize;
        let x = self.x as i16;

        let (state, start_x, start_y): (State, i16, i16) =
            if self.falling[y - 1] == 0 {
                // Horizontal: only the anchor row is occupied.
                if bit_is_set(self.falling[y], (15 - (x - 2)) as u8) {
                    (State::Down, x - 2, y as i16 - 2)
                } else {
                    (State::Up, x - 1, y as i16 - 1)
                }
            } else {
                if y + 2 > BOARD_ROWS - 1 {
                    return;
                }
                if bit_is_set(self.falling[y + 2], (15 - x) as u8) {
                    (State::Right, x - 2, y as i16 - 1)
                } else {
                    (State::Left, x - 1, y as i16 - 2)
                }
            };

        // Transitions that would run off the top or bottom edge.
        if y == BOARD_ROWS - 2 && state == State::Up {
            return;
        }
        if y == BOARD_ROWS - 1 && state == State::Down {
            return;
        }
        if start_y < 0 || start_y as usize + 4 > BOARD_ROWS {
            return;
        }
        let (sx, sy) = (start_x, start_y as usize);

        let mut scratch = [0u16; 4];
        for col in 0..4i16 {
            for row in 0..4i16 {
                let src_off = 15 - sx - col;
                let bit = (0..16).contains(&src_off)
                    && bit_is_set(self.falling[sy + row as usize], src_off as u8);
                let dst_off = 15 - (sx + 3 - row);
                if (0..16).contains(&dst_off) {
                    bit_set_to(&mut scratch[col as usize], dst_off as u8, bit);
                }
            }
        }

        for (k, &row) in scratch.iter().enumerate() {
            if row & self.settled[sy + k] != 0 {
                return;
            }
            if row & WALLS != 0 {
                return;
            }
        }

        self.falling[sy..sy + 4].copy_from_slice(&scratch);
        match state {
            State::Down => self.x -= 1,
            State::Up => self.x += 1,
            State::Right => self.y += 1,
            State::Left => self.y -= 1,
        }
    }
}

impl Default for TetrisGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for TetrisGame {
    fn initialize(&mut self, ctx: &mut GameContext) {
        self.settled = [0; BOARD_ROWS];
        self.points = 0;
        self.elapsed_ms = 0;

        self.update_points();
        self.spawn(ctx);
        self.pick_next(ctx);
    }

    fn right_button(&mut self, _ctx: &mut GameContext) {
        if !self.can_move(|row| row >> 1) {
            return;
        }
        for row in self.falling.iter_mut() {
            *row >>= 1;
        }
        self.x += 1;
    }

    fn left_button(&mut self, _ctx: &mut GameContext) {
        if !self.can_move(|row| row << 1) {
            return;
        }
        for row in self.falling.iter_mut() {
            *row <<= 1;
        }
        self.x -= 1;
    }

    fn up_button(&mut self, _ctx: &mut GameContext) {
        match self.piece {
            PieceKind::O => {}
            PieceKind::I => self.rotate_i(),
            _ => self.rotate_jlstz(),
        }
    }

    /// Soft drop: one immediate step (possibly a lock) and a gravity
    /// timer reset.
    fn down_button(&mut self, ctx: &mut GameContext) {
        self.drop_step(ctx);
        self.elapsed_ms = 0;
    }

    /// Gravity: the tick interval shrinks by 15 ms per point, floored
    /// once the score passes 30.
    fn periodic(&mut self, ctx: &mut GameContext, elapsed_ms: u32) -> bool {
        self.elapsed_ms += elapsed_ms;
        let speedup = self.points.min(30) as u32;
        if self.elapsed_ms < 500 - 15 * speedup {
            return false;
        }

        self.elapsed_ms = 0;
        self.drop_step(ctx);

        true
    }

    fn render(&self, frame: &mut FrameBuffer) {
        *frame = [0; DISPLAY_ROWS];

        frame[1..1 + POINTS_ROWS].copy_from_slice(&self.points_band);
        frame[3] |= self.preview[0];
        frame[4] |= self.preview[1];
        frame[BOARD_TOP - 1] = 0xffff;
        for i in 0..BOARD_ROWS {
            frame[BOARD_TOP + i] = WALLS | self.settled[i] | self.falling[i];
        }
    }
}

// ---------------------------------------------------------------------------
// Menu icon + registry entry
// ---------------------------------------------------------------------------

/// A T piece dropping onto a ragged stack.
const ICON: [[u8; ICON_ROWS]; 5] = [
    [
        0b00000000, 0b00000000, 0b01110000, 0b00100000, 0b00000101, 0b10000111, 0b10001111,
        0b11011111,
    ],
    [
        0b00000000, 0b00000000, 0b00000000, 0b01110000, 0b00100101, 0b10000111, 0b10001111,
        0b11011111,
    ],
    [
        0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b01110101, 0b10100111, 0b10001111,
        0b11011111,
    ],
    [
        0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000101, 0b11110111, 0b10101111,
        0b11011111,
    ],
    [
        0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000101, 0b10000111, 0b11111111,
        0b11111111,
    ],
];

fn icon_frame(frame: u8) -> [u8; ICON_ROWS] {
    ICON[frame as usize % ICON.len()]
}

fn create_game() -> Box<dyn Game> {
    Box::new(TetrisGame::new())
}

inventory::submit! {
    GameEntry::new(GameId::Tetris, "tetris", create_game, icon_frame)
}
