//! The selector screen: lists the installed games as animated icons
//! and launches the highlighted one.
//!
//! The menu occupies the `Menu` slot of the dispatch registry and is
//! the active "game" after power-on. Each installed game gets an
//! 8-row band: the icon bitmap in the low byte of the row words, the
//! selection arrow overlaid in the high byte of the highlighted band.

use ledtoy_core::frame::{DISPLAY_ROWS, FrameBuffer};
use ledtoy_core::game::{Game, GameContext, GameId};

use crate::registry::{ICON_FRAMES, ICON_ROWS, IconFn};

/// Arrow glyph marking the highlighted game, drawn into the high byte.
const ARROW_BITMAP: [u8; ICON_ROWS] = [
    0b00000000, 0b00001000, 0b00001100, 0b11111110, 0b11111110, 0b00001100, 0b00001000, 0b00000000,
];

/// Icon animations re-render on this period.
const ANIMATION_PERIOD_MS: u32 = 300;

enum Direction {
    Up,
    Down,
}

pub struct MenuGame {
    /// Installed, selectable games in display order (menu excluded).
    entries: Vec<(GameId, IconFn)>,
    /// Index of the highlighted game, clamped to the entry list.
    cursor: usize,
    /// Shared animation frame counter, advanced on the periodic tick.
    anim_frame: u8,
    elapsed_ms: u32,
    /// The menu's pre-composed display frame; render just copies it.
    framebuffer: FrameBuffer,
}

impl MenuGame {
    pub fn new(entries: Vec<(GameId, IconFn)>) -> Self {
        Self {
            entries,
            cursor: 0,
            anim_frame: 0,
            elapsed_ms: 0,
            framebuffer: [0; DISPLAY_ROWS],
        }
    }

    fn move_cursor(&mut self, direction: Direction) {
        let previous = self.cursor;
        match direction {
            Direction::Down => {
                if self.cursor + 1 == self.entries.len() {
                    return;
                }
                self.cursor += 1;
            }
            Direction::Up => {
                if self.cursor == 0 {
                    return;
                }
                self.cursor -= 1;
            }
        }

        // Swap the arrow overlay between bands; icon content stays.
        for i in 0..ICON_ROWS {
            self.framebuffer[i + ICON_ROWS * previous] &= !(0xff << 8);
            self.framebuffer[i + ICON_ROWS * self.cursor] |= (ARROW_BITMAP[i] as u16) << 8;
        }
    }

    fn redraw_icons(&mut self) {
        for (slot, (_, icon)) in self.entries.iter().enumerate() {
            let bitmap = icon(self.anim_frame);
            for (row, &bits) in bitmap.iter().enumerate() {
                let word = &mut self.framebuffer[row + ICON_ROWS * slot];
                *word &= 0xff00;
                *word |= bits as u16;
            }
        }
    }
}

impl Game for MenuGame {
    fn initialize(&mut self, _ctx: &mut GameContext) {
        // Zero installed games is a wiring mistake, not a game
        // condition; the front-end refuses to start in that case.
        debug_assert!(!self.entries.is_empty(), "no games installed");

        self.framebuffer = [0; DISPLAY_ROWS];
        for i in 0..ICON_ROWS {
            self.framebuffer[i + ICON_ROWS * self.cursor] = (ARROW_BITMAP[i] as u16) << 8;
        }
        self.redraw_icons();
    }

    fn right_button(&mut self, ctx: &mut GameContext) {
        if let Some(&(id, _)) = self.entries.get(self.cursor) {
            ctx.select(id);
            ctx.run();
        }
    }

    fn up_button(&mut self, _ctx: &mut GameContext) {
        self.move_cursor(Direction::Up);
    }

    fn down_button(&mut self, _ctx: &mut GameContext) {
        self.move_cursor(Direction::Down);
    }

    fn periodic(&mut self, _ctx: &mut GameContext, elapsed_ms: u32) -> bool {
        self.elapsed_ms += elapsed_ms;
        if self.elapsed_ms < ANIMATION_PERIOD_MS {
            return false;
        }

        self.elapsed_ms = 0;
        self.anim_frame = (self.anim_frame + 1) % ICON_FRAMES;
        self.redraw_icons();

        true
    }

    fn render(&self, frame: &mut FrameBuffer) {
        *frame = self.framebuffer;
    }
}
