//! Snake on a 14x23 torus grid.
//!
//! The playing field wraps at every edge; only the snake's own body is
//! deadly. The body lives in a fixed-capacity segment array (head at
//! index 0) and a packed occupancy board is rebuilt from it after
//! every step, so the render routine and the collision test share the
//! same row words. Score is simply the current length.

use ledtoy_core::bits::{bit_is_set, bit_set_to};
use ledtoy_core::frame::{DISPLAY_ROWS, FrameBuffer, POINTS_ROWS, draw_points};
use ledtoy_core::game::{Game, GameContext, GameId};

use crate::registry::{GameEntry, ICON_ROWS};

const ROWS: usize = 23;
const COLS: u8 = 14;

/// Full board: game over as a win-turned-loss when the snake fills it.
const CAPACITY: usize = ROWS * COLS as usize;

/// Border columns, shared between rendering and the 1-indexed x range.
const WALLS: u16 = 0x8001;

/// First display row of the playing field.
const BOARD_TOP: usize = 8;

/// Automatic forward step period.
const STEP_PERIOD_MS: u32 = 300;
/// Cosmetic blink half-periods.
const FOOD_BLINK_MS: u32 = 450;
const HEAD_BLINK_MS: u32 = 100;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
struct Coord {
    /// Column, 1-indexed; columns 0 and 15 are the walls.
    x: u8,
    /// Row, 0-indexed within the playing field.
    y: u8,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Heading {
    Up,
    Down,
    Left,
    Right,
}

pub struct SnakeGame {
    body: [Coord; CAPACITY],
    len: usize,
    heading: Heading,
    food: Coord,
    /// Packed occupancy of the body, one word per field row. Kept in
    /// sync with `body` for O(1) pixel lookup.
    board: [u16; ROWS],
    /// Packed row word holding the food pixel (placed at `food.y`).
    food_row: u16,
    points_band: [u16; POINTS_ROWS],
    /// A turn was already accepted since the last step.
    move_chosen: bool,
    step_elapsed_ms: u32,
    food_blink_ms: u32,
    head_blink_ms: u32,
}

impl SnakeGame {
    pub fn new() -> Self {
        Self {
            body: [Coord::default(); CAPACITY],
            len: 0,
            heading: Heading::Down,
            food: Coord::default(),
            board: [0; ROWS],
            food_row: 0,
            points_band: [0; POINTS_ROWS],
            move_chosen: false,
            step_elapsed_ms: 0,
            food_blink_ms: 0,
            head_blink_ms: 0,
        }
    }

    fn in_bounds(c: Coord) -> bool {
        (c.y as usize) < ROWS && c.x >= 1 && c.x <= COLS
    }

    fn board_get(&self, c: Coord) -> bool {
        if !Self::in_bounds(c) {
            return false;
        }
        bit_is_set(self.board[c.y as usize], 15 - c.x)
    }

    fn board_set(&mut self, c: Coord, bit: bool) {
        if !Self::in_bounds(c) {
            return;
        }
        bit_set_to(&mut self.board[c.y as usize], 15 - c.x, bit);
    }

    fn food_get(&self) -> bool {
        bit_is_set(self.food_row, 15 - self.food.x)
    }

    fn food_set(&mut self, c: Coord, bit: bool) {
        if !Self::in_bounds(c) {
            return;
        }
        bit_set_to(&mut self.food_row, 15 - c.x, bit);
    }

    fn update_points(&mut self) {
        self.points_band = [0; POINTS_ROWS];
        draw_points(&mut self.points_band, self.len as u16);
    }

    /// Advance one cell in the current heading, wrapping at the grid
    /// edges (pure torus; the visual walls are not obstacles).
    fn next_head(&self) -> Coord {
        let mut head = self.body[0];
        match self.heading {
            Heading::Down => {
                head.y += 1;
                if head.y as usize == ROWS {
                    head.y = 0;
                }
            }
            Heading::Up => {
                if head.y == 0 {
                    head.y = ROWS as u8 - 1;
                } else {
                    head.y -= 1;
                }
            }
            Heading::Right => {
                if head.x == COLS {
                    head.x = 1;
                } else {
                    head.x += 1;
                }
            }
            Heading::Left => {
                if head.x == 1 {
                    head.x = COLS;
                } else {
                    head.x -= 1;
                }
            }
        }
        head
    }

    fn step(&mut self, ctx: &mut GameContext) {
        let new_head = self.next_head();

        // Self-collision; the tail cell is about to vacate and does
        // not count.
        if self.body[..self.len.saturating_sub(1)].contains(&new_head) {
            ctx.end_game(self.len as u16);
            return;
        }

        if new_head == self.food {
            // Grow: shift the whole body one slot toward the tail.
            for i in (0..self.len).rev() {
                self.body[i + 1] = self.body[i];
            }
            self.len += 1;
            self.body[0] = new_head;
            self.update_points();
            if self.len == CAPACITY {
                ctx.end_game(self.len as u16);
                return;
            }
            self.generate_food(ctx);
        } else {
            // Shift toward the head, dropping the old tail.
            for i in (1..self.len).rev() {
                self.body[i] = self.body[i - 1];
            }
            self.body[0] = new_head;
        }

        self.rebuild_board();
        self.move_chosen = false;
    }

    /// Rebuild the packed occupancy board from the segment list.
    fn rebuild_board(&mut self) {
        self.board = [0; ROWS];
        for i in 0..self.len {
            let c = self.body[i];
            self.board_set(c, true);
        }
    }

    /// Place food on a free cell: pick a random starting column, sweep
    /// its rows from the column's phase offset, and move to the next
    /// column (wrapping, 1-indexed) when a column has no free row.
    /// Terminates because the board is never full here (the caller
    /// ends the game before the last cell is eaten).
    fn generate_food(&mut self, ctx: &mut GameContext) {
        let mut col = (ctx.random() % COLS as u16) as u8 + 1;
        let spot = 'search: loop {
            for k in 0..ROWS {
                let candidate = Coord {
                    x: col,
                    y: ((col as usize + k) % ROWS) as u8,
                };
                if !self.body[..self.len].contains(&candidate) {
                    break 'search candidate;
                }
            }
            col += 1;
            if col == COLS + 1 {
                col = 1;
            }
        };

        let old = self.food;
        self.food_set(old, false);
        self.food = spot;
        self.food_set(spot, true);
    }

    /// Accept a turn unless it reverses the heading or a turn was
    /// already taken this cycle; an accepted turn steps immediately
    /// and resets the automatic step timer.
    fn turn(&mut self, ctx: &mut GameContext, heading: Heading, reverse: Heading) {
        if self.heading == reverse || self.move_chosen {
            return;
        }
        self.heading = heading;
        self.move_chosen = true;
        self.step_elapsed_ms = 0;
        self.step(ctx);
    }
}

impl Default for SnakeGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for SnakeGame {
    fn initialize(&mut self, ctx: &mut GameContext) {
        self.body = [Coord::default(); CAPACITY];
        self.body[0] = Coord { x: 2, y: 2 };
        self.len = 1;
        self.board = [0; ROWS];
        self.food_row = 0;
        let head = self.body[0];
        self.board_set(head, true);

        self.generate_food(ctx);

        self.heading = Heading::Down;
        self.move_chosen = false;
        self.step_elapsed_ms = 0;
        self.food_blink_ms = 0;
        self.head_blink_ms = 0;

        self.update_points();
    }

    fn right_button(&mut self, ctx: &mut GameContext) {
        self.turn(ctx, Heading::Right, Heading::Left);
    }

    fn left_button(&mut self, ctx: &mut GameContext) {
        self.turn(ctx, Heading::Left, Heading::Right);
    }

    fn up_button(&mut self, ctx: &mut GameContext) {
        self.turn(ctx, Heading::Up, Heading::Down);
    }

    fn down_button(&mut self, ctx: &mut GameContext) {
        self.turn(ctx, Heading::Down, Heading::Up);
    }

    fn periodic(&mut self, ctx: &mut GameContext, elapsed_ms: u32) -> bool {
        let mut changed = false;

        // Cosmetic pulses, independent of movement timing.
        self.food_blink_ms += elapsed_ms;
        if self.food_blink_ms >= FOOD_BLINK_MS {
            self.food_blink_ms = 0;
            let food = self.food;
            let lit = self.food_get();
            self.food_set(food, !lit);
            changed = true;
        }
        self.head_blink_ms += elapsed_ms;
        if self.head_blink_ms >= HEAD_BLINK_MS {
            self.head_blink_ms = 0;
            let head = self.body[0];
            let lit = self.board_get(head);
            self.board_set(head, !lit);
            changed = true;
        }

        self.step_elapsed_ms += elapsed_ms;
        if self.step_elapsed_ms < STEP_PERIOD_MS {
            return changed;
        }

        self.step_elapsed_ms = 0;
        self.step(ctx);

        true
    }

    fn render(&self, frame: &mut FrameBuffer) {
        *frame = [0; DISPLAY_ROWS];

        frame[1..1 + POINTS_ROWS].copy_from_slice(&self.points_band);
        frame[BOARD_TOP - 1] = 0xffff;
        for (i, &row) in self.board.iter().enumerate() {
            frame[BOARD_TOP + i] |= WALLS | row;
        }
        frame[DISPLAY_ROWS - 1] = 0xffff;
        frame[BOARD_TOP + self.food.y as usize] |= self.food_row;
    }
}

// ---------------------------------------------------------------------------
// Menu icon + registry entry
// ---------------------------------------------------------------------------

/// A snake creeping toward a lone pixel of food, one cell per frame.
const ICON: [[u8; ICON_ROWS]; 5] = [
    [
        0b00000000, 0b00000000, 0b01111100, 0b01000000, 0b00000000, 0b00000000, 0b00000100,
        0b00000000,
    ],
    [
        0b00000000, 0b00000000, 0b01111000, 0b01000000, 0b01000000, 0b00000000, 0b00000100,
        0b00000000,
    ],
    [
        0b00000000, 0b00000000, 0b01110000, 0b01000000, 0b01000000, 0b01000000, 0b00000100,
        0b00000000,
    ],
    [
        0b00000000, 0b00000000, 0b01100000, 0b01000000, 0b01000000, 0b01000000, 0b01000100,
        0b00000000,
    ],
    [
        0b00000000, 0b00000000, 0b01000000, 0b01000000, 0b01000000, 0b01000000, 0b01100100,
        0b00000000,
    ],
];

fn icon_frame(frame: u8) -> [u8; ICON_ROWS] {
    ICON[frame as usize % ICON.len()]
}

fn create_game() -> Box<dyn Game> {
    Box::new(SnakeGame::new())
}

inventory::submit! {
    GameEntry::new(GameId::Snake, "snake", create_game, icon_frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (SnakeGame, GameContext) {
        let mut game = SnakeGame::new();
        let mut ctx = GameContext::seeded(7);
        game.initialize(&mut ctx);
        (game, ctx)
    }

    /// Park the food somewhere the movement under test cannot reach.
    fn park_food(game: &mut SnakeGame, at: Coord) {
        game.food_row = 0;
        game.food = at;
        game.food_set(at, true);
    }

    fn assert_board_matches_body(game: &SnakeGame) {
        for y in 0..ROWS as u8 {
            for x in 1..=COLS {
                let c = Coord { x, y };
                let on_body = game.body[..game.len].contains(&c);
                assert_eq!(game.board_get(c), on_body, "mismatch at ({x},{y})");
            }
        }
    }

    #[test]
    fn test_initialize_places_head_and_food() {
        let (game, _) = fresh();
        assert_eq!(game.len, 1);
        assert!(game.body[0] == Coord { x: 2, y: 2 });
        assert!(game.heading == Heading::Down);
        assert!(game.food != game.body[0]);
        assert!(game.food_get());
        assert_board_matches_body(&game);
    }

    #[test]
    fn test_turn_steps_immediately_and_resets_the_timer() {
        let (mut game, mut ctx) = fresh();
        park_food(&mut game, Coord { x: 10, y: 20 });
        game.step_elapsed_ms = 250;

        game.right_button(&mut ctx);

        assert!(game.heading == Heading::Right);
        assert!(game.body[0] == Coord { x: 3, y: 2 });
        assert_eq!(game.step_elapsed_ms, 0);
        assert_board_matches_body(&game);
    }

    #[test]
    fn test_reverse_turn_is_rejected() {
        let (mut game, mut ctx) = fresh();
        park_food(&mut game, Coord { x: 10, y: 20 });

        // Heading is Down after initialize; Up would be a 180.
        game.up_button(&mut ctx);

        assert!(game.heading == Heading::Down);
        assert!(game.body[0] == Coord { x: 2, y: 2 });
    }

    #[test]
    fn test_edges_wrap_like_a_torus() {
        let (mut game, _) = fresh();

        game.body[0] = Coord { x: COLS, y: 5 };
        game.heading = Heading::Right;
        assert!(game.next_head() == Coord { x: 1, y: 5 });

        game.body[0] = Coord { x: 3, y: ROWS as u8 - 1 };
        game.heading = Heading::Down;
        assert!(game.next_head() == Coord { x: 3, y: 0 });

        game.body[0] = Coord { x: 3, y: 0 };
        game.heading = Heading::Up;
        assert!(game.next_head() == Coord { x: 3, y: ROWS as u8 - 1 });

        game.body[0] = Coord { x: 1, y: 5 };
        game.heading = Heading::Left;
        assert!(game.next_head() == Coord { x: COLS, y: 5 });
    }

    #[test]
    fn test_eating_grows_and_replaces_the_food() {
        let (mut game, mut ctx) = fresh();
        park_food(&mut game, Coord { x: 2, y: 3 });

        // Heading is Down; the food is directly ahead.
        game.step(&mut ctx);

        assert_eq!(game.len, 2);
        assert!(game.body[0] == Coord { x: 2, y: 3 });
        assert!(game.body[1] == Coord { x: 2, y: 2 });
        assert!(!game.body[..game.len].contains(&game.food));
        assert_board_matches_body(&game);

        let mut expected = [0u16; POINTS_ROWS];
        draw_points(&mut expected, 2);
        assert_eq!(game.points_band, expected);
    }

    #[test]
    fn test_self_collision_ends_with_the_length_as_score() {
        let (mut game, mut ctx) = fresh();
        park_food(&mut game, Coord { x: 10, y: 20 });
        game.body[0] = Coord { x: 5, y: 5 };
        game.body[1] = Coord { x: 6, y: 5 };
        game.body[2] = Coord { x: 7, y: 5 };
        game.len = 3;
        game.heading = Heading::Right;
        game.rebuild_board();

        game.step(&mut ctx);

        assert!(ctx.is_over());
        // The aborted step leaves the body untouched.
        assert!(game.body[0] == Coord { x: 5, y: 5 });
        assert_eq!(game.len, 3);
    }

    #[test]
    fn test_moving_into_the_vacating_tail_cell_is_legal() {
        let (mut game, mut ctx) = fresh();
        park_food(&mut game, Coord { x: 10, y: 20 });
        game.body[0] = Coord { x: 5, y: 5 };
        game.body[1] = Coord { x: 5, y: 6 };
        game.body[2] = Coord { x: 6, y: 6 };
        game.body[3] = Coord { x: 6, y: 5 };
        game.len = 4;
        game.heading = Heading::Right;
        game.rebuild_board();

        game.step(&mut ctx);

        assert!(!ctx.is_over());
        assert!(game.body[0] == Coord { x: 6, y: 5 });
        assert_eq!(game.len, 4);
        assert_board_matches_body(&game);
    }

    #[test]
    fn test_filling_the_board_ends_the_game() {
        let mut game = SnakeGame::new();
        let mut ctx = GameContext::seeded(7);

        // Body everywhere except one cell, head right next to it.
        let last = Coord { x: COLS, y: ROWS as u8 - 1 };
        let head = Coord { x: COLS - 1, y: ROWS as u8 - 1 };
        game.body[0] = head;
        let mut i = 1;
        for x in 1..=COLS {
            for y in 0..ROWS as u8 {
                let c = Coord { x, y };
                if c == last || c == head {
                    continue;
                }
                game.body[i] = c;
                i += 1;
            }
        }
        game.len = CAPACITY - 1;
        game.heading = Heading::Right;
        game.rebuild_board();
        park_food(&mut game, last);

        game.step(&mut ctx);

        assert!(ctx.is_over());
        assert_eq!(game.len, CAPACITY);
        // No replacement food was generated for the full board.
        assert!(game.food == last);
    }

    #[test]
    fn test_twenty_three_growth_events_are_reachable() {
        let (mut game, mut ctx) = fresh();

        // Feed the snake down column 2, then along the bottom row.
        // The generator must find a free cell every single time.
        let mut growths = 0;
        while growths < 23 {
            if game.body[0].y == ROWS as u8 - 1 && game.heading == Heading::Down {
                game.heading = Heading::Right;
            }
            let target = game.next_head();
            park_food(&mut game, target);

            game.step(&mut ctx);
            growths += 1;

            assert!(!ctx.is_over());
            assert_eq!(game.len, growths + 1);
            assert!(!game.body[..game.len].contains(&game.food));
        }
        assert_board_matches_body(&game);
    }

    #[test]
    fn test_periodic_steps_on_the_step_period() {
        let (mut game, mut ctx) = fresh();
        park_food(&mut game, Coord { x: 10, y: 20 });

        assert!(game.periodic(&mut ctx, STEP_PERIOD_MS));
        assert!(game.body[0] == Coord { x: 2, y: 3 });
    }

    #[test]
    fn test_head_blink_toggles_and_rearms() {
        let (mut game, mut ctx) = fresh();
        park_food(&mut game, Coord { x: 10, y: 20 });
        let head = game.body[0];
        assert!(game.board_get(head));

        assert!(game.periodic(&mut ctx, HEAD_BLINK_MS));
        assert!(!game.board_get(head));

        assert!(game.periodic(&mut ctx, HEAD_BLINK_MS));
        assert!(game.board_get(head));
    }

    #[test]
    fn test_render_layout() {
        let (game, _) = fresh();
        let mut frame = [0u16; DISPLAY_ROWS];
        game.render(&mut frame);

        assert_eq!(frame[BOARD_TOP - 1], 0xffff);
        assert_eq!(frame[DISPLAY_ROWS - 1], 0xffff);
        for i in 0..ROWS {
            assert_eq!(frame[BOARD_TOP + i] & WALLS, WALLS);
        }
        // Head at (2,2): bit offset 13 of field row 2.
        assert!(bit_is_set(frame[BOARD_TOP + 2], 13));
    }
}
