//! The dispatch registry and control loop.
//!
//! [`GameToy`] owns the installed capability tables, the currently
//! selected game and the shared framebuffer. The control task calls
//! [`GameToy::control_pass`] once per period: it consumes the latched
//! button edges, forwards them to the active game, runs the periodic
//! tick and, if anything changed, rebuilds the framebuffer under the
//! frame lock. [`run_control_task`] wraps that in the 15 ms loop and
//! the terminal game-over presentation.

use std::thread;
use std::time::Duration;

use crate::frame::{DISPLAY_ROWS, POINTS_ROWS, SharedFrame, draw_points};
use crate::game::{GAME_SLOTS, Game, GameContext, GameId};

/// Fixed control-loop period.
pub const CONTROL_PERIOD_MS: u32 = 15;

/// Source of debounced "was pushed since last check" button edges.
/// Each flag auto-clears on read and is consumed by exactly one
/// reader: the control pass.
pub trait ButtonPad {
    fn take_right(&self) -> bool;
    fn take_left(&self) -> bool;
    fn take_up(&self) -> bool;
    fn take_down(&self) -> bool;
}

/// Result of one control pass.
#[derive(Debug, PartialEq, Eq)]
pub enum PassOutcome {
    Running,
    /// The active game ended with this score. The caller owns the
    /// game-over presentation; no further passes make sense.
    GameOver(u16),
}

/// The dispatch registry: one optional capability table per game slot,
/// selection/run state, and the shared output framebuffer.
pub struct GameToy {
    games: [Option<Box<dyn Game>>; GAME_SLOTS],
    current: GameId,
    started: bool,
    ctx: GameContext,
    frame: SharedFrame,
    seed_source: fn() -> u64,
}

impl GameToy {
    pub fn new(frame: SharedFrame) -> Self {
        Self::with_seed_source(frame, clock_micros)
    }

    /// Like [`new`](Self::new) but with an injectable launch-seed
    /// source, for deterministic tests.
    pub fn with_seed_source(frame: SharedFrame, seed_source: fn() -> u64) -> Self {
        Self {
            games: [None, None, None],
            current: GameId::Menu,
            started: false,
            ctx: GameContext::new(),
            frame,
            seed_source,
        }
    }

    /// Record a capability table for `id`. Installing twice overwrites;
    /// installation is meant to happen once at startup.
    pub fn install(&mut self, id: GameId, game: Box<dyn Game>) {
        self.games[id.index()] = Some(game);
    }

    /// Make `id` the selected game. The menu cannot be re-selected.
    pub fn select(&mut self, id: GameId) {
        if id != GameId::Menu {
            self.current = id;
        }
    }

    /// Mark the selected game to be one-time-initialized on the next
    /// control pass. Ignored while the menu is the selection.
    pub fn run(&mut self) {
        if self.current != GameId::Menu {
            self.started = true;
        }
    }

    pub fn current(&self) -> GameId {
        self.current
    }

    pub fn frame(&self) -> &SharedFrame {
        &self.frame
    }

    /// Initialize and render the default selection (the menu). Called
    /// once before the first control pass.
    pub fn startup(&mut self) {
        if let Some(game) = self.games[self.current.index()].as_mut() {
            game.initialize(&mut self.ctx);
        }
        self.render();
    }

    /// Run one pass of the control loop. `elapsed_ms` is the time
    /// since the previous pass (the fixed control period in
    /// production).
    pub fn control_pass(&mut self, pad: &impl ButtonPad, elapsed_ms: u32) -> PassOutcome {
        let mut changed = false;

        if self.started {
            self.started = false;
            self.ctx.reseed((self.seed_source)());
            if let Some(game) = self.games[self.current.index()].as_mut() {
                game.initialize(&mut self.ctx);
            }
            if let Some(points) = self.finish_callback() {
                return PassOutcome::GameOver(points);
            }
            self.render();
        }

        for button in [Button::Right, Button::Left, Button::Up, Button::Down] {
            let pushed = match button {
                Button::Right => pad.take_right(),
                Button::Left => pad.take_left(),
                Button::Up => pad.take_up(),
                Button::Down => pad.take_down(),
            };
            if !pushed {
                continue;
            }
            changed = true;
            if let Some(game) = self.games[self.current.index()].as_mut() {
                match button {
                    Button::Right => game.right_button(&mut self.ctx),
                    Button::Left => game.left_button(&mut self.ctx),
                    Button::Up => game.up_button(&mut self.ctx),
                    Button::Down => game.down_button(&mut self.ctx),
                }
            }
            if let Some(points) = self.finish_callback() {
                return PassOutcome::GameOver(points);
            }
        }

        if let Some(game) = self.games[self.current.index()].as_mut() {
            changed |= game.periodic(&mut self.ctx, elapsed_ms);
        }
        if let Some(points) = self.finish_callback() {
            return PassOutcome::GameOver(points);
        }

        if changed {
            self.render();
        }

        PassOutcome::Running
    }

    /// Apply selection/launch requests a callback left in the context
    /// and surface a game-over signal. Selection takes effect
    /// immediately, so the remainder of the same pass already
    /// dispatches to the new game; its initialize runs at the top of
    /// the next pass.
    fn finish_callback(&mut self) -> Option<u16> {
        if let Some(id) = self.ctx.take_select() {
            self.current = id;
        }
        if self.ctx.take_run() && self.current != GameId::Menu {
            self.started = true;
        }
        self.ctx.take_game_over()
    }

    fn render(&mut self) {
        if let Some(game) = self.games[self.current.index()].as_ref() {
            self.frame.with(|f| game.render(f));
        }
    }
}

/// The control task: run passes at the fixed period until the active
/// game ends, then hand over to the game-over presentation. Never
/// returns; game-over is terminal for the process (power-cycle to get
/// back to the menu), matching the device behavior.
pub fn run_control_task(mut toy: GameToy, pad: impl ButtonPad) -> ! {
    toy.startup();
    loop {
        if let PassOutcome::GameOver(points) = toy.control_pass(&pad, CONTROL_PERIOD_MS) {
            game_over_presentation(toy.frame(), points);
        }
        thread::sleep(Duration::from_millis(CONTROL_PERIOD_MS as u64));
    }
}

/// Shared end-of-game sequence: blank the display row by row, pause,
/// show the final score, then park forever.
fn game_over_presentation(frame: &SharedFrame, points: u16) -> ! {
    for row in 0..DISPLAY_ROWS {
        frame.with(|f| f[row] = 0);
        thread::sleep(Duration::from_millis(100));
    }
    thread::sleep(Duration::from_millis(900));

    frame.with(|f| draw_points(&mut f[1..1 + POINTS_ROWS], points));

    loop {
        thread::sleep(Duration::from_secs(10));
    }
}

#[derive(Clone, Copy)]
enum Button {
    Right,
    Left,
    Up,
    Down,
}

fn clock_micros() -> u64 {
    // Free-running time source for launch seeds; only variation
    // between launches matters, not the epoch.
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
