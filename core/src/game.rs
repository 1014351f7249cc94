//! The capability contract between the dispatch layer and a game.
//!
//! A game supplies a set of optional callbacks: the four direction
//! buttons, a periodic tick, a framebuffer render and a one-time
//! initialize. Every method has a no-op default, so a game only
//! implements what it needs; the dispatch loop never has to know which
//! callbacks exist. This is the only coupling point for adding a game.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::frame::FrameBuffer;

/// Identifies a game slot. `Menu` is the selector screen itself and is
/// active by default; real games are everything else.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameId {
    Menu,
    Snake,
    Tetris,
}

/// Number of game slots (the original's count sentinel).
pub const GAME_SLOTS: usize = 3;

impl GameId {
    pub const ALL: [GameId; GAME_SLOTS] = [GameId::Menu, GameId::Snake, GameId::Tetris];

    pub fn index(self) -> usize {
        match self {
            GameId::Menu => 0,
            GameId::Snake => 1,
            GameId::Tetris => 2,
        }
    }
}

/// Services the dispatch layer provides to a running game's callbacks:
/// the per-launch seeded PRNG, game selection/launch requests (used by
/// the menu) and the game-over signal.
pub struct GameContext {
    rng: SmallRng,
    pending_select: Option<GameId>,
    run_requested: bool,
    game_over: Option<u16>,
}

impl GameContext {
    /// Fresh context with a default-seeded PRNG; the dispatch layer
    /// reseeds it on every game launch.
    pub fn new() -> Self {
        Self {
            rng: SmallRng::seed_from_u64(0),
            pending_select: None,
            run_requested: false,
            game_over: None,
        }
    }

    /// Context with a known seed, for driving a game deterministically
    /// outside the dispatch loop.
    pub fn seeded(seed: u64) -> Self {
        let mut ctx = Self::new();
        ctx.reseed(seed);
        ctx
    }

    /// Reseed the PRNG. Done once per game launch, from the
    /// free-running clock at the moment the launch is processed.
    pub(crate) fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// Draw the next pseudo-random value.
    pub fn random(&mut self) -> u16 {
        rand::Rng::random(&mut self.rng)
    }

    /// Request that `id` become the selected game. Selecting the menu
    /// is not a thing; such requests are dropped.
    pub fn select(&mut self, id: GameId) {
        if id != GameId::Menu {
            self.pending_select = Some(id);
        }
    }

    /// Request that the selected game be launched (one-time initialize
    /// on the next control pass).
    pub fn run(&mut self) {
        self.run_requested = true;
    }

    /// Signal that the game has ended with `points`. The callback must
    /// return without touching its state further; the dispatch layer
    /// takes over with the shared game-over presentation.
    pub fn end_game(&mut self, points: u16) {
        if self.game_over.is_none() {
            self.game_over = Some(points);
        }
    }

    /// True once [`end_game`](Self::end_game) has been called. Games
    /// use this to unwind out of nested movement logic.
    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }

    pub(crate) fn take_select(&mut self) -> Option<GameId> {
        self.pending_select.take()
    }

    pub(crate) fn take_run(&mut self) -> bool {
        std::mem::take(&mut self.run_requested)
    }

    pub(crate) fn take_game_over(&mut self) -> Option<u16> {
        self.game_over.take()
    }
}

impl Default for GameContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability table of a game. Absence of a callback is a legal no-op;
/// override only what the game reacts to. Tables are installed once at
/// startup and handed to the control task, hence `Send`.
pub trait Game: Send {
    /// One-time setup, invoked on the control pass after a launch was
    /// requested, with the PRNG freshly seeded.
    fn initialize(&mut self, _ctx: &mut GameContext) {}

    fn right_button(&mut self, _ctx: &mut GameContext) {}
    fn left_button(&mut self, _ctx: &mut GameContext) {}
    fn up_button(&mut self, _ctx: &mut GameContext) {}
    fn down_button(&mut self, _ctx: &mut GameContext) {}

    /// Called every control pass with the elapsed milliseconds since
    /// the previous one. Returns true if the display content changed.
    fn periodic(&mut self, _ctx: &mut GameContext, _elapsed_ms: u32) -> bool {
        false
    }

    /// Rebuild the shared framebuffer from the current game state.
    /// Runs inside the frame lock; must zero the buffer first and
    /// always run to completion.
    fn render(&self, _frame: &mut FrameBuffer) {}
}
