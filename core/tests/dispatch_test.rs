use std::cell::Cell;
use std::sync::{Arc, Mutex};

use ledtoy_core::frame::{FrameBuffer, SharedFrame};
use ledtoy_core::game::{Game, GameContext, GameId};
use ledtoy_core::toy::{ButtonPad, CONTROL_PERIOD_MS, GameToy, PassOutcome};

// =================================================================
// Test doubles
// =================================================================

/// Button source with manually latched edges.
#[derive(Default)]
struct TestPad {
    right: Cell<bool>,
    left: Cell<bool>,
    up: Cell<bool>,
    down: Cell<bool>,
}

impl ButtonPad for TestPad {
    fn take_right(&self) -> bool {
        self.right.take()
    }
    fn take_left(&self) -> bool {
        self.left.take()
    }
    fn take_up(&self) -> bool {
        self.up.take()
    }
    fn take_down(&self) -> bool {
        self.down.take()
    }
}

/// Call counters shared with the test body.
#[derive(Default)]
struct CallLog {
    initialized: u32,
    rendered: u32,
    buttons: Vec<char>,
    periodic: u32,
    first_random: Option<u16>,
}

/// Game that records every callback and can be configured to report
/// changes or end the game.
struct ProbeGame {
    log: Arc<Mutex<CallLog>>,
    periodic_changed: bool,
    end_after_periodic: Option<u16>,
}

impl ProbeGame {
    fn new(log: Arc<Mutex<CallLog>>) -> Self {
        Self {
            log,
            periodic_changed: false,
            end_after_periodic: None,
        }
    }
}

impl Game for ProbeGame {
    fn initialize(&mut self, ctx: &mut GameContext) {
        let mut log = self.log.lock().unwrap();
        log.initialized += 1;
        log.first_random = Some(ctx.random());
    }

    fn right_button(&mut self, _ctx: &mut GameContext) {
        self.log.lock().unwrap().buttons.push('R');
    }

    fn left_button(&mut self, _ctx: &mut GameContext) {
        self.log.lock().unwrap().buttons.push('L');
    }

    fn up_button(&mut self, _ctx: &mut GameContext) {
        self.log.lock().unwrap().buttons.push('U');
    }

    fn down_button(&mut self, _ctx: &mut GameContext) {
        self.log.lock().unwrap().buttons.push('D');
    }

    fn periodic(&mut self, ctx: &mut GameContext, _elapsed_ms: u32) -> bool {
        self.log.lock().unwrap().periodic += 1;
        if let Some(points) = self.end_after_periodic {
            ctx.end_game(points);
        }
        self.periodic_changed
    }

    fn render(&self, frame: &mut FrameBuffer) {
        self.log.lock().unwrap().rendered += 1;
        frame[0] = 0xbeef;
    }
}

fn toy_with_probe(probe: ProbeGame) -> (GameToy, SharedFrame) {
    let frame = SharedFrame::new();
    let mut toy = GameToy::with_seed_source(frame.clone(), || 1234);
    toy.install(GameId::Snake, Box::new(probe));
    (toy, frame)
}

// =================================================================
// install / select / run
// =================================================================

#[test]
fn test_run_without_selection_is_ignored() {
    let log = Arc::new(Mutex::new(CallLog::default()));
    let (mut toy, _) = toy_with_probe(ProbeGame::new(log.clone()));

    // Menu is the default selection; run must not start anything.
    toy.run();
    assert_eq!(toy.control_pass(&TestPad::default(), CONTROL_PERIOD_MS), PassOutcome::Running);
    assert_eq!(log.lock().unwrap().initialized, 0);
}

#[test]
fn test_select_menu_is_rejected() {
    let log = Arc::new(Mutex::new(CallLog::default()));
    let (mut toy, _) = toy_with_probe(ProbeGame::new(log.clone()));

    toy.select(GameId::Snake);
    toy.select(GameId::Menu);
    assert_eq!(toy.current(), GameId::Snake);
}

#[test]
fn test_run_initializes_and_renders_exactly_once() {
    let log = Arc::new(Mutex::new(CallLog::default()));
    let (mut toy, frame) = toy_with_probe(ProbeGame::new(log.clone()));
    let pad = TestPad::default();

    toy.select(GameId::Snake);
    toy.run();
    toy.control_pass(&pad, CONTROL_PERIOD_MS);
    {
        let log = log.lock().unwrap();
        assert_eq!(log.initialized, 1);
        assert_eq!(log.rendered, 1);
    }
    assert_eq!(frame.snapshot()[0], 0xbeef);

    // Subsequent passes do not re-initialize (and do not re-render
    // while nothing changes).
    toy.control_pass(&pad, CONTROL_PERIOD_MS);
    let log = log.lock().unwrap();
    assert_eq!(log.initialized, 1);
    assert_eq!(log.rendered, 1);
}

#[test]
fn test_launch_seed_is_drawn_per_run() {
    let log_a = Arc::new(Mutex::new(CallLog::default()));
    let (mut toy_a, _) = toy_with_probe(ProbeGame::new(log_a.clone()));
    let log_b = Arc::new(Mutex::new(CallLog::default()));
    let (mut toy_b, _) = toy_with_probe(ProbeGame::new(log_b.clone()));
    let pad = TestPad::default();

    for toy in [&mut toy_a, &mut toy_b] {
        toy.select(GameId::Snake);
        toy.run();
        toy.control_pass(&pad, CONTROL_PERIOD_MS);
    }

    // Identical seed source, identical first draw.
    let a = log_a.lock().unwrap().first_random;
    let b = log_b.lock().unwrap().first_random;
    assert!(a.is_some());
    assert_eq!(a, b);
}

// =================================================================
// Per-pass dispatch
// =================================================================

#[test]
fn test_button_edges_reach_the_active_game() {
    let log = Arc::new(Mutex::new(CallLog::default()));
    let (mut toy, _) = toy_with_probe(ProbeGame::new(log.clone()));
    let pad = TestPad::default();

    toy.select(GameId::Snake);
    toy.run();
    toy.control_pass(&pad, CONTROL_PERIOD_MS);

    pad.right.set(true);
    pad.down.set(true);
    toy.control_pass(&pad, CONTROL_PERIOD_MS);

    let log = log.lock().unwrap();
    assert_eq!(log.buttons, vec!['R', 'D']);
    // A consumed edge triggers a re-render even if the game callback
    // is a no-op.
    assert_eq!(log.rendered, 2);
}

#[test]
fn test_periodic_runs_every_pass_and_marks_dirty() {
    let log = Arc::new(Mutex::new(CallLog::default()));
    let mut probe = ProbeGame::new(log.clone());
    probe.periodic_changed = true;
    let (mut toy, _) = toy_with_probe(probe);
    let pad = TestPad::default();

    toy.select(GameId::Snake);
    toy.run();
    toy.control_pass(&pad, CONTROL_PERIOD_MS);
    toy.control_pass(&pad, CONTROL_PERIOD_MS);
    toy.control_pass(&pad, CONTROL_PERIOD_MS);

    let log = log.lock().unwrap();
    assert_eq!(log.periodic, 3);
    // Launch render, plus one render per pass whose periodic reported
    // a change.
    assert_eq!(log.rendered, 4);
}

#[test]
fn test_uninstalled_slot_dispatches_to_nothing() {
    let frame = SharedFrame::new();
    let mut toy = GameToy::with_seed_source(frame, || 0);
    let pad = TestPad::default();

    toy.select(GameId::Tetris);
    toy.run();
    pad.up.set(true);
    assert_eq!(toy.control_pass(&pad, CONTROL_PERIOD_MS), PassOutcome::Running);
}

// =================================================================
// Game over
// =================================================================

#[test]
fn test_game_over_from_periodic_reaches_the_task_loop() {
    let log = Arc::new(Mutex::new(CallLog::default()));
    let mut probe = ProbeGame::new(log.clone());
    probe.end_after_periodic = Some(77);
    let (mut toy, _) = toy_with_probe(probe);
    let pad = TestPad::default();

    toy.select(GameId::Snake);
    toy.run();
    assert_eq!(
        toy.control_pass(&pad, CONTROL_PERIOD_MS),
        PassOutcome::GameOver(77)
    );
}
