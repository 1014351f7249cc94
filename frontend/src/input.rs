//! Debounced button-edge capture.
//!
//! Stands in for the device's pin-change interrupt: SDL key-down
//! events arrive on the display thread and latch a "pushed" flag per
//! button, accepted only after a minimum quiet interval since the
//! previous accepted press. The control task consumes each flag with a
//! test-and-clear read; a press is never queued twice.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ledtoy_core::toy::ButtonPad;
use sdl2::keyboard::Scancode;

/// Minimum quiet interval per button.
const DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
}

const BUTTON_COUNT: usize = 4;

/// Map a keyboard scancode to a toy button.
pub fn button_for(scancode: Scancode) -> Option<Button> {
    match scancode {
        Scancode::Right => Some(Button::Right),
        Scancode::Left => Some(Button::Left),
        Scancode::Up => Some(Button::Up),
        Scancode::Down => Some(Button::Down),
        _ => None,
    }
}

#[derive(Clone, Copy, Default)]
struct Latch {
    pushed: bool,
    last_accepted: Option<Instant>,
}

/// Four independent rising-edge latches with software debounce.
#[derive(Default)]
pub struct ButtonLatch {
    state: Mutex<[Latch; BUTTON_COUNT]>,
}

impl ButtonLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down edge. Ignored while the flag is still latched
    /// or inside the debounce window.
    pub fn press(&self, button: Button) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let latch = &mut state[button as usize];
        if latch.pushed {
            return;
        }
        let now = Instant::now();
        let quiet = latch
            .last_accepted
            .is_none_or(|t| now.duration_since(t) > DEBOUNCE);
        if quiet {
            latch.pushed = true;
            latch.last_accepted = Some(now);
        }
    }

    fn take(&self, button: Button) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut state[button as usize].pushed)
    }
}

impl ButtonPad for ButtonLatch {
    fn take_right(&self) -> bool {
        self.take(Button::Right)
    }

    fn take_left(&self) -> bool {
        self.take(Button::Left)
    }

    fn take_up(&self) -> bool {
        self.take(Button::Up)
    }

    fn take_down(&self) -> bool {
        self.take(Button::Down)
    }
}

/// Shared handle to a [`ButtonLatch`], implementing [`ButtonPad`] by
/// delegation (the orphan rule forbids implementing it on
/// `Arc<ButtonLatch>` directly).
pub struct PadHandle(pub Arc<ButtonLatch>);

impl ButtonPad for PadHandle {
    fn take_right(&self) -> bool {
        self.0.take_right()
    }

    fn take_left(&self) -> bool {
        self.0.take_left()
    }

    fn take_up(&self) -> bool {
        self.0.take_up()
    }

    fn take_down(&self) -> bool {
        self.0.take_down()
    }
}
