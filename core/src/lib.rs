pub mod bits;
pub mod frame;
pub mod game;
pub mod toy;

pub mod prelude {
    pub use crate::frame::{DISPLAY_ROWS, FrameBuffer, SharedFrame};
    pub use crate::game::{Game, GameContext, GameId};
    pub use crate::toy::{ButtonPad, CONTROL_PERIOD_MS, GameToy, PassOutcome};
}
