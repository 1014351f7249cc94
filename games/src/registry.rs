//! Game registry for automatic front-end discovery.
//!
//! Each installable game self-registers via [`inventory::submit!`]
//! with a [`GameEntry`] containing its slot id, display name, a
//! factory function and its menu-icon animation supplier. The
//! front-end installs every registered game at startup without any
//! central list; adding a game means adding one module with one
//! `submit!` block.

use ledtoy_core::game::{Game, GameId};

/// Height of a menu icon in display rows.
pub const ICON_ROWS: usize = 8;

/// Number of animation frames every icon cycles through.
pub const ICON_FRAMES: u8 = 5;

/// Supplies the 8-row icon bitmap for one animation frame.
pub type IconFn = fn(frame: u8) -> [u8; ICON_ROWS];

/// Describes an installable game.
pub struct GameEntry {
    /// Dispatch slot this game occupies.
    pub id: GameId,
    /// CLI/menu name (e.g., "snake").
    pub name: &'static str,
    /// Factory: construct the game's capability table.
    pub create: fn() -> Box<dyn Game>,
    /// Menu icon animation supplier.
    pub icon: IconFn,
}

impl GameEntry {
    pub const fn new(
        id: GameId,
        name: &'static str,
        create: fn() -> Box<dyn Game>,
        icon: IconFn,
    ) -> Self {
        Self {
            id,
            name,
            create,
            icon,
        }
    }
}

inventory::collect!(GameEntry);

/// Return all registered games, in slot order.
pub fn all() -> Vec<&'static GameEntry> {
    let mut entries: Vec<_> = inventory::iter::<GameEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.id.index());
    entries
}

/// Look up a game by name.
pub fn find(name: &str) -> Option<&'static GameEntry> {
    inventory::iter::<GameEntry>
        .into_iter()
        .find(|e| e.name == name)
}
