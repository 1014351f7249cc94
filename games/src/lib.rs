pub mod menu;
pub mod registry;
pub mod snake;
pub mod tetris;

pub use menu::MenuGame;
pub use snake::SnakeGame;
pub use tetris::TetrisGame;
