// Library exports for the minimax Battlesnake
// The server binary and the replay tool share the engine through this crate

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod error;
pub mod evaluator;
pub mod flood_fill;
pub mod grid;
pub mod replay;
pub mod search;
pub mod simulator;
pub mod types;
