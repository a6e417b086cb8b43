// Battlesnake API Types
// See https://docs.battlesnake.com/api
//
// Wire coordinates use a bottom-left origin. GridState::from_board flips them
// into the engine's top-left grid.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Game metadata including ID, ruleset, and timeout
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Game {
    pub id: String,
    #[serde(default)]
    pub ruleset: HashMap<String, Value>,
    /// Per-turn response budget in milliseconds
    #[serde(default)]
    pub timeout: u32,
    #[serde(default)]
    pub source: Option<String>,
}

/// Board state including dimensions, food, snakes, and hazards
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Board {
    pub height: i32,
    pub width: i32,
    pub food: Vec<Coord>,
    pub snakes: Vec<Battlesnake>,
    #[serde(default)]
    pub hazards: Vec<Coord>,
}

/// Snake representation with all state information
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Battlesnake {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub health: i32,
    pub body: Vec<Coord>,
    pub head: Coord,
    pub length: i32,
    /// Milliseconds already consumed, reported as a string by the engine
    #[serde(default)]
    pub latency: String,
    #[serde(default)]
    pub shout: Option<String>,
}

impl Battlesnake {
    /// Parses the reported latency, treating anything unparsable as zero
    pub fn latency_ms(&self) -> u64 {
        self.latency.trim().parse().unwrap_or(0)
    }
}

/// 2D coordinate on the board
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

/// Complete game state received from the API
#[derive(Deserialize, Serialize, Debug)]
pub struct GameState {
    pub game: Game,
    pub turn: i32,
    pub board: Board,
    pub you: Battlesnake,
}
