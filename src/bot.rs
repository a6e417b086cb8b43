// Welcome to
// __________         __    __  .__                               __
// \______   \_____ _/  |__/  |_|  |   ____   ______ ____ _____  |  | __ ____
//  |    |  _/\__  \\   __\   __\  | _/ __ \ /  ___//    \\__  \ |  |/ // __ \
//  |    |   \ / __ \|  |  |  | |  |_\  ___/ \___ \|   |  \/ __ \|    <\  ___/
//  |________/(______/__|  |__| |____/\_____>______>___|__(______/__|__\\_____>
//
// Per-turn orchestration: build the snapshot, derive the deadline, run the
// alpha-beta search and fall back to a survival move when the search finds
// nothing better than certain death.

use log::{error, info, warn};
use serde_json::{json, Value};
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::evaluator::Evaluator;
use crate::flood_fill;
use crate::grid::{Direction, EntityId, GridState};
use crate::search::{Deadline, SearchEngine, SearchOutcome};
use crate::simulator;
use crate::types::{Battlesnake, Board, Game};

/// Move chosen for one turn, with how it was reached
#[derive(Debug, Clone)]
pub struct MoveDecision {
    pub direction: Direction,
    /// Search result; None when the snapshot could not be built
    pub outcome: Option<SearchOutcome>,
    pub used_fallback: bool,
    pub elapsed_ms: u128,
}

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    evaluator: Evaluator,
    logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with debug logging disabled
    pub fn new(config: Config) -> Self {
        Bot::with_logger(config, DebugLogger::disabled())
    }

    pub fn with_logger(config: Config, logger: DebugLogger) -> Self {
        let evaluator = Evaluator::new(config.evaluation.clone());
        Bot {
            config,
            evaluator,
            logger,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "apiversion": "1",
            "author": "minimax-snake",
            "color": "#3E8E7E",
            "head": "default",
            "tail": "default",
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: &i32, _board: &Board, _you: &Battlesnake) {
        info!("GAME START {}", game.id);
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: &i32, _board: &Board, _you: &Battlesnake) {
        info!("GAME OVER {} after {} turns", game.id, turn);
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// The search is CPU-bound and synchronous, so it runs on tokio's blocking pool.
    pub async fn get_move(&self, game: &Game, turn: &i32, board: &Board, you: &Battlesnake) -> Value {
        let turn = *turn;
        let budget_ms = self.turn_budget_ms(game);
        let latency_ms = you.latency_ms();
        let config = self.config.clone();
        let evaluator = self.evaluator.clone();
        let task_board = board.clone();
        let task_you = you.clone();

        let decision = tokio::task::spawn_blocking(move || {
            Bot::decide(&config, &evaluator, turn, &task_board, &task_you, budget_ms, latency_ms)
        })
        .await;

        let direction = match decision {
            Ok(decision) => {
                self.logger.log_move(turn, &you.id, board.clone(), &decision);
                decision.direction
            }
            Err(e) => {
                error!("Turn {}: search task failed ({}), moving up", turn, e);
                Direction::Up
            }
        };

        json!({ "move": direction.as_str() })
    }

    /// Synchronous move computation shared by the server and the replay tool
    pub fn compute_move(&self, game: &Game, turn: i32, board: &Board, you: &Battlesnake) -> MoveDecision {
        Bot::decide(
            &self.config,
            &self.evaluator,
            turn,
            board,
            you,
            self.turn_budget_ms(game),
            you.latency_ms(),
        )
    }

    fn turn_budget_ms(&self, game: &Game) -> u64 {
        if game.timeout > 0 {
            game.timeout as u64
        } else {
            self.config.timing.response_time_budget_ms
        }
    }

    fn decide(
        config: &Config,
        evaluator: &Evaluator,
        turn: i32,
        board: &Board,
        you: &Battlesnake,
        budget_ms: u64,
        latency_ms: u64,
    ) -> MoveDecision {
        let start_time = Instant::now();
        let deadline = Deadline::from_budget(budget_ms, latency_ms, &config.timing);

        info!("Turn {}: Computing move ({}ms available)", turn, deadline.remaining().as_millis());

        let (root, main) = match GridState::from_board(board, &you.id) {
            Ok((root, main)) => (root.with_turn(turn.max(0) as u32), main),
            Err(e) => {
                warn!("Turn {}: cannot build snapshot ({}), moving up", turn, e);
                return MoveDecision {
                    direction: Direction::Up,
                    outcome: None,
                    used_fallback: true,
                    elapsed_ms: start_time.elapsed().as_millis(),
                };
            }
        };

        let mut engine = SearchEngine::new(evaluator, &config.search, main, deadline);
        let outcome = engine.search(&root);

        let (direction, used_fallback) = match outcome.best_move {
            Some(direction) => (direction, false),
            None => {
                let direction = Bot::fallback_move(&root, main);
                info!("Turn {}: no move beats certain loss, falling back to {}", turn, direction);
                (direction, true)
            }
        };

        let elapsed_ms = start_time.elapsed().as_millis();
        info!(
            "Turn {}: Chose {} (score: {}, depth: {}, nodes: {}, cutoffs: {}, time: {}ms{})",
            turn,
            direction.as_str(),
            outcome.value,
            outcome.depth,
            outcome.nodes,
            outcome.cutoffs,
            elapsed_ms,
            if outcome.timed_out { ", timed out" } else { "" }
        );

        MoveDecision {
            direction,
            outcome: Some(outcome),
            used_fallback,
            elapsed_ms,
        }
    }

    /// Survival move for when the search gives up:
    /// 1. the direction that keeps us alive one ply with the most room
    /// 2. otherwise the first direction that stays on the board
    /// 3. otherwise up
    pub fn fallback_move(state: &GridState, main: EntityId) -> Direction {
        let mut best: Option<(Direction, usize)> = None;
        for dir in Direction::all() {
            let Some(next) = simulator::apply(state, main, dir) else {
                continue;
            };
            if !next.is_alive(main) {
                continue;
            }
            let room = flood_fill::reachable(&next, main).count;
            if best.map_or(true, |(_, most)| room > most) {
                best = Some((dir, room));
            }
        }
        if let Some((dir, _)) = best {
            return dir;
        }

        state
            .entity(main)
            .and_then(|me| {
                Direction::all()
                    .into_iter()
                    .find(|&dir| state.in_bounds(me.head().step(dir)))
            })
            .unwrap_or(Direction::Up)
    }
}
