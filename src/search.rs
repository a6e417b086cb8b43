// Time-bounded alpha-beta search over interleaved snake plies
//
// Every entity moves in turn (round-robin over the live list). Plies where the
// main entity moves maximise, every opponent ply minimises. The deadline is
// passed in explicitly and polled on entry to each node; once it has passed,
// nodes are scored statically instead of expanded, so the search always
// unwinds to a root answer.

use log::debug;
use std::time::{Duration, Instant};

use crate::config::{SearchConfig, TimingConfig};
use crate::evaluator::Evaluator;
use crate::grid::{Direction, EntityId, GridState};
use crate::simulator;

/// Wall-clock instant after which the search stops expanding
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// now + (budget - latency) * fraction - margin
    pub fn from_budget(budget_ms: u64, latency_ms: u64, timing: &TimingConfig) -> Self {
        Deadline::after(Duration::from_millis(
            timing.search_budget_ms(budget_ms, latency_ms),
        ))
    }

    pub fn after(duration: Duration) -> Self {
        Deadline {
            at: Instant::now() + duration,
        }
    }

    pub fn has_passed(&self) -> bool {
        Instant::now() >= self.at
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }
}

/// Result of a root search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// None when every root move scores negative infinity
    pub best_move: Option<Direction>,
    pub value: f64,
    /// Deepest iteration whose result was kept
    pub depth: u8,
    pub nodes: u64,
    pub cutoffs: u64,
    pub timed_out: bool,
}

/// Alpha-beta search for one turn. Holds only per-search counters.
pub struct SearchEngine<'a> {
    evaluator: &'a Evaluator,
    config: &'a SearchConfig,
    main: EntityId,
    deadline: Deadline,
    nodes: u64,
    cutoffs: u64,
    timed_out: bool,
}

impl<'a> SearchEngine<'a> {
    pub fn new(
        evaluator: &'a Evaluator,
        config: &'a SearchConfig,
        main: EntityId,
        deadline: Deadline,
    ) -> Self {
        SearchEngine {
            evaluator,
            config,
            main,
            deadline,
            nodes: 0,
            cutoffs: 0,
            timed_out: false,
        }
    }

    /// Picks the best move for the main entity from `root`.
    ///
    /// With iterative deepening enabled, depths 1..=max_depth are searched in
    /// turn; an iteration interrupted by the deadline is discarded unless it is
    /// the first one. Otherwise a single search at max_depth is run.
    pub fn search(&mut self, root: &GridState) -> SearchOutcome {
        let turn = root.turn();
        let mut outcome = SearchOutcome {
            best_move: None,
            value: self.evaluator.score(Some(root), self.main, self.main, turn),
            depth: 0,
            nodes: 0,
            cutoffs: 0,
            timed_out: false,
        };

        let max_depth = self.config.max_depth;
        let first_depth = if self.config.iterative_deepening {
            1
        } else {
            max_depth
        };

        if max_depth > 0 && root.is_alive(self.main) {
            for depth in first_depth..=max_depth {
                if depth > first_depth && self.deadline.has_passed() {
                    outcome.timed_out = true;
                    break;
                }

                let order = self.root_order(outcome.best_move);
                self.timed_out = false;
                let (value, best_move) = self.search_root(root, depth, order);

                if self.timed_out && depth > first_depth {
                    debug!("Depth {} interrupted by deadline, keeping depth {}", depth, outcome.depth);
                    outcome.timed_out = true;
                    break;
                }

                outcome.value = value;
                outcome.best_move = best_move;
                outcome.depth = depth;
                outcome.timed_out |= self.timed_out;

                debug!(
                    "Depth {}: best {:?} value {} ({} nodes, {} cutoffs)",
                    depth, best_move, value, self.nodes, self.cutoffs
                );

                // Proven win or loss, deeper search cannot change it
                if value.is_infinite() || self.timed_out {
                    break;
                }
            }
        }

        outcome.nodes = self.nodes;
        outcome.cutoffs = self.cutoffs;
        outcome
    }

    /// Root move order: the previous iteration's best first when enabled.
    /// Only affects pruning; ties are still settled by `Direction::all()`.
    fn root_order(&self, previous_best: Option<Direction>) -> Vec<Direction> {
        let mut order = Direction::all().to_vec();
        if let (true, Some(best)) = (self.config.pv_ordering, previous_best) {
            order.retain(|&d| d != best);
            order.insert(0, best);
        }
        order
    }

    /// Root maximisation that also tracks the move. Whatever order the moves
    /// are searched in, ties go to the move that comes first in
    /// `Direction::all()`; a move is reported only if it beats negative infinity.
    pub fn search_root(
        &mut self,
        root: &GridState,
        depth: u8,
        order: Vec<Direction>,
    ) -> (f64, Option<Direction>) {
        self.nodes += 1;
        let turn = root.turn();
        if depth == 0 || !root.is_alive(self.main) {
            return (
                self.evaluator.score(Some(root), self.main, self.main, turn),
                None,
            );
        }

        let mut alpha = f64::NEG_INFINITY;
        let beta = f64::INFINITY;
        let mut best_value = f64::NEG_INFINITY;
        let mut best_move = None;

        for dir in order {
            let child = simulator::apply(root, self.main, dir);
            let mut value = self.alpha_beta(child.as_ref(), depth - 1, self.main, turn + 1, alpha, beta);

            let ranks_earlier = best_move.is_some_and(|best| tie_rank(dir) < tie_rank(best));
            if ranks_earlier && value == best_value {
                // A fail-low result equal to alpha is only an upper bound
                value = self.alpha_beta(
                    child.as_ref(),
                    depth - 1,
                    self.main,
                    turn + 1,
                    f64::NEG_INFINITY,
                    beta,
                );
            }

            if value > best_value || (ranks_earlier && value == best_value) {
                best_value = value;
                best_move = Some(dir);
            }
            alpha = alpha.max(best_value);
        }

        (best_value, best_move)
    }

    /// Scoring recursion. `previous` is the entity whose move produced `state`.
    fn alpha_beta(
        &mut self,
        state: Option<&GridState>,
        depth: u8,
        previous: EntityId,
        turn: u32,
        mut alpha: f64,
        mut beta: f64,
    ) -> f64 {
        self.nodes += 1;

        let Some(state) = state else {
            return self.evaluator.score(None, self.main, previous, turn);
        };
        if let Some(value) = self.terminal_value(state, depth, previous, turn) {
            return value;
        }
        let Some(mover) = state.to_move() else {
            return self.evaluator.score(Some(state), self.main, previous, turn);
        };

        if mover == self.main {
            let mut best = f64::NEG_INFINITY;
            for dir in Direction::all() {
                let child = simulator::apply(state, mover, dir);
                let value = self.alpha_beta(child.as_ref(), depth - 1, mover, turn + 1, alpha, beta);
                best = best.max(value);
                alpha = alpha.max(best);
                if alpha >= beta {
                    self.cutoffs += 1;
                    break;
                }
            }
            best
        } else {
            let mut best = f64::INFINITY;
            for dir in Direction::all() {
                let child = simulator::apply(state, mover, dir);
                let value = self.alpha_beta(child.as_ref(), depth - 1, mover, turn + 1, alpha, beta);
                best = best.min(value);
                beta = beta.min(best);
                if beta <= alpha {
                    self.cutoffs += 1;
                    break;
                }
            }
            best
        }
    }

    /// Same recursion without pruning; used to check that pruning never
    /// changes the root value
    pub fn minimax_value(&mut self, state: Option<&GridState>, depth: u8, previous: EntityId, turn: u32) -> f64 {
        self.nodes += 1;

        let Some(state) = state else {
            return self.evaluator.score(None, self.main, previous, turn);
        };
        if let Some(value) = self.terminal_value(state, depth, previous, turn) {
            return value;
        }
        let Some(mover) = state.to_move() else {
            return self.evaluator.score(Some(state), self.main, previous, turn);
        };

        let values = Direction::all().map(|dir| {
            let child = simulator::apply(state, mover, dir);
            self.minimax_value(child.as_ref(), depth - 1, mover, turn + 1)
        });
        if mover == self.main {
            values.into_iter().fold(f64::NEG_INFINITY, f64::max)
        } else {
            values.into_iter().fold(f64::INFINITY, f64::min)
        }
    }

    /// Same value as the root of `search_root`, computed through the pruning recursion
    pub fn alpha_beta_value(&mut self, state: &GridState, depth: u8, previous: EntityId) -> f64 {
        self.alpha_beta(
            Some(state),
            depth,
            previous,
            state.turn(),
            f64::NEG_INFINITY,
            f64::INFINITY,
        )
    }

    /// Static score when the node must not be expanded
    fn terminal_value(&mut self, state: &GridState, depth: u8, previous: EntityId, turn: u32) -> Option<f64> {
        let expired = self.deadline.has_passed();
        if expired {
            self.timed_out = true;
        }
        let game_over = !state.is_alive(previous) || !state.is_alive(self.main);

        (depth == 0 || expired || game_over)
            .then(|| self.evaluator.score(Some(state), self.main, previous, turn))
    }
}

/// Position in the fixed tie-break order
fn tie_rank(dir: Direction) -> usize {
    Direction::all()
        .iter()
        .position(|&d| d == dir)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_deadline_from_budget() {
        let config = Config::default_hardcoded();
        let deadline = Deadline::from_budget(500, 0, &config.timing);
        assert!(!deadline.has_passed());
        assert!(deadline.remaining() <= Duration::from_millis(340));
    }

    #[test]
    fn test_exhausted_budget_is_already_passed() {
        let config = Config::default_hardcoded();
        let deadline = Deadline::from_budget(100, 500, &config.timing);
        assert!(deadline.has_passed());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }
}
