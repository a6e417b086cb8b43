// Static evaluation of a simulated snapshot
//
// Terms are computed for the entity whose move produced the snapshot (the
// subject). The total is negated when the subject is an opponent, so the
// returned score always reads "higher is better for the main entity".

use crate::config::EvaluationConfig;
use crate::flood_fill;
use crate::grid::{Entity, EntityId, GridState, Point};

/// Evaluator holding the configured weights; scoring itself is pure
#[derive(Debug, Clone)]
pub struct Evaluator {
    weights: EvaluationConfig,
}

impl Evaluator {
    pub fn new(weights: EvaluationConfig) -> Self {
        Evaluator { weights }
    }

    /// Scores `state` for `main` after `moving` made the last move.
    ///
    /// * missing state or dead main entity: negative infinity
    /// * an opponent that eliminated itself on its move: positive infinity
    pub fn score(
        &self,
        state: Option<&GridState>,
        main: EntityId,
        moving: EntityId,
        turn: u32,
    ) -> f64 {
        let Some(state) = state else {
            return f64::NEG_INFINITY;
        };
        if !state.is_alive(main) {
            return f64::NEG_INFINITY;
        }
        let Some(subject) = state.entity(moving) else {
            return f64::INFINITY;
        };

        let sign = if moving == main { 1.0 } else { -1.0 };
        sign * self.subject_score(state, subject, turn)
    }

    /// Unsigned score from the subject's own point of view
    fn subject_score(&self, state: &GridState, subject: &Entity, turn: u32) -> f64 {
        let w = &self.weights;
        let length = subject.len() as f64;

        // Entrapment short-circuits everything else
        let reach = flood_fill::reachable(state, subject.id);
        if !reach.tail_reachable {
            let space = reach.count as f64;
            if space < length * w.trap_severe_fraction {
                return w.trap_severe_score;
            }
            if space < length * w.trap_fraction {
                return w.trap_score;
            }
        }

        let mut score = 0.0;

        score += self.health_term(subject);
        score += w.length_weight * length;
        score += w.space_weight * reach.count as f64;
        score += self.food_term(state, subject.head());

        let (pins_opponent, pinned) = edge_pins(state, subject);
        if pins_opponent {
            score += w.edge_trap_bonus;
        } else if state.is_edge(subject.head()) {
            score += w.edge_penalty;
        }
        if pinned {
            score += w.edge_trapped_penalty;
        }

        score += self.head_to_head_term(state, subject);
        score += w.turn_weight * turn as f64;

        score
    }

    fn health_term(&self, subject: &Entity) -> f64 {
        let w = &self.weights;
        if subject.health < w.health_critical_threshold {
            w.health_critical_penalty
        } else if subject.health < w.health_low_threshold {
            w.health_low_penalty
        } else {
            0.0
        }
    }

    fn food_term(&self, state: &GridState, head: Point) -> f64 {
        state
            .food()
            .map(|food| head.manhattan(food))
            .min()
            .map_or(0.0, |distance| self.weights.food_weight / distance.max(1) as f64)
    }

    /// Threat bonus/penalty for heads within striking distance, plus a
    /// size-scaled bonus for closing on the nearest smaller snake
    fn head_to_head_term(&self, state: &GridState, subject: &Entity) -> f64 {
        let w = &self.weights;
        let head = subject.head();
        let mut score = 0.0;
        let mut nearest_weaker: Option<(i32, usize)> = None;

        for other in state.entities().iter().filter(|e| e.id != subject.id) {
            let distance = head.manhattan(other.head());

            if distance <= w.head_to_head_distance {
                if subject.len() > other.len() {
                    score += w.head_to_head_bonus;
                } else if subject.len() < other.len() {
                    score += w.head_to_head_penalty;
                }
            }

            if other.len() < subject.len()
                && nearest_weaker.map_or(true, |(best, _)| distance < best)
            {
                nearest_weaker = Some((distance, other.len()));
            }
        }

        if let Some((distance, other_len)) = nearest_weaker {
            if distance <= w.hunt_distance {
                score += w.hunt_weight * (subject.len() - other_len) as f64;
            }
        }

        score
    }
}

/// Inward unit vector for a head on the outer ring
fn inward(state: &GridState, p: Point) -> Option<(i32, i32)> {
    if p.x == 0 {
        Some((1, 0))
    } else if p.x == state.width() - 1 {
        Some((-1, 0))
    } else if p.y == 0 {
        Some((0, 1))
    } else if p.y == state.height() - 1 {
        Some((0, -1))
    } else {
        None
    }
}

/// True when `attacker`'s head holds `victim` against the wall: the victim runs
/// along the outer ring and the attacker sits one cell inward, level or ahead
fn pins(state: &GridState, attacker: &Entity, victim: &Entity) -> bool {
    let head = victim.head();
    let (Some((ix, iy)), Some((hx, hy))) = (inward(state, head), victim.heading()) else {
        return false;
    };
    if ix * hx + iy * hy != 0 {
        return false;
    }

    let beside = Point::new(head.x + ix, head.y + iy);
    let ahead = Point::new(beside.x + hx, beside.y + hy);
    let attacker_head = attacker.head();
    attacker_head == beside || attacker_head == ahead
}

/// (subject pins some opponent, some opponent pins subject)
fn edge_pins(state: &GridState, subject: &Entity) -> (bool, bool) {
    state
        .entities()
        .iter()
        .filter(|e| e.id != subject.id)
        .fold((false, false), |(pinning, pinned), other| {
            (
                pinning || pins(state, subject, other),
                pinned || pins(state, other, subject),
            )
        })
}
