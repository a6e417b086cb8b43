// Move simulation
//
// apply() advances a snapshot by one ply: one entity moves and every rule
// consequence (growth, starvation, collisions, eliminations) is resolved on a
// fresh copy. The input snapshot is never modified.

use std::cmp::Ordering;

use crate::grid::{Cell, Direction, Entity, EntityId, GridState, Point};

/// Health after eating, and the cap for wire health values
pub const MAX_HEALTH: i32 = 100;

/// Health lost on every move that does not eat
pub const HEALTH_LOSS_PER_MOVE: i32 = 1;

/// Moves `id` one cell in `dir` and returns the resulting snapshot.
/// Returns `None` when `id` is no longer alive in `state`.
pub fn apply(state: &GridState, id: EntityId, dir: Direction) -> Option<GridState> {
    let mover_index = state.position(id)?;
    let mover = &state.entities()[mover_index];
    let dest = mover.head().step(dir);

    let mut next = state.clone();
    next.advance_turn();

    match state.cell(dest) {
        // Off the grid
        None => next.eliminate(id),
        Some(Cell::Empty) => advance(&mut next, id, dest, false),
        Some(Cell::Food) => {
            if food_is_contested(state, mover, dest) {
                next.eliminate(id);
            } else {
                advance(&mut next, id, dest, true);
            }
        }
        Some(Cell::Body(owner)) => {
            let chasing_own_tail = owner == id && dest == mover.tail() && !mover.is_growing();
            if chasing_own_tail {
                advance(&mut next, id, dest, false);
            } else {
                next.eliminate(id);
            }
        }
        Some(Cell::Head(owner)) if owner != id => {
            resolve_head_collision(&mut next, id, owner, dest);
        }
        Some(Cell::Head(_)) => next.eliminate(id),
    }

    hand_off_turn(&mut next, state, id, mover_index);
    Some(next)
}

/// Shifts the body one cell toward `dest`; eating duplicates the new tail
fn advance(state: &mut GridState, id: EntityId, dest: Point, ate: bool) {
    let Some(old) = state.entity(id).cloned() else {
        return;
    };
    state.erase(&old);

    let mut moved = old;
    moved.body.pop();
    moved.body.insert(0, dest);
    if ate {
        moved.health = MAX_HEALTH;
        let tail = moved.tail();
        moved.body.push(tail);
    } else {
        moved.health -= HEALTH_LOSS_PER_MOVE;
    }

    state.paint(&moved);
    let starved = moved.health <= 0;
    if let Some(slot) = state.entity_mut(id) {
        *slot = moved;
    }
    if starved {
        state.eliminate(id);
    }
}

/// Strictly shorter snake dies; equal lengths kill both
fn resolve_head_collision(state: &mut GridState, mover: EntityId, other: EntityId, dest: Point) {
    let mover_len = state.entity(mover).map_or(0, Entity::len);
    let other_len = state.entity(other).map_or(0, Entity::len);

    match mover_len.cmp(&other_len) {
        Ordering::Less => state.eliminate(mover),
        Ordering::Greater => {
            state.eliminate(other);
            advance(state, mover, dest, false);
        }
        Ordering::Equal => {
            state.eliminate(mover);
            state.eliminate(other);
        }
    }
}

/// A food cell is lost when another head at least as long already touches it
fn food_is_contested(state: &GridState, mover: &Entity, food: Point) -> bool {
    food.neighbors().iter().any(|&p| match state.cell(p) {
        Some(Cell::Head(owner)) if owner != mover.id => state
            .entity(owner)
            .is_some_and(|rival| rival.len() >= mover.len()),
        _ => false,
    })
}

/// Points the snapshot at the next live entity after the mover, wrapping.
/// Indices are recomputed against the post-move list.
fn hand_off_turn(next: &mut GridState, before: &GridState, mover: EntityId, mover_index: usize) {
    let survivors_before = before.entities()[..mover_index]
        .iter()
        .filter(|e| next.is_alive(e.id))
        .count();

    let live = next.entities();
    let successor = if live.is_empty() {
        None
    } else {
        let slot = if next.is_alive(mover) {
            survivors_before + 1
        } else {
            survivors_before
        };
        Some(live[slot % live.len()].id)
    };

    next.set_to_move(successor);
}
