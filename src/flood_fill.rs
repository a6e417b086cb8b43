// Reachable-space estimation
//
// Breadth-first fill from an entity's head over 4-connected passable cells.
// Used by the evaluator as a "can this snake avoid getting boxed in" signal.

use std::collections::VecDeque;

use crate::grid::{Cell, EntityId, GridState};

/// Result of a fill from one head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reach {
    /// Passable cells visited, not counting the head itself
    pub count: usize,
    /// Whether the entity's own tail cell was reached
    pub tail_reachable: bool,
}

/// Counts the cells reachable from `id`'s head.
///
/// Empty and food cells are passable. The entity's own tail is passable unless
/// it just grew (duplicated tail), since it will not vacate this ply. Every
/// other segment and head blocks. An absent entity reaches nothing.
pub fn reachable(state: &GridState, id: EntityId) -> Reach {
    let Some(entity) = state.entity(id) else {
        return Reach::default();
    };

    let head = entity.head();
    let tail = entity.tail();
    let tail_passable = entity.len() > 1 && !entity.is_growing();

    let passable = |p| match state.cell(p) {
        Some(Cell::Empty) | Some(Cell::Food) => true,
        Some(Cell::Body(owner)) => tail_passable && owner == id && p == tail,
        _ => false,
    };

    let mut visited = vec![false; state.cell_count()];
    let mut queue = VecDeque::new();
    let mut reach = Reach::default();

    if let Some(start) = state.index(head) {
        visited[start] = true;
        queue.push_back(head);
    }

    while let Some(current) = queue.pop_front() {
        for next in current.neighbors() {
            let Some(idx) = state.index(next) else {
                continue;
            };
            if visited[idx] || !passable(next) {
                continue;
            }
            visited[idx] = true;
            reach.count += 1;
            if next == tail {
                reach.tail_reachable = true;
            }
            queue.push_back(next);
        }
    }

    reach
}
