// Integration tests for the alpha-beta search

use std::time::Duration;

use minimax_snake::bot::Bot;
use minimax_snake::config::{Config, SearchConfig};
use minimax_snake::evaluator::Evaluator;
use minimax_snake::grid::{Direction, Entity, EntityId, GridState, Point};
use minimax_snake::search::{Deadline, SearchEngine};

const A: EntityId = EntityId(0);
const B: EntityId = EntityId(1);

fn entity(id: EntityId, body: &[(i32, i32)]) -> Entity {
    hungry(id, body, 100)
}

fn hungry(id: EntityId, body: &[(i32, i32)], health: i32) -> Entity {
    Entity::new(id, body.iter().map(|&(x, y)| Point::new(x, y)).collect(), health)
}

fn grid(size: i32, food: &[(i32, i32)], entities: Vec<Entity>) -> GridState {
    let food: Vec<Point> = food.iter().map(|&(x, y)| Point::new(x, y)).collect();
    GridState::new(size, size, &food, entities).unwrap()
}

fn generous() -> Deadline {
    Deadline::after(Duration::from_secs(10))
}

/// Single snake two cells left of a food item
fn food_chase() -> GridState {
    food_chase_with_health(100)
}

fn food_chase_with_health(health: i32) -> GridState {
    grid(7, &[(5, 3)], vec![hungry(A, &[(3, 3), (2, 3), (1, 3)], health)])
}

#[test]
fn test_depth_zero_is_the_static_score() {
    let config = Config::default_hardcoded();
    let evaluator = Evaluator::new(config.evaluation.clone());
    let root = food_chase();

    let mut engine = SearchEngine::new(&evaluator, &config.search, A, generous());
    let (value, best) = engine.search_root(&root, 0, Direction::all().to_vec());

    assert_eq!(value, evaluator.score(Some(&root), A, A, root.turn()));
    assert_eq!(best, None);
}

#[test]
fn test_pruning_matches_plain_minimax() {
    let config = Config::default_hardcoded();
    let evaluator = Evaluator::new(config.evaluation.clone());
    let root = grid(
        3,
        &[(1, 1)],
        vec![entity(A, &[(0, 0), (0, 1)]), entity(B, &[(2, 2), (2, 1)])],
    );

    for depth in 1..=4 {
        let mut plain = SearchEngine::new(&evaluator, &config.search, A, generous());
        let expected = plain.minimax_value(Some(&root), depth, A, root.turn());

        let mut pruned = SearchEngine::new(&evaluator, &config.search, A, generous());
        let actual = pruned.alpha_beta_value(&root, depth, A);

        let mut at_root = SearchEngine::new(&evaluator, &config.search, A, generous());
        let (root_value, _) = at_root.search_root(&root, depth, Direction::all().to_vec());

        assert_eq!(actual, expected, "alpha-beta diverged at depth {}", depth);
        assert_eq!(root_value, expected, "root search diverged at depth {}", depth);
    }
}

#[test]
fn test_heads_for_food() {
    let config = Config::default_hardcoded();
    let evaluator = Evaluator::new(config.evaluation.clone());
    // Three health left: only the direct route eats before starving
    let root = food_chase_with_health(3);

    let mut engine = SearchEngine::new(&evaluator, &config.search, A, generous());
    let outcome = engine.search(&root);

    assert_eq!(outcome.best_move, Some(Direction::Right));
    assert_eq!(outcome.depth, config.search.max_depth);
    assert!(!outcome.timed_out);
    assert!(outcome.nodes > 0);
}

#[test]
fn test_avoids_losing_head_to_head() {
    let config = Config::default_hardcoded();
    let evaluator = Evaluator::new(config.evaluation.clone());
    // Moving right would put A's head next to the longer B
    let root = grid(
        7,
        &[],
        vec![
            entity(A, &[(2, 3), (1, 3)]),
            entity(B, &[(4, 3), (5, 3), (6, 3), (6, 4), (6, 5)]),
        ],
    );

    let mut engine = SearchEngine::new(&evaluator, &config.search, A, generous());
    let outcome = engine.search(&root);

    assert!(outcome.best_move.is_some());
    assert_ne!(outcome.best_move, Some(Direction::Right));
    assert!(outcome.value > f64::NEG_INFINITY);
}

#[test]
fn test_ties_follow_direction_order_whatever_the_search_order() {
    let config = Config::default_hardcoded();
    let evaluator = Evaluator::new(config.evaluation.clone());
    let root = grid(7, &[], vec![entity(A, &[(3, 3)])]);

    let mut engine = SearchEngine::new(&evaluator, &config.search, A, generous());
    let (_, best) = engine.search_root(&root, 1, Direction::all().to_vec());
    assert_eq!(best, Some(Direction::Up));

    let order = vec![Direction::Right, Direction::Left, Direction::Down, Direction::Up];
    let (_, best) = engine.search_root(&root, 1, order);
    assert_eq!(best, Some(Direction::Up));

    let order = vec![Direction::Left, Direction::Right, Direction::Down];
    let (_, best) = engine.search_root(&root, 1, order);
    assert_eq!(best, Some(Direction::Down));
}

#[test]
fn test_deepening_picks_the_same_move_as_a_fixed_order_search() {
    let config = Config::default_hardcoded();
    let evaluator = Evaluator::new(config.evaluation.clone());
    assert!(config.search.iterative_deepening && config.search.pv_ordering);
    let depth = config.search.max_depth;

    let foods = [(3, 3), (0, 0), (6, 6), (5, 1)];
    for x in 0..7 {
        for y in 0..5 {
            for food in foods {
                let body = [(x, y), (x, y + 1), (x, y + 2)];
                if body.contains(&food) {
                    continue;
                }
                let root = grid(7, &[food], vec![entity(A, &body)]);

                let mut deepening = SearchEngine::new(&evaluator, &config.search, A, generous());
                let outcome = deepening.search(&root);

                let mut fixed = SearchEngine::new(&evaluator, &config.search, A, generous());
                let (value, best) = fixed.search_root(&root, depth, Direction::all().to_vec());

                assert_eq!(outcome.depth, depth);
                assert_eq!(
                    outcome.best_move, best,
                    "head {:?} food {:?}: deepening and fixed order disagree",
                    body[0], food
                );
                assert_eq!(outcome.value, value);
            }
        }
    }
}

#[test]
fn test_doomed_position_has_no_best_move() {
    let config = Config::default_hardcoded();
    let evaluator = Evaluator::new(config.evaluation.clone());
    // Walls above and left, own body right, B's body below
    let root = grid(
        3,
        &[],
        vec![
            entity(A, &[(0, 0), (1, 0), (2, 0)]),
            entity(B, &[(1, 1), (0, 1), (0, 2)]),
        ],
    );

    let mut engine = SearchEngine::new(&evaluator, &config.search, A, generous());
    let outcome = engine.search(&root);

    assert_eq!(outcome.best_move, None);
    assert_eq!(outcome.value, f64::NEG_INFINITY);
    assert_eq!(outcome.depth, 1);
    assert_eq!(Bot::fallback_move(&root, A), Direction::Down);
}

#[test]
fn test_expired_deadline_still_answers() {
    let config = Config::default_hardcoded();
    let evaluator = Evaluator::new(config.evaluation.clone());
    let root = food_chase();

    let mut engine = SearchEngine::new(
        &evaluator,
        &config.search,
        A,
        Deadline::after(Duration::ZERO),
    );
    let outcome = engine.search(&root);

    assert_eq!(outcome.best_move, Some(Direction::Right));
    assert!(outcome.timed_out);
    assert_eq!(outcome.depth, 1);
}

#[test]
fn test_fixed_depth_without_deepening() {
    let config = Config::default_hardcoded();
    let evaluator = Evaluator::new(config.evaluation.clone());
    let search = SearchConfig {
        max_depth: 2,
        iterative_deepening: false,
        pv_ordering: false,
    };

    let mut engine = SearchEngine::new(&evaluator, &search, A, generous());
    let outcome = engine.search(&food_chase());

    assert_eq!(outcome.best_move, Some(Direction::Right));
    assert_eq!(outcome.depth, 2);
}

#[test]
fn test_search_leaves_the_root_untouched() {
    let config = Config::default_hardcoded();
    let evaluator = Evaluator::new(config.evaluation.clone());
    let root = grid(
        7,
        &[(5, 3)],
        vec![
            entity(A, &[(3, 3), (2, 3), (1, 3)]),
            entity(B, &[(5, 5), (5, 6), (4, 6)]),
        ],
    );
    let before = root.clone();

    let mut engine = SearchEngine::new(&evaluator, &config.search, A, generous());
    engine.search(&root);

    assert_eq!(root, before);
}
