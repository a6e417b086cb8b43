// Board snapshot used by the search
//
// A GridState is a self-contained value: the simulator clones it and mutates
// the clone, so ancestors on the search path are never touched. The grid uses
// a top-left origin (y grows downward).

use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;
use crate::types::{Board, Coord};

/// Represents the four possible movement directions for a Battlesnake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all directions in search order; ties are broken by this order
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Right, Direction::Left]
    }

    /// Converts direction to string representation for API response
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Grid offset in top-left coordinates
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(EngineError::InvalidDirection(s.to_string())),
        }
    }
}

/// Cell position in grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    pub fn step(&self, dir: Direction) -> Point {
        let (dx, dy) = dir.offset();
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(&self, other: Point) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn neighbors(&self) -> [Point; 4] {
        Direction::all().map(|dir| self.step(dir))
    }
}

/// Strongly typed snake identifier, assigned in wire order when a snapshot is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u8);

/// Contents of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Food,
    Head(EntityId),
    Body(EntityId),
}

impl Cell {
    pub fn owner(&self) -> Option<EntityId> {
        match self {
            Cell::Head(id) | Cell::Body(id) => Some(*id),
            Cell::Empty | Cell::Food => None,
        }
    }
}

/// A live snake: body runs head to tail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: EntityId,
    pub body: Vec<Point>,
    pub health: i32,
}

impl Entity {
    pub fn new(id: EntityId, body: Vec<Point>, health: i32) -> Self {
        Entity { id, body, health }
    }

    pub fn head(&self) -> Point {
        self.body[0]
    }

    pub fn tail(&self) -> Point {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// True right after eating: the duplicated tail stays put for one more ply
    pub fn is_growing(&self) -> bool {
        let n = self.body.len();
        n >= 2 && self.body[n - 1] == self.body[n - 2]
    }

    /// Direction of travel, when the neck is distinct from the head
    pub fn heading(&self) -> Option<(i32, i32)> {
        let neck = *self.body.get(1)?;
        let head = self.head();
        (neck != head).then(|| (head.x - neck.x, head.y - neck.y))
    }
}

/// Immutable-per-ply board snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct GridState {
    width: i32,
    height: i32,
    turn: u32,
    cells: Vec<Cell>,
    entities: Vec<Entity>,
    to_move: Option<EntityId>,
}

impl GridState {
    /// Builds a snapshot in grid coordinates. The first entity moves first.
    pub fn new(
        width: i32,
        height: i32,
        food: &[Point],
        entities: Vec<Entity>,
    ) -> Result<Self, EngineError> {
        if width <= 0 || height <= 0 {
            return Err(EngineError::InvalidBoard(format!(
                "dimensions {}x{} must be positive",
                width, height
            )));
        }
        let cell_count = width.checked_mul(height).ok_or_else(|| {
            EngineError::InvalidBoard(format!("dimensions {}x{} are too large", width, height))
        })?;

        let mut state = GridState {
            width,
            height,
            turn: 0,
            cells: vec![Cell::Empty; cell_count as usize],
            to_move: entities.first().map(|e| e.id),
            entities: Vec::new(),
        };

        for &p in food {
            let idx = state
                .index(p)
                .ok_or_else(|| EngineError::InvalidBoard(format!("food at {:?} is off the grid", p)))?;
            state.cells[idx] = Cell::Food;
        }

        for entity in entities {
            if entity.is_empty() {
                return Err(EngineError::InvalidBoard(format!(
                    "snake {:?} has an empty body",
                    entity.id
                )));
            }
            if let Some(p) = entity.body.iter().find(|p| !state.in_bounds(**p)) {
                return Err(EngineError::InvalidBoard(format!(
                    "snake {:?} has a segment at {:?} off the grid",
                    entity.id, p
                )));
            }
            state.paint(&entity);
            state.entities.push(entity);
        }

        Ok(state)
    }

    /// Builds the root snapshot from the wire board, flipping to a top-left origin.
    /// Returns the snapshot and the id assigned to `you_id`, which moves first.
    pub fn from_board(board: &Board, you_id: &str) -> Result<(Self, EntityId), EngineError> {
        let flip = |c: &Coord| Point::new(c.x, board.height - 1 - c.y);

        let live: Vec<_> = board
            .snakes
            .iter()
            .filter(|s| s.health > 0 && !s.body.is_empty())
            .collect();
        if live.len() > u8::MAX as usize {
            return Err(EngineError::InvalidBoard(format!(
                "{} snakes exceed the supported count",
                live.len()
            )));
        }

        let mut main = None;
        let entities: Vec<Entity> = live
            .iter()
            .enumerate()
            .map(|(i, snake)| {
                let id = EntityId(i as u8);
                if snake.id == you_id {
                    main = Some(id);
                }
                Entity::new(
                    id,
                    snake.body.iter().map(flip).collect(),
                    snake.health.min(crate::simulator::MAX_HEALTH),
                )
            })
            .collect();

        let main = main.ok_or_else(|| EngineError::UnknownEntity(you_id.to_string()))?;
        let food: Vec<Point> = board.food.iter().map(flip).collect();

        let mut state = GridState::new(board.width, board.height, &food, entities)?;
        state.to_move = Some(main);
        Ok((state, main))
    }

    /// Sets which entity moves next
    pub fn with_to_move(mut self, id: EntityId) -> Self {
        self.to_move = Some(id);
        self
    }

    /// Sets the turn counter
    pub fn with_turn(mut self, turn: u32) -> Self {
        self.turn = turn;
        self
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn to_move(&self) -> Option<EntityId> {
        self.to_move
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.position(id).is_some()
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    pub fn index(&self, p: Point) -> Option<usize> {
        self.in_bounds(p)
            .then(|| (p.y * self.width + p.x) as usize)
    }

    pub fn cell(&self, p: Point) -> Option<Cell> {
        self.index(p).map(|i| self.cells[i])
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// True on the outermost ring of cells
    pub fn is_edge(&self, p: Point) -> bool {
        p.x == 0 || p.y == 0 || p.x == self.width - 1 || p.y == self.height - 1
    }

    pub fn food(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Food)
            .map(move |(i, _)| Point::new(i as i32 % self.width, i as i32 / self.width))
    }

    pub(crate) fn set_cell(&mut self, p: Point, cell: Cell) {
        if let Some(i) = self.index(p) {
            self.cells[i] = cell;
        }
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub(crate) fn set_to_move(&mut self, id: Option<EntityId>) {
        self.to_move = id;
    }

    pub(crate) fn advance_turn(&mut self) {
        self.turn += 1;
    }

    /// Writes an entity's segments into the grid
    pub(crate) fn paint(&mut self, entity: &Entity) {
        for &p in entity.body.iter().skip(1) {
            self.set_cell(p, Cell::Body(entity.id));
        }
        self.set_cell(entity.head(), Cell::Head(entity.id));
    }

    /// Clears every cell still owned by the entity's segments
    pub(crate) fn erase(&mut self, entity: &Entity) {
        for &p in &entity.body {
            if self.cell(p).and_then(|c| c.owner()) == Some(entity.id) {
                self.set_cell(p, Cell::Empty);
            }
        }
    }

    /// Removes an entity from the grid and the live list
    pub(crate) fn eliminate(&mut self, id: EntityId) {
        if let Some(pos) = self.position(id) {
            let entity = self.entities.remove(pos);
            self.erase(&entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Battlesnake;

    fn snake(id: &str, health: i32, body: &[(i32, i32)]) -> Battlesnake {
        let body: Vec<Coord> = body.iter().map(|&(x, y)| Coord { x, y }).collect();
        Battlesnake {
            id: id.to_string(),
            name: id.to_string(),
            health,
            head: body[0],
            length: body.len() as i32,
            body,
            latency: "0".to_string(),
            shout: None,
        }
    }

    #[test]
    fn test_direction_order_and_parsing() {
        assert_eq!(
            Direction::all(),
            [Direction::Up, Direction::Down, Direction::Right, Direction::Left]
        );
        assert_eq!("UP".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!(" left ".parse::<Direction>().unwrap(), Direction::Left);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_from_board_flips_y_axis() {
        let board = Board {
            height: 7,
            width: 7,
            food: vec![Coord { x: 1, y: 6 }],
            snakes: vec![snake("me", 90, &[(3, 0), (3, 1)])],
            hazards: vec![],
        };

        let (state, main) = GridState::from_board(&board, "me").unwrap();
        let me = state.entity(main).unwrap();

        assert_eq!(me.head(), Point::new(3, 6));
        assert_eq!(me.tail(), Point::new(3, 5));
        assert_eq!(state.cell(Point::new(1, 0)), Some(Cell::Food));
        assert_eq!(state.cell(Point::new(3, 6)), Some(Cell::Head(main)));
        assert_eq!(state.cell(Point::new(3, 5)), Some(Cell::Body(main)));
        assert_eq!(state.to_move(), Some(main));
    }

    #[test]
    fn test_from_board_skips_dead_snakes_and_finds_you() {
        let board = Board {
            height: 5,
            width: 5,
            food: vec![],
            snakes: vec![
                snake("ghost", 0, &[(0, 0)]),
                snake("other", 50, &[(4, 4)]),
                snake("me", 50, &[(2, 2)]),
            ],
            hazards: vec![],
        };

        let (state, main) = GridState::from_board(&board, "me").unwrap();
        assert_eq!(state.entities().len(), 2);
        assert_eq!(main, EntityId(1));
        assert_eq!(state.to_move(), Some(EntityId(1)));

        assert!(matches!(
            GridState::from_board(&board, "ghost"),
            Err(EngineError::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_new_rejects_out_of_bounds_segments() {
        let entity = Entity::new(EntityId(0), vec![Point::new(0, 0), Point::new(-1, 0)], 100);
        assert!(matches!(
            GridState::new(3, 3, &[], vec![entity]),
            Err(EngineError::InvalidBoard(_))
        ));
    }

    #[test]
    fn test_new_rejects_oversized_dimensions() {
        assert!(matches!(
            GridState::new(i32::MAX, 2, &[], vec![]),
            Err(EngineError::InvalidBoard(_))
        ));
        assert!(matches!(
            GridState::new(0, 5, &[], vec![]),
            Err(EngineError::InvalidBoard(_))
        ));
    }

    #[test]
    fn test_growing_detection() {
        let grown = Entity::new(
            EntityId(0),
            vec![Point::new(2, 2), Point::new(2, 3), Point::new(2, 3)],
            100,
        );
        let moving = Entity::new(
            EntityId(0),
            vec![Point::new(2, 2), Point::new(2, 3), Point::new(2, 4)],
            100,
        );
        assert!(grown.is_growing());
        assert!(!moving.is_growing());
        assert_eq!(moving.heading(), Some((0, -1)));
    }
}
