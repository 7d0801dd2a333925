use super::action::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position one cell in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// The snake's body, head at index 0 and tail last
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    pub body: Vec<Position>,
}

impl Snake {
    /// Lay out `length` cells starting at `head` and trailing opposite `direction`
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let (dx, dy) = direction.delta();
        let body = (0..length as i32)
            .map(|i| head.moved_by(-dx * i, -dy * i))
            .collect();

        Self { body }
    }

    pub fn from_cells<I, P>(cells: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Position>,
    {
        Self {
            body: cells.into_iter().map(Into::into).collect(),
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().contains(&pos)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Prepend a new head one cell along `direction`, dropping the tail unless growing
    pub fn advance(&mut self, direction: Direction, grow: bool) {
        let new_head = self.head().moved_in_direction(direction);
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// What ended the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Head left the playing field
    Wall,
    /// Head ran into the body
    SelfCollision,
}

impl DeathCause {
    pub fn describe(&self) -> &'static str {
        match self {
            DeathCause::Wall => "hit the wall",
            DeathCause::SelfCollision => "bit itself",
        }
    }
}

/// Lifecycle of a single game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Initialized, waiting for the player to press a key
    Start,
    Playing,
    GameOver,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub direction: Direction,
    pub food: Position,
    pub grid_width: usize,
    pub grid_height: usize,
    pub initial_length: usize,
    pub ticks: u32,
    pub phase: Phase,
    pub death: Option<DeathCause>,
}

impl GameState {
    /// Create a new game state in the `Start` phase
    pub fn new(
        snake: Snake,
        direction: Direction,
        food: Position,
        grid_width: usize,
        grid_height: usize,
    ) -> Self {
        let initial_length = snake.len();
        Self {
            snake,
            direction,
            food,
            grid_width,
            grid_height,
            initial_length,
            ticks: 0,
            phase: Phase::Start,
            death: None,
        }
    }

    /// Cells gained since the game started
    pub fn score(&self) -> usize {
        self.snake.len().saturating_sub(self.initial_length)
    }

    /// Check if a position lies on the drawable `[0, W) x [0, H)` grid
    pub fn is_on_grid(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }
}
