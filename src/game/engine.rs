use super::{
    action::{Direction, set_direction},
    config::GameConfig,
    state::{DeathCause, GameState, Phase, Position, Snake},
};
use log::debug;
use rand::Rng;
use rand::rngs::ThreadRng;

/// Length of a freshly spawned snake
pub const INITIAL_LENGTH: usize = 3;

/// Pick a uniformly random cell in `[0, W) x [0, H)`
pub fn random_cell<R: Rng>(grid_width: usize, grid_height: usize, rng: &mut R) -> Position {
    let x = rng.gen_range(0..grid_width) as i32;
    let y = rng.gen_range(0..grid_height) as i32;
    Position::new(x, y)
}

/// Spawn a snake and a piece of food for a new game.
///
/// The head lands on a random cell and heads towards the far side of the grid
/// (right when spawned in the left half, left otherwise) with the body
/// trailing behind it. Neither the body nor the food is checked against the
/// grid or against each other, so a tail segment may start off-grid and the
/// food may start under the snake.
pub fn initialize<R: Rng>(
    grid_width: usize,
    grid_height: usize,
    rng: &mut R,
) -> (Snake, Direction, Position) {
    let food = random_cell(grid_width, grid_height, rng);
    let head = random_cell(grid_width, grid_height, rng);

    let direction = if (head.x as usize) * 2 < grid_width {
        Direction::Right
    } else {
        Direction::Left
    };

    (Snake::new(head, direction, INITIAL_LENGTH), direction, food)
}

/// Advance the snake one cell, growing it if the new head lands on the food
pub fn step(snake: &Snake, direction: Direction, food: Position) -> (Snake, bool) {
    let ate_food = snake.head().moved_in_direction(direction) == food;
    let mut next = snake.clone();
    next.advance(direction, ate_food);
    (next, ate_food)
}

/// Why the snake is dead, if it is.
///
/// Bounds are inclusive on both ends: a head at column `grid_width` or row
/// `grid_height` is still alive.
pub fn death_cause(snake: &Snake, grid_width: usize, grid_height: usize) -> Option<DeathCause> {
    let head = snake.head();

    if head.x < 0 || head.x > grid_width as i32 || head.y < 0 || head.y > grid_height as i32 {
        return Some(DeathCause::Wall);
    }

    if snake.collides_with_body(head) {
        return Some(DeathCause::SelfCollision);
    }

    None
}

pub fn is_dead(snake: &Snake, grid_width: usize, grid_height: usize) -> bool {
    death_cause(snake, grid_width, grid_height).is_some()
}

/// New food location after the previous one was eaten
pub fn relocate_food<R: Rng>(grid_width: usize, grid_height: usize, rng: &mut R) -> Position {
    random_cell(grid_width, grid_height, rng)
}

/// What happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// Whether the snake ate food this tick
    pub ate_food: bool,
    /// Set on the tick the game ended
    pub death: Option<DeathCause>,
}

/// Drives a game through its phases using an injected random source
pub struct GameEngine<R = ThreadRng> {
    config: GameConfig,
    rng: R,
}

impl GameEngine<ThreadRng> {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, rand::thread_rng())
    }
}

impl<R: Rng> GameEngine<R> {
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start a fresh game, waiting in the `Start` phase
    pub fn reset(&mut self) -> GameState {
        let (width, height) = (self.config.grid_width, self.config.grid_height);
        let (snake, direction, food) = initialize(width, height, &mut self.rng);

        debug!(
            "new game: head {:?} heading {:?}, food {:?}",
            snake.head(),
            direction,
            food
        );

        GameState::new(snake, direction, food, width, height)
    }

    /// Leave the start banner and begin playing
    pub fn start(&self, state: &mut GameState) {
        if state.phase == Phase::Start {
            state.phase = Phase::Playing;
        }
    }

    /// Execute one tick of the game
    ///
    /// `requested` is the last heading asked for since the previous tick. Has
    /// no effect unless the game is in the `Playing` phase.
    pub fn tick(&mut self, state: &mut GameState, requested: Option<Direction>) -> TickOutcome {
        if state.phase != Phase::Playing {
            return TickOutcome::default();
        }

        if let Some(requested) = requested {
            state.direction = set_direction(state.direction, requested);
        }

        let (snake, ate_food) = step(&state.snake, state.direction, state.food);
        state.snake = snake;
        state.ticks += 1;

        if ate_food {
            state.food = relocate_food(state.grid_width, state.grid_height, &mut self.rng);
            debug!(
                "ate food at tick {}, length {}, next food {:?}",
                state.ticks,
                state.snake.len(),
                state.food
            );
        }

        let death = death_cause(&state.snake, state.grid_width, state.grid_height);
        if let Some(cause) = death {
            state.phase = Phase::GameOver;
            state.death = Some(cause);
            debug!("game over at tick {}: {:?}", state.ticks, cause);
        }

        TickOutcome { ate_food, death }
    }
}
