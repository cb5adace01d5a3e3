use std::time::Duration;

use rand::rngs::StdRng;

use crate::Coords;
use crate::food::place_food;
use crate::snake::{Collision, Direction, Snake, CELL_SIZE};

pub const BOARD_CELLS: i32 = 24;
pub const CANVAS_WIDTH: i32 = CELL_SIZE * BOARD_CELLS;
pub const CANVAS_HEIGHT: i32 = CELL_SIZE * BOARD_CELLS;

pub const INITIAL_SNAKE_LENGTH: usize = 5;
pub const BASE_INTERVAL_MS: f64 = 310.0;
pub const DIFFICULTY_STEP: f64 = 0.085;

/// Which of the two game flows to run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Ready screen, game over screen and restart on any key.
    Classic,
    /// Straight into play; the loop stops for good on the first crash.
    Bare,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Playing,
    Lose,
    Won,
    Halted,
}

/// A key press as seen by the game: either a heading or anything else.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Move(Direction),
    Other,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputEffect {
    Started,
    Reset,
    Turned(Direction),
    Rejected,
    Ignored,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Moved,
    Ate { score: u32 },
    Crashed(Collision),
    Won { score: u32 },
    Stopped,
}

/// Everything the loop mutates between ticks.
pub struct GameState {
    mode: Mode,
    phase: Phase,
    snake: Snake,
    food: Option<Coords>,
    score: u32,
    difficulty: f64,
    tick_count: u64,
    input_latched: bool,
    width: i32,
    height: i32,
    rng: StdRng,
}

impl GameState {
    pub fn new(mode: Mode, rng: StdRng) -> Self {
        let mut state = GameState {
            mode,
            phase: Phase::Ready,
            snake: initial_snake(),
            food: None,
            score: 0,
            difficulty: 0.0,
            tick_count: 0,
            input_latched: false,
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            rng,
        };
        state.reset();
        state
    }

    /// Puts every field back to its starting value and drops fresh food.
    pub fn reset(&mut self) {
        self.phase = match self.mode {
            Mode::Classic => Phase::Ready,
            Mode::Bare => Phase::Playing,
        };
        self.snake = initial_snake();
        self.score = 0;
        self.difficulty = 0.0;
        self.tick_count = 0;
        self.input_latched = false;
        self.food = place_food(&mut self.rng, &self.snake, self.width, self.height);
    }

    pub fn handle_input(&mut self, key: Key) -> InputEffect {
        match self.phase {
            Phase::Ready => {
                self.phase = Phase::Playing;
                log::info!("game started");
                InputEffect::Started
            }
            Phase::Lose | Phase::Won => {
                self.reset();
                log::info!("game reset");
                InputEffect::Reset
            }
            Phase::Halted => InputEffect::Ignored,
            Phase::Playing => match key {
                Key::Move(_) if self.input_latched => InputEffect::Ignored,
                Key::Move(dir) => {
                    if self.snake.set_direction(dir) {
                        self.input_latched = true;
                        InputEffect::Turned(dir)
                    } else {
                        InputEffect::Rejected
                    }
                }
                Key::Other => InputEffect::Ignored,
            },
        }
    }

    /// Runs one update. Only `Playing` moves the snake; every phase counts the tick.
    pub fn tick(&mut self) -> TickOutcome {
        self.tick_count += 1;

        match self.phase {
            Phase::Playing => self.step(),
            Phase::Ready | Phase::Lose | Phase::Won => TickOutcome::Idle,
            Phase::Halted => TickOutcome::Stopped,
        }
    }

    fn step(&mut self) -> TickOutcome {
        let candidate = self.snake.next_head();

        if let Some(collision) = self.snake.check_collision(candidate, self.width, self.height) {
            log::info!("crashed into {:?} at {:?} with score {}", collision, candidate, self.score);
            self.end_round(Phase::Lose);
            return TickOutcome::Crashed(collision);
        }

        let ate = self.food == Some(candidate);
        if ate {
            self.score += 1;
            self.difficulty += DIFFICULTY_STEP;
        }

        self.snake.advance(candidate, ate);
        self.input_latched = false;

        if !ate {
            return TickOutcome::Moved;
        }

        self.food = place_food(&mut self.rng, &self.snake, self.width, self.height);
        if self.food.is_none() {
            log::info!("board filled with score {}", self.score);
            self.end_round(Phase::Won);
            return TickOutcome::Won { score: self.score };
        }

        log::debug!(
            "food eaten: score {}, difficulty {:.3}, next tick in {:?}",
            self.score,
            self.difficulty,
            self.tick_interval()
        );
        TickOutcome::Ate { score: self.score }
    }

    fn end_round(&mut self, classic_phase: Phase) {
        self.phase = match self.mode {
            Mode::Classic => classic_phase,
            Mode::Bare => Phase::Halted,
        };
    }

    /// Delay before the next tick, shrinking as difficulty grows. `None` once halted.
    pub fn tick_interval(&self) -> Option<Duration> {
        if self.phase == Phase::Halted {
            return None;
        }
        let millis = BASE_INTERVAL_MS / (1.0 + self.difficulty);
        Some(Duration::from_secs_f64(millis / 1000.0))
    }

    /// Whether the body is drawn in the flash colour this tick.
    pub fn is_flash_frame(&self) -> bool {
        let period = self.difficulty.floor() as u64 + 2;
        self.phase == Phase::Lose && self.tick_count % period == 0
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<Coords> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_input_latched(&self) -> bool {
        self.input_latched
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Replaces the snake. An empty slice leaves the current one in place.
    pub fn debug_set_snake(&mut self, segments: &[Coords], direction: Direction) {
        if let Some(snake) = Snake::from_segments(segments, direction) {
            self.snake = snake;
        }
    }

    pub fn debug_set_food(&mut self, food: Option<Coords>) {
        self.food = food;
    }

    pub fn debug_set_board(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
    }
}

fn initial_snake() -> Snake {
    let center = (
        (BOARD_CELLS / 2) * CELL_SIZE,
        (BOARD_CELLS / 2) * CELL_SIZE,
    );
    Snake::new(center, INITIAL_SNAKE_LENGTH, Direction::Right)
}
