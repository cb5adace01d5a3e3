use std::collections::VecDeque;

use crate::Coords;
use Direction::*;

/// Pixel length of one grid cell. Every position is a multiple of this.
pub const CELL_SIZE: i32 = 16;

/// Segments `0..SELF_COLLISION_SKIP` never count as a self-collision.
pub const SELF_COLLISION_SKIP: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Body,
}

impl Direction {
    /// Heading vector in pixels, exactly one cell long.
    pub fn vector(self) -> Coords {
        match self {
            Up => (0, -CELL_SIZE),
            Down => (0, CELL_SIZE),
            Left => (-CELL_SIZE, 0),
            Right => (CELL_SIZE, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }
}

/// A trailing-history chain of cells, head first.
#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Coords>,
    direction: Direction,
}

impl Snake {
    /// Lays out `size` segments with the head at `head`, trailing away from `direction`.
    pub fn new(head: Coords, size: usize, direction: Direction) -> Self {
        let diff = direction.vector();

        let body = (0..size as i32)
            .map(|i| (head.0 - diff.0 * i, head.1 - diff.1 * i))
            .collect();
        Snake { body, direction }
    }

    /// Builds a snake from explicit segments, head first. `None` without a head.
    pub fn from_segments(segments: &[Coords], direction: Direction) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        Some(Snake { body: segments.iter().copied().collect(), direction })
    }

    pub fn body(&self) -> &VecDeque<Coords> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Coords {
        self.body[0]
    }

    pub fn contains(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    /// Where the head lands if the snake steps along its current heading.
    pub fn next_head(&self) -> Coords {
        let (dx, dy) = self.direction.vector();
        let head = self.head();
        (head.0 + dx, head.1 + dy)
    }

    /// Tests a candidate head against the walls of a `width` x `height` pixel
    /// board and against the current, not yet moved, body.
    pub fn check_collision(&self, candidate: Coords, width: i32, height: i32) -> Option<Collision> {
        if self.body.iter().skip(SELF_COLLISION_SKIP).any(|part| *part == candidate) {
            return Some(Collision::Body);
        }

        if hits_wall(candidate, width, height) {
            return Some(Collision::Wall);
        }

        None
    }

    /// Pushes `new_head` to the front. Unless growing, the tail is dropped and returned.
    pub fn advance(&mut self, new_head: Coords, grow: bool) -> Option<Coords> {
        let old_tail = if grow { None } else { self.body.pop_back() };
        self.body.push_front(new_head);
        old_tail
    }

    /// Changes heading unless `new_direction` reverses the current one.
    /// Returns whether the heading was accepted.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        match (&new_direction, &self.direction) {
            (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right) => false,
            _ => {
                self.direction = new_direction;
                true
            }
        }
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }
}

/// A cell hits the wall unless it lies fully inside the board.
pub fn hits_wall(pos: Coords, width: i32, height: i32) -> bool {
    pos.0 < 0 || pos.0 > width - CELL_SIZE || pos.1 < 0 || pos.1 > height - CELL_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: i32 = CELL_SIZE * 24;
    const H: i32 = CELL_SIZE * 24;

    #[test]
    fn new_snake_trails_behind_head() {
        let snake = Snake::new((192, 192), 5, Right);
        let body: Vec<_> = snake.body().iter().copied().collect();
        assert_eq!(body, vec![(192, 192), (176, 192), (160, 192), (144, 192), (128, 192)]);
        assert_eq!(snake.next_head(), (208, 192));
    }

    #[test]
    fn reversal_is_rejected() {
        let mut snake = Snake::new((192, 192), 5, Right);
        assert!(!snake.set_direction(Left));
        assert_eq!(snake.get_direction(), Right);

        assert!(snake.set_direction(Up));
        assert!(!snake.set_direction(Down));
        assert_eq!(snake.get_direction().vector(), (0, -CELL_SIZE));
    }

    #[test]
    fn wall_bounds_are_inclusive_of_last_cell() {
        assert!(!hits_wall((0, 0), W, H));
        assert!(!hits_wall((W - CELL_SIZE, H - CELL_SIZE), W, H));
        assert!(hits_wall((W, 0), W, H));
        assert!(hits_wall((0, H), W, H));
        assert!(hits_wall((-CELL_SIZE, 0), W, H));
        assert!(hits_wall((0, -CELL_SIZE), W, H));
    }

    #[test]
    fn first_four_segments_are_exempt() {
        let c = CELL_SIZE;
        let segments = [(0, 0), (c, 0), (2 * c, 0), (3 * c, 0), (4 * c, 0), (5 * c, 0)];
        let snake = Snake::from_segments(&segments, Left).unwrap();

        for exempt in &segments[..SELF_COLLISION_SKIP] {
            assert_eq!(snake.check_collision(*exempt, W, H), None);
        }
        for bite in &segments[SELF_COLLISION_SKIP..] {
            assert_eq!(snake.check_collision(*bite, W, H), Some(Collision::Body));
        }
    }

    #[test]
    fn headless_snake_is_refused() {
        assert!(Snake::from_segments(&[], Up).is_none());
        assert_eq!(Snake::from_segments(&[(0, 0)], Up).unwrap().len(), 1);
    }

    #[test]
    fn advance_drops_tail_unless_growing() {
        let mut snake = Snake::new((192, 192), 5, Right);
        let tail = snake.advance((208, 192), false);
        assert_eq!(tail, Some((128, 192)));
        assert_eq!(snake.len(), 5);

        assert_eq!(snake.advance((224, 192), true), None);
        assert_eq!(snake.len(), 6);
        assert_eq!(snake.head(), (224, 192));
    }
}
