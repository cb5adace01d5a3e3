use rand::Rng;

use crate::Coords;
use crate::snake::{Snake, CELL_SIZE};

/// Random samples tried before falling back to a scan of the board.
pub const MAX_FOOD_ATTEMPTS: usize = 32;

/// Picks a cell for the next piece of food that no snake segment occupies.
///
/// A handful of uniform samples are drawn first; if every one lands on the
/// snake, the board is scanned row by row and the first free cell wins.
/// Returns `None` only when the snake covers the whole board.
pub fn place_food<R: Rng>(rng: &mut R, snake: &Snake, width: i32, height: i32) -> Option<Coords> {
    let (cols, rows) = (width / CELL_SIZE, height / CELL_SIZE);
    if cols <= 0 || rows <= 0 {
        return None;
    }

    for _ in 0..MAX_FOOD_ATTEMPTS {
        let candidate = (rng.gen_range(0..cols) * CELL_SIZE, rng.gen_range(0..rows) * CELL_SIZE);
        if !snake.contains(candidate) {
            return Some(candidate);
        }
    }

    log::debug!("food sampling exhausted after {} attempts, scanning", MAX_FOOD_ATTEMPTS);
    first_free_cell(snake, cols, rows)
}

fn first_free_cell(snake: &Snake, cols: i32, rows: i32) -> Option<Coords> {
    (0..rows)
        .flat_map(|row| (0..cols).map(move |col| (col * CELL_SIZE, row * CELL_SIZE)))
        .find(|pos| !snake.contains(*pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn food_never_lands_on_snake() {
        let mut rng = StdRng::seed_from_u64(7);
        let snake = Snake::new((192, 192), 5, Direction::Right);
        let (w, h) = (CELL_SIZE * 24, CELL_SIZE * 24);

        for _ in 0..500 {
            let food = place_food(&mut rng, &snake, w, h).unwrap();
            assert!(!snake.contains(food));
            assert_eq!(food.0 % CELL_SIZE, 0);
            assert_eq!(food.1 % CELL_SIZE, 0);
            assert!(food.0 >= 0 && food.0 < w && food.1 >= 0 && food.1 < h);
        }
    }

    #[test]
    fn crowded_board_falls_back_to_the_only_free_cell() {
        let c = CELL_SIZE;
        // 3x3 board, snake covers everything but the bottom-right cell
        let segments = [
            (0, 0), (c, 0), (2 * c, 0),
            (2 * c, c), (c, c), (0, c),
            (0, 2 * c), (c, 2 * c),
        ];
        let snake = Snake::from_segments(&segments, Direction::Left).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..20 {
            assert_eq!(place_food(&mut rng, &snake, 3 * c, 3 * c), Some((2 * c, 2 * c)));
        }
    }

    #[test]
    fn full_board_has_no_food() {
        let c = CELL_SIZE;
        let snake = Snake::from_segments(&[(0, 0), (c, 0)], Direction::Left).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(place_food(&mut rng, &snake, 2 * c, c), None);
    }
}
