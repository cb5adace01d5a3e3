pub mod driver;
pub mod food;
pub mod render;
pub mod scheduler;
pub mod snake;
pub mod state;
pub mod term;

pub type TermInt = u16;

/// Pixel position of a cell's top-left corner. Always a multiple of `CELL_SIZE`.
pub type Coords = (i32, i32);
