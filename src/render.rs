//! Frame composition.
//!
//! The game never talks to a terminal directly. It describes each frame as a
//! handful of pixel-space primitives on a `Surface`, which a backend turns
//! into whatever it can actually display.

use crate::Coords;
use crate::snake::CELL_SIZE;
use crate::state::{GameState, Phase};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Paints `self` over `below`, honouring alpha. The result is opaque.
    pub fn over(self, below: Color) -> Color {
        let alpha = self.a as u16;
        let mix = |top: u8, bottom: u8| ((top as u16 * alpha + bottom as u16 * (255 - alpha)) / 255) as u8;
        Color::rgb(mix(self.r, below.r), mix(self.g, below.g), mix(self.b, below.b))
    }
}

pub const BACKGROUND: Color = Color::rgb(0x23, 0x23, 0x23);
pub const CHECKER: Color = Color::rgba(0xff, 0xff, 0xff, 0x09);
pub const SNAKE_BODY: Color = Color::rgb(0xf6, 0xca, 0x9f);
pub const SNAKE_HEAD: Color = Color::rgb(0xf9, 0xe6, 0xcf);
pub const SNAKE_FLASH: Color = Color::rgb(0xf5, 0x55, 0x5d);
pub const FOOD: Color = Color::rgb(0x99, 0xe6, 0x5f);
pub const WELCOME_BAND: Color = Color::rgba(0xbf, 0x6f, 0x4a, 0x55);
pub const LOSE_BAND: Color = Color::rgb(0x89, 0x1e, 0x2b);
pub const WIN_BAND: Color = Color::rgb(0x3e, 0x89, 0x48);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    /// The pixel square covered by the cell at `pos`.
    pub fn cell(pos: Coords) -> Self {
        Rect::new(pos.0, pos.1, CELL_SIZE, CELL_SIZE)
    }
}

/// Font size in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Font(pub u16);

impl Font {
    pub const TITLE: Font = Font(48);
    pub const BODY: Font = Font(16);
    pub const SMALL: Font = Font(14);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A drawing target addressed in pixels, plus the score readout beside it.
pub trait Surface {
    fn clear(&mut self, region: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color);
    fn draw_text(&mut self, text: &str, x: i32, y: i32, font: Font, color: Color, align: Align);
    fn show_score(&mut self, score: u32);
}

pub fn draw_frame<S: Surface>(state: &GameState, surface: &mut S) {
    let board = Rect::new(0, 0, state.width(), state.height());
    surface.clear(board);
    surface.fill_rect(board, BACKGROUND);
    draw_checkerboard(state, surface);

    match state.phase() {
        Phase::Ready => {
            draw_snake(state, surface);
            draw_welcome_screen(state, surface);
        }
        Phase::Playing | Phase::Halted => {
            draw_food(state, surface);
            draw_snake(state, surface);
        }
        Phase::Lose => {
            draw_snake(state, surface);
            draw_banner(state, surface, LOSE_BAND, "GAME OVER!", "Press any key to try again");
        }
        Phase::Won => {
            draw_snake(state, surface);
            draw_banner(state, surface, WIN_BAND, "YOU WIN!", "Press any key to play again");
        }
    }
}

pub fn draw_pause_overlay<S: Surface>(state: &GameState, surface: &mut S) {
    draw_banner(state, surface, WELCOME_BAND, "PAUSED", "Esc to resume, Ctrl+C to quit");
}

fn center(state: &GameState) -> Coords {
    let cells = |px: i32| px / CELL_SIZE;
    ((cells(state.width()) / 2) * CELL_SIZE, (cells(state.height()) / 2) * CELL_SIZE)
}

fn draw_checkerboard<S: Surface>(state: &GameState, surface: &mut S) {
    for row in 0..state.height() / CELL_SIZE {
        for col in 0..state.width() / CELL_SIZE {
            if (row + col) % 2 == 0 {
                surface.fill_rect(Rect::cell((col * CELL_SIZE, row * CELL_SIZE)), CHECKER);
            }
        }
    }
}

fn draw_snake<S: Surface>(state: &GameState, surface: &mut S) {
    let body_color = if state.is_flash_frame() { SNAKE_FLASH } else { SNAKE_BODY };

    for (i, part) in state.snake().body().iter().enumerate() {
        let color = if i == 0 { SNAKE_HEAD } else { body_color };
        surface.fill_rect(Rect::cell(*part), color);
    }
}

fn draw_food<S: Surface>(state: &GameState, surface: &mut S) {
    if let Some((x, y)) = state.food() {
        let half = CELL_SIZE as f32 / 2.0;
        surface.fill_circle(x as f32 + half, y as f32 + half, CELL_SIZE as f32 / 2.5, FOOD);
    }
}

fn draw_welcome_screen<S: Surface>(state: &GameState, surface: &mut S) {
    let (cx, cy) = center(state);

    surface.fill_rect(Rect::new(0, 32, state.width(), 80), WELCOME_BAND);
    surface.draw_text("SNAKE", cx, cy - 110, Font::TITLE, SNAKE_HEAD, Align::Center);
    surface.draw_text("on a 24 by 24 grid", cx, cy - 90, Font::SMALL, SNAKE_BODY, Align::Center);
    surface.draw_text("Arrow keys or WASD to move", cx, cy + 90, Font::BODY, FOOD, Align::Center);

    // Blink
    if state.tick_count() % 3 != 0 {
        surface.draw_text("Press any key to PLAY", cx, cy + 130, Font::SMALL, SNAKE_BODY, Align::Center);
    }
}

fn draw_banner<S: Surface>(state: &GameState, surface: &mut S, band: Color, title: &str, hint: &str) {
    let (cx, cy) = center(state);

    surface.fill_rect(Rect::new(0, cy - 30, state.width(), 60), band);
    surface.draw_text(title, cx, cy + 16, Font::TITLE, SNAKE_HEAD, Align::Center);
    surface.draw_text(hint, cx, cy + 50, Font::SMALL, SNAKE_HEAD, Align::Center);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Key, Mode};
    use crate::snake::Direction;
    use rand::{rngs::StdRng, SeedableRng};

    #[derive(Debug, PartialEq)]
    enum Call {
        Clear,
        Rect(Rect, Color),
        Circle(f32, f32, f32, Color),
        Text(String),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Recorder {
        fn rects_with(&self, color: Color) -> Vec<Rect> {
            self.calls.iter().filter_map(|c| match c {
                Call::Rect(r, col) if *col == color => Some(*r),
                _ => None,
            }).collect()
        }

        fn has_text(&self, text: &str) -> bool {
            self.calls.iter().any(|c| matches!(c, Call::Text(t) if t == text))
        }
    }

    impl Surface for Recorder {
        fn clear(&mut self, _region: Rect) {
            self.calls.push(Call::Clear);
        }
        fn fill_rect(&mut self, rect: Rect, color: Color) {
            self.calls.push(Call::Rect(rect, color));
        }
        fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
            self.calls.push(Call::Circle(cx, cy, radius, color));
        }
        fn draw_text(&mut self, text: &str, _x: i32, _y: i32, _font: Font, _color: Color, _align: Align) {
            self.calls.push(Call::Text(text.to_string()));
        }
        fn show_score(&mut self, _score: u32) {}
    }

    fn state() -> GameState {
        GameState::new(Mode::Classic, StdRng::seed_from_u64(9))
    }

    #[test]
    fn alpha_blending() {
        assert_eq!(CHECKER.over(BACKGROUND), Color::rgb(0x2a, 0x2a, 0x2a));
        assert_eq!(SNAKE_BODY.over(BACKGROUND), SNAKE_BODY);
        assert_eq!(Color::rgba(1, 2, 3, 0).over(BACKGROUND), BACKGROUND);
    }

    #[test]
    fn ready_frame_has_welcome_and_no_food() {
        let state = state();
        let mut rec = Recorder::default();
        draw_frame(&state, &mut rec);

        assert_eq!(rec.calls[0], Call::Clear);
        assert_eq!(rec.rects_with(CHECKER).len(), 24 * 24 / 2);
        assert_eq!(rec.rects_with(SNAKE_HEAD), vec![Rect::cell((192, 192))]);
        assert_eq!(rec.rects_with(SNAKE_BODY).len(), 4);
        assert!(rec.has_text("SNAKE"));
        assert!(!rec.has_text("Press any key to PLAY"));
        assert!(!rec.calls.iter().any(|c| matches!(c, Call::Circle(..))));
    }

    #[test]
    fn playing_frame_draws_food_circle_in_cell() {
        let mut state = state();
        state.handle_input(Key::Other);
        state.debug_set_food(Some((32, 48)));
        let mut rec = Recorder::default();
        draw_frame(&state, &mut rec);

        assert!(rec.calls.contains(&Call::Circle(40.0, 56.0, CELL_SIZE as f32 / 2.5, FOOD)));
        assert!(!rec.has_text("SNAKE"));
    }

    #[test]
    fn lose_frame_flashes_body_but_not_head() {
        let mut state = state();
        state.handle_input(Key::Other);
        state.debug_set_snake(&[(0, 0), (CELL_SIZE, 0), (2 * CELL_SIZE, 0)], Direction::Left);
        state.tick();
        state.tick();
        assert!(state.is_flash_frame());

        let mut rec = Recorder::default();
        draw_frame(&state, &mut rec);
        assert_eq!(rec.rects_with(SNAKE_FLASH).len(), 2);
        assert_eq!(rec.rects_with(SNAKE_HEAD).len(), 1);
        assert!(rec.has_text("GAME OVER!"));
    }
}
