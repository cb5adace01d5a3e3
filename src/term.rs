use std::{io::{Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

use crate::TermInt;
use crate::render::{Align, Color, Font, Rect, Surface};
use crate::snake::CELL_SIZE;

/// Each grid cell is two columns wide so the board looks square.
pub const COLUMNS_PER_CELL: i32 = 2;
const PX_PER_COLUMN: i32 = CELL_SIZE / COLUMNS_PER_CELL;
const PX_PER_ROW: i32 = CELL_SIZE;

const BLANK_BG: Color = Color::rgb(0, 0, 0);
const BORDER_FG: Color = Color::rgb(0x80, 0x80, 0x80);
const STATUS_FG: Color = Color::rgb(0xf9, 0xe6, 0xcf);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: BLANK_BG, bg: BLANK_BG };
}

/// Board-sized grid of terminal cells, written through `Surface` and
/// diffed against what is already on screen when presented.
pub struct FrameBuffer {
    cols: TermInt,
    rows: TermInt,
    front: Vec<Cell>,
    shown: Vec<Option<Cell>>,
}

impl FrameBuffer {
    /// A buffer for a board of `width` x `height` pixels.
    pub fn new(width: i32, height: i32) -> Self {
        let cols = (width / PX_PER_COLUMN) as TermInt;
        let rows = (height / PX_PER_ROW) as TermInt;
        let len = cols as usize * rows as usize;
        FrameBuffer { cols, rows, front: vec![Cell::BLANK; len], shown: vec![None; len] }
    }

    pub fn cols(&self) -> TermInt {
        self.cols
    }

    pub fn rows(&self) -> TermInt {
        self.rows
    }

    pub fn cell(&self, col: TermInt, row: TermInt) -> Cell {
        self.front[self.index(col, row)]
    }

    /// Forgets what is on screen so the next present repaints everything.
    pub fn invalidate(&mut self) {
        self.shown.iter_mut().for_each(|c| *c = None);
    }

    /// Cells that differ from the last presented frame, marking them shown.
    pub fn take_changes(&mut self) -> Vec<(TermInt, TermInt, Cell)> {
        let mut changes = vec![];

        for row in 0..self.rows {
            for col in 0..self.cols {
                let i = self.index(col, row);
                if self.shown[i] != Some(self.front[i]) {
                    self.shown[i] = Some(self.front[i]);
                    changes.push((col, row, self.front[i]));
                }
            }
        }

        changes
    }

    fn index(&self, col: TermInt, row: TermInt) -> usize {
        self.cols as usize * row as usize + col as usize
    }

    /// Column and row spans covered by a pixel rectangle, clipped to the buffer.
    fn span(&self, rect: Rect) -> Option<(std::ops::Range<TermInt>, std::ops::Range<TermInt>)> {
        let clip = |lo: i32, hi: i32, max: TermInt| {
            let lo = lo.max(0).min(max as i32);
            let hi = hi.max(0).min(max as i32);
            lo as TermInt..hi as TermInt
        };

        let cols = clip(
            rect.x.div_euclid(PX_PER_COLUMN),
            div_ceil(rect.x + rect.w, PX_PER_COLUMN),
            self.cols,
        );
        let rows = clip(
            rect.y.div_euclid(PX_PER_ROW),
            div_ceil(rect.y + rect.h, PX_PER_ROW),
            self.rows,
        );

        if cols.is_empty() || rows.is_empty() { None } else { Some((cols, rows)) }
    }

    fn put_char(&mut self, col: i32, row: i32, ch: char, fg: Color) {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return;
        }
        let i = self.index(col as TermInt, row as TermInt);
        self.front[i].ch = ch;
        self.front[i].fg = fg.over(self.front[i].bg);
    }
}

impl Surface for FrameBuffer {
    fn clear(&mut self, region: Rect) {
        if let Some((cols, rows)) = self.span(region) {
            for row in rows {
                for col in cols.clone() {
                    let i = self.index(col, row);
                    self.front[i] = Cell::BLANK;
                }
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if color.is_transparent() {
            return;
        }

        if let Some((cols, rows)) = self.span(rect) {
            for row in rows {
                for col in cols.clone() {
                    let i = self.index(col, row);
                    let cell = &mut self.front[i];
                    cell.bg = color.over(cell.bg);
                    if color.a == 255 {
                        cell.ch = ' ';
                    }
                }
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        let bounds = Rect::new(
            (cx - radius).floor() as i32,
            (cy - radius).floor() as i32,
            (2.0 * radius).ceil() as i32 + 1,
            (2.0 * radius).ceil() as i32 + 1,
        );

        if let Some((cols, rows)) = self.span(bounds) {
            for row in rows {
                let row_mid = (row as i32 * PX_PER_ROW) as f32 + PX_PER_ROW as f32 / 2.0;
                if (row_mid - cy).abs() > radius {
                    continue;
                }
                for col in cols.clone() {
                    let col_mid = (col as i32 * PX_PER_COLUMN) as f32 + PX_PER_COLUMN as f32 / 2.0;
                    if (col_mid - cx).abs() > radius {
                        continue;
                    }
                    // Half blocks hug the centre so the blob stays round-ish
                    let ch = if col_mid < cx { '▐' } else { '▌' };
                    self.put_char(col as i32, row as i32, ch, color);
                }
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, _font: Font, color: Color, align: Align) {
        let len = text.chars().count() as i32;
        let anchor = x.div_euclid(PX_PER_COLUMN);
        let start = match align {
            Align::Left => anchor,
            Align::Center => anchor - len / 2,
            Align::Right => anchor - len,
        };
        let row = y.div_euclid(PX_PER_ROW).min(self.rows as i32 - 1);

        for (i, ch) in text.chars().enumerate() {
            self.put_char(start + i as i32, row, ch, color);
        }
    }

    fn show_score(&mut self, _score: u32) {}
}

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    frame: FrameBuffer,
    origin: (TermInt, TermInt),
    score: Option<u32>,
}

impl TermManager {
    /// Sizes the frame buffer for a board of `width` x `height` pixels.
    pub fn new(board_width: i32, board_height: i32) -> crossterm::Result<Self> {
        let (width, height) = terminal::size()?;
        let frame = FrameBuffer::new(board_width, board_height);
        Ok(TermManager { width, height, stdout: stdout(), frame, origin: (0, 0), score: None })
    }

    /// Smallest terminal that fits the board, its border and the status line.
    pub fn required_size(&self) -> (TermInt, TermInt) {
        (self.frame.cols() + 2, self.frame.rows() + 3)
    }

    pub fn fits(&self) -> bool {
        let (w, h) = self.required_size();
        self.width >= w && self.height >= h
    }

    pub fn setup(&mut self) -> crossterm::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        self.set_raw_mode(true)?;
        self.set_cursor_visibility(false)?;
        self.set_cursor_blink(false)?;

        let (w, h) = self.required_size();
        self.origin = ((self.width - w) / 2 + 1, (self.height - h) / 2 + 1);

        self.clear()?;
        self.draw_borders()
    }

    /// Undoes `setup`. Every step runs even if an earlier one fails.
    pub fn restore(&mut self) -> crossterm::Result<()> {
        let steps = vec![
            self.set_raw_mode(false),
            self.set_cursor_visibility(true),
            self.set_cursor_blink(true),
            execute!(self.stdout, style::ResetColor, LeaveAlternateScreen),
        ];
        first_error(steps)
    }

    /// Waits up to `timeout` for the first key, then drains whatever else is queued.
    pub fn read_key_events_queue(&self, timeout: Duration) -> crossterm::Result<Vec<KeyEvent>> {
        let mut events = vec![];
        let mut wait = timeout;

        while poll(wait)? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
            wait = Duration::from_millis(0);
        }

        Ok(events)
    }

    /// Writes every changed cell plus the status line.
    pub fn present(&mut self) -> crossterm::Result<()> {
        let (ox, oy) = self.origin;

        for (col, row, cell) in self.frame.take_changes() {
            queue!(
                self.stdout,
                cursor::MoveTo(ox + col, oy + row),
                style::SetForegroundColor(term_color(cell.fg)),
                style::SetBackgroundColor(term_color(cell.bg)),
                style::Print(cell.ch)
            )?;
        }

        if let Some(score) = self.score.take() {
            let line = format!("{: <width$}", format!("Score: {}", score), width = self.frame.cols() as usize);
            let status_row = oy + self.frame.rows() + 1;
            queue!(
                self.stdout,
                style::ResetColor,
                cursor::MoveTo(ox, status_row),
                style::SetForegroundColor(term_color(STATUS_FG)),
                style::Print(line)
            )?;
        }

        queue!(self.stdout, style::ResetColor)?;
        self.flush()
    }

    pub fn clear(&mut self) -> crossterm::Result<()> {
        execute!(self.stdout, style::ResetColor, terminal::Clear(ClearType::All))?;
        self.frame.invalidate();
        Ok(())
    }

    pub fn flush(&mut self) -> crossterm::Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_borders(&mut self) -> crossterm::Result<()> {
        let (ox, oy) = self.origin;
        let (left, top) = (ox - 1, oy - 1);
        let (right, bottom) = (ox + self.frame.cols(), oy + self.frame.rows());

        queue!(self.stdout, style::SetForegroundColor(term_color(BORDER_FG)))?;

        for x in left..=right {
            let ch = if x == left || x == right {'+'} else {'-'};
            self.print_at((x, top), ch)?;
            self.print_at((x, bottom), ch)?;
        }

        for y in oy..bottom {
            self.print_at((left, y), '|')?;
            self.print_at((right, y), '|')?;
        }

        queue!(self.stdout, style::ResetColor)?;
        self.flush()
    }

    fn print_at(&mut self, pos: (TermInt, TermInt), ch: char) -> crossterm::Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))
    }

    fn set_raw_mode(&self, option: bool) -> crossterm::Result<()> {
        if option {
            terminal::enable_raw_mode()
        } else {
            terminal::disable_raw_mode()
        }
    }

    fn set_cursor_blink(&mut self, option: bool) -> crossterm::Result<()> {
        if option {
            execute!(self.stdout, cursor::EnableBlinking)
        } else {
            execute!(self.stdout, cursor::DisableBlinking)
        }
    }

    fn set_cursor_visibility(&mut self, option: bool) -> crossterm::Result<()> {
        if option {
            execute!(self.stdout, cursor::Show)
        } else {
            execute!(self.stdout, cursor::Hide)
        }
    }
}

impl Surface for TermManager {
    fn clear(&mut self, region: Rect) {
        self.frame.clear(region);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.frame.fill_rect(rect, color);
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        self.frame.fill_circle(cx, cy, radius, color);
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, font: Font, color: Color, align: Align) {
        self.frame.draw_text(text, x, y, font, color, align);
    }

    fn show_score(&mut self, score: u32) {
        self.score = Some(score);
    }
}

fn term_color(c: Color) -> style::Color {
    style::Color::Rgb { r: c.r, g: c.g, b: c.b }
}

fn first_error<E>(results: Vec<Result<(), E>>) -> Result<(), E> {
    let mut first = Ok(());
    for res in results {
        if first.is_ok() {
            first = res;
        }
    }
    first
}

fn div_ceil(a: i32, b: i32) -> i32 {
    -((-a).div_euclid(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: i32 = CELL_SIZE * 24;

    #[test]
    fn board_maps_to_double_width_columns() {
        let fb = FrameBuffer::new(BOARD, BOARD);
        assert_eq!((fb.cols(), fb.rows()), (48, 24));
    }

    #[test]
    fn cell_rect_covers_two_columns() {
        let mut fb = FrameBuffer::new(BOARD, BOARD);
        let red = Color::rgb(255, 0, 0);
        fb.fill_rect(Rect::cell((32, 16)), red);

        assert_eq!(fb.cell(4, 1).bg, red);
        assert_eq!(fb.cell(5, 1).bg, red);
        assert_eq!(fb.cell(3, 1).bg, BLANK_BG);
        assert_eq!(fb.cell(6, 1).bg, BLANK_BG);
        assert_eq!(fb.cell(4, 0).bg, BLANK_BG);
    }

    #[test]
    fn translucent_fill_blends_and_keeps_text() {
        let mut fb = FrameBuffer::new(BOARD, BOARD);
        fb.draw_text("A", 0, 0, Font::BODY, Color::rgb(255, 255, 255), Align::Left);
        fb.fill_rect(Rect::cell((0, 0)), Color::rgba(255, 255, 255, 0x09));

        let cell = fb.cell(0, 0);
        assert_eq!(cell.ch, 'A');
        assert_eq!(cell.bg, Color::rgb(9, 9, 9));
    }

    #[test]
    fn circle_lands_in_its_cell() {
        let mut fb = FrameBuffer::new(BOARD, BOARD);
        let green = Color::rgb(0, 255, 0);
        fb.fill_circle(40.0, 56.0, CELL_SIZE as f32 / 2.5, green);

        assert_eq!(fb.cell(4, 3).ch, '▐');
        assert_eq!(fb.cell(5, 3).ch, '▌');
        assert_eq!(fb.cell(4, 3).fg, green);
        assert_eq!(fb.cell(3, 3).ch, ' ');
        assert_eq!(fb.cell(4, 2).ch, ' ');
    }

    #[test]
    fn centred_text_is_clipped_to_board() {
        let mut fb = FrameBuffer::new(BOARD, BOARD);
        fb.draw_text("GAME OVER!", 192, 208, Font::TITLE, Color::rgb(1, 1, 1), Align::Center);

        let row: String = (0..fb.cols()).map(|c| fb.cell(c, 13).ch).collect();
        assert_eq!(row.trim(), "GAME OVER!");
        assert_eq!(fb.cell(19, 13).ch, 'G');

        fb.draw_text("overflowing", BOARD, 0, Font::BODY, Color::rgb(1, 1, 1), Align::Left);
    }

    #[test]
    fn first_failure_wins_after_all_steps() {
        assert_eq!(first_error::<&str>(vec![Ok(()), Ok(())]), Ok(()));
        assert_eq!(first_error(vec![Ok(()), Err("raw"), Ok(()), Err("screen")]), Err("raw"));

        let mut ran = 0;
        let mut step = |res: Result<(), &'static str>| {
            ran += 1;
            res
        };
        let steps = vec![step(Err("raw")), step(Ok(())), step(Ok(())), step(Ok(()))];
        assert_eq!(first_error(steps), Err("raw"));
        assert_eq!(ran, 4);
    }

    #[test]
    fn only_changed_cells_are_presented() {
        let mut fb = FrameBuffer::new(CELL_SIZE * 2, CELL_SIZE);
        assert_eq!(fb.take_changes().len(), 4);
        assert!(fb.take_changes().is_empty());

        fb.fill_rect(Rect::cell((CELL_SIZE, 0)), Color::rgb(9, 9, 9));
        let changed: Vec<_> = fb.take_changes().into_iter().map(|(c, r, _)| (c, r)).collect();
        assert_eq!(changed, vec![(2, 0), (3, 0)]);

        fb.invalidate();
        assert_eq!(fb.take_changes().len(), 4);
    }
}
