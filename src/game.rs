use std::time::{Duration, Instant};

use gridsnake::driver::Driver;
use gridsnake::snake::Direction::*;
use gridsnake::state::{GameState, Key, Mode, Phase};
use gridsnake::term::TermManager;

use anyhow::{bail, Context, Result};
use crossterm::event::{KeyEvent, KeyModifiers, KeyCode};
use rand::rngs::StdRng;

/// How long to wait for keys when no tick is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Command {
    Quit,
    TogglePause,
    Press(Key),
}

/// Feeds terminal keys and wall-clock time into the driver and puts its frames on screen.
pub struct SnakeGame {
    driver: Driver,
    term: TermManager,
}

impl SnakeGame {
    pub fn new(mode: Mode, rng: StdRng) -> Result<Self> {
        let state = GameState::new(mode, rng);
        let term = TermManager::new(state.width(), state.height())
            .context("reading terminal size")?;

        if !term.fits() {
            let (w, h) = term.required_size();
            bail!("terminal too small, need at least {} columns by {} rows", w, h);
        }

        Ok(SnakeGame { driver: Driver::new(state), term })
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.term.setup().context("setting up terminal")?;

        let state = self.driver.state();
        log::info!("{:?} game on a {}x{} board", state.mode(), state.width(), state.height());

        self.driver.start(Instant::now(), &mut self.term);
        self.present()
    }

    pub fn shutdown(&mut self) -> Result<()> {
        self.term.restore().context("restoring terminal")
    }

    /// Runs until the player quits. Keys are handled as soon as they arrive;
    /// ticks run whenever the scheduled deadline passes.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let timeout = self.driver.remaining(Instant::now()).unwrap_or(IDLE_POLL);

            for key_ev in self.term.read_key_events_queue(timeout)? {
                match command_from(&key_ev, self.driver.state().phase()) {
                    Command::Quit => {
                        log::info!("quit with score {}", self.driver.state().score());
                        return Ok(());
                    }
                    Command::TogglePause => self.driver.toggle_pause(Instant::now(), &mut self.term),
                    Command::Press(key) => {
                        self.driver.press(key, &mut self.term);
                    }
                }
            }

            self.driver.poll(Instant::now(), &mut self.term);
            self.present()?;
        }
    }

    /// Only cells that changed since the last call reach the terminal.
    fn present(&mut self) -> Result<()> {
        self.term.present().context("drawing frame")
    }
}

/// Esc pauses only mid-game; on the other screens it is just another key.
fn command_from(ev: &KeyEvent, phase: Phase) -> Command {
    match ev {
        ev if is_ctrl_c(ev) => Command::Quit,
        KeyEvent { code, modifiers: _ } => match code {
            KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Command::Press(Key::Move(Up)),
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Command::Press(Key::Move(Left)),
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Command::Press(Key::Move(Down)),
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Command::Press(Key::Move(Right)),
            KeyCode::Esc if phase == Phase::Playing => Command::TogglePause,
            _ => Command::Press(Key::Other),
        }
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
