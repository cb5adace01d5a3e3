use std::time::{Duration, Instant};

use crate::render::{self, Surface};
use crate::scheduler::Scheduler;
use crate::state::{GameState, InputEffect, Key, Phase, TickOutcome};

/// Ties the game state to its tick deadline and to whatever surface shows it.
///
/// The caller supplies the clock and the surface on every call, so the
/// cadence can be driven by a terminal loop or by a test alike.
pub struct Driver {
    state: GameState,
    scheduler: Scheduler,
    paused: bool,
}

impl Driver {
    pub fn new(state: GameState) -> Self {
        Driver { state, scheduler: Scheduler::new(), paused: false }
    }

    /// Shows the first frame and schedules the first tick.
    pub fn start<S: Surface>(&mut self, now: Instant, surface: &mut S) {
        surface.show_score(self.state.score());
        self.render(surface);
        self.rearm(now);
    }

    pub fn press<S: Surface>(&mut self, key: Key, surface: &mut S) -> InputEffect {
        if self.paused {
            return InputEffect::Ignored;
        }

        let effect = self.state.handle_input(key);
        match effect {
            InputEffect::Reset => {
                surface.show_score(self.state.score());
                self.render(surface);
            }
            InputEffect::Turned(dir) => log::trace!("heading {:?}", dir),
            _ => {}
        }
        effect
    }

    /// Runs a tick if one is due, then re-arms with the current interval.
    pub fn poll<S: Surface>(&mut self, now: Instant, surface: &mut S) -> Option<TickOutcome> {
        if self.paused || !self.scheduler.fire(now) {
            return None;
        }

        let outcome = self.state.tick();

        match outcome {
            TickOutcome::Ate { score } | TickOutcome::Won { score } => surface.show_score(score),
            TickOutcome::Crashed(collision) if self.state.phase() == Phase::Halted => {
                log::info!("crashed into {:?}, loop stopped", collision);
            }
            _ => {}
        }

        if outcome != TickOutcome::Stopped {
            self.render(surface);
        }

        self.rearm(now);
        Some(outcome)
    }

    pub fn toggle_pause<S: Surface>(&mut self, now: Instant, surface: &mut S) {
        self.paused = !self.paused;

        if self.paused {
            log::info!("paused");
            self.scheduler.disarm();
        } else {
            log::info!("resumed");
            self.rearm(now);
        }

        self.render(surface);
    }

    /// Time until the next tick, `None` when nothing is scheduled.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.scheduler.remaining(now)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn rearm(&mut self, now: Instant) {
        match self.state.tick_interval() {
            Some(delay) => self.scheduler.arm(now, delay),
            None => self.scheduler.disarm(),
        }
    }

    fn render<S: Surface>(&self, surface: &mut S) {
        render::draw_frame(&self.state, surface);
        if self.paused {
            render::draw_pause_overlay(&self.state, surface);
        }
    }
}
