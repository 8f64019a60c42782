#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid and round state for the dot merge engine.

use std::time::Duration;

use dot_merge_core::{
    Cell, CellCoord, ColorId, ColorPalette, Command, ConfigError, Event, SessionConfig,
    SessionState,
};
use tracing::{debug, error, warn};

mod grid;

pub use grid::{GridError, GridState};

/// Represents the authoritative state of a single session.
#[derive(Debug)]
pub struct World {
    config: SessionConfig,
    palette: ColorPalette,
    grid: GridState,
    score: u64,
    remaining: Duration,
    state: SessionState,
}

impl World {
    /// Creates a world for the provided configuration.
    ///
    /// The grid starts empty and the session starts in
    /// [`SessionState::NotStarted`].
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let palette = config.palette()?;
        Ok(Self {
            grid: GridState::new(config.width, config.height),
            palette,
            score: 0,
            remaining: config.duration,
            state: SessionState::NotStarted,
            config,
        })
    }

    fn transition(&mut self, state: SessionState, out_events: &mut Vec<Event>) {
        self.state = state;
        out_events.push(Event::StateChanged { state });
    }

    fn show_tutorial(&mut self, out_events: &mut Vec<Event>) {
        if self.state != SessionState::NotStarted {
            debug!(state = ?self.state, "tutorial requested after the session started");
            return;
        }
        self.transition(SessionState::Tutorial, out_events);
    }

    fn start_round(&mut self, out_events: &mut Vec<Event>) {
        if self.state != SessionState::Tutorial {
            debug!(state = ?self.state, "round start requested outside the tutorial");
            return;
        }

        self.score = 0;
        self.remaining = self.config.duration;
        self.clear_grid(out_events);
        self.transition(SessionState::Playing, out_events);
        out_events.push(Event::ScoreChanged { score: self.score });
        out_events.push(Event::TimeChanged {
            remaining: self.remaining,
        });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if !self.state.is_active() || dt.is_zero() {
            return;
        }

        self.remaining = self.remaining.saturating_sub(dt);
        out_events.push(Event::TimeChanged {
            remaining: self.remaining,
        });
        self.evaluate_round(out_events);
    }

    fn evaluate_round(&mut self, out_events: &mut Vec<Event>) {
        if !self.state.is_active() {
            return;
        }

        if self.remaining.is_zero() || self.score >= self.config.target_score {
            self.transition(SessionState::Ended, out_events);
        }
    }

    fn clear_grid(&mut self, out_events: &mut Vec<Event>) {
        out_events.extend(
            self.grid
                .clear()
                .into_iter()
                .map(|cell| Event::Removed { cell }),
        );
    }

    fn clear_cell(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        match self.grid.set(cell, Cell::Empty) {
            Ok(Cell::Occupied(_)) => out_events.push(Event::Removed { cell }),
            Ok(Cell::Empty) => debug!(?cell, "clear requested for an empty cell"),
            Err(err) => error!(%err, "rejected cell clear"),
        }
    }

    fn move_dot(&mut self, from: CellCoord, to: CellCoord, out_events: &mut Vec<Event>) {
        let source = match self.grid.get(from) {
            Ok(cell) => cell,
            Err(err) => {
                error!(%err, "rejected dot move");
                return;
            }
        };
        let Some(color) = source.color() else {
            warn!(?from, ?to, "move requested from an empty cell");
            return;
        };

        match self.grid.get(to) {
            Ok(Cell::Empty) => {}
            Ok(Cell::Occupied(_)) => {
                warn!(?from, ?to, "move requested into an occupied cell");
                return;
            }
            Err(err) => {
                error!(%err, "rejected dot move");
                return;
            }
        }

        if self.write(from, Cell::Empty) && self.write(to, Cell::Occupied(color)) {
            out_events.push(Event::Moved { from, to, color });
        }
    }

    fn spawn_dot(&mut self, cell: CellCoord, color: ColorId, out_events: &mut Vec<Event>) {
        if !self.palette.contains(color) {
            warn!(?cell, color = color.get(), "spawn color outside the palette");
            return;
        }

        match self.grid.get(cell) {
            Ok(Cell::Empty) => {
                if self.write(cell, Cell::Occupied(color)) {
                    out_events.push(Event::Spawned { cell, color });
                }
            }
            Ok(Cell::Occupied(_)) => warn!(?cell, "refusing to spawn over an occupied cell"),
            Err(err) => error!(%err, "rejected dot spawn"),
        }
    }

    fn award_points(&mut self, points: u64, out_events: &mut Vec<Event>) {
        if points == 0 {
            return;
        }
        self.score = self.score.saturating_add(points);
        out_events.push(Event::ScoreChanged { score: self.score });
    }

    fn write(&mut self, cell: CellCoord, value: Cell) -> bool {
        match self.grid.set(cell, value) {
            Ok(_) => true,
            Err(err) => {
                error!(%err, "grid write failed");
                false
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ShowTutorial => world.show_tutorial(out_events),
        Command::StartRound => world.start_round(out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::ClearGrid => world.clear_grid(out_events),
        Command::ClearCell { cell } => world.clear_cell(cell, out_events),
        Command::MoveDot { from, to } => world.move_dot(from, to, out_events),
        Command::SpawnDot { cell, color } => world.spawn_dot(cell, color, out_events),
        Command::AwardPoints { points } => world.award_points(points, out_events),
        Command::EvaluateRound => world.evaluate_round(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use dot_merge_core::{ColorPalette, GridView, SessionConfig, SessionState};

    use super::{GridState, World};

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &SessionConfig {
        &world.config
    }

    /// Active color palette.
    #[must_use]
    pub fn palette(world: &World) -> ColorPalette {
        world.palette
    }

    /// Provides read-only access to the grid.
    #[must_use]
    pub fn grid(world: &World) -> &GridState {
        &world.grid
    }

    /// Captures a read-only view of the grid cells.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.grid.view()
    }

    /// Current session score.
    #[must_use]
    pub fn score(world: &World) -> u64 {
        world.score
    }

    /// Time left in the round.
    #[must_use]
    pub fn remaining_time(world: &World) -> Duration {
        world.remaining
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(world: &World) -> SessionState {
        world.state
    }
}
