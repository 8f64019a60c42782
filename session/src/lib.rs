#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round orchestration for the dot merge engine.
//!
//! [`GameSession`] owns the authoritative [`World`] together with every pure
//! system. Input and clock stimuli are turned into commands, applied to the
//! world, and the resulting events are appended to the caller's buffer in the
//! order they happened. A finished match runs through three stages: the path is
//! cleared and scored on release, the columns collapse after the settle delay,
//! and the grid is refilled after the refill delay. Only one resolution is in
//! flight at a time.

use std::time::Duration;

use dot_merge_core::{
    CellCoord, ColorPalette, Command, ConfigError, Event, MergeTiming, Rejection, SessionConfig,
    SessionState,
};
use dot_merge_system_gravity::Gravity;
use dot_merge_system_refill::Refill;
use dot_merge_system_resolution::MatchResolver;
use dot_merge_system_selection::Selection;
use dot_merge_world::{self as world, query, GridState, World};
use tracing::{debug, info};

mod pipeline;

use pipeline::{ResolutionPipeline, Stage};

pub use dot_merge_system_resolution::{MergeDot, Resolution, MIN_MATCH_LENGTH};
pub use dot_merge_system_selection::{ExtendOutcome, SelectionPath};

/// Result of releasing the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The path was scored and cleared; collapse and refill are scheduled.
    Resolved(Resolution),
    /// The path was shorter than [`MIN_MATCH_LENGTH`]; nothing changed.
    TooShort {
        /// Number of cells the released path held.
        length: usize,
    },
    /// The path no longer describes a match on the current grid.
    Stale,
    /// The release was dropped and its path discarded.
    Rejected(Rejection),
}

/// Single play session: one tutorial, one timed round, one end.
#[derive(Debug)]
pub struct GameSession {
    world: World,
    selection: Selection,
    resolver: MatchResolver,
    gravity: Gravity,
    refill: Refill,
    pipeline: Option<ResolutionPipeline>,
}

impl GameSession {
    /// Validates `config` and builds a session in [`SessionState::NotStarted`].
    pub fn configure(config: SessionConfig) -> Result<Self, ConfigError> {
        let resolver = MatchResolver::new(config.points_per_dot);
        let refill = Refill::new(config.seed);
        let world = World::new(config)?;
        Ok(Self {
            world,
            selection: Selection::new(),
            resolver,
            gravity: Gravity::new(),
            refill,
            pipeline: None,
        })
    }

    /// Moves a fresh session into the tutorial.
    pub fn show_tutorial(&mut self, out: &mut Vec<Event>) {
        self.apply(Command::ShowTutorial, out);
    }

    /// Starts the timed round with a freshly generated grid.
    ///
    /// A session that never showed its tutorial passes through it first.
    /// Calls in any later state are ignored.
    pub fn start_round(&mut self, out: &mut Vec<Event>) {
        if self.state() == SessionState::NotStarted {
            self.show_tutorial(out);
        }
        if self.state() != SessionState::Tutorial {
            debug!(state = ?self.state(), "ignoring round start");
            return;
        }

        self.pipeline = None;
        self.selection.cancel(out);
        self.apply(Command::StartRound, out);
        self.fill_empty_cells(out);
        info!(
            width = self.grid().columns(),
            height = self.grid().rows(),
            target = self.config().target_score,
            "round started"
        );
    }

    /// Begins a new trace at `cell`.
    pub fn on_press(&mut self, cell: CellCoord, out: &mut Vec<Event>) -> ExtendOutcome {
        let active = self.state().is_active();
        self.selection
            .press(cell, query::grid_view(&self.world), active, out)
    }

    /// Extends, backtracks, or ignores the trace at `cell`.
    pub fn on_drag(&mut self, cell: CellCoord, out: &mut Vec<Event>) -> ExtendOutcome {
        let active = self.state().is_active();
        self.selection
            .drag(cell, query::grid_view(&self.world), active, out)
    }

    /// Finishes the trace and resolves it when it forms a match.
    ///
    /// The path is always consumed. A release while an earlier resolution is
    /// still pending is dropped with [`Rejection::ResolutionInProgress`].
    pub fn on_release(&mut self, out: &mut Vec<Event>) -> ReleaseOutcome {
        let path = self.selection.release(out);

        if !self.state().is_active() {
            return ReleaseOutcome::Rejected(Rejection::InactiveSession);
        }
        if self.pipeline.is_some() {
            debug!(length = path.len(), "release dropped while a resolution is pending");
            return ReleaseOutcome::Rejected(Rejection::ResolutionInProgress);
        }
        if path.len() < MIN_MATCH_LENGTH {
            return ReleaseOutcome::TooShort { length: path.len() };
        }

        let mut commands = Vec::new();
        let Some(resolution) = self.resolver.resolve(
            &path,
            query::grid_view(&self.world),
            query::palette(&self.world),
            &mut commands,
        ) else {
            return ReleaseOutcome::Stale;
        };
        self.apply_all(commands, out);

        let owed = match self.config().merge_timing {
            MergeTiming::Immediate => {
                self.place_merge(resolution.merge, out);
                None
            }
            MergeTiming::AfterCollapse => Some(resolution.merge),
        };
        debug!(
            length = resolution.path_length,
            points = resolution.points,
            score = self.score(),
            "match resolved"
        );

        let config = self.config();
        let (settle_delay, refill_delay) = (config.settle_delay, config.refill_delay);
        self.pipeline = Some(ResolutionPipeline::new(settle_delay, refill_delay, owed));
        self.advance_pipeline(Duration::ZERO, out);

        ReleaseOutcome::Resolved(resolution)
    }

    /// Drops the trace without resolving it, e.g. when the pointer leaves the grid.
    pub fn cancel_selection(&mut self, out: &mut Vec<Event>) {
        self.selection.cancel(out);
    }

    /// Advances pending resolution stages and the round clock by `dt`.
    ///
    /// A zero `dt` changes nothing. The clock only runs while playing, but a
    /// pending resolution still settles after the round ended.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        if dt.is_zero() {
            return;
        }
        self.advance_pipeline(dt, out);
        self.apply(Command::Tick { dt }, out);
    }

    /// Regenerates the whole grid, discarding any pending resolution.
    ///
    /// Only acts while playing. Score and remaining time are kept.
    pub fn rebuild_grid(&mut self, out: &mut Vec<Event>) {
        if !self.state().is_active() {
            debug!(state = ?self.state(), "ignoring grid rebuild");
            return;
        }
        if self.pipeline.take().is_some() {
            debug!("pending resolution cancelled by rebuild");
        }
        self.selection.cancel(out);
        self.apply(Command::ClearGrid, out);
        self.fill_empty_cells(out);
    }

    /// Read-only access to the grid.
    #[must_use]
    pub fn grid(&self) -> &GridState {
        query::grid(&self.world)
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u64 {
        query::score(&self.world)
    }

    /// Time left in the round.
    #[must_use]
    pub fn remaining_time(&self) -> Duration {
        query::remaining_time(&self.world)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        query::state(&self.world)
    }

    /// In-progress selection path.
    #[must_use]
    pub fn selection(&self) -> &SelectionPath {
        self.selection.path()
    }

    /// Reports whether a resolution is waiting on its collapse or refill.
    #[must_use]
    pub fn resolution_pending(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Active color palette.
    #[must_use]
    pub fn palette(&self) -> ColorPalette {
        query::palette(&self.world)
    }

    /// Configuration the session was built with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        query::config(&self.world)
    }

    fn advance_pipeline(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let mut budget = dt;
        loop {
            let Some(pipeline) = self.pipeline.as_mut() else {
                break;
            };
            let Some(stage) = pipeline.consume(&mut budget) else {
                break;
            };
            debug!(?stage, "resolution stage due");
            match stage {
                Stage::Collapse => self.collapse(out),
                Stage::Refill => {
                    let owed = self.pipeline.take().and_then(ResolutionPipeline::into_merge);
                    if let Some(merge) = owed {
                        self.place_merge(merge, out);
                    }
                    self.fill_empty_cells(out);
                    self.apply(Command::EvaluateRound, out);
                }
            }
        }
    }

    fn collapse(&mut self, out: &mut Vec<Event>) {
        self.selection.cancel(out);
        let mut commands = Vec::new();
        self.gravity
            .handle(query::grid_view(&self.world), &mut commands);
        self.apply_all(commands, out);
    }

    fn place_merge(&mut self, merge: MergeDot, out: &mut Vec<Event>) {
        let mut commands = Vec::new();
        let _ = self
            .resolver
            .place_merge(merge, query::grid_view(&self.world), &mut commands);
        self.apply_all(commands, out);
    }

    fn fill_empty_cells(&mut self, out: &mut Vec<Event>) {
        let mut commands = Vec::new();
        self.refill.handle(
            query::grid_view(&self.world),
            query::palette(&self.world),
            &mut commands,
        );
        self.apply_all(commands, out);
    }

    fn apply_all(&mut self, commands: Vec<Command>, out: &mut Vec<Event>) {
        for command in commands {
            self.apply(command, out);
        }
    }

    fn apply(&mut self, command: Command, out: &mut Vec<Event>) {
        let before = self.state();
        world::apply(&mut self.world, command, out);
        let after = self.state();
        if before != after {
            info!(from = ?before, to = ?after, score = self.score(), "session state changed");
            if !after.is_active() {
                self.selection.cancel(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_rejects_invalid_palette() {
        let config = SessionConfig {
            color_count: 2,
            ..SessionConfig::default()
        };
        assert_eq!(
            GameSession::configure(config).map(|_| ()),
            Err(ConfigError::PaletteTooSmall { size: 2 })
        );
    }

    #[test]
    fn start_round_passes_through_tutorial() {
        let mut session = GameSession::configure(SessionConfig::default()).expect("valid config");
        let mut events = Vec::new();

        session.start_round(&mut events);

        let states: Vec<SessionState> = events
            .iter()
            .filter_map(|event| match event {
                Event::StateChanged { state } => Some(*state),
                _ => None,
            })
            .collect();
        assert_eq!(states, vec![SessionState::Tutorial, SessionState::Playing]);
        assert_eq!(session.grid().view().occupied_count(), 36);
    }
}
