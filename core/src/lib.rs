#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the dot merge engine.
//!
//! This crate defines the message surface that connects the session, the
//! authoritative world, and pure systems. Systems read a [`GridView`] snapshot
//! and submit [`Command`] values describing desired mutations, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values that a presentation layer animates. Nothing in here knows
//! about pixels, screen geometry, or frame timing.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

mod config;

pub use config::{ConfigError, MergeTiming, SessionConfig, MAX_PALETTE_SIZE, MIN_PALETTE_SIZE};

/// Describes the lifecycle stage of a round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// The session was configured but nothing was shown yet.
    #[default]
    NotStarted,
    /// The tutorial is presented and the grid does not accept input.
    Tutorial,
    /// The round is running: input is accepted and the countdown advances.
    Playing,
    /// The round finished. Terminal; a new round requires a new session.
    Ended,
}

impl SessionState {
    /// Reports whether the state accepts gameplay input.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Moves a freshly configured session into the tutorial.
    ShowTutorial,
    /// Begins the round: resets score and countdown and empties the grid.
    StartRound,
    /// Advances the round countdown by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Vacates every cell of the grid.
    ClearGrid,
    /// Vacates a single cell.
    ClearCell {
        /// Cell to vacate.
        cell: CellCoord,
    },
    /// Moves a dot into an empty cell, keeping its color.
    MoveDot {
        /// Cell currently holding the dot.
        from: CellCoord,
        /// Empty cell that receives the dot.
        to: CellCoord,
    },
    /// Creates a dot in an empty cell.
    SpawnDot {
        /// Empty cell that receives the new dot.
        cell: CellCoord,
        /// Color assigned to the new dot.
        color: ColorId,
    },
    /// Adds points to the session score.
    AwardPoints {
        /// Number of points to add.
        points: u64,
    },
    /// Ends the round if the countdown expired or the target score was reached.
    EvaluateRound,
}

/// Events broadcast by the world and systems after processing input.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// A dot was removed and its cell became empty.
    Removed {
        /// Cell that was vacated.
        cell: CellCoord,
    },
    /// A dot fell from one cell to another.
    Moved {
        /// Cell the dot occupied before moving.
        from: CellCoord,
        /// Cell the dot occupies after moving.
        to: CellCoord,
        /// Color of the moved dot.
        color: ColorId,
    },
    /// A new dot appeared in a previously empty cell.
    Spawned {
        /// Cell holding the new dot.
        cell: CellCoord,
        /// Color of the new dot.
        color: ColorId,
    },
    /// The session score changed.
    ScoreChanged {
        /// Score after the change.
        score: u64,
    },
    /// The round countdown changed.
    TimeChanged {
        /// Time left in the round.
        remaining: Duration,
    },
    /// The session entered a new lifecycle state.
    StateChanged {
        /// State that became active.
        state: SessionState,
    },
    /// A cell joined the in-progress selection.
    DotSelected {
        /// Cell that was selected.
        cell: CellCoord,
    },
    /// A cell left the in-progress selection.
    DotDeselected {
        /// Cell that was deselected.
        cell: CellCoord,
    },
}

/// Reasons an input request was ignored.
///
/// None of these are errors: they describe "nothing happens" feedback that the
/// presentation layer may use or discard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    /// The coordinate lies outside the grid.
    InvalidCoordinate,
    /// Input arrived while the round is not being played.
    InactiveSession,
    /// The targeted cell holds no dot.
    EmptyCell,
    /// The targeted cell is already part of the selection.
    AlreadySelected,
    /// The targeted dot does not match the selection color.
    ColorMismatch,
    /// The targeted cell does not touch the end of the selection.
    NotAdjacent,
    /// A previous match is still collapsing or refilling.
    ResolutionInProgress,
}

/// Index of a color within the active [`ColorPalette`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColorId(u8);

impl ColorId {
    /// Creates a new color identifier with the provided palette index.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the palette index.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Ordered, fixed-size set of dot colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorPalette {
    size: u8,
}

impl ColorPalette {
    /// Creates a palette holding `size` colors.
    ///
    /// Sizes outside `MIN_PALETTE_SIZE..=MAX_PALETTE_SIZE` are rejected.
    pub fn new(size: u8) -> Result<Self, ConfigError> {
        if size < MIN_PALETTE_SIZE {
            return Err(ConfigError::PaletteTooSmall { size });
        }
        if size > MAX_PALETTE_SIZE {
            return Err(ConfigError::PaletteTooLarge { size });
        }
        Ok(Self { size })
    }

    /// Number of colors in the palette.
    #[must_use]
    pub const fn size(&self) -> u8 {
        self.size
    }

    /// Reports whether the color belongs to the palette.
    #[must_use]
    pub const fn contains(&self, color: ColorId) -> bool {
        color.get() < self.size
    }

    /// Color assigned to a merge dot created from `color`.
    ///
    /// Cycles through the palette, wrapping the last color to the first.
    #[must_use]
    pub fn next(&self, color: ColorId) -> ColorId {
        let next = (u16::from(color.get()) + 1) % u16::from(self.size);
        ColorId::new(next as u8)
    }

    /// Draws a uniformly distributed color for spawned dots.
    pub fn random_color<R>(&self, rng: &mut R) -> ColorId
    where
        R: Rng + ?Sized,
    {
        ColorId::new(rng.gen_range(0..self.size))
    }

    /// Iterator over every color in palette order.
    pub fn colors(&self) -> impl Iterator<Item = ColorId> {
        (0..self.size).map(ColorId::new)
    }
}

/// Contents of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// The cell holds no dot.
    #[default]
    Empty,
    /// The cell holds a dot of the given color.
    Occupied(ColorId),
}

impl Cell {
    /// Color of the dot in the cell, if any.
    #[must_use]
    pub const fn color(self) -> Option<ColorId> {
        match self {
            Self::Empty => None,
            Self::Occupied(color) => Some(color),
        }
    }

    /// Reports whether the cell holds no dot.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Reports whether the cell holds a dot.
    #[must_use]
    pub const fn is_occupied(self) -> bool {
        !self.is_empty()
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Rows grow upward: row zero is the bottom of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell, counted from the bottom.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Read-only view into the dense cell matrix.
///
/// Cells are stored column by column, each column bottom to top.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [Cell],
    columns: u32,
    rows: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided column-major slice.
    #[must_use]
    pub fn new(cells: &'a [Cell], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Provides the `(columns, rows)` dimensions of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Returns the contents of the cell, or `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<Cell> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Iterates a column bottom to top as `(row, cell)` pairs.
    ///
    /// Columns outside the grid yield nothing.
    pub fn column(&self, column: u32) -> impl Iterator<Item = (u32, Cell)> + 'a {
        let cells: &'a [Cell] = if column < self.columns {
            let rows = self.rows as usize;
            let start = column as usize * rows;
            self.cells.get(start..start + rows).unwrap_or(&[])
        } else {
            &[]
        };
        (0_u32..).zip(cells.iter().copied())
    }

    /// Iterates every cell, columns left to right and rows bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Cell)> + 'a {
        let rows = self.rows.max(1);
        (0_u32..)
            .zip(self.cells.iter().copied())
            .map(move |(index, cell)| (CellCoord::new(index / rows, index % rows), cell))
    }

    /// Number of cells that hold a dot.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_occupied()).count()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let column = usize::try_from(cell.column()).ok()?;
            let row = usize::try_from(cell.row()).ok()?;
            let height = usize::try_from(self.rows).ok()?;
            Some(column * height + row)
        } else {
            None
        }
    }
}
