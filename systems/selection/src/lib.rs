#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure selection system that tracks the path a player traces across the grid.
//!
//! The system never mutates the grid. It reads a [`GridView`] to validate each
//! input and reports highlight changes as [`Event::DotSelected`] and
//! [`Event::DotDeselected`].

use dot_merge_core::{CellCoord, ColorId, Event, GridView, Rejection};
use tracing::{debug, warn};

/// Result of feeding a coordinate to a [`SelectionPath`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtendOutcome {
    /// The coordinate became the first element of an empty path.
    Started(CellCoord),
    /// The coordinate was appended to the path.
    Extended(CellCoord),
    /// The coordinate matched the penultimate element, so the last one was dropped.
    Backtracked {
        /// Element removed from the end of the path.
        removed: CellCoord,
    },
    /// The coordinate is already the end of the path.
    Unchanged,
    /// The coordinate was not accepted.
    Ignored(Rejection),
}

/// Ordered, duplicate-free sequence of same-colored adjacent cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionPath {
    cells: Vec<CellCoord>,
    color: Option<ColorId>,
}

impl SelectionPath {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to grow, start, or backtrack the path with `cell`.
    ///
    /// Inputs outside active play, outside the grid, or on empty cells never
    /// change the path. Revisiting the penultimate element drops the last one.
    /// Anything else is appended only when it is new, matches the color of
    /// the first element, and touches the current end of the path.
    pub fn try_extend(&mut self, cell: CellCoord, grid: GridView<'_>, active: bool) -> ExtendOutcome {
        if !active {
            return ExtendOutcome::Ignored(Rejection::InactiveSession);
        }
        let Some(contents) = grid.cell(cell) else {
            return ExtendOutcome::Ignored(Rejection::InvalidCoordinate);
        };
        let Some(color) = contents.color() else {
            return ExtendOutcome::Ignored(Rejection::EmptyCell);
        };

        let Some(last) = self.last() else {
            self.cells.push(cell);
            self.color = Some(color);
            return ExtendOutcome::Started(cell);
        };

        if cell == last {
            return ExtendOutcome::Unchanged;
        }

        if self.penultimate() == Some(cell) {
            return match self.cells.pop() {
                Some(removed) => ExtendOutcome::Backtracked { removed },
                None => ExtendOutcome::Unchanged,
            };
        }

        if self.cells.contains(&cell) {
            return ExtendOutcome::Ignored(Rejection::AlreadySelected);
        }
        if self.color != Some(color) {
            return ExtendOutcome::Ignored(Rejection::ColorMismatch);
        }
        if !last.is_adjacent(cell) {
            return ExtendOutcome::Ignored(Rejection::NotAdjacent);
        }

        self.cells.push(cell);
        ExtendOutcome::Extended(cell)
    }

    /// Returns the traced cells and leaves the path empty.
    pub fn finish(&mut self) -> Vec<CellCoord> {
        self.color = None;
        std::mem::take(&mut self.cells)
    }

    /// Discards the path without resolving it, returning the dropped cells.
    pub fn clear(&mut self) -> Vec<CellCoord> {
        self.finish()
    }

    /// Cells of the path in trace order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Number of cells in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the path holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Color of the first selected dot.
    #[must_use]
    pub fn reference_color(&self) -> Option<ColorId> {
        self.color
    }

    /// Current end of the path.
    #[must_use]
    pub fn last(&self) -> Option<CellCoord> {
        self.cells.last().copied()
    }

    fn penultimate(&self) -> Option<CellCoord> {
        let len = self.cells.len();
        if len < 2 {
            return None;
        }
        self.cells.get(len - 2).copied()
    }
}

/// Selection system that turns press, drag, and release input into path updates.
#[derive(Debug, Default)]
pub struct Selection {
    path: SelectionPath,
}

impl Selection {
    /// Creates a selection system with an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only access to the in-progress path.
    #[must_use]
    pub fn path(&self) -> &SelectionPath {
        &self.path
    }

    /// Starts a new trace at `cell`, abandoning any stale one.
    pub fn press(
        &mut self,
        cell: CellCoord,
        grid: GridView<'_>,
        active: bool,
        out: &mut Vec<Event>,
    ) -> ExtendOutcome {
        self.cancel(out);
        self.drag(cell, grid, active, out)
    }

    /// Feeds a drag position to the in-progress trace.
    pub fn drag(
        &mut self,
        cell: CellCoord,
        grid: GridView<'_>,
        active: bool,
        out: &mut Vec<Event>,
    ) -> ExtendOutcome {
        let outcome = self.path.try_extend(cell, grid, active);
        match outcome {
            ExtendOutcome::Started(selected) | ExtendOutcome::Extended(selected) => {
                out.push(Event::DotSelected { cell: selected });
            }
            ExtendOutcome::Backtracked { removed } => {
                out.push(Event::DotDeselected { cell: removed });
            }
            ExtendOutcome::Ignored(Rejection::InvalidCoordinate) => {
                warn!(?cell, "selection input outside the grid");
            }
            ExtendOutcome::Ignored(reason) => {
                debug!(?cell, ?reason, "selection input ignored");
            }
            ExtendOutcome::Unchanged => {}
        }
        outcome
    }

    /// Ends the trace, deselecting its cells and returning them in trace order.
    pub fn release(&mut self, out: &mut Vec<Event>) -> Vec<CellCoord> {
        let cells = self.path.finish();
        out.extend(cells.iter().map(|cell| Event::DotDeselected { cell: *cell }));
        cells
    }

    /// Drops the trace without resolving it.
    pub fn cancel(&mut self, out: &mut Vec<Event>) {
        out.extend(
            self.path
                .clear()
                .into_iter()
                .map(|cell| Event::DotDeselected { cell }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dot_merge_core::Cell;

    #[test]
    fn penultimate_requires_two_cells() {
        let cells = [Cell::Occupied(ColorId::new(0)); 4];
        let grid = GridView::new(&cells, 2, 2);
        let mut path = SelectionPath::new();
        assert_eq!(path.penultimate(), None);

        let _ = path.try_extend(CellCoord::new(0, 0), grid, true);
        assert_eq!(path.penultimate(), None);

        let _ = path.try_extend(CellCoord::new(0, 1), grid, true);
        assert_eq!(path.penultimate(), Some(CellCoord::new(0, 0)));
    }
}
