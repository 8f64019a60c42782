#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure gravity system that compacts every column toward row zero.

use dot_merge_core::{CellCoord, Command, GridView};

/// Collapses columns after dots were removed.
///
/// Each column is compacted independently: its dots keep their bottom to top
/// order and end up packed from row zero, leaving the empty cells on top.
#[derive(Clone, Copy, Debug, Default)]
pub struct Gravity;

impl Gravity {
    /// Creates the gravity system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits one move per dot whose row changes.
    ///
    /// Columns are visited left to right and each column bottom to top, so
    /// applying the commands in order never moves a dot into an occupied cell.
    pub fn handle(&self, grid: GridView<'_>, out: &mut Vec<Command>) {
        let (columns, _) = grid.dimensions();
        for column in 0..columns {
            compact_column(grid, column, out);
        }
    }
}

fn compact_column(grid: GridView<'_>, column: u32, out: &mut Vec<Command>) {
    let mut landing_row = 0;
    for (row, cell) in grid.column(column) {
        if cell.is_empty() {
            continue;
        }
        if row != landing_row {
            out.push(Command::MoveDot {
                from: CellCoord::new(column, row),
                to: CellCoord::new(column, landing_row),
            });
        }
        landing_row += 1;
    }
}
