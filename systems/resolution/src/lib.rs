#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure match resolution system that scores finished paths and plans merge dots.

use dot_merge_core::{Cell, CellCoord, ColorId, ColorPalette, Command, GridView};
use tracing::warn;

/// Shortest path that resolves into a match.
pub const MIN_MATCH_LENGTH: usize = 2;

/// Dot created where a resolved path ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeDot {
    /// Last cell of the resolved path.
    pub cell: CellCoord,
    /// Palette successor of the path color.
    pub color: ColorId,
}

/// Summary of a resolved match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Number of dots consumed by the match.
    pub path_length: usize,
    /// Points awarded for the match.
    pub points: u64,
    /// Merge dot owed to the grid.
    pub merge: MergeDot,
}

/// Converts finished selection paths into scoring and removal commands.
#[derive(Clone, Copy, Debug)]
pub struct MatchResolver {
    points_per_dot: u32,
}

impl MatchResolver {
    /// Creates a resolver awarding `points_per_dot` for each consumed dot.
    #[must_use]
    pub const fn new(points_per_dot: u32) -> Self {
        Self { points_per_dot }
    }

    /// Emits the score award and one cell clear per path element, in path order.
    ///
    /// Returns `None` without emitting anything when the path is shorter than
    /// [`MIN_MATCH_LENGTH`] or no longer describes a chain of adjacent dots of
    /// one color on `grid`. The merge dot is not written here; hand the returned
    /// [`MergeDot`] to [`MatchResolver::place_merge`] once the path is vacated.
    pub fn resolve(
        &self,
        path: &[CellCoord],
        grid: GridView<'_>,
        palette: ColorPalette,
        out: &mut Vec<Command>,
    ) -> Option<Resolution> {
        if path.len() < MIN_MATCH_LENGTH {
            return None;
        }
        let last = *path.last()?;
        let Some(color) = grid.cell(last).and_then(Cell::color) else {
            warn!(?last, "path ends on an empty or missing cell");
            return None;
        };
        if !is_chain(path, grid, color) {
            warn!(length = path.len(), "path no longer matches the grid");
            return None;
        }

        let path_length = path.len();
        let points = u64::try_from(path_length)
            .unwrap_or(u64::MAX)
            .saturating_mul(u64::from(self.points_per_dot));

        out.push(Command::AwardPoints { points });
        out.extend(path.iter().map(|cell| Command::ClearCell { cell: *cell }));

        Some(Resolution {
            path_length,
            points,
            merge: MergeDot {
                cell: last,
                color: palette.next(color),
            },
        })
    }

    /// Emits the spawn command for a merge dot against the current grid.
    ///
    /// Returns the cell that receives the dot, or `None` when its column has
    /// no room left.
    pub fn place_merge(
        &self,
        merge: MergeDot,
        grid: GridView<'_>,
        out: &mut Vec<Command>,
    ) -> Option<CellCoord> {
        let Some(cell) = merge_cell(merge.cell, grid) else {
            warn!(cell = ?merge.cell, "no room left for the merge dot");
            return None;
        };
        out.push(Command::SpawnDot {
            cell,
            color: merge.color,
        });
        Some(cell)
    }
}

/// Picks the cell that receives a merge dot aimed at `preferred`.
///
/// The preferred cell wins while it is empty. Otherwise the lowest empty cell
/// of the same column is used.
#[must_use]
pub fn merge_cell(preferred: CellCoord, grid: GridView<'_>) -> Option<CellCoord> {
    match grid.cell(preferred)? {
        Cell::Empty => Some(preferred),
        Cell::Occupied(_) => grid
            .column(preferred.column())
            .find(|(_, cell)| cell.is_empty())
            .map(|(row, _)| CellCoord::new(preferred.column(), row)),
    }
}

fn is_chain(path: &[CellCoord], grid: GridView<'_>, color: ColorId) -> bool {
    let colors_match = path
        .iter()
        .all(|cell| grid.cell(*cell) == Some(Cell::Occupied(color)));
    let linked = path.windows(2).all(|pair| pair[0].is_adjacent(pair[1]));
    let unique = path
        .iter()
        .enumerate()
        .all(|(index, cell)| !path[index + 1..].contains(cell));
    colors_match && linked && unique
}
