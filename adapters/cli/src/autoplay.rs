use dot_merge_core::{Cell, CellCoord, ColorId, Event, GridView};
use dot_merge_session::{GameSession, ReleaseOutcome, MIN_MATCH_LENGTH};

/// Longest trace the bot considers.
pub(crate) const MAX_PATH_LENGTH: usize = 8;

/// Finds the longest same-colored chain on `grid`, up to `max_length` dots.
///
/// Ties go to the chain found first, scanning start cells column by column
/// from the bottom.
pub(crate) fn longest_path(grid: GridView<'_>, max_length: usize) -> Option<Vec<CellCoord>> {
    let mut best = Vec::new();
    let mut path = Vec::with_capacity(max_length);

    for (start, contents) in grid.iter() {
        let Some(color) = contents.color() else {
            continue;
        };
        path.push(start);
        search(grid, color, max_length, &mut path, &mut best);
        path.clear();
        if best.len() >= max_length {
            break;
        }
    }

    (best.len() >= MIN_MATCH_LENGTH).then_some(best)
}

fn search(
    grid: GridView<'_>,
    color: ColorId,
    max_length: usize,
    path: &mut Vec<CellCoord>,
    best: &mut Vec<CellCoord>,
) {
    if path.len() > best.len() {
        best.clone_from(path);
    }
    if path.len() >= max_length {
        return;
    }
    let Some(last) = path.last().copied() else {
        return;
    };

    for next in neighbours(last) {
        if path.contains(&next) || grid.cell(next) != Some(Cell::Occupied(color)) {
            continue;
        }
        path.push(next);
        search(grid, color, max_length, path, best);
        let _ = path.pop();
    }
}

fn neighbours(cell: CellCoord) -> impl Iterator<Item = CellCoord> {
    let (column, row) = (cell.column(), cell.row());
    [
        column.checked_sub(1).map(|left| CellCoord::new(left, row)),
        column.checked_add(1).map(|right| CellCoord::new(right, row)),
        row.checked_sub(1).map(|below| CellCoord::new(column, below)),
        row.checked_add(1).map(|above| CellCoord::new(column, above)),
    ]
    .into_iter()
    .flatten()
}

/// Feeds `path` to the session as one press, a drag per cell, and a release.
pub(crate) fn play_path(
    session: &mut GameSession,
    path: &[CellCoord],
    out: &mut Vec<Event>,
) -> ReleaseOutcome {
    if let Some((first, rest)) = path.split_first() {
        let _ = session.on_press(*first, out);
        for cell in rest {
            let _ = session.on_drag(*cell, out);
        }
    }
    session.on_release(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds column-major cells from `lines`, written top row first.
    fn cells(lines: &[&str]) -> (Vec<Cell>, u32, u32) {
        let rows = lines.len();
        let columns = lines[0].len();
        let mut cells = vec![Cell::Empty; rows * columns];
        for (top_index, line) in lines.iter().enumerate() {
            let row = rows - 1 - top_index;
            for (column, symbol) in line.bytes().enumerate() {
                if symbol != b'.' {
                    cells[column * rows + row] = Cell::Occupied(ColorId::new(symbol - b'A'));
                }
            }
        }
        (cells, columns as u32, rows as u32)
    }

    #[test]
    fn finds_longest_chain() {
        let (cells, columns, rows) = cells(&["BBA", "ABA", "AAA"]);
        let grid = GridView::new(&cells, columns, rows);

        let path = longest_path(grid, MAX_PATH_LENGTH).expect("a chain exists");

        assert_eq!(path.len(), 6);
        assert!(path.windows(2).all(|pair| pair[0].is_adjacent(pair[1])));
        assert!(path
            .iter()
            .all(|cell| grid.cell(*cell) == Some(Cell::Occupied(ColorId::new(0)))));
    }

    #[test]
    fn respects_length_limit() {
        let (cells, columns, rows) = cells(&["AAAA", "AAAA"]);
        let grid = GridView::new(&cells, columns, rows);

        assert_eq!(longest_path(grid, 3).map(|path| path.len()), Some(3));
    }

    #[test]
    fn checkerboard_has_no_chain() {
        let (cells, columns, rows) = cells(&["ABA", "BAB", ".B."]);
        let grid = GridView::new(&cells, columns, rows);

        assert_eq!(longest_path(grid, MAX_PATH_LENGTH), None);
    }
}
