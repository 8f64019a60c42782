//! Dense cell matrix owned by the world.

use dot_merge_core::{Cell, CellCoord, GridView};

/// Errors raised when a caller breaks the grid's coordinate contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The coordinate lies outside the grid.
    #[error("cell ({column}, {row}) lies outside the {columns}x{rows} grid")]
    InvalidCoordinate {
        /// Requested column.
        column: u32,
        /// Requested row.
        row: u32,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
}

/// Width by height matrix of cells with row zero at the bottom.
///
/// Dimensions are fixed at construction; the backing storage never grows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridState {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl GridState {
    /// Creates an empty grid with the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![Cell::Empty; capacity],
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Returns the contents of a cell.
    pub fn get(&self, cell: CellCoord) -> Result<Cell, GridError> {
        let index = self.index(cell)?;
        Ok(self.cells[index])
    }

    /// Overwrites a cell, returning its previous contents.
    pub fn set(&mut self, cell: CellCoord, value: Cell) -> Result<Cell, GridError> {
        let index = self.index(cell)?;
        Ok(std::mem::replace(&mut self.cells[index], value))
    }

    /// Reports whether two cells share an edge.
    #[must_use]
    pub fn is_adjacent(a: CellCoord, b: CellCoord) -> bool {
        a.is_adjacent(b)
    }

    /// Iterates a column bottom to top as `(row, cell)` pairs.
    pub fn column_cells(
        &self,
        column: u32,
    ) -> Result<impl Iterator<Item = (u32, Cell)> + '_, GridError> {
        let _ = self.index(CellCoord::new(column, 0))?;
        Ok(self.view().column(column))
    }

    /// Vacates every cell, returning the coordinates that held a dot.
    pub fn clear(&mut self) -> Vec<CellCoord> {
        let occupied: Vec<CellCoord> = self
            .view()
            .iter()
            .filter(|(_, cell)| cell.is_occupied())
            .map(|(coord, _)| coord)
            .collect();
        self.cells.fill(Cell::Empty);
        occupied
    }

    /// Captures a read-only view of the cells.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Result<usize, GridError> {
        let error = GridError::InvalidCoordinate {
            column: cell.column(),
            row: cell.row(),
            columns: self.columns,
            rows: self.rows,
        };
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return Err(error);
        }
        let column = usize::try_from(cell.column()).map_err(|_| error)?;
        let row = usize::try_from(cell.row()).map_err(|_| error)?;
        let height = usize::try_from(self.rows).map_err(|_| error)?;
        Ok(column * height + row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dot_merge_core::ColorId;

    fn dot(color: u8) -> Cell {
        Cell::Occupied(ColorId::new(color))
    }

    #[test]
    fn new_grid_is_empty() {
        let grid = GridState::new(4, 3);
        assert_eq!(grid.view().occupied_count(), 0);
        assert_eq!(grid.get(CellCoord::new(3, 2)), Ok(Cell::Empty));
    }

    #[test]
    fn set_returns_previous_contents() {
        let mut grid = GridState::new(2, 2);
        let cell = CellCoord::new(1, 0);
        assert_eq!(grid.set(cell, dot(2)), Ok(Cell::Empty));
        assert_eq!(grid.set(cell, Cell::Empty), Ok(dot(2)));
        assert_eq!(grid.get(cell), Ok(Cell::Empty));
    }

    #[test]
    fn out_of_bounds_access_is_reported() {
        let mut grid = GridState::new(2, 3);
        let outside = CellCoord::new(2, 0);
        let expected = GridError::InvalidCoordinate {
            column: 2,
            row: 0,
            columns: 2,
            rows: 3,
        };
        assert_eq!(grid.get(outside), Err(expected));
        assert_eq!(grid.set(outside, dot(0)), Err(expected));
        assert!(grid.get(CellCoord::new(0, 3)).is_err());
        assert!(grid.column_cells(2).is_err());
    }

    #[test]
    fn column_cells_run_bottom_to_top() {
        let mut grid = GridState::new(3, 3);
        let _ = grid.set(CellCoord::new(1, 0), dot(0)).expect("in bounds");
        let _ = grid.set(CellCoord::new(1, 2), dot(1)).expect("in bounds");

        let column: Vec<_> = grid.column_cells(1).expect("in bounds").collect();
        assert_eq!(column, vec![(0, dot(0)), (1, Cell::Empty), (2, dot(1))]);
    }

    #[test]
    fn adjacency_requires_unit_manhattan_distance() {
        assert!(GridState::is_adjacent(
            CellCoord::new(0, 0),
            CellCoord::new(0, 1)
        ));
        assert!(!GridState::is_adjacent(
            CellCoord::new(0, 0),
            CellCoord::new(1, 1)
        ));
    }

    #[test]
    fn clear_reports_previously_occupied_cells() {
        let mut grid = GridState::new(2, 2);
        let _ = grid.set(CellCoord::new(1, 1), dot(0)).expect("in bounds");
        let _ = grid.set(CellCoord::new(0, 1), dot(1)).expect("in bounds");

        let cleared = grid.clear();
        assert_eq!(cleared, vec![CellCoord::new(0, 1), CellCoord::new(1, 1)]);
        assert_eq!(grid.view().occupied_count(), 0);
    }
}
