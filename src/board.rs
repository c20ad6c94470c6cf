use crate::piece::{filled_offsets, Cell, Grid, Position};

// ============================================================================
// Board
// ============================================================================

/// Locked cells, row-major with row 0 at the top.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell>>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: vec![vec![Cell::Empty; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Whether the signed coordinate lies on the board.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Panics if `(x, y)` is off the board.
    pub fn get_cell(&self, x: usize, y: usize) -> Cell {
        self.check_bounds(x, y);
        self.rows[y][x]
    }

    /// Panics if `(x, y)` is off the board.
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        self.check_bounds(x, y);
        self.rows[y][x] = cell;
    }

    fn check_bounds(&self, x: usize, y: usize) {
        assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) is outside the {}x{} board",
            self.width,
            self.height
        );
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows[y].iter().all(|cell| cell.is_filled())
    }

    /// Removes every full row and shifts the rows above down. Returns the number removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| row.iter().any(|cell| cell.is_empty()));
        let cleared = before - self.rows.len();

        let mut rows = vec![vec![Cell::Empty; self.width]; cleared];
        rows.append(&mut self.rows);
        self.rows = rows;

        cleared
    }

    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.rows[y].iter().filter(|cell| cell.is_filled()).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| cell.is_filled()).count()
    }
}

// ============================================================================
// Collision Detector
// ============================================================================

/// Whether `grid` placed with its top-left corner at `origin` hits a wall, the floor or a
/// locked cell.
///
/// Cells above the top edge are only checked against the side walls, so a piece may sit
/// partially above the board.
pub fn collides(grid: &Grid, origin: Position, board: &Board) -> bool {
    filled_offsets(grid).any(|(dx, dy)| {
        let x = origin.x + dx;
        let y = origin.y + dy;
        if x < 0 || x >= board.width() as i32 || y >= board.height() as i32 {
            return true;
        }
        y >= 0 && board.get_cell(x as usize, y as usize).is_filled()
    })
}
