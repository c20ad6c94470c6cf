// ============================================================================
// Configuration
// ============================================================================

/// Side length of the square box every shape is encoded in.
///
/// Rotation assumes this box for all kinds, so every shape must fit in it.
pub const BOX: usize = 4;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Stable identity in `1..=7`. Zero is reserved for an empty cell.
    pub fn id(self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::J => 2,
            PieceKind::L => 3,
            PieceKind::O => 4,
            PieceKind::S => 5,
            PieceKind::T => 6,
            PieceKind::Z => 7,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1..=7 => Some(Self::ALL[usize::from(id) - 1]),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(PieceKind),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    pub fn is_filled(self) -> bool {
        !self.is_empty()
    }
}

/// A piece's cells, indexed `grid[row][col]`.
pub type Grid = [[Cell; BOX]; BOX];

// ============================================================================
// Shape Catalog
// ============================================================================

const SHAPE_BITS: [[[u8; BOX]; BOX]; 7] = [
    // I
    [[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]],
    // J
    [[0, 0, 0, 0], [1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0]],
    // L
    [[0, 0, 0, 0], [0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0]],
    // O
    [[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
    // S
    [[0, 0, 0, 0], [0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0]],
    // T
    [[0, 0, 0, 0], [0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0]],
    // Z
    [[0, 0, 0, 0], [1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
];

/// Canonical spawn orientation of `kind`.
pub fn shape_for(kind: PieceKind) -> Grid {
    let bits = &SHAPE_BITS[usize::from(kind.id()) - 1];
    let mut grid = [[Cell::Empty; BOX]; BOX];
    for (y, row) in bits.iter().enumerate() {
        for (x, &bit) in row.iter().enumerate() {
            if bit != 0 {
                grid[y][x] = Cell::Filled(kind);
            }
        }
    }
    grid
}

// ============================================================================
// Piece Transform
// ============================================================================

/// Rotates a grid 90° clockwise: `out[x][BOX - 1 - y] = grid[y][x]`.
pub fn rotate_clockwise(grid: &Grid) -> Grid {
    let mut rotated = [[Cell::Empty; BOX]; BOX];
    for (y, row) in grid.iter().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            rotated[x][BOX - 1 - y] = cell;
        }
    }
    rotated
}

// ============================================================================
// Active Piece
// ============================================================================

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub cells: Grid,
    pub position: Position,
}

impl ActivePiece {
    /// Spawn orientation, horizontally centred on a board `board_width` wide, anchored at row 0.
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        let x = (board_width as i32 - BOX as i32) / 2;
        Self::new_at(kind, x, 0)
    }

    pub fn new_at(kind: PieceKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            cells: shape_for(kind),
            position: Position::new(x, y),
        }
    }

    /// Board positions of every filled cell.
    pub fn blocks(&self) -> impl Iterator<Item = Position> + '_ {
        filled_offsets(&self.cells).map(move |(dx, dy)| self.position.offset(dx, dy))
    }

    pub fn rotated(&self) -> Self {
        Self {
            kind: self.kind,
            cells: rotate_clockwise(&self.cells),
            position: self.position,
        }
    }

    pub fn moved(&self, dx: i32, dy: i32) -> Self {
        Self {
            kind: self.kind,
            cells: self.cells,
            position: self.position.offset(dx, dy),
        }
    }
}

/// `(col, row)` offsets of the filled cells of `grid`.
pub fn filled_offsets(grid: &Grid) -> impl Iterator<Item = (i32, i32)> + '_ {
    grid.iter().enumerate().flat_map(|(y, row)| {
        row.iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_filled())
            .map(move |(x, _)| (x as i32, y as i32))
    })
}
