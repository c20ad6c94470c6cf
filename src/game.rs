use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::board::{collides, Board};
use crate::config::{ConfigError, EngineConfig};
use crate::piece::{ActivePiece, Cell, PieceKind};

// ============================================================================
// Scoring
// ============================================================================

pub const SCORE_SINGLE: u32 = 100;
pub const SCORE_DOUBLE: u32 = 300;
pub const SCORE_TRIPLE: u32 = 500;
pub const SCORE_TETRIS: u32 = 800;

/// Points for clearing `rows` rows with a single lock.
pub fn line_clear_score(rows: usize) -> u32 {
    match rows {
        0 => 0,
        1 => SCORE_SINGLE,
        2 => SCORE_DOUBLE,
        3 => SCORE_TRIPLE,
        _ => SCORE_TETRIS,
    }
}

// ============================================================================
// Types
// ============================================================================

/// Engine state. `Spawning` and `Locking` only exist while the engine is inside a lock or
/// spawn step; every public method returns with the game in `Falling` or `GameOver`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Spawning,
    Falling,
    Locking,
    GameOver,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Input {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
    Quit,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceSpawned(PieceKind),
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    GameOver,
}

// ============================================================================
// Piece Source Trait
// ============================================================================

pub trait PieceSource {
    fn next_piece(&mut self) -> PieceKind;
}

/// Uniform pick over the seven kinds.
pub struct RandomPieceSource<R = StdRng> {
    rng: R,
}

impl<R: Rng> RandomPieceSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomPieceSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> PieceSource for RandomPieceSource<R> {
    fn next_piece(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.gen_range(0..PieceKind::ALL.len())]
    }
}

/// Cycles through a fixed list of kinds.
pub struct SequencePieceSource {
    pieces: Vec<PieceKind>,
    index: usize,
}

impl SequencePieceSource {
    /// Panics if `pieces` is empty.
    pub fn new(pieces: Vec<PieceKind>) -> Self {
        assert!(!pieces.is_empty(), "piece sequence must not be empty");
        Self { pieces, index: 0 }
    }
}

impl PieceSource for SequencePieceSource {
    fn next_piece(&mut self) -> PieceKind {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub board: Board,
    pub piece: ActivePiece,
    score: u32,
    state: GameState,
    config: EngineConfig,
    last_fall: Instant,
    piece_source: Box<dyn PieceSource>,
    events: Vec<GameEvent>,
}

impl Game {
    /// Default 10x20 game with a seeded random piece sequence.
    pub fn new(seed: u64, now: Instant) -> Self {
        let source = Box::new(RandomPieceSource::seeded(seed));
        Self::start(EngineConfig::default(), source, now)
    }

    pub fn with_config(
        config: EngineConfig,
        source: Box<dyn PieceSource>,
        now: Instant,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::start(config, source, now))
    }

    /// Resumes from an arbitrary board with `piece` already falling. The piece is not
    /// checked for collision.
    pub fn with_board(
        board: Board,
        piece: ActivePiece,
        source: Box<dyn PieceSource>,
        now: Instant,
    ) -> Self {
        let config = EngineConfig {
            width: board.width(),
            height: board.height(),
            ..EngineConfig::default()
        };
        Self {
            board,
            piece,
            score: 0,
            state: GameState::Falling,
            config,
            last_fall: now,
            piece_source: source,
            events: Vec::new(),
        }
    }

    fn start(config: EngineConfig, mut source: Box<dyn PieceSource>, now: Instant) -> Self {
        let board = Board::new(config.width, config.height);
        let piece = ActivePiece::spawn(source.next_piece(), config.width);
        let mut game = Self {
            board,
            piece,
            score: 0,
            state: GameState::Spawning,
            config,
            last_fall: now,
            piece_source: source,
            events: Vec::new(),
        };
        game.enter_play();
        game
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn is_valid_position(&self, piece: &ActivePiece) -> bool {
        !collides(&piece.cells, piece.position, &self.board)
    }

    // ------------------------------------------------------------------------
    // Spawn and lock
    // ------------------------------------------------------------------------

    fn spawn_next_piece(&mut self) {
        self.state = GameState::Spawning;
        let kind = self.piece_source.next_piece();
        self.piece = ActivePiece::spawn(kind, self.board.width());
        self.enter_play();
    }

    /// Finishes a spawn: the current piece either starts falling or ends the game.
    fn enter_play(&mut self) {
        let kind = self.piece.kind;
        if self.is_valid_position(&self.piece) {
            self.state = GameState::Falling;
            debug!(?kind, x = self.piece.position.x, "piece spawned");
            self.events.push(GameEvent::PieceSpawned(kind));
        } else {
            self.end_game("spawn blocked");
        }
    }

    fn end_game(&mut self, reason: &'static str) {
        self.state = GameState::GameOver;
        info!(reason, score = self.score, "game over");
        self.events.push(GameEvent::GameOver);
    }

    fn lock_piece(&mut self) -> bool {
        self.state = GameState::Locking;
        let cell = Cell::Filled(self.piece.kind);
        let blocks: Vec<_> = self.piece.blocks().collect();

        if blocks.iter().any(|b| !self.board.contains(b.x, b.y)) {
            return false;
        }
        for block in blocks {
            self.board.set_cell(block.x as usize, block.y as usize, cell);
        }
        debug!(kind = ?self.piece.kind, x = self.piece.position.x, y = self.piece.position.y, "piece locked");
        self.events.push(GameEvent::PieceLocked);
        true
    }

    fn clear_lines(&mut self) -> usize {
        let cleared = self.board.clear_full_rows();
        if cleared > 0 {
            info!(rows = cleared, "lines cleared");
            self.events.push(GameEvent::LinesCleared(cleared as u32));
        }
        cleared
    }

    fn add_score(&mut self, rows: usize) {
        self.score = self.score.saturating_add(line_clear_score(rows));
    }

    fn lock_and_spawn(&mut self, now: Instant) {
        self.last_fall = now;
        if !self.lock_piece() {
            self.end_game("piece locked above the board");
            return;
        }
        let rows = self.clear_lines();
        self.add_score(rows);
        self.spawn_next_piece();
    }

    // ------------------------------------------------------------------------
    // Player actions
    // ------------------------------------------------------------------------

    fn shift(&mut self, dx: i32, dy: i32) -> bool {
        if self.state != GameState::Falling {
            return false;
        }
        let moved = self.piece.moved(dx, dy);
        if self.is_valid_position(&moved) {
            self.piece = moved;
            self.events.push(GameEvent::PieceMoved);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(1, 0)
    }

    /// Rotates clockwise in place. There are no wall kicks: a colliding rotation is dropped.
    pub fn rotate(&mut self) -> bool {
        if self.state != GameState::Falling {
            return false;
        }
        let rotated = self.piece.rotated();
        if self.is_valid_position(&rotated) {
            self.piece = rotated;
            self.events.push(GameEvent::PieceRotated);
            true
        } else {
            false
        }
    }

    /// Moves one row down and restarts the gravity timer, or locks if blocked.
    /// Returns whether the piece descended.
    pub fn soft_drop(&mut self, now: Instant) -> bool {
        if self.state != GameState::Falling {
            return false;
        }
        if self.shift(0, 1) {
            self.last_fall = now;
            true
        } else {
            self.lock_and_spawn(now);
            false
        }
    }

    pub fn hard_drop(&mut self, now: Instant) {
        if self.state != GameState::Falling {
            return;
        }
        let mut dropped = self.piece.moved(0, 1);
        while self.is_valid_position(&dropped) {
            self.piece = dropped;
            dropped = self.piece.moved(0, 1);
        }
        self.lock_and_spawn(now);
    }

    /// Applies gravity once the configured interval has fully elapsed since the last fall.
    pub fn tick(&mut self, now: Instant) {
        if self.state != GameState::Falling {
            return;
        }
        if now.saturating_duration_since(self.last_fall) <= self.config.gravity_interval {
            return;
        }
        if self.shift(0, 1) {
            self.last_fall = now;
        } else {
            self.lock_and_spawn(now);
        }
    }

    pub fn quit(&mut self) {
        if self.state != GameState::GameOver {
            self.end_game("quit");
        }
    }

    pub fn handle_input(&mut self, input: Input, now: Instant) {
        match input {
            Input::MoveLeft => {
                self.move_left();
            }
            Input::MoveRight => {
                self.move_right();
            }
            Input::SoftDrop => {
                self.soft_drop(now);
            }
            Input::Rotate => {
                self.rotate();
            }
            Input::HardDrop => self.hard_drop(now),
            Input::Quit => self.quit(),
        }
    }

    /// Returns the board with the active piece overlaid. Cells above the board are clipped.
    pub fn visible_cells(&self) -> Vec<Vec<Cell>> {
        let mut cells = self.board.rows().to_vec();
        for block in self.piece.blocks() {
            if self.board.contains(block.x, block.y) {
                cells[block.y as usize][block.x as usize] = Cell::Filled(self.piece.kind);
            }
        }
        cells
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

    pub fn empty_board() -> Board {
        Board::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    pub fn fill_row(board: &mut Board, y: usize) {
        for x in 0..board.width() {
            board.set_cell(x, y, Cell::Filled(PieceKind::T));
        }
    }

    pub fn fill_row_except(board: &mut Board, y: usize, gaps: &[usize]) {
        for x in 0..board.width() {
            if !gaps.contains(&x) {
                board.set_cell(x, y, Cell::Filled(PieceKind::T));
            }
        }
    }
}
