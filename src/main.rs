mod input;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{stdout, Stdout},
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, info};

use blockfall::config::{EngineConfig, DEFAULT_GRAVITY_MS, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use blockfall::game::{Game, GameEvent, GameState, Input, RandomPieceSource};
use blockfall::piece::{Cell, PieceKind};
use input::{key_to_action, Action};

// ============================================================================
// Command Line
// ============================================================================

/// Falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Falling-block puzzle in the terminal.",
    long_about = "Falling-block puzzle in the terminal.\n\n\
        CONTROLS:\n  Left/h  Move left   Right/l  Move right   Down/j  Soft drop\n  \
        Up/k/x  Rotate      Space/Enter  Hard drop   R  Restart (after game over)\n  Q/Esc  Quit"
)]
struct Args {
    /// Board width in cells.
    #[arg(long, default_value_t = DEFAULT_WIDTH, value_name = "COLS")]
    width: usize,

    /// Board height in cells.
    #[arg(long, default_value_t = DEFAULT_HEIGHT, value_name = "ROWS")]
    height: usize,

    /// Milliseconds between gravity steps.
    #[arg(long, default_value_t = DEFAULT_GRAVITY_MS, value_name = "MS")]
    gravity_ms: u64,

    /// Render and input poll rate.
    #[arg(long, default_value_t = 30, value_name = "RATE", value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Seed for a reproducible piece sequence.
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            width: self.width,
            height: self.height,
            gravity_interval: Duration::from_millis(self.gravity_ms),
        }
    }

    fn new_game(&self) -> Result<Game> {
        let source = match self.seed {
            Some(seed) => RandomPieceSource::seeded(seed),
            None => RandomPieceSource::from_entropy(),
        };
        Game::with_config(self.engine_config(), Box::new(source), Instant::now())
            .context("invalid game configuration")
    }
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const INFO_WIDTH: u16 = 14;

fn piece_color(kind: PieceKind) -> Color {
    match kind {
        PieceKind::I => Color::Cyan,
        PieceKind::J => Color::Blue,
        PieceKind::L => Color::Rgb(255, 165, 0),
        PieceKind::O => Color::Yellow,
        PieceKind::S => Color::Green,
        PieceKind::T => Color::Magenta,
        PieceKind::Z => Color::Red,
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game) {
    let area = frame.size();
    render_game(frame, game, area);
    if game.state() == GameState::GameOver {
        render_game_over(frame, game, area);
    }
}

fn render_game(frame: &mut Frame, game: &Game, area: Rect) {
    let grid_display_width = (game.board.width() as u16 * CELL_WIDTH) + 2;
    let grid_display_height = game.board.height() as u16 + 2;
    let total_width = grid_display_width + INFO_WIDTH;

    let main_area = centered_rect(total_width, grid_display_height, area);
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(INFO_WIDTH),
    ])
    .split(main_area);

    render_grid(frame, game, horizontal[0]);
    render_info(frame, game, horizontal[1]);
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blockfall ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = game
        .visible_cells()
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match *cell {
                    Cell::Empty => Span::raw(EMPTY_CHAR),
                    Cell::Filled(kind) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(piece_color(kind)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score())),
        Line::from(""),
        Line::from(Span::styled("Controls", Style::default().fg(Color::DarkGray))),
        Line::from("←→ move"),
        Line::from("↑ rotate"),
        Line::from("↓ soft drop"),
        Line::from("space drop"),
        Line::from("q quit"),
    ];

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score())),
        Line::from(""),
        Line::from(Span::styled(
            "R to restart",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Q/ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(paragraph, centered_rect(24, 10, area));
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn init_logging(path: &Path) -> Result<()> {
    let log_file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init()
        .map_err(anyhow::Error::from_boxed)
        .context("failed to install log subscriber")
}

fn log_events(game: &mut Game) {
    for event in game.take_events() {
        match event {
            GameEvent::PieceMoved | GameEvent::PieceRotated => {}
            other => debug!(event = ?other, score = game.score(), "game event"),
        }
    }
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, args: &Args) -> Result<()> {
    let frame_interval = Duration::from_secs(1) / args.fps;
    let mut game = args.new_game()?;
    info!(seed = ?args.seed, width = args.width, height = args.height, "game started");

    loop {
        terminal.draw(|frame| render(frame, &game))?;

        if event::poll(frame_interval)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key_to_action(key) {
                        Action::Play(Input::Quit) => {
                            game.quit();
                            log_events(&mut game);
                            break;
                        }
                        Action::Play(input) => game.handle_input(input, Instant::now()),
                        Action::Restart if game.is_game_over() => {
                            info!(score = game.score(), "restarting");
                            game = args.new_game()?;
                        }
                        Action::Restart | Action::None => {}
                    }
                }
            }
        }

        game.tick(Instant::now());
        log_events(&mut game);
    }

    info!(score = game.score(), "session ended");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }
    // Reject a bad configuration before taking over the terminal.
    args.engine_config()
        .validate()
        .context("invalid game configuration")?;

    enable_raw_mode().context("failed to enable raw mode")?;
    let result = stdout()
        .execute(EnterAlternateScreen)
        .context("failed to enter alternate screen")
        .and_then(|_| Terminal::new(CrosstermBackend::new(stdout())).context("failed to create terminal"))
        .and_then(|mut terminal| run(&mut terminal, &args));

    // Restore the terminal whether or not the game loop succeeded.
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}
