pub mod board;
pub mod config;
pub mod game;
pub mod piece;
