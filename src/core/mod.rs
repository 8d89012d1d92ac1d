pub mod bots;
pub mod config;
pub mod lifecycle;
pub mod terminal;
