//! Console front end for nested tic-tac-toe.
//!
//! Hosts or joins a match over TCP, or plays both seats on one console.
//! Game rules live in `nested_tictactoe`; synchronization and transports in
//! `nested_sync`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod console;

pub use cli::{Cli, Command};
pub use config::{ConfigError, GameConfig};
pub use console::{ConsoleView, Input, InputError, parse_line};
