//! Command-line interface for nested_games.

use clap::{Parser, Subcommand};
use nested_tictactoe::Player;
use std::path::PathBuf;

/// Nested Games - networked nested tic-tac-toe for two consoles
#[derive(Parser, Debug)]
#[command(name = "nested_games")]
#[command(about = "Nested tic-tac-toe over TCP or on one console", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (default: nested_games.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Play every move as this player (A or B)
    #[arg(long, global = true)]
    pub force_turn: Option<Player>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Host a match and wait for one peer (plays A)
    Host {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Join a hosted match (plays B)
    Join {
        /// Host address (default: host_address from the config)
        address: Option<String>,

        /// Port to connect to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Play both seats on this console, no network
    Local,
}

impl Command {
    /// The port override carried by this command.
    pub fn port(&self) -> Option<u16> {
        match self {
            Command::Host { port } | Command::Join { port, .. } => *port,
            Command::Local => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_with_address_and_port() {
        let cli = Cli::try_parse_from(["nested_games", "join", "10.0.0.7", "--port", "9001"])
            .unwrap();
        assert_eq!(
            cli.command,
            Command::Join {
                address: Some("10.0.0.7".to_string()),
                port: Some(9001),
            }
        );
        assert_eq!(cli.command.port(), Some(9001));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["nested_games", "host", "--force-turn", "b", "-c", "x.toml"])
            .unwrap();
        assert_eq!(cli.force_turn, Some(Player::B));
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert_eq!(cli.command, Command::Host { port: None });
    }

    #[test]
    fn test_unknown_player_rejected() {
        assert!(Cli::try_parse_from(["nested_games", "local", "--force-turn", "c"]).is_err());
    }
}
