//! Line-based console: parses input into commands and renders events.

use derive_more::Display;
use nested_sync::{Command, Origin, SessionEvent};
use nested_tictactoe::{Coordinate, GameState, GameStatus, IllegalMove, Player};
use tracing::{debug, warn};

/// Help shown for `?` and unrecognized input.
pub const HELP: &str = "Commands: <mc> <mr> <cc> <cr> to play (0-2 each, row 0 is the bottom), \
r to restart, q to quit, ? for help";

/// One parsed line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Forward to the driver.
    Command(Command),
    /// Leave the session.
    Quit,
    /// Show the help text.
    Help,
    /// Blank line.
    Nothing,
}

/// Unparseable input.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum InputError {
    /// Not a known command.
    #[display("Unknown command '{input}'")]
    Unknown {
        /// The offending line.
        input: String,
    },

    /// A move needs exactly four numbers.
    #[display("A move needs 4 numbers, got {count}")]
    WrongArity {
        /// Number of values given.
        count: usize,
    },

    /// A coordinate component is not an integer.
    #[display("'{value}' is not a number")]
    NotANumber {
        /// The offending token.
        value: String,
    },

    /// A coordinate component is outside 0..=2.
    #[display("{_0}")]
    OutOfRange(IllegalMove),
}

impl std::error::Error for InputError {}

/// Parses one line of console input.
///
/// # Errors
///
/// See [`InputError`].
pub fn parse_line(line: &str) -> Result<Input, InputError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Ok(Input::Nothing),
        ["q" | "quit"] => Ok(Input::Quit),
        ["r" | "reset" | "restart"] => Ok(Input::Command(Command::Reset)),
        ["?" | "h" | "help"] => Ok(Input::Help),
        numbers if numbers.iter().all(|t| looks_numeric(t)) => {
            if numbers.len() != 4 {
                return Err(InputError::WrongArity {
                    count: numbers.len(),
                });
            }
            let mut values = [0i32; 4];
            for (slot, token) in values.iter_mut().zip(numbers) {
                *slot = token.parse().map_err(|_| InputError::NotANumber {
                    value: token.to_string(),
                })?;
            }
            let [mc, mr, cc, cr] = values;
            Coordinate::from_parts(mc, mr, cc, cr)
                .map(|coord| Input::Command(Command::Move(coord)))
                .map_err(InputError::OutOfRange)
        }
        _ => Err(InputError::Unknown {
            input: line.trim().to_string(),
        }),
    }
}

fn looks_numeric(token: &str) -> bool {
    token.starts_with(|c: char| c == '-' || c.is_ascii_digit())
}

/// Presentation state: a mirror of the session's board built from events.
#[derive(Debug, Clone)]
pub struct ConsoleView {
    mirror: GameState,
    // None when one console plays both seats.
    seat: Option<Player>,
    connected: bool,
    host: bool,
}

impl ConsoleView {
    /// Creates a view for one seat, or for both when `seat` is `None`.
    pub fn new(seat: Option<Player>, host: bool) -> Self {
        Self {
            mirror: GameState::new(),
            seat,
            connected: true,
            host,
        }
    }

    /// The mirrored board.
    pub fn state(&self) -> &GameState {
        &self.mirror
    }

    /// Board plus a prompt line.
    pub fn screen(&self) -> String {
        format!("{}\n{}", self.mirror, self.prompt())
    }

    fn prompt(&self) -> String {
        match self.mirror.status() {
            GameStatus::Won(_) | GameStatus::Drawn => self.game_over_hint(),
            GameStatus::InProgress => {
                let turn = self.mirror.current_turn();
                match self.seat {
                    Some(seat) if seat != turn => format!("Waiting for player {turn}..."),
                    _ => format!("Player {turn} to move ({}):", self.board_hint()),
                }
            }
        }
    }

    fn board_hint(&self) -> String {
        match self.mirror.active_board() {
            Some(board) => format!("board {board}"),
            None => "any open board".to_string(),
        }
    }

    fn game_over_hint(&self) -> String {
        if self.host || !self.connected {
            "Press 'r' to restart or 'q' to quit.".to_string()
        } else {
            "Waiting for the host to restart. Press 'q' to quit.".to_string()
        }
    }

    /// Updates the mirror and describes the event for the user.
    pub fn handle_event(&mut self, event: SessionEvent) -> String {
        debug!(?event, "Handling session event");

        match event {
            SessionEvent::MoveApplied { origin, outcome } => {
                if let Err(e) = self.mirror.apply_move_as(outcome.player, outcome.coordinate) {
                    warn!(error = %e, "Console board diverged from session");
                    return format!("Display out of sync: {e}");
                }
                let who = match origin {
                    Origin::Local => "you",
                    Origin::Remote => "opponent",
                };
                let mut text = format!(
                    "Player {} ({who}) played {}",
                    outcome.player, outcome.coordinate
                );
                // Closed boards reject moves, so a winner here was just made.
                if outcome.board_winner == Some(outcome.player) {
                    text.push_str(&format!(", taking board {}", outcome.coordinate.board()));
                }
                match outcome.status {
                    GameStatus::Won(player) => {
                        text.push_str(&format!("\nPlayer {player} wins!"));
                    }
                    GameStatus::Drawn => text.push_str("\nGame ended in a draw!"),
                    GameStatus::InProgress => {}
                }
                text
            }
            SessionEvent::Reset { origin } => {
                self.mirror.reset();
                match origin {
                    Origin::Local => "Game restarted. Player A's turn.".to_string(),
                    Origin::Remote => "The host restarted the game. Player A's turn.".to_string(),
                }
            }
            SessionEvent::LocalRejected(e) => e.to_string(),
            SessionEvent::RemoteRejected(e) => format!("Opponent's move was rejected: {e}"),
            SessionEvent::Desynced {
                announced,
                expected,
            } => {
                let expected = expected.map_or_else(|| "any".to_string(), |b| b.to_string());
                format!("Warning: opponent announced board {announced}, this board says {expected}")
            }
            SessionEvent::Disconnected => {
                self.connected = false;
                "Opponent disconnected. Press 'r' to start over locally or 'q' to quit."
                    .to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nested_sync::SessionError;
    use nested_tictactoe::Position;

    #[test]
    fn test_parse_move() {
        let input = parse_line(" 1 1  0 2 ").unwrap();
        let expected = Coordinate::new(Position::Center, Position::TopLeft);
        assert_eq!(input, Input::Command(Command::Move(expected)));
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_line("q"), Ok(Input::Quit));
        assert_eq!(parse_line("r"), Ok(Input::Command(Command::Reset)));
        assert_eq!(parse_line("?"), Ok(Input::Help));
        assert_eq!(parse_line("   "), Ok(Input::Nothing));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_line("1 1 1"),
            Err(InputError::WrongArity { count: 3 })
        );
        assert_eq!(
            parse_line("1 1 1 3"),
            Err(InputError::OutOfRange(IllegalMove::OutOfRange { value: 3 }))
        );
        assert_eq!(
            parse_line("1 1 1 1x"),
            Err(InputError::NotANumber {
                value: "1x".into()
            })
        );
        assert!(matches!(parse_line("play"), Err(InputError::Unknown { .. })));
    }

    #[test]
    fn test_view_mirrors_moves() {
        let mut reference = GameState::new();
        let outcome = reference
            .apply_move(Coordinate::new(Position::Center, Position::Center))
            .unwrap();

        let mut view = ConsoleView::new(Some(Player::B), false);
        let text = view.handle_event(SessionEvent::MoveApplied {
            origin: Origin::Remote,
            outcome,
        });
        assert!(text.contains("Player A (opponent) played"));
        assert_eq!(view.state(), &reference);
        assert!(view.screen().ends_with("Player B to move (board (1,1)):"));
    }

    #[test]
    fn test_view_prompt_waits_for_other_seat() {
        let view = ConsoleView::new(Some(Player::B), false);
        assert!(view.screen().ends_with("Waiting for player A..."));

        let hotseat = ConsoleView::new(None, true);
        assert!(hotseat.screen().ends_with("Player A to move (any open board):"));
    }

    #[test]
    fn test_view_reset_and_disconnect() {
        let mut view = ConsoleView::new(Some(Player::A), true);
        let outcome = GameState::new()
            .apply_move(Coordinate::new(Position::TopLeft, Position::TopLeft))
            .unwrap();
        view.handle_event(SessionEvent::MoveApplied {
            origin: Origin::Local,
            outcome,
        });
        let text = view.handle_event(SessionEvent::Reset {
            origin: Origin::Local,
        });
        assert_eq!(text, "Game restarted. Player A's turn.");
        assert_eq!(view.state(), &GameState::new());

        let text = view.handle_event(SessionEvent::Disconnected);
        assert!(text.starts_with("Opponent disconnected"));
    }

    #[test]
    fn test_view_reports_rejections() {
        let mut view = ConsoleView::new(Some(Player::B), false);
        let text = view.handle_event(SessionEvent::LocalRejected(SessionError::NotYourTurn {
            turn: Player::A,
        }));
        assert_eq!(text, "Not your turn: waiting for player A");
        assert_eq!(view.state(), &GameState::new());
    }
}
