//! Helpers shared by the driver and transport tests.

#![allow(dead_code)]

use nested_sync::{Command, Driver, GameSession, SessionConfig, SessionEvent, Transport};
use nested_tictactoe::{Coordinate, GameState};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One running driver plus the channels the console would hold.
pub struct End {
    commands: Option<mpsc::UnboundedSender<Command>>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    handle: JoinHandle<GameSession>,
}

impl End {
    pub fn spawn<T: Transport + 'static>(config: SessionConfig, transport: T) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let driver = Driver::new(GameSession::new(config), transport, command_rx, event_tx);
        Self {
            commands: Some(command_tx),
            events: event_rx,
            handle: tokio::spawn(driver.run()),
        }
    }

    pub fn send(&self, command: Command) {
        self.commands
            .as_ref()
            .expect("driver still accepting commands")
            .send(command)
            .expect("driver alive");
    }

    pub async fn next_event(&mut self) -> SessionEvent {
        tokio::time::timeout(Duration::from_secs(5), self.events.recv())
            .await
            .expect("event within five seconds")
            .expect("driver still running")
    }

    /// Pending events, without waiting.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        std::iter::from_fn(|| self.events.try_recv().ok()).collect()
    }

    /// Closes the command channel and returns the final session.
    pub async fn finish(mut self) -> GameSession {
        self.commands.take();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("driver stops within five seconds")
            .expect("driver task")
    }
}

pub fn coord(mc: i32, mr: i32, cc: i32, cr: i32) -> Coordinate {
    Coordinate::from_parts(mc, mr, cc, cr).expect("valid coordinate")
}

/// A complete, deterministic match.
pub fn scripted_match(seed: usize) -> Vec<Coordinate> {
    let mut state = GameState::new();
    let mut moves = Vec::new();
    while !state.is_over() {
        let legal = state.legal_moves();
        let pick = legal[(moves.len() * 5 + seed * 11) % legal.len()];
        state.apply_move(pick).expect("legal move");
        moves.push(pick);
    }
    moves
}
