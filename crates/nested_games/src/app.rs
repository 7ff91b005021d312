//! Wires stdin, the session driver and stdout together.

use crate::console::{ConsoleView, HELP, Input, parse_line};
use anyhow::Result;
use nested_sync::{Driver, GameSession, Role, SessionConfig, Transport};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// Plays one session on this console until the user quits or stdin closes.
#[instrument(skip(transport), fields(role = %config.role()))]
pub async fn run<T: Transport + 'static>(config: SessionConfig, transport: T) -> Result<()> {
    let seat = if *config.hotseat() {
        None
    } else {
        Some(config.role().seat())
    };
    let mut view = ConsoleView::new(seat, *config.role() == Role::Host);

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let driver = Driver::new(GameSession::new(config), transport, command_rx, event_tx);
    let handle = tokio::spawn(driver.run());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");
    println!("{}", view.screen());

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match parse_line(&line) {
                    Ok(Input::Command(command)) => command_tx.send(command)?,
                    Ok(Input::Quit) => break,
                    Ok(Input::Help) => println!("{HELP}"),
                    Ok(Input::Nothing) => {}
                    Err(e) => println!("{e}. {HELP}"),
                },
                None => {
                    debug!("Input closed");
                    break;
                }
            },
            event = event_rx.recv() => match event {
                Some(event) => {
                    println!("{}", view.handle_event(event));
                    println!("{}", view.screen());
                }
                None => break,
            },
        }
    }

    drop(command_tx);
    let session = handle.await?;
    info!(
        moves = session.state().history().len(),
        status = %session.state().status(),
        "Session finished"
    );
    Ok(())
}
