//! Replays newline-delimited JSON against a match client.
//!
//! Each stdin line is either a transport event (`{"event": ..., "data": ...}`)
//! or a local action (`{"action": ...}`). Outbound events are printed to
//! stdout, one JSON object per line. Stdin is read on a blocking thread so
//! timers such as challenge expiry keep firing while the replay waits.

use std::io::{self, BufRead};

use actix::prelude::*;
use log::{info, warn};
use serde::Deserialize;

use chess_match_client::models::{Frame, GetState, InboundEvent, LocalAction, Outbound};
use chess_match_client::{ClientConfig, ConnectionManager};

#[derive(Deserialize)]
#[serde(untagged)]
enum ReplayLine {
    Event(InboundEvent),
    Action(LocalAction),
}

/// Writes outbound events to stdout.
struct StdoutSink;

impl Actor for StdoutSink {
    type Context = Context<Self>;
}

impl Handler<Outbound> for StdoutSink {
    type Result = ();

    fn handle(&mut self, msg: Outbound, _: &mut Self::Context) {
        match serde_json::to_string(&msg.0) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("Error serializing outbound event: {}", e),
        }
    }
}

fn mailbox_error(e: MailboxError) -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, e.to_string())
}

/// Forward `input` to the client, in order, until EOF.
fn feed(input: impl BufRead, client: Addr<ConnectionManager>) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ReplayLine>(&line) {
            Ok(ReplayLine::Action(action)) => client.do_send(action),
            // Events go through the same path a transport frame would.
            Ok(ReplayLine::Event(_)) => client.do_send(Frame(line)),
            Err(e) => warn!("Skipping unrecognised line: {}", e),
        }
    }
    Ok(())
}

#[actix::main]
async fn main() -> io::Result<()> {
    let config = ClientConfig::load()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(config.log_filter.clone()));

    let username = std::env::args().nth(1);
    let sink = StdoutSink.start();
    let client = ConnectionManager::new(config, sink.recipient()).start();

    if let Some(username) = username {
        info!("Joining lobby as {}", username);
        client
            .send(LocalAction::JoinLobby { username })
            .await
            .map_err(mailbox_error)?;
    }

    let feeder = client.clone();
    actix_rt::task::spawn_blocking(move || feed(io::stdin().lock(), feeder))
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))??;

    let state = client.send(GetState).await.map_err(mailbox_error)?;
    info!(
        "Final state: connection {:?}, session {}, challenge {:?}, lobby {:?}",
        state.connection, state.session.phase, state.challenge.status, state.lobby.roster
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};
    use std::thread;
    use std::time::Duration;

    use chess_match_client::game::ChallengeStatus;

    /// Stalls once, like a terminal with no input yet.
    struct Stall(Duration);

    impl Read for Stall {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            thread::sleep(self.0);
            Ok(0)
        }
    }

    fn challenge(challenger: &str) -> String {
        format!(
            r#"{{"event":"challenge","data":{{"challenger":{{"username":"{challenger}","status":"waiting"}},"challengee":{{"username":"alice","status":"waiting"}}}}}}"#
        )
    }

    #[actix_rt::test]
    async fn challenge_expires_while_input_stalls() {
        let config = ClientConfig {
            challenge_timeout_ms: 100,
            ..ClientConfig::default()
        };
        let client = ConnectionManager::new(config, StdoutSink.start().recipient()).start();

        let before = format!(
            "{}\n{}\n",
            r#"{"action":"joinLobby","username":"alice"}"#,
            challenge("bob")
        );
        let after = format!("{}\n", challenge("carol"));
        let input = BufReader::new(
            Cursor::new(before)
                .chain(Stall(Duration::from_millis(300)))
                .chain(Cursor::new(after)),
        );

        let feeder = client.clone();
        actix_rt::task::spawn_blocking(move || feed(input, feeder))
            .await
            .unwrap()
            .unwrap();

        // Bob's challenge expired during the stall, so Carol's is taken.
        let state = client.send(GetState).await.unwrap();
        assert_eq!(state.challenge.status, ChallengeStatus::Received);
        assert_eq!(state.challenge.opponent.as_deref(), Some("carol"));
    }
}
