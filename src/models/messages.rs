use actix::prelude::*;
use chess::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::game::challenge::ChallengeStatus;
use crate::game::session::GameStatus;
use crate::models::{Board, ClientState, Position, RecentMove};

/// Event delivered by the transport, as `{"event": ..., "data": ...}`.
///
/// Transport lifecycle signals travel on the same channel as server pushes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum InboundEvent {
    Connect,
    Disconnect,
    Reconnect(u32),
    Reconnecting(u32),
    SetPlayersInLobby(Vec<String>),
    AddPlayerToLobbyResponse(AddPlayerResponse),
    Challenge(ChallengePayload),
    Game(GamePayload),
    Board(BoardPayload),
    GameOver(GameOverPayload),
    ServerError(serde_json::Value),
}

impl InboundEvent {
    /// Decode a raw text frame.
    pub fn from_frame(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Event handed to the transport for sending.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum OutboundEvent {
    AddPlayerToLobby(AddPlayerRequest),
    Challenge(ChallengePayload),
    Move(MovePayload),
    GameOver(GameOverPayload),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AddPlayerOutcome {
    PlayerExists,
    Success,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddPlayerResponse {
    pub username: String,
    pub id: Uuid,
    pub message: AddPlayerOutcome,
    #[serde(default)]
    pub players_in_lobby: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AddPlayerRequest {
    pub username: String,
    pub id: Uuid,
}

/// One side of a challenge handshake.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChallengeParty {
    pub username: String,
    pub status: ChallengeStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChallengePayload {
    pub challenger: ChallengeParty,
    pub challengee: ChallengeParty,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GamePayload {
    pub status: GameStatus,
    #[serde(default)]
    pub countdown: u32,
    pub player_white: String,
    pub player_black: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardPayload {
    pub player_white: String,
    pub player_black: String,
    pub board: Board,
    #[serde(with = "crate::game::utils::color_format")]
    pub whos_turn: Color,
    #[serde(default)]
    pub recent_move: Option<RecentMove>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameOverPayload {
    pub player_white: String,
    pub player_black: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovePayload {
    pub player_white: String,
    pub player_black: String,
    pub from: Position,
    pub to: Position,
}

/// Input from the view layer.
#[derive(Message, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum LocalAction {
    JoinLobby { username: String },
    IssueChallenge { opponent: String },
    RespondToChallenge { accept: bool },
    PointerDown { at: Position },
    /// `drop` is the square under the pointer, if any.
    PointerUp { drop: Option<Position> },
}

/// Raw text frame from the transport.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Frame(pub String);

/// Already-decoded inbound event.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Inbound(pub InboundEvent);

/// Event for the transport to send.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct Outbound(pub OutboundEvent);

/// Snapshot pushed to observers after every handled event.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct StateChanged(pub ClientState);

#[derive(Message)]
#[rtype(result = "ClientState")]
pub struct GetState;

#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe(pub Recipient<StateChanged>);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use serde_json::json;

    #[test]
    fn decodes_lifecycle_events() {
        let connect: InboundEvent = serde_json::from_value(json!({"event": "connect"})).unwrap();
        assert_eq!(connect, InboundEvent::Connect);

        let reconnecting: InboundEvent =
            serde_json::from_value(json!({"event": "reconnecting", "data": 3})).unwrap();
        assert_eq!(reconnecting, InboundEvent::Reconnecting(3));
    }

    #[test]
    fn malformed_frame_is_a_decode_error() {
        assert!(matches!(
            InboundEvent::from_frame("not json"),
            Err(ClientError::Decode(_))
        ));
        assert!(matches!(
            InboundEvent::from_frame(r#"{"event": "board", "data": {"board": []}}"#),
            Err(ClientError::Decode(_))
        ));
        assert_eq!(
            InboundEvent::from_frame(r#"{"event": "disconnect"}"#).unwrap(),
            InboundEvent::Disconnect
        );
    }

    #[test]
    fn decodes_board_push() {
        let mut grid = vec![vec![0i8; 8]; 8];
        grid[7][4] = 6;
        grid[0][4] = -6;
        let event: InboundEvent = serde_json::from_value(json!({
            "event": "board",
            "data": {
                "playerWhite": "alice",
                "playerBlack": "bob",
                "board": grid,
                "whosTurn": "black",
                "recentMove": {"from": "e2", "to": "e4"}
            }
        }))
        .unwrap();
        let InboundEvent::Board(payload) = event else {
            panic!("expected board event");
        };
        assert_eq!(payload.whos_turn, Color::Black);
        assert_eq!(payload.recent_move.unwrap().to, "e4".parse::<Position>().unwrap());
        assert!(payload.board.king_position(Color::White).is_some());
    }

    #[test]
    fn unknown_add_player_message_is_tolerated() {
        let event: InboundEvent = serde_json::from_value(json!({
            "event": "addPlayerToLobbyResponse",
            "data": {
                "username": "alice",
                "id": Uuid::nil(),
                "message": "lobbyFull",
                "playersInLobby": []
            }
        }))
        .unwrap();
        let InboundEvent::AddPlayerToLobbyResponse(response) = event else {
            panic!("expected add player response");
        };
        assert_eq!(response.message, AddPlayerOutcome::Unknown);
    }

    #[test]
    fn encodes_outbound_game_over() {
        let event = OutboundEvent::GameOver(GameOverPayload {
            player_white: "alice".into(),
            player_black: "bob".into(),
        });
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "gameOver", "data": {"playerWhite": "alice", "playerBlack": "bob"}})
        );
    }

    #[test]
    fn decodes_local_actions() {
        let action: LocalAction =
            serde_json::from_value(json!({"action": "pointerDown", "at": "e2"})).unwrap();
        assert_eq!(action, LocalAction::PointerDown { at: "e2".parse().unwrap() });
    }
}
