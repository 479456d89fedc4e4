use std::collections::BTreeSet;

use chess::Color;
use uuid::Uuid;

use crate::game::challenge::Challenge;
use crate::game::reconciler::Reconciler;
use crate::game::session::Session;
use crate::models::{Board, RecentMove};

/// Transport status as last reported by the transport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    #[default]
    Connecting,
    NoConnection,
}

/// Progress of the local add-to-lobby request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddPlayerStatus {
    #[default]
    NotRequested,
    Requested,
    Acknowledged,
    UsernameTaken,
}

/// Who the local user is. The id is generated once per process and sent
/// along with the username so the server's answer can be matched to us.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalIdentity {
    pub username: Option<String>,
    pub id: Uuid,
}

impl LocalIdentity {
    pub fn new() -> Self {
        Self {
            username: None,
            id: Uuid::new_v4(),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.username.as_deref() == Some(name)
    }

    /// The color the local user plays given the two seat names, if seated.
    pub fn seat(&self, white: &str, black: &str) -> Option<Color> {
        if self.is(white) {
            Some(Color::White)
        } else if self.is(black) {
            Some(Color::Black)
        } else {
            None
        }
    }
}

impl Default for LocalIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lobby {
    pub roster: BTreeSet<String>,
    pub add_status: AddPlayerStatus,
}

/// What the view layer draws.
///
/// `authoritative` is the last board the server pushed, untouched.
/// `display` is the same board after drag reconciliation and optimistic
/// local moves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardView {
    pub authoritative: Board,
    pub display: Board,
    pub whos_turn: Color,
    pub recent_move: Option<RecentMove>,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            authoritative: Board::initial(),
            display: Board::initial(),
            whos_turn: Color::White,
            recent_move: None,
        }
    }
}

/// Application state shared by every state machine.
///
/// Owned by the connection manager; the view layer only ever sees clones.
#[derive(Clone, Debug, Default)]
pub struct ClientState {
    pub identity: LocalIdentity,
    pub connection: ConnectionStatus,
    pub lobby: Lobby,
    pub challenge: Challenge,
    pub session: Session,
    pub board: BoardView,
    pub reconciler: Reconciler,
}
