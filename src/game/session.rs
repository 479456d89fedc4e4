//! Per-match lifecycle: idle, countdown, active, won, lost.

use std::fmt;

use chess::Color;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Match status as carried by the server's `game` event.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Idle,
    Countdown,
    Go,
    Win,
    Loss,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    Countdown(u32),
    Active,
    Won,
    Lost,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Countdown(n) => write!(f, "countdown({n})"),
            SessionPhase::Active => write!(f, "active"),
            SessionPhase::Won => write!(f, "won"),
            SessionPhase::Lost => write!(f, "lost"),
        }
    }
}

/// Usernames seated at each color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seats {
    pub white: String,
    pub black: String,
}

impl Seats {
    pub fn player(&self, color: Color) -> &str {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub phase: SessionPhase,
    /// The color the local user plays, once the match has started.
    pub color: Option<Color>,
    pub seats: Option<Seats>,
}

/// Inputs to the session machine. Callers only build these for events that
/// name the local user as a participant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Game {
        status: GameStatus,
        countdown: u32,
        seats: Seats,
        local: Color,
    },
    /// The side to move on the latest authoritative board is checkmated.
    Checkmated(Color),
    GameOver,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionTransition {
    pub next: Session,
    /// The match just went live; the board must be reset.
    pub started: bool,
    /// The local user was checkmated; the server must be told.
    pub announce_game_over: bool,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn transition(&self, event: SessionEvent) -> SessionTransition {
        let mut next = self.clone();
        let mut started = false;
        let mut announce_game_over = false;

        match event {
            SessionEvent::Game {
                status,
                countdown,
                seats,
                local,
            } => match status {
                GameStatus::Countdown if self.is_active() => {
                    warn!("countdown received during an active match, ignoring");
                }
                GameStatus::Countdown => {
                    next.phase = SessionPhase::Countdown(countdown);
                    next.seats = Some(seats);
                }
                GameStatus::Go if self.is_active() => {
                    debug!("repeated go status");
                }
                GameStatus::Go => {
                    next.phase = SessionPhase::Active;
                    next.color = Some(local);
                    next.seats = Some(seats);
                    started = true;
                }
                GameStatus::Win if self.phase != SessionPhase::Lost => next.phase = SessionPhase::Won,
                GameStatus::Loss => next.phase = SessionPhase::Lost,
                GameStatus::Idle => next = Session::default(),
                GameStatus::Win => warn!("win status after a registered loss, ignoring"),
            },
            SessionEvent::Checkmated(side) => {
                if self.is_active() && self.color == Some(side) {
                    next.phase = SessionPhase::Lost;
                    announce_game_over = true;
                }
            }
            SessionEvent::GameOver => match self.phase {
                SessionPhase::Active => next.phase = SessionPhase::Won,
                SessionPhase::Lost | SessionPhase::Won => {}
                other => warn!("gameOver received while {other}, ignoring"),
            },
        }

        SessionTransition {
            next,
            started,
            announce_game_over,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats() -> Seats {
        Seats {
            white: "alice".into(),
            black: "bob".into(),
        }
    }

    fn game(status: GameStatus, local: Color) -> SessionEvent {
        SessionEvent::Game {
            status,
            countdown: 3,
            seats: seats(),
            local,
        }
    }

    fn active(color: Color) -> Session {
        Session::default().transition(game(GameStatus::Go, color)).next
    }

    #[test]
    fn countdown_then_go_starts_the_match() {
        let counting = Session::default().transition(game(GameStatus::Countdown, Color::Black));
        assert_eq!(counting.next.phase, SessionPhase::Countdown(3));
        assert!(!counting.started);

        let go = counting.next.transition(game(GameStatus::Go, Color::Black));
        assert!(go.started);
        assert_eq!(go.next.phase, SessionPhase::Active);
        assert_eq!(go.next.color, Some(Color::Black));
    }

    #[test]
    fn repeated_go_does_not_restart() {
        let again = active(Color::White).transition(game(GameStatus::Go, Color::White));
        assert!(!again.started);
        assert_eq!(again.next, active(Color::White));
    }

    #[test]
    fn local_checkmate_loses_and_announces_once() {
        let mated = active(Color::White).transition(SessionEvent::Checkmated(Color::White));
        assert_eq!(mated.next.phase, SessionPhase::Lost);
        assert!(mated.announce_game_over);

        let again = mated.next.transition(SessionEvent::Checkmated(Color::White));
        assert!(!again.announce_game_over);
        assert_eq!(again.next.phase, SessionPhase::Lost);
    }

    #[test]
    fn opponent_checkmate_waits_for_game_over() {
        let session = active(Color::White);
        let mated = session.transition(SessionEvent::Checkmated(Color::Black));
        assert_eq!(mated.next, session);
        assert!(!mated.announce_game_over);

        assert_eq!(session.transition(SessionEvent::GameOver).next.phase, SessionPhase::Won);
    }

    #[test]
    fn game_over_after_loss_stays_lost() {
        let lost = active(Color::White)
            .transition(SessionEvent::Checkmated(Color::White))
            .next;
        assert_eq!(lost.transition(SessionEvent::GameOver).next.phase, SessionPhase::Lost);
    }

    #[test]
    fn game_over_outside_a_match_is_ignored() {
        let idle = Session::default();
        assert_eq!(idle.transition(SessionEvent::GameOver).next, idle);
    }
}
