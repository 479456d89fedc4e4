//! Merges the local drag with authoritative board pushes.
//!
//! The authoritative board is always accepted. The only question this
//! module answers is how to show it while the user may be holding a piece
//! that the push has already moved.

use chess::Color;
use log::{debug, warn};

use crate::game::legality::legal_destinations;
use crate::models::{Board, Piece, Position};

/// A piece picked up by the local user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveIntent {
    pub piece: Piece,
    pub origin: Position,
    /// Set once the piece was dropped on a legal square and the move sent.
    pub dropped_on: Option<Position>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Reconciler {
    #[default]
    Idle,
    Pending(MoveIntent),
}

/// Result of a pointer-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Released {
    pub next: Reconciler,
    /// Move to send to the server.
    pub sent: Option<(Position, Position)>,
    /// Board to show from now on; `None` leaves the display as it is.
    pub display: Option<Board>,
}

/// Result of applying an authoritative push.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reconciled {
    pub next: Reconciler,
    pub display: Board,
}

impl Reconciler {
    pub fn intent(&self) -> Option<&MoveIntent> {
        match self {
            Reconciler::Idle => None,
            Reconciler::Pending(intent) => Some(intent),
        }
    }

    /// Pointer down on `origin`. Only a piece of the local color, on the
    /// local user's turn, can be picked up; a second pointer-down while a
    /// piece is already held is ignored.
    pub fn pick_up(self, board: &Board, origin: Position, local: Color, whos_turn: Color) -> Self {
        if let Reconciler::Pending(intent) = self {
            debug!("already holding piece from {}, ignoring pointer down", intent.origin);
            return self;
        }
        if whos_turn != local {
            return self;
        }
        match board.get(origin) {
            Some(piece) if piece.color == local => Reconciler::Pending(MoveIntent {
                piece,
                origin,
                dropped_on: None,
            }),
            _ => self,
        }
    }

    /// Pointer up. Sends the move when `drop` is a legal destination on the
    /// authoritative `board`; anything else puts the piece back.
    ///
    /// The display is always rebuilt from `board`, since a push that arrived
    /// mid-drag left the origin blanked in the shown copy. A legal drop is
    /// shown optimistically on top of that rebuilt board.
    pub fn release(self, board: &Board, drop: Option<Position>) -> Released {
        let intent = match self {
            Reconciler::Pending(intent) if intent.dropped_on.is_none() => intent,
            _ => {
                return Released {
                    next: self,
                    sent: None,
                    display: None,
                }
            }
        };
        let put_back = Released {
            next: Reconciler::Idle,
            sent: None,
            display: Some(*board),
        };
        let Some(to) = drop else {
            return put_back;
        };
        let legal = match legal_destinations(board, intent.origin) {
            Ok(destinations) => destinations.contains(&to),
            Err(e) => {
                warn!("cannot validate drop on {to}: {e}");
                false
            }
        };
        if !legal {
            debug!("illegal drop {} -> {to}", intent.origin);
            return put_back;
        }
        let mut shown = *board;
        shown.apply_move(intent.origin, to);
        Released {
            next: Reconciler::Pending(MoveIntent {
                dropped_on: Some(to),
                ..intent
            }),
            sent: Some((intent.origin, to)),
            display: Some(shown),
        }
    }

    /// Apply an authoritative push for a match in which the local user
    /// plays `local`.
    ///
    /// A held piece whose origin is now empty or occupied by the opponent is
    /// stale: the intent is dropped and the push shown as-is. If the origin
    /// still holds a local piece the drag continues and the origin is
    /// blanked in the displayed copy so the held piece is not drawn twice.
    /// A dropped move is settled by any push, confirming or rejecting it.
    pub fn on_push(self, pushed: &Board, local: Color) -> Reconciled {
        let intent = match self {
            Reconciler::Idle => {
                return Reconciled {
                    next: Reconciler::Idle,
                    display: *pushed,
                }
            }
            Reconciler::Pending(intent) => intent,
        };

        if intent.dropped_on.is_some() {
            return Reconciled {
                next: Reconciler::Idle,
                display: *pushed,
            };
        }

        match pushed.get(intent.origin) {
            Some(occupant) if occupant.color == local => Reconciled {
                next: self,
                display: pushed.with(intent.origin, None),
            },
            _ => {
                debug!("push vacated {}, discarding held piece", intent.origin);
                Reconciled {
                    next: Reconciler::Idle,
                    display: *pushed,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PieceKind;

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    fn holding(origin: &str) -> Reconciler {
        Reconciler::Idle.pick_up(&Board::initial(), pos(origin), Color::White, Color::White)
    }

    #[test]
    fn picks_up_own_piece_on_own_turn() {
        let held = holding("e2");
        let intent = held.intent().unwrap();
        assert_eq!(intent.origin, pos("e2"));
        assert_eq!(intent.piece, Piece::new(Color::White, PieceKind::Pawn));
    }

    #[test]
    fn ignores_opponent_pieces_and_off_turn() {
        let board = Board::initial();
        assert_eq!(
            Reconciler::Idle.pick_up(&board, pos("e7"), Color::White, Color::White),
            Reconciler::Idle
        );
        assert_eq!(
            Reconciler::Idle.pick_up(&board, pos("e2"), Color::White, Color::Black),
            Reconciler::Idle
        );
        assert_eq!(
            Reconciler::Idle.pick_up(&board, pos("e4"), Color::White, Color::White),
            Reconciler::Idle
        );
    }

    #[test]
    fn second_pick_up_is_ignored() {
        let held = holding("e2");
        let again = held.pick_up(&Board::initial(), pos("d2"), Color::White, Color::White);
        assert_eq!(again, held);
    }

    #[test]
    fn vacated_origin_discards_intent_without_duplicate() {
        let mut pushed = Board::initial();
        pushed.apply_move(pos("e2"), pos("e4"));

        let reconciled = holding("e2").on_push(&pushed, Color::White);
        assert_eq!(reconciled.next, Reconciler::Idle);
        assert_eq!(reconciled.display, pushed);
        assert!(reconciled.display.get(pos("e2")).is_none());
    }

    #[test]
    fn opponent_on_origin_discards_intent() {
        let mut pushed = Board::initial();
        pushed.set(pos("e2"), Some(Piece::new(Color::Black, PieceKind::Queen)));

        let reconciled = holding("e2").on_push(&pushed, Color::White);
        assert_eq!(reconciled.next, Reconciler::Idle);
        assert_eq!(reconciled.display, pushed);
    }

    #[test]
    fn held_piece_is_hidden_at_origin() {
        let pushed = Board::initial();
        let held = holding("g1");
        let reconciled = held.on_push(&pushed, Color::White);
        assert_eq!(reconciled.next, held);
        assert!(reconciled.display.get(pos("g1")).is_none());
        assert!(pushed.get(pos("g1")).is_some());
    }

    #[test]
    fn legal_drop_sends_move_and_push_settles_it() {
        let released = holding("e2").release(&Board::initial(), Some(pos("e4")));
        assert_eq!(released.sent, Some((pos("e2"), pos("e4"))));
        assert_eq!(released.next.intent().unwrap().dropped_on, Some(pos("e4")));
        let shown = released.display.unwrap();
        assert_eq!(shown.get(pos("e4")), Some(Piece::new(Color::White, PieceKind::Pawn)));
        assert!(shown.get(pos("e2")).is_none());

        // A rejected move comes back as an unchanged board.
        let reconciled = released.next.on_push(&Board::initial(), Color::White);
        assert_eq!(reconciled.next, Reconciler::Idle);
        assert_eq!(reconciled.display, Board::initial());
    }

    #[test]
    fn illegal_or_missing_drop_returns_to_idle() {
        let released = holding("e2").release(&Board::initial(), Some(pos("e5")));
        assert_eq!(released.next, Reconciler::Idle);
        assert_eq!(released.sent, None);
        assert_eq!(released.display, Some(Board::initial()));

        let released = holding("e2").release(&Board::initial(), None);
        assert_eq!(released.next, Reconciler::Idle);
        assert_eq!(released.sent, None);
        assert_eq!(released.display, Some(Board::initial()));
    }

    #[test]
    fn release_without_held_piece_keeps_display() {
        let released = Reconciler::Idle.release(&Board::initial(), Some(pos("e4")));
        assert_eq!(released.next, Reconciler::Idle);
        assert_eq!(released.sent, None);
        assert_eq!(released.display, None);
    }

    #[test]
    fn push_while_held_then_cancel_restores_piece() {
        let knight = Piece::new(Color::White, PieceKind::Knight);
        let reconciled = holding("g1").on_push(&Board::initial(), Color::White);
        assert!(reconciled.display.get(pos("g1")).is_none());

        let released = reconciled.next.release(&Board::initial(), None);
        assert_eq!(released.next, Reconciler::Idle);
        assert_eq!(released.display.unwrap().get(pos("g1")), Some(knight));
    }

    #[test]
    fn push_while_held_then_drop_shows_piece_on_target() {
        let knight = Piece::new(Color::White, PieceKind::Knight);
        let reconciled = holding("g1").on_push(&Board::initial(), Color::White);

        let released = reconciled.next.release(&Board::initial(), Some(pos("f3")));
        assert_eq!(released.sent, Some((pos("g1"), pos("f3"))));
        let shown = released.display.unwrap();
        assert_eq!(shown.get(pos("f3")), Some(knight));
        assert!(shown.get(pos("g1")).is_none());
    }
}
