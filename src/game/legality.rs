//! Check and checkmate detection.
//!
//! The server owns legality; this engine only answers "is the side to move
//! checkmated?" so the client can react before the server confirms. Castling
//! and en passant are never generated: the protocol carries no castling
//! rights or double-step history, so kings move one square and pawns capture
//! only what stands diagonally in front of them.

use chess::Color;

use crate::error::{ClientError, Result};
use crate::models::{Board, Piece, PieceKind, Position};

const KNIGHT_JUMPS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_STEPS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ROOK_RAYS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_RAYS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Row direction a pawn of `color` advances in. White starts on row 6.
fn pawn_direction(color: Color) -> i32 {
    match color {
        Color::White => -1,
        Color::Black => 1,
    }
}

fn pawn_start_row(color: Color) -> usize {
    match color {
        Color::White => 6,
        Color::Black => 1,
    }
}

fn slide(board: &Board, from: Position, rays: &[(i32, i32)], out: &mut Vec<Position>) {
    for &(dr, dc) in rays {
        let mut current = from;
        while let Some(next) = current.offset(dr, dc) {
            out.push(next);
            if board.get(next).is_some() {
                break;
            }
            current = next;
        }
    }
}

fn steps(from: Position, offsets: &[(i32, i32)], out: &mut Vec<Position>) {
    out.extend(offsets.iter().filter_map(|&(dr, dc)| from.offset(dr, dc)));
}

/// Squares attacked by `piece` standing on `from`.
///
/// Sliding pieces stop at the first occupied square (which is included).
/// Pawns attack their two forward diagonals whether or not anything stands
/// there.
pub fn attacks(board: &Board, from: Position, piece: Piece) -> Vec<Position> {
    let mut out = Vec::with_capacity(16);
    match piece.kind {
        PieceKind::Pawn => {
            let dr = pawn_direction(piece.color);
            steps(from, &[(dr, -1), (dr, 1)], &mut out);
        }
        PieceKind::Knight => steps(from, &KNIGHT_JUMPS, &mut out),
        PieceKind::King => steps(from, &KING_STEPS, &mut out),
        PieceKind::Bishop => slide(board, from, &BISHOP_RAYS, &mut out),
        PieceKind::Rook => slide(board, from, &ROOK_RAYS, &mut out),
        PieceKind::Queen => {
            slide(board, from, &ROOK_RAYS, &mut out);
            slide(board, from, &BISHOP_RAYS, &mut out);
        }
    }
    out
}

/// Destinations for `piece` on `from` ignoring whether its own king ends up
/// in check: in bounds and not occupied by a friendly piece.
pub fn pseudo_legal_moves(board: &Board, from: Position, piece: Piece) -> Vec<Position> {
    if piece.kind != PieceKind::Pawn {
        return attacks(board, from, piece)
            .into_iter()
            .filter(|to| board.get(*to).map_or(true, |p| p.color != piece.color))
            .collect();
    }

    let dr = pawn_direction(piece.color);
    let mut out = Vec::with_capacity(4);
    if let Some(one) = from.offset(dr, 0).filter(|sq| board.get(*sq).is_none()) {
        out.push(one);
        if from.row() == pawn_start_row(piece.color) {
            if let Some(two) = one.offset(dr, 0).filter(|sq| board.get(*sq).is_none()) {
                out.push(two);
            }
        }
    }
    out.extend(
        attacks(board, from, piece)
            .into_iter()
            .filter(|to| board.get(*to).map_or(false, |p| p.color != piece.color)),
    );
    out
}

/// Whether any piece of `by` attacks `target`.
pub fn is_attacked(board: &Board, target: Position, by: Color) -> bool {
    board
        .pieces(by)
        .any(|(from, piece)| attacks(board, from, piece).contains(&target))
}

/// Whether the king of `color` is attacked.
///
/// Fails with [`ClientError::MissingKing`] when the board has no such king;
/// a kingless board is never reported as "not in check".
pub fn is_in_check(board: &Board, color: Color) -> Result<bool> {
    let king = board
        .king_position(color)
        .ok_or(ClientError::MissingKing(color))?;
    Ok(is_attacked(board, king, !color))
}

/// Whether moving `from` -> `to` leaves the mover's own king safe.
/// The move is played on a scratch copy; `board` is never touched.
fn resolves_check(board: &Board, from: Position, to: Position, color: Color) -> Result<bool> {
    let mut scratch = *board;
    scratch.apply_move(from, to);
    Ok(!is_in_check(&scratch, color)?)
}

/// Destinations the piece on `from` may move to without leaving its own king
/// in check. Empty squares have no destinations.
pub fn legal_destinations(board: &Board, from: Position) -> Result<Vec<Position>> {
    let Some(piece) = board.get(from) else {
        return Ok(Vec::new());
    };
    let mut legal = Vec::new();
    for to in pseudo_legal_moves(board, from, piece) {
        if resolves_check(board, from, to, piece.color)? {
            legal.push(to);
        }
    }
    Ok(legal)
}

/// Whether `color` is in check and no move of any of its pieces gets it out.
pub fn is_checkmate(board: &Board, color: Color) -> Result<bool> {
    if !is_in_check(board, color)? {
        return Ok(false);
    }
    for (from, piece) in board.pieces(color) {
        for to in pseudo_legal_moves(board, from, piece) {
            if resolves_check(board, from, to, color)? {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
