use std::fmt;
use std::str::FromStr;

use chess::Color;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

pub use chess::Piece as PieceKind;

/// Width and height of the board.
pub const BOARD_SIZE: usize = 8;

/// A square on the board.
///
/// Row 0 is rank 8 and column 0 is file `a`, matching the grid layout the
/// server pushes. A `Position` can only be built in range, so every board
/// access through it is total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Result<Self> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(ClientError::OutOfRange { row, col });
        }
        Ok(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    pub fn row(self) -> usize {
        self.row as usize
    }

    pub fn col(self) -> usize {
        self.col as usize
    }

    /// The square `(dr, dc)` away, if it is still on the board.
    pub fn offset(self, dr: i32, dc: i32) -> Option<Self> {
        let row = self.row as i32 + dr;
        let col = self.col as i32 + dc;
        if (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// All 64 squares, rank 8 first.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE as u8)
            .flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Position { row, col }))
    }
}

impl FromStr for Position {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ClientError::InvalidPosition(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(ClientError::InvalidPosition(s.to_string()));
        }
        Ok(Self {
            row: b'8' - rank,
            col: file - b'a',
        })
    }
}

impl TryFrom<String> for Position {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Position> for String {
    fn from(pos: Position) -> Self {
        pos.to_string()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col) as char, (b'8' - self.row) as char)
    }
}

/// A piece: which side owns it and what it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Decode a signed wire code. Zero is an empty square.
    pub fn from_code(code: i8) -> Result<Option<Piece>> {
        if code == 0 {
            return Ok(None);
        }
        let kind = match code.unsigned_abs() {
            1 => PieceKind::Pawn,
            2 => PieceKind::Knight,
            3 => PieceKind::Bishop,
            4 => PieceKind::Rook,
            5 => PieceKind::Queen,
            6 => PieceKind::King,
            _ => return Err(ClientError::InvalidPieceCode(code)),
        };
        let color = if code > 0 { Color::White } else { Color::Black };
        Ok(Some(Piece { color, kind }))
    }

    pub fn code(self) -> i8 {
        let magnitude = match self.kind {
            PieceKind::Pawn => 1,
            PieceKind::Knight => 2,
            PieceKind::Bishop => 3,
            PieceKind::Rook => 4,
            PieceKind::Queen => 5,
            PieceKind::King => 6,
        };
        match self.color {
            Color::White => magnitude,
            Color::Black => -magnitude,
        }
    }

    fn fen_char(self) -> char {
        let c = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

/// An 8x8 grid of pieces.
///
/// `Board` is a plain value: copies are independent and every mutation goes
/// through a board the caller owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i8>>", into = "Vec<Vec<i8>>")]
pub struct Board {
    squares: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

const BACK_RANK: [PieceKind; BOARD_SIZE] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// The standard starting position, black on rows 0-1.
    pub fn initial() -> Self {
        let mut board = Self::empty();
        for (col, kind) in BACK_RANK.iter().enumerate() {
            board.squares[0][col] = Some(Piece::new(Color::Black, *kind));
            board.squares[1][col] = Some(Piece::new(Color::Black, PieceKind::Pawn));
            board.squares[6][col] = Some(Piece::new(Color::White, PieceKind::Pawn));
            board.squares[7][col] = Some(Piece::new(Color::White, *kind));
        }
        board
    }

    pub fn get(&self, pos: Position) -> Option<Piece> {
        self.squares[pos.row()][pos.col()]
    }

    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        self.squares[pos.row()][pos.col()] = piece;
    }

    /// A copy of this board with `pos` replaced.
    pub fn with(mut self, pos: Position, piece: Option<Piece>) -> Self {
        self.set(pos, piece);
        self
    }

    /// Move whatever stands on `from` to `to`, capturing any occupant.
    pub fn apply_move(&mut self, from: Position, to: Position) {
        let moving = self.get(from);
        self.set(from, None);
        self.set(to, moving);
    }

    /// Every occupied square holding a piece of `color`.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| match self.get(pos) {
            Some(piece) if piece.color == color => Some((pos, piece)),
            _ => None,
        })
    }

    pub fn king_position(&self, color: Color) -> Option<Position> {
        self.pieces(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(pos, _)| pos)
    }

    /// FEN for this placement with `side` to move. Castling and en passant
    /// are never conveyed by the protocol, so both fields are always `-`.
    pub fn to_fen(&self, side: Color) -> String {
        let mut placement = String::new();
        for (row, squares) in self.squares.iter().enumerate() {
            let mut empty = 0;
            for square in squares {
                match square {
                    Some(piece) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if row + 1 < BOARD_SIZE {
                placement.push('/');
            }
        }
        let side = match side {
            Color::White => 'w',
            Color::Black => 'b',
        };
        format!("{placement} {side} - - 0 1")
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl TryFrom<Vec<Vec<i8>>> for Board {
    type Error = ClientError;

    fn try_from(grid: Vec<Vec<i8>>) -> Result<Self> {
        let widest = grid.iter().map(Vec::len).max().unwrap_or(0);
        if grid.len() != BOARD_SIZE || grid.iter().any(|row| row.len() != BOARD_SIZE) {
            return Err(ClientError::BoardShape {
                rows: grid.len(),
                cols: widest,
            });
        }
        let mut board = Self::empty();
        for (row, codes) in grid.iter().enumerate() {
            for (col, code) in codes.iter().enumerate() {
                board.squares[row][col] = Piece::from_code(*code)?;
            }
        }
        Ok(board)
    }
}

impl From<Board> for Vec<Vec<i8>> {
    fn from(board: Board) -> Self {
        board
            .squares
            .iter()
            .map(|row| row.iter().map(|sq| sq.map_or(0, Piece::code)).collect())
            .collect()
    }
}

/// The last confirmed move, kept for highlighting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentMove {
    pub from: Position,
    pub to: Position,
}
