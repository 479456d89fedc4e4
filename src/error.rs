use chess::Color;

/// Errors raised by the match client.
///
/// Protocol anomalies (events that do not concern the local user, duplicate
/// challenges, out-of-sequence statuses) are not errors: they are logged and
/// dropped by the handlers. These variants cover invariant violations and
/// undecodable input, which abort the handler that detected them.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("board has no {0:?} king")]
    MissingKing(Color),

    #[error("coordinate out of range: row {row}, col {col}")]
    OutOfRange { row: usize, col: usize },

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("invalid piece code: {0}")]
    InvalidPieceCode(i8),

    #[error("board must be 8x8, got {rows} rows (widest {cols})")]
    BoardShape { rows: usize, cols: usize },

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("malformed frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
