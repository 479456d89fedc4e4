pub mod challenge;
pub mod legality;
pub mod reconciler;
pub mod session;
pub mod utils;

pub use challenge::{Challenge, ChallengeEvent, ChallengeStatus, ChallengeTransition, TimerAction};
pub use legality::{is_checkmate, is_in_check, legal_destinations};
pub use reconciler::{MoveIntent, Reconciled, Reconciler, Released};
pub use session::{GameStatus, Seats, Session, SessionEvent, SessionPhase, SessionTransition};
