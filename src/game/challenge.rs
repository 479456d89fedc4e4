//! Challenge handshake between two lobby players.
//!
//! Only one challenge is tracked at a time. A received challenge is
//! time-boxed: the adapter arms an expiry timer when this machine enters
//! `Received` and must cancel it on every exit, which [`TimerAction`] spells
//! out for each transition.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    #[default]
    Idle,
    Waiting,
    Received,
    Accepted,
    Declined,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Challenge {
    pub status: ChallengeStatus,
    pub opponent: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChallengeEvent {
    /// The local user challenges `opponent`.
    Issue { opponent: String },
    /// Server update naming the local user as challenger.
    AsChallenger { status: ChallengeStatus },
    /// Server update naming the local user as challengee.
    AsChallengee {
        challenger: String,
        status: ChallengeStatus,
    },
    /// Local accept or decline of a received challenge.
    Respond { accept: bool },
    /// The received-challenge timer fired.
    Expire,
    /// A match started; the handshake is over.
    SessionStarted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerAction {
    Keep,
    Arm,
    Cancel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChallengeTransition {
    pub next: Challenge,
    pub timer: TimerAction,
    /// Status to send to the server, if the local user acted.
    pub emit: Option<ChallengeStatus>,
}

impl Challenge {
    pub fn transition(&self, event: ChallengeEvent) -> ChallengeTransition {
        use ChallengeStatus::*;

        let mut next = self.clone();
        let mut timer = TimerAction::Keep;
        let mut emit = None;

        match event {
            ChallengeEvent::Issue { opponent } => match self.status {
                Idle | Declined => {
                    next = Challenge {
                        status: Waiting,
                        opponent: Some(opponent),
                    };
                    emit = Some(Waiting);
                }
                other => warn!("cannot challenge {opponent} while {other:?}"),
            },
            ChallengeEvent::AsChallenger { status } => {
                if self.status == Waiting && status != Waiting {
                    debug!("challenger status {:?} -> {:?}", self.status, status);
                    next.status = status;
                } else {
                    debug!("ignoring challenger update {status:?} while {:?}", self.status);
                }
            }
            ChallengeEvent::AsChallengee { challenger, status } => match self.status {
                Waiting | Received => {
                    warn!("second challenge from {challenger} while {:?}, ignoring", self.status);
                }
                Accepted => debug!("challenge from {challenger} after accepting, ignoring"),
                current if current == status => {}
                _ => {
                    next = Challenge {
                        status: Received,
                        opponent: Some(challenger),
                    };
                    timer = TimerAction::Arm;
                }
            },
            ChallengeEvent::Respond { accept } => {
                if self.status == Received {
                    if accept {
                        next.status = Accepted;
                        emit = Some(Accepted);
                    } else {
                        next = Challenge::default();
                        emit = Some(Declined);
                    }
                } else {
                    warn!("no challenge to respond to while {:?}", self.status);
                }
            }
            ChallengeEvent::Expire => {
                if self.status == Received {
                    debug!("challenge from {:?} expired", self.opponent);
                    next = Challenge::default();
                }
            }
            ChallengeEvent::SessionStarted => next = Challenge::default(),
        }

        if self.status == Received && next.status != Received {
            timer = TimerAction::Cancel;
        }

        ChallengeTransition { next, timer, emit }
    }
}
