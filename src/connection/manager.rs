use actix::prelude::*;
use log::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::game::{ChallengeEvent, ChallengeStatus, SessionEvent, TimerAction};
use crate::models::{
    BoardView, ChallengeParty, ChallengePayload, ClientState, Frame, GameOverPayload, GetState,
    Inbound, InboundEvent, LocalAction, Outbound, OutboundEvent, StateChanged, Subscribe,
};

/// Client-side coordinator for one user.
///
/// Owns the [`ClientState`] and is the only writer to it. Transport events,
/// raw frames, and view-layer actions all arrive through the mailbox, so at
/// most one handler runs at a time and events are applied in delivery order.
pub struct ConnectionManager {
    pub config: ClientConfig,
    pub(crate) state: ClientState,
    outbound: Recipient<Outbound>,
    observers: Vec<Recipient<StateChanged>>,
    expiry: Option<SpawnHandle>,
}

impl ConnectionManager {
    pub fn new(config: ClientConfig, outbound: Recipient<Outbound>) -> Self {
        Self {
            config,
            state: ClientState::default(),
            outbound,
            observers: Vec::new(),
            expiry: None,
        }
    }

    pub(crate) fn emit(&self, event: OutboundEvent) {
        debug!("emitting {:?}", event);
        self.outbound.do_send(Outbound(event));
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer.do_send(StateChanged(self.state.clone()));
        }
    }

    /// Run a handler, isolating any error it reports to this one event.
    fn guarded(&mut self, what: &str, result: Result<()>) {
        if let Err(e) = result {
            error!("{what} failed: {e}");
        }
        self.notify();
    }

    fn cancel_expiry(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.expiry.take() {
            ctx.cancel_future(handle);
        }
    }

    /// Feed the challenge machine and carry out its timer and outbound
    /// effects.
    pub(crate) fn apply_challenge(&mut self, event: ChallengeEvent, ctx: &mut Context<Self>) {
        let transition = self.state.challenge.transition(event);

        match transition.timer {
            TimerAction::Keep => {}
            TimerAction::Cancel => self.cancel_expiry(ctx),
            TimerAction::Arm => {
                self.cancel_expiry(ctx);
                let timeout = self.config.challenge_timeout();
                self.expiry = Some(ctx.run_later(timeout, move |act, ctx| {
                    act.expiry = None;
                    info!("challenge expired after {:?}", timeout);
                    act.apply_challenge(ChallengeEvent::Expire, ctx);
                    act.notify();
                }));
            }
        }

        if let (Some(status), Some(me), Some(opponent)) = (
            transition.emit,
            self.state.identity.username.clone(),
            transition.next.opponent.clone().or_else(|| self.state.challenge.opponent.clone()),
        ) {
            let payload = match status {
                ChallengeStatus::Waiting => ChallengePayload {
                    challenger: ChallengeParty {
                        username: me,
                        status: ChallengeStatus::Waiting,
                    },
                    challengee: ChallengeParty {
                        username: opponent,
                        status: ChallengeStatus::Received,
                    },
                },
                response => ChallengePayload {
                    challenger: ChallengeParty {
                        username: opponent,
                        status: response,
                    },
                    challengee: ChallengeParty {
                        username: me,
                        status: response,
                    },
                },
            };
            self.emit(OutboundEvent::Challenge(payload));
        }

        self.state.challenge = transition.next;
    }

    /// Feed the session machine. A match going live resets the board and
    /// closes the challenge handshake; a local checkmate is announced.
    pub(crate) fn apply_session(&mut self, event: SessionEvent, ctx: &mut Context<Self>) {
        let transition = self.state.session.transition(event);
        if transition.next.phase != self.state.session.phase {
            info!("session {} -> {}", self.state.session.phase, transition.next.phase);
        }

        if transition.started {
            self.state.board = BoardView::default();
            self.state.reconciler = Default::default();
            self.apply_challenge(ChallengeEvent::SessionStarted, ctx);
        }

        if transition.announce_game_over {
            match &transition.next.seats {
                Some(seats) => self.emit(OutboundEvent::GameOver(GameOverPayload {
                    player_white: seats.white.clone(),
                    player_black: seats.black.clone(),
                })),
                None => warn!("checkmated without known seats, cannot announce game over"),
            }
        }

        self.state.session = transition.next;
    }
}

impl Actor for ConnectionManager {
    type Context = Context<Self>;

    fn started(&mut self, _: &mut Self::Context) {
        info!(
            "Match client {} started for {}",
            self.state.identity.id,
            self.config.endpoint()
        );
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        info!("Match client {} stopped", self.state.identity.id);
    }
}

impl Handler<Frame> for ConnectionManager {
    type Result = ();

    fn handle(&mut self, msg: Frame, ctx: &mut Self::Context) {
        debug!("Received frame: {}", msg.0);
        let result = InboundEvent::from_frame(&msg.0).and_then(|event| self.dispatch(event, ctx));
        self.guarded("inbound frame", result);
    }
}

impl Handler<Inbound> for ConnectionManager {
    type Result = ();

    fn handle(&mut self, msg: Inbound, ctx: &mut Self::Context) {
        let result = self.dispatch(msg.0, ctx);
        self.guarded("inbound event", result);
    }
}

impl Handler<LocalAction> for ConnectionManager {
    type Result = ();

    fn handle(&mut self, msg: LocalAction, ctx: &mut Self::Context) {
        let result = self.handle_local(msg, ctx);
        self.guarded("local action", result);
    }
}

impl Handler<GetState> for ConnectionManager {
    type Result = MessageResult<GetState>;

    fn handle(&mut self, _: GetState, _: &mut Self::Context) -> Self::Result {
        MessageResult(self.state.clone())
    }
}

impl Handler<Subscribe> for ConnectionManager {
    type Result = ();

    fn handle(&mut self, msg: Subscribe, _: &mut Self::Context) {
        msg.0.do_send(StateChanged(self.state.clone()));
        self.observers.push(msg.0);
    }
}
