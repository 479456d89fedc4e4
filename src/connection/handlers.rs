use actix::prelude::*;
use log::{debug, error, info, warn};

use crate::error::Result;
use crate::game::legality::is_checkmate;
use crate::game::{ChallengeEvent, Seats, SessionEvent};
use crate::models::{
    AddPlayerOutcome, AddPlayerRequest, AddPlayerResponse, AddPlayerStatus, BoardPayload,
    BoardView, ChallengePayload, ConnectionStatus, GameOverPayload, GamePayload, InboundEvent,
    LocalAction, MovePayload, OutboundEvent, Position,
};

use super::manager::ConnectionManager;

impl ConnectionManager {
    pub(crate) fn dispatch(&mut self, event: InboundEvent, ctx: &mut Context<Self>) -> Result<()> {
        match event {
            InboundEvent::Connect => self.set_connection(ConnectionStatus::Connected),
            InboundEvent::Reconnect(attempt) => {
                info!("Reconnected after {} attempt(s)", attempt);
                self.set_connection(ConnectionStatus::Connected);
            }
            InboundEvent::Reconnecting(attempt) => {
                debug!("Reconnecting, attempt {}", attempt);
                self.set_connection(ConnectionStatus::Connecting);
            }
            InboundEvent::Disconnect => self.handle_disconnect(),
            InboundEvent::SetPlayersInLobby(players) => self.handle_roster(players),
            InboundEvent::AddPlayerToLobbyResponse(response) => self.handle_add_player(response),
            InboundEvent::Challenge(payload) => self.handle_challenge(payload, ctx),
            InboundEvent::Game(payload) => self.handle_game(payload, ctx),
            InboundEvent::Board(payload) => return self.handle_board(payload, ctx),
            InboundEvent::GameOver(payload) => self.handle_game_over(payload, ctx),
            InboundEvent::ServerError(data) => error!("serverError: {}", data),
        }
        Ok(())
    }

    fn set_connection(&mut self, status: ConnectionStatus) {
        if self.state.connection != status {
            info!("Connection {:?} -> {:?}", self.state.connection, status);
        }
        self.state.connection = status;
    }

    /// Lobby and drag state are not carried across a disconnect; the next
    /// roster and board pushes rebuild them.
    fn handle_disconnect(&mut self) {
        self.set_connection(ConnectionStatus::NoConnection);
        self.state.lobby.roster.clear();
        self.state.reconciler = Default::default();
        self.state.board.display = self.state.board.authoritative;
    }

    fn handle_roster(&mut self, players: Vec<String>) {
        let opponent = self
            .state
            .challenge
            .opponent
            .clone()
            .or_else(|| self.current_opponent());
        if let Some(opponent) = opponent {
            if !players.contains(&opponent) {
                warn!("Opponent {} is no longer in the lobby", opponent);
            }
        }
        self.state.lobby.roster = players.into_iter().collect();
    }

    fn current_opponent(&self) -> Option<String> {
        let session = &self.state.session;
        let (seats, color) = (session.seats.as_ref()?, session.color?);
        Some(seats.player(!color).to_string())
    }

    fn handle_add_player(&mut self, response: AddPlayerResponse) {
        let identity = &self.state.identity;
        let is_local = identity.is(&response.username) && identity.id == response.id;

        match (is_local, response.message) {
            (true, AddPlayerOutcome::PlayerExists) => {
                warn!("Username {} is already taken", response.username);
                self.state.identity.username = None;
                self.state.lobby.add_status = AddPlayerStatus::UsernameTaken;
            }
            (true, AddPlayerOutcome::Success) => {
                info!("Joined lobby as {}", response.username);
                self.state.lobby.roster = response.players_in_lobby.into_iter().collect();
                self.state.lobby.add_status = AddPlayerStatus::Acknowledged;
            }
            (false, AddPlayerOutcome::Success) => {
                self.state.lobby.roster = response.players_in_lobby.into_iter().collect();
            }
            (_, outcome) => debug!("Ignoring addPlayerToLobbyResponse {:?} for {}", outcome, response.username),
        }
    }

    fn handle_challenge(&mut self, payload: ChallengePayload, ctx: &mut Context<Self>) {
        let ChallengePayload {
            challenger,
            challengee,
        } = payload;
        let identity = &self.state.identity;

        let event = if identity.is(&challenger.username) {
            ChallengeEvent::AsChallenger {
                status: challenger.status,
            }
        } else if identity.is(&challengee.username) {
            ChallengeEvent::AsChallengee {
                challenger: challenger.username,
                status: challengee.status,
            }
        } else {
            debug!(
                "Challenge between {} and {} does not involve us",
                challenger.username, challengee.username
            );
            return;
        };
        self.apply_challenge(event, ctx);
    }

    fn handle_game(&mut self, payload: GamePayload, ctx: &mut Context<Self>) {
        let Some(local) = self
            .state
            .identity
            .seat(&payload.player_white, &payload.player_black)
        else {
            debug!("Game event for another match");
            return;
        };
        self.apply_session(
            SessionEvent::Game {
                status: payload.status,
                countdown: payload.countdown,
                seats: Seats {
                    white: payload.player_white,
                    black: payload.player_black,
                },
                local,
            },
            ctx,
        );
    }

    /// Accept the pushed board, reconcile the local drag with it, then check
    /// whether the side to move has been mated.
    fn handle_board(&mut self, payload: BoardPayload, ctx: &mut Context<Self>) -> Result<()> {
        let Some(local) = self
            .state
            .identity
            .seat(&payload.player_white, &payload.player_black)
        else {
            debug!("Board push for another match");
            return Ok(());
        };

        let board = payload.board;
        let whos_turn = payload.whos_turn;
        let reconciled = self.state.reconciler.on_push(&board, local);
        self.state.reconciler = reconciled.next;
        self.state.board = BoardView {
            authoritative: board,
            display: reconciled.display,
            whos_turn,
            recent_move: payload.recent_move,
        };
        debug!("Board: {}", board.to_fen(whos_turn));

        if is_checkmate(&board, whos_turn)? {
            info!("{:?} is checkmated", whos_turn);
            self.apply_session(SessionEvent::Checkmated(whos_turn), ctx);
        }
        Ok(())
    }

    fn handle_game_over(&mut self, payload: GameOverPayload, ctx: &mut Context<Self>) {
        if self
            .state
            .identity
            .seat(&payload.player_white, &payload.player_black)
            .is_some()
        {
            self.apply_session(SessionEvent::GameOver, ctx);
        }
    }

    pub(crate) fn handle_local(&mut self, action: LocalAction, ctx: &mut Context<Self>) -> Result<()> {
        match action {
            LocalAction::JoinLobby { username } => self.join_lobby(username),
            LocalAction::IssueChallenge { opponent } => {
                if self.state.identity.username.is_none() {
                    warn!("Cannot challenge {} before joining the lobby", opponent);
                } else {
                    self.apply_challenge(ChallengeEvent::Issue { opponent }, ctx);
                }
            }
            LocalAction::RespondToChallenge { accept } => {
                self.apply_challenge(ChallengeEvent::Respond { accept }, ctx)
            }
            LocalAction::PointerDown { at } => {
                let session = &self.state.session;
                match (session.is_active(), session.color) {
                    (true, Some(color)) => {
                        self.state.reconciler = self.state.reconciler.pick_up(
                            &self.state.board.display,
                            at,
                            color,
                            self.state.board.whos_turn,
                        );
                    }
                    _ => debug!("Pointer down outside an active match"),
                }
            }
            LocalAction::PointerUp { drop } => {
                let released = self
                    .state
                    .reconciler
                    .release(&self.state.board.authoritative, drop);
                self.state.reconciler = released.next;
                if let Some(display) = released.display {
                    self.state.board.display = display;
                }
                if let Some((from, to)) = released.sent {
                    self.send_move(from, to);
                }
            }
        }
        Ok(())
    }

    fn join_lobby(&mut self, username: String) {
        if matches!(
            self.state.lobby.add_status,
            AddPlayerStatus::Requested | AddPlayerStatus::Acknowledged
        ) {
            warn!("Already joined or joining the lobby, ignoring {}", username);
            return;
        }
        self.state.identity.username = Some(username.clone());
        self.state.lobby.add_status = AddPlayerStatus::Requested;
        self.emit(OutboundEvent::AddPlayerToLobby(AddPlayerRequest {
            username,
            id: self.state.identity.id,
        }));
    }

    /// Send a dropped move; the next push settles it.
    fn send_move(&mut self, from: Position, to: Position) {
        let Some(seats) = self.state.session.seats.clone() else {
            warn!("Dropped a piece without known seats");
            return;
        };
        self.emit(OutboundEvent::Move(MovePayload {
            player_white: seats.white,
            player_black: seats.black,
            from,
            to,
        }));
    }
}
