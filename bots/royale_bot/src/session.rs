use sushigo::{decide_turn, ClientCommand, GameSession, ServerEvent};
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::net::Connection;

/// Drives the protocol exchange for one game or a whole tournament.
///
/// Fully sequential: one inbound event is read and handled to completion
/// (state mutated, at most one command sent) before the next read.
pub struct Session {
    conn: Connection,
    player_name: String,
}

impl Session {
    pub fn new(conn: Connection, player_name: String) -> Self {
        Self { conn, player_name }
    }

    /// Single-game mode: join, signal ready, play until GAME_END.
    pub fn run_game(&mut self, game_id: &str) -> anyhow::Result<()> {
        let join = ClientCommand::Join {
            game_id: String::from(game_id),
            name: self.player_name.clone(),
        };
        let mut game = self.join(&join)?;
        self.conn.send(&ClientCommand::Ready)?;
        self.play_game(&mut game)?;
        Ok(())
    }

    /// Tournament mode: join the bracket, then play assigned matches until
    /// the tournament completes.
    pub fn run_tournament(&mut self, tournament_id: &str) -> anyhow::Result<()> {
        self.join_tournament(tournament_id)?;

        // A tournament event that arrived mid-match waits here until the
        // match has been left.
        let mut pending: Option<ServerEvent> = None;
        loop {
            let event = match pending.take() {
                Some(event) => event,
                None => self.conn.recv()?,
            };
            match event {
                ServerEvent::TournamentMatch {
                    match_token,
                    round,
                    opponent,
                    ..
                } => {
                    let opponent = opponent.unwrap_or_else(|| String::from("unknown"));
                    if match_token == "BYE" || opponent == "BYE" {
                        info!(round, "Bye, auto-advancing");
                        continue;
                    }
                    info!(round, opponent = %opponent, "Match assigned");

                    let join = ClientCommand::TournamentJoin {
                        match_token: match_token.clone(),
                    };
                    let mut game = match self.join(&join) {
                        Ok(game) => game,
                        Err(err) if is_join_rejection(&err) => {
                            // Stay in the bracket and wait for reassignment
                            warn!(error = %err, "Could not join the match");
                            continue;
                        }
                        Err(err) => return Err(err),
                    };
                    self.conn.send(&ClientCommand::Ready)?;
                    pending = self.play_game(&mut game)?;
                    self.leave_game()?;
                }
                ServerEvent::TournamentComplete { winner, .. } => {
                    let winner = winner.unwrap_or_else(|| String::from("unknown"));
                    info!(winner = %winner, "Tournament complete");
                    return Ok(());
                }
                ServerEvent::TournamentJoined { text } => {
                    info!(text = %text, "Tournament roster update");
                }
                other => debug!(?other, "Ignoring event while awaiting a match"),
            }
        }
    }

    /// Sends a JOIN/TJOIN and waits for the WELCOME, skipping interleaved
    /// chatter. An ERROR reply is a rejected join.
    fn join(&mut self, join: &ClientCommand) -> anyhow::Result<GameSession> {
        self.conn.send(join)?;
        loop {
            match self.conn.recv()? {
                ServerEvent::Welcome {
                    game_id,
                    player_id,
                    rejoin_token,
                } => {
                    info!(game_id = %game_id, player_id, "Joined game");
                    return Ok(GameSession::new(
                        game_id,
                        player_id,
                        rejoin_token,
                        self.player_name.clone(),
                    ));
                }
                ServerEvent::Error { message } => {
                    return Err(SessionError::JoinRejected { reason: message }.into());
                }
                other => debug!(?other, "Ignoring event while joining"),
            }
        }
    }

    fn join_tournament(&mut self, tournament_id: &str) -> anyhow::Result<()> {
        self.conn.send(&ClientCommand::Tourney {
            tournament_id: String::from(tournament_id),
            name: self.player_name.clone(),
        })?;
        loop {
            match self.conn.recv()? {
                ServerEvent::TournamentWelcome {
                    tournament_id,
                    joined,
                    capacity,
                    ..
                } => {
                    info!(tournament_id = %tournament_id, joined, capacity, "Joined tournament");
                    return Ok(());
                }
                ServerEvent::Error { message } => {
                    return Err(SessionError::JoinRejected { reason: message }.into());
                }
                other => debug!(?other, "Ignoring event while joining tournament"),
            }
        }
    }

    /// Plays one game to its GAME_END.
    ///
    /// A tournament event arriving mid-game is buffered (single slot, first
    /// one wins) and handed back to the tournament loop, so in-match message
    /// ordering is preserved.
    fn play_game(&mut self, game: &mut GameSession) -> anyhow::Result<Option<ServerEvent>> {
        let mut deferred: Option<ServerEvent> = None;
        loop {
            match self.conn.recv()? {
                ServerEvent::GameEnd { scores, winners } => {
                    info!(?scores, ?winners, "Game over");
                    return Ok(deferred);
                }
                ServerEvent::GameStart { player_count } => {
                    info!(player_count, "Game starting");
                    game.on_game_start(player_count);
                }
                ServerEvent::RoundStart { round } => {
                    info!(round, "Round starting");
                    game.on_round_start(round);
                }
                ServerEvent::Hand { cards } => {
                    game.observe_hand(cards);
                    if let Some(command) = decide_turn(game) {
                        self.conn.send(&command)?;
                    }
                }
                ServerEvent::Played { reveals } => {
                    game.record_reveal(reveals);
                }
                ServerEvent::RoundEnd { round, scores } => {
                    info!(round, ?scores, "Round scores");
                }
                event @ (ServerEvent::TournamentMatch { .. }
                | ServerEvent::TournamentComplete { .. }) => {
                    if deferred.is_none() {
                        debug!("Deferring tournament event until the game ends");
                        deferred = Some(event);
                    } else {
                        warn!(?event, "Dropping tournament event, one is already pending");
                    }
                }
                ServerEvent::Ok | ServerEvent::Waiting => {}
                ServerEvent::Unhandled { line } => {
                    debug!(line = %line, "Ignoring unrecognized line");
                }
                other => debug!(?other, "Ignoring event"),
            }
        }
    }

    /// Leaves a finished tournament match so the next one can be joined.
    /// A rejected LEAVE is logged and treated as left.
    fn leave_game(&mut self) -> anyhow::Result<()> {
        self.conn.send(&ClientCommand::Leave)?;
        loop {
            match self.conn.recv()? {
                ServerEvent::Ok => return Ok(()),
                ServerEvent::Error { message } => {
                    warn!(message = %message, "Leave rejected");
                    return Ok(());
                }
                other => debug!(?other, "Ignoring event while leaving"),
            }
        }
    }
}

fn is_join_rejection(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::JoinRejected { .. })
    )
}
