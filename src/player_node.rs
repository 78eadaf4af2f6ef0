#![cfg(feature = "std")]

use std::future::{self, Future};

use rand::rngs::SmallRng;

use crate::{
    common::{AttackOutcome, Coord},
    error::SessionError,
    game::{GameEngine, GameStatus, Phase},
    persistence::SnapshotStore,
    player::Player,
    protocol::{FleetLayout, Message, Role},
    transport::{Transport, TransportError},
};

/// One side of a game: a player, its engine, and the link to the peer.
pub struct PlayerNode {
    player: Box<dyn Player>,
    engine: GameEngine,
    transport: Box<dyn Transport>,
    store: Option<SnapshotStore>,
    /// Whether the peer has shown it is playing the same game: set by the
    /// fleet exchange and by every received shot. A resumed session starts
    /// unsynced, and an unsynced session never overwrites its save.
    peer_synced: bool,
}

impl PlayerNode {
    pub fn new(player: Box<dyn Player>, engine: GameEngine, transport: Box<dyn Transport>) -> Self {
        Self {
            player,
            engine,
            transport,
            store: None,
            peer_synced: false,
        }
    }

    /// Save to `store` when the session aborts; delete it when the game ends.
    pub fn with_store(mut self, store: SnapshotStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Current status of the underlying game engine.
    pub fn status(&self) -> GameStatus {
        self.engine.status()
    }

    /// Exchange fleet layouts. The side that moves first sends first, so one
    /// send is always unconditional and neither side waits on the other.
    async fn handshake(&mut self, role: Role) -> Result<(), SessionError> {
        let own = FleetLayout::from_board(self.engine.own_board())?;
        let remote = match role {
            Role::Listener => {
                self.transport.send(Message::FleetLayout(own)).await?;
                self.recv_layout().await?
            }
            Role::Initiator => {
                let remote = self.recv_layout().await?;
                self.transport.send(Message::FleetLayout(own)).await?;
                remote
            }
        };
        remote.validate()?;
        log::info!(
            "fleet exchange complete as {:?}; {} opponent ships registered",
            role,
            remote.records().len()
        );
        self.engine.begin(remote.into_registry(), role.first_mover())?;
        self.peer_synced = true;
        Ok(())
    }

    async fn recv_layout(&mut self) -> Result<FleetLayout, SessionError> {
        match self.transport.recv().await? {
            Message::FleetLayout(layout) => Ok(layout),
            other => Err(SessionError::ProtocolViolation(format!(
                "expected fleet layout, got {:?}",
                other
            ))),
        }
    }

    /// Ask the player until it names a target the engine accepts.
    fn choose_target(&mut self, rng: &mut SmallRng) -> Result<Coord, SessionError> {
        let remaining = self.engine.remote_lengths_remaining();
        loop {
            let coord = self
                .player
                .select_target(rng, self.engine.remote_view(), &remaining)
                .ok_or(SessionError::Transport(TransportError::Interrupted))?;
            match self.engine.validate_target(coord) {
                Ok(()) => return Ok(coord),
                Err(reason) => {
                    log::debug!("target {:?} refused: {}", coord, reason);
                    self.player.reject_target(coord, reason);
                }
            }
        }
    }

    async fn local_turn(&mut self, rng: &mut SmallRng) -> Result<(), SessionError> {
        let coord = self.choose_target(rng)?;
        // Nothing is recorded until the shot is on the wire.
        self.transport.send(Message::Shot(coord)).await?;
        let outcome = self.engine.apply_local_attack(coord)?;
        log::debug!("shot at {:?}: {:?}", coord, outcome);
        if let AttackOutcome::HitAndSunk(label) = &outcome {
            log::info!("opponent {} sunk", label);
        }
        self.player.handle_attack_result(coord, &outcome);
        Ok(())
    }

    async fn remote_turn(&mut self) -> Result<(), SessionError> {
        let coord = match self.transport.recv().await? {
            Message::Shot(coord) => coord,
            other => {
                return Err(SessionError::ProtocolViolation(format!(
                    "expected a shot, got {:?}",
                    other
                )))
            }
        };
        let outcome = self.engine.apply_remote_attack(coord).map_err(|e| {
            SessionError::ProtocolViolation(format!("peer shot at {:?}: {}", coord, e))
        })?;
        self.peer_synced = true;
        log::debug!("incoming shot at {:?}: {:?}", coord, outcome);
        self.player.handle_incoming_attack(coord, &outcome);
        Ok(())
    }

    /// Handshake if needed, then alternate turns until someone wins.
    async fn play(&mut self, rng: &mut SmallRng, role: Role) -> Result<GameStatus, SessionError> {
        if self.engine.phase() == Phase::AwaitingFleetExchange {
            self.handshake(role).await?;
        } else {
            self.peer_synced = false;
            log::info!("resuming saved game; local turn: {}", self.engine.is_local_turn());
        }
        self.player.show(&self.engine);
        while !self.engine.is_over() {
            if self.engine.is_local_turn() {
                self.local_turn(rng).await?;
            } else {
                self.remote_turn().await?;
            }
            self.player.show(&self.engine);
        }
        Ok(self.engine.status())
    }

    /// Play to the end without an external interrupt.
    pub async fn run(&mut self, rng: &mut SmallRng, role: Role) -> Result<GameStatus, SessionError> {
        self.run_until(rng, role, future::pending::<()>()).await
    }

    /// Play to the end, abandoning the game when `interrupt` completes first.
    ///
    /// On success the snapshot is deleted. On any failure the state as of the
    /// last completed turn is saved (if the fleet exchange had finished) and
    /// the transport is closed.
    pub async fn run_until<F>(
        &mut self,
        rng: &mut SmallRng,
        role: Role,
        interrupt: F,
    ) -> Result<GameStatus, SessionError>
    where
        F: Future<Output = ()>,
    {
        let result = tokio::select! {
            res = self.play(rng, role) => res,
            _ = interrupt => Err(SessionError::Transport(TransportError::Interrupted)),
        };
        match result {
            Ok(status) => {
                log::info!("game over: {:?}", status);
                if let Some(store) = &self.store {
                    if let Err(e) = store.delete() {
                        log::warn!("could not remove save file: {}", e);
                    }
                }
                self.transport.close().await;
                Ok(status)
            }
            Err(err) => {
                log::error!("session aborted: {}", err);
                if let Err(e) = self.save_snapshot() {
                    log::error!("could not save game: {}", e);
                }
                self.transport.close().await;
                Err(err)
            }
        }
    }

    /// Persist the current state for a later resume. Skipped until the peer has
    /// answered at least once, so a one-sided resume cannot clobber the save.
    pub fn save_snapshot(&self) -> Result<(), SessionError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        if self.engine.is_over() {
            return Ok(());
        }
        if !self.peer_synced {
            log::warn!("peer never confirmed the resumed game; keeping the earlier save");
            return Ok(());
        }
        match self.engine.state() {
            Some(state) => {
                store.save(&state)?;
                Ok(())
            }
            None => {
                log::warn!("fleet exchange incomplete; nothing to save");
                Ok(())
            }
        }
    }
}
