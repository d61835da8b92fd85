use crate::{
    ActionStack, ConfigError, Deck, Event, EventBus, Frames, GameRules, Phase, Player, RngState,
};
use thiserror::Error;

mod resolve;
mod round;
mod turn;

/// Why an action was refused. Transports normally answer these with silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("game has not started")]
    NotStarted,
    #[error("game already started")]
    AlreadyStarted,
    #[error("match is over")]
    MatchOver,
    #[error("round is over, waiting for the next one")]
    RoundOver,
    #[error("round still in progress")]
    RoundInProgress,
    #[error("unknown player")]
    UnknownPlayer,
    #[error("unknown target")]
    UnknownTarget,
    #[error("only the owner can do that")]
    NotOwner,
    #[error("not your turn")]
    NotYourTurn,
    #[error("player already finished")]
    AlreadyFinished,
    #[error("a card effect is waiting to be resolved")]
    ResolutionPending,
    #[error("nothing of that kind is waiting to be resolved")]
    NothingPending,
    #[error("the pending effect belongs to another player")]
    WrongInitiator,
    #[error("the pending choice belongs to the discard target")]
    NotYourChoice,
    #[error("target already finished")]
    TargetFinished,
    #[error("card index does not match the pending effect")]
    StaleCardIndex,
    #[error("card index out of range")]
    CardIndexOutOfRange,
}

#[derive(Debug)]
pub struct Game {
    pub code: String,
    /// Stable id of the player allowed to start the game.
    pub owner: String,
    pub rules: GameRules,
    pub players: Vec<Player>,
    pub started: bool,
    pub turn: usize,
    pub round: u32,
    /// Stable id of the winner once the match is decided.
    pub match_winner: Option<String>,
    pub pending_round_reset: bool,
    pub stack: ActionStack,
    pub deck: Deck,
    rng: RngState,
}

impl Game {
    pub fn new(owner: impl Into<String>, rules: GameRules, seed: u64) -> Result<Self, ConfigError> {
        let mut rng = RngState::from_seed(seed);
        let deck = Deck::shuffled(&rules, rng.fork())?;
        Self::assemble(owner.into(), rules, deck, rng)
    }

    /// Game drawing from a caller-supplied deck, typically [`Deck::fixed`].
    pub fn with_deck(
        owner: impl Into<String>,
        rules: GameRules,
        deck: Deck,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::assemble(owner.into(), rules, deck, RngState::from_seed(seed))
    }

    fn assemble(
        owner: String,
        rules: GameRules,
        deck: Deck,
        mut rng: RngState,
    ) -> Result<Self, ConfigError> {
        rules.validate()?;
        let code = rng.token(rules.code_length);
        log::info!("game {code} created by {owner}");
        Ok(Self {
            code,
            owner,
            rules,
            players: Vec::new(),
            started: false,
            turn: 0,
            round: 1,
            match_winner: None,
            pending_round_reset: false,
            stack: ActionStack::new(),
            deck,
            rng,
        })
    }

    pub fn phase(&self) -> Phase {
        if self.match_winner.is_some() {
            Phase::MatchOver
        } else if !self.started {
            Phase::Lobby
        } else if self.pending_round_reset {
            Phase::RoundOver
        } else if !self.stack.is_empty() {
            Phase::Resolving
        } else {
            Phase::Playing
        }
    }

    /// Adds a player, or re-binds `conn` to an existing one when `player_id`
    /// is already known. Returns the player's stable id.
    pub fn add_player(
        &mut self,
        name: &str,
        conn: &str,
        player_id: Option<&str>,
        events: &mut EventBus,
    ) -> Result<String, ActionError> {
        if let Some(id) = player_id {
            if let Some(player) = self.players.iter_mut().find(|p| p.id == id) {
                player.conn = Some(conn.to_string());
                log::info!("game {}: {} reconnected", self.code, player.id);
                events.push(Event::PlayerReconnected {
                    player: player.id.clone(),
                });
                return Ok(player.id.clone());
            }
        }
        if self.started {
            log::trace!("game {}: join refused, already started", self.code);
            return Err(ActionError::AlreadyStarted);
        }
        let id = match player_id {
            Some(id) => id.to_string(),
            None => self.fresh_player_id(),
        };
        log::info!("game {}: {name} joined as {id}", self.code);
        self.players
            .push(Player::new(id.clone(), name, Some(conn.to_string())));
        events.push(Event::PlayerJoined {
            player: id.clone(),
            name: name.to_string(),
        });
        Ok(id)
    }

    /// Lobby to play. Only the owner may do this.
    pub fn start(&mut self, conn: &str, events: &mut EventBus) -> Result<Frames, ActionError> {
        let result = self.try_start(conn, events);
        self.trace_rejection("start", &result);
        result
    }

    fn try_start(&mut self, conn: &str, events: &mut EventBus) -> Result<Frames, ActionError> {
        let idx = self.index_by_conn(conn)?;
        if self.players[idx].id != self.owner {
            return Err(ActionError::NotOwner);
        }
        if self.started {
            return Err(ActionError::AlreadyStarted);
        }
        self.started = true;
        log::info!("game {} started with {} players", self.code, self.players.len());
        events.push(Event::GameStarted {
            players: self.players.len(),
        });
        Ok(vec![self.snapshot()])
    }

    /// Clears the connection handle; the player keeps their seat and turn.
    pub fn disconnect(&mut self, conn: &str, events: &mut EventBus) -> Option<String> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.conn.as_deref() == Some(conn))?;
        player.conn = None;
        log::info!("game {}: {} disconnected", self.code, player.id);
        events.push(Event::PlayerDisconnected {
            player: player.id.clone(),
        });
        Some(player.id.clone())
    }

    pub fn player_by_conn(&self, conn: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.conn.as_deref() == Some(conn))
    }

    pub fn player_by_id(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.turn)
    }

    pub(crate) fn index_by_conn(&self, conn: &str) -> Result<usize, ActionError> {
        self.players
            .iter()
            .position(|p| p.conn.as_deref() == Some(conn))
            .ok_or(ActionError::UnknownPlayer)
    }

    pub(crate) fn index_by_id(&self, id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// Targets are named by connection handle, or by stable id when the
    /// target is disconnected.
    pub(crate) fn index_of_target(&self, target: &str) -> Result<usize, ActionError> {
        self.index_by_conn(target)
            .ok()
            .or_else(|| self.index_by_id(target))
            .ok_or(ActionError::UnknownTarget)
    }

    /// Checks shared by every in-round action.
    pub(crate) fn ensure_in_round(&self) -> Result<(), ActionError> {
        if !self.started {
            return Err(ActionError::NotStarted);
        }
        if self.match_winner.is_some() {
            return Err(ActionError::MatchOver);
        }
        if self.pending_round_reset {
            return Err(ActionError::RoundOver);
        }
        Ok(())
    }

    pub(crate) fn trace_rejection<T>(&self, action: &str, result: &Result<T, ActionError>) {
        if let Err(err) = result {
            log::trace!("game {}: {action} rejected: {err}", self.code);
        }
    }

    fn fresh_player_id(&mut self) -> String {
        loop {
            let id = format!("p-{:016x}", self.rng.next_u64());
            if self.index_by_id(&id).is_none() {
                return id;
            }
        }
    }
}
