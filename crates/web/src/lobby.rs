use flipseven_core::{
    ActionError, ConfigError, Deck, Event, EventBus, Frames, Game, GameRules, RngState, Snapshot,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LobbyError {
    #[error("game not found")]
    GameNotFound,
    #[error("unknown connection")]
    UnknownConnection,
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LobbyError {
    /// Whether the submitting client should be told. Everything else is a
    /// stale or out-of-turn action and is dropped silently.
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            LobbyError::GameNotFound
                | LobbyError::UnknownConnection
                | LobbyError::Config(_)
                | LobbyError::Action(ActionError::NotOwner)
                | LobbyError::Action(ActionError::AlreadyStarted)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    Start,
    Hit,
    Stay,
    Freeze { target: String },
    FlipThree { target: String },
    DiscardTarget { target: String, card_idx: usize },
    DiscardCard { card_idx: usize },
    ProceedRound,
}

#[derive(Debug, Serialize)]
pub struct Outcome {
    pub frames: Frames,
    pub events: Vec<Event>,
}

#[derive(Debug, Serialize)]
pub struct Joined {
    pub code: String,
    pub conn: String,
    pub player_id: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
pub struct Left {
    pub player_id: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Live games by room code, and which game each connection belongs to.
#[derive(Debug)]
pub struct Lobby {
    rules: GameRules,
    rng: RngState,
    scripted_deck: Option<Deck>,
    games: HashMap<String, Game>,
    conns: HashMap<String, String>,
}

impl Lobby {
    pub fn new(rules: GameRules, rng: RngState, scripted_deck: Option<Deck>) -> Self {
        Self {
            rules,
            rng,
            scripted_deck,
            games: HashMap::new(),
            conns: HashMap::new(),
        }
    }

    pub fn create(&mut self, name: &str, player_id: Option<&str>) -> Result<Joined, LobbyError> {
        let owner = match player_id {
            Some(id) => id.to_string(),
            None => format!("p-{:016x}", self.rng.next_u64()),
        };
        let mut game = self.new_game(&owner)?;
        while self.games.contains_key(&game.code) {
            game = self.new_game(&owner)?;
        }
        let conn = self.mint_conn();
        let mut events = EventBus::default();
        let player_id = game.add_player(name, &conn, Some(owner.as_str()), &mut events)?;
        let code = game.code.clone();
        log::info!("room {code} opened by {name}");
        let frames = vec![game.snapshot()];
        self.games.insert(code.clone(), game);
        self.conns.insert(conn.clone(), code.clone());
        Ok(Joined {
            code,
            conn,
            player_id,
            outcome: Outcome {
                frames,
                events: events.drain().collect(),
            },
        })
    }

    /// Joins a room, or reconnects when `player_id` already has a seat there.
    pub fn join(
        &mut self,
        code: &str,
        name: &str,
        player_id: Option<&str>,
    ) -> Result<Joined, LobbyError> {
        let code = code.trim().to_uppercase();
        if !self.games.contains_key(&code) {
            return Err(LobbyError::GameNotFound);
        }
        let conn = self.mint_conn();
        let game = self.games.get_mut(&code).ok_or(LobbyError::GameNotFound)?;
        let mut events = EventBus::default();
        let player_id = game.add_player(name, &conn, player_id, &mut events)?;
        let frames = vec![game.snapshot()];
        // A reconnect replaces the player's handle; forget the old one.
        self.conns
            .retain(|handle, room| *room != code || game.player_by_conn(handle).is_some());
        self.conns.insert(conn.clone(), code.clone());
        Ok(Joined {
            code,
            conn,
            player_id,
            outcome: Outcome {
                frames,
                events: events.drain().collect(),
            },
        })
    }

    pub fn perform(&mut self, conn: &str, command: Command) -> Result<Outcome, LobbyError> {
        let game = self.game_for(conn)?;
        let mut events = EventBus::default();
        let frames = match command {
            Command::Start => game.start(conn, &mut events),
            Command::Hit => game.hit(conn, &mut events),
            Command::Stay => game.stay(conn, &mut events),
            Command::Freeze { target } => game.apply_freeze(conn, &target, &mut events),
            Command::FlipThree { target } => game.apply_flip3(conn, &target, &mut events),
            Command::DiscardTarget { target, card_idx } => {
                game.apply_discard_choose_target(conn, &target, card_idx, &mut events)
            }
            Command::DiscardCard { card_idx } => {
                game.apply_discard_choose_card(conn, card_idx, &mut events)
            }
            Command::ProceedRound => game.proceed_round(&mut events),
        }?;
        Ok(Outcome {
            frames,
            events: events.drain().collect(),
        })
    }

    /// Drops the connection. The seat stays so the player can rejoin.
    pub fn leave(&mut self, conn: &str) -> Option<Left> {
        let code = self.conns.remove(conn)?;
        let game = self.games.get_mut(&code)?;
        let mut events = EventBus::default();
        let player_id = game.disconnect(conn, &mut events)?;
        Some(Left {
            player_id,
            outcome: Outcome {
                frames: vec![game.snapshot()],
                events: events.drain().collect(),
            },
        })
    }

    pub fn connection_count(&self) -> usize {
        self.conns.len()
    }

    pub fn state(&self, conn: &str) -> Result<Snapshot, LobbyError> {
        let code = self.conns.get(conn).ok_or(LobbyError::UnknownConnection)?;
        let game = self.games.get(code).ok_or(LobbyError::GameNotFound)?;
        Ok(game.snapshot())
    }

    pub fn room_count(&self) -> usize {
        self.games.len()
    }

    fn game_for(&mut self, conn: &str) -> Result<&mut Game, LobbyError> {
        let code = self.conns.get(conn).ok_or(LobbyError::UnknownConnection)?;
        self.games.get_mut(code).ok_or(LobbyError::GameNotFound)
    }

    fn new_game(&mut self, owner: &str) -> Result<Game, LobbyError> {
        let seed = self.rng.next_u64();
        let game = match &self.scripted_deck {
            Some(deck) => Game::with_deck(owner, self.rules.clone(), deck.clone(), seed)?,
            None => Game::new(owner, self.rules.clone(), seed)?,
        };
        Ok(game)
    }

    fn mint_conn(&mut self) -> String {
        loop {
            let conn = format!("c-{:016x}", self.rng.next_u64());
            if !self.conns.contains_key(&conn) {
                return conn;
            }
        }
    }
}
