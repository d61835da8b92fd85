use crate::Card;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundScore {
    pub player: String,
    pub round_score: i64,
    pub total_score: i64,
}

/// Play-by-play history. Nothing in the rules reads these back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    PlayerJoined { player: String, name: String },
    PlayerReconnected { player: String },
    PlayerDisconnected { player: String },
    GameStarted { players: usize },
    CardDrawn { player: String, card: Card },
    SecondChanceUsed { player: String },
    Busted { player: String },
    FlipSeven { player: String },
    Stayed { player: String },
    Frozen { by: String, target: String },
    FlipThreeAssigned { by: String, target: String },
    DiscardTargeted { by: String, target: String },
    CardDiscarded { by: String, target: String, card: Card },
    DiscardFizzled { by: String, target: String },
    RoundScored { round: u32, scores: Vec<RoundScore> },
    RoundStarted { round: u32 },
    MatchWon { player: String, score: i64 },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }
}
