use crate::{Card, CardKind, Game, GameRules, Pending, Player};
use serde::{Deserialize, Serialize};

/// Snapshots emitted by one action, in resolution order. The last one always
/// matches [`Game::snapshot`] taken after the action returns.
pub type Frames = Vec<Snapshot>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Playing,
    Resolving,
    RoundOver,
    MatchOver,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CardValue {
    Number(u8),
    Label(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardView {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Option<CardValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerView {
    pub player_id: String,
    pub sid: Option<String>,
    pub name: String,
    pub round_score: i64,
    pub total_score: i64,
    pub numbers: Vec<u8>,
    pub cards: Vec<CardView>,
    pub second_chance: u32,
    pub busted: bool,
    pub finished: bool,
    pub flip7: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub code: String,
    pub owner: String,
    pub started: bool,
    pub phase: Phase,
    pub round: u32,
    pub turn: usize,
    pub pending_round_reset: bool,
    /// Bottom to top.
    pub pending: Vec<Pending>,
    pub match_winner: Option<String>,
    pub players: Vec<PlayerView>,
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        let value = match card.kind {
            CardKind::Number(value) => Some(CardValue::Number(value)),
            CardKind::Bonus(bonus) => Some(CardValue::Label(bonus.label())),
            _ => None,
        };
        Self {
            kind: card.kind.type_name().to_string(),
            value,
            target: card.target.clone(),
        }
    }
}

impl PlayerView {
    pub fn project(player: &Player, rules: &GameRules) -> Self {
        Self {
            player_id: player.id.clone(),
            sid: player.conn.clone(),
            name: player.name.clone(),
            round_score: player.round_score(rules),
            total_score: player.total_score,
            numbers: player.numbers.iter().copied().collect(),
            cards: player.cards.iter().map(CardView::from).collect(),
            second_chance: player.second_chance,
            busted: player.busted,
            finished: player.finished,
            flip7: player.flip7,
        }
    }
}

impl Game {
    pub fn snapshot(&self) -> Snapshot {
        let match_winner = self
            .match_winner
            .as_deref()
            .and_then(|id| self.player_by_id(id))
            .map(|player| player.name.clone());
        Snapshot {
            code: self.code.clone(),
            owner: self.owner.clone(),
            started: self.started,
            phase: self.phase(),
            round: self.round,
            turn: self.turn,
            pending_round_reset: self.pending_round_reset,
            pending: self.stack.iter().cloned().collect(),
            match_winner,
            players: self
                .players
                .iter()
                .map(|player| PlayerView::project(player, &self.rules))
                .collect(),
        }
    }

    pub(crate) fn capture(&self, frames: &mut Frames) {
        let snapshot = self.snapshot();
        if frames.last() != Some(&snapshot) {
            frames.push(snapshot);
        }
    }
}
