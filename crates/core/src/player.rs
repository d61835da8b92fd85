use crate::{Bonus, Card, CardKind, GameRules};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a drawn card did to the player who received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drawn {
    Kept,
    SecondChanceUsed,
    Busted,
    FlipSeven,
    /// Resolved by the game, not the player.
    Action(ActionCard),
}

/// Cards whose effect needs a decision from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCard {
    Freeze,
    FlipThree,
    Discard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub conn: Option<String>,
    pub name: String,
    pub total_score: i64,
    #[serde(default)]
    pub numbers: BTreeSet<u8>,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub second_chance: u32,
    #[serde(default)]
    pub busted: bool,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub flip7: bool,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, conn: Option<String>) -> Self {
        Self {
            id: id.into(),
            conn,
            name: name.into(),
            total_score: 0,
            numbers: BTreeSet::new(),
            cards: Vec::new(),
            second_chance: 0,
            busted: false,
            finished: false,
            flip7: false,
        }
    }

    pub fn reset_round(&mut self) {
        self.numbers.clear();
        self.cards.clear();
        self.second_chance = 0;
        self.busted = false;
        self.finished = false;
        self.flip7 = false;
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub fn has_numbers(&self) -> bool {
        !self.numbers.is_empty()
    }

    /// Adds a drawn card to the hand and applies its personal effect.
    pub fn take(&mut self, card: Card, flip7_count: usize) -> Drawn {
        let kind = card.kind;
        self.cards.push(card);
        match kind {
            CardKind::Number(value) => self.take_number(value, flip7_count),
            CardKind::SecondChance => {
                self.second_chance += 1;
                Drawn::Kept
            }
            CardKind::Bonus(_) => Drawn::Kept,
            CardKind::Freeze => Drawn::Action(ActionCard::Freeze),
            CardKind::FlipThree => Drawn::Action(ActionCard::FlipThree),
            CardKind::Discard => Drawn::Action(ActionCard::Discard),
        }
    }

    fn take_number(&mut self, value: u8, flip7_count: usize) -> Drawn {
        if self.numbers.contains(&value) {
            if self.second_chance > 0 {
                self.second_chance -= 1;
                return Drawn::SecondChanceUsed;
            }
            self.busted = true;
            self.finished = true;
            return Drawn::Busted;
        }
        self.numbers.insert(value);
        if self.numbers.len() >= flip7_count {
            self.finished = true;
            self.flip7 = true;
            return Drawn::FlipSeven;
        }
        Drawn::Kept
    }

    /// Removes the card at `index` if it is a number card.
    ///
    /// Other card kinds stay in hand and `None` is returned. The value leaves
    /// `numbers` only when no other copy of it is still held.
    pub fn discard_at(&mut self, index: usize, flip7_count: usize) -> Option<Card> {
        let value = self.cards.get(index)?.kind.number()?;
        let card = self.cards.remove(index);
        let still_held = self
            .cards
            .iter()
            .any(|card| card.kind == CardKind::Number(value));
        if !still_held {
            self.numbers.remove(&value);
        }
        if self.flip7 && self.numbers.len() < flip7_count {
            self.flip7 = false;
        }
        Some(card)
    }

    pub fn round_score(&self, rules: &GameRules) -> i64 {
        if self.busted {
            return 0;
        }
        let mut sum: i64 = self.numbers.iter().map(|value| i64::from(*value)).sum();
        let mut factor: i64 = 1;
        for card in &self.cards {
            match card.kind {
                CardKind::Bonus(Bonus::Add(value)) => sum += i64::from(value),
                CardKind::Bonus(Bonus::Times(value)) => factor *= i64::from(value),
                _ => {}
            }
        }
        let mut score = sum * factor;
        if self.flip7 {
            score += rules.flip7_bonus;
        }
        score
    }
}
