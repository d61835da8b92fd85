use crate::{Bonus, Card, CardKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("shuffle_passes must be at least 1")]
    NoShufflePasses,
    #[error("flip7_count must be between 1 and {max}, got {got}")]
    InvalidFlipCount { got: usize, max: usize },
    #[error("flip_three_draws must be at least 1")]
    NoFlipThreeDraws,
    #[error("code_length must be at least 1")]
    EmptyCode,
    #[error("deck has no cards")]
    EmptyDeck,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeckRules {
    /// Numbers `1..=max_number` appear as many times as their value.
    pub max_number: u8,
    pub zero_cards: u32,
    pub second_chance: u32,
    pub freeze: u32,
    pub flip_three: u32,
    pub discard: u32,
    pub bonuses: Vec<Bonus>,
}

impl Default for DeckRules {
    fn default() -> Self {
        Self {
            max_number: 12,
            zero_cards: 1,
            second_chance: 3,
            freeze: 3,
            flip_three: 3,
            discard: 5,
            bonuses: vec![
                Bonus::Add(2),
                Bonus::Add(4),
                Bonus::Add(6),
                Bonus::Add(8),
                Bonus::Add(10),
                Bonus::Times(2),
                Bonus::Times(2),
            ],
        }
    }
}

impl DeckRules {
    /// Full deck contents in a stable order, before shuffling.
    pub fn composition(&self) -> Vec<Card> {
        let mut cards = Vec::new();
        for value in 1..=self.max_number {
            for _ in 0..value {
                cards.push(Card::number(value));
            }
        }
        let repeated = [
            (CardKind::Number(0), self.zero_cards),
            (CardKind::SecondChance, self.second_chance),
            (CardKind::Freeze, self.freeze),
            (CardKind::FlipThree, self.flip_three),
            (CardKind::Discard, self.discard),
        ];
        for (kind, count) in repeated {
            cards.extend((0..count).map(|_| Card::new(kind)));
        }
        cards.extend(self.bonuses.iter().copied().map(Card::bonus));
        cards
    }

    /// How many distinct number values the deck can produce.
    pub fn distinct_numbers(&self) -> usize {
        let zero = usize::from(self.zero_cards > 0);
        usize::from(self.max_number) + zero
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameRules {
    pub win_score: i64,
    pub flip7_bonus: i64,
    pub flip7_count: usize,
    pub flip_three_draws: u32,
    pub shuffle_passes: u32,
    pub code_length: usize,
    pub deck: DeckRules,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            win_score: 200,
            flip7_bonus: 15,
            flip7_count: 7,
            flip_three_draws: 3,
            shuffle_passes: 10,
            code_length: 5,
            deck: DeckRules::default(),
        }
    }
}

impl GameRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shuffle_passes == 0 {
            return Err(ConfigError::NoShufflePasses);
        }
        let max = self.deck.distinct_numbers();
        if self.flip7_count == 0 || self.flip7_count > max {
            return Err(ConfigError::InvalidFlipCount {
                got: self.flip7_count,
                max,
            });
        }
        if self.flip_three_draws == 0 {
            return Err(ConfigError::NoFlipThreeDraws);
        }
        if self.code_length == 0 {
            return Err(ConfigError::EmptyCode);
        }
        if self.deck.composition().is_empty() {
            return Err(ConfigError::EmptyDeck);
        }
        Ok(())
    }
}
