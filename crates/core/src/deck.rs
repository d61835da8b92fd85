use crate::{Card, ConfigError, GameRules, RngState};

#[derive(Debug, Clone)]
enum Refill {
    Shuffled {
        composition: Vec<Card>,
        passes: u32,
        rng: RngState,
    },
    /// Replays the same sequence, first card on top.
    Fixed(Vec<Card>),
}

/// Draw pile that refills itself the moment its last card is taken.
#[derive(Debug, Clone)]
pub struct Deck {
    draw: Vec<Card>,
    refill: Refill,
}

impl Deck {
    pub fn shuffled(rules: &GameRules, rng: RngState) -> Result<Self, ConfigError> {
        let composition = rules.deck.composition();
        if composition.is_empty() {
            return Err(ConfigError::EmptyDeck);
        }
        if rules.shuffle_passes == 0 {
            return Err(ConfigError::NoShufflePasses);
        }
        let mut deck = Self {
            draw: Vec::new(),
            refill: Refill::Shuffled {
                composition,
                passes: rules.shuffle_passes,
                rng,
            },
        };
        deck.refill();
        Ok(deck)
    }

    /// Deterministic deck: `cards[0]` is drawn first, and the sequence repeats.
    pub fn fixed(cards: Vec<Card>) -> Result<Self, ConfigError> {
        if cards.is_empty() {
            return Err(ConfigError::EmptyDeck);
        }
        let mut deck = Self {
            draw: Vec::new(),
            refill: Refill::Fixed(cards),
        };
        deck.refill();
        Ok(deck)
    }

    pub fn draw(&mut self) -> Card {
        let card = match self.draw.pop() {
            Some(card) => card,
            None => {
                self.refill();
                return self.draw();
            }
        };
        if self.draw.is_empty() {
            self.refill();
        }
        card
    }

    pub fn remaining(&self) -> usize {
        self.draw.len()
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.refill, Refill::Fixed(_))
    }

    fn refill(&mut self) {
        match &mut self.refill {
            Refill::Shuffled {
                composition,
                passes,
                rng,
            } => {
                let mut cards = composition.clone();
                for _ in 0..*passes {
                    rng.shuffle(&mut cards);
                }
                self.draw = cards;
            }
            Refill::Fixed(cards) => {
                self.draw = cards.iter().rev().cloned().collect();
            }
        }
        log::debug!("deck refilled with {} cards", self.draw.len());
    }
}
