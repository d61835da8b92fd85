use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid bonus label {0:?}")]
pub struct BonusParseError(pub String);

/// Score modifier printed on a bonus card, written `+N` or `xN`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Bonus {
    Add(u32),
    Times(u32),
}

impl Bonus {
    pub fn parse(label: &str) -> Result<Self, BonusParseError> {
        let label = label.trim();
        let invalid = || BonusParseError(label.to_string());
        let (ctor, digits): (fn(u32) -> Bonus, &str) = if let Some(rest) = label.strip_prefix('+') {
            (Bonus::Add, rest)
        } else if let Some(rest) = label
            .strip_prefix('x')
            .or_else(|| label.strip_prefix('X'))
        {
            (Bonus::Times, rest)
        } else {
            return Err(invalid());
        };
        let value = digits.parse::<u32>().map_err(|_| invalid())?;
        Ok(ctor(value))
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Bonus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bonus::Add(value) => write!(f, "+{value}"),
            Bonus::Times(value) => write!(f, "x{value}"),
        }
    }
}

impl TryFrom<String> for Bonus {
    type Error = BonusParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Bonus::parse(&value)
    }
}

impl From<Bonus> for String {
    fn from(value: Bonus) -> Self {
        value.label()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardKind {
    Number(u8),
    SecondChance,
    Freeze,
    FlipThree,
    Bonus(Bonus),
    Discard,
}

impl CardKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            CardKind::Number(_) => "number",
            CardKind::SecondChance => "second_chance",
            CardKind::Freeze => "freeze",
            CardKind::FlipThree => "flip_three",
            CardKind::Bonus(_) => "bonus",
            CardKind::Discard => "discard",
        }
    }

    pub fn number(&self) -> Option<u8> {
        match self {
            CardKind::Number(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub kind: CardKind,
    /// Display name of the player this card was played against. History only.
    #[serde(default)]
    pub target: Option<String>,
}

impl Card {
    pub fn new(kind: CardKind) -> Self {
        Self { kind, target: None }
    }

    pub fn number(value: u8) -> Self {
        Self::new(CardKind::Number(value))
    }

    pub fn bonus(bonus: Bonus) -> Self {
        Self::new(CardKind::Bonus(bonus))
    }

    pub fn is_number(&self) -> bool {
        self.kind.number().is_some()
    }
}

impl From<CardKind> for Card {
    fn from(kind: CardKind) -> Self {
        Card::new(kind)
    }
}
