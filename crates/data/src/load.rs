use anyhow::{bail, Context};
use flipseven_core::{Bonus, Card, CardKind, Deck, GameRules};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub const RULES_FILE: &str = "rules.json";

/// Reads `dir/rules.json`. A missing file means the standard rules.
pub fn load_rules(dir: &Path) -> anyhow::Result<GameRules> {
    let path = dir.join(RULES_FILE);
    if !path.exists() {
        log::info!("{} not found, using default rules", path.display());
        return Ok(GameRules::default());
    }
    load_rules_file(&path)
}

pub fn load_rules_file(path: &Path) -> anyhow::Result<GameRules> {
    let rules: GameRules = load_json(path)?;
    rules
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(rules)
}

/// Reads a scripted deck: a JSON array of card labels such as
/// `["2", "freeze", "+4", "x2"]`, drawn first to last and repeated.
pub fn load_deck_file(path: &Path) -> anyhow::Result<Deck> {
    let labels: Vec<String> = load_json(path)?;
    let cards = labels
        .iter()
        .map(|label| parse_card(label))
        .collect::<anyhow::Result<Vec<_>>>()
        .with_context(|| format!("cards in {}", path.display()))?;
    let deck = Deck::fixed(cards).with_context(|| format!("deck {}", path.display()))?;
    Ok(deck)
}

pub fn parse_card(label: &str) -> anyhow::Result<Card> {
    let normalized = label.trim().to_lowercase();
    let kind = match normalized.as_str() {
        "second_chance" | "second-chance" | "sc" => CardKind::SecondChance,
        "freeze" => CardKind::Freeze,
        "flip_three" | "flip3" | "flip-three" => CardKind::FlipThree,
        "discard" => CardKind::Discard,
        other if other.starts_with('+') || other.starts_with('x') => {
            CardKind::Bonus(Bonus::parse(other)?)
        }
        other => match other.parse::<u8>() {
            Ok(value) => CardKind::Number(value),
            Err(_) => bail!("unknown card label {label:?}"),
        },
    };
    Ok(Card::new(kind))
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
