use serde::{Deserialize, Serialize};

/// A card effect waiting to be resolved. Player fields hold stable ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pending {
    /// `initiator` picks someone to freeze. `card` is the Freeze card's index in their hand.
    Freeze { initiator: String, card: usize },
    /// `initiator` picks someone who must draw three.
    FlipThree { initiator: String, card: usize },
    /// Forced draws still owed by `target`. Resolved without input.
    Draw3 { target: String, remaining: u32 },
    /// `initiator` picks whose hand loses a card.
    DiscardChooseTarget { initiator: String, card: usize },
    /// `target` picks which of their own cards to discard.
    DiscardChooseCard { initiator: String, target: String },
}

impl Pending {
    /// The player whose input this entry is waiting on, if any.
    pub fn awaiting(&self) -> Option<&str> {
        match self {
            Pending::Freeze { initiator, .. }
            | Pending::FlipThree { initiator, .. }
            | Pending::DiscardChooseTarget { initiator, .. } => Some(initiator),
            Pending::DiscardChooseCard { target, .. } => Some(target),
            Pending::Draw3 { .. } => None,
        }
    }
}

/// Pending effects, most recent last. Only the top entry is ever acted on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionStack {
    entries: Vec<Pending>,
}

impl ActionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: Pending) {
        log::debug!("pending pushed: {entry:?}");
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<Pending> {
        let entry = self.entries.pop();
        if let Some(entry) = &entry {
            log::debug!("pending resolved: {entry:?}");
        }
        entry
    }

    pub fn top(&self) -> Option<&Pending> {
        self.entries.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Pending> {
        self.entries.last_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &Pending> + '_ {
        self.entries.iter()
    }
}
