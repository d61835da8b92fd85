use super::*;
use crate::{ActionCard, Drawn, Pending};

/// Result of dealing one card to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Step {
    Continue,
    /// The player busted or completed their numbers.
    Finished,
    /// A new pending entry now sits on top of the stack.
    Suspended,
}

impl Game {
    pub fn hit(&mut self, conn: &str, events: &mut EventBus) -> Result<Frames, ActionError> {
        let result = self.try_hit(conn, events);
        self.trace_rejection("hit", &result);
        result
    }

    pub fn stay(&mut self, conn: &str, events: &mut EventBus) -> Result<Frames, ActionError> {
        let result = self.try_stay(conn, events);
        self.trace_rejection("stay", &result);
        result
    }

    fn try_hit(&mut self, conn: &str, events: &mut EventBus) -> Result<Frames, ActionError> {
        let idx = self.turn_holder(conn)?;
        let mut frames = Frames::new();
        if self.deal_to(idx, events) == Step::Suspended {
            self.capture(&mut frames);
            return Ok(frames);
        }
        self.settle(&mut frames, events);
        Ok(frames)
    }

    fn try_stay(&mut self, conn: &str, events: &mut EventBus) -> Result<Frames, ActionError> {
        let idx = self.turn_holder(conn)?;
        self.players[idx].finished = true;
        events.push(Event::Stayed {
            player: self.players[idx].id.clone(),
        });
        let mut frames = Frames::new();
        self.settle(&mut frames, events);
        Ok(frames)
    }

    fn turn_holder(&self, conn: &str) -> Result<usize, ActionError> {
        self.ensure_in_round()?;
        if !self.stack.is_empty() {
            return Err(ActionError::ResolutionPending);
        }
        let idx = self.index_by_conn(conn)?;
        if idx != self.turn {
            return Err(ActionError::NotYourTurn);
        }
        if self.players[idx].finished {
            return Err(ActionError::AlreadyFinished);
        }
        Ok(idx)
    }

    /// Draws for the player at `idx` and applies the card, the same way for a
    /// voluntary hit and a forced draw.
    pub(super) fn deal_to(&mut self, idx: usize, events: &mut EventBus) -> Step {
        let card = self.deck.draw();
        let flip7_count = self.rules.flip7_count;
        let player = &mut self.players[idx];
        log::debug!("game {}: {} drew {:?}", self.code, player.id, card.kind);
        events.push(Event::CardDrawn {
            player: player.id.clone(),
            card: card.clone(),
        });
        let id = player.id.clone();
        let card_index = player.cards.len();
        match player.take(card, flip7_count) {
            Drawn::Kept => Step::Continue,
            Drawn::SecondChanceUsed => {
                events.push(Event::SecondChanceUsed { player: id });
                Step::Continue
            }
            Drawn::Busted => {
                events.push(Event::Busted { player: id });
                Step::Finished
            }
            Drawn::FlipSeven => {
                events.push(Event::FlipSeven { player: id });
                Step::Finished
            }
            Drawn::Action(ActionCard::Freeze) => {
                self.stack.push(Pending::Freeze {
                    initiator: id,
                    card: card_index,
                });
                Step::Suspended
            }
            Drawn::Action(ActionCard::FlipThree) => {
                self.stack.push(Pending::FlipThree {
                    initiator: id,
                    card: card_index,
                });
                Step::Suspended
            }
            Drawn::Action(ActionCard::Discard) => {
                if !self.players.iter().any(Player::has_numbers) {
                    return Step::Continue;
                }
                self.stack.push(Pending::DiscardChooseTarget {
                    initiator: id,
                    card: card_index,
                });
                Step::Suspended
            }
        }
    }

    /// Ordinary turn advance and round-end check, then the closing frame.
    pub(super) fn settle(&mut self, frames: &mut Frames, events: &mut EventBus) {
        self.next_turn();
        self.check_round_end(events);
        self.capture(frames);
    }

    /// Moves to the next unfinished player, wrapping. Stays put when everyone
    /// is finished.
    pub(super) fn next_turn(&mut self) {
        let count = self.players.len();
        let mut idx = self.turn;
        for _ in 0..count {
            idx = (idx + 1) % count;
            if !self.players[idx].finished {
                self.turn = idx;
                return;
            }
        }
    }
}
