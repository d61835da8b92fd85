use super::turn::Step;
use super::*;
use crate::Pending;

impl Game {
    pub fn apply_freeze(
        &mut self,
        conn: &str,
        target: &str,
        events: &mut EventBus,
    ) -> Result<Frames, ActionError> {
        let result = self.try_freeze(conn, target, events);
        self.trace_rejection("freeze", &result);
        result
    }

    pub fn apply_flip3(
        &mut self,
        conn: &str,
        target: &str,
        events: &mut EventBus,
    ) -> Result<Frames, ActionError> {
        let result = self.try_flip3(conn, target, events);
        self.trace_rejection("flip three", &result);
        result
    }

    pub fn apply_discard_choose_target(
        &mut self,
        conn: &str,
        target: &str,
        card_index: usize,
        events: &mut EventBus,
    ) -> Result<Frames, ActionError> {
        let result = self.try_discard_target(conn, target, card_index, events);
        self.trace_rejection("discard target", &result);
        result
    }

    pub fn apply_discard_choose_card(
        &mut self,
        conn: &str,
        card_index: usize,
        events: &mut EventBus,
    ) -> Result<Frames, ActionError> {
        let result = self.try_discard_card(conn, card_index, events);
        self.trace_rejection("discard card", &result);
        result
    }

    fn try_freeze(
        &mut self,
        conn: &str,
        target: &str,
        events: &mut EventBus,
    ) -> Result<Frames, ActionError> {
        self.ensure_in_round()?;
        let by = self.index_by_conn(conn)?;
        let card = match self.stack.top() {
            Some(Pending::Freeze { initiator, card }) if *initiator == self.players[by].id => *card,
            Some(Pending::Freeze { .. }) => return Err(ActionError::WrongInitiator),
            _ => return Err(ActionError::NothingPending),
        };
        let target = self.unfinished_target(target)?;
        self.players[target].finished = true;
        self.annotate(by, card, target);
        self.stack.pop();
        events.push(Event::Frozen {
            by: self.players[by].id.clone(),
            target: self.players[target].id.clone(),
        });
        let mut frames = Frames::new();
        self.capture(&mut frames);
        self.resume(&mut frames, events);
        Ok(frames)
    }

    fn try_flip3(
        &mut self,
        conn: &str,
        target: &str,
        events: &mut EventBus,
    ) -> Result<Frames, ActionError> {
        self.ensure_in_round()?;
        let by = self.index_by_conn(conn)?;
        let card = match self.stack.top() {
            Some(Pending::FlipThree { initiator, card }) if *initiator == self.players[by].id => {
                *card
            }
            Some(Pending::FlipThree { .. }) => return Err(ActionError::WrongInitiator),
            _ => return Err(ActionError::NothingPending),
        };
        let target = self.unfinished_target(target)?;
        self.annotate(by, card, target);
        self.stack.pop();
        let target_id = self.players[target].id.clone();
        self.stack.push(Pending::Draw3 {
            target: target_id.clone(),
            remaining: self.rules.flip_three_draws,
        });
        events.push(Event::FlipThreeAssigned {
            by: self.players[by].id.clone(),
            target: target_id,
        });
        let mut frames = Frames::new();
        self.capture(&mut frames);
        self.resume(&mut frames, events);
        Ok(frames)
    }

    fn try_discard_target(
        &mut self,
        conn: &str,
        target: &str,
        card_index: usize,
        events: &mut EventBus,
    ) -> Result<Frames, ActionError> {
        self.ensure_in_round()?;
        let by = self.index_by_conn(conn)?;
        let card = match self.stack.top() {
            Some(Pending::DiscardChooseTarget { initiator, card })
                if *initiator == self.players[by].id =>
            {
                *card
            }
            Some(Pending::DiscardChooseTarget { .. }) => return Err(ActionError::WrongInitiator),
            _ => return Err(ActionError::NothingPending),
        };
        if card != card_index {
            return Err(ActionError::StaleCardIndex);
        }
        let target = self.index_of_target(target)?;
        let by_id = self.players[by].id.clone();
        let target_id = self.players[target].id.clone();
        self.annotate(by, card, target);
        self.stack.pop();
        if self.players[target].cards.is_empty() {
            events.push(Event::DiscardFizzled {
                by: by_id,
                target: target_id,
            });
        } else {
            self.stack.push(Pending::DiscardChooseCard {
                initiator: by_id.clone(),
                target: target_id.clone(),
            });
            events.push(Event::DiscardTargeted {
                by: by_id,
                target: target_id,
            });
        }
        let mut frames = Frames::new();
        self.capture(&mut frames);
        self.resume(&mut frames, events);
        Ok(frames)
    }

    fn try_discard_card(
        &mut self,
        conn: &str,
        card_index: usize,
        events: &mut EventBus,
    ) -> Result<Frames, ActionError> {
        self.ensure_in_round()?;
        let idx = self.index_by_conn(conn)?;
        let initiator = match self.stack.top() {
            Some(Pending::DiscardChooseCard { initiator, target })
                if *target == self.players[idx].id =>
            {
                initiator.clone()
            }
            Some(Pending::DiscardChooseCard { .. }) => return Err(ActionError::NotYourChoice),
            _ => return Err(ActionError::NothingPending),
        };
        if card_index >= self.players[idx].cards.len() {
            return Err(ActionError::CardIndexOutOfRange);
        }
        let flip7_count = self.rules.flip7_count;
        if let Some(card) = self.players[idx].discard_at(card_index, flip7_count) {
            log::debug!(
                "game {}: {} discarded {:?}",
                self.code,
                self.players[idx].id,
                card.kind
            );
            events.push(Event::CardDiscarded {
                by: initiator,
                target: self.players[idx].id.clone(),
                card,
            });
        }
        self.stack.pop();
        let mut frames = Frames::new();
        self.capture(&mut frames);
        self.resume(&mut frames, events);
        Ok(frames)
    }

    /// Drives forced draws until the stack is empty or waiting on a player.
    ///
    /// Each forced card is its own frame. When the stack drains, the turn
    /// advances and the round-end check runs exactly once.
    fn resume(&mut self, frames: &mut Frames, events: &mut EventBus) {
        loop {
            let (target, remaining) = match self.stack.top() {
                None => {
                    self.settle(frames, events);
                    return;
                }
                Some(Pending::Draw3 { target, remaining }) => (target.clone(), *remaining),
                Some(_) => return,
            };
            let idx = match self.index_by_id(&target) {
                Some(idx) if remaining > 0 && !self.players[idx].finished => idx,
                _ => {
                    self.stack.pop();
                    self.capture(frames);
                    continue;
                }
            };
            if let Some(Pending::Draw3 { remaining, .. }) = self.stack.top_mut() {
                *remaining -= 1;
            }
            match self.deal_to(idx, events) {
                Step::Continue => self.capture(frames),
                Step::Finished => {
                    self.stack.pop();
                    self.capture(frames);
                }
                Step::Suspended => {
                    self.capture(frames);
                    return;
                }
            }
        }
    }

    fn unfinished_target(&self, target: &str) -> Result<usize, ActionError> {
        let idx = self.index_of_target(target)?;
        if self.players[idx].finished {
            return Err(ActionError::TargetFinished);
        }
        Ok(idx)
    }

    /// Writes the target's name onto the card that caused the effect.
    fn annotate(&mut self, holder: usize, card: usize, target: usize) {
        let name = self.players[target].name.clone();
        if let Some(card) = self.players[holder].cards.get_mut(card) {
            card.target = Some(name);
        }
    }
}
