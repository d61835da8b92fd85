use super::*;
use crate::RoundScore;

impl Game {
    /// Starts the next round once the previous one has been scored.
    pub fn proceed_round(&mut self, events: &mut EventBus) -> Result<Frames, ActionError> {
        let result = self.try_proceed_round(events);
        self.trace_rejection("proceed round", &result);
        result
    }

    fn try_proceed_round(&mut self, events: &mut EventBus) -> Result<Frames, ActionError> {
        if self.match_winner.is_some() {
            return Err(ActionError::MatchOver);
        }
        if !self.pending_round_reset {
            return Err(ActionError::RoundInProgress);
        }
        self.start_new_round(events);
        Ok(vec![self.snapshot()])
    }

    /// Scores the round once every player is finished.
    pub(super) fn check_round_end(&mut self, events: &mut EventBus) {
        if self.players.is_empty() || !self.players.iter().all(|p| p.finished) {
            return;
        }
        let mut scores = Vec::with_capacity(self.players.len());
        for player in &mut self.players {
            let round_score = player.round_score(&self.rules);
            player.total_score += round_score;
            scores.push(RoundScore {
                player: player.id.clone(),
                round_score,
                total_score: player.total_score,
            });
        }
        log::info!("game {}: round {} scored", self.code, self.round);
        events.push(Event::RoundScored {
            round: self.round,
            scores,
        });
        match self.leading_winner() {
            Some(idx) => {
                let winner = &self.players[idx];
                log::info!(
                    "game {}: {} wins with {}",
                    self.code,
                    winner.id,
                    winner.total_score
                );
                events.push(Event::MatchWon {
                    player: winner.id.clone(),
                    score: winner.total_score,
                });
                self.match_winner = Some(winner.id.clone());
            }
            None => self.pending_round_reset = true,
        }
    }

    /// Highest total at or above the win score. Equal totals go to whoever
    /// comes first in seat order.
    fn leading_winner(&self) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for (idx, player) in self.players.iter().enumerate() {
            if player.total_score < self.rules.win_score {
                continue;
            }
            if best.map_or(true, |(_, score)| player.total_score > score) {
                best = Some((idx, player.total_score));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn start_new_round(&mut self, events: &mut EventBus) {
        self.round += 1;
        if !self.players.is_empty() {
            self.turn = (self.turn + 1) % self.players.len();
        }
        self.stack.clear();
        self.pending_round_reset = false;
        for player in &mut self.players {
            player.reset_round();
        }
        log::info!("game {}: round {} begins", self.code, self.round);
        events.push(Event::RoundStarted { round: self.round });
    }
}
