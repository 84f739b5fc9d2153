//! Transitions over a [`Game`]'s event sequence.
//!
//! Scores are never patched in place: every change to `events` is followed by a full
//! recount, so `team1_score`/`team2_score` always equal the number of goal events each team
//! owns, whatever order records and undos arrive in.

use crate::id::{GameId, TeamId};
use crate::{CapNumber, EventKind, Game, GameEvent, Half, Matchup, Roster};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("game {0} is completed and no longer accepts changes")]
    Completed(GameId),
    #[error("team {team} is not playing in game {game}")]
    UnknownTeam { game: GameId, team: TeamId },
    #[error("team {0} cannot play against itself")]
    SameTeam(TeamId),
}

/// Counts goal events per team.
pub fn derive_scores(events: &[GameEvent], team1: &TeamId, team2: &TeamId) -> Matchup<u16> {
    let goals = |team: &TeamId| {
        let n = events
            .iter()
            .filter(|event| event.team == *team && event.kind == EventKind::Goal)
            .count();
        u16::try_from(n).unwrap_or(u16::MAX)
    };
    Matchup {
        team1: goals(team1),
        team2: goals(team2),
    }
}

/// Adds each of `team`'s events onto a copy of its pre-match roster.
pub fn tally(events: &[GameEvent], team: &TeamId, baseline: &Roster) -> Roster {
    let mut roster = baseline.clone();
    for event in events.iter().filter(|event| event.team == *team) {
        let count = roster.player_mut(event.player).count_mut(event.kind);
        *count = count.saturating_add(1);
    }
    roster
}

impl Game {
    pub fn record_event(
        &mut self,
        player: CapNumber,
        team: &TeamId,
        kind: EventKind,
        half: Half,
    ) -> Result<&GameEvent, LedgerError> {
        self.ensure_open()?;
        if self.side_of(team).is_none() {
            return Err(LedgerError::UnknownTeam {
                game: self.id.clone(),
                team: team.clone(),
            });
        }

        self.events
            .push(GameEvent::new(player, team.clone(), kind, half));
        self.refresh_scores();
        let index = self.events.len() - 1;
        Ok(&self.events[index])
    }

    /// Removes the most recent event matching all of `player`, `team` and `kind`. Returns
    /// `Ok(None)` when nothing matches.
    pub fn undo_last_event(
        &mut self,
        player: CapNumber,
        team: &TeamId,
        kind: EventKind,
    ) -> Result<Option<GameEvent>, LedgerError> {
        self.ensure_open()?;
        let Some(index) = self
            .events
            .iter()
            .rposition(|event| event.matches(player, team, kind))
        else {
            return Ok(None);
        };

        let event = self.events.remove(index);
        self.refresh_scores();
        Ok(Some(event))
    }

    /// Marks the game completed. Returns `false` if it already was.
    pub fn complete(&mut self) -> bool {
        !std::mem::replace(&mut self.completed, true)
    }

    pub fn refresh_scores(&mut self) {
        let scores = derive_scores(&self.events, &self.team1_id, &self.team2_id);
        self.team1_score = scores.team1;
        self.team2_score = scores.team2;
    }

    pub fn scores_consistent(&self) -> bool {
        derive_scores(&self.events, &self.team1_id, &self.team2_id) == self.scores()
    }

    fn ensure_open(&self) -> Result<(), LedgerError> {
        if self.completed {
            Err(LedgerError::Completed(self.id.clone()))
        } else {
            Ok(())
        }
    }
}
