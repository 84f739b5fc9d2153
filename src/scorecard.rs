use crate::id::TeamId;
use crate::ledger::{self, LedgerError};
use crate::{CapNumber, EventKind, Game, GameEvent, Half, Matchup, Player, Roster, Side, Team};

/// Receives the game after every successful scorecard mutation. Calls happen synchronously,
/// before the mutating method returns.
pub trait GameObserver {
    /// Called after an event is recorded or undone, and after a reset.
    fn game_updated(&mut self, game: &Game);

    /// Called once, when the game is first marked completed.
    fn game_completed(&mut self, game: &Game) {
        self.game_updated(game);
    }
}

impl GameObserver for () {
    fn game_updated(&mut self, _game: &Game) {}
}

/// One line of the running event log.
#[derive(Debug, Clone, Copy)]
pub struct EventLine<'a> {
    pub event: &'a GameEvent,
    pub school_name: &'a str,
    pub player_name: &'a str,
}

impl std::fmt::Display for EventLine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} #{}",
            self.event.kind, self.school_name, self.event.player
        )?;
        if !self.player_name.is_empty() {
            write!(f, " {}", self.player_name)?;
        }
        write!(f, " (H{})", self.event.half.number())
    }
}

/// A live match between two registered teams.
///
/// Player counters shown on the scorecard are recomputed from the event sequence on top of
/// each team's pre-match roster, so undoing an event can never push them below where the
/// match started.
#[derive(Debug)]
pub struct Scorecard<O = ()> {
    game: Game,
    half: Half,
    school_names: Matchup<String>,
    baseline: Matchup<Roster>,
    players: Matchup<Roster>,
    observer: O,
}

impl Scorecard {
    pub fn new(team1: &Team, team2: &Team) -> Result<Scorecard, LedgerError> {
        Scorecard::with_observer(team1, team2, ())
    }
}

impl<O: GameObserver> Scorecard<O> {
    pub fn with_observer(
        team1: &Team,
        team2: &Team,
        observer: O,
    ) -> Result<Scorecard<O>, LedgerError> {
        if team1.id == team2.id {
            return Err(LedgerError::SameTeam(team1.id.clone()));
        }
        let game = Game::new(Matchup {
            team1: team1.id.clone(),
            team2: team2.id.clone(),
        });
        log::info!(
            "starting game {}: {} vs {}",
            game.id,
            team1.school_name,
            team2.school_name
        );
        Ok(Scorecard::assemble(game, Half::First, team1, team2, observer))
    }

    /// Picks up a stored game between the same two teams. The current half resumes from the
    /// most recent event.
    pub fn resume(
        mut game: Game,
        team1: &Team,
        team2: &Team,
        observer: O,
    ) -> Result<Scorecard<O>, LedgerError> {
        for team in [team1, team2] {
            if game.side_of(&team.id).is_none() {
                return Err(LedgerError::UnknownTeam {
                    game: game.id,
                    team: team.id.clone(),
                });
            }
        }
        if team1.id == team2.id {
            return Err(LedgerError::SameTeam(team1.id.clone()));
        }
        // Callers may hand the teams over in either order.
        let (team1, team2) = if game.team1_id == team1.id {
            (team1, team2)
        } else {
            (team2, team1)
        };

        let half = game.events.last().map(|event| event.half).unwrap_or_default();
        game.refresh_scores();
        log::info!("resuming game {} with {} events", game.id, game.events.len());
        Ok(Scorecard::assemble(game, half, team1, team2, observer))
    }

    fn assemble(game: Game, half: Half, team1: &Team, team2: &Team, observer: O) -> Scorecard<O> {
        let teams = Matchup { team1, team2 };
        let baseline = teams.map(|team| team.players.clone());
        let mut scorecard = Scorecard {
            game,
            half,
            school_names: teams.map(|team| team.school_name.clone()),
            players: baseline.clone(),
            baseline,
            observer,
        };
        scorecard.retally();
        scorecard
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn half(&self) -> Half {
        self.half
    }

    pub fn teams(&self) -> Matchup<&TeamId> {
        self.game.teams()
    }

    pub fn school_name(&self, side: Side) -> &str {
        self.school_names.select(side)
    }

    /// Live roster for one side, counters included.
    pub fn players(&self, side: Side) -> &Roster {
        self.players.select(side)
    }

    pub fn player(&self, team: &TeamId, cap: CapNumber) -> Option<&Player> {
        let side = self.game.side_of(team)?;
        Some(self.players.select(side).player(cap))
    }

    /// Players without a red card stay active.
    pub fn is_active(&self, team: &TeamId, cap: CapNumber) -> bool {
        self.player(team, cap).map_or(false, Player::is_active)
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_parts(self) -> (Game, O) {
        (self.game, self.observer)
    }

    pub fn record_event(
        &mut self,
        player: CapNumber,
        team: &TeamId,
        kind: EventKind,
    ) -> Result<&GameEvent, LedgerError> {
        if let Err(err) = self.game.record_event(player, team, kind, self.half) {
            log::warn!("rejected {} for #{}: {}", kind, player, err);
            return Err(err);
        }
        log::debug!(
            "game {}: {} for #{} of team {} in half {}",
            self.game.id,
            kind,
            player,
            team,
            self.half.number()
        );
        self.retally();
        self.observer.game_updated(&self.game);

        let index = self.game.events.len() - 1;
        Ok(&self.game.events[index])
    }

    pub fn undo_last_event(
        &mut self,
        player: CapNumber,
        team: &TeamId,
        kind: EventKind,
    ) -> Result<Option<GameEvent>, LedgerError> {
        let undone = self.game.undo_last_event(player, team, kind).map_err(|err| {
            log::warn!("rejected undo of {} for #{}: {}", kind, player, err);
            err
        })?;
        if let Some(event) = &undone {
            log::debug!("game {}: undid {} {}", self.game.id, event.kind, event.id);
            self.retally();
            self.observer.game_updated(&self.game);
        }
        Ok(undone)
    }

    pub fn switch_half(&mut self) -> Half {
        self.half = self.half.other();
        self.half
    }

    /// Freezes the ledger. Completing an already completed game changes nothing.
    pub fn complete_game(&mut self) -> &Game {
        if self.game.complete() {
            let scores = self.game.scores();
            log::info!(
                "game {} completed: {} {} - {} {}",
                self.game.id,
                self.school_names.team1,
                scores.team1,
                scores.team2,
                self.school_names.team2
            );
            self.observer.game_completed(&self.game);
        }
        &self.game
    }

    /// Starts over with a new game between the same teams. Rosters return to their pre-match
    /// counters and the half goes back to the first.
    pub fn reset_game(&mut self) -> &Game {
        let previous = self.game.id.clone();
        self.game = Game::new(self.game.teams().map(TeamId::clone));
        self.half = Half::First;
        self.players = self.baseline.clone();
        log::info!("game {} reset as {}", previous, self.game.id);
        self.observer.game_updated(&self.game);
        &self.game
    }

    /// Recorded events, newest first.
    pub fn event_log(&self) -> impl Iterator<Item = EventLine<'_>> {
        self.game.events.iter().rev().map(move |event| {
            let side = self.game.side_of(&event.team).unwrap_or(Side::Team1);
            EventLine {
                event,
                school_name: self.school_names.select(side),
                player_name: &self.players.select(side).player(event.player).name,
            }
        })
    }

    fn retally(&mut self) {
        for side in Side::BOTH {
            let team = *self.game.teams().select(side);
            *self.players.select_mut(side) =
                ledger::tally(&self.game.events, team, self.baseline.select(side));
        }
    }
}
