use crate::id::TeamId;
use crate::{CapNumber, Player};
use derive_more::Deref;
use serde::{Deserialize, Serialize};

pub const ROSTER_SIZE: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Team {
    pub id: TeamId,
    pub school_name: String,
    pub coaches: Vec<String>,
    pub managers: Vec<String>,
    pub players: Roster,
    pub stats: SeasonStats,
}

impl Team {
    /// Builds a freshly registered team. Blank coach and manager entries are dropped, and the
    /// roster is filled by cap order from `player_names`.
    pub fn register<C, M, P>(
        school_name: &str,
        coaches: C,
        managers: M,
        player_names: P,
    ) -> Result<Team, RegistrationError>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let school_name = school_name.trim();
        if school_name.is_empty() {
            return Err(RegistrationError::MissingSchoolName);
        }
        let coaches = non_blank(coaches);
        if coaches.is_empty() {
            return Err(RegistrationError::MissingCoach);
        }

        let team = Team {
            id: TeamId::new(),
            school_name: school_name.to_string(),
            coaches,
            managers: non_blank(managers),
            players: Roster::with_names(player_names)?,
            stats: SeasonStats::default(),
        };
        log::info!(
            "registered {} ({}) with {} players",
            team.school_name,
            team.id,
            team.registered_players().count()
        );
        Ok(team)
    }

    pub fn registered_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_registered())
    }

    pub fn has_players(&self) -> bool {
        self.registered_players().next().is_some()
    }

    /// `wins-losses-draws`, e.g. `3W-1L-0D`.
    pub fn record(&self) -> String {
        format!(
            "{}W-{}L-{}D",
            self.stats.wins, self.stats.losses, self.stats.draws
        )
    }
}

fn non_blank<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    names
        .into_iter()
        .map(Into::into)
        .filter(|name| !name.trim().is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("school name is required")]
    MissingSchoolName,
    #[error("at least one coach is required")]
    MissingCoach,
    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// The fourteen cap slots of a team. Slot `i` always holds cap number `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Deref, Deserialize, Serialize)]
#[serde(try_from = "Vec<Player>", into = "Vec<Player>")]
pub struct Roster([Player; ROSTER_SIZE]);

impl Roster {
    pub fn new() -> Roster {
        Roster(std::array::from_fn(|slot| {
            let cap = CapNumber::from_slot(slot).expect("roster slots map onto cap numbers");
            Player::empty_slot(cap)
        }))
    }

    pub fn with_names<I>(names: I) -> Result<Roster, RosterError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect::<Vec<String>>();
        if names.len() > ROSTER_SIZE {
            return Err(RosterError::TooManyPlayers(names.len()));
        }
        let mut roster = Roster::new();
        for (player, name) in roster.0.iter_mut().zip(names) {
            player.name = name.trim().to_string();
        }
        Ok(roster)
    }

    pub fn player(&self, cap: CapNumber) -> &Player {
        &self.0[cap.slot()]
    }

    pub(crate) fn player_mut(&mut self, cap: CapNumber) -> &mut Player {
        &mut self.0[cap.slot()]
    }
}

impl Default for Roster {
    fn default() -> Roster {
        Roster::new()
    }
}

impl TryFrom<Vec<Player>> for Roster {
    type Error = RosterError;

    fn try_from(players: Vec<Player>) -> Result<Roster, RosterError> {
        let players: [Player; ROSTER_SIZE] = players
            .try_into()
            .map_err(|players: Vec<Player>| RosterError::WrongSize(players.len()))?;
        for (slot, player) in players.iter().enumerate() {
            if player.cap_number.slot() != slot {
                return Err(RosterError::CapOutOfPlace {
                    slot: slot + 1,
                    cap: player.cap_number,
                });
            }
        }
        Ok(Roster(players))
    }
}

impl From<Roster> for Vec<Player> {
    fn from(roster: Roster) -> Vec<Player> {
        roster.0.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("a roster holds 14 players, got {0}")]
    WrongSize(usize),
    #[error("a roster holds at most 14 players, got {0}")]
    TooManyPlayers(usize),
    #[error("roster slot {slot} holds cap number {cap}")]
    CapOutOfPlace { slot: usize, cap: CapNumber },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStats {
    pub wins: u16,
    pub losses: u16,
    pub draws: u16,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
}

impl SeasonStats {
    pub fn games_played(&self) -> u32 {
        u32::from(self.wins) + u32::from(self.losses) + u32::from(self.draws)
    }

    pub fn record_result(&mut self, goals_for: u16, goals_against: u16) {
        match goals_for.cmp(&goals_against) {
            std::cmp::Ordering::Greater => self.wins += 1,
            std::cmp::Ordering::Less => self.losses += 1,
            std::cmp::Ordering::Equal => self.draws += 1,
        }
        self.goals_for += u32::from(goals_for);
        self.goals_against += u32::from(goals_against);
        self.goal_difference = i64::from(self.goals_for) - i64::from(self.goals_against);
    }
}
