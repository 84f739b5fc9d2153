use crate::id::{EventId, GameId, TeamId};
use crate::util::{self, Timestamp};
use crate::CapNumber;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Game {
    pub id: GameId,
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub team1_score: u16,
    pub team2_score: u16,
    pub events: Vec<GameEvent>,
    pub completed: bool,
    pub created_at: Timestamp,
}

impl Game {
    pub fn new(teams: Matchup<TeamId>) -> Game {
        Game {
            id: GameId::new(),
            team1_id: teams.team1,
            team2_id: teams.team2,
            team1_score: 0,
            team2_score: 0,
            events: Vec::new(),
            completed: false,
            created_at: util::now(),
        }
    }

    pub fn teams(&self) -> Matchup<&TeamId> {
        Matchup {
            team1: &self.team1_id,
            team2: &self.team2_id,
        }
    }

    pub fn scores(&self) -> Matchup<u16> {
        Matchup {
            team1: self.team1_score,
            team2: self.team2_score,
        }
    }

    pub fn side_of(&self, team: &TeamId) -> Option<Side> {
        if *team == self.team1_id {
            Some(Side::Team1)
        } else if *team == self.team2_id {
            Some(Side::Team2)
        } else {
            None
        }
    }

    pub fn winner(&self) -> Option<&TeamId> {
        match self.team1_score.cmp(&self.team2_score) {
            std::cmp::Ordering::Greater => Some(&self.team1_id),
            std::cmp::Ordering::Less => Some(&self.team2_id),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct GameEvent {
    pub id: EventId,
    #[serde(rename = "playerId", with = "crate::player::as_string")]
    pub player: CapNumber,
    #[serde(rename = "teamId")]
    pub team: TeamId,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub half: Half,
    pub timestamp: Timestamp,
}

impl GameEvent {
    pub fn new(player: CapNumber, team: TeamId, kind: EventKind, half: Half) -> GameEvent {
        GameEvent {
            id: EventId::new(),
            player,
            team,
            kind,
            half,
            timestamp: util::now(),
        }
    }

    pub fn matches(&self, player: CapNumber, team: &TeamId, kind: EventKind) -> bool {
        self.player == player && self.team == *team && self.kind == kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Goal,
    KickOut,
    YellowCard,
    RedCard,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Goal,
        EventKind::KickOut,
        EventKind::YellowCard,
        EventKind::RedCard,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EventKind::Goal => "Goal",
            EventKind::KickOut => "Kick-out",
            EventKind::YellowCard => "Yellow Card",
            EventKind::RedCard => "Red Card",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Playing period an event belongs to; stored on the wire as `1` or `2`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Half {
    #[default]
    First,
    Second,
}

impl Half {
    pub fn other(self) -> Half {
        match self {
            Half::First => Half::Second,
            Half::Second => Half::First,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Half::First => 1,
            Half::Second => 2,
        }
    }
}

impl TryFrom<u8> for Half {
    type Error = String;

    fn try_from(n: u8) -> Result<Half, String> {
        match n {
            1 => Ok(Half::First),
            2 => Ok(Half::Second),
            n => Err(format!("half must be 1 or 2, got {}", n)),
        }
    }
}

impl From<Half> for u8 {
    fn from(half: Half) -> u8 {
        half.number()
    }
}

/// A pair of values, one per side of a game.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Matchup<T> {
    pub team1: T,
    pub team2: T,
}

impl<T> Matchup<T> {
    pub fn map<U, F>(self, mut op: F) -> Matchup<U>
    where
        F: FnMut(T) -> U,
    {
        Matchup {
            team1: op(self.team1),
            team2: op(self.team2),
        }
    }

    pub fn select(&self, side: Side) -> &T {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }

    pub fn select_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Team1 => &mut self.team1,
            Side::Team2 => &mut self.team2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Team1, Side::Team2];
}
