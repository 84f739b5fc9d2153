use crate::EventKind;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Jersey number of a roster slot, always within `1..=14`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CapNumber(u8);

impl CapNumber {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 14;

    pub fn new(number: u8) -> Result<CapNumber, CapNumberError> {
        if (CapNumber::MIN..=CapNumber::MAX).contains(&number) {
            Ok(CapNumber(number))
        } else {
            Err(CapNumberError::OutOfRange(number.into()))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub(crate) fn from_slot(slot: usize) -> Option<CapNumber> {
        u8::try_from(slot + 1).ok().and_then(|n| CapNumber::new(n).ok())
    }

    /// Zero-based position of this cap number in a roster.
    pub(crate) fn slot(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for CapNumber {
    type Error = CapNumberError;

    fn try_from(number: u8) -> Result<CapNumber, CapNumberError> {
        CapNumber::new(number)
    }
}

impl From<CapNumber> for u8 {
    fn from(cap: CapNumber) -> u8 {
        cap.0
    }
}

impl FromStr for CapNumber {
    type Err = CapNumberError;

    fn from_str(s: &str) -> Result<CapNumber, CapNumberError> {
        let number: i64 = s
            .trim()
            .parse()
            .map_err(|_| CapNumberError::NotANumber(s.to_string()))?;
        u8::try_from(number)
            .map_err(|_| CapNumberError::OutOfRange(number))
            .and_then(CapNumber::new)
    }
}

impl Display for CapNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapNumberError {
    #[error("cap number {0} is outside 1..=14")]
    OutOfRange(i64),
    #[error("cap number {0:?} is not a number")]
    NotANumber(String),
}

/// Events carry the acting player's cap number as a string key.
pub(crate) mod as_string {
    use super::CapNumber;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(cap: &CapNumber, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(cap)
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<CapNumber, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Player {
    pub cap_number: CapNumber,
    pub name: String,
    pub goals: u16,
    pub kick_outs: u16,
    pub yellow_cards: u16,
    pub red_cards: u16,
}

impl Player {
    pub fn empty_slot(cap_number: CapNumber) -> Player {
        Player {
            cap_number,
            name: String::new(),
            goals: 0,
            kick_outs: 0,
            yellow_cards: 0,
            red_cards: 0,
        }
    }

    /// Blank names mark unfilled roster slots.
    pub fn is_registered(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// A red card removes the player from play for the rest of the match.
    pub fn is_active(&self) -> bool {
        self.red_cards == 0
    }

    pub fn count(&self, kind: EventKind) -> u16 {
        match kind {
            EventKind::Goal => self.goals,
            EventKind::KickOut => self.kick_outs,
            EventKind::YellowCard => self.yellow_cards,
            EventKind::RedCard => self.red_cards,
        }
    }

    pub(crate) fn count_mut(&mut self, kind: EventKind) -> &mut u16 {
        match kind {
            EventKind::Goal => &mut self.goals,
            EventKind::KickOut => &mut self.kick_outs,
            EventKind::YellowCard => &mut self.yellow_cards,
            EventKind::RedCard => &mut self.red_cards,
        }
    }
}
