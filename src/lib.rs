#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::uninlined_format_args
)]

mod database;
mod game;
pub mod id;
pub mod ledger;
mod player;
mod scorecard;
pub mod storage;
mod team;
mod util;

pub use crate::database::{Autosave, Database, DatabaseError, Summary};
pub use crate::game::{EventKind, Game, GameEvent, Half, Matchup, Side};
pub use crate::ledger::LedgerError;
pub use crate::player::{CapNumber, CapNumberError, Player};
pub use crate::scorecard::{EventLine, GameObserver, Scorecard};
pub use crate::team::{RegistrationError, Roster, RosterError, SeasonStats, Team, ROSTER_SIZE};
pub use crate::util::Timestamp;
