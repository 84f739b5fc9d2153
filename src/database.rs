use crate::id::{GameId, TeamId};
use crate::scorecard::GameObserver;
use crate::storage::{self, Store, GAMES_KEY, TEAMS_KEY};
use crate::{Game, Team};
use std::cmp::Reverse;
use std::collections::BTreeSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Database {
    pub(crate) teams: Vec<Team>,
    pub(crate) games: Vec<Game>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatabaseError {
    #[error("team {0} is already registered")]
    DuplicateTeam(TeamId),
}

/// Tournament-wide totals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub teams: usize,
    pub players: usize,
    /// Completed games, each counted once. Summing every team's wins, losses and draws would
    /// count each game twice.
    pub games_played: usize,
}

impl Database {
    pub fn new() -> Database {
        Database::default()
    }

    /// Loads both collections. An unreadable collection comes back empty, a record that does
    /// not decode is skipped, and stored scores are recounted from each game's events.
    pub fn load<S: Store + ?Sized>(store: &S) -> Database {
        let mut database = Database {
            teams: storage::load_collection(store, TEAMS_KEY),
            games: storage::load_collection(store, GAMES_KEY),
        };
        for game in &mut database.games {
            if !game.scores_consistent() {
                log::warn!("game {} had stale scores, recounting", game.id);
                game.refresh_scores();
            }
        }
        if let Err(problems) = database.check_consistency() {
            log::warn!("loaded database is inconsistent:\n{}", problems);
        }
        log::debug!(
            "loaded {} teams and {} games",
            database.teams.len(),
            database.games.len()
        );
        database
    }

    pub fn save<S: Store + ?Sized>(&self, store: &mut S) {
        self.save_teams(store);
        self.save_games(store);
    }

    pub fn save_teams<S: Store + ?Sized>(&self, store: &mut S) {
        storage::save_collection(store, TEAMS_KEY, &self.teams);
    }

    pub fn save_games<S: Store + ?Sized>(&self, store: &mut S) {
        storage::save_collection(store, GAMES_KEY, &self.games);
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|team| team.id == *id)
    }

    pub fn game(&self, id: &GameId) -> Option<&Game> {
        self.games.iter().find(|game| game.id == *id)
    }

    /// Up to `limit` of the most recently created games, newest first, with both of their
    /// teams. The limit applies before lookup, so a game whose team is no longer registered
    /// leaves a gap instead of pulling in an older game.
    pub fn recent_games(&self, limit: usize) -> impl Iterator<Item = (&Game, &Team, &Team)> {
        let mut games = self.games.iter().collect::<Vec<_>>();
        games.sort_by_key(|game| Reverse(game.created_at));
        games.into_iter().take(limit).filter_map(move |game| {
            Some((
                game,
                self.team(&game.team1_id)?,
                self.team(&game.team2_id)?,
            ))
        })
    }

    pub fn add_team(&mut self, team: Team) -> Result<TeamId, DatabaseError> {
        if self.team(&team.id).is_some() {
            return Err(DatabaseError::DuplicateTeam(team.id));
        }
        let id = team.id.clone();
        self.teams.push(team);
        Ok(id)
    }

    /// Teams with at least one named player; only these can take part in a game.
    pub fn teams_with_players(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter().filter(|team| team.has_players())
    }

    /// Replaces the stored game with the same id, or appends it.
    pub fn upsert_game(&mut self, game: Game) {
        match self.games.iter_mut().find(|stored| stored.id == game.id) {
            Some(stored) => *stored = game,
            None => self.games.push(game),
        }
        if cfg!(debug_assertions) {
            if let Err(problems) = self.check_consistency() {
                log::warn!("database inconsistent after storing a game:\n{}", problems);
            }
        }
    }

    /// Stores a completed game. The first time a given game is stored as completed, both
    /// teams' season records are updated with its final score.
    pub fn record_completed_game(&mut self, game: Game) {
        let already_counted = self.game(&game.id).map_or(false, |stored| stored.completed);
        if game.completed && !already_counted {
            for (team, goals_for, goals_against) in [
                (&game.team1_id, game.team1_score, game.team2_score),
                (&game.team2_id, game.team2_score, game.team1_score),
            ] {
                match self.teams.iter_mut().find(|t| t.id == *team) {
                    Some(team) => {
                        team.stats.record_result(goals_for, goals_against);
                        log::info!("{} now {}", team.school_name, team.record());
                    }
                    None => log::warn!("game {} references unknown team {}", game.id, team),
                }
            }
        }
        self.upsert_game(game);
    }

    pub fn summary(&self) -> Summary {
        Summary {
            teams: self.teams.len(),
            players: self
                .teams
                .iter()
                .map(|team| team.registered_players().count())
                .sum(),
            games_played: self.games.iter().filter(|game| game.completed).count(),
        }
    }

    // Teams and games are plain vectors that refer to each other by identifier. These invariants
    // are checked:
    //
    // 1. After `Database::load`
    // 2. When debug assertions are enabled, after every `Database::upsert_game`
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        macro_rules! blank_check {
            ($iter:expr, $kind:expr) => {
                for obj in $iter {
                    if obj.id.is_blank() {
                        problems.push(format!("- {} with blank id", $kind));
                    }
                }
            };
        }
        blank_check!(&self.teams, "team");
        blank_check!(&self.games, "game");

        macro_rules! duplicate_check {
            ($iter:expr, $kind:expr) => {
                let mut seen = BTreeSet::new();
                for obj in $iter {
                    if !seen.insert(&obj.id) {
                        problems.push(format!("- {} {} appears more than once", $kind, obj.id));
                    }
                }
            };
        }
        duplicate_check!(&self.teams, "team");
        duplicate_check!(&self.games, "game");

        for game in &self.games {
            if !game.scores_consistent() {
                problems.push(format!("- game {} scores disagree with its events", game.id));
            }
            if game.team1_id == game.team2_id {
                problems.push(format!("- game {} pits a team against itself", game.id));
            }
            for team in [&game.team1_id, &game.team2_id] {
                if self.team(team).is_none() {
                    problems.push(format!("- game {} references unknown team {}", game.id, team));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("\n"))
        }
    }
}

/// Writes the scorecard's game through to a store as it changes. Completion also settles both
/// teams' season records.
#[derive(Debug)]
pub struct Autosave<S> {
    database: Database,
    store: S,
}

impl<S: Store> Autosave<S> {
    pub fn new(database: Database, store: S) -> Autosave<S> {
        Autosave { database, store }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> (Database, S) {
        (self.database, self.store)
    }
}

impl<S: Store> GameObserver for Autosave<S> {
    fn game_updated(&mut self, game: &Game) {
        self.database.upsert_game(game.clone());
        self.database.save_games(&mut self.store);
    }

    fn game_completed(&mut self, game: &Game) {
        self.database.record_completed_game(game.clone());
        self.database.save(&mut self.store);
    }
}

#[cfg(test)]mod tests {
    use super::{Autosave, Database, DatabaseError, Summary};
    use crate::id::{GameId, TeamId};
    use crate::storage::{MemoryStore, Store, GAMES_KEY, TEAMS_KEY};
    use crate::{CapNumber, EventKind, Game, Half, Matchup, Scorecard, Team};
    use serde_json::{json, Value};

    fn cap(n: u8) -> CapNumber {
        CapNumber::new(n).unwrap()
    }

    fn team(school: &str, players: usize) -> Team {
        let names = (1..=players).map(|n| format!("{} {}", school, n));
        Team::register(school, ["Coach"], Vec::<String>::new(), names).unwrap()
    }

    fn two_teams() -> (Database, Team, Team) {
        let mut database = Database::new();
        let (a, b) = (team("Lakeside", 9), team("Bayview", 11));
        database.add_team(a.clone()).unwrap();
        database.add_team(b.clone()).unwrap();
        (database, a, b)
    }

    fn new_game(a: &Team, b: &Team) -> Game {
        Game::new(Matchup {
            team1: a.id.clone(),
            team2: b.id.clone(),
        })
    }

    // Team and game records as the browser scorecard stored them: millisecond-clock ids and
    // every slot written out.
    fn stored_team(id: &str, school: &str, slots: u8) -> Value {
        let players = (1..=slots)
            .map(|n| {
                json!({
                    "capNumber": n,
                    "name": if n <= 8 { format!("{} {}", school, n) } else { String::new() },
                    "goals": 0,
                    "kickOuts": 0,
                    "yellowCards": 0,
                    "redCards": 0,
                })
            })
            .collect::<Vec<_>>();
        json!({
            "id": id,
            "schoolName": school,
            "coaches": ["Coach"],
            "managers": [],
            "players": players,
            "stats": {
                "wins": 0,
                "losses": 0,
                "draws": 0,
                "goalsFor": 0,
                "goalsAgainst": 0,
                "goalDifference": 0,
            },
        })
    }

    fn stored_game(id: &str, team1: &str, team2: &str, half: u8, created_at: i64) -> Value {
        json!({
            "id": id,
            "team1Id": team1,
            "team2Id": team2,
            "team1Score": 1,
            "team2Score": 0,
            "events": [{
                "id": format!("{}", created_at + 1000),
                "playerId": "7",
                "teamId": team1,
                "type": "goal",
                "half": half,
                "timestamp": created_at + 1000,
            }],
            "completed": false,
            "createdAt": created_at,
        })
    }

    fn snapshot(teams: &[Value], games: &[Value]) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.set(TEAMS_KEY, &Value::from(teams.to_vec()).to_string()).unwrap();
        store.set(GAMES_KEY, &Value::from(games.to_vec()).to_string()).unwrap();
        store
    }

    fn stored_ids(store: &MemoryStore, key: &str) -> Vec<String> {
        let raw = store.get(key).unwrap().unwrap();
        serde_json::from_str::<Vec<Value>>(&raw)
            .unwrap()
            .iter()
            .map(|record| record["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn add_team_rejects_duplicates() {
        let (mut database, a, _) = two_teams();
        assert_eq!(
            database.add_team(a.clone()),
            Err(DatabaseError::DuplicateTeam(a.id.clone()))
        );
        assert_eq!(database.teams().len(), 2);
        assert_eq!(database.team(&a.id), Some(&a));
    }

    #[test]
    fn teams_with_players_skips_empty_rosters() {
        let (mut database, a, b) = two_teams();
        database.add_team(team("Hillcrest", 0)).unwrap();
        let eligible = database.teams_with_players().map(|t| &t.id).collect::<Vec<_>>();
        assert_eq!(eligible, [&a.id, &b.id]);
    }

    #[test]
    fn upsert_replaces_by_id() {
        let (mut database, a, b) = two_teams();
        let mut game = new_game(&a, &b);
        database.upsert_game(game.clone());
        game.record_event(cap(1), &a.id, EventKind::Goal, Half::First)
            .unwrap();
        database.upsert_game(game.clone());
        assert_eq!(database.games().len(), 1);
        assert_eq!(database.game(&game.id).unwrap().team1_score, 1);
    }

    #[test]
    fn completed_game_counts_once() {
        let (mut database, a, b) = two_teams();
        let mut game = new_game(&a, &b);
        game.record_event(cap(3), &b.id, EventKind::Goal, Half::First)
            .unwrap();
        game.complete();
        database.record_completed_game(game.clone());
        database.record_completed_game(game);

        let a = database.team(&a.id).unwrap();
        let b = database.team(&b.id).unwrap();
        assert_eq!((a.stats.wins, a.stats.losses, a.stats.draws), (0, 1, 0));
        assert_eq!((b.stats.wins, b.stats.losses, b.stats.draws), (1, 0, 0));
        assert_eq!(a.stats.goal_difference, -1);
        assert_eq!(b.stats.goals_for, 1);
        assert_eq!(
            database.summary(),
            Summary {
                teams: 2,
                players: 20,
                games_played: 1
            }
        );
    }

    #[test]
    fn recent_games_newest_first() {
        let (mut database, a, b) = two_teams();
        let stranger = team("Hillcrest", 9);
        for (created_at, team2) in [(300, &b), (100, &b), (500, &stranger), (400, &b), (200, &b)] {
            let mut game = new_game(&a, team2);
            game.created_at = created_at;
            database.games.push(game);
        }

        let shown = database
            .recent_games(3)
            .map(|(game, team1, team2)| {
                (game.created_at, team1.school_name.as_str(), team2.school_name.as_str())
            })
            .collect::<Vec<_>>();
        assert_eq!(shown, [(400, "Lakeside", "Bayview"), (300, "Lakeside", "Bayview")]);
        assert_eq!(database.recent_games(10).count(), 4);
        assert_eq!(database.recent_games(0).count(), 0);
    }

    #[test]
    fn load_recounts_and_tolerates_garbage() {
        let (mut database, a, b) = two_teams();
        let mut game = new_game(&a, &b);
        game.record_event(cap(2), &a.id, EventKind::Goal, Half::First)
            .unwrap();
        game.team1_score = 9;
        database.games.push(game.clone());

        let mut store = MemoryStore::new();
        database.save(&mut store);
        let loaded = Database::load(&store);
        assert_eq!(loaded.teams(), database.teams());
        assert_eq!(loaded.game(&game.id).unwrap().team1_score, 1);

        store.set(GAMES_KEY, "not json").unwrap();
        let loaded = Database::load(&store);
        assert_eq!(loaded.teams().len(), 2);
        assert!(loaded.games().is_empty());

        assert_eq!(Database::load(&MemoryStore::new()), Database::new());
    }

    #[test]
    fn loads_timestamp_id_snapshot() {
        let store = snapshot(
            &[
                stored_team("1712345678901", "Lakeside", 14),
                stored_team("1712345679123", "Bayview", 14),
            ],
            &[stored_game("1712345690000", "1712345678901", "1712345679123", 1, 1712345690000)],
        );

        let database = Database::load(&store);
        assert_eq!(database.teams().len(), 2);
        assert_eq!(database.games().len(), 1);
        assert_eq!(database.check_consistency(), Ok(()));
        assert_eq!(database.summary().players, 16);

        let lakeside = database.team(&TeamId::from("1712345678901")).unwrap().clone();
        let bayview = database.team(&TeamId::from("1712345679123")).unwrap().clone();
        let game = database.game(&GameId::from("1712345690000")).unwrap().clone();
        assert_eq!(game.events[0].id.as_str(), "1712345691000");
        assert_eq!(game.events[0].player, cap(7));
        assert_eq!(game.scores(), Matchup { team1: 1, team2: 0 });

        // Picking the stored game back up writes it through without disturbing the teams.
        let autosave = Autosave::new(database, store);
        let mut card = Scorecard::resume(game, &lakeside, &bayview, autosave).unwrap();
        card.record_event(cap(3), &bayview.id, EventKind::Goal).unwrap();
        let (_, autosave) = card.into_parts();
        let (_, store) = autosave.into_inner();

        assert_eq!(stored_ids(&store, TEAMS_KEY), ["1712345678901", "1712345679123"]);
        assert_eq!(stored_ids(&store, GAMES_KEY), ["1712345690000"]);
        let reloaded = Database::load(&store);
        let game = reloaded.game(&GameId::from("1712345690000")).unwrap();
        assert_eq!(game.events.len(), 2);
        assert_eq!(game.events[0].id.as_str(), "1712345691000");
        assert_eq!(game.scores(), Matchup { team1: 1, team2: 1 });
    }

    #[test]
    fn bad_records_are_dropped_and_good_ones_survive_autosave() {
        let store = snapshot(
            &[
                stored_team("1712345678901", "Lakeside", 14),
                stored_team("team-bayview", "Bayview", 14),
                stored_team("1712345679999", "Hillcrest", 13),
            ],
            &[
                stored_game("1712345690000", "1712345678901", "team-bayview", 1, 1712345690000),
                stored_game("1712345695000", "1712345678901", "team-bayview", 3, 1712345695000),
            ],
        );

        let database = Database::load(&store);
        let schools = database
            .teams()
            .iter()
            .map(|t| t.school_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(schools, ["Lakeside", "Bayview"]);
        assert_eq!(database.games().len(), 1);
        assert_eq!(database.games()[0].id.as_str(), "1712345690000");

        let lakeside = database.teams()[0].clone();
        let bayview = database.teams()[1].clone();
        let game = database.games()[0].clone();
        let autosave = Autosave::new(database, store);
        let mut card = Scorecard::resume(game, &lakeside, &bayview, autosave).unwrap();
        card.complete_game();
        let (_, autosave) = card.into_parts();
        let (database, store) = autosave.into_inner();

        // The store now holds exactly what loaded; the undecodable records are gone.
        assert_eq!(stored_ids(&store, TEAMS_KEY), ["1712345678901", "team-bayview"]);
        assert_eq!(stored_ids(&store, GAMES_KEY), ["1712345690000"]);
        let reloaded = Database::load(&store);
        assert_eq!(reloaded, database);
        assert_eq!(reloaded.team(&lakeside.id).unwrap().record(), "1W-0L-0D");
        assert_eq!(reloaded.team(&bayview.id).unwrap().record(), "0W-1L-0D");
    }

    #[test]
    fn consistency_problems_are_listed() {
        let (mut database, a, _) = two_teams();
        assert_eq!(database.check_consistency(), Ok(()));

        database.teams.push(a.clone());
        let mut game = new_game(&a, &a);
        game.team2_score = 2;
        database.games.push(game);

        let problems = database.check_consistency().unwrap_err();
        assert_eq!(problems.lines().count(), 3);
        assert!(problems.contains("appears more than once"));
        assert!(problems.contains("scores disagree"));
        assert!(problems.contains("against itself"));

        let mut database = Database::new();
        database.teams.push(team("Lakeside", 3));
        database.teams[0].id = TeamId::from(" ");
        assert!(database.check_consistency().unwrap_err().contains("blank id"));
    }

    #[test]
    fn autosave_writes_through() {
        let (database, a, b) = two_teams();
        let autosave = Autosave::new(database, MemoryStore::new());
        let mut card = Scorecard::with_observer(&a, &b, autosave).unwrap();

        card.record_event(cap(5), &a.id, EventKind::Goal).unwrap();
        let stored = Database::load(card.observer().store());
        assert_eq!(stored.games().len(), 1);
        assert_eq!(stored.games()[0].team1_score, 1);
        assert!(card.observer().store().get(TEAMS_KEY).unwrap().is_none());

        card.complete_game();
        let (_, autosave) = card.into_parts();
        let (database, store) = autosave.into_inner();
        let stored = Database::load(&store);
        assert_eq!(stored, database);
        assert!(stored.games()[0].completed);
        assert_eq!(stored.team(&a.id).unwrap().record(), "1W-0L-0D");
        assert_eq!(stored.team(&b.id).unwrap().record(), "0W-1L-0D");
    }
}
