use anyhow::{bail, Context};
use poloscore::id::TeamId;
use poloscore::storage::FileStore;
use poloscore::{Autosave, CapNumber, Database, EventKind, Scorecard, Side, Team};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(data_dir) = args.next() else {
        bail!("missing arguments\nusage: cargo run --example live_match -- DATA_DIR");
    };

    let mut store = FileStore::new(data_dir);
    let mut database = Database::load(&store);
    if database.teams_with_players().count() < 2 {
        for (school, coach) in [("Lakeside High", "Coach Kim"), ("Bayview Prep", "Coach Ortiz")] {
            let names = (1..=11).map(|n| format!("{} #{}", school, n));
            let team = Team::register(school, [coach], Vec::<String>::new(), names)?;
            database.add_team(team)?;
        }
        database.save(&mut store);
    }

    let (home, away) = {
        let mut eligible = database.teams_with_players();
        let pair = (eligible.next().cloned(), eligible.next().cloned());
        match pair {
            (Some(home), Some(away)) => (home, away),
            _ => bail!("need at least two teams with players"),
        }
    };

    let mut card = Scorecard::with_observer(&home, &away, Autosave::new(database, store))?;
    let cap = |n: u8| CapNumber::new(n).context("cap number");
    let teams = card.teams().map(TeamId::clone);

    card.record_event(cap(7)?, &teams.team1, EventKind::Goal)?;
    card.record_event(cap(9)?, &teams.team2, EventKind::Goal)?;
    card.record_event(cap(4)?, &teams.team2, EventKind::KickOut)?;
    card.switch_half();
    card.record_event(cap(7)?, &teams.team1, EventKind::Goal)?;
    card.record_event(cap(2)?, &teams.team2, EventKind::YellowCard)?;
    card.record_event(cap(7)?, &teams.team1, EventKind::Goal)?;
    // scorer's table spotted an offside
    card.undo_last_event(cap(7)?, &teams.team1, EventKind::Goal)?;

    for line in card.event_log() {
        println!("{}", line);
    }

    card.complete_game();
    let game = card.game();
    println!(
        "\nFinal: {} {} - {} {}",
        card.school_name(Side::Team1),
        game.team1_score,
        game.team2_score,
        card.school_name(Side::Team2)
    );

    for side in Side::BOTH {
        println!("\n{}", card.school_name(side));
        for player in card.players(side).iter().filter(|p| p.is_registered()) {
            let counts = EventKind::ALL
                .iter()
                .map(|kind| format!("{} {}", kind, player.count(*kind)))
                .collect::<Vec<_>>();
            println!("  #{:<2} {:<20} {}", player.cap_number, player.name, counts.join(", "));
        }
    }

    let summary = card.observer().database().summary();
    println!(
        "\n{} teams, {} players, {} games played",
        summary.teams, summary.players, summary.games_played
    );
    Ok(())
}
