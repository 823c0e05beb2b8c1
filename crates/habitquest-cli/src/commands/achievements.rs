use habitquest_core::achievements::ACHIEVEMENTS;
use serde::Serialize;

use super::{open_engine, CliResult};

#[derive(Serialize)]
struct AchievementRow {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    reward: Option<&'static str>,
    unlocked: bool,
}

pub fn run(json: bool) -> CliResult {
    let engine = open_engine()?;
    let rows: Vec<AchievementRow> = ACHIEVEMENTS
        .iter()
        .map(|a| AchievementRow {
            id: a.id,
            name: a.name,
            description: a.description,
            icon: a.icon,
            reward: a.reward,
            unlocked: engine.state().is_unlocked(a.id),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let unlocked = rows.iter().filter(|r| r.unlocked).count();
    println!("{unlocked}/{} unlocked", rows.len());
    for row in &rows {
        let mark = if row.unlocked { row.icon } else { "🔒" };
        let reward = row.reward.map(|r| format!(" (reward: {r})")).unwrap_or_default();
        println!("{mark} {} - {}{reward}", row.name, row.description);
    }
    Ok(())
}
