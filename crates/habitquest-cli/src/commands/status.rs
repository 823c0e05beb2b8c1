use habitquest_core::LevelInfo;
use serde::Serialize;

use super::{open_engine, CliResult};

#[derive(Serialize)]
struct Status {
    #[serde(flatten)]
    level: LevelInfo,
    lifetime_points: u64,
    global_streak: u32,
    habits: usize,
    achievements_unlocked: usize,
    active_effects: usize,
}

pub fn run(json: bool) -> CliResult {
    let engine = open_engine()?;
    let state = engine.state();
    let status = Status {
        level: engine.level_info(),
        lifetime_points: state.lifetime_points,
        global_streak: state.global_streak,
        habits: state.habits.len(),
        achievements_unlocked: state.unlocked_achievements.len(),
        active_effects: engine.active_effects().len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let level = &status.level;
    println!("Level {} - {}", level.level, level.title);
    println!(
        "Points:  {}/{} ({}%, {} to go)",
        level.points, level.threshold, level.percent, level.remaining
    );
    println!("Lifetime points: {}", status.lifetime_points);
    println!("Global streak:   {} days", status.global_streak);
    println!("Habits: {}  Achievements: {}  Active effects: {}", status.habits, status.achievements_unlocked, status.active_effects);
    Ok(())
}
