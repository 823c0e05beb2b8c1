pub mod achievements;
pub mod config;
pub mod habit;
pub mod item;
pub mod status;

use habitquest_core::{event_message, Config, Engine, EngineEvent, HabitId};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Engine over the on-disk state, configured from `config.toml`.
pub fn open_engine() -> Result<Engine, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing::debug!(rules = ?config.rules, "config loaded");
    Ok(Engine::from_config(&config)?)
}

/// Accept a full id, a unique id prefix, or a habit name (case-insensitive).
pub fn resolve_habit(engine: &Engine, query: &str) -> Result<HabitId, Box<dyn std::error::Error>> {
    if let Some(habit) = engine.habit(query) {
        return Ok(habit.id.clone());
    }
    let matches: Vec<&HabitId> = engine
        .habits()
        .iter()
        .filter(|h| h.id.starts_with(query) || h.name.eq_ignore_ascii_case(query))
        .map(|h| &h.id)
        .collect();
    match matches.as_slice() {
        [id] => Ok((*id).clone()),
        [] => Err(format!("habit not found: {query}").into()),
        _ => Err(format!("'{query}' matches {} habits; use a longer id", matches.len()).into()),
    }
}

/// Print the notifications raised by the last action, or a summary of its
/// events when notifications are turned off.
pub fn report(engine: &mut Engine, events: &[EngineEvent]) {
    if events.is_empty() {
        println!("nothing changed");
        return;
    }
    if !engine.notifications_enabled() {
        for message in events.iter().filter_map(event_message) {
            println!("{message}");
        }
        return;
    }
    for notification in engine.notifications() {
        println!("{}", notification.message);
    }
}
