//! Habit management and check-in commands for CLI.

use clap::Subcommand;
use habitquest_core::dates::format_key;
use habitquest_core::{CompletionMode, HabitPatch, HabitSpec, Periodicity};
use serde::Serialize;

use super::{open_engine, report, resolve_habit, CliResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Add a new habit
    Add {
        /// Habit name
        name: String,
        /// Minutes per session
        #[arg(long, default_value = "30", allow_negative_numbers = true)]
        minutes: i64,
        /// daily, weekly, monthly or custom:<weekdays>[/<interval>]
        #[arg(long, default_value = "daily")]
        periodicity: Periodicity,
        /// Emoji shown next to the name
        #[arg(long)]
        emoji: Option<String>,
    },
    /// List habits
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a habit's name, minutes, periodicity or emoji
    Edit {
        /// Habit id, id prefix or name
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        minutes: Option<i64>,
        #[arg(long)]
        periodicity: Option<Periodicity>,
        #[arg(long)]
        emoji: Option<String>,
    },
    /// Remove a habit (its history is kept)
    Remove {
        /// Habit id, id prefix or name
        id: String,
    },
    /// Mark today done
    Complete {
        /// Habit id, id prefix or name
        id: String,
    },
    /// Mark today partly done
    Partial {
        /// Habit id, id prefix or name
        id: String,
        /// Minutes actually done
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Mark today done with extra time
    Over {
        /// Habit id, id prefix or name
        id: String,
        /// Minutes actually done
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Mark today failed
    Fail {
        /// Habit id, id prefix or name
        id: String,
    },
    /// Correct yesterday to done
    Retro {
        /// Habit id, id prefix or name
        id: String,
        /// standard, partial or over
        #[arg(long, default_value = "standard")]
        mode: String,
        /// Minutes done (partial and over)
        #[arg(long, allow_negative_numbers = true)]
        minutes: Option<i64>,
    },
    /// Show recent check-ins
    History {
        /// Habit id, id prefix or name
        id: String,
        /// Number of days, ending today
        #[arg(long, default_value = "7")]
        days: u64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct HistoryRow {
    date: String,
    status: Option<&'static str>,
}

fn completion_mode(mode: &str, minutes: Option<i64>) -> Result<CompletionMode, Box<dyn std::error::Error>> {
    let need_minutes = || minutes.ok_or_else(|| format!("--minutes is required for {mode}"));
    match mode {
        "standard" => Ok(CompletionMode::Standard),
        "partial" => Ok(CompletionMode::Partial {
            minutes: need_minutes()?,
        }),
        "over" | "overtime" => Ok(CompletionMode::Overtime {
            minutes: need_minutes()?,
        }),
        other => Err(format!("unknown mode: {other} (expected standard, partial or over)").into()),
    }
}

pub fn run(action: HabitAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        HabitAction::Add {
            name,
            minutes,
            periodicity,
            emoji,
        } => {
            let mut spec = HabitSpec::new(name, minutes).with_periodicity(periodicity);
            spec.emoji = emoji;
            let id = engine.add_habit(spec)?;
            println!("Habit created: {id}");
            for notification in engine.notifications() {
                println!("{}", notification.message);
            }
        }
        HabitAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(engine.habits())?);
            } else if engine.habits().is_empty() {
                println!("No habits yet.");
            } else {
                for habit in engine.habits() {
                    println!(
                        "{} {} [{}] {} min, x{:.1}, streak {} ({})",
                        habit.emoji, habit.name, habit.periodicity, habit.minutes, habit.multiplier, habit.streak, habit.id
                    );
                }
            }
        }
        HabitAction::Edit {
            id,
            name,
            minutes,
            periodicity,
            emoji,
        } => {
            let id = resolve_habit(&engine, &id)?;
            let patch = HabitPatch {
                name,
                minutes,
                periodicity,
                emoji,
            };
            let events = engine.update_habit(&id, patch)?;
            if events.is_empty() {
                println!("nothing changed");
            } else {
                println!("Habit updated: {id}");
            }
        }
        HabitAction::Remove { id } => {
            let id = resolve_habit(&engine, &id)?;
            engine.remove_habit(&id)?;
            println!("Habit removed: {id}");
        }
        HabitAction::Complete { id } => {
            let id = resolve_habit(&engine, &id)?;
            let events = engine.complete_habit(&id)?;
            report(&mut engine, &events);
        }
        HabitAction::Partial { id, minutes } => {
            let id = resolve_habit(&engine, &id)?;
            let events = engine.complete_habit_partial(&id, minutes)?;
            report(&mut engine, &events);
        }
        HabitAction::Over { id, minutes } => {
            let id = resolve_habit(&engine, &id)?;
            let events = engine.complete_habit_overtime(&id, minutes)?;
            report(&mut engine, &events);
        }
        HabitAction::Fail { id } => {
            let id = resolve_habit(&engine, &id)?;
            let events = engine.fail_habit(&id)?;
            report(&mut engine, &events);
        }
        HabitAction::Retro { id, mode, minutes } => {
            let id = resolve_habit(&engine, &id)?;
            let mode = completion_mode(&mode, minutes)?;
            let events = engine.retro_complete_yesterday(&id, mode)?;
            report(&mut engine, &events);
        }
        HabitAction::History { id, days, json } => {
            let id = resolve_habit(&engine, &id)?;
            let today = engine.today();
            let rows: Vec<HistoryRow> = engine
                .state()
                .history
                .recent_for(&id, today, days)
                .into_iter()
                .map(|(date, status)| HistoryRow {
                    date: format_key(date),
                    status: status.map(|s| s.as_str()),
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in rows {
                    println!("{}  {}", row.date, row.status.unwrap_or("-"));
                }
            }
        }
    }
    Ok(())
}
