//! Inventory commands for CLI.

use clap::Subcommand;
use habitquest_core::items::{find_item, ITEMS};
use serde::Serialize;

use super::{open_engine, report, resolve_habit, CliResult};

#[derive(Subcommand)]
pub enum ItemAction {
    /// List the item catalog with quantities held
    List {
        /// Only items currently in the inventory
        #[arg(long)]
        owned: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Use an item from the inventory
    Use {
        /// Item id (e.g. "lucky_coin")
        item_id: String,
        /// Target habit for instant items (id, id prefix or name)
        #[arg(long)]
        target: Option<String>,
    },
    /// Add one of an item to the inventory
    Grant {
        /// Item id
        item_id: String,
    },
    /// Show effects active right now
    Effects {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct ItemRow {
    #[serde(flatten)]
    item: &'static habitquest_core::items::Item,
    qty: u32,
}

pub fn run(action: ItemAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        ItemAction::List { owned, json } => {
            let rows: Vec<ItemRow> = ITEMS
                .iter()
                .map(|item| ItemRow {
                    item,
                    qty: engine.state().item_qty(item.id),
                })
                .filter(|row| !owned || row.qty > 0)
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in rows {
                    println!(
                        "{} {:<20} x{:<3} {}",
                        row.item.icon, row.item.id, row.qty, row.item.description
                    );
                }
            }
        }
        ItemAction::Use { item_id, target } => {
            let item = find_item(&item_id).ok_or_else(|| format!("unknown item: {item_id}"))?;
            if engine.state().item_qty(item.id) == 0 {
                return Err(format!("no {item_id} in inventory").into());
            }
            let target = match target {
                Some(query) => Some(resolve_habit(&engine, &query)?),
                None if item.needs_target() => {
                    return Err(format!("{item_id} needs --target <habit>").into());
                }
                None => None,
            };
            let events = engine.use_item(item.id, target.as_deref())?;
            report(&mut engine, &events);
        }
        ItemAction::Grant { item_id } => {
            let item = find_item(&item_id).ok_or_else(|| format!("unknown item: {item_id}"))?;
            let events = engine.grant_item(item.id)?;
            if events.is_empty() {
                println!("{} is already at its stack limit ({})", item.name, item.max_stack);
            } else {
                println!("{} {}: {}", item.icon, item.name, engine.state().item_qty(item.id));
            }
        }
        ItemAction::Effects { json } => {
            let effects = engine.active_effects();
            if json {
                println!("{}", serde_json::to_string_pretty(&effects)?);
            } else if effects.is_empty() {
                println!("No active effects.");
            } else {
                for effect in effects {
                    match effect.expires_at {
                        Some(expires) => println!("{} until {}", effect.item_name, expires.format("%Y-%m-%d %H:%M")),
                        None => println!("{} until used", effect.item_name),
                    }
                }
            }
        }
    }
    Ok(())
}
