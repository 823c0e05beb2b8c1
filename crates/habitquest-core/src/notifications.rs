//! Self-expiring notification queue for the presentation layer.
//!
//! Entries expire `ttl` after they were pushed. Expiry is evaluated lazily
//! against the caller's clock on every push and read, and dismissal by id
//! is idempotent, so an expiry and a dismissal of the same entry never
//! conflict. The queue is not part of the persisted engine state.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::events::EngineEvent;
use crate::items::EffectCategory;

pub const DEFAULT_TTL_MS: i64 = 3_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Complete,
    Fail,
    Level,
    Achievement,
    Item,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NotificationQueue {
    entries: Vec<Notification>,
    next_id: u64,
    ttl: Duration,
    enabled: bool,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_TTL_MS))
    }
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            ttl,
            enabled: true,
        }
    }

    /// A disabled queue accepts pushes and drops them.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>, now: NaiveDateTime) -> Option<u64> {
        self.expire(now);
        if !self.enabled {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Notification {
            id,
            kind,
            message: message.into(),
            created_at: now,
        });
        Some(id)
    }

    /// Notifications still visible at `now`, oldest first.
    pub fn visible(&mut self, now: NaiveDateTime) -> &[Notification] {
        self.expire(now);
        &self.entries
    }

    /// Remove by id. No-op when the id is unknown or already expired.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    pub fn expire(&mut self, now: NaiveDateTime) {
        let ttl = self.ttl;
        self.entries.retain(|n| now < n.created_at + ttl);
    }

    /// Translate engine events into user-facing messages.
    pub fn push_events(&mut self, events: &[EngineEvent], now: NaiveDateTime) {
        for event in events {
            if let Some((kind, message)) = describe(event) {
                self.push(kind, message, now);
            }
        }
    }
}

/// The message a notification for `event` would carry, if any.
pub fn event_message(event: &EngineEvent) -> Option<String> {
    describe(event).map(|(_, message)| message)
}

fn describe(event: &EngineEvent) -> Option<(NotificationKind, String)> {
    match event {
        EngineEvent::HabitCompleted {
            earned,
            multiplier,
            status,
            retroactive,
            ..
        } => {
            let suffix = match (retroactive, status.as_str()) {
                (true, _) => " (yesterday)".to_string(),
                (false, "partial") => " (partial)".to_string(),
                (false, "over") => " (overtime)".to_string(),
                _ => String::new(),
            };
            Some((
                NotificationKind::Complete,
                format!("+{earned} pts — x{multiplier:.1}{suffix}"),
            ))
        }
        EngineEvent::HabitFailed {
            multiplier, shield, ..
        } => {
            let message = match shield {
                Some(_) => format!("Shield absorbed the penalty: x{multiplier:.1}"),
                None => format!("Penalty: x{multiplier:.1}"),
            };
            Some((NotificationKind::Fail, message))
        }
        EngineEvent::LevelUp { level, title, .. } => Some((
            NotificationKind::Level,
            format!("Level {level} reached: {title}!"),
        )),
        EngineEvent::AchievementUnlocked { name, .. } => {
            Some((NotificationKind::Achievement, format!("🏆 Achievement: {name}")))
        }
        EngineEvent::ItemUsed {
            name,
            icon,
            category,
            ..
        } => {
            let verb = match category {
                EffectCategory::Timed => "activated",
                EffectCategory::Passive => "equipped",
                EffectCategory::Instant => "used",
            };
            Some((NotificationKind::Item, format!("{icon} {name} {verb}!")))
        }
        EngineEvent::HabitAdded { .. }
        | EngineEvent::HabitRemoved { .. }
        | EngineEvent::HabitUpdated { .. }
        | EngineEvent::ItemGranted { .. } => None,
    }
}
