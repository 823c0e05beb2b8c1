//! # HabitQuest Core Library
//!
//! The progression engine behind HabitQuest, a gamified habit tracker.
//! Habits earn points scaled by a per-habit multiplier that grows with
//! completions and shrinks with failures. Points roll over into levels,
//! milestones unlock achievements, and achievements hand out items whose
//! effects bend the scoring rules for a while.
//!
//! ## Architecture
//!
//! - **Engine**: a pure reducer ([`engine::reduce`]) wrapped by a shell
//!   ([`Engine`]) that owns the clock, the store and the notification queue
//! - **Catalogs**: static item and achievement tables ([`items`],
//!   [`achievements`])
//! - **Storage**: JSON snapshot store and TOML configuration
//!
//! ## Key Components
//!
//! - [`Engine`]: the single entry point for mutating operations
//! - [`EngineState`]: the persisted snapshot
//! - [`Config`]: rules, notification and storage settings
//! - [`StateStore`]: trait for snapshot persistence

pub mod achievements;
pub mod clock;
pub mod dates;
pub mod engine;
pub mod error;
pub mod events;
pub mod habit;
pub mod history;
pub mod items;
pub mod notifications;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Action, CompletionMode, Engine, EngineState, LevelInfo, Rules};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::EngineEvent;
pub use habit::{Habit, HabitId, HabitPatch, HabitSpec, Periodicity};
pub use history::{History, HistoryStatus};
pub use notifications::{event_message, Notification, NotificationKind, NotificationQueue};
pub use storage::{Config, JsonFileStore, MemoryStore, StateStore};
