//! Habit definitions and input validation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Opaque habit identifier (UUID v4 string when created by the engine shell).
pub type HabitId = String;

/// Emoji assigned when the caller does not pick one.
pub const DEFAULT_EMOJI: &str = "🎯";

/// How often a habit is expected to be done.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Periodicity {
    #[default]
    Daily,
    /// Due on Mondays.
    Weekly,
    /// Due on the first day of the month.
    Monthly,
    /// Due on any listed ISO weekday (1 = Monday .. 7 = Sunday) or every
    /// `interval_days` days counted from the creation date.
    Custom {
        #[serde(default)]
        days_of_week: Vec<u8>,
        #[serde(default)]
        interval_days: Option<u32>,
    },
}

impl Periodicity {
    pub fn label(&self) -> &'static str {
        match self {
            Periodicity::Daily => "daily",
            Periodicity::Weekly => "weekly",
            Periodicity::Monthly => "monthly",
            Periodicity::Custom { .. } => "custom",
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Periodicity::Custom {
            days_of_week,
            interval_days,
        } = self
        {
            if let Some(day) = days_of_week.iter().find(|d| !(1..=7).contains(*d)) {
                return Err(ValidationError::InvalidValue {
                    field: "days_of_week".into(),
                    message: format!("{day} is not a weekday number (1-7)"),
                });
            }
            if *interval_days == Some(0) {
                return Err(ValidationError::InvalidValue {
                    field: "interval_days".into(),
                    message: "interval must be at least 1 day".into(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Periodicity::Custom {
                days_of_week,
                interval_days,
            } => {
                let days: Vec<String> = days_of_week.iter().map(|d| d.to_string()).collect();
                write!(f, "custom:{}", days.join(","))?;
                if let Some(n) = interval_days {
                    write!(f, "/{n}")?;
                }
                Ok(())
            }
            other => f.write_str(other.label()),
        }
    }
}

/// Parses `daily`, `weekly`, `monthly` or `custom:<days>[/<interval>]`,
/// e.g. `custom:1,3,5`, `custom:/2`, `custom:6,7/3`.
impl FromStr for Periodicity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: String| ValidationError::InvalidValue {
            field: "periodicity".into(),
            message,
        };
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "daily" => return Ok(Periodicity::Daily),
            "weekly" => return Ok(Periodicity::Weekly),
            "monthly" => return Ok(Periodicity::Monthly),
            _ => {}
        }
        let rest = s
            .strip_prefix("custom:")
            .ok_or_else(|| invalid(format!("unknown periodicity '{s}'")))?;
        let (days_part, interval_part) = match rest.split_once('/') {
            Some((d, i)) => (d, Some(i)),
            None => (rest, None),
        };
        let days_of_week = days_part
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| d.parse::<u8>().map_err(|_| invalid(format!("bad weekday '{d}'"))))
            .collect::<Result<Vec<_>, _>>()?;
        let interval_days = interval_part
            .map(|i| {
                i.trim()
                    .parse::<u32>()
                    .map_err(|_| invalid(format!("bad interval '{i}'")))
            })
            .transpose()?;
        let periodicity = Periodicity::Custom {
            days_of_week,
            interval_days,
        };
        periodicity.validate()?;
        Ok(periodicity)
    }
}

/// A tracked habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    /// Configured duration; also the base point unit for a standard completion.
    pub minutes: u32,
    #[serde(default)]
    pub periodicity: Periodicity,
    #[serde(default = "default_emoji")]
    pub emoji: String,
    pub multiplier: f64,
    /// Permanent baseline, raised only by `perm_base_mult` items.
    pub base_multiplier: f64,
    /// Consecutive successful resolutions.
    pub streak: u32,
    pub created_at: NaiveDateTime,
}

fn default_emoji() -> String {
    DEFAULT_EMOJI.to_string()
}

/// Input for creating a habit.
///
/// `minutes` is signed so that out-of-range input reaches validation
/// instead of failing at the parsing layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HabitSpec {
    pub name: String,
    pub minutes: i64,
    #[serde(default)]
    pub periodicity: Periodicity,
    #[serde(default)]
    pub emoji: Option<String>,
}

impl HabitSpec {
    pub fn new(name: impl Into<String>, minutes: i64) -> Self {
        Self {
            name: name.into(),
            minutes,
            ..Default::default()
        }
    }

    pub fn with_periodicity(mut self, periodicity: Periodicity) -> Self {
        self.periodicity = periodicity;
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    /// Validate and build the habit with a fresh 1.0 multiplier.
    pub fn into_habit(self, id: HabitId, created_at: NaiveDateTime) -> Result<Habit, ValidationError> {
        let name = validate_name(&self.name)?;
        let minutes = validate_minutes("minutes", self.minutes)?;
        self.periodicity.validate()?;
        Ok(Habit {
            id,
            name,
            minutes,
            periodicity: self.periodicity,
            emoji: self
                .emoji
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(default_emoji),
            multiplier: crate::engine::BASE_MULTIPLIER,
            base_multiplier: crate::engine::BASE_MULTIPLIER,
            streak: 0,
            created_at,
        })
    }
}

/// Partial update for an existing habit. Progression fields are not editable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub minutes: Option<i64>,
    pub periodicity: Option<Periodicity>,
    pub emoji: Option<String>,
}

impl HabitPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.minutes.is_none() && self.periodicity.is_none() && self.emoji.is_none()
    }

    /// Merge into `habit`, validating every supplied field first so a bad
    /// field leaves the habit untouched.
    pub fn apply_to(&self, habit: &mut Habit) -> Result<(), ValidationError> {
        let name = self.name.as_deref().map(validate_name).transpose()?;
        let minutes = self
            .minutes
            .map(|m| validate_minutes("minutes", m))
            .transpose()?;
        if let Some(p) = &self.periodicity {
            p.validate()?;
        }

        if let Some(name) = name {
            habit.name = name;
        }
        if let Some(minutes) = minutes {
            habit.minutes = minutes;
        }
        if let Some(p) = &self.periodicity {
            habit.periodicity = p.clone();
        }
        if let Some(emoji) = self.emoji.as_ref().filter(|e| !e.trim().is_empty()) {
            habit.emoji = emoji.clone();
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Accept whole minutes in `1..=u32::MAX`.
pub(crate) fn validate_minutes(field: &str, value: i64) -> Result<u32, ValidationError> {
    match u32::try_from(value) {
        Ok(m) if m >= 1 => Ok(m),
        _ => Err(ValidationError::InvalidMinutes {
            field: field.to_string(),
            value,
        }),
    }
}
