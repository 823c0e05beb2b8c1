//! Level thresholds and titles.

use serde::Serialize;

/// Points needed while at each level to reach the next one.
pub const LEVEL_THRESHOLDS: [u64; 8] = [627, 2268, 4872, 9072, 15552, 25194, 39366, 59049];

pub const LEVEL_TITLES: [&str; 8] = [
    "Apprentice",
    "Adventurer",
    "Warrior",
    "Hero",
    "Champion",
    "Legend",
    "Master",
    "Immortal",
];

/// Threshold at `level`. Past the table the last entry scales linearly.
pub fn threshold(level: u32) -> u64 {
    let idx = level as usize;
    match LEVEL_THRESHOLDS.get(idx) {
        Some(t) => *t,
        None => {
            let last = LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1];
            let factor = (idx - LEVEL_THRESHOLDS.len() + 2) as u64;
            last.saturating_mul(factor)
        }
    }
}

pub fn title(level: u32) -> &'static str {
    LEVEL_TITLES
        .get(level as usize)
        .copied()
        .unwrap_or(LEVEL_TITLES[LEVEL_TITLES.len() - 1])
}

/// Add `earned` to the in-level counter, rolling over as many levels as
/// the total covers. Returns `(level, points, levels_gained)`.
pub fn apply_points(level: u32, points: u64, earned: u64) -> (u32, u64, u32) {
    let mut level = level;
    let mut points = points.saturating_add(earned);
    let mut gained = 0;
    loop {
        let t = threshold(level);
        if t == 0 || points < t {
            break;
        }
        points -= t;
        level += 1;
        gained += 1;
    }
    (level, points, gained)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelInfo {
    pub level: u32,
    pub title: &'static str,
    pub points: u64,
    pub threshold: u64,
    /// 0..=100
    pub percent: u8,
    pub remaining: u64,
}

pub fn level_info(level: u32, points: u64) -> LevelInfo {
    let threshold = threshold(level);
    let percent = if threshold == 0 {
        100
    } else {
        ((points as f64 / threshold as f64) * 100.0).round().min(100.0) as u8
    };
    LevelInfo {
        level,
        title: title(level),
        points,
        threshold,
        percent,
        remaining: threshold.saturating_sub(points),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_extends_past_table() {
        assert_eq!(threshold(0), 627);
        assert_eq!(threshold(7), 59049);
        assert_eq!(threshold(8), 59049 * 2);
        assert_eq!(threshold(9), 59049 * 3);
    }

    #[test]
    fn rollover_carries_remainder() {
        assert_eq!(apply_points(0, 600, 40), (1, 13, 1));
        assert_eq!(apply_points(0, 600, 20), (0, 620, 0));
        assert_eq!(apply_points(0, 0, 627), (1, 0, 1));
    }

    #[test]
    fn rollover_can_cross_several_levels() {
        assert_eq!(apply_points(0, 0, 627 + 2268 + 5), (2, 5, 2));
    }

    #[test]
    fn level_info_reports_progress() {
        let info = level_info(0, 300);
        assert_eq!(info.title, "Apprentice");
        assert_eq!(info.threshold, 627);
        assert_eq!(info.percent, 48);
        assert_eq!(info.remaining, 327);
        assert_eq!(title(42), "Immortal");
    }
}
