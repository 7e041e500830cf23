//! Time-decayed bonus scoring. Pure: no I/O, no clock, no store access.

use serde::Serialize;

pub const DEFAULT_MAX_TIME_MS: i64 = 30_000;
pub const DEFAULT_TIME_BONUS_MAX: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: i64,
    pub time_bonus: i64,
}

pub fn calculate_score(base_points: i64, response_time_ms: i64) -> ScoreResult {
    calculate_score_with(
        base_points,
        response_time_ms,
        DEFAULT_MAX_TIME_MS,
        DEFAULT_TIME_BONUS_MAX,
    )
}

/// `time_bonus = round(time_bonus_max * (1 - clamped_time / max_time_ms))`.
/// Response times are clamped to `[0, max_time_ms]`, so the bonus is
/// `time_bonus_max` at time zero and 0 at or beyond the limit.
pub fn calculate_score_with(
    base_points: i64,
    response_time_ms: i64,
    max_time_ms: i64,
    time_bonus_max: i64,
) -> ScoreResult {
    let clamped = response_time_ms.clamp(0, max_time_ms);
    let time_factor = 1.0 - clamped as f64 / max_time_ms as f64;
    let time_bonus = (time_bonus_max as f64 * time_factor).round() as i64;

    ScoreResult {
        score: base_points + time_bonus,
        time_bonus,
    }
}
