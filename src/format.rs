use crate::solve::{Penalty, Solve};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseTimeError {
    #[error("empty time")]
    Empty,
    #[error("invalid minutes '{0}'")]
    Minutes(String),
    #[error("invalid seconds '{0}'")]
    Seconds(String),
    #[error("time '{0}' is out of range")]
    OutOfRange(String),
}

/// Hundredths display: `S.cc` or `M:SS.cc`, truncated, never rounded up.
pub fn format_time(milliseconds: f64) -> String {
    let ms = milliseconds.max(0.0).floor() as u64;
    let total_secs = ms / 1000;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    let hundredths = (ms % 1000) / 10;

    if minutes > 0 {
        format!("{minutes}:{seconds:02}.{hundredths:02}")
    } else {
        format!("{seconds}.{hundredths:02}")
    }
}

/// Millisecond display: `S.mmm` or `M:SS.mmm`.
pub fn format_time_detailed(milliseconds: u64) -> String {
    let total_secs = milliseconds / 1000;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    let ms = milliseconds % 1000;

    if minutes > 0 {
        format!("{minutes}:{seconds:02}.{ms:03}")
    } else {
        format!("{seconds}.{ms:03}")
    }
}

/// "-" for a statistic that is unavailable.
pub fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), format_time)
}

pub fn format_solve(solve: &Solve) -> String {
    match (solve.effective_time(), solve.penalty) {
        (Some(t), Some(Penalty::PlusTwo)) => format!("{}+", format_time(t)),
        (Some(t), _) => format_time(t),
        (None, _) => "DNF".to_string(),
    }
}

/// Parses "1:23.45" or "23.45" into milliseconds.
pub fn parse_time(input: &str) -> Result<u64, ParseTimeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseTimeError::Empty);
    }

    let (minutes, seconds) = match input.split_once(':') {
        Some((m, s)) => {
            let minutes = m
                .parse::<u64>()
                .map_err(|_| ParseTimeError::Minutes(m.to_string()))?;
            (minutes, s)
        }
        None => (0, input),
    };

    let seconds = seconds
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
        .ok_or_else(|| ParseTimeError::Seconds(seconds.to_string()))?;

    let seconds_ms = (seconds * 1000.0).round();
    if seconds_ms >= u64::MAX as f64 {
        return Err(ParseTimeError::OutOfRange(input.to_string()));
    }

    minutes
        .checked_mul(60_000)
        .and_then(|ms| ms.checked_add(seconds_ms as u64))
        .ok_or_else(|| ParseTimeError::OutOfRange(input.to_string()))
}
