use crate::types::TimeCategory;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Unlimited,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTimeControl {
    pub raw: String,
    pub mode: Mode,
    pub base_seconds: Option<i64>,
    pub increment_seconds: Option<i64>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TimeControlError {
    pub message: String,
}

/// Parses a `TimeControl` tag of the form `base[+increment]`.
///
/// `-` is an untimed game. Only the base component must be an integer; a
/// trailing increment that does not parse is ignored.
pub fn parse_timecontrol(raw: &str) -> Result<ParsedTimeControl, TimeControlError> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(TimeControlError {
            message: "empty input".to_string(),
        });
    }

    if input == "-" {
        return Ok(ParsedTimeControl {
            raw: raw.to_string(),
            mode: Mode::Unlimited,
            base_seconds: None,
            increment_seconds: None,
        });
    }

    let mut parts = input.split('+');
    let base_str = parts.next().unwrap_or_default().trim();
    let base_seconds = base_str.parse::<i64>().map_err(|e| TimeControlError {
        message: format!("invalid base time '{base_str}': {e}"),
    })?;
    let increment_seconds = parts.next().and_then(|inc| inc.trim().parse::<i64>().ok());

    Ok(ParsedTimeControl {
        raw: raw.to_string(),
        mode: Mode::Normal,
        base_seconds: Some(base_seconds),
        increment_seconds,
    })
}

pub fn category_from_parsed_timecontrol(parsed: &ParsedTimeControl) -> TimeCategory {
    match (&parsed.mode, parsed.base_seconds) {
        (Mode::Normal, Some(base)) => TimeCategory::from_base_seconds(base),
        _ => TimeCategory::Unknown,
    }
}

/// Classifies by base time alone; the increment does not shift the category.
pub fn categorize_timecontrol(raw: &str) -> Result<TimeCategory, TimeControlError> {
    parse_timecontrol(raw).map(|parsed| category_from_parsed_timecontrol(&parsed))
}
