use crate::error::{ErrorAccumulator, ExtractError};
use crate::log;
use crate::reader::split_games;
use crate::timecontrol::categorize_timecontrol;
use crate::types::{Color, GameRecord, Outcome, TimeCategory};

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// Matches one `[Name "value"]` tag pair. Empty values are not tags.
static TAG_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[(\w+) "([^"]+)"\]"#).expect("valid tag pair regex"));

const DATE_FORMAT: &str = "%Y.%m.%d";

#[derive(Debug, Default)]
struct HeaderFields {
    event: Option<String>,
    date: Option<String>,
    white: Option<String>,
    black: Option<String>,
    result: Option<String>,
    white_elo: Option<String>,
    black_elo: Option<String>,
    white_rating_diff: Option<String>,
    black_rating_diff: Option<String>,
    time_control: Option<String>,
    eco: Option<String>,
    opening: Option<String>,
    termination: Option<String>,
}

impl HeaderFields {
    /// Scans every tag pair in `block`, keeping the first value of each known tag.
    /// Returns the number of tag pairs seen, known or not.
    fn scan(&mut self, block: &str) -> usize {
        let mut seen = 0;
        for caps in TAG_PAIR_RE.captures_iter(block) {
            seen += 1;
            self.set_known_tag(&caps[1], &caps[2]);
        }
        seen
    }

    fn set_known_tag(&mut self, key: &str, value: &str) {
        let slot = match key {
            "Event" => &mut self.event,
            "UTCDate" => &mut self.date,
            "White" => &mut self.white,
            "Black" => &mut self.black,
            "Result" => &mut self.result,
            "WhiteElo" => &mut self.white_elo,
            "BlackElo" => &mut self.black_elo,
            "WhiteRatingDiff" => &mut self.white_rating_diff,
            "BlackRatingDiff" => &mut self.black_rating_diff,
            "TimeControl" => &mut self.time_control,
            "ECO" => &mut self.eco,
            "Opening" => &mut self.opening,
            "Termination" => &mut self.termination,
            _ => return,
        };

        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }
}

/// Integer tag value; NULL when absent or unparseable.
fn parse_integer_field(
    raw: Option<&str>,
    label: &str,
    parse_error: &mut ErrorAccumulator,
) -> Option<i64> {
    let s = raw?.trim();
    match s.parse::<i64>() {
        Ok(v) => Some(v),
        Err(_) => {
            parse_error.push(&format!("Conversion error: {label}='{s}'"));
            None
        }
    }
}

/// `YYYY.MM.DD` date at midnight; NULL when absent or unparseable.
fn parse_date_field(
    raw: Option<&str>,
    label: &str,
    parse_error: &mut ErrorAccumulator,
) -> Option<NaiveDateTime> {
    let s = raw?.trim();
    match NaiveDate::parse_from_str(s, DATE_FORMAT) {
        Ok(date) => date.and_hms_opt(0, 0, 0),
        Err(e) => {
            parse_error.push(&format!("Conversion error: {label}='{s}' (chrono: {e})"));
            None
        }
    }
}

/// Time category; `unknown` when absent, `-`, or malformed.
fn parse_time_category_field(
    raw: Option<&str>,
    label: &str,
    parse_error: &mut ErrorAccumulator,
) -> TimeCategory {
    let Some(s) = raw else {
        return TimeCategory::Unknown;
    };
    match categorize_timecontrol(s) {
        Ok(category) => category,
        Err(e) => {
            parse_error.push(&format!("Conversion error: {label}='{s}' ({e})"));
            TimeCategory::Unknown
        }
    }
}

fn subject_color(headers: &HeaderFields, subject: &str) -> Option<Color> {
    if headers.white.as_deref() == Some(subject) {
        Some(Color::White)
    } else if headers.black.as_deref() == Some(subject) {
        Some(Color::Black)
    } else {
        None
    }
}

/// Builds a record for `subject` from one game block.
///
/// `Ok(None)` means the subject played neither side. Field-level conversion
/// failures never fail the block; they null the field and land in
/// `parse_error`.
pub fn extract_game(block: &str, subject: &str) -> Result<Option<GameRecord>, ExtractError> {
    let mut headers = HeaderFields::default();
    if headers.scan(block) == 0 {
        return Err(ExtractError::NoTagSection);
    }

    let Some(my_color) = subject_color(&headers, subject) else {
        return Ok(None);
    };

    let mut parse_error = ErrorAccumulator::default();

    let white_elo = parse_integer_field(headers.white_elo.as_deref(), "WhiteElo", &mut parse_error);
    let black_elo = parse_integer_field(headers.black_elo.as_deref(), "BlackElo", &mut parse_error);
    let white_rating_diff = parse_integer_field(
        headers.white_rating_diff.as_deref(),
        "WhiteRatingDiff",
        &mut parse_error,
    );
    let black_rating_diff = parse_integer_field(
        headers.black_rating_diff.as_deref(),
        "BlackRatingDiff",
        &mut parse_error,
    );
    let datetime = parse_date_field(headers.date.as_deref(), "UTCDate", &mut parse_error);
    let time_category = parse_time_category_field(
        headers.time_control.as_deref(),
        "TimeControl",
        &mut parse_error,
    );

    let (my_elo, opp_elo, my_rating_delta) = match my_color {
        Color::White => (white_elo, black_elo, white_rating_diff),
        Color::Black => (black_elo, white_elo, black_rating_diff),
    };
    let outcome = Outcome::from_result(headers.result.as_deref(), my_color);

    Ok(Some(GameRecord {
        event: headers.event,
        date: headers.date,
        white: headers.white,
        black: headers.black,
        result: headers.result,
        eco: headers.eco,
        opening: headers.opening,
        termination: headers.termination,
        time_control: headers.time_control,
        white_elo,
        black_elo,
        white_rating_diff,
        black_rating_diff,
        my_color,
        my_elo,
        opp_elo,
        my_rating_delta,
        outcome,
        time_category,
        datetime,
        parse_error: parse_error.take(),
    }))
}

/// A block that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBlock {
    pub source: String,
    /// 1-based position of the block within its source.
    pub block_index: usize,
    pub error: ExtractError,
}

/// Records kept for the subject plus what was dropped along the way.
#[derive(Debug, Clone, Default)]
pub struct ParsedGames {
    pub games: Vec<GameRecord>,
    /// Blocks where the subject played neither side.
    pub discarded: usize,
    pub skipped: Vec<SkippedBlock>,
}

/// Folds game blocks from one or more texts into `ParsedGames`.
pub struct GameParser<'a> {
    subject: &'a str,
    parsed: ParsedGames,
}

impl<'a> GameParser<'a> {
    pub fn new(subject: &'a str) -> Self {
        Self {
            subject,
            parsed: ParsedGames::default(),
        }
    }

    pub fn parse_text(&mut self, text: &str, source: &str) {
        for (idx, block) in split_games(text).into_iter().enumerate() {
            match extract_game(block, self.subject) {
                Ok(Some(game)) => self.parsed.games.push(game),
                Ok(None) => self.parsed.discarded += 1,
                Err(error) => {
                    let block_index = idx + 1;
                    log::warn(format!(
                        "Skipping game block: file='{source}'; block_index={block_index}; error={error}"
                    ));
                    self.parsed.skipped.push(SkippedBlock {
                        source: source.to_string(),
                        block_index,
                        error,
                    });
                }
            }
        }
    }

    pub fn finish(self) -> ParsedGames {
        log::info(format!(
            "Parsed {} games ({} without {}, {} skipped)",
            self.parsed.games.len(),
            self.parsed.discarded,
            self.subject,
            self.parsed.skipped.len()
        ));
        self.parsed
    }
}

/// Parses a single in-memory PGN text.
pub fn parse_games(text: &str, subject: &str) -> ParsedGames {
    let mut parser = GameParser::new(subject);
    parser.parse_text(text, "<memory>");
    parser.finish()
}
