use chrono::{Datelike, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;

/// Side the subject played in one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Game result seen from the subject's side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Maps a `Result` tag to the subject's outcome.
    ///
    /// Anything other than a decisive `1-0`/`0-1` counts as a draw, which
    /// also covers `*` and unknown codes.
    pub fn from_result(result: Option<&str>, color: Color) -> Self {
        match (result, color) {
            (Some("1-0"), Color::White) | (Some("0-1"), Color::Black) => Self::Win,
            (Some("0-1"), Color::White) | (Some("1-0"), Color::Black) => Self::Loss,
            _ => Self::Draw,
        }
    }

    /// Score used by the rolling win rate: win 1, draw 0.5, loss 0.
    pub fn score(self) -> f64 {
        match self {
            Self::Win => 1.0,
            Self::Draw => 0.5,
            Self::Loss => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Draw => "draw",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeCategory {
    Bullet,
    Blitz,
    Rapid,
    Classical,
    Unknown,
}

impl TimeCategory {
    /// Categories with a defined base-time range, fastest first.
    pub const RATED: [TimeCategory; 4] = [Self::Bullet, Self::Blitz, Self::Rapid, Self::Classical];

    pub fn from_base_seconds(base_seconds: i64) -> Self {
        match base_seconds {
            i64::MIN..=179 => Self::Bullet,
            180..=479 => Self::Blitz,
            480..=1499 => Self::Rapid,
            _ => Self::Classical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullet => "bullet",
            Self::Blitz => "blitz",
            Self::Rapid => "rapid",
            Self::Classical => "classical",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed ranges for `subject rating - opponent rating`.
///
/// Lower bounds are inclusive, upper bounds exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RatingBucket {
    Below200,
    Minus200To100,
    Minus100To50,
    Minus50To0,
    Plus0To50,
    Plus50To100,
    Plus100To200,
    Above200,
}

impl RatingBucket {
    pub const ALL: [RatingBucket; 8] = [
        Self::Below200,
        Self::Minus200To100,
        Self::Minus100To50,
        Self::Minus50To0,
        Self::Plus0To50,
        Self::Plus50To100,
        Self::Plus100To200,
        Self::Above200,
    ];

    pub fn from_difference(diff: i64) -> Self {
        match diff {
            i64::MIN..=-201 => Self::Below200,
            -200..=-101 => Self::Minus200To100,
            -100..=-51 => Self::Minus100To50,
            -50..=-1 => Self::Minus50To0,
            0..=49 => Self::Plus0To50,
            50..=99 => Self::Plus50To100,
            100..=199 => Self::Plus100To200,
            _ => Self::Above200,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Below200 => "<-200",
            Self::Minus200To100 => "-200 to -100",
            Self::Minus100To50 => "-100 to -50",
            Self::Minus50To0 => "-50 to 0",
            Self::Plus0To50 => "0 to 50",
            Self::Plus50To100 => "50 to 100",
            Self::Plus100To200 => "100 to 200",
            Self::Above200 => ">200",
        }
    }
}

impl fmt::Display for RatingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for RatingBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(datetime: &NaiveDateTime) -> Self {
        Self {
            year: datetime.year(),
            month: datetime.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One game from the subject's point of view, built from PGN header tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    // Raw tags
    pub event: Option<String>,
    pub date: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    pub eco: Option<String>,
    pub opening: Option<String>,
    pub termination: Option<String>,
    pub time_control: Option<String>,

    // Numeric tags
    pub white_elo: Option<i64>,
    pub black_elo: Option<i64>,
    pub white_rating_diff: Option<i64>,
    pub black_rating_diff: Option<i64>,

    // Subject perspective
    pub my_color: Color,
    pub my_elo: Option<i64>,
    pub opp_elo: Option<i64>,
    pub my_rating_delta: Option<i64>,
    pub outcome: Outcome,
    pub time_category: TimeCategory,
    pub datetime: Option<NaiveDateTime>,

    /// NULL for cleanly parsed games, otherwise the `; `-joined conversion errors.
    pub parse_error: Option<String>,
}
