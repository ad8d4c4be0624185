use crate::config::AnalysisConfig;
use crate::types::{Color, GameRecord, Outcome, RatingBucket, TimeCategory, YearMonth};

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// `100 * part / whole`, or 0 for an empty group.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTally {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl OutcomeTally {
    pub fn add(&mut self, outcome: Outcome) {
        self.games += 1;
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    pub fn win_rate(&self) -> f64 {
        percentage(self.wins, self.games)
    }
}

/// Outcome tally for one value of a grouping key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow<K> {
    pub key: K,
    #[serde(flatten)]
    pub tally: OutcomeTally,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow<K> {
    pub key: K,
    pub count: usize,
}

impl<K: Clone> From<&GroupRow<K>> for CountRow<K> {
    fn from(row: &GroupRow<K>) -> Self {
        Self {
            key: row.key.clone(),
            count: row.tally.games,
        }
    }
}

/// A game plus the fields derived at aggregation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedGame {
    #[serde(flatten)]
    pub record: GameRecord,
    /// Subject rating minus opponent rating.
    pub rating_difference: Option<i64>,
    pub rating_bucket: Option<RatingBucket>,
    pub year_month: Option<YearMonth>,
}

impl EnrichedGame {
    pub fn new(record: GameRecord) -> Self {
        let rating_difference = match (record.my_elo, record.opp_elo) {
            (Some(mine), Some(theirs)) => mine.checked_sub(theirs),
            _ => None,
        };
        let year_month = record.datetime.as_ref().map(YearMonth::of);

        Self {
            rating_difference,
            rating_bucket: rating_difference.map(RatingBucket::from_difference),
            year_month,
            record,
        }
    }
}

/// Groups games by `key` and tallies outcomes per group.
///
/// Games for which `key` returns `None` are left out. Rows come back in the
/// order their key was first seen.
pub fn group_outcomes<K, F>(games: &[EnrichedGame], mut key: F) -> Vec<GroupRow<K>>
where
    K: Eq + Hash + Clone,
    F: FnMut(&EnrichedGame) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut tallies: Vec<(K, OutcomeTally)> = Vec::new();

    for game in games {
        let Some(k) = key(game) else { continue };
        let slot = match index.get(&k) {
            Some(&slot) => slot,
            None => {
                index.insert(k.clone(), tallies.len());
                tallies.push((k, OutcomeTally::default()));
                tallies.len() - 1
            }
        };
        tallies[slot].1.add(game.record.outcome);
    }

    tallies
        .into_iter()
        .map(|(key, tally)| GroupRow {
            key,
            win_rate: tally.win_rate(),
            tally,
        })
        .collect()
}

/// Most played first; equal counts keep first-seen order.
fn by_games_desc<K>(mut rows: Vec<GroupRow<K>>) -> Vec<GroupRow<K>> {
    rows.sort_by(|a, b| b.tally.games.cmp(&a.tally.games));
    rows
}

fn by_key<K: Ord>(mut rows: Vec<GroupRow<K>>) -> Vec<GroupRow<K>> {
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingPoint {
    pub datetime: NaiveDateTime,
    pub rating: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingProgression {
    pub points: Vec<RatingPoint>,
    /// Least-squares rating change per game across `points`.
    pub trend_slope: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RatingChangeSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub total_games: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub win_rate: f64,

    pub white_games: usize,
    pub white_wins: usize,
    pub white_win_rate: f64,
    pub black_games: usize,
    pub black_wins: usize,
    pub black_win_rate: f64,

    /// Subject rating on the last game in input order, which need not be the
    /// most recent game when the input is not date-ordered.
    pub current_rating: Option<i64>,
    pub highest_rating: Option<i64>,
    pub lowest_rating: Option<i64>,
    pub average_rating: Option<f64>,

    pub time_control_breakdown: Vec<CountRow<TimeCategory>>,
    pub top_openings: Vec<CountRow<String>>,
    pub termination_breakdown: Vec<CountRow<String>>,

    pub rating_change: RatingChangeSummary,
    pub current_rolling_win_rate: Option<f64>,
}

/// Per-breakdown win-rate tables consumed by chart rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdowns {
    pub by_color: Vec<GroupRow<Color>>,
    pub by_time_category: Vec<GroupRow<TimeCategory>>,
    pub by_opening: Vec<GroupRow<String>>,
    pub by_termination: Vec<GroupRow<String>>,
    pub by_rating_difference: Vec<GroupRow<RatingBucket>>,
    pub by_month: Vec<GroupRow<YearMonth>>,
}

/// Everything one run produces from the parsed games.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub summary: StatisticsSummary,
    pub games: Vec<EnrichedGame>,
    pub breakdowns: Breakdowns,
    pub rating_progression: RatingProgression,
    pub rolling_win_rate: Vec<f64>,
}

pub fn analyze(records: Vec<GameRecord>, config: &AnalysisConfig) -> Analysis {
    let games: Vec<EnrichedGame> = records.into_iter().map(EnrichedGame::new).collect();

    let breakdowns = breakdowns(&games, config.top_openings);
    let rolling_win_rate = rolling_win_rate(&games, config.rolling_window);
    let summary = summarize(&games, &breakdowns, &rolling_win_rate);

    Analysis {
        summary,
        rating_progression: rating_progression(&games),
        breakdowns,
        rolling_win_rate,
        games,
    }
}

pub fn breakdowns(games: &[EnrichedGame], top_openings: usize) -> Breakdowns {
    let by_color = [Color::White, Color::Black]
        .into_iter()
        .map(|color| {
            let tally = color_tally(games, color);
            GroupRow {
                key: color,
                win_rate: tally.win_rate(),
                tally,
            }
        })
        .collect();

    let by_time_category = by_key(group_outcomes(games, |g| {
        Some(g.record.time_category).filter(|c| TimeCategory::RATED.contains(c))
    }));

    let mut by_opening = by_games_desc(group_outcomes(games, |g| g.record.opening.clone()));
    by_opening.truncate(top_openings);

    Breakdowns {
        by_color,
        by_time_category,
        by_opening,
        by_termination: by_games_desc(group_outcomes(games, |g| g.record.termination.clone())),
        by_rating_difference: by_key(group_outcomes(games, |g| g.rating_bucket)),
        by_month: by_key(group_outcomes(games, |g| g.year_month)),
    }
}

/// Tally over the games `filter` accepts; all zero when none do.
fn tally_where<F>(games: &[EnrichedGame], filter: F) -> OutcomeTally
where
    F: Fn(&EnrichedGame) -> bool,
{
    group_outcomes(games, |g| filter(g).then_some(()))
        .pop()
        .map(|row| row.tally)
        .unwrap_or_default()
}

fn color_tally(games: &[EnrichedGame], color: Color) -> OutcomeTally {
    tally_where(games, |g| g.record.my_color == color)
}

pub fn summarize(
    games: &[EnrichedGame],
    breakdowns: &Breakdowns,
    rolling_win_rate: &[f64],
) -> StatisticsSummary {
    let overall = tally_where(games, |_| true);
    let white = color_tally(games, Color::White);
    let black = color_tally(games, Color::Black);

    let ratings: Vec<i64> = games.iter().filter_map(|g| g.record.my_elo).collect();
    let average_rating = (!ratings.is_empty())
        .then(|| ratings.iter().map(|&r| r as f64).sum::<f64>() / ratings.len() as f64);

    let time_control_breakdown = by_games_desc(group_outcomes(games, |g| Some(g.record.time_category)))
        .iter()
        .map(CountRow::from)
        .collect();

    StatisticsSummary {
        total_games: overall.games,
        wins: overall.wins,
        losses: overall.losses,
        draws: overall.draws,
        win_rate: overall.win_rate(),

        white_games: white.games,
        white_wins: white.wins,
        white_win_rate: white.win_rate(),
        black_games: black.games,
        black_wins: black.wins,
        black_win_rate: black.win_rate(),

        current_rating: games.last().and_then(|g| g.record.my_elo),
        highest_rating: ratings.iter().copied().max(),
        lowest_rating: ratings.iter().copied().min(),
        average_rating,

        time_control_breakdown,
        top_openings: breakdowns.by_opening.iter().map(CountRow::from).collect(),
        termination_breakdown: breakdowns.by_termination.iter().map(CountRow::from).collect(),

        rating_change: rating_change_summary(games),
        current_rolling_win_rate: rolling_win_rate.last().copied(),
    }
}

/// Games in ascending date order, undated games last, ties in input order.
fn chronological(games: &[EnrichedGame]) -> Vec<&EnrichedGame> {
    let mut sorted: Vec<&EnrichedGame> = games.iter().collect();
    sorted.sort_by_key(|g| (g.record.datetime.is_none(), g.record.datetime));
    sorted
}

/// Trailing-window mean of outcome scores as a percentage, one value per game.
///
/// The first `window - 1` values average over the games seen so far.
pub fn rolling_win_rate(games: &[EnrichedGame], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let scores: Vec<f64> = chronological(games)
        .into_iter()
        .map(|g| g.record.outcome.score())
        .collect();

    let mut rates = Vec::with_capacity(scores.len());
    let mut sum = 0.0;
    for (i, score) in scores.iter().enumerate() {
        sum += score;
        if i >= window {
            sum -= scores[i - window];
        }
        let len = (i + 1).min(window);
        rates.push(100.0 * sum / len as f64);
    }
    rates
}

pub fn rating_progression(games: &[EnrichedGame]) -> RatingProgression {
    let points: Vec<RatingPoint> = chronological(games)
        .into_iter()
        .filter_map(|g| {
            Some(RatingPoint {
                datetime: g.record.datetime?,
                rating: g.record.my_elo?,
            })
        })
        .collect();

    let trend_slope = least_squares_slope(&points);
    RatingProgression { points, trend_slope }
}

fn least_squares_slope(points: &[RatingPoint]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = points.iter().map(|p| p.rating as f64).sum::<f64>() / n;

    let (mut cov, mut var) = (0.0, 0.0);
    for (i, point) in points.iter().enumerate() {
        let dx = i as f64 - mean_x;
        cov += dx * (point.rating as f64 - mean_y);
        var += dx * dx;
    }
    Some(cov / var)
}

pub fn rating_change_summary(games: &[EnrichedGame]) -> RatingChangeSummary {
    let deltas: Vec<i64> = games.iter().filter_map(|g| g.record.my_rating_delta).collect();
    if deltas.is_empty() {
        return RatingChangeSummary::default();
    }

    RatingChangeSummary {
        count: deltas.len(),
        mean: Some(deltas.iter().map(|&d| d as f64).sum::<f64>() / deltas.len() as f64),
        min: deltas.iter().copied().min(),
        max: deltas.iter().copied().max(),
    }
}
