use crate::stats::{Analysis, StatisticsSummary};
use std::fmt::Display;
use std::io::{self, Write};

const RULE_WIDTH: usize = 60;

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

/// Plain-text statistics report.
pub fn write_text_report<W: Write>(out: &mut W, summary: &StatisticsSummary) -> io::Result<()> {
    writeln!(out, "CHESS PERFORMANCE ANALYSIS - DETAILED STATISTICS")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out)?;

    writeln!(out, "Total Games: {}", summary.total_games)?;
    writeln!(
        out,
        "Record: {}W - {}L - {}D",
        summary.wins, summary.losses, summary.draws
    )?;
    writeln!(out, "Overall Win Rate: {:.2}%", summary.win_rate)?;
    writeln!(out)?;

    writeln!(
        out,
        "As White: {} games | Win Rate: {:.2}%",
        summary.white_games, summary.white_win_rate
    )?;
    writeln!(
        out,
        "As Black: {} games | Win Rate: {:.2}%",
        summary.black_games, summary.black_win_rate
    )?;
    writeln!(out)?;

    writeln!(out, "Current Rating: {}", or_na(summary.current_rating))?;
    writeln!(out, "Highest Rating: {}", or_na(summary.highest_rating))?;
    writeln!(out, "Lowest Rating: {}", or_na(summary.lowest_rating))?;
    writeln!(
        out,
        "Average Rating: {}",
        or_na(summary.average_rating.map(|avg| format!("{avg:.0}")))
    )?;
    if let Some(mean) = summary.rating_change.mean {
        writeln!(
            out,
            "Average Rating Change: {mean:+.2} over {} games",
            summary.rating_change.count
        )?;
    }
    if let Some(rate) = summary.current_rolling_win_rate {
        writeln!(out, "Rolling Win Rate: {rate:.2}%")?;
    }
    writeln!(out)?;

    writeln!(out, "Time Control Breakdown:")?;
    for row in &summary.time_control_breakdown {
        writeln!(out, "  {}: {} games", row.key, row.count)?;
    }

    writeln!(out)?;
    writeln!(out, "Top {} Openings:", summary.top_openings.len())?;
    for row in &summary.top_openings {
        writeln!(out, "  {}: {} games", row.key, row.count)?;
    }

    writeln!(out)?;
    writeln!(out, "Termination Breakdown:")?;
    for row in &summary.termination_breakdown {
        writeln!(out, "  {}: {} games", row.key, row.count)?;
    }

    Ok(())
}

/// Full analysis as pretty-printed JSON.
pub fn write_json_report<W: Write>(out: &mut W, analysis: &Analysis) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, analysis)?;
    writeln!(out).map_err(serde_json::Error::io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::extract::parse_games;
    use crate::stats::analyze;

    const GAMES: &str = r#"[Event "Rated Blitz game"]
[White "me"]
[Black "x"]
[Result "1-0"]
[UTCDate "2024.01.02"]
[WhiteElo "1500"]
[BlackElo "1400"]
[WhiteRatingDiff "+5"]
[TimeControl "300+0"]
[Opening "French Defense"]
[Termination "Normal"]

1. e4 e6 1-0

[Event "Rated Bullet game"]
[White "y"]
[Black "me"]
[Result "1-0"]
[UTCDate "2024.02.02"]
[WhiteElo "1550"]
[BlackElo "1506"]
[BlackRatingDiff "-6"]
[TimeControl "60+0"]
[Opening "French Defense"]
[Termination "Time forfeit"]

1. d4 1-0
"#;

    fn analysis() -> Analysis {
        analyze(parse_games(GAMES, "me").games, &AnalysisConfig::new("me"))
    }

    #[test]
    fn test_text_report_contents() {
        let mut buf = Vec::new();
        write_text_report(&mut buf, &analysis().summary).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("CHESS PERFORMANCE ANALYSIS - DETAILED STATISTICS\n"));
        assert!(text.contains("Total Games: 2\n"));
        assert!(text.contains("Record: 1W - 1L - 0D\n"));
        assert!(text.contains("Overall Win Rate: 50.00%\n"));
        assert!(text.contains("As White: 1 games | Win Rate: 100.00%\n"));
        assert!(text.contains("As Black: 1 games | Win Rate: 0.00%\n"));
        assert!(text.contains("Current Rating: 1506\n"));
        assert!(text.contains("Average Rating: 1503\n"));
        assert!(text.contains("Average Rating Change: -0.50 over 2 games\n"));
        assert!(text.contains("  blitz: 1 games\n"));
        assert!(text.contains("Top 1 Openings:\n  French Defense: 2 games\n"));
        assert!(text.contains("  Time forfeit: 1 games\n"));
    }

    #[test]
    fn test_text_report_for_empty_summary() {
        let empty = analyze(Vec::new(), &AnalysisConfig::new("me"));
        let mut buf = Vec::new();
        write_text_report(&mut buf, &empty.summary).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Total Games: 0\n"));
        assert!(text.contains("Overall Win Rate: 0.00%\n"));
        assert!(text.contains("Current Rating: n/a\n"));
        assert!(text.contains("Average Rating: n/a\n"));
        assert!(!text.contains("Rolling Win Rate"));
    }

    #[test]
    fn test_json_report_shape() {
        let mut buf = Vec::new();
        write_json_report(&mut buf, &analysis()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["summary"]["total_games"], 2);
        assert_eq!(value["summary"]["time_control_breakdown"][0]["key"], "blitz");
        assert_eq!(value["games"][0]["my_color"], "white");
        assert_eq!(value["games"][0]["outcome"], "win");
        assert_eq!(value["games"][0]["rating_difference"], 100);
        assert_eq!(value["games"][0]["rating_bucket"], "100 to 200");
        assert_eq!(value["games"][1]["year_month"], "2024-02");
        assert_eq!(value["breakdowns"]["by_month"][0]["key"], "2024-01");
        assert_eq!(value["breakdowns"]["by_color"][1]["games"], 1);
        assert!(value["games"][0]["parse_error"].is_null());
    }
}
