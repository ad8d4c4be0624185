pub mod config;
pub mod error;
pub mod extract;
pub mod log;
pub mod reader;
pub mod report;
pub mod stats;
pub mod timecontrol;
pub mod types;

use config::AnalysisConfig;
use error::AnalyzeError;
use extract::{GameParser, ParsedGames, SkippedBlock};
use reader::CompressionMode;
use stats::Analysis;

/// Result of one pipeline run, with the blocks that did not make it.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub analysis: Analysis,
    pub discarded: usize,
    pub skipped: Vec<SkippedBlock>,
}

impl RunReport {
    fn from_parsed(parsed: ParsedGames, config: &AnalysisConfig) -> Self {
        Self {
            analysis: stats::analyze(parsed.games, config),
            discarded: parsed.discarded,
            skipped: parsed.skipped,
        }
    }
}

pub fn analyze_text(text: &str, config: &AnalysisConfig) -> RunReport {
    RunReport::from_parsed(extract::parse_games(text, &config.subject), config)
}

/// Reads every file matching `pattern` and analyzes the games in it.
pub fn analyze_files(
    pattern: &str,
    compression: Option<CompressionMode>,
    config: &AnalysisConfig,
) -> Result<RunReport, AnalyzeError> {
    let inputs = reader::read_inputs(pattern, compression)?;

    let mut parser = GameParser::new(&config.subject);
    for (path, text) in &inputs {
        log::info(format!("Parsing {}...", path.display()));
        parser.parse_text(text, &path.display().to_string());
    }

    Ok(RunReport::from_parsed(parser.finish(), config))
}
