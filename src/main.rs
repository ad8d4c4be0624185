use chess_stats::{
    analyze_files,
    config::{AnalysisConfig, DEFAULT_ROLLING_WINDOW, DEFAULT_TOP_OPENINGS},
    log,
    reader::CompressionMode,
    report::{write_json_report, write_text_report},
};
use clap::{Parser, ValueEnum};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Performance statistics from a PGN game history.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// PGN file or glob pattern, e.g. "games/*.pgn"
    path: String,

    /// Player name to analyze, matched exactly against White/Black tags
    #[arg(short, long)]
    player: String,

    /// Input compression ("zstd"); inferred from a .zst extension when omitted
    #[arg(long)]
    compression: Option<String>,

    /// Games in the rolling win-rate window
    #[arg(long, default_value_t = DEFAULT_ROLLING_WINDOW)]
    window: usize,

    /// Number of most played openings to report
    #[arg(long, default_value_t = DEFAULT_TOP_OPENINGS)]
    top: usize,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let compression = args
        .compression
        .as_deref()
        .map(CompressionMode::parse)
        .transpose()?;
    let config = AnalysisConfig::new(args.player)
        .with_rolling_window(args.window)
        .with_top_openings(args.top);

    let report = analyze_files(&args.path, compression, &config)?;
    if !report.skipped.is_empty() {
        log::warn(format!("{} game blocks skipped", report.skipped.len()));
    }

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match args.format {
        Format::Text => write_text_report(&mut out, &report.analysis.summary)?,
        Format::Json => write_json_report(&mut out, &report.analysis)?,
    }
    out.flush()?;

    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error(e.to_string());
            ExitCode::FAILURE
        }
    }
}
