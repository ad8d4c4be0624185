use crate::error::AnalyzeError;
use crate::log;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use zstd::stream::read::Decoder as ZstdDecoder;

/// A blank line followed by the `[Event` tag starts a new game.
static GAME_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n\r?\n\[Event").expect("valid game boundary regex"));

const EVENT_TAG_PREFIX: &str = "[Event";

pub type PgnInput = Box<dyn Read + Send>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressionMode {
    Plain,
    Zstd,
}

impl CompressionMode {
    pub fn parse(raw: &str) -> Result<Self, AnalyzeError> {
        let normalized = raw.trim();
        if normalized.eq_ignore_ascii_case("zstd") || normalized.eq_ignore_ascii_case("zst") {
            Ok(Self::Zstd)
        } else {
            Err(AnalyzeError::InvalidCompression(normalized.to_string()))
        }
    }

    /// Explicit mode wins; otherwise a `.zst` extension selects zstd.
    pub fn for_path(explicit: Option<Self>, path: &Path) -> Self {
        match explicit {
            Some(mode) => mode,
            None if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("zst")) =>
            {
                Self::Zstd
            }
            None => Self::Plain,
        }
    }
}

/// Splits a multi-game PGN text into raw game blocks.
///
/// Every block after the first starts with `[Event`. Blank blocks are dropped.
pub fn split_games(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut start = 0;

    for boundary in GAME_BOUNDARY_RE.find_iter(text) {
        push_block(&mut blocks, &text[start..boundary.start()]);
        start = boundary.end() - EVENT_TAG_PREFIX.len();
    }
    push_block(&mut blocks, &text[start..]);

    blocks
}

fn push_block<'a>(blocks: &mut Vec<&'a str>, block: &'a str) {
    if !block.trim().is_empty() {
        blocks.push(block);
    }
}

/// Expands a file path or glob pattern into the input files, sorted by path.
pub fn resolve_paths(pattern: &str) -> Result<Vec<PathBuf>, AnalyzeError> {
    if !pattern.contains(['*', '?', '[']) {
        return Ok(vec![PathBuf::from(pattern)]);
    }

    let entries = glob::glob(pattern).map_err(|source| AnalyzeError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => log::warn(format!("Skipping unreadable glob entry: {e}")),
        }
    }

    if paths.is_empty() {
        return Err(AnalyzeError::NoInputFiles(pattern.to_string()));
    }

    paths.sort();
    Ok(paths)
}

pub fn open_input_stream(path: &Path, compression: CompressionMode) -> Result<PgnInput, AnalyzeError> {
    let file = File::open(path).map_err(|source| AnalyzeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match compression {
        CompressionMode::Plain => Ok(Box::new(file)),
        CompressionMode::Zstd => ZstdDecoder::new(file)
            .map(|decoder| Box::new(decoder) as PgnInput)
            .map_err(|source| AnalyzeError::Decompress {
                path: path.to_path_buf(),
                source,
            }),
    }
}

/// Reads one input file to text. Invalid UTF-8 is replaced, not rejected.
pub fn read_pgn_text(path: &Path, compression: CompressionMode) -> Result<String, AnalyzeError> {
    let mut input = open_input_stream(path, compression)?;
    let mut bytes = Vec::new();
    input
        .read_to_end(&mut bytes)
        .map_err(|source| AnalyzeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn(format!(
                "Replacing invalid UTF-8 in '{}'",
                path.display()
            ));
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}

/// Reads every file matched by `pattern`.
///
/// A single unreadable file is fatal. When several files match, unreadable
/// ones are logged and skipped.
pub fn read_inputs(
    pattern: &str,
    compression: Option<CompressionMode>,
) -> Result<Vec<(PathBuf, String)>, AnalyzeError> {
    let paths = resolve_paths(pattern)?;
    let single = paths.len() == 1;
    let mut texts = Vec::with_capacity(paths.len());

    for path in paths {
        let mode = CompressionMode::for_path(compression, &path);
        match read_pgn_text(&path, mode) {
            Ok(text) => texts.push((path, text)),
            Err(e) if single => return Err(e),
            Err(e) => log::warn(e.to_string()),
        }
    }

    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_reattaches_event_prefix() {
        let text = "[Event \"A\"]\n[White \"x\"]\n\n1. e4 1-0\n\n[Event \"B\"]\n[White \"y\"]\n\n1. d4 0-1\n";
        let blocks = split_games(text);

        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("[Event \"A\"]"));
        assert!(blocks[1].starts_with("[Event \"B\"]"));
        assert!(blocks[0].ends_with("1. e4 1-0"));
    }

    #[test]
    fn test_split_empty_and_blank_input() {
        assert!(split_games("").is_empty());
        assert!(split_games("  \n\n \t\n").is_empty());
    }

    #[test]
    fn test_split_drops_blank_leading_block() {
        let text = "\n\n[Event \"A\"]\n1. e4 *";
        let blocks = split_games(text);

        assert_eq!(blocks, vec!["[Event \"A\"]\n1. e4 *"]);
    }

    #[test]
    fn test_split_keeps_leading_content_before_first_boundary() {
        let text = "junk header\n\n[Event \"A\"]\n1. e4 *";
        let blocks = split_games(text);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "junk header");
    }

    #[test]
    fn test_split_handles_crlf_line_endings() {
        let text = "[Event \"A\"]\r\n1. e4 *\r\n\r\n[Event \"B\"]\r\n1. d4 *";
        let blocks = split_games(text);

        assert_eq!(blocks.len(), 2);
        assert!(blocks[1].starts_with("[Event \"B\"]"));
    }

    #[test]
    fn test_parse_compression_mode_zstd_case_insensitive() {
        assert_eq!(CompressionMode::parse("zstd").unwrap(), CompressionMode::Zstd);
        assert_eq!(CompressionMode::parse("ZsTd").unwrap(), CompressionMode::Zstd);
    }

    #[test]
    fn test_parse_compression_mode_rejects_unsupported_value() {
        let err = CompressionMode::parse("gzip").unwrap_err().to_string();
        assert!(err.contains("Invalid compression value 'gzip'"));
    }

    #[test]
    fn test_compression_inferred_from_extension() {
        assert_eq!(
            CompressionMode::for_path(None, Path::new("games.pgn.zst")),
            CompressionMode::Zstd
        );
        assert_eq!(
            CompressionMode::for_path(None, Path::new("games.pgn")),
            CompressionMode::Plain
        );
        assert_eq!(
            CompressionMode::for_path(Some(CompressionMode::Plain), Path::new("games.zst")),
            CompressionMode::Plain
        );
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = read_inputs("/definitely/not/here.pgn", None).unwrap_err();
        assert!(matches!(err, AnalyzeError::Io { .. }));
    }

    #[test]
    fn test_glob_without_matches_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.pgn", dir.path().display());
        let err = read_inputs(&pattern, None).unwrap_err();
        assert!(matches!(err, AnalyzeError::NoInputFiles(_)));
    }

    #[test]
    fn test_read_plain_and_zstd_files_in_path_order() {
        let dir = tempfile::tempdir().unwrap();

        let mut plain = File::create(dir.path().join("a.pgn")).unwrap();
        plain.write_all(b"[Event \"plain\"]\n").unwrap();

        let compressed = zstd::stream::encode_all(&b"[Event \"zstd\"]\n"[..], 0).unwrap();
        std::fs::write(dir.path().join("b.pgn.zst"), compressed).unwrap();

        let pattern = format!("{}/*", dir.path().display());
        let texts = read_inputs(&pattern, None).unwrap();

        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].1, "[Event \"plain\"]\n");
        assert_eq!(texts[1].1, "[Event \"zstd\"]\n");
    }
}
