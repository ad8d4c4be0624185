pub const DEFAULT_ROLLING_WINDOW: usize = 100;
pub const DEFAULT_TOP_OPENINGS: usize = 10;

/// Settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Player name matched exactly against the `White`/`Black` tags.
    pub subject: String,
    pub rolling_window: usize,
    pub top_openings: usize,
}

impl AnalysisConfig {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            rolling_window: DEFAULT_ROLLING_WINDOW,
            top_openings: DEFAULT_TOP_OPENINGS,
        }
    }

    pub fn with_rolling_window(mut self, window: usize) -> Self {
        self.rolling_window = window.max(1);
        self
    }

    pub fn with_top_openings(mut self, limit: usize) -> Self {
        self.top_openings = limit;
        self
    }
}
