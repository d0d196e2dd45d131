/// Error types for the payoff and pricing engine.
/// The numeric core never recovers locally: every violation is surfaced to
/// the caller, which decides whether to abort the round or re-prompt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid position kind: {0} (must be 'stock', 'call', 'put', or 'bond')")]
    InvalidPositionKind(String),

    #[error("domain error: {0}")]
    Domain(String),

    #[error("invalid price grid: {0}")]
    InvalidGrid(String),

    #[error("input error: {0}")]
    Input(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),
}

impl EngineError {
    /// Stable tag for machine consumers (HTTP error bodies).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPositionKind(_) => "invalid_position_kind",
            Self::Domain(_) => "domain",
            Self::InvalidGrid(_) => "invalid_grid",
            Self::Input(_) => "input",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
