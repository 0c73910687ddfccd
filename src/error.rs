use thiserror::Error;

pub type Result<T> = std::result::Result<T, SurvivalError>;

#[derive(Error, Debug, Clone)]
pub enum SurvivalError {
    #[error("subject data is broken: {message}")]
    Validation { message: String },

    #[error("no subjects to analyze")]
    EmptyInput,

    #[error("log-rank needs at least 2 non-empty groups, found {found}")]
    InsufficientGroups { found: usize },

    #[error("bad interval boundaries: {message}")]
    InvalidBoundaries { message: String },

    #[error("numerical issues: {message}")]
    Numerical { message: String },
}

impl SurvivalError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn invalid_boundaries(message: impl Into<String>) -> Self {
        Self::InvalidBoundaries { message: message.into() }
    }

    pub fn numerical(message: impl Into<String>) -> Self {
        Self::Numerical { message: message.into() }
    }
}
