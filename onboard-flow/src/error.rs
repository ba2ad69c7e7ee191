use crate::types::MovieId;

/// Local validation failures. These are raised before any gateway call is
/// made; a validation error never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("email must not be empty")]
    MissingEmail,

    #[error("password must not be empty")]
    MissingPassword,

    #[error("username must not be empty")]
    MissingUsername,

    #[error("select a mood before continuing")]
    MissingMood,

    #[error("select at least one genre")]
    NoGenresSelected,

    #[error("rate at least {need} movies ({have} rated so far)")]
    NotEnoughRatings { have: usize, need: usize },

    #[error("movie {0} is not in the current rating set")]
    UnknownCandidate(MovieId),

    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),

    #[error("requested count must be between 1 and 20, got {0}")]
    CountOutOfRange(u8),

    #[error("unknown genre: {0}")]
    UnknownGenre(String),

    #[error("unknown mood: {0}")]
    UnknownMood(String),

    #[error("unknown recommendation method: {0}")]
    UnknownMethod(String),
}

/// Remote failures reported by the backend gateway. The carried string is
/// the backend's `message` and is surfaced to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    #[error("persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("no recommendations: {0}")]
    NoRecommendations(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl GatewayError {
    /// The backend-provided message without the classification prefix,
    /// for inline display.
    pub fn message(&self) -> &str {
        match self {
            GatewayError::AuthRejected(m)
            | GatewayError::PersistenceFailed(m)
            | GatewayError::NoRecommendations(m)
            | GatewayError::ServiceUnavailable(m) => m,
        }
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Errors returned by the stage controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("a request is already in flight for this action")]
    RequestInFlight,

    #[error("operation not available in the {0} stage")]
    WrongStage(&'static str),

    #[error("candidates have not been loaded yet")]
    CandidatesNotLoaded,
}

pub type Result<T> = std::result::Result<T, FlowError>;
