use std::collections::BTreeMap;

use crate::session::{GenreSet, Session};
use crate::types::{CandidateItem, Mood, MovieId, Rating, Recommendation, UserId};

/// Which credential form the authentication stage is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

/// A message surfaced on the authentication stage. Informational notices
/// (signup confirmation) and errors are distinct variants so the front end
/// never has to guess which one it is rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Form state for the authentication stage.
#[derive(Debug, Default)]
pub struct AuthStage {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub username: String,
    pub(crate) notice: Option<Notice>,
    pub(crate) in_flight: bool,
}

impl AuthStage {
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}

/// Form state for the preference collection stage.
#[derive(Debug)]
pub struct PreferencesStage {
    pub(crate) session_id: uuid::Uuid,
    pub(crate) user: UserId,
    pub(crate) username: Option<String>,
    pub mood: Option<Mood>,
    pub genres: GenreSet,
    pub(crate) in_flight: bool,
}

impl PreferencesStage {
    pub(crate) fn new(session_id: uuid::Uuid, user: UserId, username: Option<String>) -> Self {
        PreferencesStage {
            session_id,
            user,
            username,
            mood: None,
            genres: GenreSet::new(),
            in_flight: false,
        }
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

/// State for the taste calibration stage. Candidates are `None` until the
/// first fetch completes; a loaded empty list is a valid state.
#[derive(Debug)]
pub struct RatingsStage {
    pub(crate) session: Session,
    pub(crate) candidates: Option<Vec<CandidateItem>>,
    pub(crate) ratings: BTreeMap<MovieId, Rating>,
    pub(crate) in_flight: bool,
}

impl RatingsStage {
    pub(crate) fn new(session: Session) -> Self {
        RatingsStage {
            session,
            candidates: None,
            ratings: BTreeMap::new(),
            in_flight: false,
        }
    }

    pub fn genres(&self) -> &GenreSet {
        &self.session.genres
    }

    pub fn candidates(&self) -> Option<&[CandidateItem]> {
        self.candidates.as_deref()
    }

    pub fn ratings(&self) -> &BTreeMap<MovieId, Rating> {
        &self.ratings
    }

    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }
}

/// State for the results stage. The flow ends here; the stage accepts
/// repeated independent queries and keeps the last successful result.
#[derive(Debug)]
pub struct ResultsStage {
    pub(crate) session: Session,
    pub(crate) results: Vec<Recommendation>,
    pub(crate) in_flight: bool,
}

impl ResultsStage {
    pub(crate) fn new(session: Session) -> Self {
        ResultsStage {
            session,
            results: Vec::new(),
            in_flight: false,
        }
    }

    pub fn user(&self) -> UserId {
        self.session.user
    }

    pub fn username(&self) -> Option<&str> {
        self.session.username.as_deref()
    }

    pub fn results(&self) -> &[Recommendation] {
        &self.results
    }
}

/// The four onboarding stages. Each variant carries only the data that is
/// legal in that stage, so a rating map without a genre selection (for
/// example) cannot be constructed.
#[derive(Debug)]
pub enum Stage {
    Authenticating(AuthStage),
    CollectingPreferences(PreferencesStage),
    CalibratingRatings(RatingsStage),
    PresentingResults(ResultsStage),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Authenticating(_) => "authenticating",
            Stage::CollectingPreferences(_) => "collecting preferences",
            Stage::CalibratingRatings(_) => "calibrating ratings",
            Stage::PresentingResults(_) => "presenting results",
        }
    }
}
