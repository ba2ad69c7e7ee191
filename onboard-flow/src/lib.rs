//! Onboarding & recommendation orchestration for the BingeBox client.
//!
//! The flow walks a new user through four stages: authenticate, collect
//! preferences, calibrate taste by rating a handful of movies, and finally
//! query personalized recommendations. [`OnboardingFlow`] owns the stage
//! progression; the [`Gateway`] trait describes the five backend operations
//! the flow depends on, leaving transport to the caller.

pub mod controller;
pub mod error;
pub mod gateway;
pub mod session;
pub mod stage;
pub mod types;

pub use controller::{OnboardingFlow, CANDIDATE_BATCH, MIN_RATINGS};
pub use error::{FlowError, GatewayError, GatewayResult, Result, ValidationError};
pub use gateway::{AuthOutcome, AuthRequest, Gateway};
pub use session::{GenreSet, Session};
pub use stage::{AuthMode, AuthStage, Notice, PreferencesStage, RatingsStage, ResultsStage, Stage};
pub use types::{
    CandidateItem, Genre, Method, Mood, MovieId, Rating, Recommendation, RecommendationQuery,
    UserId,
};
