use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::GatewayResult;
use crate::session::GenreSet;
use crate::types::{CandidateItem, Mood, MovieId, Rating, Recommendation, RecommendationQuery, UserId};

/// Credentials submitted from the authentication stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    Login {
        email: String,
        password: String,
    },
    Signup {
        username: String,
        email: String,
        password: String,
    },
}

/// Outcome of a successful authenticate call.
///
/// A successful signup does not sign the user in; the backend expects a
/// follow-up login. Keeping the two outcomes distinct gives the signup
/// confirmation its own channel instead of riding on the error path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    SignedIn {
        user: UserId,
        username: Option<String>,
    },
    AccountCreated,
}

/// The five remote operations the onboarding flow depends on.
///
/// Each call is a single request/response: the caller suspends until one
/// outcome is available, and no call is cancelled once issued. Transport
/// is an implementation concern of the gateway; the flow only sees this
/// contract.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn authenticate(&self, request: &AuthRequest) -> GatewayResult<AuthOutcome>;

    async fn save_preferences(
        &self,
        user: UserId,
        mood: Mood,
        genres: &GenreSet,
    ) -> GatewayResult<()>;

    /// Empty results are a valid outcome, not a failure.
    async fn fetch_candidates(
        &self,
        genres: &GenreSet,
        count: usize,
    ) -> GatewayResult<Vec<CandidateItem>>;

    async fn submit_ratings(
        &self,
        user: UserId,
        ratings: &BTreeMap<MovieId, Rating>,
    ) -> GatewayResult<()>;

    async fn fetch_recommendations(
        &self,
        user: UserId,
        query: &RecommendationQuery,
    ) -> GatewayResult<Vec<Recommendation>>;
}
