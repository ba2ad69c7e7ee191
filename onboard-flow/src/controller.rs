use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{FlowError, Result, ValidationError};
use crate::gateway::{AuthOutcome, AuthRequest, Gateway};
use crate::session::Session;
use crate::stage::{
    AuthMode, AuthStage, Notice, PreferencesStage, RatingsStage, ResultsStage, Stage,
};
use crate::types::{CandidateItem, MovieId, Rating, Recommendation, RecommendationQuery};

/// Minimum number of ratings required before calibration can complete.
pub const MIN_RATINGS: usize = 3;

/// Default candidate batch requested from the catalog.
pub const CANDIDATE_BATCH: usize = 10;

/// The onboarding sequencer. Owns the current stage and is the only place
/// that transitions between stages or mutates session state.
///
/// Every operation follows the same guard order: stage check, in-flight
/// check, local validation, then the gateway call. Local failures never
/// reach the network, and remote failures leave the stage and all
/// user-entered data untouched so a retry needs no re-entry. Retries are
/// always user-initiated; nothing here retries on its own.
pub struct OnboardingFlow {
    session_id: Uuid,
    gateway: Arc<dyn Gateway>,
    stage: Stage,
}

impl OnboardingFlow {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let session_id = Uuid::new_v4();
        info!(%session_id, "onboarding flow started");
        OnboardingFlow {
            session_id,
            gateway,
            stage: Stage::Authenticating(AuthStage::default()),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Mutable access to the authentication form, if that stage is active.
    pub fn auth_mut(&mut self) -> Option<&mut AuthStage> {
        match &mut self.stage {
            Stage::Authenticating(stage) => Some(stage),
            _ => None,
        }
    }

    /// Mutable access to the preferences form, if that stage is active.
    pub fn preferences_mut(&mut self) -> Option<&mut PreferencesStage> {
        match &mut self.stage {
            Stage::CollectingPreferences(stage) => Some(stage),
            _ => None,
        }
    }

    pub fn ratings_stage(&self) -> Option<&RatingsStage> {
        match &self.stage {
            Stage::CalibratingRatings(stage) => Some(stage),
            _ => None,
        }
    }

    pub fn results_stage(&self) -> Option<&ResultsStage> {
        match &self.stage {
            Stage::PresentingResults(stage) => Some(stage),
            _ => None,
        }
    }

    /// Submit the credential form. On a successful login the flow advances
    /// to preference collection; a successful signup stays here, flips the
    /// form back to login mode and posts an informational notice.
    pub async fn submit_auth(&mut self) -> Result<AuthOutcome> {
        let Stage::Authenticating(auth) = &mut self.stage else {
            return Err(FlowError::WrongStage(self.stage.name()));
        };
        if auth.in_flight {
            return Err(FlowError::RequestInFlight);
        }

        let request = match auth.mode {
            AuthMode::Login => {
                if auth.email.trim().is_empty() {
                    return Err(ValidationError::MissingEmail.into());
                }
                if auth.password.is_empty() {
                    return Err(ValidationError::MissingPassword.into());
                }
                AuthRequest::Login {
                    email: auth.email.trim().to_string(),
                    password: auth.password.clone(),
                }
            }
            AuthMode::Signup => {
                if auth.username.trim().is_empty() {
                    return Err(ValidationError::MissingUsername.into());
                }
                if auth.email.trim().is_empty() {
                    return Err(ValidationError::MissingEmail.into());
                }
                if auth.password.is_empty() {
                    return Err(ValidationError::MissingPassword.into());
                }
                AuthRequest::Signup {
                    username: auth.username.trim().to_string(),
                    email: auth.email.trim().to_string(),
                    password: auth.password.clone(),
                }
            }
        };

        auth.notice = None;
        auth.in_flight = true;
        let result = self.gateway.authenticate(&request).await;
        auth.in_flight = false;

        match result {
            Ok(AuthOutcome::SignedIn { user, username }) => {
                info!(session_id = %self.session_id, %user, "authenticated");
                self.stage = Stage::CollectingPreferences(PreferencesStage::new(
                    self.session_id,
                    user,
                    username.clone(),
                ));
                Ok(AuthOutcome::SignedIn { user, username })
            }
            Ok(AuthOutcome::AccountCreated) => {
                info!(session_id = %self.session_id, "account created, switching to login");
                auth.mode = AuthMode::Login;
                auth.password.clear();
                auth.notice = Some(Notice::Info("Account created. Please sign in.".to_string()));
                Ok(AuthOutcome::AccountCreated)
            }
            Err(err) => {
                warn!(session_id = %self.session_id, error = %err, "authentication failed");
                auth.notice = Some(Notice::Error(err.message().to_string()));
                Err(err.into())
            }
        }
    }

    /// Persist mood and genre selections and advance to calibration. Both
    /// selections are required before the gateway is called; on a remote
    /// failure the selections are retained.
    pub async fn submit_preferences(&mut self) -> Result<()> {
        let Stage::CollectingPreferences(prefs) = &mut self.stage else {
            return Err(FlowError::WrongStage(self.stage.name()));
        };
        if prefs.in_flight {
            return Err(FlowError::RequestInFlight);
        }
        let mood = prefs.mood.ok_or(ValidationError::MissingMood)?;
        if prefs.genres.is_empty() {
            return Err(ValidationError::NoGenresSelected.into());
        }

        prefs.in_flight = true;
        let result = self
            .gateway
            .save_preferences(prefs.user, mood, &prefs.genres)
            .await;
        prefs.in_flight = false;

        match result {
            Ok(()) => {
                let session = Session {
                    id: prefs.session_id,
                    user: prefs.user,
                    username: prefs.username.take(),
                    genres: std::mem::take(&mut prefs.genres),
                };
                info!(
                    session_id = %self.session_id,
                    %mood,
                    genres = ?session.genres.labels(),
                    "preferences saved"
                );
                self.stage = Stage::CalibratingRatings(RatingsStage::new(session));
                Ok(())
            }
            Err(err) => {
                warn!(session_id = %self.session_id, error = %err, "saving preferences failed");
                Err(err.into())
            }
        }
    }

    /// Fetch a batch of candidates for the inherited genre filter. An empty
    /// batch is a valid loaded state. Reloading replaces the candidate set
    /// and drops any rating keyed by an item no longer present, keeping the
    /// every-key-is-a-current-candidate invariant.
    pub async fn load_candidates(&mut self, count: usize) -> Result<&[CandidateItem]> {
        // Returning a borrow of the stage keeps `self.stage` mutably
        // borrowed for the whole body, so the name is read up front.
        let stage_name = self.stage.name();
        let Stage::CalibratingRatings(stage) = &mut self.stage else {
            return Err(FlowError::WrongStage(stage_name));
        };
        if stage.in_flight {
            return Err(FlowError::RequestInFlight);
        }

        stage.in_flight = true;
        let result = self
            .gateway
            .fetch_candidates(&stage.session.genres, count)
            .await;
        stage.in_flight = false;

        match result {
            Ok(candidates) => {
                stage
                    .ratings
                    .retain(|id, _| candidates.iter().any(|c| c.id == *id));
                info!(
                    session_id = %self.session_id,
                    count = candidates.len(),
                    "candidates loaded"
                );
                stage.candidates = Some(candidates);
                Ok(stage.candidates.as_deref().unwrap_or_default())
            }
            Err(err) => {
                warn!(session_id = %self.session_id, error = %err, "loading candidates failed");
                Err(err.into())
            }
        }
    }

    /// Record a rating for a currently loaded candidate. Re-rating an item
    /// replaces the previous score.
    pub fn rate(&mut self, movie: MovieId, rating: Rating) -> Result<()> {
        let Stage::CalibratingRatings(stage) = &mut self.stage else {
            return Err(FlowError::WrongStage(self.stage.name()));
        };
        let Some(candidates) = stage.candidates.as_deref() else {
            return Err(FlowError::CandidatesNotLoaded);
        };
        if !candidates.iter().any(|c| c.id == movie) {
            return Err(ValidationError::UnknownCandidate(movie).into());
        }
        stage.ratings.insert(movie, rating);
        Ok(())
    }

    /// Submit the collected ratings and advance to results. Requires at
    /// least [`MIN_RATINGS`] entries; the map is retained on failure.
    pub async fn submit_ratings(&mut self) -> Result<()> {
        let Stage::CalibratingRatings(stage) = &mut self.stage else {
            return Err(FlowError::WrongStage(self.stage.name()));
        };
        if stage.in_flight {
            return Err(FlowError::RequestInFlight);
        }
        if stage.ratings.len() < MIN_RATINGS {
            return Err(ValidationError::NotEnoughRatings {
                have: stage.ratings.len(),
                need: MIN_RATINGS,
            }
            .into());
        }

        stage.in_flight = true;
        let result = self
            .gateway
            .submit_ratings(stage.session.user, &stage.ratings)
            .await;
        stage.in_flight = false;

        match result {
            Ok(()) => {
                let session = stage.session.clone();
                info!(
                    session_id = %self.session_id,
                    ratings = stage.ratings.len(),
                    "ratings submitted"
                );
                self.stage = Stage::PresentingResults(ResultsStage::new(session));
                Ok(())
            }
            Err(err) => {
                warn!(session_id = %self.session_id, error = %err, "submitting ratings failed");
                Err(err.into())
            }
        }
    }

    /// Run one recommendation query. Queries are independent and do not
    /// change stage; the last successful result is kept for rendering and
    /// left untouched when a query fails.
    pub async fn fetch_recommendations(
        &mut self,
        query: RecommendationQuery,
    ) -> Result<&[Recommendation]> {
        let stage_name = self.stage.name();
        let Stage::PresentingResults(stage) = &mut self.stage else {
            return Err(FlowError::WrongStage(stage_name));
        };
        if stage.in_flight {
            return Err(FlowError::RequestInFlight);
        }

        stage.in_flight = true;
        let result = self
            .gateway
            .fetch_recommendations(stage.session.user, &query)
            .await;
        stage.in_flight = false;

        match result {
            Ok(results) => {
                info!(
                    session_id = %self.session_id,
                    count = results.len(),
                    method = %query.method(),
                    "recommendations fetched"
                );
                stage.results = results;
                Ok(stage.results.as_slice())
            }
            Err(err) => {
                warn!(session_id = %self.session_id, error = %err, "recommendation query failed");
                Err(err.into())
            }
        }
    }
}
