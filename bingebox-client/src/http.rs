//! Reqwest implementation of the backend gateway.
//!
//! Classification rules: transport errors and unparseable or otherwise
//! unclassified non-2xx statuses become `ServiceUnavailable`; a 2xx with
//! `success: false` becomes the operation's domain failure (`AuthRejected`,
//! `NoRecommendations`); the persistence endpoints report their backend
//! `message` as `PersistenceFailed`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use onboard_flow::{
    AuthOutcome, AuthRequest, CandidateItem, Gateway, GatewayError, GatewayResult, Genre,
    GenreSet, Mood, MovieId, Rating, Recommendation, RecommendationQuery, UserId,
};

pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpGateway {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Probe `/api/health`; used once at startup for a friendly failure
    /// message before the flow begins.
    pub async fn health(&self) -> GatewayResult<()> {
        let response = self
            .client
            .get(self.url("/api/health"))
            .send()
            .await
            .map_err(transport)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(GatewayError::ServiceUnavailable(format!(
                "health check returned {}",
                response.status()
            )))
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> GatewayResult<(StatusCode, R)>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(path, "posting request");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let parsed = response.json().await.map_err(transport)?;
        Ok((status, parsed))
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::ServiceUnavailable(err.to_string())
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupBody<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginReply {
    success: bool,
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Acknowledgement shape shared by signup, preferences and rate. A non-2xx
/// body carries only `message`, so `success` is optional here.
#[derive(Deserialize)]
struct AckReply {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct PreferencesBody {
    user_id: i64,
    genres: Vec<Genre>,
    mood: Mood,
}

#[derive(Serialize)]
struct CandidatesBody {
    genres: Vec<Genre>,
    n: usize,
}

#[derive(Deserialize)]
struct CandidatesReply {
    success: bool,
    #[serde(default)]
    movies: Vec<CandidateItem>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct RateBody<'a> {
    user_id: i64,
    ratings: &'a BTreeMap<MovieId, Rating>,
}

#[derive(Serialize)]
struct RecommendBody {
    user_id: i64,
    num_recommendations: u8,
    method: onboard_flow::Method,
}

#[derive(Deserialize)]
struct RecommendReply {
    success: bool,
    #[serde(default)]
    recommendations: Vec<Recommendation>,
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn authenticate(&self, request: &AuthRequest) -> GatewayResult<AuthOutcome> {
        match request {
            AuthRequest::Login { email, password } => {
                let (status, reply): (_, LoginReply) =
                    self.post("/api/login", &LoginBody { email, password }).await?;
                if !status.is_success() {
                    return Err(GatewayError::ServiceUnavailable(
                        reply
                            .message
                            .unwrap_or_else(|| format!("login request returned {status}")),
                    ));
                }
                if reply.success {
                    let user = reply.user_id.map(UserId).ok_or_else(|| {
                        GatewayError::ServiceUnavailable("login reply missing user_id".to_string())
                    })?;
                    Ok(AuthOutcome::SignedIn {
                        user,
                        username: reply.username,
                    })
                } else {
                    Err(GatewayError::AuthRejected(
                        reply
                            .message
                            .unwrap_or_else(|| "Invalid email or password".to_string()),
                    ))
                }
            }
            AuthRequest::Signup {
                username,
                email,
                password,
            } => {
                let (status, reply): (_, AckReply) = self
                    .post(
                        "/api/signup",
                        &SignupBody {
                            username,
                            email,
                            password,
                        },
                    )
                    .await?;
                if !status.is_success() {
                    return Err(GatewayError::ServiceUnavailable(
                        reply
                            .message
                            .unwrap_or_else(|| format!("signup request returned {status}")),
                    ));
                }
                if reply.success.unwrap_or(false) {
                    Ok(AuthOutcome::AccountCreated)
                } else {
                    Err(GatewayError::AuthRejected(
                        reply
                            .message
                            .unwrap_or_else(|| "Sign up failed".to_string()),
                    ))
                }
            }
        }
    }

    async fn save_preferences(
        &self,
        user: UserId,
        mood: Mood,
        genres: &GenreSet,
    ) -> GatewayResult<()> {
        let (status, reply): (_, AckReply) = self
            .post(
                "/api/preferences",
                &PreferencesBody {
                    user_id: user.0,
                    genres: genres.iter().collect(),
                    mood,
                },
            )
            .await?;
        if status.is_success() && reply.success.unwrap_or(true) {
            Ok(())
        } else {
            Err(GatewayError::PersistenceFailed(
                reply
                    .message
                    .unwrap_or_else(|| format!("preferences request returned {status}")),
            ))
        }
    }

    async fn fetch_candidates(
        &self,
        genres: &GenreSet,
        count: usize,
    ) -> GatewayResult<Vec<CandidateItem>> {
        let (status, reply): (_, CandidatesReply) = self
            .post(
                "/api/movies-by-genre",
                &CandidatesBody {
                    genres: genres.iter().collect(),
                    n: count,
                },
            )
            .await?;
        if !status.is_success() || !reply.success {
            return Err(GatewayError::ServiceUnavailable(
                reply
                    .message
                    .unwrap_or_else(|| format!("catalog request returned {status}")),
            ));
        }
        Ok(reply.movies)
    }

    async fn submit_ratings(
        &self,
        user: UserId,
        ratings: &BTreeMap<MovieId, Rating>,
    ) -> GatewayResult<()> {
        let (status, reply): (_, AckReply) = self
            .post(
                "/api/rate",
                &RateBody {
                    user_id: user.0,
                    ratings,
                },
            )
            .await?;
        if status.is_success() && reply.success.unwrap_or(true) {
            Ok(())
        } else {
            Err(GatewayError::PersistenceFailed(
                reply
                    .message
                    .unwrap_or_else(|| format!("rate request returned {status}")),
            ))
        }
    }

    async fn fetch_recommendations(
        &self,
        user: UserId,
        query: &RecommendationQuery,
    ) -> GatewayResult<Vec<Recommendation>> {
        let (status, reply): (_, RecommendReply) = self
            .post(
                "/api/recommend",
                &RecommendBody {
                    user_id: user.0,
                    num_recommendations: query.count(),
                    method: query.method(),
                },
            )
            .await?;
        if !status.is_success() {
            return Err(GatewayError::ServiceUnavailable(
                reply
                    .message
                    .unwrap_or_else(|| format!("recommendation request returned {status}")),
            ));
        }
        if reply.success {
            Ok(reply.recommendations)
        } else {
            Err(GatewayError::NoRecommendations(
                reply
                    .message
                    .unwrap_or_else(|| "No recommendations found".to_string()),
            ))
        }
    }
}
