//! Wire-contract tests: the gateway runs against an in-process HTTP
//! backend that mimics the production API shapes. Handlers reply with a
//! failure body when the request payload is not what the contract
//! requires, so a passing call also asserts the outgoing JSON.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use bingebox_client::http::HttpGateway;
use onboard_flow::{
    AuthOutcome, AuthRequest, Gateway, GatewayError, Genre, GenreSet, Method, Mood, MovieId,
    Rating, RecommendationQuery, UserId,
};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn login_request() -> AuthRequest {
    AuthRequest::Login {
        email: "casey@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

#[tokio::test]
async fn login_success_maps_to_signed_in() {
    let app = Router::new().route(
        "/api/login",
        post(|Json(body): Json<Value>| async move {
            if body["email"] != "casey@example.com" || body["password"] != "hunter2" {
                return Json(json!({"success": false, "message": "wrong payload"}));
            }
            Json(json!({"success": true, "user_id": 42, "username": "casey"}))
        }),
    );
    let gateway = HttpGateway::new(serve(app).await);

    let outcome = gateway.authenticate(&login_request()).await.unwrap();
    assert_eq!(
        outcome,
        AuthOutcome::SignedIn {
            user: UserId(42),
            username: Some("casey".to_string()),
        }
    );
}

#[tokio::test]
async fn login_rejection_carries_backend_message_verbatim() {
    let app = Router::new().route(
        "/api/login",
        post(|| async { Json(json!({"success": false, "message": "Invalid email or password"})) }),
    );
    let gateway = HttpGateway::new(serve(app).await);

    let err = gateway.authenticate(&login_request()).await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::AuthRejected("Invalid email or password".to_string())
    );
}

#[tokio::test]
async fn signup_maps_duplicate_email_and_success() {
    let app = Router::new().route(
        "/api/signup",
        post(|Json(body): Json<Value>| async move {
            if body["email"] == "taken@example.com" {
                Json(json!({"success": false, "message": "Email already exists"}))
            } else {
                Json(json!({"success": true, "message": "Account created successfully"}))
            }
        }),
    );
    let gateway = HttpGateway::new(serve(app).await);

    let err = gateway
        .authenticate(&AuthRequest::Signup {
            username: "casey".to_string(),
            email: "taken@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, GatewayError::AuthRejected("Email already exists".to_string()));

    let outcome = gateway
        .authenticate(&AuthRequest::Signup {
            username: "casey".to_string(),
            email: "casey@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(outcome, AuthOutcome::AccountCreated);
}

#[tokio::test]
async fn preferences_payload_matches_wire_contract() {
    let app = Router::new().route(
        "/api/preferences",
        post(|Json(body): Json<Value>| async move {
            let ok = body["user_id"] == 42
                && body["mood"] == "Quirky"
                && body["genres"] == json!(["Sci-Fi", "Horror"]);
            if ok {
                Json(json!({"success": true, "message": "Preferences saved"}))
            } else {
                Json(json!({"success": false, "message": "wrong payload"}))
            }
        }),
    );
    let gateway = HttpGateway::new(serve(app).await);

    let genres: GenreSet = [Genre::Horror, Genre::SciFi].into_iter().collect();
    gateway
        .save_preferences(UserId(42), Mood::Quirky, &genres)
        .await
        .unwrap();
}

#[tokio::test]
async fn preferences_non_2xx_maps_to_persistence_failed() {
    let app = Router::new().route(
        "/api/preferences",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"message": "relation preferences does not exist"})),
            )
        }),
    );
    let gateway = HttpGateway::new(serve(app).await);

    let err = gateway
        .save_preferences(UserId(42), Mood::Happy, &[Genre::Drama].into_iter().collect())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::PersistenceFailed("relation preferences does not exist".to_string())
    );
}

#[tokio::test]
async fn empty_candidate_list_is_success() {
    let app = Router::new().route(
        "/api/movies-by-genre",
        post(|Json(body): Json<Value>| async move {
            if body["genres"] == json!(["Horror"]) && body["n"] == 10 {
                Json(json!({"success": true, "movies": []}))
            } else {
                Json(json!({"success": false, "message": "wrong payload"}))
            }
        }),
    );
    let gateway = HttpGateway::new(serve(app).await);

    let genres: GenreSet = [Genre::Horror].into_iter().collect();
    let movies = gateway.fetch_candidates(&genres, 10).await.unwrap();
    assert!(movies.is_empty());
}

#[tokio::test]
async fn candidates_parse_with_and_without_year() {
    let app = Router::new().route(
        "/api/movies-by-genre",
        post(|| async {
            Json(json!({
                "success": true,
                "movies": [
                    {"id": 1, "title": "Heat", "genre": "Action|Crime", "summary": "A heist unravels.", "year": 1995},
                    {"id": 2, "title": "Alien", "genre": "Horror|Sci-Fi", "summary": "In space no one can hear you scream."}
                ]
            }))
        }),
    );
    let gateway = HttpGateway::new(serve(app).await);

    let genres: GenreSet = [Genre::Action].into_iter().collect();
    let movies = gateway.fetch_candidates(&genres, 10).await.unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].id, MovieId(1));
    assert_eq!(movies[0].year, Some(1995));
    assert_eq!(movies[1].year, None);
}

#[tokio::test]
async fn ratings_serialize_as_string_keyed_map() {
    let app = Router::new().route(
        "/api/rate",
        post(|Json(body): Json<Value>| async move {
            let ok = body["user_id"] == 42
                && body["ratings"] == json!({"1": 5, "2": 3, "7": 4});
            if ok {
                Json(json!({"success": true, "message": "Ratings saved"}))
            } else {
                Json(json!({"success": false, "message": "wrong payload"}))
            }
        }),
    );
    let gateway = HttpGateway::new(serve(app).await);

    let mut ratings = BTreeMap::new();
    ratings.insert(MovieId(1), Rating::new(5).unwrap());
    ratings.insert(MovieId(2), Rating::new(3).unwrap());
    ratings.insert(MovieId(7), Rating::new(4).unwrap());
    gateway.submit_ratings(UserId(42), &ratings).await.unwrap();
}

#[tokio::test]
async fn rate_failure_maps_to_persistence_failed() {
    let app = Router::new().route(
        "/api/rate",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "message": "deadlock detected"})),
            )
        }),
    );
    let gateway = HttpGateway::new(serve(app).await);

    let mut ratings = BTreeMap::new();
    ratings.insert(MovieId(1), Rating::new(5).unwrap());
    let err = gateway.submit_ratings(UserId(42), &ratings).await.unwrap_err();
    assert_eq!(err, GatewayError::PersistenceFailed("deadlock detected".to_string()));
}

#[tokio::test]
async fn recommendations_echo_user_and_preserve_order() {
    let app = Router::new().route(
        "/api/recommend",
        post(|Json(body): Json<Value>| async move {
            let ok = body["user_id"] == 42
                && body["num_recommendations"] == 5
                && body["method"] == "hybrid";
            if !ok {
                return Json(json!({"success": false, "message": "wrong payload"}));
            }
            Json(json!({
                "success": true,
                "recommendations": [
                    {"title": "Arrival", "genres": "Drama|Sci-Fi", "score": 0.91, "year": 2016},
                    {"title": "Blade Runner 2049", "genres": "Sci-Fi|Thriller", "score": 0.88, "year": 2017},
                    {"title": "Interstellar", "genres": "Adventure|Sci-Fi", "score": 0.83, "year": 2014},
                    {"title": "Edge of Tomorrow", "genres": "Action|Sci-Fi", "score": 0.79, "year": 2014},
                    {"title": "Looper", "genres": "Action|Sci-Fi", "score": 0.74, "year": 2012}
                ]
            }))
        }),
    );
    let gateway = HttpGateway::new(serve(app).await);

    let query = RecommendationQuery::new(5, Method::Hybrid).unwrap();
    let results = gateway.fetch_recommendations(UserId(42), &query).await.unwrap();
    let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        [
            "Arrival",
            "Blade Runner 2049",
            "Interstellar",
            "Edge of Tomorrow",
            "Looper"
        ]
    );
}

#[tokio::test]
async fn recommend_success_false_maps_to_no_recommendations() {
    let app = Router::new().route(
        "/api/recommend",
        post(|| async { Json(json!({"success": false, "message": "No recommendations found"})) }),
    );
    let gateway = HttpGateway::new(serve(app).await);

    let err = gateway
        .fetch_recommendations(UserId(42), &RecommendationQuery::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::NoRecommendations("No recommendations found".to_string())
    );
}

#[tokio::test]
async fn unreachable_backend_is_service_unavailable() {
    // Port 9 (discard) is not listening.
    let gateway = HttpGateway::new("http://127.0.0.1:9");

    let err = gateway.authenticate(&login_request()).await.unwrap_err();
    assert!(matches!(err, GatewayError::ServiceUnavailable(_)));
}
