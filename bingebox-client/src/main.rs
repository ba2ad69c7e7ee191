use std::io::{self, Write};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use bingebox_client::http::HttpGateway;
use onboard_flow::{
    AuthMode, AuthOutcome, FlowError, Genre, GenreSet, Method, Mood, MovieId, Notice,
    OnboardingFlow, Rating, RecommendationQuery, Stage, CANDIDATE_BATCH, MIN_RATINGS,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the prompts.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .compact()
        .init();

    let base_url =
        std::env::var("BINGEBOX_API_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let gateway = Arc::new(HttpGateway::new(base_url.clone()));

    println!("BingeBox — movie night, sorted.");
    if let Err(err) = gateway.health().await {
        println!("The backend at {base_url} is not reachable ({}).", err.message());
        println!("Start it and try again, or point BINGEBOX_API_URL elsewhere.");
        return Ok(());
    }

    let mut flow = OnboardingFlow::new(gateway);
    loop {
        match flow.stage() {
            Stage::Authenticating(_) => run_auth_stage(&mut flow).await?,
            Stage::CollectingPreferences(_) => run_preferences_stage(&mut flow).await?,
            Stage::CalibratingRatings(_) => run_ratings_stage(&mut flow).await?,
            Stage::PresentingResults(_) => {
                if !run_results_stage(&mut flow).await? {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn show_error(err: &FlowError) {
    match err {
        FlowError::Gateway(gateway_err) => println!("  ! {}", gateway_err.message()),
        other => println!("  ! {other}"),
    }
}

async fn run_auth_stage(flow: &mut OnboardingFlow) -> anyhow::Result<()> {
    let Some(auth) = flow.auth_mut() else {
        return Ok(());
    };
    match auth.notice() {
        Some(Notice::Info(msg)) => println!("  * {msg}"),
        Some(Notice::Error(msg)) => println!("  ! {msg}"),
        None => {}
    }

    println!();
    let choice = prompt("Sign in or create an account? [s]ign-in / [c]reate: ")?;
    auth.mode = match choice.as_str() {
        "c" | "create" | "signup" => AuthMode::Signup,
        _ => AuthMode::Login,
    };
    if auth.mode == AuthMode::Signup {
        auth.username = prompt("Username: ")?;
    }
    auth.email = prompt("Email: ")?;
    auth.password = prompt("Password: ")?;

    println!("Contacting BingeBox...");
    match flow.submit_auth().await {
        Ok(AuthOutcome::SignedIn { username, .. }) => match username {
            Some(name) => println!("Welcome back, {name}."),
            None => println!("Welcome back."),
        },
        // The confirmation notice is rendered on the next pass.
        Ok(AuthOutcome::AccountCreated) => {}
        Err(err) => show_error(&err),
    }
    Ok(())
}

async fn run_preferences_stage(flow: &mut OnboardingFlow) -> anyhow::Result<()> {
    let Some(prefs) = flow.preferences_mut() else {
        return Ok(());
    };
    println!();
    if let Some(name) = prefs.username() {
        println!("Hi {name}, let's set up your taste profile.");
    }

    let moods: Vec<&str> = Mood::ALL.iter().map(|m| m.label()).collect();
    println!("Moods: {}", moods.join(", "));
    let mood_line = prompt("How are you feeling today? ")?;
    match mood_line.parse::<Mood>() {
        Ok(mood) => prefs.mood = Some(mood),
        Err(err) => {
            println!("  ! {err}");
            return Ok(());
        }
    }

    let genres: Vec<&str> = Genre::ALL.iter().map(|g| g.label()).collect();
    println!("Genres: {}", genres.join(", "));
    let kept = prefs.genres.labels().join(", ");
    let genre_line = prompt(&format!("Favorite genres, comma-separated [{kept}]: "))?;
    if !genre_line.is_empty() {
        let mut selection = GenreSet::new();
        for part in genre_line.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.parse::<Genre>() {
                Ok(genre) => selection.toggle(genre),
                Err(err) => {
                    println!("  ! {err}");
                    return Ok(());
                }
            }
        }
        prefs.genres = selection;
    }

    println!("Saving preferences...");
    match flow.submit_preferences().await {
        Ok(()) => println!("Preferences saved."),
        Err(err) => {
            show_error(&err);
            println!("  (your selections are kept, just try again)");
        }
    }
    Ok(())
}

async fn run_ratings_stage(flow: &mut OnboardingFlow) -> anyhow::Result<()> {
    let needs_load = flow
        .ratings_stage()
        .map(|s| s.candidates().is_none())
        .unwrap_or(false);
    if needs_load {
        println!("Loading movies...");
        if let Err(err) = flow.load_candidates(CANDIDATE_BATCH).await {
            show_error(&err);
            return Ok(());
        }
    }

    let Some(stage) = flow.ratings_stage() else {
        return Ok(());
    };
    let Some(candidates) = stage.candidates() else {
        return Ok(());
    };

    println!();
    if candidates.is_empty() {
        println!("No movies matched your genres. Try 'more' for a fresh batch.");
    } else {
        println!(
            "Rate at least {MIN_RATINGS} movies to tune your recommendations ({} rated so far):",
            stage.rating_count()
        );
        for (i, movie) in candidates.iter().enumerate() {
            let year = movie.year.map(|y| format!(" ({y})")).unwrap_or_default();
            let stars = stage
                .ratings()
                .get(&movie.id)
                .map(|r| format!("  [{r}/5]"))
                .unwrap_or_default();
            println!("  {:2}. {}{year}{stars}", i + 1, movie.title);
            println!("      {} — {}", movie.genre.replace('|', ", "), movie.summary);
        }
    }

    let line = prompt("Rate as '<number> <1-5>', 'more' for a new batch, 'done' to finish: ")?;
    match line.as_str() {
        "done" => {
            println!("Submitting ratings...");
            match flow.submit_ratings().await {
                Ok(()) => println!("Taste profile saved."),
                Err(err) => show_error(&err),
            }
        }
        "more" => {
            println!("Loading movies...");
            if let Err(err) = flow.load_candidates(CANDIDATE_BATCH).await {
                show_error(&err);
            }
        }
        "" => {}
        _ => {
            let mut parts = line.split_whitespace();
            let (Some(index), Some(score)) = (parts.next(), parts.next()) else {
                println!("  ! enter a movie number and a score, e.g. '2 5'");
                return Ok(());
            };
            let (Ok(index), Ok(score)) = (index.parse::<usize>(), score.parse::<u8>()) else {
                println!("  ! enter a movie number and a score, e.g. '2 5'");
                return Ok(());
            };
            let id = flow
                .ratings_stage()
                .and_then(|s| s.candidates())
                .and_then(|c| c.get(index.wrapping_sub(1)))
                .map(|movie| movie.id);
            match id {
                Some(id) => rate_one(flow, id, score),
                None => println!("  ! no movie numbered {index}"),
            }
        }
    }
    Ok(())
}

fn rate_one(flow: &mut OnboardingFlow, id: MovieId, score: u8) {
    let result = Rating::new(score)
        .map_err(FlowError::from)
        .and_then(|rating| flow.rate(id, rating));
    if let Err(err) = result {
        show_error(&err);
    }
}

async fn run_results_stage(flow: &mut OnboardingFlow) -> anyhow::Result<bool> {
    println!();
    let count_line = prompt("How many picks? [1-20, enter for 5, 'q' to quit]: ")?;
    if count_line == "q" || count_line == "quit" {
        println!("Happy bingeing!");
        return Ok(false);
    }
    let count: u8 = if count_line.is_empty() {
        5
    } else {
        match count_line.parse() {
            Ok(n) => n,
            Err(_) => {
                println!("  ! enter a number between 1 and 20");
                return Ok(true);
            }
        }
    };
    let method_line = prompt("Method [hybrid/collaborative/content, enter for hybrid]: ")?;
    let method = if method_line.is_empty() {
        Method::Hybrid
    } else {
        match method_line.parse::<Method>() {
            Ok(m) => m,
            Err(err) => {
                println!("  ! {err}");
                return Ok(true);
            }
        }
    };
    let query = match RecommendationQuery::new(count, method) {
        Ok(q) => q,
        Err(err) => {
            println!("  ! {err}");
            return Ok(true);
        }
    };

    println!("Crunching the numbers...");
    match flow.fetch_recommendations(query).await {
        Ok(results) if results.is_empty() => println!("Nothing to recommend yet."),
        Ok(results) => {
            for (i, rec) in results.iter().enumerate() {
                let year = rec.year.map(|y| format!(" ({y})")).unwrap_or_default();
                println!(
                    "  {:2}. {}{year}  [{:.2}]  {}",
                    i + 1,
                    rec.title,
                    rec.score,
                    rec.genres.replace('|', ", ")
                );
            }
        }
        Err(err) => show_error(&err),
    }
    Ok(true)
}
