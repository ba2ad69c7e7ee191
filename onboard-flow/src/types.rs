use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Opaque user identifier issued by the authentication service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog identifier of a rateable movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub i64);

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed genre vocabulary shared with the backend. Wire labels are the
/// display labels, including the hyphenated `Sci-Fi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Comedy,
    Drama,
    #[serde(rename = "Sci-Fi")]
    SciFi,
    Horror,
    Thriller,
    Romance,
}

impl Genre {
    pub const ALL: [Genre; 7] = [
        Genre::Action,
        Genre::Comedy,
        Genre::Drama,
        Genre::SciFi,
        Genre::Horror,
        Genre::Thriller,
        Genre::Romance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Comedy => "Comedy",
            Genre::Drama => "Drama",
            Genre::SciFi => "Sci-Fi",
            Genre::Horror => "Horror",
            Genre::Thriller => "Thriller",
            Genre::Romance => "Romance",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Genre {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .iter()
            .copied()
            .find(|g| g.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownGenre(s.trim().to_string()))
    }
}

/// Fixed mood vocabulary captured alongside the genre selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Funny,
    Sad,
    Quirky,
    Romantic,
    Action,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Funny,
        Mood::Sad,
        Mood::Quirky,
        Mood::Romantic,
        Mood::Action,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Funny => "Funny",
            Mood::Sad => "Sad",
            Mood::Quirky => "Quirky",
            Mood::Romantic => "Romantic",
            Mood::Action => "Action",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mood {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .iter()
            .copied()
            .find(|m| m.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownMood(s.trim().to_string()))
    }
}

/// Strategy tag recognized by the recommendation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Hybrid,
    Collaborative,
    Content,
}

impl Method {
    pub fn label(&self) -> &'static str {
        match self {
            Method::Hybrid => "hybrid",
            Method::Collaborative => "collaborative",
            Method::Content => "content",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Method {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hybrid" => Ok(Method::Hybrid),
            "collaborative" => Ok(Method::Collaborative),
            "content" => Ok(Method::Content),
            other => Err(ValidationError::UnknownMethod(other.to_string())),
        }
    }
}

/// A star rating in 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (1..=5).contains(&value) {
            Ok(Rating(value))
        } else {
            Err(ValidationError::RatingOutOfRange(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog entry eligible for rating. `genre` is the backend's
/// pipe-separated label string (`"Action|Thriller"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub id: MovieId,
    pub title: String,
    pub genre: String,
    pub summary: String,
    #[serde(default)]
    pub year: Option<i32>,
}

/// One ranked entry of a recommendation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub genres: String,
    pub score: f64,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Parameters of a single recommendation query. Count is validated into
/// 1..=20 at construction, so a query in hand is always sendable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationQuery {
    count: u8,
    method: Method,
}

impl RecommendationQuery {
    pub const MIN_COUNT: u8 = 1;
    pub const MAX_COUNT: u8 = 20;

    pub fn new(count: u8, method: Method) -> Result<Self, ValidationError> {
        if (Self::MIN_COUNT..=Self::MAX_COUNT).contains(&count) {
            Ok(RecommendationQuery { count, method })
        } else {
            Err(ValidationError::CountOutOfRange(count))
        }
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn method(&self) -> Method {
        self.method
    }
}

impl Default for RecommendationQuery {
    fn default() -> Self {
        RecommendationQuery {
            count: 5,
            method: Method::Hybrid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_wire_labels_match_backend_vocabulary() {
        let labels: Vec<String> = Genre::ALL
            .iter()
            .map(|g| serde_json::to_value(g).unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            labels,
            ["Action", "Comedy", "Drama", "Sci-Fi", "Horror", "Thriller", "Romance"]
        );
    }

    #[test]
    fn genre_parses_case_insensitively() {
        assert_eq!("sci-fi".parse::<Genre>().unwrap(), Genre::SciFi);
        assert_eq!(" horror ".parse::<Genre>().unwrap(), Genre::Horror);
        assert!("Western".parse::<Genre>().is_err());
    }

    #[test]
    fn method_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Method::Hybrid).unwrap(), "hybrid");
        assert_eq!(
            serde_json::to_value(Method::Collaborative).unwrap(),
            "collaborative"
        );
        assert_eq!(serde_json::to_value(Method::Content).unwrap(), "content");
    }

    #[test]
    fn rating_rejects_out_of_range() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(3).unwrap().value(), 3);
    }

    #[test]
    fn query_count_bounds() {
        assert!(RecommendationQuery::new(0, Method::Hybrid).is_err());
        assert!(RecommendationQuery::new(21, Method::Hybrid).is_err());
        assert!(RecommendationQuery::new(20, Method::Content).is_ok());
        let q = RecommendationQuery::default();
        assert_eq!(q.count(), 5);
        assert_eq!(q.method(), Method::Hybrid);
    }

    #[test]
    fn candidate_item_deserializes_without_year() {
        let item: CandidateItem = serde_json::from_value(serde_json::json!({
            "id": 318,
            "title": "The Shawshank Redemption",
            "genre": "Crime|Drama",
            "summary": "Two imprisoned men bond over a number of years."
        }))
        .unwrap();
        assert_eq!(item.id, MovieId(318));
        assert_eq!(item.year, None);
    }
}
