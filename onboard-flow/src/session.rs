use std::collections::BTreeSet;

use uuid::Uuid;

use crate::types::{Genre, UserId};

/// The user's genre filter. Set semantics: toggling a selected genre
/// deselects it, duplicates are impossible by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreSet(BTreeSet<Genre>);

impl GenreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, genre: Genre) {
        if !self.0.insert(genre) {
            self.0.remove(&genre);
        }
    }

    pub fn contains(&self, genre: Genre) -> bool {
        self.0.contains(&genre)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Genre> + '_ {
        self.0.iter().copied()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.0.iter().map(|g| g.label()).collect()
    }
}

impl FromIterator<Genre> for GenreSet {
    fn from_iter<I: IntoIterator<Item = Genre>>(iter: I) -> Self {
        GenreSet(iter.into_iter().collect())
    }
}

/// State that outlives a single stage: the authenticated user and the
/// genre filter carried from preference collection into calibration and
/// results. Everything else is stage-local. The id is a client-side
/// correlation id used only for logging.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user: UserId,
    pub username: Option<String>,
    pub genres: GenreSet,
}
