use cinetrack_models::{Movie, ReviewStatus};
use std::fmt;
use std::str::FromStr;

/// Where a movie came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    External,
    Tmdb,
}

impl FromStr for Provenance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "external" | "mine" | "manual" => Ok(Provenance::External),
            "tmdb" | "catalog" => Ok(Provenance::Tmdb),
            other => Err(format!("Invalid source: {}. Use 'external' or 'tmdb'", other)),
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::External => write!(f, "external"),
            Provenance::Tmdb => write!(f, "tmdb"),
        }
    }
}

/// Client-side filter over an already loaded list. Every criterion that is
/// set must match; text criteria are case-insensitive substrings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    pub title: Option<String>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub release_year: Option<String>,
    pub status: Option<ReviewStatus>,
    pub provenance: Option<Provenance>,
}

fn contains_ci(haystack: &str, needle: &Option<String>) -> bool {
    match needle.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}

impl MovieFilter {
    pub fn is_empty(&self) -> bool {
        *self == MovieFilter::default()
    }

    pub fn matches(&self, movie: &Movie) -> bool {
        if !contains_ci(&movie.title, &self.title)
            || !contains_ci(&movie.director, &self.director)
            || !contains_ci(&movie.genre, &self.genre)
        {
            return false;
        }

        if let Some(year) = self.release_year.as_deref().map(str::trim) {
            if !year.is_empty() && movie.release_year != year {
                return false;
            }
        }

        if let Some(status) = self.status {
            if movie.status != Some(status) {
                return false;
            }
        }

        match self.provenance {
            Some(Provenance::External) => movie.is_external,
            Some(Provenance::Tmdb) => movie.is_tmdb,
            None => true,
        }
    }

    pub fn apply(&self, movies: Vec<Movie>) -> Vec<Movie> {
        if self.is_empty() {
            return movies;
        }
        movies.into_iter().filter(|m| self.matches(m)).collect()
    }
}
