use serde::{Deserialize, Serialize};
use crate::status::ReviewStatus;

/// Prefix carried by ids of movies entered manually by the user.
///
/// Anything without this prefix is treated as a catalog (TMDB) id.
pub const EXTERNAL_ID_PREFIX: &str = "external-";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub release_year: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub synopsis: String,
    /// Derived from the viewer's own review, never persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub is_tmdb: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>, // IMDb id from the catalog details, or user-supplied
}

impl Movie {
    pub fn is_external_id(id: &str) -> bool {
        id.starts_with(EXTERNAL_ID_PREFIX)
    }

    /// Build a user-owned movie from a draft and an already-prefixed id
    pub fn from_draft(id: String, draft: MovieDraft) -> Self {
        Self {
            id,
            title: draft.title,
            poster_url: draft.poster_url,
            release_year: draft.release_year,
            director: draft.director,
            duration: draft.duration,
            genre: draft.genre,
            synopsis: draft.synopsis,
            status: None,
            is_external: true,
            is_tmdb: false,
            external_id: draft.external_id,
        }
    }

    pub fn with_status(mut self, status: Option<ReviewStatus>) -> Self {
        self.status = status;
        self
    }

    /// Document body as written to the store: no derived status, no id field
    pub fn to_document(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(Movie { status: None, ..self.clone() })
            .unwrap_or(serde_json::Value::Null);
        if let Some(map) = value.as_object_mut() {
            map.remove("id");
        }
        value
    }
}

/// User input for a manually entered movie
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieDraft {
    pub title: String,
    pub poster_url: Option<String>,
    pub release_year: String,
    pub director: String,
    pub duration: String,
    pub genre: String,
    pub synopsis: String,
    pub external_id: Option<String>,
}

/// Partial edit of an external movie. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub poster_url: Option<Option<String>>,
    pub release_year: Option<String>,
    pub director: Option<String>,
    pub duration: Option<String>,
    pub genre: Option<String>,
    pub synopsis: Option<String>,
}

impl MoviePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.poster_url.is_none()
            && self.release_year.is_none()
            && self.director.is_none()
            && self.duration.is_none()
            && self.genre.is_none()
            && self.synopsis.is_none()
    }

    pub fn apply(&self, movie: &mut Movie) {
        if let Some(ref title) = self.title {
            movie.title = title.clone();
        }
        if let Some(ref poster_url) = self.poster_url {
            movie.poster_url = poster_url.clone();
        }
        if let Some(ref year) = self.release_year {
            movie.release_year = year.clone();
        }
        if let Some(ref director) = self.director {
            movie.director = director.clone();
        }
        if let Some(ref duration) = self.duration {
            movie.duration = duration.clone();
        }
        if let Some(ref genre) = self.genre {
            movie.genre = genre.clone();
        }
        if let Some(ref synopsis) = self.synopsis {
            movie.synopsis = synopsis.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> MovieDraft {
        MovieDraft {
            title: "X".to_string(),
            release_year: "2020".to_string(),
            director: "Someone".to_string(),
            ..MovieDraft::default()
        }
    }

    #[test]
    fn test_external_id_prefix() {
        assert!(Movie::is_external_id("external-abc"));
        assert!(!Movie::is_external_id("550"));
    }

    #[test]
    fn test_to_document_strips_status_and_id() {
        let movie = Movie::from_draft("external-1".to_string(), draft())
            .with_status(Some(ReviewStatus::Like));
        let doc = movie.to_document();
        assert!(doc.get("status").is_none());
        assert!(doc.get("id").is_none());
        assert_eq!(doc["isExternal"], true);
        assert_eq!(doc["releaseYear"], "2020");
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut movie = Movie::from_draft("external-1".to_string(), draft());
        let patch = MoviePatch {
            title: Some("Y".to_string()),
            poster_url: Some(Some("https://img/p.jpg".to_string())),
            ..MoviePatch::default()
        };
        patch.apply(&mut movie);
        assert_eq!(movie.title, "Y");
        assert_eq!(movie.poster_url.as_deref(), Some("https://img/p.jpg"));
        assert_eq!(movie.director, "Someone");
        assert!(MoviePatch::default().is_empty());
    }

    #[test]
    fn test_deserialize_ignores_unknown_fields_and_defaults() {
        let movie: Movie = serde_json::from_str(r#"{"id":"1","title":"T","userId":"u"}"#).unwrap();
        assert_eq!(movie.title, "T");
        assert!(!movie.is_external);
        assert_eq!(movie.status, None);
    }
}
