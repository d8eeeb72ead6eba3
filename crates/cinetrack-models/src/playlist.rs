use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named, ordered collection of movie ids owned by one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub movie_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    pub fn contains(&self, movie_id: &str) -> bool {
        self.movie_ids.iter().any(|id| id == movie_id)
    }

    pub fn to_document(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(map) = value.as_object_mut() {
            map.remove("id");
        }
        value
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub cover_url: Option<Option<String>>,
}

impl PlaylistPatch {
    pub fn apply(&self, playlist: &mut Playlist) {
        if let Some(ref name) = self.name {
            playlist.name = name.clone();
        }
        if let Some(ref description) = self.description {
            playlist.description = description.clone();
        }
        if let Some(ref cover_url) = self.cover_url {
            playlist.cover_url = cover_url.clone();
        }
    }
}
