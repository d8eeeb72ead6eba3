use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Viewing-status classification of a movie, kept apart from the review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub user_id: String,
    pub movie_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched: Option<WatchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewatch: Option<Answer>,
}

impl Tag {
    pub fn new(id: String, user_id: String, movie_id: String) -> Self {
        Self {
            id,
            user_id,
            movie_id,
            watched: None,
            interest: None,
            rewatch: None,
        }
    }

    pub fn to_document(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(map) = value.as_object_mut() {
            map.remove("id");
        }
        value
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WatchStatus {
    #[serde(rename = "assistido")]
    Watched,
    /// Watched a long time ago
    #[serde(rename = "assistido_old")]
    WatchedLongAgo,
    #[serde(rename = "drop")]
    Dropped,
    #[serde(rename = "nao_assistido")]
    NotWatched,
}

impl WatchStatus {
    pub fn code(&self) -> &'static str {
        match self {
            WatchStatus::Watched => "assistido",
            WatchStatus::WatchedLongAgo => "assistido_old",
            WatchStatus::Dropped => "drop",
            WatchStatus::NotWatched => "nao_assistido",
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for WatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "assistido" | "watched" => Ok(WatchStatus::Watched),
            "assistido_old" | "watched-long-ago" => Ok(WatchStatus::WatchedLongAgo),
            "drop" | "dropped" => Ok(WatchStatus::Dropped),
            "nao_assistido" | "not-watched" => Ok(WatchStatus::NotWatched),
            other => Err(format!("Invalid watch status: {}", other)),
        }
    }
}

/// Yes/no answer stored with the Portuguese codes `sim`/`nao`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Answer {
    #[serde(rename = "sim")]
    Yes,
    #[serde(rename = "nao")]
    No,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Yes => write!(f, "sim"),
            Answer::No => write!(f, "nao"),
        }
    }
}

impl FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sim" | "yes" | "y" | "true" => Ok(Answer::Yes),
            "nao" | "não" | "no" | "n" | "false" => Ok(Answer::No),
            other => Err(format!("Invalid answer: {}. Use 'yes' or 'no'", other)),
        }
    }
}

/// Fields to overwrite on a tag; `None` keeps the stored value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TagUpdate {
    pub watched: Option<WatchStatus>,
    pub interest: Option<Answer>,
    pub rewatch: Option<Answer>,
}

impl TagUpdate {
    pub fn is_empty(&self) -> bool {
        self.watched.is_none() && self.interest.is_none() && self.rewatch.is_none()
    }

    pub fn apply(&self, tag: &mut Tag) {
        if let Some(watched) = self.watched {
            tag.watched = Some(watched);
        }
        if let Some(interest) = self.interest {
            tag.interest = Some(interest);
        }
        if let Some(rewatch) = self.rewatch {
            tag.rewatch = Some(rewatch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_merges_fields() {
        let mut tag = Tag::new("t1".to_string(), "u1".to_string(), "550".to_string());
        TagUpdate { watched: Some(WatchStatus::Watched), ..TagUpdate::default() }.apply(&mut tag);
        TagUpdate { rewatch: Some(Answer::Yes), ..TagUpdate::default() }.apply(&mut tag);
        assert_eq!(tag.watched, Some(WatchStatus::Watched));
        assert_eq!(tag.rewatch, Some(Answer::Yes));
        assert_eq!(tag.interest, None);
    }

    #[test]
    fn test_codes_round_trip_through_serde() {
        let tag = Tag {
            watched: Some(WatchStatus::WatchedLongAgo),
            interest: Some(Answer::No),
            ..Tag::new("t1".to_string(), "u1".to_string(), "550".to_string())
        };
        let doc = tag.to_document();
        assert_eq!(doc["watched"], "assistido_old");
        assert_eq!(doc["interest"], "nao");
        assert!(doc.get("rewatch").is_none());
    }

    #[test]
    fn test_parse_accepts_english_aliases() {
        assert_eq!("dropped".parse::<WatchStatus>().unwrap(), WatchStatus::Dropped);
        assert_eq!("yes".parse::<Answer>().unwrap(), Answer::Yes);
        assert!("maybe".parse::<Answer>().is_err());
    }
}
