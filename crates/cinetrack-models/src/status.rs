use serde::{Deserialize, Serialize};
use crate::review::ReviewType;

/// Status code shown next to a movie for the viewer's own review
///
/// The wire codes are the ones the mobile screens switch their icons on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReviewStatus {
    #[serde(rename = "like2")]
    Like,
    #[serde(rename = "dislike2")]
    Dislike,
    #[serde(rename = "staro")]
    Favorite,
}

impl ReviewStatus {
    pub fn code(&self) -> &'static str {
        match self {
            ReviewStatus::Like => "like2",
            ReviewStatus::Dislike => "dislike2",
            ReviewStatus::Favorite => "staro",
        }
    }
}

impl From<ReviewType> for ReviewStatus {
    fn from(review_type: ReviewType) -> Self {
        match review_type {
            ReviewType::Like => ReviewStatus::Like,
            ReviewType::Dislike => ReviewStatus::Dislike,
            ReviewType::Favorite => ReviewStatus::Favorite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_type_maps_to_status_code() {
        assert_eq!(ReviewStatus::from(ReviewType::Like).code(), "like2");
        assert_eq!(ReviewStatus::from(ReviewType::Dislike).code(), "dislike2");
        assert_eq!(ReviewStatus::from(ReviewType::Favorite).code(), "staro");
    }

    #[test]
    fn test_status_serializes_as_code() {
        let json = serde_json::to_string(&ReviewStatus::Favorite).unwrap();
        assert_eq!(json, "\"staro\"");
    }
}
