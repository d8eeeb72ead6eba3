pub mod comment;
pub mod movie;
pub mod playlist;
pub mod profile;
pub mod review;
pub mod status;
pub mod tag;

pub use comment::Comment;
pub use movie::{Movie, MovieDraft, MoviePatch, EXTERNAL_ID_PREFIX};
pub use playlist::{Playlist, PlaylistPatch};
pub use profile::UserProfile;
pub use review::{Review, ReviewType};
pub use status::ReviewStatus;
pub use tag::{Answer, Tag, TagUpdate, WatchStatus};
