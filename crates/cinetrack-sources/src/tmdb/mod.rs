pub mod api;
pub mod client;
pub mod genres;

pub use client::TmdbClient;
