pub mod auth;
pub mod cinemas;
pub mod clear;
pub mod comment;
pub mod config;
pub mod movies;
pub mod playlist;
pub mod prompts;
pub mod review;
pub mod tag;
pub mod ui;
