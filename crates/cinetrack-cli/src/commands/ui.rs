use crate::output::Output;
use cinetrack_models::{Movie, ReviewStatus};
use comfy_table::{presets, modifiers, Attribute, Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

/// Run `future` behind a spinner when a human is watching
pub async fn with_spinner<F, T>(output: &Output, message: &str, future: F) -> T
where
    F: Future<Output = T>,
{
    if !output.is_human() || output.is_quiet() || !is_interactive() {
        tracing::info!(operation = "progress", message = %message, "Working");
        return future.await;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = future.await;
    spinner.finish_and_clear();
    result
}

pub fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table
}

pub fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|t| Cell::new(t).fg(Color::Cyan).add_attribute(Attribute::Bold))
        .collect()
}

pub fn status_cell(status: Option<ReviewStatus>) -> Cell {
    match status {
        Some(ReviewStatus::Like) => Cell::new("👍 like").fg(Color::Green),
        Some(ReviewStatus::Dislike) => Cell::new("👎 dislike").fg(Color::Red),
        Some(ReviewStatus::Favorite) => Cell::new("★ favorite").fg(Color::Yellow),
        None => Cell::new("-").fg(Color::DarkGrey),
    }
}

pub fn source_label(movie: &Movie) -> &'static str {
    if movie.is_external {
        "mine"
    } else if movie.is_tmdb {
        "tmdb"
    } else {
        "-"
    }
}

pub fn movie_table(movies: &[Movie]) -> Table {
    let mut table = new_table();
    table.set_header(header(&["ID", "Title", "Year", "Genre", "Source", "Status"]));
    for movie in movies {
        table.add_row(vec![
            Cell::new(&movie.id),
            Cell::new(&movie.title).add_attribute(Attribute::Bold),
            Cell::new(&movie.release_year),
            Cell::new(&movie.genre),
            Cell::new(source_label(movie)),
            status_cell(movie.status),
        ]);
    }
    table
}

pub fn movie_detail(movie: &Movie) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new(&movie.title).fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    let rows: [(&str, String); 8] = [
        ("ID", movie.id.clone()),
        ("Year", movie.release_year.clone()),
        ("Director", movie.director.clone()),
        ("Duration", movie.duration.clone()),
        ("Genre", movie.genre.clone()),
        ("Source", source_label(movie).to_string()),
        ("Poster", movie.poster_url.clone().unwrap_or_default()),
        ("Synopsis", movie.synopsis.clone()),
    ];
    for (label, value) in rows {
        if !value.is_empty() {
            table.add_row(vec![Cell::new(label), Cell::new(value)]);
        }
    }
    table.add_row(vec![Cell::new("Status"), status_cell(movie.status)]);
    table
}

/// Mask a secret for display, keeping two characters at each end
pub fn mask_string(s: &str) -> String {
    if s.is_empty() || s.starts_with("YOUR_") {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("YOUR_TMDB_TOKEN"), "<not set>");
        assert_eq!(mask_string("abcd"), "****");
        assert_eq!(mask_string("eyJhbGciOi"), "ey***Oi");
    }

    #[test]
    fn test_movie_table_rows() {
        let movie = Movie {
            id: "550".to_string(),
            title: "Clube da Luta".to_string(),
            poster_url: None,
            release_year: "1999".to_string(),
            director: String::new(),
            duration: String::new(),
            genre: "Drama".to_string(),
            synopsis: String::new(),
            status: Some(ReviewStatus::Favorite),
            is_external: false,
            is_tmdb: true,
            external_id: None,
        };
        let rendered = movie_table(&[movie.clone()]).to_string();
        assert!(rendered.contains("Clube da Luta"));
        assert!(rendered.contains("tmdb"));
        assert!(!movie_detail(&movie).to_string().contains("Director"));
    }
}
