use crate::error::CatalogError;
use crate::http::error_text;
use crate::tmdb::genres::genre_names;
use cinetrack_models::Movie;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Endpoint + presentation settings shared by every call
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub image_base_url: String,
    pub language: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<TmdbMovieSummary>,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TmdbMovieSummary {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TmdbGenre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TmdbCrewMember {
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct TmdbCredits {
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    pub imdb_id: Option<String>,
    pub credits: Option<TmdbCredits>,
}

fn poster_url(image_base_url: &str, poster_path: Option<&str>) -> Option<String> {
    poster_path
        .filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", image_base_url.trim_end_matches('/'), p))
}

/// "2019-10-02" -> "2019"; empty when unknown
fn release_year(release_date: Option<&str>) -> String {
    release_date
        .map(|d| d.chars().take(4).collect::<String>())
        .filter(|y| y.len() == 4 && y.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or_default()
}

pub fn summary_to_movie(summary: &TmdbMovieSummary, image_base_url: &str) -> Movie {
    Movie {
        id: summary.id.to_string(),
        title: summary.title.clone(),
        poster_url: poster_url(image_base_url, summary.poster_path.as_deref()),
        release_year: release_year(summary.release_date.as_deref()),
        director: String::new(), // list endpoints carry no credits
        duration: String::new(),
        genre: genre_names(&summary.genre_ids),
        synopsis: summary.overview.clone().unwrap_or_default(),
        status: None,
        is_external: false,
        is_tmdb: true,
        external_id: None,
    }
}

pub fn details_to_movie(details: &TmdbMovieDetails, image_base_url: &str) -> Movie {
    let director = details
        .credits
        .as_ref()
        .and_then(|c| c.crew.iter().find(|m| m.job == "Director"))
        .map(|m| m.name.clone())
        .unwrap_or_default();

    Movie {
        id: details.id.to_string(),
        title: details.title.clone(),
        poster_url: poster_url(image_base_url, details.poster_path.as_deref()),
        release_year: release_year(details.release_date.as_deref()),
        director,
        duration: details.runtime.filter(|r| *r > 0).map(|r| format!("{} min", r)).unwrap_or_default(),
        genre: details.genres.iter().map(|g| g.name.as_str()).collect::<Vec<_>>().join(", "),
        synopsis: details.overview.clone().unwrap_or_default(),
        status: None,
        is_external: false,
        is_tmdb: true,
        external_id: details.imdb_id.clone().filter(|id| !id.is_empty()),
    }
}

fn authorized(builder: RequestBuilder, settings: &ApiSettings) -> RequestBuilder {
    builder
        .bearer_auth(&settings.token)
        .header("Accept", "application/json")
}

async fn fetch_page(client: &Client, settings: &ApiSettings, url: &str, query: &[(&str, String)]) -> Result<TmdbPage, CatalogError> {
    let response = authorized(client.get(url), settings).query(query).send().await?;

    if !response.status().is_success() {
        let (status, message) = error_text(response).await;
        return Err(CatalogError::Status { status, message });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// First page of `/movie/popular`
pub async fn get_popular(client: &Client, settings: &ApiSettings, page: u32) -> Result<Vec<Movie>, CatalogError> {
    let url = format!("{}/movie/popular", settings.base_url.trim_end_matches('/'));
    let query = [("language", settings.language.clone()), ("page", page.to_string())];
    let page = fetch_page(client, settings, &url, &query).await?;
    debug!("TMDB popular page {}/{}: {} result(s)", page.page, page.total_pages, page.results.len());

    Ok(page.results.iter().map(|s| summary_to_movie(s, &settings.image_base_url)).collect())
}

pub async fn search(client: &Client, settings: &ApiSettings, query_text: &str, page: u32) -> Result<Vec<Movie>, CatalogError> {
    let url = format!("{}/search/movie", settings.base_url.trim_end_matches('/'));
    let query = [
        ("query", query_text.to_string()),
        ("language", settings.language.clone()),
        ("page", page.to_string()),
        ("include_adult", "false".to_string()),
    ];
    let page = fetch_page(client, settings, &url, &query).await?;
    debug!("TMDB search '{}': {} result(s)", query_text, page.results.len());

    Ok(page.results.iter().map(|s| summary_to_movie(s, &settings.image_base_url)).collect())
}

/// `/movie/{id}` with credits appended; `None` on 404
pub async fn get_details(client: &Client, settings: &ApiSettings, id: &str) -> Result<Option<Movie>, CatalogError> {
    let url = format!(
        "{}/movie/{}",
        settings.base_url.trim_end_matches('/'),
        urlencoding::encode(id)
    );
    let response = authorized(client.get(&url), settings)
        .query(&[("language", settings.language.as_str()), ("append_to_response", "credits")])
        .send()
        .await?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        debug!("TMDB has no movie {}", id);
        return Ok(None);
    }
    if !response.status().is_success() {
        let (status, message) = error_text(response).await;
        return Err(CatalogError::Status { status, message });
    }

    let body = response.text().await?;
    let details: TmdbMovieDetails = serde_json::from_str(&body)?;
    Ok(Some(details_to_movie(&details, &settings.image_base_url)))
}
