use crate::error::LocatorError;
use crate::http::{create_http_client, error_text};
use cinetrack_config::CinemaConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const EARTH_RADIUS_M: f64 = 6_371_000.0;
const UNNAMED: &str = "Cinema sem nome";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cinema {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_m: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

/// Cinema lookup against the public Overpass map-data API
#[derive(Clone)]
pub struct OverpassClient {
    client: Arc<Client>,
    endpoint: String,
    default_radius_m: u32,
}

impl OverpassClient {
    pub fn new(client: Arc<Client>, endpoint: String, default_radius_m: u32) -> Self {
        Self {
            client,
            endpoint,
            default_radius_m,
        }
    }

    pub fn from_config(config: &CinemaConfig, timeout: Duration) -> Self {
        Self::new(
            Arc::new(create_http_client(timeout)),
            config.overpass_url.clone(),
            config.radius_m,
        )
    }

    pub fn default_radius(&self) -> u32 {
        self.default_radius_m
    }

    /// Cinemas within `radius_m` (or the configured default), nearest first
    pub async fn nearby(&self, latitude: f64, longitude: f64, radius_m: Option<u32>) -> Result<Vec<Cinema>, LocatorError> {
        let radius = radius_m.unwrap_or(self.default_radius_m);
        let query = build_query(latitude, longitude, radius);
        debug!("Overpass query around ({}, {}) r={}m", latitude, longitude, radius);

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = error_text(response).await;
            return Err(LocatorError::Status { status, message });
        }

        let body = response.text().await?;
        let cinemas = parse_response(&body, latitude, longitude)?;
        debug!("Overpass returned {} cinema(s)", cinemas.len());
        Ok(cinemas)
    }
}

pub fn build_query(latitude: f64, longitude: f64, radius_m: u32) -> String {
    format!(
        "[out:json][timeout:25];(node[\"amenity\"=\"cinema\"](around:{r},{lat},{lon});way[\"amenity\"=\"cinema\"](around:{r},{lat},{lon}););out center;",
        r = radius_m,
        lat = latitude,
        lon = longitude
    )
}

/// Great-circle distance in meters
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

fn address(tags: &HashMap<String, String>) -> Option<String> {
    let street = tags.get("addr:street")?;
    Some(match tags.get("addr:housenumber") {
        Some(number) => format!("{}, {}", street, number),
        None => street.clone(),
    })
}

fn parse_response(body: &str, latitude: f64, longitude: f64) -> Result<Vec<Cinema>, LocatorError> {
    let response: OverpassResponse = serde_json::from_str(body)?;

    let mut cinemas: Vec<Cinema> = response
        .elements
        .into_iter()
        .filter_map(|element| {
            // ways only carry coordinates through `out center`
            let (lat, lon) = match (element.lat, element.lon, &element.center) {
                (Some(lat), Some(lon), _) => (lat, lon),
                (_, _, Some(center)) => (center.lat, center.lon),
                _ => return None,
            };
            let name = element
                .tags
                .get("name")
                .filter(|n| !n.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| UNNAMED.to_string());

            Some(Cinema {
                id: format!("{}/{}", element.kind, element.id),
                name,
                latitude: lat,
                longitude: lon,
                distance_m: haversine_m(latitude, longitude, lat, lon),
                address: address(&element.tags),
            })
        })
        .collect();

    cinemas.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    Ok(cinemas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine() {
        assert_eq!(haversine_m(-23.55, -46.63, -23.55, -46.63), 0.0);
        // Praça da Sé to Av. Paulista (MASP) is roughly 2.5 km
        let d = haversine_m(-23.5503, -46.6339, -23.5614, -46.6559);
        assert!((2_300.0..2_800.0).contains(&d), "distance was {}", d);
    }

    #[test]
    fn test_build_query() {
        let query = build_query(-23.5, -46.6, 2000);
        assert!(query.starts_with("[out:json]"));
        assert!(query.contains("node[\"amenity\"=\"cinema\"](around:2000,-23.5,-46.6)"));
        assert!(query.ends_with("out center;"));
    }

    #[test]
    fn test_parse_response_sorts_and_names() {
        let body = r#"{
            "elements": [
                {"type": "way", "id": 7, "center": {"lat": -23.60, "lon": -46.60},
                 "tags": {"amenity": "cinema", "name": "Cine Longe"}},
                {"type": "node", "id": 3, "lat": -23.501, "lon": -46.601,
                 "tags": {"amenity": "cinema", "addr:street": "Rua Augusta", "addr:housenumber": "1475"}},
                {"type": "way", "id": 9, "tags": {"name": "Sem coordenadas"}}
            ]
        }"#;
        let cinemas = parse_response(body, -23.5, -46.6).unwrap();

        assert_eq!(cinemas.len(), 2);
        assert_eq!(cinemas[0].id, "node/3");
        assert_eq!(cinemas[0].name, UNNAMED);
        assert_eq!(cinemas[0].address.as_deref(), Some("Rua Augusta, 1475"));
        assert_eq!(cinemas[1].name, "Cine Longe");
        assert!(cinemas[0].distance_m < cinemas[1].distance_m);
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(parse_response(r#"{"version": 0.6}"#, 0.0, 0.0).unwrap().is_empty());
        assert!(parse_response("not json", 0.0, 0.0).is_err());
    }
}
