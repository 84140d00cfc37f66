use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};
use url::Url;

use crate::config::Config;
use crate::dto::route_dto::LatLngPoint;
use crate::error::{Error, Result};
use crate::utils::time::{format_travel_time, now, to_rfc3339_utc};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRouteResponse {
    #[serde(default)]
    pub routes: Vec<ProviderRoute>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRoute {
    pub summary: RouteSummary,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub length_in_meters: f64,
    pub travel_time_in_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteLeg {
    #[serde(default)]
    pub points: Vec<LatLngPoint>,
}

/// Provider route reduced to what the map needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub route_points: Vec<LatLngPoint>,
    pub distance_km: f64,
    pub duration_str: String,
}

/// Meters to kilometers, one decimal place.
pub fn meters_to_km(meters: f64) -> f64 {
    (meters / 100.0).round() / 10.0
}

/// Keeps the first route the provider returned; zero routes is `NoRouteFound`.
pub fn normalize_route(response: CalculateRouteResponse) -> Result<RouteResult> {
    let Some(route) = response.routes.into_iter().next() else {
        return Err(Error::NoRouteFound);
    };

    let route_points = route
        .legs
        .into_iter()
        .flat_map(|leg| leg.points)
        .collect();

    Ok(RouteResult {
        route_points,
        distance_km: meters_to_km(route.summary.length_in_meters),
        duration_str: format_travel_time(route.summary.travel_time_in_seconds),
    })
}

#[derive(Clone)]
pub struct RouteService {
    client: Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl RouteService {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.route_provider_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build routing HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.tomtom_api_key.clone(),
            base_url: config.tomtom_base_url.trim_end_matches('/').to_string(),
            language: config.route_language.clone(),
        })
    }

    fn route_url(&self, points: &[LatLngPoint]) -> Result<Url> {
        let locations = points
            .iter()
            .map(|p| format!("{},{}", p.latitude, p.longitude))
            .collect::<Vec<_>>()
            .join(":");
        let raw = format!(
            "{}/routing/1/calculateRoute/{}/json",
            self.base_url, locations
        );
        Url::parse(&raw).map_err(|e| Error::Config(format!("Invalid routing base URL: {}", e)))
    }

    /// Asks the provider for the fastest traffic-aware route through `points`,
    /// letting it reorder the stops.
    pub async fn best_route(&self, points: &[LatLngPoint]) -> Result<RouteResult> {
        if points.len() < 2 {
            return Err(Error::InsufficientPoints);
        }

        let url = self.route_url(points)?;
        let depart_at = to_rfc3339_utc(now());
        info!(points = points.len(), "requesting optimized route");

        let response = self
            .client
            .get(url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("traffic", "true"),
                ("travelMode", "car"),
                ("routeType", "fastest"),
                ("departAt", depart_at.as_str()),
                ("computeBestOrder", "true"),
                ("routeRepresentation", "polyline"),
                ("instructionsType", "text"),
                ("language", self.language.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                // without_url keeps the API key out of the log line.
                error!(error = %e.without_url(), "routing provider unreachable");
                Error::Provider("request failed".into())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "routing provider returned an error"
            );
            return Err(Error::Provider(format!("provider answered {}", status)));
        }

        let payload = response
            .json::<CalculateRouteResponse>()
            .await
            .map_err(|e| {
                error!(error = %e.without_url(), "routing provider response could not be decoded");
                Error::Provider("undecodable response".into())
            })?;

        let result = normalize_route(payload);
        match &result {
            Ok(route) => info!(
                path_points = route.route_points.len(),
                distance_km = route.distance_km,
                "route calculated"
            ),
            Err(_) => warn!("routing provider returned no route"),
        }
        result
    }
}
