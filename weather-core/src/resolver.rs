//! Turns a city name or an explicit lat/lon pair into a coordinate plus the
//! localized city names the geocoder knows for it.

use std::{collections::HashMap, sync::Arc};

use serde::Deserialize;

use crate::{
    error::WeatherError,
    model::{CityName, Coordinate, LocationQuery, QueryOptions},
    provider::{Resource, Upstream, UpstreamResponse},
};

/// A resolved location. `cities` is empty when the caller supplied coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub coordinate: Coordinate,
    pub cities: Vec<CityName>,
}

#[derive(Debug, Deserialize)]
struct GeoEntry {
    lat: f64,
    lon: f64,
    name: String,
    #[serde(default)]
    local_names: Option<HashMap<String, String>>,
    #[serde(default)]
    country: String,
}

impl GeoEntry {
    fn city_name(&self, lang: &str) -> CityName {
        let name = self
            .local_names
            .as_ref()
            .and_then(|names| names.get(lang))
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name);

        CityName {
            name: name.clone(),
            country: self.country.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoordinateResolver {
    upstream: Arc<dyn Upstream>,
    defaults: QueryOptions,
}

impl CoordinateResolver {
    pub fn new(upstream: Arc<dyn Upstream>, defaults: QueryOptions) -> Self {
        Self { upstream, defaults }
    }

    /// Resolve `location`.
    ///
    /// Explicit coordinates win and cost no upstream call. Otherwise the
    /// first geocoding match supplies the coordinate and every match
    /// contributes a name, localized to `lang` (or the default language).
    pub async fn resolve(
        &self,
        location: &LocationQuery,
        lang: Option<&str>,
    ) -> Result<Resolution, WeatherError> {
        if let Some(coordinate) = location.coordinate() {
            return Ok(Resolution {
                coordinate,
                cities: Vec::new(),
            });
        }

        let city = location.city.as_deref().ok_or(WeatherError::MissingCoordinates)?;

        let body = self
            .direct_geocode(city, location.country_code.as_deref())
            .await?
            .into_success()?;

        let entries: Vec<GeoEntry> = serde_json::from_value(body)?;

        let first = entries.first().ok_or_else(|| {
            tracing::debug!(city, "geocoding returned no matches");
            WeatherError::CityNotFound(city.to_string())
        })?;
        let coordinate = Coordinate::new(first.lat, first.lon);

        let lang = lang.unwrap_or(&self.defaults.lang);
        let cities = entries.iter().map(|entry| entry.city_name(lang)).collect();

        tracing::debug!(
            city,
            lat = coordinate.latitude,
            lon = coordinate.longitude,
            "resolved city"
        );

        Ok(Resolution { coordinate, cities })
    }

    /// Forward geocoding call, shared with the `/geocode` endpoint.
    pub async fn direct_geocode(
        &self,
        city: &str,
        country_code: Option<&str>,
    ) -> Result<UpstreamResponse, WeatherError> {
        let options = self.defaults.clone().with("q", direct_query(city, country_code));
        self.upstream.fetch(Resource::DirectGeocode, &options).await
    }
}

/// Geocoder query string: `<city>` or `<city>,,<countryCode>`.
pub fn direct_query(city: &str, country_code: Option<&str>) -> String {
    match country_code.filter(|c| !c.is_empty()) {
        Some(code) => format!("{city},,{code}"),
        None => city.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeUpstream, new_york_matches};
    use serde_json::json;

    fn resolver(upstream: Arc<FakeUpstream>) -> CoordinateResolver {
        CoordinateResolver::new(upstream, QueryOptions::new("metric", "en"))
    }

    fn city(name: &str) -> LocationQuery {
        LocationQuery {
            city: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn explicit_coordinates_skip_geocoding() {
        let upstream = FakeUpstream::with(vec![]);
        let location = LocationQuery {
            city: Some("Ignored".into()),
            lat: Some(0.0),
            lon: Some(0.0),
            ..Default::default()
        };

        let resolution = resolver(upstream.clone()).resolve(&location, None).await.unwrap();

        assert_eq!(resolution.coordinate, Coordinate::new(0.0, 0.0));
        assert!(resolution.cities.is_empty());
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn city_uses_first_match_and_names_every_match() {
        let upstream = FakeUpstream::with(vec![Ok(UpstreamResponse::new(200, new_york_matches()))]);

        let resolution = resolver(upstream.clone())
            .resolve(&city("New York"), Some("ru"))
            .await
            .unwrap();

        assert_eq!(resolution.coordinate, Coordinate::new(40.7128, -74.006));
        assert_eq!(
            resolution.cities,
            vec![
                CityName {
                    name: "Нью-Йорк".into(),
                    country: "US".into(),
                },
                CityName {
                    name: "New York".into(),
                    country: "GB".into(),
                },
            ]
        );

        let calls = upstream.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Resource::DirectGeocode);
        assert_eq!(calls[0].1.get("q"), Some("New York"));
    }

    #[tokio::test]
    async fn country_code_qualifies_the_query() {
        let upstream = FakeUpstream::with(vec![Ok(UpstreamResponse::new(200, new_york_matches()))]);
        let location = LocationQuery {
            country_code: Some("US".into()),
            ..city("New York")
        };

        resolver(upstream.clone()).resolve(&location, None).await.unwrap();

        assert_eq!(upstream.calls()[0].1.get("q"), Some("New York,,US"));
    }

    #[tokio::test]
    async fn single_coordinate_falls_back_to_city() {
        let upstream = FakeUpstream::with(vec![Ok(UpstreamResponse::new(200, new_york_matches()))]);
        let location = LocationQuery {
            lat: Some(12.0),
            ..city("New York")
        };

        let resolution = resolver(upstream.clone()).resolve(&location, None).await.unwrap();

        assert_eq!(resolution.cities.len(), 2);
        assert_eq!(upstream.calls().len(), 1);
    }

    #[tokio::test]
    async fn no_city_and_partial_coordinates_is_rejected() {
        let upstream = FakeUpstream::with(vec![]);
        let location = LocationQuery {
            lat: Some(12.0),
            ..Default::default()
        };

        let err = resolver(upstream.clone()).resolve(&location, None).await.unwrap_err();

        assert!(matches!(err, WeatherError::MissingCoordinates));
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_result_is_not_found() {
        let upstream = FakeUpstream::with(vec![Ok(UpstreamResponse::new(200, json!([])))]);

        let err = resolver(upstream).resolve(&city("Atlantis"), None).await.unwrap_err();

        assert!(matches!(err, WeatherError::CityNotFound(ref c) if c == "Atlantis"));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn missing_localization_falls_back_to_default_name() {
        let upstream = FakeUpstream::with(vec![Ok(UpstreamResponse::new(200, new_york_matches()))]);

        let resolution = resolver(upstream).resolve(&city("New York"), Some("sv")).await.unwrap();

        assert!(resolution.cities.iter().all(|c| c.name == "New York"));
    }

    #[tokio::test]
    async fn null_local_names_fall_back_to_default_name() {
        let matches = json!([{
            "name": "Springfield",
            "local_names": null,
            "lat": 39.7817,
            "lon": -89.6501,
            "country": "US"
        }]);
        let upstream = FakeUpstream::with(vec![Ok(UpstreamResponse::new(200, matches))]);

        let resolution = resolver(upstream)
            .resolve(&city("Springfield"), Some("fi"))
            .await
            .unwrap();

        assert_eq!(resolution.coordinate, Coordinate::new(39.7817, -89.6501));
        assert_eq!(
            resolution.cities,
            vec![CityName {
                name: "Springfield".into(),
                country: "US".into(),
            }]
        );
    }

    #[tokio::test]
    async fn upstream_errors_are_propagated() {
        let upstream = FakeUpstream::with(vec![Ok(UpstreamResponse::new(
            401,
            json!({ "cod": 401, "message": "Invalid API key." }),
        ))]);
        let err = resolver(upstream).resolve(&city("Paris"), None).await.unwrap_err();
        assert_eq!(err.status_code(), 401);

        let upstream =
            FakeUpstream::with(vec![Ok(UpstreamResponse::new(200, json!({ "not": "a list" })))]);
        let err = resolver(upstream).resolve(&city("Paris"), None).await.unwrap_err();
        assert!(matches!(err, WeatherError::Malformed(_)));
    }

    #[test]
    fn direct_query_format() {
        assert_eq!(direct_query("Paris", None), "Paris");
        assert_eq!(direct_query("Paris", Some("FR")), "Paris,,FR");
        assert_eq!(direct_query("Paris", Some("")), "Paris");
    }
}
