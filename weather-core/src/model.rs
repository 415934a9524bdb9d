use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WeatherError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Localized city name returned alongside geocoding results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityName {
    pub name: String,
    pub country: String,
}

/// Day and night icon URLs for one weather condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconUrls {
    pub day: String,
    pub night: String,
}

/// Icon URLs for every forecast entry, as two sequences in entry order.
///
/// Slot `i` belongs to entry `i` of the forecast `list`; an entry without an
/// icon code leaves `None` in both sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastIcons {
    pub day: Vec<Option<String>>,
    pub night: Vec<Option<String>>,
}

impl ForecastIcons {
    pub fn push(&mut self, icons: Option<IconUrls>) {
        match icons {
            Some(icons) => {
                self.day.push(Some(icons.day));
                self.night.push(Some(icons.night));
            }
            None => {
                self.day.push(None);
                self.night.push(None);
            }
        }
    }
}

/// Body of a successful weather or forecast response.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherEnvelope<I> {
    pub data: Value,
    pub cities: Vec<CityName>,
    pub icons: I,
}

/// Query parameters sent to the upstream provider.
///
/// Values are never mutated in place: every builder consumes `self` and
/// returns a new set, so per-request overrides start from a clone of the
/// process-wide defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub units: String,
    pub lang: String,
    #[serde(flatten)]
    extra: BTreeMap<String, String>,
}

impl QueryOptions {
    pub fn new(units: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            units: units.into(),
            lang: lang.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Override or add a single parameter. Empty values are ignored.
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        if value.is_empty() {
            return self;
        }
        match key {
            "units" => self.units = value,
            "lang" => self.lang = value,
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
        self
    }

    pub fn with_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn with_coordinate(self, coordinate: Coordinate) -> Self {
        self.with("lat", coordinate.latitude).with("lon", coordinate.longitude)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "units" => Some(self.units.as_str()),
            "lang" => Some(self.lang.as_str()),
            _ => self.extra.get(key).map(String::as_str),
        }
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("units".to_string(), self.units.clone()),
            ("lang".to_string(), self.lang.clone()),
        ];
        pairs.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}

/// Query string of `/geocode`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeParams {
    pub city: Option<String>,
    pub country_code: Option<String>,
}

impl GeocodeParams {
    pub fn city(&self) -> Option<&str> {
        non_empty(&self.city)
    }

    pub fn country_code(&self) -> Option<&str> {
        non_empty(&self.country_code)
    }
}

/// Query string of `/geocode/reverse`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReverseGeocodeParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl ReverseGeocodeParams {
    pub fn coordinate(&self) -> Result<Option<Coordinate>, WeatherError> {
        let lat = parse_coordinate("lat", &self.lat)?;
        let lon = parse_coordinate("lon", &self.lon)?;
        Ok(lat.zip(lon).map(|(lat, lon)| Coordinate::new(lat, lon)))
    }
}

/// Query string of `/weather` and `/weather/forecast`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherParams {
    pub city: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub country_code: Option<String>,
    pub lang: Option<String>,
    #[serde(alias = "units")]
    pub unit: Option<String>,
}

impl WeatherParams {
    /// Parse the raw query values into a location request.
    ///
    /// Presence is what counts: `lat=0` is a coordinate, `city=` is absent.
    pub fn location(&self) -> Result<LocationQuery, WeatherError> {
        Ok(LocationQuery {
            city: non_empty(&self.city).map(str::to_string),
            lat: parse_coordinate("lat", &self.lat)?,
            lon: parse_coordinate("lon", &self.lon)?,
            country_code: non_empty(&self.country_code).map(str::to_string),
        })
    }

    pub fn lang(&self) -> Option<&str> {
        non_empty(&self.lang)
    }

    pub fn unit(&self) -> Option<&str> {
        non_empty(&self.unit)
    }
}

/// What the caller told us about the location they want.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationQuery {
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub country_code: Option<String>,
}

impl LocationQuery {
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.lat.zip(self.lon).map(|(lat, lon)| Coordinate::new(lat, lon))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_coordinate(
    field: &'static str,
    raw: &Option<String>,
) -> Result<Option<f64>, WeatherError> {
    let Some(raw) = non_empty(raw) else {
        return Ok(None);
    };
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| WeatherError::InvalidCoordinate {
            field,
            value: raw.to_string(),
        })
}
