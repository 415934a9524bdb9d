use std::sync::Arc;

use serde_json::{Value, json};

use crate::{
    config::Config,
    error::WeatherError,
    icons::IconUrlDeriver,
    model::{
        ForecastIcons, GeocodeParams, IconUrls, QueryOptions, ReverseGeocodeParams,
        WeatherEnvelope, WeatherParams,
    },
    provider::{OpenWeatherClient, Resource, Upstream},
    resolver::{CoordinateResolver, Resolution},
};

/// Which location rule a weather endpoint validates with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Validation {
    /// A city, or both coordinates.
    CityOrCoordinates,
    /// Anything at all: a city or either coordinate.
    AnyLocationField,
}

/// The four query operations of the server, independent of HTTP.
///
/// Each call starts from a clone of the immutable default options, so
/// concurrent requests never see each other's overrides.
#[derive(Debug, Clone)]
pub struct WeatherService {
    upstream: Arc<dyn Upstream>,
    resolver: CoordinateResolver,
    icons: IconUrlDeriver,
    defaults: QueryOptions,
}

impl WeatherService {
    pub fn new(
        upstream: Arc<dyn Upstream>,
        defaults: QueryOptions,
        icon_base_url: impl Into<String>,
    ) -> Self {
        Self {
            resolver: CoordinateResolver::new(upstream.clone(), defaults.clone()),
            icons: IconUrlDeriver::new(icon_base_url),
            upstream,
            defaults,
        }
    }

    /// Build a service talking to OpenWeather with the configured credentials.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = OpenWeatherClient::new(config.api_key()?, config.base_url.as_str());
        Ok(Self::new(Arc::new(client), config.default_options(), config.icon_base_url.as_str()))
    }

    pub fn defaults(&self) -> &QueryOptions {
        &self.defaults
    }

    /// Forward geocoding: `{ data: <matches> }`.
    pub async fn geocode(&self, params: &GeocodeParams) -> Result<Value, WeatherError> {
        let city = params.city().ok_or(WeatherError::MissingCity)?;

        let data = self
            .resolver
            .direct_geocode(city, params.country_code())
            .await?
            .into_success()?;

        Ok(json!({ "data": data }))
    }

    /// Reverse geocoding: `{ data: <places> }`.
    pub async fn reverse_geocode(
        &self,
        params: &ReverseGeocodeParams,
    ) -> Result<Value, WeatherError> {
        let coordinate = params.coordinate()?.ok_or(WeatherError::MissingCoordinates)?;

        let options = self.defaults.clone().with_coordinate(coordinate);
        let data = self
            .upstream
            .fetch(Resource::ReverseGeocode, &options)
            .await?
            .into_success()?;

        Ok(json!({ "data": data }))
    }

    /// Current weather: `{ data, cities, icons: {day, night} }`.
    ///
    /// `icons` is null when the payload carries no condition icon.
    pub async fn current_weather(&self, params: &WeatherParams) -> Result<Value, WeatherError> {
        let (resolution, data) = self
            .fetch_weather(Resource::CurrentWeather, Validation::CityOrCoordinates, params)
            .await?;

        let icons: Option<IconUrls> = data
            .pointer("/weather/0/icon")
            .and_then(Value::as_str)
            .map(|code| self.icons.derive(code));

        Ok(serde_json::to_value(WeatherEnvelope {
            data,
            cities: resolution.cities,
            icons,
        })?)
    }

    /// Forecast: `{ data, cities, icons: {day: [..], night: [..]} }`, one
    /// icon slot per forecast entry, index-aligned with `data.list`. Entries
    /// without an icon code get `null` in both sequences.
    pub async fn forecast(&self, params: &WeatherParams) -> Result<Value, WeatherError> {
        let (resolution, data) = self
            .fetch_weather(Resource::Forecast, Validation::AnyLocationField, params)
            .await?;

        let mut icons = ForecastIcons::default();
        let entries = data.get("list").and_then(Value::as_array).into_iter().flatten();
        for entry in entries {
            let code = entry.pointer("/weather/0/icon").and_then(Value::as_str);
            icons.push(code.map(|code| self.icons.derive(code)));
        }

        Ok(serde_json::to_value(WeatherEnvelope {
            data,
            cities: resolution.cities,
            icons,
        })?)
    }

    async fn fetch_weather(
        &self,
        resource: Resource,
        validation: Validation,
        params: &WeatherParams,
    ) -> Result<(Resolution, Value), WeatherError> {
        let location = params.location()?;

        let has_city = location.city.is_some();
        let rejected = match validation {
            Validation::CityOrCoordinates => !has_city && location.coordinate().is_none(),
            Validation::AnyLocationField => {
                !has_city && location.lat.is_none() && location.lon.is_none()
            }
        };
        if rejected {
            return Err(WeatherError::MissingLocation);
        }

        let resolution = self.resolver.resolve(&location, params.lang()).await?;

        let options = self
            .defaults
            .clone()
            .with_coordinate(resolution.coordinate)
            .with_opt("lang", params.lang())
            .with_opt("units", params.unit());

        let data = self.upstream.fetch(resource, &options).await?.into_success()?;

        Ok((resolution, data))
    }
}
