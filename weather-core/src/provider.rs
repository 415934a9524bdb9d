use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::{error::WeatherError, model::QueryOptions};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Upstream resources the server forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    DirectGeocode,
    ReverseGeocode,
    CurrentWeather,
    Forecast,
}

impl Resource {
    pub fn path(&self) -> &'static str {
        match self {
            Resource::DirectGeocode => "geo/1.0/direct",
            Resource::ReverseGeocode => "geo/1.0/reverse",
            Resource::CurrentWeather => "data/2.5/weather",
            Resource::Forecast => "data/2.5/forecast",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Status and JSON body of an upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body of a 2xx response, or a pass-through error for anything else.
    pub fn into_success(self) -> Result<Value, WeatherError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(WeatherError::UpstreamStatus {
                status: self.status,
                body: self.body,
            })
        }
    }
}

#[async_trait]
pub trait Upstream: Send + Sync + Debug {
    /// Issue a GET against `resource` with `options` as the query string.
    ///
    /// Non-2xx responses are returned as `Ok`; only transport failures and
    /// unreadable success bodies are errors.
    async fn fetch(
        &self,
        resource: Resource,
        options: &QueryOptions,
    ) -> Result<UpstreamResponse, WeatherError>;
}
