//! Core library for the weather info server.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream (OpenWeather) client abstraction
//! - Coordinate resolution and icon URL derivation
//! - `WeatherService`, the HTTP-independent form of every endpoint
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod icons;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::WeatherError;
pub use icons::IconUrlDeriver;
pub use model::{
    CityName, Coordinate, ForecastIcons, GeocodeParams, IconUrls, LocationQuery, QueryOptions,
    ReverseGeocodeParams, WeatherParams,
};
pub use provider::{OpenWeatherClient, Resource, Upstream, UpstreamResponse};
pub use resolver::{CoordinateResolver, Resolution};
pub use service::WeatherService;
