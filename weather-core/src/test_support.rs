//! Test doubles shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{
    error::WeatherError,
    model::QueryOptions,
    provider::{Resource, Upstream, UpstreamResponse},
};

/// Records every call and replays canned responses in order.
#[derive(Debug, Default)]
pub(crate) struct FakeUpstream {
    responses: Mutex<VecDeque<Result<UpstreamResponse, WeatherError>>>,
    calls: Mutex<Vec<(Resource, QueryOptions)>>,
}

impl FakeUpstream {
    pub(crate) fn with(responses: Vec<Result<UpstreamResponse, WeatherError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::default(),
        })
    }

    pub(crate) fn calls(&self) -> Vec<(Resource, QueryOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn fetch(
        &self,
        resource: Resource,
        options: &QueryOptions,
    ) -> Result<UpstreamResponse, WeatherError> {
        self.calls.lock().unwrap().push((resource, options.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(WeatherError::Malformed("no canned response".into())))
    }
}

pub(crate) fn new_york_matches() -> Value {
    json!([
        {
            "name": "New York",
            "local_names": { "fi": "New York", "en": "New York", "ru": "Нью-Йорк" },
            "lat": 40.7128,
            "lon": -74.006,
            "country": "US"
        },
        {
            "name": "New York",
            "lat": 53.0788,
            "lon": -0.1404,
            "country": "GB"
        }
    ])
}

pub(crate) fn ok(body: Value) -> Result<UpstreamResponse, WeatherError> {
    Ok(UpstreamResponse::new(200, body))
}
