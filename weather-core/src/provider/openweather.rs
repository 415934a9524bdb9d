use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::{error::WeatherError, model::QueryOptions};

use super::{Resource, Upstream, UpstreamResponse};

/// Client for the OpenWeather geocoding and weather API.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            api_key: api_key.into(),
            base_url,
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: Resource) -> String {
        format!("{}/{}", self.base_url, resource.path())
    }
}

#[async_trait]
impl Upstream for OpenWeatherClient {
    async fn fetch(
        &self,
        resource: Resource,
        options: &QueryOptions,
    ) -> Result<UpstreamResponse, WeatherError> {
        let mut query = options.to_pairs();
        query.push(("appid".to_string(), self.api_key.clone()));

        tracing::debug!(%resource, "requesting upstream");

        let res = self.http.get(self.url(resource)).query(&query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        tracing::debug!(%resource, status = status.as_u16(), "upstream responded");

        let body = if status.is_success() {
            serde_json::from_str::<Value>(&body).map_err(|e| {
                WeatherError::Malformed(format!("{resource}: {e}: {}", truncate_body(&body)))
            })?
        } else {
            serde_json::from_str::<Value>(&body)
                .unwrap_or_else(|_| json!({ "message": truncate_body(&body) }))
        };

        Ok(UpstreamResponse::new(status.as_u16(), body))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
