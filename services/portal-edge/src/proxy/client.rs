//! Origin client.

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use rust_common::{HttpConfig, PlatformError, build_http_client};
use url::Url;

use crate::error::ProxyError;
use crate::proxy::types::{ProxyRequest, UpstreamPayload, UpstreamResponse};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Forwards API calls to the origin backend over one pooled connection set.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: Client,
    origin: Url,
}

impl ProxyClient {
    pub fn new(origin: Url, config: &HttpConfig) -> Result<Self, PlatformError> {
        Ok(Self::with_client(build_http_client(config)?, origin))
    }

    pub const fn with_client(http: Client, origin: Url) -> Self {
        Self { http, origin }
    }

    pub const fn origin(&self) -> &Url {
        &self.origin
    }

    /// `<origin>/<path>[?<query>]`. A trailing `/` on the origin and a
    /// leading `/` on the path collapse to one separator.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> Result<Url, ProxyError> {
        let mut target = format!(
            "{}/{}",
            self.origin.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }
        Ok(Url::parse(&target)?)
    }

    /// Sends one request to the origin and reads the whole reply.
    ///
    /// Non-2xx statuses are not errors; they are relayed like any other reply.
    pub async fn forward(&self, request: &ProxyRequest) -> Result<UpstreamResponse, ProxyError> {
        let url = self.target_url(&request.path, request.query.as_deref())?;

        let mut builder = self
            .http
            .request(request.method.as_reqwest(), url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(CACHE_CONTROL, "no-store");

        if let Some(authorization) = &request.authorization {
            builder = builder.header(AUTHORIZATION, authorization.clone());
        }
        if let Some(body) = request.body.as_json() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains(JSON_CONTENT_TYPE));

        let payload = if is_json {
            let bytes = response.bytes().await?;
            UpstreamPayload::Json(serde_json::from_slice(&bytes)?)
        } else {
            UpstreamPayload::Text(response.text().await?)
        };

        Ok(UpstreamResponse { status, payload })
    }
}
