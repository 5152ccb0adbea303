//! HTTP client for the search cluster's REST API

use super::endpoint::Endpoint;
use super::signer::Signer;
use crate::config::{OutgoingSettings, Settings};
use crate::error::{Error, Result};
use crate::search::RawSearch;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Cluster client holding the endpoint set and a pooled HTTP client.
///
/// Requests are spread round-robin over the endpoints, one endpoint per
/// request. Nothing is retried.
pub struct ClusterClient {
    client: Client,
    endpoints: Arc<[Endpoint]>,
    signer: Option<Signer>,
    next: AtomicUsize,
}

impl ClusterClient {
    /// Create an unsigned client for the given node addresses
    pub fn new<S: AsRef<str>>(endpoints: &[S]) -> Result<Self> {
        Self::build(endpoints, &OutgoingSettings::default(), None)
    }

    /// Create a client from full settings, loading credentials when configured
    pub fn with_settings(settings: &Settings) -> Result<Self> {
        let signer = match settings.aws.load_credentials()? {
            Some(credentials) => {
                let region = settings.aws.region_for(&credentials).ok_or_else(|| {
                    Error::config("credentials are configured but no region is set")
                })?;
                info!("Signing cluster requests for region {}", region);
                Some(Signer::new(credentials, region))
            }
            None => None,
        };

        Self::build(&settings.cluster.endpoints, &settings.outgoing, signer)
    }

    /// Create a client with explicit outgoing settings and signer
    pub fn build<S: AsRef<str>>(
        endpoints: &[S],
        outgoing: &OutgoingSettings,
        signer: Option<Signer>,
    ) -> Result<Self> {
        let endpoints = Endpoint::parse_all(endpoints)?;
        if endpoints.is_empty() {
            return Err(Error::config("at least one cluster endpoint is required"));
        }

        let mut builder = Client::builder()
            .pool_max_idle_per_host(outgoing.pool_maxsize)
            .default_headers(extra_headers(outgoing)?)
            .redirect(reqwest::redirect::Policy::none())
            .gzip(true);

        if !outgoing.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref proxy_url) = outgoing.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url).map_err(Error::Client)?);
        } else {
            if let Some(ref http) = outgoing.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http).map_err(Error::Client)?);
            }
            if let Some(ref https) = outgoing.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https).map_err(Error::Client)?);
            }
        }

        let client = builder.build().map_err(Error::Client)?;

        Ok(Self {
            client,
            endpoints: endpoints.into(),
            signer,
            next: AtomicUsize::new(0),
        })
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn is_signed(&self) -> bool {
        self.signer.is_some()
    }

    /// Pick the endpoint for the next request
    fn next_endpoint(&self) -> &Endpoint {
        let i = self.next.fetch_add(1, Ordering::Relaxed) % self.endpoints.len();
        &self.endpoints[i]
    }

    /// POST a search to one node and return its JSON answer
    pub async fn search(&self, index: &str, doc_type: &str, body: &Value) -> Result<Value> {
        let endpoint = self.next_endpoint();
        let url = endpoint.search_url(index, doc_type)?;
        let payload = serde_json::to_vec(body)?;

        let mut req_builder = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);

        if let Some(ref signer) = self.signer {
            for (name, value) in signer.sign("POST", &url, JSON_CONTENT_TYPE, &payload, Utc::now())? {
                req_builder = req_builder.header(name, value);
            }
        }

        debug!("Searching {} on {}", url.path(), endpoint);
        let start = Instant::now();

        let response = req_builder.body(payload).send().await?;

        debug!(
            "Cluster answered {} in {:?}",
            response.status(),
            start.elapsed()
        );

        Self::parse_response(response).await
    }

    /// Success bodies are returned as parsed; anything else becomes
    /// `Error::Remote` carrying the status and the error document.
    async fn parse_response(response: Response) -> Result<Value> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&text)?);
        }

        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Err(Error::Remote { status, body })
    }
}

#[async_trait]
impl RawSearch for ClusterClient {
    type Error = Error;

    async fn raw_search(&self, index: &str, doc_type: &str, body: &Value) -> Result<Value> {
        self.search(index, doc_type, body).await
    }
}

fn extra_headers(outgoing: &OutgoingSettings) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (key, value) in &outgoing.extra_headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| Error::config(format!("invalid header name '{}': {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::config(format!("invalid value for header '{}': {}", key, e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
