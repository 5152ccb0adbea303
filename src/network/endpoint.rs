//! Cluster node addresses

use crate::error::{Error, Result};
use std::fmt;
use url::Url;

/// Port assumed for addresses given without a scheme
const DEFAULT_PORT: u16 = 9200;

/// A normalized cluster node address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    /// Parse a configured address.
    ///
    /// `host` and `host:port` become `http://host:9200` / `http://host:port`;
    /// addresses with a scheme keep that scheme's default port unless one is
    /// given.
    pub fn parse(address: &str) -> Result<Self> {
        let address = address.trim();
        if address.is_empty() {
            return Err(Error::config("empty endpoint address"));
        }

        let invalid = |reason: String| Error::config(format!("invalid endpoint '{}': {}", address, reason));

        let url = if address.contains("://") {
            Url::parse(address).map_err(|e| invalid(e.to_string()))?
        } else {
            let mut url =
                Url::parse(&format!("http://{}", address)).map_err(|e| invalid(e.to_string()))?;
            if url.port().is_none() {
                url.set_port(Some(DEFAULT_PORT))
                    .map_err(|_| invalid("cannot carry a port".to_string()))?;
            }
            url
        };

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        Ok(Self { url })
    }

    /// Parse every configured address, failing on the first bad one
    pub fn parse_all<S: AsRef<str>>(addresses: &[S]) -> Result<Vec<Self>> {
        addresses.iter().map(|a| Self::parse(a.as_ref())).collect()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `<endpoint>/<index>[/<doc_type>]/_search`, segments percent-encoded
    pub fn search_url(&self, index: &str, doc_type: &str) -> Result<Url> {
        let mut url = self.url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::config(format!("endpoint '{}' cannot be a base", self.url)))?;
            segments.pop_if_empty();
            segments.push(index);
            if !doc_type.is_empty() {
                segments.push(doc_type);
            }
            segments.push("_search");
        }
        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
