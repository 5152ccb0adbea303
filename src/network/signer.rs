//! AWS Signature Version 4 signing for managed search domains

use crate::config::Credentials;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Service name managed search domains are signed for
pub const SERVICE: &str = "es";

/// Signs cluster requests with a fixed set of credentials
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
    region: String,
    service: String,
}

impl Signer {
    pub fn new(credentials: Credentials, region: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: SERVICE.to_string(),
        }
    }

    /// Compute the headers to attach to a request.
    ///
    /// `host` and `content-type` are signed but not returned; the HTTP
    /// client sends them itself and they must match what is signed here.
    pub fn sign(
        &self,
        method: &str,
        url: &Url,
        content_type: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<Vec<(&'static str, String)>> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = format!("{:x}", Sha256::digest(body));

        // Sorted by name
        let mut headers: Vec<(&'static str, String)> = vec![
            ("content-type", content_type.to_string()),
            ("host", host_header(url)?),
            ("x-amz-content-sha256", payload_hash.clone()),
            ("x-amz-date", amz_date.clone()),
        ];
        if let Some(ref token) = self.credentials.session_token {
            headers.push(("x-amz-security-token", token.clone()));
        }

        let request = CanonicalRequest {
            method,
            url,
            headers: &headers,
            payload_hash: &payload_hash,
        };
        let authorization = authorization(
            &self.credentials,
            &self.region,
            &self.service,
            &amz_date,
            &request,
        )?;

        let mut out = vec![
            ("authorization", authorization),
            ("x-amz-content-sha256", payload_hash),
            ("x-amz-date", amz_date),
        ];
        if let Some(ref token) = self.credentials.session_token {
            out.push(("x-amz-security-token", token.clone()));
        }
        Ok(out)
    }
}

/// The parts of a request that go into its signature.
/// `headers` must be lowercase and sorted by name.
struct CanonicalRequest<'a> {
    method: &'a str,
    url: &'a Url,
    headers: &'a [(&'static str, String)],
    payload_hash: &'a str,
}

impl CanonicalRequest<'_> {
    fn signed_headers(&self) -> String {
        self.headers
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(";")
    }

    fn render(&self) -> String {
        let canonical_headers: String = self
            .headers
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
            .collect();

        format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            self.method,
            canonical_uri(self.url),
            canonical_query(self.url),
            canonical_headers,
            self.signed_headers(),
            self.payload_hash
        )
    }
}

/// Build the `Authorization` header value for `request` at `amz_date`
fn authorization(
    credentials: &Credentials,
    region: &str,
    service: &str,
    amz_date: &str,
    request: &CanonicalRequest<'_>,
) -> Result<String> {
    let date = amz_date
        .get(..8)
        .ok_or_else(|| Error::Signing(format!("malformed timestamp {}", amz_date)))?;

    let scope = format!("{}/{}/{}/aws4_request", date, region, service);
    let request_hash = format!("{:x}", Sha256::digest(request.render().as_bytes()));
    let string_to_sign = format!("{}\n{}\n{}\n{}", ALGORITHM, amz_date, scope, request_hash);

    let key = signing_key(&credentials.secret_access_key, date, region, service)?;
    let signature = hex(&hmac_sha256(&key, string_to_sign.as_bytes())?);

    Ok(format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM,
        credentials.access_key_id,
        scope,
        request.signed_headers(),
        signature
    ))
}

/// Derive the per-day signing key
fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| Error::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Host header as the HTTP client sends it: port only when non-default
fn host_header(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::Signing(format!("no host in {}", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Path with every segment encoded twice, as all services but S3 expect
fn canonical_uri(url: &Url) -> String {
    let segments = match url.path_segments() {
        Some(segments) => segments,
        None => return "/".to_string(),
    };
    let encoded: Vec<String> = segments
        .map(|segment| urlencoding::encode(&encode_component(segment)).into_owned())
        .collect();
    format!("/{}", encoded.join("/"))
}

/// Query pairs encoded once and sorted by key, then value
fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query()
        .map(|q| {
            q.split('&')
                .filter(|p| !p.is_empty())
                .map(|pair| {
                    let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                    (encode_component(key), encode_component(value))
                })
                .collect()
        })
        .unwrap_or_default();
    pairs.sort();
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Re-encode an already percent-encoded component with only
/// `A-Za-z0-9-_.~` left bare
fn encode_component(raw: &str) -> String {
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    urlencoding::encode(&decoded).into_owned()
}
