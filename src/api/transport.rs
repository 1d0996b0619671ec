use std::time::Duration;

use crate::error::TransportError;

pub const DEFAULT_USER_AGENT: &str = concat!("gmaps-geocode/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Status code and raw body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Blocking HTTP GET collaborator.
///
/// Any response the server sends back, whatever its status, is `Ok`.
/// `Err` means no response was obtained.
pub trait HttpGet {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpGet + ?Sized> HttpGet for &T {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        (**self).get(url)
    }
}

/// `HttpGet` backed by a blocking reqwest client.
///
/// Errors never carry the request URL, which holds the API key.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.without_url()))?;

        Ok(Self { client })
    }

    pub fn with_defaults() -> Result<Self, TransportError> {
        Self::new(
            DEFAULT_USER_AGENT,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }
}

impl HttpGet for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| TransportError::Request(e.without_url()))?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| TransportError::Body(e.without_url()))?;

        Ok(HttpResponse { status, body })
    }
}
