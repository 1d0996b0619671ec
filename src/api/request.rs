use tracing::debug;

use super::components::ComponentFilter;
use super::response::{AddressComponent, GeocodeResponse, find_address_component};
use super::transport::{HttpGet, ReqwestTransport};
use crate::error::{GeocodeError, Result, TransportError};

pub const GEOCODE_ENDPOINT: &str = "https://maps.google.com/maps/api/geocode/json";

/// Query parameter names, in the order they are serialized
pub const FIELD_NAMES: [&str; 9] = [
    "address",
    "bounds",
    "components",
    "key",
    "language",
    "latlng",
    "location_type",
    "region",
    "result_type",
];

const REDACTED: &str = "REDACTED";

/// Which call a query is being built for.
///
/// Each operation normalizes its own primary field and leaves the other
/// multi-valued field as a plain join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Geocode,
    ReverseGeocode,
}

/// A reusable set of geocoding request parameters bound to a transport.
///
/// Unset (`None`) and empty (`""`) fields are left out of the query.
/// `address` and `latlng` accept several values which are joined at
/// serialization time.
#[derive(Debug, Clone)]
pub struct GeocodingRequest<T = ReqwestTransport> {
    /// Required for forward geocoding
    pub address: Vec<String>,
    pub bounds: Option<String>,
    pub components: Option<String>,
    pub key: Option<String>,
    pub language: Option<String>,
    /// Required for reverse geocoding
    pub latlng: Vec<String>,
    /// ROOFTOP, RANGE_INTERPOLATED, GEOMETRIC_CENTER or APPROXIMATE
    pub location_type: Option<String>,
    pub region: Option<String>,
    pub result_type: Option<String>,
    transport: T,
}

impl GeocodingRequest<ReqwestTransport> {
    /// Create a request using a default blocking reqwest client
    pub fn new() -> std::result::Result<Self, TransportError> {
        Ok(Self::with_transport(ReqwestTransport::with_defaults()?))
    }
}

impl<T: HttpGet> GeocodingRequest<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            address: Vec::new(),
            bounds: None,
            components: None,
            key: None,
            language: None,
            latlng: Vec::new(),
            location_type: None,
            region: None,
            result_type: None,
            transport,
        }
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = vec![address.into()];
        self
    }

    /// Several address lines, joined with ", " when sent
    pub fn address_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.address = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn latlng(mut self, latlng: impl Into<String>) -> Self {
        self.latlng = vec![latlng.into()];
        self
    }

    /// Several coordinate parts, joined with "," when sent
    pub fn latlng_parts<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.latlng = parts.into_iter().map(Into::into).collect();
        self
    }

    pub fn coordinates(self, lat: f64, lng: f64) -> Self {
        self.latlng(format!("{lat},{lng}"))
    }

    pub fn bounds(mut self, bounds: impl Into<String>) -> Self {
        self.bounds = Some(bounds.into());
        self
    }

    pub fn components(mut self, components: impl Into<String>) -> Self {
        self.components = Some(components.into());
        self
    }

    pub fn component_filter(self, filter: &ComponentFilter) -> Self {
        self.components(filter.to_string())
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn location_type(mut self, location_type: impl Into<String>) -> Self {
        self.location_type = Some(location_type.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn result_type(mut self, result_type: impl Into<String>) -> Self {
        self.result_type = Some(result_type.into());
        self
    }

    /// Non-empty parameters for `operation`, in `FIELD_NAMES` order
    pub fn query_pairs(&self, operation: Operation) -> Vec<(&'static str, String)> {
        let address = match operation {
            Operation::Geocode => normalize_address(&self.address),
            Operation::ReverseGeocode => self.address.join(", "),
        };
        let latlng = match operation {
            Operation::Geocode => self.latlng.join(","),
            Operation::ReverseGeocode => normalize_latlng(&self.latlng),
        };

        let values = [
            address.as_str(),
            field(&self.bounds),
            field(&self.components),
            field(&self.key),
            field(&self.language),
            latlng.as_str(),
            field(&self.location_type),
            field(&self.region),
            field(&self.result_type),
        ];

        FIELD_NAMES
            .into_iter()
            .zip(values)
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| (name, value.to_string()))
            .collect()
    }

    /// Form-urlencoded query string for `operation`
    pub fn query_string(&self, operation: Operation) -> String {
        encode_pairs(self.query_pairs(operation))
    }

    pub fn url(&self, operation: Operation) -> String {
        format!("{}?{}", GEOCODE_ENDPOINT, self.query_string(operation))
    }

    /// Request URL with the API key masked, for logging
    pub(crate) fn redacted_url(&self, operation: Operation) -> String {
        let pairs = self
            .query_pairs(operation)
            .into_iter()
            .map(|(name, value)| {
                if name == "key" {
                    (name, REDACTED.to_string())
                } else {
                    (name, value)
                }
            });
        format!("{}?{}", GEOCODE_ENDPOINT, encode_pairs(pairs))
    }

    /// Convert the address into coordinates.
    ///
    /// Returns `None` on any failure: no response, a non-200 status, a body
    /// that is not a JSON object, or a status other than "OK".
    pub fn geocode(&self) -> Option<GeocodeResponse> {
        self.send_or_discard(Operation::Geocode)
    }

    /// Convert `latlng` into an address. Same failure contract as `geocode`.
    pub fn reverse_geocode(&self) -> Option<GeocodeResponse> {
        self.send_or_discard(Operation::ReverseGeocode)
    }

    /// Like `geocode`, but reports why no result was produced
    pub fn try_geocode(&self) -> Result<GeocodeResponse> {
        self.send(Operation::Geocode)
    }

    pub fn try_reverse_geocode(&self) -> Result<GeocodeResponse> {
        self.send(Operation::ReverseGeocode)
    }

    /// Clear every parameter so the request can be reused
    pub fn reset(&mut self) {
        self.address.clear();
        self.bounds = None;
        self.components = None;
        self.key = None;
        self.language = None;
        self.latlng.clear();
        self.location_type = None;
        self.region = None;
        self.result_type = None;
    }

    /// See [`find_address_component`]
    pub fn get_address_component<'a, S: AsRef<str>>(
        &self,
        component_types: &[S],
        address_components: &'a [AddressComponent],
    ) -> Option<&'a AddressComponent> {
        find_address_component(component_types, address_components)
    }

    fn send(&self, operation: Operation) -> Result<GeocodeResponse> {
        debug!(
            ?operation,
            url = %self.redacted_url(operation),
            "Sending geocoding request"
        );

        let response = self.transport.get(&self.url(operation))?;
        debug!(status = response.status, bytes = response.body.len(), "Geocoding response");

        if response.status != 200 {
            return Err(GeocodeError::HttpStatus(response.status));
        }

        GeocodeResponse::from_body(&response.body)
    }

    fn send_or_discard(&self, operation: Operation) -> Option<GeocodeResponse> {
        match self.send(operation) {
            Ok(response) => Some(response),
            Err(err) => {
                debug!(?operation, error = %err, "Discarding geocoding response");
                None
            }
        }
    }
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn encode_pairs<I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'static str, String)>,
{
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Join lines with ", " and turn each ASCII whitespace run into a single "+".
///
/// Non-ASCII spaces such as U+00A0 are kept as-is.
fn normalize_address(lines: &[String]) -> String {
    let joined = lines.join(", ");
    let mut normalized = String::with_capacity(joined.len());
    let mut in_whitespace = false;

    for ch in joined.chars() {
        if ch.is_ascii_whitespace() || ch == '\x0B' {
            if !in_whitespace {
                normalized.push('+');
            }
            in_whitespace = true;
        } else {
            normalized.push(ch);
            in_whitespace = false;
        }
    }

    normalized
}

/// Join parts with "," and drop every space
fn normalize_latlng(parts: &[String]) -> String {
    parts.join(",").replace(' ', "")
}
