//! gmaps-geocode - Minimal blocking client for the Google Maps geocoding web service

pub mod api;
pub mod config;
pub mod error;

pub use api::{
    AddressComponent, ComponentFilter, GeocodeResponse, GeocodingRequest, HttpGet, HttpResponse,
    Operation, ReqwestTransport, find_address_component,
};
pub use error::{GeocodeError, TransportError};
