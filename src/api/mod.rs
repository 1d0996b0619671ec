pub mod components;
pub mod request;
pub mod response;
pub mod transport;

pub use components::ComponentFilter;
pub use request::{FIELD_NAMES, GEOCODE_ENDPOINT, GeocodingRequest, Operation};
pub use response::{AddressComponent, GeocodeResponse, find_address_component};
pub use transport::{HttpGet, HttpResponse, ReqwestTransport};
