use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::error::{GeocodeError, Result};

pub const STATUS_OK: &str = "OK";

/// Payload of a successful geocoding call.
///
/// Kept as the raw JSON object so nothing the service sends is lost; only
/// `status` and the address components have typed accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GeocodeResponse(Map<String, Value>);

impl GeocodeResponse {
    /// Validate a response body: JSON object whose `status` is `"OK"`
    pub fn from_body(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        let Value::Object(object) = value else {
            return Err(GeocodeError::NotAnObject);
        };

        match object.get("status").and_then(Value::as_str) {
            Some(STATUS_OK) => Ok(Self(object)),
            Some(other) => Err(GeocodeError::Status(other.to_string())),
            None => Err(GeocodeError::MissingStatus),
        }
    }

    pub fn status(&self) -> &str {
        self.0
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn results(&self) -> &[Value] {
        self.0
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn first_formatted_address(&self) -> Option<&str> {
        self.results()
            .first()?
            .get("formatted_address")?
            .as_str()
    }

    /// `(lat, lng)` of the first result's geometry
    pub fn first_location(&self) -> Option<(f64, f64)> {
        let location = self.results().first()?.get("geometry")?.get("location")?;
        let lat = location.get("lat")?.as_f64()?;
        let lng = location.get("lng")?.as_f64()?;
        Some((lat, lng))
    }

    /// Typed address components of the result at `index`.
    ///
    /// Components that don't deserialize (e.g. missing `types`) are skipped.
    pub fn address_components(&self, index: usize) -> Vec<AddressComponent> {
        self.results()
            .get(index)
            .and_then(|result| result.get("address_components"))
            .and_then(Value::as_array)
            .map(|components| {
                components
                    .iter()
                    .filter_map(|c| serde_json::from_value(c.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// One structured piece of a geocoded result, e.g. a locality or postal code
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AddressComponent {
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    pub types: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AddressComponent {
    /// True when `types` holds exactly the members of `component_types`,
    /// ignoring order and duplicates
    pub fn has_types<S: AsRef<str>>(&self, component_types: &[S]) -> bool {
        let wanted: BTreeSet<&str> = component_types.iter().map(AsRef::as_ref).collect();
        let actual: BTreeSet<&str> = self.types.iter().map(String::as_str).collect();
        wanted == actual
    }
}

/// First component whose type set equals `component_types`.
///
/// Overlap is not enough: a component tagged `["locality", "political"]`
/// does not match `["locality"]`.
pub fn find_address_component<'a, S: AsRef<str>>(
    component_types: &[S],
    address_components: &'a [AddressComponent],
) -> Option<&'a AddressComponent> {
    address_components
        .iter()
        .find(|component| component.has_types(component_types))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "status": "OK",
        "results": [{
            "formatted_address": "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
            "geometry": {"location": {"lat": 37.4224764, "lng": -122.0842499}},
            "address_components": [
                {"long_name": "1600", "short_name": "1600", "types": ["street_number"]},
                {"long_name": "Mountain View", "short_name": "Mountain View", "types": ["political", "locality"]},
                {"long_name": "California", "short_name": "CA", "types": ["administrative_area_level_1", "political"]},
                {"long_name": "broken"}
            ]
        }]
    }"#;

    fn component(name: &str, types: &[&str]) -> AddressComponent {
        AddressComponent {
            long_name: name.to_string(),
            short_name: name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_ok_payload_kept_unchanged() {
        let response = GeocodeResponse::from_body(SAMPLE).unwrap();
        let expected: Value = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(response.status(), "OK");
        assert_eq!(response.clone().into_value(), expected);
        assert_eq!(serde_json::to_value(&response).unwrap(), expected);
    }

    #[test]
    fn test_key_order_preserved() {
        let body = r#"{"status":"OK","results":[],"plus_code":{"global_code":"849VCWC8+R9"}}"#;
        let response = GeocodeResponse::from_body(body).unwrap();

        let keys: Vec<_> = response.as_object().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["status", "results", "plus_code"]);
        assert_eq!(serde_json::to_string(&response).unwrap(), body);
    }

    #[test]
    fn test_rejected_envelopes() {
        assert!(matches!(
            GeocodeResponse::from_body(r#"{"status":"ZERO_RESULTS","results":[]}"#),
            Err(GeocodeError::Status(s)) if s == "ZERO_RESULTS"
        ));
        assert!(matches!(
            GeocodeResponse::from_body("not json"),
            Err(GeocodeError::MalformedBody(_))
        ));
        assert!(matches!(
            GeocodeResponse::from_body(r#"["OK"]"#),
            Err(GeocodeError::NotAnObject)
        ));
        assert!(matches!(
            GeocodeResponse::from_body(r#"{"results":[]}"#),
            Err(GeocodeError::MissingStatus)
        ));
        assert!(matches!(
            GeocodeResponse::from_body(r#"{"status":1}"#),
            Err(GeocodeError::MissingStatus)
        ));
    }

    #[test]
    fn test_result_accessors() {
        let response = GeocodeResponse::from_body(SAMPLE).unwrap();

        assert_eq!(response.results().len(), 1);
        assert_eq!(
            response.first_formatted_address(),
            Some("1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA")
        );
        let (lat, lng) = response.first_location().unwrap();
        assert!((lat - 37.4224764).abs() < 1e-9);
        assert!((lng + 122.0842499).abs() < 1e-9);
    }

    #[test]
    fn test_accessors_on_empty_results() {
        let response = GeocodeResponse::from_body(r#"{"status":"OK"}"#).unwrap();

        assert!(response.results().is_empty());
        assert_eq!(response.first_formatted_address(), None);
        assert_eq!(response.first_location(), None);
        assert!(response.address_components(0).is_empty());
    }

    #[test]
    fn test_address_components_skip_untyped() {
        let response = GeocodeResponse::from_body(SAMPLE).unwrap();
        let components = response.address_components(0);

        assert_eq!(components.len(), 3);
        assert_eq!(components[2].short_name, "CA");
    }

    #[test]
    fn test_find_exact_type_set() {
        let response = GeocodeResponse::from_body(SAMPLE).unwrap();
        let components = response.address_components(0);

        let found = find_address_component(&["locality", "political"], &components).unwrap();
        assert_eq!(found.long_name, "Mountain View");
    }

    #[test]
    fn test_find_ignores_subset_and_superset() {
        let components = vec![
            component("superset", &["locality", "political", "colloquial_area"]),
            component("subset", &["locality"]),
            component("exact", &["political", "locality"]),
        ];

        let found = find_address_component(&["locality", "political"], &components).unwrap();
        assert_eq!(found.long_name, "exact");

        assert!(find_address_component(&["postal_code"], &components).is_none());
        assert!(find_address_component(&["locality", "political"], &components[..2]).is_none());
    }

    #[test]
    fn test_find_returns_first_match() {
        let components = vec![
            component("first", &["route"]),
            component("second", &["route"]),
        ];

        let found = find_address_component(&["route".to_string()], &components).unwrap();
        assert_eq!(found.long_name, "first");
    }

    #[test]
    fn test_has_types_ignores_duplicates() {
        let c = component("x", &["locality", "political"]);
        assert!(c.has_types(&["political", "locality", "locality"]));
    }
}
