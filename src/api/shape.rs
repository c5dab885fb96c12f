//! Response-shape tolerance.
//!
//! The Seller API returns some lists either as a top-level field or wrapped
//! one level down under `result`. Each lookup walks an ordered list of
//! [`Strategy`] values and takes the first container that holds the field.
//! When none does, the error carries the top-level keys that were actually
//! present.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ResolutionError, Stage};

/// Where to look for a field in a response object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The field sits on the response object itself.
    TopLevel,
    /// The field sits on an object nested under the given key.
    Nested(&'static str),
}

/// Strategies tried for every Seller API list field, in order.
pub const STRATEGIES: &[Strategy] = &[Strategy::TopLevel, Strategy::Nested("result")];

impl Strategy {
    fn container<'a>(&self, response: &'a Value) -> Option<&'a Map<String, Value>> {
        match self {
            Self::TopLevel => response.as_object(),
            Self::Nested(key) => response.get(*key).and_then(Value::as_object),
        }
    }
}

/// Find the object that holds `field`.
///
/// # Errors
///
/// Returns [`ResolutionError::UnexpectedShape`] listing the top-level keys
/// when no strategy matches.
pub fn locate_container<'a>(
    response: &'a Value,
    field: &'static str,
    stage: Stage,
) -> Result<&'a Map<String, Value>, ResolutionError> {
    STRATEGIES
        .iter()
        .filter_map(|strategy| strategy.container(response))
        .find(|container| container.contains_key(field))
        .ok_or_else(|| ResolutionError::UnexpectedShape {
            stage,
            field,
            keys: top_level_keys(response),
        })
}

/// Locate `field` and decode it into `T`.
pub fn extract<T: DeserializeOwned>(
    response: &Value,
    field: &'static str,
    stage: Stage,
) -> Result<T, ResolutionError> {
    let container = locate_container(response, field, stage)?;
    decode_field(container, field, stage)
}

/// Decode `field` of an already located container.
pub fn decode_field<T: DeserializeOwned>(
    container: &Map<String, Value>,
    field: &'static str,
    stage: Stage,
) -> Result<T, ResolutionError> {
    let value = container.get(field).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|err| ResolutionError::InvalidRecord {
        stage,
        field,
        reason: err.to_string(),
    })
}

fn top_level_keys(response: &Value) -> Vec<String> {
    let mut keys: Vec<String> = response
        .as_object()
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}
