/// Request validation helpers
///
/// Validation failures are reported as a map from field name to the list of
/// messages for that field, so clients can render errors next to each input.
///
/// This module also holds the lenient numeric coercion applied to prices and
/// quantities: clients historically send numbers, numeric strings, empty strings
/// or nothing at all, and the API accepts all of them.
///
/// # Example
///
/// ```
/// use storefront_shared::validation::{coerce_price, FieldErrors};
/// use serde_json::json;
///
/// assert_eq!(coerce_price(Some(&json!("12.5"))), 12.5);
/// assert_eq!(coerce_price(Some(&json!("abc"))), 0.0);
///
/// let mut errors = FieldErrors::new();
/// errors.add("name", "Product name is required.");
/// assert!(errors.into_result().is_err());
/// ```

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use validator::ValidationErrors;

/// Field name → validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Creates an empty error map
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map holding one message for one field
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Appends a message for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Moves every message of `other` into this map
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Moves in the messages of fields that have none here yet
    pub fn merge_unset(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_insert(messages);
        }
    }

    /// Messages recorded for a field
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Whether a field has at least one message
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Number of fields with errors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when no errors were collected
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut mapped = FieldErrors::new();

        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                mapped.add(field.to_string(), message);
            }
        }

        mapped
    }
}

/// Interprets a JSON value as a number the way form inputs are interpreted
///
/// Numbers pass through, strings are trimmed and parsed, everything else is
/// not numeric. Non-finite values are rejected.
fn numeric_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|v| v.is_finite())
}

/// Coerces a submitted price
///
/// Missing, empty or non-numeric input becomes `0.0`. Negative values are kept
/// so that validation can reject them.
pub fn coerce_price(value: Option<&Value>) -> f64 {
    value.and_then(numeric_value).unwrap_or(0.0)
}

/// Coerces the quantity of a new order
///
/// Missing, empty, zero or non-numeric input becomes `1`; numeric input is
/// truncated toward zero.
pub fn coerce_new_quantity(value: Option<&Value>) -> i64 {
    match value.and_then(numeric_value) {
        Some(v) if v != 0.0 => v.trunc() as i64,
        _ => 1,
    }
}

/// Coerces the quantity of an order edit
///
/// Unlike creation there is no default: missing or non-numeric input becomes
/// `0`, which then fails the positive-quantity rule. Booleans count as `1`
/// and `0`.
pub fn coerce_quantity_update(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Bool(flag)) => i64::from(*flag),
        other => other
            .and_then(numeric_value)
            .map(|v| v.trunc() as i64)
            .unwrap_or(0),
    }
}

/// Trimmed, non-empty string content
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
