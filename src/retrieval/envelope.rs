//! Response envelope shapes.
//!
//! The patient service has been seen wrapping its records under different
//! keys. Each shape is one extraction strategy; they are tried in order and
//! the first match wins, so pagination never has to know about them.

use serde_json::Value;

/// One way of locating the record array inside a page body.
pub trait EnvelopeShape: Send + Sync {
    fn name(&self) -> &str;

    fn extract<'a>(&self, body: &'a Value) -> Option<&'a [Value]>;
}

/// Records live in an array under a top-level key, e.g. `{"data": [...]}`.
///
/// A key that is present but not an array does not match.
pub struct KeyedArray(pub &'static str);

impl EnvelopeShape for KeyedArray {
    fn name(&self) -> &str {
        self.0
    }

    fn extract<'a>(&self, body: &'a Value) -> Option<&'a [Value]> {
        body.get(self.0)?.as_array().map(Vec::as_slice)
    }
}

/// Recognized shapes in precedence order: `data`, `patients`, `results`.
pub fn default_shapes() -> Vec<Box<dyn EnvelopeShape>> {
    vec![
        Box::new(KeyedArray("data")),
        Box::new(KeyedArray("patients")),
        Box::new(KeyedArray("results")),
    ]
}

/// Find the record array using the first shape that matches.
pub fn extract_records<'a>(
    shapes: &[Box<dyn EnvelopeShape>],
    body: &'a Value,
) -> Option<&'a [Value]> {
    shapes.iter().find_map(|shape| {
        let records = shape.extract(body)?;
        tracing::trace!(
            shape = shape.name(),
            count = records.len(),
            "Envelope shape matched"
        );
        Some(records)
    })
}
