//! Response types for the recognizer service

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single dataset match reported by the recognizer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FaceMatch {
    /// Stored image filename, valid for the download endpoint
    pub filename: String,
    /// Similarity score in percent (0-100)
    pub similarity: f64,
    /// Extra fields the service reports alongside (original name, path, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Normalize a search response body into a flat list of matches.
///
/// The service has shipped two shapes over time: a bare JSON array of
/// match records, and an object wrapping the same array under `results`.
/// Both normalize to the same list; any other shape yields an empty one.
/// Records missing required fields are skipped rather than failing the
/// whole response.
pub fn normalize_matches(body: Value) -> Vec<FaceMatch> {
    let records = match body {
        Value::Array(records) => records,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(records)) => records,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<FaceMatch>(record) {
            Ok(m) => Some(m),
            Err(err) => {
                tracing::debug!("skipping malformed match record: {}", err);
                None
            }
        })
        .collect()
}
