//! The region/realm/timestamp identifier naming one market snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which auction snapshot to process. Parsed fresh from every request body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionRealmTimestampTuple {
    pub region: String,
    pub realm: String,
    /// Unix seconds of the snapshot.
    pub timestamp: i64,
}

/// Why a body could not be turned into a tuple.
#[derive(Debug, thiserror::Error)]
pub enum TupleParseError {
    #[error("request body is empty")]
    Empty,
    #[error("request body is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),
    #[error("invalid tuple: {0}")]
    Json(#[from] serde_json::Error),
}

impl RegionRealmTimestampTuple {
    pub fn new(region: impl Into<String>, realm: impl Into<String>, timestamp: i64) -> Self {
        Self {
            region: region.into(),
            realm: realm.into(),
            timestamp,
        }
    }

    /// Parse the JSON encoding `{"region":..,"realm":..,"timestamp":..}`.
    ///
    /// Region and realm are passed through untouched, empty strings included;
    /// whether they name a real realm is for the engine to decide.
    pub fn parse(body: &str) -> Result<Self, TupleParseError> {
        if body.trim().is_empty() {
            return Err(TupleParseError::Empty);
        }
        Ok(serde_json::from_str(body)?)
    }

    /// Parse a raw request body.
    pub fn parse_bytes(body: &[u8]) -> Result<Self, TupleParseError> {
        Self::parse(std::str::from_utf8(body)?)
    }

    /// Serialize back into the request encoding.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for RegionRealmTimestampTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} at {}", self.region, self.realm, self.timestamp)
    }
}
