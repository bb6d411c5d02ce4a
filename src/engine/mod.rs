pub mod mock;
pub mod sqlite;

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::tuple::RegionRealmTimestampTuple;

/// Result codes shared across the pipeline. Only `Ok` means success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Ok,
    Blank,
    GenericError,
    MsgJsonParseError,
    NotFound,
    UserError,
}

impl Code {
    /// Wire value of the code.
    pub fn as_i32(self) -> i32 {
        match self {
            Code::Ok => 1,
            Code::Blank => 0,
            Code::GenericError => -1,
            Code::MsgJsonParseError => -2,
            Code::NotFound => -3,
            Code::UserError => -4,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Code::Ok
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Code::Ok => "ok",
            Code::Blank => "blank",
            Code::GenericError => "generic-error",
            Code::MsgJsonParseError => "msg-json-parse-error",
            Code::NotFound => "not-found",
            Code::UserError => "user-error",
        };
        write!(f, "{} ({})", name, self.as_i32())
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

/// The engine's verdict for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub code: Code,
    /// Payload; only meaningful when `code` is `Ok`.
    pub data: String,
    pub err: Option<String>,
}

impl Message {
    pub fn ok(data: impl Into<String>) -> Self {
        Self {
            code: Code::Ok,
            data: data.into(),
            err: None,
        }
    }

    pub fn error(code: Code, err: impl Into<String>) -> Self {
        Self {
            code,
            data: String::new(),
            err: Some(err.into()),
        }
    }
}

/// Computes pricelist histories for one snapshot. The handler only knows this trait.
///
/// One instance serves every request, so implementations must tolerate
/// concurrent `run` calls. Failures are reported through the returned
/// [`Message`], never as a panic or a transport error.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn run(&self, tuple: RegionRealmTimestampTuple) -> Message;
}
