//! Tagged-JSON encoding and decoding.
//!
//! Values serialize to plain JSON, except records and foreign values: those consult the
//! [registry](crate::registry) and write their payload as a JSON object carrying the serializer's
//! wire tag under [`TAG_KEY`]. A non-object payload is wrapped in an object under
//! [`PAYLOAD_KEY`] so the tag has somewhere to live.
//!
//! Decoding is the reverse: JSON is parsed, then revived bottom-up, replacing tagged objects with
//! whatever the tag's registered serializer decodes them into. An object tagged with an
//! *unregistered* tag is passed through as a plain map, tag stripped, rather than failing.
//!
//! ```rust
//! # use regson::{dumps, loads, Field, Fields, Record, Schema, Value};
//! let pt = Schema::build("Point")
//!     .namespace("codec_docs")
//!     .field(Field::new("x").default(Value::from(0)))
//!     .field(Field::new("y").default(Value::from(0)))
//!     .finish();
//!
//! let p = Record::new(&pt, vec![Value::from(3), Value::from(4)], Fields::new()).unwrap();
//! let text = dumps(&Value::Record(p.clone())).unwrap();
//! assert_eq!(
//!     text,
//!     r#"{"x":3,"y":4,"SERIALIZER_TYPE":"codec_docs.Point"}"#,
//! );
//! assert_eq!(loads(&text).unwrap(), Value::Record(p));
//! ```

use crate::ds::{Fields, Value};
use crate::schema::ConstructError;
use std::fmt;
use std::io;

mod de;
mod ser;

pub(crate) use ser::AsJson;

/// Reserved object key carrying the wire tag of a serialized record or foreign value.
pub const TAG_KEY: &str = "SERIALIZER_TYPE";

/// Reserved object key wrapping a non-object payload so it can carry a tag.
pub const PAYLOAD_KEY: &str = "SERIALIZER_OBJ";

/// Reserved tag carrying floats JSON has no literal for (`NaN`, `Infinity`, `-Infinity`).
///
/// JSON writers emit `null` for non-finite floats, which would corrupt a round trip silently.
/// Instead such a float is written as a tagged object wrapping its name string, and revived back
/// into the float it was. The tag is recognized before any registry lookup.
pub const FLOAT_TAG: &str = "regson.float";

/// An encode hook failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The value's type has no registry entry.
    Unregistered(String),
    /// The hook rejected the value.
    Message(String),
}

impl std::error::Error for EncodeError {}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncodeError::Unregistered(what) => {
                write!(f, "no serializer registered for {}", what)
            }
            EncodeError::Message(msg) => write!(f, "{}", msg),
        }
    }
}

/// Decoding JSON text into a [`Value`] failed.
#[derive(Debug)]
pub enum DecodeError {
    /// The text is not valid JSON.
    Json(serde_json::Error),
    /// A revived record failed construction.
    Construct(ConstructError),
    /// A decode hook rejected its payload.
    Message(String),
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Json(e) => Some(e),
            DecodeError::Construct(e) => Some(e),
            DecodeError::Message(_) => None,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::Json(e) => write!(f, "invalid json: {}", e),
            DecodeError::Construct(e) => write!(f, "{}", e),
            DecodeError::Message(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        DecodeError::Json(e)
    }
}

impl From<ConstructError> for DecodeError {
    fn from(e: ConstructError) -> Self {
        DecodeError::Construct(e)
    }
}

/// Serialize a value to a JSON string.
///
/// Registry lookup failures and encode-hook errors surface through the returned
/// [`serde_json::Error`].
pub fn dumps(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(&AsJson(value))
}

/// Serialize a value as JSON into a writer.
pub fn dump<W: io::Write>(value: &Value, writer: W) -> Result<(), serde_json::Error> {
    serde_json::to_writer(writer, &AsJson(value))
}

/// Parse a JSON string into a [`Value`], reviving tagged objects through the registry.
pub fn loads(text: &str) -> Result<Value, DecodeError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    de::revive(json, None)
}

/// Parse JSON from a reader into a [`Value`].
pub fn load<R: io::Read>(reader: R) -> Result<Value, DecodeError> {
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    de::revive(json, None)
}

/// Like [`loads`], but every *untagged* JSON object is passed through `hook` instead of becoming
/// a plain [`Value::Map`]. Tagged objects still go through the registry, and an object whose tag
/// nobody registered passes through as its payload without consulting `hook`: carrying a tag,
/// even a stale one, marks it as something richer than a plain map.
pub fn loads_with<F>(text: &str, hook: F) -> Result<Value, DecodeError>
where
    F: Fn(Fields) -> Value,
{
    let json: serde_json::Value = serde_json::from_str(text)?;
    de::revive(json, Some(&hook))
}
