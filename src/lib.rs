#![warn(missing_docs)]
//! **regson** is a registry-driven tagged-JSON serialization system for dynamic record types.
//!
//! Record types are declared as [`Schema`]s: ordered field tables with defaults, inclusion flags
//! and inheritance, from which construction, equality, hashing, representation and state capture
//! are all derived. Finished schemas register with a process-wide serializer registry, and from
//! then on records of that schema round-trip through JSON as *tagged objects*: ordinary JSON
//! objects carrying the schema's wire tag under a reserved key.
//!
//! # A taste
//!
//! ```rust
//! use regson::{dumps, loads, Field, Fields, Record, Schema, Value};
//!
//! let user = Schema::build("User")
//!     .namespace("docs")
//!     .field(Field::new("name"))
//!     .field(Field::new("admin").default(Value::Bool(false)))
//!     .finish();
//!
//! let alice = Record::new(&user, vec![Value::from("alice")], Fields::new()).unwrap();
//! assert_eq!(alice.to_string(), "User(name=alice, admin=false)");
//!
//! let text = dumps(&Value::Record(alice.clone())).unwrap();
//! assert_eq!(
//!     text,
//!     r#"{"name":"alice","admin":false,"SERIALIZER_TYPE":"docs.User"}"#,
//! );
//!
//! let back = loads(&text).unwrap();
//! assert_eq!(back, Value::Record(alice));
//! ```
//!
//! # The pieces
//!
//! - [`Value`] is the dynamic data model: JSON's shapes plus [`Record`] and foreign [`Other`]
//!   values.
//! - [`Schema`] and [`Field`] declare record types; [`Record`] is an instance.
//! - The [`registry`] maps schemas (and foreign types, via [`register_other`]) to wire tags and
//!   encode/decode pairs.
//! - [`dumps`]/[`loads`] (and their writer/reader forms [`dump`]/[`load`]) drive the codec.
//!
//! Decoding is forgiving at the edges: an object tagged with a tag nobody registered revives as
//! a plain map rather than failing, so readers can consume documents from writers with a richer
//! registry than their own.

pub mod codec;
pub mod ds;
pub mod registry;
pub mod schema;

pub use codec::{dump, dumps, load, loads, loads_with};
pub use codec::{DecodeError, EncodeError, FLOAT_TAG, PAYLOAD_KEY, TAG_KEY};
pub use ds::{
    Fields, FrozenError, IntoIntError, Kind, Number, Other, OtherValue, Reconstructed, Record,
    Value,
};
pub use registry::{
    get_serializer, register, register_other, register_with, serializer_for, unregister,
    unregister_other, Serializer,
};
pub use schema::{
    ConstructError, DefaultFactory, Field, FieldFlags, MissingDefault, Schema, SchemaBuilder,
    SchemaId,
};
