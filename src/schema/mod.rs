//! The declarative schema model: ordered field tables and the builder that derives record
//! behavior from them.
//!
//! A [`Schema`] is built once per record type, at definition time, and is immutable afterwards.
//! The [`SchemaBuilder`] merges ancestor schemas, applies the type's own declarations on top
//! (overriding in place, never reordering), and finally registers the finished schema with the
//! process-wide serializer registry so instances round-trip through JSON.
//!
//! ```rust
//! # use regson::{Field, Fields, Record, Schema, Value};
//! let base = Schema::build("Shape")
//!     .namespace("schema_docs")
//!     .field(Field::new("x").default(Value::from(0)))
//!     .field(Field::new("y").default(Value::from(0)))
//!     .finish();
//!
//! let circle = Schema::build("Circle")
//!     .namespace("schema_docs")
//!     .extend(&base)
//!     .field(Field::new("r").default(Value::from(1)))
//!     .finish();
//!
//! assert_eq!(
//!     circle.fields().iter().map(|f| f.name()).collect::<Vec<_>>(),
//!     ["x", "y", "r"],
//! );
//! ```

use crate::codec::{DecodeError, EncodeError};
use crate::ds::{Record, Value};
use crate::registry;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

mod field;

pub use field::{DefaultFactory, Field, FieldFlags, MissingDefault};

/// Process-unique identity of a built [`Schema`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SchemaId(u64);

fn next_id() -> SchemaId {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    SchemaId(COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Post-construction hook, run after argument binding and before freezing.
pub type PostInit = Arc<dyn Fn(&mut Record) -> Result<(), String> + Send + Sync>;

/// Construction failed.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ConstructError {
    /// A required field received neither an argument nor a default.
    MissingRequired(String),
    /// A keyword argument was left over and the schema denies extras.
    UnexpectedKeyword(String),
    /// The post-construction hook reported an error.
    PostInit(String),
}

impl std::error::Error for ConstructError {}

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConstructError::MissingRequired(name) => {
                write!(f, "missing required argument: {}", name)
            }
            ConstructError::UnexpectedKeyword(name) => {
                write!(f, "unexpected keyword argument '{}'", name)
            }
            ConstructError::PostInit(msg) => write!(f, "post-construction hook failed: {}", msg),
        }
    }
}

/// The ordered, immutable field table of one record type.
///
/// Built once by a [`SchemaBuilder`] and shared behind an `Arc`; safe to read from any thread.
/// The schema's `tag` (`"<namespace>.<name>"`) identifies it on the wire and must be unique per
/// process for round-tripping; colliding tags shadow each other silently at lookup time.
pub struct Schema {
    id: SchemaId,
    name: String,
    namespace: String,
    fields: Vec<Field>,
    parents: Vec<Arc<Schema>>,
    frozen: bool,
    allow_extra: bool,
    post_init: Option<PostInit>,
}

impl Schema {
    /// Start building a schema for a record type with the given name.
    pub fn build<S: Into<String>>(name: S) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            namespace: None,
            fields: Vec::new(),
            parents: Vec::new(),
            frozen: false,
            allow_extra: true,
            post_init: None,
        }
    }

    /// The open, fieldless `Message` schema: assign anything with [`Record::set`] or
    /// [`Record::update`], and everything assigned round-trips.
    ///
    /// Built and registered lazily on first use, with a custom encode/decode pair exporting the
    /// raw value table rather than the (empty) declared-field table.
    pub fn message() -> Arc<Schema> {
        static MESSAGE: OnceLock<Arc<Schema>> = OnceLock::new();
        MESSAGE
            .get_or_init(|| {
                let schema = Schema::build("Message")
                    .namespace("regson")
                    .finish_unregistered();
                let decode_schema = Arc::clone(&schema);
                registry::register_with(
                    &schema,
                    Some(Arc::new(|value: &Value| match value.record() {
                        Some(record) => Ok(Value::Map(record.values().clone())),
                        None => Err(EncodeError::Message(
                            "message encode expects a record".to_string(),
                        )),
                    })),
                    Some(Arc::new(move |payload: Value| match payload {
                        Value::Map(fields) => {
                            let mut record = Record::raw(&decode_schema);
                            record.apply_state(fields);
                            Ok(Value::Record(record))
                        }
                        other => Err(DecodeError::Message(format!(
                            "message decode expects a mapping, got {}",
                            other
                        ))),
                    })),
                );
                schema
            })
            .clone()
    }

    /// The schema's process-unique identity.
    pub fn id(&self) -> SchemaId {
        self.id
    }

    /// The record type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tag namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The wire tag, `"<namespace>.<name>"`.
    pub fn tag(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// The ordered field table: inherited fields first, in ancestor order, then own declarations.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// The direct ancestors this schema was extended from.
    pub fn parents(&self) -> &[Arc<Schema>] {
        &self.parents
    }

    /// Records of this schema reject attribute writes once construction returns.
    pub fn frozen(&self) -> bool {
        self.frozen
    }

    /// Leftover keyword arguments are ignored rather than rejected.
    pub fn allow_extra(&self) -> bool {
        self.allow_extra
    }

    /// `id` names this schema or any of its ancestors.
    pub fn is_or_has_ancestor(&self, id: SchemaId) -> bool {
        self.id == id || self.has_ancestor(id)
    }

    /// `id` names a (transitive) ancestor of this schema.
    pub fn has_ancestor(&self, id: SchemaId) -> bool {
        self.parents
            .iter()
            .any(|p| p.id == id || p.has_ancestor(id))
    }

    pub(crate) fn post_init(&self) -> Option<&PostInit> {
        self.post_init.as_ref()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Schema")
            .field("tag", &self.tag())
            .field(
                "fields",
                &self.fields.iter().map(|x| x.name()).collect::<Vec<_>>(),
            )
            .field("frozen", &self.frozen)
            .finish()
    }
}

/// Builds a [`Schema`]. See the [module docs](self) for an example.
///
/// Call [`extend`](SchemaBuilder::extend) for each ancestor *before* declaring the type's own
/// fields: inherited fields land first in declaration order, and an own declaration reusing an
/// inherited name overrides that field in place without moving it.
pub struct SchemaBuilder {
    name: String,
    namespace: Option<String>,
    fields: Vec<Field>,
    parents: Vec<Arc<Schema>>,
    frozen: bool,
    allow_extra: bool,
    post_init: Option<PostInit>,
}

impl SchemaBuilder {
    /// Set the tag namespace. Defaults to `"main"`.
    pub fn namespace<S: Into<String>>(mut self, namespace: S) -> SchemaBuilder {
        self.namespace = Some(namespace.into());
        self
    }

    /// Inherit an ancestor's field table. The ancestor's fields are merged into this schema's
    /// table: new names append in the ancestor's order, colliding names are overridden in place
    /// (so a later `extend` wins over an earlier one).
    pub fn extend(mut self, parent: &Arc<Schema>) -> SchemaBuilder {
        for field in parent.fields() {
            upsert(&mut self.fields, field.clone());
        }
        self.parents.push(Arc::clone(parent));
        self
    }

    /// Declare a field. Redeclaring a name (own or inherited) overrides that field in place,
    /// preserving its original position; a new name appends.
    pub fn field(mut self, field: Field) -> SchemaBuilder {
        upsert(&mut self.fields, field);
        self
    }

    /// Reject attribute writes on records of this schema once construction returns.
    pub fn frozen(mut self) -> SchemaBuilder {
        self.frozen = true;
        self
    }

    /// Fail construction on leftover keyword arguments instead of ignoring them.
    pub fn deny_extra(mut self) -> SchemaBuilder {
        self.allow_extra = false;
        self
    }

    /// Run a hook after argument binding, before the record is frozen and returned.
    pub fn post_init<F>(mut self, hook: F) -> SchemaBuilder
    where
        F: Fn(&mut Record) -> Result<(), String> + Send + Sync + 'static,
    {
        self.post_init = Some(Arc::new(hook));
        self
    }

    /// Finish the schema and register it with the global registry using the derived state
    /// capture/apply pair.
    pub fn finish(self) -> Arc<Schema> {
        let schema = self.finish_unregistered();
        registry::register(&schema)
    }

    /// Finish the schema and register it with an author-supplied encode/decode pair. The derived
    /// pair never replaces a supplied one.
    pub fn finish_with<E, D>(self, encode: E, decode: D) -> Arc<Schema>
    where
        E: Fn(&Value) -> Result<Value, EncodeError> + Send + Sync + 'static,
        D: Fn(Value) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        let schema = self.finish_unregistered();
        registry::register_with(&schema, Some(Arc::new(encode)), Some(Arc::new(decode)))
    }

    /// Finish the schema without touching the registry. Derived behaviors (construction,
    /// equality, dict export, ...) still work; only serialization is left to the caller.
    pub fn finish_unregistered(self) -> Arc<Schema> {
        Arc::new(Schema {
            id: next_id(),
            name: self.name,
            namespace: self.namespace.unwrap_or_else(|| "main".to_string()),
            fields: self.fields,
            parents: self.parents,
            frozen: self.frozen,
            allow_extra: self.allow_extra,
            post_init: self.post_init,
        })
    }
}

fn upsert(fields: &mut Vec<Field>, field: Field) {
    match fields.iter_mut().find(|f| f.name() == field.name()) {
        Some(slot) => *slot = field,
        None => fields.push(field),
    }
}
