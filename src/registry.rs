//! The process-wide serializer registry.
//!
//! Every schema that should round-trip through JSON registers a [`Serializer`] here: a wire tag
//! plus an encode/decode pair (author-supplied, or derived from state capture). Foreign plug-in
//! types register typed pairs through [`register_other`] and are looked up by [`TypeId`].
//!
//! Registration is last-write-wins per schema (or per foreign type): re-registering replaces the
//! existing entry in place. Encoding looks a record's schema up exactly first; when the schema
//! itself was never registered, the *first registered* serializer of an ancestor is used instead,
//! so registration order matters for such fallbacks.
//!
//! The registry is a mutex-guarded list. Lookups clone the entry out before returning, so
//! encode/decode closures never run while the registry is locked and are free to consult it
//! themselves.

use crate::codec::{DecodeError, EncodeError};
use crate::ds::{Other, OtherValue, Record, Value};
use crate::schema::{Schema, SchemaId};
use std::any::TypeId;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Boxed encode hook: domain value in, JSON-shaped [`Value`] payload out.
pub type EncodeFn = Arc<dyn Fn(&Value) -> Result<Value, EncodeError> + Send + Sync>;

/// Boxed decode hook: payload in, revived domain value out.
pub type DecodeFn = Arc<dyn Fn(Value) -> Result<Value, DecodeError> + Send + Sync>;

/// What a registry entry is keyed by.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SerializerKey {
    Schema(SchemaId),
    Foreign(TypeId),
}

/// One registry entry: a wire tag and the encode/decode pair behind it.
///
/// Cloned out of the registry on lookup; cheap to clone (two `Arc`s and a tag string).
#[derive(Clone)]
pub struct Serializer {
    key: SerializerKey,
    schema: Option<Arc<Schema>>,
    tag: String,
    encode: Option<EncodeFn>,
    decode: Option<DecodeFn>,
}

impl Serializer {
    /// The wire tag written next to this entry's payloads.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The schema this entry serializes, absent for foreign types.
    pub fn schema(&self) -> Option<&Arc<Schema>> {
        self.schema.as_ref()
    }

    /// Encode a domain value into its wire payload.
    ///
    /// Falls back to [`Record::state`] when no custom encode hook was registered.
    pub fn encode(&self, value: &Value) -> Result<Value, EncodeError> {
        if let Some(hook) = &self.encode {
            return hook(value);
        }
        match value.record() {
            Some(record) => Ok(Value::Map(record.state())),
            None => Err(EncodeError::Message(format!(
                "serializer '{}' expects a record",
                self.tag
            ))),
        }
    }

    /// Decode a wire payload back into a domain value.
    ///
    /// Falls back to [`Record::reconstruct`] when no custom decode hook was registered.
    pub fn decode(&self, payload: Value) -> Result<Value, DecodeError> {
        if let Some(hook) = &self.decode {
            return hook(payload);
        }
        let schema = self.schema.as_ref().ok_or_else(|| {
            DecodeError::Message(format!("serializer '{}' has no decode hook", self.tag))
        })?;
        match payload {
            Value::Map(state) => {
                let (record, _) = Record::reconstruct(schema, state);
                Ok(Value::Record(record))
            }
            other => Err(DecodeError::Message(format!(
                "serializer '{}' expects a mapping payload, got {}",
                self.tag, other
            ))),
        }
    }
}

fn registry() -> MutexGuard<'static, Vec<Serializer>> {
    static REGISTRY: OnceLock<Mutex<Vec<Serializer>>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| Mutex::new(Vec::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn upsert(entry: Serializer) {
    let mut entries = registry();
    match entries.iter_mut().find(|e| e.key == entry.key) {
        Some(slot) => *slot = entry,
        None => entries.push(entry),
    }
}

/// Register a schema with the derived encode/decode pair. Replaces any existing entry for the
/// same schema. Returns the schema back for chaining.
pub fn register(schema: &Arc<Schema>) -> Arc<Schema> {
    register_with(schema, None, None)
}

/// Register a schema, overriding either half of the derived encode/decode pair.
pub fn register_with(
    schema: &Arc<Schema>,
    encode: Option<EncodeFn>,
    decode: Option<DecodeFn>,
) -> Arc<Schema> {
    upsert(Serializer {
        key: SerializerKey::Schema(schema.id()),
        schema: Some(Arc::clone(schema)),
        tag: schema.tag(),
        encode,
        decode,
    });
    Arc::clone(schema)
}

/// Register a foreign type `T` under `tag` with a typed encode/decode pair.
///
/// Encoding fails if a [`Value::Other`] carrying a different concrete type reaches this entry;
/// decoding wraps the revived `T` back into a [`Value::Other`].
pub fn register_other<T, E, D>(tag: &str, encode: E, decode: D)
where
    T: OtherValue,
    E: Fn(&T) -> Result<Value, EncodeError> + Send + Sync + 'static,
    D: Fn(Value) -> Result<T, DecodeError> + Send + Sync + 'static,
{
    let encode: EncodeFn = Arc::new(move |value: &Value| match value.downcast::<T>() {
        Some(inner) => encode(inner),
        None => Err(EncodeError::Message(format!(
            "value is not a {}",
            std::any::type_name::<T>()
        ))),
    });
    let decode: DecodeFn =
        Arc::new(move |payload| decode(payload).map(|v| Value::Other(Other::new(v))));
    upsert(Serializer {
        key: SerializerKey::Foreign(TypeId::of::<T>()),
        schema: None,
        tag: tag.to_string(),
        encode: Some(encode),
        decode: Some(decode),
    });
}

/// Remove a schema's registry entry. A no-op when the schema was never registered.
pub fn unregister(schema: &Arc<Schema>) {
    remove(SerializerKey::Schema(schema.id()));
}

/// Remove a foreign type's registry entry. A no-op when `T` was never registered.
pub fn unregister_other<T: OtherValue>() {
    remove(SerializerKey::Foreign(TypeId::of::<T>()));
}

fn remove(key: SerializerKey) {
    let mut entries = registry();
    if let Some(idx) = entries.iter().position(|e| e.key == key) {
        entries.remove(idx);
    }
}

/// Look a serializer up by its wire tag.
pub fn get_serializer(tag: &str) -> Option<Serializer> {
    registry().iter().find(|e| e.tag == tag).cloned()
}

/// The serializer responsible for `value`: an exact schema match, the first registered ancestor
/// of an unregistered schema, or the foreign type's entry. `None` for plain values, and for
/// records and foreign values nobody registered.
pub fn serializer_for(value: &Value) -> Option<Serializer> {
    let entries = registry();
    match value {
        Value::Record(record) => {
            let schema = record.schema();
            let exact = SerializerKey::Schema(schema.id());
            if let Some(entry) = entries.iter().find(|e| e.key == exact) {
                return Some(entry.clone());
            }
            entries
                .iter()
                .find(|e| match &e.schema {
                    Some(ancestor) => schema.has_ancestor(ancestor.id()),
                    None => false,
                })
                .cloned()
        }
        Value::Other(other) => {
            let key = SerializerKey::Foreign(other.type_id());
            entries.iter().find(|e| e.key == key).cloned()
        }
        _ => None,
    }
}
