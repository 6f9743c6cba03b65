use super::{Fields, Value};
use crate::codec::DecodeError;
use crate::schema::{ConstructError, Schema};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;
use std::sync::Arc;

/// Rendered in place of unset fields in representations and hashes.
const MISSING: &str = "<missing>";

/// A schema-bound record instance.
///
/// A `Record` pairs an immutable [`Schema`] with an ordered table of field values. Construction,
/// equality, hashing, textual representation, dictionary export and state capture/apply are all
/// derived from the schema's field declarations.
///
/// # Example
/// ```rust
/// # use regson::{Field, Fields, Record, Schema, Value};
/// let point = Schema::build("Point")
///     .namespace("demo_record")
///     .field(Field::new("x"))
///     .field(Field::new("y"))
///     .field(Field::new("z").default(Value::from(1)))
///     .finish();
///
/// let p = Record::new(&point, vec![Value::from(0), Value::from(0)], Fields::new()).unwrap();
/// assert_eq!(p.get("z"), Some(&Value::from(1)));
/// assert_eq!(p.to_string(), "Point(x=0, y=0, z=1)");
/// ```
#[derive(Clone)]
pub struct Record {
    schema: Arc<Schema>,
    values: Fields,
    frozen: bool,
}

/// Attribute write after construction on a record with a frozen schema.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FrozenError(pub(crate) String);

impl std::error::Error for FrozenError {}

impl fmt::Display for FrozenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "cannot set attributes on frozen record '{}'", self.0)
    }
}

/// Which construction path a default decode took. See [`Record::reconstruct`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reconstructed {
    /// Ordinary zero-argument construction succeeded.
    Constructed,
    /// Construction failed; the record was allocated raw, bypassing the constructor.
    Allocated,
}

impl Record {
    /// Construct a record, binding arguments to fields in schema order.
    ///
    /// Positional arguments bind first, to init fields in declaration order. Remaining init
    /// fields take keyword arguments by name. Remaining fields with defaults re-materialize their
    /// default. A field left with neither fails construction if it is required, and is simply
    /// left unset otherwise.
    ///
    /// Surplus positional arguments are ignored. Leftover keyword arguments are ignored unless
    /// the schema was built with [`deny_extra`], in which case they fail construction.
    ///
    /// After binding, the schema's post-construction hook (if any) runs, and a frozen schema
    /// freezes the record before it is returned.
    ///
    /// [`deny_extra`]: crate::SchemaBuilder::deny_extra
    pub fn new(
        schema: &Arc<Schema>,
        args: Vec<Value>,
        mut kwargs: Fields,
    ) -> Result<Record, ConstructError> {
        let mut record = Record::raw(schema);
        let mut args = args.into_iter();

        for field in schema.fields() {
            if field.in_init() {
                // positional arguments are prioritized
                if let Some(value) = args.next() {
                    record.set_raw(field.name(), value);
                    continue;
                }
                if let Some(value) = kwargs.remove(field.name()) {
                    record.set_raw(field.name(), value);
                    continue;
                }
            }
            if field.has_default() {
                if let Ok(value) = field.resolve_default(&record) {
                    record.set_raw(field.name(), value);
                }
            } else if field.is_required() {
                return Err(ConstructError::MissingRequired(field.name().to_string()));
            }
            // no default and not required: the field is left unset
        }

        if !schema.allow_extra() {
            if let Some(name) = kwargs.keys().next() {
                return Err(ConstructError::UnexpectedKeyword(name.to_string()));
            }
        }

        if let Some(hook) = schema.post_init() {
            hook(&mut record).map_err(ConstructError::PostInit)?;
        }

        if schema.frozen() {
            record.frozen = true;
        }

        Ok(record)
    }

    /// Allocate a record without running the constructor: every field is unset, no defaults are
    /// resolved, the post-construction hook does not run and the record is not frozen.
    ///
    /// This is the fallback primitive used by default decoding; [`apply_state`] is expected to
    /// follow.
    ///
    /// [`apply_state`]: Record::apply_state
    pub fn raw(schema: &Arc<Schema>) -> Record {
        Record {
            schema: Arc::clone(schema),
            values: Fields::new(),
            frozen: false,
        }
    }

    /// Rebuild a record from captured state.
    ///
    /// Tries ordinary zero-argument construction first; if that fails (usually because the
    /// schema has required fields), falls back to [`raw`] allocation. Either way the supplied
    /// state is applied afterwards. The returned [`Reconstructed`] reports which path was taken.
    ///
    /// [`raw`]: Record::raw
    pub fn reconstruct(schema: &Arc<Schema>, state: Fields) -> (Record, Reconstructed) {
        match Record::new(schema, Vec::new(), Fields::new()) {
            Ok(mut record) => {
                record.apply_state(state);
                (record, Reconstructed::Constructed)
            }
            Err(_) => {
                let mut record = Record::raw(schema);
                record.apply_state(state);
                (record, Reconstructed::Allocated)
            }
        }
    }

    /// The record's schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Get a field value by name. Returns `None` for unset or undeclared names.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Set a field value. Names outside the schema are permitted, mirroring open records.
    ///
    /// Fails if the record is frozen.
    pub fn set<S: Into<String>>(&mut self, name: S, value: Value) -> Result<(), FrozenError> {
        if self.frozen {
            return Err(FrozenError(self.schema.name().to_string()));
        }
        self.values.insert(name, value);
        Ok(())
    }

    /// Assign every entry of `fields`, in order. Fails on the first write if frozen.
    pub fn update(&mut self, fields: Fields) -> Result<(), FrozenError> {
        for (name, value) in fields {
            self.set(name, value)?;
        }
        Ok(())
    }

    /// The record is frozen against attribute writes.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The raw field storage, in assignment order.
    pub fn values(&self) -> &Fields {
        &self.values
    }

    pub(crate) fn set_raw(&mut self, name: &str, value: Value) {
        self.values.insert(name, value);
    }

    /// Ordered dictionary export over the schema's dict-flagged fields.
    ///
    /// Unset fields are omitted, as is any field whose current value equals its `skip_dict`
    /// sentinel.
    pub fn dict(&self) -> Fields {
        let mut out = Fields::with_capacity(self.schema.fields().len());
        for field in self.schema.fields() {
            if !field.in_dict() {
                continue;
            }
            if let Some(value) = self.get(field.name()) {
                if field.skip_dict_sentinel() == Some(value) {
                    continue;
                }
                out.insert(field.name(), value.clone());
            }
        }
        out
    }

    /// Capture the record's state. Identical to [`dict`](Record::dict).
    pub fn state(&self) -> Fields {
        self.dict()
    }

    /// Apply captured state.
    ///
    /// Every field with a default is first re-materialized from its default, so a stale value
    /// from a prior copy is never aliased into this record; every entry of `state` is then
    /// assigned verbatim, declared or not. State application writes directly to storage and is
    /// exempt from frozen checks, so frozen records can be reconstructed.
    pub fn apply_state(&mut self, state: Fields) {
        let schema = Arc::clone(&self.schema);
        for field in schema.fields() {
            if field.has_default() {
                if let Ok(value) = field.resolve_default(self) {
                    self.set_raw(field.name(), value);
                }
            }
        }
        for (name, value) in state {
            self.values.insert(name, value);
        }
    }

    /// Serialize this record to JSON text via the global registry.
    pub fn json(&self) -> Result<String, serde_json::Error> {
        crate::codec::dumps(&Value::Record(self.clone()))
    }

    /// Parse JSON text and expect a record back.
    pub fn from_json(text: &str) -> Result<Record, DecodeError> {
        match crate::codec::loads(text)? {
            Value::Record(record) => Ok(record),
            value => Err(DecodeError::Message(format!(
                "decoded value is not a record: {}",
                value
            ))),
        }
    }
}

/// Equality compares the compare-flagged fields of each side by name, order-independently.
/// Records of different schemas are equal when those field sets agree as a whole.
impl PartialEq for Record {
    fn eq(&self, other: &Record) -> bool {
        let collect = |r: &Record| -> std::collections::BTreeMap<String, Option<Value>> {
            r.schema
                .fields()
                .iter()
                .filter(|f| f.in_compare())
                .map(|f| (f.name().to_string(), r.get(f.name()).cloned()))
                .collect()
        };
        collect(self) == collect(other)
    }
}

/// Hashes the ordered `name=value` display pairs of the hash-flagged fields. Consistent with
/// equality for records sharing a schema.
impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for field in self.schema.fields() {
            if !field.in_hash() {
                continue;
            }
            match self.get(field.name()) {
                Some(value) => format!("{}={}", field.name(), zero_normalized(value)).hash(state),
                None => format!("{}={}", field.name(), MISSING).hash(state),
            }
        }
    }
}

// -0.0 compares equal to 0.0 but displays as "-0"; hashing must not see the difference
fn zero_normalized(value: &Value) -> Value {
    match value {
        Value::Num(super::Number::Float(x)) if *x == 0.0 => {
            Value::Num(super::Number::Float(0.0))
        }
        Value::Seq(seq) => Value::Seq(seq.iter().map(zero_normalized).collect()),
        Value::Map(map) => Value::Map(map.iter().map(|(k, v)| (k, zero_normalized(v))).collect()),
        other => other.clone(),
    }
}

/// Renders `Name(a=1, b=2)` over the repr-flagged fields, skipping fields whose value equals
/// their `skip_repr` sentinel.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.schema.name())?;
        let mut first = true;
        for field in self.schema.fields() {
            if !field.in_repr() {
                continue;
            }
            let value = self.get(field.name());
            if value.is_some() && field.skip_repr_sentinel() == value {
                continue;
            }
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            match value {
                Some(value) => write!(f, "{}={}", field.name(), value)?,
                None => write!(f, "{}={}", field.name(), MISSING)?,
            }
        }
        write!(f, ")")
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Index<&str> for Record {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        self.values
            .get(name)
            .unwrap_or_else(|| panic!("no field named '{}' on record '{}'", name, self.schema.name()))
    }
}
