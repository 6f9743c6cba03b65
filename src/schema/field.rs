use crate::ds::{Kind, Record, Value};
use bitflags::bitflags;
use std::fmt;
use std::sync::Arc;

bitflags! {
    /// Which derived behaviors a field participates in.
    pub struct FieldFlags: u8 {
        /// The field binds an argument during construction.
        const INIT = 0b0000_0001;
        /// The field shows in the textual representation.
        const REPR = 0b0000_0010;
        /// The field participates in equality.
        const COMPARE = 0b0000_0100;
        /// The field participates in hashing. When never set explicitly, mirrors `COMPARE`.
        const HASH = 0b0000_1000;
        /// The field shows in dictionary export (and therefore state capture).
        const DICT = 0b0001_0000;
    }
}

/// A deferred default: either a zero-argument closure or one bound to the record under
/// construction.
#[derive(Clone)]
pub enum DefaultFactory {
    /// Called with no arguments.
    Fixed(Arc<dyn Fn() -> Value + Send + Sync>),
    /// Called with the (partially constructed) record the default is being resolved for.
    WithRecord(Arc<dyn Fn(&Record) -> Value + Send + Sync>),
}

impl fmt::Debug for DefaultFactory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DefaultFactory::Fixed(_) => write!(f, "DefaultFactory::Fixed"),
            DefaultFactory::WithRecord(_) => write!(f, "DefaultFactory::WithRecord"),
        }
    }
}

/// `resolve_default` was called on a field with no default source.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MissingDefault(pub(crate) String);

impl std::error::Error for MissingDefault {}

impl fmt::Display for MissingDefault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "missing required argument: {}", self.0)
    }
}

/// One named field of a record schema.
///
/// A field carries a name, an optional declared [`Kind`] (documentation only, never enforced), a
/// default value or default factory, a required flag, inclusion flags and skip sentinels. Fields
/// are declared through chained setters and handed to a [`SchemaBuilder`].
///
/// # Example
/// ```rust
/// # use regson::{Field, Kind, Value};
/// let f = Field::new("retries")
///     .kind(Kind::Num)
///     .default(Value::from(3))
///     .doc("how many attempts before giving up");
/// assert!(!f.is_required());
/// assert!(f.has_default());
/// ```
///
/// When both a default value and a factory are given, the explicit default wins.
///
/// [`SchemaBuilder`]: crate::SchemaBuilder
#[derive(Clone, Debug)]
pub struct Field {
    name: String,
    kind: Option<Kind>,
    default: Option<Value>,
    factory: Option<DefaultFactory>,
    required: Option<bool>,
    flags: FieldFlags,
    hash_explicit: bool,
    skip_dict: Option<Value>,
    skip_repr: Option<Value>,
    doc: String,
}

impl Field {
    /// A new field with the given name. Included in init, repr, equality and dict export by
    /// default; required unless a default is supplied.
    pub fn new<S: Into<String>>(name: S) -> Field {
        Field {
            name: name.into(),
            kind: None,
            default: None,
            factory: None,
            required: None,
            flags: FieldFlags::INIT | FieldFlags::REPR | FieldFlags::COMPARE | FieldFlags::DICT,
            hash_explicit: false,
            skip_dict: None,
            skip_repr: None,
            doc: String::new(),
        }
    }

    /// Declare the field's kind. Documentation and introspection only.
    pub fn kind(mut self, kind: Kind) -> Field {
        self.kind = Some(kind);
        self
    }

    /// Set the default value. Resolved defaults are clones, so a mutable default is never
    /// aliased across instances.
    pub fn default(mut self, value: Value) -> Field {
        self.default = Some(value);
        self
    }

    /// Set a zero-argument default factory.
    pub fn factory<F: Fn() -> Value + Send + Sync + 'static>(mut self, f: F) -> Field {
        self.factory = Some(DefaultFactory::Fixed(Arc::new(f)));
        self
    }

    /// Set a default factory bound to the record under construction.
    pub fn factory_with<F: Fn(&Record) -> Value + Send + Sync + 'static>(mut self, f: F) -> Field {
        self.factory = Some(DefaultFactory::WithRecord(Arc::new(f)));
        self
    }

    /// Override the derived required flag.
    pub fn required(mut self, required: bool) -> Field {
        self.required = Some(required);
        self
    }

    /// Exclude the field from construction binding; its value comes from the default.
    pub fn no_init(mut self) -> Field {
        self.flags.remove(FieldFlags::INIT);
        self
    }

    /// Exclude the field from the textual representation.
    pub fn no_repr(mut self) -> Field {
        self.flags.remove(FieldFlags::REPR);
        self
    }

    /// Exclude the field from equality (and, unless set explicitly, from hashing).
    pub fn no_compare(mut self) -> Field {
        self.flags.remove(FieldFlags::COMPARE);
        self
    }

    /// Explicitly include or exclude the field from hashing.
    pub fn hash(mut self, include: bool) -> Field {
        self.flags.set(FieldFlags::HASH, include);
        self.hash_explicit = true;
        self
    }

    /// Exclude the field from dictionary export and state capture.
    pub fn no_dict(mut self) -> Field {
        self.flags.remove(FieldFlags::DICT);
        self
    }

    /// Omit the field from dictionary export when its value equals `sentinel`.
    pub fn skip_dict(mut self, sentinel: Value) -> Field {
        self.skip_dict = Some(sentinel);
        self
    }

    /// Omit the field from the representation when its value equals `sentinel`.
    pub fn skip_repr(mut self, sentinel: Value) -> Field {
        self.skip_repr = Some(sentinel);
        self
    }

    /// Attach a doc string, surfaced through introspection.
    pub fn doc<S: Into<String>>(mut self, doc: S) -> Field {
        self.doc = doc.into();
        self
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's doc string.
    pub fn doc_str(&self) -> &str {
        &self.doc
    }

    /// A default value or factory is present.
    pub fn has_default(&self) -> bool {
        self.default.is_some() || self.factory.is_some()
    }

    /// The field must receive a value during construction, from an argument or a default.
    pub fn is_required(&self) -> bool {
        self.in_init() && self.required.unwrap_or(!self.has_default())
    }

    /// The field must be supplied as an argument: required with no default to fall back on.
    pub fn is_positional(&self) -> bool {
        self.is_required() && !self.has_default()
    }

    /// The field binds a construction argument.
    pub fn in_init(&self) -> bool {
        self.flags.contains(FieldFlags::INIT)
    }

    /// The field shows in the representation.
    pub fn in_repr(&self) -> bool {
        self.flags.contains(FieldFlags::REPR)
    }

    /// The field participates in equality.
    pub fn in_compare(&self) -> bool {
        self.flags.contains(FieldFlags::COMPARE)
    }

    /// The field participates in hashing; mirrors `in_compare` unless set explicitly.
    pub fn in_hash(&self) -> bool {
        if self.hash_explicit {
            self.flags.contains(FieldFlags::HASH)
        } else {
            self.in_compare()
        }
    }

    /// The field shows in dictionary export.
    pub fn in_dict(&self) -> bool {
        self.flags.contains(FieldFlags::DICT)
    }

    /// The dict-export skip sentinel, if any.
    pub fn skip_dict_sentinel(&self) -> Option<&Value> {
        self.skip_dict.as_ref()
    }

    /// The repr skip sentinel, if any.
    pub fn skip_repr_sentinel(&self) -> Option<&Value> {
        self.skip_repr.as_ref()
    }

    /// Resolve the field's default for `record`.
    ///
    /// An explicit default is cloned fresh; otherwise the factory runs (receiving `record` when
    /// bound). A field with no default source fails with a missing-required-argument error.
    pub fn resolve_default(&self, record: &Record) -> Result<Value, MissingDefault> {
        if let Some(default) = &self.default {
            return Ok(default.clone());
        }
        match &self.factory {
            Some(DefaultFactory::Fixed(f)) => Ok(f()),
            Some(DefaultFactory::WithRecord(f)) => Ok(f(record)),
            None => Err(MissingDefault(self.name.clone())),
        }
    }

    /// The field's kind: the declaration if present, else inferred from the default value, else
    /// from a speculative invocation of a zero-argument factory, else [`Kind::Any`].
    pub fn kind_of(&self) -> Kind {
        if let Some(kind) = self.kind {
            return kind;
        }
        if let Some(default) = &self.default {
            return default.kind();
        }
        match &self.factory {
            Some(DefaultFactory::Fixed(f)) => f().kind(),
            _ => Kind::Any,
        }
    }

    /// The field's kind as a display string, for doc tooling.
    pub fn kind_str(&self) -> String {
        self.kind_of().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Fields, Schema};

    fn probe() -> Record {
        let schema = Schema::build("Probe").finish_unregistered();
        Record::new(&schema, Vec::new(), Fields::new()).unwrap()
    }

    #[test]
    fn required_derivation() {
        assert!(Field::new("x").is_required());
        assert!(!Field::new("x").default(Value::from(1)).is_required());
        assert!(!Field::new("x").factory(|| Value::from(1)).is_required());
        assert!(Field::new("x").default(Value::from(1)).required(true).is_required());
        assert!(!Field::new("x").no_init().is_required());
    }

    #[test]
    fn positional() {
        assert!(Field::new("x").is_positional());
        assert!(!Field::new("x").default(Value::from(1)).is_positional());
    }

    #[test]
    fn default_wins_over_factory() {
        let f = Field::new("x")
            .factory(|| Value::from(99))
            .default(Value::from(1));
        assert_eq!(f.resolve_default(&probe()), Ok(Value::from(1)));
    }

    #[test]
    fn defaults_are_not_aliased() {
        let f = Field::new("xs").default(Value::Seq(vec![]));
        let rec = probe();
        let mut a = f.resolve_default(&rec).unwrap();
        a.seq_mut().map(|v| v.push(Value::from(1)));
        let b = f.resolve_default(&rec).unwrap();
        assert_eq!(b, Value::Seq(vec![]));
    }

    #[test]
    fn missing_default_errors() {
        let f = Field::new("x");
        assert_eq!(
            f.resolve_default(&probe()),
            Err(MissingDefault("x".to_string()))
        );
    }

    #[test]
    fn hash_mirrors_compare_until_explicit() {
        assert!(Field::new("x").in_hash());
        assert!(!Field::new("x").no_compare().in_hash());
        assert!(Field::new("x").no_compare().hash(true).in_hash());
        assert!(!Field::new("x").hash(false).in_hash());
    }

    #[test]
    fn kind_inference() {
        assert_eq!(Field::new("x").kind_of(), Kind::Any);
        assert_eq!(Field::new("x").default(Value::from(1)).kind_of(), Kind::Num);
        assert_eq!(
            Field::new("x").factory(|| Value::from("s")).kind_of(),
            Kind::Str
        );
        assert_eq!(
            Field::new("x").kind(Kind::Map).default(Value::from(1)).kind_of(),
            Kind::Map
        );
    }
}
