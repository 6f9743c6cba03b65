use super::*;
use std::fmt;

/// The dynamic value.
///
/// `Value` captures primitive types (null, booleans, numbers, strings), which act as leaves,
/// along with nested structures (sequences and maps) and the two kinds of values JSON cannot
/// natively represent: schema-bound [`Record`]s and foreign [`Other`] values supplied by plug-in
/// codecs. The latter two round-trip through the serializer registry.
///
/// _Maps_ are backed by [`Fields`] so entries keep their insertion order.
///
/// # Examples
/// Use the methods to quickly see the data if the kind is known.
/// ```rust
/// # use regson::Value;
/// let mut val = Value::from("Hi");
/// val.str_mut().map(|s| {
///     s.pop();
///     s.push_str("ello, world!");
/// });
/// assert_eq!(val.str(), Some("Hello, world!"));
/// assert_eq!(val.int(), None);
/// ```
///
/// [`Record`]: crate::Record
/// [`Other`]: crate::Other
/// [`Fields`]: crate::Fields
#[derive(Clone, Debug)]
pub enum Value {
    /// The null value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A numerical value. See [`Number`].
    ///
    /// [`Number`]: crate::Number
    Num(Number),
    /// A string value.
    Str(String),
    /// A sequence of values.
    Seq(Vec<Value>),
    /// An ordered mapping of names to values. See [`Fields`].
    ///
    /// [`Fields`]: crate::Fields
    Map(Fields),
    /// A schema-bound record. See [`Record`].
    ///
    /// [`Record`]: crate::Record
    Record(Record),
    /// A foreign value owned by a plug-in codec. See [`Other`].
    ///
    /// [`Other`]: crate::Other
    Other(Other),
}

/// The broad runtime kind of a [`Value`], used for field declarations and introspection.
///
/// Kinds are documentation only; nothing in the crate enforces them at runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Kind {
    Any,
    Bool,
    Num,
    Str,
    Seq,
    Map,
    Record,
    Other,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Kind::Any => "any",
            Kind::Bool => "bool",
            Kind::Num => "number",
            Kind::Str => "string",
            Kind::Seq => "sequence",
            Kind::Map => "map",
            Kind::Record => "record",
            Kind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Convenience methods for accessing values straight from the `Value` enum.
impl Value {
    /// `Value` is the null value (`Value::Null`).
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `Value` is a boolean value.
    pub fn bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// `Value` is a numerical value.
    pub fn num(&self) -> Option<Number> {
        match self {
            Value::Num(v) => Some(*v),
            _ => None,
        }
    }

    /// `Value` is a signed integer representable number.
    pub fn int(&self) -> Option<i128> {
        self.num().and_then(|n| n.as_i128().ok())
    }

    /// `Value` is an unsigned integer representable number.
    pub fn uint(&self) -> Option<u128> {
        self.num().and_then(|n| n.as_u128().ok())
    }

    /// `Value` is a numerical value, as a float.
    pub fn float(&self) -> Option<f64> {
        self.num().map(|n| n.as_f64())
    }

    /// `Value` is a string value.
    pub fn str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// `Value` is a string value. Can be altered.
    pub fn str_mut(&mut self) -> Option<&mut String> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    /// `Value` is a sequence of values.
    pub fn seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// `Value` is a sequence of values. Can be altered.
    pub fn seq_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Seq(v) => Some(v),
            _ => None,
        }
    }

    /// `Value` is a map of values.
    pub fn map(&self) -> Option<&Fields> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    /// `Value` is a map of values. Can be altered.
    pub fn map_mut(&mut self) -> Option<&mut Fields> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    /// `Value` is a record.
    pub fn record(&self) -> Option<&Record> {
        match self {
            Value::Record(v) => Some(v),
            _ => None,
        }
    }

    /// `Value` is a record. Can be altered.
    pub fn record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(v) => Some(v),
            _ => None,
        }
    }

    /// `Value` is a foreign value.
    pub fn other(&self) -> Option<&Other> {
        match self {
            Value::Other(v) => Some(v),
            _ => None,
        }
    }

    /// `Value` is a foreign value of the concrete type `T`.
    pub fn downcast<T: OtherValue>(&self) -> Option<&T> {
        self.other().and_then(Other::downcast_ref)
    }

    /// The broad runtime kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Any,
            Value::Bool(_) => Kind::Bool,
            Value::Num(_) => Kind::Num,
            Value::Str(_) => Kind::Str,
            Value::Seq(_) => Kind::Seq,
            Value::Map(_) => Kind::Map,
            Value::Record(_) => Kind::Record,
            Value::Other(_) => Kind::Other,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Num(a), Num(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Seq(a), Seq(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Record(a), Record(b)) => a == b,
            (Other(a), Other(b)) => a == b,
            _ => false,
        }
    }
}

/// Renders the value the way record representations and hashes see it: strings unquoted, maps and
/// sequences recursively.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Num(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Seq(v) => {
                write!(f, "[")?;
                for (i, e) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, "]")
            }
            Value::Map(v) => write!(f, "{}", v),
            Value::Record(v) => write!(f, "{}", v),
            Value::Other(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Bool(v)
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Value {
        Value::Num(v)
    }
}

macro_rules! num_value_from {
    ( $( $t:ty ),* ) => {
        $(
        impl From<$t> for Value {
            fn from(v: $t) -> Value {
                Value::Num(Number::from(v))
            }
        }
        )*
    };
}

num_value_from!(usize, u8, u16, u32, u64, u128, isize, i8, i16, i32, i64, i128, f32, f64);

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Value {
        Value::Seq(v)
    }
}

impl From<Fields> for Value {
    fn from(v: Fields) -> Value {
        Value::Map(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Value {
        Value::Record(v)
    }
}

impl From<Other> for Value {
    fn from(v: Other) -> Value {
        Value::Other(v)
    }
}
