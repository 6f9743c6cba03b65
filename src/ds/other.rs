use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A foreign value carried opaquely inside a [`Value`].
///
/// Plug-in codecs (byte strings, timestamps, numeric arrays and the like) define a concrete type,
/// implement `OtherValue` for it, and register an encode/decode pair with
/// [`register_other`]. The core never inspects the payload beyond equality testing and the
/// [`TypeId`] used for registry lookup.
///
/// # Example
/// ```rust
/// use regson::{Other, OtherValue, Value};
/// use std::any::Any;
///
/// #[derive(Debug, PartialEq)]
/// struct Timestamp(i64);
///
/// impl OtherValue for Timestamp {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn eq_value(&self, other: &dyn OtherValue) -> bool {
///         other.as_any().downcast_ref::<Timestamp>() == Some(self)
///     }
/// }
///
/// let value = Value::Other(Other::new(Timestamp(1_234)));
/// assert_eq!(value.downcast::<Timestamp>(), Some(&Timestamp(1_234)));
/// ```
///
/// [`Value`]: crate::Value
/// [`register_other`]: crate::registry::register_other
pub trait OtherValue: fmt::Debug + Send + Sync + 'static {
    /// The value as `Any`, for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Equality against another foreign value. Implementations should downcast and return `false`
    /// on a type mismatch.
    fn eq_value(&self, other: &dyn OtherValue) -> bool;
}

/// Shared handle to a foreign value. See [`OtherValue`].
#[derive(Clone, Debug)]
pub struct Other(Arc<dyn OtherValue>);

impl Other {
    /// Wrap a foreign value.
    pub fn new<T: OtherValue>(value: T) -> Self {
        Other(Arc::new(value))
    }

    /// The runtime type of the wrapped value, as used for registry lookup.
    pub fn type_id(&self) -> TypeId {
        self.0.as_any().type_id()
    }

    /// Downcast to a concrete foreign type.
    pub fn downcast_ref<T: OtherValue>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for Other {
    fn eq(&self, other: &Other) -> bool {
        self.0.eq_value(other.0.as_ref())
    }
}

impl<T: OtherValue> From<T> for Other {
    fn from(value: T) -> Self {
        Other::new(value)
    }
}
