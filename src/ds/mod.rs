//! The dynamic data model: [`Value`] and the types it is built from.

mod fields;
mod num;
mod other;
mod record;
mod val;

pub use fields::Fields;
pub use num::{IntoIntError, Number};
pub use other::{Other, OtherValue};
pub use record::{FrozenError, Reconstructed, Record};
pub use val::{Kind, Value};
