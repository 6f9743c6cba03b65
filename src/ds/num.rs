use std::cmp::Ordering;
use std::convert::TryInto;
use std::fmt;
use Number::*;

/// A numerical value.
///
/// `Number` captures Rust numerical primitives: _unsigned integers_, _signed integers_, and
/// _floating point decimal_ numbers. The data is stored inside an enum housing the maximum size of
/// each numerical type (128 bits for integers, 64 bits for floats). The numbers are
/// canonicalized, that is equality can be tested between integers and floats.
///
/// All zeroes are treated equally (`-0 == +0`), as well as all Nans.
///
/// # Examples
/// `Number` can be constructed straight from any of the Rust numbers using the `From` trait.
/// ```rust
/// # use regson::Number;
/// let n: Number = 123456u32.into();
/// assert_eq!(n, Number::Uint(123456));
/// ```
///
/// Comparisons can be made between different number types.
/// ```rust
/// # use regson::Number;
/// let n = Number::from(100u8);
/// assert_eq!(n, Number::from(100.0f32));
/// assert_eq!(n, Number::from(100i32));
/// assert_ne!(n, Number::from(99.99f64));
/// ```
#[derive(Copy, Clone, Debug)]
#[allow(missing_docs)]
pub enum Number {
    Uint(u128),
    Int(i128),
    Float(f64),
}

/// Converting into a signed or unsigned integer can fail if the original number is outside the
/// integer's valid range.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct IntoIntError;

impl std::error::Error for IntoIntError {}

impl fmt::Display for IntoIntError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "number can not be represented as the integer type")
    }
}

impl Number {
    /// Represent `Number` as an unsigned integer.
    ///
    /// # Example
    /// ```rust
    /// # use regson::Number;
    /// use regson::ds::IntoIntError;
    ///
    /// assert_eq!(Number::from(100i32).as_u128(), Ok(100));
    /// assert_eq!(Number::from(100.0).as_u128(), Ok(100));
    /// assert_eq!(Number::from(-100i32).as_u128(), Err(IntoIntError));
    /// assert_eq!(Number::from(0.5).as_u128(), Err(IntoIntError));
    /// ```
    pub fn as_u128(&self) -> Result<u128, IntoIntError> {
        match self {
            Uint(x) => Ok(*x),
            Int(x) => (*x).try_into().map_err(|_| IntoIntError),
            Float(x) => {
                if x.is_finite() && *x >= 0.0 && x.fract() < 1e-10 {
                    Ok(*x as u128)
                } else {
                    Err(IntoIntError)
                }
            }
        }
    }

    /// Represent `Number` as a signed integer.
    ///
    /// # Example
    /// ```rust
    /// # use regson::Number;
    /// use regson::ds::IntoIntError;
    ///
    /// assert_eq!(Number::from(100u32).as_i128(), Ok(100));
    /// assert_eq!(Number::from(-100.0).as_i128(), Ok(-100));
    /// assert_eq!(Number::from(0.5).as_i128(), Err(IntoIntError));
    /// ```
    pub fn as_i128(&self) -> Result<i128, IntoIntError> {
        match self {
            Uint(x) => (*x).try_into().map_err(|_| IntoIntError),
            Int(x) => Ok(*x),
            Float(x) => {
                if x.is_finite() && x.fract().abs() < 1e-10 {
                    Ok(*x as i128)
                } else {
                    Err(IntoIntError)
                }
            }
        }
    }

    /// Represent `Number` as a floating point decimal.
    /// Does not fail, but is a lossy conversion if an integer.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Uint(x) => x as f64,
            Int(x) => x as f64,
            Float(x) => x,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uint(x) => write!(f, "{}", x),
            Int(x) => write!(f, "{}", x),
            Float(x) => write!(f, "{}", x),
        }
    }
}

fn cmp_float_to_float(lhs: f64, rhs: f64) -> Ordering {
    if lhs.is_nan() && rhs.is_nan() {
        Ordering::Equal
    } else {
        lhs.partial_cmp(&rhs).unwrap_or(Ordering::Greater)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Number) -> bool {
        match (self, other) {
            // Three cases where lhs and rhs are same type
            (Uint(lhs), Uint(rhs)) => lhs.eq(rhs),
            (Int(lhs), Int(rhs)) => lhs.eq(rhs),
            (Float(lhs), Float(rhs)) => cmp_float_to_float(*lhs, *rhs) == Ordering::Equal,

            // Integers
            (Uint(lhs), Int(_)) => other.as_u128().map(|rhs| lhs.eq(&rhs)).unwrap_or(false),
            (Uint(lhs), Float(_)) => other.as_u128().map(|rhs| lhs.eq(&rhs)).unwrap_or(false),
            (Int(lhs), Uint(_)) => other.as_i128().map(|rhs| lhs.eq(&rhs)).unwrap_or(false),
            (Int(lhs), Float(_)) => other.as_i128().map(|rhs| lhs.eq(&rhs)).unwrap_or(false),

            // Floats
            (Float(lhs), Uint(_)) => lhs.eq(&other.as_f64()),
            (Float(lhs), Int(_)) => lhs.eq(&other.as_f64()),
        }
    }
}

impl Eq for Number {}

macro_rules! uint_from {
    ( $( $t:ty ),* ) => {
        $(
        impl From<$t> for Number {
            fn from(x: $t) -> Number {
                Uint(x as u128)
            }
        }
        )*
    };
}

macro_rules! int_from {
    ( $( $t:ty ),* ) => {
        $(
        impl From<$t> for Number {
            fn from(x: $t) -> Number {
                Int(x as i128)
            }
        }
        )*
    };
}

uint_from!(usize, u8, u16, u32, u64, u128);
int_from!(isize, i8, i16, i32, i64, i128);

impl From<f32> for Number {
    fn from(x: f32) -> Number {
        Float(x as f64)
    }
}

impl From<f64> for Number {
    fn from(x: f64) -> Number {
        Float(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_variant_eq() {
        assert_eq!(Number::from(100u8), Number::from(100i32));
        assert_eq!(Number::from(100i32), Number::from(100.0));
        assert_eq!(Number::from(100.0), Number::from(100u64));
        assert_ne!(Number::from(100u8), Number::from(-100i32));
        assert_ne!(Number::from(0.5), Number::from(0));
    }

    #[test]
    fn nans_and_zeroes() {
        assert_eq!(Number::from(f64::NAN), Number::from(f64::NAN));
        assert_eq!(Number::from(-0.0), Number::from(0.0));
        assert_ne!(Number::from(f64::NAN), Number::from(0.0));
    }

    #[test]
    fn integer_conversions() {
        assert_eq!(Number::from(-1).as_u128(), Err(IntoIntError));
        assert_eq!(Number::from(u128::MAX).as_i128(), Err(IntoIntError));
        assert_eq!(Number::from(3.0).as_i128(), Ok(3));
        assert_eq!(Number::from(f64::INFINITY).as_i128(), Err(IntoIntError));
    }

    #[test]
    fn display() {
        assert_eq!(Number::from(3).to_string(), "3");
        assert_eq!(Number::from(3.5).to_string(), "3.5");
        assert_eq!(Number::from(3u8).to_string(), "3");
    }
}
