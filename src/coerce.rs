//! String-to-scalar coercion shared by path variables and body fields.
//!
//! Silent null propagation on unparsable input was a known defect class
//! in the design this core replaces; every conversion here either
//! produces the declared target type or a `CoercionFailure`.

use crate::error::{CoreError, CoreResult};

/// Target type of a coercion, declared on path parameters and binding
/// model fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Str,
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Str => "str",
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
        }
    }
}

/// A coerced scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any signed integer width, widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::I8(v) => Some(i64::from(*v)),
            Scalar::I16(v) => Some(i64::from(*v)),
            Scalar::I32(v) => Some(i64::from(*v)),
            Scalar::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Either floating-point width, widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::F32(v) => Some(f64::from(*v)),
            Scalar::F64(v) => Some(*v),
            _ => None,
        }
    }
}

/// Convert `raw` into the declared target kind.
///
/// String passthrough never fails. Booleans accept `true`/`false`
/// case-insensitively. Everything else parses with the standard library
/// and surfaces failures instead of defaulting.
pub fn coerce(kind: ScalarKind, raw: &str) -> CoreResult<Scalar> {
    let failure = || CoreError::CoercionFailure {
        value: raw.to_string(),
        target: kind.name(),
    };

    Ok(match kind {
        ScalarKind::Str => Scalar::Str(raw.to_string()),
        ScalarKind::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" => Scalar::Bool(true),
            "false" => Scalar::Bool(false),
            _ => return Err(failure()),
        },
        ScalarKind::I8 => Scalar::I8(raw.parse().map_err(|_| failure())?),
        ScalarKind::I16 => Scalar::I16(raw.parse().map_err(|_| failure())?),
        ScalarKind::I32 => Scalar::I32(raw.parse().map_err(|_| failure())?),
        ScalarKind::I64 => Scalar::I64(raw.parse().map_err(|_| failure())?),
        ScalarKind::F32 => Scalar::F32(raw.parse().map_err(|_| failure())?),
        ScalarKind::F64 => Scalar::F64(raw.parse().map_err(|_| failure())?),
    })
}

/// Types a scalar can be delivered as, used to declare path parameters
/// and binding model fields.
pub trait FromScalar: Sized {
    const KIND: ScalarKind;

    fn from_scalar(scalar: Scalar) -> Option<Self>;
}

macro_rules! from_scalar {
    ($ty:ty, $kind:ident) => {
        impl FromScalar for $ty {
            const KIND: ScalarKind = ScalarKind::$kind;

            fn from_scalar(scalar: Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$kind(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

from_scalar!(String, Str);
from_scalar!(bool, Bool);
from_scalar!(i8, I8);
from_scalar!(i16, I16);
from_scalar!(i32, I32);
from_scalar!(i64, I64);
from_scalar!(f32, F32);
from_scalar!(f64, F64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_parses() {
        assert_eq!(coerce(ScalarKind::I32, "42").unwrap(), Scalar::I32(42));
        assert_eq!(coerce(ScalarKind::I64, "-7").unwrap(), Scalar::I64(-7));
    }

    #[test]
    fn unparsable_integer_is_a_hard_error() {
        match coerce(ScalarKind::I32, "abc") {
            Err(CoreError::CoercionFailure { value, target }) => {
                assert_eq!(value, "abc");
                assert_eq!(target, "i32");
            }
            other => panic!("expected CoercionFailure, got {:?}", other),
        }
    }

    #[test]
    fn bool_accepts_case_insensitive_literals_only() {
        assert_eq!(coerce(ScalarKind::Bool, "TRUE").unwrap(), Scalar::Bool(true));
        assert_eq!(coerce(ScalarKind::Bool, "false").unwrap(), Scalar::Bool(false));
        assert!(coerce(ScalarKind::Bool, "yes").is_err());
    }

    #[test]
    fn string_passthrough() {
        assert_eq!(
            coerce(ScalarKind::Str, "anything at all").unwrap(),
            Scalar::Str("anything at all".to_string())
        );
    }
}
