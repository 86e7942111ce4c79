use std::sync::Arc;

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};

use crate::{
    ast::{FromInputValue, InputValue},
    executor::{FieldError, FieldResult},
    types::base::Resolved,
    value::{DefaultScalarValue, Value},
};

/// Parsing and serialization of the values of a scalar type.
///
/// `parse_literal` receives values written inline in the query document,
/// `parse_value` receives runtime values (supplied variables and defaults).
/// Both return the coerced [`InputValue`] handed to resolvers.
pub trait ScalarConverter: Send + Sync {
    /// Coerces a runtime input value.
    fn parse_value(&self, value: &InputValue) -> FieldResult<InputValue>;

    /// Coerces a literal input value.
    ///
    /// Defaults to [`ScalarConverter::parse_value()`].
    fn parse_literal(&self, value: &InputValue) -> FieldResult<InputValue> {
        self.parse_value(value)
    }

    /// Converts a resolved value into its response representation.
    fn serialize(&self, value: &Resolved) -> FieldResult<Value>;
}

/// Error of an input value not matching the expected scalar type.
#[derive(Clone, Copy, Debug, Display, Error, PartialEq)]
#[display("Expected `{type_name}`, found: {input}")]
pub struct WrongInputScalarTypeError<'a> {
    /// Expected type name.
    pub type_name: &'static str,
    /// Rejected input.
    pub input: &'a InputValue,
}

/// Error of a resolved value not being representable as the scalar type.
#[derive(Clone, Debug, Display, Error, PartialEq)]
#[display("`{type_name}` cannot represent value: {value}")]
pub struct WrongOutputScalarTypeError {
    /// Scalar type name.
    pub type_name: &'static str,
    /// Rejected value.
    pub value: String,
}

fn wrong_input(type_name: &'static str, input: &InputValue) -> FieldError {
    WrongInputScalarTypeError { type_name, input }.into()
}

fn wrong_output(type_name: &'static str, value: &Resolved) -> FieldError {
    let value = match value {
        Resolved::Scalar(s) => s.to_string(),
        Resolved::Enum(e) => e.clone(),
        other => format!("{other:?}"),
    };
    WrongOutputScalarTypeError { type_name, value }.into()
}

/// Built-in `Int`: a signed 32-bit integer.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntScalar;

impl ScalarConverter for IntScalar {
    fn parse_value(&self, value: &InputValue) -> FieldResult<InputValue> {
        value
            .as_int_value()
            .map(InputValue::scalar)
            .ok_or_else(|| wrong_input("Int", value))
    }

    fn serialize(&self, value: &Resolved) -> FieldResult<Value> {
        let int = match value {
            Resolved::Scalar(DefaultScalarValue::Int(i)) => Some(*i),
            Resolved::Scalar(DefaultScalarValue::Float(f))
                if f.fract() == 0.0 && *f >= f64::from(i32::MIN) && *f <= f64::from(i32::MAX) =>
            {
                Some(*f as i32)
            }
            Resolved::Scalar(DefaultScalarValue::Boolean(b)) => Some(i32::from(*b)),
            Resolved::Scalar(DefaultScalarValue::String(s)) => s.parse().ok(),
            _ => None,
        };
        int.map(Value::scalar)
            .ok_or_else(|| wrong_output("Int", value))
    }
}

/// Built-in `Float`: a double precision float, accepting `Int` input.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatScalar;

impl ScalarConverter for FloatScalar {
    fn parse_value(&self, value: &InputValue) -> FieldResult<InputValue> {
        value
            .as_float_value()
            .map(InputValue::scalar)
            .ok_or_else(|| wrong_input("Float", value))
    }

    fn serialize(&self, value: &Resolved) -> FieldResult<Value> {
        let float = match value {
            Resolved::Scalar(DefaultScalarValue::Boolean(b)) => Some(if *b { 1.0 } else { 0.0 }),
            Resolved::Scalar(DefaultScalarValue::String(s)) => s.parse().ok(),
            Resolved::Scalar(s) => s.as_float(),
            _ => None,
        };
        float
            .filter(|f| f.is_finite())
            .map(Value::scalar)
            .ok_or_else(|| wrong_output("Float", value))
    }
}

/// Built-in `String`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringScalar;

impl ScalarConverter for StringScalar {
    fn parse_value(&self, value: &InputValue) -> FieldResult<InputValue> {
        value
            .as_string_value()
            .map(InputValue::scalar)
            .ok_or_else(|| wrong_input("String", value))
    }

    fn serialize(&self, value: &Resolved) -> FieldResult<Value> {
        match value {
            Resolved::Scalar(DefaultScalarValue::String(s)) => Ok(Value::scalar(s.as_str())),
            Resolved::Scalar(s) => Ok(Value::scalar(s.to_string())),
            Resolved::Enum(e) => Ok(Value::scalar(e.as_str())),
            _ => Err(wrong_output("String", value)),
        }
    }
}

/// Built-in `Boolean`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BooleanScalar;

impl ScalarConverter for BooleanScalar {
    fn parse_value(&self, value: &InputValue) -> FieldResult<InputValue> {
        value
            .as_scalar()
            .and_then(DefaultScalarValue::as_bool)
            .map(InputValue::scalar)
            .ok_or_else(|| wrong_input("Boolean", value))
    }

    fn serialize(&self, value: &Resolved) -> FieldResult<Value> {
        match value {
            Resolved::Scalar(DefaultScalarValue::Boolean(b)) => Ok(Value::scalar(*b)),
            Resolved::Scalar(DefaultScalarValue::Int(i)) => Ok(Value::scalar(*i != 0)),
            Resolved::Scalar(DefaultScalarValue::Float(f)) => Ok(Value::scalar(*f != 0.0)),
            _ => Err(wrong_output("Boolean", value)),
        }
    }
}

/// Built-in `ID`: represented as a string, but accepting integers as input
/// as well.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdScalar;

impl ScalarConverter for IdScalar {
    fn parse_value(&self, value: &InputValue) -> FieldResult<InputValue> {
        match value.as_scalar() {
            Some(DefaultScalarValue::String(s)) => Ok(InputValue::scalar(s.as_str())),
            Some(DefaultScalarValue::Int(i)) => Ok(InputValue::scalar(i.to_string())),
            _ => Err(wrong_input("String` or `Int", value)),
        }
    }

    fn serialize(&self, value: &Resolved) -> FieldResult<Value> {
        match value {
            Resolved::Scalar(DefaultScalarValue::String(s)) => Ok(Value::scalar(s.as_str())),
            Resolved::Scalar(DefaultScalarValue::Int(i)) => Ok(Value::scalar(i.to_string())),
            _ => Err(wrong_output("ID", value)),
        }
    }
}

/// Converters of the scalar types every schema has.
pub fn builtin_scalars() -> [(ArcStr, Arc<dyn ScalarConverter>); 5] {
    [
        (arcstr::literal!("Int"), Arc::new(IntScalar)),
        (arcstr::literal!("Float"), Arc::new(FloatScalar)),
        (arcstr::literal!("String"), Arc::new(StringScalar)),
        (arcstr::literal!("Boolean"), Arc::new(BooleanScalar)),
        (arcstr::literal!("ID"), Arc::new(IdScalar)),
    ]
}

impl FromInputValue for i32 {
    type Error = FieldError;

    fn from_input_value(v: &InputValue) -> Result<Self, Self::Error> {
        v.as_int_value().ok_or_else(|| wrong_input("Int", v))
    }
}

impl FromInputValue for f64 {
    type Error = FieldError;

    fn from_input_value(v: &InputValue) -> Result<Self, Self::Error> {
        v.as_float_value().ok_or_else(|| wrong_input("Float", v))
    }
}

impl FromInputValue for bool {
    type Error = FieldError;

    fn from_input_value(v: &InputValue) -> Result<Self, Self::Error> {
        v.as_scalar()
            .and_then(DefaultScalarValue::as_bool)
            .ok_or_else(|| wrong_input("Boolean", v))
    }
}

impl FromInputValue for String {
    type Error = FieldError;

    fn from_input_value(v: &InputValue) -> Result<Self, Self::Error> {
        v.as_string_value()
            .or_else(|| v.as_enum_value())
            .map(Into::into)
            .ok_or_else(|| wrong_input("String", v))
    }
}
