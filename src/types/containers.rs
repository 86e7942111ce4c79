use crate::{
    ast::{FromInputValue, InputValue},
    executor::{FieldError, IntoFieldError},
};

impl<T> FromInputValue for Option<T>
where
    T: FromInputValue,
{
    type Error = T::Error;

    fn from_input_value(v: &InputValue) -> Result<Self, Self::Error> {
        match v {
            InputValue::Null => Ok(None),
            v => v.convert().map(Some),
        }
    }

    fn from_implicit_null() -> Result<Self, Self::Error> {
        Ok(None)
    }
}

impl<T> FromInputValue for Vec<T>
where
    T: FromInputValue,
    T::Error: IntoFieldError,
{
    type Error = FieldError;

    fn from_input_value(v: &InputValue) -> Result<Self, Self::Error> {
        match v {
            InputValue::List(l) => l
                .iter()
                .map(|i| i.convert().map_err(IntoFieldError::into_field_error))
                .collect(),
            // See "Input Coercion" on List types:
            // https://spec.graphql.org/October2021#sec-List.Input-Coercion
            InputValue::Null => Err(FieldError::from("Expected list, found: null")),
            other => other
                .convert()
                .map(|e| vec![e])
                .map_err(IntoFieldError::into_field_error),
        }
    }
}

impl FromInputValue for InputValue {
    type Error = FieldError;

    fn from_input_value(v: &InputValue) -> Result<Self, Self::Error> {
        Ok(v.clone())
    }
}
