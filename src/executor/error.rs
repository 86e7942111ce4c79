use std::cmp::Ordering;

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};

use crate::{
    ast::{OperationType, Type},
    executor::PathSegment,
    parser::SourcePosition,
    value::Value,
};

/// Error type for errors that occur during field resolution.
///
/// Field errors are represented by a human-readable error message and an
/// optional `Value` structure containing additional information.
///
/// They can be converted to from any type that implements `std::fmt::Display`,
/// which makes error chaining with the `?` operator a breeze:
///
/// ```rust
/// # use juniper_dynamic::FieldError;
/// fn get_string(data: Vec<u8>) -> Result<String, FieldError> {
///     let s = String::from_utf8(data)?;
///     Ok(s)
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    message: String,
    extensions: Value,
}

impl<T: Display> From<T> for FieldError {
    fn from(e: T) -> Self {
        Self {
            message: e.to_string(),
            extensions: Value::null(),
        }
    }
}

impl FieldError {
    /// Construct a new [`FieldError`] with additional data.
    ///
    /// You can use the [`graphql_value!`] macro for construction:
    /// ```rust
    /// use juniper_dynamic::{graphql_value, FieldError};
    ///
    /// # let _ =
    /// FieldError::new(
    ///     "Could not open connection to the database",
    ///     graphql_value!({"internal_error": "Connection refused"}),
    /// );
    /// ```
    ///
    /// The `extensions` parameter will be added to the `"extensions"` field of
    /// the `"errors"` object in response. If it's [`Value::Null`], no extra
    /// data will be included.
    ///
    /// [`graphql_value!`]: macro@crate::graphql_value
    #[must_use]
    pub fn new<T: Display>(e: T, extensions: Value) -> Self {
        Self {
            message: e.to_string(),
            extensions,
        }
    }

    /// Returns `"message"` field of this [`FieldError`].
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `"extensions"` field of this [`FieldError`].
    ///
    /// If there is no `"extensions"`, then [`Value::Null`] will be returned.
    #[must_use]
    pub fn extensions(&self) -> &Value {
        &self.extensions
    }

    /// Maps the message of this [`FieldError`], keeping its extensions.
    #[must_use]
    pub fn map_message(self, f: impl FnOnce(String) -> String) -> Self {
        Self {
            message: f(self.message),
            extensions: self.extensions,
        }
    }
}

/// The result of resolving the value of a field of type `T`.
pub type FieldResult<T> = Result<T, FieldError>;

/// Custom error handling trait to enable error types other than [`FieldError`]
/// to be specified as return value.
///
/// Any custom error type should implement this trait to convert itself into a
/// [`FieldError`].
pub trait IntoFieldError {
    /// Performs the custom conversion into a [`FieldError`].
    #[must_use]
    fn into_field_error(self) -> FieldError;
}

impl IntoFieldError for FieldError {
    fn into_field_error(self) -> FieldError {
        self
    }
}

impl<E: Display> IntoFieldError for E {
    fn into_field_error(self) -> FieldError {
        FieldError::from(self)
    }
}

/// Failures detected by the engine itself, as opposed to errors returned by
/// user resolvers.
///
/// They become [`FieldError`]s through their [`Display`] representation, so
/// they flow through the same null bubbling as resolver errors.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum EngineError {
    /// A literal or runtime value cannot be converted into a declared input
    /// type.
    #[display("{_0}")]
    ValueCoercion(#[error(not(source))] String),

    /// A declared operation variable has an invalid type or value.
    #[display("{_0}")]
    Variable(#[error(not(source))] String),

    /// The object type has no field with the requested name.
    #[display("Unknown field \"{field}\" on type \"{type_name}\"")]
    UnknownField {
        /// Name of the requested field.
        field: String,
        /// Name of the object type.
        type_name: ArcStr,
    },

    /// The field has neither a resolver nor any other way to produce a value.
    #[display("No resolver for field \"{type_name}.{field}\"")]
    MissingResolver {
        /// Name of the field.
        field: ArcStr,
        /// Name of the object type declaring the field.
        type_name: ArcStr,
    },

    /// The subscription root field has no subscriber.
    #[display("No subscriber for field \"{type_name}.{field}\"")]
    MissingSubscriber {
        /// Name of the field.
        field: ArcStr,
        /// Name of the subscription type.
        type_name: ArcStr,
    },

    /// A non-null position completed to `null`.
    #[display("completed value would be null for non-null field of type \"{_0}\"")]
    NullForNonNull(#[error(not(source))] Type),

    /// An abstract value was resolved without telling its concrete type.
    #[display("ActualType is required for interface/union values, none given for \"{_0}\"")]
    ActualTypeRequired(#[error(not(source))] ArcStr),

    /// The concrete type of an interface value does not implement it.
    #[display("ActualType \"{actual}\" does not implement interface \"{interface}\"")]
    DoesNotImplement {
        /// Name of the resolved concrete type.
        actual: ArcStr,
        /// Name of the declared interface.
        interface: ArcStr,
    },

    /// The concrete type of a union value is not one of its members.
    #[display("ActualType \"{actual}\" is not a possible type for union \"{union}\"")]
    NotPossibleType {
        /// Name of the resolved concrete type.
        actual: ArcStr,
        /// Name of the declared union.
        union: ArcStr,
    },

    /// A list type was declared but the resolved value is not iterable.
    #[display("resolved value is not a collection for list type \"{_0}\"")]
    NotACollection(#[error(not(source))] Type),

    /// A composite type was declared but the resolved value is not an object.
    #[display("resolved value is not an object for type \"{_0}\"")]
    NotAnObject(#[error(not(source))] ArcStr),

    /// An enum value to be returned is not declared by its enum type.
    #[display("Enum \"{enum_name}\" cannot represent value: {value}")]
    InvalidEnumValue {
        /// Name of the enum type.
        enum_name: ArcStr,
        /// Rejected value.
        value: String,
    },

    /// An asynchronous list source produced more items than allowed.
    #[display("list stream exceeded the limit of {_0} items")]
    StreamListLimit(#[error(not(source))] usize),

    /// The `if` argument of `@skip` or `@include` is missing or `null`.
    #[display("if argument is null, expected boolean in @{_0}")]
    DirectiveIf(#[error(not(source))] String),

    /// The schema has no root type for the requested operation.
    #[display("Schema is not configured for {_0} operations")]
    MissingRootType(#[error(not(source))] OperationType),

    /// A type name is not known to the schema.
    #[display("Unknown type \"{_0}\"")]
    UnknownType(#[error(not(source))] String),

    /// A subscription operation selected no root field to subscribe to.
    #[display("Subscription operation must select exactly one root field")]
    NoSubscriptionField,
}

/// Error type for errors that occur during query execution
///
/// All execution errors contain the source position in the query of the field
/// that failed to resolve. It also contains the field stack.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionError {
    location: SourcePosition,
    path: Vec<PathSegment>,
    error: FieldError,
}

impl Eq for ExecutionError {}

impl PartialOrd for ExecutionError {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExecutionError {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.location, &self.path, &self.error.message).cmp(&(
            &other.location,
            &other.path,
            &other.error.message,
        ))
    }
}

impl ExecutionError {
    #[doc(hidden)]
    pub fn new(location: SourcePosition, path: Vec<PathSegment>, error: FieldError) -> Self {
        Self {
            location,
            path,
            error,
        }
    }

    /// Construct a new execution error occurring at the beginning of the query
    pub fn at_origin(error: FieldError) -> Self {
        Self {
            location: SourcePosition::new_origin(),
            path: vec![],
            error,
        }
    }

    /// The error message
    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// The source location _in the query_ of the field that failed to resolve
    pub fn location(&self) -> &SourcePosition {
        &self.location
    }

    /// The path of fields leading to the field that generated this error
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}
