use std::{borrow::Cow, collections::HashMap, fmt};

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{parser::Spanning, value::DefaultScalarValue};

/// Variable values supplied alongside a query, keyed by name without the
/// leading `$`.
pub type Variables = HashMap<String, InputValue>;

/// A type literal in the syntax tree.
///
/// This enum carries no semantic information and might refer to types that do
/// not exist. The wrapper chain is closed: every consumer matches on the three
/// variants exhaustively.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    /// A nullable named type, e.g. `String`.
    Named(ArcStr),
    /// A nullable list type, e.g. `[String]`.
    ///
    /// The list itself is what's nullable, the containing type might be non-null.
    List(Box<Type>),
    /// A non-null wrapper around any other type, e.g. `String!` or `[Int]!`.
    NonNull(Box<Type>),
}

impl Type {
    /// Shorthand for a nullable named type.
    pub fn named(name: impl Into<ArcStr>) -> Self {
        Self::Named(name.into())
    }

    /// Shorthand for a nullable list of `inner`.
    pub fn list(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    /// Wraps this type into a non-null wrapper.
    ///
    /// Wrapping an already non-null type is a no-op.
    #[must_use]
    pub fn non_null(self) -> Self {
        match self {
            Self::NonNull(_) => self,
            t => Self::NonNull(Box::new(t)),
        }
    }

    /// Get the name of a named type.
    ///
    /// Only applies to named types; lists will return `None`.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(n) => Some(n),
            Self::NonNull(inner) => inner.name(),
            Self::List(_) => None,
        }
    }

    /// Get the innermost name by unpacking lists.
    ///
    /// All type literals contain exactly one named type.
    pub fn innermost_name(&self) -> &str {
        match self {
            Self::Named(n) => n,
            Self::List(inner) | Self::NonNull(inner) => inner.innermost_name(),
        }
    }

    /// Determines if a type only can represent non-null values.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::List(t) => write!(f, "[{t}]"),
            Self::NonNull(t) => write!(f, "{t}!"),
        }
    }
}

/// A JSON-like value that can be passed into the query execution, either
/// out-of-band, or in-band as default variable values. These are _not_ constant
/// and might contain variables.
///
/// Coerced argument and variable values use the same representation, but never
/// contain [`InputValue::Variable`].
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum InputValue {
    Null,
    Scalar(DefaultScalarValue),
    Enum(String),
    Variable(String),
    List(Vec<InputValue>),
    Object(Vec<(String, InputValue)>),
}

impl InputValue {
    /// Construct a `null` value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Construct a scalar value.
    pub fn scalar<T: Into<DefaultScalarValue>>(v: T) -> Self {
        Self::Scalar(v.into())
    }

    /// Construct an enum value.
    pub fn enum_value<T: AsRef<str>>(s: T) -> Self {
        Self::Enum(s.as_ref().into())
    }

    /// Construct a variable value.
    pub fn variable<T: AsRef<str>>(v: T) -> Self {
        Self::Variable(v.as_ref().into())
    }

    /// Construct a list value.
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l)
    }

    /// Construct an object value.
    pub fn object<K>(o: IndexMap<K, Self>) -> Self
    where
        K: AsRef<str>,
    {
        Self::Object(
            o.into_iter()
                .map(|(k, v)| (k.as_ref().into(), v))
                .collect(),
        )
    }

    /// Resolves all variables of this [`InputValue`] to their actual `values`.
    ///
    /// If a variable is not present in the `values`:
    /// - Returns [`None`] in case this is an [`InputValue::Variable`].
    /// - Skips field in case of an [`InputValue::Object`] field.
    /// - Replaces with an [`InputValue::Null`] in case of an
    ///   [`InputValue::List`] element.
    ///
    /// An omitted object field may still pick up its declared default later,
    /// while a list element has no default to fall back to.
    #[must_use]
    pub fn into_const(self, values: &Variables) -> Option<Self> {
        match self {
            Self::Variable(v) => values.get(&v).cloned(),
            Self::List(l) => Some(Self::List(
                l.into_iter()
                    .map(|v| v.into_const(values).unwrap_or_else(Self::null))
                    .collect(),
            )),
            Self::Object(o) => Some(Self::Object(
                o.into_iter()
                    .filter_map(|(k, v)| v.into_const(values).map(|v| (k, v)))
                    .collect(),
            )),
            v => Some(v),
        }
    }

    /// Shorthand form of invoking [`FromInputValue::from_input_value()`].
    pub fn convert<T: FromInputValue>(&self) -> Result<T, T::Error> {
        T::from_input_value(self)
    }

    /// Does the value represent a `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Does the value represent a variable?
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// View the underlying enum value, if present.
    pub fn as_enum_value(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// View the underlying int value, if present.
    pub fn as_int_value(&self) -> Option<i32> {
        self.as_scalar().and_then(DefaultScalarValue::as_int)
    }

    /// View the underlying float value, if present.
    pub fn as_float_value(&self) -> Option<f64> {
        self.as_scalar().and_then(DefaultScalarValue::as_float)
    }

    /// View the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str> {
        self.as_scalar().and_then(DefaultScalarValue::as_str)
    }

    /// View the underlying scalar value, if present.
    pub fn as_scalar(&self) -> Option<&DefaultScalarValue> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Converts this [`InputValue`] to an [`IndexMap`].
    ///
    /// Returns [`None`] if this is not an [`InputValue::Object`].
    pub fn to_object_value(&self) -> Option<IndexMap<&str, &Self>> {
        match self {
            Self::Object(o) => Some(o.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            _ => None,
        }
    }

    /// Converts this [`InputValue`] to a list of references.
    ///
    /// Returns [`None`] if this is not an [`InputValue::List`].
    pub fn to_list_value(&self) -> Option<Vec<&Self>> {
        match self {
            Self::List(l) => Some(l.iter().collect()),
            _ => None,
        }
    }

    /// Recursively finds all variables.
    pub fn referenced_variables(&self) -> Vec<&str> {
        match self {
            Self::Variable(name) => vec![name.as_str()],
            Self::List(l) => l.iter().flat_map(Self::referenced_variables).collect(),
            Self::Object(o) => o.iter().flat_map(|(_, v)| v.referenced_variables()).collect(),
            _ => vec![],
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Enum(v) => write!(f, "{v}"),
            Self::Variable(v) => write!(f, "${v}"),
            Self::List(v) => {
                write!(f, "[")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt(f)?;
                }
                write!(f, "]")
            }
            Self::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl<T> From<Option<T>> for InputValue
where
    Self: From<T>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<'a> From<&'a str> for InputValue {
    fn from(s: &'a str) -> Self {
        Self::scalar(s)
    }
}

impl<'a> From<Cow<'a, str>> for InputValue {
    fn from(s: Cow<'a, str>) -> Self {
        Self::scalar(s.into_owned())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        Self::scalar(s)
    }
}

impl From<i32> for InputValue {
    fn from(i: i32) -> Self {
        Self::scalar(i)
    }
}

impl From<f64> for InputValue {
    fn from(f: f64) -> Self {
        Self::scalar(f)
    }
}

impl From<bool> for InputValue {
    fn from(b: bool) -> Self {
        Self::scalar(b)
    }
}

/// Parsing of a coerced input value into a Rust data type.
///
/// The conversion _can_ fail, and must in that case return [`Err`]. The
/// returned [`Err`] should be convertible with [`IntoFieldError`] to fit well
/// into resolvers using `?`.
///
/// [`IntoFieldError`]: crate::IntoFieldError
pub trait FromInputValue: Sized {
    /// Type of this conversion error.
    type Error;

    /// Performs the conversion.
    fn from_input_value(v: &InputValue) -> Result<Self, Self::Error>;

    /// Performs the conversion from an absent value (e.g. to distinguish
    /// between implicit and explicit `null`).
    ///
    /// The default implementation just calls [`from_input_value()`] as if an
    /// explicit `null` was provided.
    ///
    /// [`from_input_value()`]: FromInputValue::from_input_value
    fn from_implicit_null() -> Result<Self, Self::Error> {
        Self::from_input_value(&InputValue::Null)
    }
}

/// Kind of an executable operation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        })
    }
}

/// Argument list of a field or directive, in document order.
pub type Arguments = Vec<(Spanning<String>, Spanning<InputValue>)>;

/// Declaration of a single operation variable.
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct VariableDefinition {
    pub var_type: Spanning<Type>,
    pub default_value: Option<Spanning<InputValue>>,
}

/// A directive applied to a selection, e.g. `@skip(if: $flag)`.
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Directive {
    pub name: Spanning<String>,
    pub arguments: Arguments,
}

impl Directive {
    /// Looks up an argument of this directive by name.
    pub fn argument(&self, name: &str) -> Option<&Spanning<InputValue>> {
        self.arguments
            .iter()
            .find(|(k, _)| k.item == name)
            .map(|(_, v)| v)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Field {
    pub alias: Option<Spanning<String>>,
    pub name: Spanning<String>,
    pub arguments: Arguments,
    pub directives: Vec<Spanning<Directive>>,
    pub selection_set: Vec<Selection>,
}

impl Field {
    /// Key of this field in the response map: its alias, if any, otherwise its
    /// name.
    pub fn response_key(&self) -> &str {
        self.alias.as_ref().unwrap_or(&self.name).item.as_str()
    }

    /// Looks up a supplied argument by name.
    pub fn argument(&self, name: &str) -> Option<&Spanning<InputValue>> {
        self.arguments
            .iter()
            .find(|(k, _)| k.item == name)
            .map(|(_, v)| v)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct FragmentSpread {
    pub name: Spanning<String>,
    pub directives: Vec<Spanning<Directive>>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct InlineFragment {
    pub type_condition: Option<Spanning<String>>,
    pub directives: Vec<Spanning<Directive>>,
    pub selection_set: Vec<Selection>,
}

/// Entry in a GraphQL selection set
///
/// This enum represents one of the three variants of a selection that exists
/// in GraphQL: a field, a fragment spread, or an inline fragment. Each of the
/// variants references their location in the query source.
///
/// ```text
/// {
///   field(withArg: 123) { subField }
///   ...fragmentSpread
///   ...on User {
///     inlineFragmentField
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum Selection {
    Field(Spanning<Field>),
    FragmentSpread(Spanning<FragmentSpread>),
    InlineFragment(Spanning<InlineFragment>),
}

impl Selection {
    /// Directives attached to this selection.
    pub fn directives(&self) -> &[Spanning<Directive>] {
        match self {
            Self::Field(f) => &f.item.directives,
            Self::FragmentSpread(f) => &f.item.directives,
            Self::InlineFragment(f) => &f.item.directives,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Operation {
    pub operation_type: OperationType,
    pub name: Option<Spanning<String>>,
    pub variable_definitions: Vec<(Spanning<String>, VariableDefinition)>,
    pub directives: Vec<Spanning<Directive>>,
    pub selection_set: Vec<Selection>,
}

#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub struct Fragment {
    pub name: Spanning<String>,
    pub type_condition: Spanning<String>,
    pub directives: Vec<Spanning<Directive>>,
    pub selection_set: Vec<Selection>,
}

/// An executable document: its operations in document order and its fragments
/// keyed by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    /// Operation definitions, in document order.
    pub operations: Vec<Spanning<Operation>>,
    /// Fragment definitions, keyed by fragment name.
    pub fragments: IndexMap<String, Spanning<Fragment>>,
}

impl Document {
    /// Looks up a fragment definition by name.
    pub fn fragment(&self, name: &str) -> Option<&Spanning<Fragment>> {
        self.fragments.get(name)
    }
}
