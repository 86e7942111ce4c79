use std::{any::Any, fmt, future::Future, sync::Arc};

use arcstr::ArcStr;
use async_trait::async_trait;
use futures::stream::{BoxStream, Stream, StreamExt as _};
use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use crate::{
    ast::{FromInputValue, InputValue},
    executor::{FieldResult, IntoFieldError, NodePath},
    value::DefaultScalarValue,
};

/// Opaque, shareable runtime value of a GraphQL object.
///
/// Resolvers downcast it back to their own Rust type through
/// [`FieldContext::parent()`].
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// Asynchronous source of list items.
pub type ItemStream = BoxStream<'static, FieldResult<Resolved>>;

/// Source event stream returned by a [`Subscribe`]r.
pub type EventStream = BoxStream<'static, FieldResult<AnyValue>>;

/// Callback naming the concrete object type of an abstract value.
pub type TypeResolver = Arc<dyn Fn(&Resolved) -> Option<ArcStr> + Send + Sync>;

/// Raw value produced by a resolver, before it is completed against the
/// declared output type of its field.
///
/// The declared type alone decides how the value is completed; the variant is
/// only inspected to check that it fits.
#[derive(derive_more::Debug)]
pub enum Resolved {
    /// Absent value.
    Null,

    /// Value of a scalar type.
    Scalar(DefaultScalarValue),

    /// Name of an enum value.
    Enum(String),

    /// Synchronous list of values.
    List(Vec<Resolved>),

    /// Asynchronous list of values, drained before completion.
    Stream(#[debug("<stream>")] ItemStream),

    /// Value of an object, interface or union type.
    Object(#[debug("<object>")] AnyValue),
}

impl Resolved {
    /// Wraps any Rust value as an [`Resolved::Object`].
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Self::Object(Arc::new(value))
    }

    /// Constructs a [`Resolved::Enum`].
    pub fn enum_value(name: impl Into<String>) -> Self {
        Self::Enum(name.into())
    }

    /// Constructs a [`Resolved::List`] out of anything convertible.
    pub fn list<T: Into<Self>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Constructs a [`Resolved::Stream`] out of any item stream.
    pub fn stream<S>(items: S) -> Self
    where
        S: Stream<Item = FieldResult<Self>> + Send + 'static,
    {
        Self::Stream(items.boxed())
    }

    /// Does the value represent a `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Downcasts an object value to `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Object(o) => o.downcast_ref(),
            _ => None,
        }
    }
}

impl<T: Into<Resolved>> From<Option<T>> for Resolved {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Resolved>> From<Vec<T>> for Resolved {
    fn from(v: Vec<T>) -> Self {
        Self::list(v)
    }
}

impl From<DefaultScalarValue> for Resolved {
    fn from(s: DefaultScalarValue) -> Self {
        Self::Scalar(s)
    }
}

impl From<AnyValue> for Resolved {
    fn from(o: AnyValue) -> Self {
        Self::Object(o)
    }
}

macro_rules! impl_resolved_from_scalar {
    ($($t:ty),+) => {$(
        impl From<$t> for Resolved {
            fn from(v: $t) -> Self {
                Self::Scalar(v.into())
            }
        }
    )+};
}

impl_resolved_from_scalar!(i32, f64, bool, String, &str);

/// What a [`Resolve`]r returns: the raw value plus an optional hint naming the
/// concrete type of abstract values.
pub struct ResolverResult {
    /// Raw resolved value.
    pub value: Resolved,

    /// Names the concrete object type of each abstract value.
    ///
    /// For lists the callback is applied to every item. When absent, the
    /// callback registered on the interface or union type is used.
    pub resolve_type: Option<TypeResolver>,
}

impl ResolverResult {
    /// Wraps a value without any type hint.
    pub fn new(value: impl Into<Resolved>) -> Self {
        Self {
            value: value.into(),
            resolve_type: None,
        }
    }

    /// Marks every abstract value of this result as being of the object type
    /// `name`.
    #[must_use]
    pub fn with_type(self, name: impl Into<ArcStr>) -> Self {
        let name = name.into();
        self.with_type_resolver(move |_| Some(name.clone()))
    }

    /// Attaches a callback naming the concrete type of each abstract value.
    #[must_use]
    pub fn with_type_resolver<F>(mut self, f: F) -> Self
    where
        F: Fn(&Resolved) -> Option<ArcStr> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for ResolverResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverResult")
            .field("value", &self.value)
            .field("resolve_type", &self.resolve_type.is_some())
            .finish()
    }
}

impl From<Resolved> for ResolverResult {
    fn from(value: Resolved) -> Self {
        Self::new(value)
    }
}

impl<T: Into<Resolved>> From<Option<T>> for ResolverResult {
    fn from(v: Option<T>) -> Self {
        Self::new(v)
    }
}

impl<T: Into<Resolved>> From<Vec<T>> for ResolverResult {
    fn from(v: Vec<T>) -> Self {
        Self::new(v)
    }
}

macro_rules! impl_result_from_scalar {
    ($($t:ty),+) => {$(
        impl From<$t> for ResolverResult {
            fn from(v: $t) -> Self {
                Self::new(v)
            }
        }
    )+};
}

impl_result_from_scalar!(i32, f64, bool, String, &str, DefaultScalarValue, AnyValue);

/// Field argument container
///
/// Holds the coerced values of all arguments declared by a field. Arguments
/// omitted from the query without a default value are absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    args: IndexMap<String, InputValue>,
}

impl Arguments {
    #[doc(hidden)]
    pub fn new(args: IndexMap<String, InputValue>) -> Self {
        Self { args }
    }

    /// Gets an argument by the provided `name` and converts it into the
    /// desired type.
    ///
    /// If the argument is found, or a default argument has been provided, the
    /// given [`InputValue`] will be converted into the type `T`.
    ///
    /// Returns [`None`] if an argument with such `name` is not present.
    ///
    /// # Errors
    ///
    /// If the [`FromInputValue`] conversion fails.
    pub fn get<T>(&self, name: &str) -> FieldResult<Option<T>>
    where
        T: FromInputValue,
        T::Error: IntoFieldError,
    {
        self.args
            .get(name)
            .map(T::from_input_value)
            .transpose()
            .map_err(IntoFieldError::into_field_error)
    }

    /// Gets the raw coerced value of an argument.
    pub fn get_input_value(&self, name: &str) -> Option<&InputValue> {
        self.args.get(name)
    }

    /// Iterates over the coerced arguments, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.args.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of present arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Are there no arguments present?
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// Everything a [`Resolve`]r or [`Subscribe`]r gets to know about the field
/// being resolved.
#[derive(Clone)]
pub struct FieldContext {
    parent: AnyValue,
    args: Arc<Arguments>,
    field_name: ArcStr,
    parent_type_name: ArcStr,
    path: NodePath,
}

impl FieldContext {
    #[doc(hidden)]
    pub fn new(
        parent: AnyValue,
        args: Arc<Arguments>,
        field_name: ArcStr,
        parent_type_name: ArcStr,
        path: NodePath,
    ) -> Self {
        Self {
            parent,
            args,
            field_name,
            parent_type_name,
            path,
        }
    }

    /// Downcasts the parent object value to `T`.
    pub fn parent<T: Any>(&self) -> Option<&T> {
        self.parent.downcast_ref()
    }

    /// The parent object value, as is.
    pub fn parent_value(&self) -> &AnyValue {
        &self.parent
    }

    /// Coerced arguments of this field.
    pub fn args(&self) -> &Arguments {
        &self.args
    }

    /// Name of the field being resolved.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Name of the object type the field is resolved on.
    pub fn parent_type_name(&self) -> &str {
        &self.parent_type_name
    }

    /// Position of the field in the response.
    pub fn path(&self) -> &NodePath {
        &self.path
    }
}

impl fmt::Debug for FieldContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldContext")
            .field("args", &self.args)
            .field("field_name", &self.field_name)
            .field("parent_type_name", &self.parent_type_name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Field resolver.
///
/// Implemented for every async closure `Fn(FieldContext) -> impl Future<Output
/// = FieldResult<R>>` where `R` converts into a [`ResolverResult`].
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Produces the raw value of the field.
    async fn resolve(&self, ctx: FieldContext) -> FieldResult<ResolverResult>;
}

#[async_trait]
impl<F, Fut, R> Resolve for F
where
    F: Fn(FieldContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FieldResult<R>> + Send + 'static,
    R: Into<ResolverResult> + 'static,
{
    async fn resolve(&self, ctx: FieldContext) -> FieldResult<ResolverResult> {
        self(ctx).await.map(Into::into)
    }
}

/// Source event stream factory of a subscription root field.
///
/// The [`CancellationToken`] is cancelled once the consumer of the
/// subscription goes away; the returned stream should stop producing events
/// then.
#[async_trait]
pub trait Subscribe: Send + Sync {
    /// Creates the source event stream.
    async fn subscribe(
        &self,
        ctx: FieldContext,
        cancel: CancellationToken,
    ) -> FieldResult<EventStream>;
}

#[async_trait]
impl<F, Fut, S> Subscribe for F
where
    F: Fn(FieldContext, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FieldResult<S>> + Send + 'static,
    S: Stream<Item = FieldResult<AnyValue>> + Send + 'static,
{
    async fn subscribe(
        &self,
        ctx: FieldContext,
        cancel: CancellationToken,
    ) -> FieldResult<EventStream> {
        self(ctx, cancel).await.map(|s| s.boxed())
    }
}
