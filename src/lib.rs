//! GraphQL execution engine for schemas described at runtime.
//!
//! A schema is assembled from [`meta`] type descriptions whose fields carry
//! async resolver closures, then built into a [`SchemaType`] through a
//! [`Registry`]. Query documents are executed against it, producing the usual
//! `data` + `errors` response envelope:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use juniper_dynamic::{
//!     FieldContext, FieldResult, Registry, Type, execute, graphql_value, graphql_vars,
//!     meta::{Field, ObjectMeta},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let schema = Registry::new()
//!     .register(
//!         ObjectMeta::new(
//!             "Query",
//!             [Field::new("items", Type::list(Type::named("String")))
//!                 .resolver(|_: FieldContext| async { FieldResult::Ok(vec!["x", "y", "z"]) })],
//!         )
//!         .into_meta(),
//!     )
//!     .build("Query", None, None)
//!     .unwrap();
//!
//! let output = execute("{ items }", None, &schema, &graphql_vars! {}, Arc::new(()))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(output.data, graphql_value!({"items": ["x", "y", "z"]}));
//! assert!(output.errors.is_empty());
//! # }
//! ```
//!
//! Query fields run concurrently, mutation root fields run one after another,
//! and subscriptions map every event of a source stream through the
//! operation's selection set (see [`resolve_into_stream()`]).
//!
//! Documents are expected to be validated before they are executed.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

// Required for using the macros inside this crate to resolve absolute
// `::juniper_dynamic` paths correctly.
extern crate self as juniper_dynamic;

#[doc(hidden)]
#[macro_use]
pub mod value;
mod ast;
pub mod executor;
pub mod integrations;
pub mod parser;
pub(crate) mod schema;
mod types;

#[cfg(test)]
mod executor_tests;

use derive_more::with_trait::{Display, Error, From};
use tokio_util::sync::CancellationToken;

use crate::executor::{coerce_variable_values, get_operation};

pub use crate::{
    ast::{
        Document, FromInputValue, InputValue, Operation, OperationType, Selection, Type, Variables,
    },
    executor::{
        EngineError, ExecutionContext, ExecutionError, ExecutionOutput, ExecutionStrategy,
        FieldError, FieldResult, IntoFieldError, NodePath, PathSegment, SubscriptionResult,
        ValueSource,
    },
    parser::{ParseError, SourcePosition, Spanning, parse_document_source},
    schema::{
        meta,
        model::{ExecutionConfig, Registry, SchemaError, SchemaType},
    },
    types::{
        base::{
            AnyValue, Arguments, EventStream, FieldContext, ItemStream, Resolve, Resolved,
            ResolverResult, Subscribe, TypeResolver,
        },
        scalars::{
            BooleanScalar, FloatScalar, IdScalar, IntScalar, ScalarConverter, StringScalar,
            WrongInputScalarTypeError, WrongOutputScalarTypeError,
        },
    },
    value::{DefaultScalarValue, Object, Value},
};

/// An error that prevented query execution
#[derive(Clone, Debug, Display, Error, From, PartialEq)]
pub enum GraphQLError {
    /// The query source could not be parsed.
    #[display("{_0}")]
    ParseError(ParseError),

    /// The document contains no operation.
    #[display("No operation provided")]
    #[from(ignore)]
    NoOperationProvided,

    /// The document contains several operations, but no name was given.
    #[display("Multiple operations provided")]
    #[from(ignore)]
    MultipleOperationsProvided,

    /// No operation of the document has the given name.
    #[display("Unknown operation name")]
    #[from(ignore)]
    UnknownOperationName,

    /// A subscription was given where a query or mutation was expected.
    #[display("Operation is a subscription")]
    #[from(ignore)]
    IsSubscription,

    /// A query or mutation was given where a subscription was expected.
    #[display("Operation is not a subscription")]
    #[from(ignore)]
    NotSubscription,

    /// Supplied variables are invalid for the operation.
    #[display("Invalid variables: {}", _0.iter().map(|e| e.error().message()).collect::<Vec<_>>().join("; "))]
    #[from(ignore)]
    VariableError(#[error(not(source))] Vec<ExecutionError>),
}

/// Parses and executes a query or mutation.
///
/// # Errors
///
/// If the source cannot be parsed, no operation can be selected, the selected
/// operation is a subscription, or `variables` are invalid. Field errors do
/// not fail execution, they are reported in [`ExecutionOutput::errors`].
pub async fn execute(
    document_source: &str,
    operation_name: Option<&str>,
    schema: &SchemaType,
    variables: &Variables,
    root: AnyValue,
) -> Result<ExecutionOutput, GraphQLError> {
    let document = parse_document_source(document_source)?;
    execute_document(&document, operation_name, schema, variables, root).await
}

/// Executes a query or mutation of an already parsed document.
///
/// # Errors
///
/// Same as [`execute()`], minus parsing.
pub async fn execute_document(
    document: &Document,
    operation_name: Option<&str>,
    schema: &SchemaType,
    variables: &Variables,
    root: AnyValue,
) -> Result<ExecutionOutput, GraphQLError> {
    let operation = &get_operation(document, operation_name)?.item;
    let variables = coerce_variable_values(schema, operation, variables)?;

    match operation.operation_type {
        OperationType::Query => {
            Ok(executor::execute_query(document, operation, schema, &variables, root).await)
        }
        OperationType::Mutation => {
            Ok(executor::execute_mutation(document, operation, schema, &variables, root).await)
        }
        OperationType::Subscription => Err(GraphQLError::IsSubscription),
    }
}

/// Subscribes to a subscription operation of an already parsed document.
///
/// Setup failures of the subscription itself (e.g. a failing subscriber) are
/// reported as the single output of the returned stream.
///
/// # Errors
///
/// If no operation can be selected, the selected operation is not a
/// subscription, or `variables` are invalid.
pub async fn resolve_into_stream<'a>(
    document: &'a Document,
    operation_name: Option<&str>,
    schema: &'a SchemaType,
    variables: &Variables,
    root: AnyValue,
) -> Result<SubscriptionResult<'a>, GraphQLError> {
    let operation = &get_operation(document, operation_name)?.item;
    if operation.operation_type != OperationType::Subscription {
        return Err(GraphQLError::NotSubscription);
    }
    let variables = coerce_variable_values(schema, operation, variables)?;

    Ok(executor::subscribe(
        document,
        operation,
        schema,
        variables,
        root,
        CancellationToken::new(),
    )
    .await)
}
