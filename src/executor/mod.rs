//! Resolve the document to values

use std::sync::{Arc, PoisonError, RwLock};

use tokio_util::sync::CancellationToken;
use tracing::Instrument as _;

use crate::{
    GraphQLError,
    ast::{Document, Operation, Type, Variables},
    parser::{SourcePosition, Spanning},
    schema::model::SchemaType,
    types::base::AnyValue,
    value::Value,
};

mod coercion;
mod collect;
mod complete;
mod error;
mod path;
mod strategy;
mod subscription;

pub use self::{
    coercion::{ValueSource, coerce_argument_values, coerce_value, coerce_variable_values},
    collect::{GroupedFieldSet, collect_fields},
    error::{EngineError, ExecutionError, FieldError, FieldResult, IntoFieldError},
    path::{NodePath, PathSegment},
    strategy::ExecutionStrategy,
    subscription::SubscriptionResult,
};

/// Outcome of executing a field: its completed value, or an error still
/// looking for the nearest nullable position to absorb it.
pub(crate) type FieldOutcome<T = Value> = Result<T, Arc<ExecutionError>>;

/// Result of executing an operation, or of mapping a single subscription
/// event.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionOutput {
    /// Response data, [`Value::Null`] if execution failed before or at the
    /// root.
    pub data: Value,
    /// Field and request errors, sorted by location and path.
    pub errors: Vec<ExecutionError>,
}

impl ExecutionOutput {
    /// Creates an [`ExecutionOutput`] of the provided `data` without errors.
    pub fn from_data(data: Value) -> Self {
        Self {
            data,
            errors: vec![],
        }
    }

    /// Creates an [`ExecutionOutput`] carrying only the provided `error`.
    pub fn from_error(error: ExecutionError) -> Self {
        Self {
            data: Value::null(),
            errors: vec![error],
        }
    }

    /// Indicates whether execution recorded no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// State of a single operation execution.
///
/// The schema, document and variables are only read. The error accumulator
/// is the one piece of state concurrently executing fields write to.
pub struct ExecutionContext<'a> {
    schema: &'a SchemaType,
    document: &'a Document,
    variables: &'a Variables,
    strategy: ExecutionStrategy,
    errors: RwLock<Vec<Arc<ExecutionError>>>,
}

impl<'a> ExecutionContext<'a> {
    /// Creates a new [`ExecutionContext`] with an empty error accumulator.
    pub fn new(
        schema: &'a SchemaType,
        document: &'a Document,
        variables: &'a Variables,
        strategy: ExecutionStrategy,
    ) -> Self {
        Self {
            schema,
            document,
            variables,
            strategy,
            errors: RwLock::new(vec![]),
        }
    }

    /// The schema being executed against.
    pub fn schema(&self) -> &'a SchemaType {
        self.schema
    }

    /// The document the executed operation belongs to.
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// The coerced variables of the executed operation.
    pub fn variables(&self) -> &'a Variables {
        self.variables
    }

    /// Strategy of the root selection set.
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Records an error, unless this very error is recorded already.
    pub fn push_error(&self, error: Arc<ExecutionError>) {
        let mut errors = self.errors.write().unwrap_or_else(PoisonError::into_inner);
        if errors.iter().any(|e| Arc::ptr_eq(e, &error)) {
            return;
        }
        tracing::debug!(
            error = error.error().message(),
            path = ?error.path(),
            "field error recorded",
        );
        errors.push(error);
    }

    /// Positions an error at `location` and `path`.
    pub fn error_at(
        &self,
        location: SourcePosition,
        path: &NodePath,
        error: impl IntoFieldError,
    ) -> Arc<ExecutionError> {
        Arc::new(ExecutionError::new(
            location,
            path.to_vec(),
            error.into_field_error(),
        ))
    }

    /// Absorbs a failed outcome into `null` if `ty` is nullable, recording the
    /// error. Outcomes of non-null types are passed through untouched, so the
    /// error keeps bubbling.
    pub(crate) fn absorb(&self, ty: &Type, outcome: FieldOutcome) -> FieldOutcome {
        match outcome {
            Err(e) if !ty.is_non_null() => {
                self.push_error(e);
                Ok(Value::null())
            }
            outcome => outcome,
        }
    }

    /// Collects the outcomes of sibling executions.
    ///
    /// All siblings are awaited by the time this is called. The first failure
    /// bubbles further, any other one is recorded right away.
    pub(crate) fn settle<T>(
        &self,
        outcomes: impl IntoIterator<Item = FieldOutcome<T>>,
    ) -> FieldOutcome<Vec<T>> {
        let mut values = vec![];
        let mut failure = None;
        for outcome in outcomes {
            match outcome {
                Ok(v) => values.push(v),
                Err(e) if failure.is_none() => failure = Some(e),
                Err(e) => self.push_error(e),
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(values),
        }
    }

    /// Takes the recorded errors, sorted.
    pub fn into_errors(self) -> Vec<ExecutionError> {
        let mut errors = self
            .errors
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .map(Arc::unwrap_or_clone)
            .collect::<Vec<_>>();
        errors.sort();
        errors
    }
}

/// Finds the operation to execute in `document`.
///
/// # Errors
///
/// If `operation_name` is required to pick an operation but missing, or names
/// no operation of the document.
pub fn get_operation<'b>(
    document: &'b Document,
    operation_name: Option<&str>,
) -> Result<&'b Spanning<Operation>, GraphQLError> {
    let mut operation = None;
    for op in &document.operations {
        if operation_name.is_none() && operation.is_some() {
            return Err(GraphQLError::MultipleOperationsProvided);
        }

        let move_op = operation_name.is_none()
            || op.item.name.as_ref().map(|s| s.item.as_str()) == operation_name;

        if move_op {
            operation = Some(op);
        }
    }

    match operation {
        Some(op) => Ok(op),
        None if operation_name.is_some() => Err(GraphQLError::UnknownOperationName),
        None => Err(GraphQLError::NoOperationProvided),
    }
}

/// Executes a query operation, running its root fields in parallel.
pub async fn execute_query(
    document: &Document,
    operation: &Operation,
    schema: &SchemaType,
    variables: &Variables,
    root: AnyValue,
) -> ExecutionOutput {
    execute_operation(
        document,
        operation,
        schema,
        variables,
        root,
        ExecutionStrategy::Parallel,
    )
    .await
}

/// Executes a mutation operation, running its root fields one after another
/// in selection order.
pub async fn execute_mutation(
    document: &Document,
    operation: &Operation,
    schema: &SchemaType,
    variables: &Variables,
    root: AnyValue,
) -> ExecutionOutput {
    execute_operation(
        document,
        operation,
        schema,
        variables,
        root,
        ExecutionStrategy::Serial,
    )
    .await
}

/// Subscribes to a subscription operation.
///
/// Every event of the source stream is executed against the operation's
/// selection set, producing one [`ExecutionOutput`] per event. Cancelling
/// `cancel` (or calling [`SubscriptionResult::unsubscribe()`]) stops the
/// stream.
pub async fn subscribe<'a>(
    document: &'a Document,
    operation: &'a Operation,
    schema: &'a SchemaType,
    variables: Variables,
    root: AnyValue,
    cancel: CancellationToken,
) -> SubscriptionResult<'a> {
    subscription::subscribe(document, operation, schema, variables, root, cancel).await
}

pub(crate) async fn execute_operation(
    document: &Document,
    operation: &Operation,
    schema: &SchemaType,
    variables: &Variables,
    root: AnyValue,
    strategy: ExecutionStrategy,
) -> ExecutionOutput {
    let span = tracing::debug_span!(
        "execute_operation",
        operation = %operation.operation_type,
        name = operation.name.as_ref().map(|n| n.item.as_str()),
    );

    async move {
        let Some(root_type) = schema.root_type(operation.operation_type) else {
            return ExecutionOutput::from_error(ExecutionError::at_origin(
                EngineError::MissingRootType(operation.operation_type).into(),
            ));
        };

        let ctx = ExecutionContext::new(schema, document, variables, strategy);
        let data = match ctx
            .execute_selection_set(
                root_type,
                &root,
                &[operation.selection_set.as_slice()],
                &NodePath::root(),
                strategy,
            )
            .await
        {
            Ok(object) => Value::Object(object),
            Err(e) => {
                ctx.push_error(e);
                Value::null()
            }
        };

        ExecutionOutput {
            data,
            errors: ctx.into_errors(),
        }
    }
    .instrument(span)
    .await
}
