use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll, ready},
};

use arcstr::ArcStr;
use fnv::FnvHashSet;
use futures::{
    Stream, StreamExt as _, future,
    stream::{self, BoxStream},
};
use tokio_util::sync::CancellationToken;

use crate::{
    ast::{Document, Operation, OperationType, Variables},
    executor::{
        EngineError, ExecutionError, ExecutionOutput, ExecutionStrategy, NodePath, PathSegment,
        coerce_argument_values,
        collect::{GroupedFieldSet, collect_fields},
        execute_operation,
    },
    parser::SourcePosition,
    schema::model::SchemaType,
    types::base::{AnyValue, EventStream, FieldContext},
};

/// Stream of [`ExecutionOutput`]s of a subscription, one per source event.
///
/// Owns the cancellation signal handed to the subscriber: calling
/// [`SubscriptionResult::unsubscribe()`] or dropping the result cancels it,
/// which stops both the source stream and the mapping of its events.
pub struct SubscriptionResult<'a> {
    stream: BoxStream<'a, ExecutionOutput>,
    cancel: CancellationToken,
}

impl SubscriptionResult<'_> {
    /// Stops the subscription. No further outputs are produced afterwards.
    pub fn unsubscribe(&self) {
        tracing::trace!("subscription cancelled");
        self.cancel.cancel();
    }

    /// Indicates whether the subscription was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Stream for SubscriptionResult<'_> {
    type Item = ExecutionOutput;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let output = ready!(self.get_mut().stream.poll_next_unpin(cx));
        if output.is_none() {
            tracing::debug!("subscription stream completed");
        }
        Poll::Ready(output)
    }
}

impl Drop for SubscriptionResult<'_> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Source event stream of a subscription, with the root field it came from.
struct SourceEventStream {
    events: EventStream,
    location: SourcePosition,
    response_key: ArcStr,
}

pub(super) async fn subscribe<'a>(
    document: &'a Document,
    operation: &'a Operation,
    schema: &'a SchemaType,
    variables: Variables,
    root: AnyValue,
    cancel: CancellationToken,
) -> SubscriptionResult<'a> {
    let cancel = cancel.child_token();
    let variables = Arc::new(variables);

    let source = match create_source_event_stream(
        document,
        operation,
        schema,
        &variables,
        root,
        cancel.clone(),
    )
    .await
    {
        Ok(source) => source,
        Err(e) => {
            tracing::debug!(error = e.error().message(), "subscription setup failed");
            return SubscriptionResult {
                stream: stream::once(future::ready(ExecutionOutput::from_error(e))).boxed(),
                cancel,
            };
        }
    };

    let SourceEventStream {
        events,
        location,
        response_key,
    } = source;

    let stream = events
        .then(move |event| {
            let variables = variables.clone();
            let response_key = response_key.clone();
            async move {
                match event {
                    Ok(value) => {
                        execute_operation(
                            document,
                            operation,
                            schema,
                            &variables,
                            value,
                            ExecutionStrategy::Parallel,
                        )
                        .await
                    }
                    Err(e) => ExecutionOutput::from_error(ExecutionError::new(
                        location,
                        vec![PathSegment::Field(response_key)],
                        e,
                    )),
                }
            }
        })
        .take_until(cancel.clone().cancelled_owned())
        .boxed();

    SubscriptionResult { stream, cancel }
}

async fn create_source_event_stream(
    document: &Document,
    operation: &Operation,
    schema: &SchemaType,
    variables: &Variables,
    root: AnyValue,
    cancel: CancellationToken,
) -> Result<SourceEventStream, ExecutionError> {
    let Some(subscription_type) = schema.subscription_type() else {
        return Err(ExecutionError::at_origin(
            EngineError::MissingRootType(OperationType::Subscription).into(),
        ));
    };

    let mut grouped = GroupedFieldSet::new();
    collect_fields(
        schema,
        document,
        &subscription_type.name,
        &operation.selection_set,
        variables,
        &mut grouped,
        &mut FnvHashSet::default(),
    )
    .map_err(|e| ExecutionError::new(e.start, vec![], e.item))?;

    let Some((field, response_key)) = grouped
        .iter()
        .find_map(|(key, fields)| Some((*fields.first()?, *key)))
    else {
        return Err(ExecutionError::at_origin(
            EngineError::NoSubscriptionField.into(),
        ));
    };

    let path = NodePath::root().field(response_key);
    let error = |e: EngineError| ExecutionError::new(field.start, path.to_vec(), e.into());

    let name = field.item.name.item.as_str();
    let definition = subscription_type.fields.get(name).ok_or_else(|| {
        error(EngineError::UnknownField {
            field: name.into(),
            type_name: subscription_type.name.clone(),
        })
    })?;
    let args = coerce_argument_values(schema, definition, &field.item, variables).map_err(error)?;
    let subscriber = definition.get_subscriber().ok_or_else(|| {
        error(EngineError::MissingSubscriber {
            field: definition.name.clone(),
            type_name: subscription_type.name.clone(),
        })
    })?;

    let events = subscriber
        .subscribe(
            FieldContext::new(
                root,
                Arc::new(args),
                definition.name.clone(),
                subscription_type.name.clone(),
                path.clone(),
            ),
            cancel,
        )
        .await
        .map_err(|e| ExecutionError::new(field.start, path.to_vec(), e))?;

    Ok(SourceEventStream {
        events,
        location: field.start,
        response_key: response_key.into(),
    })
}
