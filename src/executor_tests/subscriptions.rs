use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures::{StreamExt as _, stream};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use crate::{
    AnyValue, ExecutionOutput, FieldContext, FieldError, FieldResult, GraphQLError, Registry,
    SchemaType, Type, graphql_value, graphql_vars, parse_document_source, resolve_into_stream,
    schema::meta::{Argument, Field, ObjectMeta},
};

struct Event {
    id: i32,
}

fn event(id: i32) -> FieldResult<AnyValue> {
    Ok(Arc::new(Event { id }))
}

fn schema(stopped: Arc<AtomicBool>) -> SchemaType {
    Registry::new()
        .register(
            ObjectMeta::new(
                "Event",
                [
                    Field::new("id", Type::named("Int").non_null()).resolver(
                        |ctx: FieldContext| async move {
                            FieldResult::Ok(ctx.parent::<Event>().ok_or("not an event")?.id)
                        },
                    ),
                    Field::new("even", Type::named("Boolean")).resolver(
                        |ctx: FieldContext| async move {
                            let id = ctx.parent::<Event>().ok_or("not an event")?.id;
                            if id % 2 != 0 {
                                return Err(FieldError::from(format!("{id} is odd")));
                            }
                            FieldResult::Ok(true)
                        },
                    ),
                ],
            )
            .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "Query",
                [Field::new("unused", Type::named("Int"))],
            )
            .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "Subscription",
                [
                    Field::new("events", Type::named("Event"))
                        .argument(Argument::new("count", Type::named("Int")))
                        .subscriber(|ctx: FieldContext, _: CancellationToken| async move {
                            let count = ctx.args().get::<i32>("count")?.unwrap_or(2);
                            FieldResult::Ok(stream::iter((1..=count).map(event)))
                        }),
                    Field::new("flaky", Type::named("Event")).subscriber(
                        |_: FieldContext, _: CancellationToken| async {
                            FieldResult::Ok(stream::iter([
                                event(1),
                                Err("upstream failure".into()),
                                event(3),
                            ]))
                        },
                    ),
                    Field::new("refused", Type::named("Event")).subscriber(
                        |_: FieldContext, _: CancellationToken| async {
                            FieldResult::<stream::Empty<FieldResult<AnyValue>>>::Err(
                                "not allowed".into(),
                            )
                        },
                    ),
                    Field::new("endless", Type::named("Event")).subscriber(
                        move |_: FieldContext, cancel: CancellationToken| {
                            let stopped = stopped.clone();
                            async move {
                                tokio::spawn(async move {
                                    cancel.cancelled().await;
                                    stopped.store(true, Ordering::SeqCst);
                                });
                                FieldResult::Ok(
                                    stream::repeat_with(|| event(7))
                                        .then(|e| async move {
                                            tokio::time::sleep(Duration::from_millis(5)).await;
                                            e
                                        }),
                                )
                            }
                        },
                    ),
                    Field::new("unsubscribable", Type::named("Event")),
                ],
            )
            .into_meta(),
        )
        .build("Query", None, Some("Subscription"))
        .expect("valid schema")
}

async fn collect(query: &str) -> Vec<ExecutionOutput> {
    let schema = schema(Arc::default());
    let doc = parse_document_source(query).expect("parses");

    resolve_into_stream(&doc, None, &schema, &graphql_vars! {}, Arc::new(()))
        .await
        .expect("subscribes")
        .collect()
        .await
}

#[tokio::test]
async fn maps_every_event() {
    let outputs = collect("subscription { events { id } }").await;

    assert_eq!(
        outputs,
        [
            ExecutionOutput::from_data(graphql_value!({"events": {"id": 1}})),
            ExecutionOutput::from_data(graphql_value!({"events": {"id": 2}})),
        ],
    );
}

#[tokio::test]
async fn arguments_reach_the_subscriber() {
    let outputs = collect("subscription { e: events(count: 3) { id } }").await;

    assert_eq!(outputs.len(), 3);
    assert_eq!(outputs[2].data, graphql_value!({"e": {"id": 3}}));
}

#[tokio::test]
async fn events_are_isolated() {
    let outputs = collect("subscription { events { id even } }").await;

    assert_eq!(
        outputs[0].data,
        graphql_value!({"events": {"id": 1, "even": null}}),
    );
    assert_eq!(outputs[0].errors.len(), 1);
    assert_eq!(outputs[0].errors[0].error().message(), "1 is odd");

    assert_eq!(
        outputs[1],
        ExecutionOutput::from_data(graphql_value!({"events": {"id": 2, "even": true}})),
    );
}

#[tokio::test]
async fn upstream_errors_become_outputs() {
    let outputs = collect("subscription { flaky { id } }").await;

    assert_eq!(outputs.len(), 3);
    assert!(outputs[0].is_ok());
    assert_eq!(outputs[1].data, graphql_value!(null));
    assert_eq!(outputs[1].errors[0].error().message(), "upstream failure");
    assert_eq!(
        outputs[1].errors[0]
            .path()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        ["flaky"],
    );
    assert_eq!(outputs[2].data, graphql_value!({"flaky": {"id": 3}}));
}

#[tokio::test]
async fn setup_failures_are_a_single_output() {
    for (query, message) in [
        ("subscription { refused { id } }", "not allowed"),
        (
            "subscription { unsubscribable { id } }",
            "No subscriber for field \"Subscription.unsubscribable\"",
        ),
        (
            "subscription { nope { id } }",
            "Unknown field \"nope\" on type \"Subscription\"",
        ),
    ] {
        let outputs = collect(query).await;

        assert_eq!(outputs.len(), 1, "{query}");
        assert_eq!(outputs[0].data, graphql_value!(null));
        assert_eq!(outputs[0].errors[0].error().message(), message);
    }
}

#[tokio::test]
async fn queries_cannot_be_subscribed() {
    let schema = schema(Arc::default());
    let doc = parse_document_source("{ unused }").expect("parses");

    let res = resolve_into_stream(&doc, None, &schema, &graphql_vars! {}, Arc::new(())).await;

    assert!(matches!(res, Err(GraphQLError::NotSubscription)));
}

#[tokio::test]
async fn unsubscribe_stops_the_stream() {
    let stopped = Arc::new(AtomicBool::new(false));
    let schema = schema(stopped.clone());
    let doc = parse_document_source("subscription { endless { id } }").expect("parses");

    let mut results = resolve_into_stream(&doc, None, &schema, &graphql_vars! {}, Arc::new(()))
        .await
        .expect("subscribes");

    for _ in 0..2 {
        let output = results.next().await.expect("endless stream");
        assert_eq!(output.data, graphql_value!({"endless": {"id": 7}}));
    }

    results.unsubscribe();
    assert!(results.is_cancelled());
    assert_eq!(results.next().await, None);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(stopped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn dropping_the_stream_cancels_the_source() {
    let stopped = Arc::new(AtomicBool::new(false));
    let schema = schema(stopped.clone());
    let doc = parse_document_source("subscription { endless { id } }").expect("parses");

    let mut results = resolve_into_stream(&doc, None, &schema, &graphql_vars! {}, Arc::new(()))
        .await
        .expect("subscribes");
    assert!(results.next().await.is_some());
    drop(results);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(stopped.load(Ordering::SeqCst));
}
