use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::{
    FieldContext, FieldResult, Registry, Resolved, SchemaType, Type, execute, graphql_value,
    graphql_vars,
    schema::meta::{Field, ObjectMeta},
};

struct Thing {
    a: i32,
    b: i32,
}

fn schema(obj_calls: Arc<AtomicUsize>) -> SchemaType {
    Registry::new()
        .register(
            ObjectMeta::new(
                "Thing",
                [
                    Field::new("a", Type::named("Int")).resolver(|ctx: FieldContext| async move {
                        FieldResult::Ok(ctx.parent::<Thing>().ok_or("no thing")?.a)
                    }),
                    Field::new("b", Type::named("Int")).resolver(|ctx: FieldContext| async move {
                        FieldResult::Ok(ctx.parent::<Thing>().ok_or("no thing")?.b)
                    }),
                    Field::new("self", Type::named("Thing")).resolver(|ctx: FieldContext| async move {
                        FieldResult::Ok(Resolved::Object(ctx.parent_value().clone()))
                    }),
                ],
            )
            .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "Query",
                [Field::new("obj", Type::named("Thing")).resolver(move |_: FieldContext| {
                    obj_calls.fetch_add(1, Ordering::SeqCst);
                    async { FieldResult::Ok(Resolved::object(Thing { a: 1, b: 2 })) }
                })],
            )
            .into_meta(),
        )
        .build("Query", None, None)
        .expect("valid schema")
}

#[tokio::test]
async fn same_field_from_two_fragments_is_merged() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = schema(calls.clone());

    let output = execute(
        "{ ...F1 ...F2 } fragment F1 on Query { obj { a } } fragment F2 on Query { obj { b } }",
        None,
        &schema,
        &graphql_vars! {},
        Arc::new(()),
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.errors, []);
    assert_eq!(output.data, graphql_value!({"obj": {"a": 1, "b": 2}}));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn nested_sub_selections_are_merged() {
    let schema = schema(Arc::new(AtomicUsize::new(0)));

    let output = execute(
        "{ obj { self { a } } obj { self { b } x: a } }",
        None,
        &schema,
        &graphql_vars! {},
        Arc::new(()),
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.errors, []);
    assert_eq!(
        output.data,
        graphql_value!({"obj": {"self": {"a": 1, "b": 2}, "x": 1}}),
    );
}

#[tokio::test]
async fn aliases_stay_separate_groups() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = schema(calls.clone());

    let output = execute(
        "{ first: obj { a } second: obj { b } }",
        None,
        &schema,
        &graphql_vars! {},
        Arc::new(()),
    )
    .await
    .expect("Execution failed");

    assert_eq!(
        output.data,
        graphql_value!({"first": {"a": 1}, "second": {"b": 2}}),
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn non_matching_type_condition_is_ignored() {
    let schema = schema(Arc::new(AtomicUsize::new(0)));

    let output = execute(
        "{ obj { ... on Query { x: __typename } ... on Thing { a } } }",
        None,
        &schema,
        &graphql_vars! {},
        Arc::new(()),
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.data, graphql_value!({"obj": {"a": 1}}));
}
