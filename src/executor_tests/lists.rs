use std::sync::Arc;

use futures::stream;

use crate::{
    ExecutionConfig, ExecutionOutput, FieldContext, FieldResult, Registry, Resolved, SchemaType,
    Type, execute, graphql_value, graphql_vars,
    schema::meta::{Field, ObjectMeta},
};

fn schema(config: ExecutionConfig) -> SchemaType {
    Registry::new()
        .register(
            ObjectMeta::new(
                "Query",
                [
                    Field::new("streamed", Type::list(Type::named("Int"))).resolver(
                        |_: FieldContext| async {
                            FieldResult::Ok(Resolved::stream(stream::iter(
                                (1..=3).map(|i| FieldResult::Ok(Resolved::from(i))),
                            )))
                        },
                    ),
                    Field::new("brokenStream", Type::list(Type::named("Int"))).resolver(
                        |_: FieldContext| async {
                            FieldResult::Ok(Resolved::stream(stream::iter([
                                FieldResult::Ok(Resolved::from(1)),
                                Err("stream broke".into()),
                            ])))
                        },
                    ),
                    Field::new("nested", Type::list(Type::list(Type::named("Int")))).resolver(
                        |_: FieldContext| async {
                            FieldResult::Ok(vec![vec![Some(1), None], vec![], vec![Some(3)]])
                        },
                    ),
                    Field::new("single", Type::list(Type::named("Int")))
                        .resolver(|_: FieldContext| async { FieldResult::Ok(1) }),
                    Field::new("badItem", Type::list(Type::named("Int")))
                        .resolver(|_: FieldContext| async { FieldResult::Ok(vec!["1", "x"]) }),
                ],
            )
            .into_meta(),
        )
        .config(config)
        .build("Query", None, None)
        .expect("valid schema")
}

async fn run(query: &str, config: ExecutionConfig) -> ExecutionOutput {
    execute(query, None, &schema(config), &graphql_vars! {}, Arc::new(()))
        .await
        .expect("Execution failed")
}

#[tokio::test]
async fn streams_are_drained() {
    let output = run("{ streamed }", ExecutionConfig::default()).await;

    assert_eq!(output.errors, []);
    assert_eq!(output.data, graphql_value!({"streamed": [1, 2, 3]}));
}

#[tokio::test]
async fn stream_error_fails_the_list() {
    let output = run("{ brokenStream }", ExecutionConfig::default()).await;

    assert_eq!(output.data, graphql_value!({"brokenStream": null}));
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].error().message(), "stream broke");
}

#[tokio::test]
async fn stream_limit_is_enforced() {
    let limited = ExecutionConfig {
        stream_list_limit: Some(2),
    };
    let output = run("{ streamed }", limited).await;

    assert_eq!(output.data, graphql_value!({"streamed": null}));
    assert_eq!(
        output.errors[0].error().message(),
        "list stream exceeded the limit of 2 items",
    );

    let exact = ExecutionConfig {
        stream_list_limit: Some(3),
    };
    assert_eq!(
        run("{ streamed }", exact).await.data,
        graphql_value!({"streamed": [1, 2, 3]}),
    );
}

#[tokio::test]
async fn nested_lists() {
    let output = run("{ nested }", ExecutionConfig::default()).await;

    assert_eq!(output.errors, []);
    assert_eq!(
        output.data,
        graphql_value!({"nested": [[1, null], [], [3]]}),
    );
}

#[tokio::test]
async fn non_collection_is_an_error() {
    let output = run("{ single }", ExecutionConfig::default()).await;

    assert_eq!(output.data, graphql_value!({"single": null}));
    assert_eq!(
        output.errors[0].error().message(),
        "resolved value is not a collection for list type \"[Int]\"",
    );
}

#[tokio::test]
async fn nullable_items_absorb_their_errors() {
    let output = run("{ badItem }", ExecutionConfig::default()).await;

    assert_eq!(output.data, graphql_value!({"badItem": [1, null]}));
    assert_eq!(output.errors.len(), 1);
    assert_eq!(
        output.errors[0]
            .path()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        ["badItem", "1"],
    );
}
