mod field_execution {
    use std::sync::Arc;

    use crate::{
        FieldContext, FieldResult, Registry, Resolved, SchemaType, Type, execute, graphql_value,
        graphql_vars,
        schema::meta::{Argument, Field, ObjectMeta},
    };

    struct Data;
    struct Deep;

    fn schema() -> SchemaType {
        Registry::new()
            .register(
                ObjectMeta::new(
                    "Data",
                    [
                        Field::new("a", Type::named("String"))
                            .resolver(|_: FieldContext| async { FieldResult::Ok("Apple") }),
                        Field::new("b", Type::named("String"))
                            .resolver(|_: FieldContext| async { FieldResult::Ok("Banana") }),
                        Field::new("pic", Type::named("String"))
                            .argument(Argument::new("size", Type::named("Int")))
                            .resolver(|ctx: FieldContext| async move {
                                let size = ctx.args().get::<i32>("size")?.unwrap_or(50);
                                FieldResult::Ok(format!("Pic of size: {size}"))
                            }),
                        Field::new("deep", Type::named("Deep")).resolver(|_: FieldContext| async {
                            FieldResult::Ok(Resolved::object(Deep))
                        }),
                    ],
                )
                .into_meta(),
            )
            .register(
                ObjectMeta::new(
                    "Deep",
                    [
                        Field::new("a", Type::named("String"))
                            .resolver(|_: FieldContext| async { FieldResult::Ok("Already Been Done") }),
                        Field::new("c", Type::list(Type::named("String"))).resolver(
                            |_: FieldContext| async {
                                FieldResult::Ok(vec![Some("Contrived"), None, Some("Confusing")])
                            },
                        ),
                        Field::new("deeper", Type::list(Type::named("Data"))).resolver(
                            |_: FieldContext| async {
                                FieldResult::Ok(vec![
                                    Resolved::object(Data),
                                    Resolved::Null,
                                    Resolved::object(Data),
                                ])
                            },
                        ),
                    ],
                )
                .into_meta(),
            )
            .build("Data", None, None)
            .expect("valid schema")
    }

    #[tokio::test]
    async fn test() {
        let schema = schema();
        let doc = r"
          query Example($size: Int) {
            a,
            b,
            x: a
            pic(size: $size)
            deep {
              a
              c
              deeper {
                a
                b
              }
            }
          }";

        let output = execute(
            doc,
            None,
            &schema,
            &graphql_vars! {"size": 100},
            Arc::new(Data),
        )
        .await
        .expect("Execution failed");

        assert_eq!(output.errors, []);

        println!("Result: {:#?}", output.data);

        assert_eq!(
            output.data,
            graphql_value!({
                "a": "Apple",
                "b": "Banana",
                "x": "Apple",
                "pic": "Pic of size: 100",
                "deep": {
                    "a": "Already Been Done",
                    "c": ["Contrived", null, "Confusing"],
                    "deeper": [
                        {"a": "Apple", "b": "Banana"},
                        null,
                        {"a": "Apple", "b": "Banana"},
                    ],
                },
            }),
        );
    }

    #[tokio::test]
    async fn response_keys_keep_selection_order() {
        let schema = schema();

        let output = execute("{ b x: a a }", None, &schema, &graphql_vars! {}, Arc::new(Data))
            .await
            .expect("Execution failed");

        let keys = output
            .data
            .as_object_value()
            .expect("Result is not an object")
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>();
        assert_eq!(keys, ["b", "x", "a"]);
    }

    #[tokio::test]
    async fn argument_default_is_applied() {
        let schema = schema();

        let output = execute("{ pic }", None, &schema, &graphql_vars! {}, Arc::new(Data))
            .await
            .expect("Execution failed");

        assert_eq!(output.data, graphql_value!({"pic": "Pic of size: 50"}));
    }
}

mod scenarios {
    use std::sync::Arc;

    use crate::{
        FieldContext, FieldResult, Registry, Type, execute, graphql_vars,
        schema::meta::{Field, ObjectMeta},
    };

    #[tokio::test]
    async fn list_of_strings() {
        let schema = Registry::new()
            .register(
                ObjectMeta::new(
                    "Query",
                    [Field::new("items", Type::list(Type::named("String")))
                        .resolver(|_: FieldContext| async { FieldResult::Ok(vec!["x", "y", "z"]) })],
                )
                .into_meta(),
            )
            .build("Query", None, None)
            .expect("valid schema");

        let output = execute("{ items }", None, &schema, &graphql_vars! {}, Arc::new(()))
            .await
            .expect("Execution failed");

        assert_eq!(
            serde_json::to_value(&output).expect("serializes"),
            serde_json::json!({"data": {"items": ["x", "y", "z"]}}),
        );
    }
}

mod typename {
    use std::sync::Arc;

    use crate::{
        Registry, Type, execute, graphql_value, graphql_vars,
        schema::meta::{Field, ObjectMeta},
    };

    #[tokio::test]
    async fn root_typename() {
        let schema = Registry::new()
            .register(
                ObjectMeta::new("Query", [Field::new("unused", Type::named("Int"))]).into_meta(),
            )
            .build("Query", None, None)
            .expect("valid schema");

        let output = execute(
            "{ __typename kind: __typename }",
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
            graphql_value!({"__typename": "Query", "kind": "Query"}),
        );
    }
}

mod operations {
    use std::sync::Arc;

    use crate::{
        FieldContext, FieldResult, GraphQLError, Registry, SchemaType, Type, execute,
        graphql_value, graphql_vars,
        schema::meta::{Field, ObjectMeta},
    };

    fn schema() -> SchemaType {
        Registry::new()
            .register(
                ObjectMeta::new(
                    "Query",
                    [Field::new("a", Type::named("Int"))
                        .resolver(|_: FieldContext| async { FieldResult::Ok(1) })],
                )
                .into_meta(),
            )
            .build("Query", None, None)
            .expect("valid schema")
    }

    async fn run(doc: &str, operation_name: Option<&str>) -> Result<crate::Value, GraphQLError> {
        execute(
            doc,
            operation_name,
            &schema(),
            &graphql_vars! {},
            Arc::new(()),
        )
        .await
        .map(|output| output.data)
    }

    #[tokio::test]
    async fn selects_operation_by_name() {
        let doc = "query A { a } query B { b: a }";

        assert_eq!(run(doc, Some("B")).await, Ok(graphql_value!({"b": 1})));
        assert_eq!(
            run(doc, Some("C")).await,
            Err(GraphQLError::UnknownOperationName),
        );
        assert_eq!(
            run(doc, None).await,
            Err(GraphQLError::MultipleOperationsProvided),
        );
    }

    #[tokio::test]
    async fn no_operation() {
        assert_eq!(
            run("fragment F on Query { a }", None).await,
            Err(GraphQLError::NoOperationProvided),
        );
    }

    #[tokio::test]
    async fn parse_error() {
        assert!(matches!(
            run("{ a ", None).await,
            Err(GraphQLError::ParseError(_)),
        ));
    }

    #[tokio::test]
    async fn subscription_is_rejected() {
        assert_eq!(
            run("subscription { a }", None).await,
            Err(GraphQLError::IsSubscription),
        );
    }

    #[tokio::test]
    async fn missing_mutation_root() {
        let output = execute(
            "mutation { a }",
            None,
            &schema(),
            &graphql_vars! {},
            Arc::new(()),
        )
        .await
        .expect("Execution failed");

        assert_eq!(output.data, graphql_value!(null));
        assert_eq!(output.errors.len(), 1);
        assert_eq!(
            output.errors[0].error().message(),
            "Schema is not configured for mutation operations",
        );
        assert!(output.errors[0].path().is_empty());
    }
}

mod resolver_errors {
    use std::sync::Arc;

    use crate::{
        FieldContext, FieldError, FieldResult, Registry, SchemaType, Type, execute,
        graphql_value, graphql_vars,
        parser::SourcePosition,
        schema::meta::{Field, ObjectMeta},
    };

    fn schema() -> SchemaType {
        Registry::new()
            .register(
                ObjectMeta::new(
                    "Query",
                    [
                        Field::new("ok", Type::named("Int"))
                            .resolver(|_: FieldContext| async { FieldResult::Ok(1) }),
                        Field::new("failing", Type::named("Int")).resolver(|_: FieldContext| async {
                            FieldResult::<i32>::Err(FieldError::new(
                                "Not available",
                                graphql_value!({"code": "UNAVAILABLE"}),
                            ))
                        }),
                        Field::new("unresolved", Type::named("Int")),
                        Field::new("wrong", Type::named("Int"))
                            .resolver(|_: FieldContext| async { FieldResult::Ok("not a number") }),
                    ],
                )
                .into_meta(),
            )
            .build("Query", None, None)
            .expect("valid schema")
    }

    #[tokio::test]
    async fn errors_are_positioned() {
        let output = execute(
            "{\n  ok\n  failing\n}",
            None,
            &schema(),
            &graphql_vars! {},
            Arc::new(()),
        )
        .await
        .expect("Execution failed");

        assert_eq!(output.data, graphql_value!({"ok": 1, "failing": null}));
        assert_eq!(output.errors.len(), 1);

        let err = &output.errors[0];
        assert_eq!(err.error().message(), "Not available");
        assert_eq!(
            err.error().extensions(),
            &graphql_value!({"code": "UNAVAILABLE"}),
        );
        assert_eq!(err.location(), &SourcePosition::new(3, 3));
        assert_eq!(
            err.path().iter().map(ToString::to_string).collect::<Vec<_>>(),
            ["failing"],
        );
    }

    #[tokio::test]
    async fn engine_failures_become_field_errors() {
        let output = execute(
            "{ unresolved wrong unknown }",
            None,
            &schema(),
            &graphql_vars! {},
            Arc::new(()),
        )
        .await
        .expect("Execution failed");

        assert_eq!(
            output.data,
            graphql_value!({"unresolved": null, "wrong": null, "unknown": null}),
        );
        assert_eq!(
            output
                .errors
                .iter()
                .map(|e| e.error().message())
                .collect::<Vec<_>>(),
            [
                "No resolver for field \"Query.unresolved\"",
                "`Int` cannot represent value: \"not a number\"",
                "Unknown field \"unknown\" on type \"Query\"",
            ],
        );
    }
}
