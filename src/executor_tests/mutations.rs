use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::time::sleep;

use crate::{
    FieldContext, FieldResult, Registry, SchemaType, Type, execute, graphql_value, graphql_vars,
    schema::meta::{Field, ObjectMeta},
};

type Log = Arc<Mutex<Vec<&'static str>>>;

fn logging(log: &Log, name: &'static str, delay_ms: u64, ty: Type) -> Field {
    let log = log.clone();
    Field::new(name, ty).resolver(move |_: FieldContext| {
        let log = log.clone();
        async move {
            sleep(Duration::from_millis(delay_ms)).await;
            log.lock().unwrap().push(name);
            FieldResult::Ok(name)
        }
    })
}

fn failing(log: &Log, name: &'static str, ty: Type) -> Field {
    let log = log.clone();
    Field::new(name, ty).resolver(move |_: FieldContext| {
        let log = log.clone();
        async move {
            log.lock().unwrap().push(name);
            FieldResult::<&str>::Err("rejected".into())
        }
    })
}

fn schema(log: &Log) -> SchemaType {
    Registry::new()
        .register(
            ObjectMeta::new(
                "Query",
                [
                    logging(log, "slow", 50, Type::named("String")),
                    logging(log, "fast", 0, Type::named("String")),
                ],
            )
            .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "Mutation",
                [
                    logging(log, "first", 50, Type::named("String")),
                    logging(log, "second", 0, Type::named("String")),
                    failing(log, "nullable", Type::named("String")),
                    failing(log, "required", Type::named("String").non_null()),
                ],
            )
            .into_meta(),
        )
        .build("Query", Some("Mutation"), None)
        .expect("valid schema")
}

#[tokio::test]
async fn root_fields_run_in_order() {
    let log = Log::default();
    let schema = schema(&log);

    let output = execute(
        "mutation { first second }",
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
        graphql_value!({"first": "first", "second": "second"}),
    );
    assert_eq!(*log.lock().unwrap(), ["first", "second"]);
}

#[tokio::test]
async fn query_fields_run_concurrently() {
    let log = Log::default();
    let schema = schema(&log);

    let output = execute("{ slow fast }", None, &schema, &graphql_vars! {}, Arc::new(()))
        .await
        .expect("Execution failed");

    assert_eq!(output.data, graphql_value!({"slow": "slow", "fast": "fast"}));
    assert_eq!(*log.lock().unwrap(), ["fast", "slow"]);
}

#[tokio::test]
async fn nullable_failure_does_not_stop_later_fields() {
    let log = Log::default();
    let schema = schema(&log);

    let output = execute(
        "mutation { nullable second }",
        None,
        &schema,
        &graphql_vars! {},
        Arc::new(()),
    )
    .await
    .expect("Execution failed");

    assert_eq!(
        output.data,
        graphql_value!({"nullable": null, "second": "second"}),
    );
    assert_eq!(output.errors.len(), 1);
    assert_eq!(*log.lock().unwrap(), ["nullable", "second"]);
}

#[tokio::test]
async fn non_null_failure_stops_later_fields() {
    let log = Log::default();
    let schema = schema(&log);

    let output = execute(
        "mutation { first required second }",
        None,
        &schema,
        &graphql_vars! {},
        Arc::new(()),
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.data, graphql_value!(null));
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].error().message(), "rejected");
    assert_eq!(*log.lock().unwrap(), ["first", "required"]);
}
