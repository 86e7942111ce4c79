use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::{
    ExecutionOutput, FieldContext, FieldResult, GraphQLError, InputValue, Registry, Resolved,
    ScalarConverter, SchemaType, Type, Value, Variables, execute, graphql_value, graphql_vars,
    schema::meta::{
        Argument, EnumMeta, EnumValue, Field, InputObjectMeta, ObjectMeta, ScalarMeta,
    },
};

/// Accepts `"SerializedValue"` only as a runtime value, and the enum-like
/// literal `SERIALIZED` only inline.
struct TestComplexScalar;

impl ScalarConverter for TestComplexScalar {
    fn parse_value(&self, value: &InputValue) -> FieldResult<InputValue> {
        match value.as_string_value() {
            Some("SerializedValue") => Ok(InputValue::scalar("DeserializedValue")),
            _ => Err(format!("Expected `SerializedValue`, found: {value}").into()),
        }
    }

    fn parse_literal(&self, value: &InputValue) -> FieldResult<InputValue> {
        match value.as_enum_value() {
            Some("SERIALIZED") => Ok(InputValue::scalar("DeserializedLiteral")),
            _ => Err(format!("Expected literal `SERIALIZED`, found: {value}").into()),
        }
    }

    fn serialize(&self, _: &Resolved) -> FieldResult<Value> {
        Ok(Value::scalar("SerializedValue"))
    }
}

/// Echoes the coerced value of the `input` argument.
fn echo(name: &str, arg_type: Type) -> Field {
    Field::new(name, Type::named("String"))
        .argument(Argument::new("input", arg_type))
        .resolver(|ctx: FieldContext| async move {
            FieldResult::Ok(match ctx.args().get_input_value("input") {
                Some(v) => v.to_string(),
                None => "<absent>".to_owned(),
            })
        })
}

fn schema() -> SchemaType {
    Registry::new()
        .register(ScalarMeta::new("ComplexScalar", TestComplexScalar).into_meta())
        .register(
            EnumMeta::new(
                "Color",
                [EnumValue::new("RED"), EnumValue::new("GREEN")],
            )
            .into_meta(),
        )
        .register(
            InputObjectMeta::new(
                "TestInputObject",
                [
                    Argument::new("a", Type::named("String")),
                    Argument::new("b", Type::list(Type::named("String"))),
                    Argument::new("c", Type::named("String").non_null()),
                    Argument::new("d", Type::named("ComplexScalar")),
                    Argument::new("e", Type::named("Int")).default_value(InputValue::scalar(7)),
                ],
            )
            .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "TestType",
                [
                    echo("fieldWithObjectInput", Type::named("TestInputObject")),
                    echo("fieldWithNullableStringInput", Type::named("String")),
                    echo("fieldWithNonNullableStringInput", Type::named("String").non_null()),
                    echo("list", Type::list(Type::named("Int"))),
                    echo("nnList", Type::list(Type::named("Int")).non_null()),
                    echo("color", Type::named("Color")),
                    echo("complex", Type::named("ComplexScalar")),
                    echo("id", Type::named("ID")),
                    Field::new("fieldWithDefaultArgumentValue", Type::named("String"))
                        .argument(
                            Argument::new("input", Type::named("String"))
                                .default_value(InputValue::scalar("Hello World")),
                        )
                        .resolver(|ctx: FieldContext| async move {
                            FieldResult::Ok(ctx.args().get::<String>("input")?)
                        }),
                ],
            )
            .into_meta(),
        )
        .build("TestType", None, None)
        .expect("valid schema")
}

async fn run_variable_query(query: &str, vars: Variables) -> Result<ExecutionOutput, GraphQLError> {
    execute(query, None, &schema(), &vars, Arc::new(())).await
}

async fn run_query(query: &str) -> Value {
    let output = run_variable_query(query, graphql_vars! {})
        .await
        .expect("Execution failed");

    assert_eq!(output.errors, []);

    output.data
}

fn message(output: &ExecutionOutput) -> &str {
    output.errors[0].error().message()
}

#[tokio::test]
async fn inline_complex_input() {
    assert_eq!(
        run_query(r#"{ fieldWithObjectInput(input: {a: "foo", b: ["bar"], c: "baz"}) }"#).await,
        graphql_value!({"fieldWithObjectInput": r#"{a: "foo", b: ["bar"], c: "baz", e: 7}"#}),
    );
}

#[tokio::test]
async fn variable_complex_input() {
    let output = run_variable_query(
        "query q($input: TestInputObject) { fieldWithObjectInput(input: $input) }",
        graphql_vars! {"input": {"a": "foo", "b": "bar", "c": "baz", "d": "SerializedValue"}},
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.errors, []);
    assert_eq!(
        output.data,
        graphql_value!({
            "fieldWithObjectInput":
                r#"{a: "foo", b: ["bar"], c: "baz", d: "DeserializedValue", e: 7}"#,
        }),
    );
}

#[tokio::test]
async fn nested_variable_is_not_coerced_again() {
    let output = run_variable_query(
        "query q($d: ComplexScalar) { fieldWithObjectInput(input: {c: \"baz\", d: $d}) }",
        graphql_vars! {"d": "SerializedValue"},
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.errors, []);
    assert_eq!(
        output.data,
        graphql_value!({"fieldWithObjectInput": r#"{c: "baz", d: "DeserializedValue", e: 7}"#}),
    );
}

#[tokio::test]
async fn absent_nested_variable_uses_field_default() {
    let output = run_variable_query(
        "query q($e: Int) { fieldWithObjectInput(input: {c: \"baz\", e: $e}) }",
        graphql_vars! {},
    )
    .await
    .expect("Execution failed");

    assert_eq!(output.errors, []);
    assert_eq!(
        output.data,
        graphql_value!({"fieldWithObjectInput": r#"{c: "baz", e: 7}"#}),
    );
}

#[tokio::test]
async fn variables_inside_list_literal() {
    let output = run_variable_query(
        "query q($v: Int) { list(input: [1, $v]) }",
        graphql_vars! {"v": 2},
    )
    .await
    .expect("Execution failed");
    assert_eq!(output.data, graphql_value!({"list": "[1, 2]"}));

    let output = run_variable_query("query q($v: Int) { list(input: [1, $v]) }", graphql_vars! {})
        .await
        .expect("Execution failed");
    assert_eq!(output.data, graphql_value!({"list": "[1, null]"}));
}

#[tokio::test]
async fn custom_scalar_literal_and_variable_differ() {
    assert_eq!(
        run_query("{ complex(input: SERIALIZED) }").await,
        graphql_value!({"complex": r#""DeserializedLiteral""#}),
    );

    let output = run_variable_query(
        "query q($v: ComplexScalar) { complex(input: $v) }",
        graphql_vars! {"v": "SerializedValue"},
    )
    .await
    .expect("Execution failed");
    assert_eq!(
        output.data,
        graphql_value!({"complex": r#""DeserializedValue""#}),
    );

    let output = run_variable_query(r#"{ complex(input: "SerializedValue") }"#, graphql_vars! {})
        .await
        .expect("Execution failed");
    assert_eq!(output.data, graphql_value!({"complex": null}));
    assert_eq!(
        message(&output),
        "Invalid value for argument \"input\": Expected literal `SERIALIZED`, found: \
         \"SerializedValue\"",
    );
}

#[tokio::test]
async fn single_value_is_wrapped_into_list() {
    assert_eq!(
        run_query("{ list(input: 4) nnList(input: [3, 1, 2]) }").await,
        graphql_value!({"list": "[4]", "nnList": "[3, 1, 2]"}),
    );

    let output = run_variable_query(
        "query q($v: [Int]) { list(input: $v) }",
        graphql_vars! {"v": 5},
    )
    .await
    .expect("Execution failed");
    assert_eq!(output.data, graphql_value!({"list": "[5]"}));
}

#[tokio::test]
async fn invalid_list_item() {
    let output = run_variable_query(r#"{ list(input: [1, "2"]) }"#, graphql_vars! {})
        .await
        .expect("Execution failed");

    assert_eq!(output.data, graphql_value!({"list": null}));
    assert!(message(&output).starts_with("Invalid value for argument \"input\""));
}

#[tokio::test]
async fn enum_arguments() {
    assert_eq!(
        run_query("{ color(input: RED) }").await,
        graphql_value!({"color": "RED"}),
    );

    let output = run_variable_query(
        "query q($c: Color) { color(input: $c) }",
        graphql_vars! {"c": "GREEN"},
    )
    .await
    .expect("Execution failed");
    assert_eq!(output.data, graphql_value!({"color": "GREEN"}));

    let output = run_variable_query("{ color(input: BLUE) }", graphql_vars! {})
        .await
        .expect("Execution failed");
    assert_eq!(output.data, graphql_value!({"color": null}));
    assert_eq!(
        message(&output),
        "Invalid value for argument \"input\": Value \"BLUE\" does not exist in \"Color\" enum",
    );
}

#[tokio::test]
async fn id_accepts_ints() {
    assert_eq!(
        run_query("{ id(input: 12) }").await,
        graphql_value!({"id": r#""12""#}),
    );
}

#[tokio::test]
async fn nullable_input_omitted_or_null() {
    assert_eq!(
        run_query("{ fieldWithNullableStringInput }").await,
        graphql_value!({"fieldWithNullableStringInput": "<absent>"}),
    );
    assert_eq!(
        run_query("{ fieldWithNullableStringInput(input: null) }").await,
        graphql_value!({"fieldWithNullableStringInput": "null"}),
    );

    let output = run_variable_query(
        "query q($v: String) { fieldWithNullableStringInput(input: $v) }",
        graphql_vars! {},
    )
    .await
    .expect("Execution failed");
    assert_eq!(
        output.data,
        graphql_value!({"fieldWithNullableStringInput": "<absent>"}),
    );
}

#[tokio::test]
async fn non_null_argument_missing() {
    let output = run_variable_query("{ fieldWithNonNullableStringInput }", graphql_vars! {})
        .await
        .expect("Execution failed");

    assert_eq!(
        output.data,
        graphql_value!({"fieldWithNonNullableStringInput": null}),
    );
    assert_eq!(
        message(&output),
        "Argument \"input\" of required type \"String!\" was not provided",
    );
}

#[tokio::test]
async fn default_argument_values() {
    assert_eq!(
        run_query("{ fieldWithDefaultArgumentValue }").await,
        graphql_value!({"fieldWithDefaultArgumentValue": "Hello World"}),
    );
    assert_eq!(
        run_query(r#"{ fieldWithDefaultArgumentValue(input: "Hi") }"#).await,
        graphql_value!({"fieldWithDefaultArgumentValue": "Hi"}),
    );
}

#[tokio::test]
async fn variable_default_is_used() {
    let output = run_variable_query(
        r#"query q($v: String = "fallback") { fieldWithNullableStringInput(input: $v) }"#,
        graphql_vars! {},
    )
    .await
    .expect("Execution failed");

    assert_eq!(
        output.data,
        graphql_value!({"fieldWithNullableStringInput": r#""fallback""#}),
    );
}

#[tokio::test]
async fn invalid_variables_are_rejected() {
    let res = run_variable_query(
        "query q($a: String!, $b: Int, $c: TestType) { fieldWithNullableStringInput(input: $a) }",
        graphql_vars! {"b": "not an int"},
    )
    .await;

    let Err(GraphQLError::VariableError(errors)) = res else {
        panic!("expected variable errors, got: {res:?}");
    };
    assert_eq!(
        errors
            .iter()
            .map(|e| e.error().message())
            .collect::<Vec<_>>(),
        [
            "Variable \"$a\" of required type \"String!\" was not provided.",
            "Variable \"$b\" got invalid value. Expected `Int`, found: \"not an int\"",
            "Variable \"$c\" expected value of type \"TestType\" which cannot be used as an \
             input type.",
        ],
    );
}

#[tokio::test]
async fn missing_input_object_field() {
    let res = run_variable_query(
        "query q($input: TestInputObject) { fieldWithObjectInput(input: $input) }",
        graphql_vars! {"input": {"a": "foo"}},
    )
    .await;

    let Err(GraphQLError::VariableError(errors)) = res else {
        panic!("expected variable errors, got: {res:?}");
    };
    assert_eq!(
        errors[0].error().message(),
        "Variable \"$input\" got invalid value. Field \"c\" of required type \"String!\" was \
         not provided for input object \"TestInputObject\"",
    );
}
