use indexmap::IndexMap;

use crate::{
    GraphQLError,
    ast::{self, InputValue, Operation, Type, Variables},
    executor::{EngineError, ExecutionError},
    schema::{
        meta::{self, MetaType},
        model::SchemaType,
    },
    types::base::Arguments,
    value::DefaultScalarValue,
};

/// Origin of an input value being coerced.
///
/// Scalars distinguish between values written inline in the query document
/// and values supplied at runtime, see
/// [`ScalarConverter`](crate::ScalarConverter).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueSource {
    /// An AST literal from the query document.
    Literal,
    /// A runtime value: a supplied variable or a schema default.
    Variable,
}

fn coercion_error(message: impl Into<String>) -> EngineError {
    EngineError::ValueCoercion(message.into())
}

/// Coerces an input value against the declared input type `ty`.
///
/// Does not touch any execution state, so it may be called from anywhere.
///
/// # Errors
///
/// [`EngineError::ValueCoercion`] if the value does not fit `ty`.
pub fn coerce_value(
    schema: &SchemaType,
    value: &InputValue,
    ty: &Type,
    source: ValueSource,
) -> Result<InputValue, EngineError> {
    coerce_input(schema, value, ty, source, None)
}

/// Is `value` a variable reference with no coerced value in `variables`?
fn is_absent_variable(value: &InputValue, variables: Option<&Variables>) -> bool {
    match value {
        InputValue::Variable(var) => variables.is_none_or(|vars| !vars.contains_key(var)),
        _ => false,
    }
}

/// Coerces `value` against `ty`, substituting nested variable references with
/// their already coerced values from `variables` as-is.
fn coerce_input(
    schema: &SchemaType,
    value: &InputValue,
    ty: &Type,
    source: ValueSource,
    variables: Option<&Variables>,
) -> Result<InputValue, EngineError> {
    if let InputValue::Variable(var) = value {
        let substituted = variables
            .and_then(|vars| vars.get(var))
            .cloned()
            .unwrap_or(InputValue::Null);
        if substituted.is_null() && ty.is_non_null() {
            return Err(coercion_error(format!(
                "coerced value is null for non-null type \"{ty}\"",
            )));
        }
        return Ok(substituted);
    }

    match ty {
        Type::NonNull(inner) => {
            let coerced = if value.is_null() {
                InputValue::Null
            } else {
                coerce_input(schema, value, inner, source, variables)?
            };
            if coerced.is_null() {
                return Err(coercion_error(format!(
                    "coerced value is null for non-null type \"{ty}\"",
                )));
            }
            Ok(coerced)
        }
        _ if value.is_null() => Ok(InputValue::Null),
        Type::List(inner) => match value {
            InputValue::List(items) => items
                .iter()
                .map(|item| coerce_input(schema, item, inner, source, variables))
                .collect::<Result<_, _>>()
                .map(InputValue::List),
            single => Ok(InputValue::List(vec![coerce_input(
                schema, single, inner, source, variables,
            )?])),
        },
        Type::Named(name) => match schema.type_by_name(name) {
            Some(MetaType::Scalar(s)) => {
                let converter = s.converter();
                match source {
                    ValueSource::Literal => converter.parse_literal(value),
                    ValueSource::Variable => converter.parse_value(value),
                }
                .map_err(|e| coercion_error(e.message()))
            }
            Some(MetaType::Enum(e)) => {
                let candidate = match (value, source) {
                    (InputValue::Enum(v), _) => Some(v),
                    (InputValue::Scalar(DefaultScalarValue::String(v)), ValueSource::Variable) => {
                        Some(v)
                    }
                    _ => None,
                };
                match candidate {
                    Some(v) if e.value_by_name(v).is_some() => Ok(InputValue::enum_value(v)),
                    Some(v) => Err(coercion_error(format!(
                        "Value \"{v}\" does not exist in \"{name}\" enum",
                    ))),
                    None => Err(coercion_error(format!(
                        "Expected enum `{name}`, found: {value}",
                    ))),
                }
            }
            Some(MetaType::InputObject(io)) => {
                let Some(object) = value.to_object_value() else {
                    return Err(coercion_error(format!(
                        "Expected input object `{name}`, found: {value}",
                    )));
                };
                let mut fields = Vec::with_capacity(io.input_fields.len());
                for field in &io.input_fields {
                    let supplied = object
                        .get(field.name.as_str())
                        .filter(|v| !is_absent_variable(v, variables));
                    let coerced = match (supplied, &field.default_value) {
                        (Some(v), _) => coerce_input(schema, v, &field.arg_type, source, variables),
                        (None, Some(d)) => {
                            coerce_value(schema, d, &field.arg_type, ValueSource::Variable)
                        }
                        (None, None) if field.arg_type.is_non_null() => {
                            return Err(coercion_error(format!(
                                "Field \"{}\" of required type \"{}\" was not provided \
                                 for input object \"{name}\"",
                                field.name, field.arg_type,
                            )));
                        }
                        (None, None) => continue,
                    }
                    .map_err(|e| match e {
                        EngineError::ValueCoercion(msg) => {
                            coercion_error(format!("In field \"{}\": {msg}", field.name))
                        }
                        e => e,
                    })?;
                    fields.push((field.name.to_string(), coerced));
                }
                Ok(InputValue::Object(fields))
            }
            Some(_) | None => Err(coercion_error(format!(
                "unexpected type \"{name}\", cannot coerce",
            ))),
        },
    }
}

/// Builds the coerced argument values of a field invocation.
///
/// Only the arguments declared by `definition` are considered; anything else
/// supplied in the query is ignored.
///
/// # Errors
///
/// [`EngineError::ValueCoercion`] naming the offending argument.
pub fn coerce_argument_values(
    schema: &SchemaType,
    definition: &meta::Field,
    field: &ast::Field,
    variables: &Variables,
) -> Result<Arguments, EngineError> {
    let mut coerced = IndexMap::with_capacity(definition.arguments.len());

    for arg in &definition.arguments {
        let name = arg.name.as_str();
        let ty = &arg.arg_type;

        let value = match field.argument(name).map(|v| &v.item) {
            // Variables are coerced once per operation already.
            Some(InputValue::Variable(var)) => variables.get(var).cloned().map(Ok),
            Some(literal) => Some(coerce_input(
                schema,
                literal,
                ty,
                ValueSource::Literal,
                Some(variables),
            )),
            None => None,
        };

        let value = match value {
            Some(v) => v,
            None => match &arg.default_value {
                Some(d) => coerce_value(schema, d, ty, ValueSource::Variable),
                None if ty.is_non_null() => {
                    return Err(coercion_error(format!(
                        "Argument \"{name}\" of required type \"{ty}\" was not provided",
                    )));
                }
                None => continue,
            },
        }
        .and_then(|v| {
            if v.is_null() && ty.is_non_null() {
                Err(coercion_error(format!(
                    "Argument \"{name}\" of non-null type \"{ty}\" must not be null",
                )))
            } else {
                Ok(v)
            }
        })
        .map_err(|e| match e {
            EngineError::ValueCoercion(msg) => {
                coercion_error(format!("Invalid value for argument \"{name}\": {msg}"))
            }
            e => e,
        })?;

        coerced.insert(name.to_owned(), value);
    }

    Ok(Arguments::new(coerced))
}

/// Builds the coerced variable values of an operation from the supplied ones.
///
/// Variables that are neither supplied nor defaulted stay absent, which is
/// different from being `null`.
///
/// # Errors
///
/// [`GraphQLError::VariableError`] listing every invalid variable.
pub fn coerce_variable_values(
    schema: &SchemaType,
    operation: &Operation,
    supplied: &Variables,
) -> Result<Variables, GraphQLError> {
    let mut coerced = Variables::with_capacity(operation.variable_definitions.len());
    let mut errors = vec![];

    for (name, definition) in &operation.variable_definitions {
        let ty = &definition.var_type.item;
        let error = |message: String| {
            ExecutionError::new(
                name.start,
                vec![],
                EngineError::Variable(message).into(),
            )
        };

        if !schema
            .type_by_name(ty.innermost_name())
            .is_some_and(MetaType::is_input)
        {
            errors.push(error(format!(
                "Variable \"${}\" expected value of type \"{ty}\" which cannot be used as an \
                 input type.",
                name.item,
            )));
            continue;
        }

        let value = match supplied.get(&name.item) {
            Some(v) => coerce_value(schema, v, ty, ValueSource::Variable),
            None => match &definition.default_value {
                Some(d) => coerce_value(schema, &d.item, ty, ValueSource::Literal),
                None if ty.is_non_null() => {
                    errors.push(error(format!(
                        "Variable \"${}\" of required type \"{ty}\" was not provided.",
                        name.item,
                    )));
                    continue;
                }
                None => continue,
            },
        };

        match value {
            Ok(v) => {
                coerced.insert(name.item.clone(), v);
            }
            Err(e) => errors.push(error(format!(
                "Variable \"${}\" got invalid value. {e}",
                name.item,
            ))),
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        errors.sort();
        Err(GraphQLError::VariableError(errors))
    }
}
