use fnv::FnvHashSet;
use indexmap::IndexMap;

use crate::{
    ast::{Directive, Document, Field, InputValue, Selection, Variables},
    executor::{EngineError, FieldError},
    parser::Spanning,
    schema::model::SchemaType,
    value::DefaultScalarValue,
};

/// Field selections grouped by response key, in document order.
///
/// All selections of one key are merged into a single field group, no matter
/// which fragment they came from.
pub type GroupedFieldSet<'a> = IndexMap<&'a str, Vec<&'a Spanning<Field>>>;

/// Collects the fields of `selection_set` applying to values of the object
/// type `object_type` into `grouped`.
///
/// Fragment spreads are looked up by name in `document`, each fragment is
/// expanded at most once per collection pass (tracked in `visited`).
///
/// # Errors
///
/// If a `@skip` or `@include` directive has no usable `if` argument.
pub fn collect_fields<'a>(
    schema: &SchemaType,
    document: &'a Document,
    object_type: &str,
    selection_set: &'a [Selection],
    variables: &Variables,
    grouped: &mut GroupedFieldSet<'a>,
    visited: &mut FnvHashSet<&'a str>,
) -> Result<(), Spanning<FieldError>> {
    for selection in selection_set {
        if is_excluded(selection.directives(), variables)? {
            continue;
        }

        match selection {
            Selection::Field(field) => {
                grouped
                    .entry(field.item.response_key())
                    .or_default()
                    .push(field);
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.item.name.item.as_str();
                if !visited.insert(name) {
                    continue;
                }
                let Some(fragment) = document.fragment(name) else {
                    continue;
                };
                if !schema.does_fragment_type_apply(object_type, &fragment.item.type_condition.item)
                {
                    continue;
                }
                collect_fields(
                    schema,
                    document,
                    object_type,
                    &fragment.item.selection_set,
                    variables,
                    grouped,
                    visited,
                )?;
            }
            Selection::InlineFragment(fragment) => {
                if let Some(condition) = &fragment.item.type_condition {
                    if !schema.does_fragment_type_apply(object_type, &condition.item) {
                        continue;
                    }
                }
                collect_fields(
                    schema,
                    document,
                    object_type,
                    &fragment.item.selection_set,
                    variables,
                    grouped,
                    visited,
                )?;
            }
        }
    }
    Ok(())
}

/// Evaluates `@skip` and then `@include`.
fn is_excluded(
    directives: &[Spanning<Directive>],
    variables: &Variables,
) -> Result<bool, Spanning<FieldError>> {
    for directive in directives {
        let name = directive.item.name.item.as_str();
        if name != "skip" {
            continue;
        }
        if directive_condition(directive, variables)? {
            return Ok(true);
        }
    }
    for directive in directives {
        let name = directive.item.name.item.as_str();
        if name != "include" {
            continue;
        }
        if !directive_condition(directive, variables)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn directive_condition(
    directive: &Spanning<Directive>,
    variables: &Variables,
) -> Result<bool, Spanning<FieldError>> {
    let name = &directive.item.name.item;
    let value = match directive.item.argument("if").map(|v| &v.item) {
        Some(InputValue::Variable(var)) => variables.get(var),
        other => other,
    };
    match value {
        Some(InputValue::Scalar(DefaultScalarValue::Boolean(b))) => Ok(*b),
        None | Some(InputValue::Null) => Err(EngineError::DirectiveIf(name.clone())),
        Some(other) => Err(EngineError::ValueCoercion(format!(
            "Expected `Boolean` for the if argument of @{name}, found: {other}",
        ))),
    }
    .map_err(|e| Spanning::new(directive.start, e.into()))
}
