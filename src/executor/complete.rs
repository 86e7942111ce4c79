use std::sync::Arc;

use arcstr::ArcStr;
use futures::{
    FutureExt as _, StreamExt as _,
    future::BoxFuture,
    stream::FuturesOrdered,
};
use tracing::Instrument as _;

use crate::{
    ast::{Field, Type},
    executor::{
        EngineError, ExecutionContext, ExecutionStrategy, FieldOutcome, NodePath,
        coerce_argument_values,
    },
    parser::{SourcePosition, Spanning},
    schema::meta::{self, MetaType, ObjectMeta},
    types::base::{AnyValue, FieldContext, ItemStream, Resolved, ResolverResult, TypeResolver},
    value::{DefaultScalarValue, Value},
};

fn location(fields: &[&Spanning<Field>]) -> SourcePosition {
    fields
        .first()
        .map_or_else(SourcePosition::new_origin, |f| f.start)
}

impl<'a> ExecutionContext<'a> {
    /// Executes one field group of `object_value`, absorbing its failure into
    /// `null` if the field is nullable.
    pub(crate) fn execute_field_group(
        &'a self,
        object_type: &'a ObjectMeta,
        object_value: AnyValue,
        response_key: &'a str,
        fields: Vec<&'a Spanning<Field>>,
        path: &NodePath,
    ) -> BoxFuture<'a, FieldOutcome> {
        let path = path.field(response_key);
        let span = tracing::trace_span!("resolve_field", field = response_key, path = %path);

        async move {
            let Some(field) = fields.first().copied() else {
                return Ok(Value::null());
            };
            let name = field.item.name.item.as_str();

            if name == "__typename" {
                return Ok(Value::scalar(object_type.name.as_str()));
            }

            let Some(definition) = object_type.fields.get(name) else {
                self.push_error(self.error_at(
                    field.start,
                    &path,
                    EngineError::UnknownField {
                        field: name.into(),
                        type_name: object_type.name.clone(),
                    },
                ));
                return Ok(Value::null());
            };

            let outcome = self
                .resolve_field(object_type, definition, object_value, &fields, &path)
                .await;
            self.absorb(&definition.field_type, outcome)
        }
        .instrument(span)
        .boxed()
    }

    async fn resolve_field(
        &'a self,
        object_type: &'a ObjectMeta,
        definition: &'a meta::Field,
        object_value: AnyValue,
        fields: &'a [&'a Spanning<Field>],
        path: &NodePath,
    ) -> FieldOutcome {
        let location = location(fields);
        let Some(field) = fields.first() else {
            return Ok(Value::null());
        };

        let args = coerce_argument_values(self.schema(), definition, &field.item, self.variables())
            .map_err(|e| self.error_at(location, path, e))?;

        let result = match definition.get_resolver() {
            Some(resolver) => resolver
                .resolve(FieldContext::new(
                    object_value,
                    Arc::new(args),
                    definition.name.clone(),
                    object_type.name.clone(),
                    path.clone(),
                ))
                .await
                .map_err(|e| self.error_at(location, path, e))?,
            // Subscription root fields without a resolver yield the event.
            None if definition.get_subscriber().is_some() => {
                ResolverResult::new(Resolved::Object(object_value))
            }
            None => {
                return Err(self.error_at(
                    location,
                    path,
                    EngineError::MissingResolver {
                        field: definition.name.clone(),
                        type_name: object_type.name.clone(),
                    },
                ));
            }
        };

        self.complete_value(
            &definition.field_type,
            fields,
            result.value,
            result.resolve_type.as_ref(),
            path.clone(),
        )
        .await
    }

    /// Completes a resolved value against its declared output type.
    ///
    /// Errors are never turned into `null` here: list items absorb their own
    /// errors, everything else bubbles up to the field.
    pub(crate) fn complete_value(
        &'a self,
        ty: &'a Type,
        fields: &'a [&'a Spanning<Field>],
        resolved: Resolved,
        resolve_type: Option<&'a TypeResolver>,
        path: NodePath,
    ) -> BoxFuture<'a, FieldOutcome> {
        async move {
            match ty {
                Type::NonNull(inner) => {
                    let value = self
                        .complete_value(inner, fields, resolved, resolve_type, path.clone())
                        .await?;
                    if value.is_null() {
                        return Err(self.error_at(
                            location(fields),
                            &path,
                            EngineError::NullForNonNull(ty.clone()),
                        ));
                    }
                    Ok(value)
                }
                _ if resolved.is_null() => Ok(Value::null()),
                Type::List(inner) => {
                    self.complete_list(ty, inner, fields, resolved, resolve_type, path)
                        .await
                }
                Type::Named(name) => {
                    self.complete_named(name, fields, resolved, resolve_type, path)
                        .await
                }
            }
        }
        .boxed()
    }

    async fn complete_list(
        &'a self,
        ty: &'a Type,
        inner: &'a Type,
        fields: &'a [&'a Spanning<Field>],
        resolved: Resolved,
        resolve_type: Option<&'a TypeResolver>,
        path: NodePath,
    ) -> FieldOutcome {
        let items = match resolved {
            Resolved::List(items) => items,
            Resolved::Stream(stream) => self.drain_stream(stream, location(fields), &path).await?,
            _ => {
                return Err(self.error_at(
                    location(fields),
                    &path,
                    EngineError::NotACollection(ty.clone()),
                ));
            }
        };

        let outcomes = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                self.complete_value(inner, fields, item, resolve_type, path.index(idx))
                    .map(|outcome| self.absorb(inner, outcome))
            })
            .collect::<FuturesOrdered<_>>()
            .collect::<Vec<_>>()
            .await;

        self.settle(outcomes).map(Value::list)
    }

    /// Fully drains an asynchronous list source.
    async fn drain_stream(
        &self,
        mut stream: ItemStream,
        location: SourcePosition,
        path: &NodePath,
    ) -> FieldOutcome<Vec<Resolved>> {
        let limit = self.schema().config().stream_list_limit;
        let mut items = vec![];
        while let Some(item) = stream.next().await {
            if let Some(limit) = limit.filter(|l| items.len() >= *l) {
                return Err(self.error_at(location, path, EngineError::StreamListLimit(limit)));
            }
            items.push(item.map_err(|e| self.error_at(location, path, e))?);
        }
        Ok(items)
    }

    async fn complete_named(
        &'a self,
        name: &'a ArcStr,
        fields: &'a [&'a Spanning<Field>],
        resolved: Resolved,
        resolve_type: Option<&'a TypeResolver>,
        path: NodePath,
    ) -> FieldOutcome {
        let location = location(fields);
        let object_type = match self.schema().type_by_name(name) {
            Some(MetaType::Scalar(s)) => {
                return s
                    .converter()
                    .serialize(&resolved)
                    .map_err(|e| self.error_at(location, &path, e));
            }
            Some(MetaType::Enum(e)) => {
                return match &resolved {
                    Resolved::Enum(v) | Resolved::Scalar(DefaultScalarValue::String(v))
                        if e.value_by_name(v).is_some() =>
                    {
                        Ok(Value::scalar(v.as_str()))
                    }
                    other => Err(self.error_at(
                        location,
                        &path,
                        EngineError::InvalidEnumValue {
                            enum_name: e.name.clone(),
                            value: describe(other),
                        },
                    )),
                };
            }
            Some(MetaType::Object(o)) => o,
            Some(MetaType::Interface(i)) => self
                .concrete_type(
                    &i.name,
                    resolve_type.or(i.resolve_type.as_ref()),
                    &resolved,
                    |actual| EngineError::DoesNotImplement {
                        actual,
                        interface: i.name.clone(),
                    },
                )
                .map_err(|e| self.error_at(location, &path, e))?,
            Some(MetaType::Union(u)) => self
                .concrete_type(
                    &u.name,
                    resolve_type.or(u.resolve_type.as_ref()),
                    &resolved,
                    |actual| EngineError::NotPossibleType {
                        actual,
                        union: u.name.clone(),
                    },
                )
                .map_err(|e| self.error_at(location, &path, e))?,
            Some(MetaType::InputObject(_)) | None => {
                return Err(self.error_at(
                    location,
                    &path,
                    EngineError::UnknownType(name.to_string()),
                ));
            }
        };

        let Resolved::Object(object_value) = resolved else {
            return Err(self.error_at(
                location,
                &path,
                EngineError::NotAnObject(object_type.name.clone()),
            ));
        };

        let selection_sets = fields
            .iter()
            .map(|f| f.item.selection_set.as_slice())
            .collect::<Vec<_>>();
        self.execute_selection_set(
            object_type,
            &object_value,
            &selection_sets,
            &path,
            ExecutionStrategy::Parallel,
        )
        .await
        .map(Value::Object)
    }

    /// Resolves the concrete object type of an abstract value.
    fn concrete_type(
        &self,
        abstract_name: &ArcStr,
        resolve_type: Option<&TypeResolver>,
        resolved: &Resolved,
        not_possible: impl FnOnce(ArcStr) -> EngineError,
    ) -> Result<&'a ObjectMeta, EngineError> {
        let actual = resolve_type
            .and_then(|f| f(resolved))
            .ok_or_else(|| EngineError::ActualTypeRequired(abstract_name.clone()))?;

        if !self.schema().is_possible_type(abstract_name, &actual) {
            return Err(not_possible(actual));
        }
        self.schema()
            .object_type(&actual)
            .ok_or_else(|| EngineError::UnknownType(actual.to_string()))
    }
}

fn describe(value: &Resolved) -> String {
    match value {
        Resolved::Enum(v) => v.clone(),
        Resolved::Scalar(s) => s.to_string(),
        other => format!("{other:?}"),
    }
}
