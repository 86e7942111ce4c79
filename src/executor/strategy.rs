use fnv::FnvHashSet;
use futures::{FutureExt as _, StreamExt as _, stream::FuturesOrdered};

use crate::{
    ast::Selection,
    executor::{
        ExecutionContext, FieldOutcome, NodePath,
        collect::{GroupedFieldSet, collect_fields},
    },
    schema::meta::ObjectMeta,
    types::base::AnyValue,
    value::Object,
};

/// How the field groups of a selection set are scheduled.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ExecutionStrategy {
    /// All field groups run concurrently. Used for queries, subscription
    /// events and every nested selection set.
    #[default]
    Parallel,

    /// Field groups run one after another in selection order, each awaited
    /// before the next one starts. Used for the root fields of mutations.
    ///
    /// A failed non-null field group nulls the whole selection set, so the
    /// remaining field groups are not started.
    Serial,
}

impl<'a> ExecutionContext<'a> {
    /// Collects the merged `selection_sets` against `object_type` and
    /// executes the resulting field groups with `strategy`.
    pub(crate) async fn execute_selection_set(
        &'a self,
        object_type: &'a ObjectMeta,
        object_value: &AnyValue,
        selection_sets: &[&'a [Selection]],
        path: &NodePath,
        strategy: ExecutionStrategy,
    ) -> FieldOutcome<Object> {
        let mut grouped = GroupedFieldSet::new();
        let mut visited = FnvHashSet::default();
        for selection_set in selection_sets {
            collect_fields(
                self.schema(),
                self.document(),
                &object_type.name,
                selection_set,
                self.variables(),
                &mut grouped,
                &mut visited,
            )
            .map_err(|e| self.error_at(e.start, path, e.item))?;
        }

        match strategy {
            ExecutionStrategy::Parallel => {
                self.execute_parallel(object_type, object_value, grouped, path)
                    .await
            }
            ExecutionStrategy::Serial => {
                self.execute_serial(object_type, object_value, grouped, path)
                    .await
            }
        }
    }

    async fn execute_parallel(
        &'a self,
        object_type: &'a ObjectMeta,
        object_value: &AnyValue,
        grouped: GroupedFieldSet<'a>,
        path: &NodePath,
    ) -> FieldOutcome<Object> {
        let outcomes = grouped
            .into_iter()
            .map(|(key, fields)| {
                self.execute_field_group(object_type, object_value.clone(), key, fields, path)
                    .map(move |outcome| outcome.map(|value| (key, value)))
            })
            .collect::<FuturesOrdered<_>>()
            .collect::<Vec<_>>()
            .await;

        self.settle(outcomes)
            .map(|fields| fields.into_iter().collect())
    }

    async fn execute_serial(
        &'a self,
        object_type: &'a ObjectMeta,
        object_value: &AnyValue,
        grouped: GroupedFieldSet<'a>,
        path: &NodePath,
    ) -> FieldOutcome<Object> {
        let mut object = Object::with_capacity(grouped.len());
        for (key, fields) in grouped {
            let value = self
                .execute_field_group(object_type, object_value.clone(), key, fields, path)
                .await?;
            object.add_field(key, value);
        }
        Ok(object)
    }
}
