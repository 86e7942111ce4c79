use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};
use fnv::{FnvHashMap, FnvHashSet};
use serde::Deserialize;

use crate::{
    ast::{OperationType, Type},
    schema::meta::{Field, InputObjectMeta, MetaType, ObjectMeta, ScalarMeta},
    types::scalars::{ScalarConverter, builtin_scalars},
};

/// Tunables of query execution.
///
/// Deserializable, so it can be loaded as part of any application
/// configuration:
/// ```rust
/// # use juniper_dynamic::ExecutionConfig;
/// let config: ExecutionConfig = serde_json::from_str(r#"{"stream_list_limit": 100}"#).unwrap();
/// assert_eq!(config.stream_list_limit, Some(100));
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Maximum number of items drained from an asynchronous list source.
    ///
    /// [`None`] means unbounded.
    pub stream_list_limit: Option<usize>,
}

/// Error of building a [`SchemaType`] out of a [`Registry`].
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum SchemaError {
    /// A root operation type is not registered.
    #[display("Root {operation} type \"{name}\" is not registered")]
    UnknownRootType {
        /// Operation the root type is for.
        operation: OperationType,
        /// Name of the missing type.
        name: ArcStr,
    },

    /// A root operation type is not an object type.
    #[display("Root {operation} type \"{name}\" must be an object type")]
    RootNotObject {
        /// Operation the root type is for.
        operation: OperationType,
        /// Name of the type.
        name: ArcStr,
    },

    /// A registered type refers to a type that is not registered.
    #[display("Type \"{name}\" referenced by \"{referenced_by}\" is not registered")]
    UnknownType {
        /// Name of the missing type.
        name: ArcStr,
        /// Name of the referencing type.
        referenced_by: ArcStr,
    },
}

/// Metadata for a schema
///
/// All lookups are by name and never mutate the schema, so a built
/// [`SchemaType`] can be shared by any number of concurrent executions.
#[derive(Debug)]
pub struct SchemaType {
    pub(crate) types: FnvHashMap<ArcStr, MetaType>,
    query_type_name: ArcStr,
    mutation_type_name: Option<ArcStr>,
    subscription_type_name: Option<ArcStr>,
    possible_types: FnvHashMap<ArcStr, FnvHashSet<ArcStr>>,
    config: ExecutionConfig,
}

impl SchemaType {
    /// Looks up a type by name.
    pub fn type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    /// Looks up an object type by name.
    pub fn object_type(&self, name: &str) -> Option<&ObjectMeta> {
        match self.types.get(name) {
            Some(MetaType::Object(o)) => Some(o),
            _ => None,
        }
    }

    /// Looks up a field declared by an object or interface type.
    pub fn field_by_name(&self, type_name: &str, field_name: &str) -> Option<&Field> {
        self.types.get(type_name)?.field_by_name(field_name)
    }

    /// Looks up the declared fields of an input object type.
    pub fn input_fields(&self, type_name: &str) -> Option<&InputObjectMeta> {
        match self.types.get(type_name) {
            Some(MetaType::InputObject(i)) => Some(i),
            _ => None,
        }
    }

    /// Looks up the value converter of a scalar type.
    pub fn scalar_converter(&self, type_name: &str) -> Option<&dyn ScalarConverter> {
        match self.types.get(type_name) {
            Some(MetaType::Scalar(s)) => Some(s.converter()),
            _ => None,
        }
    }

    /// The root query type.
    pub fn query_type(&self) -> Option<&ObjectMeta> {
        self.object_type(&self.query_type_name)
    }

    /// The root mutation type, if the schema supports mutations.
    pub fn mutation_type(&self) -> Option<&ObjectMeta> {
        self.object_type(self.mutation_type_name.as_deref()?)
    }

    /// The root subscription type, if the schema supports subscriptions.
    pub fn subscription_type(&self) -> Option<&ObjectMeta> {
        self.object_type(self.subscription_type_name.as_deref()?)
    }

    /// The root type of the given operation type.
    pub fn root_type(&self, operation: OperationType) -> Option<&ObjectMeta> {
        match operation {
            OperationType::Query => self.query_type(),
            OperationType::Mutation => self.mutation_type(),
            OperationType::Subscription => self.subscription_type(),
        }
    }

    /// Checks whether the object type `possible_type` is a member of the union
    /// or an implementation of the interface `abstract_type`.
    pub fn is_possible_type(&self, abstract_type: &str, possible_type: &str) -> bool {
        self.possible_types
            .get(abstract_type)
            .is_some_and(|p| p.contains(possible_type))
    }

    /// Decides whether a fragment with the type condition `condition` applies to
    /// values of the concrete object type `object_type`.
    pub fn does_fragment_type_apply(&self, object_type: &str, condition: &str) -> bool {
        match self.types.get(condition) {
            Some(MetaType::Object(o)) => o.name.as_str() == object_type,
            Some(MetaType::Interface(_) | MetaType::Union(_)) => {
                self.is_possible_type(condition, object_type)
            }
            _ => false,
        }
    }

    /// Execution tunables of this schema.
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }
}

/// A type registry used to build schemas
///
/// The registry gathers metadata for all types in a schema. The built-in
/// scalars `Int`, `Float`, `String`, `Boolean` and `ID` are registered up
/// front; registering a type with the same name replaces them.
#[derive(Debug)]
pub struct Registry {
    /// Currently registered types
    pub types: FnvHashMap<ArcStr, MetaType>,
    config: ExecutionConfig,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Constructs a new [`Registry`] holding the built-in scalars.
    pub fn new() -> Self {
        let types = builtin_scalars()
            .into_iter()
            .map(|(name, converter)| {
                let meta = MetaType::Scalar(ScalarMeta {
                    name: name.clone(),
                    description: None,
                    converter,
                });
                (name, meta)
            })
            .collect();
        Self {
            types,
            config: ExecutionConfig::default(),
        }
    }

    /// Registers a type, replacing any previously registered type of the same
    /// name.
    #[must_use]
    pub fn register(mut self, meta: MetaType) -> Self {
        self.types.insert(meta.name().clone(), meta);
        self
    }

    /// Sets the [`ExecutionConfig`] of the schema to build.
    #[must_use]
    pub fn config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the [`SchemaType`] with the given root operation types.
    ///
    /// # Errors
    ///
    /// If a root type is not a registered object type, or any registered type
    /// refers to an unregistered one.
    pub fn build(
        self,
        query: &str,
        mutation: Option<&str>,
        subscription: Option<&str>,
    ) -> Result<SchemaType, SchemaError> {
        let root = |operation, name: &str| -> Result<ArcStr, SchemaError> {
            match self.types.get(name) {
                Some(MetaType::Object(o)) => Ok(o.name.clone()),
                Some(_) => Err(SchemaError::RootNotObject {
                    operation,
                    name: name.into(),
                }),
                None => Err(SchemaError::UnknownRootType {
                    operation,
                    name: name.into(),
                }),
            }
        };
        let query_type_name = root(OperationType::Query, query)?;
        let mutation_type_name = mutation
            .map(|m| root(OperationType::Mutation, m))
            .transpose()?;
        let subscription_type_name = subscription
            .map(|s| root(OperationType::Subscription, s))
            .transpose()?;

        self.check_references()?;

        let mut possible_types = FnvHashMap::<ArcStr, FnvHashSet<ArcStr>>::default();
        for meta in self.types.values() {
            match meta {
                MetaType::Object(o) => {
                    for i in &o.interface_names {
                        possible_types
                            .entry(i.clone())
                            .or_default()
                            .insert(o.name.clone());
                    }
                }
                MetaType::Union(u) => {
                    possible_types
                        .entry(u.name.clone())
                        .or_default()
                        .extend(u.of_type_names.iter().cloned());
                }
                _ => {}
            }
        }

        Ok(SchemaType {
            types: self.types,
            query_type_name,
            mutation_type_name,
            subscription_type_name,
            possible_types,
            config: self.config,
        })
    }

    fn check_references(&self) -> Result<(), SchemaError> {
        let check = |ty: &Type, referenced_by: &ArcStr| {
            let name = ty.innermost_name();
            if self.types.contains_key(name) {
                Ok(())
            } else {
                Err(SchemaError::UnknownType {
                    name: name.into(),
                    referenced_by: referenced_by.clone(),
                })
            }
        };
        let check_name = |name: &ArcStr, referenced_by: &ArcStr| {
            check(&Type::Named(name.clone()), referenced_by)
        };

        for meta in self.types.values() {
            let owner = meta.name();
            match meta {
                MetaType::Object(ObjectMeta {
                    fields,
                    interface_names,
                    ..
                }) => {
                    for i in interface_names {
                        check_name(i, owner)?;
                    }
                    for f in fields.values() {
                        check(&f.field_type, owner)?;
                        for a in &f.arguments {
                            check(&a.arg_type, owner)?;
                        }
                    }
                }
                MetaType::Interface(i) => {
                    for f in i.fields.values() {
                        check(&f.field_type, owner)?;
                        for a in &f.arguments {
                            check(&a.arg_type, owner)?;
                        }
                    }
                }
                MetaType::Union(u) => {
                    for t in &u.of_type_names {
                        check_name(t, owner)?;
                    }
                }
                MetaType::InputObject(i) => {
                    for f in &i.input_fields {
                        check(&f.arg_type, owner)?;
                    }
                }
                MetaType::Scalar(_) | MetaType::Enum(_) => {}
            }
        }
        Ok(())
    }
}
