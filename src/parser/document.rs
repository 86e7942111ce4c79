use graphql_parser::{
    Pos,
    query::{
        Definition as ExternalDefinition, Directive as ExternalDirective,
        Field as ExternalField, FragmentDefinition as ExternalFragment,
        OperationDefinition as ExternalOperation, Selection as ExternalSelection,
        SelectionSet as ExternalSelectionSet, Type as ExternalType, TypeCondition,
        Value as ExternalValue, VariableDefinition as ExternalVariableDefinition,
    },
};

use crate::{
    ast::{
        Arguments, Directive, Document, Field, Fragment, FragmentSpread, InlineFragment,
        InputValue, Operation, OperationType, Selection, Type, VariableDefinition,
    },
    parser::{ParseError, SourcePosition, Spanning},
};

/// Parses the provided `source` into an executable [`Document`].
///
/// Fragments are indexed by name, so spreads may reference fragments defined
/// later in the document.
pub fn parse_document_source(source: &str) -> Result<Document, ParseError> {
    let parsed = graphql_parser::parse_query::<&str>(source)
        .map_err(|e| ParseError::Syntax(e.to_string()))?;

    let mut doc = Document::default();
    for def in parsed.definitions {
        match def {
            ExternalDefinition::Operation(op) => doc.operations.push(translate_operation(op)),
            ExternalDefinition::Fragment(frag) => {
                let frag = translate_fragment(frag);
                let name = frag.item.name.item.clone();
                if doc.fragments.contains_key(&name) {
                    return Err(ParseError::DuplicateFragment(name));
                }
                doc.fragments.insert(name, frag);
            }
        }
    }
    Ok(doc)
}

fn position(pos: Pos) -> SourcePosition {
    SourcePosition::new(pos.line, pos.column)
}

fn spanned(pos: Pos, s: &str) -> Spanning<String> {
    Spanning::new(position(pos), s.into())
}

fn translate_operation<'a>(op: ExternalOperation<'a, &'a str>) -> Spanning<Operation> {
    match op {
        ExternalOperation::SelectionSet(set) => Spanning::new(
            position(set.span.0),
            Operation {
                operation_type: OperationType::Query,
                name: None,
                variable_definitions: vec![],
                directives: vec![],
                selection_set: translate_selection_set(set),
            },
        ),
        ExternalOperation::Query(q) => operation(
            OperationType::Query,
            q.position,
            q.name,
            q.variable_definitions,
            q.directives,
            q.selection_set,
        ),
        ExternalOperation::Mutation(m) => operation(
            OperationType::Mutation,
            m.position,
            m.name,
            m.variable_definitions,
            m.directives,
            m.selection_set,
        ),
        ExternalOperation::Subscription(s) => operation(
            OperationType::Subscription,
            s.position,
            s.name,
            s.variable_definitions,
            s.directives,
            s.selection_set,
        ),
    }
}

fn operation<'a>(
    operation_type: OperationType,
    pos: Pos,
    name: Option<&str>,
    variable_definitions: Vec<ExternalVariableDefinition<'a, &'a str>>,
    directives: Vec<ExternalDirective<'a, &'a str>>,
    selection_set: ExternalSelectionSet<'a, &'a str>,
) -> Spanning<Operation> {
    Spanning::new(
        position(pos),
        Operation {
            operation_type,
            name: name.map(|n| spanned(pos, n)),
            variable_definitions: variable_definitions
                .into_iter()
                .map(|def| {
                    let start = position(def.position);
                    (
                        Spanning::new(start, def.name.into()),
                        VariableDefinition {
                            var_type: Spanning::new(start, translate_type(def.var_type)),
                            default_value: def
                                .default_value
                                .map(|v| Spanning::new(start, translate_value(v))),
                        },
                    )
                })
                .collect(),
            directives: translate_directives(directives),
            selection_set: translate_selection_set(selection_set),
        },
    )
}

fn translate_fragment<'a>(frag: ExternalFragment<'a, &'a str>) -> Spanning<Fragment> {
    let TypeCondition::On(on) = frag.type_condition;
    Spanning::new(
        position(frag.position),
        Fragment {
            name: spanned(frag.position, frag.name),
            type_condition: spanned(frag.position, on),
            directives: translate_directives(frag.directives),
            selection_set: translate_selection_set(frag.selection_set),
        },
    )
}

fn translate_selection_set<'a>(set: ExternalSelectionSet<'a, &'a str>) -> Vec<Selection> {
    set.items.into_iter().map(translate_selection).collect()
}

fn translate_selection<'a>(selection: ExternalSelection<'a, &'a str>) -> Selection {
    match selection {
        ExternalSelection::Field(f) => Selection::Field(translate_field(f)),
        ExternalSelection::FragmentSpread(s) => Selection::FragmentSpread(Spanning::new(
            position(s.position),
            FragmentSpread {
                name: spanned(s.position, s.fragment_name),
                directives: translate_directives(s.directives),
            },
        )),
        ExternalSelection::InlineFragment(i) => Selection::InlineFragment(Spanning::new(
            position(i.position),
            InlineFragment {
                type_condition: i
                    .type_condition
                    .map(|TypeCondition::On(on)| spanned(i.position, on)),
                directives: translate_directives(i.directives),
                selection_set: translate_selection_set(i.selection_set),
            },
        )),
    }
}

fn translate_field<'a>(field: ExternalField<'a, &'a str>) -> Spanning<Field> {
    Spanning::new(
        position(field.position),
        Field {
            alias: field.alias.map(|a| spanned(field.position, a)),
            name: spanned(field.position, field.name),
            arguments: translate_arguments(field.position, field.arguments),
            directives: translate_directives(field.directives),
            selection_set: translate_selection_set(field.selection_set),
        },
    )
}

fn translate_directives<'a>(
    directives: Vec<ExternalDirective<'a, &'a str>>,
) -> Vec<Spanning<Directive>> {
    directives
        .into_iter()
        .map(|d| {
            Spanning::new(
                position(d.position),
                Directive {
                    name: spanned(d.position, d.name),
                    arguments: translate_arguments(d.position, d.arguments),
                },
            )
        })
        .collect()
}

// `graphql-parser` keeps no positions for arguments, so they share the
// position of their owner.
fn translate_arguments<'a>(
    pos: Pos,
    arguments: Vec<(&'a str, ExternalValue<'a, &'a str>)>,
) -> Arguments {
    arguments
        .into_iter()
        .map(|(name, value)| {
            (
                spanned(pos, name),
                Spanning::new(position(pos), translate_value(value)),
            )
        })
        .collect()
}

fn translate_type<'a>(ty: ExternalType<'a, &'a str>) -> Type {
    match ty {
        ExternalType::NamedType(n) => Type::named(n),
        ExternalType::ListType(inner) => Type::list(translate_type(*inner)),
        ExternalType::NonNullType(inner) => translate_type(*inner).non_null(),
    }
}

fn translate_value<'a>(value: ExternalValue<'a, &'a str>) -> InputValue {
    match value {
        ExternalValue::Variable(v) => InputValue::variable(v),
        // Integer literals outside of the 32-bit range are kept as floats, so
        // `Int` coercion rejects them while `Float` still accepts them.
        ExternalValue::Int(n) => n.as_i64().map_or(InputValue::Null, |i| {
            i32::try_from(i).map_or_else(|_| InputValue::scalar(i as f64), InputValue::scalar)
        }),
        ExternalValue::Float(f) => InputValue::scalar(f),
        ExternalValue::String(s) => InputValue::scalar(s),
        ExternalValue::Boolean(b) => InputValue::scalar(b),
        ExternalValue::Null => InputValue::Null,
        ExternalValue::Enum(e) => InputValue::enum_value(e),
        ExternalValue::List(l) => InputValue::list(l.into_iter().map(translate_value).collect()),
        ExternalValue::Object(o) => InputValue::Object(
            o.into_iter()
                .map(|(k, v)| (k.to_owned(), translate_value(v)))
                .collect(),
        ),
    }
}
