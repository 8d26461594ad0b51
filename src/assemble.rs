//! Specification assembler + artifact selector.
//!
//! Binds every operation's parameters, request body and response content to
//! their mapped target types, using node identity as the lookup key, groups
//! operations by first tag in first-seen order, and precomputes render-ready
//! model definitions for the object/enum nodes. Renderer selection is the
//! capability table in `config`; every selected renderer consumes the same
//! assembled specification.

use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::config::{renderers_for, GeneratorConfiguration, Renderer};
use crate::error::Result;
use crate::mapper::{fold_enum_constant, fold_type_identifier, TargetType, TypeMapper, Validation};
use crate::node::{NodeId, NodeKind};
use crate::normalize::{
    HttpMethod, Operation, ParameterLocation, Specification, StatusCode,
};

pub const DEFAULT_GROUP: &str = "default";

// ------------------------------ Bound model ------------------------------- //

#[derive(Debug)]
pub struct BoundParameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub ty: Rc<TargetType>,
    pub validations: Vec<Validation>,
}

#[derive(Debug)]
pub struct BoundBody {
    pub media_type: String,
    pub ty: Rc<TargetType>,
    pub validations: Vec<Validation>,
}

#[derive(Debug)]
pub struct BoundResponse {
    pub status: StatusCode,
    pub content: Vec<(String, Rc<TargetType>)>,
}

#[derive(Debug)]
pub struct BoundOperation {
    /// Identifier for the generated method: the declared operation id folded,
    /// or synthesized from method + path.
    pub name: String,
    pub path: String,
    pub method: HttpMethod,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<BoundParameter>,
    pub body: Vec<BoundBody>,
    pub responses: Vec<BoundResponse>,
}

impl BoundOperation {
    /// The type of the first successful response, if any content exists.
    pub fn success_type(&self) -> Option<&Rc<TargetType>> {
        self.responses
            .iter()
            .filter(|r| match r.status {
                StatusCode::Code(c) => (200..300).contains(&c),
                StatusCode::Default => false,
            })
            .chain(
                self.responses
                    .iter()
                    .filter(|r| r.status == StatusCode::Default),
            )
            .flat_map(|r| r.content.first())
            .map(|(_, ty)| ty)
            .next()
    }
}

#[derive(Debug)]
pub struct OperationGroup {
    pub tag: String,
    pub operations: Vec<BoundOperation>,
}

#[derive(Debug)]
pub struct BoundField {
    pub name: String,
    pub required: bool,
    pub description: Option<String>,
    pub ty: Rc<TargetType>,
    pub validations: Vec<Validation>,
    /// Element/value position of a container field needs cascading
    /// validation when it is backed by an object node.
    pub element_cascades: bool,
}

#[derive(Debug)]
pub enum ModelKind {
    Class { fields: Vec<BoundField> },
    Enum { constants: Vec<(String, String)> },
}

/// One renderable model: an object or enum node with its synthesized type.
#[derive(Debug)]
pub struct ModelDef {
    pub node: NodeId,
    pub ty: Rc<TargetType>,
    pub description: Option<String>,
    pub kind: ModelKind,
}

/// Generation-ready output of the pipeline.
#[derive(Debug)]
pub struct AssembledSpecification {
    pub groups: Vec<OperationGroup>,
    pub models: Vec<ModelDef>,
}

// ------------------------------ Assembly ---------------------------------- //

pub fn assemble(
    spec: &Specification,
    mapper: &mut TypeMapper<'_>,
) -> Result<AssembledSpecification> {
    let known: HashSet<NodeId> = spec.schemas.iter().copied().collect();

    let mut groups: IndexMap<String, Vec<BoundOperation>> = IndexMap::new();
    for op in &spec.operations {
        let tag = op
            .tags
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_GROUP.to_string());
        let bound = bind_operation(op, mapper, &known)?;
        groups.entry(tag).or_default().push(bound);
    }

    let mut models = Vec::new();
    for id in &spec.schemas {
        if let Some(model) = bind_model(*id, spec, mapper)? {
            models.push(model);
        }
    }

    Ok(AssembledSpecification {
        groups: groups
            .into_iter()
            .map(|(tag, operations)| OperationGroup { tag, operations })
            .collect(),
        models,
    })
}

/// Pure dispatch: which renderers consume the assembled specification.
pub fn select_artifacts(config: &GeneratorConfiguration) -> &'static [Renderer] {
    renderers_for(config.generator_type)
}

fn bind_operation(
    op: &Operation,
    mapper: &mut TypeMapper<'_>,
    known: &HashSet<NodeId>,
) -> Result<BoundOperation> {
    let mut parameters = Vec::with_capacity(op.parameters.len());
    for p in &op.parameters {
        assert_known(p.schema, known);
        parameters.push(BoundParameter {
            name: p.name.clone(),
            location: p.location,
            required: p.required,
            ty: mapper.map(p.schema)?,
            validations: mapper.binding_validations(p.schema)?,
        });
    }

    let mut body = Vec::with_capacity(op.request_body.len());
    for (media, id) in &op.request_body {
        assert_known(*id, known);
        body.push(BoundBody {
            media_type: media.clone(),
            ty: mapper.map(*id)?,
            validations: mapper.binding_validations(*id)?,
        });
    }

    let mut responses = Vec::with_capacity(op.responses.len());
    for (status, content) in &op.responses {
        let mut bound_content = Vec::with_capacity(content.len());
        for (media, id) in content {
            assert_known(*id, known);
            bound_content.push((media.clone(), mapper.map(*id)?));
        }
        responses.push(BoundResponse {
            status: *status,
            content: bound_content,
        });
    }

    Ok(BoundOperation {
        name: operation_method_name(op),
        path: op.path.clone(),
        method: op.method,
        summary: op.summary.clone(),
        description: op.description.clone(),
        parameters,
        body,
        responses,
    })
}

fn bind_model(
    id: NodeId,
    spec: &Specification,
    mapper: &mut TypeMapper<'_>,
) -> Result<Option<ModelDef>> {
    let node = spec.arena.get(id);
    match &node.kind {
        NodeKind::Object {
            description,
            properties,
            ..
        } => {
            let ty = mapper.map(id)?;
            let mut fields = Vec::with_capacity(properties.len());
            for prop in properties {
                let prop_node = spec.arena.get(prop.schema);
                let element_cascades = match &prop_node.kind {
                    NodeKind::Array { items, .. } => mapper.requires_cascade(*items),
                    NodeKind::Map { values, .. } => mapper.requires_cascade(*values),
                    _ => false,
                };
                let field_description = match &prop_node.kind {
                    NodeKind::Primitive { description, .. }
                    | NodeKind::Object { description, .. }
                    | NodeKind::Array { description, .. }
                    | NodeKind::Map { description, .. }
                    | NodeKind::Enum { description, .. } => description.clone(),
                    NodeKind::Reference(_) => None,
                };
                fields.push(BoundField {
                    name: prop.name.clone(),
                    required: prop.required,
                    description: field_description,
                    ty: mapper.map(prop.schema)?,
                    validations: mapper.binding_validations(prop.schema)?,
                    element_cascades,
                });
            }
            Ok(Some(ModelDef {
                node: id,
                ty,
                description: description.clone(),
                kind: ModelKind::Class { fields },
            }))
        }
        NodeKind::Enum {
            description,
            values,
            ..
        } => {
            let ty = mapper.map(id)?;
            let constants = values
                .iter()
                .map(|v| (fold_enum_constant(v), v.clone()))
                .collect();
            Ok(Some(ModelDef {
                node: id,
                ty,
                description: description.clone(),
                kind: ModelKind::Enum { constants },
            }))
        }
        _ => Ok(None),
    }
}

/// A node bound by an operation but absent from the specification's schema
/// list would mean the normalizer broke its own flattening invariant.
fn assert_known(id: NodeId, known: &HashSet<NodeId>) {
    assert!(
        known.contains(&id),
        "schema node {id:?} bound by an operation but missing from the specification"
    );
}

fn operation_method_name(op: &Operation) -> String {
    let folded = match &op.operation_id {
        Some(id) => fold_type_identifier(id),
        None => {
            let mut raw = op.method.as_str().to_ascii_lowercase();
            for part in op.path.split('/') {
                let part = part.trim_matches(['{', '}']);
                if !part.is_empty() {
                    raw.push(' ');
                    raw.push_str(part);
                }
            }
            fold_type_identifier(&raw)
        }
    };
    // Method names are lower camel.
    let mut chars = folded.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => folded,
    }
}
