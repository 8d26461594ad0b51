//! Contract normalizer: raw document tree -> operations + schema node graph.
//!
//! Walks every schema-occurrence site in document order, resolving `$ref`s
//! through a pointer-keyed cache so a named schema becomes exactly one node
//! instance no matter how many sites reference it. Inline schemas allocate a
//! fresh node per site; structural equality never merges them. Recursive
//! named schemas terminate through the cache: the node id is allocated (as a
//! placeholder) before its content is resolved, so a self-reference is a
//! cache hit, not an infinite descent.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::contract::{
    AdditionalProperties, Contract, ContractDocument, RawOperation, RawParameter, RawSchema,
    SchemaType,
};
use crate::error::{Error, Result};
use crate::hint::NameHint;
use crate::node::{NodeArena, NodeId, NodeKind, Property, PrimitiveType, SchemaNode};

const COMPONENTS_PREFIX: &str = "#/components/schemas/";

// ------------------------------ Output model ------------------------------ //

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    fn from_key(key: &str) -> Self {
        match key {
            "get" => HttpMethod::Get,
            "put" => HttpMethod::Put,
            "post" => HttpMethod::Post,
            "delete" => HttpMethod::Delete,
            "options" => HttpMethod::Options,
            "head" => HttpMethod::Head,
            "patch" => HttpMethod::Patch,
            _ => HttpMethod::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusCode {
    Code(u16),
    Default,
}

impl StatusCode {
    pub fn as_key(self) -> String {
        match self {
            StatusCode::Code(c) => c.to_string(),
            StatusCode::Default => "default".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub path: String,
    pub method: HttpMethod,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    /// media type -> schema, document order. Empty when the operation takes
    /// no body.
    pub request_body: IndexMap<String, NodeId>,
    pub parameters: Vec<Parameter>,
    /// status -> (media type -> schema), document order.
    pub responses: Vec<(StatusCode, IndexMap<String, NodeId>)>,
}

/// Normalization output: ordered operations plus every distinct reachable
/// non-reference node, in first-visit order.
#[derive(Debug)]
pub struct Specification {
    pub operations: Vec<Operation>,
    pub schemas: Vec<NodeId>,
    pub arena: NodeArena,
}

// ------------------------------ Normalizer -------------------------------- //

pub fn normalize(doc: &ContractDocument) -> Result<Specification> {
    Normalizer::new(&doc.contract).run()
}

struct Normalizer<'a> {
    doc: &'a Contract,
    arena: NodeArena,
    /// reference pointer -> resolved node instance. Guarantees identity
    /// reuse across every site that names the same schema.
    resolved: HashMap<String, NodeId>,
    /// Alias pointers currently being chased; a re-entry is a pure `$ref`
    /// cycle with no underlying schema to resolve to.
    resolving: HashSet<String>,
    visit_order: Vec<NodeId>,
}

impl<'a> Normalizer<'a> {
    fn new(doc: &'a Contract) -> Self {
        Normalizer {
            doc,
            arena: NodeArena::new(),
            resolved: HashMap::new(),
            resolving: HashSet::new(),
            visit_order: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Specification> {
        let doc = self.doc;
        let mut operations = Vec::new();

        for (path, item) in &doc.paths {
            for (method_key, op) in &item.operations {
                let method = HttpMethod::from_key(method_key);
                let normalized =
                    self.normalize_operation(path, method, op, item.parameters.as_deref())?;
                operations.push(normalized);
            }
        }

        // Every placeholder must have been rewritten by now.
        debug_assert!(
            self.visit_order
                .iter()
                .all(|id| !matches!(self.arena.get(*id).kind, NodeKind::Reference(_))),
            "unresolved reference placeholder escaped normalization"
        );

        Ok(Specification {
            operations,
            schemas: self.visit_order,
            arena: self.arena,
        })
    }

    fn normalize_operation(
        &mut self,
        path: &str,
        method: HttpMethod,
        op: &'a RawOperation,
        path_params: Option<&'a [RawParameter]>,
    ) -> Result<Operation> {
        let op_hint = NameHint::root(operation_hint_segment(path, method, op));
        let location = format!("{} {}", method.as_str(), path);

        // Path-level parameters first; operation-level ones override by name.
        let mut raw_params: Vec<&RawParameter> = Vec::new();
        for p in path_params.into_iter().flatten() {
            raw_params.push(p);
        }
        for p in op.parameters.iter().flatten() {
            raw_params.retain(|existing| existing.name != p.name);
            raw_params.push(p);
        }

        let mut parameters = Vec::with_capacity(raw_params.len());
        for p in raw_params {
            parameters.push(self.normalize_parameter(p, &op_hint, &location)?);
        }

        let mut request_body = IndexMap::new();
        if let Some(body) = &op.request_body {
            let single = body.content.len() == 1;
            for (media, mt) in &body.content {
                let Some(schema) = &mt.schema else { continue };
                let hint = if single {
                    op_hint.child("request")
                } else {
                    op_hint.child("request").child(media_hint_segment(media))
                };
                let loc = format!("{location} requestBody content `{media}`");
                let id = self.walk_schema(schema, hint, &loc)?;
                request_body.insert(media.clone(), id);
            }
        }

        let mut responses = Vec::new();
        for (status_key, response) in &op.responses {
            let status = parse_status(status_key, &location)?;
            let mut content = IndexMap::new();
            if let Some(media_map) = &response.content {
                let single = media_map.len() == 1;
                for (media, mt) in media_map {
                    let Some(schema) = &mt.schema else { continue };
                    let base = op_hint.child("response").child(status_key);
                    let hint = if single {
                        base
                    } else {
                        base.child(media_hint_segment(media))
                    };
                    let loc = format!("{location} response `{status_key}` content `{media}`");
                    let id = self.walk_schema(schema, hint, &loc)?;
                    content.insert(media.clone(), id);
                }
            }
            responses.push((status, content));
        }

        Ok(Operation {
            path: path.to_string(),
            method,
            tags: op.tags.clone(),
            summary: op.summary.clone(),
            description: op.description.clone(),
            operation_id: op.operation_id.clone(),
            request_body,
            parameters,
            responses,
        })
    }

    fn normalize_parameter(
        &mut self,
        p: &'a RawParameter,
        op_hint: &NameHint,
        op_location: &str,
    ) -> Result<Parameter> {
        let name = p.name.clone().unwrap_or_default();
        let loc_str = format!("{op_location} parameter `{name}`");

        if p.content.is_some() {
            return Err(Error::not_supported(&loc_str, "`content`-style parameter"));
        }
        let Some(schema) = &p.schema else {
            return Err(Error::not_supported(&loc_str, "parameter without a schema"));
        };

        let location = match p.location.as_deref() {
            Some("path") => ParameterLocation::Path,
            Some("query") => ParameterLocation::Query,
            Some("header") => ParameterLocation::Header,
            Some("cookie") => ParameterLocation::Cookie,
            other => {
                return Err(Error::not_supported(
                    &loc_str,
                    format!("parameter location `{}`", other.unwrap_or("")),
                ));
            }
        };

        // Path parameters are required by definition.
        let required = p.required || location == ParameterLocation::Path;
        let schema = self.walk_schema(schema, op_hint.child(&name), &loc_str)?;

        Ok(Parameter {
            name,
            location,
            required,
            schema,
        })
    }

    // ----------------------------- Schema walk ---------------------------- //

    /// Walk one schema-occurrence site. `$ref` sites resolve to the shared
    /// canonical node; everything else allocates a fresh node for this site.
    fn walk_schema(&mut self, raw: &'a RawSchema, hint: NameHint, location: &str) -> Result<NodeId> {
        if let Some(pointer) = &raw.ref_path {
            return self.resolve_reference(pointer, location);
        }
        let id = self.reserve(hint.clone(), None);
        self.fill(id, raw, hint, location)?;
        Ok(id)
    }

    /// Resolve a reference pointer to its canonical node, allocating and
    /// caching on first visit. Ref-to-ref aliases collapse onto the final
    /// target so a `Reference` can never point at another `Reference`.
    fn resolve_reference(&mut self, pointer: &str, location: &str) -> Result<NodeId> {
        if let Some(id) = self.resolved.get(pointer) {
            return Ok(*id);
        }
        let Some(name) = pointer.strip_prefix(COMPONENTS_PREFIX) else {
            return Err(Error::not_supported(
                location,
                format!("reference outside the schema components section: `{pointer}`"),
            ));
        };
        let Some(target) = self.lookup_component(name) else {
            return Err(Error::not_supported(
                location,
                format!("unresolvable reference `{pointer}`"),
            ));
        };

        if let Some(aliased) = &target.ref_path {
            let aliased = aliased.clone();
            if !self.resolving.insert(pointer.to_string()) {
                return Err(Error::not_supported(
                    location,
                    format!("circular reference alias `{pointer}`"),
                ));
            }
            let id = self.resolve_reference(&aliased, location);
            self.resolving.remove(pointer);
            let id = id?;
            self.resolved.insert(pointer.to_string(), id);
            return Ok(id);
        }

        let id = self.reserve(NameHint::root(name), Some(pointer.to_string()));
        self.resolved.insert(pointer.to_string(), id);
        let canonical_location = format!("{COMPONENTS_PREFIX}{name}");
        self.fill(id, target, NameHint::root(name), &canonical_location)?;
        Ok(id)
    }

    fn lookup_component(&self, name: &str) -> Option<&'a RawSchema> {
        self.doc.components.as_ref()?.schemas.get(name)
    }

    /// Allocate a node id before descending into its content, recording
    /// first-visit order. The placeholder kind is rewritten by `fill`.
    fn reserve(&mut self, hint: NameHint, referenced_by: Option<String>) -> NodeId {
        let placeholder = referenced_by.clone().unwrap_or_else(|| hint.display());
        let id = self.arena.alloc(SchemaNode {
            referenced_by,
            hint,
            kind: NodeKind::Reference(placeholder),
        });
        self.visit_order.push(id);
        id
    }

    /// Build the node content for a reserved id. This is the single
    /// controlled mutation of the graph: placeholder -> resolved node.
    fn fill(&mut self, id: NodeId, raw: &'a RawSchema, hint: NameHint, location: &str) -> Result<()> {
        self.check_supported(raw, location)?;

        let kind = self.build_kind(raw, &hint, location)?;
        let referenced_by = self.arena.get(id).referenced_by.clone();
        self.arena.replace(
            id,
            SchemaNode {
                referenced_by,
                hint,
                kind,
            },
        );
        Ok(())
    }

    /// Reject constructs with no defined mapping, pointing at the offending
    /// site.
    fn check_supported(&self, raw: &RawSchema, location: &str) -> Result<()> {
        if raw.one_of.is_some() {
            return Err(Error::not_supported(location, "`oneOf` composition"));
        }
        if raw.any_of.is_some() {
            return Err(Error::not_supported(location, "`anyOf` composition"));
        }
        if raw.all_of.is_some() {
            return Err(Error::not_supported(location, "`allOf` composition"));
        }
        if raw.not.is_some() {
            return Err(Error::not_supported(location, "`not` composition"));
        }
        if raw.discriminator.is_some() {
            return Err(Error::not_supported(location, "discriminator"));
        }
        if raw.nullable == Some(true) {
            return Err(Error::not_supported(location, "nullable schema"));
        }
        match &raw.schema_type {
            Some(SchemaType::Multiple(_)) => {
                Err(Error::not_supported(location, "type arrays"))
            }
            Some(SchemaType::Single(t)) if t == "null" => {
                Err(Error::not_supported(location, "`null` type"))
            }
            _ => Ok(()),
        }
    }

    fn build_kind(&mut self, raw: &'a RawSchema, hint: &NameHint, location: &str) -> Result<NodeKind> {
        let title = raw.title.clone();
        let description = raw.description.clone();

        if let Some(values) = &raw.enum_values {
            let mut strings = Vec::with_capacity(values.len());
            for v in values {
                match v.as_str() {
                    Some(s) => strings.push(s.to_string()),
                    None => {
                        return Err(Error::not_supported(location, "non-string enum value"));
                    }
                }
            }
            return Ok(NodeKind::Enum {
                title,
                description,
                values: strings,
            });
        }

        let declared = match &raw.schema_type {
            Some(SchemaType::Single(t)) => Some(t.as_str()),
            _ => None,
        };

        match declared {
            Some("array") => {
                let Some(items) = &raw.items else {
                    return Err(Error::not_supported(location, "array without `items`"));
                };
                let items_id = self.walk_schema(
                    items,
                    hint.child("item"),
                    &format!("{location}/items"),
                )?;
                Ok(NodeKind::Array {
                    title,
                    description,
                    items: items_id,
                    unique_items: raw.unique_items,
                    min_items: raw.min_items,
                    max_items: raw.max_items,
                })
            }
            Some("object") | None => self.build_object_like(raw, hint, location, title, description),
            Some(primitive) => {
                let ty = match primitive {
                    "boolean" => PrimitiveType::Boolean,
                    "integer" => PrimitiveType::Integer,
                    "number" => PrimitiveType::Number,
                    "string" => PrimitiveType::String,
                    other => {
                        return Err(Error::not_supported(
                            location,
                            format!("schema type `{other}`"),
                        ));
                    }
                };
                Ok(NodeKind::Primitive {
                    title,
                    description,
                    ty,
                    format: raw.format.clone(),
                    minimum: raw.minimum,
                    maximum: raw.maximum,
                    exclusive_minimum: raw.exclusive_minimum,
                    exclusive_maximum: raw.exclusive_maximum,
                    min_length: raw.min_length,
                    max_length: raw.max_length,
                    pattern: raw.pattern.clone(),
                })
            }
        }
    }

    fn build_object_like(
        &mut self,
        raw: &'a RawSchema,
        hint: &NameHint,
        location: &str,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<NodeKind> {
        let has_properties = raw.properties.is_some();
        let additional_schema = match &raw.additional_properties {
            Some(AdditionalProperties::Schema(s)) => Some(s.as_ref()),
            Some(AdditionalProperties::Bool(true)) => {
                return Err(Error::not_supported(
                    location,
                    "untyped `additionalProperties: true`",
                ));
            }
            Some(AdditionalProperties::Bool(false)) | None => None,
        };

        match (has_properties, additional_schema) {
            (true, Some(_)) => Err(Error::not_supported(
                location,
                "`properties` combined with schema-valued `additionalProperties`",
            )),
            (false, Some(values)) => {
                let values_id = self.walk_schema(
                    values,
                    hint.child("value"),
                    &format!("{location}/additionalProperties"),
                )?;
                Ok(NodeKind::Map {
                    title,
                    description,
                    values: values_id,
                    min_items: raw.min_items,
                    max_items: raw.max_items,
                })
            }
            (_, None) => {
                if !has_properties && raw.schema_type.is_none() {
                    // No type, no properties, no values: nothing to map.
                    return Err(Error::not_supported(location, "untyped schema"));
                }
                let required: Vec<&String> = raw.required.iter().flatten().collect();
                let mut properties = Vec::new();
                for (name, prop_schema) in raw.properties.iter().flatten() {
                    let prop_id = self.walk_schema(
                        prop_schema,
                        hint.child(name),
                        &format!("{location}/properties/{name}"),
                    )?;
                    properties.push(Property {
                        name: name.clone(),
                        required: required.iter().any(|r| *r == name),
                        schema: prop_id,
                    });
                }
                Ok(NodeKind::Object {
                    title,
                    description,
                    properties,
                })
            }
        }
    }
}

// ------------------------------ Helpers ----------------------------------- //

/// Base hint segment for an operation: the declared id, or method + path
/// words when absent.
fn operation_hint_segment(path: &str, method: HttpMethod, op: &RawOperation) -> String {
    if let Some(id) = &op.operation_id {
        return id.clone();
    }
    let mut segment = method.as_str().to_ascii_lowercase();
    for part in path.split('/') {
        let part = part.trim_matches(['{', '}']);
        if !part.is_empty() {
            segment.push(' ');
            segment.push_str(part);
        }
    }
    segment
}

/// Media types make poor identifier material; keep the subtype only.
fn media_hint_segment(media: &str) -> String {
    media
        .rsplit('/')
        .next()
        .unwrap_or(media)
        .trim_start_matches("x-")
        .to_string()
}

fn parse_status(key: &str, location: &str) -> Result<StatusCode> {
    if key == "default" {
        return Ok(StatusCode::Default);
    }
    if key.len() == 3 {
        if let Ok(code) = key.parse::<u16>() {
            return Ok(StatusCode::Code(code));
        }
    }
    // Wildcard classes like `2XX` overlap both explicit codes and `default`;
    // there is no unambiguous mapping for them.
    Err(Error::not_supported(
        location,
        format!("status code `{key}`"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Contract;

    fn normalize_json(json: &str) -> Result<Specification> {
        let contract: Contract = serde_json::from_str(json).expect("fixture parses");
        Normalizer::new(&contract).run()
    }

    const PETSTORE: &str = r##"{
        "openapi": "3.0.3",
        "info": {"title": "pets", "version": "1"},
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "listPets",
                    "parameters": [
                        {"name": "limit", "in": "query", "schema": {"type": "integer"}}
                    ],
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": {"$ref": "#/components/schemas/Pet"}
                                    }
                                }
                            }
                        }
                    }
                },
                "post": {
                    "operationId": "createPet",
                    "requestBody": {
                        "content": {
                            "application/json": {
                                "schema": {"$ref": "#/components/schemas/Pet"}
                            }
                        }
                    },
                    "responses": {"201": {"description": "created"}}
                }
            }
        },
        "components": {
            "schemas": {
                "Pet": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": {"type": "string"},
                        "friends": {
                            "type": "array",
                            "items": {"$ref": "#/components/schemas/Pet"}
                        }
                    }
                }
            }
        }
    }"##;

    #[test]
    fn named_schema_resolves_to_one_instance() {
        let spec = normalize_json(PETSTORE).expect("normalizes");
        assert_eq!(spec.operations.len(), 2);

        let get_pet = match &spec.arena.get(spec.operations[0].responses[0].1["application/json"]).kind
        {
            NodeKind::Array { items, .. } => *items,
            other => panic!("expected array response, got {other:?}"),
        };
        let post_pet = spec.operations[1].request_body["application/json"];
        assert_eq!(get_pet, post_pet, "both sites must share one node identity");

        let pet = spec.arena.get(get_pet);
        assert_eq!(
            pet.referenced_by.as_deref(),
            Some("#/components/schemas/Pet")
        );
    }

    #[test]
    fn recursive_named_schema_terminates() {
        let spec = normalize_json(PETSTORE).expect("normalizes");
        let pet = spec
            .schemas
            .iter()
            .find(|id| spec.arena.get(**id).referenced_by.is_some())
            .copied()
            .expect("Pet exists");
        match &spec.arena.get(pet).kind {
            NodeKind::Object { properties, .. } => {
                let friends = properties.iter().find(|p| p.name == "friends").expect("friends");
                match &spec.arena.get(friends.schema).kind {
                    NodeKind::Array { items, .. } => {
                        assert_eq!(*items, pet, "cycle closes on the same node id");
                    }
                    other => panic!("expected array, got {other:?}"),
                }
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn inline_duplicates_stay_distinct() {
        let spec = normalize_json(
            r##"{
                "openapi": "3.0.3", "info": {},
                "paths": {
                    "/a": {"get": {"responses": {"200": {"description": "ok",
                        "content": {"application/json": {"schema":
                            {"type": "object", "properties": {"v": {"type": "string"}}}}}}}}},
                    "/b": {"get": {"responses": {"200": {"description": "ok",
                        "content": {"application/json": {"schema":
                            {"type": "object", "properties": {"v": {"type": "string"}}}}}}}}}
                }
            }"##,
        )
        .expect("normalizes");

        let a = spec.operations[0].responses[0].1["application/json"];
        let b = spec.operations[1].responses[0].1["application/json"];
        assert_ne!(a, b, "structurally equal inline schemas must not collapse");
        assert!(spec.arena.get(a).referenced_by.is_none());
    }

    #[test]
    fn composition_keywords_are_rejected_with_location() {
        let err = normalize_json(
            r##"{
                "openapi": "3.0.3", "info": {},
                "paths": {"/x": {"get": {"responses": {"200": {"description": "ok",
                    "content": {"application/json": {"schema":
                        {"oneOf": [{"type": "string"}, {"type": "integer"}]}}}}}}}}
            }"##,
        )
        .expect_err("oneOf has no mapping");
        match err {
            Error::NotSupported { location, construct } => {
                assert!(location.contains("GET /x"), "got location {location}");
                assert!(construct.contains("oneOf"));
            }
            other => panic!("wrong class: {other:?}"),
        }
    }

    #[test]
    fn circular_reference_alias_is_rejected() {
        let err = normalize_json(
            r##"{
                "openapi": "3.0.3", "info": {},
                "paths": {"/x": {"get": {"responses": {"200": {"description": "ok",
                    "content": {"application/json": {"schema":
                        {"$ref": "#/components/schemas/A"}}}}}}}},
                "components": {"schemas": {
                    "A": {"$ref": "#/components/schemas/B"},
                    "B": {"$ref": "#/components/schemas/A"}
                }}
            }"##,
        )
        .expect_err("an alias cycle never reaches a schema");
        match err {
            Error::NotSupported { construct, .. } => {
                assert!(construct.contains("circular"), "got construct {construct}");
            }
            other => panic!("wrong class: {other:?}"),
        }

        // A self-alias is the one-component version of the same cycle.
        let err = normalize_json(
            r##"{
                "openapi": "3.0.3", "info": {},
                "paths": {"/x": {"get": {"responses": {"200": {"description": "ok",
                    "content": {"application/json": {"schema":
                        {"$ref": "#/components/schemas/A"}}}}}}}},
                "components": {"schemas": {"A": {"$ref": "#/components/schemas/A"}}}
            }"##,
        )
        .expect_err("a self-alias never reaches a schema");
        assert!(matches!(err, Error::NotSupported { .. }));
    }

    #[test]
    fn wildcard_status_is_rejected() {
        let err = normalize_json(
            r##"{
                "openapi": "3.0.3", "info": {},
                "paths": {"/x": {"get": {"responses": {"2XX": {"description": "ok"}}}}}
            }"##,
        )
        .expect_err("wildcard status has no mapping");
        assert!(matches!(err, Error::NotSupported { .. }));
    }

    #[test]
    fn schema_list_preserves_first_visit_order() {
        let spec = normalize_json(PETSTORE).expect("normalizes");
        // limit param, response array, Pet, name, friends array (Pet items
        // is a cache hit, not a new visit), then the POST body is a cache hit.
        assert_eq!(spec.schemas.len(), 5);
        let first = spec.arena.get(spec.schemas[0]);
        assert!(matches!(
            first.kind,
            NodeKind::Primitive {
                ty: PrimitiveType::Integer,
                ..
            }
        ));
    }

    #[test]
    fn operations_keep_document_method_order() {
        let spec = normalize_json(
            r##"{
                "openapi": "3.0.3", "info": {},
                "paths": {"/x": {
                    "post": {"responses": {"201": {"description": "created"}}},
                    "get": {"responses": {"200": {"description": "ok"}}}
                }}
            }"##,
        )
        .expect("normalizes");
        let methods: Vec<HttpMethod> = spec.operations.iter().map(|op| op.method).collect();
        assert_eq!(methods, [HttpMethod::Post, HttpMethod::Get]);
    }

    #[test]
    fn operation_level_parameter_overrides_path_level() {
        let spec = normalize_json(
            r##"{
                "openapi": "3.0.3", "info": {},
                "paths": {"/x/{id}": {
                    "parameters": [
                        {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}},
                        {"name": "verbose", "in": "query", "schema": {"type": "boolean"}}
                    ],
                    "get": {
                        "parameters": [
                            {"name": "verbose", "in": "query", "schema": {"type": "string"}}
                        ],
                        "responses": {"204": {"description": "no content"}}
                    }
                }}
            }"##,
        )
        .expect("normalizes");
        let op = &spec.operations[0];
        assert_eq!(op.parameters.len(), 2);
        let verbose = op.parameters.iter().find(|p| p.name == "verbose").expect("verbose");
        assert!(matches!(
            spec.arena.get(verbose.schema).kind,
            NodeKind::Primitive {
                ty: PrimitiveType::String,
                ..
            }
        ));
        let id = op.parameters.iter().find(|p| p.name == "id").expect("id");
        assert!(id.required);
    }
}
