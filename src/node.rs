//! Schema node model: the tagged-union representation of contract schemas.
//!
//! All nodes live in one run-scoped arena and are addressed by `NodeId`.
//! Node identity IS the id: reference resolution, recursion termination and
//! the type-mapping cache all key off it, so two structurally identical but
//! independently declared schemas can never be confused, and cyclic named
//! schemas need no language-level cyclic pointers.

use crate::hint::NameHint;

/// Stable arena index. Identity of a schema node for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Canonical `$ref` pointer naming this node, set only when the node is
    /// the value a component-section reference resolves to. Inline schemas
    /// never carry it, even when structurally identical to a named one.
    pub referenced_by: Option<String>,
    /// Where this node occurred in the document; consulted for naming only
    /// when `referenced_by` is absent.
    pub hint: NameHint,
    pub kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Placeholder while the pointed-to schema is still being resolved.
    /// Rewritten in place before the graph is exposed; the normalizer
    /// guarantees no `Reference` survives into the specification.
    Reference(String),
    Object {
        title: Option<String>,
        description: Option<String>,
        properties: Vec<Property>,
    },
    Array {
        title: Option<String>,
        description: Option<String>,
        items: NodeId,
        unique_items: bool,
        min_items: Option<u64>,
        max_items: Option<u64>,
    },
    Map {
        title: Option<String>,
        description: Option<String>,
        values: NodeId,
        min_items: Option<u64>,
        max_items: Option<u64>,
    },
    Enum {
        title: Option<String>,
        description: Option<String>,
        values: Vec<String>,
    },
    Primitive {
        title: Option<String>,
        description: Option<String>,
        ty: PrimitiveType,
        format: Option<String>,
        minimum: Option<f64>,
        maximum: Option<f64>,
        exclusive_minimum: bool,
        exclusive_maximum: bool,
        min_length: Option<u64>,
        max_length: Option<u64>,
        pattern: Option<String>,
    },
}

/// One object property, in document order.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub required: bool,
    pub schema: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Integer,
    Number,
    String,
}

/// Run-scoped node storage. Discarded when the run ends.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<SchemaNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0 as usize]
    }

    /// Controlled rewrite used exactly once per node, when a `Reference`
    /// placeholder is replaced by its resolved content.
    pub fn replace(&mut self, id: NodeId, node: SchemaNode) {
        self.nodes[id.0 as usize] = node;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_object(&self, id: NodeId) -> bool {
        matches!(self.get(id).kind, NodeKind::Object { .. })
    }
}
