//! Type mapper: schema nodes -> target types.
//!
//! Mapping is a pure function of (node identity, configuration), memoized per
//! node id: the same node always yields the same `Rc<TargetType>` instance,
//! which is what lets two operations referencing one named schema bind to one
//! generated type. Naming synthesizes identifiers from reference pointers or
//! accumulated hints, and collisions between independently synthesized names
//! are resolved explicitly, never by silently merging two nodes.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use ordered_float::OrderedFloat;

use crate::config::GeneratorConfiguration;
use crate::error::{Error, Result};
use crate::node::{NodeArena, NodeId, NodeKind, PrimitiveType};
use crate::normalize::Specification;

// ------------------------------ Target model ------------------------------ //

#[derive(Debug, Clone, PartialEq)]
pub enum TargetType {
    Basic {
        name: String,
        package: String,
        validations: Vec<Validation>,
    },
    Collection {
        name: String,
        package: String,
        unique: bool,
        element: Rc<TargetType>,
        /// Size bounds only; collections are never otherwise validated.
        validations: Vec<Validation>,
    },
    Map {
        name: String,
        package: String,
        values: Rc<TargetType>,
        validations: Vec<Validation>,
    },
}

impl TargetType {
    pub fn name(&self) -> &str {
        match self {
            TargetType::Basic { name, .. }
            | TargetType::Collection { name, .. }
            | TargetType::Map { name, .. } => name,
        }
    }

    pub fn package(&self) -> &str {
        match self {
            TargetType::Basic { package, .. }
            | TargetType::Collection { package, .. }
            | TargetType::Map { package, .. } => package,
        }
    }

    pub fn validations(&self) -> &[Validation] {
        match self {
            TargetType::Basic { validations, .. }
            | TargetType::Collection { validations, .. }
            | TargetType::Map { validations, .. } => validations,
        }
    }

    /// Declaration-site rendering, e.g. `List<Pet>` or `Map<String, Long>`.
    pub fn declaration(&self) -> String {
        match self {
            TargetType::Basic { name, .. } => name.clone(),
            TargetType::Collection { name, element, .. } => {
                format!("{name}<{}>", element.declaration())
            }
            TargetType::Map { name, values, .. } => {
                format!("{name}<String, {}>", values.declaration())
            }
        }
    }

    /// Packages that need importing to use this declaration.
    pub fn imports(&self, into: &mut Vec<String>) {
        let qualified = match self {
            TargetType::Basic { name, package, .. }
            | TargetType::Collection { name, package, .. }
            | TargetType::Map { name, package, .. } => {
                if package.is_empty() || package == "java.lang" {
                    None
                } else {
                    Some(format!("{package}.{name}"))
                }
            }
        };
        if let Some(q) = qualified {
            if !into.contains(&q) {
                into.push(q);
            }
        }
        match self {
            TargetType::Basic { .. } => {}
            TargetType::Collection { element, .. } => element.imports(into),
            TargetType::Map { values, .. } => values.imports(into),
        }
    }
}

/// Ordered constraint descriptors attached to types and bindings.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    IntegralMin(i64),
    IntegralMax(i64),
    DecimalMin {
        value: OrderedFloat<f64>,
        inclusive: bool,
    },
    DecimalMax {
        value: OrderedFloat<f64>,
        inclusive: bool,
    },
    Size {
        min: Option<u64>,
        max: Option<u64>,
    },
    Pattern(String),
    /// The referenced type itself requires cascading validation. Attached to
    /// bindings of object types, never to the type itself.
    NestedValid,
}

// ------------------------------ Mapper ------------------------------------ //

pub struct TypeMapper<'a> {
    arena: &'a NodeArena,
    config: &'a GeneratorConfiguration,
    model_package: String,
    cache: HashMap<NodeId, Rc<TargetType>>,
    /// synthesized model name -> owning node. Uniqueness registry.
    names: HashMap<String, NodeId>,
    /// ids currently being mapped; a re-entry means a container cycle.
    in_flight: HashSet<NodeId>,
}

impl<'a> TypeMapper<'a> {
    /// Names of the referenced component schemas are registered up front so
    /// anonymous schemas always yield to them regardless of mapping order.
    pub fn new(spec: &'a Specification, config: &'a GeneratorConfiguration) -> Result<Self> {
        let model_package = config.model_package(std::path::Path::new(""));
        let mut mapper = TypeMapper {
            arena: &spec.arena,
            config,
            model_package,
            cache: HashMap::new(),
            names: HashMap::new(),
            in_flight: HashSet::new(),
        };
        for id in &spec.schemas {
            let node = mapper.arena.get(*id);
            if let Some(pointer) = &node.referenced_by {
                let name = mapper.prefixed(fold_type_identifier(pointer_final_segment(pointer)));
                if let Some(holder) = mapper.names.insert(name.clone(), *id) {
                    return Err(Error::NamingCollision {
                        name,
                        first: mapper.arena.get(holder).hint.display(),
                        second: node.hint.display(),
                    });
                }
            }
        }
        Ok(mapper)
    }

    /// Construct with the contract path available, so mirrored packages pick
    /// up the document's directory.
    pub fn with_contract_path(
        spec: &'a Specification,
        config: &'a GeneratorConfiguration,
        contract_path: &std::path::Path,
    ) -> Result<Self> {
        let mut mapper = Self::new(spec, config)?;
        mapper.model_package = config.model_package(contract_path);
        Ok(mapper)
    }

    /// Map a node to its target type. Memoized: repeated calls return the
    /// identical `Rc` instance.
    pub fn map(&mut self, id: NodeId) -> Result<Rc<TargetType>> {
        if let Some(ty) = self.cache.get(&id) {
            return Ok(Rc::clone(ty));
        }
        if !self.in_flight.insert(id) {
            // Only containers recurse, so a revisit means e.g. an array whose
            // items are (transitively) itself: not expressible as a type.
            return Err(Error::not_supported(
                self.arena.get(id).hint.display(),
                "recursive container type",
            ));
        }
        let mapped = self.map_uncached(id);
        self.in_flight.remove(&id);
        let ty = Rc::new(mapped?);
        self.cache.insert(id, Rc::clone(&ty));
        Ok(ty)
    }

    /// True when bindings of this node must cascade validation (`NestedValid`).
    pub fn requires_cascade(&self, id: NodeId) -> bool {
        self.arena.is_object(id)
    }

    /// Constraints for a binding site (property, parameter, body): the
    /// type's own validations, plus cascade marking for object types.
    pub fn binding_validations(&mut self, id: NodeId) -> Result<Vec<Validation>> {
        let ty = self.map(id)?;
        let mut validations = ty.validations().to_vec();
        if self.requires_cascade(id) {
            validations.push(Validation::NestedValid);
        }
        Ok(validations)
    }

    fn map_uncached(&mut self, id: NodeId) -> Result<TargetType> {
        let node = self.arena.get(id);
        match &node.kind {
            NodeKind::Reference(pointer) => {
                unreachable!("reference placeholder `{pointer}` escaped normalization")
            }
            NodeKind::Primitive {
                ty,
                format,
                minimum,
                maximum,
                exclusive_minimum,
                exclusive_maximum,
                min_length,
                max_length,
                pattern,
                ..
            } => {
                let (name, package) = builtin_type(*ty, format.as_deref());
                let validations = primitive_validations(
                    *ty,
                    *minimum,
                    *maximum,
                    *exclusive_minimum,
                    *exclusive_maximum,
                    *min_length,
                    *max_length,
                    pattern.as_deref(),
                );
                Ok(TargetType::Basic {
                    name: name.to_string(),
                    package: package.to_string(),
                    validations,
                })
            }
            NodeKind::Array {
                items,
                unique_items,
                min_items,
                max_items,
                ..
            } => {
                let (items, unique) = (*items, *unique_items);
                let (min_items, max_items) = (*min_items, *max_items);
                let element = self.map(items)?;
                let mut validations = Vec::new();
                if min_items.is_some() || max_items.is_some() {
                    validations.push(Validation::Size {
                        min: min_items,
                        max: max_items,
                    });
                }
                Ok(TargetType::Collection {
                    name: if unique { "Set" } else { "List" }.to_string(),
                    package: "java.util".to_string(),
                    unique,
                    element,
                    validations,
                })
            }
            NodeKind::Map {
                values,
                min_items,
                max_items,
                ..
            } => {
                let values = *values;
                let (min_items, max_items) = (*min_items, *max_items);
                let values = self.map(values)?;
                let mut validations = Vec::new();
                if min_items.is_some() || max_items.is_some() {
                    validations.push(Validation::Size {
                        min: min_items,
                        max: max_items,
                    });
                }
                Ok(TargetType::Map {
                    name: "Map".to_string(),
                    package: "java.util".to_string(),
                    values,
                    validations,
                })
            }
            NodeKind::Object { .. } | NodeKind::Enum { .. } => {
                let name = self.synthesize_name(id)?;
                Ok(TargetType::Basic {
                    name,
                    package: self.model_package.clone(),
                    validations: Vec::new(),
                })
            }
        }
    }

    // ------------------------------ Naming ------------------------------- //

    fn prefixed(&self, folded: String) -> String {
        match &self.config.model_name_prefix {
            Some(prefix) => format!("{prefix}{folded}"),
            None => folded,
        }
    }

    /// Synthesize and register the model name for an object/enum node.
    /// Named nodes take the reference pointer's final segment (registered at
    /// construction). Anonymous nodes derive from the hint: last segment
    /// first; on collision, the last segment combined with the next-nearest
    /// segment that actually differs from the holder's path; then the whole
    /// hint; exhausting that is an unresolved collision, which is an error,
    /// never a merge.
    fn synthesize_name(&mut self, id: NodeId) -> Result<String> {
        let node = self.arena.get(id);

        if let Some(pointer) = &node.referenced_by {
            // Pre-registered in `new`.
            return Ok(self.prefixed(fold_type_identifier(pointer_final_segment(pointer))));
        }

        let segments = node.hint.segments();
        let last = segments.last().map(String::as_str).unwrap_or("Model");
        let base = fold_type_identifier(last);

        let mut candidates = vec![base.clone()];
        if let Some(holder) = self.names.get(&self.prefixed(base.clone())).copied() {
            let theirs = self.arena.get(holder).hint.segments().to_vec();
            for back in 1..segments.len() {
                let mine = &segments[segments.len() - 1 - back];
                let aligned = theirs
                    .len()
                    .checked_sub(1 + back)
                    .map(|j| fold_type_identifier(&theirs[j]));
                if aligned == Some(fold_type_identifier(mine)) {
                    continue; // shared path segment, cannot disambiguate
                }
                candidates.push(format!("{base}{}", fold_type_identifier(mine)));
            }
            candidates.push(fold_type_identifier(&segments.join(" ")));
        }

        for candidate in candidates {
            let name = self.prefixed(candidate);
            match self.names.get(&name) {
                None => {
                    self.names.insert(name.clone(), id);
                    return Ok(name);
                }
                Some(holder) if *holder == id => return Ok(name),
                Some(_) => {}
            }
        }

        let holder = self.names[&self.prefixed(base.clone())];
        Err(Error::NamingCollision {
            name: self.prefixed(base),
            first: self.arena.get(holder).hint.display(),
            second: node.hint.display(),
        })
    }
}

// ------------------------------ Builtins ---------------------------------- //

/// Deterministic (type, format) -> built-in type table. Unknown formats fall
/// back to the format-absent mapping for the type.
fn builtin_type(ty: PrimitiveType, format: Option<&str>) -> (&'static str, &'static str) {
    match (ty, format) {
        (PrimitiveType::Boolean, _) => ("Boolean", "java.lang"),
        (PrimitiveType::Integer, Some("int64")) => ("Long", "java.lang"),
        (PrimitiveType::Integer, _) => ("Integer", "java.lang"),
        (PrimitiveType::Number, Some("float")) => ("Float", "java.lang"),
        (PrimitiveType::Number, _) => ("Double", "java.lang"),
        (PrimitiveType::String, Some("date")) => ("LocalDate", "java.time"),
        (PrimitiveType::String, Some("date-time")) => ("OffsetDateTime", "java.time"),
        (PrimitiveType::String, Some("uuid")) => ("UUID", "java.util"),
        (PrimitiveType::String, Some("byte") | Some("binary")) => ("byte[]", ""),
        (PrimitiveType::String, _) => ("String", "java.lang"),
    }
}

fn primitive_validations(
    ty: PrimitiveType,
    minimum: Option<f64>,
    maximum: Option<f64>,
    exclusive_minimum: bool,
    exclusive_maximum: bool,
    min_length: Option<u64>,
    max_length: Option<u64>,
    pattern: Option<&str>,
) -> Vec<Validation> {
    let mut out = Vec::new();
    match ty {
        PrimitiveType::Integer => {
            // Exclusive integral bounds fold into the value itself. The cast
            // saturates for out-of-range contract values, and a fold that
            // would overflow stays at the saturated bound.
            if let Some(min) = minimum {
                let mut v = min as i64;
                if exclusive_minimum {
                    v = v.checked_add(1).unwrap_or(v);
                }
                out.push(Validation::IntegralMin(v));
            }
            if let Some(max) = maximum {
                let mut v = max as i64;
                if exclusive_maximum {
                    v = v.checked_sub(1).unwrap_or(v);
                }
                out.push(Validation::IntegralMax(v));
            }
        }
        PrimitiveType::Number => {
            if let Some(min) = minimum {
                out.push(Validation::DecimalMin {
                    value: OrderedFloat(min),
                    inclusive: !exclusive_minimum,
                });
            }
            if let Some(max) = maximum {
                out.push(Validation::DecimalMax {
                    value: OrderedFloat(max),
                    inclusive: !exclusive_maximum,
                });
            }
        }
        PrimitiveType::String => {
            if min_length.is_some() || max_length.is_some() {
                out.push(Validation::Size {
                    min: min_length,
                    max: max_length,
                });
            }
            if let Some(p) = pattern {
                out.push(Validation::Pattern(p.to_string()));
            }
        }
        PrimitiveType::Boolean => {}
    }
    out
}

// ------------------------------ Folding ----------------------------------- //

/// Fold arbitrary text into a type identifier: words split on
/// non-alphanumerics, each word's head uppercased, separators stripped. A
/// leading character that cannot start an identifier gets an `_` escape.
/// Idempotent: folding an already-folded name changes nothing.
pub fn fold_type_identifier(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut word_start = true;
    for c in input.chars() {
        if !c.is_ascii_alphanumeric() {
            word_start = true;
            continue;
        }
        if word_start {
            out.extend(c.to_uppercase());
            word_start = false;
        } else {
            out.push(c);
        }
    }
    if out.is_empty() {
        return "_".to_string();
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Fold an enum value into an upper-snake constant: underscores inserted at
/// lowercase-to-uppercase, letter-to-digit and digit-to-letter boundaries;
/// non-identifier characters act as boundaries and are stripped.
pub fn fold_enum_constant(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev: Option<char> = None;
    for c in input.chars() {
        if !c.is_ascii_alphanumeric() {
            if prev.is_some() {
                prev = Some('_');
            }
            continue;
        }
        let boundary = match prev {
            Some('_') => true,
            Some(p) => {
                (p.is_ascii_lowercase() && c.is_ascii_uppercase())
                    || (p.is_ascii_alphabetic() && c.is_ascii_digit())
                    || (p.is_ascii_digit() && c.is_ascii_alphabetic())
            }
            None => false,
        };
        if boundary && !out.is_empty() {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
        prev = Some(c);
    }
    if out.is_empty() {
        return "_".to_string();
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn pointer_final_segment(pointer: &str) -> &str {
    pointer.rsplit('/').next().unwrap_or(pointer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_identifier_folding_is_idempotent() {
        for input in ["someValue2X", "foo-bar", "get pets item", "9lives", "Pet"] {
            let once = fold_type_identifier(input);
            let twice = fold_type_identifier(&once);
            assert_eq!(once, twice, "fold must be idempotent for {input:?}");
        }
        assert_eq!(fold_type_identifier("foo-bar"), "FooBar");
        assert_eq!(fold_type_identifier("get pets item"), "GetPetsItem");
        assert_eq!(fold_type_identifier("9lives"), "_9lives");
    }

    #[test]
    fn enum_constant_folding_inserts_transition_underscores() {
        assert_eq!(fold_enum_constant("someValue2X"), "SOME_VALUE_2_X");
        assert_eq!(fold_enum_constant("available"), "AVAILABLE");
        assert_eq!(fold_enum_constant("not-available"), "NOT_AVAILABLE");
        assert_eq!(fold_enum_constant("HTTP2"), "HTTP_2");
        assert_eq!(fold_enum_constant("2fast"), "_2_FAST");
        // Idempotent on its own output.
        assert_eq!(fold_enum_constant("SOME_VALUE_2_X"), "SOME_VALUE_2_X");
    }

    #[test]
    fn builtin_table_is_deterministic() {
        assert_eq!(
            builtin_type(PrimitiveType::String, None),
            ("String", "java.lang")
        );
        assert_eq!(
            builtin_type(PrimitiveType::Integer, Some("int64")),
            ("Long", "java.lang")
        );
        assert_eq!(
            builtin_type(PrimitiveType::Number, Some("double")),
            ("Double", "java.lang")
        );
        assert_eq!(
            builtin_type(PrimitiveType::String, Some("date-time")),
            ("OffsetDateTime", "java.time")
        );
        // Unknown format falls back to the bare-type mapping.
        assert_eq!(
            builtin_type(PrimitiveType::String, Some("hostname")),
            ("String", "java.lang")
        );
    }

    #[test]
    fn exclusive_decimal_bound_translates_inclusive_flag() {
        let v = primitive_validations(
            PrimitiveType::Number,
            None,
            Some(10.0),
            false,
            true,
            None,
            None,
            None,
        );
        assert_eq!(
            v,
            vec![Validation::DecimalMax {
                value: OrderedFloat(10.0),
                inclusive: false
            }]
        );
    }

    #[test]
    fn exclusive_integral_bound_folds_into_value() {
        let v = primitive_validations(
            PrimitiveType::Integer,
            Some(3.0),
            Some(10.0),
            true,
            false,
            None,
            None,
            None,
        );
        assert_eq!(
            v,
            vec![Validation::IntegralMin(4), Validation::IntegralMax(10)]
        );
    }

    #[test]
    fn exclusive_integral_bound_at_type_limit_saturates() {
        let v = primitive_validations(
            PrimitiveType::Integer,
            Some(i64::MAX as f64),
            None,
            true,
            false,
            None,
            None,
            None,
        );
        assert_eq!(v, vec![Validation::IntegralMin(i64::MAX)]);

        let v = primitive_validations(
            PrimitiveType::Integer,
            None,
            Some(i64::MIN as f64),
            false,
            true,
            None,
            None,
            None,
        );
        assert_eq!(v, vec![Validation::IntegralMax(i64::MIN)]);
    }

    #[test]
    fn string_bounds_become_size_and_pattern() {
        let v = primitive_validations(
            PrimitiveType::String,
            None,
            None,
            false,
            false,
            Some(1),
            Some(64),
            Some("^[a-z]+$"),
        );
        assert_eq!(
            v,
            vec![
                Validation::Size {
                    min: Some(1),
                    max: Some(64)
                },
                Validation::Pattern("^[a-z]+$".to_string()),
            ]
        );
    }
}
