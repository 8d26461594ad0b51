//! Path-based naming aid for anonymous schemas.
//!
//! A `NameHint` records where a schema occurs in the document (operation →
//! response → status → media type, property name, ...). It is consulted only
//! when a node has no canonical name of its own, i.e. when it was not reached
//! through a `$ref` into the components section.

/// Ordered path segments, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameHint {
    segments: Vec<String>,
}

impl NameHint {
    pub fn root(segment: impl Into<String>) -> Self {
        NameHint {
            segments: vec![segment.into()],
        }
    }

    /// Suffix with a child segment (descending into properties/items/values).
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        NameHint { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Human-readable form for diagnostics, `/`-joined like a pointer.
    pub fn display(&self) -> String {
        self.segments.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_does_not_mutate_parent() {
        let base = NameHint::root("listPets").child("response").child("200");
        let deeper = base.child("item");
        assert_eq!(base.segments().len(), 3);
        assert_eq!(deeper.last(), Some("item"));
        assert_eq!(deeper.display(), "listPets/response/200/item");
    }
}
