use super::{AttributeId, Node, NodeData, NodeId};
use crate::{Document, StrSpan, document::Children, list::Siblings, node::AttributeRecord};

/// A node in the document tree, with a name, attributes, and children:
/// `<name attr="value">...</name>`
///
/// Duplicate attributes are allowed (searches use the last attribute with the same name).
#[derive(Clone, Copy)]
pub struct ElementNode<'d> {
    document: &'d Document<'d>,
    id: NodeId,
    name: StrSpan<'d>,
}
impl<'d> ElementNode<'d> {
    pub(crate) fn new(document: &'d Document<'d>, id: NodeId, name: StrSpan<'d>) -> Self {
        Self { document, id, name }
    }

    /// Get the id of the node in its document.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the name of the node.
    #[must_use]
    pub fn name(&self) -> StrSpan<'d> {
        self.name
    }

    /// Get the attributes of the node, in insertion order.
    #[must_use]
    pub fn attributes(&self) -> Attributes<'d> {
        self.document.attributes(self.id)
    }

    /// Get an attribute value by name.
    ///
    /// Searches all attributes, so the last attribute with the same name is returned.
    #[must_use]
    pub fn get_attribute(&self, name: impl AsRef<[u8]>) -> Option<StrSpan<'d>> {
        let name = name.as_ref();
        self.attributes()
            .filter(|a| a.name() == *name)
            .last()
            .map(|a| a.value())
    }

    /// Get the children of the node.
    #[must_use]
    pub fn children(&self) -> Children<'d> {
        self.document.children(self.id)
    }

    /// Returns true if the node has at least one child.
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.document.first_child(self.id).is_some()
    }

    /// Get the first child of the node.
    #[must_use]
    pub fn first_child(&self) -> Option<Node<'d>> {
        self.document
            .first_child(self.id)
            .and_then(|id| self.document.node(id))
    }
}
impl std::fmt::Debug for ElementNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// An attribute set on a node, with a name and value:
/// `name="value"`
///
/// A node can have multiple attributes with the same name, but only the last one is used for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'d> {
    id: AttributeId,
    name: StrSpan<'d>,
    value: StrSpan<'d>,
}
impl<'d> Attribute<'d> {
    /// Returns the id of the attribute in its document.
    #[must_use]
    pub fn id(&self) -> AttributeId {
        self.id
    }

    /// Returns the name of the attribute.
    #[must_use]
    pub fn name(&self) -> StrSpan<'d> {
        self.name
    }

    /// Returns the value of the attribute.
    #[must_use]
    pub fn value(&self) -> StrSpan<'d> {
        self.value
    }
}

/// Iterator over the attributes of an element, in insertion order.
pub struct Attributes<'d> {
    document: &'d Document<'d>,
    inner: Option<Siblings<'d, AttributeRecord>>,
}
impl<'d> Attributes<'d> {
    pub(crate) fn new(document: &'d Document<'d>, element: NodeId) -> Self {
        let inner = match document.record(element).map(|r| &r.data) {
            Some(NodeData::Element { attributes, .. }) => {
                Some(attributes.iter(document.attribute_records()))
            }
            _ => None,
        };
        Self { document, inner }
    }
}
impl<'d> Iterator for Attributes<'d> {
    type Item = Attribute<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.inner.as_mut()?.next()?;
        let record = &self.document.attribute_records()[id.0 as usize];
        Some(Attribute {
            id,
            name: self.document.resolve(record.name),
            value: self.document.resolve(record.value),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, ParseFlags};

    #[test]
    fn test_get_attribute_last_wins() {
        let mut buffer = b"<a x=\"1\" y=\"2\" x=\"3\"/>".to_vec();
        let mut doc = Document::new();
        doc.parse(&mut buffer, ParseFlags::default()).unwrap();

        let root = doc.root_element().unwrap();
        assert_eq!(root.get_attribute("x").unwrap(), "3");
        assert_eq!(root.get_attribute(b"y").unwrap(), "2");
        assert!(root.get_attribute("z").is_none());

        let names: Vec<String> = root.attributes().map(|a| a.name().to_string()).collect();
        assert_eq!(names, vec!["x", "y", "x"]);
    }

    #[test]
    fn test_element_children() {
        let mut buffer = b"<a><b/>text<!--c--></a>".to_vec();
        let mut doc = Document::new();
        doc.parse(&mut buffer, ParseFlags::default()).unwrap();

        let root = doc.root_element().unwrap();
        assert!(root.has_children());
        assert_eq!(root.children().count(), 3);

        let first = root.first_child().unwrap().as_element().unwrap();
        assert_eq!(first.name(), "b");
        assert!(!first.has_children());
        assert_eq!(first.attributes().count(), 0);
    }
}
