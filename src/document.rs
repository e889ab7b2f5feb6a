use crate::{
    Arena, ParseFlags, Parser, StrSpan,
    builder::DomBuilder,
    error::{XmlError, XmlResult},
    list::{ListIndex, SiblingList, Siblings},
    node::{
        AttributeId, AttributeRecord, Attributes, ElementNode, Node, NodeData, NodeId, NodeKind,
        NodeRecord, ProcessingInstructionNode, TextRef,
    },
    to_xml::TextEscape,
};
use std::io::Write;
use tracing::debug;

/// An XML document parsed into a tree, or built up with the factory methods.
///
/// The document is the root node of its tree. Nodes and attributes are stored in tables owned by
/// the document and addressed by [`NodeId`] and [`AttributeId`]; they are never freed one by one,
/// only all at once by [`Document::clear`] or a new [`Document::parse`].
///
/// Parsed strings are spans of the caller's buffer, which the document borrows for `'buf`.
/// Strings passed to the factory methods are copied into the document's [`Arena`].
///
/// Other things to note:
/// - Several top-level elements are accepted; [`Document::root_element`] returns the first
/// - Element attributes can have duplicates, but `ElementNode::get_attribute` returns the last one
/// - The parser does not attempt to recover from invalid closing tags or unclosed tags
///
/// # Example
/// ```rust
/// use xmlarena::{Document, ParseFlags};
///
/// let mut buffer = b"<test><test2>test</test2></test>".to_vec();
/// let mut doc = Document::new();
/// doc.parse(&mut buffer, ParseFlags::default()).unwrap();
///
/// let root = doc.root_element().unwrap();
/// assert_eq!(root.name(), "test");
/// assert_eq!(root.children().count(), 1);
/// ```
#[derive(Debug)]
pub struct Document<'buf> {
    source: &'buf [u8],
    arena: Arena,
    nodes: Vec<NodeRecord>,
    attributes: Vec<AttributeRecord>,
    pub(crate) declaration: Option<DeclarationRecord>,
}
impl<'buf> Document<'buf> {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::with_arena(Arena::new())
    }

    /// Creates an empty document that copies factory strings into `arena`.
    #[must_use]
    pub fn with_arena(arena: Arena) -> Self {
        Self {
            source: &[],
            arena,
            nodes: vec![NodeRecord::new(NodeData::Document)],
            attributes: Vec::new(),
            declaration: None,
        }
    }

    /// Parses `buffer` into this document, replacing any previous content.
    ///
    /// The buffer is decoded in place and stays borrowed by the document; the input ends at the
    /// first NUL byte or at the end of the slice.
    ///
    /// # Errors
    /// Returns a parse error at the first malformed construct. The document is left empty.
    pub fn parse(&mut self, buffer: &'buf mut [u8], flags: ParseFlags) -> XmlResult<()> {
        self.clear();
        debug!(len = buffer.len(), ?flags, "Parsing document");

        let result = Parser::new(&mut *buffer, flags).parse(&mut DomBuilder::new(self));
        match result {
            Ok(()) => {
                self.source = buffer;
                debug!(
                    nodes = self.nodes.len(),
                    attributes = self.attributes.len(),
                    "Parsed document"
                );
                Ok(())
            }

            Err(e) => {
                debug!(offset = ?e.offset(), "Parse failed");
                self.clear();
                Err(e)
            }
        }
    }

    /// Drops every node, attribute and arena string.
    /// Ids obtained before the call must not be used afterwards.
    pub fn clear(&mut self) {
        self.source = &[];
        self.arena.clear();
        self.nodes.truncate(1);
        self.nodes[0] = NodeRecord::new(NodeData::Document);
        self.attributes.clear();
        self.declaration = None;
    }

    /// Returns the first element child of the document.
    ///
    /// # Errors
    /// Returns a structure error if the document has no element at the top level.
    pub fn root_element(&self) -> XmlResult<ElementNode<'_>> {
        self.children(NodeId::DOCUMENT)
            .find_map(|node| node.as_element())
            .ok_or_else(|| XmlError::structure("Root element not found"))
    }

    /// Returns the XML declaration, if the parsed document had one.
    #[must_use]
    pub fn declaration(&self) -> Option<Declaration<'_>> {
        let record = self.declaration?;
        Some(Declaration {
            version: self.resolve(record.version),
            encoding: record.encoding.map(|r| self.resolve(r)),
            standalone: record.standalone.map(|r| self.resolve(r)),
        })
    }

    /// The arena holding strings copied in by the factory methods.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    //
    // Factory
    //

    /// Creates a detached element with no attributes or children.
    ///
    /// # Errors
    /// Fails if `name` is empty or the arena cannot grow.
    pub fn create_element(&mut self, name: impl AsRef<[u8]>) -> XmlResult<NodeId> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(XmlError::invalid_argument("Element name cannot be empty"));
        }

        let name = self.store(name)?;
        self.push_node(NodeData::Element {
            name,
            attributes: SiblingList::default(),
        })
    }

    /// Creates a detached text node.
    ///
    /// # Errors
    /// Fails if the arena cannot grow.
    pub fn create_text(&mut self, value: impl AsRef<[u8]>) -> XmlResult<NodeId> {
        let value = self.store(value.as_ref())?;
        self.push_node(NodeData::Text(value))
    }

    /// Creates a detached CDATA section.
    ///
    /// # Errors
    /// Fails if the arena cannot grow.
    pub fn create_cdata(&mut self, value: impl AsRef<[u8]>) -> XmlResult<NodeId> {
        let value = self.store(value.as_ref())?;
        self.push_node(NodeData::Cdata(value))
    }

    /// Creates a detached comment.
    ///
    /// # Errors
    /// Fails if the arena cannot grow.
    pub fn create_comment(&mut self, value: impl AsRef<[u8]>) -> XmlResult<NodeId> {
        let value = self.store(value.as_ref())?;
        self.push_node(NodeData::Comment(value))
    }

    /// Creates a detached processing instruction.
    ///
    /// # Errors
    /// Fails if `target` is empty or the arena cannot grow.
    pub fn create_processing_instruction(
        &mut self,
        target: impl AsRef<[u8]>,
        content: impl AsRef<[u8]>,
    ) -> XmlResult<NodeId> {
        let target = target.as_ref();
        if target.is_empty() {
            return Err(XmlError::invalid_argument(
                "Processing instruction target cannot be empty",
            ));
        }

        let target = self.store(target)?;
        let content = self.store(content.as_ref())?;
        self.push_node(NodeData::ProcessingInstruction { target, content })
    }

    /// Creates a detached attribute.
    ///
    /// # Errors
    /// Fails if `name` is empty or the arena cannot grow.
    pub fn create_attribute(
        &mut self,
        name: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> XmlResult<AttributeId> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(XmlError::invalid_argument("Attribute name cannot be empty"));
        }

        let name = self.store(name)?;
        let value = self.store(value.as_ref())?;
        self.push_attribute(name, value)
    }

    fn store(&mut self, bytes: &[u8]) -> XmlResult<TextRef> {
        Ok(TextRef::Arena(self.arena.alloc_bytes(bytes)?))
    }

    pub(crate) fn push_node(&mut self, data: NodeData) -> XmlResult<NodeId> {
        let requested = std::mem::size_of::<NodeRecord>();
        let id = u32::try_from(self.nodes.len()).map_err(|_| XmlError::out_of_memory(requested))?;
        self.nodes
            .try_reserve(1)
            .map_err(|_| XmlError::out_of_memory(requested))?;

        self.nodes.push(NodeRecord::new(data));
        Ok(NodeId(id))
    }

    pub(crate) fn push_attribute(&mut self, name: TextRef, value: TextRef) -> XmlResult<AttributeId> {
        let requested = std::mem::size_of::<AttributeRecord>();
        let id = u32::try_from(self.attributes.len())
            .map_err(|_| XmlError::out_of_memory(requested))?;
        self.attributes
            .try_reserve(1)
            .map_err(|_| XmlError::out_of_memory(requested))?;

        self.attributes.push(AttributeRecord::new(name, value));
        Ok(AttributeId(id))
    }

    //
    // Tree editing
    //

    /// Links the detached node `child` as the last child of `parent`.
    ///
    /// # Errors
    /// Returns an invalid argument error if either id is unknown, `child` is the document or
    /// already has a parent, `parent` cannot have children, or `child` is an ancestor of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> XmlResult<()> {
        self.check_link(parent, child)?;
        self.link_child(parent, child);
        Ok(())
    }

    /// Links the detached node `child` immediately before `reference`.
    ///
    /// # Errors
    /// Returns an invalid argument error if either id is unknown, `reference` has no parent, or
    /// `child` could not be appended to the parent of `reference`.
    pub fn insert_before(&mut self, child: NodeId, reference: NodeId) -> XmlResult<()> {
        let parent = self
            .checked_record(reference)?
            .links
            .parent
            .ok_or_else(|| XmlError::invalid_argument("Reference node is not linked"))?;
        self.check_link(parent, child)?;

        let mut children = self.nodes[parent.index()].children;
        children.insert_before(&mut self.nodes, child, reference);
        self.nodes[parent.index()].children = children;
        Ok(())
    }

    /// Unlinks `child` from `parent`. The child keeps its own subtree and can be linked again.
    ///
    /// # Errors
    /// Returns an invalid argument error if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> XmlResult<()> {
        self.checked_record(parent)?;
        if self.checked_record(child)?.links.parent != Some(parent) {
            return Err(XmlError::invalid_argument("Node is not a child of the parent"));
        }

        let mut children = self.nodes[parent.index()].children;
        children.remove(&mut self.nodes, child);
        self.nodes[parent.index()].children = children;
        Ok(())
    }

    /// Links the detached `attribute` as the last attribute of `element`.
    ///
    /// # Errors
    /// Returns an invalid argument error if either id is unknown, `element` is not an element,
    /// or the attribute is already attached.
    pub fn append_attribute(&mut self, element: NodeId, attribute: AttributeId) -> XmlResult<()> {
        if self.checked_record(element)?.kind() != NodeKind::Element {
            return Err(XmlError::invalid_argument("Only elements have attributes"));
        }
        if self.checked_attribute(attribute)?.links.parent.is_some() {
            return Err(XmlError::invalid_argument("Attribute is already attached"));
        }

        self.link_attribute(element, attribute);
        Ok(())
    }

    /// Detaches `attribute` from `element`.
    ///
    /// # Errors
    /// Returns an invalid argument error if the attribute is not attached to `element`.
    pub fn remove_attribute(&mut self, element: NodeId, attribute: AttributeId) -> XmlResult<()> {
        self.checked_record(element)?;
        if self.checked_attribute(attribute)?.links.parent != Some(element) {
            return Err(XmlError::invalid_argument(
                "Attribute is not attached to the element",
            ));
        }

        if let NodeData::Element { attributes, .. } = &mut self.nodes[element.index()].data {
            attributes.remove(&mut self.attributes, attribute);
        }
        Ok(())
    }

    fn checked_record(&self, id: NodeId) -> XmlResult<&NodeRecord> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| XmlError::invalid_argument(format!("Unknown node {}", id.0)))
    }

    fn checked_attribute(&self, id: AttributeId) -> XmlResult<&AttributeRecord> {
        self.attributes
            .get(id.index())
            .ok_or_else(|| XmlError::invalid_argument(format!("Unknown attribute {}", id.0)))
    }

    fn check_link(&self, parent: NodeId, child: NodeId) -> XmlResult<()> {
        let parent_record = self.checked_record(parent)?;
        let child_record = self.checked_record(child)?;

        if child == NodeId::DOCUMENT {
            return Err(XmlError::invalid_argument(
                "The document node cannot be a child",
            ));
        }
        if child_record.links.parent.is_some() {
            return Err(XmlError::invalid_argument("Node already has a parent"));
        }
        if !matches!(parent_record.kind(), NodeKind::Element | NodeKind::Document) {
            return Err(XmlError::invalid_argument(format!(
                "{:?} nodes cannot have children",
                parent_record.kind()
            )));
        }

        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(XmlError::invalid_argument(
                    "Node cannot become its own descendant",
                ));
            }
            ancestor = self.parent(id);
        }

        Ok(())
    }

    pub(crate) fn link_child(&mut self, parent: NodeId, child: NodeId) {
        let mut children = self.nodes[parent.index()].children;
        children.append(&mut self.nodes, parent, child);
        self.nodes[parent.index()].children = children;
    }

    pub(crate) fn link_attribute(&mut self, element: NodeId, attribute: AttributeId) {
        if let NodeData::Element { attributes, .. } = &mut self.nodes[element.index()].data {
            attributes.append(&mut self.attributes, element, attribute);
        }
    }

    //
    // Navigation
    //

    /// Returns a view of the node, or `None` if the id is unknown.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        let record = self.nodes.get(id.index())?;
        Some(match record.data {
            NodeData::Document => Node::Document,
            NodeData::Element { name, .. } => {
                Node::Element(ElementNode::new(self, id, self.resolve(name)))
            }
            NodeData::Text(value) => Node::Text(self.resolve(value)),
            NodeData::Cdata(value) => Node::Cdata(self.resolve(value)),
            NodeData::Comment(value) => Node::Comment(self.resolve(value)),
            NodeData::ProcessingInstruction { target, content } => Node::ProcessingInstruction(
                ProcessingInstructionNode::new(id, self.resolve(target), self.resolve(content)),
            ),
        })
    }

    /// Returns the element with this id, if it is one.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<ElementNode<'_>> {
        self.node(id)?.as_element()
    }

    /// Returns the kind of the node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.record(id).map(NodeRecord::kind)
    }

    /// Returns the parent of the node; `None` for the document and for detached nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.record(id)?.links.parent
    }

    /// Returns the first child of the node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.record(id)?.children.first()
    }

    /// Returns the last child of the node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.record(id)?.children.last()
    }

    /// Returns the sibling after the node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.record(id)?.links.next
    }

    /// Returns the sibling before the node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.record(id)?.links.prev
    }

    /// Iterates the children of the node, in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children::new(self, id)
    }

    /// Iterates the attributes of an element, in insertion order.
    /// Empty for any other kind of node.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> Attributes<'_> {
        Attributes::new(self, id)
    }

    /// The number of nodes in the node table, including the document and detached nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The number of attributes in the attribute table, including detached ones.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    //
    // Output
    //

    /// Writes the document as XML, without indentation or re-escaping.
    ///
    /// # Errors
    /// Fails if the writer fails.
    pub fn print<W: Write>(&self, writer: &mut W) -> XmlResult<()> {
        self.print_with(writer, TextEscape::Verbatim)
    }

    /// Writes the document as XML, escaping text and attribute values as requested.
    ///
    /// # Errors
    /// Fails if the writer fails or a string cannot be entity encoded.
    pub fn print_with<W: Write>(&self, writer: &mut W, escape: TextEscape) -> XmlResult<()> {
        crate::to_xml::write_xml(writer, self, escape)
    }

    /// Create an XML string from this document.
    ///
    /// # Errors
    /// Fails if the document holds bytes that are not valid UTF-8.
    ///
    /// # Example
    /// ```rust
    /// use xmlarena::{Document, ParseFlags};
    ///
    /// let mut buffer = b"<test>\n  <test2>test</test2>\n</test>".to_vec();
    /// let mut doc = Document::new();
    /// doc.parse(&mut buffer, ParseFlags::default()).unwrap();
    ///
    /// assert_eq!(doc.to_xml().unwrap(), "<test><test2>test</test2></test>");
    /// ```
    pub fn to_xml(&self) -> XmlResult<String> {
        let mut buffer = vec![];
        self.print(&mut buffer)?;

        String::from_utf8(buffer)
            .map_err(|e| XmlError::invalid_argument(format!("Failed to convert to UTF-8: {e}")))
    }

    //
    // Record access
    //

    pub(crate) fn record(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(id.index())
    }

    pub(crate) fn attribute_records(&self) -> &[AttributeRecord] {
        &self.attributes
    }

    pub(crate) fn resolve(&self, text: TextRef) -> StrSpan<'_> {
        match text {
            TextRef::Source { start, len } => self
                .source
                .get(start..start + len)
                .map_or_else(StrSpan::default, |bytes| StrSpan::new(bytes, start)),
            TextRef::Arena(range) => StrSpan::new(self.arena.get(range), range.start()),
        }
    }
}
impl Default for Document<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the parts of an XML declaration live.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DeclarationRecord {
    pub version: TextRef,
    pub encoding: Option<TextRef>,
    pub standalone: Option<TextRef>,
}

/// The XML declaration of a document:
/// `<?xml version="1.0" encoding="UTF-8" standalone="yes"?>`
///
/// It is kept as document metadata, never as a node, and is not printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'d> {
    version: StrSpan<'d>,
    encoding: Option<StrSpan<'d>>,
    standalone: Option<StrSpan<'d>>,
}
impl<'d> Declaration<'d> {
    /// The `version` value.
    #[must_use]
    pub fn version(&self) -> StrSpan<'d> {
        self.version
    }

    /// The `encoding` value, if present.
    #[must_use]
    pub fn encoding(&self) -> Option<StrSpan<'d>> {
        self.encoding
    }

    /// The raw `standalone` value, usually `yes` or `no`.
    #[must_use]
    pub fn standalone(&self) -> Option<StrSpan<'d>> {
        self.standalone
    }
}

/// Iterator over the children of a node, in document order.
pub struct Children<'d> {
    document: &'d Document<'d>,
    inner: Option<Siblings<'d, NodeRecord>>,
}
impl<'d> Children<'d> {
    fn new(document: &'d Document<'d>, parent: NodeId) -> Self {
        let inner = document
            .record(parent)
            .map(|record| record.children.iter(&document.nodes));
        Self { document, inner }
    }
}
impl<'d> Iterator for Children<'d> {
    type Item = Node<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.inner.as_mut()?.next()?;
        self.document.node(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XmlErrorKind;

    fn parsed(buffer: &mut [u8]) -> Document<'_> {
        let mut doc = Document::new();
        doc.parse(buffer, ParseFlags::default()).unwrap();
        doc
    }

    #[test]
    fn test_parse_builds_tree() {
        let mut buffer = br#"<a b="1"><c/>text</a>"#.to_vec();
        let doc = parsed(&mut buffer);

        let root = doc.root_element().unwrap();
        assert_eq!(root.name(), "a");
        assert_eq!(root.get_attribute("b").unwrap(), "1");

        let children: Vec<Node<'_>> = root.children().collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].as_element().unwrap().name(), "c");
        assert!(!children[0].as_element().unwrap().has_children());
        assert_eq!(children[1].value().unwrap(), "text");
    }

    #[test]
    fn test_self_closing_element() {
        let mut buffer = b"<a/>".to_vec();
        let doc = parsed(&mut buffer);

        let root = doc.root_element().unwrap();
        assert_eq!(root.name(), "a");
        assert_eq!(root.attributes().count(), 0);
        assert!(!root.has_children());
        assert_eq!(doc.node_count(), 2);
    }

    #[test]
    fn test_parent_and_sibling_links() {
        let mut buffer = b"<r><a/><b/><c/></r>".to_vec();
        let doc = parsed(&mut buffer);

        let r = doc.first_child(NodeId::DOCUMENT).unwrap();
        let a = doc.first_child(r).unwrap();
        let c = doc.last_child(r).unwrap();
        let b = doc.next_sibling(a).unwrap();

        assert_eq!(doc.prev_sibling(b), Some(a));
        assert_eq!(doc.next_sibling(b), Some(c));
        assert_eq!(doc.prev_sibling(a), None);
        assert_eq!(doc.next_sibling(c), None);
        for id in [a, b, c] {
            assert_eq!(doc.parent(id), Some(r));
        }
        assert_eq!(doc.parent(r), Some(NodeId::DOCUMENT));
        assert_eq!(doc.parent(NodeId::DOCUMENT), None);
        assert_eq!(doc.kind(NodeId::DOCUMENT), Some(NodeKind::Document));
    }

    #[test]
    fn test_root_element_requires_element() {
        let mut buffer = b"<!-- only a comment -->".to_vec();
        let doc = parsed(&mut buffer);

        let err = doc.root_element().unwrap_err();
        assert!(matches!(err.kind, XmlErrorKind::Structure(_)));
    }

    #[test]
    fn test_root_element_skips_prolog() {
        let mut buffer = b"<?pi x?><!--c--><first/><second/>".to_vec();
        let doc = parsed(&mut buffer);
        assert_eq!(doc.root_element().unwrap().name(), "first");
        assert_eq!(doc.children(NodeId::DOCUMENT).count(), 4);
    }

    #[test]
    fn test_declaration() {
        let mut buffer = br#"<?xml version="1.0" encoding="UTF-8"?><r/>"#.to_vec();
        let doc = parsed(&mut buffer);

        let declaration = doc.declaration().unwrap();
        assert_eq!(declaration.version(), "1.0");
        assert_eq!(declaration.encoding().unwrap(), "UTF-8");
        assert!(declaration.standalone().is_none());
        assert_eq!(doc.children(NodeId::DOCUMENT).count(), 1);
    }

    #[test]
    fn test_clear_then_reparse() {
        let mut first = b"<first><x/></first>".to_vec();
        let mut second = b"<second/>".to_vec();

        let mut doc = Document::new();
        doc.parse(&mut first, ParseFlags::default()).unwrap();
        assert_eq!(doc.node_count(), 3);

        doc.clear();
        assert_eq!(doc.node_count(), 1);
        assert!(doc.first_child(NodeId::DOCUMENT).is_none());

        doc.parse(&mut second, ParseFlags::default()).unwrap();
        assert_eq!(doc.node_count(), 2);
        assert_eq!(doc.root_element().unwrap().name(), "second");
        assert_eq!(doc.children(NodeId::DOCUMENT).count(), 1);
    }

    #[test]
    fn test_failed_parse_leaves_document_empty() {
        let mut good = b"<a><b/></a>".to_vec();
        let mut bad = b"<a><b></a>".to_vec();

        let mut doc = Document::new();
        doc.parse(&mut good, ParseFlags::default()).unwrap();

        let err = doc.parse(&mut bad, ParseFlags::default()).unwrap_err();
        assert!(matches!(err.kind, XmlErrorKind::Parse(_)));
        assert_eq!(doc.node_count(), 1);
        assert_eq!(doc.attribute_count(), 0);
        assert!(doc.declaration().is_none());
        assert!(doc.root_element().is_err());
    }

    #[test]
    fn test_factory_and_editing() {
        let mut doc = Document::new();
        let root = doc.create_element("root").unwrap();
        let text = doc.create_text("hello").unwrap();
        let comment = doc.create_comment(" note ").unwrap();
        let attr = doc.create_attribute("id", "1").unwrap();

        doc.append_child(NodeId::DOCUMENT, root).unwrap();
        doc.append_child(root, text).unwrap();
        doc.insert_before(comment, text).unwrap();
        doc.append_attribute(root, attr).unwrap();

        assert_eq!(doc.first_child(root), Some(comment));
        assert_eq!(doc.next_sibling(comment), Some(text));
        assert_eq!(doc.element(root).unwrap().get_attribute("id").unwrap(), "1");
        assert_eq!(
            doc.to_xml().unwrap(),
            r#"<root id="1"><!-- note -->hello</root>"#
        );

        doc.remove_child(root, comment).unwrap();
        doc.remove_attribute(root, attr).unwrap();
        assert_eq!(doc.parent(comment), None);
        assert_eq!(doc.to_xml().unwrap(), "<root>hello</root>");

        // Detached nodes can be linked again
        doc.append_child(root, comment).unwrap();
        doc.append_attribute(root, attr).unwrap();
        assert_eq!(
            doc.to_xml().unwrap(),
            r#"<root id="1">hello<!-- note --></root>"#
        );
    }

    #[test]
    fn test_editing_rejects_bad_links() {
        let mut doc = Document::new();
        let outer = doc.create_element("outer").unwrap();
        let inner = doc.create_element("inner").unwrap();
        let text = doc.create_text("t").unwrap();
        let loose = doc.create_text("loose").unwrap();
        let attr = doc.create_attribute("k", "v").unwrap();
        doc.append_child(NodeId::DOCUMENT, outer).unwrap();
        doc.append_child(outer, inner).unwrap();
        doc.append_child(inner, text).unwrap();

        let invalid = |result: XmlResult<()>| {
            matches!(result, Err(XmlError { kind: XmlErrorKind::InvalidArgument(_), .. }))
        };

        assert!(invalid(doc.append_child(outer, NodeId::DOCUMENT)));
        assert!(invalid(doc.append_child(outer, inner)));
        assert!(invalid(doc.append_child(text, loose)));
        assert!(invalid(doc.append_child(outer, NodeId(999))));
        assert!(invalid(doc.insert_before(loose, NodeId::DOCUMENT)));
        assert!(invalid(doc.remove_child(outer, text)));
        assert!(invalid(doc.append_attribute(text, attr)));
        assert!(invalid(doc.remove_attribute(outer, attr)));

        doc.remove_child(NodeId::DOCUMENT, outer).unwrap();
        assert!(invalid(doc.append_child(inner, outer)));

        assert!(invalid(doc.create_element("").map(|_| ())));
        assert!(invalid(doc.create_attribute("", "v").map(|_| ())));
    }

    #[test]
    fn test_factory_strings_live_in_arena() {
        let mut doc = Document::new();
        let pi = doc.create_processing_instruction("target", "data").unwrap();
        let cdata = doc.create_cdata("<raw>").unwrap();
        assert_eq!(doc.arena().allocated_bytes(), 15);

        match doc.node(pi).unwrap() {
            Node::ProcessingInstruction(pi) => {
                assert_eq!(pi.target(), "target");
                assert_eq!(pi.content(), "data");
            }
            other => panic!("unexpected node {other:?}"),
        }
        assert_eq!(doc.node(cdata).unwrap().value().unwrap(), "<raw>");
        assert!(doc.node(NodeId(99)).is_none());
    }

    #[test]
    fn test_edit_parsed_document() {
        let mut buffer = b"<list><item>1</item></list>".to_vec();
        let mut doc = Document::new();
        doc.parse(&mut buffer, ParseFlags::default()).unwrap();

        let list = doc.root_element().unwrap().id();
        let item = doc.create_element("item").unwrap();
        let value = doc.create_text("2").unwrap();
        doc.append_child(item, value).unwrap();
        doc.append_child(list, item).unwrap();

        assert_eq!(
            doc.to_xml().unwrap(),
            "<list><item>1</item><item>2</item></list>"
        );
    }
}
