//! The types of nodes and related data that can appear in a document tree.
use crate::{
    ArenaRange, StrSpan,
    list::{Links, Linked, ListIndex, SiblingList},
};

mod element;
pub use element::*;

mod pi;
pub use pi::*;

/// Identifies a node in the node table of a [`crate::Document`].
///
/// Ids are only meaningful for the document that created them, and only until that document is
/// cleared or re-parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);
impl NodeId {
    /// The document node, root of every tree.
    pub const DOCUMENT: NodeId = NodeId(0);
}
impl ListIndex for NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies an attribute in the attribute table of a [`crate::Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId(pub(crate) u32);
impl ListIndex for AttributeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The closed set of structural node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `<name attr="value">...</name>`
    Element,

    /// Character data between tags
    Text,

    /// `<![CDATA[...]]>`
    Cdata,

    /// `<!--...-->`
    Comment,

    /// `<?target content?>`
    ProcessingInstruction,

    /// The root of the tree
    Document,
}

/// A node in the document tree, borrowed from its document. Can be any of:
/// - `Document` - the root of the tree
/// - `Element` - a tag node, with attributes and children
/// - `Text` - a text node
/// - `Cdata` - a CDATA section
/// - `Comment` - a comment node
/// - `ProcessingInstruction` - a processing instruction node
#[derive(Debug, Clone, Copy)]
pub enum Node<'d> {
    /// The root of the tree.
    Document,

    /// A tag node.
    Element(ElementNode<'d>),

    /// A text node.
    Text(StrSpan<'d>),

    /// A CDATA node.
    Cdata(StrSpan<'d>),

    /// A comment node.
    Comment(StrSpan<'d>),

    /// A processing instruction node.
    ProcessingInstruction(ProcessingInstructionNode<'d>),
}
impl<'d> Node<'d> {
    /// Returns the kind of the node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Document => NodeKind::Document,
            Self::Element(_) => NodeKind::Element,
            Self::Text(_) => NodeKind::Text,
            Self::Cdata(_) => NodeKind::Cdata,
            Self::Comment(_) => NodeKind::Comment,
            Self::ProcessingInstruction(_) => NodeKind::ProcessingInstruction,
        }
    }

    /// Returns the element, if this is an element node.
    #[must_use]
    pub fn as_element(&self) -> Option<ElementNode<'d>> {
        match self {
            Self::Element(element) => Some(*element),
            _ => None,
        }
    }

    /// Returns the value of a text, CDATA or comment node, or the content of a processing instruction.
    #[must_use]
    pub fn value(&self) -> Option<StrSpan<'d>> {
        match self {
            Self::Text(value) | Self::Cdata(value) | Self::Comment(value) => Some(*value),
            Self::ProcessingInstruction(pi) => Some(pi.content()),
            Self::Document | Self::Element(_) => None,
        }
    }
}

/// Where the bytes of a stored string live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextRef {
    /// A run of the parsed buffer
    Source { start: usize, len: usize },

    /// A copy held by the document's arena
    Arena(ArenaRange),
}
impl TextRef {
    pub fn source(span: &StrSpan<'_>) -> Self {
        Self::Source {
            start: span.start(),
            len: span.len(),
        }
    }
}

/// Per-kind payload of a node record.
#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Document,
    Element {
        name: TextRef,
        attributes: SiblingList<AttributeId>,
    },
    Text(TextRef),
    Cdata(TextRef),
    Comment(TextRef),
    ProcessingInstruction {
        target: TextRef,
        content: TextRef,
    },
}

/// A node as stored in the document's node table.
#[derive(Debug, Clone)]
pub(crate) struct NodeRecord {
    pub links: Links<NodeId>,
    pub children: SiblingList<NodeId>,
    pub data: NodeData,
}
impl NodeRecord {
    pub fn new(data: NodeData) -> Self {
        Self {
            links: Links::default(),
            children: SiblingList::default(),
            data,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Document => NodeKind::Document,
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Cdata(_) => NodeKind::Cdata,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::ProcessingInstruction { .. } => NodeKind::ProcessingInstruction,
        }
    }
}
impl Linked for NodeRecord {
    type Id = NodeId;

    fn links(&self) -> &Links<NodeId> {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links<NodeId> {
        &mut self.links
    }
}

/// An attribute as stored in the document's attribute table.
#[derive(Debug, Clone)]
pub(crate) struct AttributeRecord {
    pub links: Links<AttributeId>,
    pub name: TextRef,
    pub value: TextRef,
}
impl AttributeRecord {
    pub fn new(name: TextRef, value: TextRef) -> Self {
        Self {
            links: Links::default(),
            name,
            value,
        }
    }
}
impl Linked for AttributeRecord {
    type Id = AttributeId;

    fn links(&self) -> &Links<AttributeId> {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links<AttributeId> {
        &mut self.links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind() {
        let text = NodeRecord::new(NodeData::Text(TextRef::Source { start: 0, len: 0 }));
        assert_eq!(text.kind(), NodeKind::Text);
        assert!(text.children.is_empty());
        assert_eq!(text.links.parent, None);

        let pi = NodeRecord::new(NodeData::ProcessingInstruction {
            target: TextRef::Arena(ArenaRange::default()),
            content: TextRef::Arena(ArenaRange::default()),
        });
        assert_eq!(pi.kind(), NodeKind::ProcessingInstruction);
    }

    #[test]
    fn test_node_value() {
        let comment = Node::Comment(StrSpan::from(" note "));
        assert_eq!(comment.kind(), NodeKind::Comment);
        assert_eq!(comment.value().unwrap(), " note ");
        assert!(comment.as_element().is_none());
        assert!(Node::Document.value().is_none());

        let pi = Node::ProcessingInstruction(ProcessingInstructionNode::new(
            NodeId(1),
            StrSpan::from("target"),
            StrSpan::from("content"),
        ));
        assert_eq!(pi.kind(), NodeKind::ProcessingInstruction);
        assert_eq!(pi.value().unwrap(), "content");
    }

    #[test]
    fn test_text_ref_from_span() {
        let buffer = b"<a>text</a>";
        let span = StrSpan::new(&buffer[3..7], 3);
        assert_eq!(TextRef::source(&span), TextRef::Source { start: 3, len: 4 });
    }
}
