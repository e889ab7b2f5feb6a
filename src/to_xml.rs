//! XML formatting module
//!
//! Use [`Document::to_xml`] for a `String`, or [`Document::print`] and [`Document::print_with`]
//! to write to a file or other writer.
use crate::{
    Document, Node, NodeId, StrSpan,
    error::{XmlError, XmlResult},
};
use htmlentity::entity::ICodedDataTrait;
use htmlentity::entity::{CharacterSet, EncodeType, encode};

/// How text and attribute values are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEscape {
    /// Values are written exactly as stored.
    ///
    /// Decoded references are not re-encoded, so a value holding `&`, `<` or `"` does not
    /// round-trip.
    #[default]
    Verbatim,

    /// `&`, `<`, `>`, `"` and `'` in text and attribute values are written as named entities.
    /// Comments, CDATA sections and processing instructions are always written verbatim.
    Entities,
}

/// Write a document as XML using the given writer.
///
/// The tree is walked in document order through the parent and sibling links, so output depth
/// does not grow the call stack. Elements without children are written as `<name/>`.
///
/// # Errors
/// Fails if the writer fails, a value cannot be entity encoded, or the walk reaches a node that
/// cannot appear inside the tree.
pub fn write_xml(
    writer: &mut dyn std::io::Write,
    document: &Document<'_>,
    escape: TextEscape,
) -> XmlResult<()> {
    let Some(mut current) = document.first_child(NodeId::DOCUMENT) else {
        return Ok(());
    };

    loop {
        let node = document
            .node(current)
            .ok_or_else(|| XmlError::structure("Invalid node id"))?;
        let has_children = document.first_child(current).is_some();
        write_open(writer, node, has_children, escape)?;

        if let Some(child) = document.first_child(current) {
            current = child;
            continue;
        }

        //
        // Climb until a node has a following sibling, closing elements on the way
        loop {
            if let Some(next) = document.next_sibling(current) {
                current = next;
                break;
            }

            let parent = document
                .parent(current)
                .ok_or_else(|| XmlError::structure("Node has no parent"))?;
            if parent == NodeId::DOCUMENT {
                return Ok(());
            }

            let Some(element) = document.element(parent) else {
                return Err(XmlError::structure("Invalid node type"));
            };
            writer.write_all(b"</")?;
            writer.write_all(element.name().as_bytes())?;
            writer.write_all(b">")?;

            current = parent;
        }
    }
}

fn write_open(
    writer: &mut dyn std::io::Write,
    node: Node<'_>,
    has_children: bool,
    escape: TextEscape,
) -> XmlResult<()> {
    match node {
        Node::Element(element) => {
            writer.write_all(b"<")?;
            writer.write_all(element.name().as_bytes())?;

            for attr in element.attributes() {
                writer.write_all(b" ")?;
                writer.write_all(attr.name().as_bytes())?;
                writer.write_all(b"=\"")?;
                write_value(writer, attr.value(), escape)?;
                writer.write_all(b"\"")?;
            }

            if has_children {
                writer.write_all(b">")?;
            } else {
                writer.write_all(b"/>")?;
            }
        }

        Node::Text(text) => write_value(writer, text, escape)?,

        Node::Cdata(cdata) => {
            writer.write_all(b"<![CDATA[")?;
            writer.write_all(cdata.as_bytes())?;
            writer.write_all(b"]]>")?;
        }

        Node::Comment(comment) => {
            writer.write_all(b"<!--")?;
            writer.write_all(comment.as_bytes())?;
            writer.write_all(b"-->")?;
        }

        Node::ProcessingInstruction(pi) => {
            writer.write_all(b"<?")?;
            writer.write_all(pi.target().as_bytes())?;
            writer.write_all(b" ")?;
            writer.write_all(pi.content().as_bytes())?;
            writer.write_all(b"?>")?;
        }

        Node::Document => return Err(XmlError::structure("Invalid node type")),
    }

    Ok(())
}

fn write_value(
    writer: &mut dyn std::io::Write,
    value: StrSpan<'_>,
    escape: TextEscape,
) -> XmlResult<()> {
    match escape {
        TextEscape::Verbatim => writer.write_all(value.as_bytes())?,
        TextEscape::Entities => writer.write_all(encode_entities(value.as_bytes())?.as_bytes())?,
    }
    Ok(())
}

fn encode_entities(input: &[u8]) -> XmlResult<String> {
    encode(input, &EncodeType::Named, &CharacterSet::SpecialChars)
        .to_string()
        .map_err(|e| XmlError::invalid_argument(format!("Failed to encode entities: {e}")))
}
