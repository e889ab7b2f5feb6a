//! Wires parser events into a [`Document`] tree.
use crate::{
    Document, Handler, StrSpan,
    document::DeclarationRecord,
    error::XmlResult,
    list::SiblingList,
    node::{NodeData, NodeId, TextRef},
};

/// Builds the node tree of a document while it is being parsed.
///
/// Spans are stored as offsets into the parsed buffer; the document attaches the buffer once
/// the parse has succeeded.
pub(crate) struct DomBuilder<'a, 'buf> {
    document: &'a mut Document<'buf>,
    cursor: NodeId,
}
impl<'a, 'buf> DomBuilder<'a, 'buf> {
    pub fn new(document: &'a mut Document<'buf>) -> Self {
        Self {
            document,
            cursor: NodeId::DOCUMENT,
        }
    }

    fn push_leaf(&mut self, data: NodeData) -> XmlResult<()> {
        let id = self.document.push_node(data)?;
        self.document.link_child(self.cursor, id);
        Ok(())
    }

    fn ascend(&mut self) {
        self.cursor = self
            .document
            .parent(self.cursor)
            .unwrap_or(NodeId::DOCUMENT);
    }
}

impl Handler for DomBuilder<'_, '_> {
    fn start_document(&mut self) -> XmlResult<()> {
        self.cursor = NodeId::DOCUMENT;
        Ok(())
    }

    fn declaration(
        &mut self,
        version: StrSpan<'_>,
        encoding: Option<StrSpan<'_>>,
        standalone: Option<StrSpan<'_>>,
    ) -> XmlResult<()> {
        self.document.declaration = Some(DeclarationRecord {
            version: TextRef::source(&version),
            encoding: encoding.as_ref().map(TextRef::source),
            standalone: standalone.as_ref().map(TextRef::source),
        });
        Ok(())
    }

    fn start_element(&mut self, name: StrSpan<'_>) -> XmlResult<()> {
        let id = self.document.push_node(NodeData::Element {
            name: TextRef::source(&name),
            attributes: SiblingList::default(),
        })?;
        self.document.link_child(self.cursor, id);
        self.cursor = id;
        Ok(())
    }

    fn attribute(&mut self, name: StrSpan<'_>, value: StrSpan<'_>) -> XmlResult<()> {
        let id = self
            .document
            .push_attribute(TextRef::source(&name), TextRef::source(&value))?;
        self.document.link_attribute(self.cursor, id);
        Ok(())
    }

    fn end_attributes(&mut self, self_closing: bool) -> XmlResult<()> {
        if self_closing {
            self.ascend();
        }
        Ok(())
    }

    fn text(&mut self, value: StrSpan<'_>) -> XmlResult<()> {
        self.push_leaf(NodeData::Text(TextRef::source(&value)))
    }

    fn cdata(&mut self, value: StrSpan<'_>) -> XmlResult<()> {
        self.push_leaf(NodeData::Cdata(TextRef::source(&value)))
    }

    fn comment(&mut self, value: StrSpan<'_>) -> XmlResult<()> {
        self.push_leaf(NodeData::Comment(TextRef::source(&value)))
    }

    fn processing_instruction(
        &mut self,
        target: StrSpan<'_>,
        content: StrSpan<'_>,
    ) -> XmlResult<()> {
        self.push_leaf(NodeData::ProcessingInstruction {
            target: TextRef::source(&target),
            content: TextRef::source(&content),
        })
    }

    fn end_element(&mut self, _name: StrSpan<'_>) -> XmlResult<()> {
        self.ascend();
        Ok(())
    }
}
