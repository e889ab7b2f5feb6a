//! The callbacks a [`crate::Parser`] drives while it scans a document.
use crate::{StrSpan, error::XmlResult};

/// Receives the structural events of a document, in document order.
///
/// Every method has a no-op default, so an implementation only overrides the events it needs.
/// Spans borrow the parser's buffer for the duration of the call; use [`StrSpan::start`] and
/// [`StrSpan::len`] to refer back to the bytes later, since decoding never moves a span once
/// it has been reported.
///
/// Returning an error aborts the parse and surfaces the error to the caller.
///
/// A self-closing element reports `start_element`, its attributes and `end_attributes(true)`,
/// with no `end_element`.
pub trait Handler {
    /// Called once before any other event.
    fn start_document(&mut self) -> XmlResult<()> {
        Ok(())
    }

    /// The `<?xml ...?>` declaration, if the document has one.
    fn declaration(
        &mut self,
        _version: StrSpan<'_>,
        _encoding: Option<StrSpan<'_>>,
        _standalone: Option<StrSpan<'_>>,
    ) -> XmlResult<()> {
        Ok(())
    }

    /// An opening tag; its attributes follow.
    fn start_element(&mut self, _name: StrSpan<'_>) -> XmlResult<()> {
        Ok(())
    }

    /// One `name="value"` pair of the current element.
    fn attribute(&mut self, _name: StrSpan<'_>, _value: StrSpan<'_>) -> XmlResult<()> {
        Ok(())
    }

    /// The opening tag is complete. `self_closing` is true for `<name/>`.
    fn end_attributes(&mut self, _self_closing: bool) -> XmlResult<()> {
        Ok(())
    }

    /// A run of character data.
    fn text(&mut self, _value: StrSpan<'_>) -> XmlResult<()> {
        Ok(())
    }

    /// The content of a CDATA section.
    fn cdata(&mut self, _value: StrSpan<'_>) -> XmlResult<()> {
        Ok(())
    }

    /// The content of a comment.
    fn comment(&mut self, _value: StrSpan<'_>) -> XmlResult<()> {
        Ok(())
    }

    /// A processing instruction other than the XML declaration.
    fn processing_instruction(
        &mut self,
        _target: StrSpan<'_>,
        _content: StrSpan<'_>,
    ) -> XmlResult<()> {
        Ok(())
    }

    /// A closing tag, carrying the name as written in the tag.
    fn end_element(&mut self, _name: StrSpan<'_>) -> XmlResult<()> {
        Ok(())
    }

    /// Called once after the last construct.
    fn end_document(&mut self) -> XmlResult<()> {
        Ok(())
    }
}
