use super::NodeId;
use crate::StrSpan;

/// A processing instruction node:
/// `<?target content?>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingInstructionNode<'d> {
    id: NodeId,
    target: StrSpan<'d>,
    content: StrSpan<'d>,
}
impl<'d> ProcessingInstructionNode<'d> {
    /// Create a new processing instruction node.
    pub(crate) fn new(id: NodeId, target: StrSpan<'d>, content: StrSpan<'d>) -> Self {
        Self {
            id,
            target,
            content,
        }
    }

    /// Returns the id of the node in its document.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the target of the processing instruction.
    #[must_use]
    pub fn target(&self) -> StrSpan<'d> {
        self.target
    }

    /// Returns the content of the processing instruction.
    /// Empty when the instruction closes straight after its target.
    #[must_use]
    pub fn content(&self) -> StrSpan<'d> {
        self.content
    }
}
