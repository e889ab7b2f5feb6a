//! Error handling for parsing and manipulating documents
use crate::StrSpan;

/// A result type for this crate, which can be either a successful value or an error.
pub type XmlResult<T> = std::result::Result<T, XmlError>;

/// An error that occurred while parsing, editing or printing a document.
#[derive(Debug)]
pub struct XmlError {
    /// The context of the error
    pub context: Box<ErrorContext>,

    /// The kind of error that occurred
    pub kind: XmlErrorKind,
}
impl XmlError {
    /// Creates a new `XmlError`
    #[must_use]
    pub fn new(kind: XmlErrorKind, context: ErrorContext) -> Self {
        Self {
            context: Box::new(context),
            kind,
        }
    }

    /// Creates a parse failure at `offset` bytes into `source`.
    #[must_use]
    pub fn parse(source: &[u8], offset: usize, message: impl Into<String>) -> Self {
        Self::new(
            XmlErrorKind::Parse(message.into()),
            ErrorContext::new(source, offset),
        )
    }

    /// Creates an error for bad caller input.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(
            XmlErrorKind::InvalidArgument(message.into()),
            ErrorContext::default(),
        )
    }

    /// Creates an error for a tree-shape violation.
    #[must_use]
    pub fn structure(message: impl Into<String>) -> Self {
        Self::new(
            XmlErrorKind::Structure(message.into()),
            ErrorContext::default(),
        )
    }

    /// Creates an error for an allocation the arena could not satisfy.
    #[must_use]
    pub fn out_of_memory(requested: usize) -> Self {
        Self::new(
            XmlErrorKind::OutOfMemory { requested },
            ErrorContext::default(),
        )
    }

    /// Returns the byte offset of the error relative to the start of the parsed buffer,
    /// if the error is tied to a position in the source.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        self.context.position.map(|_| self.context.offset)
    }
}
impl std::fmt::Display for XmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.context)?;

        for line in self.kind.to_string().lines() {
            writeln!(f, "= {line}")?;
        }
        Ok(())
    }
}
impl std::error::Error for XmlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
impl From<std::io::Error> for XmlError {
    fn from(err: std::io::Error) -> Self {
        Self::new(XmlErrorKind::Io(err), ErrorContext::default())
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum XmlErrorKind {
    /// The caller passed an argument the operation cannot accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The arena could not obtain memory for a new block
    #[error("Out of memory: could not allocate {requested} bytes")]
    OutOfMemory {
        /// The size of the failed request, in bytes
        requested: usize,
    },

    /// IO error occurred while writing to a sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not well-formed; parsing was aborted
    #[error("Parse error: {0}")]
    Parse(String),

    /// The tree does not have the shape an operation requires
    #[error("Invalid document structure: {0}")]
    Structure(String),
}

/// Context describing the error location in the parsed buffer.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Byte offset of the error, relative to the start of the buffer.
    pub offset: usize,

    /// The 1-based row and column of the error.
    /// `None` if the error is not tied to a source position.
    pub position: Option<(usize, usize)>,

    /// The line of source containing the error.
    pub line: String,
}
impl ErrorContext {
    /// Creates a new `ErrorContext` for the given offset into the source.
    #[must_use]
    pub fn new(source: &[u8], offset: usize) -> Self {
        let offset = offset.min(source.len());
        let line_start = memchr::memrchr(b'\n', &source[..offset]).map_or(0, |i| i + 1);
        let line_end = memchr::memchr(b'\n', &source[offset..]).map_or(source.len(), |i| offset + i);

        Self {
            offset,
            position: Some(StrSpan::position_in_bytes(offset, source)),
            line: String::from_utf8_lossy(&source[line_start..line_end])
                .trim_end_matches('\r')
                .to_string(),
        }
    }

    /// Returns the row and column of the error in the source code.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        self.position
    }
}
impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.line.is_empty() {
            writeln!(f, "| {}", self.line)?;
        }

        if let Some((row, col)) = self.position {
            writeln!(f, "= At {row}:{col}")?;
        }
        Ok(())
    }
}
