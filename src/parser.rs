//! In-place XML scanner
//!
//! The parser walks a single mutable buffer and reports what it finds to a [`Handler`].
//! Entity decoding and space normalization are done in place: a write cursor trails the read
//! cursor and overwrites the bytes of the run being scanned, so a reported span is always a
//! shortened prefix of the source run it came from and the buffer never grows.
//!
//! Element nesting is tracked with an explicit stack of open names, so depth is limited by
//! memory rather than by the call stack.
use crate::{
    Handler, ParseFlags, StrSpan,
    error::{XmlError, XmlResult},
};
use memchr::memmem;

/// Returns early with a parse error at the given offset
macro_rules! bail {
    ($parser:expr, $offset:expr, $msg:expr) => {
        return Err($parser.error($offset, $msg))
    };
}

const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

const NAMED_ENTITIES: [(&[u8], u8); 5] = [
    (b"amp;", b'&'),
    (b"apos;", b'\''),
    (b"gt;", b'>'),
    (b"lt;", b'<'),
    (b"quot;", b'"'),
];

#[inline]
fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
fn is_name_end(c: u8) -> bool {
    is_space(c) || matches!(c, b'/' | b'>' | b'?')
}

#[inline]
fn is_attribute_name_end(c: u8) -> bool {
    is_space(c) || matches!(c, b'!' | b'/' | b'<' | b'=' | b'>' | b'?')
}

/// Byte range of a finished run in the buffer.
#[derive(Debug, Clone, Copy)]
struct Range {
    start: usize,
    len: usize,
}

/// A single-use scanner over a mutable, NUL-terminated buffer.
///
/// The input ends at the first NUL byte, or at the end of the slice if there is none.
///
/// # Example
/// ```rust
/// use xmlarena::{Handler, ParseFlags, Parser, StrSpan, XmlResult};
///
/// #[derive(Default)]
/// struct CountElements(usize);
/// impl Handler for CountElements {
///     fn start_element(&mut self, _name: StrSpan<'_>) -> XmlResult<()> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
///
/// let mut buffer = b"<a><b/><c>text</c></a>".to_vec();
/// let mut counter = CountElements::default();
/// Parser::new(&mut buffer, ParseFlags::default()).parse(&mut counter).unwrap();
/// assert_eq!(counter.0, 3);
/// ```
pub struct Parser<'b> {
    buf: &'b mut [u8],
    end: usize,
    pos: usize,
    flags: ParseFlags,
}
impl<'b> Parser<'b> {
    /// Creates a parser over `buffer`, which it will rewrite as it decodes.
    pub fn new(buffer: &'b mut [u8], flags: ParseFlags) -> Self {
        let end = memchr::memchr(0, buffer).unwrap_or(buffer.len());
        Self {
            buf: buffer,
            end,
            pos: 0,
            flags,
        }
    }

    /// Scans the whole buffer, reporting every construct to `handler`.
    ///
    /// # Errors
    /// Returns a parse error carrying the byte offset of the first malformed construct,
    /// or the first error returned by the handler. Nothing is recovered after an error.
    pub fn parse<H: Handler + ?Sized>(mut self, handler: &mut H) -> XmlResult<()> {
        handler.start_document()?;

        if self.starts_with(BOM) {
            self.pos += BOM.len();
        }

        if self.starts_with(b"<?xml") && is_space(self.peek_at(5)) {
            self.pos += 6;
            self.parse_declaration(handler)?;
        }

        loop {
            self.skip_space();
            if self.at_end() {
                break;
            }

            if self.peek() != b'<' {
                bail!(self, self.pos, "Expected <");
            }
            self.pos += 1;

            match self.peek() {
                b'!' => {
                    self.pos += 1;
                    if self.starts_with(b"--") {
                        self.pos += 2;
                        self.parse_comment(handler)?;
                    } else if self.starts_with(b"DOCTYPE") {
                        bail!(self, self.pos, "DOCTYPE declarations are not supported");
                    } else {
                        bail!(self, self.pos, "Unexpected character");
                    }
                }

                b'?' => {
                    self.pos += 1;
                    self.parse_processing_instruction(handler)?;
                }

                _ => self.parse_element(handler)?,
            }
        }

        handler.end_document()
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> XmlError {
        XmlError::parse(&self.buf[..self.end], offset, message)
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.end
    }

    #[inline]
    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    /// Returns 0 past the end of input.
    #[inline]
    fn peek_at(&self, offset: usize) -> u8 {
        let i = self.pos + offset;
        if i < self.end { self.buf[i] } else { 0 }
    }

    fn starts_with(&self, literal: &[u8]) -> bool {
        self.buf[self.pos.min(self.end)..self.end].starts_with(literal)
    }

    fn skip_space(&mut self) -> usize {
        self.skip_while(is_space)
    }

    /// Advances while `keep` holds, stopping at the end of input. Returns the bytes skipped.
    fn skip_while(&mut self, keep: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while self.pos < self.end && keep(self.buf[self.pos]) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn find(&self, needle: &[u8]) -> Option<usize> {
        let from = self.pos.min(self.end);
        memmem::find(&self.buf[from..self.end], needle).map(|i| from + i)
    }

    fn span(&self, range: Range) -> StrSpan<'_> {
        StrSpan::new(&self.buf[range.start..range.start + range.len], range.start)
    }

    //
    // Prolog constructs
    //

    fn parse_declaration<H: Handler + ?Sized>(&mut self, handler: &mut H) -> XmlResult<()> {
        self.skip_space();

        if !self.starts_with(b"version") {
            bail!(self, self.pos, "Expected version");
        }
        self.pos += 7;
        let version = self.parse_declaration_value()?;
        self.expect_declaration_separator()?;

        let mut encoding = None;
        if self.starts_with(b"encoding") {
            self.pos += 8;
            encoding = Some(self.parse_declaration_value()?);
            self.expect_declaration_separator()?;
        }

        let mut standalone = None;
        if self.starts_with(b"standalone") {
            self.pos += 10;
            standalone = Some(self.parse_declaration_value()?);
        }

        self.skip_space();
        if !self.starts_with(b"?>") {
            bail!(self, self.pos, "Expected ?>");
        }
        self.pos += 2;

        handler.declaration(
            self.span(version),
            encoding.map(|r| self.span(r)),
            standalone.map(|r| self.span(r)),
        )
    }

    /// `= "value"` or `= 'value'`, with optional space around the `=`.
    fn parse_declaration_value(&mut self) -> XmlResult<Range> {
        self.skip_space();
        if self.peek() != b'=' {
            bail!(self, self.pos, "Expected =");
        }
        self.pos += 1;
        self.skip_space();

        let quote = self.peek();
        if quote != b'"' && quote != b'\'' {
            bail!(self, self.pos, "Expected \" or '");
        }
        self.pos += 1;

        let start = self.pos;
        let len = self.skip_while(|c| c != quote);
        if self.at_end() {
            bail!(self, self.pos, format!("Expected {}", char::from(quote)));
        }
        self.pos += 1;

        Ok(Range { start, len })
    }

    fn expect_declaration_separator(&mut self) -> XmlResult<()> {
        if self.at_end() {
            bail!(self, self.pos, "Unexpected end of data");
        }
        if self.peek() != b'?' && !is_space(self.peek()) {
            bail!(self, self.pos, "Unexpected character");
        }
        self.skip_space();
        Ok(())
    }

    //
    // Markup shared by the prolog and element bodies
    //

    fn parse_comment<H: Handler + ?Sized>(&mut self, handler: &mut H) -> XmlResult<()> {
        let start = self.pos;
        let Some(end) = self.find(b"-->") else {
            bail!(self, self.end, "Unexpected end of data");
        };
        self.pos = end + 3;

        handler.comment(self.span(Range {
            start,
            len: end - start,
        }))
    }

    fn parse_cdata<H: Handler + ?Sized>(&mut self, handler: &mut H) -> XmlResult<()> {
        let start = self.pos;
        let Some(end) = self.find(b"]]>") else {
            bail!(self, self.end, "Unexpected end of data");
        };
        self.pos = end + 3;

        handler.cdata(self.span(Range {
            start,
            len: end - start,
        }))
    }

    fn parse_processing_instruction<H: Handler + ?Sized>(
        &mut self,
        handler: &mut H,
    ) -> XmlResult<()> {
        let target_start = self.pos;
        let target_len = self.skip_while(|c| !is_name_end(c));
        if target_len == 0 {
            bail!(self, self.pos, "Expected PI target");
        }
        if self.at_end() {
            bail!(self, self.pos, "Unexpected end of data");
        }
        if !self.starts_with(b"?>") && self.skip_space() == 0 {
            bail!(self, self.pos, "Expected white space");
        }

        let start = self.pos;
        let Some(end) = self.find(b"?>") else {
            bail!(self, self.end, "Unexpected end of data");
        };
        self.pos = end + 2;

        handler.processing_instruction(
            self.span(Range {
                start: target_start,
                len: target_len,
            }),
            self.span(Range {
                start,
                len: end - start,
            }),
        )
    }

    //
    // Elements
    //

    /// Parses an element and everything inside it. The cursor is just past the opening `<`.
    fn parse_element<H: Handler + ?Sized>(&mut self, handler: &mut H) -> XmlResult<()> {
        let mut open: Vec<Range> = Vec::new();
        if let Some(name) = self.parse_start_tag(handler)? {
            open.push(name);
        }

        while let Some(&name) = open.last() {
            if self.flags.contains(ParseFlags::TRIM_SPACE) {
                self.skip_space();
            }
            if self.peek() != b'<' {
                // Leaves the cursor on the next '<', or fails at the end of input
                self.parse_text(handler)?;
            }
            self.pos += 1;

            match self.peek() {
                b'!' => {
                    self.pos += 1;
                    if self.starts_with(b"--") {
                        self.pos += 2;
                        self.parse_comment(handler)?;
                    } else if self.starts_with(b"[CDATA[") {
                        self.pos += 7;
                        self.parse_cdata(handler)?;
                    } else {
                        bail!(self, self.pos, "Unexpected character");
                    }
                }

                b'/' => {
                    self.pos += 1;
                    self.parse_end_tag(name, handler)?;
                    open.pop();
                }

                b'?' => {
                    self.pos += 1;
                    self.parse_processing_instruction(handler)?;
                }

                _ => {
                    if let Some(child) = self.parse_start_tag(handler)? {
                        open.push(child);
                    }
                }
            }
        }

        Ok(())
    }

    /// Parses a start tag and its attributes.
    /// Returns the element name, or `None` if the element closed itself.
    fn parse_start_tag<H: Handler + ?Sized>(&mut self, handler: &mut H) -> XmlResult<Option<Range>> {
        let start = self.pos;
        let len = self.skip_while(|c| !is_name_end(c));
        if len == 0 {
            bail!(self, self.pos, "Expected element type");
        }
        let name = Range { start, len };

        let self_closing = match self.peek() {
            b'>' => {
                self.pos += 1;
                handler.start_element(self.span(name))?;
                false
            }

            b'/' => {
                if self.peek_at(1) != b'>' {
                    bail!(self, self.pos + 1, "Expected >");
                }
                self.pos += 2;
                handler.start_element(self.span(name))?;
                true
            }

            c if is_space(c) => {
                self.pos += 1;
                handler.start_element(self.span(name))?;
                self.parse_attributes(handler)?
            }

            _ if self.at_end() => bail!(self, self.pos, "Unexpected end of data"),
            _ => bail!(self, self.pos, "Unexpected character"),
        };

        handler.end_attributes(self_closing)?;
        Ok((!self_closing).then_some(name))
    }

    /// Parses `name="value"` pairs up to the end of the start tag.
    /// Returns true if the tag was closed with `/>`.
    fn parse_attributes<H: Handler + ?Sized>(&mut self, handler: &mut H) -> XmlResult<bool> {
        let entities = self.flags.contains(ParseFlags::ENTITY_TRANSLATION);

        self.skip_space();
        while !self.at_end() && !is_attribute_name_end(self.peek()) {
            let start = self.pos;
            let len = self.skip_while(|c| !is_attribute_name_end(c));
            let name = Range { start, len };

            self.skip_space();
            if self.peek() != b'=' {
                bail!(self, self.pos, "Expected =");
            }
            self.pos += 1;
            self.skip_space();

            let quote = self.peek();
            if quote != b'"' && quote != b'\'' {
                bail!(self, self.pos, "Expected \" or '");
            }
            self.pos += 1;

            let value = self.scan_run(quote, entities, false)?;
            self.pos += 1;

            handler.attribute(self.span(name), self.span(value))?;
            self.skip_space();
        }

        match self.peek() {
            b'>' => {
                self.pos += 1;
                Ok(false)
            }

            b'/' => {
                if self.peek_at(1) != b'>' {
                    bail!(self, self.pos + 1, "Expected >");
                }
                self.pos += 2;
                Ok(true)
            }

            _ if self.at_end() => bail!(self, self.pos, "Unexpected end of data"),
            _ => bail!(self, self.pos, "Unexpected character"),
        }
    }

    /// Parses a closing tag. The cursor is just past the `</`.
    ///
    /// Unless `CLOSING_TAG_VALIDATE` is set, the tag must repeat the opening name exactly;
    /// with it set, any name is consumed without comparison.
    fn parse_end_tag<H: Handler + ?Sized>(&mut self, open: Range, handler: &mut H) -> XmlResult<()> {
        let start = self.pos;
        let len = if self.flags.contains(ParseFlags::CLOSING_TAG_VALIDATE) {
            self.skip_while(|c| !is_name_end(c))
        } else {
            let opening = &self.buf[open.start..open.start + open.len];
            if !self.buf[start..self.end].starts_with(opening) {
                bail!(self, start, "Unmatched element type");
            }
            self.pos += open.len;
            open.len
        };

        self.skip_space();
        if self.peek() != b'>' {
            bail!(self, self.pos, "Expected >");
        }
        self.pos += 1;

        handler.end_element(self.span(Range { start, len }))
    }

    //
    // Character data
    //

    fn parse_text<H: Handler + ?Sized>(&mut self, handler: &mut H) -> XmlResult<()> {
        let entities = self.flags.contains(ParseFlags::ENTITY_TRANSLATION);
        let normalize = self.flags.contains(ParseFlags::NORMALIZE_SPACE);

        let mut text = self.scan_run(b'<', entities, normalize)?;

        if self.flags.contains(ParseFlags::TRIM_SPACE) {
            let last = |text: &Range| self.buf[text.start + text.len - 1];
            if entities && normalize {
                // Collapsing leaves at most one trailing space
                if text.len > 0 && last(&text) == b' ' {
                    text.len -= 1;
                }
            } else {
                while text.len > 0 && is_space(last(&text)) {
                    text.len -= 1;
                }
            }
        }

        handler.text(self.span(text))
    }

    /// Scans up to (not including) the next `stop` byte, decoding references and collapsing
    /// whitespace into the front of the run as requested. The cursor is left on `stop`.
    fn scan_run(&mut self, stop: u8, entities: bool, normalize: bool) -> XmlResult<Range> {
        let start = self.pos;
        let mut write = self.pos;

        loop {
            let run = self.pos;
            self.skip_while(|c| {
                c != stop && !(entities && c == b'&') && !(normalize && is_space(c))
            });
            if self.at_end() {
                bail!(self, self.pos, "Unexpected end of data");
            }

            if write != run {
                self.buf.copy_within(run..self.pos, write);
            }
            write += self.pos - run;

            match self.buf[self.pos] {
                c if c == stop => break,
                b'&' => write = self.decode_reference(write)?,
                _ => {
                    self.skip_space();
                    self.buf[write] = b' ';
                    write += 1;
                }
            }
        }

        Ok(Range {
            start,
            len: write - start,
        })
    }

    /// Decodes the reference under the cursor into `write`.
    /// Returns the write position after the decoded bytes.
    fn decode_reference(&mut self, write: usize) -> XmlResult<usize> {
        let amp = self.pos;
        if amp + 1 >= self.end {
            bail!(self, amp, "Unexpected end of data");
        }

        if self.peek_at(1) == b'#' {
            return self.decode_character_reference(write);
        }

        let rest = &self.buf[amp + 1..self.end];
        let Some(&(name, value)) = NAMED_ENTITIES.iter().find(|(name, _)| rest.starts_with(name))
        else {
            bail!(self, amp, "Invalid reference");
        };

        self.pos += 1 + name.len();
        self.buf[write] = value;
        Ok(write + 1)
    }

    /// `&#DDDD;` or `&#xHHHH;`, written back as UTF-8.
    fn decode_character_reference(&mut self, write: usize) -> XmlResult<usize> {
        let amp = self.pos;
        let radix = if self.peek_at(2) == b'x' {
            self.pos += 3;
            16
        } else {
            self.pos += 2;
            10
        };

        if self.peek() == b';' {
            bail!(self, self.pos, "Unexpected ;");
        }

        let mut code: u32 = 0;
        while let Some(digit) = char::from(self.peek()).to_digit(radix) {
            code = match code.checked_mul(radix).and_then(|c| c.checked_add(digit)) {
                Some(code) => code,
                None => bail!(self, amp, "Character reference out of range"),
            };
            self.pos += 1;
        }

        if self.peek() != b';' {
            bail!(self, self.pos, "Expected ;");
        }
        self.pos += 1;

        let Some(c) = char::from_u32(code).filter(|&c| c != '\0') else {
            bail!(self, amp, "Invalid character reference");
        };

        // The reference text is never shorter than its UTF-8 encoding
        let mut utf8 = [0; 4];
        let encoded = c.encode_utf8(&mut utf8).as_bytes();
        debug_assert!(write + encoded.len() <= self.pos);
        self.buf[write..write + encoded.len()].copy_from_slice(encoded);

        Ok(write + encoded.len())
    }
}
