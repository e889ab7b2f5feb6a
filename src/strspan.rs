use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A span of bytes in a buffer the span does not own.
///
/// Spans produced by the parser point into the caller's input buffer, after entity
/// decoding and space normalization have been applied in place.
///
/// Equality, ordering and hashing consider the bytes only; two spans at different
/// offsets with the same content are equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrSpan<'a> {
    /// The bytes of the span.
    pub bytes: &'a [u8],

    /// The start position of the span in its buffer.
    pub start: usize,
}
impl<'a> StrSpan<'a> {
    /// Create a new span over `bytes`, which begin `start` bytes into their buffer.
    #[must_use]
    pub fn new(bytes: &'a [u8], start: usize) -> Self {
        Self { bytes, start }
    }

    /// Create a span over a NUL-terminated buffer.
    /// The span ends at the first NUL byte, or at the end of the slice if there is none.
    #[must_use]
    pub fn from_nul_terminated(bytes: &'a [u8]) -> Self {
        let len = memchr::memchr(0, bytes).unwrap_or(bytes.len());
        Self {
            bytes: &bytes[..len],
            start: 0,
        }
    }

    /// Returns the length of the span.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Return true if len == 0
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the start position of the span in its buffer.
    #[inline]
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the raw bytes of the span.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns this span as a string slice.
    ///
    /// # Errors
    /// Returns an error if the bytes are not valid UTF-8.
    pub fn to_str(&self) -> Result<&'a str, std::str::Utf8Error> {
        std::str::from_utf8(self.bytes)
    }

    /// Returns this span as a string, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn to_string_lossy(&self) -> std::borrow::Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }

    /// Iterates over the raw bytes of the span.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'a, u8>> {
        self.bytes.iter().copied()
    }

    /// Concatenates two spans into a new owned span.
    /// The result starts where `self` starts.
    #[must_use]
    pub fn concat(&self, other: &StrSpan<'_>) -> StringSpan {
        let mut bytes = Vec::with_capacity(self.len() + other.len());
        bytes.extend_from_slice(self.bytes);
        bytes.extend_from_slice(other.bytes);
        StringSpan::new(bytes, self.start)
    }

    /// Calculates the row and column of the span in the buffer.
    ///
    /// Warning: This is an expensive operation, and should be used for error reporting only.
    #[must_use]
    pub fn position(&self, source: &[u8]) -> (usize, usize) {
        Self::position_in_bytes(self.start, source)
    }

    /// Row and column are 1-based; columns count bytes.
    pub(crate) fn position_in_bytes(start: usize, source: &[u8]) -> (usize, usize) {
        let start = start.min(source.len());
        let before = &source[..start];
        let row = memchr::memchr_iter(b'\n', before).count() + 1;
        let line_start = memchr::memrchr(b'\n', before).map_or(0, |i| i + 1);
        (row, start - line_start + 1)
    }
}

impl<'a> From<&'a str> for StrSpan<'a> {
    #[inline]
    fn from(text: &'a str) -> Self {
        StrSpan::new(text.as_bytes(), 0)
    }
}
impl<'a> From<&'a [u8]> for StrSpan<'a> {
    #[inline]
    fn from(bytes: &'a [u8]) -> Self {
        StrSpan::new(bytes, 0)
    }
}
impl AsRef<[u8]> for StrSpan<'_> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}
impl<'a> IntoIterator for StrSpan<'a> {
    type Item = u8;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.bytes.iter().copied()
    }
}
impl std::fmt::Display for StrSpan<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_lossy())
    }
}

impl PartialEq for StrSpan<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}
impl Eq for StrSpan<'_> {}
impl PartialOrd for StrSpan<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for StrSpan<'_> {
    // Slice ordering is byte-wise, with the shorter span first on a common prefix
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(other.bytes)
    }
}
impl Hash for StrSpan<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}
impl PartialEq<str> for StrSpan<'_> {
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}
impl PartialEq<&str> for StrSpan<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}
impl PartialEq<[u8]> for StrSpan<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}
impl PartialEq<StrSpan<'_>> for str {
    fn eq(&self, other: &StrSpan<'_>) -> bool {
        self.as_bytes() == other.bytes
    }
}
impl PartialEq<StrSpan<'_>> for &str {
    fn eq(&self, other: &StrSpan<'_>) -> bool {
        self.as_bytes() == other.bytes
    }
}

/// Owned variant of `StrSpan`, backed by a growable buffer.
#[derive(Debug, Clone, Default)]
pub struct StringSpan {
    /// The bytes of the span.
    pub bytes: Vec<u8>,

    /// The start position of the span in its original buffer.
    pub start: usize,
}
impl StringSpan {
    /// Create a new owned span
    #[must_use]
    pub fn new(bytes: Vec<u8>, start: usize) -> Self {
        StringSpan { bytes, start }
    }

    /// Returns the length of the span.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Return true if len == 0
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the start position of the span in its original buffer.
    #[inline]
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Borrows this span as a `StrSpan`.
    #[must_use]
    pub fn as_span(&self) -> StrSpan<'_> {
        StrSpan::new(&self.bytes, self.start)
    }

    /// Appends the bytes of `other` to this span.
    pub fn push_span(&mut self, other: &StrSpan<'_>) {
        self.bytes.extend_from_slice(other.bytes);
    }

    /// Returns this span as a string slice.
    ///
    /// # Errors
    /// Returns an error if the bytes are not valid UTF-8.
    pub fn to_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.bytes)
    }
}
impl From<StrSpan<'_>> for StringSpan {
    #[inline]
    fn from(span: StrSpan<'_>) -> StringSpan {
        StringSpan::new(span.bytes.to_vec(), span.start)
    }
}
impl AsRef<[u8]> for StringSpan {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
impl std::fmt::Display for StringSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_span())
    }
}
impl PartialEq for StringSpan {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}
impl Eq for StringSpan {}
impl PartialEq<str> for StringSpan {
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}
impl PartialEq<&str> for StringSpan {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strspan_from_nul_terminated() {
        let buffer = b"example\0trailing";
        let span = StrSpan::from_nul_terminated(buffer);
        assert_eq!(span, "example");
        assert_eq!(span.start(), 0);

        let unterminated = StrSpan::from_nul_terminated(b"abc");
        assert_eq!(unterminated.len(), 3);
    }

    #[test]
    fn test_strspan_ordering() {
        let a = StrSpan::from("abc");
        let b = StrSpan::from("abd");
        let prefix = StrSpan::from("ab");

        assert!(a < b);
        assert!(b > a);
        assert!(prefix < a);
        assert!(a >= prefix);
        assert!(a <= a);
        assert_ne!(a, b);
    }

    #[test]
    fn test_strspan_ordering_is_unsigned() {
        let high = StrSpan::new(&[0xC3, 0xA9], 0);
        let low = StrSpan::from("z");
        assert!(low < high);
    }

    #[test]
    fn test_strspan_eq_ignores_start() {
        let src = b"abab";
        let first = StrSpan::new(&src[0..2], 0);
        let second = StrSpan::new(&src[2..4], 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_strspan_concat() {
        let head = StrSpan::new(b"hello, ", 4);
        let tail = StrSpan::from("a considerably longer tail that outgrows any fixed scratch space");
        let joined = head.concat(&tail);
        assert_eq!(joined.start(), 4);
        assert_eq!(joined.len(), head.len() + tail.len());
        assert_eq!(
            joined.to_str().unwrap(),
            "hello, a considerably longer tail that outgrows any fixed scratch space"
        );
    }

    #[test]
    fn test_strspan_iter() {
        let span = StrSpan::from("xyz");
        let collected: Vec<u8> = span.iter().collect();
        assert_eq!(collected, b"xyz");
        assert_eq!(span.into_iter().rev().next(), Some(b'z'));
    }

    #[test]
    fn test_strspan_position() {
        let source = b"line1\nline2\nline3";
        let span = StrSpan::new(&source[6..11], 6);
        assert_eq!(span.position(source), (2, 1));

        let span = StrSpan::new(&source[14..15], 14);
        assert_eq!(span.position(source), (3, 3));
    }

    #[test]
    fn test_strspan_is_empty() {
        assert!(StrSpan::default().is_empty());
        assert!(!StrSpan::from("text").is_empty());
    }

    #[test]
    fn test_strspan_lossy_display() {
        let span = StrSpan::new(&[b'a', 0xFF, b'b'], 0);
        assert!(span.to_str().is_err());
        assert_eq!(span.to_string(), "a\u{FFFD}b");
    }

    #[test]
    fn test_string_span_push() {
        let mut owned = StringSpan::from(StrSpan::new(b"abc", 3));
        owned.push_span(&StrSpan::from("def"));
        assert_eq!(owned, "abcdef");
        assert_eq!(owned.start(), 3);
        assert_eq!(owned.as_span(), "abcdef");
        assert!(!owned.is_empty());
    }
}
