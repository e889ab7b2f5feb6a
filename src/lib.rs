//! An embeddable, in-place XML parser with an index-linked DOM.
//!
//! The parser rewrites the caller's buffer as it decodes entities and normalizes space, and every
//! string in the resulting tree is a span of that buffer. Nodes live in tables owned by the
//! [`Document`] and are freed all at once.
//!
//! ```rust
//! use xmlarena::{Document, ParseFlags};
//!
//! let mut buffer = br#"<shelf name="a&amp;b"><book>One</book><book>Two</book></shelf>"#.to_vec();
//! let mut doc = Document::new();
//! doc.parse(&mut buffer, ParseFlags::default()).unwrap();
//!
//! let shelf = doc.root_element().unwrap();
//! assert_eq!(shelf.get_attribute("name").unwrap(), "a&b");
//! assert_eq!(shelf.children().count(), 2);
//!
//! assert_eq!(doc.to_xml().unwrap(), r#"<shelf name="a&b"><book>One</book><book>Two</book></shelf>"#);
//! ```
//!
//! Implement [`Handler`] and drive a [`Parser`] directly to consume the events without building
//! a tree.
#![warn(missing_docs)]

mod arena;
pub use arena::*;

mod builder;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod flags;
pub use flags::*;

mod handler;
pub use handler::*;

mod list;

mod node;
pub use node::*;

mod parser;
pub use parser::*;

mod strspan;
pub use strspan::*;

mod to_xml;
pub use to_xml::TextEscape;
