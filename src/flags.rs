use bitflags::bitflags;

bitflags! {
    /// Parser behaviour switches, combinable with bitwise OR:
    /// `ParseFlags::TRIM_SPACE | ParseFlags::NORMALIZE_SPACE`
    ///
    /// [`ParseFlags::empty()`] turns every option off.
    /// The default is `TRIM_SPACE | ENTITY_TRANSLATION`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParseFlags: u32 {
        /// Skip whitespace before text runs and trim it from their end.
        const TRIM_SPACE = 1 << 0;

        /// Collapse each run of whitespace inside text to a single space.
        const NORMALIZE_SPACE = 1 << 1;

        /// Decode entity and character references in text and attribute values.
        const ENTITY_TRANSLATION = 1 << 2;

        /// Accept any well-formed closing tag name instead of requiring it to match the
        /// opening tag.
        const CLOSING_TAG_VALIDATE = 1 << 3;
    }
}

impl Default for ParseFlags {
    fn default() -> Self {
        Self::TRIM_SPACE | Self::ENTITY_TRANSLATION
    }
}
