//! Source location tags.
//!
//! A `SourceTag` is the `(file, line)` pair a binding remembers about where it
//! was captured, and that a frame reports as its current location.

use std::fmt;

use crate::{Name, StringLookup};

/// Source location tag.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub struct SourceTag {
    pub file: Name,
    pub line: u32,
}

impl SourceTag {
    /// Tag for code with no known origin.
    pub const UNKNOWN: SourceTag = SourceTag {
        file: Name::EMPTY,
        line: 0,
    };

    #[inline]
    pub const fn new(file: Name, line: u32) -> Self {
        SourceTag { file, line }
    }

    /// Check whether this tag carries a real location.
    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }

    /// Render as `file:line` using the given name resolver.
    pub fn display<'a, I: StringLookup + ?Sized>(self, interner: &'a I) -> SourceTagDisplay<'a, I> {
        SourceTagDisplay {
            tag: self,
            interner,
        }
    }
}

/// Display adapter returned by [`SourceTag::display`].
pub struct SourceTagDisplay<'a, I: ?Sized> {
    tag: SourceTag,
    interner: &'a I,
}

impl<I: StringLookup + ?Sized> fmt::Display for SourceTagDisplay<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tag.is_unknown() {
            return write!(f, "<unknown>");
        }
        write!(
            f,
            "{}:{}",
            self.interner.lookup(self.tag.file),
            self.tag.line
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StringInterner;

    #[test]
    fn test_display_known_tag() {
        let interner = StringInterner::new();
        let tag = SourceTag::new(interner.intern("(eval)"), 1);
        assert_eq!(tag.display(&interner).to_string(), "(eval):1");
    }

    #[test]
    fn test_display_unknown_tag() {
        let interner = StringInterner::new();
        assert!(SourceTag::default().is_unknown());
        assert_eq!(SourceTag::UNKNOWN.display(&interner).to_string(), "<unknown>");
    }
}
