use std::fmt;

/// Type of a token or a node.
///
/// Kinds are plain numbers owned by the language that defines them. The
/// builder reserves [`SyntaxKind::ERROR`] for nodes closed with an error
/// message; everything else is up to the lexer and the parser.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SyntaxKind(u16);

/// Maps a kind to a human-readable name for debug output.
pub type KindNames = fn(SyntaxKind) -> &'static str;

impl SyntaxKind {
    /// Kind of every node completed through `error`/`error_before`.
    pub const ERROR: Self = Self(0);

    /// First raw value available to languages.
    pub const FIRST_CUSTOM: u16 = 1;

    #[inline]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ERROR { f.write_str("ERROR") } else { write!(f, "SyntaxKind({})", self.0) }
    }
}
