//! Syntax diagnostics reported by parsers through error nodes.

use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::{TextRange, TextSize};

/// A syntax error: the message of an error node and the range it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: Box<str>,
    range: TextRange,
}

impl Diagnostic {
    pub fn error(message: impl Into<Box<str>>, range: TextRange) -> Self {
        Self { message: message.into(), range }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Where the error is reported; the start of its range.
    pub fn offset(&self) -> TextSize {
        self.range.start()
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = Level::Error.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range.into()).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}
