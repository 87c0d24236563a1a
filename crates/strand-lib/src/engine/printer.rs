//! Builder-pattern printer for rendering translation errors.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use super::error::ParseError;

/// Builder for rendering a [`ParseError`] against its input.
pub struct ErrorPrinter<'e, 's> {
    error: &'e ParseError,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'e, 's> ErrorPrinter<'e, 's> {
    pub fn new(error: &'e ParseError) -> Self {
        Self {
            error,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let (Some(source), Some(mismatch)) = (self.source, self.error.as_mismatch()) else {
            return write!(w, "{}", self.error);
        };

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let range = adjust_range(source, mismatch.position);
        let label = mismatch.describe();
        let mut snippet = Snippet::source(source)
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(range).label(&label));

        if let Some(p) = self.path {
            snippet = snippet.path(p);
        }

        let title = mismatch.kind.to_string();
        let report: Vec<Group> = vec![Level::ERROR.primary_title(&title).element(snippet)];

        write!(w, "{}", renderer.render(&report))
    }
}

/// One-character span at `position`, empty at end of input.
fn adjust_range(source: &str, position: usize) -> std::ops::Range<usize> {
    let start = position.min(source.len());
    let width = source[start..].chars().next().map_or(0, char::len_utf8);
    start..start + width
}

impl ParseError {
    pub fn printer<'s>(&self, source: &'s str) -> ErrorPrinter<'_, 's> {
        ErrorPrinter::new(self).source(source)
    }
}
