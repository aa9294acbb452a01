use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use std::io::{self, Write};
use std::ops::Range;

/// Byte range of a token in the source, plus the 1-based line it starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    pub fn single(pos: usize, line: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
            line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Runtime,
}

impl ErrorKind {
    pub fn is_static(self) -> bool {
        matches!(self, ErrorKind::Lexical | ErrorKind::Syntax)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Lexical => write!(f, "Lexical error"),
            ErrorKind::Syntax => write!(f, "Syntax error"),
            ErrorKind::Runtime => write!(f, "Runtime error"),
        }
    }
}

/// A diagnostic produced by any stage of the pipeline.
///
/// `location` is the context label printed after the kind: empty for scanner
/// errors, `" at end"` or `" at 'lexeme'"` for parser and runtime errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {}] {kind}{location}: {message}", .span.line)]
pub struct LoxError {
    pub kind: ErrorKind,
    pub span: Span,
    pub location: String,
    pub message: String,
    pub help: Option<String>,
}

impl LoxError {
    pub fn new(kind: ErrorKind, span: Span, location: String, message: String) -> Self {
        Self {
            kind,
            span,
            location,
            message,
            help: None,
        }
    }

    pub fn lexical(span: Span, message: String) -> Self {
        Self::new(ErrorKind::Lexical, span, String::new(), message)
    }

    pub fn syntax(span: Span, location: String, message: String) -> Self {
        Self::new(ErrorKind::Syntax, span, location, message)
    }

    pub fn runtime(span: Span, lexeme: &str, message: String) -> Self {
        Self::new(ErrorKind::Runtime, span, format!(" at '{}'", lexeme), message)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    /// Render the error against its source with ariadne, on stderr.
    pub fn report(&self, source: &str, filename: Option<&str>) -> io::Result<()> {
        self.write_report(source, filename, io::stderr())
    }

    /// Render the error against its source with ariadne into `out`.
    pub fn write_report<W: Write>(
        &self,
        source: &str,
        filename: Option<&str>,
        out: W,
    ) -> io::Result<()> {
        let filename = filename.unwrap_or("<repl>");

        let color = match self.kind {
            ErrorKind::Lexical => Color::Red,
            ErrorKind::Syntax => Color::Yellow,
            ErrorKind::Runtime => Color::Magenta,
        };

        let range = self.char_range(source);

        let mut report_builder = Report::build(ReportKind::Error, filename, range.start)
            .with_message(format!(
                "{}{}: {}",
                self.kind.fg(color),
                self.location,
                self.message
            ))
            .with_label(
                Label::new((filename, range))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        report_builder
            .finish()
            .write((filename, Source::from(source)), out)
    }

    /// The span as character offsets, which is what ariadne indexes by.
    /// Offsets past the end (the Eof token) are clamped to the last character.
    fn char_range(&self, source: &str) -> Range<usize> {
        let to_chars = |byte: usize| {
            source
                .char_indices()
                .take_while(|&(offset, _)| offset < byte)
                .count()
        };

        let start = to_chars(self.span.start);
        let end = to_chars(self.span.end).max(start);
        start..end
    }
}
