//! Diagnostics for a terminal, optionally with ANSI styling.

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::{Diagnostic, Severity};

use super::DiagnosticEmitter;

/// When to style output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Style only when writing to a TTY.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve to a boolean. `is_tty` only matters for `Auto`.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// The pieces of a diagnostic that get styled.
#[derive(Clone, Copy)]
enum Style {
    Severity(Severity),
    Code,
    Arrow,
    Label,
}

impl Style {
    fn ansi(self) -> &'static str {
        match self {
            Style::Severity(Severity::Error) => "\x1b[1;31m",
            Style::Severity(Severity::Warning) => "\x1b[1;33m",
            Style::Severity(Severity::Note) => "\x1b[1;36m",
            Style::Code | Style::Label => "\x1b[1m",
            Style::Arrow => "\x1b[1;34m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Writes each diagnostic as a block of lines:
///
/// ```text
/// error[E2001]: unable to resolve foo (unresolved node)
///   --> x.rb:7
///   = note: ...
/// conversion trace:
///   0: foo at x.rb:7
/// ```
pub struct TerminalEmitter<W: Write> {
    writer: W,
    styled: bool,
}

impl<W: Write> TerminalEmitter<W> {
    /// Emitter writing to `writer`; `is_tty` only matters for
    /// [`ColorMode::Auto`].
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            styled: mode.should_use_colors(is_tty),
        }
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn paint(&self, out: &mut String, style: Style, text: &str) {
        if self.styled {
            let _ = write!(out, "{}{text}{RESET}", style.ansi());
        } else {
            out.push_str(text);
        }
    }

    fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();

        self.paint(
            &mut out,
            Style::Severity(diagnostic.severity),
            &diagnostic.severity.to_string(),
        );
        self.paint(&mut out, Style::Code, &format!("[{}]", diagnostic.code));
        let _ = write!(out, ": {}", diagnostic.message);
        if let Some(origin) = &diagnostic.origin {
            let _ = write!(out, " ({origin})");
        }
        out.push('\n');

        if let Some(location) = &diagnostic.location {
            out.push_str("  ");
            self.paint(&mut out, Style::Arrow, "-->");
            let _ = writeln!(out, " {location}");
        }
        for note in &diagnostic.notes {
            out.push_str("  = ");
            self.paint(&mut out, Style::Label, "note");
            let _ = writeln!(out, ": {note}");
        }
        let _ = write!(out, "{}", diagnostic.trace);

        out.push('\n');
        out
    }
}

impl TerminalEmitter<io::Stderr> {
    /// Emitter for stderr, the driver's error channel.
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let block = self.format(diagnostic);
        let _ = self.writer.write_all(block.as_bytes());
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}
