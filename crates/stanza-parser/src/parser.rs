//! Structural parser for preprocessed `.poem` lines.
//!
//! The parser walks the line stream once, section by section:
//!
//! ```text
//! Header → Versions → [====] → Audio → [====] → Postscript → [====] → Analysis
//! ```
//!
//! Every section after the header may be cut short by the end of input.
//! Inside Versions and Postscript the `----` divider may be left out when the
//! next non-blank line unambiguously opens a new version, segment or note.
//!
//! All parse state (cursor, variables, diagnostics) lives in one [`Parser`]
//! value owned by a single [`parse_document`] call.

use log::{debug, trace};

use stanza_core::document::{
    Analysis, Audio, AudioEntry, Document, PostscriptNote, Segment, Version,
};

use crate::{
    Parsed,
    config::ParseConfig,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    grammar::{
        self, FULL_LABEL, LITERAL_CLOSE, LITERAL_OPEN, SECTION_END, SYNOPSIS_LABEL,
        VERSION_DIVIDER,
    },
    inline,
    literal::{self, LiteralBlock},
    source::{self, SourceLine},
    span::Span,
    variables::Variables,
};

const NBSP: &str = "&nbsp;";

/// Run the whole pipeline on one source text.
pub(crate) fn parse_document(source: &str, config: &ParseConfig) -> Result<Parsed, ParseError> {
    let mut diagnostics = DiagnosticCollector::new();

    let lines = source::strip_comments(source::split_lines(source));
    let (mut variables, lines) = Variables::extract(lines);
    variables.resolve(&mut diagnostics);
    let lines = variables.expand(lines);
    trace!(lines = lines.len(); "Preprocessed source");

    Parser {
        lines,
        index: 0,
        variables,
        config,
        diagnostics,
        end: Span::new(source.len()..source.len()),
    }
    .run()
}

/// Lines of one prose paragraph, joined with spaces when flushed.
#[derive(Debug, Default)]
struct Paragraph {
    lines: Vec<String>,
    span: Option<Span>,
}

impl Paragraph {
    fn push(&mut self, text: String, span: Span) {
        self.lines.push(text);
        self.span = Some(self.span.map_or(span, |s| s.union(span)));
    }

    fn take(&mut self) -> Option<(String, Span)> {
        let span = self.span.take()?;
        let text = self.lines.join(" ");
        self.lines.clear();
        Some((text, span))
    }
}

struct Parser<'c> {
    lines: Vec<SourceLine>,
    index: usize,
    variables: Variables,
    config: &'c ParseConfig,
    diagnostics: DiagnosticCollector,
    /// Empty span at the end of the source, for things that are missing.
    end: Span,
}

impl Parser<'_> {
    fn run(mut self) -> Result<Parsed, ParseError> {
        let document = self.document();
        self.variables.report_undefined(&mut self.diagnostics);
        match document {
            Ok(document) => {
                let warnings = self.diagnostics.finish()?;
                Ok(Parsed::new(document, warnings))
            }
            Err(diagnostic) => Err(self.diagnostics.fail(diagnostic)),
        }
    }

    fn document(&mut self) -> Result<Document, Diagnostic> {
        let (title, author, date) = self.header()?;

        let versions = self.versions();
        if versions.is_empty() {
            return Err(Diagnostic::error("poem has no versions")
                .with_code(ErrorCode::E003)
                .with_label(self.current_span(), "expected poem lines here")
                .with_help("add at least one line of verse after the date"));
        }
        debug!(title = title.as_str(), versions = versions.len(); "Parsed poem body");

        let mut document = Document::new(title, author, date, versions);

        self.expect_marker(SECTION_END);
        document = document.with_audio(self.audio());

        self.expect_marker(SECTION_END);
        document = document.with_postscript(self.postscript());

        self.expect_marker(SECTION_END);
        document = document.with_analysis(self.analysis());

        self.expect_marker(SECTION_END);
        self.report_leftover();

        Ok(document)
    }

    /// Warn once about any non-blank lines no section consumed.
    fn report_leftover(&mut self) {
        self.skip_blank_lines();
        let Some(first) = self.peek().map(|line| line.span) else {
            return;
        };
        let last = self.lines[self.index..]
            .iter()
            .rev()
            .find(|line| !line.is_blank())
            .map_or(first, |line| line.span);
        debug!(lines = self.lines.len() - self.index; "Content after the last section ignored");
        self.diagnostics.emit(
            Diagnostic::warning("content after the last section is ignored")
                .with_code(ErrorCode::W005)
                .with_label(first.union(last), "not part of any section")
                .with_help("check for a missing `====` or `----` before this line"),
        );
    }

    // ========================================================================
    // Cursor helpers
    // ========================================================================

    fn peek(&self) -> Option<&SourceLine> {
        self.lines.get(self.index)
    }

    fn peek_trimmed(&self) -> Option<&str> {
        self.peek().map(SourceLine::trimmed)
    }

    fn next_line(&mut self) -> Option<SourceLine> {
        let line = self.lines.get(self.index).cloned()?;
        self.index += 1;
        Some(line)
    }

    fn skip_blank_lines(&mut self) {
        while self.peek().is_some_and(SourceLine::is_blank) {
            self.index += 1;
        }
    }

    /// Consume `marker` if it is the next non-blank line.
    fn expect_marker(&mut self, marker: &str) -> bool {
        self.skip_blank_lines();
        if self.peek_trimmed() == Some(marker) {
            self.index += 1;
            self.skip_blank_lines();
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        self.peek().map_or(self.end, |line| line.span)
    }

    fn substitute(&mut self, text: &str, span: Span) -> String {
        self.variables.substitute(text, span)
    }

    fn inline(&mut self, text: &str, span: Span) -> String {
        inline::to_html(text, span, &mut self.diagnostics)
    }

    // ========================================================================
    // Header
    // ========================================================================

    fn header(&mut self) -> Result<(String, String, String), Diagnostic> {
        self.skip_blank_lines();

        let Some(title_line) = self.next_line() else {
            return Err(Diagnostic::error("missing title")
                .with_code(ErrorCode::E001)
                .with_label(self.end, "expected a title line")
                .with_help("the first non-empty line of a poem is its title"));
        };
        let title = self.substitute(title_line.trimmed(), title_line.span);

        let line = self
            .next_line()
            .ok_or_else(|| missing_date(title_line.span, "expected a date after the title"))?;
        let candidate = self.substitute(line.trimmed(), line.span);

        if grammar::is_date(&candidate) {
            let author = self
                .variables
                .lookup("author")
                .unwrap_or_else(|| self.config.default_author.clone());
            self.skip_blank_lines();
            return Ok((title, author, candidate));
        }
        if candidate.is_empty() {
            return Err(missing_date(line.span, "expected a date or an author"));
        }

        let author = candidate;
        let date_line = self
            .next_line()
            .ok_or_else(|| missing_date(line.span, "expected a date after the author"))?;
        let date = self.substitute(date_line.trimmed(), date_line.span);
        if !grammar::is_date(&date) {
            return Err(missing_date(date_line.span, "not a YYYY-MM-DD date"));
        }

        self.skip_blank_lines();
        Ok((title, author, date))
    }

    // ========================================================================
    // Versions and segments
    // ========================================================================

    fn versions(&mut self) -> Vec<Version> {
        let mut versions = Vec::new();
        loop {
            let start = self.index;
            if let Some(version) = self.version() {
                versions.push(version);
            }

            self.skip_blank_lines();
            match self.peek_trimmed() {
                Some(VERSION_DIVIDER) => {
                    self.index += 1;
                    self.skip_blank_lines();
                }
                Some(line) if self.index > start && opens_version_content(line) => {
                    trace!("Version divider omitted");
                }
                _ => break,
            }
        }
        versions
    }

    fn version(&mut self) -> Option<Version> {
        self.skip_blank_lines();

        let first = self.peek()?;
        if first.trimmed() == SECTION_END {
            return None;
        }

        let mut label = None;
        if let Some(text) = grammar::version_label(first.trimmed()) {
            let (text, span) = (text.to_string(), first.span);
            self.index += 1;
            if !text.is_empty() {
                label = Some(self.substitute(&text, span));
            }
            self.skip_blank_lines();
        }

        let mut segments = Vec::new();
        loop {
            self.skip_blank_lines();
            match self.peek_trimmed() {
                None | Some(VERSION_DIVIDER | SECTION_END) => break,
                Some(line) if grammar::version_label(line).is_some() => break,
                Some(_) => {}
            }

            let start = self.index;
            match self.segment() {
                Some(segment) => segments.push(segment),
                None if self.index == start => break,
                None => {}
            }
        }

        (!segments.is_empty()).then(|| Version::new(label, segments))
    }

    fn segment(&mut self) -> Option<Segment> {
        self.skip_blank_lines();

        let line = self.peek()?;
        if matches!(line.trimmed(), VERSION_DIVIDER | SECTION_END) {
            return None;
        }

        let mut label = None;
        if let Some(text) = grammar::segment_label(line.trimmed()) {
            let (text, span) = (text.to_string(), line.span);
            self.index += 1;
            label = Some(self.substitute(&text, span));
            self.skip_blank_lines();
        }

        let mut lines = Vec::new();
        while let Some(line) = self.peek() {
            if ends_segment(line.trimmed()) {
                break;
            }
            let line = line.clone();
            self.index += 1;
            let text = self.substitute(&line.text, line.span);
            lines.push(encode_spaces(&text));
        }

        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        if lines.is_empty() {
            return None;
        }

        let mut text = lines.join("\n");
        text.push('\n');
        Some(Segment::new(label, text))
    }

    // ========================================================================
    // Audio
    // ========================================================================

    fn audio(&mut self) -> Audio {
        self.skip_blank_lines();

        let config = self.config;
        let platforms = &config.audio;
        let mut audio = Audio::new();
        while let Some(line) = self.peek() {
            if line.trimmed() == SECTION_END {
                break;
            }
            let line = line.clone();
            let text = self.variables.substitute(line.trimmed(), line.span);

            if text.is_empty() {
                self.index += 1;
            } else if let Some(name) = platforms.flags.iter().find(|name| **name == text) {
                audio.insert(name.to_lowercase(), AudioEntry::Flag(true));
                self.index += 1;
            } else if let Some((name, value)) = platforms
                .references
                .iter()
                .find_map(|name| grammar::audio_reference(&text, name).map(|v| (name, v)))
            {
                if !value.is_empty() {
                    audio.insert(name.to_lowercase(), AudioEntry::Reference(value.to_string()));
                }
                self.index += 1;
            } else {
                break;
            }
        }

        self.skip_blank_lines();
        audio
    }

    // ========================================================================
    // Postscript
    // ========================================================================

    fn postscript(&mut self) -> Vec<PostscriptNote> {
        let mut notes = Vec::new();
        loop {
            self.skip_blank_lines();
            if matches!(self.peek_trimmed(), None | Some(SECTION_END)) {
                break;
            }

            let start = self.index;
            if let Some(note) = self.postscript_note() {
                notes.push(note);
            }

            self.skip_blank_lines();
            match self.peek_trimmed() {
                Some(VERSION_DIVIDER) => self.index += 1,
                Some(line) if self.index > start && opens_note(line) => {
                    trace!("Postscript divider omitted");
                }
                _ => break,
            }
        }

        self.skip_blank_lines();
        notes
    }

    fn postscript_note(&mut self) -> Option<PostscriptNote> {
        self.skip_blank_lines();

        let line = self.peek()?;
        match line.trimmed() {
            SECTION_END => return None,
            LITERAL_OPEN => {
                return match self.literal_block() {
                    LiteralBlock::Reference(target) => Some(PostscriptNote::reference(target)),
                    LiteralBlock::Content(content) if content.trim().is_empty() => None,
                    LiteralBlock::Content(content) => {
                        Some(PostscriptNote::prose(None, Some(content)))
                    }
                };
            }
            _ => {}
        }

        let mut label = None;
        if let Some(text) = grammar::segment_label(line.trimmed()) {
            let (text, span) = (text.to_string(), line.span);
            self.index += 1;
            label = Some(self.substitute(&text, span));
            self.skip_blank_lines();
        }

        let mut paragraphs = Vec::new();
        let mut paragraph = Paragraph::default();
        while let Some(line) = self.peek() {
            let trimmed = line.trimmed();
            if trimmed == LITERAL_OPEN || ends_note(trimmed) {
                break;
            }
            let line = line.clone();
            self.index += 1;
            if line.is_blank() {
                if let Some((text, span)) = paragraph.take() {
                    paragraphs.push(self.inline(&text, span));
                }
            } else {
                let text = self.substitute(line.trimmed(), line.span);
                paragraph.push(text, line.span);
            }
        }
        if let Some((text, span)) = paragraph.take() {
            paragraphs.push(self.inline(&text, span));
        }

        let mut content = (!paragraphs.is_empty()).then(|| {
            let mut html = paragraphs
                .iter()
                .map(|p| format!("<p>{p}</p>"))
                .collect::<Vec<_>>()
                .join("\n\n");
            html.push('\n');
            html
        });

        let mut blocks = Vec::new();
        loop {
            self.skip_blank_lines();
            if self.peek_trimmed() != Some(LITERAL_OPEN) {
                break;
            }
            blocks.push(self.literal_block());
        }
        for block in blocks {
            match block {
                LiteralBlock::Reference(target) => {
                    debug!(target = target.as_str(); "Postscript note replaced by reference");
                    return Some(PostscriptNote::reference(target));
                }
                LiteralBlock::Content(raw) if !raw.is_empty() => {
                    let content = content.get_or_insert_with(String::new);
                    content.push('\n');
                    content.push_str(&raw);
                }
                LiteralBlock::Content(_) => {}
            }
        }

        if label.is_none() && content.is_none() {
            return None;
        }
        Some(PostscriptNote::prose(label, content))
    }

    /// Consume a `<<<` block through its `>>>`, or to the end of input.
    fn literal_block(&mut self) -> LiteralBlock {
        self.index += 1;
        let mut lines = Vec::new();
        while let Some(line) = self.next_line() {
            if line.trimmed() == LITERAL_CLOSE {
                break;
            }
            lines.push(line.text);
        }
        literal::classify(&lines)
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    fn analysis(&mut self) -> Analysis {
        self.skip_blank_lines();

        let mut synopsis = None;
        if self.peek_trimmed() == Some(SYNOPSIS_LABEL) {
            self.index += 1;
            self.skip_blank_lines();
            synopsis = self.analysis_blocks();
            self.skip_blank_lines();
        }

        let mut full = None;
        if self.peek_trimmed() == Some(FULL_LABEL) {
            self.index += 1;
            self.skip_blank_lines();
            full = self.analysis_blocks();
        }

        Analysis::new(synopsis, full)
    }

    fn analysis_blocks(&mut self) -> Option<String> {
        let mut blocks = Vec::new();
        let mut paragraph = Paragraph::default();

        while let Some(line) = self.peek() {
            if matches!(line.trimmed(), SECTION_END | SYNOPSIS_LABEL | FULL_LABEL) {
                break;
            }
            let line = line.clone();
            self.index += 1;

            let trimmed = line.trimmed();
            if let Some((depth, text)) = grammar::heading_line(trimmed) {
                self.flush_paragraph(&mut paragraph, &mut blocks);
                let text = self.substitute(text, line.span);
                let html = self.inline(&text, line.span);
                let level = self.config.heading_level(depth);
                blocks.push(format!("<h{level}>{html}</h{level}>"));
            } else if trimmed.is_empty() {
                self.flush_paragraph(&mut paragraph, &mut blocks);
            } else {
                let text = self.substitute(trimmed, line.span);
                paragraph.push(text, line.span);
            }
        }
        self.flush_paragraph(&mut paragraph, &mut blocks);

        if blocks.is_empty() {
            return None;
        }
        let mut html = blocks.join("\n\n");
        html.push('\n');
        Some(html)
    }

    fn flush_paragraph(&mut self, paragraph: &mut Paragraph, blocks: &mut Vec<String>) {
        if let Some((text, span)) = paragraph.take() {
            blocks.push(format!("<p>{}</p>", self.inline(&text, span)));
        }
    }
}

fn missing_date(span: Span, label: &str) -> Diagnostic {
    Diagnostic::error("missing or invalid date")
        .with_code(ErrorCode::E002)
        .with_label(span, label)
        .with_help("put a YYYY-MM-DD date after the title, or after the author line")
}

/// A line that may start the next version without a `----` divider.
fn opens_version_content(trimmed: &str) -> bool {
    grammar::version_label(trimmed).is_some() || grammar::segment_label(trimmed).is_some()
}

/// A line that ends the content lines of a segment.
fn ends_segment(trimmed: &str) -> bool {
    matches!(trimmed, VERSION_DIVIDER | SECTION_END) || opens_version_content(trimmed)
}

/// A line that may start the next postscript note without a divider.
fn opens_note(trimmed: &str) -> bool {
    trimmed == LITERAL_OPEN || grammar::segment_label(trimmed).is_some()
}

/// A line that ends the prose paragraphs of a postscript note.
fn ends_note(trimmed: &str) -> bool {
    matches!(
        trimmed,
        VERSION_DIVIDER | SECTION_END | SYNOPSIS_LABEL | FULL_LABEL
    ) || grammar::segment_label(trimmed).is_some()
}

/// Encode spaces in a poem line so the rendered text keeps its shape.
///
/// Leading spaces all become `&nbsp;`. Inside the line a run of two or more
/// spaces keeps one breakable space followed by `&nbsp;` for the rest. A
/// whitespace-only line becomes empty.
fn encode_spaces(line: &str) -> String {
    if line.trim().is_empty() {
        return String::new();
    }

    let body = line.trim_start_matches(' ');
    let mut out = NBSP.repeat(line.len() - body.len());

    let mut run = 0;
    for c in body.chars() {
        if c == ' ' {
            run += 1;
            continue;
        }
        push_space_run(&mut out, run);
        run = 0;
        out.push(c);
    }
    push_space_run(&mut out, run);
    out
}

fn push_space_run(out: &mut String, run: usize) {
    match run {
        0 => {}
        1 => out.push(' '),
        n => {
            out.push(' ');
            out.push_str(&NBSP.repeat(n - 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_spaces_leading() {
        assert_eq!(encode_spaces("    indented"), "&nbsp;&nbsp;&nbsp;&nbsp;indented");
    }

    #[test]
    fn test_encode_spaces_interior_runs() {
        assert_eq!(encode_spaces("a b"), "a b");
        assert_eq!(encode_spaces("a  b"), "a &nbsp;b");
        assert_eq!(encode_spaces("a    b"), "a &nbsp;&nbsp;&nbsp;b");
    }

    #[test]
    fn test_encode_spaces_mixed() {
        assert_eq!(encode_spaces("  x   y "), "&nbsp;&nbsp;x &nbsp;&nbsp;y ");
    }

    #[test]
    fn test_encode_spaces_whitespace_only() {
        assert_eq!(encode_spaces("   "), "");
        assert_eq!(encode_spaces("\t"), "");
    }

    #[test]
    fn test_encode_spaces_keeps_tabs() {
        assert_eq!(encode_spaces("a\t\tb"), "a\t\tb");
    }
}
