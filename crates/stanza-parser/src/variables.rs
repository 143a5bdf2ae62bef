//! Variable definitions and substitution.
//!
//! Definitions are pulled out of the line stream before structural parsing:
//!
//! ```text
//! ={mood}=restless                  single line, value taken verbatim
//! ={chorus}<<=                      multi-line, captured until `=>>`
//! and the tide comes in
//! and the tide goes out
//! =>>
//! ```
//!
//! Values may reference other variables. They are resolved in one pass in
//! definition order, so a value that points at a variable whose own value
//! still holds a reference keeps that inner reference (reported as `W004`).
//! A line consisting of nothing but `${name}` is expanded up front; every
//! other reference is substituted when the structural parser materializes
//! the text it sits in.

use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    grammar::{self, DefinitionHeader, LITERAL_CLOSE, LITERAL_OPEN},
    source::SourceLine,
    span::Span,
};

static REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// The value of a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Value {
    Single(String),
    Multi(Vec<String>),
}

impl Value {
    /// The value as inline text; multi-line values are joined with `\n`.
    fn inline(&self) -> String {
        match self {
            Value::Single(text) => text.clone(),
            Value::Multi(lines) => lines.join("\n"),
        }
    }
}

#[derive(Debug, Clone)]
struct Definition {
    value: Value,
    span: Span,
}

/// The variable table of one parse, plus the names referenced but never
/// defined.
#[derive(Debug, Default)]
pub(crate) struct Variables {
    table: IndexMap<String, Definition>,
    undefined: IndexMap<String, Span>,
}

impl Variables {
    /// Remove definitions from the line stream and record them.
    ///
    /// Lines inside a `<<<` / `>>>` literal block are never treated as
    /// definitions. An unterminated multi-line definition captures to the
    /// end of input.
    pub fn extract(lines: Vec<SourceLine>) -> (Self, Vec<SourceLine>) {
        let mut variables = Self::default();
        let mut kept = Vec::with_capacity(lines.len());
        let mut in_literal = false;
        let mut lines = lines.into_iter();

        while let Some(line) = lines.next() {
            match line.trimmed() {
                LITERAL_OPEN => in_literal = true,
                LITERAL_CLOSE => in_literal = false,
                _ if in_literal => {}
                _ => match grammar::definition_header(&line.text) {
                    Some(DefinitionHeader::Single { name, value }) => {
                        variables.define(name, Value::Single(value.to_string()), line.span);
                        continue;
                    }
                    Some(DefinitionHeader::Multi { name }) => {
                        let name = name.to_string();
                        let mut span = line.span;
                        let mut captured = Vec::new();
                        for inner in lines.by_ref() {
                            span = span.union(inner.span);
                            if grammar::is_definition_close(&inner.text) {
                                break;
                            }
                            captured.push(inner.text);
                        }
                        variables.define(&name, Value::Multi(captured), span);
                        continue;
                    }
                    None => {}
                },
            }
            kept.push(line);
        }

        (variables, kept)
    }

    fn define(&mut self, name: &str, value: Value, span: Span) {
        debug!(name; "variable defined");
        self.table
            .insert(name.to_string(), Definition { value, span });
    }

    /// Substitute references inside the definitions themselves.
    ///
    /// One top-to-bottom pass; each value is substituted against the table
    /// as it stands when that value is reached.
    pub fn resolve(&mut self, diagnostics: &mut DiagnosticCollector) {
        for index in 0..self.table.len() {
            let Some((_, definition)) = self.table.get_index(index) else {
                continue;
            };
            let span = definition.span;
            let resolved = match definition.value.clone() {
                Value::Single(text) => Value::Single(self.substitute(&text, span)),
                Value::Multi(lines) => Value::Multi(
                    lines
                        .iter()
                        .map(|line| self.substitute(line, span))
                        .collect(),
                ),
            };
            if let Some((_, definition)) = self.table.get_index_mut(index) {
                definition.value = resolved;
            }
        }

        for (name, definition) in &self.table {
            let text = definition.value.inline();
            let leftover = REFERENCE
                .captures_iter(&text)
                .filter_map(|caps| caps.get(1))
                .find_map(|inner| {
                    self.table
                        .get(inner.as_str())
                        .map(|target| (inner.as_str(), target.span))
                });
            if let Some((inner, target_span)) = leftover {
                diagnostics.emit(
                    Diagnostic::warning(format!(
                        "variable `{name}` still contains `${{{inner}}}`"
                    ))
                    .with_code(ErrorCode::W004)
                    .with_label(definition.span, "defined here")
                    .with_secondary_label(target_span, format!("`{inner}` defined here"))
                    .with_help("define referenced variables before the variables that use them"),
                );
            }
        }
    }

    /// Expand lines that consist of a single `${name}` reference.
    ///
    /// A multi-line variable splices its lines in place, each carrying the
    /// span of the reference line. A single-line variable is substituted in
    /// the line. An undefined name leaves the line as it is.
    pub fn expand(&mut self, lines: Vec<SourceLine>) -> Vec<SourceLine> {
        let mut expanded = Vec::with_capacity(lines.len());
        for line in lines {
            let Some(name) = grammar::standalone_reference(line.trimmed()) else {
                expanded.push(line);
                continue;
            };
            match self.table.get(name).map(|d| d.value.clone()) {
                Some(Value::Multi(values)) => {
                    expanded.extend(
                        values
                            .into_iter()
                            .map(|value| SourceLine::new(value, line.span)),
                    );
                }
                Some(Value::Single(_)) => {
                    let text = self.substitute(&line.text, line.span);
                    expanded.push(SourceLine::new(text, line.span));
                }
                None => {
                    self.note_undefined(name, line.span);
                    expanded.push(line);
                }
            }
        }
        expanded
    }

    /// Replace every `${name}` in `text` with the variable's inline value.
    ///
    /// Undefined references stay in the text verbatim and are remembered
    /// for a `W001` warning.
    pub fn substitute(&mut self, text: &str, span: Span) -> String {
        if !text.contains("${") {
            return text.to_string();
        }
        let Self { table, undefined } = self;
        REFERENCE
            .replace_all(text, |caps: &Captures<'_>| match table.get(&caps[1]) {
                Some(definition) => definition.value.inline(),
                None => {
                    undefined.entry(caps[1].to_string()).or_insert(span);
                    caps[0].to_string()
                }
            })
            .into_owned()
    }

    /// The inline value of a variable, if defined.
    pub fn lookup(&self, name: &str) -> Option<String> {
        self.table.get(name).map(|d| d.value.inline())
    }

    fn note_undefined(&mut self, name: &str, span: Span) {
        self.undefined.entry(name.to_string()).or_insert(span);
    }

    /// Emit one `W001` per undefined name, in first-use order.
    pub fn report_undefined(&self, diagnostics: &mut DiagnosticCollector) {
        for (name, span) in &self.undefined {
            diagnostics.emit(
                Diagnostic::warning(format!("variable `${{{name}}}` used but not defined"))
                    .with_code(ErrorCode::W001)
                    .with_label(*span, "referenced here")
                    .with_help(format!("define it with `={{{name}}}=...`")),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::split_lines;

    fn texts(lines: &[SourceLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    fn preprocess(source: &str) -> (Variables, Vec<SourceLine>, DiagnosticCollector) {
        let mut diagnostics = DiagnosticCollector::new();
        let (mut variables, lines) = Variables::extract(split_lines(source));
        variables.resolve(&mut diagnostics);
        let lines = variables.expand(lines);
        (variables, lines, diagnostics)
    }

    #[test]
    fn test_definitions_removed_from_stream() {
        let (variables, lines, _) = preprocess("={a}=one\nkeep\n={b}<<=\nx\ny\n=>>\nlast");
        assert_eq!(texts(&lines), vec!["keep", "last"]);
        assert_eq!(variables.lookup("a").as_deref(), Some("one"));
        assert_eq!(variables.lookup("b").as_deref(), Some("x\ny"));
    }

    #[test]
    fn test_definitions_inside_literal_block_are_kept() {
        let (variables, lines, _) = preprocess("<<<\n={a}=one\n>>>\n={b}=two");
        assert_eq!(texts(&lines), vec!["<<<", "={a}=one", ">>>"]);
        assert!(variables.lookup("a").is_none());
        assert_eq!(variables.lookup("b").as_deref(), Some("two"));
    }

    #[test]
    fn test_unterminated_multi_line_captures_to_end() {
        let (variables, lines, _) = preprocess("before\n={tail}<<=\nx\ny");
        assert_eq!(texts(&lines), vec!["before"]);
        assert_eq!(variables.lookup("tail").as_deref(), Some("x\ny"));
    }

    #[test]
    fn test_nested_reference_resolves_in_order() {
        let (variables, _, diagnostics) = preprocess("={who}=the keeper\n={line}=I am ${who}");
        assert_eq!(variables.lookup("line").as_deref(), Some("I am the keeper"));
        assert!(diagnostics.finish().expect("no errors").is_empty());
    }

    #[test]
    fn test_forward_chain_keeps_inner_reference() {
        let (variables, _, diagnostics) = preprocess("={a}=${b}\n={b}=${c}\n={c}=x");
        assert_eq!(variables.lookup("a").as_deref(), Some("${c}"));
        assert_eq!(variables.lookup("b").as_deref(), Some("x"));

        let warnings = diagnostics.finish().expect("warnings only");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code(), Some(ErrorCode::W004));
        let labels = warnings[0].labels();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].is_primary());
        assert_eq!(labels[1].message(), "`c` defined here");
    }

    #[test]
    fn test_standalone_multi_line_reference_splices() {
        let (_, lines, _) = preprocess("={chorus}<<=\nla\nla la\n=>>\nverse\n  ${chorus}\nend");
        assert_eq!(texts(&lines), vec!["verse", "la", "la la", "end"]);
        assert_eq!(lines[1].span, lines[2].span);
    }

    #[test]
    fn test_standalone_single_reference_substitutes() {
        let (_, lines, _) = preprocess("={x}=hello\n  ${x}");
        assert_eq!(texts(&lines), vec!["  hello"]);
    }

    #[test]
    fn test_undefined_reference_left_verbatim() {
        let (mut variables, lines, _) = preprocess("${ghost}\nsay ${spirit}");
        assert_eq!(texts(&lines), vec!["${ghost}", "say ${spirit}"]);

        let text = variables.substitute(&lines[1].text, lines[1].span);
        assert_eq!(text, "say ${spirit}");

        let mut diagnostics = DiagnosticCollector::new();
        variables.report_undefined(&mut diagnostics);
        let warnings = diagnostics.finish().expect("warnings only");
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message().contains("ghost"));
        assert!(warnings[1].message().contains("spirit"));
    }

    #[test]
    fn test_undefined_reported_once() {
        let mut variables = Variables::default();
        variables.substitute("${a} ${a}", Span::new(0..9));
        variables.substitute("${a}", Span::new(10..14));

        let mut diagnostics = DiagnosticCollector::new();
        variables.report_undefined(&mut diagnostics);
        let warnings = diagnostics.finish().expect("warnings only");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].labels()[0].span(), Span::new(0..9));
    }

    #[test]
    fn test_inline_substitution_joins_multi_line() {
        let (mut variables, _, _) = preprocess("={two}<<=\na\nb\n=>>");
        assert_eq!(variables.substitute("<${two}>", Span::default()), "<a\nb>");
    }

    #[test]
    fn test_redefinition_replaces_value() {
        let (variables, _, _) = preprocess("={a}=first\n={a}=second");
        assert_eq!(variables.lookup("a").as_deref(), Some("second"));
    }
}
