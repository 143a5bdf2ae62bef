//! Rendering of [`StanzaError`] through miette.
//!
//! A parse failure becomes one [`Report`] per parser diagnostic, each
//! carrying the `.poem` source so miette can draw the labelled lines. Any
//! other failure becomes a single report with a `stanza::` code and no
//! snippet.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceCode, SourceSpan};

use stanza::StanzaError;
use stanza_parser::error::{Diagnostic, Label};

/// What a [`Report`] renders.
#[derive(Debug)]
enum Subject<'a> {
    /// One parser diagnostic and the source it points into.
    Located { diag: &'a Diagnostic, src: &'a str },
    /// A library failure with no position attached.
    Plain(&'a StanzaError),
}

/// One renderable failure.
#[derive(Debug)]
pub struct Report<'a> {
    subject: Subject<'a>,
}

impl<'a> Report<'a> {
    pub fn located(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self {
            subject: Subject::Located { diag, src },
        }
    }

    pub fn plain(err: &'a StanzaError) -> Self {
        Self {
            subject: Subject::Plain(err),
        }
    }

    /// True when the report came from a parser diagnostic.
    pub fn has_source(&self) -> bool {
        matches!(self.subject, Subject::Located { .. })
    }
}

/// Code and help shown for failures that have no diagnostic of their own.
fn plain_meta(err: &StanzaError) -> (Option<&'static str>, Option<&'static str>) {
    match err {
        StanzaError::Io(_) => (Some("stanza::io"), None),
        StanzaError::Yaml(_) => (Some("stanza::yaml"), None),
        StanzaError::Document(_) => (Some("stanza::document"), None),
        StanzaError::Batch { .. } => (
            Some("stanza::batch"),
            Some("rerun with --log-level warn or lower to see each failing file"),
        ),
        StanzaError::Parse { .. } => (None, None),
    }
}

fn labeled_span(label: &Label) -> LabeledSpan {
    let span = label.span();
    let at = SourceSpan::new(span.start().into(), span.len());
    let text = Some(label.message().to_owned());
    if label.is_primary() {
        LabeledSpan::new_primary_with_span(text, at)
    } else {
        LabeledSpan::new_with_span(text, at)
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            Subject::Located { diag, .. } => f.write_str(diag.message()),
            Subject::Plain(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Report<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.subject {
            Subject::Located { .. } => None,
            Subject::Plain(err) => std::error::Error::source(*err),
        }
    }
}

impl MietteDiagnostic for Report<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.subject {
            Subject::Located { diag, .. } => {
                diag.code().map(|code| Box::new(code) as Box<dyn fmt::Display>)
            }
            Subject::Plain(err) => plain_meta(err)
                .0
                .map(|code| Box::new(code) as Box<dyn fmt::Display>),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.subject {
            Subject::Located { diag, .. } => {
                diag.help().map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
            }
            Subject::Plain(err) => plain_meta(err)
                .1
                .map(|help| Box::new(help) as Box<dyn fmt::Display>),
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match &self.subject {
            Subject::Located { src, .. } => Some(src as &dyn SourceCode),
            Subject::Plain(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Subject::Located { diag, .. } = &self.subject else {
            return None;
        };
        let labels = diag.labels();
        if labels.is_empty() {
            return None;
        }
        Some(Box::new(labels.iter().map(labeled_span)))
    }
}

/// Split a [`StanzaError`] into the reports to print, in order.
pub fn reports(err: &StanzaError) -> Vec<Report<'_>> {
    if let StanzaError::Parse { err: parse, src } = err {
        return parse
            .diagnostics()
            .iter()
            .map(|diag| Report::located(diag, src))
            .collect();
    }
    vec![Report::plain(err)]
}

#[cfg(test)]
mod tests {
    use stanza_parser::{ParseError, Span, error::ErrorCode};

    use super::*;

    fn code_of(report: &Report<'_>) -> Option<String> {
        report.code().map(|code| code.to_string())
    }

    #[test]
    fn test_parse_failure_keeps_warnings_and_error() {
        let src = "Low Tide\n${mood}\nnot a date\n";
        let parse = ParseError::new(vec![
            Diagnostic::warning("undefined variable `mood`")
                .with_code(ErrorCode::W001)
                .with_label(Span::new(9..16), "referenced here"),
            Diagnostic::error("missing or invalid date")
                .with_code(ErrorCode::E002)
                .with_label(Span::new(17..27), "expected YYYY-MM-DD")
                .with_help("put the date on the line after the title"),
        ]);
        let err = StanzaError::new_parse_error(parse, src);

        let reports = reports(&err);
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(Report::has_source));
        assert_eq!(reports[0].to_string(), "undefined variable `mood`");
        assert_eq!(code_of(&reports[0]).as_deref(), Some("W001"));
        assert!(reports[0].help().is_none());
        assert_eq!(code_of(&reports[1]).as_deref(), Some("E002"));
        assert_eq!(
            reports[1].help().map(|help| help.to_string()).as_deref(),
            Some("put the date on the line after the title")
        );
        assert!(reports[1].source_code().is_some());
    }

    #[test]
    fn test_labels_keep_order_and_role() {
        let diag = Diagnostic::warning("variable `a` still contains `${c}`")
            .with_code(ErrorCode::W004)
            .with_label(Span::new(20..26), "used here")
            .with_secondary_label(Span::new(0..9), "`c` defined here");
        let report = Report::located(&diag, "={a}=${b}\n={b}=${c}\n${a}\n");

        let labels: Vec<LabeledSpan> = report.labels().expect("labels").collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert_eq!(labels[0].offset(), 20);
        assert_eq!(labels[0].len(), 6);
        assert_eq!(labels[1].label(), Some("`c` defined here"));
        assert!(!labels[1].primary());
    }

    #[test]
    fn test_unlabelled_diagnostic_has_no_labels() {
        let diag = Diagnostic::error("poem has no versions");
        assert!(Report::located(&diag, "").labels().is_none());
    }

    #[test]
    fn test_batch_failure_is_plain() {
        let err = StanzaError::Batch {
            failed: 2,
            total: 5,
        };

        let reports = reports(&err);
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert!(!report.has_source());
        assert_eq!(report.to_string(), "2 of 5 file(s) failed");
        assert_eq!(code_of(report).as_deref(), Some("stanza::batch"));
        assert!(report.help().is_some());
        assert!(report.labels().is_none());
        assert!(report.source_code().is_none());
    }

    #[test]
    fn test_document_failure_code() {
        let err = StanzaError::Document("record `x.yaml` already written".to_string());
        let reports = reports(&err);
        assert_eq!(code_of(&reports[0]).as_deref(), Some("stanza::document"));
        assert!(reports[0].help().is_none());
    }
}
