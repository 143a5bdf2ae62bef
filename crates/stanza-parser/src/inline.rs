//! Inline markup to HTML.
//!
//! Rules run in a fixed order over one logical text unit (a paragraph, a
//! heading, a label). Text that must survive later rules untouched, such as
//! escaped characters and the attributes of generated tags, is stashed
//! behind a placeholder and put back at the very end.
//!
//! | markup              | HTML                                |
//! |---------------------|-------------------------------------|
//! | `\*`                | `*` (any escapable character)       |
//! | `---` / `--`        | `&#8212;` / `&#8211;`               |
//! | `[text\|site/path]` | `<a href="https://site/path">text</a>` |
//! | `<<.class:text>>`   | `<span class="class">text</span>`   |
//! | `` `x` `` / `"x"`   | `&#8216;x&#8217;` / `&#8220;x&#8221;` |
//! | `~x~` `*x*` `_x_`   | `<s>` `<strong>` `<em>`             |
//! | `&` `'`             | `&#38;` `&#39;`                     |

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::Span,
};

static ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\\([_*~\[`"&'\-<>=$\\])"#).unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]|]+)\|([^\]]+)\]").unwrap());
static SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<<\.([^:>]*):(.*?)>>").unwrap());
static SPAN_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]([A-Za-z0-9_.-]*[A-Za-z0-9_])?$").unwrap());
static SINGLE_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static DOUBLE_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)""#).unwrap());
static STRIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~([^~]+)~").unwrap());
static STRONG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"_([^_]+)_").unwrap());
static AMPERSAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"&(#\d+;|[A-Za-z]+;)?").unwrap());

const PLACEHOLDER_MARK: char = '\u{0}';

/// Protected fragments, addressed by placeholder index.
#[derive(Debug, Default)]
struct Stash {
    fragments: Vec<String>,
}

impl Stash {
    /// Store a fragment and return the placeholder standing in for it.
    fn put(&mut self, fragment: impl Into<String>) -> String {
        let index = self.fragments.len();
        self.fragments.push(fragment.into());
        format!("{PLACEHOLDER_MARK}{index}{PLACEHOLDER_MARK}")
    }

    /// Replace placeholders with their fragments.
    ///
    /// Later fragments may contain earlier placeholders, so restore from the
    /// last one backwards.
    fn restore(&self, mut text: String) -> String {
        for (index, fragment) in self.fragments.iter().enumerate().rev() {
            let placeholder = format!("{PLACEHOLDER_MARK}{index}{PLACEHOLDER_MARK}");
            text = text.replace(&placeholder, fragment);
        }
        text
    }
}

/// Encode the characters that could end a double-quoted attribute or open
/// a tag.
fn attribute_value(raw: &str) -> String {
    raw.replace('"', "&#34;")
        .replace('<', "&#60;")
        .replace('>', "&#62;")
}

/// Convert one text unit of inline markup to HTML.
///
/// Span class problems are reported against `span` and the markup falls
/// back to a best-effort rendering.
pub(crate) fn to_html(text: &str, span: Span, diagnostics: &mut DiagnosticCollector) -> String {
    let mut stash = Stash::default();

    let text = ESCAPE.replace_all(text, |caps: &Captures<'_>| stash.put(&caps[1]));

    let text = text.replace("---", "&#8212;").replace("--", "&#8211;");

    let text = LINK.replace_all(&text, |caps: &Captures<'_>| {
        let url = attribute_value(&stash.restore(caps[2].to_string()));
        let href = stash.put(format!("href=\"https://{url}\""));
        format!("<a {href}>{}</a>", &caps[1])
    });

    let text = SPAN.replace_all(&text, |caps: &Captures<'_>| {
        let class = &caps[1];
        let content = &caps[2];
        if class.is_empty() {
            diagnostics.emit(
                Diagnostic::warning("span element with empty class name")
                    .with_code(ErrorCode::W002)
                    .with_label(span, "rendered without a class"),
            );
            format!("<span>{content}</span>")
        } else if !SPAN_CLASS.is_match(class) {
            diagnostics.emit(
                Diagnostic::warning(format!("invalid span class name `{class}`"))
                    .with_code(ErrorCode::W003)
                    .with_label(span, "left unconverted")
                    .with_help("class names use letters, digits and `_`, with `.` or `-` inside"),
            );
            caps[0].to_string()
        } else {
            let attribute = stash.put(format!("class=\"{class}\""));
            format!("<span {attribute}>{content}</span>")
        }
    });

    let text = SINGLE_QUOTE.replace_all(&text, "&#8216;${1}&#8217;");
    let text = DOUBLE_QUOTE.replace_all(&text, "&#8220;${1}&#8221;");

    let text = STRIKE.replace_all(&text, "<s>${1}</s>");
    let text = STRONG.replace_all(&text, "<strong>${1}</strong>");
    let text = EMPHASIS.replace_all(&text, "<em>${1}</em>");

    let text = AMPERSAND.replace_all(&text, |caps: &Captures<'_>| {
        if caps.get(1).is_some() {
            caps[0].to_string()
        } else {
            "&#38;".to_string()
        }
    });
    let text = text.replace('\'', "&#39;");

    stash.restore(text)
}
