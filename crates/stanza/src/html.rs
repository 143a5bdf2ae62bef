//! HTML back to `.poem` inline markup.
//!
//! The inverse of the parser's inliner, applied to postscript content and
//! analysis text when a document is written back out as `.poem` source.
//! Heading levels collapse: both `base - 1` and `base` become `#`, so the
//! mapping is not injective.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static HEADING_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<h([1-6])[^>]*>\s*(.*?)\s*</h([1-6])>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BLOCK_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\n+").unwrap());
static HEADING_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^<h([1-6])[^>]*>(.*)</h([1-6])>$").unwrap());

static EMPHASIS_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<em>(.*?)</em>").unwrap());
static STRONG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<strong>(.*?)</strong>").unwrap());
static STRIKE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<s>(.*?)</s>").unwrap());
static LINK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<a href="https?://(.*?)">(.*?)</a>"#).unwrap());
static CLASS_SPAN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<span class="([^"]*)">(.*?)</span>"#).unwrap());
static SPAN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<span>(.*?)</span>").unwrap());

static PAIRED_DOUBLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#8220;(.*?)&#8221;").unwrap());
static PAIRED_SINGLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#8216;(.*?)&#8217;").unwrap());

/// Named entities rewritten to their numeric form before decoding.
const NAMED_ENTITIES: [(&str, &str); 8] = [
    ("&ldquo;", "&#8220;"),
    ("&rdquo;", "&#8221;"),
    ("&lsquo;", "&#8216;"),
    ("&rsquo;", "&#8217;"),
    ("&mdash;", "&#8212;"),
    ("&ndash;", "&#8211;"),
    ("&apos;", "&#39;"),
    ("&nbsp;", " "),
];

/// Entities that decode to a plain character, not to markup.
const LITERAL_ENTITIES: [(&str, &str); 5] = [
    ("&#38;", "&"),
    ("&#39;", "'"),
    ("&#34;", "\""),
    ("&#60;", "<"),
    ("&#62;", ">"),
];

/// Unpaired smart quotes left after paired ones became markup.
const STRAY_QUOTES: [(&str, &str); 4] = [
    ("&#8220;", "\""),
    ("&#8221;", "\""),
    ("&#8216;", "`"),
    ("&#8217;", "`"),
];

/// Convert a sequence of HTML blocks back to `.poem` markup.
///
/// Blocks are separated by blank lines in both the input and the output.
/// `heading_base_level` is the HTML level that `#` was rendered at.
pub fn html_to_markup(html: &str, heading_base_level: u8) -> String {
    let html = HEADING_TAG.replace_all(html, |caps: &Captures<'_>| {
        if caps[1] != caps[3] {
            return caps[0].to_string();
        }
        let content = WHITESPACE.replace_all(&caps[2], " ");
        format!("<h{0}>{1}</h{0}>", &caps[1], content.trim())
    });

    BLOCK_BREAK
        .split(html.trim())
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| convert_block(block, heading_base_level))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn convert_block(block: &str, heading_base_level: u8) -> String {
    let heading = HEADING_BLOCK
        .captures(block)
        .filter(|caps| caps[1] == caps[3]);
    if let Some(caps) = heading {
        let level: u8 = caps[1].parse().unwrap_or_default();
        if let Some(prefix) = heading_prefix(level, heading_base_level) {
            return format!("{prefix} {}", strip_tags(&caps[2]));
        }
    }

    match block
        .strip_prefix("<p>")
        .and_then(|inner| inner.strip_suffix("</p>"))
    {
        Some(inner) => strip_tags(inner),
        None => decode_entities(block),
    }
}

fn heading_prefix(level: u8, base: u8) -> Option<&'static str> {
    let base = base.clamp(1, 4);
    match level {
        l if l + 1 == base || l == base => Some("#"),
        l if l == base + 1 => Some("##"),
        l if l == base + 2 => Some("###"),
        _ => None,
    }
}

/// Turn inline tags back into markup tokens, then decode entities.
fn strip_tags(text: &str) -> String {
    let text = EMPHASIS_TAG.replace_all(text, "_${1}_");
    let text = STRONG_TAG.replace_all(&text, "*${1}*");
    let text = STRIKE_TAG.replace_all(&text, "~${1}~");
    let text = LINK_TAG.replace_all(&text, "[${2}|${1}]");
    let text = CLASS_SPAN_TAG.replace_all(&text, "<<.${1}:${2}>>");
    let text = SPAN_TAG.replace_all(&text, "<<.:${1}>>");
    decode_entities(&text)
}

fn decode_entities(text: &str) -> String {
    let mut text = replace_each(text.to_string(), &NAMED_ENTITIES);

    text = PAIRED_DOUBLE.replace_all(&text, "\"${1}\"").into_owned();
    text = PAIRED_SINGLE.replace_all(&text, "`${1}`").into_owned();

    text = text.replace("&#8212;", "---").replace("&#8211;", "--");

    text = replace_each(text, &LITERAL_ENTITIES);
    replace_each(text, &STRAY_QUOTES)
}

fn replace_each(text: String, table: &[(&str, &str)]) -> String {
    table
        .iter()
        .fold(text, |text, (from, to)| text.replace(from, to))
}
