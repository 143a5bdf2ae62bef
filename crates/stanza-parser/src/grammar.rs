//! Line-level grammar of the `.poem` format.
//!
//! The structural parser works one line at a time; the recognizers here
//! decide what a single (usually trimmed) line is. Anything with internal
//! structure goes through winnow, the simple bracket checks use plain
//! string slicing.

use winnow::{
    Parser as _,
    combinator::{alt, delimited, preceded},
    error::ModalResult,
    token::{rest, take_while},
};

type Input<'a> = &'a str;
type IResult<O> = ModalResult<O>;

pub(crate) const VERSION_DIVIDER: &str = "----";
pub(crate) const SECTION_END: &str = "====";
pub(crate) const LITERAL_OPEN: &str = "<<<";
pub(crate) const LITERAL_CLOSE: &str = ">>>";
pub(crate) const SYNOPSIS_LABEL: &str = "{Synopsis}";
pub(crate) const FULL_LABEL: &str = "{Full}";

const RESERVED_LABELS: [&str; 2] = ["Synopsis", "Full"];

/// The opening line of a variable definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefinitionHeader<'a> {
    /// `={name}=value`, the value taken verbatim.
    Single { name: &'a str, value: &'a str },
    /// `={name}<<=`, anything after the opener is ignored.
    Multi { name: &'a str },
}

fn digits<'a>(count: usize) -> impl FnMut(&mut Input<'a>) -> IResult<&'a str> {
    move |input: &mut Input<'a>| take_while(count, |c: char| c.is_ascii_digit()).parse_next(input)
}

/// Parse a `YYYY-MM-DD` date
fn date<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (digits(4), '-', digits(2), '-', digits(2))
        .take()
        .parse_next(input)
}

/// Parse the `={name}` head of a definition
fn variable_name<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    delimited("={", take_while(1.., |c: char| c != '}'), '}').parse_next(input)
}

fn definition<'a>(input: &mut Input<'a>) -> IResult<DefinitionHeader<'a>> {
    let name = variable_name.parse_next(input)?;
    alt((
        preceded('=', rest).map(move |value| DefinitionHeader::Single { name, value }),
        preceded("<<=", rest).map(move |_| DefinitionHeader::Multi { name }),
    ))
    .parse_next(input)
}

/// Parse a `${name}` reference
fn reference<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    delimited("${", take_while(1.., |c: char| c != '}'), '}').parse_next(input)
}

/// Parse an ATX heading prefix; longer prefixes first
fn heading<'a>(input: &mut Input<'a>) -> IResult<(u8, &'a str)> {
    (
        alt(("### ".value(3u8), "## ".value(2u8), "# ".value(1u8))),
        rest,
    )
        .parse_next(input)
}

/// Whether the whole text is a `YYYY-MM-DD` date.
pub(crate) fn is_date(text: &str) -> bool {
    date.parse(text).is_ok()
}

/// Recognize a variable definition opener at the start of an untrimmed line.
pub(crate) fn definition_header(line: &str) -> Option<DefinitionHeader<'_>> {
    definition.parse(line).ok()
}

/// Whether an untrimmed line closes a multi-line definition.
pub(crate) fn is_definition_close(line: &str) -> bool {
    line.starts_with("=>>")
}

/// The variable name when the trimmed line is exactly one `${name}`.
pub(crate) fn standalone_reference(trimmed: &str) -> Option<&str> {
    reference.parse(trimmed).ok()
}

/// The label text of a `{{ label }}` line, trimmed and possibly empty.
pub(crate) fn version_label(trimmed: &str) -> Option<&str> {
    trimmed
        .strip_prefix("{{")
        .and_then(|inner| inner.strip_suffix("}}"))
        .map(str::trim)
}

/// The label text of a `{ label }` line.
///
/// Double-brace lines, empty labels and the reserved analysis labels are
/// not segment labels.
pub(crate) fn segment_label(trimmed: &str) -> Option<&str> {
    if trimmed.starts_with("{{") {
        return None;
    }
    let label = trimmed
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))?
        .trim();
    (!label.is_empty() && !RESERVED_LABELS.contains(&label)).then_some(label)
}

/// Heading depth (1 to 3) and text of a `#`, `##` or `###` line.
pub(crate) fn heading_line(trimmed: &str) -> Option<(u8, &str)> {
    let mut input = trimmed;
    heading
        .parse_next(&mut input)
        .ok()
        .map(|(depth, text)| (depth, text.trim()))
}

/// The value of a `Name: value` audio reference line, trimmed.
pub(crate) fn audio_reference<'a>(line: &'a str, platform: &str) -> Option<&'a str> {
    line.strip_prefix(platform)?
        .strip_prefix(':')
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_date() {
        assert!(is_date("2024-03-09"));
        assert!(!is_date("2024-3-09"));
        assert!(!is_date("2024-03-09 "));
        assert!(!is_date("Anonymous"));
        assert!(!is_date(""));
    }

    #[test]
    fn test_single_definition_keeps_value_verbatim() {
        assert_eq!(
            definition_header("={who}= the night watch"),
            Some(DefinitionHeader::Single {
                name: "who",
                value: " the night watch"
            })
        );
        assert_eq!(
            definition_header("={empty}="),
            Some(DefinitionHeader::Single {
                name: "empty",
                value: ""
            })
        );
    }

    #[test]
    fn test_multi_definition_opener() {
        assert_eq!(
            definition_header("={chorus}<<= anything"),
            Some(DefinitionHeader::Multi { name: "chorus" })
        );
    }

    #[test]
    fn test_definition_must_start_the_line() {
        assert_eq!(definition_header(" ={x}=1"), None);
        assert_eq!(definition_header("={}=1"), None);
        assert_eq!(definition_header("={x}"), None);
    }

    #[test]
    fn test_definition_close() {
        assert!(is_definition_close("=>>"));
        assert!(is_definition_close("=>> trailing"));
        assert!(!is_definition_close(" =>>"));
    }

    #[test]
    fn test_standalone_reference() {
        assert_eq!(standalone_reference("${chorus}"), Some("chorus"));
        assert_eq!(standalone_reference("${a} ${b}"), None);
        assert_eq!(standalone_reference("x ${a}"), None);
        assert_eq!(standalone_reference("${}"), None);
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label("{{ Radio edit }}"), Some("Radio edit"));
        assert_eq!(version_label("{{}}"), Some(""));
        assert_eq!(version_label("{Verse}"), None);
    }

    #[test]
    fn test_segment_label() {
        assert_eq!(segment_label("{ Verse 1 }"), Some("Verse 1"));
        assert_eq!(segment_label("{Synopsis}"), None);
        assert_eq!(segment_label("{Full}"), None);
        assert_eq!(segment_label("{  }"), None);
        assert_eq!(segment_label("{{Version}}"), None);
        assert_eq!(segment_label("{open"), None);
    }

    #[test]
    fn test_heading_line() {
        assert_eq!(heading_line("# Form"), Some((1, "Form")));
        assert_eq!(heading_line("## Imagery "), Some((2, "Imagery")));
        assert_eq!(heading_line("### Sound"), Some((3, "Sound")));
        assert_eq!(heading_line("#### Too deep"), None);
        assert_eq!(heading_line("#hashtag"), None);
    }

    #[test]
    fn test_audio_reference() {
        assert_eq!(audio_reference("Suno: song/abc", "Suno"), Some("song/abc"));
        assert_eq!(audio_reference("Suno:", "Suno"), Some(""));
        assert_eq!(audio_reference("Sunoish: x", "Suno"), None);
    }
}
