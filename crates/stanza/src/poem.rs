//! Writing documents back out as `.poem` source.
//!
//! The layout mirrors hand-written poems: blank lines between segments,
//! `----` between versions and notes, and a `====` after the versions,
//! audio and postscript sections whether or not they have content.

use stanza_core::document::{AudioEntry, Document, PostscriptNote};
use stanza_parser::ParseConfig;

use crate::{StanzaError, html::html_to_markup};

const NBSP: &str = "&nbsp;";

/// Line buffer for the output text.
#[derive(Debug, Default)]
struct PoemWriter {
    lines: Vec<String>,
}

impl PoemWriter {
    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn blank(&mut self, count: usize) {
        self.lines.extend(std::iter::repeat_n(String::new(), count));
    }

    fn finish(self) -> String {
        let mut text = self.lines.join("\n");
        text.truncate(text.trim_end_matches('\n').len());
        text.push('\n');
        text
    }
}

/// Reconstruct `.poem` source for a document.
///
/// The author line is left out when it equals the configured default
/// author. Prose is converted back to inline markup with
/// [`html_to_markup`], which is lossy for headings and escaped characters.
///
/// # Errors
///
/// Returns [`StanzaError::Document`] if the document has no versions or a
/// version has no segments.
pub fn write_poem(document: &Document, config: &ParseConfig) -> Result<String, StanzaError> {
    let mut out = PoemWriter::default();

    out.line(document.title());
    if document.author() != config.default_author {
        out.line(document.author());
    }
    out.line(document.date());
    out.blank(1);

    write_versions(&mut out, document)?;
    write_audio(&mut out, document, config);
    write_postscript(&mut out, document, config);
    write_analysis(&mut out, document, config);

    Ok(out.finish())
}

fn write_versions(out: &mut PoemWriter, document: &Document) -> Result<(), StanzaError> {
    let versions = document.versions();
    if versions.is_empty() {
        return Err(StanzaError::Document(format!(
            "`{}` has no versions",
            document.title()
        )));
    }

    for (i, version) in versions.iter().enumerate() {
        if let Some(label) = version.label() {
            out.line(format!("{{{{ {label} }}}}"));
            out.blank(1);
        }

        let segments = version.segments();
        if segments.is_empty() {
            return Err(StanzaError::Document(format!(
                "version {} of `{}` has no segments",
                i + 1,
                document.title()
            )));
        }
        for (j, segment) in segments.iter().enumerate() {
            if let Some(label) = segment.label() {
                out.line(format!("{{{label}}}"));
            }
            let lines = segment.lines();
            let lines = lines.strip_suffix('\n').unwrap_or(lines);
            out.line(lines.replace(NBSP, " "));
            if j + 1 < segments.len() {
                out.blank(1);
            }
        }

        if i + 1 < versions.len() {
            out.blank(2);
            out.line("----");
            out.blank(2);
        }
    }

    out.blank(1);
    out.line("====");
    out.blank(1);
    Ok(())
}

fn write_audio(out: &mut PoemWriter, document: &Document, config: &ParseConfig) {
    if let Some(audio) = document.audio() {
        for (key, entry) in audio.iter() {
            let name = config
                .audio
                .display_name(key)
                .map_or_else(|| capitalize(key), str::to_string);
            match entry {
                AudioEntry::Flag(true) => out.line(name),
                AudioEntry::Flag(false) => {}
                AudioEntry::Reference(value) => out.line(format!("{name}: {value}")),
            }
        }
        out.blank(1);
    }

    out.line("====");
    out.blank(1);
}

fn write_postscript(out: &mut PoemWriter, document: &Document, config: &ParseConfig) {
    let notes = document.postscript().unwrap_or_default();
    for (i, note) in notes.iter().enumerate() {
        match note {
            PostscriptNote::Reference { target } => {
                out.line("<<<");
                out.line(format!("  - $ref: \"{target}\""));
                out.line(">>>");
            }
            PostscriptNote::Prose { label, content } => {
                if let Some(label) = label {
                    out.line(format!("{{{label}}}"));
                }
                if let Some(content) = content {
                    out.line(html_to_markup(content, config.heading_base_level));
                }
            }
        }

        if i + 1 < notes.len() {
            out.blank(2);
            out.line("----");
            out.blank(1);
        }
    }
    if !notes.is_empty() {
        out.blank(1);
    }

    out.line("====");
    out.blank(1);
}

fn write_analysis(out: &mut PoemWriter, document: &Document, config: &ParseConfig) {
    let Some(analysis) = document.analysis() else {
        return;
    };

    if let Some(synopsis) = analysis.synopsis() {
        out.line("{Synopsis}");
        out.blank(1);
        out.line(html_to_markup(synopsis, config.heading_base_level));
        out.blank(2);
    }
    if let Some(full) = analysis.full() {
        out.line("{Full}");
        out.blank(1);
        out.line(html_to_markup(full, config.heading_base_level));
        out.blank(1);
    }

    out.line("====");
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use stanza_core::document::{Analysis, Audio, Segment, Version};

    use super::*;

    fn two_versions() -> Document {
        Document::new(
            "Low Tide",
            "Anonymous",
            "2024-03-09",
            vec![
                Version::new(
                    Some("Album".to_string()),
                    vec![
                        Segment::new(Some("Verse".to_string()), "a\n&nbsp;&nbsp;b\n"),
                        Segment::new(None, "c\n"),
                    ],
                ),
                Version::new(None, vec![Segment::new(None, "d\n")]),
            ],
        )
    }

    #[test]
    fn test_minimal_layout() {
        let poem = write_poem(&two_versions(), &ParseConfig::default()).expect("writes");
        assert_eq!(
            poem,
            "Low Tide\n2024-03-09\n\n{{ Album }}\n\n{Verse}\na\n  b\n\nc\n\n\n----\n\n\nd\n\n====\n\n====\n\n====\n"
        );
    }

    #[test]
    fn test_author_line_when_not_default() {
        let document = Document::new(
            "T",
            "R. Vale",
            "2024-01-01",
            vec![Version::new(None, vec![Segment::new(None, "x\n")])],
        );
        let poem = write_poem(&document, &ParseConfig::default()).expect("writes");
        assert!(poem.starts_with("T\nR. Vale\n2024-01-01\n"));

        let poem = write_poem(&document, &ParseConfig::new("R. Vale")).expect("writes");
        assert!(poem.starts_with("T\n2024-01-01\n"));
    }

    #[test]
    fn test_optional_sections() {
        let mut audio = Audio::new();
        audio.insert("audiomack", AudioEntry::Flag(true));
        audio.insert("suno", AudioEntry::Reference("song/x".to_string()));
        audio.insert("bandcamp", AudioEntry::Flag(true));

        let document = two_versions()
            .with_audio(audio)
            .with_postscript(vec![
                PostscriptNote::prose(
                    Some("Note".to_string()),
                    Some("<p>It&#39;s <em>late</em>.</p>\n".to_string()),
                ),
                PostscriptNote::reference("shared.yaml#/license"),
            ])
            .with_analysis(Analysis::new(
                Some("<p>Short.</p>\n".to_string()),
                Some("<h3>Form</h3>\n\n<p>Long.</p>\n".to_string()),
            ));

        let poem = write_poem(&document, &ParseConfig::default()).expect("writes");
        let tail = poem.split_once("d\n\n====\n\n").expect("versions end").1;
        assert_eq!(
            tail,
            "Audiomack\nSuno: song/x\nBandcamp\n\n====\n\n\
             {Note}\nIt's _late_.\n\n\n----\n\n<<<\n  - $ref: \"shared.yaml#/license\"\n>>>\n\n====\n\n\
             {Synopsis}\n\nShort.\n\n\n{Full}\n\n# Form\n\nLong.\n\n====\n"
        );
    }

    #[test]
    fn test_no_versions_is_error() {
        let document = Document::new("T", "A", "2024-01-01", Vec::new());
        assert!(matches!(
            write_poem(&document, &ParseConfig::default()),
            Err(StanzaError::Document(_))
        ));
    }
}
