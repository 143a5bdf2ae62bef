//! YAML storage format for parsed documents.
//!
//! The YAML form is lossless: [`from_yaml`] of [`to_yaml`] reproduces the
//! document exactly. Field order follows the [`Document`] struct.

use log::trace;

use stanza_core::document::Document;

use crate::StanzaError;

/// Serialize a document to YAML.
///
/// # Errors
///
/// Returns [`StanzaError::Yaml`] if serialization fails.
pub fn to_yaml(document: &Document) -> Result<String, StanzaError> {
    let yaml = serde_yaml::to_string(document)?;
    trace!(bytes = yaml.len(); "Serialized document");
    Ok(yaml)
}

/// Deserialize a document from YAML.
///
/// A missing `slug` is derived from the title.
///
/// # Errors
///
/// Returns [`StanzaError::Yaml`] if the text is not a valid document.
pub fn from_yaml(yaml: &str) -> Result<Document, StanzaError> {
    let mut document: Document = serde_yaml::from_str(yaml)?;
    document.ensure_slug();
    Ok(document)
}

#[cfg(test)]
mod tests {
    use stanza_core::document::{
        Analysis, Audio, AudioEntry, PostscriptNote, Segment, Version,
    };

    use super::*;

    fn sample() -> Document {
        let mut audio = Audio::new();
        audio.insert("audiomack", AudioEntry::Flag(true));
        audio.insert("suno", AudioEntry::Reference("song/abc".to_string()));

        Document::new(
            "Low Tide",
            "Anonymous",
            "2024-03-09",
            vec![Version::new(
                Some("Album".to_string()),
                vec![Segment::new(Some("Verse".to_string()), "a\nb\n")],
            )],
        )
        .with_audio(audio)
        .with_postscript(vec![
            PostscriptNote::prose(Some("Note".to_string()), Some("<p>x</p>\n".to_string())),
            PostscriptNote::reference("shared.yaml#/disclaimer"),
        ])
        .with_analysis(Analysis::new(Some("<p>s</p>\n".to_string()), None))
    }

    #[test]
    fn test_round_trip() {
        let document = sample();
        let yaml = to_yaml(&document).expect("serializes");
        assert_eq!(from_yaml(&yaml).expect("deserializes"), document);
    }

    #[test]
    fn test_field_order_and_shape() {
        let yaml = to_yaml(&sample()).expect("serializes");
        let keys = [
            "title:",
            "author:",
            "date:",
            "slug:",
            "versions:",
            "audio:",
            "postscript:",
            "analysis:",
        ];
        let order: Vec<usize> = keys
            .iter()
            .map(|key| yaml.find(key).expect(key))
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{yaml}");
        assert!(yaml.contains("$ref:"), "{yaml}");
        assert!(yaml.contains("audiomack: true"), "{yaml}");
        assert!(!yaml.contains("full:"), "{yaml}");
    }

    #[test]
    fn test_missing_slug_is_derived() {
        let yaml = "title: Low Tide\nauthor: A\ndate: '2024-03-09'\nversions:\n- segments:\n  - lines: |\n      a\n";
        let document = from_yaml(yaml).expect("deserializes");
        assert_eq!(document.slug(), "low-tide");
        assert_eq!(document.versions()[0].segments()[0].lines(), "a\n");
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(matches!(from_yaml("title: [unclosed"), Err(StanzaError::Yaml(_))));
    }
}
