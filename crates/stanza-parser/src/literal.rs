//! `<<<` / `>>>` literal blocks.
//!
//! A literal block's content is never run through the markup inliner. When
//! it holds a `$ref` entry it stands for shared content in another file:
//!
//! ```text
//! <<<
//!   - $ref: "shared.yaml#/disclaimer"
//! >>>
//! ```

use log::debug;
use serde_yaml::Value;

/// What a literal block turned out to contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LiteralBlock {
    /// A `$ref` pointer, taken verbatim.
    Reference(String),
    /// Raw content, the block's lines joined with `\n`.
    Content(String),
}

/// Classify the lines between `<<<` and `>>>`.
///
/// Content counts as a reference when it mentions `$ref:` and parses as
/// YAML into a sequence whose first item carries a string `$ref`, or into a
/// mapping with one. Anything else, invalid YAML included, is raw content.
pub(crate) fn classify(lines: &[String]) -> LiteralBlock {
    let content = lines.join("\n");
    let trimmed = content.trim();
    if trimmed.contains("$ref:") {
        match serde_yaml::from_str::<Value>(trimmed) {
            Ok(value) => {
                if let Some(target) = reference_target(&value) {
                    return LiteralBlock::Reference(target.to_string());
                }
            }
            Err(err) => debug!(err:%; "literal block is not a reference"),
        }
    }
    LiteralBlock::Content(content)
}

fn reference_target(value: &Value) -> Option<&str> {
    let entry = match value {
        Value::Sequence(items) => items.first()?,
        Value::Mapping(_) => value,
        _ => return None,
    };
    entry
        .get("$ref")
        .and_then(Value::as_str)
        .filter(|target| !target.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_sequence_reference() {
        assert_eq!(
            classify(&lines(r#"  - $ref: "shared.yaml#/disclaimer""#)),
            LiteralBlock::Reference("shared.yaml#/disclaimer".to_string())
        );
    }

    #[test]
    fn test_mapping_reference() {
        assert_eq!(
            classify(&lines("$ref: notes.yaml")),
            LiteralBlock::Reference("notes.yaml".to_string())
        );
    }

    #[test]
    fn test_raw_content_kept_verbatim() {
        let raw = lines("<div class=\"x\">\n  <b>bold</b>\n</div>");
        assert_eq!(
            classify(&raw),
            LiteralBlock::Content("<div class=\"x\">\n  <b>bold</b>\n</div>".to_string())
        );
    }

    #[test]
    fn test_invalid_yaml_with_ref_is_content() {
        let raw = lines("$ref: [unclosed");
        assert_eq!(
            classify(&raw),
            LiteralBlock::Content("$ref: [unclosed".to_string())
        );
    }

    #[test]
    fn test_ref_in_non_leading_item_is_content() {
        let raw = lines("- label: x\n- $ref: a.yaml");
        assert!(matches!(classify(&raw), LiteralBlock::Content(_)));
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(classify(&[]), LiteralBlock::Content(String::new()));
    }
}
