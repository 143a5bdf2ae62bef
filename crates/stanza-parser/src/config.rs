//! Parser configuration.

/// Settings that shape the parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    /// Author used when a poem names none and no `author` variable is set.
    pub default_author: String,
    /// HTML heading level for `#` in analysis text. `##` and `###` map to
    /// the next two levels. Clamped to `1..=4`.
    pub heading_base_level: u8,
    /// Recognized audio platforms.
    pub audio: AudioPlatforms,
}

impl ParseConfig {
    /// Create a config with the given default author and the standard
    /// heading level and audio platforms.
    pub fn new(default_author: impl Into<String>) -> Self {
        Self {
            default_author: default_author.into(),
            ..Self::default()
        }
    }

    /// The HTML heading level for a heading of the given depth (1 to 3).
    pub fn heading_level(&self, depth: u8) -> u8 {
        self.heading_base_level.clamp(1, 4) + depth.clamp(1, 3) - 1
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            default_author: "Anonymous".to_string(),
            heading_base_level: 3,
            audio: AudioPlatforms::default(),
        }
    }
}

/// Audio platform names as they appear in `.poem` source.
///
/// A flag platform is a bare line (`Audiomack`); a reference platform is a
/// `Name: value` line (`Suno: song/abc123`). Parsed entries are keyed by the
/// lower-cased name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPlatforms {
    pub flags: Vec<String>,
    pub references: Vec<String>,
}

impl AudioPlatforms {
    pub fn new(flags: Vec<String>, references: Vec<String>) -> Self {
        Self { flags, references }
    }

    /// The source spelling of a platform, looked up by its output key.
    pub fn display_name(&self, key: &str) -> Option<&str> {
        self.flags
            .iter()
            .chain(&self.references)
            .find(|name| name.to_lowercase() == key)
            .map(String::as_str)
    }
}

impl Default for AudioPlatforms {
    fn default() -> Self {
        Self {
            flags: vec!["Audiomack".to_string()],
            references: vec!["Suno".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        let config = ParseConfig::default();
        assert_eq!(config.heading_level(1), 3);
        assert_eq!(config.heading_level(3), 5);

        let config = ParseConfig {
            heading_base_level: 9,
            ..ParseConfig::default()
        };
        assert_eq!(config.heading_level(3), 6);
    }

    #[test]
    fn test_display_name() {
        let platforms = AudioPlatforms::default();
        assert_eq!(platforms.display_name("audiomack"), Some("Audiomack"));
        assert_eq!(platforms.display_name("suno"), Some("Suno"));
        assert_eq!(platforms.display_name("bandcamp"), None);
    }
}
