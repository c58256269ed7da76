//! Engine configuration
//!
//! Defaults match the mail client the extension targets. Hosts override
//! individual keys with string pairs when a document is created.

use crate::error::ConfigError;
use std::time::Duration;

/// Runtime options for highlighting, monitoring and inbox scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Tag of inserted highlight markers
    pub marker_tag: String,
    /// Reserved class token identifying markers this engine created
    pub marker_class: String,
    /// Class of the message body elements watched and highlighted
    pub body_class: String,
    /// Elements never descended into when flattening
    pub opaque_tags: Vec<String>,
    /// Quiet period after the last relevant mutation
    pub debounce: Duration,
    /// Inbox list item class
    pub item_class: String,
    /// Subject element class inside an item
    pub subject_class: String,
    /// Snippet element class inside an item
    pub snippet_class: String,
    /// Class added to flagged items
    pub flag_class: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            marker_tag: "mark".to_string(),
            marker_class: "spamlight-hit".to_string(),
            body_class: "a3s".to_string(),
            opaque_tags: ["script", "style", "svg", "noscript", "template"]
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
            debounce: Duration::from_millis(100),
            item_class: "zA".to_string(),
            subject_class: "bog".to_string(),
            snippet_class: "y2".to_string(),
            flag_class: "highlighted-spam".to_string(),
        }
    }
}

impl EngineConfig {
    /// Build a config from defaults plus `(key, value)` overrides
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, ConfigError> {
        let mut config = EngineConfig::default();
        for (key, value) in pairs {
            config.set(key, value)?;
        }
        Ok(config)
    }

    /// Apply a single override
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "marker_tag" => self.marker_tag = tag_name(value).ok_or_else(invalid)?,
            "marker_class" => self.marker_class = class_token(value).ok_or_else(invalid)?,
            "body_class" => self.body_class = class_token(value).ok_or_else(invalid)?,
            "item_class" => self.item_class = class_token(value).ok_or_else(invalid)?,
            "subject_class" => self.subject_class = class_token(value).ok_or_else(invalid)?,
            "snippet_class" => self.snippet_class = class_token(value).ok_or_else(invalid)?,
            "flag_class" => self.flag_class = class_token(value).ok_or_else(invalid)?,
            "opaque_tags" => {
                self.opaque_tags = value
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(|tag| tag_name(tag).ok_or_else(invalid))
                    .collect::<Result<_, _>>()?;
            }
            "debounce_ms" => {
                let ms: u64 = value.trim().parse().map_err(|_| invalid())?;
                self.debounce = Duration::from_millis(ms);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Check whether an element name is excluded from flattening
    pub fn is_opaque_tag(&self, name: &str) -> bool {
        self.opaque_tags.iter().any(|tag| tag == name)
    }
}

/// Lower-cased element name, alphanumeric plus '-'
fn tag_name(value: &str) -> Option<String> {
    let value = value.trim();
    let valid = value
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic())
        && value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-');
    valid.then(|| value.to_ascii_lowercase())
}

/// A single class token: non-empty, no whitespace
fn class_token(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty() && !value.contains(char::is_whitespace)).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.marker_tag, "mark");
        assert_eq!(config.body_class, "a3s");
        assert_eq!(config.debounce, Duration::from_millis(100));
        assert!(config.is_opaque_tag("script"));
        assert!(!config.is_opaque_tag("b"));
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_pairs(&pairs(&[
            ("marker_tag", "SPAN"),
            ("debounce_ms", "250"),
            ("opaque_tags", "script, pre ,"),
        ]))
        .unwrap();
        assert_eq!(config.marker_tag, "span");
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.opaque_tags, vec!["script", "pre"]);
    }

    #[test]
    fn test_unknown_key() {
        let err = EngineConfig::from_pairs(&pairs(&[("colour", "red")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownKey("colour".into()));
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("marker_class", "two words"),
            ("marker_class", "  "),
            ("marker_tag", "<b>"),
            ("debounce_ms", "soon"),
            ("opaque_tags", "script,1x"),
        ] {
            let result = EngineConfig::from_pairs(&pairs(&[(key, value)]));
            assert!(
                matches!(result, Err(ConfigError::InvalidValue { .. })),
                "{} = {:?} should be rejected",
                key,
                value
            );
        }
    }
}
