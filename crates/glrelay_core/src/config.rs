//! # Engine Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file is a valid config.
//!
//! ```toml
//! batch_capacity = 512
//! frame_interval_ms = 16
//! headless_viewport = [300, 150]
//! supported_extensions = []
//!
//! [context_attributes]
//! alpha = true
//! premultipliedAlpha = false
//! ```

use std::path::Path;
use std::time::Duration;

use glrelay_shared::ContextAttributes;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings shared by every context of a registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlRelayConfig {
    /// Ops reserved up front in each new batch.
    pub batch_capacity: usize,
    /// Viewport set at init when the default framebuffer is incomplete.
    pub headless_viewport: [i32; 2],
    /// Period of the execution thread's frame tick (ms).
    pub frame_interval_ms: u64,
    /// Attributes reported by `getContextAttributes`.
    pub context_attributes: ContextAttributes,
    /// Names reported by `getSupportedExtensions`.
    pub supported_extensions: Vec<String>,
}

impl Default for GlRelayConfig {
    fn default() -> Self {
        Self {
            batch_capacity: 256,
            headless_viewport: [300, 150],
            frame_interval_ms: 16, // ~60 fps
            context_attributes: ContextAttributes::default(),
            supported_extensions: Vec::new(),
        }
    }
}

impl GlRelayConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown fields,
    /// [`ConfigError::Invalid`] on unusable values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file can't be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "frame_interval_ms must be greater than 0".into(),
            ));
        }
        if self.headless_viewport.iter().any(|d| *d <= 0) {
            return Err(ConfigError::Invalid(format!(
                "headless_viewport must be positive, got {:?}",
                self.headless_viewport
            )));
        }
        Ok(())
    }

    /// The frame tick as a [`Duration`].
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = GlRelayConfig::from_toml_str("").unwrap();
        assert_eq!(config, GlRelayConfig::default());
        assert_eq!(config.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_partial_document_overrides() {
        let config = GlRelayConfig::from_toml_str(
            r#"
            batch_capacity = 8
            supported_extensions = ["OES_texture_float"]

            [context_attributes]
            premultipliedAlpha = true
            "#,
        )
        .unwrap();
        assert_eq!(config.batch_capacity, 8);
        assert_eq!(config.headless_viewport, [300, 150]);
        assert!(config.context_attributes.premultiplied_alpha);
        assert!(config.context_attributes.alpha);
        assert_eq!(config.supported_extensions, vec!["OES_texture_float"]);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            GlRelayConfig::from_toml_str("frame_interval_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GlRelayConfig::from_toml_str("unknown_field = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = GlRelayConfig::from_file("/nonexistent/glrelay.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
