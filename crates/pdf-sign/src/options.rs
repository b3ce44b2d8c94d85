use crate::constants::*;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tuning for overlay pointer interactions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InteractionConfig {
    /// Pixel distance from an overlay edge that starts a resize
    pub edge_threshold_px: f32,
    /// Resize floor for width and height, as a page fraction
    pub min_size: f32,
    /// Size of a signature placed by clicking on a page
    pub default_width: f32,
    pub default_height: f32,
    /// Width pages are rendered at for on-screen placement
    pub render_width_px: u32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            edge_threshold_px: EDGE_THRESHOLD_PX,
            min_size: MIN_SIGNATURE_SIZE,
            default_width: DEFAULT_SIGNATURE_WIDTH,
            default_height: DEFAULT_SIGNATURE_HEIGHT,
            render_width_px: DEFAULT_RENDER_WIDTH_PX,
        }
    }
}

/// Upload size limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    pub max_document_bytes: u64,
    pub max_image_bytes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_document_bytes: MAX_DOCUMENT_BYTES,
            max_image_bytes: MAX_IMAGE_BYTES,
        }
    }
}

/// Complete signing configuration
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SignOptions {
    pub interaction: InteractionConfig,
    pub limits: Limits,
}

impl SignOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| SignError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SignError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        let interaction = &self.interaction;

        if !(interaction.edge_threshold_px.is_finite() && interaction.edge_threshold_px >= 0.0) {
            return Err(SignError::Config(
                "Edge threshold must be a non-negative number of pixels".to_string(),
            ));
        }

        if !(interaction.min_size > 0.0 && interaction.min_size < 1.0) {
            return Err(SignError::Config(format!(
                "Minimum signature size must be between 0 and 1, got {}",
                interaction.min_size
            )));
        }

        for (name, value) in [
            ("width", interaction.default_width),
            ("height", interaction.default_height),
        ] {
            if !(value >= interaction.min_size && value <= 1.0) {
                return Err(SignError::Config(format!(
                    "Default signature {} must be between {} and 1, got {}",
                    name, interaction.min_size, value
                )));
            }
        }

        if interaction.render_width_px == 0 {
            return Err(SignError::Config("Render width must be positive".to_string()));
        }

        if self.limits.max_document_bytes == 0 || self.limits.max_image_bytes == 0 {
            return Err(SignError::Config("Size limits must be positive".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SignOptions::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_min_size_above_default() {
        let mut options = SignOptions::default();
        options.interaction.min_size = 0.5;
        assert!(matches!(options.validate(), Err(SignError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_limits() {
        let mut options = SignOptions::default();
        options.limits.max_image_bytes = 0;
        assert!(options.validate().is_err());
    }
}
