//! # Configuration
//!
//! Settings for the hover preview, decoded from YAML (CLI) or from a JavaScript object
//! (browser shell). Every key is optional; omitted keys take the defaults below.
//!
//! ```yaml
//! hover-delay-ms: 300
//! article-path: /wiki/
//! api-path: /w/api.php
//! preference: abcHoverPreviewMouseHover
//! placement: centered   # or: offset
//! style: arrow          # or: plain
//! gap: 10
//! header-label: Incipit
//! scale: 0.5
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::HoverError;
use crate::placement::{PlacementStrategy, TooltipPlacer, TooltipStyle};

/// Longest accepted hover delay.
const MAX_HOVER_DELAY_MS: u32 = 10_000;

/// Configuration as written by the user, before defaults and validation.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct RawConfig {
    pub hover_delay_ms: Option<u32>,
    pub article_path: Option<String>,
    pub api_path: Option<String>,
    pub preference: Option<String>,
    pub placement: Option<PlacementStrategy>,
    pub style: Option<TooltipStyle>,
    pub gap: Option<f64>,
    pub header_label: Option<String>,
    pub scale: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewConfig {
    /// Delay between hovering a link and fetching its preview.
    pub hover_delay_ms: u32,
    /// Href prefix identifying article links.
    pub article_path: String,
    /// Action API endpoint.
    pub api_path: String,
    /// User option enabling the preview.
    pub preference: String,
    pub placement: PlacementStrategy,
    pub style: TooltipStyle,
    /// Distance between cursor and tooltip, in pixels.
    pub gap: f64,
    pub header_label: String,
    /// CSS scale applied to the rendered tooltip.
    pub scale: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            hover_delay_ms: 300,
            article_path: "/wiki/".to_string(),
            api_path: "/w/api.php".to_string(),
            preference: "abcHoverPreviewMouseHover".to_string(),
            placement: PlacementStrategy::Centered,
            style: TooltipStyle::Arrow,
            gap: 10.0,
            header_label: "Incipit".to_string(),
            scale: 0.5,
        }
    }
}

impl PreviewConfig {
    pub fn from_yaml(source: &str) -> Result<Self, HoverError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawConfig = serde_yaml::from_str(source)
            .map_err(|e| HoverError::ConfigError(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Apply defaults to a [`RawConfig`] and validate the result.
    pub fn from_raw(raw: RawConfig) -> Result<Self, HoverError> {
        let defaults = Self::default();
        let config = Self {
            hover_delay_ms: raw.hover_delay_ms.unwrap_or(defaults.hover_delay_ms),
            article_path: raw.article_path.unwrap_or(defaults.article_path),
            api_path: raw.api_path.unwrap_or(defaults.api_path),
            preference: raw.preference.unwrap_or(defaults.preference),
            placement: raw.placement.unwrap_or(defaults.placement),
            style: raw.style.unwrap_or(defaults.style),
            gap: raw.gap.unwrap_or(defaults.gap),
            header_label: raw.header_label.unwrap_or(defaults.header_label),
            scale: raw.scale.unwrap_or(defaults.scale),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HoverError> {
        if self.hover_delay_ms > MAX_HOVER_DELAY_MS {
            return Err(HoverError::ConfigError(format!(
                "hover-delay-ms must be at most {}, got {}",
                MAX_HOVER_DELAY_MS, self.hover_delay_ms
            )));
        }
        if self.article_path.is_empty() {
            return Err(HoverError::ConfigError(
                "article-path must not be empty".to_string(),
            ));
        }
        if self.api_path.is_empty() {
            return Err(HoverError::ConfigError("api-path must not be empty".to_string()));
        }
        if !self.gap.is_finite() || self.gap < 0.0 {
            return Err(HoverError::ConfigError(format!(
                "gap must be a non-negative number, got {}",
                self.gap
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(HoverError::ConfigError(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }

    pub fn hover_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.hover_delay_ms))
    }

    pub fn placer(&self) -> TooltipPlacer {
        TooltipPlacer::new(self.placement, self.gap)
    }
}
