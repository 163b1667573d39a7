//! Serializable transformer settings.
//!
//! [`TransposeSettings`] is the configuration a host tile layer passes in,
//! usually as JSON:
//!
//! ```json
//! {
//!   "tileSize": 256,
//!   "enableCanvas": true,
//!   "transposeColors": [
//!     { "from": "#000000", "to": "#0000ff", "rgbWindow": 5, "alpha": 100 }
//!   ]
//! }
//! ```
//!
//! Rule colors stay strings here. They are parsed once by
//! [`TransposeSettings::compile_rules`], which drops malformed rules instead
//! of failing the whole layer.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::color::ColorError;
use crate::rule::{ColorRule, RuleEvaluation};

/// Default edge length of a square tile, in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

// ============================================================================
// RuleSettings
// ============================================================================

/// Serializable form of a [`ColorRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct RuleSettings {
    /// Color to match, as `#RGB` or `#RRGGBB`.
    pub from: String,

    /// Replacement color, as `#RGB` or `#RRGGBB`.
    pub to: String,

    /// Per-channel tolerance around `from`.
    #[serde(default)]
    pub rgb_window: u32,

    /// Replacement alpha (0-255). Omit to keep the pixel's alpha.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<u8>,
}

impl RuleSettings {
    pub fn new(from: impl Into<String>, to: impl Into<String>, rgb_window: u32) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            rgb_window,
            alpha: None,
        }
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Parses the rule's colors.
    pub fn compile(&self) -> Result<ColorRule, ColorError> {
        ColorRule::from_hex(&self.from, &self.to, self.rgb_window, self.alpha)
    }
}

impl From<&ColorRule> for RuleSettings {
    fn from(rule: &ColorRule) -> Self {
        Self {
            from: crate::color::to_hex(rule.from),
            to: crate::color::to_hex(rule.to),
            rgb_window: rule.window,
            alpha: rule.alpha,
        }
    }
}

// ============================================================================
// TransposeSettings
// ============================================================================

/// Complete transformer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct TransposeSettings {
    /// Edge length of the square drawing surface tiles are decoded into.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Set to `false` to force passthrough even when a surface is available.
    #[serde(default = "default_true")]
    pub enable_canvas: bool,

    /// Rules in evaluation order.
    #[serde(default)]
    pub transpose_colors: Vec<RuleSettings>,

    #[serde(default)]
    pub rule_evaluation: RuleEvaluation,
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

fn default_true() -> bool {
    true
}

impl Default for TransposeSettings {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            enable_canvas: true,
            transpose_colors: Vec::new(),
            rule_evaluation: RuleEvaluation::default(),
        }
    }
}

impl TransposeSettings {
    /// Creates settings with default tile size and no rules.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_canvas(mut self, enabled: bool) -> Self {
        self.enable_canvas = enabled;
        self
    }

    /// Appends a rule after the existing ones.
    pub fn with_rule(mut self, rule: RuleSettings) -> Self {
        self.transpose_colors.push(rule);
        self
    }

    pub fn with_rule_evaluation(mut self, mode: RuleEvaluation) -> Self {
        self.rule_evaluation = mode;
        self
    }

    /// Parses every rule, keeping configuration order.
    ///
    /// A rule whose `from` or `to` is not a valid hex color is skipped and
    /// logged; the remaining rules still apply.
    pub fn compile_rules(&self) -> Vec<ColorRule> {
        self.transpose_colors
            .iter()
            .enumerate()
            .filter_map(|(index, settings)| match settings.compile() {
                Ok(rule) => Some(rule),
                Err(error) => {
                    warn!(
                        index,
                        from = %settings.from,
                        to = %settings.to,
                        %error,
                        "skipping color rule with malformed color"
                    );
                    None
                }
            })
            .collect()
    }

    /// Serializes the settings to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the settings to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Tests
// ============================================================================
