//! Color rules and the per-pixel matcher.
//!
//! A [`ColorRule`] rewrites every pixel whose R, G and B each sit inside an
//! inclusive tolerance band around `from`. Alpha never takes part in the
//! match test.
//!
//! # Cumulative application
//!
//! Rules are evaluated in configuration order against the pixel's *current*
//! color. A pixel rewritten by an earlier rule can therefore be matched
//! again by a later one:
//!
//! ```
//! use tile_transpose::{ColorRule, Rgb, match_pixel};
//!
//! let rules = [
//!     ColorRule::new(Rgb::new(0, 0, 0), Rgb::new(255, 0, 0), 0),
//!     ColorRule::new(Rgb::new(255, 0, 0), Rgb::new(0, 255, 0), 0),
//! ];
//!
//! // Black becomes red, then the red is picked up by the second rule.
//! let hit = match_pixel(Rgb::new(0, 0, 0), &rules).unwrap();
//! assert_eq!(hit.color, Rgb::new(0, 255, 0));
//! ```
//!
//! This cascade is kept as the default because it is what existing tile
//! styles were authored against. [`RuleEvaluation::Pristine`] tests every
//! rule against the untouched source color instead.

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::color::{ColorError, Rgb, parse_hex};

// ============================================================================
// ColorRule
// ============================================================================

/// A single color-transposition rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRule {
    /// Center of the tolerance band.
    pub from: Rgb,

    /// Replacement color for matching pixels.
    pub to: Rgb,

    /// Per-channel inclusive tolerance around `from`. Zero means exact match.
    pub window: u32,

    /// Replacement alpha. `None` leaves the pixel's alpha untouched.
    pub alpha: Option<u8>,
}

impl ColorRule {
    /// Creates a rule that keeps the original alpha.
    pub fn new(from: Rgb, to: Rgb, window: u32) -> Self {
        Self {
            from,
            to,
            window,
            alpha: None,
        }
    }

    /// Sets the alpha written to matching pixels.
    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Builds a rule from hex color strings.
    pub fn from_hex(
        from: &str,
        to: &str,
        window: u32,
        alpha: Option<u8>,
    ) -> Result<Self, ColorError> {
        Ok(Self {
            from: parse_hex(from)?,
            to: parse_hex(to)?,
            window,
            alpha,
        })
    }

    /// Returns true if every channel of `color` lies in
    /// `[from - window, from + window]`.
    pub fn contains(&self, color: Rgb) -> bool {
        let window = i64::from(self.window);
        within(color.red, self.from.red, window)
            && within(color.green, self.from.green, window)
            && within(color.blue, self.from.blue, window)
    }
}

fn within(channel: u8, center: u8, window: i64) -> bool {
    (i64::from(channel) - i64::from(center)).abs() <= window
}

// ============================================================================
// Evaluation
// ============================================================================

/// How a pixel is compared against successive rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum RuleEvaluation {
    /// Each rule sees the color left by the rules before it.
    #[default]
    Cascade,

    /// Each rule sees the original source color. The last matching rule
    /// decides the final color; if it has no alpha, the alpha of the last
    /// earlier match that set one is kept.
    Pristine,
}

/// The color (and optionally alpha) a matched pixel is rewritten to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Replacement {
    pub color: Rgb,
    pub alpha: Option<u8>,
}

impl Replacement {
    /// Writes this replacement into an RGBA pixel.
    pub fn apply(&self, pixel: &mut Rgba<u8>) {
        pixel.0[0] = self.color.red;
        pixel.0[1] = self.color.green;
        pixel.0[2] = self.color.blue;
        if let Some(alpha) = self.alpha {
            pixel.0[3] = alpha;
        }
    }
}

/// Matches a pixel against `rules` with [`RuleEvaluation::Cascade`].
///
/// Returns `None` when no rule matched, so the pixel passes through.
pub fn match_pixel(pixel: Rgb, rules: &[ColorRule]) -> Option<Replacement> {
    match_pixel_with(pixel, rules, RuleEvaluation::Cascade)
}

/// Matches a pixel against `rules` using the given evaluation mode.
///
/// A later matching rule without an alpha keeps the alpha set by an earlier
/// match, as if both had written into the same pixel.
pub fn match_pixel_with(
    pixel: Rgb,
    rules: &[ColorRule],
    mode: RuleEvaluation,
) -> Option<Replacement> {
    let mut current: Option<Replacement> = None;

    for rule in rules {
        let candidate = match mode {
            RuleEvaluation::Cascade => current.map_or(pixel, |r| r.color),
            RuleEvaluation::Pristine => pixel,
        };

        if rule.contains(candidate) {
            current = Some(Replacement {
                color: rule.to,
                alpha: rule.alpha.or(current.and_then(|r| r.alpha)),
            });
        }
    }

    current
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: u8, g: u8, b: u8) -> Rgb {
        Rgb::new(r, g, b)
    }

    #[test]
    fn window_band_is_inclusive() {
        let rule = ColorRule::new(rgb(100, 100, 100), rgb(0, 0, 0), 5);

        assert!(rule.contains(rgb(95, 105, 100)));
        assert!(rule.contains(rgb(105, 95, 97)));
        assert!(!rule.contains(rgb(94, 100, 100)));
        assert!(!rule.contains(rgb(100, 106, 100)));
        assert!(!rule.contains(rgb(100, 100, 94)));
    }

    #[test]
    fn zero_window_is_exact_match() {
        let rule = ColorRule::new(rgb(10, 20, 30), rgb(0, 0, 0), 0);

        assert!(rule.contains(rgb(10, 20, 30)));
        assert!(!rule.contains(rgb(11, 20, 30)));
        assert!(!rule.contains(rgb(10, 19, 30)));
    }

    #[test]
    fn band_does_not_wrap_at_channel_edges() {
        let dark = ColorRule::new(rgb(0, 0, 0), rgb(1, 1, 1), 5);
        assert!(dark.contains(rgb(0, 5, 3)));
        assert!(!dark.contains(rgb(250, 0, 0)));

        let light = ColorRule::new(rgb(255, 255, 255), rgb(1, 1, 1), 5);
        assert!(light.contains(rgb(250, 255, 252)));
        assert!(!light.contains(rgb(4, 255, 255)));
    }

    #[test]
    fn huge_window_matches_everything() {
        let rule = ColorRule::new(rgb(0, 0, 0), rgb(1, 1, 1), u32::MAX);
        assert!(rule.contains(rgb(255, 255, 255)));
    }

    #[test]
    fn ocean_rule_matches_near_black() {
        let rules = [ColorRule::from_hex("#000000", "#0000ff", 5, Some(100)).unwrap()];

        let hit = match_pixel(rgb(3, 2, 4), &rules).unwrap();
        assert_eq!(hit.color, rgb(0, 0, 255));
        assert_eq!(hit.alpha, Some(100));

        assert!(match_pixel(rgb(10, 10, 10), &rules).is_none());
    }

    #[test]
    fn no_rules_never_match() {
        assert!(match_pixel(rgb(1, 2, 3), &[]).is_none());
    }

    #[test]
    fn cascade_rematches_rewritten_color() {
        let rules = [
            ColorRule::new(rgb(0, 0, 0), rgb(200, 0, 0), 2),
            ColorRule::new(rgb(200, 0, 0), rgb(0, 200, 0), 0),
        ];

        let hit = match_pixel(rgb(1, 1, 1), &rules).unwrap();
        assert_eq!(hit.color, rgb(0, 200, 0));
    }

    #[test]
    fn pristine_tests_source_color_only() {
        let rules = [
            ColorRule::new(rgb(0, 0, 0), rgb(200, 0, 0), 2),
            ColorRule::new(rgb(200, 0, 0), rgb(0, 200, 0), 0),
        ];

        let hit = match_pixel_with(rgb(1, 1, 1), &rules, RuleEvaluation::Pristine).unwrap();
        assert_eq!(hit.color, rgb(200, 0, 0));
    }

    #[test]
    fn pristine_last_match_wins() {
        let rules = [
            ColorRule::new(rgb(50, 50, 50), rgb(1, 1, 1), 10),
            ColorRule::new(rgb(55, 55, 55), rgb(2, 2, 2), 10),
        ];

        let hit = match_pixel_with(rgb(52, 52, 52), &rules, RuleEvaluation::Pristine).unwrap();
        assert_eq!(hit.color, rgb(2, 2, 2));
    }

    #[test]
    fn cascade_stops_when_rewrite_leaves_band() {
        // The first rule moves the pixel away from the second rule's band.
        let rules = [
            ColorRule::new(rgb(50, 50, 50), rgb(200, 200, 200), 10),
            ColorRule::new(rgb(55, 55, 55), rgb(2, 2, 2), 10),
        ];

        let hit = match_pixel(rgb(52, 52, 52), &rules).unwrap();
        assert_eq!(hit.color, rgb(200, 200, 200));
    }

    #[test]
    fn later_rule_without_alpha_keeps_earlier_alpha() {
        let rules = [
            ColorRule::new(rgb(0, 0, 0), rgb(9, 9, 9), 0).with_alpha(40),
            ColorRule::new(rgb(9, 9, 9), rgb(7, 7, 7), 0),
        ];

        let hit = match_pixel(rgb(0, 0, 0), &rules).unwrap();
        assert_eq!(hit.color, rgb(7, 7, 7));
        assert_eq!(hit.alpha, Some(40));
    }

    #[test]
    fn pristine_keeps_earlier_alpha_when_last_match_has_none() {
        let rules = [
            ColorRule::new(rgb(50, 50, 50), rgb(1, 1, 1), 10).with_alpha(30),
            ColorRule::new(rgb(55, 55, 55), rgb(2, 2, 2), 10),
        ];

        let hit = match_pixel_with(rgb(52, 52, 52), &rules, RuleEvaluation::Pristine).unwrap();
        assert_eq!(hit.color, rgb(2, 2, 2));
        assert_eq!(hit.alpha, Some(30));
    }

    #[test]
    fn pristine_alpha_ignores_rules_that_miss_source() {
        // Only the second rule would match after a cascade rewrite.
        let rules = [
            ColorRule::new(rgb(0, 0, 0), rgb(9, 9, 9), 0),
            ColorRule::new(rgb(9, 9, 9), rgb(7, 7, 7), 0).with_alpha(40),
        ];

        let hit = match_pixel_with(rgb(0, 0, 0), &rules, RuleEvaluation::Pristine).unwrap();
        assert_eq!(hit.color, rgb(9, 9, 9));
        assert_eq!(hit.alpha, None);
    }

    #[test]
    fn replacement_preserves_alpha_when_absent() {
        let mut pixel = Rgba([1, 2, 3, 77]);
        Replacement {
            color: rgb(9, 8, 7),
            alpha: None,
        }
        .apply(&mut pixel);
        assert_eq!(pixel.0, [9, 8, 7, 77]);
    }

    #[test]
    fn replacement_writes_zero_alpha() {
        let mut pixel = Rgba([1, 2, 3, 255]);
        Replacement {
            color: rgb(1, 2, 3),
            alpha: Some(0),
        }
        .apply(&mut pixel);
        assert_eq!(pixel.0, [1, 2, 3, 0]);
    }

    #[test]
    fn from_hex_rejects_malformed_colors() {
        assert!(ColorRule::from_hex("#zzzzzz", "#000", 0, None).is_err());
        assert!(ColorRule::from_hex("#000", "ocean", 0, None).is_err());
    }
}
