// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.
//!
//! Settings are plain data handed in by the host, usually parsed from JSON
//! with [`Settings::from_json`]. Persistence and migration are the host's
//! business. Every field has a default, so partial documents are accepted.

use hashbrown::HashSet;
use lens_input::InputConfig;
use lens_match::{Rule, RuleSet, Selector};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Everything the engine can be configured with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Match rules. Specific rules always take precedence over generic ones.
    pub rules: Vec<RuleSettings>,
    /// Container sizing.
    pub dimensions: DimensionSettings,
    /// Fold behavior.
    pub fold: FoldSettings,
    /// Control panel behavior.
    pub panels: PanelSettings,
    /// Observer lifetimes.
    pub discovery: DiscoverySettings,
    /// Gesture tunables.
    pub input: InputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            dimensions: DimensionSettings::default(),
            fold: FoldSettings::default(),
            panels: PanelSettings::default(),
            discovery: DiscoverySettings::default(),
            input: InputSettings::default(),
        }
    }
}

impl Settings {
    /// Parses and validates settings.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks every rule selector and numeric field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rule_set().map(drop)?;
        self.dimensions.expanded.validate("dimensions.expanded")?;
        self.dimensions.folded.validate("dimensions.folded")?;
        positive("input.pan_step", self.input.pan_step)?;
        positive("input.zoom_step", self.input.zoom_step)?;
        if self.input.zoom_step <= 1.0 {
            return Err(ConfigError::ZoomStep(self.input.zoom_step));
        }
        Ok(())
    }

    /// Compiles the match rules.
    pub fn rule_set(&self) -> Result<RuleSet<PanelToggles>, ConfigError> {
        let mut seen = HashSet::new();
        let mut set = RuleSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(ConfigError::DuplicateRule(rule.name.clone()));
            }
            let selector =
                Selector::parse(&rule.selector).map_err(|source| ConfigError::Selector {
                    rule: rule.name.clone(),
                    source,
                })?;
            let mut compiled = if rule.generic {
                Rule::generic(rule.name.clone(), selector, rule.panels)
            } else {
                Rule::new(rule.name.clone(), selector, rule.panels)
            };
            compiled.enabled = rule.enabled;
            set.push(compiled);
        }
        Ok(set)
    }

    /// Gesture configuration for a unit's input handlers.
    #[must_use]
    pub fn input_config(&self) -> InputConfig {
        InputConfig {
            zoom_step: self.input.zoom_step,
            pan_step: self.input.pan_step,
            double_tap_ms: self.input.double_tap_ms,
            unfold_on_focus_in: self.fold.unfold_on_focus_in,
            fold_on_focus_out: self.fold.fold_on_focus_out,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// One match rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleSettings {
    /// Display name; also used in export file names.
    pub name: String,
    /// CSS-like selector.
    pub selector: String,
    /// Disabled rules never match.
    #[serde(default = "yes")]
    pub enabled: bool,
    /// Catch-all rules are tried after every specific rule.
    #[serde(default)]
    pub generic: bool,
    /// Which sub-panels units from this rule get.
    #[serde(default)]
    pub panels: PanelToggles,
}

impl RuleSettings {
    fn builtin(name: &str, selector: &str) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            enabled: true,
            generic: true,
            panels: PanelToggles::default(),
        }
    }
}

fn yes() -> bool {
    true
}

/// Per-rule sub-panel switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelToggles {
    /// Directional pan buttons.
    #[serde(rename = "move")]
    pub movement: bool,
    /// Zoom buttons.
    pub zoom: bool,
    /// Fold button.
    pub fold: bool,
    /// Fullscreen, "hide panels", and touch passthrough buttons.
    pub service: bool,
}

impl Default for PanelToggles {
    fn default() -> Self {
        Self {
            movement: true,
            zoom: true,
            fold: true,
            service: true,
        }
    }
}

/// A length along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum Dimension {
    /// Absolute pixels.
    Px(f64),
    /// Percentage of the element's natural size on the same axis.
    Percent(f64),
}

impl Dimension {
    /// Resolves against the natural length on the same axis.
    #[must_use]
    pub fn resolve(self, natural: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => natural * pct / 100.0,
        }
    }

    fn value(self) -> f64 {
        match self {
            Self::Px(v) | Self::Percent(v) => v,
        }
    }
}

/// Width and height of a container.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Horizontal size.
    pub width: Dimension,
    /// Vertical size.
    pub height: Dimension,
}

impl Dimensions {
    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        positive(field, self.width.value())?;
        positive(field, self.height.value())
    }
}

/// Container sizes for the expanded and folded states.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionSettings {
    /// Size while expanded.
    pub expanded: Dimensions,
    /// Size while folded.
    pub folded: Dimensions,
}

impl Default for DimensionSettings {
    fn default() -> Self {
        Self {
            expanded: Dimensions {
                width: Dimension::Percent(100.0),
                height: Dimension::Percent(100.0),
            },
            folded: Dimensions {
                width: Dimension::Percent(100.0),
                height: Dimension::Px(50.0),
            },
        }
    }
}

/// Fold defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldSettings {
    /// New units start folded.
    pub folded_by_default: bool,
    /// Fold when keyboard focus leaves the unit.
    pub fold_on_focus_out: bool,
    /// Unfold when keyboard focus enters the unit.
    pub unfold_on_focus_in: bool,
}

/// When the move and zoom sub-panels show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Triggering {
    /// Always visible; hover and focus are ignored.
    #[default]
    Always,
    /// Visible while the pointer is over the unit.
    Hover,
    /// Visible while the unit has keyboard focus.
    Focus,
}

/// Control panel policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    /// Aggregate triggering policy.
    pub triggering: Triggering,
    /// The service sub-panel ignores hover and focus.
    pub service_ignores_external_triggers: bool,
    /// Offer the service "hide panels" button.
    pub hiding_button: bool,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            triggering: Triggering::Always,
            service_ignores_external_triggers: false,
            hiding_button: true,
        }
    }
}

/// Observer lifetimes in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Lifetime of the late-render observer installed for static views.
    pub static_timeout_ms: u64,
    /// Lifetime of the per-block observer installed for incremental views.
    pub block_timeout_ms: u64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            static_timeout_ms: 5_000,
            block_timeout_ms: 5_000,
        }
    }
}

/// Gesture tunables.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Zoom-in multiplier per step; zooming out divides by it.
    pub zoom_step: f64,
    /// Keyboard and panel pan distance in pixels.
    pub pan_step: f64,
    /// Double-tap window in milliseconds.
    pub double_tap_ms: u64,
}

impl Default for InputSettings {
    fn default() -> Self {
        let input = InputConfig::default();
        Self {
            zoom_step: input.zoom_step,
            pan_step: input.pan_step,
            double_tap_ms: input.double_tap_ms,
        }
    }
}

/// Default rules: one catch-all for vector output and one for raster images.
#[must_use]
pub fn default_rules() -> Vec<RuleSettings> {
    vec![
        RuleSettings::builtin("any vector", "svg"),
        RuleSettings::builtin("any raster", "img"),
    ]
}
