//! Typed views over effect parameter maps.
//!
//! Parameters travel as a generic [`ParameterMap`] so that hosts can persist
//! them without knowing each effect, but every category has a fixed schema:
//! color-matrix effects read [`ToneParams`], the blend family reads
//! [`BlendParams`]. Effects may read further named keys from the raw map.

use crate::core::blend::BlendMode;
use crate::core::effect::EffectCategory;
use crate::core::types::{ParameterMap, Value};
use log::warn;

/// Strength of the transform, `[0, 1]`; zero is the identity.
pub const INTENSITY: &str = "intensity";
/// Overall layer coverage, `[0, 1]`.
pub const OPACITY: &str = "opacity";
/// Key of the external image an overlay effect composites.
pub const ASSET: &str = "asset";
/// Blend mode name for overlay effects.
pub const BLEND_MODE: &str = "blend_mode";

/// Parameters shared by every color-matrix effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneParams {
    pub intensity: f32,
    pub opacity: f32,
}

impl ToneParams {
    /// Read from a resolved map. Missing or malformed values fall back to `1.0`.
    pub fn from_map(map: &ParameterMap) -> Self {
        Self {
            intensity: unit_param(map, INTENSITY, 1.0),
            opacity: unit_param(map, OPACITY, 1.0),
        }
    }
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            opacity: 1.0,
        }
    }
}

/// Parameters of the overlay/blend family.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendParams {
    /// Asset key; `None` means "the asset registered under this effect's id".
    pub asset: Option<String>,
    pub blend_mode: BlendMode,
    pub opacity: f32,
}

impl BlendParams {
    /// Read from a resolved map. An unknown blend mode degrades to `Normal`.
    pub fn from_map(map: &ParameterMap) -> Self {
        let blend_mode = match map.get(BLEND_MODE).and_then(Value::as_string) {
            Some(name) => name.parse().unwrap_or_else(|e| {
                warn!("{}; falling back to normal", e);
                BlendMode::Normal
            }),
            None => BlendMode::Normal,
        };
        let asset = map
            .get(ASSET)
            .and_then(Value::as_string)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self {
            asset,
            blend_mode,
            opacity: unit_param(map, OPACITY, 1.0),
        }
    }

    /// The asset key to look up, given the owning effect's id.
    pub fn asset_key<'a>(&'a self, effect_id: &'a str) -> &'a str {
        self.asset.as_deref().unwrap_or(effect_id)
    }
}

/// Closed parameter schema, one variant per effect family.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectParams {
    /// Enhancement, artistic and effect categories.
    Adjustment(ToneParams),
    /// Blend category.
    Blend(BlendParams),
}

impl EffectParams {
    /// Interpret a resolved map according to the effect's category.
    pub fn resolve(category: EffectCategory, map: &ParameterMap) -> Self {
        match category {
            EffectCategory::Blend => EffectParams::Blend(BlendParams::from_map(map)),
            _ => EffectParams::Adjustment(ToneParams::from_map(map)),
        }
    }

    /// The overall opacity, whichever family.
    pub fn opacity(&self) -> f32 {
        match self {
            EffectParams::Adjustment(p) => p.opacity,
            EffectParams::Blend(p) => p.opacity,
        }
    }

    /// Key of the external image this effect composites, if its family uses one.
    pub fn asset_key<'a>(&'a self, effect_id: &'a str) -> Option<&'a str> {
        match self {
            EffectParams::Adjustment(_) => None,
            EffectParams::Blend(p) => Some(p.asset_key(effect_id)),
        }
    }
}

/// Read a float parameter clamped to `[0, 1]`.
pub fn unit_param(map: &ParameterMap, key: &str, default: f32) -> f32 {
    match map.get(key).and_then(Value::as_float) {
        Some(v) if v.is_finite() => (v as f32).clamp(0.0, 1.0),
        Some(v) => {
            warn!("Parameter '{}' is not finite ({}); using {}", key, v, default);
            default
        }
        None => default,
    }
}

/// Default parameter map for a color-matrix effect.
pub fn tone_defaults(intensity: f64, opacity: f64) -> ParameterMap {
    let mut map = ParameterMap::new();
    map.insert(INTENSITY.to_string(), Value::Float(intensity));
    map.insert(OPACITY.to_string(), Value::Float(opacity));
    map
}
