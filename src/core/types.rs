//! Core value types shared by the registry, the state store and the compositor.
//!
//! Parameters are carried as a small closed set of tagged values rather than
//! free-form JSON so that effects can read them without re-parsing, and so that
//! a host application can persist them as a flat, readable settings blob.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single effect parameter value.
///
/// Serialized untagged so that `{"intensity": 0.5, "blend_mode": "screen"}`
/// round-trips through a host's settings file as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string (asset references, blend mode names)
    String(String),
    /// RGBA color value
    Color(Color),
}

/// Parameter map: parameter name to value, in declaration order.
pub type ParameterMap = IndexMap<String, Value>;

/// RGBA color value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Identifier of one editing session (one [`FilterStateStore`](crate::state::FilterStateStore)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

// ============================================================================
// Value Implementation
// ============================================================================

impl Value {
    /// Name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Color(_) => "color",
        }
    }

    /// Try to get this value as a float.
    /// Integers are automatically converted to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_string(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Try to get this value as a color.
    pub fn as_color(&self) -> Option<Color> {
        if let Value::Color(c) = self {
            Some(*c)
        } else {
            None
        }
    }

    /// Parse a loosely-typed command line or settings literal.
    ///
    /// `true`/`false` become booleans, `#RRGGBB` becomes a color, numbers
    /// become integers or floats, anything else stays a string.
    pub fn parse_literal(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "true" => return Value::Boolean(true),
            "false" => return Value::Boolean(false),
            _ => {}
        }
        if raw.starts_with('#') {
            if let Ok(color) = Color::from_hex(raw) {
                return Value::Color(color);
            }
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Value::Float(f);
        }
        Value::String(raw.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{:.3}", v),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Color(c) => write!(f, "{}", c.to_hex()),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}

/// Shallow merge: every key in `overrides` replaces the same key in `base`.
pub fn merge_parameters(base: &ParameterMap, overrides: &ParameterMap) -> ParameterMap {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

// ============================================================================
// Color Implementation
// ============================================================================

impl Color {
    /// Create a new color from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from RGB components (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a hex color string.
    ///
    /// Supports formats: "#RGB", "#RRGGBB", "#RRGGBBAA"
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(format!("Invalid hex color: {}", hex));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| e.to_string())
        };

        match hex.len() {
            3 => Ok(Self::rgb(
                channel(0..1)? * 17,
                channel(1..2)? * 17,
                channel(2..3)? * 17,
            )),
            6 => Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(format!("Invalid hex color length: {}", hex.len())),
        }
    }

    /// Format as "#RRGGBBAA".
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Normalized `[r, g, b, a]` in `[0, 1]`.
    pub fn to_unit(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new();
        assert_eq!(format!("{}", id).len(), 8);
    }

    #[test]
    fn test_integer_reads_as_float() {
        assert_eq!(Value::Integer(2).as_float(), Some(2.0));
        assert_eq!(Value::String("x".into()).as_float(), None);
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(Value::parse_literal("true"), Value::Boolean(true));
        assert_eq!(Value::parse_literal("3"), Value::Integer(3));
        assert_eq!(Value::parse_literal("0.25"), Value::Float(0.25));
        assert_eq!(Value::parse_literal("screen"), Value::String("screen".into()));
        assert_eq!(
            Value::parse_literal("#ff0000"),
            Value::Color(Color::rgb(255, 0, 0))
        );
    }

    #[test]
    fn test_untagged_json() {
        let mut params = ParameterMap::new();
        params.insert("intensity".into(), Value::Float(0.5));
        params.insert("blend_mode".into(), Value::from("screen"));
        params.insert("invert".into(), Value::Boolean(false));

        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"intensity":0.5,"blend_mode":"screen","invert":false}"#);

        let back: ParameterMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_merge_overwrites_only_named_keys() {
        let mut base = ParameterMap::new();
        base.insert("intensity".into(), Value::Float(0.8));
        base.insert("opacity".into(), Value::Float(1.0));
        let mut overrides = ParameterMap::new();
        overrides.insert("opacity".into(), Value::Float(0.3));

        let merged = merge_parameters(&base, &overrides);
        assert_eq!(merged.get("intensity"), Some(&Value::Float(0.8)));
        assert_eq!(merged.get("opacity"), Some(&Value::Float(0.3)));
    }

    #[test]
    fn test_color_hex() {
        let c = Color::from_hex("#F80").unwrap();
        assert_eq!(c, Color::rgb(255, 136, 0));
        assert_eq!(c.to_hex(), "#FF8800FF");
        assert!(Color::from_hex("#12345").is_err());
    }
}
