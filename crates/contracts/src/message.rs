//! GestureMessage - the wire contract with the display client
//!
//! Serializes exactly as `{"gesture":"pan","vector":{"x":..,"y":..}}` or
//! `{"gesture":"zoom","vector":{"delta":..}}`. Do not change field names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outbound gesture, produced fresh each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", content = "vector", rename_all = "lowercase")]
pub enum GestureMessage {
    /// Table tilted past the threshold
    Pan(PanVector),
    /// Encoder turned
    Zoom(ZoomVector),
}

/// Pan direction; an axis under threshold is exactly 0.0
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PanVector {
    pub x: f64,
    pub y: f64,
}

/// Zoom step in encoder ticks, sign already corrected
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoomVector {
    pub delta: f64,
}

/// Gesture type without payload (for logs and metrics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Pan,
    Zoom,
}

impl GestureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::Zoom => "zoom",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GestureMessage {
    #[inline]
    pub fn pan(x: f64, y: f64) -> Self {
        Self::Pan(PanVector { x, y })
    }

    #[inline]
    pub fn zoom(delta: f64) -> Self {
        Self::Zoom(ZoomVector { delta })
    }

    pub fn kind(&self) -> GestureKind {
        match self {
            Self::Pan(_) => GestureKind::Pan,
            Self::Zoom(_) => GestureKind::Zoom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pan_wire_format() {
        let value = serde_json::to_value(GestureMessage::pan(0.25, 0.0)).unwrap();
        assert_eq!(
            value,
            json!({"gesture": "pan", "vector": {"x": 0.25, "y": 0.0}})
        );
    }

    #[test]
    fn test_zoom_wire_format() {
        let value = serde_json::to_value(GestureMessage::zoom(-5.0)).unwrap();
        assert_eq!(value, json!({"gesture": "zoom", "vector": {"delta": -5.0}}));
    }

    #[test]
    fn test_parse_client_side_message() {
        let parsed: GestureMessage =
            serde_json::from_str(r#"{"gesture":"zoom","vector":{"delta":3}}"#).unwrap();
        assert_eq!(parsed, GestureMessage::zoom(3.0));
        assert_eq!(parsed.kind(), GestureKind::Zoom);
    }
}
