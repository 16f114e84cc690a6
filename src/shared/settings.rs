use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How long a passenger waits at a stop and how fast buses move.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutingSettings {
    /// Minutes spent waiting before every boarding.
    pub bus_wait_time: u32,
    /// Bus speed in km/h.
    pub bus_velocity: f64,
}

impl RoutingSettings {
    pub fn new(bus_wait_time: u32, bus_velocity: f64) -> Self {
        Self {
            bus_wait_time,
            bus_velocity,
        }
    }

    pub fn wait_minutes(&self) -> f64 {
        self.bus_wait_time as f64
    }

    /// Velocity must be a positive finite number before any graph is built.
    pub fn is_valid(&self) -> bool {
        self.bus_velocity.is_finite() && self.bus_velocity > 0.0
    }
}

/// Map colors come in as `"red"`, `[r, g, b]` or `[r, g, b, opacity]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ColorInput")]
pub enum Color {
    Named(String),
    Rgb { red: u8, green: u8, blue: u8 },
    Rgba {
        red: u8,
        green: u8,
        blue: u8,
        opacity: f64,
    },
}

impl Default for Color {
    fn default() -> Self {
        Self::Named("none".into())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorInput {
    Named(String),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f64),
}

impl From<ColorInput> for Color {
    fn from(value: ColorInput) -> Self {
        match value {
            ColorInput::Named(name) => Color::Named(name),
            ColorInput::Rgb(red, green, blue) => Color::Rgb { red, green, blue },
            ColorInput::Rgba(red, green, blue, opacity) => Color::Rgba {
                red,
                green,
                blue,
                opacity,
            },
        }
    }
}

/// Map drawing parameters. They are only carried through the snapshot,
/// nothing in this crate draws the map.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RenderSettings {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub line_width: f64,
    pub stop_radius: f64,
    pub bus_label_font_size: f64,
    pub bus_label_offset: [f64; 2],
    pub stop_label_font_size: f64,
    pub stop_label_offset: [f64; 2],
    pub underlayer_color: Color,
    pub underlayer_width: f64,
    pub color_palette: Vec<Color>,
}

/// Where the snapshot lives on disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SerializationSettings {
    pub file: PathBuf,
}

impl Default for SerializationSettings {
    fn default() -> Self {
        Self {
            file: "transport_catalogue.db".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_forms() {
        let colors: Vec<Color> =
            serde_json::from_str(r#"["green", [255, 160, 0], [1, 2, 3, 0.85]]"#).unwrap();
        assert_eq!(colors[0], Color::Named("green".into()));
        assert_eq!(
            colors[1],
            Color::Rgb {
                red: 255,
                green: 160,
                blue: 0
            }
        );
        assert_eq!(
            colors[2],
            Color::Rgba {
                red: 1,
                green: 2,
                blue: 3,
                opacity: 0.85
            }
        );
    }

    #[test]
    fn velocity_must_be_positive() {
        assert!(RoutingSettings::new(6, 40.0).is_valid());
        assert!(!RoutingSettings::new(6, 0.0).is_valid());
        assert!(!RoutingSettings::new(6, f64::NAN).is_valid());
    }
}
