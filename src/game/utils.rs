use chess::Color;

use crate::error::{ClientError, Result};

/// Convert a chess color to its wire name
pub fn color_to_string(color: Color) -> String {
    match color {
        Color::White => "white".to_string(),
        Color::Black => "black".to_string(),
    }
}

/// Parse a wire color name
pub fn parse_color(name: &str) -> Result<Color> {
    match name {
        "white" => Ok(Color::White),
        "black" => Ok(Color::Black),
        other => Err(ClientError::InvalidColor(other.to_string())),
    }
}

/// Serde adapter for `chess::Color` fields.
///
/// Use with `#[serde(with = "crate::game::utils::color_format")]`.
pub mod color_format {
    use chess::Color;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{color_to_string, parse_color};

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&color_to_string(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let name = String::deserialize(deserializer)?;
        parse_color(&name).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_names_round_trip() {
        assert_eq!(parse_color(&color_to_string(Color::Black)).unwrap(), Color::Black);
        assert_eq!(parse_color("white").unwrap(), Color::White);
    }

    #[test]
    fn unknown_color_is_rejected() {
        assert!(matches!(parse_color("red"), Err(ClientError::InvalidColor(name)) if name == "red"));
    }
}
