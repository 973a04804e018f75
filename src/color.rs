use bevy::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// RGB triple stored in the "R;G;B" text form used by persisted configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse "R;G;B". Anything other than three integer channels in 0..=255 is rejected.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split(';');
        let r = parts.next()?.trim().parse::<u8>().ok()?;
        let g = parts.next()?.trim().parse::<u8>().ok()?;
        let b = parts.next()?.trim().parse::<u8>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { r, g, b })
    }

    /// Convert to a Bevy color with the given opacity (0.0 - 1.0)
    pub fn to_color(self, alpha: f32) -> Color {
        Color::srgba_u8(self.r, self.g, self.b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{}", self.r, self.g, self.b)
    }
}

/// Error returned when a color string is not in "R;G;B" form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid color '{}', expected \"R;G;B\"", self.0)
    }
}

impl std::error::Error for ColorParseError {}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::parse(s).ok_or_else(|| ColorParseError(s.to_string()))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Rgb::parse(&text).unwrap_or_else(|| {
            warn!("Unparseable color '{}', using white", text);
            Rgb::WHITE
        }))
    }
}

/// Serde helpers for an optional color where the empty string means "unset"
pub mod optional {
    use super::Rgb;
    use bevy::log::warn;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Rgb>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(color) => serializer.collect_str(color),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Rgb>, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Rgb::parse(&text).unwrap_or_else(|| {
            warn!("Unparseable color '{}', using white", text);
            Rgb::WHITE
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let color = Rgb::parse("0;255;12").unwrap();
        assert_eq!(color, Rgb::new(0, 255, 12));
        assert_eq!(color.to_string(), "0;255;12");

        // Whitespace around channels is tolerated
        assert_eq!(Rgb::parse(" 1; 2 ;3"), Some(Rgb::new(1, 2, 3)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(Rgb::parse(""), None);
        assert_eq!(Rgb::parse("255;255"), None);
        assert_eq!(Rgb::parse("1;2;3;4"), None);
        assert_eq!(Rgb::parse("256;0;0"), None);
        assert_eq!(Rgb::parse("red"), None);
        assert!("a;b;c".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_deserialize_falls_back_to_white() {
        let color: Rgb = serde_json::from_str("\"not a color\"").unwrap();
        assert_eq!(color, Rgb::WHITE);

        let color: Rgb = serde_json::from_str("\"10;20;30\"").unwrap();
        assert_eq!(color, Rgb::new(10, 20, 30));
    }
}
