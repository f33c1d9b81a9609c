use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// 24-bit Red-Green-Blue color. Serializes/deserializes as HTML format
/// (#rrggbb), which is also how it gets written into the overlay CSS.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    /// Accent used when branding doesn't specify one
    pub const DEFAULT_ACCENT: Self = Self {
        red: 0x36,
        green: 0xa2,
        blue: 0xff,
    };
}

// Anything above 24 bits gets dropped
impl From<u32> for Color {
    fn from(value: u32) -> Self {
        let red = (value >> 16) as u8;
        let green = (value >> 8) as u8;
        let blue = value as u8;
        Self { red, green, blue }
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // from_str_radix allows a leading sign, so check digits ourselves
        let is_hex = |digits: &str| {
            digits.chars().all(|c| c.is_ascii_hexdigit())
        };
        if s.len() == 7 && s.starts_with('#') && is_hex(&s[1..]) {
            let value = u32::from_str_radix(&s[1..], 16)?;
            Ok(value.into())
        } else {
            Err(anyhow!("Invalid color string: {}", s))
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:0>2x}{:0>2x}{:0>2x}", self.red, self.green, self.blue)
    }
}

// These impls are needed for serde
impl TryFrom<String> for Color {
    type Error = <Color as FromStr>::Err;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Qualitative status bucket for a travel or transit row
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Severity {
    Good,
    Warn,
    Bad,
}

impl Severity {
    /// Bucket a trip duration. Under 25 minutes is fine, under 40 is slow,
    /// anything else is heavy.
    pub fn from_minutes(minutes: u32) -> Self {
        if minutes < 25 {
            Self::Good
        } else if minutes < 40 {
            Self::Warn
        } else {
            Self::Bad
        }
    }

    /// CSS class name
    pub fn class(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warn => "warn",
            Self::Bad => "bad",
        }
    }

    /// Short human label shown next to the status
    pub fn badge(self) -> &'static str {
        match self {
            Self::Good => "Normal",
            Self::Warn => "Slow",
            Self::Bad => "Heavy",
        }
    }
}
