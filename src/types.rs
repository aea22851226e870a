//! Small shared value types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Screen corner an inset panel is docked to.
///
/// Variant order is the placement order: insets are laid out corner by corner
/// in the order top-left, top-right, bottom-left, bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsetPosition {
    TopLeft,
    TopRight,
    #[default]
    BottomLeft,
    BottomRight,
}

impl InsetPosition {
    pub const ALL: [InsetPosition; 4] = [
        InsetPosition::TopLeft,
        InsetPosition::TopRight,
        InsetPosition::BottomLeft,
        InsetPosition::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsetPosition::TopLeft => "top-left",
            InsetPosition::TopRight => "top-right",
            InsetPosition::BottomLeft => "bottom-left",
            InsetPosition::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for InsetPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown position '{0}' (expected top-left, top-right, bottom-left or bottom-right)")]
pub struct ParsePositionError(pub String);

impl FromStr for InsetPosition {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InsetPosition::ALL
            .into_iter()
            .find(|position| position.as_str() == s)
            .ok_or_else(|| ParsePositionError(s.to_string()))
    }
}

/// On-screen size of a panel in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
