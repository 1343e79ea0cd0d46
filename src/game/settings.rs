use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::board::{HOME_ROWS, MAX_SIZE, STANDARD_SIZE};
use crate::error::ConstructionError;

/// Rule variant, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    Regular,
    /// Losing every piece wins, and empty outer rings are retired.
    Reverse,
    ForcedCapture,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Regular => "Regular",
            Variant::Reverse => "Reverse",
            Variant::ForcedCapture => "Capture",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "regular" => Ok(Variant::Regular),
            "reverse" => Ok(Variant::Reverse),
            "forced_capture" | "capture" => Ok(Variant::ForcedCapture),
            other => Err(format!(
                "unknown variant '{other}' (expected 'regular', 'reverse' or 'forced_capture')"
            )),
        }
    }
}

/// Per-game options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub variant: Variant,
    /// Drop non-captures whenever a capture exists.
    pub force_capture: bool,
    /// Keep move-guide highlights on the board cells.
    pub display_guide: bool,
    pub board_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            variant: Variant::Regular,
            force_capture: false,
            display_guide: false,
            board_size: STANDARD_SIZE,
        }
    }
}

impl Settings {
    pub fn new(variant: Variant, force_capture: bool) -> Self {
        Settings {
            variant,
            force_capture,
            ..Self::default()
        }
    }

    pub fn effective_force_capture(&self) -> bool {
        self.force_capture || self.variant == Variant::ForcedCapture
    }

    pub fn validate(&self) -> Result<(), ConstructionError> {
        if self.board_size % 2 != 0
            || self.board_size < HOME_ROWS * 2 + 2
            || self.board_size > MAX_SIZE
        {
            return Err(ConstructionError::UnsupportedSize(self.board_size));
        }
        if self.variant == Variant::ForcedCapture && !self.force_capture {
            return Err(ConstructionError::ContradictoryCapture);
        }
        Ok(())
    }
}
