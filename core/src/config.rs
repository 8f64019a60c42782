//! Session configuration recognised by the engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ColorPalette;

/// Smallest palette a session accepts.
pub const MIN_PALETTE_SIZE: u8 = 3;
/// Largest palette a session accepts.
pub const MAX_PALETTE_SIZE: u8 = 5;

/// Controls when the merge dot of a resolved match is written to the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeTiming {
    /// The merge dot replaces the last path cell as soon as the path is vacated
    /// and then falls with the rest of the column.
    #[default]
    Immediate,
    /// The merge dot is written after gravity settles, just before refill. When
    /// a falling dot took the merge cell, the lowest empty cell of that column
    /// receives it instead.
    AfterCollapse,
}

/// Tunable parameters fixed for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Number of grid columns.
    pub width: u32,
    /// Number of grid rows.
    pub height: u32,
    /// Number of active colors.
    pub color_count: u8,
    /// Points awarded for every dot in a resolved path.
    pub points_per_dot: u32,
    /// Score that ends the round early.
    pub target_score: u64,
    /// Length of a round.
    #[serde(rename = "duration_secs", with = "seconds")]
    pub duration: Duration,
    /// Seed for every random color drawn during the session.
    pub seed: u64,
    /// Pause between vacating a path and collapsing the columns.
    #[serde(rename = "settle_delay_ms", with = "millis")]
    pub settle_delay: Duration,
    /// Pause between collapsing the columns and refilling the grid.
    #[serde(rename = "refill_delay_ms", with = "millis")]
    pub refill_delay: Duration,
    /// When the merge dot is written.
    pub merge_timing: MergeTiming,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: 6,
            height: 6,
            color_count: 5,
            points_per_dot: 10,
            target_score: 200,
            duration: Duration::from_secs(30),
            seed: 0x5eed_d075_2024_0001,
            settle_delay: Duration::from_millis(200),
            refill_delay: Duration::from_millis(300),
            merge_timing: MergeTiming::Immediate,
        }
    }
}

impl SessionConfig {
    /// Checks every parameter, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let _ = self.palette()?;
        if self.points_per_dot == 0 {
            return Err(ConfigError::ZeroPointsPerDot);
        }
        if self.target_score == 0 {
            return Err(ConfigError::ZeroTargetScore);
        }
        if self.duration.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(())
    }

    /// Builds the palette described by `color_count`.
    pub fn palette(&self) -> Result<ColorPalette, ConfigError> {
        ColorPalette::new(self.color_count)
    }
}

/// Configuration violations reported when a session is constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Width or height was zero.
    #[error("grid must be at least 1x1, got {width}x{height}")]
    InvalidDimensions {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// Fewer colors than the engine supports.
    #[error("palette needs at least {min} colors, got {size}", min = MIN_PALETTE_SIZE)]
    PaletteTooSmall {
        /// Requested palette size.
        size: u8,
    },
    /// More colors than the engine supports.
    #[error("palette holds at most {max} colors, got {size}", max = MAX_PALETTE_SIZE)]
    PaletteTooLarge {
        /// Requested palette size.
        size: u8,
    },
    /// Points per dot was zero.
    #[error("points per dot must be positive")]
    ZeroPointsPerDot,
    /// Target score was zero.
    #[error("target score must be positive")]
    ZeroTargetScore,
    /// Round duration was zero.
    #[error("round duration must be positive")]
    ZeroDuration,
}

mod seconds {
    use std::time::Duration;

    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
