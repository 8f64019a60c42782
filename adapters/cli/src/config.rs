use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use dot_merge_core::{MergeTiming, SessionConfig};

/// Session parameters that override the configuration file.
#[derive(Args, Debug, Default)]
pub(crate) struct Overrides {
    /// Number of grid columns.
    #[arg(long)]
    width: Option<u32>,

    /// Number of grid rows.
    #[arg(long)]
    height: Option<u32>,

    /// Palette size (3 to 5).
    #[arg(long)]
    colors: Option<u8>,

    /// Points awarded per matched dot.
    #[arg(long)]
    points_per_dot: Option<u32>,

    /// Score that wins the round.
    #[arg(long)]
    target_score: Option<u64>,

    /// Round length in seconds.
    #[arg(long)]
    duration_secs: Option<f64>,

    /// Seed for dot colors.
    #[arg(long)]
    seed: Option<u64>,

    /// When the merge dot appears.
    #[arg(long, value_enum)]
    merge_timing: Option<MergeTimingArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum MergeTimingArg {
    Immediate,
    AfterCollapse,
}

impl From<MergeTimingArg> for MergeTiming {
    fn from(value: MergeTimingArg) -> Self {
        match value {
            MergeTimingArg::Immediate => Self::Immediate,
            MergeTimingArg::AfterCollapse => Self::AfterCollapse,
        }
    }
}

impl Overrides {
    fn apply(&self, mut config: SessionConfig) -> Result<SessionConfig> {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(colors) = self.colors {
            config.color_count = colors;
        }
        if let Some(points) = self.points_per_dot {
            config.points_per_dot = points;
        }
        if let Some(target) = self.target_score {
            config.target_score = target;
        }
        if let Some(secs) = self.duration_secs {
            config.duration = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid round duration {secs}"))?;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(timing) = self.merge_timing {
            config.merge_timing = timing.into();
        }
        Ok(config)
    }
}

/// Builds the session configuration from an optional TOML file and overrides.
pub(crate) fn load(path: Option<&Path>, overrides: &Overrides) -> Result<SessionConfig> {
    let base = match path {
        Some(path) => {
            let contents = fs::read_to_string(path).with_context(|| {
                format!("failed to read session config at {}", path.display())
            })?;
            parse(&contents)?
        }
        None => SessionConfig::default(),
    };

    let config = overrides.apply(base)?;
    config
        .validate()
        .context("invalid session configuration")?;
    Ok(config)
}

fn parse(contents: &str) -> Result<SessionConfig> {
    toml::from_str(contents).context("failed to parse session config toml contents")
}
