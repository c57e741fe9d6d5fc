//! Table representation policy.

use thiserror::Error;

use crate::hash::Width;

/// Which table representations a map uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TableOption {
    /// New tables are sparse; tables are promoted to fixed once occupancy
    /// reaches the upgrade threshold and demoted back at the downgrade
    /// threshold.
    #[default]
    Hybrid,
    /// Every table is sparse. No grading.
    SparseOnly,
    /// Every table is fixed. No grading.
    FixedOnly,
}

/// Map construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Config {
    /// Table representation policy.
    pub tables: TableOption,
    /// Sparse tables holding this many children are promoted before the
    /// next insert. Defaults to 5/8 of the fan-out.
    pub upgrade_threshold: Option<usize>,
    /// Fixed tables shrinking to this many children are demoted. Defaults
    /// to 1/2 of the fan-out.
    pub downgrade_threshold: Option<usize>,
}

impl Config {
    /// Hybrid grading with the given thresholds.
    #[must_use]
    pub const fn hybrid(upgrade: usize, downgrade: usize) -> Self {
        Self {
            tables: TableOption::Hybrid,
            upgrade_threshold: Some(upgrade),
            downgrade_threshold: Some(downgrade),
        }
    }

    /// Only sparse tables.
    #[must_use]
    pub const fn sparse_only() -> Self {
        Self {
            tables: TableOption::SparseOnly,
            upgrade_threshold: None,
            downgrade_threshold: None,
        }
    }

    /// Only fixed tables.
    #[must_use]
    pub const fn fixed_only() -> Self {
        Self {
            tables: TableOption::FixedOnly,
            upgrade_threshold: None,
            downgrade_threshold: None,
        }
    }
}

/// Rejected [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Upgrade threshold larger than a table can hold.
    #[error("upgrade threshold {threshold} exceeds table fan-out {fan_out}")]
    UpgradeTooLarge {
        /// Requested threshold.
        threshold: usize,
        /// Slots per table.
        fan_out: usize,
    },
    /// Downgrade threshold not strictly below the upgrade threshold.
    #[error("downgrade threshold {downgrade} must be below upgrade threshold {upgrade}")]
    DowngradeNotBelowUpgrade {
        /// Resolved upgrade threshold.
        upgrade: usize,
        /// Requested downgrade threshold.
        downgrade: usize,
    },
}

/// A [`Config`] resolved against a concrete width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Grading {
    pub tables: TableOption,
    pub upgrade: usize,
    pub downgrade: usize,
}

impl Grading {
    pub fn resolve<W: Width>(config: &Config) -> Result<Self, ConfigError> {
        let fan_out = W::FAN_OUT;
        let upgrade = config.upgrade_threshold.unwrap_or(fan_out * 5 / 8);
        let downgrade = config.downgrade_threshold.unwrap_or(fan_out / 2);
        if upgrade > fan_out {
            return Err(ConfigError::UpgradeTooLarge {
                threshold: upgrade,
                fan_out,
            });
        }
        if downgrade >= upgrade {
            return Err(ConfigError::DowngradeNotBelowUpgrade { upgrade, downgrade });
        }
        Ok(Self {
            tables: config.tables,
            upgrade,
            downgrade,
        })
    }

    /// Width defaults; cannot fail.
    pub const fn default_for<W: Width>() -> Self {
        let fan_out = W::FAN_OUT;
        Self {
            tables: TableOption::Hybrid,
            upgrade: fan_out * 5 / 8,
            downgrade: fan_out / 2,
        }
    }

    /// The thresholds in effect, as a [`Config`].
    pub const fn config(self) -> Config {
        Config {
            tables: self.tables,
            upgrade_threshold: Some(self.upgrade),
            downgrade_threshold: Some(self.downgrade),
        }
    }

    pub const fn starts_fixed(self) -> bool {
        matches!(self.tables, TableOption::FixedOnly)
    }

    pub const fn grades(self) -> bool {
        matches!(self.tables, TableOption::Hybrid)
    }
}
