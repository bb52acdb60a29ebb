//! Device configuration.
//!
//! All tunables are fixed at build time. [`PlayerConfig`] gathers them into one `Copy`
//! value so the controller, power sequencer and selector read the same numbers, and
//! [`PlayerConfig::validate`] is a `const fn` so a bad configuration stops the build:
//!
//! ```rust
//! use dfshuffle::config::{FolderRange, PlayerConfig, DEFAULT_CONFIG};
//!
//! const MY_CONFIG: PlayerConfig = PlayerConfig {
//!     group1: FolderRange::new(0x03, 1, 12),
//!     weight_group1: 75,
//!     ..DEFAULT_CONFIG
//! };
//! const _: () = assert!(MY_CONFIG.validate().is_ok());
//! ```

use thiserror::Error;

use crate::consts::*;
use crate::frame::Source;
use crate::timing::const_bit_period_ns;

/// Reasons a [`PlayerConfig`] is rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ConfigError {
    /// A folder's `min` is greater than its `max`.
    #[error("folder {folder}: file range {min}..={max} is inverted")]
    InvertedRange {
        /// Folder id
        folder: u8,
        /// Configured first file
        min: u8,
        /// Configured last file
        max: u8,
    },
    /// Folder ids start at 1 on the module.
    #[error("folder id 0 is not addressable")]
    ZeroFolder,
    /// File indices start at 1 on the module.
    #[error("folder {folder}: file index 0 is not addressable")]
    ZeroFile {
        /// Folder id
        folder: u8,
    },
    /// The weighting is a percentage.
    #[error("folder 1 weight {weight}% exceeds 100%")]
    WeightOutOfRange {
        /// Configured weight
        weight: u8,
    },
    /// The module accepts volumes 0..=30.
    #[error("volume {volume} exceeds 30")]
    VolumeOutOfRange {
        /// Configured volume
        volume: u8,
    },
    /// The active loop would never advance the idle timer.
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,
    /// The idle timeout would expire before the first poll completes.
    #[error("idle timeout {timeout_ms} ms is shorter than one poll ({poll_ms} ms)")]
    TimeoutShorterThanPoll {
        /// Configured idle timeout
        timeout_ms: u32,
        /// Configured poll interval
        poll_ms: u32,
    },
    /// A zero bit period cannot carry a serial signal.
    #[error("bit period must be non-zero")]
    ZeroBitPeriod,
}

/// One content group: a folder on the SD card and the inclusive range of file indices
/// stored in it (`001.mp3` .. `043.mp3` becomes `1..=43`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct FolderRange {
    /// Folder id, sent as the play command's high data byte
    pub folder: u8,
    /// First file index
    pub min: u8,
    /// Last file index
    pub max: u8,
}

impl FolderRange {
    /// Creates a folder range. Not checked; see [`PlayerConfig::validate`].
    pub const fn new(folder: u8, min: u8, max: u8) -> Self {
        Self { folder, min, max }
    }

    /// Number of files in the range. Zero for an inverted range.
    pub const fn len(&self) -> u16 {
        if self.max < self.min {
            0
        } else {
            (self.max - self.min) as u16 + 1
        }
    }

    /// True if the range holds no file (only possible when inverted).
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `file` lies within `min..=max`.
    pub const fn contains(&self, file: u8) -> bool {
        file >= self.min && file <= self.max
    }

    const fn validate(&self) -> Result<(), ConfigError> {
        if self.folder == 0 {
            return Err(ConfigError::ZeroFolder);
        }
        if self.min == 0 {
            return Err(ConfigError::ZeroFile {
                folder: self.folder,
            });
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                folder: self.folder,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Every build-time tunable of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct PlayerConfig {
    /// The frequently played group
    pub group1: FolderRange,
    /// The rarely played group
    pub group2: FolderRange,
    /// Percent chance that a play picks from `group1`
    pub weight_group1: u8,
    /// Inactivity before powering down
    pub idle_timeout_ms: u32,
    /// Module volume, 0..=30
    pub volume: u8,
    /// Storage the module plays from
    pub source: Source,
    /// Button poll period while active
    pub poll_interval_ms: u32,
    /// Button re-check delay
    pub debounce_ms: u32,
    /// Wait after button release
    pub release_settle_ms: u32,
    /// Module boot and card index time
    pub boot_delay_ms: u32,
    /// Wait after selecting the media source
    pub source_settle_ms: u32,
    /// Wait after setting the volume
    pub volume_settle_ms: u32,
    /// Wait for the module rail to collapse before sleeping
    pub rail_settle_ms: u32,
    /// Serial bit period in nanoseconds
    pub bit_period_ns: u32,
}

/// The shipped configuration.
pub const DEFAULT_CONFIG: PlayerConfig = PlayerConfig {
    group1: FolderRange::new(DEFAULT_FOLDER1, DEFAULT_FILE1_MIN, DEFAULT_FILE1_MAX),
    group2: FolderRange::new(DEFAULT_FOLDER2, DEFAULT_FILE2_MIN, DEFAULT_FILE2_MAX),
    weight_group1: DEFAULT_WEIGHT_FOLDER1,
    idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
    volume: DEFAULT_VOLUME,
    source: Source::SdCard,
    poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
    debounce_ms: DEFAULT_DEBOUNCE_MS,
    release_settle_ms: DEFAULT_RELEASE_SETTLE_MS,
    boot_delay_ms: DEFAULT_BOOT_DELAY_MS,
    source_settle_ms: DEFAULT_SOURCE_SETTLE_MS,
    volume_settle_ms: DEFAULT_VOLUME_SETTLE_MS,
    rail_settle_ms: DEFAULT_RAIL_SETTLE_MS,
    bit_period_ns: const_bit_period_ns(BAUD_RATE),
};

const _: () = assert!(DEFAULT_CONFIG.validate().is_ok());

impl Default for PlayerConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

impl PlayerConfig {
    /// Checks the configuration for values the firmware cannot act on.
    ///
    /// Usable in a `const` context, which is how [`DEFAULT_CONFIG`] is checked.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = self.group1.validate() {
            return Err(e);
        }
        if let Err(e) = self.group2.validate() {
            return Err(e);
        }
        if self.weight_group1 > 100 {
            return Err(ConfigError::WeightOutOfRange {
                weight: self.weight_group1,
            });
        }
        if self.volume > 30 {
            return Err(ConfigError::VolumeOutOfRange {
                volume: self.volume,
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.idle_timeout_ms < self.poll_interval_ms {
            return Err(ConfigError::TimeoutShorterThanPoll {
                timeout_ms: self.idle_timeout_ms,
                poll_ms: self.poll_interval_ms,
            });
        }
        if self.bit_period_ns == 0 {
            return Err(ConfigError::ZeroBitPeriod);
        }
        Ok(())
    }
}
