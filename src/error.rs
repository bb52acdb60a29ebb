//! Error types.
//!
//! The command link has no return path, so nothing the playback module does can surface
//! here. What remains is a failing GPIO operation reported by the HAL, and a configuration
//! rejected by [`PlayerConfig::validate`](crate::config::PlayerConfig::validate).

use embedded_hal::digital::ErrorKind;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by the firmware core.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Error {
    /// A GPIO read or write failed.
    #[error("digital pin fault: {0:?}")]
    Pin(ErrorKind),
    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Maps any HAL pin error onto [`Error::Pin`].
pub(crate) fn pin_error<E: embedded_hal::digital::Error>(e: E) -> Error {
    Error::Pin(e.kind())
}
