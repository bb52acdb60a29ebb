//! Weighted random track selection.
//!
//! Tracks live in two folders: a large "common" group and a smaller "rare" group. Each
//! play first draws `0..100` and compares it against the configured weight to pick the
//! group, then draws a file uniformly inside that group's range.
//!
//! The comparison is strictly less-than, so a weight of 90 gives draws 0..=89 (90 %) to
//! group 1 and 90..=99 to group 2; 0 and 100 pin the choice to one group.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{FolderRange, PlayerConfig};
use crate::error::Result;
use crate::frame::{Command, Frame, build_frame};
use crate::rng::Lfsr16;
use crate::serial::SoftSerialTx;

/// A track to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Selection {
    /// Folder id
    pub folder: u8,
    /// File index within the folder
    pub file: u8,
}

impl Selection {
    /// The play command for this track.
    pub const fn frame(&self) -> Frame {
        build_frame(Command::PlayFolderTrack as u8, self.folder, self.file)
    }
}

/// The weighted two-group picking policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSelector {
    group1: FolderRange,
    group2: FolderRange,
    weight_group1: u8,
}

impl TrackSelector {
    /// Creates a selector. Ranges are assumed valid (see
    /// [`PlayerConfig::validate`]); an inverted range is treated as its `min` only.
    pub const fn new(group1: FolderRange, group2: FolderRange, weight_group1: u8) -> Self {
        Self {
            group1,
            group2,
            weight_group1,
        }
    }

    /// Creates the selector described by `config`.
    pub const fn from_config(config: &PlayerConfig) -> Self {
        Self::new(config.group1, config.group2, config.weight_group1)
    }

    /// Picks a track.
    ///
    /// Consumes exactly two values from `rng`: one for the group and one for the file.
    pub fn pick(&self, rng: &mut Lfsr16) -> Selection {
        let pick = rng.below(100);
        let range = if pick < u16::from(self.weight_group1) {
            &self.group1
        } else {
            &self.group2
        };
        let span = range.len().max(1);
        let offset = rng.below(span);
        Selection {
            folder: range.folder,
            // offset < span <= max - min + 1, so this stays within min..=max
            file: range.min.wrapping_add(offset as u8),
        }
    }

    /// Picks a track and sends the play command for it.
    pub fn pick_and_play<TX, D>(
        &self,
        rng: &mut Lfsr16,
        link: &mut SoftSerialTx<TX>,
        delay: &mut D,
    ) -> Result<Selection>
    where
        TX: OutputPin,
        D: DelayNs,
    {
        let selection = self.pick(rng);
        link.transmit(&selection.frame(), delay)?;
        info!("playing folder {} file {}", selection.folder, selection.file);
        Ok(selection)
    }
}
