//! Command framing for the DFPlayer serial protocol.
//!
//! Every command sent to the playback module is a fixed 10-byte [`Frame`]:
//!
//! ```text
//! 7E FF 06 <cmd> 00 <data hi> <data lo> <sum hi> <sum lo> EF
//! ```
//!
//! The checksum is the two's complement of the 16-bit sum of bytes 1 to 6 (version through
//! data low), sent big-endian, so adding it to that sum gives zero modulo 65536. The
//! module uses it to discard frames corrupted on the wire.
//!
//! Building a frame is a pure function of its inputs; the same command always produces the
//! same bytes.

use crate::consts::{
    CHECKSUM_COVER_END, CHECKSUM_COVER_START, FRAME_END, FRAME_LEN, FRAME_LENGTH,
    FRAME_NO_FEEDBACK, FRAME_START, FRAME_VERSION, INDEX_CHECKSUM_HIGH, INDEX_CHECKSUM_LOW,
    INDEX_COMMAND, INDEX_DATA_HIGH, INDEX_DATA_LOW,
};

/// Command codes used by the device.
///
/// The module knows many more; any of them can still be framed through [`build_frame`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Command {
    /// Set volume, data = 0..=30
    SetVolume = 0x06,
    /// Select the storage to play from, data = [`Source`]
    SelectSource = 0x09,
    /// Play a file in a folder, data high = folder, data low = file
    PlayFolderTrack = 0x0F,
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command as u8
    }
}

/// Storage sources the module can play from.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Source {
    /// USB mass storage
    UsbDisk = 0x01,
    /// TF / micro SD card
    SdCard = 0x02,
}

impl From<Source> for u16 {
    fn from(source: Source) -> u16 {
        source as u16
    }
}

/// One encoded command, ready to be clocked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Frame([u8; FRAME_LEN]);

/// Computes the frame checksum over the covered bytes (version through data low).
///
/// Wrapping 16-bit sum, negated.
pub const fn checksum(covered: &[u8]) -> u16 {
    let mut sum: u16 = 0;
    let mut i = 0;
    while i < covered.len() {
        sum = sum.wrapping_add(covered[i] as u16);
        i += 1;
    }
    0u16.wrapping_sub(sum)
}

/// Builds the frame for `command` with the given data bytes.
///
/// # Example
/// ```rust
/// use dfshuffle::frame::build_frame;
///
/// // Play file 5 of folder 1
/// let frame = build_frame(0x0F, 0x01, 0x05);
/// assert_eq!(
///     frame.as_bytes(),
///     &[0x7E, 0xFF, 0x06, 0x0F, 0x00, 0x01, 0x05, 0xFE, 0xE6, 0xEF]
/// );
/// ```
pub const fn build_frame(command: u8, data_high: u8, data_low: u8) -> Frame {
    let mut bytes = [
        FRAME_START,
        FRAME_VERSION,
        FRAME_LENGTH,
        command,
        FRAME_NO_FEEDBACK,
        data_high,
        data_low,
        0,
        0,
        FRAME_END,
    ];
    let covered = [
        FRAME_VERSION,
        FRAME_LENGTH,
        command,
        FRAME_NO_FEEDBACK,
        data_high,
        data_low,
    ];
    let [sum_hi, sum_lo] = checksum(&covered).to_be_bytes();
    bytes[INDEX_CHECKSUM_HIGH] = sum_hi;
    bytes[INDEX_CHECKSUM_LOW] = sum_lo;
    Frame(bytes)
}

impl Frame {
    /// Builds the frame for a known [`Command`] with a 16-bit parameter.
    pub const fn command(command: Command, data: u16) -> Self {
        let [hi, lo] = data.to_be_bytes();
        build_frame(command as u8, hi, lo)
    }

    /// The raw bytes, in wire order.
    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// The command code byte.
    pub const fn command_code(&self) -> u8 {
        self.0[INDEX_COMMAND]
    }

    /// The 16-bit parameter.
    pub const fn data(&self) -> u16 {
        u16::from_be_bytes([self.0[INDEX_DATA_HIGH], self.0[INDEX_DATA_LOW]])
    }

    /// The 16-bit checksum carried by the frame.
    pub const fn checksum(&self) -> u16 {
        u16::from_be_bytes([self.0[INDEX_CHECKSUM_HIGH], self.0[INDEX_CHECKSUM_LOW]])
    }

    /// Checks the fixed bytes and the checksum.
    pub fn is_valid(&self) -> bool {
        let covered = &self.0[CHECKSUM_COVER_START..CHECKSUM_COVER_END];
        self.0[0] == FRAME_START
            && self.0[FRAME_LEN - 1] == FRAME_END
            && checksum(covered) == self.checksum()
    }
}

impl From<[u8; FRAME_LEN]> for Frame {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        Frame(bytes)
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covered_sum_with_checksum(frame: &Frame) -> u16 {
        let bytes = frame.as_bytes();
        bytes[CHECKSUM_COVER_START..CHECKSUM_COVER_END]
            .iter()
            .fold(0u16, |acc, &b| acc.wrapping_add(b as u16))
            .wrapping_add(frame.checksum())
    }

    #[test]
    fn test_play_folder_one_file_five() {
        let frame = build_frame(0x0F, 0x01, 0x05);
        // 0xFF + 0x06 + 0x0F + 0x00 + 0x01 + 0x05 = 0x011A
        assert_eq!(frame.checksum(), 0xFEE6);
        assert_eq!(
            frame.as_bytes(),
            &[0x7E, 0xFF, 0x06, 0x0F, 0x00, 0x01, 0x05, 0xFE, 0xE6, 0xEF]
        );
        assert!(frame.is_valid());
    }

    #[test]
    fn test_init_commands() {
        let source = Frame::command(Command::SelectSource, Source::SdCard.into());
        assert_eq!(
            source.as_bytes(),
            &[0x7E, 0xFF, 0x06, 0x09, 0x00, 0x00, 0x02, 0xFE, 0xF0, 0xEF]
        );

        let volume = Frame::command(Command::SetVolume, 0x1C);
        assert_eq!(
            volume.as_bytes(),
            &[0x7E, 0xFF, 0x06, 0x06, 0x00, 0x00, 0x1C, 0xFE, 0xD9, 0xEF]
        );
    }

    #[test]
    fn test_checksum_zeroes_covered_sum_for_all_commands() {
        for command in 0..=u8::MAX {
            for data in [0x0000u16, 0x0001, 0x00FF, 0x0101, 0x1234, 0xFF00, 0xFFFF] {
                let [hi, lo] = data.to_be_bytes();
                let frame = build_frame(command, hi, lo);
                assert_eq!(frame.as_bytes().len(), 10);
                assert_eq!(frame.as_bytes()[0], 0x7E);
                assert_eq!(frame.as_bytes()[9], 0xEF);
                assert_eq!(covered_sum_with_checksum(&frame), 0);
                assert!(frame.is_valid());
            }
        }
    }

    #[test]
    fn test_accessors() {
        let frame = Frame::command(Command::PlayFolderTrack, 0x022B);
        assert_eq!(frame.command_code(), 0x0F);
        assert_eq!(frame.data(), 0x022B);
        assert_eq!(u8::from(Command::PlayFolderTrack), 0x0F);
        assert_eq!(frame.as_ref().len(), 10);
    }

    #[test]
    fn test_corrupted_frame_is_invalid() {
        let mut bytes = *build_frame(0x0F, 0x02, 0x11).as_bytes();
        bytes[6] ^= 0x01;
        assert!(!Frame::from(bytes).is_valid());

        let mut bytes = *build_frame(0x0F, 0x02, 0x11).as_bytes();
        bytes[9] = 0x00;
        assert!(!Frame::from(bytes).is_valid());
    }

    #[test]
    fn test_build_frame_is_reproducible() {
        assert_eq!(build_frame(0x06, 0x00, 0x1C), build_frame(0x06, 0x00, 0x1C));
    }
}
