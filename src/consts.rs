//! Constants used across the command link and the default device configuration.
//!
//! The protocol constants follow the DFPlayer Mini serial command format: every command
//! is a fixed 10-byte frame, framed by a start and an end byte, carrying a one-byte
//! command code, a 16-bit parameter and a 16-bit checksum.
//!
//! ## Frame layout
//!
//! | Index | Field          | Value           |
//! |-------|----------------|-----------------|
//! | 0     | start          | `0x7E`          |
//! | 1     | version        | `0xFF`          |
//! | 2     | length         | `0x06`          |
//! | 3     | command        | command code    |
//! | 4     | feedback       | `0x00` (no ACK) |
//! | 5     | data high      |                 |
//! | 6     | data low       |                 |
//! | 7     | checksum high  |                 |
//! | 8     | checksum low   |                 |
//! | 9     | end            | `0xEF`          |
//!
//! The `DEFAULT_*` values are the device tunables. They are gathered into
//! [`DEFAULT_CONFIG`](crate::config::DEFAULT_CONFIG), which is validated at compile time.

/// First byte of every frame.
pub const FRAME_START: u8 = 0x7E;

/// Protocol version field.
pub const FRAME_VERSION: u8 = 0xFF;

/// Length field: number of bytes from `version` to `data low` inclusive.
pub const FRAME_LENGTH: u8 = 0x06;

/// Feedback field. Always zero, the link is transmit-only.
pub const FRAME_NO_FEEDBACK: u8 = 0x00;

/// Last byte of every frame.
pub const FRAME_END: u8 = 0xEF;

/// Total size of a frame in bytes.
pub const FRAME_LEN: usize = 10;

/// Index of the first checksum-covered byte (`version`).
pub const CHECKSUM_COVER_START: usize = 1;

/// Index one past the last checksum-covered byte (`data low`).
pub const CHECKSUM_COVER_END: usize = 7;

/// Index of the command code.
pub const INDEX_COMMAND: usize = 3;

/// Index of the data high byte.
pub const INDEX_DATA_HIGH: usize = 5;

/// Index of the data low byte.
pub const INDEX_DATA_LOW: usize = 6;

/// Index of the checksum high byte.
pub const INDEX_CHECKSUM_HIGH: usize = 7;

/// Index of the checksum low byte.
pub const INDEX_CHECKSUM_LOW: usize = 8;

/// Serial link speed in bits per second.
pub const BAUD_RATE: u32 = 9_600;

/// Start bit + 8 data bits + stop bit.
pub const BITS_PER_BYTE: u32 = 10;

/// Initial LFSR register value.
pub const LFSR_INITIAL: u16 = 0xACE1;

/// LFSR tap mask (taps 16, 14, 13, 11), maximal length.
pub const LFSR_TAPS: u16 = 0xB400;

/// Number of states visited by the LFSR before it repeats.
pub const LFSR_PERIOD: u32 = 65_535;

/// Folder holding the common tracks.
pub const DEFAULT_FOLDER1: u8 = 0x01;
/// First file index in folder 1.
pub const DEFAULT_FILE1_MIN: u8 = 1;
/// Last file index in folder 1.
pub const DEFAULT_FILE1_MAX: u8 = 27;

/// Folder holding the rare tracks.
pub const DEFAULT_FOLDER2: u8 = 0x02;
/// First file index in folder 2.
pub const DEFAULT_FILE2_MIN: u8 = 1;
/// Last file index in folder 2.
pub const DEFAULT_FILE2_MAX: u8 = 43;

/// Percent chance of picking from folder 1.
pub const DEFAULT_WEIGHT_FOLDER1: u8 = 90;

/// Inactivity before the module is powered down and the MCU sleeps.
pub const DEFAULT_IDLE_TIMEOUT_MS: u32 = 60_000;

/// Volume on the module's 0..=30 scale (28 of 30).
pub const DEFAULT_VOLUME: u8 = 0x1C;

/// Button poll period while active.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 10;

/// Debounce re-check delay.
pub const DEFAULT_DEBOUNCE_MS: u32 = 30;

/// Delay after the button is released.
pub const DEFAULT_RELEASE_SETTLE_MS: u32 = 50;

/// Module boot and SD card indexing time after power-up.
pub const DEFAULT_BOOT_DELAY_MS: u32 = 2_000;

/// Delay after the media-source command.
pub const DEFAULT_SOURCE_SETTLE_MS: u32 = 300;

/// Delay after the volume command.
pub const DEFAULT_VOLUME_SETTLE_MS: u32 = 50;

/// Time for the module's supply rail to collapse before sleeping.
pub const DEFAULT_RAIL_SETTLE_MS: u32 = 10;
