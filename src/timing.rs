//! Bit timing helpers for the software serial link.
//!
//! The command link is bit-banged, so its baud rate is only as good as the delay used
//! between pin writes. These helpers turn a baud rate into the per-bit delay handed to
//! [`SoftSerialTx`](crate::serial::SoftSerialTx).
//!
//! | Baud   | Bit period (ns) | Frame time (µs) |
//! |--------|-----------------|-----------------|
//! | 9600   |         104 167 |          10 416 |
//! | 19200  |          52 083 |           5 208 |

use libm::round;

/// 1 second == 1,000,000,000 nanoseconds
pub const NANOSECONDS_PER_SECOND: u32 = 1_000_000_000;
/// 1 microsecond == 1,000 nanoseconds
pub const NANOSECONDS_PER_MICROSECOND: u32 = 1_000;

/// Computes the duration of one bit, in nanoseconds, for `baud`.
///
/// # Arguments
/// - `baud`: serial speed in bits per second (e.g. 9600)
///
/// # Returns
/// - The bit period rounded to the nearest nanosecond
pub fn bit_period_ns(baud: u32) -> u32 {
    round(NANOSECONDS_PER_SECOND as f64 / baud as f64) as u32
}

/// Compile-time bit period calculator.
///
/// Integer version of [`bit_period_ns`], rounding half up.
pub const fn const_bit_period_ns(baud: u32) -> u32 {
    (NANOSECONDS_PER_SECOND + baud / 2) / baud
}

/// Time needed to clock out `bytes` bytes of 8N1 at the given bit period, in microseconds.
pub const fn transmit_time_us(bytes: u32, bit_period_ns: u32) -> u32 {
    bytes * crate::consts::BITS_PER_BYTE * bit_period_ns / NANOSECONDS_PER_MICROSECOND
}
