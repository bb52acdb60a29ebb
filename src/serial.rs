//! Software (bit-banged) serial transmitter.
//!
//! [`SoftSerialTx`] reproduces an asynchronous 8N1 serial line on a plain output pin by
//! holding each level for one bit period:
//!
//! ```text
//!  idle  start  d0  d1  d2  d3  d4  d5  d6  d7  stop  idle
//!  ‾‾‾‾‾|_____|‾‾‾|___|...                     |‾‾‾‾‾‾‾‾‾‾‾
//! ```
//!
//! Data bits go out least significant first and the line idles high. There is no receive
//! side: the playback module's replies, if any, are never read.
//!
//! ## Timing
//!
//! Bit edges are produced by `DelayNs::delay_ns(bit_period_ns)` after each pin write, so
//! the delay provider's accuracy is the link's accuracy. At 9600 baud the receiver samples
//! near the middle of each ~104 µs bit and tolerates a few percent of drift over a byte.
//! Anything that stretches a bit (an interrupt handler, a log statement) can corrupt the
//! byte, which is why, with the `atomic-tx` feature, a whole frame is sent inside one
//! critical section.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::consts::FRAME_LEN;
use crate::error::{Result, pin_error};
use crate::frame::Frame;
use crate::timing::{bit_period_ns, transmit_time_us};

/// A transmit-only 8N1 serial line on one GPIO.
#[derive(Debug)]
pub struct SoftSerialTx<TX>
where
    TX: OutputPin,
{
    tx: TX,
    bit_period_ns: u32,
    frames_sent: u32,
}

impl<TX> SoftSerialTx<TX>
where
    TX: OutputPin,
{
    /// Creates the transmitter and drives the line to its idle (high) level.
    ///
    /// # Arguments
    /// - `tx`: output pin connected to the module's RX (through ~1 kΩ)
    /// - `bit_period_ns`: duration of one bit, see [`crate::timing::const_bit_period_ns`]
    pub fn new(tx: TX, bit_period_ns: u32) -> Result<Self> {
        let mut cls = Self {
            tx,
            bit_period_ns,
            frames_sent: 0,
        };
        cls.write_line(true)?;
        Ok(cls)
    }

    /// Creates the transmitter for a baud rate known only at run time.
    ///
    /// The bit period is rounded to the nearest nanosecond.
    pub fn with_baud(tx: TX, baud: u32) -> Result<Self> {
        Self::new(tx, bit_period_ns(baud))
    }

    /// The configured bit period in nanoseconds.
    pub fn bit_period_ns(&self) -> u32 {
        self.bit_period_ns
    }

    /// How long [`transmit`](Self::transmit) blocks for one frame, in microseconds.
    pub fn frame_time_us(&self) -> u32 {
        transmit_time_us(FRAME_LEN as u32, self.bit_period_ns)
    }

    /// Number of frames clocked out since creation.
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    fn write_line(&mut self, high: bool) -> Result<()> {
        if high {
            self.tx.set_high().map_err(pin_error)
        } else {
            self.tx.set_low().map_err(pin_error)
        }
    }

    fn write_bit<D: DelayNs>(&mut self, high: bool, delay: &mut D) -> Result<()> {
        self.write_line(high)?;
        delay.delay_ns(self.bit_period_ns);
        Ok(())
    }

    /// Clocks out one byte: start bit, 8 data bits LSB first, stop bit.
    ///
    /// Blocks for ten bit periods. Leaves the line idle (high).
    pub fn write_byte<D: DelayNs>(&mut self, byte: u8, delay: &mut D) -> Result<()> {
        // start
        self.write_bit(false, delay)?;
        let mut b = byte;
        for _ in 0..8 {
            self.write_bit(b & 1 != 0, delay)?;
            b >>= 1;
        }
        // stop
        self.write_bit(true, delay)
    }

    fn write_frame<D: DelayNs>(&mut self, frame: &Frame, delay: &mut D) -> Result<()> {
        for &byte in frame.as_bytes() {
            self.write_byte(byte, delay)?;
        }
        Ok(())
    }

    /// Sends a whole frame, fire and forget.
    ///
    /// Blocks for the full frame (~10.4 ms at 9600 baud). With the `atomic-tx` feature
    /// interrupts are held off for that time; a wake interrupt arriving meanwhile stays
    /// pending and is handled afterwards.
    pub fn transmit<D: DelayNs>(&mut self, frame: &Frame, delay: &mut D) -> Result<()> {
        #[cfg(feature = "atomic-tx")]
        let sent = critical_section::with(|_| self.write_frame(frame, delay));
        #[cfg(not(feature = "atomic-tx"))]
        let sent = self.write_frame(frame, delay);

        match sent {
            Ok(()) => {
                self.frames_sent = self.frames_sent.wrapping_add(1);
                trace!(
                    "sent frame {:?} in {} us",
                    frame.as_bytes(),
                    self.frame_time_us()
                );
                Ok(())
            }
            Err(e) => {
                // Leave the line idle so the module can resync on the next start bit.
                let _ = self.write_line(true);
                Err(e)
            }
        }
    }

    /// Returns the output pin.
    pub fn release(self) -> TX {
        self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::build_frame;
    use crate::test_support::{LineRecorder, RecordingDelay, decode_8n1};
    use embedded_hal::digital::ErrorKind;
    use embedded_hal_mock::eh1::MockError;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    fn byte_transactions(byte: u8) -> Vec<PinTransaction> {
        let mut out = vec![PinTransaction::set(PinState::Low)];
        for i in 0..8 {
            out.push(PinTransaction::set(if byte & (1 << i) != 0 {
                PinState::High
            } else {
                PinState::Low
            }));
        }
        out.push(PinTransaction::set(PinState::High));
        out
    }

    #[test]
    fn test_new_idles_high() {
        let tx = PinMock::new(&[PinTransaction::set(PinState::High)]);
        let link = SoftSerialTx::new(tx, 104_167).unwrap();
        assert_eq!(link.bit_period_ns(), 104_167);
        link.release().done();
    }

    #[test]
    fn test_with_baud_rounds_bit_period() {
        let link = SoftSerialTx::with_baud(LineRecorder::default(), 9_600).unwrap();
        assert_eq!(link.bit_period_ns(), 104_167);
        assert_eq!(link.frame_time_us(), 10_416);

        let link = SoftSerialTx::with_baud(LineRecorder::default(), 19_200).unwrap();
        assert_eq!(link.bit_period_ns(), 52_083);
        assert_eq!(link.frame_time_us(), 5_208);
    }

    #[test]
    fn test_write_byte_lsb_first() {
        let mut expectations = vec![PinTransaction::set(PinState::High)];
        // 0b1000_0010: bit 1 and bit 7 set
        expectations.extend(byte_transactions(0x82));
        let tx = PinMock::new(&expectations);

        let mut link = SoftSerialTx::new(tx, 104_167).unwrap();
        link.write_byte(0x82, &mut NoopDelay::new()).unwrap();
        link.release().done();
    }

    #[test]
    fn test_each_level_held_one_bit_period() {
        let mut link = SoftSerialTx::new(LineRecorder::default(), 104_167).unwrap();
        let mut delay = RecordingDelay::default();
        link.write_byte(0x7E, &mut delay).unwrap();

        assert_eq!(delay.calls, vec![104_167; 10]);
        let line = link.release();
        // idle + 10 bit writes
        assert_eq!(line.levels.len(), 11);
    }

    #[test]
    fn test_transmit_frame_decodes_back() {
        let frame = build_frame(0x0F, 0x02, 0x2B);
        let mut link = SoftSerialTx::new(LineRecorder::default(), 104_167).unwrap();
        let mut delay = RecordingDelay::default();
        link.transmit(&frame, &mut delay).unwrap();

        assert_eq!(link.frames_sent(), 1);
        assert_eq!(delay.total_ns, 100 * 104_167);
        let line = link.release();
        assert_eq!(decode_8n1(&line.levels), frame.as_bytes().to_vec());
    }

    #[test]
    fn test_pin_failure_is_reported() {
        let tx = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low)
                .with_error(MockError::Io(std::io::ErrorKind::Other)),
            PinTransaction::set(PinState::High),
        ]);
        let mut link = SoftSerialTx::new(tx, 104_167).unwrap();
        let frame = build_frame(0x06, 0x00, 0x1C);
        assert_eq!(
            link.transmit(&frame, &mut NoopDelay::new()),
            Err(crate::Error::Pin(ErrorKind::Other))
        );
        assert_eq!(link.frames_sent(), 0);
        link.release().done();
    }
}
