//! Host-side fakes shared by the unit tests.

use core::convert::Infallible;
use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};

use crate::board::{DeepSleep, EntropySource};
use crate::wake::WakeFlag;

/// Output pin that records every level written to it.
///
/// With `fail_after: Some(n)`, every write after the first `n` fails and is not recorded.
#[derive(Debug, Default)]
pub(crate) struct LineRecorder {
    pub levels: Vec<bool>,
    pub fail_after: Option<usize>,
}

impl LineRecorder {
    pub fn last(&self) -> Option<bool> {
        self.levels.last().copied()
    }

    fn record(&mut self, high: bool) -> Result<(), ErrorKind> {
        if self.fail_after.is_some_and(|n| self.levels.len() >= n) {
            return Err(ErrorKind::Other);
        }
        self.levels.push(high);
        Ok(())
    }
}

impl ErrorType for LineRecorder {
    type Error = ErrorKind;
}

impl OutputPin for LineRecorder {
    fn set_low(&mut self) -> Result<(), ErrorKind> {
        self.record(false)
    }

    fn set_high(&mut self) -> Result<(), ErrorKind> {
        self.record(true)
    }
}

/// Decodes 8N1 bytes from a sequence of per-bit line levels.
///
/// Levels before a start bit are treated as idle. Panics on a missing stop bit.
pub(crate) fn decode_8n1(levels: &[bool]) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut i = 0;
    while i < levels.len() {
        if levels[i] {
            i += 1;
            continue;
        }
        assert!(i + 9 < levels.len(), "truncated byte at level {i}");
        let mut byte = 0u8;
        for bit in 0..8 {
            if levels[i + 1 + bit] {
                byte |= 1 << bit;
            }
        }
        assert!(levels[i + 9], "missing stop bit at level {}", i + 9);
        bytes.push(byte);
        i += 10;
    }
    bytes
}

/// Splits decoded bytes into 10-byte frames.
pub(crate) fn frames(levels: &[bool]) -> Vec<[u8; 10]> {
    decode_8n1(levels)
        .chunks(10)
        .map(|c| c.try_into().expect("partial frame on the line"))
        .collect()
}

/// Delay that records every requested wait instead of sleeping.
#[derive(Debug, Default)]
pub(crate) struct RecordingDelay {
    pub calls: Vec<u32>,
    pub total_ns: u64,
}

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.push(ns);
        self.total_ns += u64::from(ns);
    }
}

/// Button input replaying a script of levels (`true` = high = released), then staying
/// released.
#[derive(Debug, Default)]
pub(crate) struct ScriptedButton {
    pub script: VecDeque<bool>,
    pub reads: usize,
}

impl ScriptedButton {
    pub fn new(levels: &[bool]) -> Self {
        Self {
            script: levels.iter().copied().collect(),
            reads: 0,
        }
    }
}

impl ErrorType for ScriptedButton {
    type Error = Infallible;
}

impl InputPin for ScriptedButton {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        self.reads += 1;
        Ok(self.script.pop_front().unwrap_or(true))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

/// Board stand-in: a fixed counter value and a sleep that raises the wake flag after
/// `spurious` empty wake-ups.
#[derive(Debug)]
pub(crate) struct FakeBoard<'a> {
    pub counter: u16,
    pub samples: usize,
    pub sleeps: usize,
    pub spurious: usize,
    pub wake: Option<&'a WakeFlag>,
}

impl<'a> FakeBoard<'a> {
    pub fn new(counter: u16, wake: Option<&'a WakeFlag>) -> Self {
        Self {
            counter,
            samples: 0,
            sleeps: 0,
            spurious: 0,
            wake,
        }
    }
}

impl EntropySource for FakeBoard<'_> {
    fn sample(&mut self) -> u16 {
        self.samples += 1;
        self.counter
    }
}

impl DeepSleep for FakeBoard<'_> {
    fn sleep(&mut self) {
        self.sleeps += 1;
        if self.sleeps > self.spurious {
            if let Some(flag) = self.wake {
                flag.signal();
            }
        }
    }
}
