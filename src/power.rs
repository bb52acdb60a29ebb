//! Power sequencing for the playback module.
//!
//! The module's supply is switched by a MOSFET on one GPIO (high = powered). After power
//! is applied it needs time to boot and index the SD card before it will accept commands,
//! then it has to be told which storage to play from and at what volume:
//!
//! ```text
//!  Off --power_on--> Powering --initialize--> Ready
//!   ^                                           |
//!   +----------------power_off------------------+
//! ```
//!
//! [`PowerSequencer::initialize`] runs the whole bring-up with fixed delays. There is no
//! way to ask the module whether it is actually ready, so a module that boots slower than
//! `boot_delay_ms` silently misses the configuration commands.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::PlayerConfig;
use crate::error::{Result, pin_error};
use crate::frame::{Command, Frame};
use crate::serial::SoftSerialTx;

/// Power state of the playback module as far as the firmware knows.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DeviceState {
    /// Rail is off.
    #[default]
    Off,
    /// Rail is on, the module is booting or not yet configured.
    Powering,
    /// Source and volume have been sent; play commands take effect.
    Ready,
}

/// Drives the module's power rail and its bring-up sequence.
#[derive(Debug)]
pub struct PowerSequencer<PWR>
where
    PWR: OutputPin,
{
    pin: PWR,
    state: DeviceState,
    config: PlayerConfig,
}

impl<PWR> PowerSequencer<PWR>
where
    PWR: OutputPin,
{
    /// Takes the rail control pin and drives it low, leaving the module [`DeviceState::Off`].
    pub fn new(pin: PWR, config: &PlayerConfig) -> Result<Self> {
        let mut cls = Self {
            pin,
            state: DeviceState::Off,
            config: *config,
        };
        cls.pin.set_low().map_err(pin_error)?;
        Ok(cls)
    }

    /// Current power state.
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// True once [`initialize`](Self::initialize) has completed since the last power-up.
    pub fn is_ready(&self) -> bool {
        self.state == DeviceState::Ready
    }

    /// Switches the module's rail on.
    ///
    /// The module is not usable until [`initialize`](Self::initialize) has run.
    pub fn power_on(&mut self) -> Result<()> {
        self.pin.set_high().map_err(pin_error)?;
        if self.state == DeviceState::Off {
            self.state = DeviceState::Powering;
        }
        debug!("module rail on");
        Ok(())
    }

    /// Switches the module's rail off.
    pub fn power_off(&mut self) -> Result<()> {
        self.pin.set_low().map_err(pin_error)?;
        self.state = DeviceState::Off;
        debug!("module rail off");
        Ok(())
    }

    /// Waits for the module to boot, then selects the media source and sets the volume.
    ///
    /// Blocks for `boot_delay_ms + source_settle_ms + volume_settle_ms` plus two frame
    /// times (about 2.37 s with the default configuration), so call it once per power-up.
    /// Running it on an unpowered module still sends both frames; the module is not
    /// listening and drops them.
    pub fn initialize<TX, D>(&mut self, link: &mut SoftSerialTx<TX>, delay: &mut D) -> Result<()>
    where
        TX: OutputPin,
        D: DelayNs,
    {
        if self.state == DeviceState::Off {
            warn!("initializing an unpowered module");
        }
        delay.delay_ms(self.config.boot_delay_ms);

        let source = Frame::command(Command::SelectSource, self.config.source.into());
        link.transmit(&source, delay)?;
        delay.delay_ms(self.config.source_settle_ms);

        let volume = Frame::command(Command::SetVolume, u16::from(self.config.volume));
        link.transmit(&volume, delay)?;
        delay.delay_ms(self.config.volume_settle_ms);

        if self.state != DeviceState::Off {
            self.state = DeviceState::Ready;
        }
        info!(
            "module initialized: source {:?}, volume {}",
            self.config.source, self.config.volume
        );
        Ok(())
    }

    /// Returns the rail control pin.
    pub fn release(self) -> PWR {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG;
    use crate::test_support::{LineRecorder, RecordingDelay, frames};
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    const BIT_NS: u32 = 104_167;

    #[test]
    fn test_new_drives_rail_low() {
        let pin = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let power = PowerSequencer::new(pin, &DEFAULT_CONFIG).unwrap();
        assert_eq!(power.state(), DeviceState::Off);
        power.release().done();
    }

    #[test]
    fn test_power_cycle_states() {
        let pin = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);
        let mut power = PowerSequencer::new(pin, &DEFAULT_CONFIG).unwrap();
        power.power_on().unwrap();
        assert_eq!(power.state(), DeviceState::Powering);
        assert!(!power.is_ready());
        power.power_off().unwrap();
        assert_eq!(power.state(), DeviceState::Off);
        power.release().done();
    }

    #[test]
    fn test_initialize_sends_source_then_volume() {
        let mut power = PowerSequencer::new(LineRecorder::default(), &DEFAULT_CONFIG).unwrap();
        let mut link = SoftSerialTx::new(LineRecorder::default(), BIT_NS).unwrap();
        let mut delay = RecordingDelay::default();

        power.power_on().unwrap();
        power.initialize(&mut link, &mut delay).unwrap();
        assert_eq!(power.state(), DeviceState::Ready);

        let sent = frames(&link.release().levels);
        assert_eq!(
            sent,
            vec![
                [0x7E, 0xFF, 0x06, 0x09, 0x00, 0x00, 0x02, 0xFE, 0xF0, 0xEF],
                [0x7E, 0xFF, 0x06, 0x06, 0x00, 0x00, 0x1C, 0xFE, 0xD9, 0xEF],
            ]
        );
        assert_eq!(power.release().last(), Some(true));
    }

    #[test]
    fn test_initialize_delays() {
        let mut power = PowerSequencer::new(LineRecorder::default(), &DEFAULT_CONFIG).unwrap();
        let mut link = SoftSerialTx::new(LineRecorder::default(), BIT_NS).unwrap();
        let mut delay = RecordingDelay::default();

        power.power_on().unwrap();
        power.initialize(&mut link, &mut delay).unwrap();

        let waits: Vec<u32> = delay
            .calls
            .iter()
            .copied()
            .filter(|&ns| ns != BIT_NS)
            .collect();
        assert_eq!(waits, vec![2_000_000_000, 300_000_000, 50_000_000]);
        assert_eq!(
            delay.total_ns,
            2_350_000_000 + 2 * 100 * u64::from(BIT_NS)
        );
    }

    #[test]
    fn test_initialize_unpowered_stays_off() {
        let mut power = PowerSequencer::new(LineRecorder::default(), &DEFAULT_CONFIG).unwrap();
        let mut link = SoftSerialTx::new(LineRecorder::default(), BIT_NS).unwrap();
        let mut delay = RecordingDelay::default();

        power.initialize(&mut link, &mut delay).unwrap();
        assert_eq!(power.state(), DeviceState::Off);
        // frames are still clocked out
        assert_eq!(link.frames_sent(), 2);
    }
}
