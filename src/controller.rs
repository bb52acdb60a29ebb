//! Main control state machine.
//!
//! [`Controller`] owns every peripheral and runs the device:
//!
//! ```text
//!            +------+
//!  reset --> | Boot |  power on, initialize, play if a wake is pending
//!            +------+
//!               |
//!               v
//!          +--------+  button press (debounced): play, wait release,
//!          | Active |  reset idle timer. Every poll adds to the idle timer.
//!          +--------+
//!            ^    | idle timer >= idle_timeout_ms
//!     wake:  |    v
//!  power on, +----------+
//!  init,     | Sleeping |  power off, settle, deep sleep until the wake flag
//!  play      +----------+
//! ```
//!
//! `Boot` happens once. `Active` and `Sleeping` alternate until the battery is removed.
//!
//! Each call to [`Controller::step`] does one unit of work (a whole boot, one button
//! poll, or a whole sleep/wake cycle) and returns the state the machine is in afterwards.
//! [`Controller::run`] calls it forever.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use nb::block;

use crate::board::{DeepSleep, EntropySource};
use crate::config::PlayerConfig;
use crate::error::{Error, Result, pin_error};
use crate::power::{DeviceState, PowerSequencer};
use crate::rng::Lfsr16;
use crate::selector::{Selection, TrackSelector};
use crate::serial::SoftSerialTx;
use crate::wake::WakeFlag;

/// Where the controller is in its lifecycle.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ControlState {
    /// First power-up; nothing has been done yet.
    #[default]
    Boot,
    /// Module powered and ready, polling the button.
    Active,
    /// Module powered off; the next step sleeps until the button is pressed.
    Sleeping,
}

/// Milliseconds spent in the active loop since the last play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct IdleTimer {
    elapsed_ms: u32,
    timeout_ms: u32,
}

impl IdleTimer {
    /// Creates a timer at zero that expires after `timeout_ms`.
    pub const fn new(timeout_ms: u32) -> Self {
        Self {
            elapsed_ms: 0,
            timeout_ms,
        }
    }

    /// Time accumulated so far.
    pub const fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    /// True once the accumulated time has reached the timeout.
    pub const fn is_expired(&self) -> bool {
        self.elapsed_ms >= self.timeout_ms
    }

    /// Back to zero.
    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
    }

    /// Adds `ms` and reports whether the timer is now expired.
    pub fn advance(&mut self, ms: u32) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(ms);
        self.is_expired()
    }
}

/// The hardware handed to a [`Controller`].
#[derive(Debug)]
pub struct Parts<TX, PWR, BTN, D, B> {
    /// Serial line to the module's RX
    pub tx: TX,
    /// Module power rail control (high = on)
    pub power: PWR,
    /// Button input, pulled up, low when pressed
    pub button: BTN,
    /// Delay provider, accurate to a few microseconds
    pub delay: D,
    /// Deep sleep and free-running counter
    pub board: B,
}

/// The device firmware.
#[derive(Debug)]
pub struct Controller<'a, TX, PWR, BTN, D, B>
where
    TX: OutputPin,
    PWR: OutputPin,
    BTN: InputPin,
    D: DelayNs,
    B: DeepSleep + EntropySource,
{
    link: SoftSerialTx<TX>,
    power: PowerSequencer<PWR>,
    button: BTN,
    delay: D,
    board: B,
    wake: &'a WakeFlag,
    rng: Lfsr16,
    selector: TrackSelector,
    idle: IdleTimer,
    state: ControlState,
    config: PlayerConfig,
    plays: u32,
}

impl<'a, TX, PWR, BTN, D, B> Controller<'a, TX, PWR, BTN, D, B>
where
    TX: OutputPin,
    PWR: OutputPin,
    BTN: InputPin,
    D: DelayNs,
    B: DeepSleep + EntropySource,
{
    /// Takes ownership of the hardware.
    ///
    /// Idles the serial line high and keeps the module's rail off until the first
    /// [`step`](Self::step).
    ///
    /// # Arguments
    /// - `parts`: the pins, delay and board services
    /// - `wake`: the flag raised by the button's pin-change interrupt
    /// - `config`: device tunables; rejected if [`PlayerConfig::validate`] fails
    pub fn new(
        parts: Parts<TX, PWR, BTN, D, B>,
        wake: &'a WakeFlag,
        config: PlayerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let Parts {
            tx,
            power,
            button,
            delay,
            board,
        } = parts;
        Ok(Self {
            link: SoftSerialTx::new(tx, config.bit_period_ns)?,
            power: PowerSequencer::new(power, &config)?,
            button,
            delay,
            board,
            wake,
            rng: Lfsr16::new(),
            selector: TrackSelector::from_config(&config),
            idle: IdleTimer::new(config.idle_timeout_ms),
            state: ControlState::Boot,
            config,
            plays: 0,
        })
    }

    /// Current state.
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Current idle time in milliseconds.
    pub fn idle_ms(&self) -> u32 {
        self.idle.elapsed_ms()
    }

    /// Power state of the playback module.
    pub fn device_state(&self) -> DeviceState {
        self.power.state()
    }

    /// Play commands sent since creation.
    pub fn plays(&self) -> u32 {
        self.plays
    }

    /// The track shuffle generator.
    pub fn rng(&self) -> &Lfsr16 {
        &self.rng
    }

    fn is_pressed(&mut self) -> Result<bool> {
        self.button.is_low().map_err(pin_error)
    }

    fn button_released(&mut self) -> nb::Result<(), Error> {
        match self.button.is_low() {
            Ok(true) => Err(nb::Error::WouldBlock),
            Ok(false) => Ok(()),
            Err(e) => Err(nb::Error::Other(pin_error(e))),
        }
    }

    fn bring_up(&mut self) -> Result<()> {
        self.power.power_on()?;
        self.power.initialize(&mut self.link, &mut self.delay)
    }

    fn play(&mut self) -> Result<Selection> {
        if !self.power.is_ready() {
            warn!("play requested while module is {:?}", self.power.state());
        }
        self.rng.seed_once(&mut self.board);
        let selection = self
            .selector
            .pick_and_play(&mut self.rng, &mut self.link, &mut self.delay)?;
        self.plays = self.plays.wrapping_add(1);
        self.idle.reset();
        Ok(selection)
    }

    fn boot(&mut self) -> Result<()> {
        info!("boot");
        self.bring_up()?;
        if self.wake.take() {
            let _ = self.play()?;
        }
        self.idle.reset();
        self.state = ControlState::Active;
        Ok(())
    }

    fn poll(&mut self) -> Result<()> {
        if self.is_pressed()? {
            self.delay.delay_ms(self.config.debounce_ms);
            if self.is_pressed()? {
                // The release is awaited even when the play failed.
                let played = self.play();
                block!(self.button_released())?;
                self.delay.delay_ms(self.config.release_settle_ms);
                self.idle.reset();
                let _ = played?;
            }
        }

        self.delay.delay_ms(self.config.poll_interval_ms);
        if self.idle.advance(self.config.poll_interval_ms) {
            info!("idle for {} ms", self.idle.elapsed_ms());
            self.state = ControlState::Sleeping;
        }
        Ok(())
    }

    fn sleep_until_wake(&mut self) -> Result<()> {
        self.power.power_off()?;
        self.delay.delay_ms(self.config.rail_settle_ms);

        // Edges from the last press would otherwise wake us straight away.
        self.wake.clear();
        info!("sleeping");
        while !self.wake.is_set() {
            self.board.sleep();
        }
        let _ = self.wake.take();
        info!("woken by button");

        self.bring_up()?;
        let _ = self.play()?;
        self.idle.reset();
        self.state = ControlState::Active;
        Ok(())
    }

    /// Runs one unit of work and returns the resulting state.
    ///
    /// On error the state is left unchanged, so the next call redoes the same unit.
    pub fn step(&mut self) -> Result<ControlState> {
        match self.state {
            ControlState::Boot => self.boot()?,
            ControlState::Active => self.poll()?,
            ControlState::Sleeping => self.sleep_until_wake()?,
        }
        Ok(self.state)
    }

    /// Runs the firmware forever.
    ///
    /// A failing step is logged and dropped; nothing is retried beyond the state machine
    /// naturally coming back around.
    pub fn run(mut self) -> ! {
        loop {
            if let Err(e) = self.step() {
                error!("step in {:?} failed: {:?}", self.state, e);
            }
        }
    }

    /// Returns the hardware.
    pub fn release(self) -> Parts<TX, PWR, BTN, D, B> {
        Parts {
            tx: self.link.release(),
            power: self.power.release(),
            button: self.button,
            delay: self.delay,
            board: self.board,
        }
    }
}
