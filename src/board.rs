//! Board seams not covered by `embedded-hal`.
//!
//! Pins and delays come from `embedded-hal`. The two remaining hardware services are
//! defined here and implemented by the board crate:
//!
//! - [`EntropySource`]: a free-running counter read once to decorrelate the track shuffle
//!   between power-ups (Timer0 at `clk/64` on an ATtiny13A).
//! - [`DeepSleep`]: the deepest sleep mode that the wake interrupt can still leave
//!   (`SLEEP_MODE_PWR_DOWN` on AVR, `WFI` with `SLEEPDEEP` on Cortex-M).
//!
//! ```rust,ignore
//! struct Tiny13;
//!
//! impl EntropySource for Tiny13 {
//!     fn sample(&mut self) -> u16 {
//!         unsafe { (*TC0::ptr()).tcnt0.read().bits() as u16 }
//!     }
//! }
//!
//! impl DeepSleep for Tiny13 {
//!     fn sleep(&mut self) {
//!         avr_device::interrupt::disable();
//!         if WAKE.is_set() {
//!             unsafe { avr_device::interrupt::enable() };
//!             return;
//!         }
//!         // set_sleep_mode(PWR_DOWN); sleep_enable(); sei; sleep_cpu(); sleep_disable();
//!     }
//! }
//! ```

/// A counter that keeps running independently of program flow.
///
/// Its value at the moment of the first button press depends on human timing, which is
/// what makes it useful as a seed.
pub trait EntropySource {
    /// Returns the current counter value.
    fn sample(&mut self) -> u16;
}

/// Low-power CPU sleep.
pub trait DeepSleep {
    /// Enters the deepest available sleep state and returns once any enabled interrupt
    /// has fired. Interrupts must be enabled on return.
    ///
    /// The controller checks the [`WakeFlag`](crate::wake::WakeFlag) right before
    /// calling this, with interrupts enabled. A button edge landing between that check
    /// and the sleep instruction would otherwise only be acted on at the next edge, so
    /// implementations should disable interrupts, re-check the flag, and return at once
    /// if it is set. Otherwise they enable interrupts immediately before sleeping
    /// (`sei; sleep` on AVR, where the instruction after `sei` always runs).
    fn sleep(&mut self);
}

impl<T: EntropySource + ?Sized> EntropySource for &mut T {
    fn sample(&mut self) -> u16 {
        T::sample(self)
    }
}

impl<T: DeepSleep + ?Sized> DeepSleep for &mut T {
    fn sleep(&mut self) {
        T::sleep(self)
    }
}
