//! Button wake flag shared between the pin-change interrupt and the control loop.
//!
//! The interrupt handler's only job is to raise the flag; it must not block or touch any
//! other state. The control loop reads and clears it. Access goes through
//! `critical_section`, which on a single-core MCU simply masks interrupts for the few
//! instructions involved.
//!
//! # Example
//! ```rust,ignore
//! use dfshuffle::wake::WakeFlag;
//!
//! static WAKE: WakeFlag = WakeFlag::new();
//!
//! #[interrupt]
//! fn PCINT0() {
//!     WAKE.signal();
//! }
//! ```
//!
//! No debouncing happens here: every edge of the button line raises the flag.

use core::cell::Cell;
use critical_section::Mutex;

/// A single interrupt-to-main-loop event flag.
#[derive(Debug)]
pub struct WakeFlag {
    raised: Mutex<Cell<bool>>,
}

impl Default for WakeFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeFlag {
    /// Creates a lowered flag. `const` so it can back a `static`.
    pub const fn new() -> Self {
        Self {
            raised: Mutex::new(Cell::new(false)),
        }
    }

    /// Raises the flag. Called from the interrupt handler.
    pub fn signal(&self) {
        critical_section::with(|cs| self.raised.borrow(cs).set(true));
    }

    /// True if the flag is raised.
    pub fn is_set(&self) -> bool {
        critical_section::with(|cs| self.raised.borrow(cs).get())
    }

    /// Lowers the flag.
    pub fn clear(&self) {
        critical_section::with(|cs| self.raised.borrow(cs).set(false));
    }

    /// Lowers the flag and reports whether it was raised, atomically with respect to the
    /// interrupt handler.
    pub fn take(&self) -> bool {
        critical_section::with(|cs| self.raised.borrow(cs).replace(false))
    }
}
