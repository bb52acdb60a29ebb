//! # dfshuffle
//!
//! A portable, no_std firmware core for a battery-powered "press a button, hear a random
//! track" box built around a DFPlayer Mini (or compatible) MP3 module.
//!
//! The crate drives the module over a transmit-only serial link that is bit-banged on a
//! single GPIO, so it runs on parts without a spare UART (an ATtiny13A in the reference
//! hardware). Everything is expressed against `embedded-hal` traits:
//! - `OutputPin` for the serial line and the module's power rail
//! - `InputPin` for the (pulled-up, active-low) button
//! - `DelayNs` for bit timing and the module's boot/settle delays
//!
//! Two small board seams live in [`board`]: a free-running counter used once to seed the
//! track shuffle, and the deep-sleep primitive used while idle.
//!
//! ## Crate features
//! | Feature                | Description |
//! |------------------------|-------------|
//! | `std`                  | Disables `#![no_std]`, for host-side testing |
//! | `atomic-tx` (default)  | Sends each command frame inside `critical_section::with` |
//! | `defmt-0-3`            | Uses `defmt` logging |
//! | `log`                  | Uses `log` logging |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dfshuffle::config::DEFAULT_CONFIG;
//! use dfshuffle::controller::{Controller, Parts};
//! use dfshuffle::wake::WakeFlag;
//!
//! static WAKE: WakeFlag = WakeFlag::new();
//!
//! #[interrupt]
//! fn PCINT0() {
//!     WAKE.signal();
//! }
//!
//! fn main() -> ! {
//!     let parts = Parts { tx, power, button, delay, board };
//!     Controller::new(parts, &WAKE, DEFAULT_CONFIG).run()
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - The serial link runs at 9600-8N1, i.e. ~104 µs per bit. The `DelayNs` implementation
//!   must be accurate to a few microseconds or the module will drop frames.
//! - With `atomic-tx`, frames are clocked out inside `critical_section::with`, so the
//!   `DelayNs` implementation must busy-wait (cycle counting or polling a free-running
//!   timer). A delay that waits for an interrupt would hang or stretch bits.
//! - The module never answers; nothing in this crate reads the serial line.
//! - Pins must already be configured (output / input with pull-up) by the board HAL.
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub use critical_section;

#[macro_use]
pub(crate) mod fmt;

pub mod board;
pub mod config;
pub mod consts;
pub mod controller;
pub mod error;
pub mod frame;
pub mod power;
pub mod rng;
pub mod selector;
pub mod serial;
pub mod timing;
pub mod wake;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::error::{Error, Result};
