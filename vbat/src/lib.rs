//! Battery voltage and junction temperature for STM32F2xx devices.
//!
//! The VBAT sense line and the temperature sensor are only wired to ADC1,
//! which the surrounding platform firmware also uses for its own generic
//! analog reads in dual regular simultaneous mode.
//! The [`Reader`] borrows the ADC for one conversion, then puts it back the
//! way the platform left it.
//!
//! Quickstart:
//!
//! * [`Reader::vbat`] Sample the battery voltage
//! * [`Reader::temperature`] Sample the junction temperature
//! * [`Reader::read_channel`] Sample any internal channel
//!
//! **Note:** On boards where VBAT is strapped to 3V3 the battery voltage will
//! always read as approximately 3.3 V.
#![cfg_attr(not(test), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

#[macro_use]
mod macros;

pub mod adc;
pub mod analog;
pub mod latch;
pub mod reader;
pub mod regs;

pub use analog::{AnalogRead, OneShotAnalog};
pub use latch::{Latch, Priming, Sensor};
pub use reader::{Claimed, Config, Error, Poll, Reader};
pub use regs::AdcRegs;

#[cfg(feature = "chip")]
pub use regs::Stm32f2;

pub use cortex_m;
#[cfg(feature = "rt")]
pub use cortex_m_rt;
pub use embedded_hal;

cfg_if::cfg_if! {
    if #[cfg(feature = "stm32f215")] {
        /// Peripheral access crate.
        pub use stm32f2::stm32f215 as pac;
    } else if #[cfg(feature = "stm32f217")] {
        /// Peripheral access crate.
        pub use stm32f2::stm32f217 as pac;
    } else if #[cfg(feature = "chip")] {
        core::compile_error!("You must select your hardware with a feature flag");
    }
}
