//! Priming latches
//!
//! The first VBAT read and the first temperature read each need a priming
//! step: one throwaway generic analog read on the spare pin, then enabling
//! the internal signal path. Skipping it gives inaccurate first readings.
//!
//! Whether "first" means first for this [`Reader`](crate::Reader) or first
//! since reset is selected with [`Priming`].

use core::sync::atomic::{AtomicBool, Ordering::SeqCst};

/// Internal measurement kinds, each has an independent latch.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sensor {
    /// Battery voltage.
    Vbat,
    /// Junction temperature.
    Temp,
}

impl Sensor {
    /// Process-wide latch for this sensor.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32f2xx_vbat::latch::{Sensor, TEMP_PRIMED, VBAT_PRIMED};
    ///
    /// assert!(core::ptr::eq(Sensor::Vbat.shared_latch(), &VBAT_PRIMED));
    /// assert!(core::ptr::eq(Sensor::Temp.shared_latch(), &TEMP_PRIMED));
    /// ```
    pub fn shared_latch(self) -> &'static Latch {
        match self {
            Sensor::Vbat => &VBAT_PRIMED,
            Sensor::Temp => &TEMP_PRIMED,
        }
    }
}

/// Scope of the priming latches.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Priming {
    /// Each reader primes once per sensor.
    #[default]
    PerReader,
    /// Priming happens once per sensor since reset, shared by every reader
    /// through [`VBAT_PRIMED`] and [`TEMP_PRIMED`].
    ///
    /// A second reader created later will not prime again.
    ProcessWide,
}

/// One-shot latch.
///
/// # Example
///
/// ```
/// use stm32f2xx_vbat::Latch;
///
/// static LATCH: Latch = Latch::new();
///
/// assert!(!LATCH.is_set());
/// assert!(LATCH.mark());
/// assert!(!LATCH.mark());
/// assert!(LATCH.is_set());
/// ```
#[derive(Debug)]
pub struct Latch {
    set: AtomicBool,
}

impl Latch {
    /// Create a new latch, not yet set.
    pub const fn new() -> Self {
        Self {
            set: AtomicBool::new(false),
        }
    }

    /// Set the latch.
    ///
    /// Returns `true` only for the call that set it.
    #[inline]
    #[must_use = "the return value indicates if this was the first call"]
    pub fn mark(&self) -> bool {
        !self.set.swap(true, SeqCst)
    }

    /// Returns `true` if the latch has been set.
    #[inline]
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.set.load(SeqCst)
    }
}

impl Default for Latch {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide VBAT priming latch.
pub static VBAT_PRIMED: Latch = Latch::new();

/// Process-wide temperature sensor priming latch.
pub static TEMP_PRIMED: Latch = Latch::new();

/// Per-reader priming state.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub(crate) struct Primed {
    vbat: bool,
    temp: bool,
}

impl Primed {
    pub(crate) const fn new() -> Self {
        Self {
            vbat: false,
            temp: false,
        }
    }

    /// Returns `true` for the first call per sensor.
    pub(crate) fn mark(&mut self, sensor: Sensor) -> bool {
        let flag: &mut bool = match sensor {
            Sensor::Vbat => &mut self.vbat,
            Sensor::Temp => &mut self.temp,
        };
        !core::mem::replace(flag, true)
    }

    pub(crate) const fn is_set(&self, sensor: Sensor) -> bool {
        match sensor {
            Sensor::Vbat => self.vbat,
            Sensor::Temp => self.temp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_reader_latches_are_independent() {
        let mut primed = Primed::new();
        assert!(primed.mark(Sensor::Vbat));
        assert!(!primed.mark(Sensor::Vbat));
        assert!(!primed.is_set(Sensor::Temp));
        assert!(primed.mark(Sensor::Temp));
        assert!(primed.is_set(Sensor::Temp));
    }

    #[test]
    fn latch_fires_once() {
        let latch = Latch::new();
        assert!(latch.mark());
        for _ in 0..3 {
            assert!(!latch.mark());
        }
        assert!(latch.is_set());
    }
}
