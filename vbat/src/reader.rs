//! Shared ADC reader
//!
//! # Claim and restore
//!
//! The platform firmware configures ADC1 and ADC2 exactly once, at startup,
//! for its generic analog read:
//! dual regular simultaneous mode, scan, continuous, 12-bit, right aligned.
//! It never programs these registers again.
//!
//! The internal channels are only on ADC1, so an internal read has to put
//! the ADCs into independent single conversion mode. Every internal read
//! therefore follows the same sequence:
//!
//! 1. Claim: enable the ADC clocks, program [`Table::claim_common`] and
//!    [`Table::claim`] on every unit in [`Table::units`].
//! 2. Convert: select the channel with a long sample time, enable ADC1,
//!    start by software, poll EOC, read the data, clear EOC, disable ADC1.
//! 3. Restore: program [`Table::platform_common`] and [`Table::platform`].
//! 4. Read the spare pin through the generic analog read. The platform
//!    caches the last channel it read and skips reprogramming when the same
//!    channel is read twice in a row, this forces it to reprogram.
//!
//! Post-condition of every public method: the ADC is in the platform's
//! baseline configuration. The platform must not start a generic analog
//! read between steps 1 and 3, nothing here locks it out.
//!
//! [`Table::claim_common`]: crate::adc::Table::claim_common
//! [`Table::claim`]: crate::adc::Table::claim
//! [`Table::units`]: crate::adc::Table::units
//! [`Table::platform_common`]: crate::adc::Table::platform_common
//! [`Table::platform`]: crate::adc::Table::platform

use core::num::NonZeroU32;

use crate::adc::{Ch, STM32F2XX, Table};
use crate::analog::AnalogRead;
use crate::latch::{Primed, Priming, Sensor};
use crate::regs::AdcRegs;

/// Nominal VBAT calibration scale.
///
/// This absorbs the internal divider and the reference, it needs tuning per
/// hardware revision.
pub const VBAT_CAL_NOMINAL: f32 = 6.63;

/// Nominal raw temperature sensor code at 25 °C.
///
/// V<sub>25</sub> = 0.76 V, 0.76 × 4095 / 3.3 ≈ 943.
/// The actual value varies quite a bit from device to device.
pub const TEMP_CAL_NOMINAL: u16 = 943;

/// Average temperature sensor slope in 12-bit raw codes per °C.
///
/// Avg_Slope = 2.5 mV/°C from the STM32F20x datasheet section 6.3.22.
pub const AVG_SLOPE: f32 = 2.5;

/// Convert a raw 12-bit VBAT code to volts.
///
/// Same as [`Table::vbat_volts`] on [`STM32F2XX`].
///
/// # Example
///
/// ```
/// use stm32f2xx_vbat::reader::{vbat_volts, VBAT_CAL_NOMINAL};
///
/// assert_eq!(vbat_volts(0, VBAT_CAL_NOMINAL), 0.0);
/// assert!((vbat_volts(4095, VBAT_CAL_NOMINAL) - VBAT_CAL_NOMINAL).abs() < 1e-6);
/// ```
#[inline]
pub fn vbat_volts(raw: u16, scale: f32) -> f32 {
    STM32F2XX.vbat_volts(raw, scale)
}

/// Convert a raw 12-bit temperature sensor code to degrees Celsius.
///
/// `cal` is the raw code at 25 °C.
/// Same as [`Table::temp_celsius`] on [`STM32F2XX`].
///
/// # Example
///
/// ```
/// use stm32f2xx_vbat::reader::{temp_celsius, TEMP_CAL_NOMINAL};
///
/// assert_eq!(temp_celsius(943, TEMP_CAL_NOMINAL), 25.0);
/// assert_eq!(temp_celsius(1193, TEMP_CAL_NOMINAL), 125.0);
/// ```
#[inline]
pub fn temp_celsius(raw: u16, cal: u16) -> f32 {
    STM32F2XX.temp_celsius(raw, cal)
}

/// Reader errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The end of conversion flag did not set within [`Poll::Bounded`]
    /// reads.
    ///
    /// This usually means the ADC clock or power domain is misconfigured.
    Timeout,
}

/// End of conversion wait strategy.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Poll {
    /// Spin on the EOC flag until it sets.
    ///
    /// A stuck ADC hangs the caller.
    #[default]
    Forever,
    /// Read the EOC flag at most this many times, then fail with
    /// [`Error::Timeout`].
    Bounded(NonZeroU32),
}

impl Poll {
    /// Bounded poll with a limit suitable for a 480 cycle sample at the
    /// slowest ADC clock.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32f2xx_vbat::Poll;
    ///
    /// assert!(matches!(Poll::DEFAULT_BOUNDED, Poll::Bounded(_)));
    /// ```
    pub const DEFAULT_BOUNDED: Poll = match NonZeroU32::new(100_000) {
        Some(limit) => Poll::Bounded(limit),
        None => Poll::Forever,
    };
}

/// Reader configuration.
///
/// Fixed when the [`Reader`] is created.
///
/// # Example
///
/// ```
/// use stm32f2xx_vbat::{Config, Poll, Priming};
///
/// const CFG: Config = Config::new()
///     .set_vbat_cal(6.5)
///     .set_temp_cal(950)
///     .set_poll(Poll::DEFAULT_BOUNDED)
///     .set_priming(Priming::PerReader);
///
/// assert_eq!(CFG.vbat_cal(), 6.5);
/// assert_eq!(CFG.temp_cal(), 950);
/// ```
#[derive(Debug, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    vbat_cal: f32,
    temp_cal: u16,
    poll: Poll,
    priming: Priming,
    table: Table,
}

impl Config {
    /// Default configuration.
    ///
    /// Nominal calibration constants, blocking poll, per-reader priming,
    /// and the [`STM32F2XX`] table.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32f2xx_vbat::{
    ///     reader::{TEMP_CAL_NOMINAL, VBAT_CAL_NOMINAL},
    ///     Config, Poll,
    /// };
    ///
    /// let cfg: Config = Config::new();
    /// assert_eq!(cfg.vbat_cal(), VBAT_CAL_NOMINAL);
    /// assert_eq!(cfg.temp_cal(), TEMP_CAL_NOMINAL);
    /// assert_eq!(cfg.poll(), Poll::Forever);
    /// ```
    pub const fn new() -> Config {
        Config {
            vbat_cal: VBAT_CAL_NOMINAL,
            temp_cal: TEMP_CAL_NOMINAL,
            poll: Poll::Forever,
            priming: Priming::PerReader,
            table: STM32F2XX,
        }
    }

    /// Set the VBAT calibration scale.
    #[must_use = "set_vbat_cal returns a modified Config"]
    pub const fn set_vbat_cal(mut self, cal: f32) -> Config {
        self.vbat_cal = cal;
        self
    }

    /// Set the raw temperature sensor code at 25 °C.
    ///
    /// The code is at the resolution of the table's claim settings.
    #[must_use = "set_temp_cal returns a modified Config"]
    pub const fn set_temp_cal(mut self, cal: u16) -> Config {
        self.temp_cal = cal;
        self
    }

    /// Set the end of conversion wait strategy.
    #[must_use = "set_poll returns a modified Config"]
    pub const fn set_poll(mut self, poll: Poll) -> Config {
        self.poll = poll;
        self
    }

    /// Set the scope of the priming latches.
    #[must_use = "set_priming returns a modified Config"]
    pub const fn set_priming(mut self, priming: Priming) -> Config {
        self.priming = priming;
        self
    }

    /// Set the register configuration table.
    ///
    /// Conversions to volts and degrees follow the table's claim
    /// resolution, see [`Table::vbat_volts`] and [`Table::temp_celsius`].
    #[must_use = "set_table returns a modified Config"]
    pub const fn set_table(mut self, table: Table) -> Config {
        self.table = table;
        self
    }

    /// VBAT calibration scale.
    pub const fn vbat_cal(&self) -> f32 {
        self.vbat_cal
    }

    /// Raw temperature sensor code at 25 °C.
    pub const fn temp_cal(&self) -> u16 {
        self.temp_cal
    }

    /// End of conversion wait strategy.
    pub const fn poll(&self) -> Poll {
        self.poll
    }

    /// Scope of the priming latches.
    pub const fn priming(&self) -> Priming {
        self.priming
    }

    /// Register configuration table.
    pub const fn table(&self) -> &Table {
        &self.table
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

fn claim<R: AdcRegs>(regs: &mut R, table: &Table) {
    trace!("claim ADC");
    regs.enable_clock();
    regs.common_init(&table.claim_common);
    table
        .units
        .iter()
        .for_each(|&unit| regs.init(unit, &table.claim));
}

fn restore<R: AdcRegs>(regs: &mut R, table: &Table) {
    trace!("restore ADC");
    regs.common_init(&table.platform_common);
    table
        .units
        .iter()
        .for_each(|&unit| regs.init(unit, &table.platform));
}

fn spare_read<P, A: AnalogRead<P>>(spare: &mut P, analog: &mut A) {
    if analog.analog_read(spare).is_err() {
        warn!("spare pin analog read failed");
    }
}

/// ADC claimed for internal conversions.
///
/// Created by [`Reader::with_claim`].
#[derive(Debug)]
pub struct Claimed<'a, R> {
    regs: &'a mut R,
    table: &'a Table,
    poll: Poll,
}

impl<R: AdcRegs> Claimed<'_, R> {
    /// Convert a single channel.
    ///
    /// ADC1 is only enabled for the duration of the conversion.
    pub fn convert(&mut self, ch: Ch) -> Result<u16, Error> {
        self.regs
            .regular_channel(ch, self.table.rank, self.table.sample_time);
        self.regs.set_enabled(true);
        self.regs.start();

        if let Err(e) = self.wait_eoc() {
            error!("ADC1 end of conversion timeout on {}", ch);
            self.regs.set_enabled(false);
            return Err(e);
        }

        let raw: u16 = self.regs.data();
        self.regs.clear_eoc();
        self.regs.set_enabled(false);

        debug!("{} raw={}", ch, raw);
        Ok(raw)
    }

    /// Register configuration table in use.
    pub fn table(&self) -> &Table {
        self.table
    }

    fn wait_eoc(&mut self) -> Result<(), Error> {
        match self.poll {
            Poll::Forever => {
                while !self.regs.eoc() {}
                Ok(())
            }
            Poll::Bounded(limit) => {
                for _ in 0..limit.get() {
                    if self.regs.eoc() {
                        return Ok(());
                    }
                }
                Err(Error::Timeout)
            }
        }
    }
}

/// Battery voltage and temperature reader.
///
/// # Example
///
/// ```
/// use stm32f2xx_vbat::{
///     adc::{Ch, CommonInit, Init, SampleTime, Unit},
///     AdcRegs, AnalogRead, Config, Reader,
/// };
///
/// # struct Regs;
/// # impl AdcRegs for Regs {
/// #     fn enable_clock(&mut self) {}
/// #     fn common_init(&mut self, _: &CommonInit) {}
/// #     fn init(&mut self, _: Unit, _: &Init) {}
/// #     fn regular_channel(&mut self, _: Ch, _: u8, _: SampleTime) {}
/// #     fn set_enabled(&mut self, _: bool) {}
/// #     fn start(&mut self) {}
/// #     fn eoc(&mut self) -> bool { true }
/// #     fn data(&mut self) -> u16 { 943 }
/// #     fn clear_eoc(&mut self) {}
/// #     fn set_vbat(&mut self, _: bool) {}
/// #     fn set_tsvref(&mut self, _: bool) {}
/// # }
/// # struct Platform;
/// # impl AnalogRead<u8> for Platform {
/// #     type Error = core::convert::Infallible;
/// #     fn analog_read(&mut self, _: &mut u8) -> Result<u16, Self::Error> { Ok(0) }
/// # }
/// # let regs = Regs;
/// # let mut platform = Platform;
/// const SPARE_PIN: u8 = 10;
///
/// let mut reader = Reader::new(regs, SPARE_PIN, Config::new());
/// let celsius: f32 = reader.temperature(&mut platform)?;
/// assert_eq!(celsius, 25.0);
/// # Ok::<(), stm32f2xx_vbat::Error>(())
/// ```
#[derive(Debug)]
pub struct Reader<R, P> {
    regs: R,
    spare: P,
    cfg: Config,
    primed: Primed,
}

impl<R, P> Reader<R, P> {
    /// Create a new reader.
    ///
    /// `spare` is a pin that is safe to sample with the generic analog read
    /// and is not otherwise being sampled.
    pub const fn new(regs: R, spare: P, cfg: Config) -> Self {
        Self {
            regs,
            spare,
            cfg,
            primed: Primed::new(),
        }
    }

    /// Free the register handle and the spare pin.
    #[inline]
    pub fn free(self) -> (R, P) {
        (self.regs, self.spare)
    }

    /// Reader configuration.
    #[inline]
    pub const fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns `true` if the sensor has been primed.
    ///
    /// With [`Priming::ProcessWide`] this reflects every reader.
    #[must_use]
    pub fn is_primed(&self, sensor: Sensor) -> bool {
        match self.cfg.priming {
            Priming::PerReader => self.primed.is_set(sensor),
            Priming::ProcessWide => sensor.shared_latch().is_set(),
        }
    }

    fn first_use(&mut self, sensor: Sensor) -> bool {
        match self.cfg.priming {
            Priming::PerReader => self.primed.mark(sensor),
            Priming::ProcessWide => sensor.shared_latch().mark(),
        }
    }
}

impl<R: AdcRegs, P> Reader<R, P> {
    /// Sample the battery voltage, in volts.
    ///
    /// The first call primes the VBAT path.
    pub fn vbat<A: AnalogRead<P>>(&mut self, analog: &mut A) -> Result<f32, Error> {
        if self.first_use(Sensor::Vbat) {
            trace!("priming VBAT");
            spare_read(&mut self.spare, analog);
            self.regs.set_vbat(true);
        }

        let raw: u16 = self.read_channel(analog, self.cfg.table.vbat)?;
        Ok(self.cfg.table.vbat_volts(raw, self.cfg.vbat_cal))
    }

    /// Sample the junction temperature, in degrees Celsius.
    ///
    /// Temperature (in °C) = {(V<sub>SENSE</sub> – V<sub>25</sub>) / Avg_Slope} + 25
    ///
    /// The first call primes the temperature sensor and VREFINT path.
    pub fn temperature<A: AnalogRead<P>>(&mut self, analog: &mut A) -> Result<f32, Error> {
        if self.first_use(Sensor::Temp) {
            trace!("priming temperature sensor");
            spare_read(&mut self.spare, analog);
            self.regs.set_tsvref(true);
        }

        let raw: u16 = self.read_channel(analog, self.cfg.table.temp)?;
        Ok(self.cfg.table.temp_celsius(raw, self.cfg.temp_cal))
    }

    /// Sample an internal channel and return the raw conversion code.
    ///
    /// This does not prime anything, enable the internal path with
    /// [`vbat`](Self::vbat) or [`temperature`](Self::temperature) first.
    pub fn read_channel<A: AnalogRead<P>>(&mut self, analog: &mut A, ch: Ch) -> Result<u16, Error> {
        self.with_claim(analog, |adc| adc.convert(ch))
    }

    /// Run a closure with the ADC claimed for internal conversions.
    ///
    /// The platform's baseline configuration is restored and the spare pin
    /// is read after the closure returns, whatever it returns.
    ///
    /// # Example
    ///
    /// Sample VBAT and VREFINT under a single claim.
    ///
    /// ```
    /// # use stm32f2xx_vbat::{
    /// #     adc::{Ch, CommonInit, Init, SampleTime, Unit},
    /// #     AdcRegs, AnalogRead, Config, Reader,
    /// # };
    /// # struct Regs;
    /// # impl AdcRegs for Regs {
    /// #     fn enable_clock(&mut self) {}
    /// #     fn common_init(&mut self, _: &CommonInit) {}
    /// #     fn init(&mut self, _: Unit, _: &Init) {}
    /// #     fn regular_channel(&mut self, _: Ch, _: u8, _: SampleTime) {}
    /// #     fn set_enabled(&mut self, _: bool) {}
    /// #     fn start(&mut self) {}
    /// #     fn eoc(&mut self) -> bool { true }
    /// #     fn data(&mut self) -> u16 { 1500 }
    /// #     fn clear_eoc(&mut self) {}
    /// #     fn set_vbat(&mut self, _: bool) {}
    /// #     fn set_tsvref(&mut self, _: bool) {}
    /// # }
    /// # struct Platform;
    /// # impl AnalogRead<u8> for Platform {
    /// #     type Error = core::convert::Infallible;
    /// #     fn analog_read(&mut self, _: &mut u8) -> Result<u16, Self::Error> { Ok(0) }
    /// # }
    /// # let mut platform = Platform;
    /// let mut reader = Reader::new(Regs, 10_u8, Config::new());
    ///
    /// let (vbat, vref): (u16, u16) = reader.with_claim(&mut platform, |adc| {
    ///     Ok::<_, stm32f2xx_vbat::Error>((adc.convert(Ch::Vbat)?, adc.convert(Ch::Vrefint)?))
    /// })?;
    /// # assert_eq!((vbat, vref), (1500, 1500));
    /// # Ok::<(), stm32f2xx_vbat::Error>(())
    /// ```
    pub fn with_claim<A, F, T>(&mut self, analog: &mut A, f: F) -> T
    where
        A: AnalogRead<P>,
        F: FnOnce(&mut Claimed<'_, R>) -> T,
    {
        let table: Table = self.cfg.table;

        claim(&mut self.regs, &table);
        let ret: T = f(&mut Claimed {
            regs: &mut self.regs,
            table: &table,
            poll: self.cfg.poll,
        });
        restore(&mut self.regs, &table);
        spare_read(&mut self.spare, analog);

        ret
    }

    /// Put the ADC back into the platform's baseline configuration and
    /// invalidate the generic analog read cache.
    ///
    /// Every measurement already does this, it is only needed after the ADC
    /// was reconfigured by something other than this reader.
    pub fn restore<A: AnalogRead<P>>(&mut self, analog: &mut A) {
        restore(&mut self.regs, &self.cfg.table);
        spare_read(&mut self.spare, analog);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vbat_conversion() {
        assert_eq!(vbat_volts(0, 6.63), 0.0);
        let v: f32 = vbat_volts(2048, 6.63);
        assert!((v - 2048.0 * 6.63 / 4095.0).abs() < 1e-6);
        assert!((v - 3.3158).abs() < 1e-3);
    }

    #[test]
    fn temp_conversion() {
        assert_eq!(temp_celsius(943, 943), 25.0);
        assert_eq!(temp_celsius(1193, 943), 125.0);
        assert_eq!(temp_celsius(893, 943), 5.0);
        assert!(temp_celsius(0, 943) < -350.0);
    }

    #[test]
    fn config_defaults() {
        let cfg: Config = Config::default();
        assert_eq!(cfg, Config::new());
        assert_eq!(cfg.priming(), Priming::PerReader);
        assert_eq!(cfg.table(), &STM32F2XX);
    }

    #[test]
    fn default_bounded_poll() {
        assert_eq!(
            Poll::DEFAULT_BOUNDED,
            Poll::Bounded(NonZeroU32::new(100_000).unwrap())
        );
    }
}
