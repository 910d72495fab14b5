//! Register access
//!
//! [`AdcRegs`] is the set of low-level primitives the [`Reader`] sequences.
//! Each method is a single register operation, the ordering between them is
//! entirely up to the caller.
//!
//! [`Reader`]: crate::Reader

use crate::adc::{Ch, CommonInit, Init, SampleTime, Unit};

/// Low-level ADC register operations.
///
/// Implemented by [`Stm32f2`] for the real hardware, and by recording fakes
/// in tests.
pub trait AdcRegs {
    /// Enable the ADC1 and ADC2 peripheral clocks.
    fn enable_clock(&mut self);

    /// Program the settings shared by all ADCs.
    ///
    /// This does not touch the VBAT or temperature sensor enables.
    fn common_init(&mut self, init: &CommonInit);

    /// Program a single ADC.
    fn init(&mut self, unit: Unit, init: &Init);

    /// Place `ch` at `rank` in the ADC1 regular sequence with the given
    /// sample time.
    fn regular_channel(&mut self, ch: Ch, rank: u8, ts: SampleTime);

    /// Turn ADC1 on or off.
    fn set_enabled(&mut self, en: bool);

    /// Start a regular conversion on ADC1 by software.
    fn start(&mut self);

    /// Returns `true` when the ADC1 end of conversion flag is set.
    fn eoc(&mut self) -> bool;

    /// ADC1 regular data register.
    fn data(&mut self) -> u16;

    /// Clear the ADC1 end of conversion flag.
    fn clear_eoc(&mut self);

    /// Connect or disconnect the VBAT divider.
    fn set_vbat(&mut self, en: bool);

    /// Connect or disconnect the temperature sensor and VREFINT.
    fn set_tsvref(&mut self, en: bool);
}

impl<T: AdcRegs + ?Sized> AdcRegs for &mut T {
    #[inline]
    fn enable_clock(&mut self) {
        (**self).enable_clock()
    }

    #[inline]
    fn common_init(&mut self, init: &CommonInit) {
        (**self).common_init(init)
    }

    #[inline]
    fn init(&mut self, unit: Unit, init: &Init) {
        (**self).init(unit, init)
    }

    #[inline]
    fn regular_channel(&mut self, ch: Ch, rank: u8, ts: SampleTime) {
        (**self).regular_channel(ch, rank, ts)
    }

    #[inline]
    fn set_enabled(&mut self, en: bool) {
        (**self).set_enabled(en)
    }

    #[inline]
    fn start(&mut self) {
        (**self).start()
    }

    #[inline]
    fn eoc(&mut self) -> bool {
        (**self).eoc()
    }

    #[inline]
    fn data(&mut self) -> u16 {
        (**self).data()
    }

    #[inline]
    fn clear_eoc(&mut self) {
        (**self).clear_eoc()
    }

    #[inline]
    fn set_vbat(&mut self, en: bool) {
        (**self).set_vbat(en)
    }

    #[inline]
    fn set_tsvref(&mut self, en: bool) {
        (**self).set_tsvref(en)
    }
}

#[cfg(feature = "chip")]
mod stm32f2 {
    use super::AdcRegs;
    use crate::adc::{self, Ch, CommonInit, Init, SampleTime, Unit};
    use crate::pac;

    /// Memory-mapped ADC1/ADC2 registers.
    ///
    /// The platform firmware's generic analog read uses the same registers,
    /// nothing here prevents it from running while a [`Reader`] has the ADC
    /// claimed.
    ///
    /// [`Reader`]: crate::Reader
    #[derive(Debug)]
    #[cfg_attr(docsrs, doc(cfg(any(feature = "stm32f215", feature = "stm32f217"))))]
    pub struct Stm32f2 {
        adc1: pac::ADC1,
        adc2: pac::ADC2,
        common: pac::ADC_COMMON,
    }

    impl Stm32f2 {
        /// Create a new register handle from the ADC peripherals.
        ///
        /// # Example
        ///
        /// ```no_run
        /// use stm32f2xx_vbat::{pac, Stm32f2};
        ///
        /// let dp: pac::Peripherals = pac::Peripherals::take().unwrap();
        /// let regs = Stm32f2::new(dp.ADC1, dp.ADC2, dp.ADC_COMMON);
        /// ```
        #[inline]
        pub const fn new(adc1: pac::ADC1, adc2: pac::ADC2, common: pac::ADC_COMMON) -> Self {
            Self { adc1, adc2, common }
        }

        /// Free the ADC peripherals from the register handle.
        #[inline]
        pub fn free(self) -> (pac::ADC1, pac::ADC2, pac::ADC_COMMON) {
            (self.adc1, self.adc2, self.common)
        }

        /// Steal the ADC registers from whatever is currently using them.
        ///
        /// This is the normal way to create the handle when the platform
        /// firmware owns the ADC peripherals.
        ///
        /// # Safety
        ///
        /// 1. Ensure the platform does not start a generic analog read while
        ///    a [`Reader`](crate::Reader) measurement is in progress.
        /// 2. You are responsible for not creating more than one handle.
        #[inline]
        pub unsafe fn steal() -> Self {
            let dp: pac::Peripherals = unsafe { pac::Peripherals::steal() };
            Self::new(dp.ADC1, dp.ADC2, dp.ADC_COMMON)
        }

        #[inline]
        fn unit(&self, unit: Unit) -> &pac::adc1::RegisterBlock {
            match unit {
                Unit::Adc1 => &self.adc1,
                Unit::Adc2 => &self.adc2,
            }
        }
    }

    impl AdcRegs for Stm32f2 {
        fn enable_clock(&mut self) {
            cortex_m::interrupt::free(|_| {
                let rcc = unsafe { &*pac::RCC::PTR };
                rcc.apb2enr
                    .modify(|_, w| w.adc1en().set_bit().adc2en().set_bit());
                rcc.apb2enr.read(); // delay after an RCC peripheral clock enabling
            })
        }

        fn common_init(&mut self, init: &CommonInit) {
            let bits: u32 = init.ccr_bits();
            self.common.ccr.modify(|r, w| unsafe {
                w.bits((r.bits() & !adc::CCR_INIT_MASK) | bits)
            });
        }

        fn init(&mut self, unit: Unit, init: &Init) {
            let regs = self.unit(unit);
            regs.cr1.modify(|r, w| unsafe {
                w.bits((r.bits() & !adc::CR1_INIT_MASK) | init.cr1_bits())
            });
            regs.cr2.modify(|r, w| unsafe {
                w.bits((r.bits() & !adc::CR2_INIT_MASK) | init.cr2_bits())
            });
            regs.sqr1.modify(|r, w| unsafe {
                w.bits((r.bits() & !adc::SQR1_L_MASK) | init.sqr1_bits())
            });
        }

        fn regular_channel(&mut self, ch: Ch, rank: u8, ts: SampleTime) {
            let regs = &self.adc1;

            let Some((sqr, pos)) = adc::sqr_pos(rank) else {
                error!("invalid regular sequence rank {}", rank);
                return;
            };

            let (smpr, smp_pos) = SampleTime::smpr_pos(ch);
            let smp_mask: u32 = 0b111 << smp_pos;
            let smp: u32 = u32::from(ts) << smp_pos;
            if smpr == 1 {
                regs.smpr1
                    .modify(|r, w| unsafe { w.bits((r.bits() & !smp_mask) | smp) });
            } else {
                regs.smpr2
                    .modify(|r, w| unsafe { w.bits((r.bits() & !smp_mask) | smp) });
            }

            let sq_mask: u32 = adc::SQR3_SQ1_MASK << pos;
            let sq: u32 = u32::from(u8::from(ch)) << pos;
            match sqr {
                3 => regs
                    .sqr3
                    .modify(|r, w| unsafe { w.bits((r.bits() & !sq_mask) | sq) }),
                2 => regs
                    .sqr2
                    .modify(|r, w| unsafe { w.bits((r.bits() & !sq_mask) | sq) }),
                _ => regs
                    .sqr1
                    .modify(|r, w| unsafe { w.bits((r.bits() & !sq_mask) | sq) }),
            }
        }

        fn set_enabled(&mut self, en: bool) {
            self.adc1.cr2.modify(|_, w| w.adon().bit(en));
        }

        fn start(&mut self) {
            self.adc1.cr2.modify(|_, w| w.swstart().set_bit());
        }

        fn eoc(&mut self) -> bool {
            self.adc1.sr.read().eoc().bit_is_set()
        }

        fn data(&mut self) -> u16 {
            self.adc1.dr.read().data().bits()
        }

        fn clear_eoc(&mut self) {
            // rc_w0, the other flags are left untouched
            self.adc1.sr.modify(|_, w| w.eoc().clear_bit());
        }

        fn set_vbat(&mut self, en: bool) {
            self.common.ccr.modify(|_, w| w.vbate().bit(en));
        }

        fn set_tsvref(&mut self, en: bool) {
            self.common.ccr.modify(|_, w| w.tsvrefe().bit(en));
        }
    }
}

#[cfg(feature = "chip")]
pub use stm32f2::Stm32f2;
