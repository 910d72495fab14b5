//! Generic analog reads
//!
//! The platform firmware owns a generic "read this pin" facility on the same
//! ADC. The [`Reader`](crate::Reader) never uses its results, it only reads
//! the spare pin through it to invalidate the facility's cached channel
//! selection.

use core::marker::PhantomData;
use embedded_hal::adc::{Channel, OneShot};

/// The platform's generic analog read.
pub trait AnalogRead<P> {
    /// Read error.
    type Error: core::fmt::Debug;

    /// Sample `pin` and return the raw conversion result.
    ///
    /// The ADC must be in the platform's baseline configuration when this
    /// is called.
    fn analog_read(&mut self, pin: &mut P) -> Result<u16, Self::Error>;
}

impl<P, T: AnalogRead<P> + ?Sized> AnalogRead<P> for &mut T {
    type Error = T::Error;

    #[inline]
    fn analog_read(&mut self, pin: &mut P) -> Result<u16, Self::Error> {
        (**self).analog_read(pin)
    }
}

/// Adapts an [`embedded_hal::adc::OneShot`] driver into an [`AnalogRead`].
///
/// # Example
///
/// ```
/// use embedded_hal::adc::{Channel, OneShot};
/// use stm32f2xx_vbat::{AnalogRead, OneShotAnalog};
///
/// struct Adc;
/// struct A0;
///
/// impl Channel<Adc> for A0 {
///     type ID = u8;
///     fn channel() -> u8 {
///         0
///     }
/// }
///
/// impl OneShot<Adc, u16, A0> for Adc {
///     type Error = ();
///     fn read(&mut self, _: &mut A0) -> nb::Result<u16, ()> {
///         Ok(1234)
///     }
/// }
///
/// let mut analog: OneShotAnalog<Adc, Adc> = OneShotAnalog::new(Adc);
/// assert_eq!(analog.analog_read(&mut A0), Ok(1234));
/// ```
#[derive(Debug)]
pub struct OneShotAnalog<ADC, T> {
    adc: T,
    _adc: PhantomData<ADC>,
}

impl<ADC, T> OneShotAnalog<ADC, T> {
    /// Wrap a one-shot ADC driver.
    #[inline]
    pub const fn new(adc: T) -> Self {
        Self {
            adc,
            _adc: PhantomData,
        }
    }

    /// Free the one-shot driver.
    #[inline]
    pub fn free(self) -> T {
        self.adc
    }
}

impl<ADC, T, P> AnalogRead<P> for OneShotAnalog<ADC, T>
where
    T: OneShot<ADC, u16, P>,
    T::Error: core::fmt::Debug,
    P: Channel<ADC>,
{
    type Error = T::Error;

    #[inline]
    fn analog_read(&mut self, pin: &mut P) -> Result<u16, Self::Error> {
        nb::block!(self.adc.read(pin))
    }
}
