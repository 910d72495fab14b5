#![no_std]
#![no_main]

use defmt::unwrap;
use defmt_rtt as _; // global logger
use demos::Platform;
use panic_probe as _;
use stm32f2xx_vbat::{
    AnalogRead, Config, Poll, Reader, Sensor, Stm32f2,
    adc::{self, Ch, STM32F2XX},
    pac,
};

const SPARE: Ch = Ch::In10;

fn assert_baseline() {
    // safety: read only
    let common = unsafe { &*pac::ADC_COMMON::PTR };
    let adc1 = unsafe { &*pac::ADC1::PTR };
    let adc2 = unsafe { &*pac::ADC2::PTR };

    let ccr: u32 = common.ccr.read().bits();
    defmt::assert_eq!(
        ccr & adc::CCR_INIT_MASK,
        STM32F2XX.platform_common.ccr_bits()
    );
    for regs in [adc1, adc2] {
        defmt::assert_eq!(
            regs.cr1.read().bits() & adc::CR1_INIT_MASK,
            STM32F2XX.platform.cr1_bits()
        );
        defmt::assert_eq!(
            regs.cr2.read().bits() & adc::CR2_INIT_MASK,
            STM32F2XX.platform.cr2_bits()
        );
    }
}

#[defmt_test::tests]
mod tests {
    use super::*;

    struct TestArgs {
        platform: Platform,
        reader: Reader<Stm32f2, Ch>,
    }

    #[init]
    fn init() -> TestArgs {
        let dp: pac::Peripherals = unwrap!(pac::Peripherals::take());

        let platform = Platform::new(Stm32f2::new(dp.ADC1, dp.ADC2, dp.ADC_COMMON));
        assert_baseline();

        let cfg: Config = Config::new().set_poll(Poll::DEFAULT_BOUNDED);
        // safety: tests run sequentially
        let reader = Reader::new(unsafe { Stm32f2::steal() }, SPARE, cfg);

        TestArgs { platform, reader }
    }

    #[test]
    fn vbat(ta: &mut TestArgs) {
        defmt::assert!(!ta.reader.is_primed(Sensor::Vbat));
        let volts: f32 = unwrap!(ta.reader.vbat(&mut ta.platform));
        defmt::info!("VBAT {} V", volts);
        defmt::assert!(volts > 1.6 && volts < 3.7);
        defmt::assert!(ta.reader.is_primed(Sensor::Vbat));
        assert_baseline();
    }

    #[test]
    fn temperature(ta: &mut TestArgs) {
        for _ in 0..2 {
            let celsius: f32 = unwrap!(ta.reader.temperature(&mut ta.platform));
            defmt::info!("Temperature {} °C", celsius);
            defmt::assert!(celsius > -40.0 && celsius < 105.0);
        }
        assert_baseline();
    }

    #[test]
    fn sensor_enables_and_status(ta: &mut TestArgs) {
        unwrap!(ta.reader.read_channel(&mut ta.platform, Ch::Vrefint));

        // safety: read only
        let common = unsafe { &*pac::ADC_COMMON::PTR };
        let adc1 = unsafe { &*pac::ADC1::PTR };

        let ccr = common.ccr.read();
        defmt::assert!(ccr.vbate().bit_is_set());
        defmt::assert!(ccr.tsvrefe().bit_is_set());
        // SR bits 6 to 31 are reserved
        defmt::assert_eq!(adc1.sr.read().bits() & !0x3F, 0);
    }

    #[test]
    fn vrefint(ta: &mut TestArgs) {
        let raw: u16 = unwrap!(ta.reader.read_channel(&mut ta.platform, Ch::Vrefint));
        // 1.18 V to 1.24 V against a 3.3 V reference
        defmt::info!("VREFINT {}", raw);
        defmt::assert!(raw > 1400 && raw < 1600);
    }

    #[test]
    fn generic_read_after_internal(ta: &mut TestArgs) {
        unwrap!(ta.reader.vbat(&mut ta.platform));

        let mut pin: Ch = Ch::In0;
        let Ok(raw) = ta.platform.analog_read(&mut pin);
        defmt::info!("IN0 {}", raw);
        defmt::assert!(raw <= STM32F2XX.full_scale());
        assert_baseline();
    }
}
