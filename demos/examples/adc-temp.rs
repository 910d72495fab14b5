#![no_std]
#![no_main]

use defmt_rtt as _; // global logger
use demos::Platform;
use panic_probe as _; // panic handler
use stm32f2xx_vbat::{
    self as vbat, Config, Poll, Reader, Stm32f2,
    adc::{Ch, STM32F2XX},
    pac,
};

// raw code at 25 °C measured on this board
const TEMP_CAL: u16 = 951;

#[vbat::cortex_m_rt::entry]
fn main() -> ! {
    let dp: pac::Peripherals = defmt::unwrap!(pac::Peripherals::take());

    let mut platform = Platform::new(Stm32f2::new(dp.ADC1, dp.ADC2, dp.ADC_COMMON));

    let cfg: Config = Config::new()
        .set_temp_cal(TEMP_CAL)
        .set_poll(Poll::DEFAULT_BOUNDED);
    // safety: the platform read and the reader never run concurrently
    let mut reader = Reader::new(unsafe { Stm32f2::steal() }, Ch::In10, cfg);

    defmt::info!("Temperature: {} °C", defmt::unwrap!(reader.temperature(&mut platform)));
    defmt::info!("Temperature: {} °C", defmt::unwrap!(reader.temperature(&mut platform)));

    let vrefint: u16 = defmt::unwrap!(reader.read_channel(&mut platform, Ch::Vrefint));
    defmt::info!("VREFINT: {} of {}", vrefint, STM32F2XX.full_scale());

    loop {
        vbat::cortex_m::asm::bkpt();
    }
}
