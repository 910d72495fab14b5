#![no_std]
#![no_main]

use defmt_rtt as _; // global logger
use demos::Platform;
use panic_probe as _; // panic handler
use stm32f2xx_vbat::{
    self as vbat, AnalogRead, Config, Reader, Stm32f2,
    adc::Ch,
    cortex_m::asm::delay,
    pac,
};

#[vbat::cortex_m_rt::entry]
fn main() -> ! {
    let dp: pac::Peripherals = defmt::unwrap!(pac::Peripherals::take());

    let mut platform = Platform::new(Stm32f2::new(dp.ADC1, dp.ADC2, dp.ADC_COMMON));

    // safety: the platform read and the reader never run concurrently
    let regs: Stm32f2 = unsafe { Stm32f2::steal() };
    let mut reader = Reader::new(regs, Ch::In10, Config::new());

    loop {
        match reader.vbat(&mut platform) {
            Ok(volts) => defmt::info!("VBAT {} V", volts),
            Err(e) => defmt::error!("VBAT {}", e),
        }

        // generic reads keep working after the internal read
        let mut pin: Ch = Ch::In0;
        let Ok(raw) = platform.analog_read(&mut pin);
        defmt::info!("A0 {}", raw);

        delay(16_000_000);
    }
}
