//! Stand-in for the platform firmware's generic analog read.
//!
//! The platform programs ADC1 and ADC2 once at startup and caches the last
//! channel it sampled, this reproduces both so the demos exercise the same
//! hand-off as a real board.
#![no_std]

use core::convert::Infallible;
use stm32f2xx_vbat::{
    AdcRegs, AnalogRead, Stm32f2,
    adc::{Ch, STM32F2XX, SampleTime},
};

/// Generic analog read in dual regular simultaneous mode.
pub struct Platform {
    regs: Stm32f2,
    last: Option<Ch>,
}

impl Platform {
    /// Program the baseline configuration, as the firmware does at startup.
    pub fn new(mut regs: Stm32f2) -> Self {
        regs.enable_clock();
        regs.common_init(&STM32F2XX.platform_common);
        STM32F2XX
            .units
            .iter()
            .for_each(|&unit| regs.init(unit, &STM32F2XX.platform));
        Self { regs, last: None }
    }
}

impl AnalogRead<Ch> for Platform {
    type Error = Infallible;

    fn analog_read(&mut self, ch: &mut Ch) -> Result<u16, Infallible> {
        // the firmware skips channel setup when the channel is unchanged
        if self.last != Some(*ch) {
            self.regs.regular_channel(*ch, 1, SampleTime::Cyc480);
            self.last = Some(*ch);
        }
        self.regs.set_enabled(true);
        self.regs.start();
        while !self.regs.eoc() {}
        let raw: u16 = self.regs.data();
        self.regs.clear_eoc();
        Ok(raw)
    }
}
